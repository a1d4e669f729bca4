//! # lazy-fs
//!
//! 运行在裸块设备之上的层级文件系统，由用户态文件系统框架调用。
//! 目录树常驻内存，inode 只在第一次被访问时才从磁盘读入（物化）。

#![cfg_attr(not(test), no_std)]

extern crate alloc;

/* lazy-fs 的整体架构，自上而下 */

// 会话层：对外的回调入口，整个引擎只有一把锁
mod session;

// 命名空间层：路径解析、创建目录/文件、查询属性、列目录
mod namespace;

// 持久化层：内存目录树与磁盘之间的递归读写
mod persist;

// 磁盘管理器层：挂载、卸载、inode 与数据块的分配
mod lfs;

// 内存目录树：dentry 与 inode 的竞技场
mod tree;

// 磁盘数据结构层
mod layout;

// 块 I/O 适配层：任意偏移到设备对齐读写的转换
mod block_io;

mod path;

pub use self::{
    layout::{Bitmap, Layout, Region, SuperBlock},
    lfs::{LazyFileSystem, MountOptions, Preload},
    namespace::Lookup,
    path::Path,
    session::Session,
    tree::{Dentry, DentryId, Inode, InodeId, Tree},
};

pub const MAGIC: u32 = 0x4c5a_4653;
/// 超级块在设备上的字节偏移
pub const SUPER_OFFSET: usize = 0;
pub const ROOT_INO: u32 = 0;

/// 每个文件占用的 inode 块数
pub const INODE_PER_FILE: usize = 1;
/// 每个文件最多拥有的数据块数，即直接索引的个数
pub const DATA_PER_FILE: usize = 16;
/// 文件名与符号链接目标的缓冲区长度，最后一字节留给 \0
pub const NAME_MAX_LEN: usize = 128;
/// 逻辑块 = 2 × 设备 I/O 单位
pub const BLOCK_IO_FACTOR: usize = 2;

pub type Result<T> = core::result::Result<T, vfs::Error>;
