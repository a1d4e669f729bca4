//! # 磁盘数据结构层
//!
//! lazy-fs 的磁盘布局（以逻辑块为单位，逻辑块 = 2 × 设备 I/O 单位）：
//! 超级块 | 索引节点位图 | 数据块位图 | 索引节点区域 | 数据块区域
//!
//! 所有记录都是 `#[repr(C)]` 的定长结构，整数按主机字节序直接落盘。

use core::{mem, ptr, slice};

use vfs::{DirEntryType, Error};

use crate::Result;

mod super_block;
pub use super_block::{Layout, Region, SuperBlock};

mod bitmap;
pub use bitmap::Bitmap;

mod inode;
pub use inode::DiskInode;

/// 目录项，也属于磁盘文件系统数据结构
mod dir_entry;
pub use dir_entry::DiskDirEntry;

/// 未分配的数据块索引
pub const UNASSIGNED: u32 = u32::MAX;

/// 可以按字节原样读写的定长磁盘记录
///
/// # Safety
///
/// 实现者必须是 `#[repr(C)]`、没有填充字节，且任意位模式都是合法值。
pub unsafe trait Record: Sized {
    const SIZE: usize = mem::size_of::<Self>();

    #[inline]
    fn zeroed() -> Self {
        unsafe { mem::zeroed() }
    }

    /// 从一段恰好 [`Record::SIZE`] 字节的切片复制出记录
    fn from_bytes(bytes: &[u8]) -> Self {
        let mut record = Self::zeroed();
        record.as_bytes_mut().copy_from_slice(bytes);
        record
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(ptr::from_ref(self).cast(), Self::SIZE) }
    }

    #[inline]
    fn as_bytes_mut(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(ptr::from_mut(self).cast(), Self::SIZE) }
    }
}

/* 磁盘上的类型标记 */
const TAG_REGULAR: u32 = 0;
const TAG_DIRECTORY: u32 = 1;
const TAG_SYMLINK: u32 = 2;

pub fn encode_kind(kind: DirEntryType) -> u32 {
    match kind {
        DirEntryType::Regular => TAG_REGULAR,
        DirEntryType::Directory => TAG_DIRECTORY,
        DirEntryType::SymLink => TAG_SYMLINK,
    }
}

pub fn decode_kind(tag: u32) -> Result<DirEntryType> {
    match tag {
        TAG_REGULAR => Ok(DirEntryType::Regular),
        TAG_DIRECTORY => Ok(DirEntryType::Directory),
        TAG_SYMLINK => Ok(DirEntryType::SymLink),
        _ => {
            log::warn!("unknown type tag {tag:#x} on disk");
            Err(Error::InvariantViolation)
        }
    }
}

/// 把名字写进定长、以 \0 结尾的缓冲区，调用方保证长度已校验
fn fill_name(buf: &mut [u8; crate::NAME_MAX_LEN], name: &str) {
    let bytes = name.as_bytes();
    debug_assert!(bytes.len() < buf.len());
    buf.fill(0);
    buf[..bytes.len()].copy_from_slice(bytes);
}

/// 取出 \0 之前的部分
fn read_name(buf: &[u8; crate::NAME_MAX_LEN]) -> Result<&str> {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    core::str::from_utf8(&buf[..len]).map_err(|_| Error::InvariantViolation)
}
