//! 文件系统与外部调度框架之间交换的数据类型。

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod dirent;
mod error;
mod perm;
mod stat;

pub use self::{
    dirent::{DirEntry, DirEntryType},
    error::Error,
    perm::Perm,
    stat::Stat,
};
