//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备，例如磁盘、光盘、U盘等；
//! [`BlockDevice`] 就是对读写块设备的抽象，
//! 实现了此特质的类型称为**块设备驱动**。
//!
//! 这里的“块”指设备的原生 I/O 单位，与文件系统的逻辑块无关，
//! 文件系统需要自行处理对齐。

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod ram;

use core::any::Any;
use core::fmt;

pub use self::ram::RamDisk;

/// 块设备驱动特质
pub trait BlockDevice: Send + Sync + Any {
    /// 原生 I/O 单位（字节），每次读写都必须是恰好一个单位
    fn block_size(&self) -> usize;

    /// 设备总容量（字节）
    fn device_size(&self) -> usize;

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), IoError>;

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), IoError>;

    /// 设备可容纳的完整 I/O 单位个数
    #[inline]
    fn num_blocks(&self) -> usize {
        self.device_size() / self.block_size()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    /// 块号越过了设备末尾
    OutOfRange { block_id: usize },
    /// 缓冲区长度不等于 I/O 单位
    Misaligned { len: usize },
    /// 底层设备报告的失败
    Device,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { block_id } => write!(f, "block {block_id} is out of range"),
            Self::Misaligned { len } => write!(f, "buffer of {len} bytes is not one I/O unit"),
            Self::Device => f.write_str("device transfer failed"),
        }
    }
}
