//! # 块 I/O 适配层
//!
//! 设备只接受按原生 I/O 单位对齐的整块读写，而文件系统的记录落在任意字节偏移上。
//! 读：把 `[offset, offset + len)` 向外扩展到对齐边界，整段读入临时缓冲区后截取；
//! 写：先整段读出，覆盖目标区间，再整段写回，区间外的字节保持原样。
//!
//! 失败不重试，直接交给调用方中止当前操作。

use alloc::sync::Arc;
use alloc::vec;

use block_dev::{BlockDevice, IoError};
use vfs::Error;

use crate::Result;
use crate::layout::Record;

pub struct BlockIo {
    device: Arc<dyn BlockDevice>,
    /// 设备的原生 I/O 单位
    io_size: usize,
}

impl BlockIo {
    pub fn new(device: Arc<dyn BlockDevice>) -> Self {
        let io_size = device.block_size();
        Self { device, io_size }
    }

    #[inline]
    pub fn io_size(&self) -> usize {
        self.io_size
    }

    #[inline]
    pub fn device_size(&self) -> usize {
        self.device.device_size()
    }

    pub fn read(&self, offset: usize, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }

        let span = Span::new(offset, buf.len(), self.io_size);
        let mut scratch = vec![0u8; span.len];
        self.read_aligned(span.first_block, &mut scratch)?;
        buf.copy_from_slice(&scratch[span.bias..span.bias + buf.len()]);

        Ok(())
    }

    pub fn write(&self, offset: usize, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        let span = Span::new(offset, data.len(), self.io_size);
        let mut scratch = vec![0u8; span.len];
        // 先读出整段，保住区间外的字节
        self.read_aligned(span.first_block, &mut scratch)?;
        scratch[span.bias..span.bias + data.len()].copy_from_slice(data);

        for (i, chunk) in scratch.chunks_exact(self.io_size).enumerate() {
            self.device
                .write_block(span.first_block + i, chunk)
                .map_err(io_error)?;
        }

        Ok(())
    }

    /// 读出一条定长磁盘记录
    pub fn read_record<T: Record>(&self, offset: usize) -> Result<T> {
        let mut record = T::zeroed();
        self.read(offset, record.as_bytes_mut())?;
        Ok(record)
    }

    #[inline]
    pub fn write_record<T: Record>(&self, offset: usize, record: &T) -> Result<()> {
        self.write(offset, record.as_bytes())
    }

    fn read_aligned(&self, first_block: usize, buf: &mut [u8]) -> Result<()> {
        for (i, chunk) in buf.chunks_exact_mut(self.io_size).enumerate() {
            self.device
                .read_block(first_block + i, chunk)
                .map_err(io_error)?;
        }
        Ok(())
    }
}

/// 对齐后的传输区间
#[derive(Debug, PartialEq, Eq)]
struct Span {
    /// 第一个 I/O 单位的编号
    first_block: usize,
    /// 请求起点相对对齐起点的偏移
    bias: usize,
    /// 对齐后的总字节数
    len: usize,
}

impl Span {
    fn new(offset: usize, len: usize, io_size: usize) -> Self {
        let aligned_start = offset / io_size * io_size;
        let bias = offset - aligned_start;

        Self {
            first_block: aligned_start / io_size,
            bias,
            len: (bias + len).next_multiple_of(io_size),
        }
    }
}

fn io_error(err: IoError) -> Error {
    log::warn!("block device: {err}");
    Error::Io
}
