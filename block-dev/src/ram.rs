use alloc::vec;
use alloc::vec::Vec;

use spin::Mutex;

use crate::{BlockDevice, IoError};

/// 内存中的块设备，给测试和镜像预演使用
#[derive(Debug)]
pub struct RamDisk {
    data: Mutex<Vec<u8>>,
    block_size: usize,
}

impl RamDisk {
    /// 容量不足一个 I/O 单位的尾部会被截掉
    pub fn new(device_size: usize, block_size: usize) -> Self {
        assert!(block_size > 0);
        let device_size = device_size / block_size * block_size;

        Self {
            data: Mutex::new(vec![0; device_size]),
            block_size,
        }
    }

    /// 直接拿到整块内存的拷贝，便于比对落盘结果
    pub fn snapshot(&self) -> Vec<u8> {
        self.data.lock().clone()
    }

    fn range(&self, block_id: usize, len: usize) -> Result<core::ops::Range<usize>, IoError> {
        if len != self.block_size {
            return Err(IoError::Misaligned { len });
        }
        if block_id >= self.num_blocks() {
            return Err(IoError::OutOfRange { block_id });
        }

        let start = block_id * self.block_size;
        Ok(start..start + self.block_size)
    }
}

impl BlockDevice for RamDisk {
    #[inline]
    fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    fn device_size(&self) -> usize {
        self.data.lock().len()
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), IoError> {
        let range = self.range(block_id, buf.len())?;
        buf.copy_from_slice(&self.data.lock()[range]);
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), IoError> {
        let range = self.range(block_id, buf.len())?;
        self.data.lock()[range].copy_from_slice(buf);
        Ok(())
    }
}
