use alloc::vec;
use alloc::vec::Vec;

use vfs::Error;

use super::Region;
use crate::Result;
use crate::block_io::BlockIo;

/// 位图区域，记录其指示区域的分配情况
///
/// 挂载期间整张位图常驻内存，只在同步时整段写回。
/// 第 `i` 位在第 `i / 8` 字节的第 `i % 8` 位（低位在前）。
#[derive(Debug, Clone)]
pub struct Bitmap {
    /// 位图在设备上的区域，`bits` 的长度恰为其字节数
    offset: usize,
    /// 参与分配的位数，超出的位永远不会被分配
    capacity: usize,
    bits: Vec<u8>,
}

impl Bitmap {
    /// 全零的位图，用于格式化
    pub fn new(region: Region, block_size: usize, capacity: usize) -> Self {
        let len = region.blocks * block_size;
        Self {
            offset: region.offset,
            capacity: capacity.min(len * 8),
            bits: vec![0; len],
        }
    }

    /// 从设备读入整张位图
    pub fn load(io: &BlockIo, region: Region, block_size: usize, capacity: usize) -> Result<Self> {
        let mut bitmap = Self::new(region, block_size, capacity);
        io.read(bitmap.offset, &mut bitmap.bits)?;
        Ok(bitmap)
    }

    pub fn store(&self, io: &BlockIo) -> Result<()> {
        io.write(self.offset, &self.bits)
    }

    /// 首次适配：返回编号最小的空闲位并将其置位
    pub fn alloc(&mut self) -> Result<u32> {
        let Some((byte_index, bit_index)) = self
            .bits
            .iter()
            .enumerate()
            .find_map(|(byte_index, &bits)| {
                (bits != u8::MAX).then_some((byte_index, bits.trailing_ones() as usize))
            })
        else {
            return Err(Error::NoSpace);
        };

        let id = byte_index * 8 + bit_index;
        // 首个空闲位已越过容量，说明容量内已经全满
        if id >= self.capacity {
            return Err(Error::NoSpace);
        }

        self.bits[byte_index] |= 1 << bit_index;
        Ok(id as u32)
    }

    pub fn dealloc(&mut self, id: u32) -> Result<()> {
        if !self.is_allocated(id) {
            log::warn!("bit {id} is released but was never allocated");
            return Err(Error::InvariantViolation);
        }

        let id = id as usize;
        self.bits[id / 8] &= !(1 << (id % 8));
        Ok(())
    }

    pub fn is_allocated(&self, id: u32) -> bool {
        let id = id as usize;
        id < self.capacity && self.bits[id / 8] & (1 << (id % 8)) != 0
    }

    /// 已分配的位数
    pub fn allocated(&self) -> usize {
        self.bits.iter().map(|bits| bits.count_ones() as usize).sum()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
