use vfs::Error;

use super::{DiskDirEntry, DiskInode, Record};
use crate::{BLOCK_IO_FACTOR, DATA_PER_FILE, INODE_PER_FILE, MAGIC, Result};

/// 超级块区域占用的逻辑块数
const SUPER_BLOCKS: usize = 1;
const INODE_MAP_BLOCKS: usize = 1;
const DATA_MAP_BLOCKS: usize = 1;
/// 元数据保留块：超级块与两张位图
const RESERVED_BLOCKS: usize = SUPER_BLOCKS + INODE_MAP_BLOCKS + DATA_MAP_BLOCKS;

/// 超级块：
/// - 提供文件系统合法性校验；
/// - 定位其它连续区域
#[derive(Debug, Clone)]
#[repr(C)]
pub struct SuperBlock {
    /// 魔数：用于校验文件系统合法性
    magic: u32,
    /// 已用空间（字节）
    pub usage: u32,
    pub sb_offset: u32,
    pub sb_blocks: u32,
    pub inode_map_offset: u32,
    pub inode_map_blocks: u32,
    pub data_map_offset: u32,
    pub data_map_blocks: u32,
    pub inode_offset: u32,
    pub inode_blocks: u32,
    pub data_offset: u32,
    pub data_blocks: u32,
    /// 最大支持的 inode 数
    pub max_inodes: u32,
    /// 支持的最大文件大小
    pub max_file_size: u32,
}

unsafe impl Record for SuperBlock {}

impl SuperBlock {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC
    }
}

/// 磁盘上一段连续的区域
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// 起始字节偏移
    pub offset: usize,
    /// 占用的逻辑块数
    pub blocks: usize,
}

/// 挂载期间常驻内存的布局描述，卸载时写回为 [`SuperBlock`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub device_size: usize,
    /// 设备的原生 I/O 单位
    pub io_size: usize,
    pub block_size: usize,
    /// 已用空间（字节）：每分配一个 inode 槽或数据块增加一个逻辑块
    pub usage: usize,
    pub super_block: Region,
    pub inode_map: Region,
    pub data_map: Region,
    pub inodes: Region,
    pub data: Region,
    pub max_inodes: usize,
    pub max_file_size: usize,
}

impl Layout {
    /// 为未格式化的设备估算布局
    pub fn compute(device_size: usize, io_size: usize) -> Result<Self> {
        let block_size = io_size * BLOCK_IO_FACTOR;
        if !holds_records(block_size) || device_size > u32::MAX as usize {
            log::warn!("device {device_size}B with I/O unit {io_size}B cannot hold the layout");
            return Err(Error::BadLayout);
        }

        let total_blocks = device_size / block_size;
        let inode_blocks = device_size / ((INODE_PER_FILE + DATA_PER_FILE) * block_size);
        if inode_blocks <= RESERVED_BLOCKS {
            log::warn!("device {device_size}B is too small");
            return Err(Error::BadLayout);
        }
        let data_blocks = total_blocks - RESERVED_BLOCKS - inode_blocks;

        let super_block = Region {
            offset: 0,
            blocks: SUPER_BLOCKS,
        };
        let inode_map = Region {
            offset: super_block.offset + super_block.blocks * block_size,
            blocks: INODE_MAP_BLOCKS,
        };
        let data_map = Region {
            offset: inode_map.offset + inode_map.blocks * block_size,
            blocks: DATA_MAP_BLOCKS,
        };
        let inodes = Region {
            offset: data_map.offset + data_map.blocks * block_size,
            blocks: inode_blocks,
        };
        let data = Region {
            offset: inodes.offset + inodes.blocks * block_size,
            blocks: data_blocks,
        };

        Ok(Self {
            device_size,
            io_size,
            block_size,
            usage: 0,
            super_block,
            inode_map,
            data_map,
            inodes,
            data,
            max_inodes: inode_blocks - RESERVED_BLOCKS,
            max_file_size: DATA_PER_FILE * block_size,
        })
    }

    /// 信任磁盘上的布局，只校验设备的 I/O 单位能否放下定长记录
    pub fn restore(super_block: &SuperBlock, device_size: usize, io_size: usize) -> Result<Self> {
        let block_size = io_size * BLOCK_IO_FACTOR;
        if !holds_records(block_size) {
            log::warn!("I/O unit {io_size}B is too small for the stored layout");
            return Err(Error::BadLayout);
        }

        let region = |offset: u32, blocks: u32| Region {
            offset: offset as usize,
            blocks: blocks as usize,
        };

        Ok(Self {
            device_size,
            io_size,
            block_size,
            usage: super_block.usage as usize,
            super_block: region(super_block.sb_offset, super_block.sb_blocks),
            inode_map: region(super_block.inode_map_offset, super_block.inode_map_blocks),
            data_map: region(super_block.data_map_offset, super_block.data_map_blocks),
            inodes: region(super_block.inode_offset, super_block.inode_blocks),
            data: region(super_block.data_offset, super_block.data_blocks),
            max_inodes: super_block.max_inodes as usize,
            max_file_size: super_block.max_file_size as usize,
        })
    }

    pub fn to_super_block(&self) -> SuperBlock {
        // compute 已保证所有值都在 u32 以内
        SuperBlock {
            magic: MAGIC,
            usage: self.usage as u32,
            sb_offset: self.super_block.offset as u32,
            sb_blocks: self.super_block.blocks as u32,
            inode_map_offset: self.inode_map.offset as u32,
            inode_map_blocks: self.inode_map.blocks as u32,
            data_map_offset: self.data_map.offset as u32,
            data_map_blocks: self.data_map.blocks as u32,
            inode_offset: self.inodes.offset as u32,
            inode_blocks: self.inodes.blocks as u32,
            data_offset: self.data.offset as u32,
            data_blocks: self.data.blocks as u32,
            max_inodes: self.max_inodes as u32,
            max_file_size: self.max_file_size as u32,
        }
    }

    /// 区域末尾（不含）的字节偏移
    #[inline]
    pub fn end_of(&self, region: Region) -> usize {
        region.offset + region.blocks * self.block_size
    }

    /// 区域的字节数
    #[inline]
    pub fn bytes_of(&self, region: Region) -> usize {
        region.blocks * self.block_size
    }

    /// 一个数据块能放下的目录项个数，放不下的尾部留空，不跨块存放
    #[inline]
    pub fn entries_per_block(&self) -> usize {
        self.block_size / DiskDirEntry::SIZE
    }

    /// inode 槽在设备上的字节偏移
    pub fn inode_pos(&self, ino: u32) -> Result<usize> {
        let ino = ino as usize;
        if ino >= self.inodes.blocks / INODE_PER_FILE {
            log::warn!("inode {ino} lies outside the inode region");
            return Err(Error::InvariantViolation);
        }
        Ok(self.inodes.offset + ino * INODE_PER_FILE * self.block_size)
    }

    /// 数据块在设备上的字节偏移
    pub fn data_pos(&self, block: u32) -> Result<usize> {
        let block = block as usize;
        if block >= self.data.blocks {
            log::warn!("data block {block} lies outside the data region");
            return Err(Error::InvariantViolation);
        }
        Ok(self.data.offset + block * self.block_size)
    }

    /// inode 位图中参与分配的位数
    #[inline]
    pub fn inode_capacity(&self) -> usize {
        self.max_inodes.min(self.bytes_of(self.inode_map) * 8)
    }

    /// 数据块位图中参与分配的位数
    #[inline]
    pub fn data_capacity(&self) -> usize {
        self.data.blocks.min(self.bytes_of(self.data_map) * 8)
    }
}

/// 一个逻辑块必须放得下一条 inode 记录与一条目录项记录
fn holds_records(block_size: usize) -> bool {
    block_size >= DiskInode::SIZE.max(DiskDirEntry::SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: usize = 1024 * 1024;

    #[test]
    fn one_mib_device() {
        let layout = Layout::compute(MIB, 512).unwrap();

        assert_eq!(1024, layout.block_size);
        assert_eq!(60, layout.inodes.blocks);
        assert_eq!(57, layout.max_inodes);
        assert_eq!(1024 - 3 - 60, layout.data.blocks);
        assert_eq!(16 * 1024, layout.max_file_size);
        assert_eq!(3 * 1024, layout.inodes.offset);
        assert_eq!(MIB, layout.end_of(layout.data));
        assert_eq!(7, layout.entries_per_block());
    }

    #[test]
    fn regions_are_ordered_and_bounded() {
        for io_size in [128, 256, 512, 1024, 4096] {
            for device_size in [64 * 1024, 100_000, MIB, 3 * MIB + 17, 64 * MIB] {
                let Ok(layout) = Layout::compute(device_size, io_size) else {
                    continue;
                };
                let regions = [
                    layout.super_block,
                    layout.inode_map,
                    layout.data_map,
                    layout.inodes,
                    layout.data,
                ];

                assert_eq!(0, regions[0].offset);
                for pair in regions.windows(2) {
                    assert_eq!(layout.end_of(pair[0]), pair[1].offset);
                }

                let data_end = layout.end_of(layout.data);
                let per_file = (INODE_PER_FILE + DATA_PER_FILE) * layout.block_size;
                assert!(layout.max_inodes * per_file <= data_end);
                assert!(data_end <= device_size);
            }
        }
    }

    #[test]
    fn too_small_devices() {
        // 逻辑块放不下 inode 记录
        assert_eq!(Err(Error::BadLayout), Layout::compute(MIB, 64));
        // inode 区域不够扣除保留块
        assert_eq!(Err(Error::BadLayout), Layout::compute(4 * 17 * 1024 - 1, 512));
    }

    #[test]
    fn super_block_round_trip() {
        let mut layout = Layout::compute(MIB, 512).unwrap();
        layout.usage = 5 * 1024;

        let sb = layout.to_super_block();
        assert!(sb.is_valid());
        assert_eq!(Ok(layout), Layout::restore(&sb, MIB, 512));
        assert!(!SuperBlock::zeroed().is_valid());

        // 同一个超级块搬到 I/O 单位过小的设备上
        assert_eq!(Err(Error::BadLayout), Layout::restore(&sb, MIB, 64));
    }

    #[test]
    fn positions_are_bounds_checked() {
        let layout = Layout::compute(MIB, 512).unwrap();

        assert_eq!(Ok(layout.inodes.offset + 2 * 1024), layout.inode_pos(2));
        assert_eq!(Ok(layout.data.offset), layout.data_pos(0));
        assert_eq!(Err(Error::InvariantViolation), layout.inode_pos(60));
        assert_eq!(
            Err(Error::InvariantViolation),
            layout.data_pos(layout.data.blocks as u32)
        );
    }
}
