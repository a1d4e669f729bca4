//! inode 的磁盘形式。
//!
//! 只有直接索引：[`DATA_PER_FILE`] 个块编号，未分配的槽位为 [`UNASSIGNED`]。
//! 目录的数据块存放子项的 [`DiskDirEntry`](super::DiskDirEntry)；
//! 普通文件的数据块存放文件内容；符号链接不占数据块，目标路径就在记录里。

use vfs::DirEntryType;

use super::{Record, UNASSIGNED, decode_kind, encode_kind, fill_name, read_name};
use crate::{DATA_PER_FILE, NAME_MAX_LEN, Result};

#[derive(Debug, Clone)]
#[repr(C)]
pub struct DiskInode {
    /// 在 inode 位图中的下标
    pub ino: u32,
    /// 普通文件与符号链接为字节数，目录为子项数 × 目录项大小
    pub size: u32,
    /// 符号链接的目标路径
    target: [u8; NAME_MAX_LEN],
    /// 目录的子项个数
    pub dir_cnt: u32,
    kind: u32,
    /// 数据块号的直接索引
    blocks: [u32; DATA_PER_FILE],
}

unsafe impl Record for DiskInode {}

impl DiskInode {
    pub fn new(ino: u32, kind: DirEntryType) -> Self {
        let mut inode = Self::zeroed();
        inode.ino = ino;
        inode.kind = encode_kind(kind);
        inode.blocks = [UNASSIGNED; DATA_PER_FILE];
        inode
    }

    #[inline]
    pub fn kind(&self) -> Result<DirEntryType> {
        decode_kind(self.kind)
    }

    #[inline]
    pub fn target(&self) -> Result<&str> {
        read_name(&self.target)
    }

    #[inline]
    pub fn set_target(&mut self, target: &str) {
        fill_name(&mut self.target, target);
    }

    /// 直接索引，未分配的槽位为 `None`
    pub fn blocks(&self) -> [Option<u32>; DATA_PER_FILE] {
        self.blocks.map(|block| (block != UNASSIGNED).then_some(block))
    }

    pub fn set_blocks(&mut self, blocks: &[Option<u32>; DATA_PER_FILE]) {
        self.blocks = blocks.map(|block| block.unwrap_or(UNASSIGNED));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_inode_has_no_blocks() {
        let inode = DiskInode::new(3, DirEntryType::Directory);
        assert_eq!(3, inode.ino);
        assert_eq!(DirEntryType::Directory, inode.kind().unwrap());
        assert!(inode.blocks().iter().all(Option::is_none));
        assert_eq!("", inode.target().unwrap());
    }

    #[test]
    fn blocks_survive_bytes() {
        let mut inode = DiskInode::new(1, DirEntryType::SymLink);
        let mut blocks = [None; DATA_PER_FILE];
        blocks[0] = Some(0);
        blocks[3] = Some(42);
        inode.set_blocks(&blocks);
        inode.set_target("/x/y");

        let copy = DiskInode::from_bytes(inode.as_bytes());
        assert_eq!(blocks, copy.blocks());
        assert_eq!("/x/y", copy.target().unwrap());
    }
}
