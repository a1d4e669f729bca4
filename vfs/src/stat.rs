use enumflags2::BitFlags;

use crate::{DirEntryType, Perm};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    /// Inode number
    pub inode: u64,
    pub mode: DirEntryType,
    pub perm: BitFlags<Perm>,
    /// 硬链接数：根目录为2，其余为1
    pub nlink: u32,
    /// Optimal I/O block size
    pub block_size: u64,
    /// Occupying blocks
    pub blocks: u64,
    /// File size
    pub size: u64,
}

impl Stat {
    /// 拼出 `st_mode`：类型位 | 权限位
    #[inline]
    pub fn st_mode(&self) -> u32 {
        self.mode.mode_bits() | u32::from(self.perm.bits())
    }
}
