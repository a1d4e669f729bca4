use vfs::DirEntryType;

use super::{Record, decode_kind, encode_kind, fill_name, read_name};
use crate::{NAME_MAX_LEN, Result};

/// 目录项的磁盘形式，紧密排列在目录的数据块中
#[derive(Debug, Clone)]
#[repr(C)]
pub struct DiskDirEntry {
    // 最后一字节留给 \0
    name: [u8; NAME_MAX_LEN],
    kind: u32,
    ino: u32,
}

unsafe impl Record for DiskDirEntry {}

impl DiskDirEntry {
    #[inline]
    pub fn new(name: &str, kind: DirEntryType, ino: u32) -> Self {
        let mut entry = Self::zeroed();
        fill_name(&mut entry.name, name);
        entry.kind = encode_kind(kind);
        entry.ino = ino;
        entry
    }

    #[inline]
    pub fn name(&self) -> Result<&str> {
        read_name(&self.name)
    }

    #[inline]
    pub fn kind(&self) -> Result<DirEntryType> {
        decode_kind(self.kind)
    }

    #[inline]
    pub fn ino(&self) -> u32 {
        self.ino
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_name_keeps_terminator() {
        let name = "n".repeat(NAME_MAX_LEN - 1);
        let entry = DiskDirEntry::new(&name, DirEntryType::Regular, 9);
        let bytes = entry.as_bytes();

        assert_eq!(0, bytes[NAME_MAX_LEN - 1]);
        let copy = DiskDirEntry::from_bytes(bytes);
        assert_eq!(name, copy.name().unwrap());
        assert_eq!(9, copy.ino());
    }

    #[test]
    fn garbage_name_is_rejected() {
        let mut raw = [0u8; DiskDirEntry::SIZE];
        raw[0] = 0xFF;
        raw[1] = 0xFE;
        assert!(DiskDirEntry::from_bytes(&raw).name().is_err());
    }
}
