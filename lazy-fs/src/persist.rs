//! # 持久化层
//!
//! 内存目录树与磁盘之间的递归读写：
//! - 物化：读 inode 记录；目录再按直接索引顺序读出子项记录，逐个头插进子项链表；
//!   普通文件把每个已分配数据块整块读入内存；
//! - 同步：写 inode 记录；目录把子项记录依次填进已分配的数据块，
//!   一个块放满了就换下一个块，记录不跨块，然后递归同步已物化的子项；
//!   未物化的子树在磁盘上本来就是最新的，直接跳过。

use alloc::vec;
use alloc::vec::Vec;

use vfs::{DirEntryType, Error};

use crate::Result;
use crate::layout::{DiskDirEntry, DiskInode, Record};
use crate::lfs::LazyFileSystem;
use crate::tree::{Dentry, DentryId, Inode, InodeId};

impl LazyFileSystem {
    /// 物化 dentry 对应的 inode，已物化时直接返回
    pub(crate) fn materialize(&mut self, dentry: DentryId) -> Result<InodeId> {
        match self.tree.dentry(dentry).inode {
            Some(inode) => Ok(inode),
            None => self.read_inode(dentry),
        }
    }

    /// 物化以 `dentry` 为根的整棵子树
    pub(crate) fn load_subtree(&mut self, dentry: DentryId) -> Result<()> {
        let inode = self.materialize(dentry)?;
        if !self.tree.kind_of(inode).is_dir() {
            return Ok(());
        }

        let children: Vec<_> = self.tree.children(inode).collect();
        for child in children {
            self.load_subtree(child)?;
        }
        Ok(())
    }

    fn read_inode(&mut self, dentry: DentryId) -> Result<InodeId> {
        let (ino, kind) = {
            let dentry = self.tree.dentry(dentry);
            (dentry.ino, dentry.kind)
        };

        let disk: DiskInode = self.io.read_record(self.layout.inode_pos(ino)?)?;
        if disk.ino != ino || disk.kind()? != kind {
            log::warn!(
                "dentry names inode {ino} ({kind:?}) but slot holds inode {} ({:?})",
                disk.ino,
                disk.kind()?,
            );
            return Err(Error::InvariantViolation);
        }

        let mut inode = Inode::new(ino, dentry);
        inode.size = disk.size as usize;
        inode.blocks = disk.blocks();
        match kind {
            DirEntryType::SymLink => inode.target = disk.target()?.into(),
            DirEntryType::Regular => {
                for (block, data) in inode.blocks.iter().zip(&mut inode.data) {
                    let Some(block) = *block else {
                        continue;
                    };
                    let mut buf = vec![0; self.layout.block_size];
                    self.io.read(self.layout.data_pos(block)?, &mut buf)?;
                    *data = Some(buf.into_boxed_slice());
                }
            }
            DirEntryType::Directory => {}
        }

        let id = self.tree.add_inode(inode);
        if kind.is_dir() {
            self.read_entries(id, disk.dir_cnt as usize)?;
        }

        log::trace!("materialized inode {ino}");
        Ok(id)
    }

    /// 目录的子项数以磁盘上的记录为准，读够就停
    fn read_entries(&mut self, dir: InodeId, count: usize) -> Result<()> {
        let per_block = self.layout.entries_per_block();
        let blocks = self.tree.inode(dir).blocks;
        let mut buf = vec![0; self.layout.block_size];
        let mut remaining = count;

        for block in blocks.into_iter().flatten() {
            if remaining == 0 {
                break;
            }
            self.io.read(self.layout.data_pos(block)?, &mut buf)?;

            let take = remaining.min(per_block);
            for record in buf.chunks_exact(DiskDirEntry::SIZE).take(take) {
                let entry = DiskDirEntry::from_bytes(record);
                let child = Dentry::new(entry.name()?, entry.kind()?, entry.ino());
                log::trace!("read entry {:?} -> inode {}", child.name, child.ino);

                let child = self.tree.add_dentry(child);
                self.tree.link(dir, child);
            }
            remaining -= take;
        }

        if remaining != 0 {
            log::warn!(
                "inode {} lists {remaining} more entries than its blocks hold",
                self.tree.inode(dir).ino
            );
            return Err(Error::InvariantViolation);
        }
        Ok(())
    }

    /// 递归写回 inode 及其已物化的后代
    pub(crate) fn sync_inode(&self, inode: InodeId) -> Result<()> {
        let node = self.tree.inode(inode);
        let kind = self.tree.kind_of(inode);

        let mut disk = DiskInode::new(node.ino, kind);
        disk.size = node.size as u32;
        disk.dir_cnt = node.dir_cnt as u32;
        disk.set_target(&node.target);
        disk.set_blocks(&node.blocks);
        self.io.write_record(self.layout.inode_pos(node.ino)?, &disk)?;
        log::trace!("synced inode {}", node.ino);

        match kind {
            DirEntryType::Directory => self.sync_entries(inode),
            DirEntryType::Regular => {
                for (block, data) in node.blocks.iter().zip(&node.data) {
                    if let (Some(block), Some(data)) = (block, data) {
                        self.io.write(self.layout.data_pos(*block)?, data)?;
                    }
                }
                Ok(())
            }
            DirEntryType::SymLink => Ok(()),
        }
    }

    fn sync_entries(&self, dir: InodeId) -> Result<()> {
        let node = self.tree.inode(dir);
        let children: Vec<_> = self.tree.children(dir).collect();
        let mut chunks = children.chunks(self.layout.entries_per_block());

        for block in node.blocks.iter().flatten() {
            let Some(chunk) = chunks.next() else {
                break;
            };

            // 块尾放不下一条记录的部分留空
            let mut payload = vec![0; self.layout.block_size];
            for (record, &child) in payload.chunks_exact_mut(DiskDirEntry::SIZE).zip(chunk) {
                let child = self.tree.dentry(child);
                let entry = DiskDirEntry::new(&child.name, child.kind, child.ino);
                record.copy_from_slice(entry.as_bytes());
            }
            self.io.write(self.layout.data_pos(*block)?, &payload)?;
        }

        if chunks.next().is_some() {
            log::warn!(
                "directory inode {} has {} entries but only {} blocks",
                node.ino,
                node.dir_cnt,
                node.assigned_blocks()
            );
            return Err(Error::InvariantViolation);
        }

        for child in children {
            if let Some(inode) = self.tree.dentry(child).inode {
                self.sync_inode(inode)?;
            }
        }
        Ok(())
    }
}
