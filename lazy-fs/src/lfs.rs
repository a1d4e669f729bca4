//! # 磁盘块管理器层
//!
//! 挂载时读出（或估算并写入）磁盘布局，持有两张位图与内存目录树；
//! 卸载时把整棵已物化的子树连同元数据写回。
//!
//! [`LazyFileSystem`] 只在挂载期间存在，卸载会消耗它，
//! 因此不存在“未挂载时调用”的状态。

use alloc::sync::Arc;
use alloc::vec;

use block_dev::BlockDevice;
use vfs::{DirEntryType, Error};

use crate::block_io::BlockIo;
use crate::layout::{Bitmap, Layout, SuperBlock};
use crate::tree::{Dentry, DentryId, Inode, InodeId, Tree};
use crate::{ROOT_INO, Result, SUPER_OFFSET};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MountOptions {
    pub preload: Preload,
}

/// 挂载时预先物化的范围
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Preload {
    /// 物化整棵目录树
    #[default]
    Tree,
    /// 只物化根目录，其余交给路径解析按需物化
    Root,
}

pub struct LazyFileSystem {
    pub(crate) io: BlockIo,
    pub(crate) layout: Layout,
    pub(crate) inode_bitmap: Bitmap,
    pub(crate) data_bitmap: Bitmap,
    pub(crate) tree: Tree,
    /// 根目录的 dentry，挂载后一定已物化
    pub(crate) root: DentryId,
}

impl LazyFileSystem {
    pub fn mount(device: Arc<dyn BlockDevice>, options: MountOptions) -> Result<Self> {
        let io = BlockIo::new(device);
        let device_size = io.device_size();
        let io_size = io.io_size();

        let super_block: SuperBlock = io.read_record(SUPER_OFFSET)?;
        let fresh = !super_block.is_valid();

        let (layout, inode_bitmap, data_bitmap) = if fresh {
            log::info!("no filesystem found, formatting {device_size}B with I/O unit {io_size}B");
            let layout = Layout::compute(device_size, io_size)?;
            let inode_bitmap =
                Bitmap::new(layout.inode_map, layout.block_size, layout.inode_capacity());
            let data_bitmap =
                Bitmap::new(layout.data_map, layout.block_size, layout.data_capacity());
            (layout, inode_bitmap, data_bitmap)
        } else {
            let layout = Layout::restore(&super_block, device_size, io_size)?;
            let inode_bitmap = Bitmap::load(
                &io,
                layout.inode_map,
                layout.block_size,
                layout.inode_capacity(),
            )?;
            let data_bitmap = Bitmap::load(
                &io,
                layout.data_map,
                layout.block_size,
                layout.data_capacity(),
            )?;
            (layout, inode_bitmap, data_bitmap)
        };

        let mut tree = Tree::new();
        let root = tree.add_dentry(Dentry::new("/", DirEntryType::Directory, ROOT_INO));

        let mut fs = Self {
            io,
            layout,
            inode_bitmap,
            data_bitmap,
            tree,
            root,
        };

        if fresh {
            fs.format_root()?;
        }
        match options.preload {
            Preload::Tree => fs.load_subtree(root)?,
            Preload::Root => {
                fs.materialize(root)?;
            }
        }

        log::info!(
            "mounted: {} inodes at most, {}B per file, {}B in use",
            fs.layout.max_inodes,
            fs.layout.max_file_size,
            fs.layout.usage,
        );
        Ok(fs)
    }

    /// 写回后释放所有内存结构
    pub fn unmount(mut self) -> Result<()> {
        self.flush()?;
        log::info!("unmounted");
        Ok(())
    }

    /// 写回整棵已物化的子树、两张位图与超级块，但不卸载
    pub fn flush(&mut self) -> Result<()> {
        let root = self.root_inode()?;
        self.sync_inode(root)?;
        self.store_metadata()
    }

    /// 根目录必须拿到 0 号 inode 和一个数据块，并立即落盘，
    /// 之后才写入带魔数的超级块
    fn format_root(&mut self) -> Result<()> {
        let ino = self.alloc_ino()?;
        if ino != ROOT_INO {
            log::warn!("root got inode {ino} on a fresh bitmap");
            return Err(Error::InvariantViolation);
        }

        let root = self.tree.add_inode(Inode::new(ino, self.root));
        self.alloc_data_block(root)?;
        self.sync_inode(root)?;
        self.store_metadata()
    }

    fn store_metadata(&self) -> Result<()> {
        self.inode_bitmap.store(&self.io)?;
        self.data_bitmap.store(&self.io)?;
        self.io.write_record(SUPER_OFFSET, &self.layout.to_super_block())
    }

    /// 在 inode 位图中分配一个槽位
    pub(crate) fn alloc_ino(&mut self) -> Result<u32> {
        let ino = self.inode_bitmap.alloc()?;
        self.layout.usage += self.layout.block_size;
        log::debug!("allocated inode {ino}");
        Ok(ino)
    }

    /// 分配一个数据块，并记到 inode 第一个空闲的直接索引上
    pub(crate) fn alloc_data_block(&mut self, inode: InodeId) -> Result<u32> {
        let Some(slot) = self.tree.inode(inode).blocks.iter().position(Option::is_none) else {
            log::debug!("inode {} has no free direct slot", self.tree.inode(inode).ino);
            return Err(Error::NoSpace);
        };
        let block = self.data_bitmap.alloc()?;
        let block_size = self.layout.block_size;
        let is_regular = self.tree.kind_of(inode) == DirEntryType::Regular;

        let node = self.tree.inode_mut(inode);
        node.blocks[slot] = Some(block);
        if is_regular {
            node.data[slot] = Some(vec![0; block_size].into_boxed_slice());
        }
        self.layout.usage += block_size;

        log::debug!("allocated data block {block} for inode {}", node.ino);
        Ok(block)
    }

    pub(crate) fn root_inode(&self) -> Result<InodeId> {
        self.tree
            .dentry(self.root)
            .inode
            .ok_or(Error::InvariantViolation)
    }

    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    #[inline]
    pub fn root(&self) -> DentryId {
        self.root
    }

    #[inline]
    pub fn inode_bitmap(&self) -> &Bitmap {
        &self.inode_bitmap
    }

    #[inline]
    pub fn data_bitmap(&self) -> &Bitmap {
        &self.data_bitmap
    }
}
