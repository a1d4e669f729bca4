//! # 命名空间层
//!
//! 面向外部框架的操作：路径解析、创建目录/文件/符号链接、查询属性、列目录。
//! 所有路径都必须是以 `/` 开头的绝对路径。

use alloc::string::String;

use enumflags2::BitFlags;
use vfs::{DirEntry, DirEntryType, Error, Stat};

use crate::lfs::LazyFileSystem;
use crate::path::Path;
use crate::tree::{Dentry, DentryId, Inode, InodeId};
use crate::{NAME_MAX_LEN, Result};

/// 路径解析的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    /// 解析到的最深的 dentry，其 inode 一定已物化
    pub dentry: DentryId,
    /// 是否解析完了整条路径
    pub found: bool,
    pub is_root: bool,
}

impl LazyFileSystem {
    /// 从根目录开始逐段解析路径，沿途按需物化。
    ///
    /// 某一段不存在，或者经过了非目录，就停在最后到达的 dentry 上，`found` 为假。
    pub fn lookup(&mut self, path: &str) -> Result<Lookup> {
        if !path.is_absolute() {
            return Err(Error::InvalidPath);
        }

        let mut cursor = self.root;
        let mut found = true;
        for name in path.components() {
            let inode = self.materialize(cursor)?;
            if !self.tree.kind_of(inode).is_dir() {
                found = false;
                break;
            }

            match self.tree.find_child(inode, name) {
                Some(child) => cursor = child,
                None => {
                    log::debug!("{path}: no entry named {name:?}");
                    found = false;
                    break;
                }
            }
        }

        self.materialize(cursor)?;
        Ok(Lookup {
            dentry: cursor,
            found,
            is_root: found && cursor == self.root,
        })
    }

    /// 创建目录，并分配其第一个数据块
    pub fn make_directory(&mut self, path: &str) -> Result<()> {
        self.create(path, DirEntryType::Directory, |fs, inode| {
            fs.alloc_data_block(inode).map(drop)
        })
    }

    /// 创建普通文件；类型为目录时创建不带数据块的空目录，
    /// 第一个子项加入时才会分配
    pub fn make_file(&mut self, path: &str, kind: DirEntryType) -> Result<()> {
        let kind = match kind {
            DirEntryType::Directory => DirEntryType::Directory,
            _ => DirEntryType::Regular,
        };
        self.create(path, kind, |_, _| Ok(()))
    }

    /// 创建指向 `target` 的符号链接，目标路径直接存在 inode 里
    pub fn make_symlink(&mut self, path: &str, target: &str) -> Result<()> {
        if target.is_empty() || target.contains('\0') {
            return Err(Error::InvalidPath);
        }
        if target.len() >= NAME_MAX_LEN {
            return Err(Error::NameTooLong);
        }

        self.create(path, DirEntryType::SymLink, |fs, inode| {
            let node = fs.tree.inode_mut(inode);
            node.target = target.into();
            node.size = target.len();
            Ok(())
        })
    }

    pub fn read_link(&mut self, path: &str) -> Result<String> {
        let inode = self.resolve(path)?;
        if self.tree.kind_of(inode) != DirEntryType::SymLink {
            return Err(Error::Unsupported);
        }
        Ok(self.tree.inode(inode).target.clone())
    }

    pub fn get_attributes(&mut self, path: &str) -> Result<Stat> {
        let Lookup {
            dentry,
            found,
            is_root,
        } = self.lookup(path)?;
        if !found {
            return Err(Error::NotFound);
        }

        let inode = self.materialize(dentry)?;
        let node = self.tree.inode(inode);
        let mut stat = Stat {
            inode: u64::from(node.ino),
            mode: self.tree.kind_of(inode),
            perm: BitFlags::all(),
            nlink: 1,
            block_size: self.layout.block_size as u64,
            blocks: node.assigned_blocks() as u64,
            size: node.size as u64,
        };
        // 根目录报告整个设备的使用情况
        if is_root {
            stat.nlink = 2;
            stat.size = self.layout.usage as u64;
            stat.blocks = (self.layout.device_size / self.layout.block_size) as u64;
        }

        Ok(stat)
    }

    /// 按当前子项链表顺序取第 `index` 个子项，越界时返回 `None`
    pub fn list_directory(&mut self, path: &str, index: usize) -> Result<Option<DirEntry>> {
        let dir = self.resolve(path)?;
        if !self.tree.kind_of(dir).is_dir() {
            return Err(Error::Unsupported);
        }

        Ok(self.tree.nth_child(dir, index).map(|child| {
            let child = self.tree.dentry(child);
            DirEntry {
                inode: u64::from(child.ino),
                ty: child.kind,
                name: child.name.clone(),
            }
        }))
    }

    /// 不保存时间戳，接受即可
    pub fn touch(&mut self, _path: &str) -> Result<()> {
        Ok(())
    }

    /// 解析完整路径，找不到时报 [`Error::NotFound`]
    fn resolve(&mut self, path: &str) -> Result<InodeId> {
        let lookup = self.lookup(path)?;
        if !lookup.found {
            return Err(Error::NotFound);
        }
        self.materialize(lookup.dentry)
    }

    /// 创建的公共部分：校验父目录与名字，保证父目录放得下新目录项，
    /// 分配 inode，由 `init` 补全新 inode，最后挂进父目录
    fn create(
        &mut self,
        path: &str,
        kind: DirEntryType,
        init: impl FnOnce(&mut Self, InodeId) -> Result<()>,
    ) -> Result<()> {
        if !path.is_absolute() {
            return Err(Error::InvalidPath);
        }
        let Some((parent, name)) = path.parent_file() else {
            return Err(Error::AlreadyExists);
        };
        // 磁盘上的名字以 \0 结尾
        if name.is_empty() || name.contains('\0') {
            return Err(Error::InvalidPath);
        }
        if name.len() >= NAME_MAX_LEN {
            return Err(Error::NameTooLong);
        }

        let Lookup { dentry, found, .. } = self.lookup(parent)?;
        let dir = self.materialize(dentry)?;
        if !self.tree.kind_of(dir).is_dir() {
            // 祖先中有非目录
            return Err(Error::Unsupported);
        }
        if !found {
            return Err(Error::NotFound);
        }
        if self.tree.find_child(dir, name).is_some() {
            return Err(Error::AlreadyExists);
        }

        self.ensure_room(dir)?;

        let ino = self.alloc_ino()?;
        let child = self.tree.add_dentry(Dentry::new(name, kind, ino));
        let inode = self.tree.add_inode(Inode::new(ino, child));
        init(self, inode)?;
        self.tree.link(dir, child);

        log::debug!("created {path} ({kind:?}) as inode {ino}");
        Ok(())
    }

    /// 再加一个目录项会溢出已分配的块时，先给目录分配新块
    fn ensure_room(&mut self, dir: InodeId) -> Result<()> {
        let node = self.tree.inode(dir);
        let capacity = node.assigned_blocks() * self.layout.entries_per_block();
        if node.dir_cnt < capacity {
            return Ok(());
        }
        self.alloc_data_block(dir).map(drop)
    }
}
