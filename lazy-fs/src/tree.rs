//! # 内存目录树
//!
//! dentry 与 inode 分别放在两个竞技场里，彼此用下标引用：
//! - dentry 记录名字、类型、inode 号与父目录，一定存在；
//! - inode 只有在物化之后才存在，目录的子项链表挂在 inode 上。
//!
//! 子项链表是单链表，新子项插在表头，因此遍历顺序与插入顺序相反。

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use derive_more::{From, Into};
use vfs::DirEntryType;

use crate::DATA_PER_FILE;
use crate::layout::DiskDirEntry;
use crate::layout::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From, Into)]
pub struct DentryId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From, Into)]
pub struct InodeId(usize);

#[derive(Debug, Clone)]
pub struct Dentry {
    pub name: String,
    pub kind: DirEntryType,
    pub ino: u32,
    /// 根目录的父目录为 `None`
    pub parent: Option<DentryId>,
    /// 同一目录下的下一个子项
    pub sibling: Option<DentryId>,
    /// 物化之后才有
    pub inode: Option<InodeId>,
}

impl Dentry {
    pub fn new(name: impl Into<String>, kind: DirEntryType, ino: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            ino,
            parent: None,
            sibling: None,
            inode: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Inode {
    pub ino: u32,
    /// 普通文件与符号链接为字节数，目录为子项数 × 目录项大小
    pub size: usize,
    /// 符号链接的目标路径
    pub target: String,
    /// 目录的子项个数
    pub dir_cnt: usize,
    /// 反向指向自己的 dentry
    pub dentry: DentryId,
    /// 目录子项链表的表头
    pub children: Option<DentryId>,
    /// 数据块号的直接索引
    pub blocks: [Option<u32>; DATA_PER_FILE],
    /// 普通文件每个已分配数据块的内容
    pub data: [Option<Box<[u8]>>; DATA_PER_FILE],
}

impl Inode {
    pub fn new(ino: u32, dentry: DentryId) -> Self {
        Self {
            ino,
            size: 0,
            target: String::new(),
            dir_cnt: 0,
            dentry,
            children: None,
            blocks: [None; DATA_PER_FILE],
            data: Default::default(),
        }
    }

    /// 已分配的数据块个数
    #[inline]
    pub fn assigned_blocks(&self) -> usize {
        self.blocks.iter().flatten().count()
    }
}

#[derive(Debug, Default)]
pub struct Tree {
    dentries: Vec<Dentry>,
    inodes: Vec<Inode>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dentry(&mut self, dentry: Dentry) -> DentryId {
        self.dentries.push(dentry);
        DentryId::from(self.dentries.len() - 1)
    }

    /// 挂上物化得到的 inode，并让 dentry 指向它
    pub fn add_inode(&mut self, inode: Inode) -> InodeId {
        let dentry = inode.dentry;
        self.inodes.push(inode);
        let id = InodeId::from(self.inodes.len() - 1);
        self.dentries[usize::from(dentry)].inode = Some(id);
        id
    }

    #[inline]
    pub fn dentry(&self, id: DentryId) -> &Dentry {
        &self.dentries[usize::from(id)]
    }

    #[inline]
    pub fn dentry_mut(&mut self, id: DentryId) -> &mut Dentry {
        &mut self.dentries[usize::from(id)]
    }

    #[inline]
    pub fn inode(&self, id: InodeId) -> &Inode {
        &self.inodes[usize::from(id)]
    }

    #[inline]
    pub fn inode_mut(&mut self, id: InodeId) -> &mut Inode {
        &mut self.inodes[usize::from(id)]
    }

    /// dentry 所属的类型
    #[inline]
    pub fn kind_of(&self, inode: InodeId) -> DirEntryType {
        self.dentry(self.inode(inode).dentry).kind
    }

    /// 把子项插到目录链表表头，并更新目录的子项数与大小
    pub fn link(&mut self, dir: InodeId, child: DentryId) {
        let parent = self.inode(dir).dentry;
        let head = self.inode(dir).children;

        let dentry = self.dentry_mut(child);
        dentry.parent = Some(parent);
        dentry.sibling = head;

        let dir = self.inode_mut(dir);
        dir.children = Some(child);
        dir.dir_cnt += 1;
        dir.size = dir.dir_cnt * DiskDirEntry::SIZE;
    }

    /// 按链表顺序（从表头开始）遍历目录的子项
    pub fn children(&self, dir: InodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.inode(dir).children,
        }
    }

    pub fn nth_child(&self, dir: InodeId, index: usize) -> Option<DentryId> {
        self.children(dir).nth(index)
    }

    /// 名字必须长度与内容完全一致
    pub fn find_child(&self, dir: InodeId, name: &str) -> Option<DentryId> {
        self.children(dir).find(|&id| self.dentry(id).name == name)
    }
}

pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<DentryId>,
}

impl Iterator for Children<'_> {
    type Item = DentryId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.dentry(current).sibling;
        Some(current)
    }
}
