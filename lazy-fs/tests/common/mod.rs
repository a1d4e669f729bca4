//! 集成测试共用的工具

#![allow(dead_code)]

use std::sync::Arc;

use block_dev::RamDisk;
use lazy_fs::{LazyFileSystem, MountOptions, Preload};
use vfs::DirEntryType;

pub const MIB: usize = 1024 * 1024;

/// 1 MiB、I/O 单位 512 字节的空设备
pub fn disk() -> Arc<RamDisk> {
    sized_disk(MIB)
}

pub fn sized_disk(size: usize) -> Arc<RamDisk> {
    Arc::new(RamDisk::new(size, 512))
}

pub fn mount(disk: &Arc<RamDisk>, preload: Preload) -> LazyFileSystem {
    LazyFileSystem::mount(disk.clone(), MountOptions { preload }).unwrap()
}

/// 树中一个节点的形状：(路径, 类型, inode 号, 子项数)
pub type Node = (String, DirEntryType, u64, usize);

/// 只借助对外接口遍历整棵树，按路径排序，与子项链表的顺序无关
pub fn shape(fs: &mut LazyFileSystem) -> Vec<Node> {
    let mut nodes = Vec::new();
    walk(fs, "/", &mut nodes);
    nodes.sort_by(|a, b| a.0.cmp(&b.0));
    nodes
}

fn walk(fs: &mut LazyFileSystem, path: &str, nodes: &mut Vec<Node>) {
    let stat = fs.get_attributes(path).unwrap();

    let mut children = Vec::new();
    if stat.mode.is_dir() {
        while let Some(entry) = fs.list_directory(path, children.len()).unwrap() {
            children.push(entry);
        }
    }
    nodes.push((path.to_owned(), stat.mode, stat.inode, children.len()));

    for child in children {
        let child_path = if path == "/" {
            format!("/{}", child.name)
        } else {
            format!("{path}/{}", child.name)
        };
        walk(fs, &child_path, nodes);
    }
}

/// 按顺序列出目录的全部子项名
pub fn names(fs: &mut LazyFileSystem, path: &str) -> Vec<String> {
    let mut names = Vec::new();
    while let Some(entry) = fs.list_directory(path, names.len()).unwrap() {
        names.push(entry.name);
    }
    names
}
