//! # 会话层
//!
//! 与外部框架的回调一一对应。整个文件系统只在一把锁后面，
//! 每个回调在整个执行期间持有它，回调之间因此天然串行。

use alloc::string::String;
use alloc::sync::Arc;

use block_dev::BlockDevice;
use spin::Mutex;
use vfs::{DirEntry, DirEntryType, Error, Stat};

use crate::Result;
use crate::lfs::{LazyFileSystem, MountOptions};

/// `st_mode` 中的类型位掩码
const S_IFMT: u32 = 0o170000;

pub struct Session {
    options: MountOptions,
    fs: Mutex<Option<LazyFileSystem>>,
}

impl Session {
    pub const fn new(options: MountOptions) -> Self {
        Self {
            options,
            fs: Mutex::new(None),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.fs.lock().is_some()
    }

    /// 挂载；已经挂载时拒绝
    pub fn init(&self, device: Arc<dyn BlockDevice>) -> Result<()> {
        let mut fs = self.fs.lock();
        if fs.is_some() {
            log::warn!("init called on a mounted session");
            return Err(Error::Unsupported);
        }

        *fs = Some(LazyFileSystem::mount(device, self.options)?);
        Ok(())
    }

    /// 卸载；未挂载时什么也不做
    pub fn destroy(&self) -> Result<()> {
        match self.fs.lock().take() {
            Some(fs) => fs.unmount(),
            None => Ok(()),
        }
    }

    pub fn getattr(&self, path: &str) -> Result<Stat> {
        self.with(|fs| fs.get_attributes(path))
    }

    pub fn readdir(&self, path: &str, offset: usize) -> Result<Option<DirEntry>> {
        self.with(|fs| fs.list_directory(path, offset))
    }

    pub fn mkdir(&self, path: &str) -> Result<()> {
        self.with(|fs| fs.make_directory(path))
    }

    /// 只看 `mode` 的类型位：目录类型创建空目录，其余一律是普通文件
    pub fn mknod(&self, path: &str, mode: u32) -> Result<()> {
        let kind = if mode & S_IFMT == DirEntryType::Directory.mode_bits() {
            DirEntryType::Directory
        } else {
            DirEntryType::Regular
        };
        self.with(|fs| fs.make_file(path, kind))
    }

    pub fn symlink(&self, target: &str, path: &str) -> Result<()> {
        self.with(|fs| fs.make_symlink(path, target))
    }

    pub fn readlink(&self, path: &str) -> Result<String> {
        self.with(|fs| fs.read_link(path))
    }

    pub fn utimens(&self, path: &str) -> Result<()> {
        self.with(|fs| fs.touch(path))
    }

    pub fn flush(&self) -> Result<()> {
        self.with(LazyFileSystem::flush)
    }

    fn with<T>(&self, f: impl FnOnce(&mut LazyFileSystem) -> Result<T>) -> Result<T> {
        let mut fs = self.fs.lock();
        f(fs.as_mut().ok_or(Error::NotMounted)?)
    }
}
