
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Mutex;

use block_dev::{BlockDevice, IoError};
use lazy_fs::LazyFileSystem;
use vfs::DirEntryType;

/// 用宿主机上的普通文件模拟块设备
#[derive(Debug)]
pub struct BlockFile {
    file: Mutex<File>,
    /// 原生 I/O 单位
    io_size: usize,
    /// 打开时的文件大小，去掉不足一个 I/O 单位的尾部
    size: usize,
}

impl BlockFile {
    pub fn new(file: File, io_size: usize) -> io::Result<Self> {
        if io_size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "I/O unit must not be zero",
            ));
        }
        let size = file.metadata()?.len() as usize / io_size * io_size;

        Ok(Self {
            file: Mutex::new(file),
            io_size,
            size,
        })
    }

    /// 打开已有的镜像
    pub fn open(path: impl AsRef<Path>, io_size: usize) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Self::new(file, io_size)
    }

    /// 新建（或清空）一个 `size` 字节的全零镜像
    pub fn create(path: impl AsRef<Path>, size: u64, io_size: usize) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(size)?;
        Self::new(file, io_size)
    }

    fn seek_to(&self, block_id: usize, len: usize) -> Result<u64, IoError> {
        if len != self.io_size {
            return Err(IoError::Misaligned { len });
        }
        if block_id >= self.num_blocks() {
            return Err(IoError::OutOfRange { block_id });
        }
        Ok((block_id * self.io_size) as u64)
    }
}

impl BlockDevice for BlockFile {
    #[inline]
    fn block_size(&self) -> usize {
        self.io_size
    }

    #[inline]
    fn device_size(&self) -> usize {
        self.size
    }

    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), IoError> {
        let pos = self.seek_to(block_id, buf.len())?;
        let mut file = self.file.lock().map_err(|_| IoError::Device)?;
        file.seek(SeekFrom::Start(pos))
            .and_then(|_| file.read_exact(buf))
            .map_err(|err| host_error(block_id, err))
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), IoError> {
        let pos = self.seek_to(block_id, buf.len())?;
        let mut file = self.file.lock().map_err(|_| IoError::Device)?;
        file.seek(SeekFrom::Start(pos))
            .and_then(|_| file.write_all(buf))
            .map_err(|err| host_error(block_id, err))
    }
}

fn host_error(block_id: usize, err: io::Error) -> IoError {
    log::warn!("image block {block_id}: {err}");
    IoError::Device
}

/// 把宿主机目录的层级结构镜像到 `dest` 下：目录、空的普通文件与符号链接。
///
/// 文件内容不会写入；同名项已存在时报错。返回创建的项数。
pub fn pack(fs: &mut LazyFileSystem, source: &Path, dest: &str) -> io::Result<usize> {
    let mut entries = fs::read_dir(source)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut created = 0;
    for entry in entries {
        let name = entry.file_name().into_string().map_err(|name| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{name:?} is not valid UTF-8"),
            )
        })?;
        let path = if dest == "/" {
            format!("/{name}")
        } else {
            format!("{}/{name}", dest.trim_end_matches('/'))
        };

        let file_type = entry.file_type()?;
        if file_type.is_symlink() {
            let target = fs::read_link(entry.path())?;
            let target = target.to_str().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "symlink target is not UTF-8")
            })?;
            fs.make_symlink(&path, target).map_err(io::Error::other)?;
        } else if file_type.is_dir() {
            fs.make_directory(&path).map_err(io::Error::other)?;
            created += pack(fs, &entry.path(), &path)?;
        } else {
            fs.make_file(&path, DirEntryType::Regular)
                .map_err(io::Error::other)?;
        }

        log::info!("packed {path}");
        created += 1;
    }

    Ok(created)
}
