use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// 路径或其中某一段不存在
    NotFound,
    AlreadyExists,
    /// 经由非目录向下解析，或本文件系统未实现的操作
    Unsupported,
    /// 位图耗尽，或 inode 的直接索引已满
    NoSpace,
    /// 底层设备读写失败
    Io,
    /// 内存结构与磁盘结构对不上，继续操作只会扩大损坏
    InvariantViolation,
    /// 不是绝对路径，或包含空的路径段
    InvalidPath,
    NameTooLong,
    /// 设备太小，或 I/O 单位放不下固定大小的磁盘记录
    BadLayout,
    /// 会话中没有已挂载的文件系统
    NotMounted,
}

impl Error {
    /// 交给 FUSE 一类前端的 errno（正值）
    pub const fn errno(self) -> i32 {
        match self {
            Self::NotFound => 2,                         // ENOENT
            Self::Io | Self::InvariantViolation => 5,    // EIO
            Self::Unsupported => 6,                      // ENXIO
            Self::AlreadyExists => 17,                   // EEXIST
            Self::NotMounted => 19,                      // ENODEV
            Self::InvalidPath | Self::BadLayout => 22,   // EINVAL
            Self::NoSpace => 28,                         // ENOSPC
            Self::NameTooLong => 36,                     // ENAMETOOLONG
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NotFound => "no such file or directory",
            Self::AlreadyExists => "file exists",
            Self::Unsupported => "operation not supported here",
            Self::NoSpace => "no space left on device",
            Self::Io => "input/output error",
            Self::InvariantViolation => "filesystem structure is inconsistent",
            Self::InvalidPath => "invalid path",
            Self::NameTooLong => "file name too long",
            Self::BadLayout => "device cannot hold this filesystem layout",
            Self::NotMounted => "filesystem is not mounted",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for Error {}
