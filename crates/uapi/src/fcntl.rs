//! 文件打开标志与 seek 方式

use bitflags::bitflags;

use crate::errno::EINVAL;

bitflags! {
    /// open(2) 标志位
    ///
    /// 低两位为访问模式（O_RDONLY / O_WRONLY / O_RDWR），需通过
    /// [`OpenFlags::readable`] / [`OpenFlags::writable`] 判断，不能直接 `contains`。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        const O_RDONLY = 0o0;
        const O_WRONLY = 0o1;
        const O_RDWR = 0o2;
        const O_ACCMODE = 0o3;
        const O_CREAT = 0o100;
        const O_EXCL = 0o200;
        const O_TRUNC = 0o1000;
        const O_APPEND = 0o2000;
        const O_NONBLOCK = 0o4000;
        const O_CLOEXEC = 0o2000000;
    }
}

impl OpenFlags {
    /// 访问模式位
    pub fn accmode(&self) -> u32 {
        self.bits() & Self::O_ACCMODE.bits()
    }

    /// 是否以可读方式打开
    pub fn readable(&self) -> bool {
        matches!(self.accmode(), 0o0 | 0o2)
    }

    /// 是否以可写方式打开
    pub fn writable(&self) -> bool {
        matches!(self.accmode(), 0o1 | 0o2)
    }
}

/// lseek(2) 的 whence 参数
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekWhence {
    /// SEEK_SET：相对设备起始
    Set = 0,
    /// SEEK_CUR：相对当前偏移
    Cur = 1,
    /// SEEK_END：相对设备末尾
    End = 2,
}

impl TryFrom<usize> for SeekWhence {
    type Error = i32;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SeekWhence::Set),
            1 => Ok(SeekWhence::Cur),
            2 => Ok(SeekWhence::End),
            _ => Err(EINVAL),
        }
    }
}
