//! 错误类型
//!
//! 每个边界一个错误枚举，均可通过 `to_errno()` 转换为负数 errno。

use core::fmt;
use uapi::errno::{EBUSY, EFAULT, EINVAL, ENODEV, ENOMEM, ENXIO, EPERM};

/// 绑定失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindError {
    /// 驱动表中没有匹配项，描述符不归本驱动处理（不是故障）
    NotHandled,
    /// 无法分配设备缓冲区
    OutOfMemory,
    /// 标识空间已满
    NoFreeIdentity,
}

impl BindError {
    /// 转换为错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            BindError::NotHandled => -ENODEV as isize,
            BindError::OutOfMemory => -ENOMEM as isize,
            BindError::NoFreeIdentity => -EBUSY as isize,
        }
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::NotHandled => f.write_str("device not handled by this driver"),
            BindError::OutOfMemory => f.write_str("out of memory for device buffer"),
            BindError::NoFreeIdentity => f.write_str("no free device identity"),
        }
    }
}

/// 解绑失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnbindError {
    /// 该标识当前没有绑定任何实例
    NotBound,
}

impl UnbindError {
    /// 转换为错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            UnbindError::NotBound => -ENODEV as isize,
        }
    }
}

impl fmt::Display for UnbindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnbindError::NotBound => f.write_str("identity not bound"),
        }
    }
}

/// open/read/write/seek 的失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// 标识未绑定，或句柄指向的实例已被销毁
    NoSuchDevice,
    /// 访问模式与设备访问策略（或句柄打开方式）不符
    PermissionDenied,
    /// seek 目标超出 `[0, capacity]`，或 whence 非法
    InvalidOffset,
    /// 游标已在设备末尾，无法写入
    OutOfSpace,
    /// 调用方缓冲区不足以完成拷贝
    CopyFault,
}

impl AccessError {
    /// 转换为错误码（负数）
    ///
    /// `OutOfSpace` 沿用 -ENOMEM，与既有驱动行为一致。
    pub fn to_errno(&self) -> isize {
        match self {
            AccessError::NoSuchDevice => -ENXIO as isize,
            AccessError::PermissionDenied => -EPERM as isize,
            AccessError::InvalidOffset => -EINVAL as isize,
            AccessError::OutOfSpace => -ENOMEM as isize,
            AccessError::CopyFault => -EFAULT as isize,
        }
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            AccessError::NoSuchDevice => "no such device",
            AccessError::PermissionDenied => "permission denied",
            AccessError::InvalidOffset => "invalid offset",
            AccessError::OutOfSpace => "no space left on device",
            AccessError::CopyFault => "bad address",
        };
        f.write_str(msg)
    }
}
