//! Linux 兼容错误码（正数）
//!
//! 系统调用边界上以负数返回，例如 `-EPERM`。

pub const EPERM: i32 = 1;
pub const ENXIO: i32 = 6;
pub const ENOMEM: i32 = 12;
pub const EFAULT: i32 = 14;
pub const EBUSY: i32 = 16;
pub const ENODEV: i32 = 19;
pub const EINVAL: i32 = 22;
