//! 设备描述符
//!
//! 描述符是设备在分配任何资源之前的静态描述：容量、访问策略、序列号和设备名。
//! 它由外部的设备提供方创建，对绑定引擎只读。

use alloc::string::String;
use uapi::fcntl::OpenFlags;

/// 设备访问策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessPolicy {
    /// 只读设备
    ReadOnly,
    /// 只写设备
    WriteOnly,
    /// 可读可写设备
    ReadWrite,
}

impl AccessPolicy {
    /// 平台数据中的只读权限编码
    pub const PERM_RDONLY: u32 = 0x1;
    /// 平台数据中的只写权限编码
    pub const PERM_WRONLY: u32 = 0x10;
    /// 平台数据中的读写权限编码
    pub const PERM_RDWR: u32 = 0x11;

    /// 从平台数据的权限编码解析
    pub fn from_raw(perm: u32) -> Option<Self> {
        match perm {
            Self::PERM_RDONLY => Some(AccessPolicy::ReadOnly),
            Self::PERM_WRONLY => Some(AccessPolicy::WriteOnly),
            Self::PERM_RDWR => Some(AccessPolicy::ReadWrite),
            _ => None,
        }
    }

    /// 转换为平台数据的权限编码
    pub fn as_raw(self) -> u32 {
        match self {
            AccessPolicy::ReadOnly => Self::PERM_RDONLY,
            AccessPolicy::WriteOnly => Self::PERM_WRONLY,
            AccessPolicy::ReadWrite => Self::PERM_RDWR,
        }
    }

    /// 判断以 `mode` 打开是否被允许
    ///
    /// | 策略 \ 请求 | Read | Write | ReadWrite |
    /// |---|---|---|---|
    /// | ReadOnly  | 允许 | 拒绝 | 拒绝 |
    /// | WriteOnly | 拒绝 | 允许 | 拒绝 |
    /// | ReadWrite | 允许 | 允许 | 允许 |
    pub fn permits(self, mode: AccessMode) -> bool {
        matches!(
            (self, mode),
            (AccessPolicy::ReadWrite, _)
                | (AccessPolicy::ReadOnly, AccessMode::Read)
                | (AccessPolicy::WriteOnly, AccessMode::Write)
        )
    }
}

/// 打开设备时请求的访问模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// 只读
    Read,
    /// 只写
    Write,
    /// 读写
    ReadWrite,
}

impl AccessMode {
    /// 从 open(2) 标志的访问模式位解析，非法访问模式返回 None
    pub fn from_open_flags(flags: OpenFlags) -> Option<Self> {
        match (flags.readable(), flags.writable()) {
            (true, false) => Some(AccessMode::Read),
            (false, true) => Some(AccessMode::Write),
            (true, true) => Some(AccessMode::ReadWrite),
            (false, false) => None,
        }
    }

    /// 是否允许读
    pub fn readable(self) -> bool {
        matches!(self, AccessMode::Read | AccessMode::ReadWrite)
    }

    /// 是否允许写
    pub fn writable(self) -> bool {
        matches!(self, AccessMode::Write | AccessMode::ReadWrite)
    }
}

/// 设备描述符
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    name: String,
    serial: String,
    capacity: usize,
    policy: AccessPolicy,
}

impl DeviceDescriptor {
    /// 创建描述符
    ///
    /// # 参数
    /// * `name` - 设备名，用于在驱动表中选择配置行
    /// * `capacity` - 设备可寻址字节数
    /// * `policy` - 访问策略
    /// * `serial` - 序列号，仅用于诊断
    pub fn new(
        name: impl Into<String>,
        capacity: usize,
        policy: AccessPolicy,
        serial: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            serial: serial.into(),
            capacity,
            policy,
        }
    }

    /// 设备名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 序列号
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// 容量（字节）
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 访问策略
    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }
}
