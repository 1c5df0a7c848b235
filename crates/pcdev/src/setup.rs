//! 默认平台设备
//!
//! 设备提供方的静态平台数据：四个不同容量与权限的伪设备，
//! 分别对应驱动表中的 `pcdev-A1x` .. `pcdev-D1x`。

use alloc::vec::Vec;

use crate::descriptor::{AccessPolicy, DeviceDescriptor};

/// 平台数据，权限使用原始编码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformData {
    /// 设备名
    pub name: &'static str,
    /// 容量（字节）
    pub size: usize,
    /// 权限编码，见 [`AccessPolicy::PERM_RDONLY`] 等
    pub perm: u32,
    /// 序列号
    pub serial: &'static str,
}

impl PlatformData {
    /// 转换为描述符，权限编码非法时返回 None
    pub fn to_descriptor(&self) -> Option<DeviceDescriptor> {
        let policy = AccessPolicy::from_raw(self.perm)?;
        Some(DeviceDescriptor::new(
            self.name,
            self.size,
            policy,
            self.serial,
        ))
    }
}

/// 默认平台数据
pub static PCDEV_PLATFORM_DATA: [PlatformData; 4] = [
    PlatformData {
        name: "pcdev-A1x",
        size: 512,
        perm: AccessPolicy::PERM_RDWR,
        serial: "PCDEV1",
    },
    PlatformData {
        name: "pcdev-B1x",
        size: 256,
        perm: AccessPolicy::PERM_RDWR,
        serial: "PCDEV2",
    },
    PlatformData {
        name: "pcdev-C1x",
        size: 128,
        perm: AccessPolicy::PERM_RDONLY,
        serial: "PCDEV3",
    },
    PlatformData {
        name: "pcdev-D1x",
        size: 64,
        perm: AccessPolicy::PERM_WRONLY,
        serial: "PCDEV4",
    },
];

/// 默认平台设备的描述符
pub fn default_platform_devices() -> Vec<DeviceDescriptor> {
    PCDEV_PLATFORM_DATA
        .iter()
        .filter_map(PlatformData::to_descriptor)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id_table::PCD_IDS;

    #[test]
    fn test_default_devices_all_match_driver_table() {
        let devices = default_platform_devices();
        assert_eq!(devices.len(), 4);
        for desc in &devices {
            assert!(PCD_IDS.lookup(desc.name()).is_some(), "{}", desc.name());
        }
    }

    #[test]
    fn test_invalid_perm_is_rejected() {
        let data = PlatformData {
            name: "pcdev-A1x",
            size: 8,
            perm: 0x3,
            serial: "BAD",
        };
        assert!(data.to_descriptor().is_none());
    }
}
