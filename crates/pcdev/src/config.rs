//! 驱动配置
//!
//! 编译期常量与运行期可调整的 [`PcdConfig`]。

/// 本驱动族所有设备名的公共前缀，同时也是驱动名与设备节点名前缀
pub const PCD_DEVICE_NAME: &str = "pcdev-";

/// 默认可同时绑定的设备数（标识空间大小）
pub const MAX_DEVICES: usize = 8;

/// 默认主设备号（Linux 本地/实验用范围 240-254）
pub const PCD_MAJOR: u32 = 240;

/// 驱动运行期配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcdConfig {
    /// 标识空间大小，标识取值范围为 `[0, max_devices)`
    pub max_devices: usize,
    /// 设备号使用的主设备号
    pub major: u32,
}

impl Default for PcdConfig {
    fn default() -> Self {
        Self {
            max_devices: MAX_DEVICES,
            major: PCD_MAJOR,
        }
    }
}
