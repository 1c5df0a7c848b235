//! 伪字符设备注册表与平台绑定引擎
//!
//! 此 crate 提供一个平台式的驱动/设备匹配框架，包括：
//!
//! - [`DeviceDescriptor`] - 设备描述符（容量、访问策略、序列号、设备名）
//! - [`IdTable`] - 驱动匹配表（设备名 → 调优参数）
//! - [`PcdDriver`] - 绑定引擎，负责绑定/解绑与注册表维护
//! - [`Handle`] - 访问接口的会话，携带独立游标
//! - [`PlatformBus`] - 描述符与驱动之间的撮合层
//!
//! # 使用
//!
//! ```ignore
//! let driver = PcdDriver::default();
//! let id = driver.bind(&descriptor)?;
//! let mut handle = driver.open(id, AccessMode::ReadWrite)?;
//! driver.write(&mut handle, b"hello", 5)?;
//! ```
//!
//! 锁来自 `sync` crate，使用前宿主必须调用 [`sync::register_arch_ops`]。

#![no_std]

extern crate alloc;

pub mod bus;
pub mod config;
pub mod descriptor;
pub mod devno;
pub mod driver;
pub mod error;
pub mod file;
pub mod id_table;
pub mod instance;
pub mod registry;
pub mod setup;

pub use bus::{BusDeviceId, DeviceBinding, PlatformBus, PlatformDriver};
pub use config::{MAX_DEVICES, PCD_DEVICE_NAME, PCD_MAJOR, PcdConfig};
pub use descriptor::{AccessMode, AccessPolicy, DeviceDescriptor};
pub use driver::PcdDriver;
pub use error::{AccessError, BindError, UnbindError};
pub use file::Handle;
pub use id_table::{DeviceConfig, IdMatch, IdTable, MatchKind, PCD_IDS, PlatformDeviceId};
pub use instance::{DeviceInfo, DeviceInstance};
pub use registry::Registry;
pub use setup::{PlatformData, default_platform_devices};

// Re-export uapi types for convenience
pub use uapi::fcntl::{OpenFlags, SeekWhence};
