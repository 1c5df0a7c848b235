//! 平台总线
//!
//! 设备提供方与驱动之间的撮合层。总线按注册顺序把描述符交给各驱动探测：
//! 返回 [`BindError::NotHandled`] 的驱动被跳过，其余结果终止本轮探测。
//! 没有驱动接手的设备保持挂起，等待后续注册的驱动。
//!
//! 无论驱动与设备以何种顺序离开，已绑定的实例都会被确定性地解绑：
//! 移除设备时解绑该设备，注销驱动时解绑其所有设备，总线销毁时解绑全部设备。

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use log::{info, warn};
use sync::RwLock;

use crate::descriptor::DeviceDescriptor;
use crate::driver::PcdDriver;
use crate::error::{BindError, UnbindError};

/// 平台驱动接口
pub trait PlatformDriver: Send + Sync {
    /// 驱动名
    fn name(&self) -> &str;

    /// 探测并绑定描述符，成功时返回驱动内的标识
    fn probe(&self, descriptor: &DeviceDescriptor) -> Result<usize, BindError>;

    /// 解绑驱动内的标识
    fn remove(&self, identity: usize) -> Result<(), UnbindError>;
}

impl PlatformDriver for PcdDriver {
    fn name(&self) -> &str {
        PcdDriver::name(self)
    }

    fn probe(&self, descriptor: &DeviceDescriptor) -> Result<usize, BindError> {
        self.bind(descriptor)
    }

    fn remove(&self, identity: usize) -> Result<(), UnbindError> {
        self.unbind(identity)
    }
}

/// 总线上的设备编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BusDeviceId(u64);

/// 设备与驱动的绑定关系
#[derive(Clone)]
pub struct DeviceBinding {
    /// 接手设备的驱动
    pub driver: Arc<dyn PlatformDriver>,
    /// 驱动内的标识
    pub identity: usize,
}

impl core::fmt::Debug for DeviceBinding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceBinding")
            .field("driver", &self.driver.name())
            .field("identity", &self.identity)
            .finish()
    }
}

struct BusDevice {
    descriptor: DeviceDescriptor,
    binding: Option<DeviceBinding>,
}

/// 平台总线
pub struct PlatformBus {
    drivers: RwLock<Vec<Arc<dyn PlatformDriver>>>,
    devices: RwLock<BTreeMap<BusDeviceId, BusDevice>>,
    next_id: AtomicU64,
}

impl PlatformBus {
    /// 创建空总线
    pub fn new() -> Self {
        Self {
            drivers: RwLock::new(Vec::new()),
            devices: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// 依次交给驱动探测，直到有驱动接手或明确失败
    fn probe_with(
        drivers: &[Arc<dyn PlatformDriver>],
        descriptor: &DeviceDescriptor,
    ) -> Option<DeviceBinding> {
        for driver in drivers {
            match driver.probe(descriptor) {
                Ok(identity) => {
                    return Some(DeviceBinding {
                        driver: driver.clone(),
                        identity,
                    });
                }
                Err(BindError::NotHandled) => continue,
                Err(err) => {
                    warn!(
                        "bus: probe of {} by {} failed: {}",
                        descriptor.name(),
                        driver.name(),
                        err
                    );
                    return None;
                }
            }
        }
        None
    }

    fn release(descriptor: &DeviceDescriptor, binding: DeviceBinding) {
        if let Err(err) = binding.driver.remove(binding.identity) {
            warn!(
                "bus: remove of {} from {} failed: {}",
                descriptor.name(),
                binding.driver.name(),
                err
            );
        }
    }

    /// 注册驱动并探测所有挂起设备，返回新绑定的设备数
    ///
    /// 同一驱动已注册时返回 None，不做任何探测。
    pub fn register_driver(&self, driver: Arc<dyn PlatformDriver>) -> Option<usize> {
        let mut devices = self.devices.write();
        {
            let mut drivers = self.drivers.write();
            if drivers.iter().any(|d| Arc::ptr_eq(d, &driver)) {
                warn!("bus: driver {} already registered", driver.name());
                return None;
            }
            drivers.push(driver.clone());
        }
        info!("bus: registered driver {}", driver.name());

        let single = [driver];
        let mut bound = 0;
        for device in devices.values_mut().filter(|d| d.binding.is_none()) {
            if let Some(binding) = Self::probe_with(&single, &device.descriptor) {
                device.binding = Some(binding);
                bound += 1;
            }
        }
        Some(bound)
    }

    /// 注销驱动并解绑其所有设备，返回解绑的设备数
    ///
    /// 设备本身留在总线上，重新变为挂起状态。驱动未注册时返回 None。
    pub fn unregister_driver(&self, driver: &Arc<dyn PlatformDriver>) -> Option<usize> {
        let mut devices = self.devices.write();
        {
            let mut drivers = self.drivers.write();
            let index = drivers.iter().position(|d| Arc::ptr_eq(d, driver))?;
            drivers.remove(index);
        }

        let mut released = 0;
        for device in devices.values_mut() {
            if let Some(binding) = device
                .binding
                .take_if(|b| Arc::ptr_eq(&b.driver, driver))
            {
                Self::release(&device.descriptor, binding);
                released += 1;
            }
        }
        info!(
            "bus: unregistered driver {}, released {} devices",
            driver.name(),
            released
        );
        Some(released)
    }

    /// 添加设备并立即探测
    pub fn add_device(&self, descriptor: DeviceDescriptor) -> BusDeviceId {
        let mut devices = self.devices.write();
        let id = BusDeviceId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let binding = Self::probe_with(&self.drivers.read(), &descriptor);
        if binding.is_none() {
            info!("bus: {} pending, no driver bound", descriptor.name());
        }
        devices.insert(
            id,
            BusDevice {
                descriptor,
                binding,
            },
        );
        id
    }

    /// 批量添加设备
    pub fn add_devices(
        &self,
        descriptors: impl IntoIterator<Item = DeviceDescriptor>,
    ) -> Vec<BusDeviceId> {
        descriptors
            .into_iter()
            .map(|descriptor| self.add_device(descriptor))
            .collect()
    }

    /// 移除设备，已绑定时先解绑；返回其描述符
    pub fn remove_device(&self, id: BusDeviceId) -> Option<DeviceDescriptor> {
        let device = self.devices.write().remove(&id)?;
        if let Some(binding) = device.binding {
            Self::release(&device.descriptor, binding);
        }
        Some(device.descriptor)
    }

    /// 设备当前的绑定关系
    pub fn binding(&self, id: BusDeviceId) -> Option<DeviceBinding> {
        self.devices.read().get(&id)?.binding.clone()
    }

    /// 总线上的设备数（含挂起）
    pub fn device_count(&self) -> usize {
        self.devices.read().len()
    }

    /// 挂起（未绑定）设备数
    pub fn pending_count(&self) -> usize {
        self.devices
            .read()
            .values()
            .filter(|d| d.binding.is_none())
            .count()
    }

    /// 已注册驱动数
    pub fn driver_count(&self) -> usize {
        self.drivers.read().len()
    }
}

impl Default for PlatformBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PlatformBus {
    fn drop(&mut self) {
        let devices = core::mem::take(self.devices.get_mut());
        for device in devices.into_values() {
            if let Some(binding) = device.binding {
                Self::release(&device.descriptor, binding);
            }
        }
    }
}
