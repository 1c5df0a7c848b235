//! 绑定引擎
//!
//! [`PcdDriver`] 拥有驱动匹配表与注册表：
//!
//! - [`PcdDriver::bind`]：查表 → 分配缓冲区 → 分配最小空闲标识 → 插入注册表；
//! - [`PcdDriver::unbind`]：先从注册表移除，再释放缓冲区。
//!
//! 绑定过程中任何一步失败，已分配的资源都会随所有权自动释放，注册表中不会留下表项。

use alloc::vec::Vec;
use log::info;

use crate::config::{PCD_DEVICE_NAME, PcdConfig};
use crate::descriptor::DeviceDescriptor;
use crate::devno::makedev;
use crate::error::{BindError, UnbindError};
use crate::id_table::{IdTable, PCD_IDS};
use crate::instance::{DeviceInfo, DeviceInstance};
use crate::registry::Registry;

/// 伪字符设备驱动
pub struct PcdDriver {
    ids: IdTable,
    config: PcdConfig,
    pub(crate) registry: Registry,
}

impl PcdDriver {
    /// 使用默认配置创建驱动
    pub fn new(ids: IdTable) -> Self {
        Self::with_config(ids, PcdConfig::default())
    }

    /// 使用指定配置创建驱动
    pub fn with_config(ids: IdTable, config: PcdConfig) -> Self {
        Self {
            ids,
            config,
            registry: Registry::new(config.max_devices),
        }
    }

    /// 驱动名
    pub fn name(&self) -> &'static str {
        PCD_DEVICE_NAME
    }

    /// 驱动匹配表
    pub fn id_table(&self) -> &IdTable {
        &self.ids
    }

    /// 运行期配置
    pub fn config(&self) -> PcdConfig {
        self.config
    }

    /// 注册表，仅提供只读诊断
    ///
    /// 外部无法从注册表取得实例引用：
    ///
    /// ```compile_fail
    /// let driver = pcdev::PcdDriver::default();
    /// let _held = driver.registry().get(0);
    /// ```
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// 绑定描述符，成功时返回分配的标识
    ///
    /// # 错误
    /// * [`BindError::NotHandled`] - 驱动表没有匹配项，调用方可将描述符交给其他驱动
    /// * [`BindError::OutOfMemory`] - 缓冲区分配失败
    /// * [`BindError::NoFreeIdentity`] - 标识空间已满
    pub fn bind(&self, descriptor: &DeviceDescriptor) -> Result<usize, BindError> {
        let matched = self
            .ids
            .lookup(descriptor.name())
            .ok_or(BindError::NotHandled)?;

        // 缓冲区在注册表锁外分配；后续失败时随 drop 释放
        let buffer = DeviceInstance::alloc_buffer(descriptor.capacity())?;

        let major = self.config.major;
        let instance = self.registry.insert_with(|identity, generation| {
            DeviceInstance::new(
                identity,
                generation,
                makedev(major, identity as u32),
                descriptor.clone(),
                matched.config,
                buffer,
            )
        })?;

        info!(
            "pcdev: bound {} as {} (sn={}, size={}, perm={:#x}, cfg1={}, cfg2={})",
            descriptor.name(),
            instance.node_name(),
            descriptor.serial(),
            descriptor.capacity(),
            descriptor.policy().as_raw(),
            matched.config.cfg_item1,
            matched.config.cfg_item2,
        );

        Ok(instance.identity())
    }

    /// 解绑标识对应的实例
    ///
    /// 对同一标识重复调用时，第二次返回 [`UnbindError::NotBound`]。
    pub fn unbind(&self, identity: usize) -> Result<(), UnbindError> {
        let instance = self
            .registry
            .remove(identity)
            .ok_or(UnbindError::NotBound)?;

        info!(
            "pcdev: removed {} (sn={})",
            instance.node_name(),
            instance.descriptor().serial()
        );
        // 若仍有进行中的操作持有引用，缓冲区在其结束时释放
        drop(instance);
        Ok(())
    }

    /// 解绑所有实例，返回解绑数量
    pub fn unbind_all(&self) -> usize {
        let removed = self.registry.drain();
        for instance in &removed {
            info!("pcdev: removed {}", instance.node_name());
        }
        removed.len()
    }

    /// 当前绑定的设备数
    pub fn total_devices(&self) -> usize {
        self.registry.len()
    }

    /// 当前绑定的所有标识（升序）
    pub fn identities(&self) -> Vec<usize> {
        self.registry.identities()
    }

    /// 标识对应实例的诊断快照
    pub fn info(&self, identity: usize) -> Option<DeviceInfo> {
        self.registry.get(identity).map(|instance| instance.info())
    }
}

impl Default for PcdDriver {
    fn default() -> Self {
        Self::new(PCD_IDS)
    }
}

impl core::fmt::Debug for PcdDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PcdDriver")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}
