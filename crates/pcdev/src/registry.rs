//! 设备注册表
//!
//! 标识 → 实例的映射，是框架内唯一的可变共享状态。
//!
//! # 引用计数策略
//!
//! 注册表以 `Arc<DeviceInstance>` 持有实例。解析标识时在读锁内克隆 `Arc`，
//! 随后的读写在克隆上进行；解绑在写锁内移除表项并放下注册表的引用。
//! 因此：
//!
//! - 解绑返回之后开始的操作一定看到“未绑定”；
//! - 解绑之前已解析的操作会在原实例上完成，缓冲区在最后一个引用释放时回收；
//! - 不存在半释放状态。

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};
use sync::RwLock;

use crate::error::BindError;
use crate::instance::DeviceInstance;

/// 设备注册表
pub struct Registry {
    slots: RwLock<BTreeMap<usize, Arc<DeviceInstance>>>,
    next_generation: AtomicU64,
    max_devices: usize,
}

impl Registry {
    /// 创建空注册表，标识取值范围为 `[0, max_devices)`
    pub fn new(max_devices: usize) -> Self {
        Self {
            slots: RwLock::new(BTreeMap::new()),
            next_generation: AtomicU64::new(0),
            max_devices,
        }
    }

    /// 解析标识，返回实例的一个引用
    ///
    /// 只在单次操作期间持有；长期引用会让解绑后的缓冲区无法回收。
    pub(crate) fn get(&self, identity: usize) -> Option<Arc<DeviceInstance>> {
        self.slots.read().get(&identity).cloned()
    }

    /// 分配最小空闲标识并插入由 `make` 构造的实例
    ///
    /// 标识与代数在写锁内确定，`make` 也在写锁内调用，不应做耗时操作。
    pub(crate) fn insert_with(
        &self,
        make: impl FnOnce(usize, u64) -> DeviceInstance,
    ) -> Result<Arc<DeviceInstance>, BindError> {
        let mut slots = self.slots.write();

        let identity = Self::first_free(&slots);
        if identity >= self.max_devices {
            return Err(BindError::NoFreeIdentity);
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let instance = Arc::new(make(identity, generation));
        slots.insert(identity, instance.clone());
        Ok(instance)
    }

    /// 移除并返回标识对应的实例
    pub(crate) fn remove(&self, identity: usize) -> Option<Arc<DeviceInstance>> {
        self.slots.write().remove(&identity)
    }

    /// 当前绑定的实例数
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// 是否没有任何绑定
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 当前绑定的所有标识（升序）
    pub fn identities(&self) -> Vec<usize> {
        self.slots.read().keys().copied().collect()
    }

    /// 标识空间大小
    pub fn max_devices(&self) -> usize {
        self.max_devices
    }

    /// 移除所有实例，返回被移除的实例
    pub(crate) fn drain(&self) -> Vec<Arc<DeviceInstance>> {
        let mut slots = self.slots.write();
        core::mem::take(&mut *slots).into_values().collect()
    }

    /// 最小的未占用标识；键有序，第一个 `index != key` 的位置即为空洞
    fn first_free(slots: &BTreeMap<usize, Arc<DeviceInstance>>) -> usize {
        slots
            .keys()
            .enumerate()
            .find(|(index, identity)| index != *identity)
            .map_or(slots.len(), |(index, _)| index)
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("max_devices", &self.max_devices)
            .field("bound", &self.identities())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{AccessPolicy, DeviceDescriptor};
    use crate::id_table::DeviceConfig;
    use crate::test_arch;

    fn make(identity: usize, generation: u64) -> DeviceInstance {
        let desc = DeviceDescriptor::new("pcdev-A1x", 4, AccessPolicy::ReadWrite, "SN");
        let config = DeviceConfig {
            cfg_item1: 0,
            cfg_item2: 0,
        };
        let buffer = DeviceInstance::alloc_buffer(4).unwrap();
        DeviceInstance::new(identity, generation, 0, desc, config, buffer)
    }

    #[test]
    fn test_smallest_free_identity() {
        test_arch::init();
        let reg = Registry::new(8);
        for expected in 0..4 {
            assert_eq!(reg.insert_with(make).unwrap().identity(), expected);
        }
        reg.remove(1).unwrap();
        reg.remove(2).unwrap();
        assert_eq!(reg.insert_with(make).unwrap().identity(), 1);
        assert_eq!(reg.insert_with(make).unwrap().identity(), 2);
        assert_eq!(reg.insert_with(make).unwrap().identity(), 4);
        assert_eq!(reg.identities(), [0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_identity_space_exhausted() {
        test_arch::init();
        let reg = Registry::new(2);
        reg.insert_with(make).unwrap();
        reg.insert_with(make).unwrap();
        assert_eq!(reg.insert_with(make).unwrap_err(), BindError::NoFreeIdentity);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_generation_changes_on_reuse() {
        test_arch::init();
        let reg = Registry::new(4);
        let first = reg.insert_with(make).unwrap();
        reg.remove(0).unwrap();
        let second = reg.insert_with(make).unwrap();
        assert_eq!(first.identity(), second.identity());
        assert_ne!(first.generation(), second.generation());
    }

    #[test]
    fn test_removed_instance_outlives_entry() {
        test_arch::init();
        let reg = Registry::new(4);
        reg.insert_with(make).unwrap();
        let in_flight = reg.get(0).unwrap();
        let removed = reg.remove(0).unwrap();
        assert!(reg.get(0).is_none());
        drop(removed);
        // 仍持有引用的一方可以继续访问
        assert_eq!(in_flight.capacity(), 4);
        assert_eq!(Arc::strong_count(&in_flight), 1);
    }

    #[test]
    fn test_drain_empties_registry() {
        test_arch::init();
        let reg = Registry::new(4);
        reg.insert_with(make).unwrap();
        reg.insert_with(make).unwrap();
        assert_eq!(reg.drain().len(), 2);
        assert!(reg.is_empty());
    }
}
