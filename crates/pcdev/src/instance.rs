//! 已绑定的设备实例
//!
//! 实例持有描述符副本、匹配到的配置行以及零初始化的后备缓冲区。
//! 实例只由绑定引擎创建和销毁；注册表持有唯一的长期引用，
//! 句柄每次操作都通过注册表重新解析，不缓存实例。

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use sync::SpinLock;

use crate::config::PCD_DEVICE_NAME;
use crate::descriptor::{AccessPolicy, DeviceDescriptor};
use crate::error::BindError;
use crate::id_table::DeviceConfig;

/// 设备实例
pub struct DeviceInstance {
    identity: usize,
    generation: u64,
    devno: u64,
    descriptor: DeviceDescriptor,
    config: DeviceConfig,
    /// 后备存储，长度恒等于 `descriptor.capacity()`
    buffer: SpinLock<Vec<u8>>,
}

/// 实例的诊断快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// 标识
    pub identity: usize,
    /// 设备节点名，如 `pcdev-0`
    pub node_name: String,
    /// 设备号
    pub devno: u64,
    /// 序列号
    pub serial: String,
    /// 容量（字节）
    pub capacity: usize,
    /// 访问策略
    pub policy: AccessPolicy,
    /// 调优参数
    pub config: DeviceConfig,
}

impl DeviceInstance {
    /// 分配零初始化的缓冲区
    ///
    /// 分配失败返回 [`BindError::OutOfMemory`]，不会 panic。
    pub(crate) fn alloc_buffer(capacity: usize) -> Result<Vec<u8>, BindError> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| BindError::OutOfMemory)?;
        buffer.resize(capacity, 0);
        Ok(buffer)
    }

    pub(crate) fn new(
        identity: usize,
        generation: u64,
        devno: u64,
        descriptor: DeviceDescriptor,
        config: DeviceConfig,
        buffer: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(buffer.len(), descriptor.capacity());
        Self {
            identity,
            generation,
            devno,
            descriptor,
            config,
            buffer: SpinLock::new(buffer),
        }
    }

    /// 标识（槽位索引）
    pub fn identity(&self) -> usize {
        self.identity
    }

    /// 代数，每次绑定唯一，用于识别过期句柄
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 设备号
    pub fn devno(&self) -> u64 {
        self.devno
    }

    /// 绑定时复制的描述符
    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    /// 匹配到的调优参数
    pub fn config(&self) -> DeviceConfig {
        self.config
    }

    /// 容量（字节）
    pub fn capacity(&self) -> usize {
        self.descriptor.capacity()
    }

    /// 设备节点名
    pub fn node_name(&self) -> String {
        format!("{}{}", PCD_DEVICE_NAME, self.identity)
    }

    /// 诊断快照
    pub fn info(&self) -> DeviceInfo {
        DeviceInfo {
            identity: self.identity,
            node_name: self.node_name(),
            devno: self.devno,
            serial: String::from(self.descriptor.serial()),
            capacity: self.capacity(),
            policy: self.descriptor.policy(),
            config: self.config,
        }
    }

    /// 从 `offset` 起拷贝 `dst.len()` 字节，调用方保证范围合法
    pub(crate) fn read_at(&self, offset: usize, dst: &mut [u8]) {
        let buffer = self.buffer.lock();
        dst.copy_from_slice(&buffer[offset..offset + dst.len()]);
    }

    /// 从 `offset` 起写入 `src`，调用方保证范围合法
    pub(crate) fn write_at(&self, offset: usize, src: &[u8]) {
        let mut buffer = self.buffer.lock();
        buffer[offset..offset + src.len()].copy_from_slice(src);
    }
}

impl core::fmt::Debug for DeviceInstance {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeviceInstance")
            .field("identity", &self.identity)
            .field("generation", &self.generation)
            .field("serial", &self.descriptor.serial())
            .field("capacity", &self.capacity())
            .field("policy", &self.descriptor.policy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_arch;

    #[test]
    fn test_alloc_buffer_zeroed() {
        let buf = DeviceInstance::alloc_buffer(64).unwrap();
        assert_eq!(buf.len(), 64);
        assert!(buf.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_alloc_buffer_impossible_size() {
        assert_eq!(
            DeviceInstance::alloc_buffer(usize::MAX),
            Err(BindError::OutOfMemory)
        );
    }

    #[test]
    fn test_read_write_at() {
        test_arch::init();
        let desc = DeviceDescriptor::new("pcdev-A1x", 8, AccessPolicy::ReadWrite, "SN");
        let config = DeviceConfig {
            cfg_item1: 1,
            cfg_item2: 2,
        };
        let inst = DeviceInstance::new(0, 0, 0, desc, config, DeviceInstance::alloc_buffer(8).unwrap());
        inst.write_at(6, &[0xAA, 0x55]);
        let mut out = [0xFFu8; 4];
        inst.read_at(4, &mut out);
        assert_eq!(out, [0, 0, 0xAA, 0x55]);
        assert_eq!(inst.node_name(), "pcdev-0");
    }
}
