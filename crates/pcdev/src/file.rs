//! 设备访问接口（open/read/write/seek/close）
//!
//! 句柄只记录标识、代数、打开模式与游标，不持有实例引用。
//! 每次操作都重新通过注册表解析标识；实例已解绑或标识已被新实例复用时，
//! 操作返回 [`AccessError::NoSuchDevice`]。
//!
//! 读到设备末尾返回 0 字节，而写到设备末尾返回 [`AccessError::OutOfSpace`]。
//! 这一不对称沿用既有驱动行为。

use alloc::sync::Arc;
use log::debug;
use uapi::fcntl::{OpenFlags, SeekWhence};

use crate::descriptor::AccessMode;
use crate::driver::PcdDriver;
use crate::error::AccessError;
use crate::instance::DeviceInstance;

/// 打开的设备会话，携带独立的读写游标
///
/// 不可克隆：每次 [`PcdDriver::open`] 得到一个新游标。
#[derive(Debug)]
pub struct Handle {
    identity: usize,
    generation: u64,
    mode: AccessMode,
    pos: usize,
}

impl Handle {
    /// 句柄指向的标识
    pub fn identity(&self) -> usize {
        self.identity
    }

    /// 打开模式
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// 当前游标
    pub fn offset(&self) -> usize {
        self.pos
    }
}

impl PcdDriver {
    fn resolve(&self, handle: &Handle) -> Result<Arc<DeviceInstance>, AccessError> {
        self.registry
            .get(handle.identity)
            .filter(|instance| instance.generation() == handle.generation)
            .ok_or(AccessError::NoSuchDevice)
    }

    /// 以 `mode` 打开标识对应的设备
    ///
    /// 访问策略不允许该模式时返回 [`AccessError::PermissionDenied`]。
    pub fn open(&self, identity: usize, mode: AccessMode) -> Result<Handle, AccessError> {
        let instance = self
            .registry
            .get(identity)
            .ok_or(AccessError::NoSuchDevice)?;

        let policy = instance.descriptor().policy();
        if !policy.permits(mode) {
            debug!(
                "pcdev: open {} as {:?} denied by {:?}",
                instance.node_name(),
                mode,
                policy
            );
            return Err(AccessError::PermissionDenied);
        }

        debug!("pcdev: open {} as {:?}", instance.node_name(), mode);
        Ok(Handle {
            identity,
            generation: instance.generation(),
            mode,
            pos: 0,
        })
    }

    /// 以 open(2) 标志打开，非法访问模式视为权限不足
    pub fn open_with_flags(&self, identity: usize, flags: OpenFlags) -> Result<Handle, AccessError> {
        let mode = AccessMode::from_open_flags(flags).ok_or(AccessError::PermissionDenied)?;
        self.open(identity, mode)
    }

    /// 从游标处读取最多 `count` 字节到 `buf`
    ///
    /// 游标位于末尾时返回 `Ok(0)`。裁剪后的长度超出 `buf` 时返回
    /// [`AccessError::CopyFault`]，游标不变。
    pub fn read(
        &self,
        handle: &mut Handle,
        buf: &mut [u8],
        count: usize,
    ) -> Result<usize, AccessError> {
        let instance = self.resolve(handle)?;
        if !handle.mode.readable() {
            return Err(AccessError::PermissionDenied);
        }

        let capacity = instance.capacity();
        debug!(
            "pcdev: read {} bytes from {} at {}",
            count,
            instance.node_name(),
            handle.pos
        );
        if handle.pos >= capacity {
            return Ok(0);
        }

        let count = count.min(capacity - handle.pos);
        let dst = buf.get_mut(..count).ok_or(AccessError::CopyFault)?;
        instance.read_at(handle.pos, dst);
        handle.pos += count;
        Ok(count)
    }

    /// 从 `buf` 向游标处写入最多 `count` 字节
    ///
    /// 裁剪后长度为 0（包括游标已在末尾）时返回 [`AccessError::OutOfSpace`]。
    pub fn write(
        &self,
        handle: &mut Handle,
        buf: &[u8],
        count: usize,
    ) -> Result<usize, AccessError> {
        let instance = self.resolve(handle)?;
        if !handle.mode.writable() {
            return Err(AccessError::PermissionDenied);
        }

        let capacity = instance.capacity();
        debug!(
            "pcdev: write {} bytes to {} at {}",
            count,
            instance.node_name(),
            handle.pos
        );

        let count = count.min(capacity.saturating_sub(handle.pos));
        if count == 0 {
            return Err(AccessError::OutOfSpace);
        }

        let src = buf.get(..count).ok_or(AccessError::CopyFault)?;
        instance.write_at(handle.pos, src);
        handle.pos += count;
        Ok(count)
    }

    /// 移动游标，返回新游标
    ///
    /// 结果不在 `[0, capacity]` 内时返回 [`AccessError::InvalidOffset`]，游标不变。
    pub fn seek(
        &self,
        handle: &mut Handle,
        offset: isize,
        whence: SeekWhence,
    ) -> Result<usize, AccessError> {
        let instance = self.resolve(handle)?;
        let capacity = instance.capacity();

        // 缓冲区已成功分配，capacity 不超过 isize::MAX
        let base = match whence {
            SeekWhence::Set => 0,
            SeekWhence::Cur => handle.pos as isize,
            SeekWhence::End => capacity as isize,
        };
        let target = base
            .checked_add(offset)
            .and_then(|pos| usize::try_from(pos).ok())
            .filter(|pos| *pos <= capacity)
            .ok_or(AccessError::InvalidOffset)?;

        debug!(
            "pcdev: seek {} from {} to {}",
            instance.node_name(),
            handle.pos,
            target
        );
        handle.pos = target;
        Ok(target)
    }

    /// 以原始 whence 值移动游标，未知 whence 返回 [`AccessError::InvalidOffset`]
    pub fn seek_raw(
        &self,
        handle: &mut Handle,
        offset: isize,
        whence: usize,
    ) -> Result<usize, AccessError> {
        let whence = SeekWhence::try_from(whence).map_err(|_| AccessError::InvalidOffset)?;
        self.seek(handle, offset, whence)
    }

    /// 关闭句柄，对实例及其他句柄没有影响
    pub fn close(&self, handle: Handle) {
        debug!("pcdev: close handle on identity {}", handle.identity);
    }
}
