//! 集成测试公共设施：宿主端 ArchOps 与常用描述符

#![allow(dead_code)]

use pcdev::{AccessPolicy, DeviceDescriptor};
use std::sync::Once;
use sync::ArchOps;

struct HostArchOps;

impl ArchOps for HostArchOps {
    unsafe fn read_and_disable_interrupts(&self) -> usize {
        0
    }

    unsafe fn restore_interrupts(&self, _flags: usize) {}

    fn interrupts_enabled(&self, _flags: usize) -> bool {
        false
    }
}

static HOST_ARCH_OPS: HostArchOps = HostArchOps;
static INIT: Once = Once::new();

pub fn init() {
    INIT.call_once(|| {
        // Safety: Once guarantees a single registration.
        unsafe { sync::register_arch_ops(&HOST_ARCH_OPS) };
    });
}

pub fn descriptor(name: &str, capacity: usize, policy: AccessPolicy) -> DeviceDescriptor {
    DeviceDescriptor::new(name, capacity, policy, "TEST")
}
