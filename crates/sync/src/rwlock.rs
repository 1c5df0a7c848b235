//! 读写自旋锁
//!
//! 在 `lock_api` 的 [`lock_api::RawRwLock`] 之上实现一个自旋版本，
//! 对外暴露 `lock_api` 的 [`RwLock`] 封装（`read()` / `write()`）。
//!
//! 与 [`crate::SpinLock`] 不同，读写锁**不关闭中断**，只能在进程上下文中使用。

use core::{
    hint,
    sync::atomic::{AtomicUsize, Ordering},
};

/// 写者位
const WRITER: usize = 1;
/// 写者等待位，置位后新读者不再进入
const PENDING: usize = 2;
/// 每个读者占用的计数单位
const READER: usize = 4;

/// 自旋读写锁的原始实现
///
/// 状态字最低位表示写者，次低位表示有写者在等待，其余位为读者计数。
/// 写者优先：等待中的写者会挡住新读者，因此持有读锁时不可再次获取读锁。
#[derive(Debug)]
pub struct RawRwSpinLock {
    state: AtomicUsize,
}

unsafe impl lock_api::RawRwLock for RawRwSpinLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = RawRwSpinLock {
        state: AtomicUsize::new(0),
    };

    type GuardMarker = lock_api::GuardSend;

    fn lock_shared(&self) {
        while !self.try_lock_shared() {
            hint::spin_loop();
        }
    }

    fn try_lock_shared(&self) -> bool {
        let prev = self.state.fetch_add(READER, Ordering::Acquire);
        if prev & (WRITER | PENDING) != 0 {
            self.state.fetch_sub(READER, Ordering::Release);
            return false;
        }
        true
    }

    unsafe fn unlock_shared(&self) {
        self.state.fetch_sub(READER, Ordering::Release);
    }

    fn lock_exclusive(&self) {
        loop {
            let state = self.state.load(Ordering::Relaxed);
            if state & !PENDING == 0 {
                // 获取成功的同时清除等待位；其他等待者会在下一轮重新置位
                if self
                    .state
                    .compare_exchange_weak(state, WRITER, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
                {
                    return;
                }
                continue;
            }
            if state & PENDING == 0 {
                self.state.fetch_or(PENDING, Ordering::Relaxed);
            }
            hint::spin_loop();
        }
    }

    fn try_lock_exclusive(&self) -> bool {
        let state = self.state.load(Ordering::Relaxed);
        state & !PENDING == 0
            && self
                .state
                .compare_exchange(state, WRITER, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
    }

    unsafe fn unlock_exclusive(&self) {
        self.state.fetch_and(!WRITER, Ordering::Release);
    }

    fn is_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) & !PENDING != 0
    }
}

/// 读写自旋锁
pub type RwLock<T> = lock_api::RwLock<RawRwSpinLock, T>;
/// 读锁保护器
pub type RwLockReadGuard<'a, T> = lock_api::RwLockReadGuard<'a, RawRwSpinLock, T>;
/// 写锁保护器
pub type RwLockWriteGuard<'a, T> = lock_api::RwLockWriteGuard<'a, RawRwSpinLock, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiple_readers() {
        let lock = RwLock::new(5);
        let r1 = lock.read();
        let r2 = lock.read();
        assert_eq!(*r1 + *r2, 10);
        assert!(lock.try_write().is_none());
    }

    #[test]
    fn test_writer_excludes_readers() {
        let lock = RwLock::new(0);
        {
            let mut w = lock.write();
            *w = 7;
            assert!(lock.try_read().is_none());
        }
        assert_eq!(*lock.read(), 7);
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_pending_writer_blocks_new_readers() {
        extern crate std;
        use std::sync::Arc;
        use std::thread;

        let lock = Arc::new(RwLock::new(0));
        let reader = lock.read();

        let writer = {
            let lock = lock.clone();
            thread::spawn(move || *lock.write() = 1)
        };
        // Safety: only the state word is inspected.
        let raw = unsafe { lock.raw() };
        while raw.state.load(Ordering::Relaxed) & PENDING == 0 {
            hint::spin_loop();
        }
        assert!(lock.try_read().is_none());

        drop(reader);
        writer.join().unwrap();
        assert_eq!(*lock.read(), 1);
        assert!(!lock.is_locked());
    }
}
