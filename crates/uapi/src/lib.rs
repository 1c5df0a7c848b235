//! 与调用方共用的定义和声明
//!
//! 包含错误码、打开标志与 seek 方式，确保驱动与其调用方（VFS 胶水层等）的一致性

#![no_std]
#![allow(missing_docs)]

pub mod errno;
pub mod fcntl;
