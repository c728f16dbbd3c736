//! efirt-gateway - Validated Gateway to EFI Runtime Services
//!
//! Lets untrusted callers reach the platform firmware's runtime services
//! (variables, clocks, wakeup alarm, monotonic counter, capsule queries)
//! without ever letting the firmware see caller memory directly.
//!
//! # Flow
//! ```text
//! ioctl(cmd, arg) ─▶ device ─▶ Gateway::dispatch ─▶ handler
//!                                                    │ decode (abi)
//!                                                    │ copy in (uaccess)
//!                                                    ▼
//!                                              RuntimeServices
//!                                                    │ negotiate size
//!                                                    │ copy out
//!                                                    ▼
//!                                             status + errno
//! ```
//!
//! # Security Features
//! - Every caller address is validated before use
//! - Scratch buffers are scoped, released exactly once and zeroized
//! - Output bytes are never exposed past the caller's declared capacity
//! - No panics on caller-controlled input

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod abi;
pub mod device;
pub mod error;
pub mod gateway;
pub mod mm;
pub mod security;
pub mod uaccess;

#[cfg(test)]
mod test_support;

/// Driver version string
pub const DRIVER_VERSION: &str = "0.1";

pub use device::RuntimeDevice;
pub use error::{Errno, GatewayError, GatewayResult};
pub use gateway::{Gateway, Opcode, RuntimeServices};
pub use mm::{ScratchHeap, DEFAULT_SCRATCH_SIZE};
pub use uaccess::{UserMemory, UserWindow};
