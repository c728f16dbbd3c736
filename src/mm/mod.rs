//! Private memory of the gateway
//!
//! Provides:
//! - The scratch heap temporary buffers are drawn from
//! - `ScratchBuf`, the scoped handle that releases itself on every exit path
//!
//! # Security Principles
//! - Caller data is only ever copied into scratch memory, never aliased
//! - Allocation failure is reported, never fatal
//! - Released memory is zeroized

mod scratch;

pub use scratch::{ScratchBuf, ScratchHeap, DEFAULT_SCRATCH_SIZE, PLACEHOLDER_BYTES};
