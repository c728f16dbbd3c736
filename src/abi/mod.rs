//! Wire ABI shared with callers
//!
//! Fixed-layout records exchanged across the trust boundary, and the
//! internal representations the firmware services consume.
//!
//! # Conventions
//! - Every record is packed and little-endian
//! - Pointer fields are 64-bit caller addresses; zero means "not supplied"
//! - Optional slots are resolved to `Option` once, at decode time

pub mod guid;
pub mod records;
pub mod status;
pub mod time;
pub mod types;
pub mod wire;

pub use guid::{Guid, WireGuid};
pub use status::Status;
pub use time::{Time, TimeCapabilities, WireTime, WireTimeCapabilities};
pub use types::{
    CapsuleFlags, CapsuleHeader, ResetType, VariableAttributes, VariableStoreInfo,
    WireCapsuleHeader,
};
pub use wire::{UserAddr, Wire};
