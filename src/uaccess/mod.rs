//! Trust-boundary access
//!
//! Everything that touches caller memory goes through this module.
//!
//! # Security Principles
//! - Validate every caller address before use
//! - Copy caller data into scratch memory once, then work on the copy
//! - Never expose scratch bytes the firmware did not produce for the caller
//!
//! # Layers
//! - [`user`]: raw, validated reads and writes of caller memory
//! - [`transfer`]: variable-length strings and buffers
//! - [`negotiate`]: the ask-then-allocate handshake for variable outputs

pub mod negotiate;
pub mod transfer;
pub mod user;

pub use negotiate::{check_status, read_declared_size, settle};
pub use transfer::{copy_from_user_len, copy_to_user, copy_ucs2_into, probe_ucs2, ucs2_strsize};
pub use user::{get_user, put_user, UserMemory, UserWindow};
