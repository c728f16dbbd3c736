//! Security Primitives Module
//!
//! Scratch buffers may carry firmware variable payloads (keys, certificates,
//! boot entries). Their bytes are wiped with volatile writes before the
//! memory goes back to the scratch heap.

pub mod zeroize;

pub use zeroize::Zeroize;
