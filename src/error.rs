//! Gateway Error Taxonomy
//!
//! Every invocation ends in exactly one of:
//! - success
//! - a boundary fault (caller memory could not be read or written)
//! - an allocation failure (scratch heap exhausted)
//! - a size negotiation failure (declared capacity below required size)
//! - a privileged call failure (firmware returned a non-success status)
//!
//! Unknown opcodes are reported as `NotSupported`. Errors are never retried
//! internally; the caller corrects its input and reissues the request.

use core::fmt;

use crate::abi::Status;

/// Kernel-style error numbers handed back through the device channel.
#[repr(i64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    /// Out of memory
    Enomem = -12,
    /// Bad address (invalid pointer)
    Efault = -14,
    /// No such device
    Enodev = -19,
    /// Invalid argument
    Einval = -22,
    /// Inappropriate ioctl for device
    Enotty = -25,
}

/// Outcome of a failed gateway invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayError {
    /// A read or write across the trust boundary failed.
    BoundaryFault,
    /// A temporary buffer could not be obtained.
    AllocationFailure,
    /// Declared capacity was smaller than the required size.
    SizeNegotiation,
    /// The firmware returned a non-success status.
    PrivilegedCall(Status),
    /// Opcode outside the fixed set.
    NotSupported,
}

impl GatewayError {
    /// Errno reported to the caller for this outcome.
    pub const fn errno(self) -> Errno {
        match self {
            Self::BoundaryFault => Errno::Efault,
            Self::AllocationFailure => Errno::Enomem,
            Self::SizeNegotiation | Self::PrivilegedCall(_) => Errno::Einval,
            Self::NotSupported => Errno::Enotty,
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoundaryFault => f.write_str("caller memory fault"),
            Self::AllocationFailure => f.write_str("scratch allocation failed"),
            Self::SizeNegotiation => f.write_str("declared capacity below required size"),
            Self::PrivilegedCall(status) => write!(f, "firmware returned {}", status),
            Self::NotSupported => f.write_str("unsupported opcode"),
        }
    }
}

/// Result type used throughout the gateway.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Collapse an outcome into the value returned from an ioctl.
pub fn to_return_code(result: GatewayResult<()>) -> i64 {
    match result {
        Ok(()) => 0,
        Err(e) => e.errno() as i64,
    }
}
