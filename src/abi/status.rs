//! Firmware status codes
//!
//! The status is the firmware's own verdict and is copied back to the caller
//! verbatim, including values this crate has no name for.

use core::fmt;

use zerocopy::little_endian::U64;

use super::wire::Wire;

/// Bit set on every error status.
const ERROR_BIT: u64 = 1 << 63;

const fn error(code: u64) -> Status {
    Status(ERROR_BIT | code)
}

/// Status returned by a runtime service.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Status(u64);

impl Status {
    pub const SUCCESS: Self = Self(0);
    pub const LOAD_ERROR: Self = error(1);
    pub const INVALID_PARAMETER: Self = error(2);
    pub const UNSUPPORTED: Self = error(3);
    pub const BAD_BUFFER_SIZE: Self = error(4);
    pub const BUFFER_TOO_SMALL: Self = error(5);
    pub const NOT_READY: Self = error(6);
    pub const DEVICE_ERROR: Self = error(7);
    pub const WRITE_PROTECTED: Self = error(8);
    pub const OUT_OF_RESOURCES: Self = error(9);
    pub const NOT_FOUND: Self = error(14);
    pub const ACCESS_DENIED: Self = error(15);
    pub const SECURITY_VIOLATION: Self = error(26);

    /// Wrap a raw status value.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 & ERROR_BIT != 0
    }

    /// Symbolic name, if known.
    pub const fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::SUCCESS => "Success",
            Self::LOAD_ERROR => "LoadError",
            Self::INVALID_PARAMETER => "InvalidParameter",
            Self::UNSUPPORTED => "Unsupported",
            Self::BAD_BUFFER_SIZE => "BadBufferSize",
            Self::BUFFER_TOO_SMALL => "BufferTooSmall",
            Self::NOT_READY => "NotReady",
            Self::DEVICE_ERROR => "DeviceError",
            Self::WRITE_PROTECTED => "WriteProtected",
            Self::OUT_OF_RESOURCES => "OutOfResources",
            Self::NOT_FOUND => "NotFound",
            Self::ACCESS_DENIED => "AccessDenied",
            Self::SECURITY_VIOLATION => "SecurityViolation",
            _ => return None,
        })
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Status::{}", name),
            None => write!(f, "Status({:#x})", self.0),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{:#x}", self.0),
        }
    }
}

impl Wire for Status {
    type Raw = U64;

    fn decode(raw: U64) -> Self {
        Self(raw.get())
    }

    fn encode(&self) -> U64 {
        U64::new(self.0)
    }
}
