//! Fixed-size little-endian encoding
//!
//! Every value that crosses the boundary as one block has a packed raw
//! layout built from `zerocopy` little-endian integers, and a `Wire` impl
//! converting between that layout and the internal form. Decoding is total:
//! any byte pattern of the right length produces a value, and field
//! validation is left to the firmware.

use core::fmt;
use core::mem;

use zerocopy::little_endian::{I32, U16, U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// An address in the caller's memory.
///
/// This is a plain number: it is never dereferenced by the gateway directly,
/// only handed to a `UserMemory` implementation which validates it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct UserAddr(u64);

impl UserAddr {
    /// The null address.
    pub const NULL: Self = Self(0);

    #[inline]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// `None` for the null address.
    #[inline]
    pub const fn non_null(self) -> Option<Self> {
        if self.0 == 0 {
            None
        } else {
            Some(self)
        }
    }

    /// Address `bytes` further on, or `None` on overflow.
    #[inline]
    pub fn offset(self, bytes: usize) -> Option<Self> {
        let bytes = u64::try_from(bytes).ok()?;
        self.0.checked_add(bytes).map(Self)
    }
}

impl fmt::Debug for UserAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserAddr({:#x})", self.0)
    }
}

impl fmt::Display for UserAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A value with a fixed packed wire layout.
pub trait Wire: Sized {
    /// Byte-exact layout as seen by the caller.
    type Raw: FromBytes + IntoBytes + KnownLayout + Immutable;

    /// Encoded size in bytes.
    const SIZE: usize = mem::size_of::<Self::Raw>();

    fn decode(raw: Self::Raw) -> Self;

    fn encode(&self) -> Self::Raw;
}

macro_rules! wire_int {
    ($($ty:ty => $raw:ty),*) => {$(
        impl Wire for $ty {
            type Raw = $raw;

            fn decode(raw: $raw) -> Self {
                raw.get()
            }

            fn encode(&self) -> $raw {
                <$raw>::new(*self)
            }
        }
    )*};
}

wire_int!(u16 => U16, u32 => U32, u64 => U64, i32 => I32);

impl Wire for u8 {
    type Raw = u8;

    fn decode(raw: u8) -> Self {
        raw
    }

    fn encode(&self) -> u8 {
        *self
    }
}

/// Flag byte: any non-zero value reads as set.
impl Wire for bool {
    type Raw = u8;

    fn decode(raw: u8) -> Self {
        raw != 0
    }

    fn encode(&self) -> u8 {
        u8::from(*self)
    }
}

/// A pointer field that must be supplied; null faults on first use.
impl Wire for UserAddr {
    type Raw = U64;

    fn decode(raw: U64) -> Self {
        Self(raw.get())
    }

    fn encode(&self) -> U64 {
        U64::new(self.0)
    }
}

/// A pointer field where null means "not requested".
impl Wire for Option<UserAddr> {
    type Raw = U64;

    fn decode(raw: U64) -> Self {
        UserAddr(raw.get()).non_null()
    }

    fn encode(&self) -> U64 {
        U64::new(self.map_or(0, UserAddr::get))
    }
}
