//! Variable attributes, capsule headers and related small types.

use bitflags::bitflags;
use zerocopy::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::guid::{Guid, WireGuid};
use super::wire::Wire;

bitflags! {
    /// Attributes of a firmware variable.
    ///
    /// Bits this crate does not name are retained and forwarded unchanged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VariableAttributes: u32 {
        const NON_VOLATILE = 0x0000_0001;
        const BOOTSERVICE_ACCESS = 0x0000_0002;
        const RUNTIME_ACCESS = 0x0000_0004;
        const HARDWARE_ERROR_RECORD = 0x0000_0008;
        const AUTHENTICATED_WRITE_ACCESS = 0x0000_0010;
        const TIME_BASED_AUTHENTICATED_WRITE_ACCESS = 0x0000_0020;
        const APPEND_WRITE = 0x0000_0040;
    }
}

bitflags! {
    /// Capsule header flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CapsuleFlags: u32 {
        const PERSIST_ACROSS_RESET = 0x0001_0000;
        const POPULATE_SYSTEM_TABLE = 0x0002_0000;
        const INITIATE_RESET = 0x0004_0000;
    }
}

/// Reset the platform needs for a capsule update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ResetType(pub i32);

impl ResetType {
    pub const COLD: Self = Self(0);
    pub const WARM: Self = Self(1);
    pub const SHUTDOWN: Self = Self(2);
    pub const PLATFORM_SPECIFIC: Self = Self(3);
}

impl Default for ResetType {
    fn default() -> Self {
        Self::COLD
    }
}

/// Capacity figures of the variable store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VariableStoreInfo {
    pub max_storage: u64,
    pub remaining: u64,
    pub max_size: u64,
}

/// Capsule header as handed to the capability query (28 bytes packed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapsuleHeader {
    pub guid: Guid,
    pub header_size: u32,
    pub flags: CapsuleFlags,
    pub image_size: u32,
}

impl Default for CapsuleHeader {
    fn default() -> Self {
        Self {
            guid: Guid::default(),
            header_size: 0,
            flags: CapsuleFlags::empty(),
            image_size: 0,
        }
    }
}

/// Caller-side capsule header.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub struct WireCapsuleHeader {
    pub guid: WireGuid,
    pub header_size: U32,
    pub flags: U32,
    pub image_size: U32,
}

macro_rules! wire_flags {
    ($($ty:ty),*) => {$(
        /// Unknown bits survive the round trip.
        impl Wire for $ty {
            type Raw = U32;

            fn decode(raw: U32) -> Self {
                Self::from_bits_retain(raw.get())
            }

            fn encode(&self) -> U32 {
                U32::new(self.bits())
            }
        }
    )*};
}

wire_flags!(VariableAttributes, CapsuleFlags);

impl Wire for CapsuleHeader {
    type Raw = WireCapsuleHeader;

    fn decode(raw: WireCapsuleHeader) -> Self {
        Self {
            guid: Guid::decode(raw.guid),
            header_size: raw.header_size.get(),
            flags: CapsuleFlags::decode(raw.flags),
            image_size: raw.image_size.get(),
        }
    }

    fn encode(&self) -> WireCapsuleHeader {
        WireCapsuleHeader {
            guid: self.guid.encode(),
            header_size: U32::new(self.header_size),
            flags: self.flags.encode(),
            image_size: U32::new(self.image_size),
        }
    }
}
