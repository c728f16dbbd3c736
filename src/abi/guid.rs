//! GUID codec
//!
//! Internally a GUID is the 16-byte array the firmware expects. Callers send
//! the field form: `data1` (u32), `data2` (u16), `data3` (u16) and eight raw
//! `data4` bytes, the integer fields little-endian.

use zerocopy::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::wire::Wire;

/// Internal GUID: ordered byte array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Guid(pub [u8; 16]);

/// Caller-side GUID with separate integer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub struct WireGuid {
    pub data1: U32,
    pub data2: U16,
    pub data3: U16,
    pub data4: [u8; 8],
}

impl Guid {
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl Wire for Guid {
    type Raw = WireGuid;

    fn decode(raw: WireGuid) -> Self {
        let mut b = [0u8; 16];
        b[0..4].copy_from_slice(&raw.data1.to_bytes());
        b[4..6].copy_from_slice(&raw.data2.to_bytes());
        b[6..8].copy_from_slice(&raw.data3.to_bytes());
        b[8..16].copy_from_slice(&raw.data4);
        Self(b)
    }

    fn encode(&self) -> WireGuid {
        let b = &self.0;
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&b[8..16]);
        WireGuid {
            data1: U32::from_bytes([b[0], b[1], b[2], b[3]]),
            data2: U16::from_bytes([b[4], b[5]]),
            data3: U16::from_bytes([b[6], b[7]]),
            data4,
        }
    }
}
