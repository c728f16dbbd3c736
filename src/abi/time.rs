//! Time and time-capability codecs
//!
//! Field-by-field copies between the caller's packed records and the
//! internal structures. Nothing is clamped or validated here; out-of-range
//! values reach the firmware unchanged.

use zerocopy::little_endian::{I16, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::wire::Wire;

/// Internal time record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Time {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub pad1: u8,
    pub nanosecond: u32,
    pub timezone: i16,
    pub daylight: u8,
    pub pad2: u8,
}

/// Internal clock capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeCapabilities {
    pub resolution: u32,
    pub accuracy: u32,
    pub sets_to_zero: bool,
}

/// Caller-side time record (16 bytes packed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub struct WireTime {
    pub year: U16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub pad1: u8,
    pub nanosecond: U32,
    pub timezone: I16,
    pub daylight: u8,
    pub pad2: u8,
}

/// Caller-side capability record (9 bytes packed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub struct WireTimeCapabilities {
    pub resolution: U32,
    pub accuracy: U32,
    pub sets_to_zero: u8,
}

impl Wire for Time {
    type Raw = WireTime;

    fn decode(t: WireTime) -> Self {
        Self {
            year: t.year.get(),
            month: t.month,
            day: t.day,
            hour: t.hour,
            minute: t.minute,
            second: t.second,
            pad1: t.pad1,
            nanosecond: t.nanosecond.get(),
            timezone: t.timezone.get(),
            daylight: t.daylight,
            pad2: t.pad2,
        }
    }

    fn encode(&self) -> WireTime {
        WireTime {
            year: U16::new(self.year),
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            second: self.second,
            pad1: self.pad1,
            nanosecond: U32::new(self.nanosecond),
            timezone: I16::new(self.timezone),
            daylight: self.daylight,
            pad2: self.pad2,
        }
    }
}

impl Wire for TimeCapabilities {
    type Raw = WireTimeCapabilities;

    /// Any non-zero `sets_to_zero` byte reads as set.
    fn decode(c: WireTimeCapabilities) -> Self {
        Self {
            resolution: c.resolution.get(),
            accuracy: c.accuracy.get(),
            sets_to_zero: bool::decode(c.sets_to_zero),
        }
    }

    fn encode(&self) -> WireTimeCapabilities {
        WireTimeCapabilities {
            resolution: U32::new(self.resolution),
            accuracy: U32::new(self.accuracy),
            sets_to_zero: self.sets_to_zero.encode(),
        }
    }
}
