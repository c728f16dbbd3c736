//! Per-opcode request records
//!
//! Each record is read from the caller in one fixed-size block. Pointer
//! fields that may legitimately be null decode to `Option<UserAddr>`; fields
//! the operation cannot do without stay `UserAddr` and fault when null.
//!
//! ```text
//! GetVariable        name* guid* attributes* data_size* data* status*     48
//! SetVariable        name* guid* attributes:u32 data_size:u64 data* st*  44
//! GetTime            time* caps* status*                                 24
//! SetTime            time* status*                                       16
//! GetWakeupTime      enabled* pending* time* status*                     32
//! SetWakeupTime      enabled:u8 time* status*                            17
//! GetNextVariable    name_size* name* guid* status*                      32
//! QueryVariableInfo  attributes:u32 max_storage* remaining* max_size* st* 36
//! GetNextHighMono    high_count* status*                                 16
//! QueryCapsuleCaps   headers** count:u64 max_size* reset_type* status*   40
//! ```

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::types::VariableAttributes;
use super::wire::{UserAddr, Wire};

/// Declares a request record, its packed caller layout and the `Wire` impl
/// joining them. The raw field types come from each field's own `Wire`
/// impl, so a null optional pointer becomes `None` in `decode`.
macro_rules! request_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident as $raw:ident [$size:literal] {
            $($(#[$fmeta:meta])* pub $field:ident: $ty:ty,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            $($(#[$fmeta])* pub $field: $ty,)*
        }

        #[doc = concat!("Packed caller layout of [`", stringify!($name), "`].")]
        #[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
        #[repr(C, packed)]
        pub struct $raw {
            $(pub $field: <$ty as Wire>::Raw,)*
        }

        const _: () = assert!(core::mem::size_of::<$raw>() == $size);

        impl Wire for $name {
            type Raw = $raw;

            fn decode(raw: $raw) -> Self {
                Self {
                    $($field: <$ty as Wire>::decode(raw.$field),)*
                }
            }

            fn encode(&self) -> $raw {
                $raw {
                    $($field: self.$field.encode(),)*
                }
            }
        }
    };
}

request_record! {
    pub struct GetVariableRequest as WireGetVariable [48] {
        pub name: Option<UserAddr>,
        pub guid: Option<UserAddr>,
        pub attributes: Option<UserAddr>,
        pub data_size: Option<UserAddr>,
        pub data: Option<UserAddr>,
        pub status: UserAddr,
    }
}

request_record! {
    pub struct SetVariableRequest as WireSetVariable [44] {
        pub name: Option<UserAddr>,
        pub guid: UserAddr,
        pub attributes: VariableAttributes,
        pub data_size: u64,
        pub data: UserAddr,
        pub status: UserAddr,
    }
}

request_record! {
    pub struct GetTimeRequest as WireGetTime [24] {
        pub time: Option<UserAddr>,
        pub capabilities: Option<UserAddr>,
        pub status: UserAddr,
    }
}

request_record! {
    pub struct SetTimeRequest as WireSetTime [16] {
        pub time: UserAddr,
        pub status: UserAddr,
    }
}

request_record! {
    pub struct GetWakeupTimeRequest as WireGetWakeupTime [32] {
        pub enabled: Option<UserAddr>,
        pub pending: Option<UserAddr>,
        pub time: Option<UserAddr>,
        pub status: UserAddr,
    }
}

request_record! {
    pub struct SetWakeupTimeRequest as WireSetWakeupTime [17] {
        pub enabled: bool,
        pub time: Option<UserAddr>,
        pub status: UserAddr,
    }
}

request_record! {
    pub struct GetNextVariableNameRequest as WireGetNextVariableName [32] {
        pub name_size: UserAddr,
        pub name: UserAddr,
        pub guid: UserAddr,
        pub status: UserAddr,
    }
}

request_record! {
    pub struct QueryVariableInfoRequest as WireQueryVariableInfo [36] {
        pub attributes: VariableAttributes,
        pub max_storage: Option<UserAddr>,
        pub remaining: Option<UserAddr>,
        pub max_size: Option<UserAddr>,
        pub status: UserAddr,
    }
}

request_record! {
    pub struct GetNextHighMonoCountRequest as WireGetNextHighMonoCount [16] {
        pub high_count: Option<UserAddr>,
        pub status: UserAddr,
    }
}

request_record! {
    pub struct QueryCapsuleCapsRequest as WireQueryCapsuleCaps [40] {
        /// Caller array of `count` pointers, each to one capsule header.
        pub header_array: UserAddr,
        pub count: u64,
        pub max_capsule_size: Option<UserAddr>,
        pub reset_type: Option<UserAddr>,
        pub status: UserAddr,
    }
}
