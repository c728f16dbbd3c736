//! Opcode dispatch
//!
//! A fixed table maps each opcode to its handler. The gateway itself keeps
//! no per-invocation state: everything a handler needs travels in a `Call`
//! built for that one invocation.

use core::fmt;

use log::{debug, warn};

use crate::abi::UserAddr;
use crate::error::{GatewayError, GatewayResult};
use crate::mm::ScratchHeap;
use crate::uaccess::UserMemory;

use super::handlers::{self, Call};
use super::services::RuntimeServices;

/// The fixed set of gateway operations.
///
/// Discriminants are the command numbers used on the device channel.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    GetVariable = 0x01,
    SetVariable = 0x02,
    GetTime = 0x03,
    SetTime = 0x04,
    GetWakeupTime = 0x05,
    SetWakeupTime = 0x06,
    GetNextVariableName = 0x07,
    QueryVariableInfo = 0x08,
    GetNextHighMonotonicCount = 0x09,
    QueryCapsuleCapabilities = 0x0a,
}

impl Opcode {
    pub const COUNT: usize = 10;

    /// Every opcode, in table order.
    pub const ALL: [Opcode; Self::COUNT] = [
        Self::GetVariable,
        Self::SetVariable,
        Self::GetTime,
        Self::SetTime,
        Self::GetWakeupTime,
        Self::SetWakeupTime,
        Self::GetNextVariableName,
        Self::QueryVariableInfo,
        Self::GetNextHighMonotonicCount,
        Self::QueryCapsuleCapabilities,
    ];

    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.raw() == raw)
    }

    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Position in the handler table.
    pub const fn index(self) -> usize {
        self as usize - 1
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::GetVariable => "GetVariable",
            Self::SetVariable => "SetVariable",
            Self::GetTime => "GetTime",
            Self::SetTime => "SetTime",
            Self::GetWakeupTime => "GetWakeupTime",
            Self::SetWakeupTime => "SetWakeupTime",
            Self::GetNextVariableName => "GetNextVariableName",
            Self::QueryVariableInfo => "QueryVariableInfo",
            Self::GetNextHighMonotonicCount => "GetNextHighMonotonicCount",
            Self::QueryCapsuleCapabilities => "QueryCapsuleCapabilities",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed handler: decode, call the firmware, encode.
pub type Handler<'a, S, U> = fn(&Call<'a, S, U>, UserAddr) -> GatewayResult<()>;

impl<'a, S: RuntimeServices, U: UserMemory> Call<'a, S, U> {
    /// Handlers indexed by `Opcode::index`.
    const HANDLERS: [Handler<'a, S, U>; Opcode::COUNT] = [
        handlers::get_variable as Handler<'a, S, U>,
        handlers::set_variable as Handler<'a, S, U>,
        handlers::get_time as Handler<'a, S, U>,
        handlers::set_time as Handler<'a, S, U>,
        handlers::get_wakeup_time as Handler<'a, S, U>,
        handlers::set_wakeup_time as Handler<'a, S, U>,
        handlers::get_next_variable_name as Handler<'a, S, U>,
        handlers::query_variable_info as Handler<'a, S, U>,
        handlers::get_next_high_mono_count as Handler<'a, S, U>,
        handlers::query_capsule_caps as Handler<'a, S, U>,
    ];
}

/// Routes opcodes from the channel to the firmware.
///
/// Shared by every opener of the device; invocations may run concurrently
/// and only meet inside the scratch heap lock and the firmware itself.
pub struct Gateway<S> {
    services: S,
    heap: ScratchHeap,
}

impl<S: RuntimeServices> Gateway<S> {
    pub fn new(services: S, heap: ScratchHeap) -> Self {
        Self { services, heap }
    }

    pub fn services(&self) -> &S {
        &self.services
    }

    pub fn heap(&self) -> &ScratchHeap {
        &self.heap
    }

    /// Run the operation numbered `opcode` on the request record at `arg`.
    pub fn dispatch<U: UserMemory>(
        &self,
        user: &U,
        opcode: u32,
        arg: UserAddr,
    ) -> GatewayResult<()> {
        match Opcode::from_raw(opcode) {
            Some(op) => self.invoke(user, op, arg),
            None => {
                warn!("[EFI] unsupported opcode {:#x}", opcode);
                Err(GatewayError::NotSupported)
            }
        }
    }

    pub fn invoke<U: UserMemory>(&self, user: &U, op: Opcode, arg: UserAddr) -> GatewayResult<()> {
        debug!("[EFI] {} request at {}", op, arg);
        let call = Call {
            services: &self.services,
            user,
            heap: &self.heap,
        };
        let handler = Call::<S, U>::HANDLERS[op.index()];
        handler(&call, arg)
    }
}
