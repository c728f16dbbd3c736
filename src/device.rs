//! Character device front end
//!
//! Exposes the gateway as the `efi_runtime` device. Callers issue one ioctl
//! per operation; the command number encodes the opcode and the size of
//! its request record, Linux style:
//!
//! ```text
//!  31 30 29          16 15       8 7        0
//! [ dir ][    size     ][   'p'   ][   nr   ]
//! ```
//!
//! The device is only plumbing: every command is forwarded to the gateway
//! and its outcome collapsed to `0` or a negative errno.

use core::sync::atomic::{AtomicUsize, Ordering};

use log::info;

use crate::abi::records::{
    GetNextHighMonoCountRequest, GetNextVariableNameRequest, GetTimeRequest, GetVariableRequest,
    GetWakeupTimeRequest, QueryCapsuleCapsRequest, QueryVariableInfoRequest, SetTimeRequest,
    SetVariableRequest, SetWakeupTimeRequest,
};
use crate::abi::{UserAddr, Wire};
use crate::error::{to_return_code, Errno};
use crate::gateway::{Gateway, Opcode, RuntimeServices};
use crate::uaccess::UserMemory;
use crate::DRIVER_VERSION;

/// Name the device is registered under.
pub const DEVICE_NAME: &str = "efi_runtime";

/// ioctl type byte shared by every command.
pub const IOC_TYPE: u8 = b'p';

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;

const IOC_TYPESHIFT: u32 = IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

/// Caller writes the record.
pub const IOC_WRITE: u32 = 1;
/// Caller reads the record.
pub const IOC_READ: u32 = 2;

/// Encode an ioctl command number.
pub const fn ioc(dir: u32, ty: u8, nr: u32, size: usize) -> u32 {
    (dir << IOC_DIRSHIFT)
        | (((size as u32) & ((1 << IOC_SIZEBITS) - 1)) << IOC_SIZESHIFT)
        | ((ty as u32) << IOC_TYPESHIFT)
        | nr
}

/// The command number for `op`.
pub const fn command(op: Opcode) -> u32 {
    let (dir, size) = match op {
        Opcode::GetVariable => (IOC_READ | IOC_WRITE, GetVariableRequest::SIZE),
        Opcode::SetVariable => (IOC_WRITE, SetVariableRequest::SIZE),
        Opcode::GetTime => (IOC_READ, GetTimeRequest::SIZE),
        Opcode::SetTime => (IOC_WRITE, SetTimeRequest::SIZE),
        Opcode::GetWakeupTime => (IOC_READ, GetWakeupTimeRequest::SIZE),
        Opcode::SetWakeupTime => (IOC_WRITE, SetWakeupTimeRequest::SIZE),
        Opcode::GetNextVariableName => (IOC_READ | IOC_WRITE, GetNextVariableNameRequest::SIZE),
        Opcode::QueryVariableInfo => (IOC_READ, QueryVariableInfoRequest::SIZE),
        Opcode::GetNextHighMonotonicCount => (IOC_READ, GetNextHighMonoCountRequest::SIZE),
        Opcode::QueryCapsuleCapabilities => (IOC_READ, QueryCapsuleCapsRequest::SIZE),
    };
    ioc(dir, IOC_TYPE, op.raw(), size)
}

/// Map a command number back to its opcode.
pub fn decode_command(cmd: u32) -> Option<Opcode> {
    Opcode::ALL.iter().copied().find(|&op| command(op) == cmd)
}

/// The registered device.
pub struct RuntimeDevice<S> {
    gateway: Gateway<S>,
    openers: AtomicUsize,
}

impl<S: RuntimeServices> RuntimeDevice<S> {
    /// Bring the device up over `gateway`.
    ///
    /// Fails with `ENODEV` when the platform did not enable runtime
    /// services.
    pub fn probe(gateway: Gateway<S>, runtime_enabled: bool) -> Result<Self, Errno> {
        info!("EFI_RUNTIME Driver v{}", DRIVER_VERSION);
        if !runtime_enabled {
            info!("EFI runtime services not enabled.");
            return Err(Errno::Enodev);
        }
        Ok(Self {
            gateway,
            openers: AtomicUsize::new(0),
        })
    }

    /// Any number of concurrent openers is accepted.
    pub fn open(&self) -> i64 {
        self.openers.fetch_add(1, Ordering::AcqRel);
        0
    }

    pub fn release(&self) -> i64 {
        let _ = self
            .openers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        0
    }

    pub fn openers(&self) -> usize {
        self.openers.load(Ordering::Acquire)
    }

    pub fn gateway(&self) -> &Gateway<S> {
        &self.gateway
    }

    /// Handle one ioctl. Returns `0` or a negative errno.
    pub fn ioctl<U: UserMemory>(&self, user: &U, cmd: u32, arg: u64) -> i64 {
        match decode_command(cmd) {
            Some(op) => to_return_code(self.gateway.invoke(user, op, UserAddr::new(arg))),
            None => Errno::Enotty as i64,
        }
    }

    /// Unregister, handing the gateway back.
    pub fn remove(self) -> Gateway<S> {
        info!("EFI_RUNTIME Driver Exit.");
        self.gateway
    }
}
