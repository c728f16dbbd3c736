//! Test doubles: a flat fake caller address space and an in-memory
//! firmware.

use std::boxed::Box;
use std::mem::MaybeUninit;
use std::vec;
use std::vec::Vec;

use core::sync::atomic::{AtomicU32, Ordering};

use spin::Mutex;
use zerocopy::{FromZeros, IntoBytes};

use crate::abi::{
    CapsuleFlags, CapsuleHeader, Guid, ResetType, Status, Time, TimeCapabilities, UserAddr,
    VariableAttributes, VariableStoreInfo, Wire,
};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::RuntimeServices;
use crate::mm::ScratchHeap;
use crate::uaccess::UserMemory;

/// Base address of every `FakeUser`.
pub const FAKE_BASE: u64 = 0x1000_0000;

/// Byte freshly reserved caller memory is filled with.
pub const FILL: u8 = 0xee;

/// Scratch heap over a leaked region of `size` bytes.
pub fn scratch_heap(size: usize) -> ScratchHeap {
    let region = vec![MaybeUninit::<u8>::uninit(); size].into_boxed_slice();
    ScratchHeap::new(Box::leak(region))
}

/// Null-terminated UCS-2 encoding of `s`.
pub fn ucs2z(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(Some(0)).collect()
}

struct FakeState {
    mem: Vec<u8>,
    next: usize,
    accesses: usize,
    fail_at: Option<usize>,
    reads: Vec<usize>,
}

/// Caller memory: one flat region at `FAKE_BASE`.
///
/// Setup helpers (`put`, `place`, `peek`, ...) bypass access counting and
/// fault injection; only `UserMemory` accesses are counted.
pub struct FakeUser {
    state: Mutex<FakeState>,
}

impl FakeUser {
    pub fn new(size: usize) -> Self {
        Self {
            state: Mutex::new(FakeState {
                mem: vec![0; size],
                next: 8,
                accesses: 0,
                fail_at: None,
                reads: Vec::new(),
            }),
        }
    }

    /// Reserve `len` bytes filled with `FILL`.
    pub fn reserve(&self, len: usize) -> UserAddr {
        let mut st = self.state.lock();
        let at = (st.next + 7) & !7;
        st.next = at + len.max(1);
        st.mem[at..at + len].fill(FILL);
        UserAddr::new(FAKE_BASE + at as u64)
    }

    pub fn place(&self, bytes: &[u8]) -> UserAddr {
        let addr = self.reserve(bytes.len());
        self.poke(addr, bytes);
        addr
    }

    pub fn put<T: Wire>(&self, value: &T) -> UserAddr {
        let raw = value.encode();
        self.place(raw.as_bytes())
    }

    pub fn ucs2(&self, s: &str) -> UserAddr {
        let bytes: Vec<u8> = ucs2z(s).iter().flat_map(|u| u.to_le_bytes()).collect();
        self.place(&bytes)
    }

    pub fn poke(&self, addr: UserAddr, bytes: &[u8]) {
        let mut st = self.state.lock();
        let off = (addr.get() - FAKE_BASE) as usize;
        st.mem[off..off + bytes.len()].copy_from_slice(bytes);
    }

    pub fn peek(&self, addr: UserAddr, len: usize) -> Vec<u8> {
        let st = self.state.lock();
        let off = (addr.get() - FAKE_BASE) as usize;
        st.mem[off..off + len].to_vec()
    }

    pub fn get<T: Wire>(&self, addr: UserAddr) -> T {
        let mut raw = T::Raw::new_zeroed();
        raw.as_mut_bytes().copy_from_slice(&self.peek(addr, T::SIZE));
        T::decode(raw)
    }

    /// Make the `n`-th access from now (0-based) fault.
    pub fn fail_on_access(&self, n: usize) {
        let mut st = self.state.lock();
        st.fail_at = Some(st.accesses + n);
    }

    pub fn access_count(&self) -> usize {
        self.state.lock().accesses
    }

    /// Number of reads of exactly `len` bytes.
    pub fn reads_of(&self, len: usize) -> usize {
        self.state.lock().reads.iter().filter(|&&n| n == len).count()
    }

    fn range(st: &FakeState, addr: UserAddr, len: usize) -> GatewayResult<usize> {
        let off = addr
            .get()
            .checked_sub(FAKE_BASE)
            .ok_or(GatewayError::BoundaryFault)? as usize;
        match off.checked_add(len) {
            Some(end) if addr.get() != 0 && end <= st.mem.len() => Ok(off),
            _ => Err(GatewayError::BoundaryFault),
        }
    }

    fn begin_access(st: &mut FakeState) -> GatewayResult<()> {
        let idx = st.accesses;
        st.accesses += 1;
        if st.fail_at == Some(idx) {
            return Err(GatewayError::BoundaryFault);
        }
        Ok(())
    }
}

impl UserMemory for FakeUser {
    fn read(&self, addr: UserAddr, dst: &mut [u8]) -> GatewayResult<()> {
        let mut st = self.state.lock();
        Self::begin_access(&mut st)?;
        let off = Self::range(&st, addr, dst.len())?;
        st.reads.push(dst.len());
        dst.copy_from_slice(&st.mem[off..off + dst.len()]);
        Ok(())
    }

    fn write(&self, addr: UserAddr, src: &[u8]) -> GatewayResult<()> {
        let mut st = self.state.lock();
        Self::begin_access(&mut st)?;
        let off = Self::range(&st, addr, src.len())?;
        st.mem[off..off + src.len()].copy_from_slice(src);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: Vec<u16>,
    pub guid: Guid,
    pub attributes: VariableAttributes,
    pub data: Vec<u8>,
}

/// What the firmware observed and holds.
pub struct MockState {
    pub variables: Vec<Variable>,
    pub time: Time,
    pub capabilities: TimeCapabilities,
    pub wakeup_enabled: bool,
    pub wakeup_pending: bool,
    pub wakeup_time: Time,
    pub forced: Option<Status>,
    pub last_set_len: Option<usize>,
    pub last_next_name_in: Vec<u16>,
    pub last_next_capacity: usize,
    pub capsules_seen: Vec<CapsuleHeader>,
    pub capsule_count_seen: usize,
}

/// In-memory firmware.
pub struct MockFirmware {
    pub state: Mutex<MockState>,
    counter: AtomicU32,
}

/// Part of `units` before the terminator.
fn trim_z(units: &[u16]) -> &[u16] {
    match units.iter().position(|&u| u == 0) {
        Some(end) => &units[..end],
        None => units,
    }
}

impl MockFirmware {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                variables: Vec::new(),
                time: Time::default(),
                capabilities: TimeCapabilities {
                    resolution: 1,
                    accuracy: 50_000_000,
                    sets_to_zero: false,
                },
                wakeup_enabled: false,
                wakeup_pending: false,
                wakeup_time: Time::default(),
                forced: None,
                last_set_len: None,
                last_next_name_in: Vec::new(),
                last_next_capacity: 0,
                capsules_seen: Vec::new(),
                capsule_count_seen: 0,
            }),
            counter: AtomicU32::new(0),
        }
    }

    pub fn with_variable(self, name: &str, guid: Guid, data: &[u8]) -> Self {
        self.state.lock().variables.push(Variable {
            name: ucs2z(name),
            guid,
            attributes: VariableAttributes::NON_VOLATILE
                | VariableAttributes::BOOTSERVICE_ACCESS
                | VariableAttributes::RUNTIME_ACCESS,
            data: data.to_vec(),
        });
        self
    }

    /// Make every call return `status`.
    pub fn force(&self, status: Option<Status>) {
        self.state.lock().forced = status;
    }
}

impl RuntimeServices for MockFirmware {
    fn get_variable(
        &self,
        name: Option<&[u16]>,
        vendor: Option<&Guid>,
        attributes: Option<&mut VariableAttributes>,
        data_size: Option<&mut usize>,
        data: Option<&mut [u8]>,
    ) -> Status {
        let st = self.state.lock();
        if let Some(status) = st.forced {
            return status;
        }
        let (Some(name), Some(vendor), Some(size)) = (name, vendor, data_size) else {
            return Status::INVALID_PARAMETER;
        };
        let Some(var) = st
            .variables
            .iter()
            .find(|v| trim_z(&v.name) == trim_z(name) && v.guid == *vendor)
        else {
            return Status::NOT_FOUND;
        };
        if *size < var.data.len() {
            *size = var.data.len();
            return Status::BUFFER_TOO_SMALL;
        }
        let Some(out) = data.and_then(|d| d.get_mut(..var.data.len())) else {
            return Status::INVALID_PARAMETER;
        };
        out.copy_from_slice(&var.data);
        if let Some(attributes) = attributes {
            *attributes = var.attributes;
        }
        *size = var.data.len();
        Status::SUCCESS
    }

    fn set_variable(
        &self,
        name: Option<&[u16]>,
        vendor: &Guid,
        attributes: VariableAttributes,
        data: &[u8],
    ) -> Status {
        let mut st = self.state.lock();
        st.last_set_len = Some(data.len());
        if let Some(status) = st.forced {
            return status;
        }
        let Some(name) = name else {
            return Status::INVALID_PARAMETER;
        };
        let pos = st
            .variables
            .iter()
            .position(|v| trim_z(&v.name) == trim_z(name) && v.guid == *vendor);
        match (pos, data.is_empty()) {
            (Some(i), true) => {
                st.variables.remove(i);
            }
            (None, true) => return Status::NOT_FOUND,
            (Some(i), false) => {
                st.variables[i].data = data.to_vec();
                st.variables[i].attributes = attributes;
            }
            (None, false) => st.variables.push(Variable {
                name: trim_z(name).iter().copied().chain(Some(0)).collect(),
                guid: *vendor,
                attributes,
                data: data.to_vec(),
            }),
        }
        Status::SUCCESS
    }

    fn get_time(
        &self,
        time: Option<&mut Time>,
        capabilities: Option<&mut TimeCapabilities>,
    ) -> Status {
        let st = self.state.lock();
        if let Some(status) = st.forced {
            return status;
        }
        if let Some(time) = time {
            *time = st.time;
        }
        if let Some(capabilities) = capabilities {
            *capabilities = st.capabilities;
        }
        Status::SUCCESS
    }

    fn set_time(&self, time: &Time) -> Status {
        let mut st = self.state.lock();
        if let Some(status) = st.forced {
            return status;
        }
        st.time = *time;
        Status::SUCCESS
    }

    fn get_wakeup_time(
        &self,
        enabled: Option<&mut bool>,
        pending: Option<&mut bool>,
        time: Option<&mut Time>,
    ) -> Status {
        let st = self.state.lock();
        if let Some(status) = st.forced {
            return status;
        }
        if let Some(enabled) = enabled {
            *enabled = st.wakeup_enabled;
        }
        if let Some(pending) = pending {
            *pending = st.wakeup_pending;
        }
        if let Some(time) = time {
            *time = st.wakeup_time;
        }
        Status::SUCCESS
    }

    fn set_wakeup_time(&self, enabled: bool, time: Option<&Time>) -> Status {
        let mut st = self.state.lock();
        if let Some(status) = st.forced {
            return status;
        }
        st.wakeup_enabled = enabled;
        if let Some(time) = time {
            st.wakeup_time = *time;
        }
        Status::SUCCESS
    }

    fn get_next_variable(
        &self,
        name_size: &mut usize,
        name: &mut [u16],
        vendor: &mut Guid,
    ) -> Status {
        let mut st = self.state.lock();
        st.last_next_name_in = trim_z(name).to_vec();
        st.last_next_capacity = *name_size;
        if let Some(status) = st.forced {
            return status;
        }
        let current = trim_z(name);
        let idx = if current.is_empty() {
            0
        } else {
            match st
                .variables
                .iter()
                .position(|v| trim_z(&v.name) == current && v.guid == *vendor)
            {
                Some(i) => i + 1,
                None => return Status::NOT_FOUND,
            }
        };
        let Some(next) = st.variables.get(idx) else {
            return Status::NOT_FOUND;
        };
        let needed = next.name.len() * 2;
        if *name_size < needed {
            *name_size = needed;
            return Status::BUFFER_TOO_SMALL;
        }
        let Some(out) = name.get_mut(..next.name.len()) else {
            return Status::BUFFER_TOO_SMALL;
        };
        out.copy_from_slice(&next.name);
        *name_size = needed;
        *vendor = next.guid;
        Status::SUCCESS
    }

    fn get_next_high_mono_count(&self, count: Option<&mut u32>) -> Status {
        if let Some(status) = self.state.lock().forced {
            return status;
        }
        let Some(count) = count else {
            return Status::INVALID_PARAMETER;
        };
        *count = self.counter.fetch_add(1, Ordering::Relaxed);
        Status::SUCCESS
    }

    fn query_variable_info(
        &self,
        _attributes: VariableAttributes,
        info: &mut VariableStoreInfo,
    ) -> Status {
        let st = self.state.lock();
        if let Some(status) = st.forced {
            return status;
        }
        let used: usize = st.variables.iter().map(|v| v.data.len()).sum();
        *info = VariableStoreInfo {
            max_storage: 65_536,
            remaining: 65_536 - used as u64,
            max_size: 1_024,
        };
        Status::SUCCESS
    }

    fn query_capsule_caps(
        &self,
        capsules: &[CapsuleHeader],
        count: usize,
        max_size: &mut u64,
        reset_type: &mut ResetType,
    ) -> Status {
        let mut st = self.state.lock();
        st.capsules_seen = capsules.to_vec();
        st.capsule_count_seen = count;
        if let Some(status) = st.forced {
            return status;
        }
        let used = &capsules[..count.min(capsules.len())];
        *max_size = used.iter().map(|c| u64::from(c.image_size)).sum();
        *reset_type = if used
            .iter()
            .any(|c| c.flags.contains(CapsuleFlags::PERSIST_ACROSS_RESET))
        {
            ResetType::WARM
        } else {
            ResetType::COLD
        };
        Status::SUCCESS
    }
}
