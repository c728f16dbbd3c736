//! Per-opcode handlers
//!
//! Every handler is a straight line:
//!
//! ```text
//! decode request ─▶ acquire inputs ─▶ call firmware ─▶ release ─▶ encode outputs
//! ```
//!
//! Temporary buffers are `ScratchBuf`s and go away with their scope, on the
//! success path and on every `?`. The firmware status is written back before
//! any outcome other than a boundary fault is reported.

use log::error;

use crate::abi::records::{
    GetNextHighMonoCountRequest, GetNextVariableNameRequest, GetTimeRequest,
    GetVariableRequest, GetWakeupTimeRequest, QueryCapsuleCapsRequest,
    QueryVariableInfoRequest, SetTimeRequest, SetVariableRequest, SetWakeupTimeRequest,
};
use crate::abi::{
    Guid, ResetType, Time, TimeCapabilities, UserAddr, VariableAttributes, VariableStoreInfo,
};
use crate::error::{GatewayError, GatewayResult};
use crate::mm::ScratchHeap;
use crate::uaccess::{
    check_status, copy_from_user_len, copy_to_user, copy_ucs2_into, get_user, probe_ucs2,
    put_user, read_declared_size, settle, ucs2_strsize, UserMemory,
};

use super::capsule;
use super::services::RuntimeServices;

/// Everything one invocation works with.
pub struct Call<'a, S, U: ?Sized> {
    pub services: &'a S,
    pub user: &'a U,
    pub heap: &'a ScratchHeap,
}

/// `Some(value)` when the caller supplied an output slot.
fn slot<T>(addr: Option<UserAddr>, value: &mut T) -> Option<&mut T> {
    addr.map(|_| value)
}

pub fn get_variable<S: RuntimeServices, U: UserMemory + ?Sized>(
    cx: &Call<'_, S, U>,
    arg: UserAddr,
) -> GatewayResult<()> {
    let req: GetVariableRequest = get_user(cx.user, arg)?;

    let declared = match req.data_size {
        Some(addr) => Some(read_declared_size(cx.user, addr)?),
        None => None,
    };
    let vendor = match req.guid {
        Some(addr) => Some(get_user::<Guid, _>(cx.user, addr)?),
        None => None,
    };
    let name = probe_ucs2(cx.user, cx.heap, req.name)?;
    let mut data = match (declared, req.data) {
        (Some(capacity), Some(_)) => Some(cx.heap.alloc::<u8>(capacity)?),
        _ => None,
    };

    let mut attributes = VariableAttributes::empty();
    let mut required = declared.unwrap_or(0);
    let status = cx.services.get_variable(
        name.as_ref().map(|n| n.as_units()),
        vendor.as_ref(),
        slot(req.attributes, &mut attributes),
        slot(req.data_size, &mut required),
        data.as_deref_mut(),
    );
    drop(name);

    let verdict = match declared {
        Some(capacity) => settle(status, capacity, required),
        None => check_status(status),
    };

    if verdict.is_ok() {
        if let (Some(buf), Some(dst)) = (&data, req.data) {
            let out = buf.get(..required).ok_or(GatewayError::SizeNegotiation)?;
            copy_to_user(cx.user, dst, out)?;
        }
    }
    drop(data);

    put_user(cx.user, req.status, &status)?;
    if verdict.is_ok() {
        if let Some(addr) = req.attributes {
            put_user(cx.user, addr, &attributes)?;
        }
    }
    if let Some(addr) = req.data_size {
        put_user(cx.user, addr, &(required as u64))?;
    }
    verdict
}

pub fn set_variable<S: RuntimeServices, U: UserMemory + ?Sized>(
    cx: &Call<'_, S, U>,
    arg: UserAddr,
) -> GatewayResult<()> {
    let req: SetVariableRequest = get_user(cx.user, arg)?;
    let vendor: Guid = get_user(cx.user, req.guid)?;

    let name = probe_ucs2(cx.user, cx.heap, req.name)?;
    let len = usize::try_from(req.data_size).map_err(|_| GatewayError::AllocationFailure)?;
    let data = copy_from_user_len(cx.user, cx.heap, req.data, len)?;

    let status = cx.services.set_variable(
        name.as_ref().map(|n| n.as_units()),
        &vendor,
        req.attributes,
        &data,
    );
    drop(data);
    drop(name);

    put_user(cx.user, req.status, &status)?;
    check_status(status)
}

pub fn get_time<S: RuntimeServices, U: UserMemory + ?Sized>(
    cx: &Call<'_, S, U>,
    arg: UserAddr,
) -> GatewayResult<()> {
    let req: GetTimeRequest = get_user(cx.user, arg)?;

    let mut time = Time::default();
    let mut capabilities = TimeCapabilities::default();
    let status = cx.services.get_time(
        slot(req.time, &mut time),
        slot(req.capabilities, &mut capabilities),
    );

    put_user(cx.user, req.status, &status)?;
    if !status.is_success() {
        error!("[EFI] can't read time: {}", status);
        return check_status(status);
    }
    if let Some(addr) = req.capabilities {
        put_user(cx.user, addr, &capabilities)?;
    }
    if let Some(addr) = req.time {
        put_user(cx.user, addr, &time)?;
    }
    Ok(())
}

pub fn set_time<S: RuntimeServices, U: UserMemory + ?Sized>(
    cx: &Call<'_, S, U>,
    arg: UserAddr,
) -> GatewayResult<()> {
    let req: SetTimeRequest = get_user(cx.user, arg)?;
    let time: Time = get_user(cx.user, req.time)?;

    let status = cx.services.set_time(&time);

    put_user(cx.user, req.status, &status)?;
    check_status(status)
}

pub fn get_wakeup_time<S: RuntimeServices, U: UserMemory + ?Sized>(
    cx: &Call<'_, S, U>,
    arg: UserAddr,
) -> GatewayResult<()> {
    let req: GetWakeupTimeRequest = get_user(cx.user, arg)?;

    let mut enabled = false;
    let mut pending = false;
    let mut time = Time::default();
    let status = cx.services.get_wakeup_time(
        slot(req.enabled, &mut enabled),
        slot(req.pending, &mut pending),
        slot(req.time, &mut time),
    );

    put_user(cx.user, req.status, &status)?;
    check_status(status)?;
    if let Some(addr) = req.enabled {
        put_user(cx.user, addr, &enabled)?;
    }
    if let Some(addr) = req.pending {
        put_user(cx.user, addr, &pending)?;
    }
    if let Some(addr) = req.time {
        put_user(cx.user, addr, &time)?;
    }
    Ok(())
}

pub fn set_wakeup_time<S: RuntimeServices, U: UserMemory + ?Sized>(
    cx: &Call<'_, S, U>,
    arg: UserAddr,
) -> GatewayResult<()> {
    let req: SetWakeupTimeRequest = get_user(cx.user, arg)?;
    let time = match req.time {
        Some(addr) => Some(get_user::<Time, _>(cx.user, addr)?),
        None => None,
    };

    let status = cx.services.set_wakeup_time(req.enabled, time.as_ref());

    put_user(cx.user, req.status, &status)?;
    check_status(status)
}

/// Step the variable enumeration.
///
/// The local name buffer is sized to hold both the caller's declared
/// capacity and the full current name, so the name handed to the firmware
/// is never cut short. Size negotiation is still judged against the
/// declared capacity.
pub fn get_next_variable_name<S: RuntimeServices, U: UserMemory + ?Sized>(
    cx: &Call<'_, S, U>,
    arg: UserAddr,
) -> GatewayResult<()> {
    let req: GetNextVariableNameRequest = get_user(cx.user, arg)?;
    let declared = read_declared_size(cx.user, req.name_size)?;
    let mut vendor: Guid = get_user(cx.user, req.guid)?;

    let present = ucs2_strsize(cx.user, req.name)?;
    let capacity = declared
        .max(present)
        .checked_add(1)
        .ok_or(GatewayError::AllocationFailure)?
        & !1;
    let mut name = cx.heap.alloc::<u8>(capacity)?;
    copy_ucs2_into(cx.user, req.name, &mut name[..present])?;

    let mut required = capacity;
    let status = cx
        .services
        .get_next_variable(&mut required, name.as_units_mut(), &mut vendor);
    let verdict = settle(status, declared, required);

    if verdict.is_ok() {
        let out = name.get(..required).ok_or(GatewayError::SizeNegotiation)?;
        copy_to_user(cx.user, req.name, out)?;
    }
    drop(name);

    put_user(cx.user, req.status, &status)?;
    put_user(cx.user, req.name_size, &(required as u64))?;
    put_user(cx.user, req.guid, &vendor)?;
    verdict
}

pub fn get_next_high_mono_count<S: RuntimeServices, U: UserMemory + ?Sized>(
    cx: &Call<'_, S, U>,
    arg: UserAddr,
) -> GatewayResult<()> {
    let req: GetNextHighMonoCountRequest = get_user(cx.user, arg)?;

    let mut count = 0u32;
    let status = cx
        .services
        .get_next_high_mono_count(slot(req.high_count, &mut count));

    put_user(cx.user, req.status, &status)?;
    check_status(status)?;
    if let Some(addr) = req.high_count {
        put_user(cx.user, addr, &count)?;
    }
    Ok(())
}

pub fn query_variable_info<S: RuntimeServices, U: UserMemory + ?Sized>(
    cx: &Call<'_, S, U>,
    arg: UserAddr,
) -> GatewayResult<()> {
    let req: QueryVariableInfoRequest = get_user(cx.user, arg)?;

    let mut info = VariableStoreInfo::default();
    let status = cx.services.query_variable_info(req.attributes, &mut info);

    put_user(cx.user, req.status, &status)?;
    check_status(status)?;
    for (addr, value) in [
        (req.max_storage, info.max_storage),
        (req.remaining, info.remaining),
        (req.max_size, info.max_size),
    ] {
        if let Some(addr) = addr {
            put_user(cx.user, addr, &value)?;
        }
    }
    Ok(())
}

pub fn query_capsule_caps<S: RuntimeServices, U: UserMemory + ?Sized>(
    cx: &Call<'_, S, U>,
    arg: UserAddr,
) -> GatewayResult<()> {
    let req: QueryCapsuleCapsRequest = get_user(cx.user, arg)?;
    let headers = capsule::materialize(cx.user, cx.heap, req.header_array, req.count)?;

    let mut max_size = 0u64;
    let mut reset_type = ResetType::default();
    let status = cx.services.query_capsule_caps(
        &headers,
        headers.len() - 1,
        &mut max_size,
        &mut reset_type,
    );
    drop(headers);

    put_user(cx.user, req.status, &status)?;
    check_status(status)?;
    if let Some(addr) = req.max_capsule_size {
        put_user(cx.user, addr, &max_size)?;
    }
    if let Some(addr) = req.reset_type {
        put_user(cx.user, addr, &reset_type.0)?;
    }
    Ok(())
}
