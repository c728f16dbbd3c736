//! Variable-length transfer
//!
//! Strings and opaque buffers cross the boundary in one of two modes:
//! - probe: the length of a UCS-2 string is found by scanning for its
//!   terminator, one code unit per read
//! - length-given: the caller declares a byte length, possibly zero
//!
//! Both return a `ScratchBuf`, so release is tied to scope.
//!
//! A scanned string is read twice, once unit by unit and once in bulk. The
//! bulk copy is only accepted if it still ends in a terminator.

use log::warn;

use crate::abi::UserAddr;
use crate::error::{GatewayError, GatewayResult};
use crate::mm::{ScratchBuf, ScratchHeap};

use super::user::{get_user, UserMemory};

/// Size of one UCS-2 code unit in bytes.
pub const UCS2_UNIT: usize = 2;

/// Count the bytes of the string at `src`, including the terminator.
///
/// Note this returns *bytes*, not code units.
pub fn ucs2_strsize<U: UserMemory + ?Sized>(user: &U, src: UserAddr) -> GatewayResult<usize> {
    let mut len = 0usize;
    let mut at = src;
    loop {
        let unit: u16 = get_user(user, at)?;
        len = len.checked_add(UCS2_UNIT).ok_or(GatewayError::BoundaryFault)?;
        if unit == 0 {
            return Ok(len);
        }
        at = at.offset(UCS2_UNIT).ok_or(GatewayError::BoundaryFault)?;
    }
}

/// Copy a terminated UCS-2 string in, sizing the buffer by probing.
///
/// A null source yields `None` without allocating.
pub fn probe_ucs2<'h, U: UserMemory + ?Sized>(
    user: &U,
    heap: &'h ScratchHeap,
    src: Option<UserAddr>,
) -> GatewayResult<Option<ScratchBuf<'h, u8>>> {
    let Some(src) = src else {
        return Ok(None);
    };
    let len = ucs2_strsize(user, src)?;
    let mut buf = heap.alloc::<u8>(len)?;
    copy_ucs2_into(user, src, &mut buf)?;
    Ok(Some(buf))
}

/// Bulk-copy a string whose size was found by scanning into `dst`.
///
/// Fails with `BoundaryFault` if the last code unit read is not the
/// terminator, which happens when the caller rewrote the string between
/// the scan and the copy.
pub fn copy_ucs2_into<U: UserMemory + ?Sized>(
    user: &U,
    src: UserAddr,
    dst: &mut [u8],
) -> GatewayResult<()> {
    user.read(src, dst)?;
    match dst.len().checked_sub(UCS2_UNIT).map(|at| &dst[at..]) {
        Some([0, 0]) => Ok(()),
        _ => {
            warn!("[UACCESS] string at {} lost its terminator", src);
            Err(GatewayError::BoundaryFault)
        }
    }
}

/// Copy exactly `len` bytes in.
///
/// `len == 0` still produces a valid buffer handle, so a zero-length
/// payload can be forwarded and told apart from no payload at all.
pub fn copy_from_user_len<'h, U: UserMemory + ?Sized>(
    user: &U,
    heap: &'h ScratchHeap,
    src: UserAddr,
    len: usize,
) -> GatewayResult<ScratchBuf<'h, u8>> {
    let mut buf = heap.alloc::<u8>(len)?;
    if len > 0 {
        user.read(src, &mut buf)?;
    }
    Ok(buf)
}

/// Copy `src` out to the caller.
pub fn copy_to_user<U: UserMemory + ?Sized>(
    user: &U,
    dst: UserAddr,
    src: &[u8],
) -> GatewayResult<()> {
    user.write(dst, src)
}
