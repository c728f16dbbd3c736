//! Caller Memory Access
//!
//! Provides validated reads and writes across the trust boundary.
//!
//! # Security Principles
//! - Validate ALL addresses before use
//! - Fail-secure: deny by default
//! - Prevent common vulnerabilities:
//!   - Buffer overflows (bounds checking)
//!   - TOCTOU races (one copy into gateway memory)
//!   - Null pointer dereference (explicit checks)

use core::ptr;

use log::warn;
use zerocopy::{FromZeros, IntoBytes};

use crate::abi::{UserAddr, Wire};
use crate::error::{GatewayError, GatewayResult};

/// Access to one caller's memory.
///
/// Implementations report any failed access as `BoundaryFault` and must not
/// panic on caller-controlled addresses.
pub trait UserMemory {
    /// Copy `dst.len()` bytes from caller address `addr`.
    fn read(&self, addr: UserAddr, dst: &mut [u8]) -> GatewayResult<()>;

    /// Copy `src` to caller address `addr`.
    fn write(&self, addr: UserAddr, src: &[u8]) -> GatewayResult<()>;
}

/// Caller memory that is directly mapped into the gateway's address space
/// as the window `[start, end)`.
#[derive(Debug, Clone, Copy)]
pub struct UserWindow {
    start: u64,
    end: u64,
}

impl UserWindow {
    /// Create a window over caller memory.
    ///
    /// # Safety
    /// Every address in `[start, end)` must stay mapped, readable and
    /// writable for as long as the window is used.
    pub const unsafe fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Validate an access of `len` bytes at `addr`.
    ///
    /// # Security Checks
    /// 1. Pointer is not null
    /// 2. Pointer is within the window
    /// 3. Pointer + length doesn't overflow
    /// 4. End address is within the window
    fn check(&self, addr: UserAddr, len: usize) -> GatewayResult<()> {
        // Zero-length accesses are valid
        if len == 0 {
            return Ok(());
        }

        let start = addr.get();
        if start == 0 || start < self.start || start >= self.end {
            return Err(GatewayError::BoundaryFault);
        }

        let end = addr.offset(len).ok_or(GatewayError::BoundaryFault)?;
        if end.get() > self.end {
            return Err(GatewayError::BoundaryFault);
        }

        Ok(())
    }
}

impl UserMemory for UserWindow {
    fn read(&self, addr: UserAddr, dst: &mut [u8]) -> GatewayResult<()> {
        self.check(addr, dst.len())?;
        if dst.is_empty() {
            return Ok(());
        }
        // SAFETY:
        // - Range is validated to lie inside the window
        // - The window is mapped per the contract of UserWindow::new
        // - dst is gateway memory and cannot overlap the caller window
        unsafe {
            ptr::copy_nonoverlapping(
                addr.get() as usize as *const u8,
                dst.as_mut_ptr(),
                dst.len(),
            );
        }
        Ok(())
    }

    fn write(&self, addr: UserAddr, src: &[u8]) -> GatewayResult<()> {
        self.check(addr, src.len())?;
        if src.is_empty() {
            return Ok(());
        }
        // SAFETY: Same as read
        unsafe {
            ptr::copy_nonoverlapping(
                src.as_ptr(),
                addr.get() as usize as *mut u8,
                src.len(),
            );
        }
        Ok(())
    }
}

/// Read one fixed-size record from the caller.
///
/// The record is copied into gateway memory in one access and decoded from
/// that copy.
pub fn get_user<T: Wire, U: UserMemory + ?Sized>(user: &U, addr: UserAddr) -> GatewayResult<T> {
    let mut raw = T::Raw::new_zeroed();
    user.read(addr, raw.as_mut_bytes()).map_err(|e| {
        warn!("[UACCESS] read of {} bytes at {} faulted", T::SIZE, addr);
        e
    })?;
    Ok(T::decode(raw))
}

/// Write one fixed-size record to the caller.
pub fn put_user<T: Wire, U: UserMemory + ?Sized>(
    user: &U,
    addr: UserAddr,
    value: &T,
) -> GatewayResult<()> {
    let raw = value.encode();
    user.write(addr, raw.as_bytes()).map_err(|e| {
        warn!("[UACCESS] write of {} bytes at {} faulted", T::SIZE, addr);
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::Guid;

    fn window_over(mem: &mut [u8]) -> UserWindow {
        let start = mem.as_mut_ptr() as u64;
        // SAFETY: mem outlives every use of the window in these tests
        unsafe { UserWindow::new(start, start + mem.len() as u64) }
    }

    #[test]
    fn test_zero_length() {
        let mut mem = [0u8; 16];
        let win = window_over(&mut mem);
        assert!(win.read(UserAddr::NULL, &mut []).is_ok());
    }

    #[test]
    fn test_null_pointer() {
        let mut mem = [0u8; 16];
        let win = window_over(&mut mem);
        let mut buf = [0u8; 4];
        assert_eq!(
            win.read(UserAddr::NULL, &mut buf),
            Err(GatewayError::BoundaryFault)
        );
    }

    #[test]
    fn test_overflow() {
        let win = unsafe { UserWindow::new(0x1000, u64::MAX) };
        let mut buf = [0u8; 100];
        assert_eq!(
            win.read(UserAddr::new(u64::MAX - 10), &mut buf),
            Err(GatewayError::BoundaryFault)
        );
    }

    #[test]
    fn test_range_past_window_end() {
        let mut mem = [0u8; 16];
        let win = window_over(&mut mem);
        let base = UserAddr::new(mem.as_ptr() as u64);
        let mut buf = [0u8; 8];
        assert!(win.read(base.offset(8).unwrap(), &mut buf).is_ok());
        assert_eq!(
            win.read(base.offset(9).unwrap(), &mut buf),
            Err(GatewayError::BoundaryFault)
        );
    }

    #[test]
    fn test_typed_round_trip_through_window() {
        let mut mem = [0u8; 32];
        let win = window_over(&mut mem);
        let at = UserAddr::new(mem.as_ptr() as u64 + 8);
        let guid = Guid::from_bytes([1, 0, 0, 0, 2, 0, 3, 0, 4, 4, 4, 4, 4, 4, 4, 4]);
        put_user(&win, at, &guid).unwrap();
        assert_eq!(&mem[8..12], &1u32.to_le_bytes());
        assert_eq!(get_user::<Guid, _>(&win, at).unwrap(), guid);
    }
}
