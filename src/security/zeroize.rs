//! Secure Memory Zeroization
//!
//! Volatile writes followed by a compiler fence, so the wipe of a buffer
//! that is about to be freed cannot be optimized away.

use core::ptr;
use core::sync::atomic::{compiler_fence, Ordering};

/// Types whose contents can be securely overwritten with zeros.
pub trait Zeroize {
    /// Overwrite this value with zeros.
    fn zeroize(&mut self);
}

impl Zeroize for [u8] {
    fn zeroize(&mut self) {
        // SAFETY: We have a valid mutable reference to the slice
        unsafe {
            volatile_set_memory(self.as_mut_ptr(), 0, self.len());
        }
        compiler_fence(Ordering::SeqCst);
    }
}

impl<const N: usize> Zeroize for [u8; N] {
    fn zeroize(&mut self) {
        self.as_mut_slice().zeroize();
    }
}

/// Volatile memset that cannot be optimized away.
///
/// # Safety
/// `dst` must be valid for writes of `count` bytes.
#[inline]
unsafe fn volatile_set_memory(dst: *mut u8, val: u8, count: usize) {
    for i in 0..count {
        // SAFETY: Caller guarantees dst is valid for count bytes
        unsafe {
            ptr::write_volatile(dst.add(i), val);
        }
    }
}
