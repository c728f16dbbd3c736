//! Scratch Heap
//!
//! Private memory for the temporary buffers of in-flight invocations.
//! Uses `linked_list_allocator` over a region handed in by the embedder.
//!
//! # Ownership
//! - Every buffer is a `ScratchBuf`, owned by exactly one invocation
//! - Release happens in `Drop`, so every exit path frees exactly once
//! - Bytes are zeroized before the memory returns to the heap
//!
//! The heap lock is held only for the allocate/deallocate instant, never
//! across an access to caller memory.

use core::alloc::Layout;
use core::mem::{self, MaybeUninit};
use core::ops::{Deref, DerefMut};
use core::ptr::{self, NonNull};
use core::slice;
use core::sync::atomic::{AtomicUsize, Ordering};

use linked_list_allocator::Heap;
use log::warn;
use spin::Mutex;

use crate::error::{GatewayError, GatewayResult};
use crate::security::Zeroize;

/// Default size of the scratch region (64 KiB).
pub const DEFAULT_SCRATCH_SIZE: usize = 64 * 1024;

/// Smallest allocation handed out: one UCS-2 code unit.
///
/// Zero-length requests still receive a real, distinguishable buffer.
pub const PLACEHOLDER_BYTES: usize = 2;

/// Minimum alignment of every scratch buffer.
const SCRATCH_ALIGN: usize = mem::align_of::<u64>();

/// Heap backing all temporary buffers.
pub struct ScratchHeap {
    heap: Mutex<Heap>,
    allocations: AtomicUsize,
    releases: AtomicUsize,
}

impl ScratchHeap {
    /// Create a heap over `region`.
    pub fn new(region: &'static mut [MaybeUninit<u8>]) -> Self {
        Self {
            heap: Mutex::new(Heap::from_slice(region)),
            allocations: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
        }
    }

    /// Create a heap with no memory; every allocation fails until `init`.
    pub const fn empty() -> Self {
        Self {
            heap: Mutex::new(Heap::empty()),
            allocations: AtomicUsize::new(0),
            releases: AtomicUsize::new(0),
        }
    }

    /// Hand the heap its memory region.
    ///
    /// # Safety
    /// - `start..start + size` must be valid, writable and unused elsewhere
    /// - Must only be called once, before any allocation
    pub unsafe fn init(&self, start: *mut u8, size: usize) {
        // SAFETY: Caller guarantees the region is valid and exclusive
        unsafe {
            self.heap.lock().init(start, size);
        }
    }

    /// Total size of the region.
    pub fn size(&self) -> usize {
        self.heap.lock().size()
    }

    /// Bytes currently handed out.
    pub fn used(&self) -> usize {
        self.heap.lock().used()
    }

    /// Number of successful allocations so far.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Number of releases so far.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::Relaxed)
    }

    /// Buffers acquired and not yet released.
    pub fn outstanding(&self) -> usize {
        self.allocations().saturating_sub(self.releases())
    }

    /// Allocate `len` elements, each initialized to `T::default()`.
    ///
    /// The allocation covers at least `PLACEHOLDER_BYTES`, so `len == 0`
    /// still yields a valid buffer.
    pub fn alloc<T: Copy + Default>(&self, len: usize) -> GatewayResult<ScratchBuf<'_, T>> {
        let array = Layout::array::<T>(len).map_err(|_| GatewayError::AllocationFailure)?;
        let layout = Layout::from_size_align(
            array.size().max(PLACEHOLDER_BYTES),
            array.align().max(SCRATCH_ALIGN),
        )
        .map_err(|_| GatewayError::AllocationFailure)?;

        let raw = self.heap.lock().allocate_first_fit(layout).map_err(|_| {
            warn!("[SCRATCH] allocation of {} bytes failed", layout.size());
            GatewayError::AllocationFailure
        })?;
        self.allocations.fetch_add(1, Ordering::Relaxed);

        // SAFETY:
        // - raw is valid for layout.size() bytes and aligned for T
        // - len elements of T fit inside layout.size()
        unsafe {
            ptr::write_bytes(raw.as_ptr(), 0, layout.size());
            let elems = raw.as_ptr() as *mut T;
            for i in 0..len {
                elems.add(i).write(T::default());
            }
        }

        Ok(ScratchBuf {
            heap: self,
            ptr: raw.cast(),
            len,
            layout,
        })
    }

    fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: ptr was returned by allocate_first_fit with this layout
        // and is released exactly once, from ScratchBuf::drop
        unsafe {
            self.heap.lock().deallocate(ptr, layout);
        }
        self.releases.fetch_add(1, Ordering::Relaxed);
    }
}

/// A temporary buffer owned by one invocation.
///
/// Dereferences to `[T]` of the requested length.
pub struct ScratchBuf<'h, T: Copy> {
    heap: &'h ScratchHeap,
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
}

impl<T: Copy> ScratchBuf<'_, T> {
    /// Bytes actually reserved, including placeholder slack.
    pub fn capacity_bytes(&self) -> usize {
        self.layout.size()
    }

    /// Address of the allocation.
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }
}

impl ScratchBuf<'_, u8> {
    /// View the bytes as UCS-2 code units; a trailing odd byte is excluded.
    pub fn as_units(&self) -> &[u16] {
        // SAFETY: allocation is aligned to 8 and covers len bytes
        unsafe { slice::from_raw_parts(self.ptr.as_ptr() as *const u16, self.len / 2) }
    }

    pub fn as_units_mut(&mut self) -> &mut [u16] {
        // SAFETY: as above; &mut self guarantees exclusivity
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr() as *mut u16, self.len / 2) }
    }
}

impl<T: Copy> Deref for ScratchBuf<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        // SAFETY: len initialized elements live at ptr
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Copy> DerefMut for ScratchBuf<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: len initialized elements live at ptr, uniquely owned
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Copy> Drop for ScratchBuf<'_, T> {
    fn drop(&mut self) {
        let bytes = self.ptr.cast::<u8>();
        // SAFETY: the whole allocation was zero-filled at creation and is
        // still exclusively ours
        unsafe { slice::from_raw_parts_mut(bytes.as_ptr(), self.layout.size()) }.zeroize();
        self.heap.release(bytes, self.layout);
    }
}
