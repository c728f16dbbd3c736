//! Capsule header array marshalling
//!
//! The caller passes an array of pointers, each to one capsule header.
//! Neither level is trusted or assumed inline: every pointer is read, then
//! the header it references, into one contiguous local array.
//!
//! ```text
//! caller:  array ──▶ [p0][p1]..[pN-1]        local: [h0][h1]..[hN-1][reserved]
//!                     │   │                              ▲   ▲
//!                     ▼   ▼                              │   │
//!                    h0  h1  ─────── copied ─────────────┘───┘
//! ```

use crate::abi::{CapsuleHeader, UserAddr};
use crate::error::{GatewayError, GatewayResult};
use crate::mm::{ScratchBuf, ScratchHeap};
use crate::uaccess::{get_user, UserMemory};

/// Size of one pointer in the caller's array.
const POINTER_SIZE: usize = 8;

/// Materialize `count` caller headers into a local array of `count + 1`.
///
/// The final slot is left at its default for the firmware's use. Any
/// failed read discards the partial array.
pub fn materialize<'h, U: UserMemory + ?Sized>(
    user: &U,
    heap: &'h ScratchHeap,
    array: UserAddr,
    count: u64,
) -> GatewayResult<ScratchBuf<'h, CapsuleHeader>> {
    let count = usize::try_from(count).map_err(|_| GatewayError::AllocationFailure)?;
    let slots = count.checked_add(1).ok_or(GatewayError::AllocationFailure)?;
    let mut headers = heap.alloc::<CapsuleHeader>(slots)?;

    for (i, slot) in headers.iter_mut().take(count).enumerate() {
        let entry = i
            .checked_mul(POINTER_SIZE)
            .and_then(|off| array.offset(off))
            .ok_or(GatewayError::BoundaryFault)?;
        let header: UserAddr = get_user(user, entry)?;
        *slot = get_user(user, header)?;
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{CapsuleFlags, Guid, Wire};
    use crate::test_support::{scratch_heap, FakeUser};

    fn header(n: u8) -> CapsuleHeader {
        CapsuleHeader {
            guid: Guid::from_bytes([n; 16]),
            header_size: 28,
            flags: CapsuleFlags::PERSIST_ACROSS_RESET,
            image_size: 0x1000 * u32::from(n),
        }
    }

    fn place_array(user: &FakeUser, n: u8) -> UserAddr {
        let pointers: Vec<u8> = (1..=n)
            .flat_map(|i| user.put(&header(i)).get().to_le_bytes())
            .collect();
        user.place(&pointers)
    }

    #[test]
    fn test_five_headers() {
        let user = FakeUser::new(4096);
        let heap = scratch_heap(8192);
        let array = place_array(&user, 5);

        let local = materialize(&user, &heap, array, 5).unwrap();
        assert_eq!(local.len(), 6);
        assert_eq!(user.reads_of(CapsuleHeader::SIZE), 5);
        assert_eq!(user.reads_of(8), 5);
        for i in 0..5 {
            assert_eq!(local[i], header(i as u8 + 1));
        }
        assert_eq!(local[5], CapsuleHeader::default());
    }

    #[test]
    fn test_zero_headers() {
        let user = FakeUser::new(4096);
        let heap = scratch_heap(4096);
        let local = materialize(&user, &heap, UserAddr::NULL, 0).unwrap();
        assert_eq!(local.len(), 1);
        assert_eq!(user.access_count(), 0);
    }

    #[test]
    fn test_fault_discards_partial_array() {
        let user = FakeUser::new(4096);
        let heap = scratch_heap(8192);
        let array = place_array(&user, 5);
        // pointer, header, pointer, header, pointer -> fault on the 3rd header
        user.fail_on_access(5);
        assert_eq!(
            materialize(&user, &heap, array, 5).err(),
            Some(GatewayError::BoundaryFault)
        );
        assert_eq!(heap.outstanding(), 0);
        assert_eq!(heap.used(), 0);
    }

    #[test]
    fn test_absurd_count_is_allocation_failure() {
        let user = FakeUser::new(4096);
        let heap = scratch_heap(4096);
        assert_eq!(
            materialize(&user, &heap, UserAddr::new(0x1000_0008), u64::MAX).err(),
            Some(GatewayError::AllocationFailure)
        );
        assert_eq!(
            materialize(&user, &heap, UserAddr::new(0x1000_0008), 1 << 20).err(),
            Some(GatewayError::AllocationFailure)
        );
    }
}
