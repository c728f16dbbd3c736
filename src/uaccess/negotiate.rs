//! Size negotiation
//!
//! For every output whose size is not known in advance:
//!
//! ```text
//! caller declares C ──▶ firmware reports R + status
//!        │
//!        ├─ status == Success && C >= R ──▶ copy R bytes out, Success
//!        └─ otherwise ────────────────────▶ report R only, no bytes copied
//! ```
//!
//! Output bytes are never exposed when the declared capacity was too
//! small, even if the firmware claims success.

use crate::abi::{Status, UserAddr};
use crate::error::{GatewayError, GatewayResult};

use super::user::{get_user, UserMemory};

/// Read a caller-declared byte capacity.
///
/// A capacity that does not fit the address space can never be allocated.
pub fn read_declared_size<U: UserMemory + ?Sized>(
    user: &U,
    addr: UserAddr,
) -> GatewayResult<usize> {
    let declared: u64 = get_user(user, addr)?;
    usize::try_from(declared).map_err(|_| GatewayError::AllocationFailure)
}

/// Decide whether `required` bytes of output may be handed to the caller.
pub fn settle(status: Status, declared: usize, required: usize) -> GatewayResult<()> {
    if status.is_success() && declared >= required {
        Ok(())
    } else if status.is_success() || status == Status::BUFFER_TOO_SMALL || declared < required {
        Err(GatewayError::SizeNegotiation)
    } else {
        Err(GatewayError::PrivilegedCall(status))
    }
}

/// Outcome of a call with no variable-length output.
pub fn check_status(status: Status) -> GatewayResult<()> {
    if status.is_success() {
        Ok(())
    } else if status == Status::BUFFER_TOO_SMALL {
        Err(GatewayError::SizeNegotiation)
    } else {
        Err(GatewayError::PrivilegedCall(status))
    }
}
