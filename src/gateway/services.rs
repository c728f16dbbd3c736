//! The privileged firmware services behind the gateway.

use crate::abi::{
    CapsuleHeader, Guid, ResetType, Status, Time, TimeCapabilities, VariableAttributes,
    VariableStoreInfo,
};

/// Synchronous EFI runtime services.
///
/// Arguments are in internal representation. `None` for an optional
/// argument means the caller did not request that output (or did not
/// supply that input); it is not an error by itself.
///
/// Implementations must be safe to call from several invocations at once;
/// the gateway adds no locking of its own.
pub trait RuntimeServices {
    /// Read a variable.
    ///
    /// `data_size` holds the capacity of `data` on entry and the size of
    /// the value on return, including when the status is `BUFFER_TOO_SMALL`.
    fn get_variable(
        &self,
        name: Option<&[u16]>,
        vendor: Option<&Guid>,
        attributes: Option<&mut VariableAttributes>,
        data_size: Option<&mut usize>,
        data: Option<&mut [u8]>,
    ) -> Status;

    /// Write (or, with empty `data`, delete) a variable.
    fn set_variable(
        &self,
        name: Option<&[u16]>,
        vendor: &Guid,
        attributes: VariableAttributes,
        data: &[u8],
    ) -> Status;

    fn get_time(&self, time: Option<&mut Time>, capabilities: Option<&mut TimeCapabilities>)
        -> Status;

    fn set_time(&self, time: &Time) -> Status;

    fn get_wakeup_time(
        &self,
        enabled: Option<&mut bool>,
        pending: Option<&mut bool>,
        time: Option<&mut Time>,
    ) -> Status;

    /// `time == None` together with `enabled == false` disables the alarm.
    fn set_wakeup_time(&self, enabled: bool, time: Option<&Time>) -> Status;

    /// Step the variable enumeration.
    ///
    /// `name` holds the current name on entry and the next name on return.
    /// `name_size` is the byte capacity of `name` on entry and the byte size
    /// of the next name on return.
    fn get_next_variable(&self, name_size: &mut usize, name: &mut [u16], vendor: &mut Guid)
        -> Status;

    fn get_next_high_mono_count(&self, count: Option<&mut u32>) -> Status;

    fn query_variable_info(
        &self,
        attributes: VariableAttributes,
        info: &mut VariableStoreInfo,
    ) -> Status;

    /// `capsules` holds `count` headers followed by one reserved slot.
    fn query_capsule_caps(
        &self,
        capsules: &[CapsuleHeader],
        count: usize,
        max_size: &mut u64,
        reset_type: &mut ResetType,
    ) -> Status;
}
