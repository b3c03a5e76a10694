use std::os::raw::c_int;

use audio_session_core::SessionError;

/// Read a positive count or rate through a host-supplied pointer.
///
/// # Safety
/// `ptr` must be null or point to a readable `c_int`.
pub(crate) unsafe fn read_positive(ptr: *const c_int, what: &str) -> Result<usize, SessionError> {
    if ptr.is_null() {
        return Err(SessionError::InvalidArgument(format!("{} pointer is null", what)));
    }
    match *ptr {
        n if n > 0 => Ok(n as usize),
        n => Err(SessionError::InvalidArgument(format!("{} must be positive, got {}", what, n))),
    }
}

/// Reject a null sample buffer.
pub(crate) fn require_buffer<T>(ptr: *const T) -> Result<(), SessionError> {
    if ptr.is_null() {
        return Err(SessionError::InvalidArgument("sample buffer pointer is null".into()));
    }
    Ok(())
}
