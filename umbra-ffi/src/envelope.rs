//! Result envelopes and raw buffer management.
//!
//! Every export returns a pointer to a freshly allocated envelope:
//!
//! ```text
//! [total_len: u32 BE]      length of the whole envelope, prefix included
//! [ok: u8]                 1 on success, 0 on failure
//! [error_code: u32 BE]     0 on success, stable CoreError code otherwise
//! [msg_len: u32 BE][msg]   UTF-8 error message, empty on success
//! [payload_len: u32 BE][payload]
//! ```
//!
//! The host frees envelopes with [`umbra_result_free`] and manages its
//! own input buffers with [`umbra_alloc`]/[`umbra_free`].

use std::alloc::{alloc, dealloc, Layout};
use std::slice;

use umbra_common::codec::Writer;
use umbra_common::CoreError;

/// Alignment for host-visible buffers.
const BUFFER_ALIGN: usize = 8;

/// Build a success envelope around a payload.
pub(crate) fn envelope_ok(payload: &[u8]) -> *mut u8 {
    build_envelope(true, 0, "", payload)
}

/// Build a failure envelope from a core error.
pub(crate) fn envelope_err(err: &CoreError) -> *mut u8 {
    build_envelope(false, err.code() as u32, &err.to_string(), &[])
}

fn build_envelope(ok: bool, code: u32, message: &str, payload: &[u8]) -> *mut u8 {
    let body_len = 1 + 4 + 4 + message.len() + 4 + payload.len();
    let total_len = 4 + body_len;

    let mut w = Writer::with_capacity(total_len);
    w.write_u32_be(total_len as u32);
    w.write_u8(u8::from(ok));
    w.write_u32_be(code);
    w.write_var_bytes(message.as_bytes());
    w.write_var_bytes(payload);

    let boxed = w.into_bytes().into_boxed_slice();
    Box::into_raw(boxed) as *mut u8
}

/// Allocate a host-owned input buffer. Returns null for zero or on
/// allocation failure.
#[no_mangle]
pub extern "C" fn umbra_alloc(len: u32) -> *mut u8 {
    if len == 0 {
        return std::ptr::null_mut();
    }
    let layout = match Layout::from_size_align(len as usize, BUFFER_ALIGN) {
        Ok(layout) => layout,
        Err(_) => return std::ptr::null_mut(),
    };
    // SAFETY: layout has nonzero size.
    unsafe { alloc(layout) }
}

/// Free a buffer obtained from [`umbra_alloc`]. `len` must match the
/// original allocation.
#[no_mangle]
pub extern "C" fn umbra_free(ptr: *mut u8, len: u32) {
    if ptr.is_null() || len == 0 {
        return;
    }
    let layout = match Layout::from_size_align(len as usize, BUFFER_ALIGN) {
        Ok(layout) => layout,
        Err(_) => return,
    };
    // SAFETY: caller contract: ptr/len came from umbra_alloc.
    unsafe { dealloc(ptr, layout) }
}

/// Free a result envelope returned by any `umbra_*` operation.
///
/// The envelope records its own length, so the host passes only the
/// pointer. Freeing null is a no-op; freeing the same envelope twice is
/// a caller contract violation, exactly as with `free(3)`.
#[no_mangle]
pub extern "C" fn umbra_result_free(ptr: *mut u8) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: envelopes are boxed slices whose first four bytes record
    // the full allocation length.
    unsafe {
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(slice::from_raw_parts(ptr, 4));
        let total_len = u32::from_be_bytes(len_bytes) as usize;
        let slice_ptr = slice::from_raw_parts_mut(ptr, total_len) as *mut [u8];
        drop(Box::from_raw(slice_ptr));
    }
}
