//! C-ABI wrapper around `echo-core`.
//!
//! # Overview
//! Lets a native mobile shell build the screen's requests and decode the
//! replies without linking an async runtime. The shell performs the HTTP
//! call itself, keeps its own loading flag, and renders the JSON strings
//! returned here.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Operations cross as numeric codes (`0` GET .. `4` STATUS); any other
//!   code is unsupported and yields null, after which the shell shows
//!   `echo_error_marker()`.
//! - The C caller owns all returned pointers and must release them with the
//!   matching `echo_free_*` function.

pub mod types;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use echo_core::{decode_response, FormState, Operation, ResponseState};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client bound to httpbin.org.
///
/// The caller must free the returned pointer with `echo_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn echo_client_new() -> *mut FfiEchoClient {
    catch_unwind(|| {
        Box::into_raw(Box::new(FfiEchoClient {
            inner: echo_core::EchoClient::new(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client bound to another host serving the echo endpoints.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
#[unsafe(no_mangle)]
pub extern "C" fn echo_client_new_with_base_url(base_url: *const c_char) -> *mut FfiEchoClient {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let url = unsafe { read_c_str(base_url) };
        Box::into_raw(Box::new(FfiEchoClient {
            inner: echo_core::EchoClient::with_base_url(&url),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `echo_client_new*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn echo_client_free(client: *mut FfiEchoClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build / decode
// ---------------------------------------------------------------------------

/// Build the HTTP request for one screen operation.
///
/// `name`, `message` and `status_code` are the current form inputs; they are
/// copied, not retained. Returns null if any pointer is null or `operation`
/// is not a known code. The caller must free the result with
/// `echo_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn echo_build_request(
    client: *const FfiEchoClient,
    operation: u32,
    name: *const c_char,
    message: *const c_char,
    status_code: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || name.is_null() || message.is_null() || status_code.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Ok(operation) = Operation::try_from(operation) else {
            return std::ptr::null_mut();
        };
        let form = FormState {
            name: unsafe { read_c_str(name) },
            message: unsafe { read_c_str(message) },
            status_code: unsafe { read_c_str(status_code) },
        };
        match client.inner.build_request(operation, &form) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Decode a received response into the pretty-printed JSON the response
/// panel shows: the body itself when it is JSON, otherwise
/// `{"status": .., "statusText": ..}`.
///
/// Returns null if `response` is null. Free with `echo_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn echo_decode_response(response: *const FfiHttpResponse) -> *mut c_char {
    catch_unwind(|| {
        if response.is_null() {
            return std::ptr::null_mut();
        }
        let response = unsafe { &*response }.to_core();
        render(&decode_response(&response))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// The pretty-printed generic error marker, for transport failures and
/// unsupported operations. Free with `echo_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn echo_error_marker() -> *mut c_char {
    catch_unwind(|| render(&ResponseState::Failed)).unwrap_or(std::ptr::null_mut())
}

fn render(state: &ResponseState) -> *mut c_char {
    state
        .render()
        .map_or(std::ptr::null_mut(), into_c_string)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by `echo_build_request`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn echo_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.body.is_null() {
            drop(unsafe { CString::from_raw(req.body) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn echo_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
