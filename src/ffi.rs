//! C-compatible FFI API for cross-language bindings.
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` calling convention and `#[no_mangle]`
//! to ensure stable symbol names.
//!
//! ## Inputs
//! - Configuration is passed as a null-terminated UTF-8 JSON document with the
//!   same keys as [`GeneratorConfig`]. Pass `NULL` for defaults.
//! - Jobs are passed as JSON matching [`JobSpec`]:
//!   `{"content": "...", "header": "...", "footer": "...", "orientation": "landscape", ...}`.
//!
//! ## Error handling
//! - Functions return a `c_int`: 0 = success, non-zero = error code.
//! - Error details can be retrieved via `courier_last_error`.
//!
//! | code | meaning            |
//! |------|--------------------|
//! | 1    | null pointer       |
//! | 2    | invalid UTF-8      |
//! | 3    | invalid JSON       |
//! | 10   | configuration      |
//! | 11   | conversion         |
//! | 12   | renderer           |
//! | 13   | timeout            |
//! | 14   | filesystem         |
//! | 15   | validation         |
//! | 16   | merge              |
//! | 17   | spawn              |
//!
//! ## Thread safety
//! - `courier_last_error` uses a thread-local, so it is safe to call from
//!   multiple threads. `courier_produce` may run concurrently.
//!
//! ## Usage from PHP (FFI extension)
//! ```php
//! $ffi = FFI::cdef(file_get_contents('include/courier.h'), 'libpdf_courier.so');
//! $rc = $ffi->courier_produce($configJson, $jobJson, '/var/www/storage/invoice.pdf');
//! if ($rc !== 0) { throw new RuntimeException(FFI::string($ffi->courier_last_error())); }
//! ```

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::PathBuf;
use std::ptr;
use std::slice;

use crate::config::GeneratorConfig;
use crate::error::CourierError;
use crate::generator::PdfGenerator;
use crate::job::{JobSpec, RenderJob};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = RefCell::new(None);
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg.replace('\0', " ")).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

fn error_code(err: &CourierError) -> c_int {
    match err {
        CourierError::Configuration(_) => 10,
        CourierError::Conversion { .. } => 11,
        CourierError::Renderer(_) => 12,
        CourierError::Timeout(_) => 13,
        CourierError::Filesystem { .. } => 14,
        CourierError::Validation(_) => 15,
        CourierError::Merge(_) => 16,
        CourierError::Spawn { .. } => 17,
    }
}

fn fail(err: CourierError) -> c_int {
    set_last_error(&err.to_string());
    error_code(&err)
}

/// Borrow a required C string as UTF-8, or return the FFI error code.
///
/// # Safety
/// `ptr`, if non-null, must point to a valid null-terminated string.
unsafe fn required_str<'a>(ptr: *const c_char) -> Result<&'a str, c_int> {
    if ptr.is_null() {
        set_last_error("Null pointer argument");
        return Err(1);
    }
    CStr::from_ptr(ptr).to_str().map_err(|e| {
        set_last_error(&format!("Invalid UTF-8: {e}"));
        2
    })
}

/// Parse an optional config document; `NULL` yields the defaults.
///
/// # Safety
/// Same as [`required_str`].
unsafe fn config_from_c(ptr: *const c_char) -> Result<GeneratorConfig, c_int> {
    if ptr.is_null() {
        return Ok(GeneratorConfig::default());
    }
    let json = required_str(ptr)?;
    serde_json::from_str(json).map_err(|e| {
        set_last_error(&format!("Invalid config JSON: {e}"));
        3
    })
}

// ---------------------------------------------------------------------------
// Core API
// ---------------------------------------------------------------------------

/// Render a PDF to `destination`.
///
/// # Parameters
/// - `config_json`: generator configuration JSON, or `NULL` for defaults
/// - `job_json`: job description JSON (see module docs)
/// - `destination`: path the finished PDF is moved to
///
/// # Returns
/// `0` on success, non-zero on error. On error, call `courier_last_error`.
///
/// # Safety
/// All non-null pointers must reference valid null-terminated UTF-8 strings.
#[no_mangle]
pub unsafe extern "C" fn courier_produce(
    config_json: *const c_char,
    job_json: *const c_char,
    destination: *const c_char,
) -> c_int {
    clear_last_error();

    let config = match config_from_c(config_json) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let job_json = match required_str(job_json) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let destination = match required_str(destination) {
        Ok(s) => PathBuf::from(s),
        Err(code) => return code,
    };

    let spec: JobSpec = match serde_json::from_str(job_json) {
        Ok(spec) => spec,
        Err(e) => {
            set_last_error(&format!("Invalid job JSON: {e}"));
            return 3;
        }
    };

    match PdfGenerator::new(config).produce(RenderJob::from(spec), &destination) {
        Ok(()) => 0,
        Err(e) => fail(e),
    }
}

/// Merge `input_count` PDFs into `output`.
///
/// # Parameters
/// - `config_json`: generator configuration JSON, or `NULL` for defaults
/// - `output`: path of the merged PDF
/// - `inputs`: array of `input_count` null-terminated paths
///
/// # Returns
/// `0` on success, non-zero on error.
///
/// # Safety
/// `inputs` must point to `input_count` valid string pointers.
#[no_mangle]
pub unsafe extern "C" fn courier_merge(
    config_json: *const c_char,
    output: *const c_char,
    inputs: *const *const c_char,
    input_count: u32,
) -> c_int {
    clear_last_error();

    let config = match config_from_c(config_json) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let output = match required_str(output) {
        Ok(s) => PathBuf::from(s),
        Err(code) => return code,
    };
    if inputs.is_null() && input_count > 0 {
        set_last_error("Null pointer argument");
        return 1;
    }

    let raw_inputs: &[*const c_char] = if input_count == 0 {
        &[]
    } else {
        slice::from_raw_parts(inputs, input_count as usize)
    };
    let mut paths = Vec::with_capacity(raw_inputs.len());
    for &raw in raw_inputs {
        match required_str(raw) {
            Ok(s) => paths.push(PathBuf::from(s)),
            Err(code) => return code,
        }
    }

    match PdfGenerator::new(config).merge(&output, paths.as_slice()) {
        Ok(()) => 0,
        Err(e) => fail(e),
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Retrieve the last error message. Returns a null-terminated string.
///
/// The returned pointer is valid until the next `courier_*` call on the same
/// thread. The caller should **not** free this pointer – it is managed
/// internally.
///
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn courier_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        let borrow = e.borrow();
        match borrow.as_ref() {
            Some(cs) => cs.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Return the library version as a null-terminated string.
/// The caller must **not** free this pointer.
#[no_mangle]
pub extern "C" fn courier_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn last_error() -> String {
        let ptr = courier_last_error();
        assert!(!ptr.is_null(), "expected an error message");
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string()
    }

    #[test]
    fn ffi_version() {
        let v = courier_version();
        let version = unsafe { CStr::from_ptr(v) }.to_str().unwrap();
        assert_eq!(version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn ffi_null_job() {
        let dest = CString::new("/tmp/out.pdf").unwrap();
        let rc = unsafe { courier_produce(ptr::null(), ptr::null(), dest.as_ptr()) };
        assert_eq!(rc, 1);
        assert_eq!(last_error(), "Null pointer argument");
    }

    #[test]
    fn ffi_invalid_config_json() {
        let config = CString::new("{ nope").unwrap();
        let job = CString::new(r#"{"content": "<p>x</p>"}"#).unwrap();
        let dest = CString::new("/tmp/out.pdf").unwrap();
        let rc = unsafe { courier_produce(config.as_ptr(), job.as_ptr(), dest.as_ptr()) };
        assert_eq!(rc, 3);
        assert!(last_error().starts_with("Invalid config JSON"));
    }

    #[test]
    fn ffi_produce_without_storage_is_configuration_error() {
        let job = CString::new(r#"{"content": "<p>x</p>", "dpi": 96}"#).unwrap();
        let dest = CString::new("/tmp/out.pdf").unwrap();
        let rc = unsafe { courier_produce(ptr::null(), job.as_ptr(), dest.as_ptr()) };
        assert_eq!(rc, 10);
        assert!(last_error().contains("storage path"));
    }

    #[test]
    fn ffi_merge_rejects_non_pdf() {
        let config = CString::new(r#"{"merge_tool": "/no/such/pdfunite"}"#).unwrap();
        let output = CString::new("/tmp/all.pdf").unwrap();
        let a = CString::new("a.pdf").unwrap();
        let b = CString::new("notes.txt").unwrap();
        let inputs = [a.as_ptr(), b.as_ptr()];

        let rc = unsafe {
            courier_merge(config.as_ptr(), output.as_ptr(), inputs.as_ptr(), inputs.len() as u32)
        };
        assert_eq!(rc, 15);
        assert!(last_error().contains("notes.txt"));
    }

    #[test]
    fn ffi_success_clears_previous_error() {
        let dest = CString::new("/tmp/out.pdf").unwrap();
        unsafe { courier_produce(ptr::null(), ptr::null(), dest.as_ptr()) };
        assert!(!courier_last_error().is_null());

        let output = CString::new("/tmp/all.pdf").unwrap();
        let rc = unsafe { courier_merge(ptr::null(), output.as_ptr(), ptr::null(), 0) };
        // Empty input list is rejected, but the stale error was replaced.
        assert_eq!(rc, 15);
        assert!(last_error().contains("at least one PDF"));
    }
}
