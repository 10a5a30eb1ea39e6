//! C-callable exports for external billing software.
//!
//! The foreign boundary cannot carry rich error values, so every export
//! follows the same contract: a degenerate return on failure (`false`,
//! `-1`, or empty strings) plus the diagnostic stored in a process-wide
//! last-error cell readable through [`wsfe_last_error`]. Callers must
//! consult the side channel after any call that yields empty output.
//!
//! Each request/response pair is also appended to `wsfe.log` in the
//! working directory, a plaintext timestamped log for operators. Write
//! failures there are ignored — it is diagnostic only.

use std::io::Write as _;
use std::os::raw::c_char;
use std::sync::Mutex;

use ffi_support::{FfiStr, rust_string_to_c};

use crate::core::{CabRequest, CaeRequest, Environment};
use crate::wsaa::WsaaClient;
use crate::wsfe::WsfeClient;

static LAST_ERROR: Mutex<String> = Mutex::new(String::new());
static SERVICE: Mutex<Option<WsfeClient>> = Mutex::new(None);

fn set_last_error(message: &str) {
    let mut cell = LAST_ERROR.lock().unwrap_or_else(|e| e.into_inner());
    *cell = message.to_string();
}

fn log_line(message: &str) {
    let Ok(mut file) = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open("wsfe.log")
    else {
        return;
    };
    let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let _ = write!(file, "[{stamp}] {message}\r\n");
}

fn fail(context: &str, message: &str) {
    set_last_error(message);
    log_line(&format!("  |_ error: {context}: {message}"));
}

/// Create the process-wide service handle.
///
/// Authenticates against WSAA for the `"wsfe"` service and binds a WSFE
/// client to the resulting ticket. `environment` is 1 for production,
/// anything else for testing. Returns `false` on failure with the cause
/// in the last-error cell.
#[unsafe(no_mangle)]
pub extern "C" fn wsfe_create_service(
    cert_path: FfiStr,
    key_path: FfiStr,
    environment: i32,
) -> bool {
    set_last_error("");
    let cert_path = cert_path.as_str();
    let key_path = key_path.as_str();

    log_line("CreateService()");
    log_line(&format!("  |_ crt: {cert_path}"));
    log_line(&format!("  |_ key: {key_path}"));

    let environment = if environment == 1 {
        Environment::Production
    } else {
        Environment::Testing
    };

    let wsaa = WsaaClient::new(environment, cert_path, key_path);
    match wsaa.login("wsfe") {
        Ok((token, sign, _expiration)) => {
            let mut slot = SERVICE.lock().unwrap_or_else(|e| e.into_inner());
            *slot = Some(WsfeClient::new(environment, token, sign));
            true
        }
        Err(e) => {
            fail("CreateService", &e.to_string());
            false
        }
    }
}

/// Last authorized voucher number for the JSON-encoded [`CabRequest`].
///
/// Returns the voucher number (0 when none was ever issued) or -1 on
/// failure. Malformed JSON fails immediately without touching the
/// network.
#[unsafe(no_mangle)]
pub extern "C" fn wsfe_last_authorized_voucher(request_json: FfiStr) -> i64 {
    set_last_error("");
    let raw = request_json.as_str();

    log_line("LastAuthorizedVoucher()");
    log_line(&format!("  |_ request: {raw}"));

    let cab: CabRequest = match serde_json::from_str(raw) {
        Ok(cab) => cab,
        Err(e) => {
            fail(
                "LastAuthorizedVoucher",
                &format!("malformed request JSON: {e}"),
            );
            return -1;
        }
    };

    let slot = SERVICE.lock().unwrap_or_else(|e| e.into_inner());
    let Some(client) = slot.as_ref() else {
        fail("LastAuthorizedVoucher", "service not created");
        return -1;
    };

    match client.last_authorized_voucher(&cab) {
        Ok(nro) => {
            log_line(&format!("  |_ last voucher: {nro}"));
            nro
        }
        Err(e) => {
            fail("LastAuthorizedVoucher", &e.to_string());
            -1
        }
    }
}

/// Request a CAE for the JSON-encoded header/detail pair.
///
/// `out_cae` and `out_due_date` receive newly allocated C strings (free
/// with [`wsfe_string_free`]). On any failure both are set to empty
/// strings and the cause is stored in the last-error cell. When AFIP
/// issues the CAE with an observation, the call still returns `true`
/// with both outputs filled and the observation text in the last-error
/// cell — distinguishable from a rejection by the return value.
///
/// # Safety
///
/// `out_cae` and `out_due_date` must be valid, writable pointers.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wsfe_request_cae(
    cab_json: FfiStr,
    det_json: FfiStr,
    out_cae: *mut *mut c_char,
    out_due_date: *mut *mut c_char,
) -> bool {
    set_last_error("");
    if out_cae.is_null() || out_due_date.is_null() {
        set_last_error("RequestCae: null output pointer");
        return false;
    }
    let empty = |out: *mut *mut c_char| unsafe { *out = rust_string_to_c("") };

    let cab_raw = cab_json.as_str();
    let det_raw = det_json.as_str();

    log_line("RequestCae()");
    log_line(&format!("  |_ cab: {cab_raw}"));
    log_line(&format!("  |_ det: {det_raw}"));

    let cab: CabRequest = match serde_json::from_str(cab_raw) {
        Ok(cab) => cab,
        Err(e) => {
            fail("RequestCae", &format!("malformed header JSON: {e}"));
            empty(out_cae);
            empty(out_due_date);
            return false;
        }
    };
    let det: CaeRequest = match serde_json::from_str(det_raw) {
        Ok(det) => det,
        Err(e) => {
            fail("RequestCae", &format!("malformed detail JSON: {e}"));
            empty(out_cae);
            empty(out_due_date);
            return false;
        }
    };

    let slot = SERVICE.lock().unwrap_or_else(|e| e.into_inner());
    let Some(client) = slot.as_ref() else {
        fail("RequestCae", "service not created");
        empty(out_cae);
        empty(out_due_date);
        return false;
    };

    match client.request_cae(&cab, &det) {
        Ok(auth) => {
            log_line(&format!("  |_ cae: {}", auth.cae));
            log_line(&format!("  |_ vto: {}", auth.cae_due_date));
            if let Some(obs) = &auth.observation {
                set_last_error(obs);
                log_line(&format!("  |_ obs: {obs}"));
            }
            unsafe {
                *out_cae = rust_string_to_c(auth.cae);
                *out_due_date = rust_string_to_c(auth.cae_due_date);
            }
            true
        }
        Err(e) => {
            fail("RequestCae", &e.to_string());
            empty(out_cae);
            empty(out_due_date);
            false
        }
    }
}

/// The diagnostic from the most recent call, empty when it succeeded
/// cleanly. The returned string must be freed with [`wsfe_string_free`].
#[unsafe(no_mangle)]
pub extern "C" fn wsfe_last_error() -> *mut c_char {
    let cell = LAST_ERROR.lock().unwrap_or_else(|e| e.into_inner());
    rust_string_to_c(cell.as_str())
}

/// Free a string returned by any export in this module.
///
/// # Safety
///
/// `s` must be a pointer previously returned by this library, or null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn wsfe_string_free(s: *mut c_char) {
    if !s.is_null() {
        unsafe { ffi_support::destroy_c_string(s) }
    }
}
