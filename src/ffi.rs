//! FFI bindings for Nutri Engine
//!
//! This module provides C-compatible functions for calling the engine from
//! host applications. String results are allocated by the engine and must
//! be freed by the caller using `nutri_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EngineConfig;
use crate::pipeline::{assess_json, HealthEngine};
use crate::types::{Macro, MacroSplit};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Status codes returned by the scalar functions
pub const NUTRI_OK: i32 = 0;
pub const NUTRI_ERROR: i32 = -1;

/// Macro field selectors for `nutri_apply_macro_edit`
pub const NUTRI_MACRO_PROTEIN: i32 = 0;
pub const NUTRI_MACRO_CARBS: i32 = 1;
pub const NUTRI_MACRO_FAT: i32 = 2;

/// C layout of a macro split
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NutriMacroSplit {
    pub protein: i32,
    pub carbs: i32,
    pub fat: i32,
}

impl From<NutriMacroSplit> for MacroSplit {
    fn from(split: NutriMacroSplit) -> Self {
        MacroSplit {
            protein: split.protein,
            carbs: split.carbs,
            fat: split.fat,
        }
    }
}

impl From<MacroSplit> for NutriMacroSplit {
    fn from(split: MacroSplit) -> Self {
        NutriMacroSplit {
            protein: split.protein,
            carbs: split.carbs,
            fat: split.fat,
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Assess a client from a JSON request and return the JSON report.
///
/// # Safety
/// - `request_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `nutri_free_string`.
/// - Returns NULL on error; call `nutri_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn nutri_assess_json(request_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json_str = match cstr_to_string(request_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match assess_json(json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Apply one macro edit and write the normalized split to `out`.
///
/// Never fails for valid pointers: out-of-range inputs are normalized.
///
/// # Safety
/// - `out` must point to writable memory for one `NutriMacroSplit`.
/// - Returns `NUTRI_ERROR` if `out` is NULL or `field` is not a known selector.
#[no_mangle]
pub unsafe extern "C" fn nutri_apply_macro_edit(
    current: NutriMacroSplit,
    field: i32,
    value: f64,
    out: *mut NutriMacroSplit,
) -> i32 {
    clear_last_error();

    if out.is_null() {
        set_last_error("Output pointer is NULL");
        return NUTRI_ERROR;
    }

    let field = match field {
        NUTRI_MACRO_PROTEIN => Macro::Protein,
        NUTRI_MACRO_CARBS => Macro::Carbs,
        NUTRI_MACRO_FAT => Macro::Fat,
        other => {
            set_last_error(&format!("Unknown macro field selector: {other}"));
            return NUTRI_ERROR;
        }
    };

    let result = HealthEngine::new().apply_macro_edit(current.into(), field, value);
    *out = result.into();
    NUTRI_OK
}

/// Compute BMI and write it to `out`.
///
/// # Safety
/// - `out` must point to writable memory for one `f64`.
/// - Returns `NUTRI_ERROR` on invalid input; call `nutri_last_error` for details.
#[no_mangle]
pub unsafe extern "C" fn nutri_bmi(weight_kg: f64, height_cm: f64, out: *mut f64) -> i32 {
    clear_last_error();

    if out.is_null() {
        set_last_error("Output pointer is NULL");
        return NUTRI_ERROR;
    }

    match HealthEngine::new().calculator().bmi(weight_kg, height_cm) {
        Ok(bmi) => {
            *out = bmi;
            NUTRI_OK
        }
        Err(e) => {
            set_last_error(&e.to_string());
            NUTRI_ERROR
        }
    }
}

// ============================================================================
// Configured Engine API
// ============================================================================

/// Opaque handle to a configured engine
pub struct NutriEngineHandle {
    engine: HealthEngine,
}

/// Create an engine from a JSON configuration, or the defaults when NULL.
///
/// # Safety
/// - `config_json` must be NULL or a valid null-terminated C string.
/// - Must be freed with `nutri_engine_free`.
/// - Returns NULL on error; call `nutri_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn nutri_engine_new(config_json: *const c_char) -> *mut NutriEngineHandle {
    clear_last_error();

    let engine = if config_json.is_null() {
        HealthEngine::new()
    } else {
        let json = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config string pointer");
                return ptr::null_mut();
            }
        };
        match EngineConfig::from_json(&json).and_then(HealthEngine::with_config) {
            Ok(engine) => engine,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    Box::into_raw(Box::new(NutriEngineHandle { engine }))
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `nutri_engine_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn nutri_engine_free(engine: *mut NutriEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Assess a client with a configured engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `nutri_engine_new`.
/// - `request_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `nutri_free_string`.
/// - Returns NULL on error; call `nutri_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn nutri_engine_assess_json(
    engine: *const NutriEngineHandle,
    request_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let handle = match engine.as_ref() {
        Some(h) => h,
        None => {
            set_last_error("Invalid engine pointer");
            return ptr::null_mut();
        }
    };

    let json_str = match cstr_to_string(request_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid JSON string pointer");
            return ptr::null_mut();
        }
    };

    match handle.engine.assess_json(&json_str) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by engine functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an engine function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn nutri_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next engine call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn nutri_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the engine library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn nutri_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn sample_request() -> CString {
        CString::new(
            r#"{
            "profile": { "gender": "female", "age": 42, "activityLevel": "light", "goal": "maintain" },
            "measurements": [
                { "date": "2024-03-02", "weight": 64.0, "height": 165.0, "waistCircumference": 79 },
                { "date": "2024-02-02", "weight": 65.5, "height": 165.0, "waistCircumference": 81 }
            ]
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_ffi_assess_json() {
        let json = sample_request();

        unsafe {
            let result = nutri_assess_json(json.as_ptr());
            assert!(!result.is_null());

            let result_str = CStr::from_ptr(result).to_str().unwrap();
            let value: serde_json::Value = serde_json::from_str(result_str).unwrap();
            assert_eq!(value["producer"]["name"], crate::PRODUCER_NAME);
            assert_eq!(value["assessment"]["trend"]["status"], "computed");

            nutri_free_string(result);
        }
    }

    #[test]
    fn test_ffi_apply_macro_edit() {
        let current = NutriMacroSplit {
            protein: 30,
            carbs: 40,
            fat: 30,
        };
        let mut out = NutriMacroSplit {
            protein: 0,
            carbs: 0,
            fat: 0,
        };

        unsafe {
            let status = nutri_apply_macro_edit(current, NUTRI_MACRO_PROTEIN, 50.0, &mut out);
            assert_eq!(status, NUTRI_OK);
            assert_eq!(
                out,
                NutriMacroSplit {
                    protein: 50,
                    carbs: 20,
                    fat: 30
                }
            );

            let status = nutri_apply_macro_edit(current, 7, 50.0, &mut out);
            assert_eq!(status, NUTRI_ERROR);
            assert!(!nutri_last_error().is_null());

            let status = nutri_apply_macro_edit(current, NUTRI_MACRO_FAT, 10.0, ptr::null_mut());
            assert_eq!(status, NUTRI_ERROR);
        }
    }

    #[test]
    fn test_ffi_bmi() {
        let mut bmi = 0.0;
        unsafe {
            assert_eq!(nutri_bmi(70.0, 175.0, &mut bmi), NUTRI_OK);
            assert!((bmi - 22.857).abs() < 0.01);

            assert_eq!(nutri_bmi(70.0, 0.0, &mut bmi), NUTRI_ERROR);
            let error = CStr::from_ptr(nutri_last_error()).to_str().unwrap();
            assert!(error.contains("height"));
        }
    }

    #[test]
    fn test_ffi_engine_lifecycle() {
        let config = CString::new(r#"{ "trend": { "stable_threshold": 1.0 } }"#).unwrap();
        let json = sample_request();

        unsafe {
            let engine = nutri_engine_new(config.as_ptr());
            assert!(!engine.is_null());

            let result = nutri_engine_assess_json(engine, json.as_ptr());
            assert!(!result.is_null());
            nutri_free_string(result);

            nutri_engine_free(engine);

            let bad = CString::new(r#"{ "goal_factors": { "lose": -1 } }"#).unwrap();
            assert!(nutri_engine_new(bad.as_ptr()).is_null());
            assert!(!nutri_last_error().is_null());

            let defaults = nutri_engine_new(ptr::null());
            assert!(!defaults.is_null());
            nutri_engine_free(defaults);
        }
    }

    #[test]
    fn test_ffi_error_handling() {
        let invalid = CString::new("not valid json").unwrap();

        unsafe {
            let result = nutri_assess_json(invalid.as_ptr());
            assert!(result.is_null());

            let error = nutri_last_error();
            assert!(!error.is_null());

            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(!error_str.is_empty());

            assert!(nutri_assess_json(ptr::null()).is_null());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = nutri_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert_eq!(version_str, crate::ENGINE_VERSION);
        }
    }
}
