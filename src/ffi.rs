//! FFI bindings for Sanmei Core
//!
//! C-compatible entry points for calling the engine from other languages.
//! Inputs are null-terminated UTF-8 strings or plain integers; every returned
//! string is allocated here and must be released with `sanmei_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::chart::Chart;
use crate::compatibility::PersonPillars;
use crate::encoder::ChartEncoder;
use crate::error::ChartError;
use crate::luck;
use crate::pipeline::{classify_phase_relation, score_compatibility, SanmeiEngine};
use crate::types::{Gender, Pillar};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    tracing::warn!("ffi call rejected: {}", msg);
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Read a required string argument, recording an error when it is missing
unsafe fn required_arg(ptr: *const c_char, name: &str) -> Option<String> {
    let value = cstr_to_string(ptr);
    if value.is_none() {
        set_last_error(&format!("Invalid {name} string"));
    }
    value
}

/// Hand a result back across the boundary: the JSON on success, NULL with the
/// last error set on failure
fn finish(result: Result<String, ChartError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

unsafe fn build_chart(
    engine: &SanmeiEngine,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    gender: *const c_char,
) -> Result<Chart, ChartError> {
    let gender = cstr_to_string(gender)
        .ok_or_else(|| ChartError::UnknownSymbol("gender is not a valid string".to_string()))?;
    engine.chart(year, month, day, hour, gender.parse::<Gender>()?)
}

fn relations_json(moving: &str, fixed: &str) -> Result<String, ChartError> {
    let labels = classify_phase_relation(moving.parse::<Pillar>()?, fixed.parse::<Pillar>()?);
    ChartEncoder::new().encode(&labels)
}

fn compatibility_json(first: &str, second: &str) -> Result<String, ChartError> {
    let first: PersonPillars = first.parse()?;
    let second: PersonPillars = second.parse()?;
    ChartEncoder::new().encode(&score_compatibility(&first, &second))
}

// ============================================================================
// Stateless API
// ============================================================================

/// Build a natal chart and return it as a JSON report.
///
/// # Safety
/// - `gender` must be a valid null-terminated C string ("male" or "female").
/// - Returns a newly allocated string that must be freed with `sanmei_free_string`.
/// - Returns NULL on error; call `sanmei_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sanmei_chart_json(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    gender: *const c_char,
) -> *mut c_char {
    clear_last_error();
    let engine = SanmeiEngine::new();
    finish(
        build_chart(&engine, year, month, day, hour, gender)
            .and_then(|chart| ChartEncoder::new().encode_chart(&chart, None, None)),
    )
}

/// Build a chart and return its ten great-luck decades as JSON.
///
/// # Safety
/// - `gender` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `sanmei_free_string`.
/// - Returns NULL on error; call `sanmei_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sanmei_great_luck_json(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    gender: *const c_char,
) -> *mut c_char {
    clear_last_error();
    let engine = SanmeiEngine::new();
    finish(
        build_chart(&engine, year, month, day, hour, gender)
            .and_then(|chart| ChartEncoder::new().encode(&luck::great_luck(&chart))),
    )
}

/// Build a chart and return annual luck for `start_age..=end_age` as a JSON array.
///
/// # Safety
/// - `gender` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `sanmei_free_string`.
/// - Returns NULL on error; call `sanmei_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sanmei_annual_luck_json(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    gender: *const c_char,
    start_age: u32,
    end_age: u32,
) -> *mut c_char {
    clear_last_error();
    let engine = SanmeiEngine::new();
    finish(
        build_chart(&engine, year, month, day, hour, gender).and_then(|chart| {
            let rows = luck::annual_luck(&chart, start_age, end_age)?;
            ChartEncoder::new().encode(&rows)
        }),
    )
}

/// Classify a moving pillar against a fixed one and return the labels as JSON.
///
/// # Safety
/// - `moving` and `fixed` must be valid null-terminated C strings holding a
///   pillar such as "甲子" or "jia-zi".
/// - Returns a newly allocated string that must be freed with `sanmei_free_string`.
/// - Returns NULL on error; call `sanmei_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sanmei_phase_relations_json(
    moving: *const c_char,
    fixed: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(moving) = required_arg(moving, "moving pillar") else {
        return ptr::null_mut();
    };
    let Some(fixed) = required_arg(fixed, "fixed pillar") else {
        return ptr::null_mut();
    };

    finish(relations_json(&moving, &fixed))
}

/// Score compatibility between two people given as pillar lists.
///
/// # Safety
/// - `first` and `second` must be valid null-terminated C strings holding three
///   or four whitespace-separated pillars (year, month, day, optional hour).
/// - Returns a newly allocated string that must be freed with `sanmei_free_string`.
/// - Returns NULL on error; call `sanmei_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sanmei_compatibility_json(
    first: *const c_char,
    second: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(first) = required_arg(first, "first person") else {
        return ptr::null_mut();
    };
    let Some(second) = required_arg(second, "second person") else {
        return ptr::null_mut();
    };

    finish(compatibility_json(&first, &second))
}

// ============================================================================
// Engine API
// ============================================================================

/// Opaque handle to an engine with its own configuration
pub struct SanmeiEngineHandle {
    engine: SanmeiEngine,
}

/// Create an engine with the default configuration.
///
/// # Safety
/// - Returns a pointer that must be freed with `sanmei_engine_free`.
#[no_mangle]
pub unsafe extern "C" fn sanmei_engine_new() -> *mut SanmeiEngineHandle {
    clear_last_error();
    Box::into_raw(Box::new(SanmeiEngineHandle {
        engine: SanmeiEngine::new(),
    }))
}

/// Free an engine.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `sanmei_engine_new`, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn sanmei_engine_free(engine: *mut SanmeiEngineHandle) {
    if !engine.is_null() {
        drop(Box::from_raw(engine));
    }
}

/// Replace the engine configuration from JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `sanmei_engine_new`.
/// - `json` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error. On error the previous configuration is kept.
#[no_mangle]
pub unsafe extern "C" fn sanmei_engine_load_config(
    engine: *mut SanmeiEngineHandle,
    json: *const c_char,
) -> i32 {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return -1;
    }
    let Some(json) = required_arg(json, "JSON") else {
        return -1;
    };

    match (*engine).engine.load_config(&json) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Save the engine configuration to JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `sanmei_engine_new`.
/// - Returns a newly allocated string that must be freed with `sanmei_free_string`.
/// - Returns NULL on error.
#[no_mangle]
pub unsafe extern "C" fn sanmei_engine_save_config(
    engine: *const SanmeiEngineHandle,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    finish((*engine).engine.save_config())
}

/// Build a chart with the engine's configuration and return the full report
/// (chart plus great luck) as JSON.
///
/// # Safety
/// - `engine` must be a valid pointer returned by `sanmei_engine_new`.
/// - `gender` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `sanmei_free_string`.
/// - Returns NULL on error; call `sanmei_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn sanmei_engine_chart_json(
    engine: *const SanmeiEngineHandle,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    gender: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if engine.is_null() {
        set_last_error("Null engine pointer");
        return ptr::null_mut();
    }
    let engine = &(*engine).engine;
    finish(
        build_chart(engine, year, month, day, hour, gender)
            .and_then(|chart| engine.report_json(&chart, None, false)),
    )
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by Sanmei functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Sanmei function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn sanmei_free_string(ptr: *mut c_char) {
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
/// - The returned pointer is valid until the next Sanmei function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn sanmei_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn sanmei_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    unsafe fn take_string(ptr: *mut c_char) -> String {
        assert!(!ptr.is_null(), "unexpected NULL: {:?}", last_error());
        let s = CStr::from_ptr(ptr).to_str().unwrap().to_string();
        sanmei_free_string(ptr);
        s
    }

    unsafe fn last_error() -> Option<String> {
        let err = sanmei_last_error();
        if err.is_null() {
            None
        } else {
            Some(CStr::from_ptr(err).to_str().unwrap().to_string())
        }
    }

    #[test]
    fn test_ffi_chart() {
        unsafe {
            let gender = CString::new("male").unwrap();
            let json = take_string(sanmei_chart_json(1983, 8, 11, 12, gender.as_ptr()));
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["chart"]["day"]["pillar"]["stem"], "xin");
            assert_eq!(value["chart"]["day"]["pillar"]["branch"], "wei");
            assert!(last_error().is_none());
        }
    }

    #[test]
    fn test_ffi_invalid_date() {
        unsafe {
            let gender = CString::new("female").unwrap();
            let result = sanmei_chart_json(2023, 2, 29, 0, gender.as_ptr());
            assert!(result.is_null());
            assert_eq!(last_error().as_deref(), Some("Invalid date: 2023-02-29"));
        }
    }

    #[test]
    fn test_ffi_null_gender() {
        unsafe {
            assert!(sanmei_chart_json(2000, 1, 1, 0, ptr::null()).is_null());
            assert!(last_error().is_some());

            let gender = CString::new("other").unwrap();
            assert!(sanmei_chart_json(2000, 1, 1, 0, gender.as_ptr()).is_null());
        }
    }

    #[test]
    fn test_ffi_luck() {
        unsafe {
            let gender = CString::new("male").unwrap();
            let json = take_string(sanmei_great_luck_json(1984, 12, 2, 12, gender.as_ptr()));
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["rows"].as_array().map(|r| r.len()), Some(10));
            assert_eq!(value["direction"], "forward");

            let json = take_string(sanmei_annual_luck_json(
                1984,
                12,
                2,
                12,
                gender.as_ptr(),
                0,
                4,
            ));
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value.as_array().map(|r| r.len()), Some(5));

            let bad = sanmei_annual_luck_json(1984, 12, 2, 12, gender.as_ptr(), 9, 3);
            assert!(bad.is_null());
            assert!(last_error().is_some());
        }
    }

    #[test]
    fn test_ffi_phase_relations() {
        unsafe {
            let moving = CString::new("甲子").unwrap();
            let fixed = CString::new("丙午").unwrap();
            let json = take_string(sanmei_phase_relations_json(moving.as_ptr(), fixed.as_ptr()));
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value.as_array().map(|r| r.len()), Some(1));

            let bad = CString::new("甲丑").unwrap();
            assert!(sanmei_phase_relations_json(bad.as_ptr(), fixed.as_ptr()).is_null());
            assert!(sanmei_phase_relations_json(ptr::null(), fixed.as_ptr()).is_null());
        }
    }

    #[test]
    fn test_ffi_compatibility() {
        unsafe {
            let first = CString::new("癸亥 庚申 辛未 甲午").unwrap();
            let second = CString::new("甲子 乙亥 庚午").unwrap();
            let json = take_string(sanmei_compatibility_json(first.as_ptr(), second.as_ptr()));
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            let score = value["score"].as_u64().unwrap();
            assert!(score <= 100);

            let bad = CString::new("甲子").unwrap();
            assert!(sanmei_compatibility_json(first.as_ptr(), bad.as_ptr()).is_null());
        }
    }

    #[test]
    fn test_ffi_engine_lifecycle() {
        unsafe {
            let engine = sanmei_engine_new();
            assert!(!engine.is_null());

            let config = CString::new(r#"{"include_minor_hidden_stems": true}"#).unwrap();
            assert_eq!(sanmei_engine_load_config(engine, config.as_ptr()), 0);

            let saved = take_string(sanmei_engine_save_config(engine));
            assert!(saved.contains("\"include_minor_hidden_stems\": true"));

            let bad = CString::new(r#"{"element_weights": {"stem": -1}}"#).unwrap();
            assert_eq!(sanmei_engine_load_config(engine, bad.as_ptr()), -1);
            assert!(last_error().is_some());

            let gender = CString::new("female").unwrap();
            let json = take_string(sanmei_engine_chart_json(
                engine,
                1990,
                3,
                2,
                7,
                gender.as_ptr(),
            ));
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert!(value["great_luck"]["rows"].is_array());

            sanmei_engine_free(engine);
        }
    }

    #[test]
    fn test_ffi_null_engine() {
        unsafe {
            let config = CString::new("{}").unwrap();
            assert_eq!(sanmei_engine_load_config(ptr::null_mut(), config.as_ptr()), -1);
            assert!(sanmei_engine_save_config(ptr::null()).is_null());
            sanmei_engine_free(ptr::null_mut());
            sanmei_free_string(ptr::null_mut());
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = CStr::from_ptr(sanmei_version()).to_str().unwrap();
            assert_eq!(version, env!("CARGO_PKG_VERSION"));
        }
    }
}
