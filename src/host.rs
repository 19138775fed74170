//! Purpose: Call the legacy entry points by name, the way a host runtime's `native` call does.
//! Exports: `EntryPoint`, `ENTRY_POINTS`, `resolve`, `call`, `call_by_name`.
//! Role: In-process stand-in for the host side of the C boundary; drives the CLI.
//! Invariants: Arguments cross as NUL-terminated C strings; results are copied out
//! before any further call can invalidate them.
#![allow(clippy::result_large_err)]

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::abi;
use crate::api::{Error, ErrorKind};

pub type EntryPoint = extern "C" fn(*const c_char) -> *const c_char;

pub const ENTRY_POINTS: [&str; 5] = ["init", "set", "get", "remove", "free"];

/// Accepts both the short verb (`set`) and the exported symbol (`clet_set`).
pub fn resolve(name: &str) -> Option<EntryPoint> {
    let verb = name.strip_prefix("clet_").unwrap_or(name);
    let entry: EntryPoint = match verb {
        "init" => abi::clet_init,
        "set" => abi::clet_set,
        "get" => abi::clet_get,
        "remove" => abi::clet_remove,
        "free" => abi::clet_free,
        _ => return None,
    };
    Some(entry)
}

pub fn call(entry: EntryPoint, arg: &str) -> Result<String, Error> {
    let arg = CString::new(arg).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("argument contains NUL")
            .with_source(err)
    })?;
    let result = entry(arg.as_ptr());
    if result.is_null() {
        return Err(Error::new(ErrorKind::Internal).with_message("entry point returned null"));
    }
    let text = unsafe { CStr::from_ptr(result) }.to_str().map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("entry point returned invalid UTF-8")
            .with_source(err)
    })?;
    Ok(text.to_string())
}

pub fn call_by_name(name: &str, arg: &str) -> Result<String, Error> {
    let entry = resolve(name).ok_or_else(|| {
        Error::new(ErrorKind::NotFound).with_message(format!("no entry point named {name:?}"))
    })?;
    call(entry, arg)
}
