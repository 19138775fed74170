//! Purpose: C ABI bridge for host runtimes (libclet).
//! Exports: Legacy sentinel entry points (`clet_init/set/get/remove/free`) and the
//! handle surface (`clet_store_*`, `clet_buf_free`, `clet_error_free`).
//! Role: Stable ABI surface; all logic lives in `api`, this file only marshals.
//! Invariants: Legacy entry points take one C string, return one C string, and
//! report every failure as the `"nil"` sentinel plus a warn-level log event.
//! Invariants: Handle calls return 0/1 on success and -1 on error; error kinds
//! map 1:1 with `api::to_exit_code`.
//! Invariants: Legacy `clet_get` returns a pointer into table-owned storage, valid
//! until that key is next set or removed, or the table is freed.
//! Invariants: Handle `clet_store_get` copies the value into a caller-owned
//! `clet_buf` while the store lock is held; release it with `clet_buf_free`.
#![allow(clippy::result_large_err)]
#![allow(clippy::not_unsafe_ptr_arg_deref)]

use crate::api::{Error, ErrorKind, SENTINEL_C, Store, StoreOptions, global, to_exit_code};
use crate::logging;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

#[repr(C)]
pub struct clet_store {
    store: Store,
}

#[repr(C)]
pub struct clet_buf {
    data: *mut c_char,
    len: usize,
}

#[repr(C)]
pub struct clet_error {
    kind: i32,
    message: *mut c_char,
    key: *mut c_char,
}

#[unsafe(no_mangle)]
pub extern "C" fn clet_init(_arg: *const c_char) -> *const c_char {
    logging::init_from_env();
    if let Err(err) = global::init() {
        report("clet_init", &err);
    }
    SENTINEL_C.as_ptr()
}

#[unsafe(no_mangle)]
pub extern "C" fn clet_set(input: *const c_char) -> *const c_char {
    let result = read_text(input, "input").and_then(|line| global::set_line(line).map(|_| ()));
    if let Err(err) = result {
        report("clet_set", &err);
    }
    SENTINEL_C.as_ptr()
}

#[unsafe(no_mangle)]
pub extern "C" fn clet_get(key: *const c_char) -> *const c_char {
    match read_text(key, "key").and_then(global::get_ptr) {
        Ok(Some(value)) => value,
        Ok(None) => SENTINEL_C.as_ptr(),
        Err(err) => {
            report("clet_get", &err);
            SENTINEL_C.as_ptr()
        }
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn clet_remove(key: *const c_char) -> *const c_char {
    if let Err(err) = read_text(key, "key").and_then(global::remove) {
        report("clet_remove", &err);
    }
    SENTINEL_C.as_ptr()
}

#[unsafe(no_mangle)]
pub extern "C" fn clet_free(_arg: *const c_char) -> *const c_char {
    if let Err(err) = global::free() {
        report("clet_free", &err);
    }
    SENTINEL_C.as_ptr()
}

#[unsafe(no_mangle)]
pub extern "C" fn clet_store_new(
    out_store: *mut *mut clet_store,
    out_err: *mut *mut clet_error,
) -> i32 {
    if out_store.is_null() {
        return fail(
            out_err,
            Error::new(ErrorKind::Usage).with_message("out_store is null"),
        );
    }
    logging::init_from_env();
    let handle = Box::new(clet_store {
        store: Store::with_options(StoreOptions::from_env()),
    });
    unsafe {
        *out_store = Box::into_raw(handle);
    }
    0
}

#[unsafe(no_mangle)]
pub extern "C" fn clet_store_set(
    store: *mut clet_store,
    line: *const c_char,
    out_err: *mut *mut clet_error,
) -> i32 {
    let store = match borrow_store(store, out_err) {
        Ok(store) => store,
        Err(code) => return code,
    };
    let line = match read_text(line, "line") {
        Ok(line) => line,
        Err(err) => return fail(out_err, err),
    };
    match store.store.set_line(line) {
        Ok(_) => 0,
        Err(err) => fail(out_err, err),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn clet_store_get(
    store: *mut clet_store,
    key: *const c_char,
    out_value: *mut clet_buf,
    out_err: *mut *mut clet_error,
) -> i32 {
    let store = match borrow_store(store, out_err) {
        Ok(store) => store,
        Err(code) => return code,
    };
    let key = match read_text(key, "key") {
        Ok(key) => key,
        Err(err) => return fail(out_err, err),
    };
    if out_value.is_null() {
        return fail(
            out_err,
            Error::new(ErrorKind::Usage).with_message("out_value is null"),
        );
    }
    let value = match store.store.get(key) {
        Ok(lookup) => lookup.into_option(),
        Err(err) => return fail(out_err, err),
    };
    let Some(value) = value else {
        unsafe {
            *out_value = clet_buf {
                data: ptr::null_mut(),
                len: 0,
            };
        }
        return 0;
    };
    if let Err(err) = write_value_buf(out_value, value) {
        return fail(out_err, err);
    }
    1
}

#[unsafe(no_mangle)]
pub extern "C" fn clet_store_remove(
    store: *mut clet_store,
    key: *const c_char,
    out_err: *mut *mut clet_error,
) -> i32 {
    let store = match borrow_store(store, out_err) {
        Ok(store) => store,
        Err(code) => return code,
    };
    let key = match read_text(key, "key") {
        Ok(key) => key,
        Err(err) => return fail(out_err, err),
    };
    match store.store.remove(key) {
        Ok(true) => 1,
        Ok(false) => 0,
        Err(err) => fail(out_err, err),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn clet_store_len(store: *const clet_store) -> u64 {
    if store.is_null() {
        return 0;
    }
    let store = unsafe { &*store };
    store.store.len().map(|len| len as u64).unwrap_or(0)
}

#[unsafe(no_mangle)]
pub extern "C" fn clet_store_free(store: *mut clet_store) {
    if store.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(store));
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn clet_buf_free(buf: *mut clet_buf) {
    if buf.is_null() {
        return;
    }
    unsafe {
        let buf = &mut *buf;
        if !buf.data.is_null() {
            drop(CString::from_raw(buf.data));
        }
        buf.data = ptr::null_mut();
        buf.len = 0;
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn clet_error_free(err: *mut clet_error) {
    if err.is_null() {
        return;
    }
    unsafe {
        let err = Box::from_raw(err);
        if !err.message.is_null() {
            drop(CString::from_raw(err.message));
        }
        if !err.key.is_null() {
            drop(CString::from_raw(err.key));
        }
    }
}

fn borrow_store<'a>(
    store: *mut clet_store,
    out_err: *mut *mut clet_error,
) -> Result<&'a clet_store, i32> {
    if store.is_null() {
        return Err(fail(
            out_err,
            Error::new(ErrorKind::Usage).with_message("store is null"),
        ));
    }
    unsafe { Ok(&*store) }
}

fn read_text<'a>(input: *const c_char, name: &str) -> Result<&'a str, Error> {
    if input.is_null() {
        return Err(Error::new(ErrorKind::Usage).with_message(format!("{name} is null")));
    }
    unsafe { CStr::from_ptr(input) }.to_str().map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("{name} is not valid UTF-8"))
            .with_source(err)
    })
}

fn write_value_buf(out_value: *mut clet_buf, value: String) -> Result<(), Error> {
    let len = value.len();
    let data = CString::new(value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("stored value contains NUL")
            .with_source(err)
    })?;
    unsafe {
        *out_value = clet_buf {
            data: data.into_raw(),
            len,
        };
    }
    Ok(())
}

fn report(call: &str, err: &Error) {
    tracing::warn!(call, kind = ?err.kind(), error = %err, "call failed; returning sentinel");
}

fn fail(out_err: *mut *mut clet_error, err: Error) -> i32 {
    tracing::debug!(kind = ?err.kind(), error = %err, "handle call failed");
    if out_err.is_null() {
        return -1;
    }
    let error = Box::new(clet_error {
        kind: to_exit_code(err.kind()),
        message: to_c_string(err.message().unwrap_or("")),
        key: err.key().map(to_c_string).unwrap_or(ptr::null_mut()),
    });
    unsafe {
        *out_err = Box::into_raw(error);
    }
    -1
}

fn to_c_string(input: &str) -> *mut c_char {
    CString::new(input)
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_store() -> *mut clet_store {
        let mut store = ptr::null_mut();
        let mut err = ptr::null_mut();
        assert_eq!(clet_store_new(&mut store, &mut err), 0);
        assert!(err.is_null());
        store
    }

    fn get(store: *mut clet_store, key: &CStr) -> Option<String> {
        let mut value = clet_buf {
            data: ptr::null_mut(),
            len: 0,
        };
        let mut err = ptr::null_mut();
        let code = clet_store_get(store, key.as_ptr(), &mut value, &mut err);
        assert!(code >= 0, "get failed");
        if code == 0 {
            assert!(value.data.is_null());
            return None;
        }
        let text = unsafe { CStr::from_ptr(value.data) }
            .to_str()
            .expect("utf8")
            .to_string();
        assert_eq!(text.len(), value.len);
        clet_buf_free(&mut value);
        assert!(value.data.is_null());
        Some(text)
    }

    #[test]
    fn handle_round_trip() {
        let store = new_store();
        let mut err = ptr::null_mut();
        assert_eq!(clet_store_set(store, c"greeting hello there".as_ptr(), &mut err), 0);
        assert_eq!(get(store, c"greeting").as_deref(), Some("hello there"));
        assert_eq!(get(store, c"missing"), None);
        assert_eq!(clet_store_len(store), 1);
        clet_store_free(store);
    }

    #[test]
    fn handle_tells_stored_nil_from_absence() {
        let store = new_store();
        let mut err = ptr::null_mut();
        assert_eq!(clet_store_set(store, c"k nil".as_ptr(), &mut err), 0);
        assert_eq!(get(store, c"k").as_deref(), Some("nil"));
        assert_eq!(clet_store_remove(store, c"k".as_ptr(), &mut err), 1);
        assert_eq!(clet_store_remove(store, c"k".as_ptr(), &mut err), 0);
        assert_eq!(get(store, c"k"), None);
        clet_store_free(store);
    }

    #[test]
    fn handle_errors_carry_kind_and_key() {
        let store = new_store();
        let mut err: *mut clet_error = ptr::null_mut();
        assert_eq!(clet_store_set(store, c" orphan".as_ptr(), &mut err), -1);
        assert!(!err.is_null());
        unsafe {
            assert_eq!((*err).kind, 2);
            assert_eq!(CStr::from_ptr((*err).message).to_str().expect("utf8"), "empty key");
            assert_eq!(CStr::from_ptr((*err).key).to_str().expect("utf8"), "");
        }
        clet_error_free(err);
        assert_eq!(clet_store_len(store), 0);
        clet_store_free(store);
    }

    #[test]
    fn null_arguments_are_usage_errors() {
        let mut err: *mut clet_error = ptr::null_mut();
        assert_eq!(clet_store_set(ptr::null_mut(), c"a 1".as_ptr(), &mut err), -1);
        unsafe {
            assert_eq!((*err).kind, 2);
        }
        clet_error_free(err);

        let store = new_store();
        let mut err: *mut clet_error = ptr::null_mut();
        assert_eq!(clet_store_set(store, ptr::null(), &mut err), -1);
        clet_error_free(err);
        assert_eq!(
            clet_store_get(store, c"a".as_ptr(), ptr::null_mut(), ptr::null_mut()),
            -1
        );
        assert_eq!(clet_store_new(ptr::null_mut(), ptr::null_mut()), -1);
        assert_eq!(clet_store_len(ptr::null()), 0);
        clet_store_free(store);
        clet_store_free(ptr::null_mut());
        clet_error_free(ptr::null_mut());
        clet_buf_free(ptr::null_mut());
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let store = new_store();
        let bytes = [b'k', b' ', 0xff, 0];
        let line = CStr::from_bytes_with_nul(&bytes).expect("cstr");
        let mut err: *mut clet_error = ptr::null_mut();
        assert_eq!(clet_store_set(store, line.as_ptr(), &mut err), -1);
        unsafe {
            assert_eq!((*err).kind, 2);
        }
        clet_error_free(err);
        clet_store_free(store);
    }

    struct SendStore(*mut clet_store);
    unsafe impl Send for SendStore {}

    #[test]
    fn get_copies_survive_concurrent_overwrite() {
        let store = new_store();
        let a = CString::new(format!("k {}", "a".repeat(4000))).expect("line");
        let b = CString::new(format!("k {}", "b".repeat(4000))).expect("line");
        let mut err = ptr::null_mut();
        assert_eq!(clet_store_set(store, a.as_ptr(), &mut err), 0);

        let writer_store = SendStore(store);
        let writer = std::thread::spawn(move || {
            let writer_store = writer_store;
            let mut err = ptr::null_mut();
            for i in 0..2000 {
                let line = if i % 2 == 0 { &b } else { &a };
                assert_eq!(clet_store_set(writer_store.0, line.as_ptr(), &mut err), 0);
            }
        });

        for _ in 0..2000 {
            let value = get(store, c"k").expect("present");
            assert_eq!(value.len(), 4000);
            let first = value.as_bytes()[0];
            assert!(first == b'a' || first == b'b');
            assert!(value.bytes().all(|byte| byte == first));
        }

        writer.join().expect("join");
        clet_store_free(store);
    }
}
