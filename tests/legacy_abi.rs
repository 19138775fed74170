//! Purpose: Contract coverage for the legacy sentinel entry points.
//! Exports: Integration tests only.
//! Role: Exercise `clet_init/set/get/remove/free` exactly as a host would, through C strings.
//! Invariants: The legacy table is process-wide, so every test holds `SERIAL` and starts from `free`.
//! Notes: `get` results are copied out before the next call, matching the pointer lifetime contract.
use std::ffi::{CStr, CString};
use std::sync::{Mutex, MutexGuard};

use clet::abi::{clet_free, clet_get, clet_init, clet_remove, clet_set};
use clet::api::{ErrorKind, Lookup, global};
use clet::host;

static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    let guard = SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    clet_free(std::ptr::null());
    guard
}

fn text(ptr: *const std::os::raw::c_char) -> String {
    assert!(!ptr.is_null());
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .expect("utf8")
        .to_string()
}

fn set(line: &str) -> String {
    let line = CString::new(line).expect("no NUL");
    text(clet_set(line.as_ptr()))
}

fn get(key: &str) -> String {
    let key = CString::new(key).expect("no NUL");
    text(clet_get(key.as_ptr()))
}

#[test]
fn round_trip_and_overwrite() {
    let _guard = serial();
    assert_eq!(text(clet_init(std::ptr::null())), "nil");

    assert_eq!(set("a 1"), "nil");
    assert_eq!(get("a"), "1");
    assert_eq!(set("a 2"), "nil");
    assert_eq!(get("a"), "2");

    let table = global::snapshot().expect("snapshot").expect("live");
    assert_eq!(table.len(), 1);

    assert_eq!(text(clet_free(std::ptr::null())), "nil");
}

#[test]
fn absence_and_no_space_input() {
    let _guard = serial();
    clet_init(c"".as_ptr());

    assert_eq!(get("missing"), "nil");
    set("justkey");
    assert_eq!(get("justkey"), "");
    assert_eq!(global::get("justkey").expect("get"), Lookup::Empty);

    clet_free(c"".as_ptr());
}

#[test]
fn value_keeps_internal_spaces() {
    let _guard = serial();
    clet_init(std::ptr::null());

    set("k a b c");
    assert_eq!(get("k"), "a b c");
    set("t  leading and trailing  ");
    assert_eq!(get("t"), " leading and trailing  ");

    clet_free(std::ptr::null());
}

#[test]
fn large_value_crosses_many_chunks() {
    let _guard = serial();
    clet_init(std::ptr::null());

    let value: String = (0..5000)
        .map(|i| char::from(b'a' + (i % 26) as u8))
        .collect();
    set(&format!("k {value}"));
    let read = get("k");
    assert_eq!(read.len(), 5000);
    assert_eq!(read, value);

    clet_free(std::ptr::null());
}

#[test]
fn free_then_init_starts_empty() {
    let _guard = serial();
    clet_init(std::ptr::null());
    set("a 1");
    set("b 2");
    clet_free(std::ptr::null());
    assert!(!global::is_live());

    clet_init(std::ptr::null());
    assert_eq!(get("a"), "nil");
    assert_eq!(get("b"), "nil");
    assert_eq!(global::snapshot().expect("snapshot").map(|t| t.len()), Some(0));

    clet_free(std::ptr::null());
}

#[test]
fn second_init_keeps_live_table() {
    let _guard = serial();
    clet_init(std::ptr::null());
    set("a 1");
    clet_init(std::ptr::null());
    assert_eq!(get("a"), "1");
    clet_free(std::ptr::null());
}

#[test]
fn calls_before_init_are_guarded() {
    let _guard = serial();
    assert_eq!(set("a 1"), "nil");
    assert_eq!(get("a"), "nil");
    assert_eq!(text(clet_remove(c"a".as_ptr())), "nil");
    assert!(!global::is_live());

    let err = global::set_line("a 1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Uninitialized);

    assert_eq!(text(clet_free(std::ptr::null())), "nil");
}

#[test]
fn empty_key_is_not_stored() {
    let _guard = serial();
    clet_init(std::ptr::null());

    assert_eq!(set(" orphan"), "nil");
    assert_eq!(set("   "), "nil");
    assert_eq!(get(""), "nil");
    assert_eq!(global::snapshot().expect("snapshot").map(|t| t.len()), Some(0));

    clet_free(std::ptr::null());
}

#[test]
fn null_arguments_return_the_sentinel() {
    let _guard = serial();
    clet_init(std::ptr::null());

    assert_eq!(text(clet_set(std::ptr::null())), "nil");
    assert_eq!(text(clet_get(std::ptr::null())), "nil");
    assert_eq!(text(clet_remove(std::ptr::null())), "nil");

    clet_free(std::ptr::null());
}

#[test]
fn remove_drops_one_entry() {
    let _guard = serial();
    clet_init(std::ptr::null());

    set("a 1");
    set("b 2");
    clet_remove(c"a".as_ptr());
    assert_eq!(get("a"), "nil");
    assert_eq!(get("b"), "2");

    clet_free(std::ptr::null());
}

#[test]
fn pointer_stays_valid_until_same_key_is_set() {
    let _guard = serial();
    clet_init(std::ptr::null());

    set("a first");
    let held = clet_get(c"a".as_ptr());
    set("b other");
    assert_eq!(text(held), "first");

    clet_free(std::ptr::null());
}

#[test]
fn host_calls_by_name() {
    let _guard = serial();
    assert_eq!(host::call_by_name("clet_init", "").expect("init"), "nil");
    assert_eq!(host::call_by_name("set", "x hello world").expect("set"), "nil");
    assert_eq!(host::call_by_name("get", "x").expect("get"), "hello world");
    assert_eq!(host::call_by_name("clet_get", "y").expect("get"), "nil");

    let err = host::call_by_name("call_from_c", "1").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = host::call_by_name("set", "a\0b").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);

    assert_eq!(host::call_by_name("free", "").expect("free"), "nil");
}

#[test]
fn concurrent_hosts_are_serialized() {
    let _guard = serial();
    clet_init(std::ptr::null());

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            std::thread::spawn(move || {
                for i in 0..50 {
                    set(&format!("w{worker}-{i} {i}"));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("join");
    }

    assert_eq!(global::snapshot().expect("snapshot").map(|t| t.len()), Some(200));
    assert_eq!(get("w2-17"), "17");

    clet_free(std::ptr::null());
}
