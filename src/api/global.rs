//! Purpose: The single process-wide table behind the legacy sentinel entry points.
//! Exports: `init`, `init_with`, `set_line`, `get`, `remove`, `free`, `is_live`, `snapshot`.
//! Role: Compatibility layer for hosts that only know `init/set/get/free`; new code uses `Store`.
//! Invariants: At most one table is live between `init` and `free`.
//! Invariants: Use before `init` or after `free` is an `Uninitialized` error, never UB.
//! Invariants: One mutex serializes every operation on the table itself.
//! Invariants: `get_ptr` outlives the lock; hosts reading a key while another thread sets,
//! removes, or frees it must coordinate those calls themselves.
#![allow(clippy::result_large_err)]

use std::collections::BTreeMap;
use std::os::raw::c_char;
use std::sync::{Mutex, MutexGuard};

use super::store::{ApiResult, Lookup};
use crate::core::error::{Error, ErrorKind};
use crate::core::table::{SetOutcome, StoreOptions, VariableTable};

static TABLE: Mutex<Option<VariableTable>> = Mutex::new(None);

/// Creates the table from environment options. Returns `false` when a table
/// was already live; the live table is kept untouched.
pub fn init() -> ApiResult<bool> {
    init_with(StoreOptions::from_env())
}

pub fn init_with(options: StoreOptions) -> ApiResult<bool> {
    let mut slot = lock()?;
    if slot.is_some() {
        tracing::debug!("init called on a live table; keeping it");
        return Ok(false);
    }
    *slot = Some(VariableTable::with_options(options));
    tracing::debug!(?options, "table initialized");
    Ok(true)
}

pub fn set_line(line: &str) -> ApiResult<SetOutcome> {
    let mut slot = lock()?;
    let table = live_mut(&mut slot)?;
    let (key, outcome) = table.assign_line(line)?;
    tracing::debug!(key = %key, ?outcome, "set");
    Ok(outcome)
}

pub fn get(key: &str) -> ApiResult<Lookup> {
    let slot = lock()?;
    let table = live(&slot)?;
    Ok(Lookup::from_text(table.get(key).map(|value| value.as_str())))
}

/// Pointer into table-owned storage, valid until the key is next set or
/// removed, or the table is freed.
pub(crate) fn get_ptr(key: &str) -> ApiResult<Option<*const c_char>> {
    let slot = lock()?;
    let table = live(&slot)?;
    Ok(table.get(key).map(|value| value.as_ptr()))
}

pub fn remove(key: &str) -> ApiResult<bool> {
    let mut slot = lock()?;
    let removed = live_mut(&mut slot)?.remove(key);
    tracing::debug!(key = %key, removed, "remove");
    Ok(removed)
}

/// Drops the live table and every entry in it. Returns `false` when no table
/// was live.
pub fn free() -> ApiResult<bool> {
    let mut slot = lock()?;
    match slot.take() {
        Some(table) => {
            tracing::debug!(entries = table.len(), "table freed");
            Ok(true)
        }
        None => Ok(false),
    }
}

pub fn is_live() -> bool {
    lock().map(|slot| slot.is_some()).unwrap_or(false)
}

/// Sorted copy of the live table, or `None` when no table is live.
pub fn snapshot() -> ApiResult<Option<BTreeMap<String, String>>> {
    Ok(lock()?.as_ref().map(VariableTable::snapshot))
}

fn lock() -> ApiResult<MutexGuard<'static, Option<VariableTable>>> {
    TABLE
        .lock()
        .map_err(|_| Error::new(ErrorKind::Internal).with_message("table lock poisoned"))
}

fn live<'a>(slot: &'a Option<VariableTable>) -> ApiResult<&'a VariableTable> {
    slot.as_ref().ok_or_else(uninitialized)
}

fn live_mut<'a>(slot: &'a mut Option<VariableTable>) -> ApiResult<&'a mut VariableTable> {
    slot.as_mut().ok_or_else(uninitialized)
}

fn uninitialized() -> Error {
    Error::new(ErrorKind::Uninitialized).with_message("table used before init or after free")
}
