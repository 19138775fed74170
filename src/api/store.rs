//! Purpose: Owned, lock-protected variable store for in-process callers.
//! Exports: `Store`, `Lookup`, `ApiResult`.
//! Role: Explicit replacement for the process-wide table; backs the handle ABI.
//! Invariants: Every operation holds the store lock for its full duration.
//! Invariants: Lookups return a tagged result; the `"nil"` sentinel never appears here.
#![allow(clippy::result_large_err)]

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::core::error::{Error, ErrorKind};
use crate::core::table::{SetOutcome, StoreOptions, VariableTable};

pub type ApiResult<T> = Result<T, Error>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Lookup {
    Value(String),
    Empty,
    Missing,
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        !matches!(self, Lookup::Missing)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Lookup::Value(value) => Some(value),
            Lookup::Empty => Some(""),
            Lookup::Missing => None,
        }
    }

    pub fn into_option(self) -> Option<String> {
        match self {
            Lookup::Value(value) => Some(value),
            Lookup::Empty => Some(String::new()),
            Lookup::Missing => None,
        }
    }

    pub(crate) fn from_text(text: Option<&str>) -> Self {
        match text {
            Some("") => Lookup::Empty,
            Some(value) => Lookup::Value(value.to_string()),
            None => Lookup::Missing,
        }
    }
}

#[derive(Debug)]
pub struct Store {
    table: Mutex<VariableTable>,
}

impl Store {
    pub fn new() -> Self {
        Self::with_options(StoreOptions::new())
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            table: Mutex::new(VariableTable::with_options(options)),
        }
    }

    pub fn options(&self) -> ApiResult<StoreOptions> {
        Ok(self.lock()?.options())
    }

    /// Parses a `<key> <value...>` line and stores the pair.
    pub fn set_line(&self, line: &str) -> ApiResult<SetOutcome> {
        let mut table = self.lock()?;
        let (key, outcome) = table.assign_line(line)?;
        tracing::debug!(key = %key, ?outcome, "set");
        Ok(outcome)
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> ApiResult<SetOutcome> {
        let outcome = self.lock()?.set(key, value)?;
        tracing::debug!(key = %key, ?outcome, "set");
        Ok(outcome)
    }

    pub fn get(&self, key: &str) -> ApiResult<Lookup> {
        let table = self.lock()?;
        Ok(Lookup::from_text(table.get(key).map(|value| value.as_str())))
    }

    pub fn remove(&self, key: &str) -> ApiResult<bool> {
        let removed = self.lock()?.remove(key);
        tracing::debug!(key = %key, removed, "remove");
        Ok(removed)
    }

    pub fn clear(&self) -> ApiResult<()> {
        self.lock()?.clear();
        Ok(())
    }

    pub fn len(&self) -> ApiResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> ApiResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    pub fn snapshot(&self) -> ApiResult<BTreeMap<String, String>> {
        Ok(self.lock()?.snapshot())
    }

    fn lock(&self) -> ApiResult<MutexGuard<'_, VariableTable>> {
        self.table
            .lock()
            .map_err(|_| Error::new(ErrorKind::Internal).with_message("store lock poisoned"))
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
