//! Purpose: Environment-driven configuration for stores the host cannot configure directly.
//! Exports: `CHUNK_SIZE_ENV`, `EMPTY_KEYS_ENV`, `StoreOptions::from_env`.
//! Role: The legacy C entry points take no options, so the process environment fills the gap.
//! Invariants: Unset variables yield defaults; invalid values yield defaults plus a warning.
use std::str::FromStr;

use crate::core::error::{Error, ErrorKind};
use crate::core::table::{EmptyKeys, StoreOptions};

pub const CHUNK_SIZE_ENV: &str = "CLET_CHUNK_SIZE";
pub const EMPTY_KEYS_ENV: &str = "CLET_EMPTY_KEYS";

impl FromStr for EmptyKeys {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(EmptyKeys::Reject),
            "accept" => Ok(EmptyKeys::Accept),
            _ => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("expected accept|reject, got {input:?}"))),
        }
    }
}

impl StoreOptions {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = StoreOptions::new();
        if let Some(raw) = lookup(CHUNK_SIZE_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(size) if size > 0 => options = options.with_chunk_size(size),
                _ => tracing::warn!(var = CHUNK_SIZE_ENV, value = %raw, "ignoring invalid chunk size"),
            }
        }
        if let Some(raw) = lookup(EMPTY_KEYS_ENV) {
            match raw.parse::<EmptyKeys>() {
                Ok(policy) => options = options.with_empty_keys(policy),
                Err(err) => tracing::warn!(var = EMPTY_KEYS_ENV, error = %err, "ignoring invalid empty-key policy"),
            }
        }
        options
    }
}
