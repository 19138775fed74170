//! Purpose: Define the stable public Rust API boundary for clet.
//! Exports: `Store`, `Lookup`, options, errors, the sentinel, and the legacy `global` table.
//! Role: Public, additive-only surface used by the C ABI, the CLI, and embedders.
//! Invariants: This module is the only public path to the table primitives.
//! Invariants: The `"nil"` sentinel appears only through `sentinel` helpers.

mod config;
pub mod global;
mod sentinel;
mod store;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use crate::core::table::{EmptyKeys, SetOutcome, StoreOptions};
pub use config::{CHUNK_SIZE_ENV, EMPTY_KEYS_ENV};
pub use sentinel::{SENTINEL, SENTINEL_C};
pub use store::{ApiResult, Lookup, Store};
