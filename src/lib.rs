//! Purpose: Embeddable variable store exposed to host runtimes through a C ABI.
//! Exports: `api` (store, lookups, options, errors), `abi` (C entry points),
//! `host` (by-name calls into the ABI), `logging`.
//! Role: Library backing `libclet` (cdylib/staticlib) and the `clet` CLI.
//! Invariants: Rust callers get tagged results; the `"nil"` sentinel exists only at the C boundary.
//! Invariants: Core modules take explicit inputs; the only hidden state is the legacy global table.
pub mod abi;
pub mod api;
pub mod core;
pub mod host;
pub mod logging;
