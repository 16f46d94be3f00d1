//! Core client logic: the collection store, the pure filter/sort engine,
//! upload validation, status polling, and shared formatting helpers.

pub mod filter;
pub mod format;
pub mod logging;
pub mod poller;
pub mod store;
pub mod validate;
