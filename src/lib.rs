/// docdeck — terminal client for a remote document-management service.
///
/// Core library providing the document collection store, filter/sort
/// engine, upload validation and status polling, and the ratatui front end.

pub mod api;
pub mod config;
pub mod core;
pub mod tui;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
