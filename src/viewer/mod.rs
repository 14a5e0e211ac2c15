//! Log viewer subsystem.
//!
//! # Data Flow
//! ```text
//! /log/* request (already admitted by the access gate)
//!     → handlers.rs (extract name, call store)
//!     → store.rs (validate name, check switches, file I/O)
//!     → http::response (JSON envelope)
//! ```

pub mod handlers;
pub mod page;
pub mod store;

pub use handlers::ViewerState;
pub use store::{LogEntry, LogStore, Operation, StoreError};
