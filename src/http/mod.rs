//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (peer address captured)
//!     → server.rs (Axum setup, request ID, tracing, limits)
//!     → middleware/access_control.rs (IP gate, 403 on denial)
//!     → viewer::handlers (file operations)
//!     → response.rs (JSON envelope)
//!     → Send to client
//! ```

pub mod middleware;
pub mod response;
pub mod server;

pub use response::{AccessDenied, ApiResponse};
pub use server::HttpServer;
