//! Request middleware.

pub mod access_control;
pub mod metrics;

pub use access_control::{access_control_middleware, AccessControlState, ClientIp};
pub use metrics::track_requests;
