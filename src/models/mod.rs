//! Request and Response models for the admin API

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::SetTtlRequest;
pub use responses::{HealthResponse, InvalidateResponse, KeyResponse, TtlResponse};
