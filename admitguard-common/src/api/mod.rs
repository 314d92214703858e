//! API request/response types shared by every AdmitGuard client

pub mod types;

pub use types::*;
