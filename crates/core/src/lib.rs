//! Shared foundation for the StreamPass account subsystem: configuration,
//! the closed error taxonomy, wire models, and the role/capability model.

pub mod config;
pub mod error;
pub mod rbac;
pub mod types;

pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use rbac::Role;
