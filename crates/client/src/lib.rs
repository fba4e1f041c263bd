//! StreamPass account client — session lifecycle, credential normalization,
//! and the authenticated JSON gateway every other component calls through.
//!
//! # Modules
//!
//! - [`session`] — Single-slot bearer token store with optional file persistence
//! - [`gateway`] — Authenticated request execution and error normalization
//! - [`credentials`] — Username/password canonicalization and validation
//! - [`auth`] — Register, login, profile fetch, session verification
//! - [`plans`] — Subscription plan catalog
//! - [`sequence`] — Last-request-wins ticketing for view refetch loops

pub mod auth;
pub mod credentials;
pub mod gateway;
pub mod plans;
pub mod sequence;
pub mod session;

pub use auth::AccountClient;
pub use gateway::ApiGateway;
pub use plans::PlanCatalog;
pub use sequence::RequestSequencer;
pub use session::SessionStore;
