//! HTTP middleware and extractors.

pub mod auth;
pub mod session;

pub use auth::{AuthRejection, OptionalAuth, RequireAdmin, RequireAuth, RequireSuperAdmin};
pub use session::{create_session_layer, postgres_session_store};
