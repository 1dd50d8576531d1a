//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (recorded on the span and echoed back)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Authorization is not a layer: handlers take [`RequireAdminAuth`] or
//! [`RequireRole`] extractors.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{
    AdminAuthRejection, Owner, RequireAdminAuth, RequireRole, RoleRequirement, StoreAdmin,
    clear_current_admin, set_current_admin,
};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
