//! Agro API crate - axum HTTP server, route handlers, the embedded page.
//!
//! Serves the crop advisor page, the session endpoints (create, select crop,
//! ask, inspect, end), the crop listing, and a health check.

pub mod error;
pub mod handlers;
pub mod page;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::{AppState, SessionSlot, SessionStore};
