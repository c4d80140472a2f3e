//! Example application: greeting endpoints and a Book resource.
//!
//! # Data Flow
//! ```text
//! Dispatcher (routes.rs, one match block)
//!     → handlers.rs (read params / JSON, call repository)
//!     → error.rs (failures → JSON error body)
//! ```

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::HandlerError;
pub use routes::{router, routes};
pub use state::AppState;
