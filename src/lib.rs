//! Expression-based routing on top of axum.
//!
//! An application implements one routing function, a match block of
//! `(case, handler)` pairs tried top to bottom, instead of registering a
//! handler per route. axum forwards every verb on every path into it.

pub mod app;
pub mod books;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{MatchBlock, MatchRouter};
