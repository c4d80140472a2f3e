//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (any verb, any path)
//!     → router.rs (forward to the single routing function)
//!     → dispatch.rs (match block: cases top-to-bottom)
//!     → matcher.rs (URI template, verb, media type)
//!     → handler, or 501 Not Implemented
//!
//! Inside the handler:
//!     extract.rs (path / query parameter helpers)
//! ```
//!
//! # Design Decisions
//! - Match block compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same case
//! - First match wins (declaration order)

pub mod dispatch;
pub mod extract;
pub mod matcher;
pub mod router;

pub use dispatch::{any, delete, get, patch, post, put, Case, Dispatcher, MatchBlock};
pub use extract::{ParamError, PathParams, RequestExt};
pub use matcher::{Matcher, TemplateError, UriTemplate};
pub use router::{into_service, MatchRouter};
