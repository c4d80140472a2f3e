//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via `tracing` fields
//! - Every request span carries its `x-request-id` (see `http::request::request_span`)
//! - Metrics are cheap and become no-ops when no recorder is installed

pub mod logging;
pub mod metrics;
