//! Response hardening.
//!
//! # Responsibilities
//! - Add security headers to every response
//!
//! # Design Decisions
//! - Headers are only set when the handler did not set them already

use axum::http::{header, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

/// `x-content-type-options: nosniff` unless already present.
pub fn nosniff_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    )
}
