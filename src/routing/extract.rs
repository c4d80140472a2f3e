//! Extension helpers for reading path and query parameters.
//!
//! Path parameters are captured by the match block and stored in the
//! request extensions before the handler runs. Query parameters are decoded
//! on demand from the request URI.

use std::str::FromStr;

use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Variables captured from the URI template of the matched case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Error reading a request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("missing {kind} parameter `{name}`")]
    Missing { kind: &'static str, name: String },

    #[error("invalid {kind} parameter `{name}`: `{value}`")]
    Invalid {
        kind: &'static str,
        name: String,
        value: String,
    },
}

impl IntoResponse for ParamError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

const PATH: &str = "path";
const QUERY: &str = "query";

/// Parameter access on any request.
pub trait RequestExt {
    /// Variables captured by the matched case (empty if none).
    fn path_params(&self) -> PathParams;

    /// A captured path variable, borrowed from the request.
    fn path_param(&self, name: &str) -> Result<&str, ParamError>;

    /// A captured path variable parsed into `T`.
    fn path_param_as<T: FromStr>(&self, name: &str) -> Result<T, ParamError>;

    /// All query pairs in order, form-decoded.
    fn query_params(&self) -> Vec<(String, String)>;

    /// First value of a query parameter.
    fn query_param(&self, name: &str) -> Option<String>;

    /// First value of a query parameter, or `default` if absent.
    fn query_param_or(&self, name: &str, default: &str) -> String {
        self.query_param(name)
            .unwrap_or_else(|| default.to_string())
    }

    /// First value of a query parameter parsed into `T`.
    fn query_param_as<T: FromStr>(&self, name: &str) -> Result<Option<T>, ParamError> {
        self.query_param(name)
            .map(|value| parse(QUERY, name, &value))
            .transpose()
    }
}

impl<B> RequestExt for Request<B> {
    fn path_params(&self) -> PathParams {
        self.extensions()
            .get::<PathParams>()
            .cloned()
            .unwrap_or_default()
    }

    fn path_param(&self, name: &str) -> Result<&str, ParamError> {
        self.extensions()
            .get::<PathParams>()
            .and_then(|p| p.get(name))
            .ok_or_else(|| ParamError::Missing {
                kind: PATH,
                name: name.to_string(),
            })
    }

    fn path_param_as<T: FromStr>(&self, name: &str) -> Result<T, ParamError> {
        parse(PATH, name, self.path_param(name)?)
    }

    fn query_params(&self) -> Vec<(String, String)> {
        self.uri()
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn query_param(&self, name: &str) -> Option<String> {
        let query = self.uri().query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}

fn parse<T: FromStr>(kind: &'static str, name: &str, value: &str) -> Result<T, ParamError> {
    value.parse().map_err(|_| ParamError::Invalid {
        kind,
        name: name.to_string(),
        value: value.to_string(),
    })
}
