//! The match block: ordered cases evaluated top-to-bottom.
//!
//! # Responsibilities
//! - Hold the declared cases in declaration order
//! - Select the first case whose predicates all pass
//! - Hand captured path variables to the handler via request extensions
//! - Answer everything else with a fixed `501 Not Implemented`
//!
//! # Design Decisions
//! - Built once at startup, immutable at runtime (shared via `Arc`)
//! - First match wins: later cases are never evaluated after a hit
//! - Predicate order per case: URI template, verb, media types
//! - The fallback is not configurable

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::http::request::RequestIdExt;
use crate::observability::metrics;
use crate::routing::extract::PathParams;
use crate::routing::matcher::{
    AndMatcher, MediaTypeMatcher, Matcher, MethodMatcher, TemplateError, UriTemplate,
};
use crate::routing::router::MatchRouter;

/// Body of the fallback response.
pub const NOT_IMPLEMENTED: &str = "Not Implemented";

/// A named conjunction of predicates.
#[derive(Debug)]
pub struct Case {
    name: String,
    template: UriTemplate,
    method: Option<Method>,
    conditions: AndMatcher,
}

impl Case {
    /// Match `template` for the given verb (`None` = any verb).
    pub fn new(method: Option<Method>, template: &str) -> Result<Self, TemplateError> {
        let template = UriTemplate::parse(template)?;
        let name = match &method {
            Some(m) => format!("{m} {template}"),
            None => format!("* {template}"),
        };

        let mut conditions = AndMatcher::default();
        if let Some(m) = &method {
            conditions.push(Box::new(MethodMatcher::new(m.clone())));
        }

        Ok(Self {
            name,
            template,
            method,
            conditions,
        })
    }

    /// Require the request body to be of `media_type`.
    pub fn consumes(mut self, media_type: &str) -> Self {
        self.conditions
            .push(Box::new(MediaTypeMatcher::consumes(media_type)));
        self
    }

    /// Require the client to accept `media_type`.
    pub fn produces(mut self, media_type: &str) -> Self {
        self.conditions
            .push(Box::new(MediaTypeMatcher::produces(media_type)));
        self
    }

    /// Override the name used in logs and metrics.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &UriTemplate {
        &self.template
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// Evaluate the case, returning captured variables on a match.
    pub fn evaluate(&self, req: &Request<Body>) -> Option<PathParams> {
        let params = self.template.capture(req.uri().path())?;
        self.conditions.matches(req).then_some(params)
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

pub fn get(template: &str) -> Result<Case, TemplateError> {
    Case::new(Some(Method::GET), template)
}

pub fn post(template: &str) -> Result<Case, TemplateError> {
    Case::new(Some(Method::POST), template)
}

pub fn put(template: &str) -> Result<Case, TemplateError> {
    Case::new(Some(Method::PUT), template)
}

pub fn patch(template: &str) -> Result<Case, TemplateError> {
    Case::new(Some(Method::PATCH), template)
}

pub fn delete(template: &str) -> Result<Case, TemplateError> {
    Case::new(Some(Method::DELETE), template)
}

/// Match `template` regardless of verb.
pub fn any(template: &str) -> Result<Case, TemplateError> {
    Case::new(None, template)
}

type BoxedHandler<S> =
    Box<dyn Fn(S, Request<Body>) -> BoxFuture<'static, Response> + Send + Sync>;

struct Arm<S> {
    case: Case,
    handler: BoxedHandler<S>,
}

/// Ordered cases with a fixed fallback.
pub struct MatchBlock<S> {
    arms: Vec<Arm<S>>,
}

impl<S> Default for MatchBlock<S> {
    fn default() -> Self {
        Self { arms: Vec::new() }
    }
}

impl<S> fmt::Debug for MatchBlock<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.arms.iter().map(|arm| &arm.case.name))
            .finish()
    }
}

impl<S> MatchBlock<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a case. Cases are evaluated in the order they are added.
    pub fn case<H, Fut, R>(mut self, case: Case, handler: H) -> Self
    where
        H: Fn(S, Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        let handler: BoxedHandler<S> = Box::new(move |state, req| {
            handler(state, req).map(IntoResponse::into_response).boxed()
        });
        self.arms.push(Arm { case, handler });
        self
    }

    pub fn len(&self) -> usize {
        self.arms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// The declared cases, in evaluation order.
    pub fn cases(&self) -> impl Iterator<Item = &Case> {
        self.arms.iter().map(|arm| &arm.case)
    }

    /// Index of the first matching case and its captured variables.
    pub fn select(&self, req: &Request<Body>) -> Option<(usize, PathParams)> {
        self.arms
            .iter()
            .enumerate()
            .find_map(|(index, arm)| {
                arm.case
                    .evaluate(req)
                    .map(|params| (index, params))
            })
    }

    /// Run the first matching handler, or the fallback.
    pub async fn dispatch(&self, state: S, mut req: Request<Body>) -> Response {
        let start_time = Instant::now();
        let method = req.method().to_string();
        let request_id = req.request_id().to_string();

        let Some((index, params)) = self.select(&req) else {
            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %req.uri().path(),
                "No case matched, responding Not Implemented"
            );
            metrics::record_unmatched(&method);
            metrics::record_request(
                &method,
                StatusCode::NOT_IMPLEMENTED.as_u16(),
                "fallback",
                start_time,
            );
            return not_implemented();
        };

        let arm = &self.arms[index];
        tracing::debug!(
            request_id = %request_id,
            case = %arm.case,
            path = %req.uri().path(),
            "Case matched"
        );

        req.extensions_mut().insert(params);
        let response = (arm.handler)(state, req).await;

        metrics::record_request(
            &method,
            response.status().as_u16(),
            arm.case.name(),
            start_time,
        );
        response
    }

    /// Bind state, producing a router.
    pub fn with_state(self, state: S) -> Dispatcher<S> {
        Dispatcher {
            block: Arc::new(self),
            state,
        }
    }
}

/// The fixed fallback response.
pub fn not_implemented() -> Response {
    (StatusCode::NOT_IMPLEMENTED, NOT_IMPLEMENTED).into_response()
}

/// A match block bound to its state.
pub struct Dispatcher<S> {
    block: Arc<MatchBlock<S>>,
    state: S,
}

impl<S> Clone for Dispatcher<S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            block: self.block.clone(),
            state: self.state.clone(),
        }
    }
}

impl<S> Dispatcher<S> {
    pub fn block(&self) -> &MatchBlock<S> {
        &self.block
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}

impl<S> MatchRouter for Dispatcher<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn route(&self, request: Request<Body>) -> BoxFuture<'_, Response> {
        self.block.dispatch(self.state.clone(), request).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::X_REQUEST_ID;
    use crate::observability::logging::capture::capture_logs;
    use crate::routing::extract::RequestExt;

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::default())
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn block() -> MatchBlock<()> {
        MatchBlock::new()
            .case(get("/hello").unwrap(), |_, _| async { "first" })
            .case(get("/hello").unwrap(), |_, _| async { "second" })
            .case(get("/hello/{name}").unwrap(), |_, req: Request<Body>| async move {
                format!("Hello {}!", req.path_param("name").unwrap_or_default())
            })
            .case(
                post("/books").unwrap().consumes("application/json"),
                |_, _| async { StatusCode::CREATED },
            )
    }

    #[test]
    fn test_cases() {
        let block = block();
        assert_eq!(block.len(), 4);
        assert_eq!(
            block.cases().map(Case::name).collect::<Vec<_>>(),
            vec!["GET /hello", "GET /hello", "GET /hello/{name}", "POST /books"]
        );

        let last = block.cases().last().unwrap();
        assert_eq!(last.template().to_string(), "/books");
        assert_eq!(last.method(), Some(&Method::POST));
        assert_eq!(any("/x").unwrap().method(), None);
        assert_eq!(any("/x").unwrap().name(), "* /x");
        assert_eq!(get("/x").unwrap().named("custom").name(), "custom");
    }

    #[test]
    fn test_select_first_match() {
        let block = block();
        let (index, params) = block.select(&request(Method::GET, "/hello")).unwrap();
        assert_eq!(index, 0);
        assert!(params.is_empty());

        let (index, params) = block.select(&request(Method::GET, "/hello/Ann")).unwrap();
        assert_eq!(index, 2);
        assert_eq!(params.get("name"), Some("Ann"));
    }

    #[test]
    fn test_case_evaluation_order() {
        let case = get("/books/{id}").unwrap();
        assert!(case.evaluate(&request(Method::GET, "/books/1")).is_some());
        assert!(case.evaluate(&request(Method::POST, "/books/1")).is_none());
        assert!(case.evaluate(&request(Method::GET, "/books")).is_none());
    }

    #[tokio::test]
    async fn test_dispatch_first_match_wins() {
        let block = block();
        let response = block.dispatch((), request(Method::GET, "/hello")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "first");
    }

    #[tokio::test]
    async fn test_dispatch_path_params() {
        let block = block();
        let response = block.dispatch((), request(Method::GET, "/hello/World")).await;
        assert_eq!(body_text(response).await, "Hello World!");
    }

    #[tokio::test]
    async fn test_dispatch_fallback() {
        let block = block();

        // Unknown path
        let response = block.dispatch((), request(Method::GET, "/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body_text(response).await, NOT_IMPLEMENTED);

        // Wrong verb
        let response = block.dispatch((), request(Method::DELETE, "/hello")).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

        // Wrong media type
        let req = Request::builder()
            .method(Method::POST)
            .uri("/books")
            .header("Content-Type", "text/plain")
            .body(Body::default())
            .unwrap();
        let response = block.dispatch((), req).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_fallback_logs_request_id() {
        let (logs, _guard) = capture_logs();
        let req = Request::builder()
            .uri("/nope")
            .header(X_REQUEST_ID, "req-42")
            .body(Body::default())
            .unwrap();

        let response = block().dispatch((), req).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);

        let output = logs.contents();
        assert!(output.contains("No case matched"), "{output}");
        assert!(output.contains("request_id=req-42"), "{output}");
    }

    #[tokio::test]
    async fn test_empty_block_falls_back() {
        let block: MatchBlock<()> = MatchBlock::new();
        assert!(block.is_empty());
        let response = block.dispatch((), request(Method::GET, "/")).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_dispatcher_routes_with_state() {
        let dispatcher = MatchBlock::new()
            .case(get("/count").unwrap(), |count: usize, _| async move {
                count.to_string()
            })
            .with_state(7usize);

        let response = dispatcher.route(request(Method::GET, "/count")).await;
        assert_eq!(body_text(response).await, "7");
        assert_eq!(*dispatcher.state(), 7);
    }
}
