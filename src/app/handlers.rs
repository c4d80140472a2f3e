//! Example handlers wired into the application's match block.

use axum::{
    body::Body,
    extract::FromRequest,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::app::error::HandlerError;
use crate::app::state::AppState;
use crate::books::{Book, NewBook, RepositoryError};
use crate::routing::RequestExt;

pub async fn hello(_: AppState, _: Request<Body>) -> &'static str {
    "Hello World"
}

pub async fn hello_name(_: AppState, request: Request<Body>) -> Result<String, HandlerError> {
    let name = request.path_param("name")?;
    Ok(format!("Hello {name}!"))
}

/// `GET /greet?name=..&greeting=..`
pub async fn greet(_: AppState, request: Request<Body>) -> String {
    let name = request.query_param_or("name", "World");
    let greeting = request.query_param_or("greeting", "Hello");
    format!("{greeting}, {name}!")
}

pub async fn list_books(state: AppState, _: Request<Body>) -> Json<Vec<Book>> {
    Json(state.books.find_all())
}

pub async fn create_book(
    state: AppState,
    request: Request<Body>,
) -> Result<Response, HandlerError> {
    let draft = read_book(request).await?;
    let book = state.books.save(draft);

    tracing::info!(id = book.id, title = %book.title, "Book created");

    let location = format!("/books/{}", book.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(book)).into_response())
}

pub async fn get_book(state: AppState, request: Request<Body>) -> Result<Json<Book>, HandlerError> {
    let id: u64 = request.path_param_as("id")?;
    state
        .books
        .find_by_id(id)
        .map(Json)
        .ok_or_else(|| RepositoryError::NotFound(id.to_string()).into())
}

pub async fn update_book(
    state: AppState,
    request: Request<Body>,
) -> Result<Json<Book>, HandlerError> {
    let id: u64 = request.path_param_as("id")?;
    let draft = read_book(request).await?;
    let book = state.books.update(id, draft)?;

    tracing::info!(id, title = %book.title, "Book updated");
    Ok(Json(book))
}

pub async fn delete_book(
    state: AppState,
    request: Request<Body>,
) -> Result<StatusCode, HandlerError> {
    let id: u64 = request.path_param_as("id")?;
    state.books.delete_by_id(id)?;

    tracing::info!(id, "Book deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health(state: AppState, _: Request<Body>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "UP",
        "books": state.books.count(),
    }))
}

/// Deserialize and validate a book payload.
async fn read_book(request: Request<Body>) -> Result<NewBook, HandlerError> {
    let Json(draft) = Json::<NewBook>::from_request(request, &()).await?;

    if draft.title.trim().is_empty() {
        return Err(HandlerError::Validation("title must not be blank".into()));
    }
    Ok(draft)
}
