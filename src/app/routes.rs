//! The application's routing function.
//!
//! Every request runs through this one match block. Cases are tried top to
//! bottom; anything that falls through gets `501 Not Implemented`.

use crate::app::handlers;
use crate::app::state::AppState;
use crate::routing::{delete, get, post, put, Dispatcher, MatchBlock, TemplateError};

const APPLICATION_JSON: &str = "application/json";

pub fn routes() -> Result<MatchBlock<AppState>, TemplateError> {
    Ok(MatchBlock::new()
        .case(get("/hello")?, handlers::hello)
        .case(get("/hello/{name}")?, handlers::hello_name)
        .case(get("/greet")?, handlers::greet)
        .case(get("/books")?.produces(APPLICATION_JSON), handlers::list_books)
        .case(post("/books")?.consumes(APPLICATION_JSON), handlers::create_book)
        .case(get("/books/{id}")?, handlers::get_book)
        .case(put("/books/{id}")?.consumes(APPLICATION_JSON), handlers::update_book)
        .case(delete("/books/{id}")?, handlers::delete_book)
        .case(get("/health")?, handlers::health))
}

/// The match block bound to `state`.
pub fn router(state: AppState) -> Result<Dispatcher<AppState>, TemplateError> {
    Ok(routes()?.with_state(state))
}
