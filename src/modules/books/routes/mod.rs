//! HTTP handlers for the book module.
//!
//! Extractor rejections are turned into envelopes here so that malformed
//! ids and bodies answer in the same shape as every other outcome.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use bookshelf_db::RowId;
use bookshelf_http::{AppError, Envelope};
use serde::Deserialize;

use super::controller::{BookController, INVALID_BOOK_DATA};
use super::models::{Book, BookDto};

type Shared = State<Arc<BookController>>;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
}

/// Routes relative to the module mount point (`/api/book`)
pub fn router(controller: Arc<BookController>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/search", get(search_books))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(controller)
}

async fn health_check() -> &'static str {
    "book module is healthy"
}

async fn list_books(State(controller): Shared) -> Envelope<Vec<Book>> {
    controller.get_all_books().await
}

async fn get_book(
    State(controller): Shared,
    id: Result<Path<RowId>, PathRejection>,
) -> Envelope<Book> {
    match id {
        Ok(Path(id)) => controller.get_book_by_id(id).await,
        Err(rejection) => invalid_id(rejection),
    }
}

async fn search_books(
    State(controller): Shared,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Envelope<Book> {
    match params {
        Ok(Query(params)) => controller.search_by_title(params.title.as_deref()).await,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "search query rejected");
            AppError::bad_request("Invalid Title").into_envelope()
        }
    }
}

async fn create_book(
    State(controller): Shared,
    payload: Result<Json<Option<BookDto>>, JsonRejection>,
) -> Envelope<Book> {
    match payload {
        Ok(Json(dto)) => controller.create_book(dto).await,
        Err(rejection) => invalid_body(rejection),
    }
}

async fn update_book(
    State(controller): Shared,
    id: Result<Path<RowId>, PathRejection>,
    payload: Result<Json<Option<BookDto>>, JsonRejection>,
) -> Envelope<Book> {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => return invalid_id(rejection),
    };

    match payload {
        Ok(Json(dto)) => controller.update_book(id, dto).await,
        Err(rejection) => invalid_body(rejection),
    }
}

async fn delete_book(
    State(controller): Shared,
    id: Result<Path<RowId>, PathRejection>,
) -> Envelope<bool> {
    match id {
        Ok(Path(id)) => controller.delete_book(id).await,
        Err(rejection) => invalid_id(rejection),
    }
}

fn invalid_id<T>(rejection: PathRejection) -> Envelope<T> {
    tracing::debug!(error = %rejection.body_text(), "book id rejected");
    AppError::bad_request("Invalid book id").into_envelope()
}

fn invalid_body<T>(rejection: JsonRejection) -> Envelope<T> {
    AppError::validation(vec![rejection.body_text()], INVALID_BOOK_DATA).into_envelope()
}
