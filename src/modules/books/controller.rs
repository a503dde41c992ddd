use std::sync::Arc;

use bookshelf_db::RowId;
use bookshelf_http::{AppError, Envelope};

use super::models::{describe, Book, BookDto};
use super::service::{BookError, BookService};

pub const INVALID_BOOK_DATA: &str = "Invalid book data";

/// Maps every catalog operation to exactly one envelope.
///
/// Nothing here returns an error: each failure path ends in a failure
/// envelope with its status code.
pub struct BookController {
    service: Arc<dyn BookService>,
    legacy_status_codes: bool,
}

impl BookController {
    pub fn new(service: Arc<dyn BookService>) -> Self {
        Self {
            service,
            legacy_status_codes: false,
        }
    }

    /// Answer search hits with 201 and update misses with 401, as the
    /// previous service did.
    pub fn with_legacy_status_codes(mut self, enabled: bool) -> Self {
        self.legacy_status_codes = enabled;
        self
    }

    pub async fn get_all_books(&self) -> Envelope<Vec<Book>> {
        respond(self.try_get_all_books().await)
    }

    pub async fn get_book_by_id(&self, id: RowId) -> Envelope<Book> {
        respond(self.try_get_book_by_id(id).await)
    }

    pub async fn search_by_title(&self, title: Option<&str>) -> Envelope<Book> {
        respond(self.try_search_by_title(title).await)
    }

    pub async fn create_book(&self, dto: Option<BookDto>) -> Envelope<Book> {
        respond(self.try_create_book(dto).await)
    }

    pub async fn update_book(&self, id: RowId, dto: Option<BookDto>) -> Envelope<Book> {
        respond(self.try_update_book(id, dto).await)
    }

    pub async fn delete_book(&self, id: RowId) -> Envelope<bool> {
        respond(self.try_delete_book(id).await)
    }

    async fn try_get_all_books(&self) -> Result<Envelope<Vec<Book>>, AppError> {
        let books = self.service.get_all_books().await.map_err(|err| {
            into_app_error(err, INVALID_BOOK_DATA, || {
                AppError::not_found("No books found")
            })
        })?;

        if books.is_empty() {
            return Err(AppError::not_found("No books found"));
        }

        Ok(Envelope::success(200, "Books retrieved successfully", books))
    }

    async fn try_get_book_by_id(&self, id: RowId) -> Result<Envelope<Book>, AppError> {
        let book = self.service.get_book_by_id(id).await.map_err(|err| {
            into_app_error(err, INVALID_BOOK_DATA, || {
                AppError::not_found(format!("Book with id {} Not Found", id))
            })
        })?;

        Ok(Envelope::success(200, "Book fetched successfully", book))
    }

    async fn try_search_by_title(&self, title: Option<&str>) -> Result<Envelope<Book>, AppError> {
        let title = match title {
            Some(title) if !title.trim().is_empty() => title,
            _ => return Err(AppError::bad_request("Invalid Title")),
        };

        let book = self.service.search_by_title(title).await.map_err(|err| {
            into_app_error(err, "Invalid Title", || {
                AppError::not_found("Book  Not Found")
            })
        })?;

        if self.legacy_status_codes {
            Ok(Envelope::success(201, "Book created successfully", book))
        } else {
            Ok(Envelope::success(200, "Book found successfully", book))
        }
    }

    async fn try_create_book(&self, dto: Option<BookDto>) -> Result<Envelope<Book>, AppError> {
        let dto = checked(dto)?;

        let book = self.service.create_book(dto).await.map_err(|err| {
            into_app_error(err, "Failed to create book", || {
                AppError::bad_request("Failed to create book")
            })
        })?;

        Ok(Envelope::success(201, "Book created successfully", book))
    }

    async fn try_update_book(
        &self,
        id: RowId,
        dto: Option<BookDto>,
    ) -> Result<Envelope<Book>, AppError> {
        let dto = checked(dto)?;

        let book = self.service.update_book(id, dto).await.map_err(|err| {
            into_app_error(err, INVALID_BOOK_DATA, || {
                let message = format!("Book with id {} not found", id);
                if self.legacy_status_codes {
                    AppError::unauthorized(message)
                } else {
                    AppError::not_found(message)
                }
            })
        })?;

        Ok(Envelope::success(200, "Book updated successfully", book))
    }

    async fn try_delete_book(&self, id: RowId) -> Result<Envelope<bool>, AppError> {
        self.service.delete_book(id).await.map_err(|err| {
            into_app_error(err, INVALID_BOOK_DATA, || {
                AppError::not_found(format!("Book with id {} not found", id))
            })
        })?;

        Ok(Envelope::success(200, "Book deleted successfully", true))
    }
}

fn respond<T>(outcome: Result<Envelope<T>, AppError>) -> Envelope<T> {
    outcome.unwrap_or_else(AppError::into_envelope)
}

/// Presence and field checks that run before the service is called.
fn checked(dto: Option<BookDto>) -> Result<BookDto, AppError> {
    let dto = dto.ok_or_else(|| AppError::bad_request(INVALID_BOOK_DATA))?;
    dto.validate()
        .map_err(|violations| AppError::validation(describe(&violations), INVALID_BOOK_DATA))?;
    Ok(dto)
}

fn into_app_error(
    err: BookError,
    invalid_message: &str,
    not_found: impl FnOnce() -> AppError,
) -> AppError {
    match err {
        BookError::NotFound => not_found(),
        BookError::Validation(violations) => {
            AppError::validation(describe(&violations), invalid_message)
        }
        BookError::Internal(source) => AppError::Internal(source),
    }
}
