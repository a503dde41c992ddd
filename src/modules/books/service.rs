use async_trait::async_trait;
use bookshelf_db::{RowId, StoreError, Table};
use thiserror::Error;

use super::models::{describe, Book, BookDto, Violation};

/// Outcome of a failed catalog operation.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("book not found")]
    NotFound,

    #[error("invalid book data: {}", describe(.0).join("; "))]
    Validation(Vec<Violation>),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for BookError {
    fn from(err: StoreError) -> Self {
        BookError::Internal(anyhow::Error::new(err))
    }
}

/// Catalog operations, one store operation each.
#[async_trait]
pub trait BookService: Send + Sync {
    /// Every book, ascending by id. Empty when the catalog is empty.
    async fn get_all_books(&self) -> Result<Vec<Book>, BookError>;

    async fn get_book_by_id(&self, id: RowId) -> Result<Book, BookError>;

    /// First book whose title contains `title`, ignoring case.
    async fn search_by_title(&self, title: &str) -> Result<Book, BookError>;

    async fn create_book(&self, dto: BookDto) -> Result<Book, BookError>;

    async fn update_book(&self, id: RowId, dto: BookDto) -> Result<Book, BookError>;

    async fn delete_book(&self, id: RowId) -> Result<(), BookError>;
}

/// [`BookService`] over an in-process [`Table`].
pub struct StoreBookService {
    books: Table<Book>,
}

impl StoreBookService {
    pub fn new(max_books: Option<usize>) -> Self {
        Self {
            books: Table::new("book").with_max_rows(max_books),
        }
    }
}

impl Default for StoreBookService {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl BookService for StoreBookService {
    async fn get_all_books(&self) -> Result<Vec<Book>, BookError> {
        Ok(self.books.all().await)
    }

    async fn get_book_by_id(&self, id: RowId) -> Result<Book, BookError> {
        self.books.get(id).await.ok_or(BookError::NotFound)
    }

    async fn search_by_title(&self, title: &str) -> Result<Book, BookError> {
        let needle = title.trim().to_lowercase();
        if needle.is_empty() {
            return Err(BookError::Validation(vec![Violation::required("Title")]));
        }

        self.books
            .find(|book| book.title.to_lowercase().contains(&needle))
            .await
            .ok_or(BookError::NotFound)
    }

    async fn create_book(&self, dto: BookDto) -> Result<Book, BookError> {
        dto.validate().map_err(BookError::Validation)?;

        let book = self.books.insert_with(|id| dto.into_book(id)).await?;
        tracing::info!(book_id = book.id, title = %book.title, "book created");
        Ok(book)
    }

    async fn update_book(&self, id: RowId, dto: BookDto) -> Result<Book, BookError> {
        dto.validate().map_err(BookError::Validation)?;

        let book = self
            .books
            .update(id, |book| book.apply(dto))
            .await
            .ok_or(BookError::NotFound)?;
        tracing::info!(book_id = id, "book updated");
        Ok(book)
    }

    async fn delete_book(&self, id: RowId) -> Result<(), BookError> {
        if !self.books.remove(id).await {
            return Err(BookError::NotFound);
        }
        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn dto(title: &str) -> BookDto {
        BookDto {
            title: title.to_string(),
            author: "Ahmed".to_string(),
            publish_date: date!(2020 - 05 - 01),
            isbn: Some("292738337".to_string()),
            nbr_of_copy: 3,
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let service = StoreBookService::default();
        let first = service.create_book(dto("Effective Code")).await.unwrap();
        let second = service.create_book(dto("Clean Code")).await.unwrap();

        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(service.get_all_books().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn create_rejects_invalid_dto() {
        let service = StoreBookService::default();
        let err = service.create_book(dto("")).await.unwrap_err();

        assert!(matches!(err, BookError::Validation(ref v) if v == &[Violation::required("Title")]));
        assert!(service.get_all_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn full_table_is_an_internal_error() {
        let service = StoreBookService::new(Some(1));
        service.create_book(dto("Only")).await.unwrap();

        let err = service.create_book(dto("Extra")).await.unwrap_err();
        assert!(matches!(err, BookError::Internal(_)));
        assert_eq!(err.to_string(), "table is full (1 rows)");
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring_first_by_id() {
        let service = StoreBookService::default();
        service.create_book(dto("Rust in Action")).await.unwrap();
        service.create_book(dto("Programming Rust")).await.unwrap();

        let found = service.search_by_title("RUST").await.unwrap();
        assert_eq!(found.id, 1);

        let found = service.search_by_title("programming").await.unwrap();
        assert_eq!(found.title, "Programming Rust");

        assert!(matches!(
            service.search_by_title("Go").await,
            Err(BookError::NotFound)
        ));
        assert!(matches!(
            service.search_by_title("  ").await,
            Err(BookError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn update_keeps_id_and_reports_missing() {
        let service = StoreBookService::default();
        let created = service.create_book(dto("Draft")).await.unwrap();

        let updated = service
            .update_book(created.id, dto("Final"))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(service.get_book_by_id(created.id).await.unwrap().title, "Final");

        assert!(matches!(
            service.update_book(99, dto("Ghost")).await,
            Err(BookError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let service = StoreBookService::default();
        let created = service.create_book(dto("Temporary")).await.unwrap();

        service.delete_book(created.id).await.unwrap();
        assert!(matches!(
            service.get_book_by_id(created.id).await,
            Err(BookError::NotFound)
        ));
        assert!(matches!(
            service.delete_book(created.id).await,
            Err(BookError::NotFound)
        ));
    }
}
