pub mod controller;
pub mod models;
pub mod routes;
pub mod seed;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{settings::Settings, InitCtx, Module};

use controller::BookController;
use service::{BookService, StoreBookService};

/// Book catalog module, mounted at `/api/book`
pub struct BooksModule {
    service: Arc<dyn BookService>,
    controller: Arc<BookController>,
}

impl BooksModule {
    pub fn new(service: Arc<dyn BookService>, legacy_status_codes: bool) -> Self {
        let controller = BookController::new(Arc::clone(&service))
            .with_legacy_status_codes(legacy_status_codes);

        Self {
            service,
            controller: Arc::new(controller),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "book"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if let Some(path) = &ctx.settings.database.seed_path {
            let entries = seed::read_seed(path).await?;
            let loaded = seed::load_into(self.service.as_ref(), entries).await?;
            tracing::info!(
                module = self.name(),
                seed = %path.display(),
                loaded,
                "book catalog seeded"
            );
        }

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            legacy_status_codes = ctx.settings.compat.legacy_status_codes,
            "book module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(Arc::clone(&self.controller))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let envelope = |description: &str| {
            serde_json::json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/Envelope" }
                    }
                }
            })
        };
        let id_param = serde_json::json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });
        let body = serde_json::json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookDto" }
                }
            }
        });

        Some(serde_json::json!({
            "paths": {
                "": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": envelope("Data holds every book"),
                            "404": envelope("No books found"),
                            "500": envelope("Server error")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": body.clone(),
                        "responses": {
                            "201": envelope("Data holds the created book"),
                            "400": envelope("Invalid book data"),
                            "500": envelope("Server error")
                        }
                    }
                },
                "/search": {
                    "get": {
                        "summary": "Find the first book whose title contains the query",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "title",
                            "in": "query",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": envelope("Data holds the matching book"),
                            "400": envelope("Invalid Title"),
                            "404": envelope("No match")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Fetch a book",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": envelope("Data holds the book"),
                            "404": envelope("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Replace a book's fields",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "requestBody": body,
                        "responses": {
                            "200": envelope("Data holds the updated book"),
                            "400": envelope("Invalid book data"),
                            "404": envelope("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "200": envelope("Data is true"),
                            "404": envelope("Book not found")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Book module health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": {
                                    "text/plain": { "schema": { "type": "string" } }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "Id": { "type": "integer", "format": "int64" },
                            "Title": { "type": "string", "maxLength": models::TITLE_MAX_LEN },
                            "Author": { "type": "string" },
                            "PublishDate": { "type": "string", "format": "date" },
                            "ISBN": { "type": ["string", "null"], "maxLength": models::ISBN_MAX_LEN },
                            "NbrOfCopy": { "type": "integer", "format": "int32" }
                        },
                        "required": ["Id", "Title", "Author", "PublishDate", "NbrOfCopy"]
                    },
                    "BookDto": {
                        "type": "object",
                        "properties": {
                            "Title": { "type": "string", "maxLength": models::TITLE_MAX_LEN },
                            "Author": { "type": "string" },
                            "PublishDate": { "type": "string", "format": "date" },
                            "ISBN": { "type": ["string", "null"], "maxLength": models::ISBN_MAX_LEN },
                            "NbrOfCopy": { "type": "integer", "format": "int32" }
                        },
                        "required": ["Title", "Author", "PublishDate", "NbrOfCopy"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "book module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "book module stopped");
        Ok(())
    }
}

/// Create the book module backed by the in-process table
pub fn create_module(settings: &Settings) -> Arc<dyn Module> {
    let service = Arc::new(StoreBookService::new(settings.database.max_books));
    Arc::new(BooksModule::new(
        service,
        settings.compat.legacy_status_codes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_without_seed_leaves_catalog_empty() {
        let service = Arc::new(StoreBookService::default());
        let module = BooksModule::new(service.clone(), false);
        let settings = Settings::default();

        module.init(&InitCtx::new(&settings)).await.unwrap();
        assert!(service.get_all_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn init_with_missing_seed_fails() {
        let module = BooksModule::new(Arc::new(StoreBookService::default()), false);
        let mut settings = Settings::default();
        settings.database.seed_path = Some("/no/such/seed.json".into());

        let err = module
            .init(&InitCtx::new(&settings))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read seed file"));
    }

    #[test]
    fn openapi_fragment_describes_every_route() {
        let module = create_module(&Settings::default());
        let spec = module.openapi().unwrap();
        let paths = spec["paths"].as_object().unwrap();

        for path in ["", "/search", "/{id}", "/health"] {
            assert!(paths.contains_key(path), "missing {path}");
        }
        assert!(spec["components"]["schemas"]["BookDto"].is_object());
    }
}
