use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookshelf_app::build_registry;
use bookshelf_kernel::settings::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(settings: &Settings) -> Router {
    bookshelf_http::build_router(&build_registry(settings), settings)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn effective_code() -> Value {
    json!({
        "Title": "Effective Code",
        "Author": "Ahmed",
        "PublishDate": "2020-05-01",
        "ISBN": "292738337",
        "NbrOfCopy": 3
    })
}

#[tokio::test]
async fn catalog_lifecycle() {
    let app = app(&Settings::default());

    let (status, body) = send(&app, Method::GET, "/api/book", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["Message"], "No books found");

    let (status, body) = send(&app, Method::POST, "/api/book", Some(effective_code())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({
            "success": true,
            "StatusCode": 201,
            "Message": "Book created successfully",
            "Data": {
                "Id": 1,
                "Title": "Effective Code",
                "Author": "Ahmed",
                "PublishDate": "2020-05-01",
                "ISBN": "292738337",
                "NbrOfCopy": 3
            }
        })
    );

    let (status, body) = send(&app, Method::GET, "/api/book/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Message"], "Book fetched successfully");
    assert_eq!(body["Data"]["Title"], "Effective Code");

    let (status, body) = send(&app, Method::GET, "/api/book/search?title=effective", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Data"]["Id"], 1);

    let mut change = effective_code();
    change["NbrOfCopy"] = json!(5);
    let (status, body) = send(&app, Method::PUT, "/api/book/1", Some(change)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Message"], "Book updated successfully");
    assert_eq!(body["Data"]["NbrOfCopy"], 5);
    assert_eq!(body["Data"]["Id"], 1);

    let (status, body) = send(&app, Method::GET, "/api/book", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Data"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::DELETE, "/api/book/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Message"], "Book deleted successfully");
    assert_eq!(body["Data"], true);

    let (status, body) = send(&app, Method::DELETE, "/api/book/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["Message"], "Book with id 1 not found");
    assert!(body["Data"].is_null());
}

#[tokio::test]
async fn search_requires_a_title() {
    let app = app(&Settings::default());

    for uri in [
        "/api/book/search",
        "/api/book/search?title=",
        "/api/book/search?title=%20%20",
        "/api/book/search?title=a&title=b",
    ] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false, "{uri}");
        assert_eq!(body["Message"], "Invalid Title", "{uri}");
        assert!(body["Data"].is_null(), "{uri}");
    }
}

#[tokio::test]
async fn malformed_input_answers_with_envelopes() {
    let app = app(&Settings::default());

    let (status, body) = send(&app, Method::GET, "/api/book/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["Message"], "Invalid book id");

    let (status, body) = send(&app, Method::POST, "/api/book", Some(Value::Null)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["Message"], "Invalid book data");

    let (status, body) = send(&app, Method::POST, "/api/book", Some(json!({"Title": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["Message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid book data: "));

    let mut long_title = effective_code();
    long_title["Title"] = json!("t".repeat(51));
    let (status, body) = send(&app, Method::POST, "/api/book", Some(long_title)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["Message"],
        "Invalid book data: Title must be at most 50 characters"
    );

    let (status, body) = send(&app, Method::GET, "/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, Method::PATCH, "/api/book/1", Some(effective_code())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["StatusCode"], 405);
    assert_eq!(body["Message"], "Method not allowed");
}

#[tokio::test]
async fn publish_date_accepts_date_times() {
    let app = app(&Settings::default());

    let mut book = effective_code();
    book["PublishDate"] = json!("2020-05-01T00:00:00");
    let (status, body) = send(&app, Method::POST, "/api/book", Some(book)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["Data"]["PublishDate"], "2020-05-01");
}

#[tokio::test]
async fn legacy_status_codes_are_opt_in() {
    let mut settings = Settings::default();
    settings.compat.legacy_status_codes = true;
    let app = app(&settings);

    send(&app, Method::POST, "/api/book", Some(effective_code())).await;

    let (status, body) = send(&app, Method::GET, "/api/book/search?title=Effective", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["StatusCode"], 201);

    let (status, body) = send(&app, Method::PUT, "/api/book/42", Some(effective_code())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["Message"], "Book with id 42 not found");
}

#[tokio::test]
async fn capacity_limit_surfaces_as_server_error() {
    let mut settings = Settings::default();
    settings.database.max_books = Some(1);
    let app = app(&settings);

    send(&app, Method::POST, "/api/book", Some(effective_code())).await;
    let (status, body) = send(&app, Method::POST, "/api/book", Some(effective_code())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["Message"], "Server error: table is full (1 rows)");
}

#[tokio::test]
async fn openapi_lists_book_routes() {
    let app = app(&Settings::default());

    let (status, body) = send(&app, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/book"]["get"].is_object());
    assert!(body["paths"]["/api/book/{id}"]["delete"].is_object());
    assert!(body["components"]["schemas"]["Book"].is_object());
}
