//! API integration tests, served in-process over the in-memory store

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use circulation_server::{
    api, config::AppConfig, repository::MemoryCatalogStore, services::Services, AppState,
};

fn app() -> Router {
    let state = AppState {
        config: Arc::new(AppConfig::default()),
        services: Arc::new(Services::new(Arc::new(MemoryCatalogStore::new()))),
    };
    api::create_router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn seed(app: &Router) {
    let (status, _) = send(
        app,
        Method::POST,
        "/api/v1/books",
        Some(json!({
            "title": "Rayuela",
            "isbn": "978-8437604572",
            "publication_year": 1963,
            "copies": 2,
            "author_names": ["Julio Cortázar"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        app,
        Method::POST,
        "/api/v1/borrowers",
        Some(json!({ "name": "ANA", "email": "ana@example.org" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_health_check() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/v1/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_loan_round_trip() {
    let app = app();
    seed(&app).await;

    let loan_request = json!({ "titles": ["Rayuela"], "borrower_name": "ANA" });
    let (status, loan) = send(&app, Method::POST, "/api/v1/loans", Some(loan_request)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["active"], true);

    let (_, book) = send(&app, Method::GET, "/api/v1/books/Rayuela", None).await;
    assert_eq!(book["kind"], "book");
    assert_eq!(book["available"], 1);

    let (status, holders) = send(&app, Method::GET, "/api/v1/loans/holders/Rayuela", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(holders["borrowers"], json!(["ANA"]));

    let return_request = json!({ "title": "Rayuela", "borrower_name": "ANA" });
    let (status, body) = send(&app, Method::POST, "/api/v1/loans/return", Some(return_request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Loan returned");

    let (status, books) = send(&app, Method::GET, "/api/v1/books?isbn=978-8437604572", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books.as_array().map(Vec::len), Some(1));
    assert_eq!(books[0]["available"], 2);
}

#[tokio::test]
async fn test_business_errors_map_to_status_and_code() {
    let app = app();
    seed(&app).await;

    let (status, body) = send(&app, Method::GET, "/api/v1/books/Nada", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NoSuchMaterial");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/loans/return",
        Some(json!({ "title": "Rayuela", "borrower_name": "ANA" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 8);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/loans",
        Some(json!({ "titles": [], "borrower_name": "ANA" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deletion_guards_over_http() {
    let app = app();
    seed(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/loans",
        Some(json!({ "titles": ["Rayuela"], "borrower_name": "ANA" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::DELETE, "/api/v1/books/Rayuela", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CurrentlyOnLoan");

    let (status, body) = send(&app, Method::DELETE, "/api/v1/borrowers/ANA", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "HasActiveLoans");

    let (status, body) = send(&app, Method::DELETE, "/api/v1/authors/Julio%20Cort%C3%A1zar", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "HasDependentMaterials");

    let (status, loans) = send(&app, Method::GET, "/api/v1/borrowers/ANA/loans", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loans[0]["titles"], json!(["Rayuela"]));
}

#[tokio::test]
async fn test_periodical_lifecycle() {
    let app = app();

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/periodicals",
        Some(json!({
            "title": "Caras y Caretas",
            "edition_number": 12,
            "recurrence": "weekly",
            "copies": 3
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["kind"], "periodical");
    assert_eq!(created["available"], 3);

    let (status, updated) = send(
        &app,
        Method::PUT,
        "/api/v1/periodicals/Caras%20y%20Caretas",
        Some(json!({ "edition_number": 13, "copies": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["edition_number"], 13);
    assert_eq!(updated["total"], 5);
    assert_eq!(updated["available"], 5);

    let (status, list) = send(&app, Method::GET, "/api/v1/periodicals", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, Method::DELETE, "/api/v1/periodicals/Caras%20y%20Caretas", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_one_loan_covers_several_titles() {
    let app = app();
    seed(&app).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/periodicals",
        Some(json!({ "title": "Billiken", "edition_number": 1, "recurrence": "weekly", "copies": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, loan) = send(
        &app,
        Method::POST,
        "/api/v1/loans",
        Some(json!({ "titles": ["rayuela", " Billiken "], "borrower_name": "ana" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(loan["lines"].as_array().map(Vec::len), Some(2));

    let (_, loans) = send(&app, Method::GET, "/api/v1/borrowers/ANA/loans", None).await;
    assert_eq!(loans.as_array().map(Vec::len), Some(1));
    assert_eq!(loans[0]["titles"], json!(["Rayuela", "Billiken"]));

    // Billiken is gone, so the whole second loan is refused
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/loans",
        Some(json!({ "titles": ["Rayuela", "Billiken"], "borrower_name": "ANA" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "OutOfStock");

    let (_, book) = send(&app, Method::GET, "/api/v1/books/Rayuela", None).await;
    assert_eq!(book["available"], 1);
}

#[tokio::test]
async fn test_book_titled_isbn_is_reachable_by_title() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/books",
        Some(json!({
            "title": "isbn",
            "isbn": "123",
            "publication_year": 2001,
            "copies": 1,
            "author_names": ["Anónimo"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, book) = send(&app, Method::GET, "/api/v1/books/isbn", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(book["isbn"], "123");

    let (status, _) = send(&app, Method::DELETE, "/api/v1/books/isbn", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
