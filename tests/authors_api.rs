mod common;

use axum::http::StatusCode;
use common::{absent_id, names, TestApp};
use serde_json::json;

#[tokio::test]
async fn create_and_fetch_an_author() {
    let app = TestApp::new();

    let (status, body) = app
        .post("/authors", json!({ "name": "Cecília Meireles", "nationality": "Brazil" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Author created successfully");
    let id = body["author"]["id"].as_str().unwrap().to_string();

    let (status, body) = app.get(&format!("/authors/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "id": id, "name": "Cecília Meireles", "nationality": "Brazil" })
    );
}

#[tokio::test]
async fn name_is_required() {
    let app = TestApp::new();

    let (status, body) = app.post("/authors", json!({ "nationality": "Chile" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "status": 400, "message": "Author name is required" }));

    let (status, _) = app.post("/authors", json!({ "name": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn repeated_update_is_idempotent() {
    let app = TestApp::new();
    let id = app.author("Jorge Amado").await;
    let uri = format!("/authors/{}", id);
    let change = json!({ "nationality": "Brazil" });

    let (first_status, first) = app.put(&uri, change.clone()).await;
    let (second_status, second) = app.put(&uri, change).await;

    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(first["message"], "Author updated successfully");
    assert_eq!(first["author"]["name"], "Jorge Amado");
    assert_eq!(first["author"]["nationality"], "Brazil");
}

#[tokio::test]
async fn update_and_delete_report_missing_authors() {
    let app = TestApp::new();
    let uri = format!("/authors/{}", absent_id());

    let (status, body) = app.put(&uri, json!({ "name": "Ghost" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "status": 404, "message": "Author not found" }));

    let (status, body) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Author not found");

    let (status, _) = app.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.delete("/authors/xyz").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn unreadable_parameters_keep_the_error_shape() {
    let app = TestApp::new();
    let expected = json!({ "status": 400, "message": "One or more supplied fields are invalid" });

    for uri in ["/authors?qLimit=1&qLimit=2", "/authors/%FF"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body, expected, "{}", uri);
    }

    let (status, body) = app.put("/authors/%FF", json!({ "name": "X" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, expected);

    let (status, body) = app.delete("/authors/%FF").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, expected);
}

#[tokio::test]
async fn delete_removes_the_author() {
    let app = TestApp::new();
    let id = app.author("Graciliano Ramos").await;

    let (status, body) = app.delete(&format!("/authors/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Author deleted successfully" }));

    let (status, _) = app.get(&format!("/authors/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_is_paginated_newest_first() {
    let app = TestApp::new();
    for name in ["First", "Second", "Third"] {
        app.author(name).await;
    }

    let (status, body) = app.get("/authors?qLimit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Third", "Second"]);

    let (_, body) = app.get("/authors?qLimit=2&qPages=2").await;
    assert_eq!(names(&body), vec!["First"]);

    let (status, _) = app.get("/authors?qPages=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn seeding_fills_empty_collections_once() {
    let app = TestApp::new();

    app.registry.seed_modules().await.unwrap();
    app.registry.seed_modules().await.unwrap();

    let (_, authors) = app.get("/authors").await;
    assert_eq!(names(&authors), vec!["J. R. R. Tolkien"]);
    assert_eq!(authors[0]["nationality"], "South Africa");

    let (_, books) = app.get("/books?author=J.%20R.%20R.%20Tolkien&sort=name:1").await;
    assert_eq!(names(&books), vec!["The Hobbit", "The Lord of the Rings"]);
    assert_eq!(books[0]["editora"], "Martin Claret");
    assert_eq!(books[0]["paginas"], 215);
}

#[tokio::test]
async fn root_health_and_unknown_routes() {
    let app = TestApp::new();

    let (status, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Bookstore catalog API");

    let (status, body) = app.get("/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, body) = app.get("/publishers").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "status": 404, "message": "Resource not found" }));
}

#[tokio::test]
async fn openapi_document_lists_module_paths() {
    let app = TestApp::new();

    let (status, doc) = app.get("/docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], "Bookstore API");
    assert!(doc["paths"]["/healthz"].is_object());
}
