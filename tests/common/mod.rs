#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookstore_db::{DocumentStore, InMemoryStore};
use bookstore_kernel::{settings::Settings, ModuleRegistry};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub registry: ModuleRegistry,
}

impl TestApp {
    pub fn new() -> Self {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
        let registry = bookstore_app::build_registry(store);
        let router = bookstore_http::build_router(&registry, &Settings::default());
        Self { router, registry }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = match body {
            Some(body) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Creates an author and returns its id
    pub async fn author(&self, name: &str) -> String {
        let (status, body) = self
            .post("/authors", serde_json::json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["author"]["id"].as_str().unwrap().to_string()
    }

    /// Creates a book and returns its id
    pub async fn book(&self, fields: Value) -> String {
        let (status, body) = self.post("/books", fields).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["book"]["id"].as_str().unwrap().to_string()
    }
}

/// Hex id that no stored document carries
pub fn absent_id() -> String {
    bson::oid::ObjectId::new().to_hex()
}

pub fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect()
}
