//! HTTP client for end-to-end tests
//!
//! When API routes or request formats change, update only this file.

#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Books
    // ========================================================================

    /// GET /books
    pub async fn list_books(&self) -> Response {
        self.client
            .get(self.url("/books"))
            .send()
            .await
            .expect("List books request failed")
    }

    /// POST /books
    pub async fn add_book_by_isbn(&self, isbn: &str) -> Response {
        self.client
            .post(self.url("/books"))
            .json(&json!({ "isbn": isbn }))
            .send()
            .await
            .expect("Add book by ISBN request failed")
    }

    /// POST /books/manual
    pub async fn add_book_manual(&self, title: &str, author: &str, isbn: &str) -> Response {
        self.client
            .post(self.url("/books/manual"))
            .json(&json!({ "title": title, "author": author, "isbn": isbn }))
            .send()
            .await
            .expect("Add manual book request failed")
    }

    /// GET /books/{isbn}
    pub async fn get_book(&self, isbn: &str) -> Response {
        self.client
            .get(self.url(&format!("/books/{}", isbn)))
            .send()
            .await
            .expect("Get book request failed")
    }

    /// PUT /books/{isbn}
    pub async fn update_book(&self, isbn: &str, body: Value) -> Response {
        self.client
            .put(self.url(&format!("/books/{}", isbn)))
            .json(&body)
            .send()
            .await
            .expect("Update book request failed")
    }

    /// DELETE /books/{isbn}
    pub async fn delete_book(&self, isbn: &str) -> Response {
        self.client
            .delete(self.url(&format!("/books/{}", isbn)))
            .send()
            .await
            .expect("Delete book request failed")
    }

    /// GET /books/search?q=
    pub async fn search_books(&self, query: &str) -> Response {
        self.client
            .get(self.url("/books/search"))
            .query(&[("q", query)])
            .send()
            .await
            .expect("Search request failed")
    }

    // ========================================================================
    // Service
    // ========================================================================

    /// GET /stats
    pub async fn stats(&self) -> Response {
        self.client
            .get(self.url("/stats"))
            .send()
            .await
            .expect("Stats request failed")
    }

    /// GET /health
    pub async fn health(&self) -> Response {
        self.client
            .get(self.url("/health"))
            .send()
            .await
            .expect("Health request failed")
    }

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(self.url("/"))
            .send()
            .await
            .expect("Home request failed")
    }
}
