//! In-process stand-in for the Open Library API.

use super::constants::*;
use axum::{
    extract::{Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

#[derive(Deserialize)]
struct SearchParams {
    isbn: String,
}

fn strip_json_suffix(file: &str) -> &str {
    file.strip_suffix(".json").unwrap_or(file)
}

async fn edition(Path(file): Path<String>) -> Response {
    match strip_json_suffix(&file) {
        ORWELL_ISBN => Json(json!({
            "title": ORWELL_TITLE,
            "authors": [{"key": format!("/authors/{}", ORWELL_AUTHOR_KEY)}],
        }))
        .into_response(),
        DUNE_ISBN => Json(json!({
            "title": DUNE_TITLE,
            "authors": [DUNE_AUTHOR],
        }))
        .into_response(),
        SPARSE_ISBN => Json(json!({
            "authors": [{"key": "/authors/OL0MISSING"}],
        }))
        .into_response(),
        BLANK_FIELDS_ISBN => Json(json!({
            "title": "",
            "authors": [""],
        }))
        .into_response(),
        GARBLED_ISBN => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain")],
            "<html>maintenance</html>",
        )
            .into_response(),
        EDITION_ERROR_ISBN => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn author(Path(file): Path<String>) -> Response {
    if strip_json_suffix(&file) == ORWELL_AUTHOR_KEY {
        Json(json!({"name": ORWELL_AUTHOR})).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn search(Query(params): Query<SearchParams>) -> Response {
    let docs = match params.isbn.as_str() {
        SEARCH_ONLY_ISBN => json!([{
            "title_suggest": SEARCH_ONLY_TITLE,
            "author_name": ["Terry Pratchett", "Neil Gaiman"],
        }]),
        EDITION_ERROR_ISBN => json!([{
            "title": EDITION_ERROR_TITLE,
            "author_name": [EDITION_ERROR_AUTHOR],
        }]),
        _ => json!([]),
    };
    Json(json!({ "numFound": docs.as_array().map_or(0, |d| d.len()), "docs": docs }))
        .into_response()
}

/// Serves the edition, author and search endpoints on a random local port
/// until dropped.
pub struct MockOpenLibrary {
    pub base_url: String,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockOpenLibrary {
    pub async fn spawn() -> Self {
        let app = Router::new()
            .route("/isbn/{file}", get(edition))
            .route("/authors/{file}", get(author))
            .route("/search.json", get(search));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock Open Library");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Mock Open Library failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            _shutdown_tx: Some(shutdown_tx),
        }
    }
}

impl Drop for MockOpenLibrary {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
