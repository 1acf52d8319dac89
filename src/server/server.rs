use anyhow::{Context, Result};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tracing::{debug, info, warn};

use crate::book::{normalize_isbn, Book, BookUpdate};
use crate::catalog_store::{CatalogError, CatalogStore};
use tower_http::{cors::CorsLayer, services::ServeDir};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{log_requests, state::*, RequestsLoggingLevel, ServerConfig};

const API_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub version: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    pub status: &'static str,
    pub total_books: usize,
    pub version: &'static str,
}

#[derive(Serialize)]
struct MessageResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
struct ErrorResponse {
    pub detail: String,
}

#[derive(Deserialize, Debug)]
struct AddBookByIsbnBody {
    pub isbn: String,
}

#[derive(Deserialize, Debug)]
struct AddBookManualBody {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

#[derive(Deserialize, Debug)]
struct SearchParams {
    #[serde(default)]
    pub q: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

fn detail_response<S: Into<String>>(status: StatusCode, detail: S) -> Response {
    let body = ErrorResponse {
        detail: detail.into(),
    };
    (status, Json(body)).into_response()
}

const DUPLICATE_ISBN_DETAIL: &str = "Book with this ISBN already exists";
const BOOK_NOT_FOUND_DETAIL: &str = "Book not found";

/// Maps a store failure to its HTTP answer. Conflicts answer with the given
/// status and detail since add and update report them differently.
fn catalog_error_response(err: CatalogError, conflict: (StatusCode, &str)) -> Response {
    match err {
        CatalogError::NotFound(_) => detail_response(StatusCode::NOT_FOUND, BOOK_NOT_FOUND_DETAIL),
        CatalogError::Conflict(_) => detail_response(conflict.0, conflict.1),
        CatalogError::Validation { .. } => {
            detail_response(StatusCode::BAD_REQUEST, err.to_string())
        }
    }
}

const ADD_CONFLICT: (StatusCode, &str) = (StatusCode::BAD_REQUEST, DUPLICATE_ISBN_DETAIL);
const UPDATE_CONFLICT: (StatusCode, &str) = (
    StatusCode::CONFLICT,
    "Another book with that ISBN already exists",
);

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        version: API_VERSION,
    };
    Json(stats)
}

async fn health(State(catalog_store): State<GuardedCatalogStore>) -> impl IntoResponse {
    let total_books = lock_catalog(&catalog_store).len();
    Json(HealthResponse {
        status: "healthy",
        total_books,
        version: API_VERSION,
    })
}

async fn get_books(State(catalog_store): State<GuardedCatalogStore>) -> Response {
    Json(lock_catalog(&catalog_store).list()).into_response()
}

async fn search_books(
    State(catalog_store): State<GuardedCatalogStore>,
    Query(params): Query<SearchParams>,
) -> Response {
    Json(lock_catalog(&catalog_store).search(params.q.trim())).into_response()
}

async fn get_stats(State(catalog_store): State<GuardedCatalogStore>) -> Response {
    Json(lock_catalog(&catalog_store).stats()).into_response()
}

async fn get_book(
    State(catalog_store): State<GuardedCatalogStore>,
    Path(isbn): Path<String>,
) -> Response {
    match lock_catalog(&catalog_store).find(&isbn) {
        Some(book) => Json(book).into_response(),
        None => detail_response(StatusCode::NOT_FOUND, BOOK_NOT_FOUND_DETAIL),
    }
}

async fn post_book_by_isbn(
    State(catalog_store): State<GuardedCatalogStore>,
    State(metadata_fetcher): State<GuardedMetadataFetcher>,
    Json(body): Json<AddBookByIsbnBody>,
) -> Response {
    let isbn = normalize_isbn(body.isbn.trim());
    if isbn.is_empty() {
        return detail_response(StatusCode::BAD_REQUEST, "ISBN cannot be empty");
    }

    let already_present = lock_catalog(&catalog_store).contains(&isbn);
    if already_present {
        return detail_response(StatusCode::BAD_REQUEST, DUPLICATE_ISBN_DETAIL);
    }

    // The store stays unlocked while the lookup is in flight.
    let book = match metadata_fetcher.fetch(&isbn).await {
        Ok(book) => book,
        Err(err) => {
            debug!("Lookup for {} failed: {}", isbn, err);
            return detail_response(
                StatusCode::NOT_FOUND,
                "Book not found with the provided ISBN",
            );
        }
    };

    let added = lock_catalog(&catalog_store).add(book);
    match added {
        Ok(book) => (StatusCode::CREATED, Json(book)).into_response(),
        Err(err) => catalog_error_response(err, ADD_CONFLICT),
    }
}

async fn post_book_manual(
    State(catalog_store): State<GuardedCatalogStore>,
    Json(body): Json<AddBookManualBody>,
) -> Response {
    let book = Book::new(body.title, body.author, body.isbn);
    let added = lock_catalog(&catalog_store).add(book);
    match added {
        Ok(book) => (StatusCode::CREATED, Json(book)).into_response(),
        Err(err) => catalog_error_response(err, ADD_CONFLICT),
    }
}

async fn put_book(
    State(catalog_store): State<GuardedCatalogStore>,
    Path(isbn): Path<String>,
    Json(body): Json<BookUpdate>,
) -> Response {
    debug!("Updating book {} with {:?}", isbn, body);
    let updated = lock_catalog(&catalog_store).update(&isbn, body);
    match updated {
        Ok(book) => Json(book).into_response(),
        Err(err) => catalog_error_response(err, UPDATE_CONFLICT),
    }
}

async fn delete_book(
    State(catalog_store): State<GuardedCatalogStore>,
    Path(isbn): Path<String>,
) -> Response {
    let removed = lock_catalog(&catalog_store).remove(&isbn);
    if removed {
        Json(MessageResponse {
            message: "Book deleted successfully",
        })
        .into_response()
    } else {
        detail_response(StatusCode::NOT_FOUND, BOOK_NOT_FOUND_DETAIL)
    }
}

pub fn make_app(
    config: ServerConfig,
    catalog_store: GuardedCatalogStore,
    metadata_fetcher: GuardedMetadataFetcher,
) -> Router {
    let state = ServerState::new(config.clone(), catalog_store, metadata_fetcher);

    let book_routes: Router = Router::new()
        .route("/books", get(get_books).post(post_book_by_isbn))
        .route("/books/manual", post(post_book_manual))
        .route("/books/search", get(search_books))
        .route(
            "/books/{isbn}",
            get(get_book).put(put_book).delete(delete_book),
        )
        .route("/stats", get(get_stats))
        .route("/health", get(health))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    home_router
        .merge(book_routes)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn_with_state(state, log_requests))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

pub async fn run_server(
    catalog_store: CatalogStore,
    metadata_fetcher: GuardedMetadataFetcher,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    frontend_dir_path: Option<String>,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        frontend_dir_path,
    };
    let app = make_app(config, Arc::new(Mutex::new(catalog_store)), metadata_fetcher);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    Ok(axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?)
}
