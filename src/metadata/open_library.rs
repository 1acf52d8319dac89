//! Open Library API client.
//!
//! Looks an ISBN up through the edition endpoint first and falls back to the
//! search endpoint when that does not answer 200. Author references found in
//! edition records are resolved with one extra request each.

use super::fetcher::{FetchError, MetadataFetcher};
use super::payload::{AuthorRef, AuthorResponse, LookupPayload};
use crate::book::{normalize_isbn, Book};
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const OPEN_LIBRARY_BASE_URL: &str = "https://openlibrary.org";
pub const DEFAULT_LOOKUP_TIMEOUT_SEC: u64 = 10;

pub struct OpenLibraryClient {
    client: Client,
    base_url: String,
}

impl OpenLibraryClient {
    /// # Arguments
    /// * `base_url` - Root of the service (e.g., "https://openlibrary.org")
    /// * `timeout_sec` - Timeout applied to every single request
    pub fn new(base_url: &str, timeout_sec: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn edition_url(&self, isbn: &str) -> String {
        format!("{}/isbn/{}.json", self.base_url, isbn)
    }

    fn search_url(&self, isbn: &str) -> String {
        format!("{}/search.json?isbn={}", self.base_url, isbn)
    }

    fn author_url(&self, key: &str) -> String {
        if key.starts_with('/') {
            format!("{}{}.json", self.base_url, key)
        } else {
            format!("{}/{}.json", self.base_url, key)
        }
    }

    /// GETs `url`, `Ok(None)` when the status is not 200.
    async fn get_json(&self, url: &str) -> Result<Option<Value>, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            debug!("GET {} answered {}", url, status);
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }

    async fn lookup_payload(&self, isbn: &str) -> Result<LookupPayload, FetchError> {
        if let Some(body) = self.get_json(&self.edition_url(isbn)).await? {
            return LookupPayload::from_edition(&body)
                .map_err(|err| FetchError::Malformed(err.to_string()));
        }

        debug!("Edition lookup missed for {}, trying search", isbn);
        let url = self.search_url(isbn);
        let body = self
            .get_json(&url)
            .await?
            .ok_or_else(|| FetchError::Unavailable(format!("search failed for {}", url)))?;

        LookupPayload::from_search(&body)
            .map_err(|err| FetchError::Malformed(err.to_string()))?
            .ok_or_else(|| FetchError::NotFound(isbn.to_string()))
    }

    /// Display name behind an author reference, `None` if it can't be fetched.
    async fn resolve_author_key(&self, key: &str) -> Option<String> {
        let url = self.author_url(key);
        match self.get_json(&url).await {
            Ok(Some(body)) => match serde_json::from_value::<AuthorResponse>(body) {
                Ok(author) => Some(author.display_name()),
                Err(err) => {
                    warn!("Skipping author {}: {}", key, err);
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!("Skipping author {}: {}", key, err);
                None
            }
        }
    }

    async fn resolve_authors(&self, authors: &[AuthorRef]) -> Vec<String> {
        let mut names = Vec::with_capacity(authors.len());
        for author in authors {
            match author {
                AuthorRef::Name(name) => names.push(name.clone()),
                AuthorRef::Key(key) => {
                    if let Some(name) = self.resolve_author_key(key).await {
                        names.push(name);
                    }
                }
            }
        }
        names
    }
}

#[async_trait]
impl MetadataFetcher for OpenLibraryClient {
    async fn fetch(&self, isbn: &str) -> Result<Book, FetchError> {
        let isbn = normalize_isbn(isbn.trim());
        if isbn.is_empty() {
            return Err(FetchError::NotFound(isbn));
        }

        info!("Looking up ISBN {} on {}", isbn, self.base_url);
        let payload = match self.lookup_payload(&isbn).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Lookup of ISBN {} failed: {}", isbn, err);
                return Err(err);
            }
        };

        let resolved = self.resolve_authors(&payload.authors).await;
        let book = Book::new(payload.title(), payload.author(resolved), isbn);
        debug!("Resolved {}", book);
        Ok(book)
    }
}
