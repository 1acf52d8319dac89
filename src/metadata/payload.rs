//! Normalization of the loosely shaped lookup responses.
//!
//! Edition records carry `authors` as reference objects (`{"key": ...}`),
//! plain strings or objects with a `name`. Search results carry a flat
//! `author_name` list instead. Anything else is ignored.

use serde::Deserialize;
use serde_json::Value;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorRef {
    /// Needs a secondary lookup of `{key}.json` to get a display name.
    Key(String),
    Name(String),
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl AuthorRef {
    /// Blank keys and names count as absent.
    fn from_value(value: &Value) -> Option<AuthorRef> {
        match value {
            Value::String(name) => non_blank(name).map(AuthorRef::Name),
            Value::Object(fields) => {
                let field = |name: &str| fields.get(name).and_then(Value::as_str).and_then(non_blank);
                field("key")
                    .map(AuthorRef::Key)
                    .or_else(|| field("name").map(AuthorRef::Name))
            }
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct EditionResponse {
    title: Option<Value>,
    authors: Option<Value>,
    author_name: Option<Value>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Deserialize)]
struct SearchDoc {
    title: Option<Value>,
    title_suggest: Option<Value>,
    author_name: Option<Value>,
}

#[derive(Deserialize)]
pub(super) struct AuthorResponse {
    pub name: Option<Value>,
}

impl AuthorResponse {
    pub fn display_name(&self) -> String {
        self.name
            .as_ref()
            .and_then(Value::as_str)
            .and_then(non_blank)
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
    }
}

fn as_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).and_then(non_blank)
}

fn as_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(non_blank)
            .collect(),
        _ => vec![],
    }
}

/// The parts of a lookup response needed to build a book.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LookupPayload {
    pub title: Option<String>,
    pub authors: Vec<AuthorRef>,
    /// Used only when `authors` resolves to nothing.
    pub author_names: Vec<String>,
}

impl LookupPayload {
    /// Parses a direct by-ISBN edition record.
    pub fn from_edition(body: &Value) -> Result<LookupPayload, serde_json::Error> {
        let edition = EditionResponse::deserialize(body)?;
        let authors = match &edition.authors {
            Some(Value::Array(items)) => items.iter().filter_map(AuthorRef::from_value).collect(),
            _ => vec![],
        };
        Ok(LookupPayload {
            title: as_string(edition.title.as_ref()),
            authors,
            author_names: as_string_list(edition.author_name.as_ref()),
        })
    }

    /// Parses a search response, `None` when it holds no documents.
    pub fn from_search(body: &Value) -> Result<Option<LookupPayload>, serde_json::Error> {
        let search = SearchResponse::deserialize(body)?;
        Ok(search.docs.into_iter().next().map(|doc| LookupPayload {
            title: as_string(doc.title.as_ref()).or_else(|| as_string(doc.title_suggest.as_ref())),
            authors: vec![],
            author_names: as_string_list(doc.author_name.as_ref()),
        }))
    }

    pub fn title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
    }

    /// Joins resolved names, falling back to `author_names`, then to
    /// [`UNKNOWN_AUTHOR`].
    pub fn author(&self, resolved: Vec<String>) -> String {
        let names = if resolved.is_empty() {
            self.author_names.clone()
        } else {
            resolved
        };
        if names.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            names.join(", ")
        }
    }
}
