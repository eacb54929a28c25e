//! Book model and related types

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// URL-safe alphabet used for book identifiers
const BOOK_ID_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Number of symbols in a generated book identifier
pub const BOOK_ID_LENGTH: usize = 16;

/// Generate a fresh random book identifier
pub fn generate_book_id() -> String {
    let mut rng = rand::thread_rng();
    (0..BOOK_ID_LENGTH)
        .map(|_| BOOK_ID_ALPHABET[rng.gen_range(0..BOOK_ID_ALPHABET.len())] as char)
        .collect()
}

/// Full book record as stored on the shelf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub name: String,
    #[schema(value_type = Option<Object>)]
    pub year: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub author: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub summary: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub publisher: Option<Value>,
    /// Total number of pages
    pub page_count: u32,
    /// Pages read so far
    pub read_page: u32,
    /// Derived: `readPage == pageCount`
    pub finished: bool,
    pub reading: bool,
    #[serde(with = "iso_millis")]
    pub inserted_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Build a new record from a validated payload
    pub fn new(id: String, payload: BookPayload, now: DateTime<Utc>) -> Self {
        let finished = payload.is_finished();
        Self {
            id,
            name: payload.name.unwrap_or_default(),
            year: payload.year,
            author: payload.author,
            summary: payload.summary,
            publisher: payload.publisher,
            page_count: payload.page_count,
            read_page: payload.read_page,
            finished,
            reading: payload.reading,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Replace every caller-owned field. `id` and `inserted_at` are kept.
    pub fn apply(&mut self, payload: &BookPayload, now: DateTime<Utc>) {
        self.name = payload.name.clone().unwrap_or_default();
        self.year = payload.year.clone();
        self.author = payload.author.clone();
        self.summary = payload.summary.clone();
        self.publisher = payload.publisher.clone();
        self.page_count = payload.page_count;
        self.read_page = payload.read_page;
        self.finished = payload.is_finished();
        self.reading = payload.reading;
        self.updated_at = now;
    }
}

/// Short book representation for lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookShort {
    pub id: String,
    pub name: String,
    #[schema(value_type = Option<Object>)]
    pub publisher: Option<Value>,
}

impl From<&Book> for BookShort {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            name: book.name.clone(),
            publisher: book.publisher.clone(),
        }
    }
}

/// Create / update book request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    /// Book title (required, non-empty)
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    /// Stored as sent, any JSON value
    #[schema(value_type = Option<Object>)]
    pub year: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub author: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub summary: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub publisher: Option<Value>,
    /// Whole number of pages; fractional or negative values are rejected
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub read_page: u32,
    #[serde(default)]
    pub reading: bool,
}

impl BookPayload {
    pub fn read_page_exceeds_page_count(&self) -> bool {
        self.read_page > self.page_count
    }

    pub fn is_finished(&self) -> bool {
        self.read_page == self.page_count
    }
}

/// Book list query parameters.
///
/// `reading` and `finished` are string flags: `"1"` means true, any other
/// non-empty value means false.
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring of the book name
    pub name: Option<String>,
    /// `1` for books being read, anything else for the others
    pub reading: Option<String>,
    /// `1` for finished books, anything else for the others
    pub finished: Option<String>,
}

impl BookQuery {
    pub fn to_filter(&self) -> BookFilter {
        BookFilter {
            name: self
                .name
                .as_deref()
                .filter(|name| !name.is_empty())
                .map(str::to_lowercase),
            reading: parse_flag(self.reading.as_deref()),
            finished: parse_flag(self.finished.as_deref()),
        }
    }
}

/// Parsed list filters. `None` means the filter is not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    /// Lowercased name fragment
    pub name: Option<String>,
    pub reading: Option<bool>,
    pub finished: Option<bool>,
}

/// Map a query flag to a boolean. Only the literal `"1"` is true.
pub fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value {
        None | Some("") => None,
        Some(flag) => Some(flag == "1"),
    }
}

/// ISO-8601 timestamps with millisecond precision (`2024-01-01T10:00:00.000Z`)
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        DateTime::<Utc>::deserialize(deserializer)
    }
}
