use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-assigned movie identifier.
///
/// Film catalogues number their records (`episode_id`), JSON-document stores
/// hand out generated string keys. Both forms compare by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MovieId {
    Number(i64),
    Key(String),
}

impl MovieId {
    /// Compares by rendered value, so an id typed as text matches a
    /// numeric id with the same digits.
    pub fn same_as(&self, other: &MovieId) -> bool {
        match (self, other) {
            (MovieId::Number(a), MovieId::Number(b)) => a == b,
            (MovieId::Key(a), MovieId::Key(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovieId::Number(n) => write!(f, "{n}"),
            MovieId::Key(key) => f.write_str(key),
        }
    }
}

impl From<i64> for MovieId {
    fn from(value: i64) -> Self {
        MovieId::Number(value)
    }
}

impl From<&str> for MovieId {
    fn from(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(n) => MovieId::Number(n),
            Err(_) => MovieId::Key(value.to_string()),
        }
    }
}

impl From<String> for MovieId {
    fn from(value: String) -> Self {
        MovieId::from(value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub opening_text: String,
    #[serde(default)]
    pub release_date: String,
}

/// Fields collected by the add-movie form, sent as the create request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
    pub title: String,
    #[serde(default)]
    pub opening_text: String,
    #[serde(default)]
    pub release_date: String,
}

impl NewMovie {
    pub fn new(
        title: impl Into<String>,
        opening_text: impl Into<String>,
        release_date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            opening_text: opening_text.into(),
            release_date: release_date.into(),
        }
    }

    /// Returns the reason the record cannot be submitted, if any.
    pub fn validation_error(&self) -> Option<&'static str> {
        if self.title.trim().is_empty() {
            return Some("movie title must not be empty");
        }
        None
    }

    pub fn into_movie(self, id: MovieId) -> Movie {
        Movie {
            id,
            title: self.title,
            opening_text: self.opening_text,
            release_date: self.release_date,
        }
    }
}
