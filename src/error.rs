use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single rejected submission field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field-level problem found in one submission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Messages recorded for one field, in the order they were found
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not a remark repository (or any parent up to /). Run 'remark init' to create one.")]
    NotARepository,

    #[error("Already initialized")]
    AlreadyInitialized,

    #[error("Invalid comment: {0}")]
    Validation(ValidationErrors),

    #[error("Comment #{0} not found")]
    CommentNotFound(i64),

    #[error("Post '{0}' not found")]
    PostNotFound(String),

    #[error("Post #{0} is not published")]
    PostNotPublished(i64),

    #[error("A post with slug '{0}' already exists")]
    DuplicateSlug(String),

    #[error("Invalid status '{0}': must be pending, approved, or rejected")]
    InvalidStatus(String),

    #[error("Invalid post status '{0}': must be draft, published, or archived")]
    InvalidPostStatus(String),

    #[error("{actor} may not moderate comments on post #{post_id}")]
    Forbidden { actor: String, post_id: i64 },

    #[error("{0} is not an admin")]
    AdminRequired(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Could not write config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
