use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result};

/// Moderation state of a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    pub const ALL: [CommentStatus; 3] = [
        CommentStatus::Pending,
        CommentStatus::Approved,
        CommentStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
        }
    }

    /// Only approved comments are shown to the public
    pub fn is_visible(&self) -> bool {
        matches!(self, CommentStatus::Approved)
    }
}

impl FromStr for CommentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(CommentStatus::Pending),
            "approved" => Ok(CommentStatus::Approved),
            "rejected" => Ok(CommentStatus::Rejected),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort order by creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "asc" | "oldest" => Ok(SortOrder::Asc),
            "desc" | "newest" => Ok(SortOrder::Desc),
            _ => Err(format!("invalid sort order '{}', must be asc or desc", s)),
        }
    }
}

/// A reader comment on a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub author_name: String,
    pub author_email: String,
    pub author_website: Option<String>,
    pub status: CommentStatus,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// A validated comment ready to be stored.
///
/// Only the submission validator builds these for public input, so
/// `status` is always `Pending` there. Fixtures may set other states.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub author_name: String,
    pub author_email: String,
    pub author_website: Option<String>,
    pub status: CommentStatus,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Filter criteria for the moderation listing.
///
/// `Default` lists every status across all posts, newest first, 15 per page.
#[derive(Debug, Clone)]
pub struct CommentFilter {
    pub post_id: Option<i64>,
    pub status: Option<CommentStatus>,
    pub search: Option<String>,
    pub sort_order: SortOrder,
    pub limit: usize,
    pub offset: usize,
}

impl Default for CommentFilter {
    fn default() -> Self {
        Self {
            post_id: None,
            status: None,
            search: None,
            sort_order: SortOrder::default(),
            limit: 15,
            offset: 0,
        }
    }
}

impl CommentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-based page of `limit` rows
    pub fn page(mut self, page: usize) -> Self {
        self.offset = page * self.limit;
        self
    }
}

/// Comment counts per status, for the moderation dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommentStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

/// What readers see of a comment. Email and request metadata stay out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicComment<'a> {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub content: &'a str,
    pub author_name: &'a str,
    pub author_website: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn public(&self) -> PublicComment<'_> {
        PublicComment {
            id: self.id,
            post_id: self.post_id,
            parent_id: self.parent_id,
            content: &self.content,
            author_name: &self.author_name,
            author_website: self.author_website.as_deref(),
            created_at: self.created_at,
        }
    }
}

/// A comment with its visible replies. Serializes the public fields only.
#[derive(Debug, Clone, Serialize)]
pub struct CommentNode {
    #[serde(serialize_with = "serialize_public")]
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

fn serialize_public<S: Serializer>(
    comment: &Comment,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    comment.public().serialize(serializer)
}
