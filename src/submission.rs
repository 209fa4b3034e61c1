//! Public comment submission: field validation and the pending-only rule

use std::sync::OnceLock;

use regex::Regex;
use rusqlite::Connection;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::{SubmissionConfig, MAX_CONTENT_LENGTH, MAX_FIELD_LENGTH};
use crate::db;
use crate::error::{Error, Result, ValidationErrors};
use crate::models::{Comment, CommentStatus, NewComment};

/// Raw fields as posted by a reader. Nothing here is trusted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentSubmission {
    pub content: String,
    pub author_name: String,
    pub author_email: String,
    pub author_website: Option<String>,
    pub parent_id: Option<i64>,
    /// Accepted so a forged payload still parses; never stored
    pub status: Option<String>,
}

/// Request metadata captured alongside a submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Field rules for public submissions
#[derive(Debug, Clone)]
pub struct SubmissionValidator {
    max_content_length: usize,
    max_field_length: usize,
}

impl Default for SubmissionValidator {
    fn default() -> Self {
        Self::new(&SubmissionConfig::default())
    }
}

impl SubmissionValidator {
    pub fn new(config: &SubmissionConfig) -> Self {
        if config.max_content_length > MAX_CONTENT_LENGTH
            || config.max_field_length > MAX_FIELD_LENGTH
        {
            warn!(
                max_content_length = config.max_content_length,
                max_field_length = config.max_field_length,
                "submission limits above the supported maximum were clamped"
            );
        }

        Self {
            max_content_length: config.max_content_length.min(MAX_CONTENT_LENGTH),
            max_field_length: config.max_field_length.min(MAX_FIELD_LENGTH),
        }
    }

    /// Check every field that can be judged without the database
    pub fn check_fields(&self, submission: &CommentSubmission) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        let content = submission.content.trim();
        if content.is_empty() {
            errors.add("content", "Comment content is required.");
        } else if content.chars().count() > self.max_content_length {
            errors.add(
                "content",
                format!(
                    "Comment cannot exceed {} characters.",
                    self.max_content_length
                ),
            );
        }

        let name = submission.author_name.trim();
        if name.is_empty() {
            errors.add("author_name", "Your name is required.");
        } else if name.chars().count() > self.max_field_length {
            errors.add("author_name", self.too_long("Your name"));
        }

        let email = submission.author_email.trim();
        if email.is_empty() {
            errors.add("author_email", "Your email is required.");
        } else if email.chars().count() > self.max_field_length {
            errors.add("author_email", self.too_long("Your email"));
        } else if !is_valid_email(email) {
            errors.add("author_email", "Please provide a valid email address.");
        }

        if let Some(website) = non_blank(submission.author_website.as_deref()) {
            if website.chars().count() > self.max_field_length {
                errors.add("author_website", self.too_long("Website"));
            } else if !is_valid_url(website) {
                errors.add("author_website", "Website must be a valid URL.");
            }
        }

        errors
    }

    /// Validate a submission for `post_id` and build the record to store.
    ///
    /// The result is always `Pending`; a `status` in the submission is
    /// ignored.
    pub fn validate(
        &self,
        conn: &Connection,
        post_id: i64,
        submission: &CommentSubmission,
        ctx: &RequestContext,
    ) -> Result<NewComment> {
        let mut errors = self.check_fields(submission);

        if let Some(parent_id) = submission.parent_id {
            match db::get_comment(conn, parent_id)? {
                None => errors.add(
                    "parent_id",
                    "The comment you are replying to does not exist.",
                ),
                Some(parent) if parent.post_id != post_id => errors.add(
                    "parent_id",
                    "The comment you are replying to belongs to a different post.",
                ),
                Some(_) => {}
            }
        }

        errors.into_result()?;

        if let Some(status) = submission.status.as_deref() {
            if !status.eq_ignore_ascii_case(CommentStatus::Pending.as_str()) {
                warn!(post_id, status, "ignoring status supplied with submission");
            }
        }

        Ok(NewComment {
            post_id,
            parent_id: submission.parent_id,
            content: submission.content.trim().to_string(),
            author_name: submission.author_name.trim().to_string(),
            author_email: submission.author_email.trim().to_string(),
            author_website: non_blank(submission.author_website.as_deref()).map(str::to_string),
            status: CommentStatus::Pending,
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
        })
    }

    fn too_long(&self, what: &str) -> String {
        format!(
            "{} may not be greater than {} characters.",
            what, self.max_field_length
        )
    }
}

/// Validate a submission with the given limits
pub fn validate_submission(
    conn: &Connection,
    post_id: i64,
    submission: &CommentSubmission,
    ctx: &RequestContext,
    config: &SubmissionConfig,
) -> Result<NewComment> {
    SubmissionValidator::new(config).validate(conn, post_id, submission, ctx)
}

/// Accept a reader's comment on a published post. The comment is stored
/// as pending and waits for moderation.
pub fn submit_comment(
    conn: &Connection,
    post_id: i64,
    submission: &CommentSubmission,
    ctx: &RequestContext,
    config: &SubmissionConfig,
) -> Result<Comment> {
    let tx = conn.unchecked_transaction()?;

    let post = db::get_post(&tx, post_id)?.ok_or_else(|| Error::PostNotFound(post_id.to_string()))?;
    if !post.is_published() {
        return Err(Error::PostNotPublished(post_id));
    }

    let new = validate_submission(&tx, post_id, submission, ctx, config)?;
    let comment = db::create_comment(&tx, &new)?;
    tx.commit()?;

    info!(
        comment_id = comment.id,
        post_id,
        parent_id = ?comment.parent_id,
        "comment submitted for moderation"
    );
    Ok(comment)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$")
                .expect("email pattern compiles")
        })
        .is_match(email)
}

fn is_valid_url(url: &str) -> bool {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| {
        Regex::new(r"^(?i)https?://[a-z0-9](?:[a-z0-9.-]*[a-z0-9])?(?::\d{1,5})?(?:[/?#]\S*)?$")
            .expect("url pattern compiles")
    })
    .is_match(url)
}
