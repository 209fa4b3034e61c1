//! Moderation of submitted comments.
//!
//! Authentication happens upstream; callers pass the already-authenticated
//! identity as an [`Actor`]. Admins may moderate any post, everyone else
//! only the posts they wrote.

use rusqlite::Connection;
use tracing::{info, warn};

use crate::config::Config;
use crate::db;
use crate::error::{Error, Result};
use crate::models::{Comment, CommentStatus, Post};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Author,
}

/// The identity performing a moderation action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn admin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Role::Admin,
        }
    }

    pub fn author(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Role::Author,
        }
    }

    /// Resolve a name to an actor using the configured admin list
    pub fn from_config(name: &str, config: &Config) -> Self {
        if config.is_admin(name) {
            Self::admin(name)
        } else {
            Self::author(name)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Load a post and check that `actor` may manage it and its comments
pub fn authorize_post(conn: &Connection, actor: &Actor, post_id: i64) -> Result<Post> {
    let post = db::get_post(conn, post_id)?.ok_or_else(|| Error::PostNotFound(post_id.to_string()))?;
    if actor.is_admin() || post.author == actor.name {
        return Ok(post);
    }

    warn!(actor = %actor.name, post_id, "moderation refused");
    Err(Error::Forbidden {
        actor: actor.name.clone(),
        post_id,
    })
}

/// Load a comment and check that `actor` may moderate it
pub fn authorize(conn: &Connection, actor: &Actor, comment_id: i64) -> Result<Comment> {
    let comment = db::find_comment(conn, comment_id)?;
    if !actor.is_admin() {
        authorize_post(conn, actor, comment.post_id)?;
    }
    Ok(comment)
}

/// Views spanning every post are for admins only
pub fn require_admin(actor: &Actor) -> Result<()> {
    if actor.is_admin() {
        return Ok(());
    }

    warn!(actor = %actor.name, "admin access refused");
    Err(Error::AdminRequired(actor.name.clone()))
}

/// Move a comment to `target`. Any state may move to any other; setting
/// the current state again changes nothing.
pub fn set_status(
    conn: &Connection,
    actor: &Actor,
    comment_id: i64,
    target: CommentStatus,
) -> Result<Comment> {
    let comment = authorize(conn, actor, comment_id)?;
    if comment.status == target {
        return Ok(comment);
    }

    let updated = db::update_comment_status(conn, comment_id, target)?;
    info!(
        actor = %actor.name,
        comment_id,
        from = %comment.status,
        to = %target,
        "comment status changed"
    );
    Ok(updated)
}

/// Parse a status name and apply it. Unknown names fail with
/// `InvalidStatus` before anything is read or written.
pub fn set_status_named(
    conn: &Connection,
    actor: &Actor,
    comment_id: i64,
    target: &str,
) -> Result<Comment> {
    let target: CommentStatus = target.parse()?;
    set_status(conn, actor, comment_id, target)
}

pub fn approve(conn: &Connection, actor: &Actor, comment_id: i64) -> Result<Comment> {
    set_status(conn, actor, comment_id, CommentStatus::Approved)
}

pub fn reject(conn: &Connection, actor: &Actor, comment_id: i64) -> Result<Comment> {
    set_status(conn, actor, comment_id, CommentStatus::Rejected)
}

/// Delete a comment and all replies under it. Returns the number of
/// comments removed.
pub fn destroy(conn: &Connection, actor: &Actor, comment_id: i64) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    authorize(&tx, actor, comment_id)?;
    let removed = db::delete_comment_subtree(&tx, comment_id)?;
    tx.commit()?;
    info!(actor = %actor.name, comment_id, removed, "comment deleted");
    Ok(removed)
}
