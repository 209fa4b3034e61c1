// Post queries: the minimal record comments hang off

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{slugify, Post, PostCreate, PostStatus};

use super::comments::delete_comments_by_post;
use super::parse_datetime;

const POST_COLUMNS: &str =
    "id, title, slug, author, status, published_at, created_at, updated_at";

/// Create a post, deriving its slug from the title when none is given
pub fn create_post(conn: &Connection, create: &PostCreate) -> Result<Post> {
    let slug = match &create.slug {
        Some(slug) => slugify(slug),
        None => slugify(&create.title),
    };
    let slug = if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    };

    if get_post_by_slug(conn, &slug)?.is_some() {
        return Err(Error::DuplicateSlug(slug));
    }

    let status = if create.publish {
        PostStatus::Published
    } else {
        PostStatus::Draft
    };

    conn.execute(
        "INSERT INTO posts (title, slug, author, status, published_at)
         VALUES (?1, ?2, ?3, ?4, CASE WHEN ?4 = 'published' THEN datetime('now') END)",
        params![create.title, slug, create.author, status.to_string()],
    )?;

    let id = conn.last_insert_rowid();
    info!(post_id = id, %slug, "created post");

    get_post(conn, id)?.ok_or_else(|| Error::PostNotFound(id.to_string()))
}

/// Get a single post by ID
pub fn get_post(conn: &Connection, id: i64) -> Result<Option<Post>> {
    let post = conn
        .query_row(
            &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
            [id],
            post_from_row,
        )
        .optional()?;

    Ok(post)
}

pub fn get_post_by_slug(conn: &Connection, slug: &str) -> Result<Option<Post>> {
    let post = conn
        .query_row(
            &format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = ?1"),
            [slug],
            post_from_row,
        )
        .optional()?;

    Ok(post)
}

/// Resolve a post from a numeric id or a slug
pub fn find_post(conn: &Connection, key: &str) -> Result<Post> {
    let post = match key.parse::<i64>() {
        Ok(id) => get_post(conn, id)?,
        Err(_) => get_post_by_slug(conn, key)?,
    };

    post.ok_or_else(|| Error::PostNotFound(key.to_string()))
}

/// All posts, newest first
pub fn list_posts(conn: &Connection) -> Result<Vec<Post>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC"
    ))?;
    let posts = stmt
        .query_map([], post_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(posts)
}

/// Change a post's publication state. Publishing stamps `published_at`
/// the first time only.
pub fn set_post_status(conn: &Connection, id: i64, status: PostStatus) -> Result<Post> {
    let changed = conn.execute(
        "UPDATE posts
         SET status = ?1,
             published_at = CASE
                 WHEN ?1 = 'published' THEN COALESCE(published_at, datetime('now'))
                 ELSE published_at
             END
         WHERE id = ?2",
        params![status.to_string(), id],
    )?;

    if changed == 0 {
        return Err(Error::PostNotFound(id.to_string()));
    }

    info!(post_id = id, %status, "post status changed");
    get_post(conn, id)?.ok_or_else(|| Error::PostNotFound(id.to_string()))
}

/// Delete a post and every comment on it. Returns the number of comments
/// removed.
pub fn delete_post(conn: &Connection, id: i64) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;

    let exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(Error::PostNotFound(id.to_string()));
    }

    let removed = delete_comments_by_post(&tx, id)?;
    tx.execute("DELETE FROM posts WHERE id = ?1", [id])?;
    tx.commit()?;

    info!(post_id = id, comments_removed = removed, "deleted post");
    Ok(removed)
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        author: row.get(3)?,
        status: parse_post_status(row.get::<_, String>(4)?),
        published_at: row.get::<_, Option<String>>(5)?.map(parse_datetime),
        created_at: parse_datetime(row.get::<_, String>(6)?),
        updated_at: parse_datetime(row.get::<_, String>(7)?),
    })
}

fn parse_post_status(s: String) -> PostStatus {
    match s.as_str() {
        "published" => PostStatus::Published,
        "archived" => PostStatus::Archived,
        _ => PostStatus::Draft,
    }
}
