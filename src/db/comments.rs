// Comment store: persistence for comments, their status, and reply links

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Comment, CommentFilter, CommentStats, CommentStatus, NewComment, SortOrder};

use super::parse_datetime;

const SUBTREE_CTE: &str = "WITH RECURSIVE subtree(id) AS (
         SELECT id FROM comments WHERE id = ?1
         UNION ALL
         SELECT c.id FROM comments c JOIN subtree s ON c.parent_id = s.id
     )";

const COMMENT_COLUMNS: &str = "id, post_id, parent_id, content, author_name, author_email, \
     author_website, status, ip_address, user_agent, created_at, updated_at";

/// Insert a comment and return it with its assigned id and timestamps
pub fn create_comment(conn: &Connection, new: &NewComment) -> Result<Comment> {
    conn.execute(
        "INSERT INTO comments (post_id, parent_id, content, author_name, author_email,
                               author_website, status, ip_address, user_agent)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            new.post_id,
            new.parent_id,
            new.content,
            new.author_name,
            new.author_email,
            new.author_website,
            new.status.as_str(),
            new.ip_address,
            new.user_agent,
        ],
    )?;

    let id = conn.last_insert_rowid();
    debug!(comment_id = id, post_id = new.post_id, "inserted comment");

    find_comment(conn, id)
}

/// Get a single comment by ID
pub fn get_comment(conn: &Connection, id: i64) -> Result<Option<Comment>> {
    let comment = conn
        .query_row(
            &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1"),
            [id],
            comment_from_row,
        )
        .optional()?;

    Ok(comment)
}

/// Like [`get_comment`] but a missing comment is an error
pub fn find_comment(conn: &Connection, id: i64) -> Result<Comment> {
    get_comment(conn, id)?.ok_or(Error::CommentNotFound(id))
}

/// Comments on one post, optionally restricted to a status
pub fn list_comments_by_post(
    conn: &Connection,
    post_id: i64,
    status: Option<CommentStatus>,
    order: SortOrder,
) -> Result<Vec<Comment>> {
    let mut sql = format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = ?1");
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(post_id)];

    if let Some(status) = status {
        params.push(Box::new(status.as_str()));
        sql.push_str(&format!(" AND status = ?{}", params.len()));
    }

    sql.push_str(order_clause(order));
    query_comments(conn, &sql, params)
}

/// Moderation listing with status, post and text filters plus pagination
pub fn list_comments(conn: &Connection, filter: &CommentFilter) -> Result<Vec<Comment>> {
    let mut sql = format!("SELECT {COMMENT_COLUMNS} FROM comments");
    let mut conditions = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(post_id) = filter.post_id {
        params.push(Box::new(post_id));
        conditions.push(format!("post_id = ?{}", params.len()));
    }

    if let Some(status) = filter.status {
        params.push(Box::new(status.as_str()));
        conditions.push(format!("status = ?{}", params.len()));
    }

    // Substring match on content or author
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        params.push(Box::new(format!("%{}%", search.trim())));
        let n = params.len();
        conditions.push(format!(
            "(content LIKE ?{n} OR author_name LIKE ?{n} OR author_email LIKE ?{n})"
        ));
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    sql.push_str(order_clause(filter.sort_order));
    sql.push_str(&format!(" LIMIT {} OFFSET {}", filter.limit, filter.offset));

    query_comments(conn, &sql, params)
}

/// Direct replies to a comment in any status, oldest first
pub fn get_replies(conn: &Connection, id: i64) -> Result<Vec<Comment>> {
    let sql = format!(
        "SELECT {COMMENT_COLUMNS} FROM comments WHERE parent_id = ?1{}",
        order_clause(SortOrder::Asc)
    );
    query_comments(conn, &sql, vec![Box::new(id)])
}

/// Most recent comments across all posts
pub fn recent_comments(conn: &Connection, limit: usize) -> Result<Vec<Comment>> {
    let filter = CommentFilter {
        limit,
        ..Default::default()
    };
    list_comments(conn, &filter)
}

/// Set a comment's status and return the updated row
pub fn update_comment_status(conn: &Connection, id: i64, status: CommentStatus) -> Result<Comment> {
    let changed = conn.execute(
        "UPDATE comments SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;

    if changed == 0 {
        return Err(Error::CommentNotFound(id));
    }

    find_comment(conn, id)
}

/// Delete a comment together with every reply beneath it.
/// Returns how many comments were removed.
///
/// Runs two statements without opening a transaction; callers that need
/// the count and the delete to agree wrap the call in one.
pub fn delete_comment_subtree(conn: &Connection, id: i64) -> Result<usize> {
    // Count first: rows removed by the FK cascade are not reported as changes
    let removed: i64 = conn.query_row(
        &format!("{SUBTREE_CTE} SELECT COUNT(*) FROM subtree"),
        [id],
        |row| row.get(0),
    )?;
    if removed == 0 {
        return Err(Error::CommentNotFound(id));
    }

    conn.execute(
        &format!("{SUBTREE_CTE} DELETE FROM comments WHERE id IN (SELECT id FROM subtree)"),
        [id],
    )?;

    info!(comment_id = id, removed, "deleted comment subtree");
    Ok(removed as usize)
}

/// Delete every comment on a post, replies included.
/// Returns how many comments were removed.
pub fn delete_comments_by_post(conn: &Connection, post_id: i64) -> Result<usize> {
    let removed: i64 = conn.query_row(
        "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
        [post_id],
        |row| row.get(0),
    )?;
    conn.execute("DELETE FROM comments WHERE post_id = ?1", [post_id])?;
    debug!(post_id, removed, "deleted comments for post");
    Ok(removed as usize)
}

/// Count comments per status
pub fn comment_stats(conn: &Connection) -> Result<CommentStats> {
    let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM comments GROUP BY status")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut stats = CommentStats::default();
    for row in rows {
        let (status, count) = row?;
        match parse_comment_status(status) {
            CommentStatus::Pending => stats.pending += count,
            CommentStatus::Approved => stats.approved += count,
            CommentStatus::Rejected => stats.rejected += count,
        }
        stats.total += count;
    }

    Ok(stats)
}

fn order_clause(order: SortOrder) -> &'static str {
    // Timestamps have second resolution; id breaks ties in insertion order
    match order {
        SortOrder::Asc => " ORDER BY created_at ASC, id ASC",
        SortOrder::Desc => " ORDER BY created_at DESC, id DESC",
    }
}

fn query_comments(
    conn: &Connection,
    sql: &str,
    params: Vec<Box<dyn rusqlite::ToSql>>,
) -> Result<Vec<Comment>> {
    let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(sql)?;
    let comments = stmt
        .query_map(params_refs.as_slice(), comment_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(comments)
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get(0)?,
        post_id: row.get(1)?,
        parent_id: row.get(2)?,
        content: row.get(3)?,
        author_name: row.get(4)?,
        author_email: row.get(5)?,
        author_website: row.get(6)?,
        status: parse_comment_status(row.get::<_, String>(7)?),
        ip_address: row.get(8)?,
        user_agent: row.get(9)?,
        created_at: parse_datetime(row.get::<_, String>(10)?),
        updated_at: parse_datetime(row.get::<_, String>(11)?),
    })
}

fn parse_comment_status(s: String) -> CommentStatus {
    match s.as_str() {
        "approved" => CommentStatus::Approved,
        "rejected" => CommentStatus::Rejected,
        _ => CommentStatus::Pending, // CHECK constraint keeps this unreachable
    }
}
