use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

#[allow(dead_code)] // Used in tests
pub const LATEST_SCHEMA_VERSION: i32 = 1;

/// Run all pending migrations on the database
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if current_version < 1 {
        info!("creating comment schema v1");
        migrate_v0_to_v1(conn)?;
    }

    Ok(())
}

/// Initial schema creation (v0 -> v1)
fn migrate_v0_to_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            author TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'published', 'archived')),
            published_at TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TRIGGER posts_update_timestamp AFTER UPDATE ON posts BEGIN
            UPDATE posts SET updated_at = datetime('now') WHERE id = new.id;
        END;

        -- Reader comments; replies point at a parent on the same post
        CREATE TABLE comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            parent_id INTEGER REFERENCES comments(id) ON DELETE CASCADE,
            content TEXT NOT NULL CHECK (length(content) > 0),
            author_name TEXT NOT NULL CHECK (length(author_name) > 0),
            author_email TEXT NOT NULL CHECK (length(author_email) > 0),
            author_website TEXT,
            status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'approved', 'rejected')),
            ip_address TEXT,
            user_agent TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            CHECK (parent_id IS NULL OR parent_id <> id)
        );

        CREATE TRIGGER comments_update_timestamp AFTER UPDATE OF status ON comments BEGIN
            UPDATE comments SET updated_at = datetime('now') WHERE id = new.id;
        END;

        CREATE INDEX idx_posts_status ON posts(status, published_at);
        CREATE INDEX idx_comments_post_status ON comments(post_id, status, created_at);
        CREATE INDEX idx_comments_parent ON comments(parent_id);
        CREATE INDEX idx_comments_status ON comments(status);

        PRAGMA user_version = 1;
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_db() -> (Connection, TempDir) {
        let dir = TempDir::new().unwrap();
        let conn = Connection::open(dir.path().join("test.db")).unwrap();
        conn.execute("PRAGMA foreign_keys = ON", []).unwrap();
        (conn, dir)
    }

    #[test]
    fn fresh_db_has_latest_schema_version() {
        let (conn, _dir) = test_db();
        run_migrations(&conn).unwrap();

        let version: i32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();

        assert_eq!(version, LATEST_SCHEMA_VERSION);
    }

    #[test]
    fn migration_is_idempotent() {
        let (conn, _dir) = test_db();

        run_migrations(&conn).unwrap();
        assert!(run_migrations(&conn).is_ok());
    }

    #[test]
    fn schema_has_correct_tables() {
        let (conn, _dir) = test_db();
        run_migrations(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"posts".to_string()));
        assert!(tables.contains(&"comments".to_string()));
    }

    #[test]
    fn comment_status_constraint() {
        let (conn, _dir) = test_db();
        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO posts (title, slug, author) VALUES ('P', 'p', 'admin')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO comments (post_id, content, author_name, author_email, status)
             VALUES (1, 'hi', 'Ann', 'ann@example.com', 'spam')",
            [],
        );

        assert!(result.is_err());
    }

    #[test]
    fn comment_status_defaults_to_pending() {
        let (conn, _dir) = test_db();
        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO posts (title, slug, author) VALUES ('P', 'p', 'admin')",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO comments (post_id, content, author_name, author_email)
             VALUES (1, 'hi', 'Ann', 'ann@example.com')",
            [],
        )
        .unwrap();

        let status: String = conn
            .query_row("SELECT status FROM comments WHERE id = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(status, "pending");
    }

    #[test]
    fn empty_content_rejected_by_schema() {
        let (conn, _dir) = test_db();
        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO posts (title, slug, author) VALUES ('P', 'p', 'admin')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO comments (post_id, content, author_name, author_email)
             VALUES (1, '', 'Ann', 'ann@example.com')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn slug_is_unique() {
        let (conn, _dir) = test_db();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO posts (title, slug, author) VALUES ('A', 'same', 'admin')",
            [],
        )
        .unwrap();
        let result = conn.execute(
            "INSERT INTO posts (title, slug, author) VALUES ('B', 'same', 'admin')",
            [],
        );

        assert!(result.is_err());
    }
}
