mod comments;
mod connection;
mod migrations;
mod posts;

use chrono::{DateTime, Utc};

pub use comments::{
    comment_stats, create_comment, delete_comment_subtree, delete_comments_by_post, find_comment,
    get_comment, get_replies, list_comments, list_comments_by_post, recent_comments,
    update_comment_status,
};
pub use connection::{find_remark_dir_from, RemarkDb, REMARK_DIR};
pub use posts::{create_post, delete_post, find_post, get_post, list_posts, set_post_status};

fn parse_datetime(s: String) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS"
    chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}
