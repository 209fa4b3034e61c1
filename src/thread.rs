//! Public comment thread for a post

use std::collections::HashMap;

use rusqlite::Connection;
use tracing::debug;

use crate::db;
use crate::error::Result;
use crate::models::{Comment, CommentNode, CommentStatus, SortOrder};

/// Build the approved comment tree for a post.
///
/// Roots are approved top-level comments, newest first. Each level keeps
/// only approved replies, also newest first. A reply is reached only
/// through its parent, so an approved reply under a pending or rejected
/// comment stays hidden.
pub fn build_thread(conn: &Connection, post_id: i64) -> Result<Vec<CommentNode>> {
    let approved = db::list_comments_by_post(
        conn,
        post_id,
        Some(CommentStatus::Approved),
        SortOrder::Desc,
    )?;
    debug!(post_id, approved = approved.len(), "assembling thread");

    Ok(assemble(approved))
}

/// Arrange comments into trees. Input order is kept among siblings.
pub fn assemble(comments: Vec<Comment>) -> Vec<CommentNode> {
    let mut children: HashMap<Option<i64>, Vec<Comment>> = HashMap::new();
    for comment in comments {
        children.entry(comment.parent_id).or_default().push(comment);
    }

    let roots = children.remove(&None).unwrap_or_default();
    roots
        .into_iter()
        .map(|root| attach(root, &mut children))
        .collect()
}

fn attach(comment: Comment, children: &mut HashMap<Option<i64>, Vec<Comment>>) -> CommentNode {
    let replies = children
        .remove(&Some(comment.id))
        .unwrap_or_default()
        .into_iter()
        .map(|reply| attach(reply, children))
        .collect();

    CommentNode { comment, replies }
}

/// Number of comments in a thread, replies included
pub fn thread_size(nodes: &[CommentNode]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + thread_size(&node.replies))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RemarkDb;
    use crate::models::{NewComment, PostCreate};
    use tempfile::TempDir;

    struct Fixture {
        db: RemarkDb,
        _dir: TempDir,
        post_id: i64,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let db = RemarkDb::init(dir.path()).unwrap();
            let post_id = db::create_post(
                db.conn(),
                &PostCreate {
                    title: "Thread".to_string(),
                    author: "admin".to_string(),
                    publish: true,
                    ..Default::default()
                },
            )
            .unwrap()
            .id;
            Self {
                db,
                _dir: dir,
                post_id,
            }
        }

        fn add(&self, content: &str, parent_id: Option<i64>, status: CommentStatus) -> i64 {
            db::create_comment(
                self.db.conn(),
                &NewComment {
                    post_id: self.post_id,
                    parent_id,
                    content: content.to_string(),
                    author_name: "Ann".to_string(),
                    author_email: "ann@example.com".to_string(),
                    author_website: None,
                    status,
                    ip_address: None,
                    user_agent: None,
                },
            )
            .unwrap()
            .id
        }

        fn thread(&self) -> Vec<CommentNode> {
            build_thread(self.db.conn(), self.post_id).unwrap()
        }
    }

    fn contents(nodes: &[CommentNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.comment.content.as_str()).collect()
    }

    #[test]
    fn empty_post_has_empty_thread() {
        let f = Fixture::new();
        assert!(f.thread().is_empty());
    }

    #[test]
    fn roots_are_approved_and_newest_first() {
        let f = Fixture::new();
        f.add("old", None, CommentStatus::Approved);
        f.add("waiting", None, CommentStatus::Pending);
        f.add("spam", None, CommentStatus::Rejected);
        f.add("new", None, CommentStatus::Approved);

        let thread = f.thread();
        assert_eq!(contents(&thread), vec!["new", "old"]);
    }

    #[test]
    fn replies_nest_and_filter_at_every_level() {
        let f = Fixture::new();
        let root = f.add("root", None, CommentStatus::Approved);
        let first = f.add("first reply", Some(root), CommentStatus::Approved);
        f.add("hidden reply", Some(root), CommentStatus::Pending);
        let second = f.add("second reply", Some(root), CommentStatus::Approved);
        f.add("deep", Some(first), CommentStatus::Approved);
        f.add("deep rejected", Some(second), CommentStatus::Rejected);

        let thread = f.thread();
        assert_eq!(thread.len(), 1);
        assert_eq!(contents(&thread[0].replies), vec!["second reply", "first reply"]);
        assert!(thread[0].replies[0].replies.is_empty());
        assert_eq!(contents(&thread[0].replies[1].replies), vec!["deep"]);
        assert_eq!(thread_size(&thread), 4);
    }

    #[test]
    fn approved_reply_under_unapproved_parent_stays_hidden() {
        let f = Fixture::new();
        let pending = f.add("pending parent", None, CommentStatus::Pending);
        f.add("approved orphan", Some(pending), CommentStatus::Approved);
        let rejected = f.add("rejected parent", None, CommentStatus::Rejected);
        let middle = f.add("approved middle", Some(rejected), CommentStatus::Approved);
        f.add("approved grandchild", Some(middle), CommentStatus::Approved);

        assert!(f.thread().is_empty());
    }

    #[test]
    fn thread_never_contains_unapproved() {
        let f = Fixture::new();
        let statuses = [
            CommentStatus::Approved,
            CommentStatus::Pending,
            CommentStatus::Rejected,
        ];
        let mut parents = vec![None];
        for (i, status) in statuses.iter().cycle().take(12).enumerate() {
            let parent = parents[i % parents.len()];
            let id = f.add(&format!("c{}", i), parent, *status);
            parents.push(Some(id));
        }

        fn check(nodes: &[CommentNode]) {
            for node in nodes {
                assert_eq!(node.comment.status, CommentStatus::Approved);
                check(&node.replies);
            }
        }
        check(&f.thread());
    }

    #[test]
    fn thread_serializes_for_rendering() {
        let f = Fixture::new();
        let root = f.add("root", None, CommentStatus::Approved);
        f.add("reply", Some(root), CommentStatus::Approved);

        let json = serde_json::to_value(f.thread()).unwrap();
        assert_eq!(json[0]["comment"]["content"], "root");
        assert_eq!(json[0]["replies"][0]["comment"]["content"], "reply");
    }
}
