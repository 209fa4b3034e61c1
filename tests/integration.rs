//! Integration tests for remark
//!
//! These tests exercise submission, moderation and thread assembly
//! together against a real database.

use remark::config::SubmissionConfig;
use remark::db::{self, RemarkDb};
use remark::error::Error;
use remark::moderation::{self, Actor};
use remark::submission::{submit_comment, CommentSubmission, RequestContext};
use remark::thread::build_thread;
use remark::{CommentStatus, Config, PostCreate};
use tempfile::TempDir;

/// Helper to create a test database in a temporary directory
fn test_db() -> (RemarkDb, TempDir) {
    let dir = TempDir::new().unwrap();
    let db = RemarkDb::init(dir.path()).unwrap();
    (db, dir)
}

fn published_post(db: &RemarkDb, title: &str) -> i64 {
    db::create_post(
        db.conn(),
        &PostCreate {
            title: title.to_string(),
            author: "admin".to_string(),
            publish: true,
            ..Default::default()
        },
    )
    .unwrap()
    .id
}

fn submission(content: &str, parent_id: Option<i64>) -> CommentSubmission {
    CommentSubmission {
        content: content.to_string(),
        author_name: "Ann".to_string(),
        author_email: "ann@example.com".to_string(),
        parent_id,
        ..Default::default()
    }
}

fn submit(db: &RemarkDb, post_id: i64, s: &CommentSubmission) -> remark::Result<remark::Comment> {
    submit_comment(
        db.conn(),
        post_id,
        s,
        &RequestContext::default(),
        &SubmissionConfig::default(),
    )
}

#[test]
fn init_and_reopen_database() {
    let dir = TempDir::new().unwrap();

    let db = RemarkDb::init(dir.path()).unwrap();
    let post_id = published_post(&db, "Persisted");
    drop(db);

    let db = RemarkDb::open_at(&dir.path().join(".remark")).unwrap();
    assert!(db::get_post(db.conn(), post_id).unwrap().is_some());
}

#[test]
fn double_init_fails() {
    let dir = TempDir::new().unwrap();

    RemarkDb::init(dir.path()).unwrap();
    let result = RemarkDb::init(dir.path());

    assert!(matches!(result.unwrap_err(), Error::AlreadyInitialized));
}

#[test]
fn first_comment_is_pending_then_visible_after_approval() {
    let (db, _dir) = test_db();
    let post_id = published_post(&db, "Hello");

    let comment = submit(&db, post_id, &submission("Nice post!", None)).unwrap();
    assert_eq!(comment.status, CommentStatus::Pending);
    assert_eq!(comment.author_name, "Ann");
    assert!(build_thread(db.conn(), post_id).unwrap().is_empty());

    moderation::approve(db.conn(), &Actor::admin("admin"), comment.id).unwrap();

    let thread = build_thread(db.conn(), post_id).unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].comment.content, "Nice post!");
    assert!(thread[0].replies.is_empty());
}

#[test]
fn forged_status_is_ignored() {
    let (db, _dir) = test_db();
    let post_id = published_post(&db, "Hello");

    let forged: CommentSubmission = serde_json::from_value(serde_json::json!({
        "content": "Approve me",
        "author_name": "Eve",
        "author_email": "eve@example.com",
        "status": "approved"
    }))
    .unwrap();

    let comment = submit(&db, post_id, &forged).unwrap();
    assert_eq!(comment.status, CommentStatus::Pending);
}

#[test]
fn reply_to_comment_on_other_post_is_rejected_without_storing() {
    let (db, _dir) = test_db();
    let first = published_post(&db, "First");
    let second = published_post(&db, "Second");
    let parent = submit(&db, first, &submission("Over here", None)).unwrap();

    let err = submit(&db, second, &submission("Wrong post", Some(parent.id))).unwrap_err();

    match err {
        Error::Validation(errors) => assert!(errors.has_field("parent_id")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(db::comment_stats(db.conn()).unwrap().total, 1);
}

#[test]
fn submission_to_unknown_or_draft_post_fails() {
    let (db, _dir) = test_db();
    let draft = db::create_post(
        db.conn(),
        &PostCreate {
            title: "Draft".to_string(),
            author: "admin".to_string(),
            ..Default::default()
        },
    )
    .unwrap();

    assert!(matches!(
        submit(&db, 999, &submission("hi", None)).unwrap_err(),
        Error::PostNotFound(_)
    ));
    assert!(matches!(
        submit(&db, draft.id, &submission("hi", None)).unwrap_err(),
        Error::PostNotPublished(id) if id == draft.id
    ));
}

#[test]
fn stored_comment_round_trips_through_store() {
    let (db, _dir) = test_db();
    let post_id = published_post(&db, "Hello");
    let mut s = submission("  padded  ", None);
    s.author_website = Some("https://ann.example.com".to_string());
    let ctx = RequestContext {
        ip_address: Some("198.51.100.7".to_string()),
        user_agent: Some("Mozilla/5.0".to_string()),
    };

    let created =
        submit_comment(db.conn(), post_id, &s, &ctx, &SubmissionConfig::default()).unwrap();
    let fetched = db::find_comment(db.conn(), created.id).unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched.content, "padded");
    assert_eq!(fetched.ip_address.as_deref(), Some("198.51.100.7"));
    assert_eq!(fetched.user_agent.as_deref(), Some("Mozilla/5.0"));
}

#[test]
fn configured_limits_apply_to_submissions() {
    let (db, _dir) = test_db();
    let post_id = published_post(&db, "Hello");
    let config = Config::from_toml("[submission]\nmax_content_length = 10\n").unwrap();

    let err = submit_comment(
        db.conn(),
        post_id,
        &submission("this is far too long", None),
        &RequestContext::default(),
        &config.submission,
    )
    .unwrap_err();

    match err {
        Error::Validation(errors) => {
            assert_eq!(
                errors.messages_for("content"),
                vec!["Comment cannot exceed 10 characters."]
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn deleting_post_removes_all_its_comments() {
    let (db, _dir) = test_db();
    let doomed = published_post(&db, "Doomed");
    let kept = published_post(&db, "Kept");
    let root = submit(&db, doomed, &submission("root", None)).unwrap();
    submit(&db, doomed, &submission("reply", Some(root.id))).unwrap();
    submit(&db, kept, &submission("survivor", None)).unwrap();

    let removed = db::delete_post(db.conn(), doomed).unwrap();

    assert_eq!(removed, 2);
    assert!(db::get_comment(db.conn(), root.id).unwrap().is_none());
    assert_eq!(db::comment_stats(db.conn()).unwrap().total, 1);
}

#[test]
fn destroying_comment_removes_descendants_only() {
    let (db, _dir) = test_db();
    let post_id = published_post(&db, "Hello");
    let admin = Actor::admin("admin");
    let root = submit(&db, post_id, &submission("root", None)).unwrap();
    let child = submit(&db, post_id, &submission("child", Some(root.id))).unwrap();
    submit(&db, post_id, &submission("grandchild", Some(child.id))).unwrap();
    let sibling = submit(&db, post_id, &submission("sibling", None)).unwrap();

    let removed = moderation::destroy(db.conn(), &admin, child.id).unwrap();

    assert_eq!(removed, 2);
    assert!(db::get_comment(db.conn(), root.id).unwrap().is_some());
    assert!(db::get_comment(db.conn(), sibling.id).unwrap().is_some());
    assert_eq!(db::comment_stats(db.conn()).unwrap().total, 2);
}

#[test]
fn only_owner_or_admin_moderates() {
    let (db, _dir) = test_db();
    let post = db::create_post(
        db.conn(),
        &PostCreate {
            title: "Olivia writes".to_string(),
            author: "olivia".to_string(),
            publish: true,
            ..Default::default()
        },
    )
    .unwrap();
    let comment = submit(&db, post.id, &submission("hi", None)).unwrap();
    let config = Config::default();

    let stranger = Actor::from_config("mallory", &config);
    assert!(matches!(
        moderation::approve(db.conn(), &stranger, comment.id).unwrap_err(),
        Error::Forbidden { .. }
    ));

    let owner = Actor::from_config("olivia", &config);
    let approved = moderation::approve(db.conn(), &owner, comment.id).unwrap();
    assert_eq!(approved.status, CommentStatus::Approved);

    let admin = Actor::from_config("admin", &config);
    let rejected = moderation::reject(db.conn(), &admin, comment.id).unwrap();
    assert_eq!(rejected.status, CommentStatus::Rejected);
}

#[test]
fn rejected_parent_hides_its_approved_replies() {
    let (db, _dir) = test_db();
    let post_id = published_post(&db, "Hello");
    let admin = Actor::admin("admin");
    let root = submit(&db, post_id, &submission("root", None)).unwrap();
    let reply = submit(&db, post_id, &submission("reply", Some(root.id))).unwrap();

    moderation::approve(db.conn(), &admin, root.id).unwrap();
    moderation::approve(db.conn(), &admin, reply.id).unwrap();
    assert_eq!(build_thread(db.conn(), post_id).unwrap()[0].replies.len(), 1);

    moderation::reject(db.conn(), &admin, root.id).unwrap();
    assert!(build_thread(db.conn(), post_id).unwrap().is_empty());
}
