pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod moderation;
pub mod output;
pub mod submission;
pub mod thread;

pub use config::Config;
pub use db::RemarkDb;
pub use error::{Error, FieldError, Result, ValidationErrors};
pub use models::{
    Comment, CommentFilter, CommentNode, CommentStats, CommentStatus, NewComment, Post,
    PostCreate, PostStatus, PublicComment, SortOrder,
};
pub use moderation::{Actor, Role};
pub use submission::{CommentSubmission, RequestContext, SubmissionValidator};
pub use thread::build_thread;
