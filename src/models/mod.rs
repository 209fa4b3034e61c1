mod comment;
mod post;

pub use comment::{
    Comment, CommentFilter, CommentNode, CommentStats, CommentStatus, NewComment, PublicComment,
    SortOrder,
};
pub use post::{slugify, Post, PostCreate, PostStatus};
