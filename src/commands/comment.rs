use std::io::Read;

use remark::db;
use remark::error::Result;
use remark::models::{Comment, CommentFilter, CommentStatus, SortOrder};
use remark::moderation::{self, Actor};
use remark::output::{excerpt, format_timestamp, status_label};
use remark::submission::{self, CommentSubmission, RequestContext};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{confirm, open};
use crate::{
    CommentDeleteArgs, CommentListArgs, CommentRefArgs, CommentStatsArgs, CommentStatusArgs,
    CommentSubmitArgs, CommentViewArgs,
};

/// Read content from file or stdin (if path is "-")
fn read_content_from_file(path: &str) -> Result<String> {
    if path == "-" {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[derive(Tabled)]
struct CommentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "POST")]
    post: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "AUTHOR")]
    author: String,
    #[tabled(rename = "WHEN")]
    when: String,
    #[tabled(rename = "COMMENT")]
    content: String,
}

impl From<&Comment> for CommentRow {
    fn from(c: &Comment) -> Self {
        let id = match c.parent_id {
            Some(parent) => format!("#{} ↳#{}", c.id, parent),
            None => format!("#{}", c.id),
        };
        Self {
            id,
            post: format!("#{}", c.post_id),
            status: c.status.to_string(),
            author: c.author_name.clone(),
            when: format_timestamp(c.created_at),
            content: excerpt(&c.content, 50),
        }
    }
}

#[derive(Serialize)]
struct CommentView<'a> {
    #[serde(flatten)]
    comment: &'a Comment,
    post_title: String,
    parent: Option<Comment>,
    replies: Vec<Comment>,
}

pub fn submit(args: CommentSubmitArgs) -> Result<()> {
    let content = match (args.content, args.content_file) {
        (Some(c), _) => c,
        (None, Some(path)) => read_content_from_file(&path)?,
        (None, None) => String::new(),
    };

    let (db, config) = open()?;
    let post = db::find_post(db.conn(), &args.post)?;

    let submission = CommentSubmission {
        content,
        author_name: args.name,
        author_email: args.email,
        author_website: args.website,
        parent_id: args.reply_to,
        status: None,
    };
    let ctx = RequestContext {
        ip_address: args.ip,
        user_agent: args.user_agent,
    };

    let comment =
        submission::submit_comment(db.conn(), post.id, &submission, &ctx, &config.submission)?;
    println!(
        "Comment #{} submitted and is awaiting moderation",
        comment.id
    );
    Ok(())
}

pub fn list(as_name: &str, args: CommentListArgs) -> Result<()> {
    let (db, config) = open()?;
    let actor = actor(as_name, &config);

    let status = args
        .status
        .as_deref()
        .filter(|s| !s.eq_ignore_ascii_case("all"))
        .map(str::parse::<CommentStatus>)
        .transpose()?;

    let sort_order = match args.order.parse::<SortOrder>() {
        Ok(order) => order,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    // Authors may list their own post's comments; everything else is for admins
    let post_id = match &args.post {
        Some(key) => {
            let post = db::find_post(db.conn(), key)?;
            Some(moderation::authorize_post(db.conn(), &actor, post.id)?.id)
        }
        None => {
            moderation::require_admin(&actor)?;
            None
        }
    };

    let filter = CommentFilter {
        post_id,
        status,
        search: args.search,
        sort_order,
        limit: config.moderation.page_size,
        offset: 0,
    }
    .page(args.page.saturating_sub(1));

    let comments = db::list_comments(db.conn(), &filter)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&comments)?);
    } else if comments.is_empty() {
        println!("No comments found");
    } else {
        let rows = comments.iter().map(CommentRow::from);
        println!("{}", Table::new(rows).with(Style::psql()));
    }

    Ok(())
}

pub fn view(as_name: &str, args: CommentViewArgs) -> Result<()> {
    let (db, config) = open()?;
    let comment = moderation::authorize(db.conn(), &actor(as_name, &config), args.id)?;
    let post_title = db::get_post(db.conn(), comment.post_id)?
        .map(|p| p.title)
        .unwrap_or_default();
    let parent = match comment.parent_id {
        Some(id) => db::get_comment(db.conn(), id)?,
        None => None,
    };
    let replies = db::get_replies(db.conn(), comment.id)?;

    if args.json {
        let view = CommentView {
            comment: &comment,
            post_title,
            parent,
            replies,
        };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("#{} on post #{} {}", comment.id, comment.post_id, post_title);
    println!("Status: {}", status_label(comment.status));
    println!("Author: {} <{}>", comment.author_name, comment.author_email);
    if let Some(site) = &comment.author_website {
        println!("Website: {}", site);
    }
    if let Some(ip) = &comment.ip_address {
        println!("IP: {}", ip);
    }
    if let Some(ua) = &comment.user_agent {
        println!("User agent: {}", ua);
    }
    println!("Created: {}", format_timestamp(comment.created_at));
    if comment.updated_at != comment.created_at {
        println!("Updated: {}", format_timestamp(comment.updated_at));
    }
    if let Some(parent) = &parent {
        println!(
            "In reply to: #{} {}: {}",
            parent.id,
            parent.author_name,
            excerpt(&parent.content, 50)
        );
    }

    println!("\n{}", comment.content);

    if !replies.is_empty() {
        println!("\nReplies:");
        println!("{}", "-".repeat(40));
        for reply in &replies {
            println!(
                "#{} [{}] {}: {}",
                reply.id,
                status_label(reply.status),
                reply.author_name,
                excerpt(&reply.content, 50)
            );
        }
    }

    Ok(())
}

fn actor(name: &str, config: &remark::Config) -> Actor {
    Actor::from_config(name, config)
}

pub fn approve(as_name: &str, args: CommentRefArgs) -> Result<()> {
    let (db, config) = open()?;
    let comment = moderation::approve(db.conn(), &actor(as_name, &config), args.id)?;
    println!("Approved comment #{}", comment.id);
    Ok(())
}

pub fn reject(as_name: &str, args: CommentRefArgs) -> Result<()> {
    let (db, config) = open()?;
    let comment = moderation::reject(db.conn(), &actor(as_name, &config), args.id)?;
    println!("Rejected comment #{}", comment.id);
    Ok(())
}

pub fn status(as_name: &str, args: CommentStatusArgs) -> Result<()> {
    let (db, config) = open()?;
    let comment =
        moderation::set_status_named(db.conn(), &actor(as_name, &config), args.id, &args.status)?;
    println!("Comment #{} is now {}", comment.id, comment.status);
    Ok(())
}

pub fn delete(as_name: &str, args: CommentDeleteArgs) -> Result<()> {
    let (db, config) = open()?;
    let actor = actor(as_name, &config);
    moderation::authorize(db.conn(), &actor, args.id)?;

    if !args.yes && !confirm(&format!("Delete comment #{} and its replies?", args.id))? {
        println!("Cancelled");
        return Ok(());
    }

    let removed = moderation::destroy(db.conn(), &actor, args.id)?;
    let plural = if removed == 1 { "" } else { "s" };
    println!("Deleted {} comment{}", removed, plural);
    Ok(())
}

pub fn stats(as_name: &str, args: CommentStatsArgs) -> Result<()> {
    let (db, config) = open()?;
    moderation::require_admin(&actor(as_name, &config))?;
    let stats = db::comment_stats(db.conn())?;
    let recent = db::recent_comments(db.conn(), config.display.recent_limit)?;

    if args.json {
        let value = serde_json::json!({ "stats": stats, "recent": recent });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Total:    {}", stats.total);
    println!(
        "{}  {}",
        status_label(CommentStatus::Pending),
        stats.pending
    );
    println!(
        "{} {}",
        status_label(CommentStatus::Approved),
        stats.approved
    );
    println!(
        "{} {}",
        status_label(CommentStatus::Rejected),
        stats.rejected
    );

    if !recent.is_empty() {
        println!("\nRecent:");
        for c in &recent {
            println!(
                "#{} [{}] {} on post #{}, {}",
                c.id,
                c.status,
                c.author_name,
                c.post_id,
                format_timestamp(c.created_at)
            );
        }
    }

    Ok(())
}
