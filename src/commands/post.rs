use remark::db;
use remark::error::Result;
use remark::models::{PostCreate, PostStatus};
use remark::moderation::{self, Actor};
use remark::output::format_timestamp;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{confirm, open};
use crate::{PostCreateArgs, PostDeleteArgs, PostListArgs, PostRefArgs};

#[derive(Tabled)]
struct PostRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "SLUG")]
    slug: String,
    #[tabled(rename = "AUTHOR")]
    author: String,
    #[tabled(rename = "TITLE")]
    title: String,
}

pub fn create(as_name: &str, args: PostCreateArgs) -> Result<()> {
    let (db, config) = open()?;
    let actor = Actor::from_config(as_name, &config);

    // Only admins may create posts on someone else's behalf
    let author = args.author.unwrap_or_else(|| actor.name.clone());
    if author != actor.name {
        moderation::require_admin(&actor)?;
    }

    let create = PostCreate {
        title: args.title,
        slug: args.slug,
        author,
        publish: args.publish,
    };

    let post = db::create_post(db.conn(), &create)?;
    println!("Created post #{} ({}) [{}]", post.id, post.slug, post.status);
    Ok(())
}

pub fn list(as_name: &str, args: PostListArgs) -> Result<()> {
    let (db, config) = open()?;
    let actor = Actor::from_config(as_name, &config);

    // Drafts and archived posts are visible to their author and admins
    let posts: Vec<_> = db::list_posts(db.conn())?
        .into_iter()
        .filter(|p| actor.is_admin() || p.author == actor.name || p.is_published())
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
    } else if posts.is_empty() {
        println!("No posts found");
    } else {
        let rows = posts.iter().map(|p| PostRow {
            id: format!("#{}", p.id),
            status: p.status.to_string(),
            slug: p.slug.clone(),
            author: p.author.clone(),
            title: p.title.clone(),
        });
        println!("{}", Table::new(rows).with(Style::psql()));
    }

    Ok(())
}

pub fn publish(as_name: &str, args: PostRefArgs) -> Result<()> {
    set_status(as_name, &args.post, PostStatus::Published)
}

pub fn archive(as_name: &str, args: PostRefArgs) -> Result<()> {
    set_status(as_name, &args.post, PostStatus::Archived)
}

fn set_status(as_name: &str, key: &str, status: PostStatus) -> Result<()> {
    let (db, config) = open()?;
    let post = db::find_post(db.conn(), key)?;
    moderation::authorize_post(db.conn(), &Actor::from_config(as_name, &config), post.id)?;
    let post = db::set_post_status(db.conn(), post.id, status)?;

    match post.published_at {
        Some(at) if post.status == PostStatus::Published => {
            println!("Published post #{} ({})", post.id, format_timestamp(at))
        }
        _ => println!("Post #{} is now {}", post.id, post.status),
    }
    Ok(())
}

pub fn delete(as_name: &str, args: PostDeleteArgs) -> Result<()> {
    let (db, config) = open()?;
    let post = db::find_post(db.conn(), &args.post)?;
    moderation::authorize_post(db.conn(), &Actor::from_config(as_name, &config), post.id)?;

    if !args.yes && !confirm(&format!("Delete post #{} and all of its comments?", post.id))? {
        println!("Cancelled");
        return Ok(());
    }

    let removed = db::delete_post(db.conn(), post.id)?;
    let plural = if removed == 1 { "" } else { "s" };
    println!(
        "Deleted post #{} ({} comment{} removed)",
        post.id, removed, plural
    );
    Ok(())
}
