use remark::db;
use remark::error::{Error, Result};
use remark::output::render_thread;
use remark::thread::{build_thread, thread_size};

use super::open;
use crate::ThreadArgs;

/// Print what readers see under a post
pub fn run(args: ThreadArgs) -> Result<()> {
    let (db, _) = open()?;
    let post = db::find_post(db.conn(), &args.post)?;
    if !post.is_published() {
        return Err(Error::PostNotPublished(post.id));
    }

    let thread = build_thread(db.conn(), post.id)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&thread)?);
    } else if thread.is_empty() {
        println!("{}\n\nNo comments yet", post.title);
    } else {
        let count = thread_size(&thread);
        let plural = if count == 1 { "" } else { "s" };
        println!("{} ({} comment{})\n", post.title, count, plural);
        print!("{}", render_thread(&thread));
    }

    Ok(())
}
