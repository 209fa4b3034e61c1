use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use remark::Error;

mod commands;

/// remark - comment moderation for a blog
#[derive(Parser)]
#[command(name = "remark")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Identity performing moderation actions
    #[arg(long = "as", global = true, default_value = "admin")]
    actor: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new remark repository
    Init,
    /// Manage posts
    #[command(subcommand)]
    Post(PostCommands),
    /// Submit and moderate comments
    #[command(subcommand)]
    Comment(CommentCommands),
    /// Show the public comment thread of a post
    Thread(ThreadArgs),
}

#[derive(Subcommand)]
enum PostCommands {
    /// Create a new post
    Create(PostCreateArgs),
    /// List posts
    #[command(alias = "ls")]
    List(PostListArgs),
    /// Publish a post so readers can comment
    Publish(PostRefArgs),
    /// Archive a post
    Archive(PostRefArgs),
    /// Delete a post and all of its comments
    Delete(PostDeleteArgs),
}

#[derive(Args)]
struct PostCreateArgs {
    /// Post title
    #[arg(short, long)]
    title: String,

    /// URL slug (derived from the title by default)
    #[arg(short, long)]
    slug: Option<String>,

    /// Post author; may moderate the post's comments (defaults to --as)
    #[arg(short, long)]
    author: Option<String>,

    /// Publish immediately
    #[arg(short, long)]
    publish: bool,
}

#[derive(Args)]
struct PostListArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PostRefArgs {
    /// Post id or slug
    post: String,
}

#[derive(Args)]
struct PostDeleteArgs {
    /// Post id or slug
    post: String,

    /// Skip confirmation prompt
    #[arg(long)]
    yes: bool,
}

#[derive(Subcommand)]
enum CommentCommands {
    /// Submit a comment as a reader (held for moderation)
    Submit(CommentSubmitArgs),
    /// List comments for moderation
    #[command(alias = "ls")]
    List(CommentListArgs),
    /// View a comment with its post, parent and replies
    View(CommentViewArgs),
    /// Approve a comment
    Approve(CommentRefArgs),
    /// Reject a comment
    Reject(CommentRefArgs),
    /// Set a comment's status: pending, approved, rejected
    Status(CommentStatusArgs),
    /// Delete a comment and its replies
    Delete(CommentDeleteArgs),
    /// Show comment counts and recent activity
    Stats(CommentStatsArgs),
}

#[derive(Args)]
struct CommentSubmitArgs {
    /// Post id or slug
    post: String,

    /// Comment text
    #[arg(short, long)]
    content: Option<String>,

    /// Read comment text from file (- for stdin)
    #[arg(short = 'F', long = "content-file")]
    content_file: Option<String>,

    /// Your name
    #[arg(short, long)]
    name: String,

    /// Your email address
    #[arg(short, long)]
    email: String,

    /// Your website
    #[arg(short, long)]
    website: Option<String>,

    /// Reply to this comment id
    #[arg(short, long = "reply-to")]
    reply_to: Option<i64>,

    /// Client address recorded with the comment
    #[arg(long)]
    ip: Option<String>,

    /// Client user agent recorded with the comment
    #[arg(long = "user-agent")]
    user_agent: Option<String>,
}

#[derive(Args)]
struct CommentListArgs {
    /// Filter by status: pending, approved, rejected
    #[arg(short, long)]
    status: Option<String>,

    /// Filter by post id or slug
    #[arg(short, long)]
    post: Option<String>,

    /// Search content, author name and email
    #[arg(short = 'S', long)]
    search: Option<String>,

    /// Sort direction: asc, desc
    #[arg(long, default_value = "desc")]
    order: String,

    /// Page number, starting at 1
    #[arg(long, default_value = "1")]
    page: usize,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CommentViewArgs {
    /// Comment id
    id: i64,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CommentRefArgs {
    /// Comment id
    id: i64,
}

#[derive(Args)]
struct CommentStatusArgs {
    /// Comment id
    id: i64,

    /// New status: pending, approved, rejected
    status: String,
}

#[derive(Args)]
struct CommentDeleteArgs {
    /// Comment id
    id: i64,

    /// Skip confirmation prompt
    #[arg(long)]
    yes: bool,
}

#[derive(Args)]
struct CommentStatsArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ThreadArgs {
    /// Post id or slug
    post: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let actor = cli.actor;
    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Post(cmd) => match cmd {
            PostCommands::Create(args) => commands::post::create(&actor, args),
            PostCommands::List(args) => commands::post::list(&actor, args),
            PostCommands::Publish(args) => commands::post::publish(&actor, args),
            PostCommands::Archive(args) => commands::post::archive(&actor, args),
            PostCommands::Delete(args) => commands::post::delete(&actor, args),
        },
        Commands::Comment(cmd) => match cmd {
            CommentCommands::Submit(args) => commands::comment::submit(args),
            CommentCommands::List(args) => commands::comment::list(&actor, args),
            CommentCommands::View(args) => commands::comment::view(&actor, args),
            CommentCommands::Approve(args) => commands::comment::approve(&actor, args),
            CommentCommands::Reject(args) => commands::comment::reject(&actor, args),
            CommentCommands::Status(args) => commands::comment::status(&actor, args),
            CommentCommands::Delete(args) => commands::comment::delete(&actor, args),
            CommentCommands::Stats(args) => commands::comment::stats(&actor, args),
        },
        Commands::Thread(args) => commands::thread::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Validation(errors)) => {
            eprintln!("error: comment was not accepted");
            for e in errors.errors() {
                eprintln!("  {}: {}", e.field, e.message);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
