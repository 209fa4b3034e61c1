pub mod comment;
pub mod init;
pub mod post;
pub mod thread;

use remark::db::RemarkDb;
use remark::error::Result;
use remark::Config;

/// Open the repository above cwd together with its configuration
fn open() -> Result<(RemarkDb, Config)> {
    let db = RemarkDb::open()?;
    let config = Config::load(db.dir())?;
    Ok((db, config))
}

/// Ask on stderr; anything but "y" cancels
fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{} [y/N] ", prompt);
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
