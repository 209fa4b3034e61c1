use remark::db::RemarkDb;
use remark::error::Result;
use remark::Config;

pub fn run() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let db = RemarkDb::init(&cwd)?;
    Config::default().save(db.dir())?;
    println!(
        "Initialized empty remark repository in {}/.remark/",
        cwd.display()
    );
    Ok(())
}
