mod config;
mod db;
mod error;
mod export;
mod import;
mod logging;
mod models;
mod normalize;
mod report;
mod run;
mod ui;

use anyhow::{Context, Result};
use tracing::info;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let dirs = config::AppDirs::discover()?;
    logging::init(&dirs.log_file());
    let settings = config::load_or_init(&dirs.config_file())?.resolve(&dirs);
    info!(database = %settings.database.display(), "starting");

    let mut db = db::Database::open(&settings.database, settings.busy_timeout).with_context(
        || format!("Failed to open database: {}", settings.database.display()),
    )?;

    match args.len() {
        1 => run::as_tui(&mut db, settings),
        2.. => run::as_cli(&args, &mut db, &settings),
        _ => {
            eprintln!("Usage: churchledger [command]");
            Ok(())
        }
    }
}
