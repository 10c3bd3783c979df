mod db;
mod models;
mod run;

use anyhow::{Context, Result};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let db_path = get_db_path()?;
    let db = db::Database::open(&db_path)?;

    if args.len() < 2 {
        run::print_usage();
        return Ok(());
    }
    run::as_cli(&args, &db)
}

fn get_db_path() -> Result<std::path::PathBuf> {
    // Point HOMEBUDGET_DB at an existing budget file to use it instead
    if let Ok(path) = std::env::var("HOMEBUDGET_DB") {
        return Ok(std::path::PathBuf::from(path));
    }
    let proj_dirs = directories::ProjectDirs::from("com", "homebudget", "HomeBudget")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("homebudget.db"))
}
