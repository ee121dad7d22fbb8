use common::{Config, logger::init_logger};
use log::info;
use migration::Migrator;
use std::{env, fs, path::Path};

mod runner;

#[tokio::main]
async fn main() {
    let config = Config::init(".env");
    init_logger(&config.log_level, &config.log_file);

    let url = normalize_url(&config.database_url);
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("clean") => {
            remove_db_file(&config.database_url);
        }
        Some("fresh") => {
            remove_db_file(&config.database_url);
            create_db_dir(&config.database_url);
            runner::run_all_migrations(&url).await;
        }
        _ => {
            create_db_dir(&config.database_url);
            runner::run_all_migrations(&url).await;
        }
    }
}

/// Accepts either a full DSN or a bare SQLite file path.
fn normalize_url(database_url: &str) -> String {
    if database_url.contains("://") || database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite://{}?mode=rwc", database_url)
    }
}

fn sqlite_file(database_url: &str) -> Option<&str> {
    if database_url.contains("://") || database_url.starts_with("sqlite:") {
        None
    } else {
        Some(database_url)
    }
}

fn remove_db_file(database_url: &str) {
    let Some(path) = sqlite_file(database_url) else {
        info!("Not a SQLite file database, nothing to clean");
        return;
    };

    let db_path = Path::new(path);
    if db_path.exists() {
        fs::remove_file(db_path).expect("Failed to delete DB file");
        info!("Deleted DB: {}", db_path.display());
    } else {
        info!("DB file does not exist: {}", db_path.display());
    }
}

fn create_db_dir(database_url: &str) {
    if let Some(path) = sqlite_file(database_url) {
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent).expect("Failed to create DB directory");
        }
    }
}
