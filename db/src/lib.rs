pub mod filters;
pub mod models;
pub mod repositories;
pub mod test_utils;

use sea_orm::{Database, DatabaseConnection, DbErr};
use std::path::Path;

/// Opens a connection from a DSN, or from a bare SQLite file path.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let url = if database_url.starts_with("sqlite:")
        || database_url.starts_with("postgres://")
        || database_url.starts_with("mysql://")
    {
        database_url.to_string()
    } else {
        // SQLite won't create intermediate directories itself.
        if let Some(parent) = Path::new(database_url).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        format!("sqlite://{database_url}?mode=rwc")
    };

    let conn = Database::connect(&url).await?;
    log::debug!("database connection established");
    Ok(conn)
}
