use colored::*;
use futures::FutureExt;
use sea_orm_migration::prelude::*;
use std::io::{self, Write};
use std::time::Instant;

const STATUS_COLUMN: usize = 72;

pub async fn run_all_migrations(url: &str) {
    let db = sea_orm::Database::connect(url)
        .await
        .expect("DB connection failed");

    let schema_manager = SchemaManager::new(&db);
    let migrations = <crate::Migrator as MigratorTrait>::migrations();

    println!("Applying {} migration(s)...", migrations.len());

    for migration in migrations {
        let label = format!("  {}", migration.name().bold());
        let dots = ".".repeat(STATUS_COLUMN.saturating_sub(label.len()));
        print!("{}{} ", label, dots);
        io::stdout().flush().unwrap();

        let start = Instant::now();
        let result = std::panic::AssertUnwindSafe(migration.up(&schema_manager))
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(())) => {
                let elapsed = format!("({:.2?})", start.elapsed()).dimmed();
                println!("{} {}", "ok".green(), elapsed);
            }
            Ok(Err(err)) => {
                println!("{} {}", "failed".red(), err);
                std::process::exit(1);
            }
            Err(_) => {
                println!("{}", "panicked".red());
                std::process::exit(1);
            }
        }
    }
}
