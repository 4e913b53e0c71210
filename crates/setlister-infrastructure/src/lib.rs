// SPDX-License-Identifier: GPL-3.0-or-later
pub mod repositories;
pub mod sqlite_adapters;

pub use repositories::LibraryRepository;
pub use sqlite_adapters::SqliteLibraryRepository;

use anyhow::{bail, Result};
use setlister_config::AppConfig;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Open the library database, creating it and applying migrations as needed.
pub async fn init_database(config: &AppConfig) -> Result<SqlitePool> {
    info!(target: "infrastructure", "initializing library database");
    connect(config, OpenMode::Create).await
}

/// Open an existing library database.
///
/// Fails instead of creating an empty library when the file is missing, so a
/// mistyped path does not turn every lookup into a miss.
pub async fn open_database(config: &AppConfig) -> Result<SqlitePool> {
    info!(target: "infrastructure", "opening library database");
    connect(config, OpenMode::Existing).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenMode {
    Create,
    Existing,
}

async fn connect(config: &AppConfig, mode: OpenMode) -> Result<SqlitePool> {
    let db_url = normalize_sqlite_url(&config.library.database_url, mode)?;
    info!(target: "infrastructure", db_url = %db_url, "connecting to database");

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await?;

    info!(target: "infrastructure", db_url = %config.library.database_url, "running migrations");
    sqlx::migrate!("../../migrations").run(&pool).await?;

    info!(target: "infrastructure", "database initialized successfully");
    Ok(pool)
}

/// Make file-backed SQLite URLs absolute. In [`OpenMode::Create`] the parent
/// directory is created and SQLite may create the file; otherwise the file
/// must already exist.
fn normalize_sqlite_url(url: &str, mode: OpenMode) -> Result<String> {
    if !url.starts_with("sqlite://") || url.starts_with("sqlite://:memory:") {
        return Ok(url.to_string());
    }

    let db_path = url.trim_start_matches("sqlite://");
    let path = Path::new(db_path);

    match mode {
        OpenMode::Create => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                    info!(target: "infrastructure", path = %parent.display(), "created database directory");
                }
            }
        }
        OpenMode::Existing => {
            if !path.is_file() {
                bail!(
                    "library database {} does not exist, run `setlister import` first",
                    path.display()
                );
            }
        }
    }

    let absolute_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    // SQLite accepts forward slashes on all platforms
    let path_str = absolute_path.to_string_lossy().replace('\\', "/");
    let sqlite_mode = match mode {
        OpenMode::Create => "rwc",
        OpenMode::Existing => "rw",
    };
    Ok(format!("sqlite://{path_str}?mode={sqlite_mode}"))
}
