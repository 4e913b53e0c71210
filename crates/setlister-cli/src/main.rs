// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use setlister_application::{
    normalize_artist_name, validate_date, LibraryImportService, RunOutcome, RunReport,
    SetlisterService, SetlisterSettings,
};
use setlister_config::{load as load_config, AppConfig};
use setlister_infrastructure::{init_database, open_database, SqliteLibraryRepository};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "setlister")]
#[command(about = "Turn concert setlists into playlists of your own music")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "SETLISTER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a playlist for an artist's most recent setlist
    Playlist {
        /// Artist name; several words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        artist: Vec<String>,

        /// Concert date (dd-MM-yyyy)
        #[arg(short, long)]
        date: Option<String>,

        /// Open the playlist once it is written
        #[arg(short, long)]
        play: bool,
    },

    /// Scan a directory of audio files into the library
    Import {
        dir: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.telemetry.log_level);

    match cli.command {
        Command::Playlist { artist, date, play } => {
            match playlist(&config, &artist, date.as_deref(), play).await? {
                RunOutcome::NoSetlist => println!("Setlist not found"),
                RunOutcome::Completed(report) => print_report(&report),
            }
        }
        Command::Import { dir } => {
            let pool = init_database(&config).await?;
            let library = Arc::new(SqliteLibraryRepository::new(pool));
            let summary = LibraryImportService::new(library).import_directory(&dir).await?;
            println!(
                "Imported {} files, skipped {}",
                summary.imported, summary.skipped
            );
        }
    }

    info!(target: "cli", "done");
    Ok(())
}

/// Validate arguments and settings, then open the existing library and run.
/// Nothing touches the filesystem until the input has been accepted.
async fn playlist(
    config: &AppConfig,
    artist: &[String],
    date: Option<&str>,
    play: bool,
) -> Result<RunOutcome> {
    normalize_artist_name(artist)?;
    if let Some(date) = date {
        validate_date(date)?;
    }
    SetlisterSettings::from_config(config)?;

    let pool = open_database(config).await?;
    let library = Arc::new(SqliteLibraryRepository::new(pool));
    let service = SetlisterService::from_config(config, library)?;
    Ok(service.run(artist, date, play).await?)
}

fn init_tracing(default_level: &str) {
    let fmt_layer = fmt::layer().with_target(true).with_level(true);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_report(report: &RunReport) {
    println!("{}", report.setlist_name);
    println!(
        "{} found, {} not found",
        report.found.len(),
        report.missing.len()
    );
    for missing in &report.missing {
        println!("  missing: {} {}", missing.index, missing.name);
    }
    println!("Playlist: {}", report.playlist_path.display());
}
