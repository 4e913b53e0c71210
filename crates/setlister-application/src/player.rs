// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::{Context, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::info;

/// Hands a written playlist to something that can play it.
#[async_trait::async_trait]
pub trait PlaylistPlayer: Send + Sync {
    async fn open(&self, playlist: &Path) -> Result<()>;
}

/// Opens playlists with the desktop's default handler for `.m3u` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPlayer;

#[async_trait::async_trait]
impl PlaylistPlayer for SystemPlayer {
    async fn open(&self, playlist: &Path) -> Result<()> {
        let mut command = open_command(playlist);
        info!(target: "player", path = %playlist.display(), "opening playlist");

        // The player outlives us; don't wait for it.
        command
            .spawn()
            .with_context(|| format!("failed to open {}", playlist.display()))?;
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn open_command(playlist: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(playlist);
    command
}

#[cfg(target_os = "windows")]
fn open_command(playlist: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(playlist);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn open_command(playlist: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(playlist);
    command
}
