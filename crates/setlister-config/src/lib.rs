// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    pub database_url: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://setlister.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlaylistConfig {
    /// Directory playlists are written to. `~` is expanded.
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetlistFmConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SetlistFmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicBrainzConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub rate_limit_ms: u64,
    pub search_limit: u32,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
            rate_limit_ms: 1000,
            search_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Maximum distance accepted for a MusicBrainz candidate.
    pub threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self { threshold: 0.2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub library: LibraryConfig,
    pub playlist: PlaylistConfig,
    pub setlistfm: SetlistFmConfig,
    pub musicbrainz: MusicBrainzConfig,
    pub matching: MatchingConfig,
    pub telemetry: TelemetryConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: SETLISTER_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("SETLISTER_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}
