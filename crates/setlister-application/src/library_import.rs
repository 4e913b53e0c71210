// SPDX-License-Identifier: GPL-3.0-or-later

//! Import audio files into the library database.
//!
//! Files are discovered recursively (symlinks are not followed), their tags
//! read with lofty, and stored keyed by absolute path so re-importing a
//! directory updates existing records in place.

use lofty::file::TaggedFileExt;
use lofty::tag::{Accessor, ItemKey};
use setlister_domain::LibraryTrack;
use setlister_infrastructure::LibraryRepository;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum LibraryImportError {
    #[error("I/O error while scanning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read tags from {path}: {message}")]
    Tags { path: PathBuf, message: String },

    #[error("failed to store track: {0}")]
    Library(#[from] anyhow::Error),
}

pub type LibraryImportResult<T> = Result<T, LibraryImportError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Every supported audio file below `root`, sorted by path.
pub fn scan_audio_files(root: &Path) -> LibraryImportResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    visit_directory(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn visit_directory(directory: &Path, files: &mut Vec<PathBuf>) -> LibraryImportResult<()> {
    let io_error = |source: std::io::Error| LibraryImportError::Io {
        path: directory.to_path_buf(),
        source,
    };

    for entry in fs::read_dir(directory).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_error)?;

        if file_type.is_symlink() {
            continue;
        }

        if file_type.is_dir() {
            visit_directory(&path, files)?;
            continue;
        }

        let Some(extension) = path.extension().and_then(|ext| ext.to_str()) else {
            continue;
        };
        if is_audio_extension(&extension.to_ascii_lowercase()) {
            files.push(path);
        }
    }

    Ok(())
}

fn is_audio_extension(extension: &str) -> bool {
    matches!(
        extension,
        "mp3" | "flac" | "m4a" | "aac" | "ogg" | "opus" | "wav" | "wv" | "ape" | "dsf"
    )
}

/// Library record for one audio file.
///
/// Missing title tags fall back to the file stem; a missing artist is stored
/// as an empty string.
pub fn read_track(path: &Path) -> LibraryImportResult<LibraryTrack> {
    let tagged = lofty::read_from_path(path).map_err(|e| LibraryImportError::Tags {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let stem = || {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };

    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        return Ok(LibraryTrack::new(stem(), "", path));
    };

    let title = tag
        .title()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(stem);
    let artist = tag.artist().map(|a| a.trim().to_string()).unwrap_or_default();

    let mut track = LibraryTrack::new(title, artist, path);
    track.album = tag.album().map(|a| a.to_string()).filter(|a| !a.is_empty());
    track.musicbrainz_track_id = tag
        .get_string(&ItemKey::MusicBrainzRecordingId)
        .map(str::to_string)
        .filter(|id| !id.is_empty());
    Ok(track)
}

pub struct LibraryImportService {
    library: Arc<dyn LibraryRepository>,
}

impl LibraryImportService {
    pub fn new(library: Arc<dyn LibraryRepository>) -> Self {
        Self { library }
    }

    /// Import every audio file below `root`. Files whose tags cannot be read
    /// are skipped and counted.
    pub async fn import_directory(&self, root: &Path) -> LibraryImportResult<ImportSummary> {
        let root = root.canonicalize().map_err(|source| LibraryImportError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        info!(target: "import", root = %root.display(), "scanning library directory");

        let files = scan_audio_files(&root)?;
        let mut summary = ImportSummary::default();

        for path in files {
            match read_track(&path) {
                Ok(track) => {
                    let stored = self.library.upsert(track).await?;
                    debug!(
                        target: "import",
                        path = %stored.path.display(),
                        title = %stored.title,
                        artist = %stored.artist,
                        "imported"
                    );
                    summary.imported += 1;
                }
                Err(e) => {
                    warn!(target: "import", error = %e, "skipping file");
                    summary.skipped += 1;
                }
            }
        }

        info!(
            target: "import",
            imported = summary.imported,
            skipped = summary.skipped,
            "library import finished"
        );
        Ok(summary)
    }
}
