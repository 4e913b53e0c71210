// SPDX-License-Identifier: GPL-3.0-or-later

//! M3U playlist output.

use setlister_domain::LibraryTrack;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

pub const PLAYLIST_EXTENSION: &str = "m3u";

/// File name for a playlist labelled `label`.
///
/// Path separators, characters Windows rejects and control characters are
/// replaced with `_`.
pub fn playlist_file_name(label: &str) -> String {
    let sanitized: String = label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{sanitized}.{PLAYLIST_EXTENSION}")
}

/// Write `tracks` to `path`, one file path per line, in order.
///
/// The playlist is written to a sibling temporary file and renamed into place,
/// so an existing playlist is either fully replaced or left untouched.
pub fn save_playlist(path: &Path, tracks: &[LibraryTrack]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let result = write_lines(tmp_path, tracks).and_then(|()| fs::rename(tmp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(tmp_path);
    }
    result?;

    debug!(target: "playlist", path = %path.display(), tracks = tracks.len(), "playlist written");
    Ok(())
}

fn write_lines(path: &Path, tracks: &[LibraryTrack]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for track in tracks {
        writeln!(writer, "{}", track.path.display())?;
    }
    writer.flush()?;
    writer.get_ref().sync_all()
}
