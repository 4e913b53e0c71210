// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Result;
use setlister_domain::{LibraryQuery, LibraryTrack};

/// Access to the local music library.
///
/// Matching only ever calls [`LibraryRepository::query`]; the write
/// operations exist for library import.
#[async_trait::async_trait]
pub trait LibraryRepository: Send + Sync {
    /// All tracks matching `query`, in insertion order.
    async fn query(&self, query: &LibraryQuery) -> Result<Vec<LibraryTrack>>;

    /// Insert a track, or update the existing track stored at the same path.
    /// Returns the stored track (with the id already in the library, if any).
    async fn upsert(&self, track: LibraryTrack) -> Result<LibraryTrack>;

    async fn count(&self) -> Result<i64>;
}
