// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::{anyhow, Result};
use setlister_domain::{LibraryField, LibraryQuery, LibraryTrack, LibraryTrackId};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

use crate::repositories::LibraryRepository;

/// SQLx-backed library repository
pub struct SqliteLibraryRepository {
    pool: SqlitePool,
}

impl SqliteLibraryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LibraryRepository for SqliteLibraryRepository {
    async fn query(&self, query: &LibraryQuery) -> Result<Vec<LibraryTrack>> {
        let (clause, params) = build_where_clause(query);
        debug!(target: "repository", clause = %clause, ?params, "querying library");

        let sql = format!(
            "SELECT id, title, artist, album, path, mb_trackid FROM library_tracks WHERE {} ORDER BY rowid",
            clause
        );
        let mut q = sqlx::query(&sql);
        for param in params {
            q = q.bind(param);
        }

        let rows = q.fetch_all(&self.pool).await?;
        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(row_to_track(&r)?);
        }
        Ok(out)
    }

    async fn upsert(&self, track: LibraryTrack) -> Result<LibraryTrack> {
        let path = path_to_string(&track.path)?;
        debug!(target: "repository", track_id = %track.id, %path, "upserting library track");

        let q = r#"
            INSERT INTO library_tracks (id, title, artist, album, path, mb_trackid)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(path) DO UPDATE SET
                title = excluded.title,
                artist = excluded.artist,
                album = excluded.album,
                mb_trackid = excluded.mb_trackid
            RETURNING id, title, artist, album, path, mb_trackid
        "#;

        let row = sqlx::query(q)
            .bind(track.id.to_string())
            .bind(track.title.clone())
            .bind(track.artist.clone())
            .bind(track.album.clone())
            .bind(path)
            .bind(track.musicbrainz_track_id.clone())
            .fetch_one(&self.pool)
            .await?;
        row_to_track(&row)
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM library_tracks")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}

/// Translate a query expression into a parameterised `WHERE` clause.
fn build_where_clause(query: &LibraryQuery) -> (String, Vec<String>) {
    let mut params = Vec::new();
    let clause = push_clause(query, &mut params);
    (clause, params)
}

fn push_clause(query: &LibraryQuery, params: &mut Vec<String>) -> String {
    match query {
        LibraryQuery::FieldEquals(field, value) => {
            params.push(value.clone());
            format!("{} = ?", column(*field))
        }
        LibraryQuery::And(queries) => join_clauses(queries, " AND ", "1", params),
        LibraryQuery::Or(queries) => join_clauses(queries, " OR ", "0", params),
    }
}

fn join_clauses(
    queries: &[LibraryQuery],
    separator: &str,
    empty: &str,
    params: &mut Vec<String>,
) -> String {
    if queries.is_empty() {
        return empty.to_string();
    }
    let parts = queries
        .iter()
        .map(|q| push_clause(q, params))
        .collect::<Vec<_>>();
    format!("({})", parts.join(separator))
}

fn column(field: LibraryField) -> &'static str {
    match field {
        LibraryField::Title => "title",
        LibraryField::Artist => "artist",
        LibraryField::MusicBrainzTrackId => "mb_trackid",
    }
}

fn path_to_string(path: &std::path::Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("path is not valid UTF-8: {}", path.display()))
}

fn row_to_track(r: &SqliteRow) -> Result<LibraryTrack> {
    let id: String = r.try_get("id")?;
    let path: String = r.try_get("path")?;
    Ok(LibraryTrack {
        id: LibraryTrackId::from_uuid(Uuid::parse_str(&id)?),
        title: r.try_get("title")?,
        artist: r.try_get("artist")?,
        album: r.try_get("album")?,
        path: PathBuf::from(path),
        musicbrainz_track_id: r.try_get("mb_trackid")?,
    })
}
