// SPDX-License-Identifier: GPL-3.0-or-later

//! Where setlists come from.

use setlister_domain::SetlistInfo;
use setlister_setlistfm::{SetlistFmClient, SetlistFmError};

/// Source of concert setlists.
#[async_trait::async_trait]
pub trait SetlistSource: Send + Sync {
    /// Most recent setlist with songs for `artist_name`, optionally on `date`
    /// (`dd-MM-yyyy`). `Ok(None)` when the service knows no such setlist.
    async fn fetch_setlist(
        &self,
        artist_name: &str,
        date: Option<&str>,
    ) -> Result<Option<SetlistInfo>, SetlistFmError>;
}

#[async_trait::async_trait]
impl SetlistSource for SetlistFmClient {
    async fn fetch_setlist(
        &self,
        artist_name: &str,
        date: Option<&str>,
    ) -> Result<Option<SetlistInfo>, SetlistFmError> {
        SetlistFmClient::fetch_setlist(self, artist_name, date).await
    }
}
