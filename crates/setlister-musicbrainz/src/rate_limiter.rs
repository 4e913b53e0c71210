// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::trace;

/// Spaces out MusicBrainz requests.
///
/// Anonymous clients get one request per second. Callers queue on the time
/// the next request may start, which clones share.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Wait for the next request slot and reserve the one after it.
    pub async fn acquire(&self) {
        let mut next_slot = self.next_slot.lock().await;

        if let Some(slot) = *next_slot {
            let now = Instant::now();
            if slot > now {
                trace!(target: "musicbrainz", wait = ?(slot - now), "rate limited");
                sleep_until(slot).await;
            }
        }

        *next_slot = Some(Instant::now() + self.min_interval);
    }
}
