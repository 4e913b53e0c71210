// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SetlistFmError>;

#[derive(Debug, Error)]
pub enum SetlistFmError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("setlist.fm API key is missing")]
    MissingApiKey,

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response from setlist.fm API: {0}")]
    InvalidResponse(String),
}
