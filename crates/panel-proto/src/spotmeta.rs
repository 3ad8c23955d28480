//! Parser for the Spotify-Connect bridge metadata file.
//!
//! The bridge writes one record per track change:
//!
//! ```text
//! title~~~artist1\nartist2~~~album~~~duration_ms~~~img_url1\nimg_url2~~~format
//! ```
//!
//! and the literal `null` when the session ends. The file is not touched
//! while a track plays, so there is no freshness check: a well-formed record
//! means Spotify is active.

use thiserror::Error;

use crate::state::{PlaybackState, Source};

pub const FIELD_DELIMITER: &str = "~~~";

/// Anything shorter than this cannot hold four delimited fields.
const MIN_CONTENT_CHARS: usize = 10;
const MIN_FIELDS: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpotMetaError {
    #[error("metadata file is empty")]
    Empty,
    #[error("metadata file holds the null sentinel")]
    Null,
    #[error("metadata too short ({0} chars)")]
    TooShort(usize),
    #[error("metadata incomplete ({0} fields)")]
    Incomplete(usize),
    #[error("metadata missing title or artist")]
    MissingTitleOrArtist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyMeta {
    pub title: String,
    pub artists: Vec<String>,
    pub album: String,
    pub duration_secs: u32,
    /// Largest first.
    pub image_urls: Vec<String>,
    pub format: Option<String>,
}

impl SpotifyMeta {
    pub fn artist(&self) -> &str {
        self.artists.first().map(String::as_str).unwrap_or_default()
    }

    pub fn album_art_url(&self) -> Option<&str> {
        self.image_urls.first().map(String::as_str)
    }

    /// Spotify reports no position, so elapsed stays at zero.
    pub fn to_playback(&self) -> PlaybackState {
        PlaybackState {
            track: self.title.clone(),
            artist: self.artist().to_string(),
            album: self.album.clone(),
            duration: self.duration_secs,
            elapsed: 0,
            playing: true,
            source: Source::Spotify,
            album_art_url: self.album_art_url().map(str::to_string),
        }
    }
}

pub fn parse(content: &str) -> Result<SpotifyMeta, SpotMetaError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(SpotMetaError::Empty);
    }
    if content == "null" {
        return Err(SpotMetaError::Null);
    }
    let chars = content.chars().count();
    if chars < MIN_CONTENT_CHARS {
        return Err(SpotMetaError::TooShort(chars));
    }

    let fields: Vec<&str> = content.split(FIELD_DELIMITER).collect();
    if fields.len() < MIN_FIELDS {
        return Err(SpotMetaError::Incomplete(fields.len()));
    }

    let (title, artists, album, duration) = (fields[0], fields[1], fields[2], fields[3]);
    if title.is_empty() || artists.is_empty() {
        return Err(SpotMetaError::MissingTitleOrArtist);
    }

    let image_urls = fields
        .get(4)
        .map(|urls| {
            urls.split('\n')
                .map(|u| u.trim().to_string())
                .take_while(|u| !u.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(SpotifyMeta {
        title: title.to_string(),
        artists: artists.split('\n').map(str::to_string).collect(),
        album: album.to_string(),
        duration_secs: duration
            .trim()
            .parse::<u64>()
            .map(|ms| (ms / 1000) as u32)
            .unwrap_or(0),
        image_urls,
        format: fields
            .get(5)
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty()),
    })
}
