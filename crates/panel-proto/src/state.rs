//! Now-playing and volume state shared between the poller and the renderer.

use serde::{Deserialize, Serialize};

/// Which backend is authoritative for the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Source {
    #[default]
    None,
    Mpd,
    Spotify,
}

impl Source {
    /// Short label for the corner badge.
    pub fn badge_label(self) -> Option<&'static str> {
        match self {
            Source::None => None,
            Source::Mpd => Some("MPD"),
            Source::Spotify => Some("SPOTIFY"),
        }
    }

    /// Spotify sessions own their volume on the phone side.
    pub fn shows_volume_controls(self) -> bool {
        self != Source::Spotify
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub track: String,
    pub artist: String,
    pub album: String,
    /// Seconds; 0 when unknown (radio streams, Spotify without duration).
    pub duration: u32,
    /// Seconds; Spotify never reports it.
    pub elapsed: u32,
    pub playing: bool,
    pub source: Source,
    pub album_art_url: Option<String>,
}

impl PlaybackState {
    /// The empty "No Track Playing" state.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.track.is_empty()
    }

    /// Identity used to detect a track change between polls.
    pub fn track_key(&self) -> String {
        format!("{}-{}", self.artist, self.track)
    }

    /// Fraction of the track played, 0.0 when the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration == 0 {
            return 0.0;
        }
        (self.elapsed as f64 / self.duration as f64).clamp(0.0, 1.0)
    }
}

/// Mixer level as remembered by the panel.
///
/// `muted` is local bookkeeping: the player tool only knows the effective
/// level, so a muted panel shows 0 on the tool while `level` keeps the value
/// to restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeState {
    pub level: u8,
    pub muted: bool,
}

/// `m:ss`, as shown under the progress bar.
pub fn fmt_clock(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
