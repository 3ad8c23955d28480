//! Parsers for `mpc` text output.
//!
//! `mpc status` looks like:
//!
//! ```text
//! Artist - Title
//! [playing] #3/12   1:02/4:05 (25%)
//! volume: 75%   repeat: off   random: off   single: off   consume: off
//! ```
//!
//! Radio streams omit the `#n/m` position and usually the time pair.

use std::sync::OnceLock;

use regex::Regex;

use crate::state::{PlaybackState, Source};

/// Format string for `mpc current -f`.
pub const CURRENT_FORMAT: &str = "%artist%|||%title%|||%album%|||%time%";
pub const CURRENT_SEPARATOR: &str = "|||";

/// Marker mpc prints while a song is playing.
pub const PLAYING_MARKER: &str = "[playing]";
pub const PAUSED_MARKER: &str = "[paused]";

/// Minimum number of non-empty fields for the formatted output to be trusted.
const MIN_USABLE_FIELDS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpdState {
    Playing,
    Paused,
    Stopped,
}

impl MpdState {
    pub fn is_active(self) -> bool {
        self != MpdState::Stopped
    }
}

pub fn parse_state(status: &str) -> MpdState {
    if status.contains(PLAYING_MARKER) {
        MpdState::Playing
    } else if status.contains(PAUSED_MARKER) {
        MpdState::Paused
    } else {
        MpdState::Stopped
    }
}

/// Track metadata recovered from `mpc current`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackFields {
    pub artist: String,
    pub title: String,
    pub album: String,
    pub duration: u32,
}

impl TrackFields {
    pub fn into_playback(self, state: MpdState, elapsed: u32) -> PlaybackState {
        PlaybackState {
            track: self.title,
            artist: self.artist,
            album: self.album,
            duration: self.duration,
            elapsed,
            playing: state == MpdState::Playing,
            source: Source::Mpd,
            album_art_url: None,
        }
    }
}

/// Parse `mpc current -f CURRENT_FORMAT` output.
///
/// Returns `None` when fewer than two fields carry data or when both artist
/// and title are blank; the caller then falls back to the plain form.
pub fn parse_formatted_current(output: &str) -> Option<TrackFields> {
    let line = output.trim();
    if line.is_empty() {
        return None;
    }

    let parts: Vec<&str> = line.split(CURRENT_SEPARATOR).collect();
    let usable = parts.iter().filter(|p| !p.trim().is_empty()).count();
    if parts.len() < 2 || usable < MIN_USABLE_FIELDS {
        return None;
    }

    let fields = TrackFields {
        artist: parts[0].trim().to_string(),
        title: parts[1].trim().to_string(),
        album: parts.get(2).map(|s| s.trim().to_string()).unwrap_or_default(),
        duration: parts.get(3).and_then(|t| parse_clock(t)).unwrap_or(0),
    };
    if fields.artist.is_empty() && fields.title.is_empty() {
        return None;
    }
    Some(fields)
}

/// Parse plain `mpc current` output.
///
/// Streams usually expose `Artist - Title`; some only a station name, which
/// then becomes the title.
pub fn parse_plain_current(output: &str) -> Option<TrackFields> {
    let line = output.trim();
    if line.is_empty() {
        return None;
    }

    let (artist, title) = match line.split_once(" - ") {
        Some((artist, title)) => (artist.trim().to_string(), title.trim().to_string()),
        None => (String::new(), line.to_string()),
    };

    Some(TrackFields {
        artist,
        title,
        album: String::new(),
        duration: 0,
    })
}

/// `m:ss` or `h:mm:ss` to seconds.
pub fn parse_clock(text: &str) -> Option<u32> {
    let text = text.trim();
    if !text.contains(':') {
        return None;
    }
    text.split(':').try_fold(0u32, |acc, part| {
        let n: u32 = part.parse().ok()?;
        acc.checked_mul(60)?.checked_add(n)
    })
}

fn progress_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+):(\d+)/(\d+):(\d+)").expect("static regex"))
}

fn volume_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"volume:\s*(\d+)%").expect("static regex"))
}

/// `(elapsed, total)` seconds from the `m:ss/m:ss` pair in `mpc status`.
pub fn parse_progress(status: &str) -> Option<(u32, u32)> {
    let caps = progress_re().captures(status)?;
    let num = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
    let elapsed = num(1)? * 60 + num(2)?;
    let total = num(3)? * 60 + num(4)?;
    Some((elapsed, total))
}

/// Level from `volume: N%`; `None` for `volume: n/a` or unexpected text.
pub fn parse_volume(output: &str) -> Option<u8> {
    let caps = volume_re().captures(output)?;
    let level: u32 = caps.get(1)?.as_str().parse().ok()?;
    Some(level.min(100) as u8)
}
