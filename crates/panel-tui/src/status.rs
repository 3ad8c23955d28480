//! Status probes and the source arbiter.
//!
//! Each poll cycle asks two independent questions: is the Spotify bridge
//! reporting a track, and is MPD playing something. `resolve` turns the two
//! answers into the one `PlaybackState` the panel shows.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use panel_proto::mpc::{self, MpdState};
use panel_proto::spotmeta::{self, SpotMetaError};
use panel_proto::state::{PlaybackState, Source};

use crate::player::{PlayerControl, PlayerError};

/// Why a probe reported no playback.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("metadata file unreadable: {0}")]
    MetadataRead(#[from] std::io::Error),
    #[error(transparent)]
    Spotify(#[from] SpotMetaError),
    #[error(transparent)]
    Player(#[from] PlayerError),
    #[error("mpc failed: {0}")]
    ToolFailed(String),
    #[error("mpd is stopped")]
    Stopped,
    #[error("mpd reports no current song")]
    NoCurrent,
}

/// Read and parse the Spotify bridge's metadata file.
pub async fn probe_spotify(path: &Path) -> Result<PlaybackState, ProbeError> {
    let content = tokio::fs::read_to_string(path).await?;
    let meta = spotmeta::parse(&content)?;
    Ok(meta.to_playback())
}

/// Full MPD probe: `mpc status`, then the current song.
pub async fn probe_mpd(player: &dyn PlayerControl) -> Result<PlaybackState, ProbeError> {
    let status = player.status().await?;
    if status.is_error() {
        return Err(ProbeError::ToolFailed(status.stderr.trim().to_string()));
    }
    probe_mpd_with_status(player, &status.stdout).await
}

/// MPD probe reusing `mpc status` text the caller already fetched.
pub async fn probe_mpd_with_status(
    player: &dyn PlayerControl,
    status: &str,
) -> Result<PlaybackState, ProbeError> {
    let state = mpc::parse_state(status);
    if !state.is_active() {
        return Err(ProbeError::Stopped);
    }

    let formatted = player.current_formatted().await?;
    let fields = match mpc::parse_formatted_current(&formatted.stdout) {
        Some(fields) => fields,
        None => {
            let plain = player.current().await?;
            mpc::parse_plain_current(&plain.stdout).ok_or(ProbeError::NoCurrent)?
        }
    };

    let elapsed = mpc::parse_progress(status)
        .map(|(elapsed, _)| elapsed)
        .unwrap_or(0);
    Ok(fields.into_playback(state, elapsed))
}

/// Which source the panel follows.
///
/// A valid Spotify record loses to MPD actively playing: the bridge leaves
/// its last record behind when the session moves on, so MPD playback means
/// that record is stale.
pub fn prefer_source(spotify_active: bool, mpd: MpdState) -> Source {
    match (spotify_active, mpd) {
        (_, MpdState::Playing) => Source::Mpd,
        (true, _) => Source::Spotify,
        (false, MpdState::Paused) => Source::Mpd,
        (false, MpdState::Stopped) => Source::None,
    }
}

/// One arbitration pass.
///
/// A player failure while Spotify is active escapes so the poll loop backs
/// off; without Spotify it only means MPD has nothing to report.
pub async fn resolve(
    player: &dyn PlayerControl,
    metadata_file: &Path,
) -> Result<PlaybackState, PlayerError> {
    let spotify = match probe_spotify(metadata_file).await {
        Ok(state) => {
            debug!("spotify probe: {} - {}", state.artist, state.track);
            state
        }
        Err(e) => {
            debug!("spotify probe inactive: {}", e);
            return Ok(match probe_mpd(player).await {
                Ok(state) => {
                    debug!("mpd probe: {} - {}", state.artist, state.track);
                    state
                }
                Err(e) => {
                    debug!("mpd probe inactive: {}", e);
                    PlaybackState::idle()
                }
            });
        }
    };

    let status = player.status().await?;
    let mpd_state = if status.is_error() {
        MpdState::Stopped
    } else {
        mpc::parse_state(&status.stdout)
    };
    match prefer_source(true, mpd_state) {
        Source::Mpd => {
            debug!("arbiter: mpd playing, spotify record is stale");
            match probe_mpd_with_status(player, &status.stdout).await {
                Ok(state) => Ok(state),
                Err(e) => {
                    debug!("mpd probe failed, clearing: {}", e);
                    Ok(PlaybackState::idle())
                }
            }
        }
        _ => Ok(spotify),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use panel_proto::mpc::CURRENT_FORMAT;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::player::fake::FakePlayer;
    use crate::player::CommandOutput;

    const SPOT: &str = "Song~~~Artist1\nArtist2~~~Album~~~210000~~~http://x/img1.jpg\nhttp://x/img2.jpg~~~mp3";
    const STATUS_PLAYING: &str =
        "Daft Punk - Veridis Quo\n[playing] #3/12   1:02/5:45 (18%)\nvolume: 75%\n";
    const STATUS_PAUSED: &str =
        "Daft Punk - Veridis Quo\n[paused] #3/12   1:02/5:45 (18%)\nvolume: 75%\n";
    const STATUS_STOPPED: &str = "volume: 75%   repeat: off\n";

    fn formatted_key() -> String {
        format!("current -f {}", CURRENT_FORMAT)
    }

    fn meta_file(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn playing_mpd_beats_spotify() {
        assert_eq!(prefer_source(true, MpdState::Playing), Source::Mpd);
        assert_eq!(prefer_source(true, MpdState::Paused), Source::Spotify);
        assert_eq!(prefer_source(true, MpdState::Stopped), Source::Spotify);
        assert_eq!(prefer_source(false, MpdState::Playing), Source::Mpd);
        assert_eq!(prefer_source(false, MpdState::Paused), Source::Mpd);
        assert_eq!(prefer_source(false, MpdState::Stopped), Source::None);
    }

    #[tokio::test]
    async fn spotify_probe_reads_file() {
        let f = meta_file(SPOT);
        let state = probe_spotify(f.path()).await.unwrap();
        assert_eq!(state.track, "Song");
        assert_eq!(state.source, Source::Spotify);

        let f = meta_file("null");
        assert!(matches!(
            probe_spotify(f.path()).await,
            Err(ProbeError::Spotify(SpotMetaError::Null))
        ));
        assert!(matches!(
            probe_spotify(Path::new("/nonexistent/spotmeta.txt")).await,
            Err(ProbeError::MetadataRead(_))
        ));
    }

    #[tokio::test]
    async fn mpd_probe_uses_formatted_current() {
        let player = FakePlayer::new();
        player
            .respond("status", STATUS_PLAYING)
            .respond(&formatted_key(), "Daft Punk|||Veridis Quo|||Discovery|||5:45\n");
        let state = probe_mpd(&player).await.unwrap();
        assert_eq!(state.artist, "Daft Punk");
        assert_eq!(state.track, "Veridis Quo");
        assert_eq!(state.album, "Discovery");
        assert_eq!(state.duration, 345);
        assert_eq!(state.elapsed, 62);
        assert!(state.playing);
        assert_eq!(state.source, Source::Mpd);
        assert!(!player.calls().contains(&"current".to_string()));
    }

    #[tokio::test]
    async fn mpd_probe_falls_back_to_plain_current() {
        let player = FakePlayer::new();
        player
            .respond("status", STATUS_PAUSED)
            .respond(&formatted_key(), "|||||||||\n")
            .respond("current", "My Station\n");
        let state = probe_mpd(&player).await.unwrap();
        assert_eq!(state.artist, "");
        assert_eq!(state.track, "My Station");
        assert!(!state.playing);
    }

    #[tokio::test]
    async fn mpd_probe_stopped_or_failing() {
        let player = FakePlayer::new();
        player.respond("status", STATUS_STOPPED);
        assert!(matches!(probe_mpd(&player).await, Err(ProbeError::Stopped)));

        let player = FakePlayer::new();
        player.respond_with("status", CommandOutput::failed("mpd error: Connection refused"));
        assert!(matches!(
            probe_mpd(&player).await,
            Err(ProbeError::ToolFailed(_))
        ));

        let player = FakePlayer::new();
        player.respond("status", STATUS_PLAYING);
        assert!(matches!(probe_mpd(&player).await, Err(ProbeError::NoCurrent)));
    }

    #[tokio::test]
    async fn resolve_prefers_playing_mpd_over_valid_spotify() {
        let f = meta_file(SPOT);
        let player = FakePlayer::new();
        player
            .respond("status", STATUS_PLAYING)
            .respond(&formatted_key(), "Daft Punk|||Veridis Quo|||Discovery|||5:45");
        let state = resolve(&player, f.path()).await.unwrap();
        assert_eq!(state.source, Source::Mpd);
        assert_eq!(state.track, "Veridis Quo");
    }

    #[tokio::test]
    async fn resolve_clears_stale_spotify_when_playing_mpd_has_no_song() {
        let f = meta_file(SPOT);
        let player = FakePlayer::new();
        player
            .respond("status", STATUS_PLAYING)
            .respond(&formatted_key(), "")
            .respond("current", "");
        let state = resolve(&player, f.path()).await.unwrap();
        assert_eq!(state.source, Source::None);
        assert!(state.is_idle());
        assert!(state.album_art_url.is_none());
    }

    #[tokio::test]
    async fn resolve_uses_spotify_when_mpd_idle() {
        let f = meta_file(SPOT);
        let player = FakePlayer::new();
        player.respond("status", STATUS_PAUSED);
        let state = resolve(&player, f.path()).await.unwrap();
        assert_eq!(state.source, Source::Spotify);
        assert_eq!(state.album_art_url.as_deref(), Some("http://x/img1.jpg"));
    }

    #[tokio::test]
    async fn resolve_clears_when_nothing_active() {
        let f = meta_file("null");
        let player = FakePlayer::new();
        player.respond("status", STATUS_STOPPED);
        let state = resolve(&player, f.path()).await.unwrap();
        assert!(state.is_idle());
        assert_eq!(state.source, Source::None);
    }

    #[tokio::test]
    async fn resolve_spawn_failure_escapes_only_with_spotify() {
        let player = FakePlayer::new();
        player.fail_spawn("status");

        let idle = meta_file("null");
        let state = resolve(&player, idle.path()).await.unwrap();
        assert!(state.is_idle());

        let active = meta_file(SPOT);
        assert!(resolve(&player, active.path()).await.is_err());
    }
}
