/// PanelCore — single-owner polling loop for everything the panel shows.
///
/// The core owns `PlaybackState`, the volume controller, the album-art
/// backdrop and the player handle; no other task touches them. The UI sends
/// `CoreEvent`s in and receives one `PanelSnapshot` after every poll cycle
/// and every handled event.
///
/// Errors escaping a poll cycle are logged and followed by a backoff pause;
/// nothing after startup is fatal.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use panel_proto::config::Config;
use panel_proto::state::{PlaybackState, Source, VolumeState};
use panel_proto::stations::Station;

use crate::album_art::{ArtLoader, Backdrop};
use crate::player::{CommandOutput, PlayerControl, PlayerError};
use crate::status;
use crate::volume::VolumeController;

// ── CoreEvent ─────────────────────────────────────────────────────────────────

/// User intents, executed between polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    TogglePlay,
    Next,
    Prev,
    VolumeUp,
    VolumeDown,
    ToggleMute,
    PlayStation(Station),
}

/// Copy of core-owned state handed to the UI.
#[derive(Debug, Clone, Default)]
pub struct PanelSnapshot {
    pub playback: PlaybackState,
    pub volume: VolumeState,
    pub backdrop: Option<Backdrop>,
}

// ── PanelCore ─────────────────────────────────────────────────────────────────

pub struct PanelCore {
    config: Config,
    player: Arc<dyn PlayerControl>,
    art: Option<ArtLoader>,
    playback: PlaybackState,
    volume: VolumeController,
    backdrop: Option<Backdrop>,
    /// Bumped for every new backdrop image.
    generation: u64,
    /// Track key of the last poll; art reloads only when it changes.
    last_track_key: Option<String>,
    /// Art downloads started since startup.
    art_attempts: u64,
    snapshot_tx: mpsc::Sender<PanelSnapshot>,
    running: Arc<AtomicBool>,
}

impl PanelCore {
    pub fn new(
        config: Config,
        player: Arc<dyn PlayerControl>,
        snapshot_tx: mpsc::Sender<PanelSnapshot>,
        running: Arc<AtomicBool>,
    ) -> Self {
        let art = match ArtLoader::new(&config.display) {
            Ok(loader) => Some(loader),
            Err(e) => {
                warn!("PanelCore: album art disabled: {}", e);
                None
            }
        };
        Self {
            config,
            player,
            art,
            playback: PlaybackState::idle(),
            volume: VolumeController::new(),
            backdrop: None,
            generation: 0,
            last_track_key: None,
            art_attempts: 0,
            snapshot_tx,
            running,
        }
    }

    pub async fn run(mut self, mut event_rx: mpsc::Receiver<CoreEvent>) -> anyhow::Result<()> {
        info!(
            "PanelCore: polling every {:?}",
            self.config.poll.interval()
        );

        let mut poll = tokio::time::interval(self.config.poll.interval());
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        while self.running.load(Ordering::SeqCst) {
            tokio::select! {
                _ = poll.tick() => {
                    if let Err(e) = self.poll_once().await {
                        error!("PanelCore: poll error: {}", e);
                        tokio::time::sleep(self.config.poll.backoff()).await;
                    }
                }

                evt = event_rx.recv() => match evt {
                    Some(evt) => self.handle_event(evt).await,
                    None => {
                        info!("PanelCore: event channel closed, shutting down");
                        break;
                    }
                },
            }

            if !self.publish() {
                info!("PanelCore: UI gone, shutting down");
                break;
            }
        }

        info!("PanelCore: stopped");
        Ok(())
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            playback: self.playback.clone(),
            volume: self.volume.state(),
            backdrop: self.backdrop.clone(),
        }
    }

    /// Hand the UI a fresh snapshot. A full queue drops it; the next cycle
    /// sends a newer one. Returns false once the UI side is closed.
    fn publish(&self) -> bool {
        match self.snapshot_tx.try_send(self.snapshot()) {
            Ok(()) | Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// One poll cycle: arbitrate the source, read the mixer, refresh art.
    pub async fn poll_once(&mut self) -> Result<(), PlayerError> {
        let playback =
            status::resolve(self.player.as_ref(), &self.config.spotify.metadata_file).await?;
        self.volume.refresh(self.player.as_ref()).await;
        self.apply_playback(playback).await;
        Ok(())
    }

    async fn apply_playback(&mut self, playback: PlaybackState) {
        let key = playback.track_key();
        if self.last_track_key.as_deref() != Some(key.as_str()) {
            if !playback.is_idle() {
                info!(
                    "Track: {} - {} [{:?}]",
                    playback.artist, playback.track, playback.source
                );
            }
            self.update_backdrop(&playback).await;
            self.last_track_key = Some(key);
        }
        self.playback = playback;
    }

    async fn update_backdrop(&mut self, playback: &PlaybackState) {
        let url = match (&playback.source, &playback.album_art_url) {
            (Source::Spotify, Some(url)) => url,
            _ => {
                self.backdrop = None;
                return;
            }
        };
        let Some(loader) = &self.art else {
            self.backdrop = None;
            return;
        };
        self.art_attempts += 1;
        debug!("PanelCore: art load #{}", self.art_attempts);
        match loader.load(url).await {
            Ok(image) => {
                self.generation += 1;
                self.backdrop = Some(Backdrop {
                    generation: self.generation,
                    image: Arc::new(image),
                });
            }
            Err(e) => {
                warn!("Error loading album art: {}", e);
                self.backdrop = None;
            }
        }
    }

    pub async fn handle_event(&mut self, evt: CoreEvent) {
        debug!("PanelCore: event {:?}", evt);
        let player = self.player.clone();
        match evt {
            CoreEvent::TogglePlay => log_command("toggle", player.toggle().await),
            CoreEvent::Next => log_command("next", player.next().await),
            CoreEvent::Prev => log_command("prev", player.prev().await),
            CoreEvent::VolumeUp => self.volume.volume_up(player.as_ref()).await,
            CoreEvent::VolumeDown => self.volume.volume_down(player.as_ref()).await,
            CoreEvent::ToggleMute => self.volume.toggle_mute(player.as_ref()).await,
            CoreEvent::PlayStation(station) => self.play_station(&station).await,
        }
    }

    /// Replace the queue with `station` and start it.
    ///
    /// A rejected `add` is retried once with the library prefix removed;
    /// `play` runs either way.
    pub async fn play_station(&self, station: &Station) {
        info!("Playing station: {} ({})", station.name, station.stream_url);
        let player = self.player.as_ref();

        match player.status().await {
            Ok(out) => debug!("mpc status before play: {}", out.stdout.trim()),
            Err(e) => warn!("mpc status: {}", e),
        }
        log_command("clear", player.clear().await);

        let added = player.add(&station.stream_url).await;
        let rejected = match &added {
            Ok(out) => out.is_error(),
            Err(_) => true,
        };
        log_command("add", added);
        if rejected {
            match fallback_uri(&station.stream_url, &self.config.catalog.strip_prefix) {
                Some(retry) => {
                    info!("Retrying add with {}", retry);
                    log_command("add (retry)", player.add(&retry).await);
                }
                None => warn!("add rejected and no fallback for {}", station.stream_url),
            }
        }

        log_command("play", player.play().await);
        match player.current().await {
            Ok(out) => info!("Now playing: {}", out.stdout.trim()),
            Err(e) => warn!("mpc current: {}", e),
        }
    }
}

/// `url` with `prefix` removed, if that changes anything.
pub fn fallback_uri(url: &str, prefix: &str) -> Option<String> {
    if prefix.is_empty() || !url.contains(prefix) {
        return None;
    }
    Some(url.replace(prefix, ""))
}

fn log_command(name: &str, result: Result<CommandOutput, PlayerError>) {
    match result {
        Ok(out) if out.is_error() => warn!("mpc {}: {}", name, out.stderr.trim()),
        Ok(_) => debug!("mpc {}: ok", name),
        Err(e) => warn!("mpc {}: {}", name, e),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use std::io::Write;

    use image::RgbImage;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::player::fake::FakePlayer;

    const STATUS_PLAYING: &str = "[playing] #1/1   0:30/3:00 (16%)\nvolume: 60%\n";

    fn meta_file(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.spotify.metadata_file = PathBuf::from("/nonexistent/spotmeta.txt");
        config.poll.interval_ms = 50;
        config.poll.backoff_ms = 10;
        config
    }

    fn core_with(player: Arc<FakePlayer>) -> (PanelCore, mpsc::Receiver<PanelSnapshot>) {
        core_with_config(test_config(), player)
    }

    fn core_with_config(
        config: Config,
        player: Arc<FakePlayer>,
    ) -> (PanelCore, mpsc::Receiver<PanelSnapshot>) {
        let (tx, rx) = mpsc::channel(16);
        let core = PanelCore::new(config, player, tx, Arc::new(AtomicBool::new(true)));
        (core, rx)
    }

    fn spotify_config(meta: &NamedTempFile) -> Config {
        let mut config = test_config();
        config.spotify.metadata_file = meta.path().to_path_buf();
        config.display.art_timeout_secs = 2;
        config
    }

    fn station(url: &str) -> Station {
        Station {
            id: 7,
            name: "FIP".into(),
            stream_url: url.into(),
            ..Station::default()
        }
    }

    #[test]
    fn fallback_strips_prefix() {
        assert_eq!(
            fallback_uri("RADIO/FIP.pls", "RADIO/").as_deref(),
            Some("FIP.pls")
        );
        assert_eq!(fallback_uri("http://icecast/fip", "RADIO/"), None);
        assert_eq!(fallback_uri("RADIO/FIP.pls", ""), None);
    }

    #[tokio::test]
    async fn play_station_retries_rejected_add() {
        let player = Arc::new(FakePlayer::new());
        player.respond_with(
            "add RADIO/FIP.pls",
            CommandOutput::failed("error adding RADIO/FIP.pls: No such directory"),
        );
        let (core, _rx) = core_with(player.clone());

        core.play_station(&station("RADIO/FIP.pls")).await;
        assert_eq!(
            player.calls(),
            vec!["status", "clear", "add RADIO/FIP.pls", "add FIP.pls", "play", "current"]
        );
    }

    #[tokio::test]
    async fn play_station_plays_even_when_add_fails() {
        let player = Arc::new(FakePlayer::new());
        player.fail_spawn("add http://icecast/fip");
        let (core, _rx) = core_with(player.clone());

        core.play_station(&station("http://icecast/fip")).await;
        assert_eq!(
            player.calls(),
            vec!["status", "clear", "add http://icecast/fip", "play", "current"]
        );
    }

    #[tokio::test]
    async fn transport_and_volume_events_reach_the_player() {
        let player = Arc::new(FakePlayer::new());
        let (mut core, _rx) = core_with(player.clone());

        core.handle_event(CoreEvent::TogglePlay).await;
        core.handle_event(CoreEvent::Next).await;
        core.handle_event(CoreEvent::Prev).await;
        core.handle_event(CoreEvent::VolumeUp).await;
        core.handle_event(CoreEvent::ToggleMute).await;
        assert_eq!(
            player.calls(),
            vec!["toggle", "next", "prev", "volume 5", "volume 0"]
        );
        let snap = core.snapshot();
        assert_eq!(snap.volume, VolumeState { level: 5, muted: true });
    }

    #[tokio::test]
    async fn poll_reads_mpd_and_volume() {
        let player = Arc::new(FakePlayer::new());
        player
            .respond("status", "[playing] #1/1   0:30/3:00 (16%)\nvolume: 60%\n")
            .respond(
                &format!("current -f {}", panel_proto::mpc::CURRENT_FORMAT),
                "Air|||La femme d'argent|||Moon Safari|||7:11",
            )
            .respond("volume", "volume: 60%\n");
        let (mut core, _rx) = core_with(player.clone());

        core.poll_once().await.unwrap();
        let snap = core.snapshot();
        assert_eq!(snap.playback.track, "La femme d'argent");
        assert_eq!(snap.playback.source, Source::Mpd);
        assert_eq!(snap.playback.elapsed, 30);
        assert_eq!(snap.volume.level, 60);
        assert!(snap.backdrop.is_none());
    }

    #[tokio::test]
    async fn poll_with_nothing_active_is_idle() {
        let player = Arc::new(FakePlayer::new());
        player.respond("status", "volume: 60%\n");
        let (mut core, _rx) = core_with(player);

        core.poll_once().await.unwrap();
        assert!(core.snapshot().playback.is_idle());
    }

    #[tokio::test]
    async fn failed_art_fetch_clears_backdrop_and_loads_once_per_track() {
        let meta = meta_file("Song~~~Artist~~~Album~~~210000~~~http://127.0.0.1:9/a.jpg~~~mp3");
        let player = Arc::new(FakePlayer::new());
        let (mut core, _rx) = core_with_config(spotify_config(&meta), player);
        core.backdrop = Some(Backdrop {
            generation: 1,
            image: Arc::new(RgbImage::new(2, 2)),
        });

        core.poll_once().await.unwrap();
        let snap = core.snapshot();
        assert_eq!(snap.playback.source, Source::Spotify);
        assert_eq!(snap.playback.track, "Song");
        assert!(snap.backdrop.is_none());
        assert_eq!(core.art_attempts, 1);

        core.poll_once().await.unwrap();
        assert_eq!(core.art_attempts, 1);
    }

    #[tokio::test]
    async fn switching_to_mpd_clears_backdrop() {
        let player = Arc::new(FakePlayer::new());
        player.respond("status", STATUS_PLAYING).respond(
            &format!("current -f {}", panel_proto::mpc::CURRENT_FORMAT),
            "Air|||Sexy Boy|||Moon Safari|||4:58",
        );
        let (mut core, _rx) = core_with(player);
        core.last_track_key = Some("Artist-Song".into());
        core.backdrop = Some(Backdrop {
            generation: 3,
            image: Arc::new(RgbImage::new(2, 2)),
        });

        core.poll_once().await.unwrap();
        let snap = core.snapshot();
        assert_eq!(snap.playback.source, Source::Mpd);
        assert!(snap.backdrop.is_none());
        assert_eq!(core.art_attempts, 0);
    }

    #[tokio::test]
    async fn poll_errors_back_off_and_keep_running() {
        let meta = meta_file("Song~~~Artist~~~Album~~~210000~~~~~~mp3");
        let player = Arc::new(FakePlayer::new());
        player.fail_spawn("status");
        let (tx, mut rx) = mpsc::channel(16);
        let running = Arc::new(AtomicBool::new(true));
        let core = PanelCore::new(spotify_config(&meta), player.clone(), tx, running.clone());
        let (_event_tx, event_rx) = mpsc::channel(16);
        let handle = tokio::spawn(core.run(event_rx));

        tokio::time::timeout(Duration::from_secs(2), async {
            for _ in 0..3 {
                let snap = rx.recv().await.unwrap();
                assert!(snap.playback.is_idle());
            }
        })
        .await
        .unwrap();
        let status_calls = player.calls().iter().filter(|c| *c == "status").count();
        assert!(status_calls >= 3);

        running.store(false, Ordering::SeqCst);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn run_publishes_snapshots_and_stops_on_flag() {
        let player = Arc::new(FakePlayer::new());
        let (tx, mut rx) = mpsc::channel(16);
        let running = Arc::new(AtomicBool::new(true));
        let core = PanelCore::new(test_config(), player.clone(), tx, running.clone());
        let (event_tx, event_rx) = mpsc::channel(16);
        let handle = tokio::spawn(core.run(event_rx));

        event_tx.send(CoreEvent::TogglePlay).await.unwrap();
        tokio::time::timeout(Duration::from_secs(2), async {
            while !player.calls().contains(&"toggle".to_string()) {
                assert!(rx.recv().await.is_some());
            }
        })
        .await
        .unwrap();

        running.store(false, Ordering::SeqCst);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
    }
}
