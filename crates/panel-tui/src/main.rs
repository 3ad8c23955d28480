mod action;
mod album_art;
mod app;
mod app_state;
mod component;
mod components;
mod core;
mod player;
mod status;
mod theme;
mod volume;
mod widgets;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use panel_proto::config::Config;
use panel_proto::stations::StationCatalog;

use crate::core::{CoreEvent, PanelCore, PanelSnapshot};
use crate::player::{Mpc, PlayerControl};

/// How long shutdown waits for the poll loop to finish its iteration.
const CORE_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Local wall-clock timestamps for the debug log.
struct LocalClock;

impl FormatTime for LocalClock {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S"))
    }
}

/// Log to `path`, or nowhere if it cannot be opened.
fn init_logging(path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let writer = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    {
        Ok(file) => BoxMakeWriter::new(std::sync::Mutex::new(file)),
        Err(_) => BoxMakeWriter::new(std::io::sink),
    };

    // Allow RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(log_filter.as_str())
        .with_timer(LocalClock)
        .with_ansi(false)
        .init();
}

/// SIGTERM / SIGHUP clear the running flag like the quit key does.
#[cfg(unix)]
fn watch_signals(running: Arc<AtomicBool>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut term, mut hup) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::hangup()),
        ) {
            (Ok(term), Ok(hup)) => (term, hup),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("signal handlers unavailable: {}", e);
                return;
            }
        };
        tokio::select! {
            _ = term.recv() => tracing::info!("SIGTERM received"),
            _ = hup.recv() => tracing::info!("SIGHUP received"),
        }
        running.store(false, Ordering::SeqCst);
    });
}

#[cfg(not(unix))]
fn watch_signals(_running: Arc<AtomicBool>) {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Load config ──────────────────────────────────────────────────────────
    let loaded = Config::load();
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };

    init_logging(&config.paths.log_file);
    eprintln!("moode-panel log: {}", config.paths.log_file.display());
    tracing::info!("moode-panel starting…");
    if let Err(e) = loaded {
        tracing::warn!("config unreadable, using defaults: {}", e);
    }

    // ── Station catalog (read once) ──────────────────────────────────────────
    let catalog = StationCatalog::load(&config.catalog.database);

    // ── Channels and shutdown flag ───────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let (snapshot_tx, snapshot_rx) = mpsc::channel::<PanelSnapshot>(16);
    let (event_tx, event_rx) = mpsc::channel::<CoreEvent>(64);

    // ── Spawn PanelCore poll loop ────────────────────────────────────────────
    let player: Arc<dyn PlayerControl> = Arc::new(Mpc::new(&config.player));
    let core = PanelCore::new(config.clone(), player, snapshot_tx, running.clone());
    let core_handle = tokio::spawn(async move {
        if let Err(e) = core.run(event_rx).await {
            tracing::error!("PanelCore exited with error: {}", e);
        }
    });

    watch_signals(running.clone());

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(
        catalog,
        event_tx,
        running.clone(),
        config.poll.render_interval(),
    );
    let result = app.run(snapshot_rx).await;

    running.store(false, Ordering::SeqCst);
    if tokio::time::timeout(CORE_JOIN_TIMEOUT, core_handle)
        .await
        .is_err()
    {
        tracing::warn!("PanelCore did not stop within {:?}", CORE_JOIN_TIMEOUT);
    }
    tracing::info!("moode-panel stopped");

    result
}
