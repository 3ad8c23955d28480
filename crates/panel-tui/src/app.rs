//! App — the terminal side of the panel.
//!
//! - `App` owns the components and `AppState`.
//! - Terminal input is read on a blocking task and forwarded as `AppMessage`s.
//! - Core snapshots arrive on their own channel; only the newest is applied.
//! - A render tick redraws even without input so the clock keeps moving.
//! - User intents leave through `cmd_tx` as `CoreEvent`s.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use panel_proto::stations::StationCatalog;

use crate::{
    action::Action,
    app_state::AppState,
    component::Component,
    components::{
        backdrop::BackdropView, controls::Controls, now_playing::NowPlaying,
        station_browser::StationBrowser,
    },
    core::{CoreEvent, PanelSnapshot},
};

/// Rows taken by the transport row, a gap, and the bottom row.
const CONTROLS_HEIGHT: u16 = 7;
/// How long the input task blocks before re-checking the running flag.
const INPUT_POLL: Duration = Duration::from_millis(100);

enum AppMessage {
    Event(Event),
}

pub struct App {
    pub state: AppState,

    // ── Components ────────────────────────────────────────────────────────────
    backdrop: BackdropView,
    now_playing: NowPlaying,
    controls: Controls,
    browser: StationBrowser,

    cmd_tx: mpsc::Sender<CoreEvent>,
    running: Arc<AtomicBool>,
    render_interval: Duration,
    should_quit: bool,
}

impl App {
    pub fn new(
        catalog: StationCatalog,
        cmd_tx: mpsc::Sender<CoreEvent>,
        running: Arc<AtomicBool>,
        render_interval: Duration,
    ) -> Self {
        Self {
            state: AppState::new(catalog),
            backdrop: BackdropView::new(),
            now_playing: NowPlaying::new(),
            controls: Controls::new(),
            browser: StationBrowser::new(),
            cmd_tx,
            running,
            render_interval,
            should_quit: false,
        }
    }

    pub async fn run(mut self, mut snapshot_rx: mpsc::Receiver<PanelSnapshot>) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);

        // ── Background task: keyboard/mouse events ────────────────────────────
        let input_running = self.running.clone();
        tokio::task::spawn_blocking(move || {
            while input_running.load(Ordering::SeqCst) {
                match event::poll(INPUT_POLL) {
                    Ok(true) => match event::read() {
                        Ok(ev) => {
                            if tx.blocking_send(AppMessage::Event(ev)).is_err() {
                                break;
                            }
                        }
                        Err(_) => break,
                    },
                    Ok(false) => {}
                    Err(_) => break,
                }
            }
        });

        let mut render_tick = tokio::time::interval(self.render_interval);
        render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit || !self.running.load(Ordering::SeqCst) {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    needs_redraw = self.handle_message(msg);
                }

                snapshot = snapshot_rx.recv() => match snapshot {
                    Some(mut latest) => {
                        while let Ok(newer) = snapshot_rx.try_recv() {
                            latest = newer;
                        }
                        self.state.apply_snapshot(latest);
                        needs_redraw = true;
                    }
                    None => {
                        warn!("snapshot channel closed, leaving");
                        break;
                    }
                },

                _ = render_tick.tick() => {
                    needs_redraw = true;
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        self.running.store(false, Ordering::SeqCst);
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        info!("UI closed");

        Ok(())
    }

    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                self.handle_key(key);
                true
            }
            AppMessage::Event(Event::Mouse(mouse)) => self.handle_mouse(mouse),
            AppMessage::Event(Event::Resize(_, _)) => true,
            AppMessage::Event(_) => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let quit = matches!(key.code, KeyCode::Esc | KeyCode::Char('q'))
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL));
        let actions = if quit {
            vec![Action::Quit]
        } else {
            let target: &mut dyn Component = if self.state.browser_open {
                &mut self.browser
            } else {
                &mut self.controls
            };
            let actions = target.handle_key(key, &self.state);
            trace!("{:?}: {:?} -> {:?}", target.id(), key.code, actions);
            actions
        };
        for action in actions {
            self.dispatch(action);
        }
    }

    /// Presses only; returns whether anything changed.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return false;
        }
        let target: &mut dyn Component = if self.state.browser_open {
            &mut self.browser
        } else {
            &mut self.controls
        };
        let actions = target.handle_mouse(mouse, &self.state);
        trace!(
            "{:?}: press at {},{} -> {:?}",
            target.id(),
            mouse.column,
            mouse.row,
            actions
        );
        let changed = !actions.is_empty();
        for action in actions {
            self.dispatch(action);
        }
        changed
    }

    pub fn dispatch(&mut self, action: Action) {
        debug!("dispatch {:?}", action);
        match action {
            Action::TogglePlay => self.send_core(CoreEvent::TogglePlay),
            Action::Next => self.send_core(CoreEvent::Next),
            Action::Prev => self.send_core(CoreEvent::Prev),
            Action::VolumeUp => self.send_core(CoreEvent::VolumeUp),
            Action::VolumeDown => self.send_core(CoreEvent::VolumeDown),
            Action::ToggleMute => self.send_core(CoreEvent::ToggleMute),
            Action::OpenBrowser => self.state.browser_open = true,
            Action::CloseBrowser => self.state.browser_open = false,
            Action::NextPage => {
                self.state.pager.next();
            }
            Action::PrevPage => {
                self.state.pager.prev();
            }
            Action::PlayStation(idx) => {
                match self.state.catalog.stations().get(idx).cloned() {
                    Some(station) => self.send_core(CoreEvent::PlayStation(station)),
                    None => warn!("no station at index {}", idx),
                }
                self.state.browser_open = false;
            }
            Action::Quit => {
                info!("Quit requested");
                self.should_quit = true;
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    fn send_core(&self, evt: CoreEvent) {
        if let Err(e) = self.cmd_tx.try_send(evt) {
            warn!("core busy, dropped command: {}", e);
        }
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        self.backdrop.draw(frame, area, &self.state);

        if self.state.browser_open {
            self.browser.draw(frame, area, &self.state);
            return;
        }

        let [main, controls] =
            Layout::vertical([Constraint::Min(5), Constraint::Length(CONTROLS_HEIGHT)])
                .margin(1)
                .areas(area);
        self.now_playing.draw(frame, main, &self.state);
        self.controls.draw(frame, controls, &self.state);
    }
}
