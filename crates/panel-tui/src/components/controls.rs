//! Main-view touch controls: transport, radio button, volume cluster.

use ratatui::crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;
use crate::component::Component;
use crate::theme::style_artist;
use crate::widgets::button::{button_width, centered_row, draw_button, hit, BUTTON_HEIGHT};

const PREV_LABEL: &str = "⏮";
const PLAY_LABEL: &str = "▶";
const PAUSE_LABEL: &str = "⏸";
const NEXT_LABEL: &str = "⏭";
const RADIO_LABEL: &str = "📻";
const VOL_DOWN_LABEL: &str = "−";
const VOL_UP_LABEL: &str = "+";
const SPEAKER_ON: &str = "🔊";
const SPEAKER_OFF: &str = "🔇";

/// Label between the volume buttons.
pub fn volume_label(level: u8, muted: bool) -> String {
    if muted {
        format!("Vol: {}", SPEAKER_OFF)
    } else {
        format!("Vol: {}", level)
    }
}

/// Hit rectangles from the last draw; zero-sized when hidden.
#[derive(Debug, Default, Clone, Copy)]
struct Hitboxes {
    prev: Rect,
    play: Rect,
    next: Rect,
    radio: Rect,
    vol_down: Rect,
    vol_up: Rect,
    mute: Rect,
}

#[derive(Default)]
pub struct Controls {
    hitboxes: Hitboxes,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component for Controls {
    fn id(&self) -> ComponentId {
        ComponentId::Controls
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        let volume = state.playback.source.shows_volume_controls();
        let action = match key.code {
            KeyCode::Char(' ') => Action::TogglePlay,
            KeyCode::Char('n') => Action::Next,
            KeyCode::Char('p') => Action::Prev,
            KeyCode::Char('r') => Action::OpenBrowser,
            KeyCode::Char('+') | KeyCode::Char('=') if volume => Action::VolumeUp,
            KeyCode::Char('-') if volume => Action::VolumeDown,
            KeyCode::Char('m') if volume => Action::ToggleMute,
            _ => return Vec::new(),
        };
        vec![action]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _state: &AppState) -> Vec<Action> {
        let (col, row) = (event.column, event.row);
        let h = &self.hitboxes;
        let action = if hit(h.prev, col, row) {
            Action::Prev
        } else if hit(h.play, col, row) {
            Action::TogglePlay
        } else if hit(h.next, col, row) {
            Action::Next
        } else if hit(h.radio, col, row) {
            Action::OpenBrowser
        } else if hit(h.vol_down, col, row) {
            Action::VolumeDown
        } else if hit(h.vol_up, col, row) {
            Action::VolumeUp
        } else if hit(h.mute, col, row) {
            Action::ToggleMute
        } else {
            return Vec::new();
        };
        vec![action]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        self.hitboxes = Hitboxes::default();
        if area.height < BUTTON_HEIGHT {
            return;
        }
        let [transport, _, bottom] = Layout::vertical([
            Constraint::Length(BUTTON_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(BUTTON_HEIGHT),
        ])
        .areas(area);

        // ── Transport ────────────────────────────────────────────────────────
        let play_label = if state.playback.playing {
            PAUSE_LABEL
        } else {
            PLAY_LABEL
        };
        let rects = centered_row(transport, &[9, 11, 9], 3);
        draw_button(frame, rects[0], PREV_LABEL, true);
        draw_button(frame, rects[1], play_label, true);
        draw_button(frame, rects[2], NEXT_LABEL, true);
        self.hitboxes.prev = rects[0];
        self.hitboxes.play = rects[1];
        self.hitboxes.next = rects[2];

        if bottom.height < BUTTON_HEIGHT {
            return;
        }

        // ── Radio ────────────────────────────────────────────────────────────
        let radio = Rect {
            x: bottom.x + 1,
            width: button_width(RADIO_LABEL).max(8).min(bottom.width),
            ..bottom
        };
        draw_button(frame, radio, RADIO_LABEL, true);
        self.hitboxes.radio = radio;

        // ── Volume ───────────────────────────────────────────────────────────
        if !state.playback.source.shows_volume_controls() {
            return;
        }
        let label = volume_label(state.volume.level, state.volume.muted);
        let label_w = UnicodeWidthStr::width(label.as_str()) as u16 + 2;
        let mute_label = if state.volume.muted {
            SPEAKER_OFF
        } else {
            SPEAKER_ON
        };
        let widths = [7, label_w, 7, 8];
        let total: u16 = widths.iter().sum::<u16>() + 3;
        let x = bottom.right().saturating_sub(total + 1).max(radio.right() + 1);
        let mut cursor = x;
        let mut next_rect = |w: u16| {
            let w = w.min(bottom.right().saturating_sub(cursor));
            let rect = Rect::new(cursor, bottom.y, w, bottom.height);
            cursor = cursor.saturating_add(w + 1);
            rect
        };
        let down = next_rect(widths[0]);
        let text = next_rect(widths[1]);
        let up = next_rect(widths[2]);
        let mute = next_rect(widths[3]);

        draw_button(frame, down, VOL_DOWN_LABEL, true);
        let text_row = Rect {
            y: text.y + text.height / 2,
            height: 1,
            ..text
        };
        frame.render_widget(
            Paragraph::new(label)
                .style(style_artist())
                .alignment(Alignment::Center),
            text_row,
        );
        draw_button(frame, up, VOL_UP_LABEL, true);
        draw_button(frame, mute, mute_label, true);
        self.hitboxes.vol_down = down;
        self.hitboxes.vol_up = up;
        self.hitboxes.mute = mute;
    }
}

#[cfg(test)]
mod tests {
    use panel_proto::state::{PlaybackState, Source, VolumeState};
    use ratatui::crossterm::event::{KeyModifiers, MouseButton, MouseEventKind};
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;

    fn press(col: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: col,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn center(r: Rect) -> (u16, u16) {
        (r.x + r.width / 2, r.y + r.height / 2)
    }

    fn drawn(state: &AppState) -> Controls {
        let mut terminal = Terminal::new(TestBackend::new(80, 8)).unwrap();
        let mut controls = Controls::new();
        terminal
            .draw(|f| controls.draw(f, f.area(), state))
            .unwrap();
        controls
    }

    fn mpd_state() -> AppState {
        AppState {
            playback: PlaybackState {
                track: "x".into(),
                source: Source::Mpd,
                ..PlaybackState::default()
            },
            volume: VolumeState {
                level: 40,
                muted: false,
            },
            ..AppState::default()
        }
    }

    #[test]
    fn volume_label_text() {
        assert_eq!(volume_label(40, false), "Vol: 40");
        assert_eq!(volume_label(40, true), "Vol: 🔇");
    }

    #[test]
    fn presses_map_to_actions() {
        let state = mpd_state();
        let mut controls = drawn(&state);
        let h = controls.hitboxes;

        let cases = [
            (h.prev, Action::Prev),
            (h.play, Action::TogglePlay),
            (h.next, Action::Next),
            (h.radio, Action::OpenBrowser),
            (h.vol_down, Action::VolumeDown),
            (h.vol_up, Action::VolumeUp),
            (h.mute, Action::ToggleMute),
        ];
        for (rect, expected) in cases {
            let (c, r) = center(rect);
            assert_eq!(controls.handle_mouse(press(c, r), &state), vec![expected]);
        }
        assert!(controls.handle_mouse(press(0, 4), &state).is_empty());
    }

    #[test]
    fn spotify_hides_volume() {
        let mut state = mpd_state();
        state.playback.source = Source::Spotify;
        let mut controls = drawn(&state);
        assert_eq!(controls.hitboxes.vol_up, Rect::default());
        assert!(controls.handle_key(key('+'), &state).is_empty());
        assert!(controls.handle_key(key('m'), &state).is_empty());
        assert_eq!(controls.handle_key(key(' '), &state), vec![Action::TogglePlay]);
    }

    #[test]
    fn key_bindings() {
        let state = mpd_state();
        let mut controls = Controls::new();
        assert_eq!(controls.handle_key(key('n'), &state), vec![Action::Next]);
        assert_eq!(controls.handle_key(key('p'), &state), vec![Action::Prev]);
        assert_eq!(controls.handle_key(key('='), &state), vec![Action::VolumeUp]);
        assert_eq!(controls.handle_key(key('-'), &state), vec![Action::VolumeDown]);
        assert_eq!(controls.handle_key(key('m'), &state), vec![Action::ToggleMute]);
        assert_eq!(controls.handle_key(key('r'), &state), vec![Action::OpenBrowser]);
        assert!(controls.handle_key(key('x'), &state).is_empty());
    }
}
