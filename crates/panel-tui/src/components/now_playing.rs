//! Now-playing pane: status dot, source badge, track text and progress.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use panel_proto::state::PlaybackState;

use crate::action::ComponentId;
use crate::app_state::AppState;
use crate::component::Component;
use crate::theme::{badge_color, style_album, style_artist, style_status_dot, style_title, C_BG};
use crate::widgets::progress_bar::draw_progress;

pub const NO_TRACK_TITLE: &str = "No Track Playing";
const STATUS_DOT: &str = "●";

#[derive(Default)]
pub struct NowPlaying;

impl NowPlaying {
    pub fn new() -> Self {
        Self
    }
}

/// Centered text lines for the current playback.
pub fn track_lines(playback: &PlaybackState) -> Vec<Line<'static>> {
    if playback.is_idle() {
        return vec![Line::styled(NO_TRACK_TITLE, style_title())];
    }
    let mut lines = vec![Line::styled(playback.track.clone(), style_title())];
    if !playback.artist.is_empty() {
        lines.push(Line::styled(playback.artist.clone(), style_artist()));
    }
    if !playback.album.is_empty() {
        lines.push(Line::styled(playback.album.clone(), style_album()));
    }
    lines
}

impl Component for NowPlaying {
    fn id(&self) -> ComponentId {
        ComponentId::NowPlaying
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        if area.height < 3 {
            return;
        }
        let [top, body, progress] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(area);

        // ── Top bar ──────────────────────────────────────────────────────────
        let playback = &state.playback;
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {}", STATUS_DOT),
                style_status_dot(playback.playing),
            )),
            top,
        );
        if let Some(label) = playback.source.badge_label() {
            let badge = Span::styled(
                format!(" {} ", label),
                Style::default()
                    .fg(C_BG)
                    .bg(badge_color(playback.source))
                    .add_modifier(Modifier::BOLD),
            );
            frame.render_widget(
                Paragraph::new(Line::from(vec![badge, Span::raw(" ")]))
                    .alignment(Alignment::Right),
                top,
            );
        }

        // ── Track text ───────────────────────────────────────────────────────
        let lines = track_lines(playback);
        let text_h = (lines.len() as u16).min(body.height);
        let text_area = Rect {
            y: body.y + (body.height - text_h) / 2,
            height: text_h,
            ..body
        };
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            text_area,
        );

        // ── Progress ─────────────────────────────────────────────────────────
        let margin = progress.width / 10;
        let bar = Rect {
            x: progress.x + margin,
            width: progress.width.saturating_sub(margin * 2),
            ..progress
        };
        draw_progress(frame, bar, playback.elapsed, playback.duration);
    }
}
