//! Color palette and style constants for the panel.

use ratatui::style::{Color, Modifier, Style};

use panel_proto::state::Source;

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_BG: Color = Color::Rgb(0, 0, 0);
pub const C_ACCENT: Color = Color::Rgb(0, 255, 0);
pub const C_IDLE: Color = Color::Rgb(102, 102, 102);
pub const C_PRIMARY: Color = Color::Rgb(255, 255, 255);
pub const C_SECONDARY: Color = Color::Rgb(204, 204, 204);
pub const C_TERTIARY: Color = Color::Rgb(153, 153, 153);
pub const C_MUTED: Color = Color::Rgb(72, 72, 72);
pub const C_BUTTON_BG: Color = Color::Rgb(34, 34, 34);
pub const C_BUTTON_BORDER: Color = Color::Rgb(85, 85, 85);
pub const C_BUTTON_FG: Color = Color::Rgb(255, 255, 255);
pub const C_PROGRESS: Color = Color::Rgb(0, 255, 0);
pub const C_PROGRESS_TRACK: Color = Color::Rgb(51, 51, 51);
pub const C_BADGE_SPOTIFY: Color = Color::Rgb(29, 185, 84);
pub const C_BADGE_MPD: Color = Color::Rgb(80, 140, 200);
pub const C_OVERLAY_BG: Color = Color::Rgb(17, 17, 17);
pub const C_DANGER: Color = Color::Rgb(204, 0, 0);
pub const C_DANGER_BORDER: Color = Color::Rgb(255, 85, 85);

// ── Predefined styles ─────────────────────────────────────────────────────────

pub fn style_title() -> Style {
    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn style_artist() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_album() -> Style {
    Style::default().fg(C_TERTIARY)
}

pub fn style_button() -> Style {
    Style::default().fg(C_BUTTON_FG).bg(C_BUTTON_BG)
}

pub fn style_button_border() -> Style {
    Style::default().fg(C_BUTTON_BORDER).bg(C_BUTTON_BG)
}

pub fn style_button_disabled() -> Style {
    Style::default().fg(C_MUTED).bg(C_BUTTON_BG)
}

/// Close and other leave-the-view buttons.
pub fn style_button_danger() -> Style {
    Style::default().fg(C_BUTTON_FG).bg(C_DANGER)
}

pub fn style_button_danger_border() -> Style {
    Style::default().fg(C_DANGER_BORDER).bg(C_DANGER)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}

/// Status dot: accent while playing, grey otherwise.
pub fn style_status_dot(playing: bool) -> Style {
    Style::default().fg(if playing { C_ACCENT } else { C_IDLE })
}

pub fn badge_color(source: Source) -> Color {
    match source {
        Source::Spotify => C_BADGE_SPOTIFY,
        Source::Mpd | Source::None => C_BADGE_MPD,
    }
}
