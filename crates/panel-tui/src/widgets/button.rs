//! Touch button: a bordered box with a centered label, plus hit testing.

use ratatui::{
    layout::{Alignment, Position, Rect},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use ratatui::style::Style;

use crate::theme::{
    style_button, style_button_border, style_button_danger, style_button_danger_border,
    style_button_disabled,
};

/// Rows a bordered button needs.
pub const BUTTON_HEIGHT: u16 = 3;

pub fn draw_button(frame: &mut Frame, area: Rect, label: &str, enabled: bool) {
    if enabled {
        draw_styled(frame, area, label, style_button(), style_button_border());
    } else {
        draw_styled(frame, area, label, style_button_disabled(), style_button_disabled());
    }
}

/// Red button for leaving a view.
pub fn draw_danger_button(frame: &mut Frame, area: Rect, label: &str) {
    draw_styled(
        frame,
        area,
        label,
        style_button_danger(),
        style_button_danger_border(),
    );
}

fn draw_styled(frame: &mut Frame, area: Rect, label: &str, text_style: Style, border_style: Style) {
    if area.width < 2 || area.height == 0 {
        return;
    }

    let borders = if area.height >= BUTTON_HEIGHT {
        Borders::ALL
    } else {
        Borders::NONE
    };
    let block = Block::default()
        .borders(borders)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .style(text_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label_row = Rect {
        y: inner.y + inner.height.saturating_sub(1) / 2,
        height: inner.height.min(1),
        ..inner
    };
    frame.render_widget(
        Paragraph::new(label)
            .style(text_style)
            .alignment(Alignment::Center),
        label_row,
    );
}

/// Width of a button that fits `label` with one cell of padding per side.
pub fn button_width(label: &str) -> u16 {
    UnicodeWidthStr::width(label) as u16 + 4
}

/// True when a press at (`column`, `row`) lands inside `area`.
pub fn hit(area: Rect, column: u16, row: u16) -> bool {
    area.contains(Position::new(column, row))
}

/// Lay out buttons of the given widths centered in `area`, `gap` cells apart.
pub fn centered_row(area: Rect, widths: &[u16], gap: u16) -> Vec<Rect> {
    let total: u16 = widths.iter().sum::<u16>() + gap * widths.len().saturating_sub(1) as u16;
    let mut x = area.x + area.width.saturating_sub(total) / 2;
    widths
        .iter()
        .map(|&w| {
            let w = w.min(area.right().saturating_sub(x));
            let rect = Rect::new(x, area.y, w, area.height);
            x = x.saturating_add(w + gap);
            rect
        })
        .collect()
}
