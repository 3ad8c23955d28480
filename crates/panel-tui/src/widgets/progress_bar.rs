//! Smooth Unicode progress bar with elapsed / duration labels.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use panel_proto::state::fmt_clock;

use crate::theme::{C_PROGRESS, C_PROGRESS_TRACK, C_SECONDARY};

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Render the bar. Unknown duration (0) shows an empty bar and `0:00` on
/// both sides.
pub fn draw_progress(frame: &mut Frame, area: Rect, elapsed: u32, duration: u32) {
    if area.width < 4 || area.height == 0 {
        return;
    }

    let (left, right, progress) = labels(elapsed, duration);
    let label_w = (left.len() + right.len() + 2) as u16;
    let bar_w = area.width.saturating_sub(label_w).max(4) as usize;

    let spans = vec![
        Span::styled(format!("{} ", left), Style::default().fg(C_SECONDARY)),
        Span::styled(
            bar_string(progress, bar_w),
            Style::default().fg(C_PROGRESS).bg(C_PROGRESS_TRACK),
        ),
        Span::styled(format!(" {}", right), Style::default().fg(C_SECONDARY)),
    ];
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// `(elapsed label, duration label, fraction)`.
pub fn labels(elapsed: u32, duration: u32) -> (String, String, f64) {
    if duration == 0 {
        return (fmt_clock(0), fmt_clock(0), 0.0);
    }
    let progress = (elapsed as f64 / duration as f64).clamp(0.0, 1.0);
    (fmt_clock(elapsed), fmt_clock(duration), progress)
}

/// Eighth-block fill of `width` cells.
pub fn bar_string(progress: f64, width: usize) -> String {
    let eighths = (progress.clamp(0.0, 1.0) * width as f64 * 8.0) as usize;
    let full_blocks = eighths / 8;
    let partial = eighths % 8;

    let mut bar = String::with_capacity(width * 3);
    for _ in 0..full_blocks {
        bar.push('█');
    }
    if full_blocks < width {
        bar.push(BLOCKS[partial]);
        for _ in (full_blocks + 1)..width {
            bar.push(' ');
        }
    }
    bar
}
