//! Station browser overlay: a 3×2 grid of station buttons with paging.

use ratatui::crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Paragraph},
    Frame,
};

use panel_proto::stations::{display_name, GRID_COLUMNS, GRID_ROWS};

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;
use crate::component::Component;
use crate::theme::{style_artist, style_muted, style_title, C_OVERLAY_BG};
use crate::widgets::button::{button_width, draw_button, draw_danger_button, hit, BUTTON_HEIGHT};

pub const BROWSER_TITLE: &str = "📻 Radio Stations";
const PREV_PAGE_LABEL: &str = "◀ Previous";
const NEXT_PAGE_LABEL: &str = "Next ▶";
const CLOSE_LABEL: &str = "✕ Close";

#[derive(Debug, Default, Clone)]
struct Hitboxes {
    slots: Vec<Rect>,
    prev: Rect,
    next: Rect,
    close: Rect,
}

#[derive(Default)]
pub struct StationBrowser {
    hitboxes: Hitboxes,
}

impl StationBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    fn pick(slot: usize, state: &AppState) -> Vec<Action> {
        state
            .pager
            .index_of_slot(slot)
            .map(|idx| vec![Action::PlayStation(idx)])
            .unwrap_or_default()
    }
}

impl Component for StationBrowser {
    fn id(&self) -> ComponentId {
        ComponentId::StationBrowser
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        match key.code {
            KeyCode::Left if state.pager.has_prev() => vec![Action::PrevPage],
            KeyCode::Right if state.pager.has_next() => vec![Action::NextPage],
            KeyCode::Char('c') | KeyCode::Char('r') => vec![Action::CloseBrowser],
            KeyCode::Char(c @ '1'..='6') => {
                let slot = c as usize - '1' as usize;
                Self::pick(slot, state)
            }
            _ => Vec::new(),
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, state: &AppState) -> Vec<Action> {
        let (col, row) = (event.column, event.row);
        let h = &self.hitboxes;
        if let Some(slot) = h.slots.iter().position(|r| hit(*r, col, row)) {
            return Self::pick(slot, state);
        }
        if hit(h.prev, col, row) && state.pager.has_prev() {
            vec![Action::PrevPage]
        } else if hit(h.next, col, row) && state.pager.has_next() {
            vec![Action::NextPage]
        } else if hit(h.close, col, row) {
            vec![Action::CloseBrowser]
        } else {
            Vec::new()
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        self.hitboxes = Hitboxes::default();
        frame.render_widget(
            Block::default().style(Style::default().bg(C_OVERLAY_BG)),
            area,
        );
        if area.height < BUTTON_HEIGHT * 2 + 2 {
            return;
        }

        let [title, grid, bar] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(BUTTON_HEIGHT),
            Constraint::Length(BUTTON_HEIGHT),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(Line::styled(BROWSER_TITLE, style_title())).alignment(Alignment::Center),
            title,
        );

        // ── Station grid ─────────────────────────────────────────────────────
        let stations = state.page_stations();
        if stations.is_empty() {
            frame.render_widget(
                Paragraph::new("No stations").style(style_muted()).alignment(Alignment::Center),
                Rect {
                    y: grid.y + grid.height / 2,
                    height: 1,
                    ..grid
                },
            );
        } else {
            let rows = Layout::vertical([Constraint::Ratio(1, GRID_ROWS as u32); GRID_ROWS])
                .spacing(1)
                .split(grid);
            for (r, row_area) in rows.iter().enumerate() {
                let cols =
                    Layout::horizontal([Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
                        .spacing(2)
                        .horizontal_margin(2)
                        .split(*row_area);
                for (c, cell) in cols.iter().enumerate() {
                    let slot = r * GRID_COLUMNS + c;
                    if let Some(station) = stations.get(slot) {
                        draw_button(frame, *cell, &display_name(&station.name), true);
                        self.hitboxes.slots.push(*cell);
                    }
                }
            }
        }

        // ── Paging bar ───────────────────────────────────────────────────────
        let prev = Rect {
            x: bar.x + 1,
            width: button_width(PREV_PAGE_LABEL).min(bar.width),
            ..bar
        };
        let close_w = button_width(CLOSE_LABEL);
        let close = Rect {
            x: bar.right().saturating_sub(close_w + 1),
            width: close_w,
            ..bar
        };
        let next_w = button_width(NEXT_PAGE_LABEL);
        let next = Rect {
            x: close.x.saturating_sub(next_w + 2),
            width: next_w,
            ..bar
        };
        draw_button(frame, prev, PREV_PAGE_LABEL, state.pager.has_prev());
        draw_button(frame, next, NEXT_PAGE_LABEL, state.pager.has_next());
        draw_danger_button(frame, close, CLOSE_LABEL);

        let label_area = Rect {
            x: prev.right(),
            y: bar.y + bar.height / 2,
            width: next.x.saturating_sub(prev.right()),
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(state.pager.label())
                .style(style_artist())
                .alignment(Alignment::Center),
            label_area,
        );

        self.hitboxes.prev = prev;
        self.hitboxes.next = next;
        self.hitboxes.close = close;
    }
}
