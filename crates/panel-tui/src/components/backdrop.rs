//! Album-art backdrop drawn with half-block cells.
//!
//! Each terminal cell shows two image rows: `▀` with the upper pixel as
//! foreground and the lower pixel as background.

use image::imageops::{self, FilterType};
use image::RgbImage;
use ratatui::{layout::Rect, style::Color, Frame};

use crate::app_state::AppState;
use crate::theme::C_BG;

const HALF_BLOCK: &str = "▀";

#[derive(Default)]
pub struct BackdropView {
    /// Image resampled for the last (generation, width, height).
    cache: Option<((u64, u16, u16), RgbImage)>,
}

impl BackdropView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let buf = frame.buffer_mut();
        let Some(backdrop) = &state.backdrop else {
            self.cache = None;
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    if let Some(cell) = buf.cell_mut((x, y)) {
                        cell.set_bg(C_BG);
                    }
                }
            }
            return;
        };
        if area.width == 0 || area.height == 0 {
            return;
        }

        let key = (backdrop.generation, area.width, area.height);
        let cached = matches!(&self.cache, Some((k, _)) if *k == key);
        if !cached {
            let scaled = imageops::resize(
                &*backdrop.image,
                area.width as u32,
                area.height as u32 * 2,
                FilterType::Triangle,
            );
            self.cache = Some((key, scaled));
        }
        let Some((_, cells)) = &self.cache else {
            return;
        };

        for row in 0..area.height {
            for col in 0..area.width {
                let (fg, bg) = cell_colors(cells, col as u32, row as u32);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol(HALF_BLOCK).set_fg(fg).set_bg(bg);
                }
            }
        }
    }
}

/// Upper and lower pixel of terminal cell (`col`, `row`).
pub fn cell_colors(img: &RgbImage, col: u32, row: u32) -> (Color, Color) {
    let top_y = row * 2;
    let bottom_y = (top_y + 1).min(img.height().saturating_sub(1));
    let top = img.get_pixel(col, top_y);
    let bottom = img.get_pixel(col, bottom_y);
    (
        Color::Rgb(top[0], top[1], top[2]),
        Color::Rgb(bottom[0], bottom[1], bottom[2]),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use image::Rgb;
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::album_art::Backdrop;

    #[test]
    fn upper_pixel_is_foreground() {
        let mut img = RgbImage::from_pixel(2, 4, Rgb([10, 10, 10]));
        img.put_pixel(1, 2, Rgb([200, 0, 0]));
        img.put_pixel(1, 3, Rgb([0, 0, 200]));
        assert_eq!(
            cell_colors(&img, 1, 1),
            (Color::Rgb(200, 0, 0), Color::Rgb(0, 0, 200))
        );
    }

    #[test]
    fn odd_height_reuses_last_row() {
        let img = RgbImage::from_pixel(1, 3, Rgb([5, 6, 7]));
        let (fg, bg) = cell_colors(&img, 0, 1);
        assert_eq!(fg, bg);
    }

    #[test]
    fn draws_half_blocks_and_caches_per_generation() {
        let mut terminal = Terminal::new(TestBackend::new(8, 4)).unwrap();
        let mut view = BackdropView::new();
        let state = AppState {
            backdrop: Some(Backdrop {
                generation: 3,
                image: Arc::new(RgbImage::from_pixel(16, 16, Rgb([40, 80, 120]))),
            }),
            ..AppState::default()
        };

        terminal
            .draw(|f| view.draw(f, f.area(), &state))
            .unwrap();
        assert!(matches!(view.cache, Some(((3, 8, 4), _))));
        let buf = terminal.backend().buffer();
        assert_eq!(buf[(0, 0)].symbol(), HALF_BLOCK);
        assert_eq!(buf[(7, 3)].bg, Color::Rgb(40, 80, 120));
    }
}
