//! AppState — shared read-only data passed to all components during render/event.
//!
//! Components read this but never mutate it. The App event loop is the only
//! writer: core snapshots replace the playback half, dispatched actions move
//! the browser half.

use panel_proto::state::{PlaybackState, VolumeState};
use panel_proto::stations::{Pager, Station, StationCatalog};

use crate::album_art::Backdrop;
use crate::core::PanelSnapshot;

#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub playback: PlaybackState,
    pub volume: VolumeState,
    pub backdrop: Option<Backdrop>,
    pub catalog: StationCatalog,
    pub pager: Pager,
    pub browser_open: bool,
}

impl AppState {
    pub fn new(catalog: StationCatalog) -> Self {
        let pager = Pager::new(catalog.len());
        Self {
            catalog,
            pager,
            ..Self::default()
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: PanelSnapshot) {
        self.playback = snapshot.playback;
        self.volume = snapshot.volume;
        self.backdrop = snapshot.backdrop;
    }

    /// Stations on the browser's current page.
    pub fn page_stations(&self) -> &[Station] {
        self.catalog.page(&self.pager)
    }
}
