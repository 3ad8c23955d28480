//! Saved radio stations from the appliance database, and the pager that
//! splits them into touch-sized grids.

use std::ops::Range;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use thiserror::Error;
use tracing::{info, warn};

/// Stations per browser page, laid out as a 3×2 grid.
pub const PAGE_SIZE: usize = 6;
pub const GRID_COLUMNS: usize = 3;
pub const GRID_ROWS: usize = 2;

/// Playlist-file extension some catalog entries carry in their name.
const ARCHIVE_SUFFIX: &str = ".pls";
/// Longest name a station button shows untouched.
const MAX_LABEL_CHARS: usize = 28;
const TRUNCATED_LABEL_CHARS: usize = 25;

const STATION_QUERY: &str = "SELECT id, name, station, genre, country \
     FROM cfg_radio \
     WHERE type = 'r' \
     ORDER BY name";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("station database not found at {0}")]
    Missing(String),
    #[error("station database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Station {
    pub id: i64,
    /// Display name with the archive suffix already removed.
    pub name: String,
    pub stream_url: String,
    pub genre: String,
    pub country: String,
}

/// Read every radio row, ordered by name.
pub fn load_stations(db_path: &Path) -> Result<Vec<Station>, CatalogError> {
    if !db_path.exists() {
        return Err(CatalogError::Missing(db_path.display().to_string()));
    }
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let mut stmt = conn.prepare(STATION_QUERY)?;
    let rows = stmt.query_map([], |row| {
        let stream_url: Option<String> = row.get(2)?;
        let Some(stream_url) = stream_url.filter(|url| !url.trim().is_empty()) else {
            return Ok(None);
        };
        let name: String = row.get::<_, Option<String>>(1)?.unwrap_or_default();
        Ok(Some(Station {
            id: row.get(0)?,
            name: strip_archive_suffix(&name).to_string(),
            stream_url,
            genre: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            country: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        }))
    })?;

    let mut stations = Vec::new();
    let mut skipped = 0;
    for station in rows {
        match station? {
            Some(station) => stations.push(station),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("skipped {} radio rows without a stream URL", skipped);
    }
    Ok(stations)
}

pub fn strip_archive_suffix(name: &str) -> &str {
    name.strip_suffix(ARCHIVE_SUFFIX).unwrap_or(name)
}

/// Label for a station button: suffix removed, long names cut with `...`.
pub fn display_name(name: &str) -> String {
    let name = strip_archive_suffix(name);
    if name.chars().count() > MAX_LABEL_CHARS {
        let head: String = name.chars().take(TRUNCATED_LABEL_CHARS).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

/// The station list, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    stations: Vec<Station>,
}

impl StationCatalog {
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    /// Load from the database; an unreadable database yields an empty catalog.
    pub fn load(db_path: &Path) -> Self {
        match load_stations(db_path) {
            Ok(stations) => {
                let catalog = Self::new(stations);
                info!(
                    "Loaded {} stations, {} pages",
                    catalog.len(),
                    Pager::new(catalog.len()).page_count()
                );
                catalog
            }
            Err(e) => {
                warn!("Error loading stations: {}", e);
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn page(&self, pager: &Pager) -> &[Station] {
        &self.stations[pager.page_range()]
    }
}

/// Clamped page cursor over a fixed item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
    total: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Pager {
    pub fn new(total: usize) -> Self {
        Self::with_page_size(total, PAGE_SIZE)
    }

    pub fn with_page_size(total: usize, page_size: usize) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
            total,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    /// Advance one page; returns false (and stays put) on the last page.
    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Item indices shown on the current page.
    pub fn page_range(&self) -> Range<usize> {
        let start = (self.page * self.page_size).min(self.total);
        let end = (start + self.page_size).min(self.total);
        start..end
    }

    /// Absolute item index of slot `slot` on the current page, if occupied.
    pub fn index_of_slot(&self, slot: usize) -> Option<usize> {
        let range = self.page_range();
        let idx = range.start + slot;
        (slot < self.page_size && idx < range.end).then_some(idx)
    }

    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page + 1, self.page_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirteen_stations_make_three_pages() {
        let mut pager = Pager::new(13);
        assert_eq!(pager.page_count(), 3);
        assert!(!pager.has_prev());
        assert!(pager.has_next());
        assert_eq!(pager.page_range(), 0..6);

        assert!(pager.next());
        assert!(pager.next());
        assert_eq!(pager.page(), 2);
        assert_eq!(pager.page_range().len(), 1);
        assert!(pager.has_prev());
        assert!(!pager.has_next());
        assert_eq!(pager.label(), "Page 3 of 3");
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut pager = Pager::new(13);
        assert!(!pager.prev());
        assert_eq!(pager.page(), 0);
        pager.next();
        pager.next();
        assert!(!pager.next());
        assert_eq!(pager.page(), 2);
    }

    #[test]
    fn exact_multiple_and_empty() {
        assert_eq!(Pager::new(12).page_count(), 2);
        assert_eq!(Pager::new(6).page_count(), 1);
        let empty = Pager::new(0);
        assert_eq!(empty.page_count(), 0);
        assert!(!empty.has_next());
        assert!(!empty.has_prev());
        assert_eq!(empty.page_range(), 0..0);
    }

    #[test]
    fn slots_map_to_indices() {
        let mut pager = Pager::new(13);
        pager.next();
        assert_eq!(pager.index_of_slot(0), Some(6));
        assert_eq!(pager.index_of_slot(5), Some(11));
        assert_eq!(pager.index_of_slot(6), None);
        pager.next();
        assert_eq!(pager.index_of_slot(0), Some(12));
        assert_eq!(pager.index_of_slot(1), None);
    }

    #[test]
    fn catalog_pages() {
        let stations = (0..13)
            .map(|i| Station {
                id: i,
                name: format!("Station {i:02}"),
                ..Station::default()
            })
            .collect();
        let catalog = StationCatalog::new(stations);
        let mut pager = Pager::new(catalog.len());
        assert_eq!(catalog.page(&pager).len(), 6);
        pager.next();
        pager.next();
        let last = catalog.page(&pager);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].name, "Station 12");
    }

    #[test]
    fn archive_suffix_is_stripped() {
        assert_eq!(strip_archive_suffix("Radio Paradise.pls"), "Radio Paradise");
        assert_eq!(strip_archive_suffix("FIP"), "FIP");
        assert_eq!(display_name("Radio Paradise.pls"), "Radio Paradise");
    }

    #[test]
    fn long_names_are_truncated() {
        let exact = "a".repeat(28);
        assert_eq!(display_name(&exact), exact);

        let long = "BBC Radio 3 Unwind Classical Evenings";
        let label = display_name(long);
        assert_eq!(label, "BBC Radio 3 Unwind Classi...");
        assert_eq!(label.chars().count(), 28);
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let name = "Ö1 Österreichischer Rundfunk Klassik";
        let label = display_name(name);
        assert!(label.ends_with("..."));
        assert_eq!(label.chars().count(), 28);
    }

    #[test]
    fn missing_database_is_an_error() {
        let err = load_stations(Path::new("/nonexistent/moode.db")).unwrap_err();
        assert!(matches!(err, CatalogError::Missing(_)));
        assert!(StationCatalog::load(Path::new("/nonexistent/moode.db")).is_empty());
    }
}
