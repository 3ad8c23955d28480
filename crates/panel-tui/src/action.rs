//! Action enum — every user intent the UI can produce.

/// Identifier for each on-screen component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    NowPlaying,
    Controls,
    StationBrowser,
}

/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ── Playback ─────────────────────────────────────────────────────────────
    TogglePlay,
    Next,
    Prev,

    // ── Volume ───────────────────────────────────────────────────────────────
    VolumeUp,
    VolumeDown,
    ToggleMute,

    // ── Station browser ──────────────────────────────────────────────────────
    OpenBrowser,
    CloseBrowser,
    NextPage,
    PrevPage,
    /// Catalog index of the chosen station.
    PlayStation(usize),

    Quit,
}
