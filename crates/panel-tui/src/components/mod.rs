pub mod backdrop;
pub mod controls;
pub mod now_playing;
pub mod station_browser;
