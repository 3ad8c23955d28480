//! Shared model, configuration and parsers for the moOde touch panel.

pub mod config;
pub mod mpc;
pub mod platform;
pub mod spotmeta;
pub mod state;
pub mod stations;
