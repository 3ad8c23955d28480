use std::path::{Path, PathBuf};

const APP_DIR: &str = "moode-panel";

pub fn data_dir() -> PathBuf {
    // ~/.local/share/moode-panel/ (XDG layout, also on the appliance's minimal images)
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".local")
        .join("share")
        .join(APP_DIR)
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(APP_DIR)
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var("PATH").ok()?;
    path.split(':')
        .map(|dir| PathBuf::from(dir).join(name))
        .find(|p| p.exists())
}

/// Resolve the player-control binary.
///
/// Order: `MPC_PATH` env override, the configured value if it is already a
/// path, then a `PATH` lookup of the configured name. Falls back to the
/// configured value unchanged so the spawn error surfaces in the log.
pub fn find_mpc_binary(configured: &str) -> PathBuf {
    if let Ok(p) = std::env::var("MPC_PATH") {
        let path = PathBuf::from(p);
        if path.exists() {
            return path;
        }
    }

    let as_path = Path::new(configured);
    if as_path.components().count() > 1 {
        return as_path.to_path_buf();
    }

    find_on_path(configured).unwrap_or_else(|| as_path.to_path_buf())
}
