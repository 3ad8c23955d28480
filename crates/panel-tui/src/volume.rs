use tracing::{debug, info, warn};

use panel_proto::mpc;
use panel_proto::state::VolumeState;

use crate::player::PlayerControl;

/// Step applied by the `−` / `+` controls.
pub const VOLUME_STEP: i32 = 5;

/// Mixer level plus a mute flag the player tool knows nothing about.
#[derive(Debug, Default)]
pub struct VolumeController {
    state: VolumeState,
}

impl VolumeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> VolumeState {
        self.state
    }

    /// Fold a level read from the tool into the remembered state.
    ///
    /// Reading 0 while a level is remembered means the panel muted it.
    pub fn observe(&mut self, level: u8) {
        if level == 0 {
            if self.state.level > 0 {
                self.state.muted = true;
            }
        } else {
            self.state.muted = false;
            self.state.level = level;
        }
    }

    /// Read `mpc volume`; unreadable output keeps the current state.
    pub async fn refresh(&mut self, player: &dyn PlayerControl) {
        match player.volume().await {
            Ok(out) if !out.is_error() => match mpc::parse_volume(&out.stdout) {
                Some(level) => self.observe(level),
                None => debug!("volume: unparsable {:?}", out.stdout.trim()),
            },
            Ok(out) => debug!("volume: mpc failed: {}", out.stderr.trim()),
            Err(e) => debug!("volume: {}", e),
        }
    }

    pub async fn set_volume(&mut self, player: &dyn PlayerControl, level: i32) {
        let level = level.clamp(0, 100) as u8;
        self.send(player, level).await;
        self.state.level = level;
        if level > 0 {
            self.state.muted = false;
        }
    }

    pub async fn volume_up(&mut self, player: &dyn PlayerControl) {
        if self.state.muted {
            self.toggle_mute(player).await;
        } else {
            self.set_volume(player, self.state.level as i32 + VOLUME_STEP)
                .await;
        }
    }

    pub async fn volume_down(&mut self, player: &dyn PlayerControl) {
        if self.state.muted {
            self.toggle_mute(player).await;
        } else {
            self.set_volume(player, self.state.level as i32 - VOLUME_STEP)
                .await;
        }
    }

    /// Mute sends 0 but keeps the remembered level; unmute restores it.
    pub async fn toggle_mute(&mut self, player: &dyn PlayerControl) {
        if self.state.muted {
            self.send(player, self.state.level).await;
            self.state.muted = false;
            info!("Unmuted, volume {}", self.state.level);
        } else {
            self.send(player, 0).await;
            self.state.muted = true;
            info!("Muted (remembered {})", self.state.level);
        }
    }

    async fn send(&self, player: &dyn PlayerControl, level: u8) {
        match player.set_volume(level).await {
            Ok(out) if out.is_error() => warn!("mpc volume {}: {}", level, out.stderr.trim()),
            Ok(_) => debug!("mpc volume {}", level),
            Err(e) => warn!("mpc volume {}: {}", level, e),
        }
    }
}
