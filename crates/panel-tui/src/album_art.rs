//! Album-art backdrop: fetch, cover-scale, crop, blur, dim.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info};

use panel_proto::config::DisplayConfig;

#[derive(Debug, Error)]
pub enum ArtError {
    #[error("art request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("art decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("art worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// A processed backdrop. `generation` changes whenever the image does.
#[derive(Debug, Clone)]
pub struct Backdrop {
    pub generation: u64,
    pub image: Arc<RgbImage>,
}

/// Target geometry and treatment for the backdrop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtStyle {
    pub width: u32,
    pub height: u32,
    pub blur_sigma: f32,
    pub brightness: f32,
}

impl From<&DisplayConfig> for ArtStyle {
    fn from(c: &DisplayConfig) -> Self {
        Self {
            width: c.width.max(1),
            height: c.height.max(1),
            blur_sigma: c.blur_sigma,
            brightness: c.brightness.clamp(0.0, 1.0),
        }
    }
}

pub struct ArtLoader {
    client: reqwest::Client,
    style: ArtStyle,
}

impl ArtLoader {
    pub fn new(display: &DisplayConfig) -> Result<Self, ArtError> {
        let client = reqwest::Client::builder()
            .timeout(display.art_timeout())
            .build()?;
        Ok(Self {
            client,
            style: ArtStyle::from(display),
        })
    }

    /// Download and process `url`. Image work runs on the blocking pool.
    pub async fn load(&self, url: &str) -> Result<RgbImage, ArtError> {
        debug!("Loading album art: {}", url);
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let style = self.style;
        let image = tokio::task::spawn_blocking(move || process(&bytes, style)).await??;
        info!("Album art loaded ({} bytes)", image.len());
        Ok(image)
    }
}

/// Decode `bytes` and apply the full backdrop treatment.
pub fn process(bytes: &[u8], style: ArtStyle) -> Result<RgbImage, ArtError> {
    let img = image::load_from_memory(bytes)?.to_rgb8();
    let filled = cover(&img, style.width, style.height);
    let mut blurred = if style.blur_sigma > 0.0 {
        imageops::blur(&filled, style.blur_sigma)
    } else {
        filled
    };
    darken(&mut blurred, style.brightness);
    Ok(blurred)
}

/// Size that covers `dst` while keeping the source aspect ratio.
pub fn cover_size(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32) {
    let ratio = f64::max(
        dst_w as f64 / src_w.max(1) as f64,
        dst_h as f64 / src_h.max(1) as f64,
    );
    let w = ((src_w as f64 * ratio).round() as u32).max(dst_w);
    let h = ((src_h as f64 * ratio).round() as u32).max(dst_h);
    (w, h)
}

/// Scale to cover, then crop the center to exactly `w`×`h`.
pub fn cover(img: &RgbImage, w: u32, h: u32) -> RgbImage {
    let (sw, sh) = cover_size(img.width(), img.height(), w, h);
    let scaled = imageops::resize(img, sw, sh, FilterType::Lanczos3);
    let left = (sw - w) / 2;
    let top = (sh - h) / 2;
    imageops::crop_imm(&scaled, left, top, w, h).to_image()
}

pub fn darken(img: &mut RgbImage, factor: f32) {
    for px in img.pixels_mut() {
        for c in px.0.iter_mut() {
            *c = (*c as f32 * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
}
