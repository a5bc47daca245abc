//! Image codec collaborator
//!
//! The parallel engine only ever talks to a [`Codec`]: decode a path into an
//! owned image, mark it, encode it to a path. [`ImageCodec`] is the real
//! implementation on top of the `image` crate; tests plug in fakes.

use crate::error::MarkError;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Decode / mark / encode operations used by every stage
pub trait Codec: Send + Sync {
    /// Owned decoded image, moved between threads with its job
    type Image: Send;

    fn decode(&self, path: &Path) -> Result<Self::Image, MarkError>;

    fn apply_mark(&self, image: &mut Self::Image, path: &Path) -> Result<(), MarkError>;

    fn encode(&self, image: &Self::Image, path: &Path) -> Result<(), MarkError>;
}

/// Rectangle of the image the mark is applied to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkRegion {
    #[serde(default)]
    pub origin_x: u32,
    #[serde(default)]
    pub origin_y: u32,
    /// None = up to the right edge
    #[serde(default)]
    pub width: Option<u32>,
    /// None = up to the bottom edge
    #[serde(default)]
    pub height: Option<u32>,
}

/// Codec backed by the `image` crate, holding the decoded mark
#[derive(Debug, Clone)]
pub struct ImageCodec {
    mark: RgbImage,
    region: MarkRegion,
}

impl ImageCodec {
    pub fn new(mark: RgbImage, region: MarkRegion) -> Self {
        Self { mark, region }
    }

    /// Load the mark image from disk
    pub fn load(mark_path: &Path, region: MarkRegion) -> Result<Self, MarkError> {
        let mark = image::open(mark_path)
            .map_err(|source| MarkError::Decode {
                path: mark_path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        tracing::debug!(
            "Loaded mark {} ({}x{})",
            mark_path.display(),
            mark.width(),
            mark.height()
        );
        Ok(Self::new(mark, region))
    }
}

impl Codec for ImageCodec {
    type Image = RgbImage;

    fn decode(&self, path: &Path) -> Result<RgbImage, MarkError> {
        let decoded = image::open(path).map_err(|source| MarkError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(decoded.to_rgb8())
    }

    fn apply_mark(&self, image: &mut RgbImage, path: &Path) -> Result<(), MarkError> {
        if self.mark.width() == 0 || self.mark.height() == 0 {
            return Err(MarkError::Mark {
                path: path.to_path_buf(),
                reason: "mark image is empty".to_string(),
            });
        }
        let region = self.region;
        let width = region.width.unwrap_or(image.width());
        let height = region.height.unwrap_or(image.height());
        apply_mark(image, &self.mark, region.origin_x, region.origin_y, width, height);
        Ok(())
    }

    fn encode(&self, image: &RgbImage, path: &Path) -> Result<(), MarkError> {
        image.save(path).map_err(|source| MarkError::Encode {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Gray level written over marked pixels: halfway between the channel mean
/// and white.
pub fn gray_scale(r: u8, g: u8, b: u8) -> u8 {
    let mean = (u32::from(r) + u32::from(g) + u32::from(b)) / 3;
    ((mean + 255) / 2) as u8
}

/// Gray out every pixel of the rectangle whose mark pixel is pure black.
///
/// Mark and image share the same coordinate space. The rectangle is clipped
/// to both bounds, so a mark smaller than the image only covers its own area.
pub fn apply_mark(
    image: &mut RgbImage,
    mark: &RgbImage,
    origin_x: u32,
    origin_y: u32,
    width: u32,
    height: u32,
) {
    let end_x = origin_x
        .saturating_add(width)
        .min(image.width())
        .min(mark.width());
    let end_y = origin_y
        .saturating_add(height)
        .min(image.height())
        .min(mark.height());

    for y in origin_y..end_y {
        for x in origin_x..end_x {
            let [mr, mg, mb] = mark.get_pixel(x, y).0;
            if mr != 0 || mg != 0 || mb != 0 {
                continue;
            }
            let pixel = image.get_pixel_mut(x, y);
            let [r, g, b] = pixel.0;
            let gray = gray_scale(r, g, b);
            pixel.0 = [gray, gray, gray];
        }
    }
}
