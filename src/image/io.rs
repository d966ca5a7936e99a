//! Convenience helpers for loading and saving images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use std::path::Path;

use crate::image::OwnedImage;
use crate::util::{ScaleFuseError, ScaleFuseResult};
use crate::volume::DisparityMap;

/// Creates an owned 3-channel `f32` image from a dynamic image.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> ScaleFuseResult<OwnedImage> {
    let rgb = img.to_rgb32f();
    let width = rgb.width() as usize;
    let height = rgb.height() as usize;
    OwnedImage::from_vec(rgb.into_raw(), width, height)
}

/// Loads an image from disk and converts it to 3-channel `f32`.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> ScaleFuseResult<OwnedImage> {
    let img = image::open(path).map_err(|err| ScaleFuseError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}

/// Loads a rectified stereo pair from two files.
pub fn load_stereo_pair<P: AsRef<Path>>(
    left: P,
    right: P,
) -> ScaleFuseResult<(OwnedImage, OwnedImage)> {
    Ok((load_rgb_image(left)?, load_rgb_image(right)?))
}

/// Converts a disparity map to a grayscale image.
///
/// Values are normalized by `max_scaled` (the largest scaled disparity the
/// level can produce) so the full range maps onto 0..=255; pass 0 to keep raw
/// values, clamped to 255.
pub fn disparity_to_gray(map: &DisparityMap, max_scaled: u16) -> image::GrayImage {
    let mult = if max_scaled > 0 {
        255.0 / f32::from(max_scaled)
    } else {
        1.0
    };
    let mut out = image::GrayImage::new(map.width() as u32, map.height() as u32);
    for y in 0..map.height() {
        for x in 0..map.width() {
            let value = f32::from(map.get(x, y).expect("position in bounds")) * mult;
            *out.get_pixel_mut(x as u32, y as u32) = image::Luma([value.clamp(0.0, 255.0) as u8]);
        }
    }
    out
}

/// Saves a disparity map as a normalized grayscale image.
pub fn save_disparity<P: AsRef<Path>>(
    path: P,
    map: &DisparityMap,
    max_scaled: u16,
) -> ScaleFuseResult<()> {
    disparity_to_gray(map, max_scaled)
        .save(path)
        .map_err(|err| ScaleFuseError::ImageIo {
            reason: err.to_string(),
        })
}
