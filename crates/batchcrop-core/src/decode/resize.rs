//! Downscaling for preview thumbnails.
//!
//! Previews in the side panel are small, so cropped bitmaps are resized to
//! fit a bounding box before encoding. Bilinear filtering is enough at
//! thumbnail sizes and keeps preview regeneration cheap while the user is
//! still dragging the crop box.

use super::{DecodeError, DecodedImage};

/// Resize an image so its longest edge fits `max_edge`, preserving aspect.
///
/// Images that already fit are returned as a clone.
pub fn resize_to_fit(image: &DecodedImage, max_edge: u32) -> Result<DecodedImage, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::InvalidFormat);
    }

    if image.width <= max_edge && image.height <= max_edge {
        return Ok(image.clone());
    }

    let (new_width, new_height) = fit_dimensions(image.width, image.height, max_edge);

    let rgb = image
        .to_rgb_image()
        .ok_or_else(|| DecodeError::CorruptedFile("pixel buffer mismatch".to_string()))?;
    let resized = image::imageops::resize(
        &rgb,
        new_width,
        new_height,
        image::imageops::FilterType::Triangle,
    );

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Generate a preview thumbnail bounded by `size` pixels on the longest edge.
pub fn preview_thumbnail(image: &DecodedImage, size: u32) -> Result<DecodedImage, DecodeError> {
    resize_to_fit(image, size)
}

/// Largest dimensions with the same aspect ratio fitting `max_edge`.
fn fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width >= height {
        let scaled = (f64::from(height) * f64::from(max_edge) / f64::from(width)).round() as u32;
        (max_edge, scaled.max(1))
    } else {
        let scaled = (f64::from(width) * f64::from(max_edge) / f64::from(height)).round() as u32;
        (scaled.max(1), max_edge)
    }
}
