//! Applying a normalized region to a target bitmap.

use thiserror::Error;

use super::NormalizedCropRegion;
use crate::decode::DecodedImage;

/// Error produced when a remapped crop rectangle yields no pixels.
#[derive(Debug, Error)]
pub enum CropError {
    /// After rounding and clamping against the target, nothing remains.
    /// Happens when the target is tiny relative to the region, or when the
    /// region lies entirely outside the target's bounds.
    #[error("crop region degenerates to an empty rectangle on a {width}x{height} image")]
    DegenerateRegion { width: u32, height: u32 },
}

/// Scale a normalized region by the target's dimensions and extract it.
///
/// The rectangle is computed as `round(fraction * dimension)` per side, then
/// clamped so that it lies fully within the target. Deterministic: the same
/// region and bitmap always produce bit-identical output.
///
/// # Errors
///
/// Returns [`CropError::DegenerateRegion`] if the clamped rectangle has zero
/// or negative extent; callers skip such targets and keep going with the
/// rest of the batch.
pub fn apply_crop(
    image: &DecodedImage,
    region: &NormalizedCropRegion,
) -> Result<DecodedImage, CropError> {
    let w = f64::from(image.width);
    let h = f64::from(image.height);

    // Absolute rectangle in this target's own pixel space. Unclamped values
    // may be negative or extend past the image; `as i64` also collapses NaN
    // fractions to zero, which the emptiness check below rejects.
    let x = (region.left * w).round() as i64;
    let y = (region.top * h).round() as i64;
    let rect_w = (region.width * w).round() as i64;
    let rect_h = (region.height * h).round() as i64;

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + rect_w).min(i64::from(image.width));
    let y1 = (y + rect_h).min(i64::from(image.height));

    if x1 <= x0 || y1 <= y0 {
        return Err(CropError::DegenerateRegion {
            width: image.width,
            height: image.height,
        });
    }

    let out_w = (x1 - x0) as u32;
    let out_h = (y1 - y0) as u32;
    let x0 = x0 as usize;
    let y0 = y0 as usize;

    let src_stride = image.width as usize * 3;
    let out_stride = out_w as usize * 3;
    let mut pixels = vec![0u8; out_stride * out_h as usize];

    for row in 0..out_h as usize {
        let src_start = (y0 + row) * src_stride + x0 * 3;
        pixels[row * out_stride..(row + 1) * out_stride]
            .copy_from_slice(&image.pixels[src_start..src_start + out_stride]);
    }

    Ok(DecodedImage::new(out_w, out_h, pixels))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn regions() -> impl Strategy<Value = NormalizedCropRegion> {
        (-0.5f64..=1.5, -0.5f64..=1.5, 0.0f64..=1.5, 0.0f64..=1.5).prop_map(
            |(left, top, width, height)| NormalizedCropRegion {
                left,
                top,
                width,
                height,
            },
        )
    }

    proptest! {
        /// Property: successful output always lies within the target bounds
        /// and carries a consistent pixel buffer.
        #[test]
        fn prop_output_within_bounds(
            (w, h) in (1u32..=64, 1u32..=64),
            region in regions(),
        ) {
            let img = test_image(w, h);
            if let Ok(out) = apply_crop(&img, &region) {
                prop_assert!(out.width >= 1 && out.width <= w);
                prop_assert!(out.height >= 1 && out.height <= h);
                prop_assert_eq!(
                    out.pixels.len(),
                    out.width as usize * out.height as usize * 3
                );
            }
        }

        /// Property: applying the same region twice is bit-identical.
        #[test]
        fn prop_deterministic(
            (w, h) in (1u32..=64, 1u32..=64),
            region in regions(),
        ) {
            let img = test_image(w, h);
            let first = apply_crop(&img, &region);
            let second = apply_crop(&img, &region);
            match (first, second) {
                (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
                (Err(_), Err(_)) => {}
                _ => prop_assert!(false, "determinism violated"),
            }
        }

        /// Property: a region well inside [0, 1] never degenerates on a
        /// reasonably sized target.
        #[test]
        fn prop_interior_region_succeeds(
            (w, h) in (10u32..=64, 10u32..=64),
            left in 0.0f64..=0.4,
            top in 0.0f64..=0.4,
        ) {
            let img = test_image(w, h);
            let region = NormalizedCropRegion { left, top, width: 0.5, height: 0.5 };
            prop_assert!(apply_crop(&img, &region).is_ok());
        }

        /// Property: every output pixel value exists in the source image.
        #[test]
        fn prop_pixels_subset_of_source(
            (w, h) in (2u32..=32, 2u32..=32),
        ) {
            let img = test_image(w, h);
            let region = NormalizedCropRegion { left: 0.25, top: 0.25, width: 0.5, height: 0.5 };
            if let Ok(out) = apply_crop(&img, &region) {
                for chunk in out.pixels.chunks(3) {
                    prop_assert!(img.pixels.chunks(3).any(|src| src == chunk));
                }
            }
        }
    }
}
