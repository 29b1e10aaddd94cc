//! Crop rectangle types and normalization.

use serde::{Deserialize, Serialize};

/// An absolute crop rectangle in pixel units.
///
/// Always interpreted against the native dimensions of the reference image
/// it was defined on, never against an on-screen rendered size - mapping
/// screen coordinates back to native pixels is the crop tool's job.
/// Coordinates are `f64` because the tool may report sub-pixel positions
/// after that mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A crop rectangle as fractions of an image's dimensions.
///
/// Resolution-independent: the same value can be reapplied to images of any
/// size. Fractions are NOT guaranteed to lie in `[0, 1]` - a crop box
/// dragged past an image edge produces out-of-range values, and clamping is
/// deferred to [`apply_crop`](super::apply_crop), which knows each target's
/// bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCropRegion {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedCropRegion {
    /// The full image, for callers that want an identity crop.
    pub const FULL: NormalizedCropRegion = NormalizedCropRegion {
        left: 0.0,
        top: 0.0,
        width: 1.0,
        height: 1.0,
    };
}

/// Convert an absolute crop rectangle into fractions of the reference image.
///
/// Pure and deterministic, cheap enough to call on every crop-change event.
/// `ref_width` and `ref_height` must be the reference image's native pixel
/// dimensions and must be positive.
pub fn normalize(crop: &CropRegion, ref_width: u32, ref_height: u32) -> NormalizedCropRegion {
    debug_assert!(ref_width > 0 && ref_height > 0, "reference dimensions must be positive");
    let w = f64::from(ref_width);
    let h = f64::from(ref_height);
    NormalizedCropRegion {
        left: crop.x / w,
        top: crop.y / h,
        width: crop.width / w,
        height: crop.height / h,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_are_exact_ratios() {
        let crop = CropRegion {
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
        };
        let region = normalize(&crop, 100, 80);

        assert_eq!(region.left, 0.1);
        assert_eq!(region.top, 0.25);
        assert_eq!(region.width, 0.3);
        assert_eq!(region.height, 0.5);
    }

    #[test]
    fn deterministic() {
        let crop = CropRegion {
            x: 13.5,
            y: 7.25,
            width: 99.0,
            height: 51.0,
        };
        assert_eq!(normalize(&crop, 640, 480), normalize(&crop, 640, 480));
    }

    #[test]
    fn edge_overflow_passes_through() {
        // Crop box dragged past the right/bottom edge: fractions exceed 1
        // and are not clamped here.
        let crop = CropRegion {
            x: 80.0,
            y: 70.0,
            width: 50.0,
            height: 30.0,
        };
        let region = normalize(&crop, 100, 80);

        assert!(region.left + region.width > 1.0);
        assert!(region.top + region.height > 1.0);
        assert_eq!(region.width, 0.5);
    }

    #[test]
    fn negative_offset_passes_through() {
        let crop = CropRegion {
            x: -10.0,
            y: 0.0,
            width: 50.0,
            height: 50.0,
        };
        let region = normalize(&crop, 100, 100);
        assert_eq!(region.left, -0.1);
    }

    #[test]
    fn full_constant_is_identity() {
        assert_eq!(
            NormalizedCropRegion::FULL,
            normalize(
                &CropRegion {
                    x: 0.0,
                    y: 0.0,
                    width: 200.0,
                    height: 100.0
                },
                200,
                100
            )
        );
    }
}
