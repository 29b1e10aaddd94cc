//! Crop remapping: one absolute rectangle, many target resolutions.
//!
//! The interactive crop tool produces an absolute pixel rectangle against
//! the reference image's native dimensions. `normalize` turns that rectangle
//! into fractions of the reference size; `apply_crop` scales the fractions
//! by each target's own dimensions and extracts the matching pixels.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner
//! - Absolute coordinates are native pixels of the reference image
//! - Normalized coordinates are fractions of an image's width/height
//!
//! Clamping happens only at apply time, per target. A region dragged past
//! one edge of the reference can still be valid on a larger target, so the
//! normalizer deliberately passes out-of-range fractions through unchanged.

mod crop;
mod region;

pub use crop::{apply_crop, CropError};
pub use region::{normalize, CropRegion, NormalizedCropRegion};
