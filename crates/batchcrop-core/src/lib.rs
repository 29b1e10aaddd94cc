//! Batchcrop Core - pixel operations for batch relative cropping
//!
//! One crop rectangle is defined interactively against a single reference
//! image, converted into resolution-independent fractions, and reapplied to
//! every other image in the batch at that image's own native size. This crate
//! holds the synchronous half of that pipeline: byte decoding, crop
//! remapping, preview downscaling, and JPEG encoding.
//!
//! Scheduling, bitmap caching, archive packaging, and settings persistence
//! live in `batchcrop-engine`.

pub mod decode;
pub mod encode;
pub mod transform;

pub use decode::{decode_bytes, probe_dimensions, DecodeError, DecodedImage};
pub use encode::{encode_jpeg, EncodeError};
pub use transform::{apply_crop, normalize, CropError, CropRegion, NormalizedCropRegion};
