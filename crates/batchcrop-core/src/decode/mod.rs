//! Image decoding for crop sources.
//!
//! Source images arrive as raw file bytes from the file-picking layer; this
//! module turns them into pixel-addressable bitmaps. Ingestion only probes
//! the header for dimensions, while the full decode happens lazily on first
//! use (the engine caches the result for the lifetime of the source).
//!
//! EXIF orientation is applied during decode so that crop fractions always
//! address the pixels the way the user saw them when defining the region.
//! `probe_dimensions` reports orientation-corrected dimensions for the same
//! reason.

mod bytes;
mod resize;
mod types;

pub use bytes::{decode_bytes, probe_dimensions};
pub use resize::{preview_thumbnail, resize_to_fit};
pub use types::{DecodeError, DecodedImage, Orientation};
