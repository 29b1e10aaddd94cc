//! Rendering a normalized region against one source image.
//!
//! One call = decode (cached) -> crop -> optional thumbnail downscale ->
//! encode, with all pixel work on the blocking pool so interactive crop
//! editing never stalls behind it. Each render operates on its own source
//! and a copied region value; there is no shared mutable state between
//! concurrent renders.

use std::sync::Arc;

use batchcrop_core::decode::preview_thumbnail;
use batchcrop_core::{
    apply_crop, encode_jpeg, CropError, DecodeError, EncodeError, NormalizedCropRegion,
};
use thiserror::Error;

use crate::source::{ImageId, SourceImage};

/// JPEG quality applied to every rendered crop, previews and exports alike.
pub const EXPORT_JPEG_QUALITY: u8 = 95;

/// Bounding box for preview thumbnails, longest edge in pixels.
pub const PREVIEW_MAX_EDGE: u32 = 256;

/// Why a single image could not be rendered.
///
/// Always recovered locally: the export pipeline skips the image and keeps
/// going, the preview generator just leaves that thumbnail blank.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The blocking task was cancelled or panicked.
    #[error("render task failed: {0}")]
    Task(String),
}

/// An encoded crop produced for one source image.
///
/// Transient: handed to the archive packager or the preview consumer and
/// not retained afterwards.
#[derive(Debug)]
pub struct RenderedCrop {
    pub id: ImageId,
    pub display_name: String,
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

/// Render the region against `source` at full export resolution.
pub async fn render_crop(
    source: &SourceImage,
    region: &NormalizedCropRegion,
) -> Result<RenderedCrop, RenderError> {
    render(source, region, None).await
}

/// Render the region against `source` downscaled to thumbnail size.
pub async fn render_preview(
    source: &SourceImage,
    region: &NormalizedCropRegion,
) -> Result<RenderedCrop, RenderError> {
    render(source, region, Some(PREVIEW_MAX_EDGE)).await
}

async fn render(
    source: &SourceImage,
    region: &NormalizedCropRegion,
    max_edge: Option<u32>,
) -> Result<RenderedCrop, RenderError> {
    let bitmap: Arc<_> = source.bitmap().await?;
    let region = *region;
    let id = source.id();
    let display_name = source.display_name().to_owned();

    tokio::task::spawn_blocking(move || {
        let cropped = apply_crop(&bitmap, &region)?;
        let cropped = match max_edge {
            Some(edge) => preview_thumbnail(&cropped, edge)?,
            None => cropped,
        };
        let jpeg = encode_jpeg(&cropped, EXPORT_JPEG_QUALITY)?;
        Ok(RenderedCrop {
            id,
            display_name,
            width: cropped.width,
            height: cropped.height,
            jpeg,
        })
    })
    .await
    .map_err(|e| RenderError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Batch;
    use batchcrop_core::{decode_bytes, normalize, CropRegion, DecodedImage};

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DecodedImage::new(
            width,
            height,
            vec![60u8; width as usize * height as usize * 3],
        );
        encode_jpeg(&img, 95).unwrap()
    }

    #[tokio::test]
    async fn full_resolution_render_follows_fractions() {
        let batch = Batch::new();
        let id = batch.ingest(jpeg_bytes(100, 80), "a.jpg").unwrap();
        let source = batch.get(id).unwrap();

        let crop = CropRegion {
            x: 20.0,
            y: 16.0,
            width: 40.0,
            height: 32.0,
        };
        let rendered = render_crop(&source, &normalize(&crop, 100, 80))
            .await
            .unwrap();

        assert_eq!((rendered.width, rendered.height), (40, 32));
        assert_eq!(rendered.id, id);
        assert_eq!(rendered.display_name, "a.jpg");

        let decoded = decode_bytes(&rendered.jpeg).unwrap();
        assert_eq!((decoded.width, decoded.height), (40, 32));
    }

    #[tokio::test]
    async fn same_region_remaps_per_target_resolution() {
        let batch = Batch::new();
        let small = batch.ingest(jpeg_bytes(100, 80), "small.jpg").unwrap();
        let large = batch.ingest(jpeg_bytes(200, 160), "large.jpg").unwrap();

        let region = normalize(
            &CropRegion {
                x: 25.0,
                y: 20.0,
                width: 50.0,
                height: 40.0,
            },
            100,
            80,
        );

        let a = render_crop(&batch.get(small).unwrap(), &region).await.unwrap();
        let b = render_crop(&batch.get(large).unwrap(), &region).await.unwrap();

        assert_eq!((a.width, a.height), (50, 40));
        assert_eq!((b.width, b.height), (100, 80));
    }

    #[tokio::test]
    async fn preview_is_bounded_by_thumbnail_edge() {
        let batch = Batch::new();
        let id = batch.ingest(jpeg_bytes(1200, 800), "big.jpg").unwrap();
        let source = batch.get(id).unwrap();

        let rendered = render_preview(&source, &NormalizedCropRegion::FULL)
            .await
            .unwrap();
        assert!(rendered.width <= PREVIEW_MAX_EDGE);
        assert!(rendered.height <= PREVIEW_MAX_EDGE);
    }

    #[tokio::test]
    async fn degenerate_region_is_an_error_value() {
        let batch = Batch::new();
        let id = batch.ingest(jpeg_bytes(1, 1), "tiny.jpg").unwrap();
        let source = batch.get(id).unwrap();

        let region = NormalizedCropRegion {
            left: 0.2,
            top: 0.2,
            width: 0.4,
            height: 0.4,
        };
        let result = render_crop(&source, &region).await;
        assert!(matches!(result, Err(RenderError::Crop(_))));
    }
}
