//! Batch export: render every image, package the survivors as one archive.
//!
//! Renders fan out concurrently, bounded by available parallelism, and the
//! archive is only finalized after every task has reported back - a join
//! barrier, not a race. Individual failures are skipped and counted; only a
//! batch where nothing succeeded propagates as an error. The caller (the
//! front end's save/download facility) owns writing the returned bytes
//! anywhere.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::Arc;

use batchcrop_core::NormalizedCropRegion;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::render::{render_crop, RenderedCrop};
use crate::source::SourceImage;

/// Fixed download name of the delivered archive.
pub const ARCHIVE_FILE_NAME: &str = "batch_crop_images.zip";

/// Directory inside the archive holding the cropped entries.
const ARCHIVE_DIR: &str = "cropped_images";

/// Prefix prepended to each entry's display name.
const ENTRY_PREFIX: &str = "cropped_";

/// Failure of the export action as a whole.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Every image in the batch failed to render; no archive is produced.
    #[error("no image in the batch could be cropped ({failed} failed)")]
    BatchExportFailed { failed: usize },

    /// The archive container could not be written or finalized.
    #[error("could not package archive: {0}")]
    ArchivePackaging(String),
}

/// A packaged archive ready for delivery.
#[derive(Debug)]
pub struct ExportedArchive {
    /// Suggested file name for the download.
    pub file_name: &'static str,
    /// The complete ZIP container.
    pub bytes: Vec<u8>,
    /// Entries packaged successfully.
    pub entry_count: usize,
    /// Images skipped because their render failed.
    pub failure_count: usize,
}

/// Apply `region` to every image and package the results as one ZIP.
///
/// Entry names are deterministic: `cropped_images/cropped_<display name>`,
/// with the source image's id appended before the extension when two images
/// share a display name. Entries appear in batch order regardless of task
/// completion order. JPEG payloads are stored uncompressed.
pub async fn export_batch(
    images: Vec<Arc<SourceImage>>,
    region: &NormalizedCropRegion,
) -> Result<ExportedArchive, ExportError> {
    let total = images.len();
    if total == 0 {
        return Err(ExportError::BatchExportFailed { failed: 0 });
    }

    let parallelism = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    let permits = Arc::new(Semaphore::new(parallelism));

    let mut tasks = JoinSet::new();
    for (index, source) in images.into_iter().enumerate() {
        let permits = Arc::clone(&permits);
        let region = *region;
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            (index, render_crop(&source, &region).await)
        });
    }

    // Join barrier: wait for every task, success or failure, before
    // touching the archive.
    let mut rendered: Vec<Option<RenderedCrop>> = (0..total).map(|_| None).collect();
    let mut failures = 0usize;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(crop))) => rendered[index] = Some(crop),
            Ok((index, Err(err))) => {
                failures += 1;
                log::warn!("export: image at position {index} skipped: {err}");
            }
            Err(err) => {
                failures += 1;
                log::warn!("export: render task aborted: {err}");
            }
        }
    }

    let crops: Vec<RenderedCrop> = rendered.into_iter().flatten().collect();
    if crops.is_empty() {
        return Err(ExportError::BatchExportFailed { failed: failures });
    }

    let bytes = package(&crops)?;
    log::info!(
        "export: packaged {} of {total} images ({failures} skipped)",
        crops.len()
    );

    Ok(ExportedArchive {
        file_name: ARCHIVE_FILE_NAME,
        bytes,
        entry_count: crops.len(),
        failure_count: failures,
    })
}

fn package(crops: &[RenderedCrop]) -> Result<Vec<u8>, ExportError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    // JPEG payloads are already compressed
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut taken = HashSet::new();
    for crop in crops {
        let name = entry_name(crop, &taken);
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| ExportError::ArchivePackaging(e.to_string()))?;
        writer
            .write_all(&crop.jpeg)
            .map_err(|e| ExportError::ArchivePackaging(e.to_string()))?;
        taken.insert(name);
    }

    let cursor = writer
        .finish()
        .map_err(|e| ExportError::ArchivePackaging(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Deterministic archive entry name for one crop.
///
/// Collisions between equal display names are resolved by appending the
/// source id before the extension, so both entries stay recognizable.
fn entry_name(crop: &RenderedCrop, taken: &HashSet<String>) -> String {
    let base = format!("{ARCHIVE_DIR}/{ENTRY_PREFIX}{}", crop.display_name);
    if !taken.contains(&base) {
        return base;
    }
    match base.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{}.{ext}", crop.id),
        None => format!("{base}_{}", crop.id),
    }
}
