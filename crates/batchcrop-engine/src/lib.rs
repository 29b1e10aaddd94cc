//! Batchcrop Engine - the session layer an interactive front end embeds
//!
//! This crate orchestrates `batchcrop-core` for a live editing session:
//!
//! - `source` - image ingestion and batch membership, with lazily decoded,
//!   write-once bitmap caches
//! - `render` - one image + one normalized region -> one encoded crop, run
//!   on the blocking pool so the editing thread never stalls on pixel work
//! - `export` - the concurrent batch pipeline producing a single ZIP archive
//! - `preview` - debounced thumbnail regeneration with generation-token
//!   cancellation while the user drags the crop box
//! - `settings` - the persisted aspect-ratio preference
//!
//! There is no CLI or network surface; the front end calls these APIs
//! directly and owns file pickers, the crop tool, and saving the returned
//! archive to disk.

mod export;
mod preview;
mod render;
mod settings;
mod source;

pub use export::{export_batch, ExportError, ExportedArchive, ARCHIVE_FILE_NAME};
pub use preview::{PreviewConfig, PreviewEvent, PreviewGenerator};
pub use render::{
    render_crop, render_preview, RenderError, RenderedCrop, EXPORT_JPEG_QUALITY,
    PREVIEW_MAX_EDGE,
};
pub use settings::{SettingsStore, ASPECT_RATIO_PRESETS, DEFAULT_ASPECT_RATIO};
pub use source::{Batch, ImageId, IngestError, SourceImage};
