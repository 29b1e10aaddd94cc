//! Source images and batch membership.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use batchcrop_core::{decode_bytes, probe_dimensions, DecodedImage};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::render::RenderError;

/// Session-unique identifier for a source image.
///
/// Drawn from a process-wide monotonic counter, so ids never collide even
/// under concurrent ingestion and never repeat within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(u64);

impl ImageId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        ImageId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error raised when bytes cannot be admitted into the batch.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The header did not yield usable image dimensions.
    #[error("could not read image dimensions: {0}")]
    UnreadableImage(#[from] batchcrop_core::DecodeError),
}

/// One image in the batch.
///
/// Immutable after ingestion. Native dimensions are probed from the byte
/// header up front (orientation-corrected); the full bitmap is decoded on
/// first use and cached for the lifetime of the image, shared by every
/// preview and export pass that follows.
pub struct SourceImage {
    id: ImageId,
    display_name: String,
    bytes: Arc<[u8]>,
    width: u32,
    height: u32,
    bitmap: OnceCell<Arc<DecodedImage>>,
}

impl SourceImage {
    fn ingest(bytes: Vec<u8>, display_name: String) -> Result<Self, IngestError> {
        let (width, height) = probe_dimensions(&bytes)?;
        Ok(Self {
            id: ImageId::next(),
            display_name,
            bytes: bytes.into(),
            width,
            height,
            bitmap: OnceCell::new(),
        })
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Native width in pixels, after orientation correction.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Native height in pixels, after orientation correction.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The decoded bitmap, decoding off the async thread on first access.
    ///
    /// The cache cell is write-once: concurrent first accesses are
    /// serialized and later ones share the same `Arc`. Decode failures are
    /// not cached, so a later pass will surface the same error again.
    pub async fn bitmap(&self) -> Result<Arc<DecodedImage>, RenderError> {
        let cell = self
            .bitmap
            .get_or_try_init(|| {
                let bytes = Arc::clone(&self.bytes);
                async move {
                    tokio::task::spawn_blocking(move || decode_bytes(&bytes).map(Arc::new))
                        .await
                        .map_err(|e| RenderError::Task(e.to_string()))?
                        .map_err(RenderError::from)
                }
            })
            .await?;
        Ok(Arc::clone(cell))
    }
}

impl fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceImage")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("decoded", &self.bitmap.initialized())
            .finish()
    }
}

/// The ordered set of source images in a session.
///
/// A cheap cloneable handle. Mutation (ingest/remove) happens only on the
/// consumer-facing side; render tasks work from [`Batch::snapshot`] copies,
/// so removal never races a task that is still holding an image.
#[derive(Clone, Default)]
pub struct Batch {
    images: Arc<RwLock<Vec<Arc<SourceImage>>>>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit raw bytes into the batch, assigning a session-unique id.
    pub fn ingest(
        &self,
        bytes: Vec<u8>,
        display_name: impl Into<String>,
    ) -> Result<ImageId, IngestError> {
        let image = Arc::new(SourceImage::ingest(bytes, display_name.into())?);
        let id = image.id();
        self.images
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(image);
        Ok(id)
    }

    /// Remove an image; its bitmap cache is dropped with the last holder.
    ///
    /// Callers with an active preview generator should invalidate it after
    /// removal so in-flight work for the old membership is discarded.
    pub fn remove(&self, id: ImageId) -> bool {
        let mut images = self.images.write().unwrap_or_else(PoisonError::into_inner);
        let before = images.len();
        images.retain(|img| img.id() != id);
        images.len() != before
    }

    pub fn get(&self, id: ImageId) -> Option<Arc<SourceImage>> {
        self.images
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|img| img.id() == id)
            .cloned()
    }

    /// A point-in-time copy of the membership, in ingestion order.
    pub fn snapshot(&self) -> Vec<Arc<SourceImage>> {
        self.images
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.images
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
