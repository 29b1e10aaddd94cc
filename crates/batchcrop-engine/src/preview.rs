//! Debounced live previews for the non-reference images.
//!
//! Every crop-box movement produces a region update; re-rendering the whole
//! batch on each one would lag the drag. The generator therefore debounces:
//! updates arriving within the quiet window are coalesced and only the
//! latest region triggers a pass. Each update bumps a generation counter,
//! and results carrying a stale generation are discarded rather than
//! delivered out of order - a newer preview is never overwritten by an
//! older one.
//!
//! The reference image is skipped (the crop tool already shows it live),
//! and per-image failures are silent here; failures only become user
//! visible at export time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use batchcrop_core::NormalizedCropRegion;
use tokio::sync::{mpsc, watch};

use crate::render::render_preview;
use crate::source::{Batch, ImageId};

/// Quiet window after the last region update before a pass starts.
pub const PREVIEW_DEBOUNCE: Duration = Duration::from_millis(500);

/// Tuning for the generator; tests shorten the debounce window.
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    pub debounce: Duration,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            debounce: PREVIEW_DEBOUNCE,
        }
    }
}

/// A freshly rendered thumbnail for one non-reference image.
#[derive(Debug)]
pub struct PreviewEvent {
    pub generation: u64,
    pub id: ImageId,
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

#[derive(Debug, Clone)]
struct PreviewRequest {
    generation: u64,
    region: NormalizedCropRegion,
    reference: ImageId,
}

/// Handle to the spawned preview worker.
///
/// Dropping the handle aborts the worker and any in-flight pass.
pub struct PreviewGenerator {
    requests: watch::Sender<Option<PreviewRequest>>,
    generation: Arc<AtomicU64>,
    worker: tokio::task::JoinHandle<()>,
}

impl PreviewGenerator {
    /// Spawn the worker; fresh thumbnails arrive on the returned receiver.
    pub fn spawn(
        batch: Batch,
        config: PreviewConfig,
    ) -> (Self, mpsc::UnboundedReceiver<PreviewEvent>) {
        let (requests, request_rx) = watch::channel(None);
        let (events, event_rx) = mpsc::unbounded_channel();
        let generation = Arc::new(AtomicU64::new(0));

        let worker = tokio::spawn(worker_loop(
            batch,
            request_rx,
            events,
            Arc::clone(&generation),
            config.debounce,
        ));

        (
            Self {
                requests,
                generation,
                worker,
            },
            event_rx,
        )
    }

    /// Called by the crop tool on every region change.
    ///
    /// `reference` is the image the region was defined on; it gets no
    /// preview of its own.
    pub fn region_changed(&self, region: NormalizedCropRegion, reference: ImageId) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.requests.send(Some(PreviewRequest {
            generation,
            region,
            reference,
        }));
    }

    /// Invalidate all pending and in-flight work.
    ///
    /// Call after batch mutation or a reference-image change: results tied
    /// to the old state are then discarded instead of delivered.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for PreviewGenerator {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn worker_loop(
    batch: Batch,
    mut requests: watch::Receiver<Option<PreviewRequest>>,
    events: mpsc::UnboundedSender<PreviewEvent>,
    generation: Arc<AtomicU64>,
    debounce: Duration,
) {
    loop {
        if requests.changed().await.is_err() {
            return;
        }

        // Debounce: every further update restarts the quiet window, so a
        // burst of drag events collapses into the single latest region.
        loop {
            tokio::select! {
                changed = requests.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        let request = match requests.borrow().clone() {
            Some(request) => request,
            None => continue,
        };
        run_pass(&batch, &request, &events, &generation).await;
    }
}

async fn run_pass(
    batch: &Batch,
    request: &PreviewRequest,
    events: &mpsc::UnboundedSender<PreviewEvent>,
    generation: &AtomicU64,
) {
    for source in batch.snapshot() {
        if source.id() == request.reference {
            continue;
        }
        // Superseded while rendering earlier images in this pass
        if generation.load(Ordering::SeqCst) != request.generation {
            log::debug!("preview: pass for generation {} superseded", request.generation);
            return;
        }

        match render_preview(&source, &request.region).await {
            Ok(crop) => {
                // A newer region may have arrived while this one rendered;
                // stale results are dropped, never delivered.
                if generation.load(Ordering::SeqCst) == request.generation {
                    let _ = events.send(PreviewEvent {
                        generation: request.generation,
                        id: crop.id,
                        width: crop.width,
                        height: crop.height,
                        jpeg: crop.jpeg,
                    });
                }
            }
            Err(err) => {
                log::debug!("preview: {} skipped: {err}", source.display_name());
            }
        }
    }
}
