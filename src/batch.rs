// ============================================================================
// BATCH FILTER RUNNER
// ============================================================================
//
// Sequences the filter pipeline across a queue of images, strictly one at a
// time in queue order. One shared parameter record can override each item's
// own. Cancellation is cooperative: a handle sets a flag that the run loop
// observes between items, never mid-transform. A single item's failure is
// recorded on that item and never aborts the batch.
// ============================================================================

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use image::RgbaImage;
use uuid::Uuid;

use crate::error::{FilterError, Result};
use crate::io::{self, SaveFormat, TiffCompression};
use crate::ops::pipeline::apply_pipeline;
use crate::params::{self, FilterParameters};

/// One queued image plus its processing state.
pub struct BatchImageItem {
    pub id: Uuid,
    /// Display name, usually the source file name.
    pub name: String,
    /// Decoded source buffer, owned by the item until removal.
    pub source: RgbaImage,
    /// Per-item parameters, used when global override is off.
    pub params: FilterParameters,
    pub processed: bool,
    pub result: Option<RgbaImage>,
    /// Failure reason from the last run, if the item failed.
    pub failure: Option<String>,
}

/// Progress snapshot handed to the run observer after every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// Index of the item that just finished (or failed).
    pub current_index: usize,
    pub completed: usize,
    pub total: usize,
}

/// Cloneable cancellation handle. `stop()` takes effect at the next
/// between-items checkpoint; the in-flight item always finishes.
#[derive(Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct BatchRunner {
    items: Vec<BatchImageItem>,
    global_params: FilterParameters,
    use_global: bool,
    selected_preset: Option<String>,
    running: bool,
    current_index: usize,
    completed: usize,
    cancel: Arc<AtomicBool>,
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchRunner {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            global_params: FilterParameters::neutral(),
            use_global: false,
            selected_preset: None,
            running: false,
            current_index: 0,
            completed: 0,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn items(&self) -> &[BatchImageItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn use_global_params(&self) -> bool {
        self.use_global
    }

    pub fn selected_preset(&self) -> Option<&str> {
        self.selected_preset.as_deref()
    }

    pub fn progress(&self) -> BatchProgress {
        BatchProgress {
            current_index: self.current_index,
            completed: self.completed,
            total: self.items.len(),
        }
    }

    /// Append an already-decoded image. Never starts processing.
    pub fn enqueue(&mut self, name: impl Into<String>, source: RgbaImage) -> Uuid {
        let id = Uuid::new_v4();
        self.items.push(BatchImageItem {
            id,
            name: name.into(),
            source,
            params: FilterParameters::neutral(),
            processed: false,
            result: None,
            failure: None,
        });
        id
    }

    /// Decode a file and append it.
    pub fn enqueue_file(&mut self, path: &Path) -> Result<Uuid> {
        let img = io::load_image(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.enqueue(name, img))
    }

    /// Remove one item, releasing its buffers. Unknown ids are ignored.
    /// Removing the in-flight item of an active run is rejected.
    pub fn remove(&mut self, id: Uuid) -> Result<()> {
        if self.running {
            if let Some(in_flight) = self.items.get(self.current_index) {
                if in_flight.id == id {
                    return Err(FilterError::InvalidState(
                        "cannot remove the item currently being processed".into(),
                    ));
                }
            }
        }
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() != before {
            self.completed = self.completed.min(self.items.len());
        }
        Ok(())
    }

    /// Drop every item and reset all counters.
    pub fn clear(&mut self) -> Result<()> {
        if self.running {
            return Err(FilterError::InvalidState(
                "cannot clear the queue while a batch is running".into(),
            ));
        }
        self.items.clear();
        self.current_index = 0;
        self.completed = 0;
        Ok(())
    }

    /// Move the item at `from` so it sits at `to`, keeping everything else
    /// in order.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        if self.running {
            return Err(FilterError::InvalidState(
                "cannot reorder the queue while a batch is running".into(),
            ));
        }
        if from >= self.items.len() || to >= self.items.len() {
            return Err(FilterError::InvalidState(format!(
                "reorder index out of bounds ({} -> {}, len {})",
                from,
                to,
                self.items.len()
            )));
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        Ok(())
    }

    /// Replace the shared parameter record (validated as a whole).
    pub fn update_global_params(&mut self, params: FilterParameters) -> Result<()> {
        params.validate()?;
        self.global_params = params;
        Ok(())
    }

    pub fn global_params(&self) -> &FilterParameters {
        &self.global_params
    }

    /// Toggle whether the shared record overrides each item's own.
    pub fn set_use_global(&mut self, on: bool) {
        self.use_global = on;
    }

    /// Set one item's own parameter record (used when global override is
    /// off). Unknown ids are rejected.
    pub fn update_item_params(&mut self, id: Uuid, params: FilterParameters) -> Result<()> {
        params.validate()?;
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| FilterError::InvalidState(format!("no batch item with id {}", id)))?;
        item.params = params;
        Ok(())
    }

    /// Resolve a built-in preset into the shared record, switch global
    /// override on, and stamp every item's own record with it too. Items
    /// already processed keep their results until the next `run()`.
    pub fn apply_preset_to_all(&mut self, preset_id: &str) -> Result<()> {
        let preset = params::find_preset(preset_id).ok_or_else(|| {
            FilterError::InvalidState(format!("unknown preset '{}'", preset_id))
        })?;
        let resolved = preset.resolve();
        self.global_params = resolved;
        self.use_global = true;
        self.selected_preset = Some(preset.id.clone());
        for item in &mut self.items {
            item.params = resolved;
        }
        Ok(())
    }

    /// Handle for cooperative cancellation of the next/current run.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancel))
    }

    /// Process the queue, strictly sequentially and in order.
    ///
    /// The observer is invoked after every item — this is the cooperative
    /// checkpoint where progress becomes visible and a `stop()` issued via
    /// [`CancelHandle`] is honored. Each item's effective parameters are
    /// snapshotted when that item starts, so mutating the shared record
    /// mid-run only affects items not yet started. A failed item records
    /// its reason and the batch moves on; counts survive cancellation.
    pub fn run<F>(&mut self, mut observer: F) -> Result<()>
    where
        F: FnMut(BatchProgress),
    {
        if self.running {
            return Err(FilterError::InvalidState("batch is already running".into()));
        }
        if self.items.is_empty() {
            return Err(FilterError::InvalidState("batch queue is empty".into()));
        }

        self.running = true;
        self.completed = 0;
        self.current_index = 0;
        self.cancel.store(false, Ordering::SeqCst);

        let total = self.items.len();
        for i in 0..total {
            if self.cancel.load(Ordering::SeqCst) {
                break;
            }
            self.current_index = i;

            // Parameter snapshot is taken the moment the item starts.
            let effective = if self.use_global {
                self.global_params
            } else {
                self.items[i].params
            };

            let item = &mut self.items[i];
            match apply_pipeline(&item.source, &effective) {
                Ok(result) => {
                    item.processed = true;
                    item.result = Some(result);
                    item.failure = None;
                    self.completed += 1;
                }
                Err(e) => {
                    item.processed = false;
                    item.result = None;
                    item.failure = Some(e.to_string());
                }
            }

            observer(BatchProgress {
                current_index: i,
                completed: self.completed,
                total,
            });
        }

        self.running = false;
        Ok(())
    }

    /// Write one encoded file per processed item into `dir`; items without
    /// a result are skipped. Returns the written paths in queue order.
    pub fn export_all(
        &self,
        dir: &Path,
        format: SaveFormat,
        quality: u8,
        tiff_compression: TiffCompression,
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::new();
        let mut used: HashSet<String> = HashSet::new();

        for (idx, item) in self.items.iter().enumerate() {
            let result = match &item.result {
                Some(r) => r,
                None => continue,
            };
            let stem = Path::new(&item.name)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("image-{}", idx + 1));
            let mut file_name = format!("{}.{}", stem, format.extension());
            if !used.insert(file_name.clone()) {
                // Same stem queued twice — disambiguate with the queue slot.
                file_name = format!("{}-{}.{}", stem, idx + 1, format.extension());
                used.insert(file_name.clone());
            }
            let path = dir.join(file_name);
            io::encode_and_write(result, &path, format, quality, tiff_compression)?;
            written.push(path);
        }
        Ok(written)
    }
}
