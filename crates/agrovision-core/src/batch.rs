//! Batch detail view model.
//!
//! # Design
//! - One aggregate per open batch view: the fetched [`BatchRecord`] plus three
//!   append-only tracking sequences that live only as long as the view.
//! - Each `load` takes a [`LoadTicket`]; a response is applied only while its
//!   ticket is still the newest one and the view is open.
//! - Switching to another batch id drops the previous record and its tracking
//!   entries; re-fetching the same id keeps both until the new result lands.
//!   Entries added before the first `load` stay with the batch it opens.

use std::sync::Arc;

use agrovision_api_models::{BatchId, BatchRecord};
use agrovision_events::{Snapshot, SnapshotBus, SnapshotStream};
use agrovision_gateway::RemoteGateway;
use chrono::{DateTime, Utc};

use crate::error::{ClientError, ClientResult};
use crate::load::{LoadOutcome, LoadTicket};

/// Shown in place of the record when no fetch has succeeded.
pub const NO_DATA_MESSAGE: &str = "No batch data available";
/// Shown when the photo picker was refused access.
pub const PHOTO_PERMISSION_MESSAGE: &str = "Permission to access camera roll is required!";

/// A photo attached during this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoEntry {
    /// Position in the combined timeline.
    pub sequence: u64,
    /// Local image reference returned by the picker.
    pub uri: String,
}

/// An irrigation event recorded during this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrrigationEntry {
    /// Position in the combined timeline.
    pub sequence: u64,
    /// When the batch was watered.
    pub watered_at: DateTime<Utc>,
}

/// A growth note recorded during this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowthNoteEntry {
    /// Position in the combined timeline.
    pub sequence: u64,
    /// Note text as entered.
    pub text: String,
    /// When the note was added.
    pub recorded_at: DateTime<Utc>,
}

/// Any tracking entry, used for the combined timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingEntry {
    /// See [`PhotoEntry`].
    Photo(PhotoEntry),
    /// See [`IrrigationEntry`].
    Irrigation(IrrigationEntry),
    /// See [`GrowthNoteEntry`].
    GrowthNote(GrowthNoteEntry),
}

impl TrackingEntry {
    /// Position in the combined timeline.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        match self {
            Self::Photo(entry) => entry.sequence,
            Self::Irrigation(entry) => entry.sequence,
            Self::GrowthNote(entry) => entry.sequence,
        }
    }
}

/// Outcome of the device photo picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerResult {
    /// The user picked an image.
    Selected(String),
    /// The user closed the picker.
    Cancelled,
    /// Photo library access was refused.
    PermissionDenied,
}

/// Published read model of one batch view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchView {
    batch_id: Option<BatchId>,
    record: Option<BatchRecord>,
    loading: bool,
    error: Option<ClientError>,
    photos: Vec<PhotoEntry>,
    irrigation: Vec<IrrigationEntry>,
    growth_notes: Vec<GrowthNoteEntry>,
    generation: u64,
    next_sequence: u64,
    closed: bool,
}

impl BatchView {
    /// Batch id most recently requested.
    #[must_use]
    pub const fn batch_id(&self) -> Option<BatchId> {
        self.batch_id
    }

    /// Fetched record, absent until a fetch for the current id succeeds.
    #[must_use]
    pub const fn record(&self) -> Option<&BatchRecord> {
        self.record.as_ref()
    }

    /// Whether a fetch is pending.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Error from the most recent fetch.
    #[must_use]
    pub const fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    /// Placeholder text shown when there is no record and nothing pending.
    #[must_use]
    pub const fn placeholder(&self) -> Option<&'static str> {
        if self.record.is_none() && !self.loading && self.batch_id.is_some() {
            Some(NO_DATA_MESSAGE)
        } else {
            None
        }
    }

    /// Photos in the order they were added.
    #[must_use]
    pub fn photos(&self) -> &[PhotoEntry] {
        &self.photos
    }

    /// Irrigation events in the order they were added.
    #[must_use]
    pub fn irrigation(&self) -> &[IrrigationEntry] {
        &self.irrigation
    }

    /// Growth notes in the order they were added.
    #[must_use]
    pub fn growth_notes(&self) -> &[GrowthNoteEntry] {
        &self.growth_notes
    }

    /// Every tracking entry in the order it was added.
    #[must_use]
    pub fn timeline(&self) -> Vec<TrackingEntry> {
        let mut entries: Vec<TrackingEntry> = self
            .photos
            .iter()
            .cloned()
            .map(TrackingEntry::Photo)
            .chain(self.irrigation.iter().cloned().map(TrackingEntry::Irrigation))
            .chain(self.growth_notes.iter().cloned().map(TrackingEntry::GrowthNote))
            .collect();
        entries.sort_by_key(TrackingEntry::sequence);
        entries
    }

    /// Whether the view has been closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn take_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    fn reset_tracking(&mut self) {
        self.photos.clear();
        self.irrigation.clear();
        self.growth_notes.clear();
        self.next_sequence = 0;
    }
}

/// View model for one open batch detail view.
#[derive(Clone)]
pub struct BatchAggregate {
    gateway: Arc<dyn RemoteGateway>,
    state: SnapshotBus<BatchView>,
}

impl std::fmt::Debug for BatchAggregate {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("BatchAggregate")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl BatchAggregate {
    /// Empty aggregate for a freshly opened view.
    #[must_use]
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            gateway,
            state: SnapshotBus::default(),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn view(&self) -> Snapshot<BatchView> {
        self.state.snapshot()
    }

    /// Subscribe to view changes.
    #[must_use]
    pub fn subscribe(&self) -> SnapshotStream<BatchView> {
        self.state.subscribe()
    }

    /// Fetch `batch_id` once and fold the result into the view.
    ///
    /// A result that arrives after a newer `load` or after [`Self::close`] is
    /// dropped and reported as [`LoadOutcome::Discarded`].
    pub async fn load(&self, batch_id: BatchId) -> LoadOutcome {
        let Some(ticket) = self.begin_load(batch_id) else {
            return LoadOutcome::Discarded;
        };
        let result = self
            .gateway
            .get_batch(batch_id)
            .await
            .map_err(ClientError::from);
        self.complete_load(ticket, result)
    }

    /// Mark a fetch of `batch_id` as pending and issue its ticket.
    ///
    /// Returns `None` once the view is closed.
    pub fn begin_load(&self, batch_id: BatchId) -> Option<LoadTicket> {
        let mut ticket = None;
        self.state.publish_if(|view| {
            if view.closed {
                return false;
            }
            if view.batch_id.is_some_and(|current| current != batch_id) {
                view.record = None;
                view.reset_tracking();
            }
            view.generation += 1;
            view.batch_id = Some(batch_id);
            view.loading = true;
            view.error = None;
            ticket = Some(LoadTicket {
                generation: view.generation,
            });
            true
        });
        if ticket.is_some() {
            tracing::debug!(%batch_id, "batch load started");
        }
        ticket
    }

    /// Apply a fetch result if `ticket` is still current.
    pub fn complete_load(
        &self,
        ticket: LoadTicket,
        result: ClientResult<BatchRecord>,
    ) -> LoadOutcome {
        let mut outcome = LoadOutcome::Discarded;
        self.state.publish_if(|view| {
            if view.closed || view.generation != ticket.generation {
                return false;
            }
            view.loading = false;
            match result {
                Ok(record) => {
                    view.record = Some(record);
                    view.error = None;
                    outcome = LoadOutcome::Applied;
                }
                Err(error) => {
                    view.error = Some(error.clone());
                    outcome = LoadOutcome::Failed(error);
                }
            }
            true
        });
        match &outcome {
            LoadOutcome::Applied => tracing::debug!("batch load applied"),
            LoadOutcome::Failed(error) => tracing::warn!(error = %error, "batch load failed"),
            LoadOutcome::Discarded => {
                tracing::debug!(generation = ticket.generation, "stale batch response discarded");
            }
        }
        outcome
    }

    /// Close the view. Pending responses are dropped and mutations ignored.
    pub fn close(&self) {
        self.state.publish_if(|view| {
            if view.closed {
                return false;
            }
            view.closed = true;
            view.loading = false;
            view.generation += 1;
            true
        });
    }

    /// Append a photo reference.
    pub fn add_photo(&self, uri: impl Into<String>) -> bool {
        let uri = uri.into();
        self.mutate(|view| {
            let sequence = view.take_sequence();
            view.photos.push(PhotoEntry { sequence, uri });
        })
    }

    /// Append the outcome of the photo picker.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when photo access was refused.
    pub fn add_picked_photo(&self, picked: PickerResult) -> ClientResult<bool> {
        match picked {
            PickerResult::Selected(uri) => Ok(self.add_photo(uri)),
            PickerResult::Cancelled => Ok(false),
            PickerResult::PermissionDenied => {
                Err(ClientError::validation(PHOTO_PERMISSION_MESSAGE))
            }
        }
    }

    /// Append an irrigation event.
    pub fn add_irrigation_event(&self, watered_at: DateTime<Utc>) -> bool {
        self.mutate(|view| {
            let sequence = view.take_sequence();
            view.irrigation.push(IrrigationEntry {
                sequence,
                watered_at,
            });
        })
    }

    /// Append a growth note. Blank text is ignored.
    pub fn add_growth_note(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text.trim().is_empty() {
            return false;
        }
        self.mutate(|view| {
            let sequence = view.take_sequence();
            view.growth_notes.push(GrowthNoteEntry {
                sequence,
                text,
                recorded_at: Utc::now(),
            });
        })
    }

    fn mutate(&self, append: impl FnOnce(&mut BatchView)) -> bool {
        self.state
            .publish_if(|view| {
                if view.closed {
                    return false;
                }
                append(view);
                true
            })
            .is_some()
    }
}
