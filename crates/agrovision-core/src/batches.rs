//! Batch list view model. Independent of [`crate::batch::BatchAggregate`];
//! the two never share fetched data.

use std::sync::Arc;

use agrovision_api_models::BatchSummary;
use agrovision_events::{Snapshot, SnapshotBus, SnapshotStream};
use agrovision_gateway::RemoteGateway;

use crate::error::ClientError;
use crate::load::{LoadOutcome, LoadTicket};

/// Published list state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchListState {
    /// Summaries from the last successful fetch, in backend order.
    pub batches: Vec<BatchSummary>,
    /// Whether a fetch is pending.
    pub loading: bool,
    /// Error from the most recent fetch.
    pub error: Option<ClientError>,
    generation: u64,
}

/// View model behind the batch list screen.
#[derive(Clone)]
pub struct BatchListModel {
    gateway: Arc<dyn RemoteGateway>,
    state: SnapshotBus<BatchListState>,
}

impl BatchListModel {
    /// Empty list.
    #[must_use]
    pub fn new(gateway: Arc<dyn RemoteGateway>) -> Self {
        Self {
            gateway,
            state: SnapshotBus::default(),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> Snapshot<BatchListState> {
        self.state.snapshot()
    }

    /// Subscribe to list changes.
    #[must_use]
    pub fn subscribe(&self) -> SnapshotStream<BatchListState> {
        self.state.subscribe()
    }

    /// Fetch the list. Only the newest fetch may update the state.
    pub async fn load(&self) -> LoadOutcome {
        let ticket = self.begin_load();
        let result = self.gateway.list_batches().await;

        let mut outcome = LoadOutcome::Discarded;
        self.state.publish_if(|state| {
            if state.generation != ticket.generation {
                return false;
            }
            state.loading = false;
            match result {
                Ok(batches) => {
                    state.batches = batches;
                    state.error = None;
                    outcome = LoadOutcome::Applied;
                }
                Err(err) => {
                    let error = ClientError::from(err);
                    state.batches.clear();
                    state.error = Some(error.clone());
                    outcome = LoadOutcome::Failed(error);
                }
            }
            true
        });
        if let LoadOutcome::Failed(error) = &outcome {
            tracing::warn!(error = %error, "batch list load failed");
        }
        outcome
    }

    fn begin_load(&self) -> LoadTicket {
        let mut generation = 0;
        self.state.publish(|state| {
            state.generation += 1;
            state.loading = true;
            state.error = None;
            generation = state.generation;
        });
        LoadTicket { generation }
    }
}
