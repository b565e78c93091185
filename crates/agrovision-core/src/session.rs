//! Session store: the single source of truth for who is signed in.
//!
//! # Design
//! - Authentication is derived from the presence of an identity, so the two
//!   can never disagree.
//! - Writes replace the published snapshot atomically; readers never observe a
//!   half-merged identity.
//! - Subscribers are notified before the writing call returns.

use agrovision_api_models::{Identity, IdentityPatch};
use agrovision_events::{Revision, Snapshot, SnapshotBus, SnapshotStream};

/// Published session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    identity: Option<Identity>,
}

impl SessionState {
    /// Current identity, if signed in.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Whether an identity is present.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Injectable session store. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    bus: SnapshotBus<SessionState>,
}

impl SessionStore {
    /// Empty, signed-out store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot.
    #[must_use]
    pub fn current(&self) -> Snapshot<SessionState> {
        self.bus.snapshot()
    }

    /// Copy of the current identity.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.bus.snapshot().identity().cloned()
    }

    /// Whether someone is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.bus.snapshot().is_authenticated()
    }

    /// Subscribe to session changes.
    #[must_use]
    pub fn subscribe(&self) -> SnapshotStream<SessionState> {
        self.bus.subscribe()
    }

    /// Replace the identity wholesale and mark the session authenticated.
    pub fn set_identity(&self, identity: Identity) -> Revision {
        tracing::debug!(user_id = identity.user_id, "session identity set");
        self.bus.publish(|state| state.identity = Some(identity))
    }

    /// Sign out. Clearing an empty session changes nothing.
    pub fn clear(&self) -> Option<Revision> {
        self.bus.publish_if(|state| state.identity.take().is_some())
    }

    /// Merge `patch` into the current identity.
    ///
    /// Does nothing when signed out, so a refresh finishing after sign-out
    /// cannot resurrect the session. Returns the new revision when a field
    /// actually changed.
    pub fn update_fields(&self, patch: IdentityPatch) -> Option<Revision> {
        if patch.is_empty() {
            return None;
        }
        self.bus.publish_if(|state| {
            let Some(identity) = state.identity.as_mut() else {
                return false;
            };
            let before = identity.clone();
            identity.apply_patch(patch);
            *identity != before
        })
    }
}
