#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Client-side state for AgroVision.
//!
//! Every component keeps its state in an [`agrovision_events::SnapshotBus`], so
//! readers always see a complete immutable snapshot and can subscribe to the
//! next one. Components receive their collaborators (gateways, the session
//! store) at construction time; there is no global state.
//!
//! Layout:
//! - `session.rs`: who is signed in.
//! - `account.rs`: email-first sign-in that branches into login or registration.
//! - `batch.rs`: one batch record merged with in-session tracking entries.
//! - `batches.rs`, `batch_form.rs`: batch list and batch creation.
//! - `chat.rs`, `weather.rs`: assistant chat and weather lookups.
//! - `load.rs`: generation tickets that discard stale responses.
//! - `error.rs`, `validation.rs`: the client error taxonomy and local checks.

pub mod account;
pub mod batch;
pub mod batch_form;
pub mod batches;
pub mod chat;
pub mod error;
pub mod load;
pub mod session;
pub mod validation;
pub mod weather;

pub use account::{AccountFlow, FlowMode, FlowOutcome, FlowPhase, FlowState, RegistrationForm};
pub use batch::{
    BatchAggregate, BatchView, GrowthNoteEntry, IrrigationEntry, PhotoEntry, PickerResult,
    TrackingEntry,
};
pub use batch_form::BatchForm;
pub use batches::{BatchListModel, BatchListState};
pub use chat::{AssistantChat, ChatMessage, ChatOutcome, ChatRole, ChatState};
pub use error::{ClientError, ClientResult};
pub use load::{LoadOutcome, LoadTicket};
pub use session::{SessionState, SessionStore};
pub use weather::{Coordinates, LocationFix, WeatherModel, WeatherState};
