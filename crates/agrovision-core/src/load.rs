//! Generation tickets that let a view discard responses it no longer wants.
//!
//! Every fetch takes a ticket carrying the view's generation at request time.
//! Starting a newer fetch or closing the view bumps the generation, so an
//! older ticket no longer matches when its response arrives.

use crate::error::ClientError;

/// Proof of which fetch a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub(crate) generation: u64,
}

/// What happened to a fetch result once it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result was stored.
    Applied,
    /// The fetch failed and the error was stored.
    Failed(ClientError),
    /// The result was stale or the view was closed; nothing changed.
    Discarded,
}
