//! Command handlers grouped by concern.

pub(crate) mod account;
pub(crate) mod assistant;
pub(crate) mod batches;
pub(crate) mod weather;
