//! Span helpers for client operations.

use tracing::Span;

use crate::init::build_sha;

/// Span wrapping one user-facing operation such as `login` or `batches.add`.
#[must_use]
pub fn operation_span(operation: &'static str) -> Span {
    tracing::info_span!("operation", operation, build_sha = %build_sha())
}
