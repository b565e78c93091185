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

//! Logging setup shared by the AgroVision binaries.
//!
//! Layout: `init.rs` (subscriber installation), `context.rs` (operation
//! spans), `error.rs` (`TelemetryError`).

pub mod context;
pub mod error;
pub mod init;

pub use context::operation_span;
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
