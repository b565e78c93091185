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

//! Client configuration for the AgroVision front ends.
//!
//! Layout: `model.rs` (typed settings), `loader.rs` (environment parsing and
//! validation), `defaults.rs` (fallback values), `error.rs` (`ConfigError`).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ENV_PREFIX, load_from_env, load_from_lookup};
pub use model::{ClientConfig, LogFormatPreference, LoggingSettings, WeatherConfig, WeatherUnits};
