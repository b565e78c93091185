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

//! Remote gateway contract consumed by the AgroVision view models.
//!
//! Layout: `contract.rs` (async traits), `error.rs` (`GatewayError` and
//! classification), `http.rs` (backend client over `reqwest`), `weather.rs`
//! (weather provider client).
//!
//! Every call is a single request/response pair; nothing here retries.

pub mod contract;
pub mod error;
pub mod http;
pub mod weather;

pub use contract::{AssistantGateway, RemoteGateway, WeatherGateway};
pub use error::{GatewayError, GatewayResult};
pub use http::{HEADER_REQUEST_ID, HttpGateway};
pub use weather::{HttpWeatherGateway, WeatherQuery};
