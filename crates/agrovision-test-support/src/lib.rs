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

//! Shared test helpers used across AgroVision suites.
//! Layout: fixtures.rs (sample records and wire payloads), mocks.rs (scripted gateways).

pub mod fixtures;
pub mod mocks;
