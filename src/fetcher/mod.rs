//! HTTP access to the source site.
//!
//! One GET per call, bounded by the configured timeout and sent with a
//! browser-like client identity. Nothing is retried here.

mod client;
mod error;

pub use client::PageFetcher;
pub use error::FetchError;
