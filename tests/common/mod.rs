//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestSite, TestWorkspace};
//!
//! #[tokio::test]
//! async fn test_crawl() {
//!     let site = TestSite::spawn().await;
//!     let workspace = TestWorkspace::new();
//!
//!     let report = workspace.crawler(&site).run().await.unwrap();
//!     assert_eq!(report.artists_inserted, 2);
//! }
//! ```

#![allow(dead_code)]

mod constants;
mod fixtures;
mod server;
mod workspace;

// Public API - this is what tests import
pub use constants::*;
pub use fixtures::{default_catalog, FixtureArtist, FixtureTrack};
pub use server::{SiteBehavior, TestSite};
pub use workspace::TestWorkspace;
