//! Local storage for downloaded artist images and track audio.

mod store;

pub use store::{AssetClass, AssetError, AssetStore, Materialized};
