use thiserror::Error;

use crate::asset_store::AssetError;
use crate::catalog_store::StoreError;
use crate::fetcher::FetchError;

/// Errors that end a crawl.
///
/// Item-level failures (a missing track asset, a conflicting record, an
/// unavailable detail page) are absorbed by the crawler and only show up in
/// the [`CrawlReport`](super::CrawlReport).
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Source unreachable: {0}")]
    Transport(FetchError),

    #[error("Artist listing unavailable: {0}")]
    ListingUnavailable(FetchError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Asset storage error: {0}")]
    Asset(AssetError),
}

/// Coarse classification of an [`IngestionError`], for callers that react
/// differently to each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    TransportFailure,
    StatusFailure,
    IntegrityConflict,
    Storage,
}

impl IngestionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            IngestionError::Transport(_) => FailureKind::TransportFailure,
            IngestionError::ListingUnavailable(_) => FailureKind::StatusFailure,
            IngestionError::Store(e) if e.is_integrity_conflict() => {
                FailureKind::IntegrityConflict
            }
            IngestionError::Store(_) | IngestionError::Asset(_) => FailureKind::Storage,
        }
    }

    /// A failed listing fetch is always fatal, transport or not.
    pub(super) fn listing(error: FetchError) -> Self {
        if error.is_transport() {
            IngestionError::Transport(error)
        } else {
            IngestionError::ListingUnavailable(error)
        }
    }
}
