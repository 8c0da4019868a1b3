//! Favorites errors
//!
//! Neither kind reaches the shopper: the plugin logs them and reports them as
//! an output, and the in-memory collection stays authoritative.

use std::sync::Arc;
use storefront_store::StoreError;
use thiserror::Error;

/// Storage failures seen by the favorites store
///
/// The underlying error sits behind an `Arc` so the value can travel inside
/// cloneable plugin messages.
#[derive(Error, Debug, Clone)]
pub enum FavoritesError {
    /// Stored favorites could not be read or decoded
    #[error("Failed to load favorites: {0}")]
    Load(#[source] Arc<StoreError>),

    /// The collection could not be written back
    #[error("Failed to persist favorites: {0}")]
    Persist(#[source] Arc<StoreError>),
}

impl FavoritesError {
    pub(crate) fn load(err: StoreError) -> Self {
        Self::Load(Arc::new(err))
    }

    pub(crate) fn persist(err: StoreError) -> Self {
        Self::Persist(Arc::new(err))
    }
}

/// Result type alias for favorites persistence
pub type Result<T> = std::result::Result<T, FavoritesError>;
