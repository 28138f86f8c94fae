//! Error types for the allocator, configuration and world

use thiserror::Error;

use crate::index::{Handle, Mask};

/// Errors raised by [`crate::index::StableIndex`].
///
/// Every rejected operation leaves the allocator untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// No free slot left for a new handle.
    #[error("capacity exhausted: all {capacity} slots are in use")]
    CapacityExhausted {
        /// Fixed slot capacity.
        capacity: usize,
    },

    /// Tried to register more views than the allocator was built for.
    #[error("view capacity exhausted: {max_views} views already registered")]
    ViewCapacityExhausted {
        /// Fixed view capacity.
        max_views: usize,
    },

    /// The handle's generation no longer matches, or its slot is free.
    #[error("stale or invalid handle {0}")]
    StaleHandle(Handle),

    /// A view did not contain an index its filter says it should.
    #[error("view {view_mask:?} does not contain index {index}")]
    ViewConsistency {
        /// Filter of the desynced view.
        view_mask: Mask,
        /// Offending slot index.
        index: u32,
    },
}

/// Errors loading or validating a [`crate::settings::WorldConfig`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(String),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level error for world construction and entity lifecycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The player actor is gone (removed or never spawned).
    #[error("no player actor")]
    NoPlayer,
}
