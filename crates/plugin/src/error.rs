//! Error types for registration and the main-thread hand-off.

use std::time::Duration;

use enchantcraft_core::RegistryKeyError;
use enchantcraft_world::HostError;
use thiserror::Error;

/// Why a single key could not be registered.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The host rejected the call.
    #[error(transparent)]
    Host(#[from] HostError),
    /// The derived key is not a valid registry key.
    #[error("invalid registry key `{raw}`: {source}")]
    InvalidKey {
        /// Text the key was derived from.
        raw: String,
        /// Validation failure.
        #[source]
        source: RegistryKeyError,
    },
    /// The engine build lacks a required mutation entry point.
    #[error("registry mutation API unavailable: {0}")]
    ApiUnavailable(&'static str),
    /// A dynamic call returned an unexpected value.
    #[error("unexpected reply from `{0}`")]
    UnexpectedReply(&'static str),
}

/// Failure of a blocking hand-off to the main thread.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyncCallError {
    /// The main-thread queue stayed full for the whole bound.
    #[error("main thread queue stayed full")]
    Busy,
    /// The main thread stopped accepting work.
    #[error("main thread is gone")]
    MainThreadGone,
    /// No reply within the bound.
    #[error("timed out after {0:?} waiting for the main thread")]
    Timeout(Duration),
}

impl RegistrationError {
    pub(crate) fn invalid_key(raw: &str, source: RegistryKeyError) -> Self {
        Self::InvalidKey {
            raw: raw.to_string(),
            source,
        }
    }
}

