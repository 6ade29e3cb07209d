//! # Error Handling
//!
//! Error types for the reconciliation engine.
//!
//! ## Propagation Policy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ERROR PROPAGATION                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Per-unit failures (one entity, one node)                              │
//! │  ─────────────────────────────────────────                              │
//! │  • Authorization denied  → gate returns false, caller skips silently   │
//! │  • Fetch failed          → treated as an empty ban set (fail-open)     │
//! │  • Apply failed          → boolean false for that entity               │
//! │  These never escape the engine; they only show up in the aggregate     │
//! │  batch classification.                                                 │
//! │                                                                         │
//! │  Structural preconditions                                              │
//! │  ────────────────────────                                               │
//! │  • Selection timed out   → aborts the whole gathering operation        │
//! │  • Fewer than two nodes  → aborts before any remote call               │
//! │  • Malformed / oversized ban list → rejects the whole batch            │
//! │  These propagate to the caller as `Error` values.                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::remote::RemoteError;

/// Result type alias for bansync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the reconciliation engine.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Selection Errors (100-199)
    // ========================================================================

    /// The actor did not answer a selection round within the bound
    #[error("You took too long, try again later.")]
    SelectionTimedOut,

    /// The selection transport closed before a response arrived
    #[error("The selection transport closed before a response arrived.")]
    TransportClosed,

    /// Fewer than two nodes were gathered for a sync
    #[error("At least two nodes are needed to sync.")]
    InsufficientNodes,

    // ========================================================================
    // Batch Errors (200-299)
    // ========================================================================

    /// The supplied payload is not an exported ban list
    #[error("That wasn't an exported ban list: {0}")]
    ImportFormat(String),

    /// An encoded ban list exceeds the transport attachment bound
    #[error("Ban list is too large to send: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Encoded size in bytes
        size: usize,
        /// The transport's attachment bound
        max: usize,
    },

    // ========================================================================
    // Remote Errors (300-399)
    // ========================================================================

    /// A remote call failed and was not absorbable at the call site
    #[error("Remote call failed: {0}")]
    Remote(#[from] RemoteError),

    // ========================================================================
    // Store Errors (400-499)
    // ========================================================================

    /// Failed to read the exclusion settings
    #[error("Failed to read exclusion settings: {0}")]
    StoreRead(String),

    /// Failed to write the exclusion settings
    #[error("Failed to write exclusion settings: {0}")]
    StoreWrite(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Get the numeric error code.
    ///
    /// Error codes are organized by category:
    /// - 100-199: Selection
    /// - 200-299: Batch
    /// - 300-399: Remote
    /// - 400-499: Store
    pub fn code(&self) -> i32 {
        match self {
            // Selection (100-199)
            Error::SelectionTimedOut => 100,
            Error::TransportClosed => 101,
            Error::InsufficientNodes => 102,

            // Batch (200-299)
            Error::ImportFormat(_) => 200,
            Error::PayloadTooLarge { .. } => 201,

            // Remote (300-399)
            Error::Remote(_) => 300,

            // Store (400-499)
            Error::StoreRead(_) => 400,
            Error::StoreWrite(_) => 401,
            Error::Serialization(_) => 402,
        }
    }

    /// Whether this error aborts a whole operation before (or instead of)
    /// any remote ban application.
    pub fn aborts_operation(&self) -> bool {
        matches!(
            self,
            Error::SelectionTimedOut
                | Error::TransportClosed
                | Error::InsufficientNodes
                | Error::ImportFormat(_)
                | Error::PayloadTooLarge { .. }
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::StoreRead(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
