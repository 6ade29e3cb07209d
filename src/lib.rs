//! # Bansync Core
//!
//! A cross-node membership-ban reconciliation engine: synchronizes banned
//! entity records across independently administered communities (nodes),
//! subject to per-node authorization rules, opt-out exclusions, and
//! partial-failure tolerance.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BANSYNC CORE MODULES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────────────┐    │
//! │  │ NodeSelector │   │ Reconcilia-  │   │  AuthorizationGate       │    │
//! │  │              │──►│ tionEngine   │──►│                          │    │
//! │  │ - rounds     │   │              │   │  - can_sync              │    │
//! │  │ - 60s bound  │   │ - union set  │   │  - can_apply_to_target   │    │
//! │  │ - pagination │   │ - apply diff │   │  (pure, never errors)    │    │
//! │  └──────────────┘   └──────┬───────┘   └──────────────────────────┘    │
//! │                           │                                            │
//! │         ┌─────────────────┼─────────────────┐                          │
//! │         ▼                 ▼                 ▼                          │
//! │  ┌────────────┐   ┌──────────────┐   ┌──────────────┐                  │
//! │  │ NodeClient │   │ExclusionStore│   │ActorDirectory│                  │
//! │  │ (remote)   │   │ (persisted)  │   │  (remote)    │                  │
//! │  └────────────┘   └──────────────┘   └──────────────┘                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types and the propagation policy
//! - [`model`] - Nodes, members, actors, ranks, ban records
//! - [`capability`] - Named capability flags and set queries
//! - [`auth`] - Pure authorization decisions
//! - [`remote`] - Collaborator contracts (node client, roster, directory)
//! - [`exclusion`] - The persisted automatic-action opt-out set
//! - [`selector`] - Interactive, timeout-bound node selection
//! - [`engine`] - The reconciliation engine and bulk operations
//! - [`outcome`] - Aggregate result classification
//! - [`transfer`] - Ban-list import/export interchange format
//!
//! ## Failure Model
//!
//! Per-unit failures (one entity on one node) are absorbed where they
//! happen: authorization denials skip silently, fetch failures degrade to
//! an empty set, apply failures become a `false` in the batch result. Only
//! structural preconditions — a selection timeout, fewer than two nodes, a
//! malformed or oversized ban list — abort an operation. There is no
//! exactly-once delivery, no rollback on partial failure, and no cross-run
//! locking of destination nodes.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod auth;
pub mod capability;
pub mod engine;
pub mod error;
pub mod exclusion;
pub mod model;
pub mod outcome;
pub mod remote;
pub mod selector;
pub mod transfer;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use capability::{Capability, CapabilitySet};
pub use engine::ReconciliationEngine;
pub use error::{Error, Result};
pub use exclusion::{ExclusionStore, JsonExclusionStore, MemoryExclusionStore};
pub use model::{Actor, BanRecord, EntityId, Member, Node, NodeId, Rank, RoleId};
pub use outcome::{BatchOutcome, ImportOutcome};
pub use remote::{ActorDirectory, NodeClient, NodeRoster, RemoteError};
pub use selector::{NodeSelector, SelectionContext, SelectionTransport};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of Bansync Core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
