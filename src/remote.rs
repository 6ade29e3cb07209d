//! # Collaborator Contracts
//!
//! Narrow interfaces for everything the engine talks to remotely.
//!
//! The engine never reaches into ambient global state; every collaborator is
//! injected behind one of these traits so the reconciliation logic can be
//! exercised entirely against in-memory doubles.

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{EntityId, Node};

/// A failure of a single remote call.
///
/// Every remote failure is representable as a value so call sites can decide
/// whether to absorb it (the fetch and apply paths inside the engine) or
/// propagate it wrapped in [`Error::Remote`](crate::error::Error::Remote).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The node could not be reached
    #[error("node {0} is unreachable")]
    Unreachable(crate::model::NodeId),

    /// The remote side rejected the call
    #[error("call rejected: {0}")]
    Rejected(String),
}

/// Result type for remote calls
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Remote operations against a single node's authoritative ban state.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Fetch the node's current banned-entity set.
    ///
    /// The engine's reconciliation path treats a failure here as an empty
    /// set (fail-open); see the engine documentation for the trade-off.
    async fn list_banned(&self, node: &Node) -> RemoteResult<HashSet<EntityId>>;

    /// Apply one ban on the node.
    async fn apply_ban(&self, node: &Node, entity: EntityId, reason: &str) -> RemoteResult<()>;
}

/// Enumeration of every node the service account currently stands in.
#[async_trait]
pub trait NodeRoster: Send + Sync {
    /// Snapshot of all nodes, rebuilt on every call.
    async fn nodes(&self) -> Vec<Node>;
}

/// Resolution of actor-level global standing.
#[async_trait]
pub trait ActorDirectory: Send + Sync {
    /// Whether the actor owns the service globally.
    async fn is_global_owner(&self, actor: EntityId) -> bool;
}
