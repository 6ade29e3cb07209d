//! # Data Model
//!
//! Nodes, members, actors, ranks, and ban records.
//!
//! Everything here is a transient snapshot: nodes and members are
//! reconstructed from collaborator state at the start of every operation and
//! never cached across reconciliation runs. The authoritative banned-entity
//! set always lives on the remote node and is only read through
//! [`NodeClient::list_banned`](crate::remote::NodeClient::list_banned).

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::capability::CapabilitySet;

/// Default reason attached to a ban when the caller does not supply one.
pub const DEFAULT_BAN_REASON: &str = "Ban synchronization";

/// Opaque identifier of a node (an independently administered community).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque 64-bit identifier of a bannable entity.
///
/// An entity may or may not resolve to a current member of any given node;
/// unresolvable entities are still valid ban targets ("hackban").
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of a role within a node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RoleId(pub u64);

/// Node-scoped hierarchical position. Higher values outrank lower ones.
///
/// "Outranks" is always a strict comparison: equal ranks do not outrank
/// each other.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
pub struct Rank(pub u16);

impl Rank {
    /// Strictly-higher comparison.
    pub fn outranks(&self, other: Rank) -> bool {
        *self > other
    }
}

/// A resolvable member of a node, with its node-scoped standing.
#[derive(Debug, Clone)]
pub struct Member {
    /// The member's entity ID
    pub id: EntityId,
    /// Hierarchical position within the node
    pub rank: Rank,
    /// Capabilities granted by the member's roles
    pub capabilities: CapabilitySet,
    /// Roles held by the member
    pub roles: HashSet<RoleId>,
}

impl Member {
    /// Create a member with no roles.
    pub fn new(id: EntityId, rank: Rank, capabilities: CapabilitySet) -> Self {
        Self {
            id,
            rank,
            capabilities,
            roles: HashSet::new(),
        }
    }

    /// Add a role to the member.
    pub fn with_role(mut self, role: RoleId) -> Self {
        self.roles.insert(role);
        self
    }
}

/// Snapshot of one node as seen by the service account.
///
/// Node identity is the [`NodeId`] alone: equality and hashing ignore every
/// other field, so sets of nodes deduplicate by identity.
#[derive(Debug, Clone)]
pub struct Node {
    /// The node's identity
    pub id: NodeId,
    /// Human-readable display name
    pub name: String,
    /// Entity ID of the node's owner
    pub owner: EntityId,
    /// Roles the node has configured as elevated (sync-eligible)
    pub elevated_roles: HashSet<RoleId>,
    /// The acting service account's own standing on this node
    pub service_account: Member,
    members: HashMap<EntityId, Member>,
}

impl Node {
    /// Create a node snapshot with no members beyond the service account.
    pub fn new(
        id: NodeId,
        name: impl Into<String>,
        owner: EntityId,
        service_account: Member,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            elevated_roles: HashSet::new(),
            service_account,
            members: HashMap::new(),
        }
    }

    /// Mark a role as elevated for sync eligibility.
    pub fn elevate_role(&mut self, role: RoleId) {
        self.elevated_roles.insert(role);
    }

    /// Insert or replace a member.
    pub fn insert_member(&mut self, member: Member) {
        self.members.insert(member.id, member);
    }

    /// Resolve an entity to a current member, if it is one.
    pub fn member(&self, id: &EntityId) -> Option<&Member> {
        self.members.get(id)
    }
}

// Identity is the node ID alone; snapshots of the same node compare equal
// even when their member maps differ.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// The authenticated requester of an operation.
///
/// The `global_owner` flag is resolved once per operation through
/// [`ActorDirectory`](crate::remote::ActorDirectory) so that the
/// authorization gate itself stays pure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// The actor's entity ID
    pub id: EntityId,
    /// Whether the actor owns the service globally
    pub global_owner: bool,
}

impl Actor {
    /// Create an actor with an already-resolved global-owner flag.
    pub fn new(id: EntityId, global_owner: bool) -> Self {
        Self { id, global_owner }
    }
}

/// A single banned-entity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanRecord {
    /// The banned entity
    pub entity: EntityId,
    /// Why the ban was applied
    pub reason: String,
}

impl BanRecord {
    /// Create a record, falling back to [`DEFAULT_BAN_REASON`].
    pub fn new(entity: EntityId, reason: Option<&str>) -> Self {
        Self {
            entity,
            reason: reason.unwrap_or(DEFAULT_BAN_REASON).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Capability, CapabilitySet};

    fn service() -> Member {
        Member::new(
            EntityId(1),
            Rank(10),
            CapabilitySet::of(&[Capability::Ban]),
        )
    }

    #[test]
    fn test_member_lookup() {
        let mut node = Node::new(NodeId(1), "alpha", EntityId(100), service());
        node.insert_member(Member::new(EntityId(5), Rank(2), CapabilitySet::NONE));

        assert!(node.member(&EntityId(5)).is_some());
        assert!(node.member(&EntityId(6)).is_none());
    }

    #[test]
    fn test_node_identity_is_id_alone() {
        let a = Node::new(NodeId(7), "alpha", EntityId(100), service());
        let mut b = Node::new(NodeId(7), "renamed", EntityId(200), service());
        b.insert_member(Member::new(EntityId(5), Rank(2), CapabilitySet::NONE));

        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_rank_is_strict() {
        assert!(Rank(3).outranks(Rank(2)));
        assert!(!Rank(2).outranks(Rank(2)));
        assert!(!Rank(1).outranks(Rank(2)));
    }

    #[test]
    fn test_ban_record_default_reason() {
        let rec = BanRecord::new(EntityId(1), None);
        assert_eq!(rec.reason, DEFAULT_BAN_REASON);

        let rec = BanRecord::new(EntityId(1), Some("spam"));
        assert_eq!(rec.reason, "spam");
    }
}
