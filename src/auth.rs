//! # Authorization Gate
//!
//! Pure decision functions: may this actor act on this node, and on this
//! target within that node?
//!
//! Nothing here performs I/O or mutates state. The functions never error;
//! a `false` result means "silently skip", not "abort". Callers that need
//! the actor's global-owner flag resolve it once up front (see
//! [`ReconciliationEngine::resolve_actor`](crate::engine::ReconciliationEngine::resolve_actor))
//! so the gate stays pure.

use crate::capability::Capability;
use crate::model::{Actor, EntityId, Node};

/// Whether the actor may select this node for a sync at all.
///
/// The service account itself must hold ban authority on the node;
/// without that the answer is `false` regardless of the actor. Given that,
/// the actor qualifies when it is a global owner, or a resolvable member
/// that either holds ban authority or one of the node's elevated roles.
pub fn can_sync(node: &Node, actor: &Actor) -> bool {
    if !node.service_account.capabilities.contains(Capability::Ban) {
        return false;
    }

    if actor.global_owner {
        return true;
    }

    match node.member(&actor.id) {
        Some(member) => {
            member.capabilities.contains(Capability::Ban)
                || member.roles.iter().any(|r| node.elevated_roles.contains(r))
        }
        None => false,
    }
}

/// Whether a ban of `target` may be applied on `node` on behalf of `actor`.
///
/// If the target does not resolve to a current member, the hierarchy checks
/// are vacuously true and the decision reduces to "can the service account
/// and the actor ban at all on this node" (the "hackban" path).
///
/// If the target is a member:
/// - the service account must outrank the target or be the node's owner,
/// - the target must not be the node's owner,
/// - the actor must outrank the target unless it is a global owner or the
///   node's owner.
pub fn can_apply_to_target(node: &Node, actor: &Actor, target: EntityId) -> bool {
    let mut allowed = node.service_account.capabilities.contains(Capability::Ban);

    let acting_member = node.member(&actor.id);
    if !actor.global_owner {
        match acting_member {
            Some(member) => allowed &= member.capabilities.contains(Capability::Ban),
            None => return false,
        }
    }

    if let Some(target_member) = node.member(&target) {
        let service_is_owner = node.service_account.id == node.owner;
        allowed &= service_is_owner
            || node.service_account.rank.outranks(target_member.rank);

        // The node's owner is untouchable, no matter who asks.
        allowed &= target_member.id != node.owner;

        let actor_is_owner = actor.id == node.owner;
        allowed &= actor.global_owner
            || actor_is_owner
            || acting_member.map_or(false, |m| m.rank.outranks(target_member.rank));
    }

    allowed
}

/// Whether the actor may change the node's exclusion opt-out.
///
/// Reserved for the node's owner, members holding
/// [`Capability::Administrator`], and global owners.
pub fn can_configure_exclusions(node: &Node, actor: &Actor) -> bool {
    if actor.global_owner || actor.id == node.owner {
        return true;
    }
    node.member(&actor.id)
        .map_or(false, |m| m.capabilities.contains(Capability::Administrator))
}
