//! # Reconciliation Engine
//!
//! Computes the synchronized ban set across source and destination nodes and
//! issues gate-filtered apply calls through the [`NodeClient`].
//!
//! ## Reconciliation Flow
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       PROCESS_SYNC ALGORITHM                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  1. automatic? → drop excluded destinations (fresh store read)         │
//! │  2. all = sources ∪ dests                                              │
//! │  3. fetch each node's ban set (fetch failure → empty set, fail-open)   │
//! │  4. union = ∪ ban sets of source nodes                                 │
//! │  5. per destination: toApply = union − its own set                     │
//! │  6. per entity: gate check → apply_ban; per-call failures absorbed     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Destinations are independent and processed concurrently; within one
//! destination bans are applied strictly sequentially to bound the burst
//! rate against the remote system. The engine has no timeout and no
//! cancellation hook: it runs to completion, tolerating individual failures
//! rather than aborting. Nothing serializes two concurrent runs racing on
//! the same destination; that is an accepted, documented limitation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::auth;
use crate::error::{Error, Result};
use crate::exclusion::ExclusionStore;
use crate::model::{Actor, BanRecord, EntityId, Node, NodeId};
use crate::outcome::{BatchOutcome, ImportOutcome};
use crate::remote::{ActorDirectory, NodeClient, NodeRoster};
use crate::selector::{NodeSelector, SelectionContext};
use crate::transfer;

/// The reconciliation engine and its injected collaborators.
pub struct ReconciliationEngine {
    client: Arc<dyn NodeClient>,
    roster: Arc<dyn NodeRoster>,
    exclusions: Arc<dyn ExclusionStore>,
    directory: Arc<dyn ActorDirectory>,
}

impl ReconciliationEngine {
    /// Create an engine over the given collaborators.
    pub fn new(
        client: Arc<dyn NodeClient>,
        roster: Arc<dyn NodeRoster>,
        exclusions: Arc<dyn ExclusionStore>,
        directory: Arc<dyn ActorDirectory>,
    ) -> Self {
        Self {
            client,
            roster,
            exclusions,
            directory,
        }
    }

    /// Resolve an entity into an [`Actor`], consulting the directory once so
    /// every later gate check stays pure.
    pub async fn resolve_actor(&self, id: EntityId) -> Actor {
        Actor::new(id, self.directory.is_global_owner(id).await)
    }

    /// Synchronize bans from `sources` onto `dests`.
    ///
    /// Side effects only: remote ban applications. Per-entity authorization
    /// denials and per-call remote failures are absorbed; the only errors
    /// that escape are exclusion-store read failures in automatic mode.
    pub async fn process_sync(
        &self,
        actor: &Actor,
        sources: HashSet<Node>,
        mut dests: HashSet<Node>,
        automatic: bool,
    ) -> Result<()> {
        if automatic {
            let excluded = self.exclusions.get().await?;
            dests.retain(|node| !excluded.contains(&node.id));
        }

        tracing::info!(
            "reconciling bans: {} source(s), {} destination(s)",
            sources.len(),
            dests.len()
        );

        let all: HashSet<&Node> = sources.union(&dests).collect();

        let mut fetched: HashMap<NodeId, HashSet<EntityId>> = HashMap::new();
        let mut union_banlist: HashSet<EntityId> = HashSet::new();
        for node in all {
            let bans = self.fetch_ban_set(node).await;
            if sources.contains(node) {
                union_banlist.extend(bans.iter().copied());
            }
            fetched.insert(node.id, bans);
        }

        let empty = HashSet::new();
        futures::future::join_all(dests.iter().map(|node| {
            let current = fetched.get(&node.id).unwrap_or(&empty);
            self.apply_to_destination(actor, node, &union_banlist, current)
        }))
        .await;

        Ok(())
    }

    /// Fetch one node's ban set, degrading a failure to the empty set.
    ///
    /// Fail-open: an unreachable node contributes nothing to the union and
    /// looks like it has no bans, which can cause redundant re-application
    /// attempts on recovery. Logged so degraded runs are visible.
    async fn fetch_ban_set(&self, node: &Node) -> HashSet<EntityId> {
        match self.client.list_banned(node).await {
            Ok(bans) => bans,
            Err(e) => {
                tracing::warn!(
                    "failed to fetch ban list for node {} ({}): {}; treating as empty",
                    node.id,
                    node.name,
                    e
                );
                HashSet::new()
            }
        }
    }

    /// Apply the missing part of the union ban list to one destination,
    /// strictly sequentially.
    async fn apply_to_destination(
        &self,
        actor: &Actor,
        node: &Node,
        union_banlist: &HashSet<EntityId>,
        current: &HashSet<EntityId>,
    ) {
        let to_apply: Vec<EntityId> = union_banlist.difference(current).copied().collect();
        tracing::debug!(
            "node {} ({}): {} ban(s) to apply",
            node.id,
            node.name,
            to_apply.len()
        );

        for entity in to_apply {
            if !auth::can_apply_to_target(node, actor, entity) {
                continue;
            }
            let record = BanRecord::new(entity, None);
            if let Err(e) = self.client.apply_ban(node, entity, &record.reason).await {
                tracing::warn!("failed to ban {} on node {}: {}", entity, node.id, e);
            }
        }
    }

    /// Ban a single entity on one node, resolvable member or not.
    ///
    /// Returns `false` without any remote call when the gate denies, and
    /// `false` when the remote apply fails; `true` otherwise.
    pub async fn ban_or_hackban(
        &self,
        node: &Node,
        entity: EntityId,
        actor: &Actor,
        reason: Option<&str>,
    ) -> bool {
        if !auth::can_apply_to_target(node, actor, entity) {
            return false;
        }

        let record = BanRecord::new(entity, reason);
        match self.client.apply_ban(node, entity, &record.reason).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("ban of {} on node {} failed: {}", entity, node.id, e);
                false
            }
        }
    }

    /// Ban one entity on every eligible node.
    ///
    /// Eligible = the actor can sync on it and it has not opted out of
    /// automatic actions. Returns `true` if the ban landed on at least one
    /// node.
    pub async fn global_ban(
        &self,
        actor: &Actor,
        entity: EntityId,
        reason: Option<&str>,
    ) -> Result<bool> {
        let excluded = self.exclusions.get().await?;

        let mut nodes = self.roster.nodes().await;
        nodes.sort_by(|a, b| a.name.cmp(&b.name));

        let mut any = false;
        for node in &nodes {
            if excluded.contains(&node.id) || !auth::can_sync(node, actor) {
                continue;
            }
            any |= self.ban_or_hackban(node, entity, actor, reason).await;
        }

        Ok(any)
    }

    /// Globally ban a batch of entity IDs and classify the overall result.
    ///
    /// IDs are de-duplicated first; each ID counts as succeeded when
    /// [`global_ban`](Self::global_ban) landed it on at least one node.
    pub async fn bulk_ban(
        &self,
        actor: &Actor,
        ids: &[EntityId],
        reason: Option<&str>,
    ) -> Result<BatchOutcome> {
        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for id in ids {
            if seen.insert(*id) {
                results.push(self.global_ban(actor, *id, reason).await?);
            }
        }
        Ok(BatchOutcome::classify(results))
    }

    /// Import a ban list into a single node.
    ///
    /// Computes `toBan = ids − current` and short-circuits with
    /// [`ImportOutcome::NothingNew`] before any remote apply when the list
    /// contains nobody new.
    pub async fn import_bans(
        &self,
        actor: &Actor,
        node: &Node,
        ids: &[EntityId],
        reason: Option<&str>,
    ) -> ImportOutcome {
        let current = self.fetch_ban_set(node).await;

        let to_ban: Vec<EntityId> = ids
            .iter()
            .filter(|id| !current.contains(id))
            .copied()
            .collect();
        if to_ban.is_empty() {
            return ImportOutcome::NothingNew;
        }

        let mut results = Vec::with_capacity(to_ban.len());
        for entity in to_ban {
            results.push(self.ban_or_hackban(node, entity, actor, reason).await);
        }

        ImportOutcome::Applied(BatchOutcome::classify(results))
    }

    /// Export one node's current ban list as an interchange payload.
    ///
    /// Unlike the reconciliation path, a fetch failure here propagates:
    /// exporting an empty list for an unreachable node would silently lose
    /// data.
    pub async fn export_bans(&self, node: &Node, max_bytes: usize) -> Result<Vec<u8>> {
        let current = self.client.list_banned(node).await?;
        let mut ids: Vec<EntityId> = current.into_iter().collect();
        ids.sort_unstable();
        transfer::encode_ban_list(&ids, max_bytes)
    }

    /// Bidirectional sync across an interactively gathered node set.
    ///
    /// Gathers nodes through the selector (a round timeout aborts the whole
    /// operation), requires at least two, then runs
    /// [`process_sync`](Self::process_sync) with sources = dests = gathered.
    /// Explicitly gathered nodes are synced even if opted out of automatic
    /// actions.
    pub async fn sync_interactive(
        &self,
        actor: &Actor,
        selector: &NodeSelector,
        ctx: &SelectionContext,
    ) -> Result<()> {
        let roster = self.roster.nodes().await;
        let picked = selector.gather(actor, ctx, &roster).await?;

        if picked.len() < 2 {
            return Err(Error::InsufficientNodes);
        }

        self.process_sync(actor, picked.clone(), picked, false).await
    }

    /// Bidirectional sync across every eligible, non-excluded node.
    pub async fn sync_automatic(&self, actor: &Actor) -> Result<()> {
        let excluded = self.exclusions.get().await?;
        let nodes: HashSet<Node> = self
            .roster
            .nodes()
            .await
            .into_iter()
            .filter(|node| !excluded.contains(&node.id) && auth::can_sync(node, actor))
            .collect();

        if nodes.len() < 2 {
            return Err(Error::InsufficientNodes);
        }

        self.process_sync(actor, nodes.clone(), nodes, true).await
    }
}
