//! # Node Selector
//!
//! Interactive, timeout-bound protocol for building a set of eligible nodes.
//!
//! ## Round Protocol
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ONE SELECTION ROUND                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  1. Enumerate candidates: roster − picked, filtered by can_sync,       │
//! │     sorted by display name. Empty list → Done immediately.             │
//! │  2. Present the numbered menu (paginated) and the prompt.              │
//! │  3. Wait ≤ 60s for one response from the same actor in the same        │
//! │     context.                                                           │
//! │       no response   → SelectionTimedOut (aborts the whole gathering)   │
//! │       "-1"          → Done (stop adding nodes)                         │
//! │       1-based index → Selected(node)                                   │
//! │       anything else → Invalid (re-run the round, fresh 60s budget,     │
//! │                       picked set unchanged)                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On timeout the accumulated set is discarded, never partially used.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::auth;
use crate::error::{Error, Result};
use crate::model::{Actor, EntityId, Node};

/// Fixed per-round response bound.
pub const ROUND_TIMEOUT: Duration = Duration::from_secs(60);

/// Sentinel the actor enters to stop adding nodes.
pub const STOP_SENTINEL: i64 = -1;

/// Maximum characters per presented menu page.
const PAGE_LIMIT: usize = 1800;

/// Prompt appended below the numbered candidate list.
pub const SELECT_PROMPT: &str =
    "Select a node to add to the sync list by number, or enter \"-1\" to stop adding nodes";

/// Rejection message for out-of-range or non-numeric input.
pub const INVALID_CHOICE: &str = "That wasn't a valid choice";

/// Scope for request/response pairing: replies only count when they come
/// from the same actor in the same response context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionContext {
    /// The actor whose replies are awaited
    pub actor: EntityId,
    /// The response context (channel) the prompt was issued in
    pub channel: u64,
}

/// Transport for one prompt/response exchange.
///
/// The wait in [`next_response`](SelectionTransport::next_response) is the
/// suspension point; the selector wraps it in the fixed round timeout, which
/// is the only cancellation trigger.
#[async_trait]
pub trait SelectionTransport: Send + Sync {
    /// Show one page of prompt text to the actor.
    async fn present(&self, ctx: &SelectionContext, text: &str) -> Result<()>;

    /// Await the next response from the same actor in the same context.
    /// Returns `None` if the transport closed.
    async fn next_response(&self, ctx: &SelectionContext) -> Option<String>;
}

/// Result of one selection round.
#[derive(Debug, Clone)]
pub enum RoundOutcome {
    /// The actor picked this node
    Selected(Node),
    /// Nothing left to pick, or the actor entered the stop sentinel
    Done,
    /// Out-of-range or non-numeric input; the round repeats
    Invalid,
}

/// Interactive selector driving rounds against a [`SelectionTransport`].
pub struct NodeSelector {
    transport: Arc<dyn SelectionTransport>,
}

impl NodeSelector {
    /// Create a selector over the given transport.
    pub fn new(transport: Arc<dyn SelectionTransport>) -> Self {
        Self { transport }
    }

    /// Gather a set of eligible nodes from the actor.
    ///
    /// Repeats selection rounds until the actor stops (or nothing is left
    /// to pick). A round timeout aborts the whole gathering with
    /// [`Error::SelectionTimedOut`]; nothing picked so far survives.
    pub async fn gather(
        &self,
        actor: &Actor,
        ctx: &SelectionContext,
        roster: &[Node],
    ) -> Result<HashSet<Node>> {
        let mut picked: HashSet<Node> = HashSet::new();

        loop {
            match self.round(actor, ctx, roster, &picked).await? {
                RoundOutcome::Selected(node) => {
                    tracing::debug!("actor {} picked node {}", actor.id, node.id);
                    picked.insert(node);
                }
                RoundOutcome::Done => return Ok(picked),
                RoundOutcome::Invalid => continue,
            }
        }
    }

    /// Run one selection round.
    pub async fn round(
        &self,
        actor: &Actor,
        ctx: &SelectionContext,
        roster: &[Node],
        picked: &HashSet<Node>,
    ) -> Result<RoundOutcome> {
        let mut candidates: Vec<&Node> = roster
            .iter()
            .filter(|node| !picked.contains(node) && auth::can_sync(node, actor))
            .collect();
        candidates.sort_by(|a, b| a.name.cmp(&b.name));

        if candidates.is_empty() {
            return Ok(RoundOutcome::Done);
        }

        let mut menu = String::new();
        for (index, node) in candidates.iter().enumerate() {
            menu.push_str(&format!("{}: {}\n", index + 1, node.name));
        }
        menu.push_str(SELECT_PROMPT);

        for page in paginate(&menu, PAGE_LIMIT) {
            self.transport.present(ctx, &page).await?;
        }

        let reply = match tokio::time::timeout(ROUND_TIMEOUT, self.transport.next_response(ctx))
            .await
        {
            Ok(Some(reply)) => reply,
            Ok(None) => return Err(Error::TransportClosed),
            Err(_) => {
                tracing::info!("selection round timed out for actor {}", actor.id);
                return Err(Error::SelectionTimedOut);
            }
        };

        match reply.trim().parse::<i64>() {
            Ok(choice) if choice == STOP_SENTINEL => Ok(RoundOutcome::Done),
            Ok(choice) if choice >= 1 && (choice as usize) <= candidates.len() => Ok(
                RoundOutcome::Selected(candidates[choice as usize - 1].clone()),
            ),
            _ => {
                self.transport.present(ctx, INVALID_CHOICE).await?;
                Ok(RoundOutcome::Invalid)
            }
        }
    }
}

/// Split text into pages of at most `limit` characters, breaking on line
/// boundaries. A single line longer than the limit becomes its own page.
fn paginate(text: &str, limit: usize) -> Vec<String> {
    let mut pages = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if !current.is_empty() && current.len() + line.len() + 1 > limit {
            pages.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        pages.push(current);
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{Capability, CapabilitySet};
    use crate::model::{Member, NodeId, Rank};
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    const MOD: EntityId = EntityId(10);

    /// Transport double that replays scripted responses and records every
    /// presented page.
    #[derive(Default)]
    struct ScriptedTransport {
        replies: Mutex<VecDeque<String>>,
        presented: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn with_replies(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
                presented: Mutex::new(Vec::new()),
            })
        }

        fn presented(&self) -> Vec<String> {
            self.presented.lock().clone()
        }
    }

    #[async_trait]
    impl SelectionTransport for ScriptedTransport {
        async fn present(&self, _ctx: &SelectionContext, text: &str) -> Result<()> {
            self.presented.lock().push(text.to_string());
            Ok(())
        }

        async fn next_response(&self, _ctx: &SelectionContext) -> Option<String> {
            let next = self.replies.lock().pop_front();
            match next {
                Some(reply) => Some(reply),
                // Script exhausted: hang forever, as a silent actor would.
                None => std::future::pending().await,
            }
        }
    }

    fn node(id: u64, name: &str) -> Node {
        let service = Member::new(
            EntityId(1),
            Rank(50),
            CapabilitySet::of(&[Capability::Ban]),
        );
        let mut node = Node::new(NodeId(id), name, EntityId(100), service);
        node.insert_member(Member::new(
            MOD,
            Rank(10),
            CapabilitySet::of(&[Capability::Ban]),
        ));
        node
    }

    fn roster() -> Vec<Node> {
        // Deliberately out of display order to exercise the sort.
        vec![node(3, "charlie"), node(1, "alpha"), node(2, "bravo")]
    }

    fn ctx() -> SelectionContext {
        SelectionContext {
            actor: MOD,
            channel: 1,
        }
    }

    fn actor() -> Actor {
        Actor::new(MOD, false)
    }

    #[tokio::test]
    async fn test_numeric_choice_selects_by_sorted_index() {
        let transport = ScriptedTransport::with_replies(&["2", "-1"]);
        let selector = NodeSelector::new(transport.clone());

        let picked = selector.gather(&actor(), &ctx(), &roster()).await.unwrap();
        let names: Vec<&str> = picked.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["bravo"]);
    }

    #[tokio::test]
    async fn test_stop_sentinel_returns_empty() {
        let transport = ScriptedTransport::with_replies(&["-1"]);
        let selector = NodeSelector::new(transport);

        let picked = selector.gather(&actor(), &ctx(), &roster()).await.unwrap();
        assert!(picked.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_repeats_round() {
        let transport = ScriptedTransport::with_replies(&["9", "nonsense", "1", "-1"]);
        let selector = NodeSelector::new(transport.clone());

        let picked = selector.gather(&actor(), &ctx(), &roster()).await.unwrap();
        assert_eq!(picked.len(), 1);
        assert!(picked.iter().any(|n| n.name == "alpha"));

        let rejections = transport
            .presented()
            .iter()
            .filter(|p| *p == INVALID_CHOICE)
            .count();
        assert_eq!(rejections, 2);
    }

    #[tokio::test]
    async fn test_picked_nodes_leave_the_menu() {
        let transport = ScriptedTransport::with_replies(&["1", "1", "-1"]);
        let selector = NodeSelector::new(transport.clone());

        // First "1" picks alpha; after that bravo is index 1.
        let picked = selector.gather(&actor(), &ctx(), &roster()).await.unwrap();
        let mut names: Vec<&str> = picked.iter().map(|n| n.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["alpha", "bravo"]);
    }

    #[tokio::test]
    async fn test_empty_candidates_done_without_prompting() {
        let transport = ScriptedTransport::with_replies(&[]);
        let selector = NodeSelector::new(transport.clone());

        let picked = selector.gather(&actor(), &ctx(), &[]).await.unwrap();
        assert!(picked.is_empty());
        assert!(transport.presented().is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_nodes_are_not_offered() {
        let mut no_sync = node(4, "aardvark");
        no_sync.service_account.capabilities = CapabilitySet::NONE;
        let roster = vec![no_sync, node(1, "alpha")];

        let transport = ScriptedTransport::with_replies(&["1", "-1"]);
        let selector = NodeSelector::new(transport.clone());

        let picked = selector.gather(&actor(), &ctx(), &roster).await.unwrap();
        assert_eq!(picked.len(), 1);
        // "aardvark" would sort first; index 1 must be alpha because the
        // ineligible node never made the list.
        assert!(picked.iter().any(|n| n.name == "alpha"));
        assert!(!transport.presented()[0].contains("aardvark"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_aborts_and_discards_picked() {
        // One valid pick, then silence. Paused time auto-advances past the
        // round bound once the transport future pends.
        let transport = ScriptedTransport::with_replies(&["1"]);
        let selector = NodeSelector::new(transport);

        let err = selector
            .gather(&actor(), &ctx(), &roster())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SelectionTimedOut));
    }

    #[test]
    fn test_paginate_splits_on_lines() {
        let text = "aaaa\nbbbb\ncccc";
        let pages = paginate(text, 9);
        assert_eq!(pages, vec!["aaaa\nbbbb", "cccc"]);

        let pages = paginate(text, 100);
        assert_eq!(pages, vec![text.to_string()]);
    }
}
