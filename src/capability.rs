//! # Capability Sets
//!
//! Named capability flags and set operations over them.
//!
//! Authorization decisions in this crate are phrased as set queries
//! (containment, intersection) over a [`CapabilitySet`] rather than raw bit
//! manipulation. The backing representation is still a bitfield so sets are
//! `Copy` and comparisons are a single instruction.

/// Individual capability flags.
///
/// Each capability is a single bit in a u64 bitfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum Capability {
    /// Ban entities from a node
    Ban = 1 << 0,
    /// Kick members from a node
    Kick = 1 << 1,
    /// Manage node-level settings (exclusion opt-in/opt-out)
    ManageNode = 1 << 2,
    /// Full administrator access (implies every other capability)
    Administrator = 1 << 63,
}

/// A set of capabilities.
///
/// Supports the usual set queries. [`Capability::Administrator`] is treated
/// as a superset of everything: a set containing it contains every flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapabilitySet(u64);

impl CapabilitySet {
    /// The empty set.
    pub const NONE: CapabilitySet = CapabilitySet(0);

    /// Every capability.
    pub const ALL: CapabilitySet = CapabilitySet(u64::MAX);

    /// Create from a raw bitfield value.
    pub fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Get the raw bitfield value.
    pub fn bits(&self) -> u64 {
        self.0
    }

    /// Build a set from a slice of flags.
    pub fn of(caps: &[Capability]) -> Self {
        let mut set = Self::NONE;
        for cap in caps {
            set.insert(*cap);
        }
        set
    }

    /// Check whether the set contains a capability.
    pub fn contains(&self, cap: Capability) -> bool {
        // Administrator is a superset of everything
        if self.0 & (Capability::Administrator as u64) != 0 {
            return true;
        }
        self.0 & (cap as u64) != 0
    }

    /// Check whether the set contains every capability of `other`.
    pub fn contains_all(&self, other: CapabilitySet) -> bool {
        if self.0 & (Capability::Administrator as u64) != 0 {
            return true;
        }
        self.0 & other.0 == other.0
    }

    /// Check whether the set shares any capability with `other`.
    pub fn intersects(&self, other: CapabilitySet) -> bool {
        self.0 & other.0 != 0
    }

    /// Add a capability.
    pub fn insert(&mut self, cap: Capability) {
        self.0 |= cap as u64;
    }

    /// Remove a capability.
    pub fn remove(&mut self, cap: Capability) {
        self.0 &= !(cap as u64);
    }

    /// Set union.
    pub fn union(&self, other: CapabilitySet) -> CapabilitySet {
        CapabilitySet(self.0 | other.0)
    }

    /// Set intersection.
    pub fn intersection(&self, other: CapabilitySet) -> CapabilitySet {
        CapabilitySet(self.0 & other.0)
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}
