//! The resource pool the Arbitrator draws substitutes from.

use fleet_core::{EdgeId, ResourceId};
use serde::{Deserialize, Serialize};

/// One candidate resource: where it is and roughly how big.
///
/// `capacity_hint` comes from configuration and is informational only; live
/// fullness is always read from the Simulator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub id:            ResourceId,
    pub edge:          EdgeId,
    pub capacity_hint: Option<u32>,
}

impl ResourceEntry {
    pub fn new(id: impl Into<ResourceId>, edge: impl Into<EdgeId>) -> Self {
        Self {
            id:            id.into(),
            edge:          edge.into(),
            capacity_hint: None,
        }
    }

    pub fn with_capacity_hint(mut self, capacity: u32) -> Self {
        self.capacity_hint = Some(capacity);
        self
    }
}

/// Ordered list of substitution candidates.  Order matters: the first
/// eligible entry wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourcePool {
    entries: Vec<ResourceEntry>,
}

impl ResourcePool {
    pub fn new(entries: Vec<ResourceEntry>) -> Self {
        Self { entries }
    }

    #[inline]
    pub fn entries(&self) -> &[ResourceEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &ResourceId) -> Option<&ResourceEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// First entry whose id differs from `excluded`.
    ///
    /// A pool with a single entry has nothing to offer even if that entry is
    /// not the excluded one, so `None` is returned.
    pub fn find_alternative(&self, excluded: &ResourceId) -> Option<&ResourceEntry> {
        if self.entries.len() <= 1 {
            return None;
        }
        self.entries.iter().find(|e| &e.id != excluded)
    }
}
