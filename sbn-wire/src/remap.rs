//! The optional ingress `MessageId` remap table.
//!
//! Some deployments run SBN between flight computers whose `MessageId`
//! numbering doesn't line up; the remap table lets the integrator rewrite
//! an incoming `(peer CpuID, MessageId)` pair to the `MessageId` this
//! node's Software Bus actually expects, before republishing. It is
//! read-only after init — there is no runtime protocol for updating it.

use hashbrown::HashMap;

use sbn_core::identity::{CpuId, Mid};

/// Read-only map from `(peer CpuID, incoming MessageId)` to the outgoing
/// `MessageId` this node republishes on its local bus.
#[derive(Debug, Default)]
pub struct RemapTable {
    entries: HashMap<(CpuId, Mid), Mid>,
}

impl RemapTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(peer, incoming, outgoing)` triples, as parsed
    /// from the remap configuration file.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (CpuId, Mid, Mid)>) -> Self {
        let mut table = Self::new();
        for (peer, incoming, outgoing) in entries {
            table.insert(peer, incoming, outgoing);
        }
        table
    }

    pub fn insert(&mut self, peer: CpuId, incoming: Mid, outgoing: Mid) {
        self.entries.insert((peer, incoming), outgoing);
    }

    /// Resolve the `MessageId` to republish locally. If there's no remap
    /// entry for `(peer, incoming)`, the incoming id passes through
    /// unchanged — remapping is opt-in per message, not mandatory.
    #[must_use]
    pub fn resolve(&self, peer: CpuId, incoming: Mid) -> Mid {
        self.entries.get(&(peer, incoming)).copied().unwrap_or(incoming)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
