//! Subscription mirror: the local subscription view snooped from the
//! Software Bus.
//!
//! Remote subscriptions live directly on each [`crate::peer::Peer`] (only
//! the Protocol Engine writes them, on inbound `SUBSCRIBE`/`UNSUBSCRIBE`);
//! this module only tracks the *local* side — what this node is subscribed
//! to, which drives what gets announced outward.

use hashbrown::HashMap;

use crate::identity::{Mid, QosHint};

/// The local node's subscription table, maintained by snooping the SB's
/// "all-subs" and "one-sub" broadcast channels.
#[derive(Debug, Default)]
pub struct SubscriptionMirror {
    local: HashMap<Mid, QosHint>,
}

/// The outcome of applying a snoop event to the mirror: whether anything
/// actually changed, which determines whether a `SUBSCRIBE`/`UNSUBSCRIBE`
/// frame needs to go out to live peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorChange {
    /// The set of local subscriptions did not change.
    Unchanged,
    /// A new subscription was added (or its QoS hint changed).
    Added,
    /// A subscription was removed.
    Removed,
}

impl SubscriptionMirror {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a local subscription. Returns [`MirrorChange::Added`] only
    /// when this is a genuinely new entry, so the caller can skip emitting
    /// a redundant `SUBSCRIBE` frame for a duplicate snoop event.
    pub fn subscribe(&mut self, mid: Mid, qos: QosHint) -> MirrorChange {
        match self.local.insert(mid, qos) {
            Some(_) => MirrorChange::Unchanged,
            None => MirrorChange::Added,
        }
    }

    /// Record a local unsubscription.
    pub fn unsubscribe(&mut self, mid: Mid) -> MirrorChange {
        match self.local.remove(&mid) {
            Some(_) => MirrorChange::Removed,
            None => MirrorChange::Unchanged,
        }
    }

    #[must_use]
    pub fn contains(&self, mid: Mid) -> bool {
        self.local.contains_key(&mid)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.local.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }

    /// A full snapshot of local subscriptions, in the form the
    /// subscription handshake sends to a newly-`Heartbeating` peer (one
    /// `SUBSCRIBE` frame per entry).
    pub fn snapshot(&self) -> impl Iterator<Item = (Mid, QosHint)> + '_ {
        self.local.iter().map(|(&mid, &qos)| (mid, qos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_is_idempotent_for_repeated_mids() {
        let mut mirror = SubscriptionMirror::new();
        assert_eq!(
            mirror.subscribe(Mid::new(1), QosHint::default()),
            MirrorChange::Added
        );
        assert_eq!(
            mirror.subscribe(Mid::new(1), QosHint::default()),
            MirrorChange::Unchanged
        );
        assert_eq!(mirror.len(), 1);
    }

    #[test]
    fn unsubscribe_unknown_mid_is_a_noop() {
        let mut mirror = SubscriptionMirror::new();
        assert_eq!(mirror.unsubscribe(Mid::new(99)), MirrorChange::Unchanged);
    }

    #[test]
    fn snapshot_yields_every_local_subscription() {
        let mut mirror = SubscriptionMirror::new();
        mirror.subscribe(Mid::new(1), QosHint::default());
        mirror.subscribe(Mid::new(2), QosHint::default());
        let mut mids: Vec<_> = mirror.snapshot().map(|(m, _)| m.0).collect();
        mids.sort_unstable();
        assert_eq!(mids, vec![1, 2]);
    }

    #[test]
    fn empty_local_subs_snapshot_is_empty() {
        let mirror = SubscriptionMirror::new();
        assert!(mirror.is_empty());
        assert_eq!(mirror.snapshot().count(), 0);
    }
}
