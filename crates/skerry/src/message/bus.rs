//! The subscription table and the NORMAL-lane queue.
//!
//! The bus is generic over the handler handle `H` so it can be driven by the
//! simulation (`H = Subscriber`) or exercised on its own in tests. Delivery
//! goes through a caller-supplied closure: the bus decides *who* receives a
//! message and *when*, the caller decides what receiving means.

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;

use super::{Message, Priority};

/// Default NORMAL-lane entries processed per [`drain`](MessageBus::drain).
pub const DEFAULT_MESSAGES_PER_DRAIN: usize = 10;

/// Publish/subscribe channel table keyed by message code.
pub struct MessageBus<H> {
    /// Code → handlers in subscription order.
    subscriptions: HashMap<String, Vec<H>>,
    /// Pending (message, handler) pairs, oldest first.
    queue: VecDeque<(Message, H)>,
    /// Cap on entries processed per drain.
    per_drain: usize,
}

impl<H: Copy + PartialEq + Debug> MessageBus<H> {
    pub fn new() -> Self {
        Self::with_drain_limit(DEFAULT_MESSAGES_PER_DRAIN)
    }

    pub fn with_drain_limit(per_drain: usize) -> Self {
        Self {
            subscriptions: HashMap::new(),
            queue: VecDeque::new(),
            per_drain: per_drain.max(1),
        }
    }

    /// Subscribe `handler` to `code`. Returns `false` (and warns) on a duplicate.
    pub fn subscribe(&mut self, code: &str, handler: H) -> bool {
        let handlers = self.subscriptions.entry(code.to_string()).or_default();
        if handlers.contains(&handler) {
            log::warn!("Duplicate subscription of {handler:?} to `{code}`; subscription not added.");
            return false;
        }
        handlers.push(handler);
        true
    }

    /// Remove `handler` from `code`. Returns `false` (and warns) if nothing was removed.
    ///
    /// NORMAL messages already queued for this handler on this code are dropped.
    pub fn unsubscribe(&mut self, code: &str, handler: H) -> bool {
        let Some(handlers) = self.subscriptions.get_mut(code) else {
            log::warn!("Cannot unsubscribe {handler:?} from `{code}`: nothing is subscribed to that code.");
            return false;
        };
        let Some(index) = handlers.iter().position(|h| *h == handler) else {
            log::warn!("Cannot unsubscribe {handler:?} from `{code}`: handler is not subscribed.");
            return false;
        };
        handlers.remove(index);
        if handlers.is_empty() {
            self.subscriptions.remove(code);
        }
        self.queue.retain(|(message, h)| !(*h == handler && message.code == code));
        true
    }

    /// Post a message.
    ///
    /// HIGH: `deliver` runs for every subscriber, in subscription order, before
    /// this returns. NORMAL: one queue entry per subscriber.
    pub fn post(&mut self, message: Message, mut deliver: impl FnMut(H, &Message)) {
        log::trace!("Message posted: {} ({:?})", message.code, message.priority);
        let Some(handlers) = self.subscriptions.get(&message.code) else {
            return;
        };
        match message.priority {
            Priority::High => {
                // Snapshot: a handler may unsubscribe itself while we iterate.
                let handlers = handlers.clone();
                for handler in handlers {
                    deliver(handler, &message);
                }
            }
            Priority::Normal => {
                for handler in handlers {
                    self.queue.push_back((message.clone(), *handler));
                }
            }
        }
    }

    /// Deliver up to the per-drain cap of queued NORMAL entries, oldest first.
    ///
    /// Returns the number of entries delivered.
    pub fn drain(&mut self, mut deliver: impl FnMut(H, &Message)) -> usize {
        let limit = self.per_drain.min(self.queue.len());
        for _ in 0..limit {
            if let Some((message, handler)) = self.queue.pop_front() {
                deliver(handler, &message);
            }
        }
        limit
    }

    /// Handlers subscribed to `code`, in subscription order.
    pub fn subscribers(&self, code: &str) -> &[H] {
        self.subscriptions.get(code).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether `handler` is subscribed to `code`.
    pub fn is_subscribed(&self, code: &str, handler: H) -> bool {
        self.subscribers(code).contains(&handler)
    }

    /// Number of queued NORMAL entries.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drop every subscription and queued entry.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
        self.queue.clear();
    }
}

impl<H: Copy + PartialEq + Debug> Default for MessageBus<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Sender;

    fn msg(code: &str) -> Message {
        Message::new(code, Sender::Engine)
    }

    #[test]
    fn high_priority_reaches_all_subscribers_before_post_returns() {
        let mut bus = MessageBus::new();
        bus.subscribe("HIT", 1u32);
        bus.subscribe("HIT", 2u32);
        bus.subscribe("HIT", 3u32);

        let mut seen = Vec::new();
        bus.post(msg("HIT").high(), |h, m| seen.push((h, m.code.clone())));

        assert_eq!(seen, vec![(1, "HIT".to_string()), (2, "HIT".into()), (3, "HIT".into())]);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn normal_priority_is_observed_within_one_drain() {
        let mut bus = MessageBus::new();
        bus.subscribe("TICK", 9u32);

        let mut seen = Vec::new();
        bus.post(msg("TICK"), |h, _| seen.push(h));
        assert!(seen.is_empty());
        assert_eq!(bus.pending(), 1);

        bus.drain(|h, _| seen.push(h));
        assert_eq!(seen, vec![9]);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn drain_is_capped_and_fifo() {
        let mut bus = MessageBus::new();
        bus.subscribe("N", 0u32);
        for i in 0..15 {
            let mut m = msg("N");
            m.context = Some(crate::message::Payload::Asset(i.to_string()));
            bus.post(m, |_, _| {});
        }

        let mut order = Vec::new();
        let record = |_: u32, m: &Message| match &m.context {
            Some(crate::message::Payload::Asset(s)) => s.parse::<u32>().unwrap(),
            _ => unreachable!(),
        };
        assert_eq!(bus.drain(|h, m| order.push(record(h, m))), 10);
        assert_eq!(bus.pending(), 5);
        assert_eq!(order, (0..10).collect::<Vec<_>>());

        assert_eq!(bus.drain(|h, m| order.push(record(h, m))), 5);
        assert_eq!(order, (0..15).collect::<Vec<_>>());
    }

    #[test]
    fn duplicate_subscribe_is_ignored() {
        let mut bus = MessageBus::new();
        assert!(bus.subscribe("A", 1u32));
        assert!(!bus.subscribe("A", 1u32));
        assert_eq!(bus.subscribers("A"), &[1]);

        let mut count = 0;
        bus.post(msg("A").high(), |_, _| count += 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn unsubscribe_unknown_code_is_a_noop() {
        let mut bus: MessageBus<u32> = MessageBus::new();
        assert!(!bus.unsubscribe("NOPE", 1));
        bus.subscribe("A", 1);
        assert!(!bus.unsubscribe("A", 2));
        assert!(bus.is_subscribed("A", 1));
    }

    #[test]
    fn unsubscribe_drops_queued_entries() {
        let mut bus = MessageBus::new();
        bus.subscribe("A", 1u32);
        bus.subscribe("A", 2u32);
        bus.post(msg("A"), |_, _| {});
        assert_eq!(bus.pending(), 2);

        assert!(bus.unsubscribe("A", 1));
        assert_eq!(bus.pending(), 1);

        let mut seen = Vec::new();
        bus.drain(|h, _| seen.push(h));
        assert_eq!(seen, vec![2]);
    }

    #[test]
    fn post_without_subscribers_is_dropped() {
        let mut bus: MessageBus<u32> = MessageBus::new();
        bus.post(msg("EMPTY"), |_, _| panic!("nobody is subscribed"));
        assert_eq!(bus.pending(), 0);
    }
}
