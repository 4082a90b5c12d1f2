//! Change notification bus.
//!
//! The store fires the bus after every committed mutation. Subscribers get no
//! payload; they re-query whatever they present. Delivery is synchronous and
//! never recursive: a `fire()` issued while handlers are running is folded
//! into one more delivery round once the current round completes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Subscription identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub_{}", self.0)
    }
}

type Handler = Rc<dyn Fn()>;

#[derive(Default)]
struct BusState {
    handlers: RefCell<Vec<(SubscriptionId, Handler)>>,
    next_id: Cell<u64>,
    firing: Cell<bool>,
    pending: Cell<bool>,
}

/// Cheap to clone; clones share subscribers.
#[derive(Clone, Default)]
pub struct ChangeBus {
    state: Rc<BusState>,
}

impl fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBus")
            .field("subscribers", &self.subscriber_count())
            .field("firing", &self.state.firing.get())
            .finish()
    }
}

/// Clears the firing flag even if a handler panics.
struct FiringGuard<'a>(&'a BusState);

impl Drop for FiringGuard<'_> {
    fn drop(&mut self) {
        self.0.firing.set(false);
        self.0.pending.set(false);
    }
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: impl Fn() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.state.next_id.get());
        self.state.next_id.set(id.0 + 1);
        self.state
            .handlers
            .borrow_mut()
            .push((id, Rc::new(handler)));
        tracing::trace!(subscription = %id, "subscribed");
        id
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.state.handlers.borrow_mut();
        match handlers.iter().position(|(sub, _)| *sub == id) {
            Some(pos) => {
                handlers.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.handlers.borrow().len()
    }

    /// Notify every subscriber.
    ///
    /// Handlers run against a snapshot of the subscriber list, so they may
    /// subscribe, unsubscribe or mutate the store freely. Nested calls only
    /// schedule another round.
    pub fn fire(&self) {
        let state = &*self.state;
        if state.firing.get() {
            state.pending.set(true);
            tracing::trace!("fire deferred to next round");
            return;
        }

        state.firing.set(true);
        let _guard = FiringGuard(state);
        let mut round = 0usize;
        loop {
            state.pending.set(false);
            let handlers: Vec<Handler> = state
                .handlers
                .borrow()
                .iter()
                .map(|(_, handler)| Rc::clone(handler))
                .collect();
            tracing::trace!(round, subscribers = handlers.len(), "delivering change");
            for handler in handlers {
                handler();
            }
            if !state.pending.get() {
                break;
            }
            round += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_reaches_every_subscriber() {
        let bus = ChangeBus::new();
        let hits = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let hits = Rc::clone(&hits);
            bus.subscribe(move || hits.set(hits.get() + 1));
        }

        bus.fire();
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = ChangeBus::new();
        let hits = Rc::new(Cell::new(0));
        let id = {
            let hits = Rc::clone(&hits);
            bus.subscribe(move || hits.set(hits.get() + 1))
        };

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.fire();
        assert_eq!(hits.get(), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscription_ids_are_unique() {
        let bus = ChangeBus::new();
        let a = bus.subscribe(|| {});
        let b = bus.subscribe(|| {});
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "sub_0");
    }

    #[test]
    fn test_nested_fire_runs_one_more_round_without_recursion() {
        let bus = ChangeBus::new();
        let calls = Rc::new(Cell::new(0));
        let depth = Rc::new(Cell::new(0));
        let max_depth = Rc::new(Cell::new(0));

        {
            let bus_inner = bus.clone();
            let calls = Rc::clone(&calls);
            let depth = Rc::clone(&depth);
            let max_depth = Rc::clone(&max_depth);
            bus.subscribe(move || {
                depth.set(depth.get() + 1);
                max_depth.set(max_depth.get().max(depth.get()));
                calls.set(calls.get() + 1);
                if calls.get() == 1 {
                    bus_inner.fire();
                }
                depth.set(depth.get() - 1);
            });
        }

        bus.fire();
        assert_eq!(calls.get(), 2);
        assert_eq!(max_depth.get(), 1);
        assert!(!bus.state.firing.get());
    }

    #[test]
    fn test_subscribe_during_fire_applies_next_round() {
        let bus = ChangeBus::new();
        let late_hits = Rc::new(Cell::new(0));

        {
            let bus_inner = bus.clone();
            let late_hits = Rc::clone(&late_hits);
            let done = Cell::new(false);
            bus.subscribe(move || {
                if !done.replace(true) {
                    let late_hits = Rc::clone(&late_hits);
                    bus_inner.subscribe(move || late_hits.set(late_hits.get() + 1));
                }
            });
        }

        bus.fire();
        assert_eq!(late_hits.get(), 0);
        bus.fire();
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn test_firing_flag_reset_after_panic() {
        let bus = ChangeBus::new();
        bus.subscribe(|| panic!("handler failed"));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| bus.fire()));
        assert!(result.is_err());
        assert!(!bus.state.firing.get());
    }
}
