//! Typed publish/subscribe bus
//!
//! Key properties:
//! - Handlers are keyed by the concrete event type
//! - Lower priority values run first; equal priorities run in subscription order
//! - One-shot handlers are removed before their only invocation
//! - Immediate delivery with [`EventBus::emit`], queued delivery with
//!   [`EventBus::emit_deferred`] and [`EventBus::flush_events`]
//!
//! Handlers receive the entity manager alongside the event, so health, AI or
//! scoring code can read and change components from inside a handler.
//!
//! Every method takes `&self`, so a handler may subscribe, unsubscribe, emit
//! or queue events on the bus it is being called from. Handlers are `Fn` and
//! may be re-entered when they emit their own event type; state they keep
//! lives in `Cell`/`RefCell`. A handler that fails or panics is logged and the
//! remaining handlers still run.

use crate::ecs::EntityManager;
use slotmap::{new_key_type, SlotMap};
use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

/// Marker trait for anything that can travel over the bus
pub trait Event: Any + fmt::Debug {}

new_key_type! {
    /// Handle returned by [`EventBus::subscribe`]
    pub struct SubscriptionId;
}

/// Error a handler can report instead of panicking
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler could not finish its work
    #[error("handler failed: {0}")]
    Failed(String),

    /// The handler refused the event
    #[error("event rejected: {reason}")]
    Rejected {
        /// Why the event was refused
        reason: String,
    },
}

type HandlerFn = dyn Fn(&dyn Any, &mut EntityManager, &EventBus) -> Result<(), HandlerError>;

struct Subscriber {
    id: SubscriptionId,
    priority: i32,
    one_shot: bool,
    handler: Rc<HandlerFn>,
}

trait QueuedEvent {
    fn deliver(&self, entities: &mut EntityManager, bus: &EventBus) -> usize;
}

impl<E: Event> QueuedEvent for E {
    fn deliver(&self, entities: &mut EntityManager, bus: &EventBus) -> usize {
        bus.dispatch(self, entities)
    }
}

/// Synchronous event bus with a deferred queue
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<HashMap<TypeId, Vec<Subscriber>>>,
    subscriptions: RefCell<SlotMap<SubscriptionId, TypeId>>,
    queue: RefCell<Vec<Box<dyn QueuedEvent>>>,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of type `E`
    ///
    /// Handlers with a lower `priority` run first. A `one_shot` handler is
    /// delivered at most one event and then removed.
    pub fn subscribe<E, F>(&self, handler: F, priority: i32, one_shot: bool) -> SubscriptionId
    where
        E: Event,
        F: Fn(&E, &mut EntityManager, &Self) -> Result<(), HandlerError> + 'static,
    {
        let erased = move |event: &dyn Any, entities: &mut EntityManager, bus: &Self| {
            event
                .downcast_ref::<E>()
                .map_or(Ok(()), |event| handler(event, entities, bus))
        };

        let type_id = TypeId::of::<E>();
        let id = self.subscriptions.borrow_mut().insert(type_id);

        let mut handlers = self.handlers.borrow_mut();
        let list = handlers.entry(type_id).or_default();
        let at = list.partition_point(|s| s.priority <= priority);
        list.insert(
            at,
            Subscriber {
                id,
                priority,
                one_shot,
                handler: Rc::new(erased),
            },
        );
        log::trace!(
            "Subscribed {:?} to {} at priority {priority}",
            id,
            type_name::<E>()
        );
        id
    }

    /// Remove a subscription, returning whether it was still registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Some(type_id) = self.subscriptions.borrow_mut().remove(id) else {
            return false;
        };
        if let Some(list) = self.handlers.borrow_mut().get_mut(&type_id) {
            list.retain(|s| s.id != id);
        }
        true
    }

    /// Whether `id` is still registered
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscriptions.borrow().contains_key(id)
    }

    /// Deliver `event` to every current subscriber of its type now
    ///
    /// Handlers run to completion, nested emits included, before this
    /// returns. Returns how many handlers ran.
    pub fn emit<E: Event>(&self, event: E, entities: &mut EntityManager) -> usize {
        self.dispatch(&event, entities)
    }

    /// Queue `event` for the next [`EventBus::flush_events`]
    pub fn emit_deferred<E: Event>(&self, event: E) {
        self.queue.borrow_mut().push(Box::new(event));
    }

    /// Deliver every queued event in FIFO order
    ///
    /// Only events queued before the call are delivered; events queued by
    /// handlers during the flush wait for the next one. Returns the number
    /// of events delivered.
    pub fn flush_events(&self, entities: &mut EntityManager) -> usize {
        let batch = std::mem::take(&mut *self.queue.borrow_mut());
        for event in &batch {
            event.deliver(entities, self);
        }
        batch.len()
    }

    /// Drop all handlers for `E`
    pub fn clear_handlers<E: Event>(&self) {
        let type_id = TypeId::of::<E>();
        if let Some(list) = self.handlers.borrow_mut().remove(&type_id) {
            let mut subscriptions = self.subscriptions.borrow_mut();
            for subscriber in list {
                subscriptions.remove(subscriber.id);
            }
        }
    }

    /// Drop every handler of every type
    pub fn clear_all_handlers(&self) {
        self.handlers.borrow_mut().clear();
        self.subscriptions.borrow_mut().clear();
    }

    /// Drop queued events without delivering them
    pub fn clear_queue(&self) {
        self.queue.borrow_mut().clear();
    }

    /// Whether any handler is registered for `E`
    pub fn has_subscribers<E: Event>(&self) -> bool {
        self.handler_count::<E>() > 0
    }

    /// Number of handlers registered for `E`
    pub fn handler_count<E: Event>(&self) -> usize {
        self.handlers
            .borrow()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Number of events waiting in the deferred queue
    pub fn pending_events(&self) -> usize {
        self.queue.borrow().len()
    }

    fn dispatch<E: Event>(&self, event: &E, entities: &mut EntityManager) -> usize {
        let snapshot: Vec<(SubscriptionId, bool, Rc<HandlerFn>)> = {
            let mut handlers = self.handlers.borrow_mut();
            let Some(list) = handlers.get_mut(&TypeId::of::<E>()) else {
                return 0;
            };
            let snapshot = list
                .iter()
                .map(|s| (s.id, s.one_shot, Rc::clone(&s.handler)))
                .collect();
            list.retain(|s| !s.one_shot);
            snapshot
        };

        let mut delivered = 0;
        for (id, one_shot, handler) in snapshot {
            // Skip handlers removed by an earlier handler in this dispatch
            let still_registered = if one_shot {
                self.subscriptions.borrow_mut().remove(id).is_some()
            } else {
                self.is_subscribed(id)
            };
            if !still_registered {
                continue;
            }

            delivered += 1;
            match catch_unwind(AssertUnwindSafe(|| handler(event as &dyn Any, entities, self))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    log::error!("Handler {:?} for {} failed: {err}", id, type_name::<E>());
                }
                Err(payload) => {
                    log::error!(
                        "Handler {:?} for {} panicked: {}",
                        id,
                        type_name::<E>(),
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
        delivered
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.borrow().len())
            .field("pending_events", &self.pending_events())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Component;
    use std::cell::Cell;

    #[derive(Debug)]
    struct Ping(u32);
    impl Event for Ping {}

    #[derive(Debug)]
    struct Pong;
    impl Event for Pong {}

    #[derive(Debug)]
    struct Hit(f32);
    impl Event for Hit {}

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Armor(f32);
    impl Component for Armor {}

    fn recorder() -> Rc<RefCell<Vec<String>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_priority_order_with_stable_ties() {
        let bus = EventBus::new();
        let mut entities = EntityManager::new();
        let log = recorder();

        for (label, priority) in [("late", 10), ("first", -5), ("tie_a", 0), ("tie_b", 0)] {
            let log = Rc::clone(&log);
            bus.subscribe(
                move |_: &Ping, _: &mut EntityManager, _: &EventBus| {
                    log.borrow_mut().push(label.to_string());
                    Ok(())
                },
                priority,
                false,
            );
        }

        assert_eq!(bus.emit(Ping(1), &mut entities), 4);
        assert_eq!(*log.borrow(), vec!["first", "tie_a", "tie_b", "late"]);
    }

    #[test]
    fn test_one_shot_runs_once() {
        let bus = EventBus::new();
        let mut entities = EntityManager::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = bus.subscribe(
            move |_: &Ping, _: &mut EntityManager, _: &EventBus| {
                counter.set(counter.get() + 1);
                Ok(())
            },
            0,
            true,
        );

        bus.emit(Ping(1), &mut entities);
        bus.emit(Ping(2), &mut entities);

        assert_eq!(hits.get(), 1);
        assert!(!bus.is_subscribed(id));
        assert!(!bus.has_subscribers::<Ping>());
    }

    #[test]
    fn test_one_shot_not_repeated_by_nested_emit() {
        let bus = EventBus::new();
        let mut entities = EntityManager::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        bus.subscribe(
            move |ping: &Ping, entities: &mut EntityManager, bus: &EventBus| {
                counter.set(counter.get() + 1);
                if ping.0 == 0 {
                    bus.emit(Ping(1), entities);
                }
                Ok(())
            },
            0,
            true,
        );

        bus.emit(Ping(0), &mut entities);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let mut entities = EntityManager::new();
        let id = bus.subscribe(|_: &Ping, _: &mut EntityManager, _: &EventBus| Ok(()), 0, false);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.emit(Ping(1), &mut entities), 0);
    }

    #[test]
    fn test_handler_can_unsubscribe_later_handler() {
        let bus = EventBus::new();
        let mut entities = EntityManager::new();
        let victim_hits = Rc::new(Cell::new(0));
        let victim: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));

        let target = Rc::clone(&victim);
        bus.subscribe(
            move |_: &Ping, _: &mut EntityManager, bus: &EventBus| {
                if let Some(id) = target.get() {
                    bus.unsubscribe(id);
                }
                Ok(())
            },
            0,
            false,
        );
        let counter = Rc::clone(&victim_hits);
        let id = bus.subscribe(
            move |_: &Ping, _: &mut EntityManager, _: &EventBus| {
                counter.set(counter.get() + 1);
                Ok(())
            },
            1,
            false,
        );
        victim.set(Some(id));

        bus.emit(Ping(1), &mut entities);
        assert_eq!(victim_hits.get(), 0);
    }

    #[test]
    fn test_failing_handler_does_not_stop_delivery() {
        let bus = EventBus::new();
        let mut entities = EntityManager::new();
        let reached = Rc::new(Cell::new(false));

        bus.subscribe(
            |_: &Ping, _: &mut EntityManager, _: &EventBus| Err(HandlerError::Failed("boom".to_string())),
            0,
            false,
        );
        bus.subscribe(
            |_: &Ping, _: &mut EntityManager, _: &EventBus| panic!("handler panic"),
            1,
            false,
        );
        let flag = Rc::clone(&reached);
        bus.subscribe(
            move |_: &Ping, _: &mut EntityManager, _: &EventBus| {
                flag.set(true);
                Ok(())
            },
            2,
            false,
        );

        assert_eq!(bus.emit(Ping(1), &mut entities), 3);
        assert!(reached.get());
    }

    #[test]
    fn test_nested_emit_of_same_type_reaches_running_handler() {
        let bus = EventBus::new();
        let mut entities = EntityManager::new();
        let applied = Rc::new(Cell::new(0.0));
        let total = Rc::clone(&applied);
        bus.subscribe(
            move |hit: &Hit, entities: &mut EntityManager, bus: &EventBus| {
                total.set(total.get() + hit.0);
                // A heavy hit splashes a smaller one of the same kind
                if hit.0 >= 100.0 {
                    bus.emit(Hit(5.0), entities);
                }
                Ok(())
            },
            0,
            false,
        );

        assert_eq!(bus.emit(Hit(100.0), &mut entities), 1);
        assert_eq!(applied.get(), 105.0);
    }

    #[test]
    fn test_nested_emit_runs_before_later_handlers() {
        let bus = EventBus::new();
        let mut entities = EntityManager::new();
        let seen = recorder();

        let log = Rc::clone(&seen);
        bus.subscribe(
            move |ping: &Ping, entities: &mut EntityManager, bus: &EventBus| {
                log.borrow_mut().push(format!("first{}", ping.0));
                if ping.0 == 1 {
                    bus.emit(Ping(2), entities);
                }
                Ok(())
            },
            0,
            false,
        );
        let log = Rc::clone(&seen);
        bus.subscribe(
            move |ping: &Ping, _: &mut EntityManager, _: &EventBus| {
                log.borrow_mut().push(format!("second{}", ping.0));
                Ok(())
            },
            1,
            false,
        );

        bus.emit(Ping(1), &mut entities);
        assert_eq!(*seen.borrow(), vec!["first1", "first2", "second2", "second1"]);
    }

    #[test]
    fn test_handler_mutates_components() {
        let bus = EventBus::new();
        let mut entities = EntityManager::new();
        let target = entities.create_entity();
        entities.add_component(target, Armor(50.0));

        bus.subscribe(
            move |hit: &Hit, entities: &mut EntityManager, _: &EventBus| {
                let armor = entities
                    .get_component_mut::<Armor>(target)
                    .ok_or_else(|| HandlerError::Failed("no armor".to_string()))?;
                armor.0 -= hit.0;
                if armor.0 <= 0.0 {
                    entities.destroy_entity(target);
                }
                Ok(())
            },
            0,
            false,
        );

        bus.emit(Hit(20.0), &mut entities);
        assert_eq!(entities.get_component::<Armor>(target), Some(&Armor(30.0)));

        bus.emit_deferred(Hit(30.0));
        assert_eq!(bus.flush_events(&mut entities), 1);
        assert!(entities.is_pending_destruction(target));
    }

    #[test]
    fn test_flush_delivers_snapshot_only() {
        let bus = EventBus::new();
        let mut entities = EntityManager::new();
        let seen = recorder();

        let log = Rc::clone(&seen);
        bus.subscribe(
            move |ping: &Ping, _: &mut EntityManager, bus: &EventBus| {
                log.borrow_mut().push(format!("ping{}", ping.0));
                bus.emit_deferred(Pong);
                Ok(())
            },
            0,
            false,
        );
        let log = Rc::clone(&seen);
        bus.subscribe(
            move |_: &Pong, _: &mut EntityManager, _: &EventBus| {
                log.borrow_mut().push("pong".to_string());
                Ok(())
            },
            0,
            false,
        );

        bus.emit_deferred(Ping(1));
        bus.emit_deferred(Ping(2));

        assert_eq!(bus.flush_events(&mut entities), 2);
        assert_eq!(*seen.borrow(), vec!["ping1", "ping2"]);
        assert_eq!(bus.pending_events(), 2);

        assert_eq!(bus.flush_events(&mut entities), 2);
        assert_eq!(*seen.borrow(), vec!["ping1", "ping2", "pong", "pong"]);
    }

    #[test]
    fn test_clear_handlers_and_queue() {
        let bus = EventBus::new();
        let mut entities = EntityManager::new();
        bus.subscribe(|_: &Ping, _: &mut EntityManager, _: &EventBus| Ok(()), 0, false);
        bus.subscribe(|_: &Pong, _: &mut EntityManager, _: &EventBus| Ok(()), 0, false);
        bus.emit_deferred(Ping(1));

        bus.clear_handlers::<Ping>();
        assert!(!bus.has_subscribers::<Ping>());
        assert_eq!(bus.handler_count::<Pong>(), 1);

        bus.clear_queue();
        assert_eq!(bus.flush_events(&mut entities), 0);

        bus.clear_all_handlers();
        assert!(!bus.has_subscribers::<Pong>());
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new();
        let mut entities = EntityManager::new();
        assert_eq!(bus.emit(Pong, &mut entities), 0);
    }
}
