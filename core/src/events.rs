use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Lifecycle notifications emitted by [`GameEngine`](crate::GameEngine).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEvent {
    Start,
    Win,
    Fail,
}

/// Callback invoked synchronously while an event is emitted.
///
/// Registration is by `Rc` identity: registering a clone of the same `Rc`
/// twice still delivers the event once.
pub type Listener = Rc<dyn Fn(GameEvent)>;

#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<GameEvent, Vec<Listener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the listener was already registered for `event`.
    pub fn on(&mut self, event: GameEvent, listener: Listener) -> bool {
        let listeners = self.listeners.entry(event).or_default();
        if listeners.iter().any(|known| Rc::ptr_eq(known, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Returns `false` if the listener was not registered for `event`.
    pub fn off(&mut self, event: GameEvent, listener: &Listener) -> bool {
        let Some(listeners) = self.listeners.get_mut(&event) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|known| !Rc::ptr_eq(known, listener));
        listeners.len() != before
    }

    pub fn off_all(&mut self, event: GameEvent) {
        self.listeners.remove(&event);
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self, event: GameEvent) -> usize {
        self.listeners.get(&event).map_or(0, Vec::len)
    }

    /// Calls every listener of `event` in registration order.
    pub fn emit(&self, event: GameEvent) {
        let Some(listeners) = self.listeners.get(&event) else {
            return;
        };
        log::trace!("Emitting {:?} to {} listeners", event, listeners.len());
        for listener in listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("start", &self.listener_count(GameEvent::Start))
            .field("win", &self.listener_count(GameEvent::Win))
            .field("fail", &self.listener_count(GameEvent::Fail))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};

    fn counter() -> (Rc<Cell<u32>>, Listener) {
        let count = Rc::new(Cell::new(0));
        let listener: Listener = {
            let count = count.clone();
            Rc::new(move |_: GameEvent| count.set(count.get() + 1))
        };
        (count, listener)
    }

    #[test]
    fn same_listener_is_delivered_once() {
        let mut bus = EventBus::new();
        let (count, listener) = counter();

        assert!(bus.on(GameEvent::Win, listener.clone()));
        assert!(!bus.on(GameEvent::Win, listener.clone()));
        bus.emit(GameEvent::Win);

        assert_eq!(count.get(), 1);
        assert_eq!(bus.listener_count(GameEvent::Win), 1);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        for id in 0..3 {
            let seen = seen.clone();
            let listener: Listener = Rc::new(move |_: GameEvent| seen.borrow_mut().push(id));
            bus.on(GameEvent::Start, listener);
        }

        bus.emit(GameEvent::Start);
        bus.emit(GameEvent::Fail);

        assert_eq!(*seen.borrow(), [0, 1, 2]);
    }

    #[test]
    fn off_removes_only_that_listener() {
        let mut bus = EventBus::new();
        let (first_count, first) = counter();
        let (second_count, second) = counter();
        bus.on(GameEvent::Fail, first.clone());
        bus.on(GameEvent::Fail, second);

        assert!(bus.off(GameEvent::Fail, &first));
        assert!(!bus.off(GameEvent::Fail, &first));
        bus.emit(GameEvent::Fail);

        assert_eq!(first_count.get(), 0);
        assert_eq!(second_count.get(), 1);
    }

    #[test]
    fn off_all_and_clear() {
        let mut bus = EventBus::new();
        let (count, listener) = counter();
        bus.on(GameEvent::Start, listener.clone());
        bus.on(GameEvent::Win, listener);

        bus.off_all(GameEvent::Start);
        bus.emit(GameEvent::Start);
        bus.emit(GameEvent::Win);
        assert_eq!(count.get(), 1);

        bus.clear();
        bus.emit(GameEvent::Win);
        assert_eq!(count.get(), 1);
    }
}
