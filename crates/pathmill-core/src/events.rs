//! Synchronous notifications for the view layer.
//!
//! Events are outbound only: the core raises them after its state has
//! settled, and view code subscribes to repaint. User input never travels
//! through the bus, so a handler cannot loop back into the core.

use std::collections::HashSet;
use std::fmt;

/// Named events raised by the tool subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolEvent {
    /// Tools were added, removed, reordered or renamed.
    ListChanged,
    /// The selected tool changed.
    SelectionChanged,
    /// The active shape or its editor values changed.
    ShapeChanged,
    /// The selected tool's stored values changed.
    ToolChanged,
    /// The set of available shape schemas changed.
    ShapeListChanged,
}

impl ToolEvent {
    /// Every event, in declaration order.
    pub const ALL: [ToolEvent; 5] = [
        ToolEvent::ListChanged,
        ToolEvent::SelectionChanged,
        ToolEvent::ShapeChanged,
        ToolEvent::ToolChanged,
        ToolEvent::ShapeListChanged,
    ];

    /// Wire name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolEvent::ListChanged => "tool-list-changed",
            ToolEvent::SelectionChanged => "tool-selection-changed",
            ToolEvent::ShapeChanged => "tool-shape-changed",
            ToolEvent::ToolChanged => "tool-changed",
            ToolEvent::ShapeListChanged => "tool-shape-list-changed",
        }
    }

    /// Look up an event by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name)
    }
}

impl fmt::Display for ToolEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Box<dyn FnMut()>;

/// Publish/subscribe bus with per-event blocking.
///
/// Blocking is a plain on/off flag: blocking twice and unblocking once
/// leaves the event unblocked. Emits for a blocked event are dropped, not
/// queued.
#[derive(Default)]
pub struct EventBus {
    /// Handlers in registration order.
    handlers: Vec<(HandlerId, ToolEvent, Handler)>,
    /// Currently blocked events.
    blocked: HashSet<ToolEvent>,
    next_id: u64,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event.
    pub fn subscribe(&mut self, event: ToolEvent, handler: impl FnMut() + 'static) -> HandlerId {
        self.next_id += 1;
        let id = HandlerId(self.next_id);
        self.handlers.push((id, event, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(hid, _, _)| *hid != id);
        self.handlers.len() != before
    }

    /// Run every handler of `event` in registration order.
    ///
    /// Returns the number of handlers invoked (zero while blocked).
    pub fn emit(&mut self, event: ToolEvent) -> usize {
        if self.blocked.contains(&event) {
            log::debug!("Dropping blocked event {}", event);
            return 0;
        }
        let mut count = 0;
        for (_, _, handler) in self.handlers.iter_mut().filter(|(_, e, _)| *e == event) {
            handler();
            count += 1;
        }
        count
    }

    /// Suppress an event until [`EventBus::unblock`].
    pub fn block(&mut self, event: ToolEvent) {
        self.blocked.insert(event);
    }

    /// Re-enable an event.
    pub fn unblock(&mut self, event: ToolEvent) {
        self.blocked.remove(&event);
    }

    /// Check if an event is blocked.
    pub fn is_blocked(&self, event: ToolEvent) -> bool {
        self.blocked.contains(&event)
    }

    /// Number of handlers registered for an event.
    pub fn handler_count(&self, event: ToolEvent) -> usize {
        self.handlers.iter().filter(|(_, e, _)| *e == event).count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.len())
            .field("blocked", &self.blocked)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(bus: &mut EventBus, event: ToolEvent, tag: &'static str) -> Rc<RefCell<Vec<&'static str>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        bus.subscribe(event, move || sink.borrow_mut().push(tag));
        log
    }

    #[test]
    fn test_names_round_trip() {
        for event in ToolEvent::ALL {
            assert_eq!(ToolEvent::from_name(event.as_str()), Some(event));
        }
        assert_eq!(ToolEvent::SelectionChanged.to_string(), "tool-selection-changed");
        assert_eq!(ToolEvent::from_name("tool-exploded"), None);
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let mut bus = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let sink = log.clone();
            bus.subscribe(ToolEvent::ListChanged, move || sink.borrow_mut().push(tag));
        }

        assert_eq!(bus.emit(ToolEvent::ListChanged), 3);
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_emit_only_reaches_matching_handlers() {
        let mut bus = EventBus::new();
        let list = recorder(&mut bus, ToolEvent::ListChanged, "list");
        let tool = recorder(&mut bus, ToolEvent::ToolChanged, "tool");

        bus.emit(ToolEvent::ToolChanged);
        assert!(list.borrow().is_empty());
        assert_eq!(tool.borrow().len(), 1);
    }

    #[test]
    fn test_blocked_emit_is_noop() {
        let mut bus = EventBus::new();
        let log = recorder(&mut bus, ToolEvent::ShapeChanged, "shape");

        bus.block(ToolEvent::ShapeChanged);
        assert!(bus.is_blocked(ToolEvent::ShapeChanged));
        assert_eq!(bus.emit(ToolEvent::ShapeChanged), 0);
        assert_eq!(bus.emit(ToolEvent::ShapeChanged), 0);
        assert!(log.borrow().is_empty());

        bus.unblock(ToolEvent::ShapeChanged);
        assert_eq!(bus.emit(ToolEvent::ShapeChanged), 1);
        // Dropped emits are not replayed.
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_block_does_not_nest() {
        let mut bus = EventBus::new();
        bus.block(ToolEvent::ToolChanged);
        bus.block(ToolEvent::ToolChanged);
        bus.unblock(ToolEvent::ToolChanged);
        assert!(!bus.is_blocked(ToolEvent::ToolChanged));
    }

    #[test]
    fn test_block_is_per_event() {
        let mut bus = EventBus::new();
        let log = recorder(&mut bus, ToolEvent::ListChanged, "list");
        bus.block(ToolEvent::ToolChanged);
        assert_eq!(bus.emit(ToolEvent::ListChanged), 1);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(ToolEvent::ListChanged, || {});
        assert_eq!(bus.handler_count(ToolEvent::ListChanged), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.emit(ToolEvent::ListChanged), 0);
    }
}
