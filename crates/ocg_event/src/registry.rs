//! Subscription registry
//!
//! Holds one ordered listener list per topic. Listeners are kept in
//! registration order and never deduplicated. Publishing snapshots the list
//! for one topic and runs the listeners with no lock held, so a listener may
//! register more listeners or re-enter the emitter.

use crate::event::{CallErrorEvent, CallEvent, CallResultEvent};
use crate::topic::{Phase, Topic};
use ocg_core::Method;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Listener for the before phase
pub type BeforeListener = Arc<dyn Fn(&CallEvent) + Send + Sync>;

/// Listener for successful calls
pub type AfterListener = Arc<dyn Fn(&CallResultEvent<'_>) + Send + Sync>;

/// Listener for failed calls
pub type ErrorListener = Arc<dyn Fn(&CallErrorEvent<'_>) + Send + Sync>;

/// Listeners of one phase: the wildcard topic plus per-method topics
struct PhaseListeners<L> {
    wildcard: Vec<L>,
    scoped: HashMap<Method, Vec<L>>,
}

impl<L: Clone> PhaseListeners<L> {
    fn new() -> Self {
        Self {
            wildcard: Vec::new(),
            scoped: HashMap::new(),
        }
    }

    fn push(&mut self, method: Option<Method>, listener: L) {
        match method {
            None => self.wildcard.push(listener),
            Some(method) => self.scoped.entry(method).or_default().push(listener),
        }
    }

    fn snapshot(&self, method: Option<Method>) -> Vec<L> {
        match method {
            None => self.wildcard.clone(),
            Some(method) => self.scoped.get(&method).cloned().unwrap_or_default(),
        }
    }

    fn count(&self, method: Option<Method>) -> usize {
        match method {
            None => self.wildcard.len(),
            Some(method) => self.scoped.get(&method).map_or(0, Vec::len),
        }
    }

    fn clear(&mut self, method: Option<Method>) {
        match method {
            None => self.wildcard.clear(),
            Some(method) => {
                self.scoped.remove(&method);
            }
        }
    }

    fn total(&self) -> usize {
        self.wildcard.len() + self.scoped.values().map(Vec::len).sum::<usize>()
    }
}

struct Listeners {
    before: PhaseListeners<BeforeListener>,
    after: PhaseListeners<AfterListener>,
    error: PhaseListeners<ErrorListener>,
}

/// Topic → listeners table of one emitter
pub struct SubscriptionRegistry {
    listeners: RwLock<Listeners>,
}

impl SubscriptionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Listeners {
                before: PhaseListeners::new(),
                after: PhaseListeners::new(),
                error: PhaseListeners::new(),
            }),
        }
    }

    /// Add a before-phase listener; `None` subscribes to `before:call`
    pub fn add_before(&self, method: Option<Method>, listener: BeforeListener) {
        self.listeners.write().before.push(method, listener);
    }

    /// Add an after-phase listener; `None` subscribes to `after:call`
    pub fn add_after(&self, method: Option<Method>, listener: AfterListener) {
        self.listeners.write().after.push(method, listener);
    }

    /// Add an error listener; `None` subscribes to `error`
    pub fn add_error(&self, method: Option<Method>, listener: ErrorListener) {
        self.listeners.write().error.push(method, listener);
    }

    /// Publish to `before:call`, then `before:<method>`
    pub fn publish_before(&self, event: &CallEvent) {
        for scope in [None, Some(event.method)] {
            let listeners = self.listeners.read().before.snapshot(scope);
            for listener in listeners {
                listener(event);
            }
        }
    }

    /// Publish to `after:call`, then `after:<method>`
    pub fn publish_after(&self, event: &CallResultEvent<'_>) {
        for scope in [None, Some(event.method())] {
            let listeners = self.listeners.read().after.snapshot(scope);
            for listener in listeners {
                listener(event);
            }
        }
    }

    /// Publish to `error`, then `error:<method>`
    pub fn publish_error(&self, event: &CallErrorEvent<'_>) {
        for scope in [None, Some(event.method())] {
            let listeners = self.listeners.read().error.snapshot(scope);
            for listener in listeners {
                listener(event);
            }
        }
    }

    /// Number of listeners registered on a topic
    pub fn listener_count(&self, topic: Topic) -> usize {
        let listeners = self.listeners.read();
        match topic.phase() {
            Phase::Before => listeners.before.count(topic.method()),
            Phase::After => listeners.after.count(topic.method()),
            Phase::Error => listeners.error.count(topic.method()),
        }
    }

    /// Drop every listener of a topic
    pub fn remove_all_listeners(&self, topic: Topic) {
        let mut listeners = self.listeners.write();
        match topic.phase() {
            Phase::Before => listeners.before.clear(topic.method()),
            Phase::After => listeners.after.clear(topic.method()),
            Phase::Error => listeners.error.clear(topic.method()),
        }
    }

    /// Total listeners across all topics
    pub fn len(&self) -> usize {
        let listeners = self.listeners.read();
        listeners.before.total() + listeners.after.total() + listeners.error.total()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
