//! Events emitted around a run and the listeners receiving them.
use std::any::Any;

use crate::runner::{RunPlan, RunReport};

/// Events that can be emitted by the [AggressorRunner](crate::AggressorRunner).
#[derive(Debug, Clone, Copy)]
pub enum AggressorEvents<'a> {
    /// Emitted right before the timed region. An unbounded run never gets past this event.
    RunStart(&'a RunPlan),
    /// Emitted right after the timed region.
    RunStop(&'a RunPlan),
    /// The report of the finished run, including values collected from plugins.
    Report(&'a RunReport),
}

/// A listener receives all events emitted by the runner it is registered on.
pub trait EventListener: Any {
    /// Unique name of the listener. Only one listener per name can be registered.
    fn name(&self) -> &'static str;
    /// Handle an event.
    fn on_event(&mut self, event: AggressorEvents);
    /// Used to downcast to the concrete listener type.
    fn as_any(&mut self) -> &mut dyn Any;
}

/// The event manager is responsible for managing event listeners and emitting events.
/// It is used to notify listeners about events that occur during a run.
///
pub struct EventManager {
    listeners: Vec<(String, Box<dyn EventListener>)>,
}
impl EventManager {
    /// Creates an event manager without listeners.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Add a new listener to the event manager if it is not already present by name.
    pub fn add_listener_if_absent<L: EventListener + 'static>(&mut self, listener: L) -> &mut Self {
        if self.get_listener(listener.name()).is_some() {
            return self;
        }
        self.listeners
            .push((listener.name().to_owned(), Box::new(listener)));
        self
    }

    /// Get a listener by name.
    pub fn get_listener(&mut self, name: &str) -> Option<&mut Box<dyn EventListener>> {
        self.listeners
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, l)| l)
    }

    /// Get a listener by name as its concrete type.
    pub fn downcast_listener<T: 'static>(&mut self, name: &str) -> Option<&mut T> {
        self.get_listener(name)?.as_any().downcast_mut::<T>()
    }

    /// Remove a listener by name.
    pub fn remove_listener_by_name(&mut self, name: &str) {
        self.listeners.retain(|(n, _)| n != name);
    }

    /// Names of the registered listeners, in the order they receive events.
    pub fn listener_names(&self) -> impl Iterator<Item = &str> {
        self.listeners.iter().map(|(name, _)| name.as_str())
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Send the event to all listeners, in registration order.
    pub fn emit(&mut self, event: AggressorEvents) {
        for (_, listener) in self.listeners.iter_mut() {
            listener.on_event(event);
        }
    }
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}
