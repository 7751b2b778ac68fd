//! Editor notifications.
//!
//! The engine publishes one [`EditorEvent`] after each committed change. The
//! render layer subscribes to these instead of being called by the document
//! directly. Dispatch is synchronous and happens on the caller's thread.

use crate::ids::AnnotationId;
use std::fmt;
use uuid::Uuid;

/// Editor event types
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A command was executed, undone or redone
    DocumentChanged {
        /// Monotonic revision counter after the change.
        revision: u64,
    },
    /// The selection set changed
    SelectionChanged {
        /// The primary (first) selected annotation.
        primary: Option<AnnotationId>,
        /// Number of selected annotations.
        count: usize,
    },
    /// Zoom or pan changed
    ViewportChanged {
        /// Zoom factor after the change.
        zoom: f64,
    },
    /// The user asked to save the document
    SaveRequested,
    /// A mutation was refused and nothing changed
    CommandRejected {
        /// Human readable reason, suitable for a UI hint.
        reason: String,
    },
}

/// Coarse grouping of events, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Document,
    Selection,
    Viewport,
    Persistence,
    Feedback,
}

impl EditorEvent {
    /// Category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            EditorEvent::DocumentChanged { .. } => EventCategory::Document,
            EditorEvent::SelectionChanged { .. } => EventCategory::Selection,
            EditorEvent::ViewportChanged { .. } => EventCategory::Viewport,
            EditorEvent::SaveRequested => EventCategory::Persistence,
            EditorEvent::CommandRejected { .. } => EventCategory::Feedback,
        }
    }
}

impl fmt::Display for EditorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorEvent::DocumentChanged { revision } => {
                write!(f, "Document changed (rev {})", revision)
            }
            EditorEvent::SelectionChanged { primary, count } => match primary {
                Some(id) => write!(f, "Selection: {} item(s), primary {}", count, id),
                None => write!(f, "Selection cleared"),
            },
            EditorEvent::ViewportChanged { zoom } => write!(f, "Zoom: {:.0}%", zoom * 100.0),
            EditorEvent::SaveRequested => write!(f, "Save requested"),
            EditorEvent::CommandRejected { reason } => write!(f, "Rejected: {}", reason),
        }
    }
}

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    /// Check if an event matches this filter
    pub fn matches(&self, event: &EditorEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Box<dyn FnMut(&EditorEvent)>;

/// Synchronous event dispatcher owned by one editor instance.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<(SubscriptionId, EventFilter, EventHandler)>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; it is called for every published event passing `filter`.
    pub fn subscribe<F>(&mut self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: FnMut(&EditorEvent) + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.push((id, filter, Box::new(handler)));
        tracing::debug!("Registered event subscriber {}", id);
        id
    }

    /// Remove a handler. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub, _, _)| *sub != id);
        self.handlers.len() != before
    }

    /// Deliver an event to every matching handler, returning how many received it.
    pub fn publish(&mut self, event: &EditorEvent) -> usize {
        let mut delivered = 0;
        for (_, filter, handler) in self.handlers.iter_mut() {
            if filter.matches(event) {
                handler(event);
                delivered += 1;
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}
