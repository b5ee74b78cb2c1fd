//! Typed event bus: per-category handlers plus a bounded cross-thread queue.

use ::std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use ::tokio::sync::mpsc::{
    self,
    error::{TryRecvError, TrySendError},
};
use ::tracing::trace;

use super::{Event, EventType};
use crate::errors::Result;

/// Capacity of the asynchronous event queue, after which point further events
/// are dropped until the consumer catches up.
pub const EVENT_QUEUE_CAPACITY: usize = 100;

/// Something which consumes events of one category.
///
/// Implemented for any `FnMut(&Event) -> Result<()>` closure.
pub trait EventHandler {
    fn handle_event(&mut self, event: &Event) -> Result<()>;
}

impl<F> EventHandler for F
where
    F: FnMut(&Event) -> Result<()>,
{
    fn handle_event(&mut self, event: &Event) -> Result<()> {
        self(event)
    }
}

/// Routes events to the handler registered for their [`EventType`], and owns
/// the receiving end of a bounded queue for events produced elsewhere.
///
/// # Delivery Modes
///
/// [`dispatch_event`] calls the registered handler immediately, on the
/// caller's thread. Events without a handler are ignored.
///
/// [`send_event`] (or an [`EventSender`] obtained from [`sender`]) enqueues
/// the event without blocking. If the queue already holds
/// [`capacity`] events the new event is dropped: input capture must never
/// stall behind a slow frame loop. The consumer later pulls events out oldest
/// first with [`try_next_event`] or [`drain_pending`].
///
/// [`dispatch_event`]: Self::dispatch_event
/// [`send_event`]: Self::send_event
/// [`sender`]: Self::sender
/// [`capacity`]: Self::capacity
/// [`try_next_event`]: Self::try_next_event
/// [`drain_pending`]: Self::drain_pending
pub struct EventDispatcher {
    handlers: HashMap<EventType, Box<dyn EventHandler>>,
    sender: EventSender,
    receiver: mpsc::Receiver<Event>,
    capacity: usize,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    /// Constructs a dispatcher with the default queue capacity.
    pub fn new() -> Self {
        Self::with_capacity(EVENT_QUEUE_CAPACITY)
    }

    /// Constructs a dispatcher whose queue holds at most `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, receiver) = mpsc::channel(capacity);
        Self {
            handlers: HashMap::new(),
            sender: EventSender {
                tx,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            receiver,
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Registers the handler for a category, replacing any previous one.
    pub fn register_handler<H>(&mut self, event_type: EventType, handler: H)
    where
        H: EventHandler + 'static,
    {
        if self
            .handlers
            .insert(event_type, Box::new(handler))
            .is_some()
        {
            trace!(%event_type, "Replaced event handler");
        }
    }

    /// Returns `true` if a handler is registered for the category.
    pub fn has_handler(&self, event_type: EventType) -> bool {
        self.handlers.contains_key(&event_type)
    }

    /// Delivers the event synchronously to its category's handler, if any.
    pub fn dispatch_event(&mut self, event: &Event) -> Result<()> {
        match self.handlers.get_mut(&event.event_type()) {
            Some(handler) => handler.handle_event(event),
            None => Ok(()),
        }
    }

    /// Enqueues the event, dropping it if the queue is full.
    pub fn send_event(&self, event: Event) {
        self.sender.send_event(event)
    }

    /// A cloneable handle for enqueueing events from other threads.
    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    /// Takes the oldest queued event without waiting.
    pub fn try_next_event(&mut self) -> Option<Event> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Takes the events which are queued right now, oldest first.
    ///
    /// At most [`capacity`] events are yielded per call so that a producer
    /// which keeps the queue topped up cannot hold the consumer here forever.
    ///
    /// [`capacity`]: Self::capacity
    pub fn drain_pending(&mut self) -> impl Iterator<Item = Event> + '_ {
        let limit = self.capacity;
        ::std::iter::from_fn(move || self.try_next_event()).take(limit)
    }

    /// Total number of events dropped because the queue was full.
    pub fn dropped_events(&self) -> u64 {
        self.sender.dropped_events()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("capacity", &self.capacity)
            .field("dropped", &self.dropped_events())
            .finish()
    }
}

/// Producer half of the [`EventDispatcher`] queue.
///
/// Sending never blocks; see [`EventDispatcher`] for the drop-on-full policy.
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: mpsc::Sender<Event>,
    dropped: Arc<AtomicU64>,
}

impl EventSender {
    /// Enqueues the event, dropping it if the queue is full.
    pub fn send_event(&self, event: Event) {
        match self.tx.try_send(event) {
            Ok(()) => (),
            Err(TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                trace!(event_type = %event.event_type(), "Event queue full, dropped event");
            }
            Err(TrySendError::Closed(event)) => {
                trace!(event_type = %event.event_type(), "Event queue closed, dropped event");
            }
        }
    }

    /// Total number of events dropped because the queue was full.
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
