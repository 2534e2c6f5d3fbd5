//! Events, listeners and the per-container listener registry.

use crate::core::identity_of;
use crate::error::Result;
use parking_lot::Mutex;
use std::any::{type_name, Any};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// An application event: an opaque payload plus a label naming its source.
pub struct Event {
  source: String,
  payload: Box<dyn Any + Send + Sync>,
  payload_name: &'static str,
}

impl Event {
  pub fn new<P: Any + Send + Sync>(source: impl Into<String>, payload: P) -> Self {
    Self {
      source: source.into(),
      payload: Box::new(payload),
      payload_name: type_name::<P>(),
    }
  }

  pub fn source(&self) -> &str {
    &self.source
  }

  /// Returns the payload if it is a `P`.
  pub fn payload<P: Any>(&self) -> Option<&P> {
    self.payload.downcast_ref::<P>()
  }

  pub fn is<P: Any>(&self) -> bool {
    self.payload.is::<P>()
  }

  /// The type name of the payload.
  pub fn payload_name(&self) -> &'static str {
    self.payload_name
  }
}

impl fmt::Debug for Event {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Event")
      .field("source", &self.source)
      .field("payload", &self.payload_name)
      .finish()
  }
}

/// A component that receives published events.
///
/// Components opt in when their type is declared, via
/// [`TypeBuilder::listener`](crate::TypeBuilder::listener). Every resolved
/// value of such a type is registered with the container that produced it.
///
/// `notify` runs synchronously on the publishing thread. It may resolve
/// further components or publish again; a nested publish completes before
/// the outer one moves on to its next listener.
pub trait Listener: Send + Sync {
  fn notify(&self, event: &Event) -> Result<()>;
}

#[derive(Default)]
struct Registered {
  order: Vec<Arc<dyn Listener>>,
  seen: HashSet<usize>,
}

/// An identity-keyed, insertion-ordered set of listeners.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
  inner: Mutex<Registered>,
}

impl ListenerRegistry {
  /// Adds a listener unless the same value is already registered.
  /// Returns `true` if it was added.
  pub(crate) fn register(&self, listener: Arc<dyn Listener>) -> bool {
    let mut inner = self.inner.lock();
    if !inner.seen.insert(identity_of(&listener)) {
      return false;
    }
    inner.order.push(listener);
    true
  }

  pub(crate) fn len(&self) -> usize {
    self.inner.lock().order.len()
  }

  /// Delivers `event` to every listener registered when the call starts.
  ///
  /// The lock is released before any listener runs.
  pub(crate) fn publish(&self, event: &Event) -> Result<()> {
    let listeners = self.inner.lock().order.clone();
    debug!(
      listeners = listeners.len(),
      payload = event.payload_name(),
      source = event.source(),
      "publishing event"
    );
    for listener in &listeners {
      listener.notify(event)?;
    }
    trace!(payload = event.payload_name(), "event delivered");
    Ok(())
  }
}

/// A non-owning handle for publishing through a container's registry.
///
/// Components can keep one of these (see
/// [`Container::publisher`](crate::Container::publisher)) without keeping
/// their container alive. Once the container is dropped, publishing is a
/// no-op.
#[derive(Clone)]
pub struct Publisher {
  registry: Weak<ListenerRegistry>,
}

impl Publisher {
  pub(crate) fn new(registry: &Arc<ListenerRegistry>) -> Self {
    Self {
      registry: Arc::downgrade(registry),
    }
  }

  pub fn publish(&self, event: &Event) -> Result<()> {
    match self.registry.upgrade() {
      Some(registry) => registry.publish(event),
      None => Ok(()),
    }
  }
}

impl fmt::Debug for Publisher {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Publisher")
      .field("attached", &(self.registry.strong_count() > 0))
      .finish()
  }
}
