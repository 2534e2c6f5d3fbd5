use fibre_registry::{
  ComponentType, Container, Error, Event, Listener, Properties, Publisher, Result, TypeBuilder,
};
use pretty_assertions::assert_eq;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc, Mutex,
};

// A shared, ordered log for observing delivery order.
#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
  fn push(&self, line: String) {
    self.0.lock().unwrap().push(line);
  }

  fn lines(&self) -> Vec<String> {
    self.0.lock().unwrap().clone()
  }
}

// --- Event Fixtures ---

struct FooEvent;
struct NullEvent;

fn event_name(event: &Event) -> &'static str {
  if event.is::<FooEvent>() {
    "FooEvent"
  } else if event.is::<NullEvent>() {
    "NullEvent"
  } else {
    "other"
  }
}

struct Recorder {
  name: &'static str,
  log: Log,
}

impl Listener for Recorder {
  fn notify(&self, event: &Event) -> Result<()> {
    self
      .log
      .push(format!("I am {} and got a {}", self.name, event_name(event)));
    Ok(())
  }
}

fn recorder_type() -> TypeBuilder<Recorder> {
  ComponentType::builder::<Recorder>().listener()
}

// Republishes a `NullEvent` whenever it receives a `FooEvent`.
struct NestedRecorder {
  inner: Recorder,
  publisher: Publisher,
}

impl Listener for NestedRecorder {
  fn notify(&self, event: &Event) -> Result<()> {
    self.inner.notify(event)?;
    if event.is::<FooEvent>() {
      self.publisher.publish(&Event::new(self.inner.name, NullEvent))?;
    }
    Ok(())
  }
}

struct Counter {
  hits: AtomicUsize,
}

impl Listener for Counter {
  fn notify(&self, _event: &Event) -> Result<()> {
    self.hits.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }
}

// --- Event Tests ---

#[test]
fn test_publish_to_empty_registry_is_a_no_op() {
  let container = Container::empty();
  assert!(container.publish(&Event::new("test", FooEvent)).is_ok());

  let props = Properties::new().set("a", 1_i64).build(None);
  props.get("a").unwrap();
  assert!(props.publish(&Event::new("test", FooEvent)).is_ok());
  assert_eq!(props.listener_count(), 0);
}

#[test]
fn test_listener_is_notified_once_per_publish() {
  // Arrange
  let container = Container::builder()
    .lazy_as(
      "counter",
      ComponentType::builder::<Counter>().listener(),
      |_| {
        Ok(Counter {
          hits: AtomicUsize::new(0),
        })
      },
    )
    .build(None)
    .unwrap();
  let counter = container.named::<Counter>("counter").unwrap();

  // Resolving again must not register a second time.
  container.named::<Counter>("counter").unwrap();
  container.get("counter").unwrap();
  assert_eq!(container.listener_count(), 1);

  // Act
  container.publish(&Event::new("test", FooEvent)).unwrap();
  container.publish(&Event::new("test", FooEvent)).unwrap();

  // Assert
  assert_eq!(counter.hits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_listeners_register_lazily() {
  let log = Log::default();
  let l = log.clone();
  let container = Container::builder()
    .lazy_as("one", recorder_type(), move |_| {
      Ok(Recorder {
        name: "One",
        log: l.clone(),
      })
    })
    .build(None)
    .unwrap();

  // Not resolved yet, so nobody is listening.
  container.publish(&Event::new("test", FooEvent)).unwrap();
  assert!(log.lines().is_empty());

  container.get("one").unwrap();
  container.publish(&Event::new("test", FooEvent)).unwrap();
  assert_eq!(log.lines(), vec!["I am One and got a FooEvent"]);
}

#[test]
fn test_nested_publish_runs_depth_first() {
  // Arrange
  let log = Log::default();
  let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
  let container = Container::builder()
    .lazy_as("one", recorder_type(), move |_| {
      Ok(Recorder {
        name: "One",
        log: l1.clone(),
      })
    })
    .lazy_as(
      "two",
      ComponentType::builder::<NestedRecorder>().listener(),
      move |c| {
        Ok(NestedRecorder {
          inner: Recorder {
            name: "Two",
            log: l2.clone(),
          },
          publisher: c.publisher(),
        })
      },
    )
    .lazy_as("three", recorder_type(), move |_| {
      Ok(Recorder {
        name: "Three",
        log: l3.clone(),
      })
    })
    .build(None)
    .unwrap();
  for name in ["one", "two", "three"] {
    container.get(name).unwrap();
  }

  // Act
  container.publish(&Event::new("test", FooEvent)).unwrap();

  // Assert
  assert_eq!(
    log.lines(),
    vec![
      "I am One and got a FooEvent",
      "I am Two and got a FooEvent",
      "I am One and got a NullEvent",
      "I am Two and got a NullEvent",
      "I am Three and got a NullEvent",
      "I am Three and got a FooEvent",
    ]
  );
}

#[test]
fn test_prototype_listeners_register_each_instance() {
  let container = Container::builder()
    .proto_as(
      "counter",
      ComponentType::builder::<Counter>().listener(),
      |_| {
        Ok(Counter {
          hits: AtomicUsize::new(0),
        })
      },
    )
    .build(None)
    .unwrap();

  let a = container.named::<Counter>("counter").unwrap();
  let b = container.named::<Counter>("counter").unwrap();
  assert_eq!(container.listener_count(), 2);

  container.publish(&Event::new("test", NullEvent)).unwrap();
  assert_eq!(a.hits.load(Ordering::SeqCst), 1);
  assert_eq!(b.hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_listener_registers_with_the_container_that_owns_it() {
  let parent = Container::builder()
    .lazy_as(
      "counter",
      ComponentType::builder::<Counter>().listener(),
      |_| {
        Ok(Counter {
          hits: AtomicUsize::new(0),
        })
      },
    )
    .build(None)
    .unwrap();
  let child = Properties::new().build(Some(parent.clone()));

  let counter = child.named::<Counter>("counter").unwrap();

  assert_eq!(parent.listener_count(), 1);
  assert_eq!(child.listener_count(), 0);
  child.publish(&Event::new("child", FooEvent)).unwrap();
  assert_eq!(counter.hits.load(Ordering::SeqCst), 0);
  parent.publish(&Event::new("parent", FooEvent)).unwrap();
  assert_eq!(counter.hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_listeners_are_discoverable_by_type() {
  let container = Container::builder()
    .lazy_as(
      "counter",
      ComponentType::builder::<Counter>().listener(),
      |_| {
        Ok(Counter {
          hits: AtomicUsize::new(0),
        })
      },
    )
    .lazy("plain", |_| Ok(FooEvent))
    .build(None)
    .unwrap();

  let listeners = container.by_type::<dyn Listener>().unwrap();

  assert_eq!(listeners.keys().collect::<Vec<_>>(), vec!["counter"]);
  assert_eq!(container.listener_count(), 1);
}

#[test]
fn test_listener_failure_stops_the_fan_out() {
  struct Failing;
  impl Listener for Failing {
    fn notify(&self, _event: &Event) -> Result<()> {
      Err(Error::component("listener exploded"))
    }
  }

  let container = Container::builder()
    .lazy_as("failing", ComponentType::builder::<Failing>().listener(), |_| {
      Ok(Failing)
    })
    .lazy_as(
      "counter",
      ComponentType::builder::<Counter>().listener(),
      |_| {
        Ok(Counter {
          hits: AtomicUsize::new(0),
        })
      },
    )
    .build(None)
    .unwrap();
  container.get("failing").unwrap();
  let counter = container.named::<Counter>("counter").unwrap();

  let err = container.publish(&Event::new("test", FooEvent)).unwrap_err();

  assert_eq!(err.to_string(), "listener exploded");
  assert_eq!(counter.hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_event_carries_source_and_payload() {
  struct OrderPlaced {
    id: u32,
  }

  struct Capture(Log);
  impl Listener for Capture {
    fn notify(&self, event: &Event) -> Result<()> {
      if let Some(order) = event.payload::<OrderPlaced>() {
        self.0.push(format!("{} placed order {}", event.source(), order.id));
      }
      Ok(())
    }
  }

  let log = Log::default();
  let l = log.clone();
  let container = Container::builder()
    .eager_as(
      "capture",
      ComponentType::builder::<Capture>().listener(),
      move |_| Ok(Capture(l.clone())),
    )
    .build(None)
    .unwrap();

  container
    .publish(&Event::new("checkout", OrderPlaced { id: 42 }))
    .unwrap();
  container.publish(&Event::new("checkout", NullEvent)).unwrap();

  assert_eq!(log.lines(), vec!["checkout placed order 42"]);
}

#[test]
fn test_publisher_handle_does_not_keep_container_alive() {
  let container = Container::builder()
    .lazy_as(
      "counter",
      ComponentType::builder::<Counter>().listener(),
      |_| {
        Ok(Counter {
          hits: AtomicUsize::new(0),
        })
      },
    )
    .build(None)
    .unwrap();
  let counter = container.named::<Counter>("counter").unwrap();
  let publisher = container.publisher();

  publisher.publish(&Event::new("handle", FooEvent)).unwrap();
  assert_eq!(counter.hits.load(Ordering::SeqCst), 1);

  drop(container);
  publisher.publish(&Event::new("handle", FooEvent)).unwrap();
  assert_eq!(counter.hits.load(Ordering::SeqCst), 1);
  assert_eq!(Arc::strong_count(&counter), 1);
}
