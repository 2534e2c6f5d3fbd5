use fibre_registry::Container;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

// A global, thread-safe counter to generate unique IDs.
static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn main() {
  let container = Container::builder()
    // This factory will only be called ONCE.
    .lazy("singleton_tracker", |_| {
      println!("Creating SINGLETON RequestTracker...");
      Ok(RequestTracker {
        id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
      })
    })
    // This factory will be called EVERY time the name is resolved.
    .proto("prototype_tracker", |_| {
      println!("Creating PROTOTYPE RequestTracker...");
      Ok(RequestTracker {
        id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
      })
    })
    .build(None)
    .expect("bindings are valid");

  println!("--- Resolving Singletons ---");
  let s1 = container.named::<RequestTracker>("singleton_tracker").unwrap();
  let s2 = container.named::<RequestTracker>("singleton_tracker").unwrap();
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id, s2.id);
  assert_eq!(s1.id, 0);
  assert!(
    Arc::ptr_eq(&s1, &s2),
    "Singleton instances should be identical"
  );

  println!("\n--- Resolving Prototypes ---");
  let p1 = container.named::<RequestTracker>("prototype_tracker").unwrap();
  let p2 = container.named::<RequestTracker>("prototype_tracker").unwrap();
  println!("Prototype 1 ID: {}, Prototype 2 ID: {}", p1.id, p2.id);
  assert_eq!(p1.id, 1);
  assert_eq!(p2.id, 2);
  assert!(
    !Arc::ptr_eq(&p1, &p2),
    "Prototype instances should be different"
  );
}
