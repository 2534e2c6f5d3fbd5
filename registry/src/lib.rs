//! # Fibre Registry
//!
//! A hierarchical, thread-safe component registry for Rust.
//!
//! Fibre Registry resolves named and typed components from a tree of
//! containers. Each container is built once from an explicit set of
//! bindings and delegates anything it does not know to its parent, so a
//! request-level container can sit on top of an application-level one,
//! which in turn sits on top of static configuration.
//!
//! ## Core Concepts
//!
//! - **Container**: a node in the hierarchy. Lookups go by name (`get`,
//!   `named`) or by type (`get_by_type`, `get_first`).
//! - **Provider**: the factory behind a name, with a [`Lifecycle`]: a
//!   `Singleton` is created once and cached, a `Prototype` is created on
//!   every resolution.
//! - **Component types**: bindings declare their type and, explicitly, the
//!   supertypes (usually trait objects) they can be used as. Type-based
//!   lookups match those declarations.
//! - **Events**: components whose type is declared as a [`Listener`] are
//!   registered when first resolved and receive every event the container
//!   publishes, synchronously and in registration order.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_registry::{ComponentType, Container, Event, Listener, Properties, Result};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!   fn greet(&self) -> String;
//! }
//!
//! struct EnglishGreeter {
//!   message: String,
//! }
//!
//! impl Greeter for EnglishGreeter {
//!   fn greet(&self) -> String {
//!     self.message.clone()
//!   }
//! }
//!
//! impl Listener for EnglishGreeter {
//!   fn notify(&self, event: &Event) -> Result<()> {
//!     println!("{} heard from {}", self.message, event.source());
//!     Ok(())
//!   }
//! }
//!
//! fn main() -> Result<()> {
//!   // Static configuration lives in its own container.
//!   let config = Properties::new()
//!     .set("greeting", String::from("Hello, World!"))
//!     .build(None);
//!
//!   // Objects are built on top of it. The factory resolves its own
//!   // dependencies from the container it is handed.
//!   let objects = Container::builder()
//!     .lazy_as(
//!       "greeter",
//!       ComponentType::builder::<EnglishGreeter>()
//!         .is_a::<dyn Greeter>(|g| g)
//!         .listener(),
//!       |c| {
//!         let message = c.named::<String>("greeting")?;
//!         Ok(EnglishGreeter { message: (*message).clone() })
//!       },
//!     )
//!     .build(Some(config))?;
//!
//!   // Resolve by trait, wherever the implementation is bound.
//!   let greeter = objects.first::<dyn Greeter>()?.expect("a greeter is bound");
//!   assert_eq!(greeter.greet(), "Hello, World!");
//!
//!   // The greeter was registered as a listener when it was resolved.
//!   objects.publish(&Event::new("main", ()))?;
//!   Ok(())
//! }
//! ```

mod builder;
mod component;
mod container;
mod core;
mod error;
mod event;
mod matcher;
mod properties;
mod provider;
mod types;

pub use builder::Builder;
pub use component::{Component, Instance};
pub use container::Container;
pub use error::{BoxError, Error, Result};
pub use event::{Event, Listener, Publisher};
pub use matcher::is_compatible;
pub use properties::Properties;
pub use provider::{Lifecycle, Provider};
pub use types::{ComponentType, Primitive, TypeBuilder, TypeTag};

pub use indexmap::IndexMap;
