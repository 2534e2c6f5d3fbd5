//! The `Container` struct and its resolution methods.

use crate::builder::Builder;
use crate::component::Component;
use crate::error::{Error, Result};
use crate::event::{Event, ListenerRegistry, Publisher};
use crate::provider::Provider;
use crate::types::{ComponentType, TypeTag};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// What stands behind a component name.
pub(crate) enum Binding {
  /// Produced on demand by a provider.
  Provided(Provider),
  /// A static value, as held by a properties container.
  Value(Component),
}

impl Binding {
  fn component_type(&self) -> &ComponentType {
    match self {
      Binding::Provided(provider) => provider.component_type(),
      Binding::Value(component) => component.component_type(),
    }
  }
}

/// A node in a hierarchy of component registries.
///
/// A container's bindings are fixed at construction. Lookups that miss
/// locally are delegated to the parent, if there is one. Singleton caches
/// and the listener registry are the only state that changes afterwards,
/// and both are safe to share across threads.
///
/// Containers are usually built with [`Container::builder`] or
/// [`Properties`](crate::Properties) and shared through an `Arc` so that
/// children can hold on to their parent.
pub struct Container {
  parent: Option<Arc<Container>>,
  bindings: IndexMap<String, Binding>,
  listeners: Arc<ListenerRegistry>,
}

impl Container {
  /// Creates a container from named providers and an optional parent.
  ///
  /// When a name appears more than once, the last provider wins.
  pub fn new<N: Into<String>>(
    providers: impl IntoIterator<Item = (N, Provider)>,
    parent: Option<Arc<Container>>,
  ) -> Self {
    let bindings = providers
      .into_iter()
      .map(|(name, provider)| (name.into(), Binding::Provided(provider)))
      .collect();
    Self::from_bindings(bindings, parent)
  }

  /// A container with no bindings and no parent.
  pub fn empty() -> Self {
    Self::from_bindings(IndexMap::new(), None)
  }

  /// Creates a new [`Builder`].
  pub fn builder() -> Builder {
    Builder::new()
  }

  pub(crate) fn from_bindings(
    bindings: IndexMap<String, Binding>,
    parent: Option<Arc<Container>>,
  ) -> Self {
    debug!(
      bindings = bindings.len(),
      has_parent = parent.is_some(),
      "container created"
    );
    Self {
      parent,
      bindings,
      listeners: Arc::new(ListenerRegistry::default()),
    }
  }

  pub fn parent(&self) -> Option<&Arc<Container>> {
    self.parent.as_ref()
  }

  /// Whether `name` is bound here or in any ancestor.
  pub fn has(&self, name: &str) -> bool {
    self.bindings.contains_key(name) || self.parent.as_ref().is_some_and(|p| p.has(name))
  }

  /// Whether this container or any ancestor has a binding compatible with
  /// `requested`.
  pub fn has_type(&self, requested: TypeTag) -> bool {
    self
      .bindings
      .values()
      .any(|binding| binding.component_type().satisfies(&requested))
      || self.parent.as_ref().is_some_and(|p| p.has_type(requested))
  }

  // --- Resolution ---

  /// Resolves the component bound to `name`, here or in an ancestor.
  pub fn get(&self, name: &str) -> Result<Component> {
    match self.bindings.get(name) {
      Some(binding) => self.resolve_local(name, binding),
      None => match &self.parent {
        Some(parent) => parent.get(name),
        None => Err(Error::NotFound(name.to_owned())),
      },
    }
  }

  /// Resolves every binding compatible with `requested`, from the root of
  /// the hierarchy down to this container.
  ///
  /// Ancestors' entries come first. A name bound at several levels keeps its
  /// first position but holds the value from the level closest to `self`.
  pub fn get_by_type(&self, requested: TypeTag) -> Result<IndexMap<String, Component>> {
    let mut components = match &self.parent {
      Some(parent) => parent.get_by_type(requested)?,
      None => IndexMap::new(),
    };
    for (name, binding) in &self.bindings {
      if binding.component_type().satisfies(&requested) {
        components.insert(name.clone(), self.resolve_local(name, binding)?);
      }
    }
    Ok(components)
  }

  /// Resolves the first binding compatible with `requested`.
  ///
  /// This container's bindings are scanned in declaration order before the
  /// parent is consulted, so a local match always beats an inherited one.
  pub fn get_first(&self, requested: TypeTag) -> Result<Option<Component>> {
    for (name, binding) in &self.bindings {
      if binding.component_type().satisfies(&requested) {
        return self.resolve_local(name, binding).map(Some);
      }
    }
    match &self.parent {
      Some(parent) => parent.get_first(requested),
      None => Ok(None),
    }
  }

  /// Resolves `name` after checking its declared type against `requested`.
  ///
  /// A mismatch is reported without running the factory.
  pub fn get_named(&self, name: &str, requested: TypeTag) -> Result<Component> {
    let declared = self
      .get_type(name)
      .ok_or_else(|| Error::NotFound(name.to_owned()))?;
    if !declared.satisfies(&requested) {
      return Err(Error::TypeMismatch {
        name: name.to_owned(),
        expected: requested.name(),
        actual: declared.name(),
      });
    }
    self.get(name)
  }

  /// Resolves `name` as a `T`.
  ///
  /// `T` can be the bound type itself or any supertype it declared, such as
  /// a trait object. Fails with [`Error::TypeMismatch`] otherwise.
  pub fn named<T: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    let component = self.get_named(name, TypeTag::of::<T>())?;
    view_as::<T>(name, &component)
  }

  /// Typed form of [`get_by_type`](Self::get_by_type).
  pub fn by_type<T: ?Sized + Any + Send + Sync>(&self) -> Result<IndexMap<String, Arc<T>>> {
    self
      .get_by_type(TypeTag::of::<T>())?
      .into_iter()
      .map(|(name, component)| {
        let value = view_as::<T>(&name, &component)?;
        Ok((name, value))
      })
      .collect()
  }

  /// Typed form of [`get_first`](Self::get_first).
  pub fn first<T: ?Sized + Any + Send + Sync>(&self) -> Result<Option<Arc<T>>> {
    match self.get_first(TypeTag::of::<T>())? {
      Some(component) => Ok(Some(view_as::<T>(std::any::type_name::<T>(), &component)?)),
      None => Ok(None),
    }
  }

  // --- Introspection ---

  /// Names bound in this container, excluding ancestors, in declaration
  /// order.
  pub fn get_names(&self) -> Vec<&str> {
    self.bindings.keys().map(String::as_str).collect()
  }

  /// The declared type of `name`, here or in an ancestor.
  pub fn get_type(&self, name: &str) -> Option<&ComponentType> {
    match self.bindings.get(name) {
      Some(binding) => Some(binding.component_type()),
      None => self.parent.as_ref().and_then(|p| p.get_type(name)),
    }
  }

  // --- Events ---

  /// Delivers `event` to every listener this container has resolved so far,
  /// in the order they were first resolved.
  ///
  /// Listener errors stop the fan-out and are returned as-is.
  pub fn publish(&self, event: &Event) -> Result<()> {
    self.listeners.publish(event)
  }

  /// A handle for publishing through this container without owning it.
  ///
  /// Factories can hand this to the components they build, so a listener
  /// can publish further events from inside `notify`.
  pub fn publisher(&self) -> Publisher {
    Publisher::new(&self.listeners)
  }

  /// The number of listeners registered with this container.
  pub fn listener_count(&self) -> usize {
    self.listeners.len()
  }

  // --- PRIVATE HELPERS ---

  fn resolve_local(&self, name: &str, binding: &Binding) -> Result<Component> {
    let provider = match binding {
      Binding::Value(component) => return Ok(component.clone()),
      Binding::Provided(provider) => provider,
    };

    trace!(component = name, "resolving");
    let instance = provider.resolve(self)?;
    let declared = provider.component_type();
    if instance.tag() != declared.tag() {
      return Err(Error::TypeMismatch {
        name: name.to_owned(),
        expected: declared.name(),
        actual: instance.tag().name(),
      });
    }

    let component = Component::new(instance.into_value(), declared.clone());
    if let Some(listener) = component.as_listener() {
      if self.listeners.register(listener) {
        debug!(component = name, "registered listener");
      }
    }
    Ok(component)
  }
}

impl Default for Container {
  fn default() -> Self {
    Self::empty()
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("names", &self.get_names())
      .field("listeners", &self.listener_count())
      .field("parent", &self.parent)
      .finish()
  }
}

fn view_as<T: ?Sized + Any + Send + Sync>(name: &str, component: &Component) -> Result<Arc<T>> {
  component.view::<T>().ok_or_else(|| Error::TypeMismatch {
    name: name.to_owned(),
    expected: std::any::type_name::<T>(),
    actual: component.component_type().name(),
  })
}
