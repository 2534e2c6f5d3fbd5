//! Lifecycle-aware factories bound to a single component.

use crate::component::Instance;
use crate::container::Container;
use crate::core::ResolutionGuard;
use crate::error::{Error, Result};
use crate::types::{ComponentType, TypeBuilder};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt;
use tracing::trace;

/// Controls how often a provider invokes its factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
  /// The factory runs at most once; its result is cached forever.
  Singleton,
  /// The factory runs on every resolution; nothing is cached.
  Prototype,
}

type Factory = Box<dyn Fn(&Container) -> Result<Instance> + Send + Sync>;

/// Owns one component's factory, declared type and lifecycle.
///
/// Singleton caching is thread-safe: concurrent first resolutions block on
/// the same cell and the factory still runs exactly once.
pub struct Provider {
  ty: ComponentType,
  lifecycle: Lifecycle,
  factory: Factory,
  cell: OnceCell<Instance>,
}

impl Provider {
  /// Creates a provider from a type-erased factory.
  ///
  /// The declared type must be nominal; primitive types are rejected with
  /// [`Error::InvalidBinding`]. The factory's output is not checked here:
  /// the container compares it against `ty` on every resolution.
  pub fn new(
    ty: impl Into<ComponentType>,
    lifecycle: Lifecycle,
    factory: impl Fn(&Container) -> Result<Instance> + Send + Sync + 'static,
  ) -> Result<Self> {
    let ty = ty.into();
    if let Some(primitive) = ty.primitive() {
      return Err(Error::InvalidBinding(format!(
        "'{}' is a {} type; providers must declare a nominal type",
        ty.name(),
        primitive
      )));
    }
    Ok(Self {
      ty,
      lifecycle,
      factory: Box::new(factory),
      cell: OnceCell::new(),
    })
  }

  /// A lazily created, cached `T` with no declared supertypes.
  pub fn singleton<T: Any + Send + Sync>(
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> Result<Self> {
    Self::typed(TypeBuilder::new(), Lifecycle::Singleton, factory)
  }

  /// A lazily created, cached `T` declared with `ty`.
  pub fn singleton_as<T: Any + Send + Sync>(
    ty: TypeBuilder<T>,
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> Result<Self> {
    Self::typed(ty, Lifecycle::Singleton, factory)
  }

  /// A fresh `T` on every resolution, with no declared supertypes.
  pub fn prototype<T: Any + Send + Sync>(
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> Result<Self> {
    Self::typed(TypeBuilder::new(), Lifecycle::Prototype, factory)
  }

  /// A fresh `T` on every resolution, declared with `ty`.
  pub fn prototype_as<T: Any + Send + Sync>(
    ty: TypeBuilder<T>,
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> Result<Self> {
    Self::typed(ty, Lifecycle::Prototype, factory)
  }

  fn typed<T: Any + Send + Sync>(
    ty: TypeBuilder<T>,
    lifecycle: Lifecycle,
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> Result<Self> {
    Self::new(ty, lifecycle, move |container: &Container| {
      factory(container).map(Instance::new)
    })
  }

  pub fn component_type(&self) -> &ComponentType {
    &self.ty
  }

  pub fn lifecycle(&self) -> Lifecycle {
    self.lifecycle
  }

  pub fn is_singleton(&self) -> bool {
    self.lifecycle == Lifecycle::Singleton
  }

  /// Produces the value, invoking the factory with `container` when needed.
  ///
  /// Factory errors propagate unchanged. A failed singleton initialization
  /// caches nothing, so a later call runs the factory again.
  pub fn resolve(&self, container: &Container) -> Result<Instance> {
    match self.lifecycle {
      Lifecycle::Singleton => {
        if let Some(instance) = self.cell.get() {
          return Ok(instance.clone());
        }
        let _guard = ResolutionGuard::enter(self.key(), self.ty.name())?;
        self
          .cell
          .get_or_try_init(|| {
            trace!(component_type = self.ty.name(), "creating singleton");
            (self.factory)(container)
          })
          .cloned()
      }
      Lifecycle::Prototype => {
        let _guard = ResolutionGuard::enter(self.key(), self.ty.name())?;
        trace!(component_type = self.ty.name(), "creating prototype");
        (self.factory)(container)
      }
    }
  }

  fn key(&self) -> usize {
    self as *const Self as usize
  }
}

impl fmt::Debug for Provider {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Provider")
      .field("type", &self.ty.name())
      .field("lifecycle", &self.lifecycle)
      .field("cached", &self.cell.get().is_some())
      .finish_non_exhaustive()
  }
}
