//! Values produced by factories and handed out by containers.

use crate::core::{identity_of, Erased};
use crate::event::Listener;
use crate::types::{ComponentType, TypeTag};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A type-erased value produced by a factory.
///
/// The container checks the instance's runtime type against the binding's
/// declared type before handing it out.
#[derive(Clone)]
pub struct Instance {
  value: Erased,
  tag: TypeTag,
}

impl Instance {
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self::from_arc(Arc::new(value))
  }

  pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
    let value: Erased = value;
    Self {
      value,
      tag: TypeTag::of::<T>(),
    }
  }

  /// The runtime type of the value.
  pub fn tag(&self) -> TypeTag {
    self.tag
  }

  pub(crate) fn into_value(self) -> Erased {
    self.value
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Instance").field(&self.tag.name()).finish()
  }
}

/// A resolved component: a shared value and the type its binding declared.
#[derive(Clone)]
pub struct Component {
  value: Erased,
  ty: ComponentType,
}

impl Component {
  pub(crate) fn new(value: Erased, ty: ComponentType) -> Self {
    Self { value, ty }
  }

  pub fn component_type(&self) -> &ComponentType {
    &self.ty
  }

  /// Whether this component can be viewed as a `T`.
  pub fn is<T: ?Sized + 'static>(&self) -> bool {
    self.ty.satisfies(&TypeTag::of::<T>())
  }

  /// Views the component as a `T`, which may be its own type or any declared
  /// supertype such as a trait object.
  ///
  /// Returns `None` when the declared type is not compatible with `T`.
  pub fn view<T: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<T>> {
    if !self.is::<T>() {
      return None;
    }
    let view = self.ty.view(&self.value, TypeId::of::<T>())?;
    view.downcast_ref::<Arc<T>>().cloned()
  }

  /// Whether two handles refer to the same underlying value.
  pub fn ptr_eq(this: &Component, other: &Component) -> bool {
    this.identity() == other.identity()
  }

  pub(crate) fn identity(&self) -> usize {
    identity_of(&self.value)
  }

  pub(crate) fn as_listener(&self) -> Option<Arc<dyn Listener>> {
    self.ty.as_listener(&self.value)
  }
}

impl fmt::Debug for Component {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Component")
      .field("type", &self.ty.name())
      .field("identity", &format_args!("{:#x}", self.identity()))
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  trait Named: Send + Sync {
    fn name(&self) -> &str;
  }

  struct Account {
    owner: String,
  }

  impl Named for Account {
    fn name(&self) -> &str {
      &self.owner
    }
  }

  #[test]
  fn component_views_as_declared_types_only() {
    let ty = ComponentType::builder::<Account>()
      .is_a::<dyn Named>(|a| a)
      .build();
    let instance = Instance::new(Account {
      owner: "ada".to_string(),
    });
    let component = Component::new(instance.into_value(), ty);

    assert_eq!(component.view::<Account>().unwrap().owner, "ada");
    assert_eq!(component.view::<dyn Named>().unwrap().name(), "ada");
    assert!(component.view::<String>().is_none());
  }

  #[test]
  fn views_share_the_same_value() {
    let component = Component::new(Arc::new(7_u64), ComponentType::of::<u64>());
    let a = component.view::<u64>().unwrap();
    let b = component.clone().view::<u64>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Component::ptr_eq(&component, &component.clone()));
  }
}
