//! Core, non-public data structures for the registry.

use crate::error::{Error, Result};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::Arc;

/// A shared, type-erased component value.
pub(crate) type Erased = Arc<dyn Any + Send + Sync>;

thread_local! {
  // Providers currently being resolved on this thread, keyed by address.
  // A provider that shows up twice is part of a dependency cycle.
  static RESOLVING: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

/// An RAII guard that detects circular dependencies.
///
/// Entering adds the provider's key to the thread-local resolution set and
/// fails if the key is already present. Dropping the guard removes the key,
/// so the set always mirrors the current factory call stack.
pub(crate) struct ResolutionGuard {
  key: usize,
}

impl ResolutionGuard {
  pub(crate) fn enter(key: usize, type_name: &'static str) -> Result<Self> {
    let fresh = RESOLVING.with(|resolving| resolving.borrow_mut().insert(key));
    if !fresh {
      return Err(Error::CircularDependency(type_name));
    }
    Ok(Self { key })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING.with(|resolving| {
      resolving.borrow_mut().remove(&self.key);
    });
  }
}

/// The address of the value behind an erased `Arc`, used as its identity.
#[inline]
pub(crate) fn identity_of<T: ?Sized>(value: &Arc<T>) -> usize {
  Arc::as_ptr(value) as *const () as usize
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn guard_rejects_reentry_until_dropped() {
    let first = ResolutionGuard::enter(1, "Outer").unwrap();
    assert!(matches!(
      ResolutionGuard::enter(1, "Outer"),
      Err(Error::CircularDependency("Outer"))
    ));

    drop(first);
    assert!(ResolutionGuard::enter(1, "Outer").is_ok());
  }

  #[test]
  fn identity_ignores_the_vtable() {
    let value = Arc::new(5_u32);
    let erased: Erased = value.clone();
    assert_eq!(identity_of(&value), identity_of(&erased));
  }
}
