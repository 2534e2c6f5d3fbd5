//! Type matching between declared and requested component types.

use crate::types::{ComponentType, TypeTag};

/// Decides whether a binding declared as `declared` satisfies a request for
/// `requested`.
///
/// An exact match always succeeds. Beyond that, only non-primitive requests
/// can be satisfied through a declared supertype; primitive requests never
/// match anything but themselves.
pub fn is_compatible(declared: &ComponentType, requested: &TypeTag) -> bool {
  if declared.tag() == *requested {
    return true;
  }
  if requested.is_primitive() {
    return false;
  }
  declared.has_view(requested.id())
}
