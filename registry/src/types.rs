//! Runtime type descriptions for declared and requested component types.
//!
//! A [`TypeTag`] identifies a type that a caller asks for. A
//! [`ComponentType`] describes the type a binding declares, together with
//! every supertype it can be viewed as. Rust has no nominal subtyping, so the
//! "is-a" relation is recorded explicitly when the type is declared: each
//! supertype (usually a trait object such as `dyn Mailer`) comes with an
//! upcast from the concrete value.

use crate::core::Erased;
use crate::event::Listener;
use crate::matcher;
use once_cell::sync::Lazy;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

type Upcast = Arc<dyn Fn(&Erased) -> Option<Erased> + Send + Sync>;
type ListenerUpcast = Arc<dyn Fn(&Erased) -> Option<Arc<dyn Listener>> + Send + Sync>;

/// The closed set of primitive type kinds.
///
/// Primitive types have no subtype relation: a request for a primitive type
/// is only ever satisfied by exactly that type.
///
/// The set is `bool`, every built-in integer and float type, `char`,
/// `String` and `&'static str`, plus a `Vec` of any of those as `Array`.
/// Fixed-size arrays, slices and other collections are nominal types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
  Bool,
  Int,
  Float,
  Char,
  String,
  Array,
}

// Every scalar is listed together with its `Vec`, so each scalar kind has a
// matching array kind.
macro_rules! primitives {
  ($table:ident, $kind:expr => $($ty:ty),+ $(,)?) => {
    $(
      $table.insert(TypeId::of::<$ty>(), $kind);
      $table.insert(TypeId::of::<Vec<$ty>>(), Primitive::Array);
    )+
  };
}

static PRIMITIVES: Lazy<HashMap<TypeId, Primitive>> = Lazy::new(|| {
  let mut table = HashMap::new();
  primitives!(table, Primitive::Bool => bool);
  primitives!(table, Primitive::Int =>
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
  );
  primitives!(table, Primitive::Float => f32, f64);
  primitives!(table, Primitive::Char => char);
  primitives!(table, Primitive::String => String, &'static str);
  table
});

impl Primitive {
  /// Classifies a runtime type, returning `None` for nominal types.
  pub fn of_id(id: TypeId) -> Option<Self> {
    PRIMITIVES.get(&id).copied()
  }
}

impl fmt::Display for Primitive {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Primitive::Bool => "bool",
      Primitive::Int => "int",
      Primitive::Float => "float",
      Primitive::Char => "char",
      Primitive::String => "string",
      Primitive::Array => "array",
    };
    f.write_str(name)
  }
}

/// The identity of a requested type.
///
/// Equality and hashing only consider the underlying `TypeId`; the name is
/// kept for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeTag {
  id: TypeId,
  name: &'static str,
}

impl TypeTag {
  pub fn of<T: ?Sized + 'static>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: type_name::<T>(),
    }
  }

  pub fn id(&self) -> TypeId {
    self.id
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn primitive(&self) -> Option<Primitive> {
    Primitive::of_id(self.id)
  }

  pub fn is_primitive(&self) -> bool {
    self.primitive().is_some()
  }
}

impl PartialEq for TypeTag {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl fmt::Debug for TypeTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TypeTag({})", self.name)
  }
}

struct View {
  tag: TypeTag,
  upcast: Upcast,
}

struct TypeInfo {
  tag: TypeTag,
  views: HashMap<TypeId, View>,
  listener: Option<ListenerUpcast>,
}

/// The declared type of a binding.
///
/// Cloning is cheap; the supertype table is shared.
#[derive(Clone)]
pub struct ComponentType {
  inner: Arc<TypeInfo>,
}

impl ComponentType {
  /// Declares `T` with no supertypes.
  pub fn of<T: Any + Send + Sync>() -> Self {
    TypeBuilder::<T>::new().build()
  }

  /// Starts a declaration of `T` that can list supertypes and capabilities.
  pub fn builder<T: Any + Send + Sync>() -> TypeBuilder<T> {
    TypeBuilder::new()
  }

  pub fn tag(&self) -> TypeTag {
    self.inner.tag
  }

  pub fn name(&self) -> &'static str {
    self.inner.tag.name
  }

  pub fn primitive(&self) -> Option<Primitive> {
    self.inner.tag.primitive()
  }

  pub fn is_primitive(&self) -> bool {
    self.inner.tag.is_primitive()
  }

  /// Whether values of this type receive published events.
  pub fn is_listener(&self) -> bool {
    self.inner.listener.is_some()
  }

  /// The declared supertypes, excluding the type itself.
  pub fn supertypes(&self) -> impl Iterator<Item = TypeTag> + '_ {
    let own = self.inner.tag;
    self
      .inner
      .views
      .values()
      .map(|view| view.tag)
      .filter(move |tag| *tag != own)
  }

  /// Whether this declared type satisfies a request for `requested`.
  pub fn satisfies(&self, requested: &TypeTag) -> bool {
    matcher::is_compatible(self, requested)
  }

  pub(crate) fn has_view(&self, id: TypeId) -> bool {
    self.inner.views.contains_key(&id)
  }

  /// Converts a value of this type into an `Arc<I>` boxed as `Erased`.
  pub(crate) fn view(&self, value: &Erased, id: TypeId) -> Option<Erased> {
    let view = self.inner.views.get(&id)?;
    (view.upcast)(value)
  }

  pub(crate) fn as_listener(&self, value: &Erased) -> Option<Arc<dyn Listener>> {
    let upcast = self.inner.listener.as_ref()?;
    upcast(value)
  }
}

impl fmt::Debug for ComponentType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ComponentType")
      .field("name", &self.name())
      .field("supertypes", &self.supertypes().map(|t| t.name()).collect::<Vec<_>>())
      .field("listener", &self.is_listener())
      .finish()
  }
}

/// A builder for declaring a component type and the types it can be used as.
///
/// ```
/// use fibre_registry::ComponentType;
/// use std::sync::Arc;
///
/// trait Mailer: Send + Sync {}
/// struct SmtpMailer;
/// impl Mailer for SmtpMailer {}
///
/// let ty = ComponentType::builder::<SmtpMailer>()
///   .is_a::<dyn Mailer>(|m| m)
///   .build();
/// assert_eq!(ty.supertypes().count(), 1);
/// ```
pub struct TypeBuilder<T> {
  views: HashMap<TypeId, View>,
  listener: Option<ListenerUpcast>,
  _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypeBuilder<T> {
  pub fn new() -> Self {
    let builder = Self {
      views: HashMap::new(),
      listener: None,
      _marker: PhantomData,
    };
    builder.with_view::<T>(|value| value)
  }

  /// Declares that `T` can be used wherever an `I` is requested.
  ///
  /// The cast is normally just `|value| value`; the compiler performs the
  /// unsizing coercion to `Arc<I>`.
  pub fn is_a<I>(self, cast: impl Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static) -> Self
  where
    I: ?Sized + Any + Send + Sync,
  {
    self.with_view(cast)
  }

  /// Declares that resolved values of `T` receive published events.
  ///
  /// This also makes `T` resolvable as `dyn Listener`.
  pub fn listener(mut self) -> Self
  where
    T: Listener,
  {
    self.listener = Some(Arc::new(|value: &Erased| {
      let concrete = Arc::clone(value).downcast::<T>().ok()?;
      Some(concrete as Arc<dyn Listener>)
    }));
    self.is_a::<dyn Listener>(|value| value)
  }

  pub fn build(self) -> ComponentType {
    ComponentType {
      inner: Arc::new(TypeInfo {
        tag: TypeTag::of::<T>(),
        views: self.views,
        listener: self.listener,
      }),
    }
  }

  fn with_view<I>(mut self, cast: impl Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static) -> Self
  where
    I: ?Sized + Any + Send + Sync,
  {
    let upcast: Upcast = Arc::new(move |value: &Erased| {
      let concrete = Arc::clone(value).downcast::<T>().ok()?;
      let view: Erased = Arc::new(cast(concrete));
      Some(view)
    });
    let tag = TypeTag::of::<I>();
    self.views.insert(tag.id, View { tag, upcast });
    self
  }
}

impl<T: Any + Send + Sync> Default for TypeBuilder<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Any + Send + Sync> From<TypeBuilder<T>> for ComponentType {
  fn from(builder: TypeBuilder<T>) -> Self {
    builder.build()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  trait Shape: Send + Sync {
    fn sides(&self) -> u32;
  }

  struct Square;
  impl Shape for Square {
    fn sides(&self) -> u32 {
      4
    }
  }

  #[test]
  fn primitives_are_classified() {
    assert_eq!(TypeTag::of::<i64>().primitive(), Some(Primitive::Int));
    assert_eq!(TypeTag::of::<String>().primitive(), Some(Primitive::String));
    assert_eq!(TypeTag::of::<Vec<String>>().primitive(), Some(Primitive::Array));
    assert_eq!(TypeTag::of::<Vec<u8>>().primitive(), Some(Primitive::Array));
    assert_eq!(TypeTag::of::<Vec<char>>().primitive(), Some(Primitive::Array));
    assert_eq!(TypeTag::of::<Vec<f32>>().primitive(), Some(Primitive::Array));
    assert_eq!(TypeTag::of::<Vec<i16>>().primitive(), Some(Primitive::Array));
    assert_eq!(TypeTag::of::<[u8; 4]>().primitive(), None);
    assert_eq!(TypeTag::of::<Square>().primitive(), None);
    assert_eq!(TypeTag::of::<dyn Shape>().primitive(), None);
  }

  #[test]
  fn views_upcast_to_trait_objects() {
    let ty = ComponentType::builder::<Square>()
      .is_a::<dyn Shape>(|s| s)
      .build();
    let value: Erased = Arc::new(Square);

    let view = ty.view(&value, TypeId::of::<dyn Shape>()).unwrap();
    let shape = view.downcast_ref::<Arc<dyn Shape>>().unwrap();
    assert_eq!(shape.sides(), 4);

    let supertypes: Vec<_> = ty.supertypes().collect();
    assert_eq!(supertypes, vec![TypeTag::of::<dyn Shape>()]);
  }

  #[test]
  fn view_of_wrong_value_is_none() {
    let ty = ComponentType::of::<Square>();
    let value: Erased = Arc::new(3_u8);
    assert!(ty.view(&value, TypeId::of::<Square>()).is_none());
  }
}
