use thiserror::Error;

/// A boxed error raised by user code running inside the registry, such as a
/// factory or a listener.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The error type for `fibre_registry` operations.
#[derive(Debug, Error)]
pub enum Error {
  #[error("No component found with name '{0}'")]
  NotFound(String),

  #[error("Component '{name}' was supposed to be a {expected}, but it is a {actual}")]
  TypeMismatch {
    name: String,
    expected: &'static str,
    actual: &'static str,
  },

  #[error("Invalid binding: {0}")]
  InvalidBinding(String),

  #[error("Circular dependency detected while resolving a {0}")]
  CircularDependency(&'static str),

  /// A failure raised by a factory or listener. The registry passes these
  /// through untouched.
  #[error(transparent)]
  Component(BoxError),

  #[error("Failed to read configuration file: {0}")]
  ConfigRead(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(String),
}

impl Error {
  /// Wraps a user error so it can be returned from a factory or listener.
  pub fn component<E>(err: E) -> Self
  where
    E: Into<BoxError>,
  {
    Error::Component(err.into())
  }
}

/// A specialized `Result` type for `fibre_registry` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
