//! A fluent builder for object containers.

use crate::container::Container;
use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::types::TypeBuilder;
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A builder for creating a [`Container`] of providers.
///
/// Bindings are validated as they are added, but errors are reported by
/// [`build`](Builder::build) so the calls can be chained.
///
/// ```
/// use fibre_registry::{Container, Properties};
///
/// struct Mailer {
///   host: String,
/// }
///
/// let config = Properties::new()
///   .set("mail.host", String::from("mail.example.net"))
///   .build(None);
///
/// let objects = Container::builder()
///   .lazy("mailer", |c| {
///     Ok(Mailer {
///       host: (*c.named::<String>("mail.host")?).clone(),
///     })
///   })
///   .build(Some(config))
///   .unwrap();
///
/// assert_eq!(objects.named::<Mailer>("mailer").unwrap().host, "mail.example.net");
/// ```
#[derive(Default)]
pub struct Builder {
  providers: IndexMap<String, Provider>,
  eager: Vec<String>,
  error: Option<Error>,
}

impl Builder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a ready-made provider under `name`.
  pub fn add_provider(mut self, name: impl Into<String>, provider: Provider) -> Self {
    self.providers.insert(name.into(), provider);
    self
  }

  /// Adds a singleton that is created as soon as the container is built.
  pub fn eager<T: Any + Send + Sync>(
    self,
    name: impl Into<String>,
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> Self {
    self.eager_as(name, TypeBuilder::new(), factory)
  }

  /// Like [`eager`](Builder::eager), with an explicit type declaration.
  pub fn eager_as<T: Any + Send + Sync>(
    mut self,
    name: impl Into<String>,
    ty: TypeBuilder<T>,
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> Self {
    let name = name.into();
    self.eager.push(name.clone());
    self.push(name, Provider::singleton_as(ty, factory))
  }

  /// Adds a singleton that is created on first use.
  pub fn lazy<T: Any + Send + Sync>(
    self,
    name: impl Into<String>,
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> Self {
    self.lazy_as(name, TypeBuilder::new(), factory)
  }

  /// Like [`lazy`](Builder::lazy), with an explicit type declaration.
  pub fn lazy_as<T: Any + Send + Sync>(
    self,
    name: impl Into<String>,
    ty: TypeBuilder<T>,
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> Self {
    self.push(name.into(), Provider::singleton_as(ty, factory))
  }

  /// Adds a component that is created anew on every resolution.
  pub fn proto<T: Any + Send + Sync>(
    self,
    name: impl Into<String>,
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> Self {
    self.proto_as(name, TypeBuilder::new(), factory)
  }

  /// Like [`proto`](Builder::proto), with an explicit type declaration.
  pub fn proto_as<T: Any + Send + Sync>(
    self,
    name: impl Into<String>,
    ty: TypeBuilder<T>,
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> Self {
    self.push(name.into(), Provider::prototype_as(ty, factory))
  }

  /// Builds the container and instantiates every eager component, in the
  /// order they were added.
  ///
  /// Returns the first binding error recorded while building, or the first
  /// error raised by an eager component.
  pub fn build(self, parent: Option<Arc<Container>>) -> Result<Arc<Container>> {
    if let Some(err) = self.error {
      return Err(err);
    }
    let container = Arc::new(Container::new(self.providers, parent));
    for name in &self.eager {
      debug!(component = name.as_str(), "instantiating eager component");
      container.get(name)?;
    }
    Ok(container)
  }

  fn push(mut self, name: String, provider: Result<Provider>) -> Self {
    match provider {
      Ok(provider) => {
        self.providers.insert(name, provider);
      }
      Err(err) => {
        self.error.get_or_insert(err);
      }
    }
    self
  }
}

impl fmt::Debug for Builder {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Builder")
      .field("names", &self.providers.keys().collect::<Vec<_>>())
      .field("eager", &self.eager)
      .field("has_error", &self.error.is_some())
      .finish()
  }
}
