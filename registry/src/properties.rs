//! Containers holding static configuration values.

use crate::component::Component;
use crate::container::{Binding, Container};
use crate::types::ComponentType;
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A builder for a container of static values.
///
/// A properties container is usually the parent of a container of real
/// objects, whose factories read their settings from it. Values are
/// declared with their own type, so store owned values (`String` rather
/// than `&str`) to look them up with the types you expect.
///
/// ```
/// use fibre_registry::Properties;
///
/// let props = Properties::new()
///   .set("db.host", String::from("example.com"))
///   .set("db.port", 1337_i64)
///   .set_opt("db.password", None::<String>)
///   .build(None);
///
/// assert_eq!(*props.named::<i64>("db.port").unwrap(), 1337);
/// assert!(!props.has("db.password"));
/// ```
#[derive(Default)]
pub struct Properties {
  values: IndexMap<String, Component>,
}

impl Properties {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets `name` to `value`, replacing any previous value.
  pub fn set<T: Any + Send + Sync>(mut self, name: impl Into<String>, value: T) -> Self {
    self.insert(name.into(), value);
    self
  }

  /// Sets `name` if `value` is present. Absent values are ignored.
  pub fn set_opt<T: Any + Send + Sync>(self, name: impl Into<String>, value: Option<T>) -> Self {
    match value {
      Some(value) => self.set(name, value),
      None => self,
    }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn build(self, parent: Option<Arc<Container>>) -> Arc<Container> {
    let bindings = self
      .values
      .into_iter()
      .map(|(name, value)| (name, Binding::Value(value)))
      .collect();
    Arc::new(Container::from_bindings(bindings, parent))
  }

  pub(crate) fn insert<T: Any + Send + Sync>(&mut self, name: String, value: T) {
    let component = Component::new(Arc::new(value), ComponentType::of::<T>());
    self.values.insert(name, component);
  }
}

impl fmt::Debug for Properties {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_map()
      .entries(
        self
          .values
          .iter()
          .map(|(name, value)| (name, value.component_type().name())),
      )
      .finish()
  }
}

#[cfg(feature = "serde")]
mod config {
  use super::Properties;
  use crate::error::{Error, Result};
  use serde_json::Value;
  use std::fs::File;
  use std::io;
  use std::path::Path;
  use tracing::debug;

  impl Properties {
    /// Loads properties from a JSON document.
    ///
    /// Nested maps are flattened into dotted names, so
    /// `{"db": {"host": "example.com"}}` yields `db.host`. Booleans, integers,
    /// floats and strings become `bool`, `i64`, `f64` and `String`. Integers
    /// too large for an `i64` become `u64`. Arrays must hold a single scalar
    /// kind and become the matching `Vec`. Nulls are ignored.
    pub fn from_json(value: &Value) -> Result<Self> {
      let Value::Object(map) = value else {
        return Err(Error::ConfigParse(
          "the configuration root must be a map".to_string(),
        ));
      };
      let mut props = Properties::new();
      for (key, value) in map {
        flatten(key.clone(), value, &mut props)?;
      }
      debug!(properties = props.len(), "loaded configuration");
      Ok(props)
    }

    /// Loads properties from YAML text. See [`from_json`](Self::from_json).
    pub fn from_yaml_str(text: &str) -> Result<Self> {
      let value: Value =
        serde_yaml::from_str(text).map_err(|e| Error::ConfigParse(e.to_string()))?;
      Self::from_json(&value)
    }

    /// Loads properties from a YAML file. JSON files work too, as JSON is
    /// valid YAML.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
      debug!(path = %path.display(), "reading configuration file");
      let reader = io::BufReader::new(File::open(path)?);
      let value: Value =
        serde_yaml::from_reader(reader).map_err(|e| Error::ConfigParse(e.to_string()))?;
      Self::from_json(&value)
    }
  }

  fn flatten(name: String, value: &Value, props: &mut Properties) -> Result<()> {
    match value {
      Value::Null => {}
      Value::Bool(b) => props.insert(name, *b),
      Value::Number(n) => {
        if let Some(i) = n.as_i64() {
          props.insert(name, i);
        } else if let Some(u) = n.as_u64() {
          props.insert(name, u);
        } else if let Some(f) = n.as_f64() {
          props.insert(name, f);
        } else {
          return Err(Error::ConfigParse(format!("number '{name}' is out of range")));
        }
      }
      Value::String(s) => props.insert(name, s.clone()),
      Value::Array(items) => insert_array(name, items, props)?,
      Value::Object(map) => {
        for (key, value) in map {
          flatten(format!("{name}.{key}"), value, props)?;
        }
      }
    }
    Ok(())
  }

  fn insert_array(name: String, items: &[Value], props: &mut Properties) -> Result<()> {
    if items.iter().all(Value::is_string) {
      let strings = items.iter().filter_map(|v| v.as_str().map(str::to_owned));
      props.insert(name, strings.collect::<Vec<String>>());
    } else if items.iter().all(Value::is_boolean) {
      props.insert(name, items.iter().filter_map(Value::as_bool).collect::<Vec<bool>>());
    } else if items.iter().all(Value::is_i64) {
      props.insert(name, items.iter().filter_map(Value::as_i64).collect::<Vec<i64>>());
    } else if items.iter().all(Value::is_u64) {
      props.insert(name, items.iter().filter_map(Value::as_u64).collect::<Vec<u64>>());
    } else if items.iter().all(Value::is_number) {
      props.insert(name, items.iter().filter_map(Value::as_f64).collect::<Vec<f64>>());
    } else {
      return Err(Error::ConfigParse(format!(
        "array '{name}' must contain only strings, booleans or numbers of one kind"
      )));
    }
    Ok(())
  }
}
