//
//  rested-api
//  registry/factory.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Factory Registry
//!
//! A factory binds an upper-camel-case name to a [`Producer`]: either a
//! constructor that builds a new instance from JSON arguments on every
//! [`FactoryRegistry::make`], or a fixed value shared by every caller.
//!
//! Factories are also reachable as `<Name>Factory`, so `Widget` answers to
//! both `"Widget"` and `"WidgetFactory"`.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rested_api::registry::FactoryRegistry;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct Widget {
//!     name: String,
//! }
//!
//! let mut factories = FactoryRegistry::new();
//! factories.register_model::<Widget>("Widget")?;
//! factories.register_value("Defaults", vec![1, 2, 3])?;
//!
//! let widget = factories.make::<Widget>("WidgetFactory", &[json!({"name": "x"})])?;
//! assert_eq!(widget.name, "x");
//!
//! let a = factories.make::<Vec<i32>>("Defaults", &[])?;
//! let b = factories.make::<Vec<i32>>("Defaults", &[])?;
//! assert!(Arc::ptr_eq(&a, &b));
//! # Ok::<(), rested_api::registry::RegistryError>(())
//! ```

use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::RegistryError;

/// Upper camel case: one or more capitalized words.
static FACTORY_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z][a-z]*)+$").unwrap());

/// Suffix under which factories are also exposed.
pub const FACTORY_SUFFIX: &str = "Factory";

/// A type-erased instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Builds a new instance from JSON arguments.
pub type Constructor = Arc<dyn Fn(&[Value]) -> Result<Instance, String> + Send + Sync>;

/// Whether a name is a valid factory name.
pub fn is_valid_factory_name(name: &str) -> bool {
    FACTORY_NAME.is_match(name)
}

/// What a factory yields.
#[derive(Clone)]
pub enum Producer {
    /// Builds a new instance per call.
    Constructor(Constructor),
    /// Returned unchanged on every call.
    Value(Instance),
}

impl Producer {
    /// Whether the producer is invoked to build instances.
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Constructor(_))
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructor(_) => f.write_str("Constructor"),
            Self::Value(_) => f.write_str("Value"),
        }
    }
}

/// A registered factory.
#[derive(Debug, Clone)]
pub struct Factory {
    /// Upper-camel-case name
    pub name: String,
    /// Name of the produced type
    pub produces: &'static str,
    /// The producer
    pub producer: Producer,
}

impl Factory {
    /// Returns the name the factory is exposed under (`WidgetFactory`).
    pub fn exposed_name(&self) -> String {
        format!("{}{}", self.name, FACTORY_SUFFIX)
    }
}

/// Factories keyed by name.
#[derive(Debug, Clone, Default)]
pub struct FactoryRegistry {
    factories: BTreeMap<String, Factory>,
}

impl FactoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a producer, replacing any factory of the same name.
    ///
    /// # Errors
    ///
    /// [`RegistryError::InvalidFactoryName`] when the name is not upper camel
    /// case. The registry is left unchanged.
    pub fn register(
        &mut self,
        name: &str,
        produces: &'static str,
        producer: Producer,
    ) -> Result<&Factory, RegistryError> {
        if !is_valid_factory_name(name) {
            return Err(RegistryError::InvalidFactoryName(name.to_string()));
        }

        debug!("Registered factory '{}' producing {}", name, produces);
        self.factories.insert(
            name.to_string(),
            Factory {
                name: name.to_string(),
                produces,
                producer,
            },
        );

        self.get(name)
    }

    /// Registers a constructor closure.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rested_api::registry::FactoryRegistry;
    ///
    /// struct Counter(usize);
    ///
    /// let mut factories = FactoryRegistry::new();
    /// factories.register_constructor("Counter", |args| Ok(Counter(args.len())))?;
    ///
    /// let counter = factories.make::<Counter>("Counter", &[1.into(), 2.into()])?;
    /// assert_eq!(counter.0, 2);
    /// # Ok::<(), rested_api::registry::RegistryError>(())
    /// ```
    pub fn register_constructor<T, F>(&mut self, name: &str, constructor: F) -> Result<&Factory, RegistryError>
    where
        T: Any + Send + Sync,
        F: Fn(&[Value]) -> Result<T, String> + Send + Sync + 'static,
    {
        let erased: Constructor = Arc::new(move |args: &[Value]| {
            constructor(args).map(|instance| Arc::new(instance) as Instance)
        });
        self.register(name, type_name::<T>(), Producer::Constructor(erased))
    }

    /// Registers a constructor that deserializes `T` from the arguments.
    ///
    /// No arguments deserialize from an empty mapping, one argument from
    /// itself, several from a sequence of all of them.
    pub fn register_model<T>(&mut self, name: &str) -> Result<&Factory, RegistryError>
    where
        T: DeserializeOwned + Any + Send + Sync,
    {
        self.register_constructor(name, |args: &[Value]| {
            let input = match args {
                [] => Value::Object(Default::default()),
                [single] => single.clone(),
                many => Value::Array(many.to_vec()),
            };
            serde_json::from_value::<T>(input).map_err(|e| e.to_string())
        })
    }

    /// Registers a fixed value returned by every [`FactoryRegistry::make`].
    pub fn register_value<T>(&mut self, name: &str, value: T) -> Result<&Factory, RegistryError>
    where
        T: Any + Send + Sync,
    {
        self.register(name, type_name::<T>(), Producer::Value(Arc::new(value)))
    }

    /// Returns a factory by name or by exposed name.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownFactory`] when neither matches.
    pub fn get(&self, name: &str) -> Result<&Factory, RegistryError> {
        self.factories
            .get(name)
            .or_else(|| {
                name.strip_suffix(FACTORY_SUFFIX)
                    .and_then(|base| self.factories.get(base))
            })
            .ok_or_else(|| RegistryError::UnknownFactory(name.to_string()))
    }

    /// Returns every factory, ordered by name.
    pub fn all(&self) -> &BTreeMap<String, Factory> {
        &self.factories
    }

    /// Produces an instance without checking its type.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::UnknownFactory`] when no factory matches
    /// - [`RegistryError::Construction`] when the constructor fails
    pub fn make_any(&self, name: &str, args: &[Value]) -> Result<Instance, RegistryError> {
        let factory = self.get(name)?;
        match &factory.producer {
            Producer::Value(value) => Ok(value.clone()),
            Producer::Constructor(constructor) => {
                constructor(args).map_err(|message| RegistryError::Construction {
                    name: factory.name.clone(),
                    message,
                })
            }
        }
    }

    /// Produces an instance of `T`.
    ///
    /// Constructors yield a new instance per call. Fixed values yield the
    /// same shared instance every time.
    ///
    /// # Errors
    ///
    /// As [`FactoryRegistry::make_any`], plus [`RegistryError::TypeMismatch`]
    /// when the factory produces a different type.
    pub fn make<T>(&self, name: &str, args: &[Value]) -> Result<Arc<T>, RegistryError>
    where
        T: Any + Send + Sync,
    {
        self.make_any(name, args)?
            .downcast::<T>()
            .map_err(|_| RegistryError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Widget {
        name: String,
        #[serde(default)]
        size: u32,
    }

    #[test]
    fn test_factory_name_validation() {
        let mut factories = FactoryRegistry::new();
        assert!(factories.register_value("Widget", 1u8).is_ok());
        assert!(factories.register_value("WidgetList", 1u8).is_ok());

        for bad in ["widget", "Widget_List", "Widget2", ""] {
            assert_eq!(
                factories.register_value(bad, 1u8).unwrap_err(),
                RegistryError::InvalidFactoryName(bad.to_string())
            );
        }
        assert_eq!(factories.all().len(), 2);
    }

    #[test]
    fn test_constructor_builds_new_instances() {
        let mut factories = FactoryRegistry::new();
        factories.register_model::<Widget>("Widget").unwrap();
        assert!(factories.get("Widget").unwrap().producer.is_function());

        let a = factories.make::<Widget>("Widget", &[json!({"name": "a"})]).unwrap();
        let b = factories.make::<Widget>("Widget", &[json!({"name": "a"})]).unwrap();
        assert_eq!(a, b);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_value_is_a_singleton() {
        let mut factories = FactoryRegistry::new();
        factories.register_value("Settings", json!({"debug": true})).unwrap();
        assert!(!factories.get("Settings").unwrap().producer.is_function());

        let a = factories.make::<Value>("Settings", &[json!("ignored")]).unwrap();
        let b = factories.make::<Value>("SettingsFactory", &[]).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*a, json!({"debug": true}));
    }

    #[test]
    fn test_make_errors() {
        let mut factories = FactoryRegistry::new();
        factories.register_model::<Widget>("Widget").unwrap();

        assert_eq!(
            factories.make::<Widget>("Gadget", &[]).unwrap_err(),
            RegistryError::UnknownFactory("Gadget".into())
        );
        assert!(matches!(
            factories.make::<String>("Widget", &[json!({"name": "a"})]),
            Err(RegistryError::TypeMismatch { .. })
        ));
        assert!(matches!(
            factories.make::<Widget>("Widget", &[]),
            Err(RegistryError::Construction { .. })
        ));
    }

    #[test]
    fn test_exposed_name() {
        let mut factories = FactoryRegistry::new();
        let factory = factories.register_value("Widget", ()).unwrap();
        assert_eq!(factory.exposed_name(), "WidgetFactory");
    }
}
