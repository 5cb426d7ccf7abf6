mod adapter_map;

use std::sync::Arc;

use snafu::prelude::*;
use tracing::debug;

use crate::adapter::{ComponentAdapter, Strategy};
use crate::container::Container;
use crate::introspect::{Implementation, Introspect};
use crate::key::Key;
use crate::monitor::{ComponentMonitor, NullMonitor};
use crate::parameter::Parameter;

pub(crate) use adapter_map::AdapterMap;

/// Everything needed to register one component.
#[derive(Debug, Clone)]
pub struct Registration {
    key: Key,
    implementation: Implementation,
    parameters: Vec<Parameter>,
    strategy: Strategy,
    use_names: Option<bool>,
}

impl Registration {
    pub fn new(key: Key, implementation: Implementation) -> Self {
        Self {
            key,
            implementation,
            parameters: Vec::new(),
            strategy: Strategy::default(),
            use_names: None,
        }
    }

    /// Registers `T` under `key` using its own member table.
    pub fn of<T: Introspect>(key: Key) -> Self {
        Self::new(key, T::implementation())
    }

    /// Replaces the implicit bindings of the selected members, positionally.
    pub fn parameters(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters = parameters.into_iter().collect();
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Overrides the builder-wide setting for name-aware resolution.
    pub fn use_names(mut self, use_names: bool) -> Self {
        self.use_names = Some(use_names);
        self
    }
}

/// Collects registrations and container-wide settings, then builds a
/// [`Container`].
pub struct RegistryBuilder {
    adapters: AdapterMap,
    monitor: Arc<dyn ComponentMonitor>,
    use_names: bool,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            adapters: AdapterMap::new(),
            monitor: Arc::new(NullMonitor),
            use_names: false,
        }
    }

    pub fn with_monitor(mut self, monitor: Arc<dyn ComponentMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Sets whether components registered afterwards match slot names
    /// against qualifiers unless they say otherwise.
    pub fn use_names_by_default(mut self, use_names: bool) -> Self {
        self.use_names = use_names;
        self
    }

    /// Registers a component.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateKey`] if `key` is taken,
    /// [`RegistryError::NotConcreteImplementation`] if the implementation
    /// has no public constructor and [`RegistryError::IncompatibleKey`] if
    /// the implementation can't be used as the key's type.
    pub fn register(
        &mut self,
        key: Key,
        implementation: Implementation,
        parameters: Vec<Parameter>,
        strategy: Strategy,
    ) -> Result<&ComponentAdapter, RegistryError> {
        self.add(
            Registration::new(key, implementation)
                .parameters(parameters)
                .strategy(strategy),
        )
    }

    /// Registers `T` with its own member table and implicit bindings.
    ///
    /// # Errors
    ///
    /// See [`RegistryBuilder::register`].
    pub fn register_component<T: Introspect>(
        &mut self,
        key: Key,
        strategy: Strategy,
    ) -> Result<&ComponentAdapter, RegistryError> {
        self.add(Registration::of::<T>(key).strategy(strategy))
    }

    /// Registers a prepared [`Registration`].
    ///
    /// # Errors
    ///
    /// See [`RegistryBuilder::register`].
    pub fn add(&mut self, registration: Registration) -> Result<&ComponentAdapter, RegistryError> {
        let Registration {
            key,
            implementation,
            parameters,
            strategy,
            use_names,
        } = registration;

        ensure!(!self.adapters.contains(&key), DuplicateKeySnafu { key });
        ensure!(
            implementation.is_concrete(),
            NotConcreteImplementationSnafu {
                key,
                implementation: implementation.ty().name(),
            }
        );
        ensure!(
            implementation.ty().is_assignable_to(key.ty()),
            IncompatibleKeySnafu {
                key,
                implementation: implementation.ty().name(),
            }
        );

        let use_names = use_names.unwrap_or(self.use_names);
        debug!(%key, implementation = implementation.ty().name(), %strategy, use_names, "registered component");
        let adapter = ComponentAdapter::new(key, implementation, parameters, strategy, use_names);
        self.adapters
            .insert(adapter)
            .map_err(|adapter| RegistryError::DuplicateKey {
                key: adapter.key().clone(),
            })
    }

    pub fn build(self) -> Container {
        Container::new(self.adapters, self.monitor, None)
    }

    /// Builds a container that looks up whatever it lacks in `parent`.
    pub fn build_with_parent(self, parent: &Container) -> Container {
        Container::new(self.adapters, self.monitor, Some(parent.clone()))
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum RegistryError {
    #[snafu(display("the key {key} already exists in the registry"))]
    #[non_exhaustive]
    DuplicateKey { key: Key },
    #[snafu(display("{implementation} registered as {key} has no public constructor"))]
    #[non_exhaustive]
    NotConcreteImplementation {
        key: Key,
        implementation: &'static str,
    },
    #[snafu(display("{implementation} can't be registered as {key}"))]
    #[non_exhaustive]
    IncompatibleKey {
        key: Key,
        implementation: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::container::injector::TypedInjector;
    use crate::introspect::Member;
    use crate::key;

    use super::*;

    trait Named: Send + Sync {
        fn name(&self) -> &str;
    }

    struct Fixed;

    impl Named for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn fixed() -> Implementation {
        Implementation::builder::<Fixed>()
            .assignable_to(|fixed: Fixed| -> Arc<dyn Named> { Arc::new(fixed) })
            .constructor(Member::new("new"), |_| Ok(Fixed))
            .build()
    }

    #[test]
    fn registry_builder_register_succeeds() {
        let mut builder = RegistryBuilder::new().use_names_by_default(true);
        let adapter = builder
            .register(
                key::of::<Arc<dyn Named>>(),
                fixed(),
                Vec::new(),
                Strategy::default(),
            )
            .unwrap();
        assert_eq!(adapter.key(), &key::of::<Arc<dyn Named>>());
        assert!(adapter.uses_names());

        let adapter = builder
            .add(Registration::new(key::named::<Fixed>("x"), fixed()).use_names(false))
            .unwrap();
        assert!(!adapter.uses_names());

        let container = builder.build();
        assert_eq!(container.keys().count(), 2);
        let named: Arc<dyn Named> = container.get().unwrap();
        assert_eq!(named.name(), "fixed");
    }

    #[test]
    fn registry_builder_register_fails_when_key_is_duplicated() {
        let mut builder = RegistryBuilder::new();
        let register = |builder: &mut RegistryBuilder| {
            builder
                .register(key::of::<Fixed>(), fixed(), Vec::new(), Strategy::default())
                .map(|_| ())
        };

        assert!(register(&mut builder).is_ok());
        assert!(matches!(
            register(&mut builder),
            Err(RegistryError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn registry_builder_register_fails_when_implementation_is_abstract() {
        let mut builder = RegistryBuilder::new();
        let implementation = Implementation::builder::<Fixed>()
            .constructor(Member::new("new").private(), |_| Ok(Fixed))
            .build();

        let res = builder.register(
            key::of::<Fixed>(),
            implementation,
            Vec::new(),
            Strategy::default(),
        );
        assert!(matches!(
            res,
            Err(RegistryError::NotConcreteImplementation { .. })
        ));
    }

    #[test]
    fn registry_builder_register_fails_when_key_type_is_incompatible() {
        let mut builder = RegistryBuilder::new();

        let res = builder.register(key::of::<i32>(), fixed(), Vec::new(), Strategy::default());
        assert!(matches!(res, Err(RegistryError::IncompatibleKey { .. })));
        assert!(builder.build().keys().next().is_none());
    }
}
