use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use tracing::debug;

use crate::adapter::ComponentAdapter;
use crate::container::core::ContainerCore;
use crate::container::injector::{Injector, ResolutionError};
use crate::container::lookup::Query;
use crate::container::registry::AdapterMap;
use crate::container::Managed;
use crate::key::{Key, TypeDescriptor};
use crate::monitor::ComponentMonitor;

/// A read-only set of registered components that builds object graphs on
/// demand.
///
/// Cloning a container is cheap and every clone shares the same adapters.
/// Nothing is cached: each request produces new objects.
#[derive(Clone)]
pub struct Container {
    pub(super) core: Arc<ContainerCore>,
}

impl Container {
    pub(crate) fn new(
        adapters: AdapterMap,
        monitor: Arc<dyn ComponentMonitor>,
        parent: Option<Container>,
    ) -> Self {
        Self {
            core: Arc::new(ContainerCore::new(adapters, monitor, parent)),
        }
    }

    pub fn parent(&self) -> Option<&Container> {
        self.core.parent()
    }

    pub fn monitor(&self) -> &dyn ComponentMonitor {
        self.core.monitor()
    }

    /// Returns the adapter registered here under exactly `key`.
    pub fn adapter(&self, key: &Key) -> Option<&ComponentAdapter> {
        self.core.adapters().get(key).map(Arc::as_ref)
    }

    /// Lists the keys registered here, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.core.adapters().iter().map(|adapter| adapter.key())
    }

    /// Injects the component registered under `key` into an existing
    /// `instance`. See [`ComponentAdapter::decorate`].
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::NotFound`] if nothing is registered under
    /// `key`, or whatever decorating fails with.
    pub fn decorate(
        &self,
        key: &Key,
        instance: &mut dyn Managed,
    ) -> Result<Option<Box<dyn Managed>>, ResolutionError> {
        let candidate = self.locate(key).ok_or_else(|| ResolutionError::NotFound {
            key: key.clone(),
        })?;
        candidate.adapter().decorate(candidate.owner(), instance)
    }

    /// Checks that the component registered under `key` could be resolved.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::NotFound`] if nothing is registered under
    /// `key`, or the first problem found in its graph.
    pub fn verify(&self, key: &Key) -> Result<(), ResolutionError> {
        let candidate = self.locate(key).ok_or_else(|| ResolutionError::NotFound {
            key: key.clone(),
        })?;
        candidate.verify(None)
    }

    /// Checks every component registered here, in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn verify_all(&self) -> Result<(), ResolutionError> {
        debug!(components = self.core.adapters().len(), "verifying container");
        self.core
            .adapters()
            .iter()
            .try_for_each(|adapter| adapter.verify(self))
    }
}

impl Injector for Container {
    fn dyn_get(&self, key: &Key) -> Result<Box<dyn Managed>, ResolutionError> {
        let candidate = self.locate(key).ok_or_else(|| ResolutionError::NotFound {
            key: key.clone(),
        })?;
        candidate.resolve_as(key.ty(), None)
    }

    fn dyn_lookup(
        &self,
        expected: &TypeDescriptor,
        qualifier: Option<&str>,
    ) -> Result<Box<dyn Managed>, ResolutionError> {
        match self.select(&Query::new(expected, qualifier), None)? {
            Some(candidate) => candidate.resolve_as(expected, None),
            None => Err(ResolutionError::not_found(expected, qualifier)),
        }
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Container")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .field("parent", &self.parent())
            .finish_non_exhaustive()
    }
}
