use std::sync::Arc;

use tracing::trace;

use crate::adapter::ComponentAdapter;
use crate::container::injector::{KeyPath, ResolutionError, ResolutionTrace};
use crate::container::{Container, Managed};
use crate::key::{Key, TypeDescriptor};
use crate::resolver::{self, ResolutionCandidate};

/// A type-based search for components.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Query<'a> {
    expected: &'a TypeDescriptor,
    qualifier: Option<&'a str>,
    name: Option<&'a str>,
}

impl<'a> Query<'a> {
    pub fn new(expected: &'a TypeDescriptor, qualifier: Option<&'a str>) -> Self {
        Self {
            expected,
            qualifier,
            name: None,
        }
    }

    /// Prefers the candidate qualified by `name` when several match.
    pub fn named(mut self, name: Option<&'a str>) -> Self {
        self.name = name;
        self
    }

    fn matches(&self, adapter: &ComponentAdapter) -> bool {
        adapter.implementation().ty().is_assignable_to(self.expected)
            && self
                .qualifier
                .map_or(true, |qualifier| adapter.key().qualifier() == Some(qualifier))
    }
}

/// An adapter found by a lookup, together with the container it is
/// registered in.
#[derive(Clone)]
pub(crate) struct Candidate {
    adapter: Arc<ComponentAdapter>,
    owner: Container,
}

impl Candidate {
    fn new(adapter: &Arc<ComponentAdapter>, owner: &Container) -> Self {
        Self {
            adapter: Arc::clone(adapter),
            owner: owner.clone(),
        }
    }

    pub fn key(&self) -> &Key {
        self.adapter.key()
    }

    pub fn adapter(&self) -> &ComponentAdapter {
        &self.adapter
    }

    pub fn owner(&self) -> &Container {
        &self.owner
    }

    /// Resolves the component in its own container and views it as `target`.
    pub fn resolve_as(
        &self,
        target: &TypeDescriptor,
        trace: Option<&ResolutionTrace<'_>>,
    ) -> Result<Box<dyn Managed>, ResolutionError> {
        let object = self.adapter.resolve_within(&self.owner, trace)?;
        self.adapter
            .implementation()
            .ty()
            .cast(object, target)
            .map_err(|_| ResolutionError::TypeMismatch {
                key: self.key().clone(),
                requested: target.name(),
            })
    }

    pub fn verify(&self, trace: Option<&ResolutionTrace<'_>>) -> Result<(), ResolutionError> {
        self.adapter.verify_within(&self.owner, trace)
    }
}

impl ResolutionCandidate for Candidate {
    fn key(&self) -> &Key {
        self.adapter.key()
    }

    fn produced_type(&self) -> &TypeDescriptor {
        self.adapter.implementation().ty()
    }
}

impl Container {
    /// Finds the adapter registered under exactly `key`, here or in an
    /// ancestor.
    pub(crate) fn locate(&self, key: &Key) -> Option<Candidate> {
        match self.core.adapters().get(key) {
            Some(adapter) => Some(Candidate::new(adapter, self)),
            None => self.core.parent()?.locate(key),
        }
    }

    /// Lists the adapters matching `query` in registration order. The parent
    /// is only asked when nothing matches locally.
    pub(crate) fn candidates(&self, query: &Query<'_>) -> Vec<Candidate> {
        let candidates: Vec<_> = self
            .core
            .adapters()
            .iter()
            .filter(|adapter| query.matches(adapter))
            .map(|adapter| Candidate::new(adapter, self))
            .collect();
        match self.core.parent() {
            Some(parent) if candidates.is_empty() => parent.candidates(query),
            _ => candidates,
        }
    }

    /// Picks the one component satisfying `query`, or nothing if no
    /// component does.
    pub(crate) fn select(
        &self,
        query: &Query<'_>,
        trace: Option<&ResolutionTrace<'_>>,
    ) -> Result<Option<Candidate>, ResolutionError> {
        let candidates = self.candidates(query);
        trace!(
            expected = %query.expected,
            qualifier = query.qualifier,
            name = query.name,
            found = candidates.len(),
            "looked up candidates"
        );
        if candidates.is_empty() {
            return Ok(None);
        }

        resolver::choose(candidates, query.qualifier.or(query.name))
            .map(Some)
            .map_err(|candidates| ResolutionError::AmbiguousResolution {
                expected: query.expected.name(),
                candidates,
                path: KeyPath::of(trace),
            })
    }
}
