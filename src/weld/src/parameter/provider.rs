use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use crate::container::injector::{Injector, ResolutionError};
use crate::container::{Container, Managed, Query};
use crate::key::{Key, Qualifier, TypeDescriptor};

/// What a deferred lookup resolves when called.
#[derive(Debug, Clone)]
pub(crate) enum Target {
    /// The component registered under exactly this key.
    Key(Key),
    /// Whichever component a type search picks, preferring `name` when
    /// several match.
    Search {
        expected: TypeDescriptor,
        qualifier: Option<Qualifier>,
        name: Option<&'static str>,
    },
}

/// A type-erased deferred lookup bound to the container that created it.
#[derive(Clone)]
pub struct DynProvider {
    container: Container,
    target: Target,
}

impl DynProvider {
    pub(crate) fn new(container: Container, target: Target) -> Self {
        Self { container, target }
    }

    pub fn expected(&self) -> &TypeDescriptor {
        match &self.target {
            Target::Key(key) => key.ty(),
            Target::Search { expected, .. } => expected,
        }
    }

    pub fn qualifier(&self) -> Option<&str> {
        match &self.target {
            Target::Key(key) => key.qualifier(),
            Target::Search { qualifier, .. } => qualifier.as_deref(),
        }
    }

    /// The key the lookup is issued for.
    pub fn key(&self) -> Key {
        match &self.target {
            Target::Key(key) => key.clone(),
            Target::Search {
                expected,
                qualifier,
                ..
            } => Key::new(expected.clone(), qualifier.clone()),
        }
    }

    /// Performs the lookup now.
    ///
    /// # Errors
    ///
    /// Returns whatever error the lookup would raise if it was issued on the
    /// container directly.
    pub fn dyn_get(&self) -> Result<Box<dyn Managed>, ResolutionError> {
        match &self.target {
            Target::Key(key) => self.container.dyn_get(key),
            Target::Search {
                expected,
                qualifier,
                name,
            } => {
                let query = Query::new(expected, qualifier.as_deref()).named(*name);
                match self.container.select(&query, None)? {
                    Some(candidate) => candidate.resolve_as(expected, None),
                    None => Err(ResolutionError::not_found(expected, qualifier.as_deref())),
                }
            }
        }
    }
}

impl Debug for DynProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DynProvider")
            .field("key", &self.key())
            .finish_non_exhaustive()
    }
}

/// A handle that resolves a `V` each time [`Provider::get`] is called.
///
/// Injecting a provider instead of the value defers the lookup until the
/// component actually needs it, which also lets two components refer to
/// each other.
pub struct Provider<V: Managed> {
    inner: DynProvider,
    _marker: PhantomData<fn() -> V>,
}

impl<V: Managed> Provider<V> {
    pub(crate) fn new(inner: DynProvider) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Resolves a fresh `V`.
    ///
    /// # Errors
    ///
    /// Returns an error if `V` can't be resolved at the time of the call.
    pub fn get(&self) -> Result<V, ResolutionError> {
        let object = self.inner.dyn_get()?;
        match object.downcast::<V>() {
            Ok(object) => Ok(*object),
            Err(_) => unreachable!("a provider should only look up its own type"),
        }
    }

    pub fn key(&self) -> Key {
        self.inner.key()
    }
}

impl<V: Managed> Clone for Provider<V> {
    fn clone(&self) -> Self {
        Self::new(self.inner.clone())
    }
}

impl<V: Managed> Debug for Provider<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Provider")
            .field("key", &self.inner.key())
            .finish_non_exhaustive()
    }
}
