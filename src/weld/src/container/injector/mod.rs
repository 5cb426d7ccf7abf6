mod trace;

use std::any;
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use snafu::prelude::*;

use crate::container::Managed;
use crate::key::{Key, Qualifier, TypeDescriptor};

pub use trace::KeyPath;
pub(crate) use trace::ResolutionTrace;

/// Something components can be requested from.
pub trait Injector: Send + Sync {
    /// Resolves the component registered under exactly `key`, viewed as the
    /// key's type.
    fn dyn_get(&self, key: &Key) -> Result<Box<dyn Managed>, ResolutionError>;

    /// Resolves the single component assignable to `expected`, optionally
    /// narrowed by `qualifier`, viewed as `expected`.
    fn dyn_lookup(
        &self,
        expected: &TypeDescriptor,
        qualifier: Option<&str>,
    ) -> Result<Box<dyn Managed>, ResolutionError>;
}

/// Typed access on top of [`Injector`].
pub trait TypedInjector: Injector {
    fn get<T>(&self) -> Result<T, ResolutionError>
    where
        T: Managed,
    {
        let object = self.dyn_lookup(&TypeDescriptor::of::<T>(), None)?;
        Ok(downcast_lookup(object))
    }

    fn get_named<T>(&self, qualifier: &str) -> Result<T, ResolutionError>
    where
        T: Managed,
    {
        let object = self.dyn_lookup(&TypeDescriptor::of::<T>(), Some(qualifier))?;
        Ok(downcast_lookup(object))
    }

    fn get_key<T>(&self, key: &Key) -> Result<T, ResolutionError>
    where
        T: Managed,
    {
        ensure!(
            key.ty().is::<T>(),
            TypeMismatchSnafu {
                key: key.clone(),
                requested: any::type_name::<T>(),
            }
        );
        let object = self.dyn_get(key)?;
        Ok(downcast_lookup(object))
    }
}

impl<T: Injector + ?Sized> TypedInjector for T {}

fn downcast_lookup<T: Managed>(object: Box<dyn Managed>) -> T {
    match object.downcast::<T>() {
        Ok(object) => *object,
        Err(_) => unreachable!("a lookup should produce an object of the requested type"),
    }
}

/// An application fault raised by user construction or injection code.
pub type Fault = Box<dyn Error + Send + Sync>;

#[derive(Debug, Clone, Snafu)]
#[non_exhaustive]
pub enum ResolutionError {
    #[snafu(display("could not find any component registered as {key}"))]
    #[non_exhaustive]
    NotFound { key: Key },
    #[snafu(display("could not use {key} as {requested}"))]
    #[non_exhaustive]
    TypeMismatch { key: Key, requested: &'static str },
    #[snafu(display("could not find the {member} of {key}"))]
    #[non_exhaustive]
    MemberNotFound { key: Key, member: String },
    #[snafu(display("could not access the private member `{member}` of {key}"))]
    #[non_exhaustive]
    AccessDenied { key: Key, member: &'static str },
    #[snafu(display(
        "could not satisfy {expected}{} required by {dependent} (path: {path})",
        QualifierDisplayer::new(qualifier.as_ref())
    ))]
    #[non_exhaustive]
    UnsatisfiedDependency {
        dependent: Key,
        expected: &'static str,
        qualifier: Option<Qualifier>,
        path: KeyPath,
    },
    #[snafu(display("could not find {reference} explicitly required by {dependent} (path: {path})"))]
    #[non_exhaustive]
    ExplicitDependencyMissing {
        dependent: Key,
        reference: Key,
        path: KeyPath,
    },
    #[snafu(display(
        "could not choose one {expected} among {} (path: {path})",
        KeysDisplayer::new(candidates)
    ))]
    #[non_exhaustive]
    AmbiguousResolution {
        expected: &'static str,
        candidates: Vec<Key>,
        path: KeyPath,
    },
    #[snafu(display("could not resolve {path} which depends on itself"))]
    #[non_exhaustive]
    CyclicDependency { path: KeyPath },
    #[snafu(display("argument {index} of `{member}` is not a {expected}"))]
    #[non_exhaustive]
    ArgumentMismatch {
        member: &'static str,
        index: usize,
        expected: &'static str,
    },
    #[snafu(display("`{member}` of {key} failed"))]
    #[non_exhaustive]
    InjectionFailed {
        key: Key,
        member: &'static str,
        source: Arc<dyn Error + Send + Sync>,
    },
}

impl ResolutionError {
    /// Returns the chain of keys involved in a graph error.
    pub fn path(&self) -> Option<&KeyPath> {
        match self {
            Self::UnsatisfiedDependency { path, .. }
            | Self::ExplicitDependencyMissing { path, .. }
            | Self::AmbiguousResolution { path, .. }
            | Self::CyclicDependency { path } => Some(path),
            _ => None,
        }
    }

    pub(crate) fn not_found(expected: &TypeDescriptor, qualifier: Option<&str>) -> Self {
        Self::NotFound {
            key: Key::new(expected.clone(), qualifier.map(Qualifier::from)),
        }
    }
}

struct QualifierDisplayer<'a> {
    qualifier: Option<&'a Qualifier>,
}

impl<'a> QualifierDisplayer<'a> {
    fn new(qualifier: Option<&'a Qualifier>) -> Self {
        Self { qualifier }
    }
}

impl Display for QualifierDisplayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.qualifier {
            Some(qualifier) => write!(f, "@{qualifier}"),
            None => Ok(()),
        }
    }
}

struct KeysDisplayer<'a> {
    keys: &'a [Key],
}

impl<'a> KeysDisplayer<'a> {
    fn new(keys: &'a [Key]) -> Self {
        Self { keys }
    }
}

impl Display for KeysDisplayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("[")?;
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use crate::key;

    use super::*;

    #[test]
    fn resolution_error_display_lists_candidates() {
        let err = ResolutionError::AmbiguousResolution {
            expected: "i32",
            candidates: vec![key::named::<i32>("x"), key::named::<i32>("y")],
            path: KeyPath::new(vec![key::of::<u8>()]),
        };
        assert_eq!(
            err.to_string(),
            "could not choose one i32 among [i32@x, i32@y] (path: u8)"
        );
    }

    #[test]
    fn resolution_error_display_includes_qualifier() {
        let err = ResolutionError::UnsatisfiedDependency {
            dependent: key::of::<u8>(),
            expected: "i32",
            qualifier: Some("z".into()),
            path: KeyPath::new(vec![key::of::<u8>()]),
        };
        assert_eq!(
            err.to_string(),
            "could not satisfy i32@z required by u8 (path: u8)"
        );
        assert!(err.path().is_some());
    }

    #[test]
    fn resolution_error_keeps_injection_fault_as_source() {
        let fault: Arc<dyn Error + Send + Sync> = Arc::from(Fault::from("boom"));
        let err = ResolutionError::InjectionFailed {
            key: key::of::<u8>(),
            member: "new",
            source: fault,
        };
        assert_eq!(err.source().map(|s| s.to_string()), Some("boom".to_string()));
        assert!(err.path().is_none());
    }
}
