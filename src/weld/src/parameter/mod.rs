mod provider;

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::injector::{KeyPath, ResolutionError, ResolutionTrace};
use crate::container::{Candidate, Container, Managed, Query};
use crate::introspect::{Argument, Slot, SlotKind};
use crate::key::{Key, Qualifier, TypeDescriptor};
use crate::monitor::Origin;

use provider::Target;

pub use provider::{DynProvider, Provider};

type MakeFn = dyn Fn() -> Box<dyn Managed> + Send + Sync;

/// A literal value handed to a slot, cloned on every resolution.
#[derive(Clone)]
pub struct Constant {
    ty: TypeDescriptor,
    make: Arc<MakeFn>,
}

impl Constant {
    pub fn new<T>(value: T) -> Self
    where
        T: Managed + Clone,
    {
        Self {
            ty: TypeDescriptor::of::<T>(),
            make: Arc::new(move || Box::new(value.clone())),
        }
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    fn instantiate(&self) -> Box<dyn Managed> {
        (self.make)()
    }
}

impl Debug for Constant {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Constant")
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

/// A binding supplied at registration time.
#[derive(Debug, Clone)]
pub enum Explicit {
    Value(Constant),
    /// A reference to the component registered under exactly this key.
    Key(Key),
}

/// A binding resolved by searching the container for a type and qualifier
/// match.
#[derive(Debug, Clone)]
pub struct Implicit {
    expected: TypeDescriptor,
    qualifier: Option<Qualifier>,
    nullable: bool,
}

impl Implicit {
    pub fn of<T: Managed>() -> Self {
        Self::new(TypeDescriptor::of::<T>())
    }

    pub fn new(expected: TypeDescriptor) -> Self {
        Self {
            expected,
            qualifier: None,
            nullable: false,
        }
    }

    pub fn qualified(mut self, qualifier: impl Into<Qualifier>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Lets the slot resolve to nothing when no candidate exists.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn expected(&self) -> &TypeDescriptor {
        &self.expected
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    fn key(&self) -> Key {
        Key::new(self.expected.clone(), self.qualifier.clone())
    }

    fn query<'a>(&'a self, name: Option<&'a str>) -> Query<'a> {
        Query::new(&self.expected, self.qualifier.as_deref()).named(name)
    }

    fn unsatisfied(&self, request: &SlotRequest<'_>, trace: &ResolutionTrace<'_>) -> ResolutionError {
        ResolutionError::UnsatisfiedDependency {
            dependent: request.dependent.clone(),
            expected: self.expected.name(),
            qualifier: self.qualifier.clone(),
            path: KeyPath::of(Some(trace)),
        }
    }
}

/// How one dependency slot gets its value.
#[derive(Debug, Clone)]
pub enum Parameter {
    Explicit(Explicit),
    Implicit(Implicit),
    /// Resolves to a [`Provider`] that performs the implicit lookup when
    /// called.
    ProviderDelegate(Implicit),
}

impl Parameter {
    pub fn value<T>(value: T) -> Self
    where
        T: Managed + Clone,
    {
        Self::Explicit(Explicit::Value(Constant::new(value)))
    }

    pub fn key(key: Key) -> Self {
        Self::Explicit(Explicit::Key(key))
    }

    pub fn implicit(implicit: Implicit) -> Self {
        Self::Implicit(implicit)
    }

    pub fn provider(implicit: Implicit) -> Self {
        Self::ProviderDelegate(implicit)
    }

    /// Synthesises the implicit binding a slot declares for itself.
    pub fn for_slot(slot: &Slot) -> Self {
        let implicit = Implicit {
            expected: slot.ty().clone(),
            qualifier: slot.qualifier().map(Qualifier::from),
            nullable: slot.is_nullable(),
        };
        match slot.kind() {
            SlotKind::Value => Self::Implicit(implicit),
            SlotKind::Provider => Self::ProviderDelegate(implicit),
        }
    }

    pub(crate) fn resolve(
        &self,
        container: &Container,
        request: &SlotRequest<'_>,
        trace: &ResolutionTrace<'_>,
    ) -> Result<Resolved, ResolutionError> {
        self.check(request)?;
        match self {
            Self::Explicit(Explicit::Value(constant)) => Ok(Resolved::new(
                Argument::Present(constant.instantiate()),
                Origin::Value,
            )),
            Self::Explicit(Explicit::Key(key)) => {
                let candidate = locate(container, key, request, trace)?;
                if request.slot.kind() == SlotKind::Provider {
                    let provider = DynProvider::new(container.clone(), Target::Key(key.clone()));
                    return Ok(Resolved::new(
                        Argument::Deferred(provider),
                        Origin::Provider(key.clone()),
                    ));
                }
                let object = candidate.resolve_as(key.ty(), Some(trace))?;
                Ok(Resolved::new(
                    Argument::Present(object),
                    Origin::Component(candidate.key().clone()),
                ))
            }
            Self::Implicit(implicit) => {
                let query = implicit.query(request.name());
                match container.select(&query, Some(trace))? {
                    Some(candidate) => {
                        let object = candidate.resolve_as(&implicit.expected, Some(trace))?;
                        Ok(Resolved::new(
                            Argument::Present(object),
                            Origin::Component(candidate.key().clone()),
                        ))
                    }
                    None if implicit.nullable => Ok(Resolved::new(Argument::Absent, Origin::Absent)),
                    None => Err(implicit.unsatisfied(request, trace)),
                }
            }
            Self::ProviderDelegate(implicit) => {
                let target = Target::Search {
                    expected: implicit.expected.clone(),
                    qualifier: implicit.qualifier.clone(),
                    name: request.name(),
                };
                let provider = DynProvider::new(container.clone(), target);
                Ok(Resolved::new(
                    Argument::Deferred(provider),
                    Origin::Provider(implicit.key()),
                ))
            }
        }
    }

    /// Checks that the binding could be resolved, recursing into the
    /// components it refers to. Providers are only checked for a target.
    pub(crate) fn verify(
        &self,
        container: &Container,
        request: &SlotRequest<'_>,
        trace: &ResolutionTrace<'_>,
    ) -> Result<(), ResolutionError> {
        self.check(request)?;
        match self {
            Self::Explicit(Explicit::Value(_)) => Ok(()),
            Self::Explicit(Explicit::Key(key)) => {
                let candidate = locate(container, key, request, trace)?;
                if request.slot.kind() == SlotKind::Provider {
                    Ok(())
                } else {
                    candidate.verify(Some(trace))
                }
            }
            Self::Implicit(implicit) => {
                let query = implicit.query(request.name());
                match container.select(&query, Some(trace))? {
                    Some(candidate) => candidate.verify(Some(trace)),
                    None if implicit.nullable => Ok(()),
                    None => Err(implicit.unsatisfied(request, trace)),
                }
            }
            Self::ProviderDelegate(implicit) => {
                match container.select(&implicit.query(request.name()), Some(trace))? {
                    Some(_) => Ok(()),
                    None if implicit.nullable => Ok(()),
                    None => Err(implicit.unsatisfied(request, trace)),
                }
            }
        }
    }

    /// Returns true if the binding has something to resolve to, without
    /// looking any deeper.
    pub(crate) fn is_resolvable(&self, container: &Container, request: &SlotRequest<'_>) -> bool {
        if self.check(request).is_err() {
            return false;
        }
        match self {
            Self::Explicit(Explicit::Value(_)) | Self::ProviderDelegate(_) => true,
            Self::Explicit(Explicit::Key(key)) => container.locate(key).is_some(),
            Self::Implicit(implicit) => {
                match container.select(&implicit.query(request.name()), None) {
                    Ok(Some(_)) => true,
                    Ok(None) => implicit.nullable,
                    Err(_) => false,
                }
            }
        }
    }

    fn check(&self, request: &SlotRequest<'_>) -> Result<(), ResolutionError> {
        let slot = request.slot;
        let compatible = match self {
            Self::Explicit(Explicit::Value(constant)) => {
                slot.kind() == SlotKind::Value && constant.ty() == slot.ty()
            }
            Self::Explicit(Explicit::Key(key)) => key.ty() == slot.ty(),
            Self::Implicit(implicit) => {
                slot.kind() == SlotKind::Value && implicit.expected() == slot.ty()
            }
            Self::ProviderDelegate(implicit) => {
                slot.kind() == SlotKind::Provider && implicit.expected() == slot.ty()
            }
        };
        if compatible {
            Ok(())
        } else {
            Err(ResolutionError::ArgumentMismatch {
                member: request.member,
                index: request.index,
                expected: slot.ty().name(),
            })
        }
    }
}

fn locate(
    container: &Container,
    key: &Key,
    request: &SlotRequest<'_>,
    trace: &ResolutionTrace<'_>,
) -> Result<Candidate, ResolutionError> {
    container
        .locate(key)
        .ok_or_else(|| ResolutionError::ExplicitDependencyMissing {
            dependent: request.dependent.clone(),
            reference: key.clone(),
            path: KeyPath::of(Some(trace)),
        })
}

/// One slot of a member being resolved on behalf of `dependent`.
pub(crate) struct SlotRequest<'a> {
    pub dependent: &'a Key,
    pub member: &'static str,
    pub index: usize,
    pub slot: &'a Slot,
    pub use_names: bool,
}

impl SlotRequest<'_> {
    /// The declared slot name, if name-aware resolution applies to it.
    fn name(&self) -> Option<&'static str> {
        if self.use_names && self.slot.qualifier().is_none() {
            self.slot.name()
        } else {
            None
        }
    }
}

pub(crate) struct Resolved {
    pub argument: Argument,
    pub origin: Origin,
}

impl Resolved {
    fn new(argument: Argument, origin: Origin) -> Self {
        Self { argument, origin }
    }
}
