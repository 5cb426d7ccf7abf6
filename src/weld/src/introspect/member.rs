use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::injector::{Fault, ResolutionError};
use crate::container::Managed;
use crate::introspect::{Arguments, Slot};
use crate::key::TypeDescriptor;

/// The outcome of invoking user code: the outer error is a framework fault,
/// the inner one is raised by the application.
pub type Invocation<T> = Result<Result<T, Fault>, ResolutionError>;

type ConstructFn = dyn Fn(&mut Arguments) -> Invocation<Box<dyn Managed>> + Send + Sync;

type InjectFn =
    dyn Fn(&mut dyn Managed, &mut Arguments) -> Invocation<Option<Box<dyn Managed>>> + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Constructor,
    Field,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Clone)]
pub(crate) enum Invoker {
    Construct(Arc<ConstructFn>),
    Inject(Arc<InjectFn>),
}

/// A constructor, field or method of an implementation together with its
/// dependency slots.
#[derive(Clone)]
pub struct MemberDescriptor {
    name: &'static str,
    kind: MemberKind,
    visibility: Visibility,
    annotated: bool,
    declaring: TypeDescriptor,
    slots: Vec<Slot>,
    invoker: Invoker,
}

impl MemberDescriptor {
    pub(crate) fn new(
        member: Member,
        kind: MemberKind,
        declaring: TypeDescriptor,
        invoker: Invoker,
    ) -> Self {
        Self {
            name: member.name,
            kind,
            visibility: member.visibility,
            annotated: member.annotated,
            declaring,
            slots: member.slots,
            invoker,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_annotated(&self) -> bool {
        self.annotated
    }

    /// The type this member belongs to.
    pub fn declaring(&self) -> &TypeDescriptor {
        &self.declaring
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn construct(&self, mut arguments: Arguments) -> Invocation<Box<dyn Managed>> {
        match &self.invoker {
            Invoker::Construct(construct) => construct(&mut arguments),
            Invoker::Inject(_) => unreachable!("only constructors can allocate"),
        }
    }

    pub(crate) fn inject(
        &self,
        instance: &mut dyn Managed,
        mut arguments: Arguments,
    ) -> Invocation<Option<Box<dyn Managed>>> {
        match &self.invoker {
            Invoker::Inject(inject) => inject(instance, &mut arguments),
            Invoker::Construct(_) => unreachable!("constructors can't inject into an instance"),
        }
    }
}

impl Debug for MemberDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("visibility", &self.visibility)
            .field("annotated", &self.annotated)
            .field("declaring", &self.declaring)
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

/// The declaration half of a member: its name, slots and markers. The
/// invocation half is attached by [`ImplementationBuilder`].
///
/// [`ImplementationBuilder`]: crate::introspect::ImplementationBuilder
#[derive(Debug, Clone)]
pub struct Member {
    name: &'static str,
    visibility: Visibility,
    annotated: bool,
    slots: Vec<Slot>,
}

impl Member {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            visibility: Visibility::Public,
            annotated: false,
            slots: Vec::new(),
        }
    }

    pub fn slot(mut self, slot: Slot) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn slots(mut self, slots: impl IntoIterator<Item = Slot>) -> Self {
        self.slots.extend(slots);
        self
    }

    /// Hides the member from automatic selection. Selecting it by name
    /// fails with [`ResolutionError::AccessDenied`].
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Marks the member for [`Strategy::Annotated`].
    ///
    /// [`Strategy::Annotated`]: crate::adapter::Strategy::Annotated
    pub fn annotated(mut self) -> Self {
        self.annotated = true;
        self
    }
}
