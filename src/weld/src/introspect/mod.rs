mod arguments;
mod member;
mod slot;

use std::any::TypeId;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::injector::{Fault, ResolutionError};
use crate::container::Managed;
use crate::key::{Supertype, TypeDescriptor};

pub(crate) use arguments::Argument;
pub use arguments::Arguments;
pub(crate) use member::Invoker;
pub use member::{Invocation, Member, MemberDescriptor, MemberKind, Visibility};
pub use slot::{Slot, SlotKind};

/// Types that can describe their own constructors, fields and methods.
///
/// Usually implemented by `#[component]`, but a hand-written table works
/// just as well.
pub trait Introspect: Managed {
    fn implementation() -> Implementation;
}

/// The member table of a concrete type.
#[derive(Clone)]
pub struct Implementation {
    ty: TypeDescriptor,
    members: Arc<[MemberDescriptor]>,
}

impl Implementation {
    pub fn builder<T: Managed>() -> ImplementationBuilder<T> {
        ImplementationBuilder::new()
    }

    /// The table of `T` as produced by its [`Introspect`] implementation.
    pub fn of<T: Introspect>() -> Self {
        T::implementation()
    }

    /// The produced type, with every supertype declared through
    /// [`ImplementationBuilder::assignable_to`].
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    /// All members in declaration order.
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MemberDescriptor> + '_ {
        self.members_of(MemberKind::Constructor)
    }

    pub fn members_of(&self, kind: MemberKind) -> impl Iterator<Item = &MemberDescriptor> + '_ {
        self.members.iter().filter(move |m| m.kind() == kind)
    }

    pub fn member(&self, kind: MemberKind, name: &str) -> Option<&MemberDescriptor> {
        self.members_of(kind).find(|m| m.name() == name)
    }

    /// Returns true if the implementation can be allocated, i.e. it has at
    /// least one public constructor.
    pub fn is_concrete(&self) -> bool {
        self.constructors().any(MemberDescriptor::is_public)
    }
}

impl std::fmt::Debug for Implementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Implementation")
            .field("ty", &self.ty)
            .field("members", &self.members)
            .finish()
    }
}

type PendingMember = (Member, MemberKind, Invoker);

type Injection = Invocation<Option<Box<dyn Managed>>>;

/// Collects the member table of `T`.
pub struct ImplementationBuilder<T: Managed> {
    supertypes: Vec<Supertype>,
    members: Vec<PendingMember>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Managed> ImplementationBuilder<T> {
    fn new() -> Self {
        Self {
            supertypes: Vec::new(),
            members: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Declares that `T` can be used where `U` is expected, converting with
    /// `upcast`.
    pub fn assignable_to<U, F>(mut self, upcast: F) -> Self
    where
        U: Managed,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.supertypes.push(Supertype::new(upcast));
        self
    }

    pub fn constructor<F>(self, member: Member, construct: F) -> Self
    where
        F: Fn(&mut Arguments) -> Result<T, ResolutionError> + Send + Sync + 'static,
    {
        self.fallible_constructor(member, move |args| construct(args).map(Ok::<_, Fault>))
    }

    /// Adds a constructor whose own failure is reported as
    /// [`ResolutionError::InjectionFailed`].
    pub fn fallible_constructor<E, F>(mut self, member: Member, construct: F) -> Self
    where
        E: Into<Fault>,
        F: Fn(&mut Arguments) -> Result<Result<T, E>, ResolutionError> + Send + Sync + 'static,
    {
        let invoker = Invoker::Construct(Arc::new(
            move |args: &mut Arguments| -> Invocation<Box<dyn Managed>> {
                Ok(construct(args)?
                    .map(|object| Box::new(object) as Box<dyn Managed>)
                    .map_err(Into::into))
            },
        ));
        self.members.push((member, MemberKind::Constructor, invoker));
        self
    }

    pub fn field<F>(mut self, member: Member, assign: F) -> Self
    where
        F: Fn(&mut T, &mut Arguments) -> Result<(), ResolutionError> + Send + Sync + 'static,
    {
        let invoker = Invoker::Inject(Arc::new(
            move |instance: &mut dyn Managed, args: &mut Arguments| -> Injection {
                assign(receiver::<T>(instance), args)?;
                Ok(Ok(None))
            },
        ));
        self.members.push((member, MemberKind::Field, invoker));
        self
    }

    pub fn method<R, F>(self, member: Member, invoke: F) -> Self
    where
        R: Managed,
        F: Fn(&mut T, &mut Arguments) -> Result<R, ResolutionError> + Send + Sync + 'static,
    {
        self.fallible_method(member, move |this, args| {
            invoke(this, args).map(Ok::<_, Fault>)
        })
    }

    /// Adds a method whose own failure is reported as
    /// [`ResolutionError::InjectionFailed`]. A `()` return value is reported
    /// as no value.
    pub fn fallible_method<R, E, F>(mut self, member: Member, invoke: F) -> Self
    where
        R: Managed,
        E: Into<Fault>,
        F: Fn(&mut T, &mut Arguments) -> Result<Result<R, E>, ResolutionError>
            + Send
            + Sync
            + 'static,
    {
        let invoker = Invoker::Inject(Arc::new(
            move |instance: &mut dyn Managed, args: &mut Arguments| -> Injection {
                let returned = invoke(receiver::<T>(instance), args)?;
                Ok(returned.map(returned_value).map_err(Into::into))
            },
        ));
        self.members.push((member, MemberKind::Method, invoker));
        self
    }

    pub fn build(self) -> Implementation {
        let ty = TypeDescriptor::with_supertypes::<T>(self.supertypes);
        let members = self
            .members
            .into_iter()
            .map(|(member, kind, invoker)| MemberDescriptor::new(member, kind, ty.clone(), invoker))
            .collect();
        Implementation { ty, members }
    }
}

fn receiver<T: Managed>(instance: &mut dyn Managed) -> &mut T {
    instance
        .downcast_mut::<T>()
        .unwrap_or_else(|| unreachable!("members should only be invoked on their declaring type"))
}

fn returned_value<R: Managed>(value: R) -> Option<Box<dyn Managed>> {
    if TypeId::of::<R>() == TypeId::of::<()>() {
        None
    } else {
        Some(Box::new(value))
    }
}
