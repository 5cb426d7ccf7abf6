use crate::container::Managed;
use crate::key::{Qualifier, TypeDescriptor};

/// Whether a slot receives a value or a deferred [`Provider`].
///
/// [`Provider`]: crate::parameter::Provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Value,
    Provider,
}

/// One dependency slot of a member, in declaration order.
#[derive(Debug, Clone)]
pub struct Slot {
    name: Option<&'static str>,
    ty: TypeDescriptor,
    qualifier: Option<Qualifier>,
    nullable: bool,
    kind: SlotKind,
}

impl Slot {
    /// A slot expecting a value of type `T`.
    pub fn of<T: Managed>() -> Self {
        Self::new(TypeDescriptor::of::<T>(), SlotKind::Value)
    }

    /// A slot expecting a [`Provider`] of `T`.
    ///
    /// [`Provider`]: crate::parameter::Provider
    pub fn provider<T: Managed>() -> Self {
        Self::new(TypeDescriptor::of::<T>(), SlotKind::Provider)
    }

    fn new(ty: TypeDescriptor, kind: SlotKind) -> Self {
        Self {
            name: None,
            ty,
            qualifier: None,
            nullable: false,
            kind,
        }
    }

    /// Sets the declared name, used by name-aware resolution.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn qualified(mut self, qualifier: impl Into<Qualifier>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Marks the slot as "may be absent".
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn name(&self) -> Option<&'static str> {
        self.name
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn kind(&self) -> SlotKind {
        self.kind
    }
}
