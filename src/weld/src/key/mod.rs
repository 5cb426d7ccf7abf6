mod descriptor;

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::Managed;

pub use descriptor::TypeDescriptor;
pub(crate) use descriptor::Supertype;

/// A discriminator narrowing which components satisfy a type-based lookup.
pub type Qualifier = Arc<str>;

/// The identity of a registered component: a type plus an optional
/// qualifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Key {
    ty: TypeDescriptor,
    qualifier: Option<Qualifier>,
}

impl Key {
    pub fn new(ty: TypeDescriptor, qualifier: Option<Qualifier>) -> Self {
        Self { ty, qualifier }
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn is_qualified(&self) -> bool {
        self.qualifier.is_some()
    }
}

impl Debug for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{}@{}", self.ty, qualifier),
            None => write!(f, "{}", self.ty),
        }
    }
}

/// Creates an unqualified key for `T`.
pub fn of<T>() -> Key
where
    T: Managed,
{
    Key::new(TypeDescriptor::of::<T>(), None)
}

/// Creates a key for `T` qualified by `name`.
pub fn named<T>(name: impl Into<Qualifier>) -> Key
where
    T: Managed,
{
    Key::new(TypeDescriptor::of::<T>(), Some(name.into()))
}
