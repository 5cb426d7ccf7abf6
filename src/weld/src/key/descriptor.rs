use std::any::{self, TypeId};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::container::Managed;
use crate::util::any::AsAny;

type UpcastFn = dyn Fn(Box<dyn Managed>) -> Box<dyn Managed> + Send + Sync;

/// Identifies a managed type and knows which other types it is assignable
/// to.
///
/// Two descriptors are equal if they describe the same [`TypeId`]. The
/// supertype table only matters for descriptors produced by an
/// [`Implementation`], since that is where upcasts are declared.
///
/// [`Implementation`]: crate::introspect::Implementation
#[derive(Clone)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
    supertypes: Arc<[Supertype]>,
}

impl TypeDescriptor {
    /// Describes `T` without any declared supertype.
    pub fn of<T: Managed>() -> Self {
        Self::with_supertypes::<T>(Vec::new())
    }

    pub(crate) fn with_supertypes<T: Managed>(supertypes: Vec<Supertype>) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
            supertypes: supertypes.into(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is<T: Managed>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Returns true if the concrete type behind `object` is the described
    /// type.
    pub fn is_instance(&self, object: &dyn Managed) -> bool {
        <dyn Managed as AsAny>::as_any(object).type_id() == self.id
    }

    /// Returns true if a value of the described type can be used where
    /// `target` is expected.
    pub fn is_assignable_to(&self, target: &TypeDescriptor) -> bool {
        self.id == target.id || self.supertypes.iter().any(|s| s.id == target.id)
    }

    /// Returns true if `self` is assignable to `other` but is not `other`.
    pub fn is_strict_subtype_of(&self, other: &TypeDescriptor) -> bool {
        self.id != other.id && self.is_assignable_to(other)
    }

    /// Converts an object of the described type to the `target` view.
    ///
    /// # Errors
    ///
    /// Gives `object` back if `self` is not assignable to `target`.
    pub fn cast(
        &self,
        object: Box<dyn Managed>,
        target: &TypeDescriptor,
    ) -> Result<Box<dyn Managed>, Box<dyn Managed>> {
        if self.id == target.id {
            return Ok(object);
        }
        match self.supertypes.iter().find(|s| s.id == target.id) {
            Some(supertype) => Ok((supertype.upcast)(object)),
            None => Err(object),
        }
    }

    pub fn supertypes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.supertypes.iter().map(|s| s.name)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name)
    }
}

/// A declared "is assignable to" edge together with the conversion that
/// realises it.
#[derive(Clone)]
pub(crate) struct Supertype {
    id: TypeId,
    name: &'static str,
    upcast: Arc<UpcastFn>,
}

impl Supertype {
    pub fn new<T, U, F>(upcast: F) -> Self
    where
        T: Managed,
        U: Managed,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let upcast = move |object: Box<dyn Managed>| -> Box<dyn Managed> {
            let object = object
                .downcast::<T>()
                .unwrap_or_else(|_| unreachable!("an upcast should only receive its source type"));
            Box::new(upcast(*object))
        };
        Self {
            id: TypeId::of::<U>(),
            name: any::type_name::<U>(),
            upcast: Arc::new(upcast),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    trait Shape: Send + Sync {
        fn sides(&self) -> u32;
    }

    struct Square;

    impl Shape for Square {
        fn sides(&self) -> u32 {
            4
        }
    }

    fn square() -> TypeDescriptor {
        TypeDescriptor::with_supertypes::<Square>(vec![Supertype::new(
            |square: Square| -> Arc<dyn Shape> { Arc::new(square) },
        )])
    }

    #[test]
    fn type_descriptor_equality_ignores_supertypes() {
        assert_eq!(square(), TypeDescriptor::of::<Square>());
        assert_ne!(square(), TypeDescriptor::of::<Arc<dyn Shape>>());
        assert!(square().is::<Square>());
    }

    #[test]
    fn type_descriptor_is_assignable_to_declared_supertypes() {
        let shape = TypeDescriptor::of::<Arc<dyn Shape>>();

        assert!(square().is_assignable_to(&square()));
        assert!(square().is_assignable_to(&shape));
        assert!(square().is_strict_subtype_of(&shape));
        assert!(!square().is_strict_subtype_of(&square()));
        assert!(!shape.is_assignable_to(&square()));
        assert!(!TypeDescriptor::of::<Square>().is_assignable_to(&shape));
    }

    #[test]
    fn type_descriptor_cast_succeeds_for_supertype() {
        let shape = TypeDescriptor::of::<Arc<dyn Shape>>();
        let object = square().cast(Box::new(Square), &shape).ok().unwrap();
        let shape = object.downcast_ref::<Arc<dyn Shape>>().unwrap();
        assert_eq!(shape.sides(), 4);
    }

    #[test]
    fn type_descriptor_cast_fails_for_unrelated_type() {
        let res = square().cast(Box::new(Square), &TypeDescriptor::of::<i32>());
        assert!(res.is_err_and(|object| object.is::<Square>()));
    }
}
