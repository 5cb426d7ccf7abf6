use std::any::{self, Any};

/// Gives access to the [`Any`] view of a value behind a trait object whose
/// trait extends [`AsAny`].
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        any::type_name::<T>()
    }
}

#[cfg(test)]
mod tests {
    use std::any::TypeId;

    use super::*;

    trait Trait: AsAny + Send + Sync {}

    impl Trait for i32 {}

    #[test]
    fn as_any_reports_concrete_type_behind_trait_object() {
        let mut value: Box<dyn Trait> = Box::new(7i32);

        assert_eq!((*value).as_any().type_id(), TypeId::of::<i32>());
        assert_eq!((*value).type_name(), "i32");

        *(*value).as_any_mut().downcast_mut::<i32>().unwrap() = 8;
        let value = value.into_any().downcast::<i32>().unwrap();
        assert_eq!(*value, 8);
    }
}
