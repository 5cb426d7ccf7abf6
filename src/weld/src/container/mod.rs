pub mod injector;
pub mod registry;

mod core;
mod handle;
mod lookup;

use std::any::Any;

use crate::util::any::AsAny;

pub use handle::Container;
pub(crate) use lookup::{Candidate, Query};

/// Any value a container can produce or inject.
pub trait Managed: AsAny + Send + Sync + 'static {}

impl<T> Managed for T where T: AsAny + Send + Sync + 'static {}

impl dyn Managed {
    /// Returns true if the concrete type behind `self` is `T`.
    pub fn is<T: Any>(&self) -> bool {
        <dyn Managed as AsAny>::as_any(self).is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        <dyn Managed as AsAny>::as_any(self).downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        <dyn Managed as AsAny>::as_any_mut(self).downcast_mut::<T>()
    }

    /// Attempts to downcast the box to a concrete type, giving the box back
    /// untouched on failure.
    pub fn downcast<T: Any>(self: Box<Self>) -> Result<Box<T>, Box<Self>> {
        if self.is::<T>() {
            let object = <dyn Managed as AsAny>::into_any(self)
                .downcast::<T>()
                .unwrap_or_else(|_| unreachable!("`self` should be `Box<T>`"));
            Ok(object)
        } else {
            Err(self)
        }
    }

    /// Returns the name of the concrete type behind `self`.
    pub fn concrete_type_name(&self) -> &'static str {
        <dyn Managed as AsAny>::type_name(self)
    }
}
