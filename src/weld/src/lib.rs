#![allow(clippy::new_without_default)]

pub mod adapter;
pub mod container;
pub mod introspect;
pub mod key;
pub mod monitor;
pub mod parameter;
pub mod resolver;
mod util;

pub use weld_derive::component;

pub mod prelude {
    pub use crate::adapter::{ComponentAdapter, Strategy};
    pub use crate::component;
    pub use crate::container::injector::{Injector, ResolutionError, TypedInjector};
    pub use crate::container::registry::{Registration, RegistryBuilder, RegistryError};
    pub use crate::container::{Container, Managed};
    pub use crate::introspect::{Arguments, Implementation, Introspect, Member, Slot};
    pub use crate::key::{self, Key, TypeDescriptor};
    pub use crate::monitor::{ComponentMonitor, Interception, NullMonitor, Origin};
    pub use crate::parameter::{Implicit, Parameter, Provider};
}
