use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::adapter::ComponentAdapter;
use crate::container::injector::ResolutionError;
use crate::container::{Container, Managed};
use crate::introspect::MemberDescriptor;
use crate::key::Key;

/// Where the value of one resolved slot came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// The component registered under the key.
    Component(Key),
    /// A value supplied at registration.
    Value,
    /// A nullable slot nothing was found for.
    Absent,
    /// A provider issuing lookups for the key.
    Provider(Key),
}

/// The answer of [`ComponentMonitor::invoking`].
pub enum Interception {
    /// Invoke the member as usual.
    Continue,
    /// Skip the member and use this as its return value.
    Override(Option<Box<dyn Managed>>),
}

impl Debug for Interception {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Continue => f.write_str("Continue"),
            Self::Override(Some(value)) => {
                write!(f, "Override(Some({}))", value.concrete_type_name())
            }
            Self::Override(None) => f.write_str("Override(None)"),
        }
    }
}

/// Observes instantiation and injection.
///
/// Every hook is called synchronously on the resolving thread. Apart from
/// [`ComponentMonitor::invoking`], no hook can change the outcome of a
/// resolution.
#[cfg_attr(test, mockall::automock)]
pub trait ComponentMonitor: Send + Sync {
    /// Called before a component is allocated.
    fn instantiating(&self, container: &Container, adapter: &ComponentAdapter) {
        let _ = (container, adapter);
    }

    /// Called once a component has been allocated and injected.
    fn instantiated(
        &self,
        container: &Container,
        adapter: &ComponentAdapter,
        instance: &dyn Managed,
        arguments: &[Origin],
        elapsed: Duration,
    ) {
        let _ = (container, adapter, instance, arguments, elapsed);
    }

    /// Called when the constructor of a component raises a fault.
    fn instantiation_failed(
        &self,
        container: &Container,
        adapter: &ComponentAdapter,
        error: &ResolutionError,
    ) {
        let _ = (container, adapter, error);
    }

    /// Called before a field or method is injected. Returning
    /// [`Interception::Override`] skips the real invocation.
    fn invoking(
        &self,
        container: &Container,
        adapter: &ComponentAdapter,
        member: &MemberDescriptor,
        instance: &dyn Managed,
        arguments: &[Origin],
    ) -> Interception {
        let _ = (container, adapter, member, instance, arguments);
        Interception::Continue
    }

    fn invoked(
        &self,
        container: &Container,
        adapter: &ComponentAdapter,
        member: &MemberDescriptor,
        instance: &dyn Managed,
        arguments: &[Origin],
        elapsed: Duration,
    ) {
        let _ = (container, adapter, member, instance, arguments, elapsed);
    }

    /// Called when an injected member raises a fault, before the fault is
    /// propagated.
    fn invocation_failed(
        &self,
        member: &MemberDescriptor,
        instance: &dyn Managed,
        error: &ResolutionError,
    ) {
        let _ = (member, instance, error);
    }
}

/// A monitor that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMonitor;

impl ComponentMonitor for NullMonitor {}
