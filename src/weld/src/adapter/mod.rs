mod guard;
mod selection;

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::container::injector::{Fault, KeyPath, ResolutionError, ResolutionTrace};
use crate::container::{Container, Managed};
use crate::introspect::{Arguments, Implementation, MemberDescriptor, MemberKind};
use crate::key::Key;
use crate::monitor::{Interception, Origin};
use crate::parameter::{Parameter, Resolved};

use guard::CycleGuard;

/// How a component gets its dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Through the named constructor, or the greediest satisfiable one.
    Constructor(Option<&'static str>),
    /// Through the named field, or every public field, after allocation.
    Field(Option<&'static str>),
    /// Through the named method, or the method called `inject`, after
    /// allocation.
    Method(Option<&'static str>),
    /// Through every public member marked as annotated, after allocation.
    Annotated,
}

impl Strategy {
    fn is_constructor(&self) -> bool {
        matches!(self, Self::Constructor(_))
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Constructor(None)
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Constructor(Some(name)) => write!(f, "constructor `{name}`"),
            Self::Constructor(None) => f.write_str("constructor"),
            Self::Field(Some(name)) => write!(f, "field `{name}`"),
            Self::Field(None) => f.write_str("fields"),
            Self::Method(Some(name)) => write!(f, "method `{name}`"),
            Self::Method(None) => f.write_str("method `inject`"),
            Self::Annotated => f.write_str("annotated members"),
        }
    }
}

/// Knows how to produce and inject the component registered under one key.
///
/// Adapters are created at registration and never change afterwards, apart
/// from the per-thread state of their cycle guards.
pub struct ComponentAdapter {
    key: Key,
    implementation: Implementation,
    parameters: Vec<Parameter>,
    strategy: Strategy,
    use_names: bool,
    resolving: CycleGuard,
    verifying: CycleGuard,
}

impl ComponentAdapter {
    pub(crate) fn new(
        key: Key,
        implementation: Implementation,
        parameters: Vec<Parameter>,
        strategy: Strategy,
        use_names: bool,
    ) -> Self {
        Self {
            key,
            implementation,
            parameters,
            strategy,
            use_names,
            resolving: CycleGuard::new(),
            verifying: CycleGuard::new(),
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn implementation(&self) -> &Implementation {
        &self.implementation
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn uses_names(&self) -> bool {
        self.use_names
    }

    pub fn descriptor(&self) -> &'static str {
        match self.strategy {
            Strategy::Constructor(_) => "ConstructorInjector-",
            Strategy::Field(_) => "FieldInjector-",
            Strategy::Method(_) => "MethodInjector-",
            Strategy::Annotated => "AnnotatedInjector-",
        }
    }

    /// Produces a new instance of the implementation, resolving its
    /// dependencies against `container`.
    ///
    /// # Errors
    ///
    /// Returns an error if a member is missing or inaccessible, a dependency
    /// can't be satisfied, the graph is cyclic or user code fails.
    pub fn resolve(&self, container: &Container) -> Result<Box<dyn Managed>, ResolutionError> {
        self.resolve_within(container, None)
    }

    /// Injects the selected fields and methods into an existing `instance`.
    ///
    /// Returns the value returned by the last injected method, or nothing if
    /// `instance` is not of the declaring type of the selected members.
    /// Constructor injection never decorates.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as
    /// [`ComponentAdapter::resolve`].
    pub fn decorate(
        &self,
        container: &Container,
        instance: &mut dyn Managed,
    ) -> Result<Option<Box<dyn Managed>>, ResolutionError> {
        let Some(_token) = self.resolving.enter() else {
            return Err(self.cycle(None));
        };
        if self.strategy.is_constructor() {
            return Ok(None);
        }

        let members = self.select_members()?;
        if members.iter().any(|m| !m.declaring().is_instance(instance)) {
            debug!(key = %self.key, instance = instance.concrete_type_name(), "skipped decoration");
            return Ok(None);
        }
        let bindings = self.bindings(&members)?;
        let trace = ResolutionTrace::new(&self.key);
        debug!(key = %self.key, strategy = %self.strategy, "decorating component");
        let (returned, _) = self.inject(container, instance, &members, &bindings, &trace)?;
        Ok(returned)
    }

    /// Checks that every dependency of the component could be resolved,
    /// without producing anything.
    ///
    /// # Errors
    ///
    /// Returns the error [`ComponentAdapter::resolve`] would fail with
    /// because of the graph or its members.
    pub fn verify(&self, container: &Container) -> Result<(), ResolutionError> {
        self.verify_within(container, None)
    }

    pub(crate) fn resolve_within(
        &self,
        container: &Container,
        trace: Option<&ResolutionTrace<'_>>,
    ) -> Result<Box<dyn Managed>, ResolutionError> {
        let Some(_token) = self.resolving.enter() else {
            return Err(self.cycle(trace));
        };
        let trace = ResolutionTrace::extend(trace, &self.key);
        debug!(key = %self.key, strategy = %self.strategy, "resolving component");

        if self.strategy.is_constructor() {
            self.construct(container, &trace)
        } else {
            self.allocate_and_inject(container, &trace)
        }
    }

    pub(crate) fn verify_within(
        &self,
        container: &Container,
        trace: Option<&ResolutionTrace<'_>>,
    ) -> Result<(), ResolutionError> {
        let Some(_token) = self.verifying.enter() else {
            return Err(self.cycle(trace));
        };
        let trace = ResolutionTrace::extend(trace, &self.key);

        let members = if self.strategy.is_constructor() {
            vec![self.select_constructor(container)?]
        } else {
            self.default_constructor()?;
            self.select_members()?
        };
        let bindings = self.bindings(&members)?;
        for (member, bindings) in members.iter().zip(&bindings) {
            for (index, (slot, parameter)) in member.slots().iter().zip(bindings).enumerate() {
                parameter.verify(container, &self.request(member, index, slot), &trace)?;
            }
        }
        debug!(key = %self.key, "verified component");
        Ok(())
    }

    fn construct(
        &self,
        container: &Container,
        trace: &ResolutionTrace<'_>,
    ) -> Result<Box<dyn Managed>, ResolutionError> {
        let constructor = self.select_constructor(container)?;
        let bindings = self.bindings(&[constructor])?.pop().unwrap_or_default();

        let monitor = container.monitor();
        monitor.instantiating(container, self);
        let start = Instant::now();
        let (arguments, origins) = self.resolve_slots(container, constructor, &bindings, trace)?;
        let instance = match constructor.construct(arguments)? {
            Ok(instance) => instance,
            Err(fault) => {
                let error = self.injection_failed(constructor, fault);
                monitor.instantiation_failed(container, self, &error);
                return Err(error);
            }
        };
        monitor.instantiated(container, self, &*instance, &origins, start.elapsed());
        debug!(key = %self.key, constructor = constructor.name(), "instantiated component");
        Ok(instance)
    }

    fn allocate_and_inject(
        &self,
        container: &Container,
        trace: &ResolutionTrace<'_>,
    ) -> Result<Box<dyn Managed>, ResolutionError> {
        let constructor = self.default_constructor()?;
        let members = self.select_members()?;
        let bindings = self.bindings(&members)?;

        let monitor = container.monitor();
        monitor.instantiating(container, self);
        let start = Instant::now();
        let mut instance = match constructor.construct(Arguments::empty(constructor.name()))? {
            Ok(instance) => instance,
            Err(fault) => {
                let error = self.injection_failed(constructor, fault);
                monitor.instantiation_failed(container, self, &error);
                return Err(error);
            }
        };
        let (_, origins) = self.inject(container, &mut *instance, &members, &bindings, trace)?;
        monitor.instantiated(container, self, &*instance, &origins, start.elapsed());
        debug!(key = %self.key, members = members.len(), "instantiated component");
        Ok(instance)
    }

    /// Resolves and injects `members` one after another. Returns the value
    /// of the last method together with the origins of every slot.
    fn inject(
        &self,
        container: &Container,
        instance: &mut dyn Managed,
        members: &[&MemberDescriptor],
        bindings: &[Vec<Parameter>],
        trace: &ResolutionTrace<'_>,
    ) -> Result<(Option<Box<dyn Managed>>, Vec<Origin>), ResolutionError> {
        let monitor = container.monitor();
        let mut returned = None;
        let mut all_origins = Vec::new();

        for (member, bindings) in members.iter().zip(bindings) {
            let (arguments, origins) = self.resolve_slots(container, member, bindings, trace)?;
            let start = Instant::now();
            match monitor.invoking(container, self, member, instance, &origins) {
                Interception::Override(value) => {
                    debug!(key = %self.key, member = member.name(), "injection overridden");
                    returned = value;
                }
                Interception::Continue => match member.inject(instance, arguments)? {
                    Ok(value) => {
                        let elapsed = start.elapsed();
                        monitor.invoked(container, self, member, instance, &origins, elapsed);
                        if member.kind() == MemberKind::Method {
                            returned = value;
                        }
                    }
                    Err(fault) => {
                        let error = self.injection_failed(member, fault);
                        monitor.invocation_failed(member, instance, &error);
                        return Err(error);
                    }
                },
            }
            all_origins.extend(origins);
        }
        Ok((returned, all_origins))
    }

    fn resolve_slots(
        &self,
        container: &Container,
        member: &MemberDescriptor,
        bindings: &[Parameter],
        trace: &ResolutionTrace<'_>,
    ) -> Result<(Arguments, Vec<Origin>), ResolutionError> {
        let mut values = Vec::with_capacity(bindings.len());
        let mut origins = Vec::with_capacity(bindings.len());
        for (index, (slot, parameter)) in member.slots().iter().zip(bindings).enumerate() {
            let request = self.request(member, index, slot);
            let Resolved { argument, origin } = parameter.resolve(container, &request, trace)?;
            values.push(argument);
            origins.push(origin);
        }
        Ok((Arguments::new(member.name(), values), origins))
    }

    fn injection_failed(&self, member: &MemberDescriptor, fault: Fault) -> ResolutionError {
        debug!(key = %self.key, member = member.name(), %fault, "user code failed");
        ResolutionError::InjectionFailed {
            key: self.key.clone(),
            member: member.name(),
            source: Arc::from(fault),
        }
    }

    fn cycle(&self, trace: Option<&ResolutionTrace<'_>>) -> ResolutionError {
        let path = KeyPath::cycle(trace, &self.key);
        warn!(key = %self.key, %path, "detected a cyclic dependency");
        ResolutionError::CyclicDependency { path }
    }
}

impl Debug for ComponentAdapter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ComponentAdapter")
            .field("key", &self.key)
            .field("implementation", self.implementation.ty())
            .field("parameters", &self.parameters)
            .field("strategy", &self.strategy)
            .field("use_names", &self.use_names)
            .finish_non_exhaustive()
    }
}

impl Display for ComponentAdapter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}", self.descriptor(), self.key)
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use crate::container::injector::TypedInjector;
    use crate::container::registry::RegistryBuilder;
    use crate::introspect::{Member, Slot};
    use crate::key;
    use crate::monitor::{ComponentMonitor, MockComponentMonitor, NullMonitor};

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Engine;

    #[derive(Debug)]
    struct Car {
        engine: Option<Engine>,
        started: bool,
    }

    impl Car {
        fn new() -> Self {
            Self {
                engine: None,
                started: false,
            }
        }
    }

    fn engine() -> Implementation {
        Implementation::builder::<Engine>()
            .constructor(Member::new("new"), |_| Ok(Engine))
            .build()
    }

    fn car() -> Implementation {
        Implementation::builder::<Car>()
            .constructor(Member::new("new"), |_| Ok(Car::new()))
            .constructor(
                Member::new("with_engine").slot(Slot::of::<Engine>()),
                |args| {
                    Ok(Car {
                        engine: Some(args.take()?),
                        started: false,
                    })
                },
            )
            .field(
                Member::new("engine").slot(Slot::of::<Engine>()).annotated(),
                |this, args| {
                    this.engine = Some(args.take()?);
                    Ok(())
                },
            )
            .method(
                Member::new("inject").slot(Slot::of::<Engine>()),
                |this, args| {
                    args.take::<Engine>()?;
                    this.started = true;
                    Ok(this.started)
                },
            )
            .fallible_method(Member::new("stall"), |_, _| Ok(Err::<(), _>("stalled")))
            .fallible_method(Member::new("hidden").private(), |_, _| Ok(Ok::<_, Fault>(())))
            .build()
    }

    fn container(strategy: Strategy, monitor: Arc<dyn ComponentMonitor>) -> Container {
        let mut builder = RegistryBuilder::new().with_monitor(monitor);
        builder
            .register(key::of::<Engine>(), engine(), Vec::new(), Strategy::default())
            .unwrap();
        builder
            .register(key::of::<Car>(), car(), Vec::new(), strategy)
            .unwrap();
        builder.build()
    }

    fn resolve_car(strategy: Strategy) -> Result<Car, ResolutionError> {
        container(strategy, Arc::new(NullMonitor)).get::<Car>()
    }

    #[test]
    fn component_adapter_resolve_uses_greediest_constructor() {
        let car = resolve_car(Strategy::Constructor(None)).unwrap();
        assert_eq!(car.engine, Some(Engine));
        assert!(!car.started);

        let car = resolve_car(Strategy::Constructor(Some("new"))).unwrap();
        assert_eq!(car.engine, None);
    }

    #[test]
    fn component_adapter_resolve_injects_fields_and_methods() {
        let car = resolve_car(Strategy::Field(None)).unwrap();
        assert_eq!(car.engine, Some(Engine));
        assert!(!car.started);

        let car = resolve_car(Strategy::Method(None)).unwrap();
        assert_eq!(car.engine, None);
        assert!(car.started);

        let car = resolve_car(Strategy::Annotated).unwrap();
        assert_eq!(car.engine, Some(Engine));
        assert!(!car.started);
    }

    #[test]
    fn component_adapter_resolve_fails_when_member_is_missing_or_private() {
        assert!(matches!(
            resolve_car(Strategy::Method(Some("drive"))),
            Err(ResolutionError::MemberNotFound { .. })
        ));
        assert!(matches!(
            resolve_car(Strategy::Constructor(Some("build"))),
            Err(ResolutionError::MemberNotFound { .. })
        ));
        assert!(matches!(
            resolve_car(Strategy::Method(Some("hidden"))),
            Err(ResolutionError::AccessDenied {
                member: "hidden",
                ..
            })
        ));
    }

    #[test]
    fn component_adapter_resolve_reports_single_instantiation() {
        let mut monitor = MockComponentMonitor::new();
        monitor
            .expect_instantiating()
            .withf(|_, adapter| adapter.key() == &key::of::<Engine>())
            .times(1)
            .return_const(());
        monitor
            .expect_instantiated()
            .withf(|_, _, instance, arguments, _| instance.is::<Engine>() && arguments.is_empty())
            .times(1)
            .return_const(());

        let container = container(Strategy::default(), Arc::new(monitor));
        assert_eq!(container.get::<Engine>().unwrap(), Engine);
    }

    #[test]
    fn component_adapter_resolve_reports_arguments() {
        let mut monitor = MockComponentMonitor::new();
        monitor.expect_instantiating().times(2).return_const(());
        monitor
            .expect_instantiated()
            .withf(|_, adapter, _, _, _| adapter.key() == &key::of::<Engine>())
            .times(1)
            .return_const(());
        monitor
            .expect_instantiated()
            .withf(|_, adapter, _, arguments, _| {
                adapter.key() == &key::of::<Car>()
                    && arguments == [Origin::Component(key::of::<Engine>())]
            })
            .times(1)
            .return_const(());

        let container = container(Strategy::default(), Arc::new(monitor));
        assert!(container.get::<Car>().is_ok());
    }

    #[test]
    fn component_adapter_resolve_reports_failed_invocation() {
        let mut monitor = MockComponentMonitor::new();
        monitor.expect_instantiating().times(1).return_const(());
        monitor
            .expect_invoking()
            .times(1)
            .returning(|_, _, _, _, _| Interception::Continue);
        monitor
            .expect_invocation_failed()
            .withf(|member, instance, _| member.name() == "stall" && instance.is::<Car>())
            .times(1)
            .return_const(());
        monitor.expect_invoked().never();
        monitor.expect_instantiated().never();

        let container = container(Strategy::Method(Some("stall")), Arc::new(monitor));
        let err = container.get::<Car>().unwrap_err();
        match &err {
            ResolutionError::InjectionFailed {
                key: failed,
                member,
                source,
            } => {
                assert_eq!(failed, &key::of::<Car>());
                assert_eq!(*member, "stall");
                assert_eq!(source.to_string(), "stalled");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn component_adapter_resolve_skips_overridden_invocation() {
        let mut monitor = MockComponentMonitor::new();
        monitor.expect_instantiating().return_const(());
        monitor.expect_instantiated().return_const(());
        monitor
            .expect_invoking()
            .withf(|_, _, member, _, arguments| {
                member.name() == "inject" && arguments == [Origin::Component(key::of::<Engine>())]
            })
            .returning(|_, _, _, _, _| Interception::Override(Some(Box::new(false))));
        monitor.expect_invoked().never();

        let container = container(Strategy::Method(None), Arc::new(monitor));
        let car = container.get::<Car>().unwrap();
        assert!(!car.started);

        let mut car = Car::new();
        let returned = container.decorate(&key::of::<Car>(), &mut car).unwrap();
        assert_eq!(returned.unwrap().downcast_ref::<bool>(), Some(&false));
        assert!(!car.started);
    }

    #[test]
    fn component_adapter_decorate_injects_existing_instance() {
        let container = container(Strategy::Method(None), Arc::new(NullMonitor));

        let mut car = Car::new();
        let returned = container.decorate(&key::of::<Car>(), &mut car).unwrap();
        assert_eq!(returned.unwrap().downcast_ref::<bool>(), Some(&true));
        assert!(car.started);

        let mut engine = Engine;
        let returned = container.decorate(&key::of::<Car>(), &mut engine).unwrap();
        assert!(returned.is_none());
    }

    #[test]
    fn component_adapter_decorate_ignores_constructor_strategy() {
        let container = container(Strategy::default(), Arc::new(NullMonitor));

        let mut car = Car::new();
        let returned = container.decorate(&key::of::<Car>(), &mut car).unwrap();
        assert!(returned.is_none());
        assert!(car.engine.is_none());
    }

    #[test]
    fn component_adapter_decorate_fails_while_same_component_resolves() {
        let reentered = Arc::new(Mutex::new(None));
        let outcome = Arc::clone(&reentered);
        let mut monitor = MockComponentMonitor::new();
        monitor.expect_instantiating().return_const(());
        monitor.expect_instantiated().return_const(());
        monitor.expect_invoked().return_const(());
        monitor
            .expect_invoking()
            .returning(move |container, adapter, _, _, _| {
                let mut car = Car::new();
                let decorated = container.decorate(adapter.key(), &mut car);
                *outcome.lock() = Some(decorated.map(|_| ()));
                Interception::Continue
            });

        let container = container(Strategy::Method(None), Arc::new(monitor));
        assert!(container.get::<Car>().unwrap().started);
        match reentered.lock().take() {
            Some(Err(ResolutionError::CyclicDependency { path })) => {
                assert_eq!(path.keys(), [key::of::<Car>()]);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let mut car = Car::new();
        assert!(container.decorate(&key::of::<Car>(), &mut car).is_ok());
        assert!(car.started);
    }

    #[test]
    fn component_adapter_verify_never_instantiates() {
        let mut monitor = MockComponentMonitor::new();
        monitor.expect_instantiating().never();
        monitor.expect_instantiated().never();
        monitor.expect_invoking().never();

        let container = container(Strategy::Method(None), Arc::new(monitor));
        assert!(container.verify_all().is_ok());
        assert!(container.verify(&key::of::<Car>()).is_ok());
    }

    #[test]
    fn component_adapter_descriptor_follows_strategy() {
        let container = container(Strategy::Annotated, Arc::new(NullMonitor));
        let adapter = container.adapter(&key::of::<Car>()).unwrap();
        assert_eq!(adapter.descriptor(), "AnnotatedInjector-");
        assert!(adapter.to_string().starts_with("AnnotatedInjector-"));

        let adapter = container.adapter(&key::of::<Engine>()).unwrap();
        assert_eq!(adapter.descriptor(), "ConstructorInjector-");
        assert_eq!(Strategy::Method(None).to_string(), "method `inject`");
    }
}
