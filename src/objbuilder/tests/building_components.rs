use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use objbuilder::container::injector::{CallContext, Injector};
use objbuilder::prelude::*;
use objbuilder::provider::{ComponentResolver, Resolver};

pub struct Repository {
    id: usize,
}

static REPOSITORY_IDS: AtomicUsize = AtomicUsize::new(0);

#[component]
impl Repository {
    #[inject]
    pub fn new() -> Self {
        Self {
            id: REPOSITORY_IDS.fetch_add(1, Ordering::SeqCst),
        }
    }
}

pub struct Clock;

#[component]
impl Clock {
    #[inject]
    pub fn new() -> Self {
        Self
    }
}

pub struct Service {
    repository: Arc<Repository>,
    clock: Option<Arc<Clock>>,
}

#[component]
impl Service {
    #[inject]
    pub fn new(repository: Arc<Repository>) -> Self {
        Self {
            repository,
            clock: None,
        }
    }

    #[property(inject)]
    pub fn set_clock(&mut self, clock: Arc<Clock>) {
        self.clock = Some(clock);
    }
}

pub struct Endpoint {
    address: String,
}

#[component]
impl Endpoint {
    #[inject]
    pub fn new() -> Self {
        Self {
            address: String::from("unset"),
        }
    }

    #[property]
    pub fn set_address(&mut self, address: String) {
        self.address = address;
    }
}

pub trait Handler: Send + Sync {
    fn handle(&self, message: &str) -> String;
}

pub struct Uppercase {
    calls: AtomicUsize,
}

#[component(expose(dyn Handler))]
impl Uppercase {
    #[inject]
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl Handler for Uppercase {
    fn handle(&self, message: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        message.to_uppercase()
    }
}

pub struct Reverse;

#[component(expose(dyn Handler))]
impl Reverse {
    #[inject]
    pub fn new() -> Self {
        Self
    }
}

impl Handler for Reverse {
    fn handle(&self, message: &str) -> String {
        message.chars().rev().collect()
    }
}

pub struct Dispatcher {
    handlers: Vec<Arc<dyn Handler>>,
}

#[component]
impl Dispatcher {
    #[inject]
    pub fn new(#[collect] handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self { handlers }
    }

    pub fn dispatch(&self, message: &str) -> Vec<String> {
        self.handlers
            .iter()
            .map(|handler| handler.handle(message))
            .collect()
    }
}

#[derive(Default)]
pub struct DisposalLog {
    entries: Mutex<Vec<&'static str>>,
}

impl DisposalLog {
    fn entries(&self) -> Vec<&'static str> {
        self.entries.lock().clone()
    }
}

impl Descriptor for DisposalLog {}

pub struct Connection {
    log: Arc<DisposalLog>,
}

#[component(dispose)]
impl Connection {
    #[inject]
    pub fn new(log: Arc<DisposalLog>) -> Self {
        Self { log }
    }
}

impl Dispose for Connection {
    fn dispose(&self) {
        self.log.entries.lock().push("connection");
    }
}

pub struct Session {
    _connection: Arc<Connection>,
    log: Arc<DisposalLog>,
}

#[component(dispose)]
impl Session {
    #[inject]
    pub fn new(connection: Arc<Connection>, log: Arc<DisposalLog>) -> Self {
        Self {
            _connection: connection,
            log,
        }
    }
}

impl Dispose for Session {
    fn dispose(&self) {
        self.log.entries.lock().push("session");
    }
}

pub struct Ouroboros {
    _tail: Arc<Ouroboros>,
}

#[component]
impl Ouroboros {
    #[inject]
    pub fn new(tail: Arc<Ouroboros>) -> Self {
        Self { _tail: tail }
    }
}

static SLOW_CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

pub struct Slow;

#[component]
impl Slow {
    #[inject]
    pub fn new() -> Self {
        thread::sleep(Duration::from_millis(20));
        SLOW_CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
        Self
    }
}

#[test]
fn build_returns_identical_singleton() {
    let container = Container::new();
    container
        .configure::<Repository>(Lifecycle::SingleInstance)
        .unwrap();

    let first = container.build::<Repository>().unwrap();
    container.configure::<Clock>("InstancePerCall").unwrap();
    container.build::<Clock>().unwrap();
    let second = container.build::<Repository>().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn build_returns_distinct_per_call_instances() {
    let container = Container::new();
    container.configure::<Repository>(2).unwrap();

    let first = container.build::<Repository>().unwrap();
    let second = container.build::<Repository>().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_ne!(first.id, second.id);
}

#[test]
fn build_shares_per_unit_of_work_instances_within_a_scope() {
    let container = Container::new();
    container
        .configure::<Repository>(Lifecycle::InstancePerUnitOfWork)
        .unwrap();

    let first_scope = container.build_child_container().unwrap();
    let second_scope = container.build_child_container().unwrap();

    let a = first_scope.build::<Repository>().unwrap();
    let b = first_scope.build::<Repository>().unwrap();
    let c = second_scope.build::<Repository>().unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&a, &c));
}

#[test]
fn build_fails_when_component_is_unregistered() {
    let container = Container::new();
    assert!(matches!(
        container.build::<Repository>(),
        Err(InjectorError::UnregisteredComponent { .. })
    ));
}

#[test]
fn build_succeeds_for_components_registered_late() {
    let container = Container::new();
    container
        .configure::<Repository>(Lifecycle::SingleInstance)
        .unwrap();
    let repository = container.build::<Repository>().unwrap();
    container.configure::<Clock>(Lifecycle::SingleInstance).unwrap();
    container.build::<Clock>().unwrap();

    container
        .configure::<Service>(Lifecycle::InstancePerCall)
        .unwrap();
    let service = container.build::<Service>().unwrap();

    assert!(Arc::ptr_eq(&service.repository, &repository));
}

#[test]
fn build_wires_constructor_and_property_dependencies() {
    let container = Container::new();
    container
        .configure::<Repository>(Lifecycle::InstancePerCall)
        .unwrap();
    container.configure::<Clock>(Lifecycle::InstancePerCall).unwrap();
    container
        .configure::<Service>(Lifecycle::InstancePerCall)
        .unwrap();

    let service = container.build::<Service>().unwrap();
    assert!(service.clock.is_some());
    assert_eq!(Arc::strong_count(&service.repository), 1);
}

#[test]
fn build_leaves_unregistered_property_dependencies_unset() {
    let container = Container::new();
    container
        .configure::<Repository>(Lifecycle::InstancePerCall)
        .unwrap();
    container
        .configure::<Service>(Lifecycle::InstancePerCall)
        .unwrap();

    let service = container.build::<Service>().unwrap();
    assert!(service.clock.is_none());
}

#[test]
fn dispose_twice_succeeds() {
    let container = Container::new();
    let child = container.build_child_container().unwrap();

    child.dispose();
    child.dispose();
    container.dispose();
    container.dispose();
}

#[test]
fn build_child_container_fails_on_a_child() {
    let container = Container::new();
    let child = container.build_child_container().unwrap();

    assert!(matches!(
        child.build_child_container(),
        Err(RegistryError::NotSupported { .. })
    ));
}

#[test]
fn configure_property_fails_when_property_is_missing() {
    let container = Container::new();
    container
        .configure::<Endpoint>(Lifecycle::InstancePerCall)
        .unwrap();

    assert!(matches!(
        container.configure_property::<Endpoint, _>("port", 5672u16),
        Err(RegistryError::PropertyNotFound { .. })
    ));
    assert!(matches!(
        container.configure_property::<Endpoint, _>("address", 5672u16),
        Err(RegistryError::TypeMismatch { .. })
    ));
    assert_eq!(container.build::<Endpoint>().unwrap().address, "unset");
}

#[test]
fn configure_property_applies_to_later_instances_only() {
    let container = Container::new();
    container
        .configure::<Endpoint>(Lifecycle::SingleInstance)
        .unwrap();
    let cached = container.build::<Endpoint>().unwrap();

    container
        .configure_property::<Endpoint, _>("address", String::from("amqp://broker"))
        .unwrap();
    assert_eq!(cached.address, "unset");
    assert_eq!(container.build::<Endpoint>().unwrap().address, "unset");

    container
        .configure::<Endpoint>(Lifecycle::InstancePerCall)
        .unwrap();
    assert_eq!(container.build::<Endpoint>().unwrap().address, "amqp://broker");

    container
        .configure_with(
            || Endpoint {
                address: String::from("created"),
            },
            Lifecycle::InstancePerCall,
        )
        .unwrap();
    assert_eq!(container.build::<Endpoint>().unwrap().address, "amqp://broker");
}

#[test]
fn configure_with_resolves_creator_arguments() {
    let container = Container::new();
    container
        .register_singleton(Arc::new(String::from("amqp://broker")))
        .unwrap();
    container
        .configure_with(
            |address: Arc<String>| Endpoint {
                address: address.to_string(),
            },
            "InstancePerUnitOfWork",
        )
        .unwrap();

    let scope = container.build_child_container().unwrap();
    let first = scope.build::<Endpoint>().unwrap();
    let second = scope.build::<Endpoint>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.address, "amqp://broker");
}

#[test]
fn configure_fails_when_lifecycle_is_unrecognized() {
    let container = Container::new();

    assert!(matches!(
        container.configure::<Clock>("Forever"),
        Err(RegistryError::InvalidLifecycleKind { .. })
    ));
    assert!(matches!(
        container.configure::<Clock>(7),
        Err(RegistryError::InvalidLifecycleKind { .. })
    ));
    assert!(!container.has_component::<Clock>().unwrap());
}

#[test]
fn register_instance_returns_given_instance() {
    let container = Container::new();
    let handler: Arc<dyn Handler> = Arc::new(Reverse);
    container.register_instance(Arc::clone(&handler)).unwrap();

    assert!(container.has_component::<dyn Handler>().unwrap());
    let built = container.build::<dyn Handler>().unwrap();
    assert!(Arc::ptr_eq(&built, &handler));
    assert_eq!(built.handle("abc"), "cba");
    container.release(&built);
}

#[test]
fn register_singleton_joins_collections_of_exposed_interfaces() {
    let container = Container::new();
    let uppercase = Arc::new(Uppercase::new());
    container.register_singleton(Arc::clone(&uppercase)).unwrap();
    container
        .configure::<Reverse>(Lifecycle::InstancePerCall)
        .unwrap();

    assert!(Arc::ptr_eq(&container.build::<Uppercase>().unwrap(), &uppercase));

    let handlers = container.build_all::<dyn Handler>().unwrap();
    assert_eq!(handlers.len(), 2);
    assert_eq!(
        Arc::as_ptr(&handlers[0]) as *const (),
        Arc::as_ptr(&uppercase) as *const ()
    );
    assert_eq!(handlers[1].handle("abc"), "cba");

    container.dispose();
    assert_eq!(uppercase.handle("abc"), "ABC");
}

#[test]
fn build_child_container_fails_after_dispose() {
    let container = Container::new();
    container.dispose();

    assert!(matches!(
        container.build_child_container(),
        Err(RegistryError::ScopeDisposed { .. })
    ));
}

#[test]
fn build_constructs_singleton_once_under_contention() {
    let container = Container::new();
    container.configure::<Slow>(Lifecycle::SingleInstance).unwrap();
    let child = container.build_child_container().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let container = container.clone();
            let child = child.clone();
            thread::spawn(move || {
                if i % 2 == 0 {
                    container.build::<Slow>().unwrap()
                } else {
                    child.build::<Slow>().unwrap()
                }
            })
        })
        .collect();

    let objects: Vec<Arc<Slow>> = handles
        .into_iter()
        .map(|handle| handle.join().expect("Each thread should not `panic!()`"))
        .collect();

    assert!(objects.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(SLOW_CONSTRUCTIONS.load(Ordering::SeqCst), 1);
}

#[test]
fn build_all_returns_every_exposing_registration() {
    let container = Container::new();
    assert!(container.build_all::<dyn Handler>().unwrap().is_empty());

    container
        .configure::<Uppercase>(Lifecycle::SingleInstance)
        .unwrap();
    container
        .configure::<Reverse>(Lifecycle::InstancePerCall)
        .unwrap();
    container
        .configure::<Dispatcher>(Lifecycle::InstancePerCall)
        .unwrap();

    let dispatcher = container.build::<Dispatcher>().unwrap();
    assert_eq!(dispatcher.dispatch("abc"), vec!["ABC", "cba"]);

    let uppercase = container.build::<Uppercase>().unwrap();
    assert_eq!(uppercase.calls.load(Ordering::SeqCst), 1);

    let handlers = container.build_all::<dyn Handler>().unwrap();
    assert_eq!(handlers.len(), 2);
    assert_eq!(
        Arc::as_ptr(&handlers[0]) as *const (),
        Arc::as_ptr(&uppercase) as *const ()
    );
}

#[test]
fn dispose_releases_instances_in_reverse_construction_order() {
    let log = Arc::new(DisposalLog::default());
    let container = Container::new();
    container.register_singleton(Arc::clone(&log)).unwrap();
    container
        .configure::<Connection>(Lifecycle::InstancePerUnitOfWork)
        .unwrap();
    container
        .configure::<Session>(Lifecycle::InstancePerUnitOfWork)
        .unwrap();

    let scope = container.build_child_container().unwrap();
    scope.build::<Session>().unwrap();
    scope.dispose();
    assert_eq!(log.entries(), vec!["session", "connection"]);

    container.dispose();
    assert_eq!(log.entries(), vec!["session", "connection"]);
}

#[test]
fn dispose_of_a_child_keeps_singletons_alive() {
    let log = Arc::new(DisposalLog::default());
    let container = Container::new();
    container.register_singleton(Arc::clone(&log)).unwrap();
    container
        .configure::<Connection>(Lifecycle::SingleInstance)
        .unwrap();
    container
        .configure::<Session>(Lifecycle::InstancePerUnitOfWork)
        .unwrap();

    let scope = container.build_child_container().unwrap();
    scope.build::<Session>().unwrap();
    drop(scope);
    assert_eq!(log.entries(), vec!["session"]);

    container.build::<Connection>().unwrap();
    container.dispose();
    assert_eq!(log.entries(), vec!["session", "connection"]);
}

#[test]
fn dispose_skips_per_call_instances() {
    let log = Arc::new(DisposalLog::default());
    let container = Container::new();
    container.register_singleton(Arc::clone(&log)).unwrap();
    container
        .configure::<Connection>(Lifecycle::InstancePerCall)
        .unwrap();

    container.build::<Connection>().unwrap();
    container.dispose();
    assert!(log.entries().is_empty());
}

#[test]
fn build_fails_after_dispose() {
    let container = Container::new();
    container.configure::<Clock>(Lifecycle::SingleInstance).unwrap();
    let scope = container.build_child_container().unwrap();

    scope.dispose();
    assert!(matches!(
        scope.build::<Clock>(),
        Err(InjectorError::ScopeDisposed { .. })
    ));
    assert!(container.build::<Clock>().is_ok());

    container.dispose();
    assert!(matches!(
        container.build_all::<dyn Handler>(),
        Err(InjectorError::ScopeDisposed { .. })
    ));
}

#[test]
fn build_fails_when_component_depends_on_itself() {
    let container = Container::new();
    container
        .configure::<Ouroboros>(Lifecycle::SingleInstance)
        .unwrap();
    assert!(matches!(
        container.build::<Ouroboros>(),
        Err(InjectorError::CyclicDependency { .. })
    ));

    container
        .configure::<Ouroboros>(Lifecycle::InstancePerCall)
        .unwrap();
    assert!(matches!(
        container.build::<Ouroboros>(),
        Err(InjectorError::CyclicDependency { .. })
    ));
}

#[derive(Default)]
struct CountingResolver {
    resolved: AtomicUsize,
}

impl Resolver for CountingResolver {
    fn resolve<C>(&self, injector: &dyn Injector, context: &CallContext<'_>) -> Result<C, InjectorError>
    where
        C: Component,
    {
        self.resolved.fetch_add(1, Ordering::SeqCst);
        ComponentResolver.resolve(injector, context)
    }
}

#[test]
fn container_consults_its_resolver() {
    let container = Container::with_resolver(CountingResolver::default());
    container
        .configure::<Repository>(Lifecycle::SingleInstance)
        .unwrap();
    container
        .configure::<Service>(Lifecycle::InstancePerCall)
        .unwrap();
    container
        .configure_with(|| Clock, Lifecycle::InstancePerCall)
        .unwrap();

    container.build::<Service>().unwrap();
    container.build::<Service>().unwrap();
    assert_eq!(container.resolver().resolved.load(Ordering::SeqCst), 3);
}
