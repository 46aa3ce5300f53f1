use std::any::{self, Any, TypeId};
use std::sync::Arc;

use tracing::debug;

use crate::container::core::ScopeCore;
use crate::container::injector::{
    CallContext, Initializer, Injector, InjectorError, TypedInjector,
};
use crate::container::registry::RegistryError;
use crate::container::{ObjectBuilder, ScopeId, SharedManaged};
use crate::key::Key;
use crate::lifecycle::{Lifecycle, ToLifecycle};
use crate::module::Module;
use crate::provider::closure::{Closure, ClosureProvider};
use crate::provider::component::ComponentProvider;
use crate::provider::instance::InstanceProvider;
use crate::provider::{
    Component, ComponentResolver, Descriptor, Exposure, Interfaces, Provider, Resolver,
};

/// The root container, which owns the registrations and the root scope.
///
/// Handles are cheap to clone and share the same state. The root scope is
/// disposed by [`ObjectBuilder::dispose`] or when the last handle, including
/// those held by child scopes, is dropped.
pub struct Container<R = ComponentResolver>
where
    R: Resolver,
{
    core: Arc<ScopeCore>,
    resolver: Arc<R>,
}

impl Container {
    pub fn new() -> Self {
        Self::with_resolver(ComponentResolver)
    }

    /// Creates a container configured by `module`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Aggregated`] holding the error of every
    /// module which fails.
    pub fn init<M>(module: M) -> Result<Self, RegistryError>
    where
        M: Module,
    {
        Self::init_with_resolver(ComponentResolver, module)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Container<R>
where
    R: Resolver,
{
    pub fn with_resolver(resolver: R) -> Self {
        Self {
            core: Arc::new(ScopeCore::new_root()),
            resolver: Arc::new(resolver),
        }
    }

    /// Creates a container with a custom [`Resolver`] configured by
    /// `module`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Aggregated`] holding the error of every
    /// module which fails.
    pub fn init_with_resolver<M>(resolver: R, module: M) -> Result<Self, RegistryError>
    where
        M: Module<R>,
    {
        let container = Self::with_resolver(resolver);
        let mut errors = Vec::new();
        module.setup(&container, &mut errors);

        if errors.is_empty() {
            Ok(container)
        } else {
            Err(RegistryError::Aggregated { errors })
        }
    }

    pub fn scope(&self) -> ScopeId {
        self.core.id()
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    fn register(
        &self,
        key: Key,
        provider: Arc<dyn Provider>,
        lifecycle: Lifecycle,
        exposed: Vec<Exposure>,
    ) {
        debug!(component = %key, %lifecycle, exposed = exposed.len(), "registering component");
        let replaced = self
            .core
            .registrations()
            .write()
            .insert(key, provider, lifecycle, exposed);
        if replaced.is_some() {
            debug!(component = %key, "replaced previous registration");
        }
    }
}

impl<R> Clone for Container<R>
where
    R: Resolver,
{
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<R> ObjectBuilder for Container<R>
where
    R: Resolver,
{
    type Child = ChildContainer;

    fn build<T>(&self) -> Result<Arc<T>, InjectorError>
    where
        T: Send + Sync + ?Sized + 'static,
    {
        self.core.get::<T>()
    }

    fn build_all<T>(&self) -> Result<Vec<Arc<T>>, InjectorError>
    where
        T: Send + Sync + ?Sized + 'static,
    {
        self.core.get_all::<T>()
    }

    fn build_child_container(&self) -> Result<Self::Child, RegistryError> {
        if self.core.is_disposed() {
            return Err(RegistryError::ScopeDisposed {
                scope: self.core.id(),
            });
        }
        let core = ScopeCore::new_child(&self.core);
        debug!(scope = %core.id(), "created child scope");
        Ok(ChildContainer {
            core: Arc::new(core),
        })
    }

    fn configure<C>(&self, lifecycle: impl ToLifecycle) -> Result<(), RegistryError>
    where
        C: Component,
    {
        let lifecycle = lifecycle.to_lifecycle()?;
        let provider = ComponentProvider::<C, R>::new(Arc::clone(&self.resolver));
        self.register(
            Key::of::<C>(),
            Arc::new(provider),
            lifecycle,
            Interfaces::<C>::of_descriptor(),
        );
        Ok(())
    }

    fn configure_with<C, D>(&self, creator: C, lifecycle: impl ToLifecycle) -> Result<(), RegistryError>
    where
        C: Closure<D>,
        D: Send + Sync + 'static,
    {
        let lifecycle = lifecycle.to_lifecycle()?;
        self.register(
            Key::of::<C::Constructed>(),
            Arc::new(ClosureProvider::new(creator)),
            lifecycle,
            Interfaces::<C::Constructed>::of_descriptor(),
        );
        Ok(())
    }

    fn configure_property<C, V>(&self, name: &str, value: V) -> Result<(), RegistryError>
    where
        C: Descriptor,
        V: Send + Sync + 'static,
    {
        let initializer = property_initializer::<C, V>(name, value)?;
        debug!(component = any::type_name::<C>(), property = name, "configured property");
        self.core
            .registrations()
            .write()
            .add_initializer(TypeId::of::<C>(), initializer);
        Ok(())
    }

    fn register_singleton<T>(&self, instance: Arc<T>) -> Result<(), RegistryError>
    where
        T: Descriptor,
    {
        self.register(
            Key::of::<T>(),
            Arc::new(InstanceProvider::new(instance)),
            Lifecycle::SingleInstance,
            Interfaces::<T>::of_descriptor(),
        );
        Ok(())
    }

    fn register_instance<T>(&self, instance: Arc<T>) -> Result<(), RegistryError>
    where
        T: Send + Sync + ?Sized + 'static,
    {
        self.register(
            Key::of::<T>(),
            Arc::new(InstanceProvider::new(instance)),
            Lifecycle::SingleInstance,
            Vec::new(),
        );
        Ok(())
    }

    fn has_component<T>(&self) -> Result<bool, RegistryError>
    where
        T: ?Sized + 'static,
    {
        Ok(self.core.has::<T>())
    }

    fn dispose(&self) {
        self.core.dispose();
    }
}

impl<R> Injector for Container<R>
where
    R: Resolver,
{
    fn dyn_get(&self, key: &Key) -> Result<Box<dyn SharedManaged>, InjectorError> {
        self.core.dyn_get(key)
    }

    fn dyn_get_dependency<'a>(
        &self,
        key: &Key,
        context: &'a CallContext<'a>,
    ) -> Result<Box<dyn SharedManaged>, InjectorError> {
        self.core.dyn_get_dependency(key, context)
    }

    fn dyn_get_all(&self, key: &Key) -> Result<Vec<Box<dyn SharedManaged>>, InjectorError> {
        self.core.dyn_get_all(key)
    }

    fn dyn_get_all_dependencies<'a>(
        &self,
        key: &Key,
        context: &'a CallContext<'a>,
    ) -> Result<Vec<Box<dyn SharedManaged>>, InjectorError> {
        self.core.dyn_get_all_dependencies(key, context)
    }

    fn contains(&self, key: &Key) -> bool {
        self.core.contains(key)
    }

    fn initializers(&self, target: TypeId) -> Vec<Initializer> {
        self.core.initializers(target)
    }
}

/// A view bound to one child scope, i.e. one unit of work.
///
/// Per-unit-of-work instances built through this view are shared within it
/// and disposed with it. Singletons still come from the root.
#[derive(Clone)]
pub struct ChildContainer {
    core: Arc<ScopeCore>,
}

impl ChildContainer {
    pub fn scope(&self) -> ScopeId {
        self.core.id()
    }
}

impl ObjectBuilder for ChildContainer {
    type Child = ChildContainer;

    fn build<T>(&self) -> Result<Arc<T>, InjectorError>
    where
        T: Send + Sync + ?Sized + 'static,
    {
        self.core.get::<T>()
    }

    fn build_all<T>(&self) -> Result<Vec<Arc<T>>, InjectorError>
    where
        T: Send + Sync + ?Sized + 'static,
    {
        self.core.get_all::<T>()
    }

    fn build_child_container(&self) -> Result<Self::Child, RegistryError> {
        Err(RegistryError::NotSupported {
            operation: "build_child_container",
        })
    }

    fn configure<C>(&self, _lifecycle: impl ToLifecycle) -> Result<(), RegistryError>
    where
        C: Component,
    {
        Err(RegistryError::NotSupported {
            operation: "configure",
        })
    }

    fn configure_with<C, D>(&self, _creator: C, _lifecycle: impl ToLifecycle) -> Result<(), RegistryError>
    where
        C: Closure<D>,
        D: Send + Sync + 'static,
    {
        Err(RegistryError::NotSupported {
            operation: "configure_with",
        })
    }

    fn configure_property<C, V>(&self, _name: &str, _value: V) -> Result<(), RegistryError>
    where
        C: Descriptor,
        V: Send + Sync + 'static,
    {
        Err(RegistryError::NotSupported {
            operation: "configure_property",
        })
    }

    fn register_singleton<T>(&self, _instance: Arc<T>) -> Result<(), RegistryError>
    where
        T: Descriptor,
    {
        Err(RegistryError::NotSupported {
            operation: "register_singleton",
        })
    }

    fn register_instance<T>(&self, _instance: Arc<T>) -> Result<(), RegistryError>
    where
        T: Send + Sync + ?Sized + 'static,
    {
        Err(RegistryError::NotSupported {
            operation: "register_instance",
        })
    }

    fn has_component<T>(&self) -> Result<bool, RegistryError>
    where
        T: ?Sized + 'static,
    {
        Err(RegistryError::NotSupported {
            operation: "has_component",
        })
    }

    fn dispose(&self) {
        self.core.dispose();
    }
}

impl Injector for ChildContainer {
    fn dyn_get(&self, key: &Key) -> Result<Box<dyn SharedManaged>, InjectorError> {
        self.core.dyn_get(key)
    }

    fn dyn_get_dependency<'a>(
        &self,
        key: &Key,
        context: &'a CallContext<'a>,
    ) -> Result<Box<dyn SharedManaged>, InjectorError> {
        self.core.dyn_get_dependency(key, context)
    }

    fn dyn_get_all(&self, key: &Key) -> Result<Vec<Box<dyn SharedManaged>>, InjectorError> {
        self.core.dyn_get_all(key)
    }

    fn dyn_get_all_dependencies<'a>(
        &self,
        key: &Key,
        context: &'a CallContext<'a>,
    ) -> Result<Vec<Box<dyn SharedManaged>>, InjectorError> {
        self.core.dyn_get_all_dependencies(key, context)
    }

    fn contains(&self, key: &Key) -> bool {
        self.core.contains(key)
    }

    fn initializers(&self, target: TypeId) -> Vec<Initializer> {
        self.core.initializers(target)
    }
}

/// Validates `name` against the properties of `C` and binds `value` into an
/// initializer assigning it.
fn property_initializer<C, V>(name: &str, value: V) -> Result<Initializer, RegistryError>
where
    C: Descriptor,
    V: Send + Sync + 'static,
{
    let Some(property) = C::properties()
        .into_iter()
        .find(|property| property.name() == name)
    else {
        return Err(RegistryError::PropertyNotFound {
            component: any::type_name::<C>(),
            property: name.to_string(),
        });
    };

    if property.value_type() != TypeId::of::<V>() {
        return Err(RegistryError::TypeMismatch {
            component: any::type_name::<C>(),
            property: name.to_string(),
            expected: property.value_type_name(),
            found: any::type_name::<V>(),
        });
    }

    Ok(Arc::new(move |object: &mut dyn Any| {
        if let Some(component) = object.downcast_mut::<C>() {
            property.assign(component, &value);
        }
    }))
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::error::Error;
    use std::thread;

    use parking_lot::Mutex;

    use super::*;

    struct Greeting {
        name: Arc<String>,
        punctuation: Mutex<char>,
    }

    impl Greeting {
        fn set_punctuation(&mut self, punctuation: char) {
            *self.punctuation.get_mut() = punctuation;
        }

        fn render(&self) -> String {
            format!("hello, {}{}", self.name, *self.punctuation.lock())
        }
    }

    impl Descriptor for Greeting {
        fn properties() -> Vec<crate::provider::Property<Self>> {
            vec![crate::provider::Property::value(
                "punctuation",
                Greeting::set_punctuation,
            )]
        }
    }

    impl Component for Greeting {
        type Error = Infallible;

        fn construct<I>(injector: &I) -> Result<Result<Self, Self::Error>, InjectorError>
        where
            I: TypedInjector + ?Sized,
        {
            Ok(Ok(Self {
                name: injector.get::<String>()?,
                punctuation: Mutex::new('.'),
            }))
        }
    }

    struct GreetingModule;

    impl Module for GreetingModule {
        fn configure(&self, container: &Container) -> Result<(), Box<dyn Error + Send + Sync>> {
            container.register_singleton(Arc::new(String::from("world")))?;
            container.configure::<Greeting>(Lifecycle::SingleInstance)?;
            Ok(())
        }
    }

    #[test]
    fn container_operations_succeeds() {
        let container = Container::init(GreetingModule).unwrap();
        assert!(container.scope().is_root());

        let greeting = container.build::<Greeting>().unwrap();
        assert_eq!(greeting.render(), "hello, world.");
        *greeting.punctuation.lock() = '!';

        let handle = thread::spawn({
            let container = container.clone();
            move || container.build::<Greeting>().unwrap().render()
        });
        assert_eq!(handle.join().unwrap(), "hello, world!");
    }

    #[test]
    fn container_configure_fails_when_lifecycle_is_invalid() {
        let container = Container::new();
        assert!(matches!(
            container.configure::<Greeting>("Forever"),
            Err(RegistryError::InvalidLifecycleKind { .. })
        ));
        assert!(!container.has_component::<Greeting>().unwrap());
    }

    #[test]
    fn container_configure_property_validates_eagerly() {
        let container = Container::new();
        container
            .configure::<Greeting>(Lifecycle::InstancePerCall)
            .unwrap();

        assert!(matches!(
            container.configure_property::<Greeting, _>("colour", 'x'),
            Err(RegistryError::PropertyNotFound { .. })
        ));
        assert!(matches!(
            container.configure_property::<Greeting, _>("punctuation", "!"),
            Err(RegistryError::TypeMismatch { .. })
        ));

        container
            .configure_property::<Greeting, _>("punctuation", '?')
            .unwrap();
        container.register_singleton(Arc::new(String::from("there"))).unwrap();
        assert_eq!(container.build::<Greeting>().unwrap().render(), "hello, there?");
    }

    #[test]
    fn child_container_rejects_configuration() {
        let container = Container::new();
        let child = container.build_child_container().unwrap();
        assert!(!child.scope().is_root());

        assert!(matches!(
            child.build_child_container(),
            Err(RegistryError::NotSupported { operation: "build_child_container" })
        ));
        assert!(matches!(
            child.configure::<Greeting>(Lifecycle::SingleInstance),
            Err(RegistryError::NotSupported { .. })
        ));
        assert!(matches!(
            child.configure_with(|| 42u32, "InstancePerCall"),
            Err(RegistryError::NotSupported { .. })
        ));
        assert!(matches!(
            child.configure_property::<Greeting, _>("punctuation", '!'),
            Err(RegistryError::NotSupported { .. })
        ));
        assert!(matches!(
            child.register_singleton(Arc::new(1u8)),
            Err(RegistryError::NotSupported { .. })
        ));
        assert!(matches!(
            child.register_instance(Arc::new(1u8)),
            Err(RegistryError::NotSupported { .. })
        ));
        assert!(matches!(
            child.has_component::<Greeting>(),
            Err(RegistryError::NotSupported { .. })
        ));
    }

    #[test]
    fn container_build_child_container_fails_after_dispose() {
        let container = Container::new();
        container.dispose();

        assert!(matches!(
            container.build_child_container(),
            Err(RegistryError::ScopeDisposed { scope }) if scope.is_root()
        ));
    }
}
