use std::sync::Arc;

use crate::container::injector::InjectorError;
use crate::container::registry::RegistryError;
use crate::lifecycle::ToLifecycle;
use crate::provider::closure::Closure;
use crate::provider::{Component, Descriptor};

/// The contract through which a host framework configures components and
/// resolves their instances.
///
/// [`Container`] implements the whole contract for the root scope.
/// [`ChildContainer`] is bound to one unit of work and only supports
/// resolution, [`ObjectBuilder::release`] and [`ObjectBuilder::dispose`];
/// the rest fail with [`RegistryError::NotSupported`].
///
/// [`Container`]: crate::container::Container
/// [`ChildContainer`]: crate::container::ChildContainer
pub trait ObjectBuilder: Send + Sync {
    /// The scope-bound view returned by
    /// [`ObjectBuilder::build_child_container`].
    type Child: ObjectBuilder;

    /// Resolves one instance of `T` according to its registered lifecycle.
    ///
    /// # Errors
    ///
    /// Returns [`InjectorError::UnregisteredComponent`] if `T` has no
    /// registration, [`InjectorError::ScopeDisposed`] if this scope has been
    /// disposed, or any error raised while constructing `T`.
    fn build<T>(&self) -> Result<Arc<T>, InjectorError>
    where
        T: Send + Sync + ?Sized + 'static;

    /// Resolves an instance of every registration exposing the contract `T`,
    /// each according to its own lifecycle. Returns an empty [`Vec`] if no
    /// registration exposes `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if this scope has been disposed or some instance
    /// can't be constructed.
    fn build_all<T>(&self) -> Result<Vec<Arc<T>>, InjectorError>
    where
        T: Send + Sync + ?Sized + 'static;

    /// Creates a child scope sharing the registrations and the singletons of
    /// this container.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotSupported`] on a child, or
    /// [`RegistryError::ScopeDisposed`] once this container is disposed.
    fn build_child_container(&self) -> Result<Self::Child, RegistryError>;

    /// Registers the component `C`, constructed by the container's resolver.
    /// Registering `C` again replaces the previous registration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidLifecycleKind`] if `lifecycle` is not
    /// recognized.
    fn configure<C>(&self, lifecycle: impl ToLifecycle) -> Result<(), RegistryError>
    where
        C: Component;

    /// Registers the return type of `creator`, which is invoked whenever a
    /// new instance is needed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidLifecycleKind`] if `lifecycle` is not
    /// recognized.
    fn configure_with<C, D>(&self, creator: C, lifecycle: impl ToLifecycle) -> Result<(), RegistryError>
    where
        C: Closure<D>,
        D: Send + Sync + 'static;

    /// Assigns `value` to the property `name` of every instance of `C`
    /// constructed from now on.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::PropertyNotFound`] if `C` has no such
    /// property, or [`RegistryError::TypeMismatch`] if the property doesn't
    /// hold a `V`.
    fn configure_property<C, V>(&self, name: &str, value: V) -> Result<(), RegistryError>
    where
        C: Descriptor,
        V: Send + Sync + 'static;

    /// Registers a pre-built singleton under its own type. It is also
    /// returned by [`ObjectBuilder::build_all`] for every interface `T`
    /// exposes. The container never disposes it.
    fn register_singleton<T>(&self, instance: Arc<T>) -> Result<(), RegistryError>
    where
        T: Descriptor;

    /// Registers a pre-built singleton under the contract `T`, typically a
    /// trait object. The container never disposes it.
    fn register_instance<T>(&self, instance: Arc<T>) -> Result<(), RegistryError>
    where
        T: Send + Sync + ?Sized + 'static;

    fn has_component<T>(&self) -> Result<bool, RegistryError>
    where
        T: ?Sized + 'static;

    /// Does nothing. Instances are released when their scope is disposed.
    fn release<T>(&self, _instance: &Arc<T>)
    where
        T: ?Sized,
    {
    }

    /// Disposes this scope. Calling it again has no effect.
    fn dispose(&self);
}
