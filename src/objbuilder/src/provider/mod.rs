pub mod closure;
pub mod component;
pub mod instance;

mod descriptor;
mod property;

use std::any::{Any, TypeId};
use std::fmt::Debug;
use std::sync::Arc;

use crate::container::injector::{CallContext, Injector, InjectorError, TypedInjector};
use crate::container::SharedManaged;

pub use component::{Component, ComponentResolver, Resolver};
pub use descriptor::{Descriptor, Dispose, Exposure, Interfaces};
pub use property::Property;

/// A type-erased instance freshly produced by a [`Provider`].
pub struct Constructed {
    pub object: Box<dyn SharedManaged>,
    /// The release capability of `object`, if its type has one.
    pub disposer: Option<Arc<dyn Dispose>>,
}

/// A universal factory which constructs objects of one type.
///
/// A [`Provider`] is responsible for constructing an object on each request
/// and retrieving all dependencies from an [`Injector`]. Sharing is decided
/// by the scope that asks, according to the registration's lifecycle, so a
/// provider should hand out a new object every time unless it wraps a
/// pre-built instance.
///
/// Usually, you don't need to implement [`Provider`] manually, since this is
/// automatically done by [`TypedProvider`]'s blanket implementation.
pub trait Provider: Debug + Send + Sync + 'static {
    /// Provides a newly created type-erased object.
    ///
    /// # Errors
    ///
    /// Returns an error if some dependencies can't be fetched or the object
    /// construction fails.
    fn dyn_provide(
        &self,
        injector: &dyn Injector,
        context: &CallContext<'_>,
    ) -> Result<Constructed, InjectorError>;
}

/// A typed instance freshly produced by a [`TypedProvider`].
pub struct Provided<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    pub object: Arc<T>,
    pub disposer: Option<Arc<dyn Dispose>>,
}

impl<T> Provided<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    pub fn new(object: Arc<T>) -> Self {
        Self {
            object,
            disposer: None,
        }
    }

    pub fn with_disposer(mut self, disposer: Option<Arc<dyn Dispose>>) -> Self {
        self.disposer = disposer;
        self
    }
}

/// A static variant of the [`Provider`] trait, leveraging static dispatch and
/// type-safety.
pub trait TypedProvider: Provider {
    /// The type of objects shared behind the returned [`Arc`].
    type Output: Send + Sync + ?Sized + 'static;

    /// Provides a newly created object of type [`TypedProvider::Output`].
    ///
    /// # Errors
    ///
    /// Returns an error if some dependencies can't be fetched or the object
    /// construction fails.
    fn provide<I>(
        &self,
        injector: &I,
        context: &CallContext<'_>,
    ) -> Result<Provided<Self::Output>, InjectorError>
    where
        I: TypedInjector + ?Sized;
}

impl<T: TypedProvider> Provider for T {
    fn dyn_provide(
        &self,
        injector: &dyn Injector,
        context: &CallContext<'_>,
    ) -> Result<Constructed, InjectorError> {
        self.provide(injector, context).map(|provided| Constructed {
            object: Box::new(provided.object),
            disposer: provided.disposer,
        })
    }
}

/// Runs every initializer installed for `T` on a freshly constructed object.
pub(crate) fn initialize<I, T>(injector: &I, object: &mut T)
where
    I: Injector + ?Sized,
    T: Any,
{
    for initializer in injector.initializers(TypeId::of::<T>()) {
        initializer(object);
    }
}
