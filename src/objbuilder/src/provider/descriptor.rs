use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::container::injector::downcast_shared;
use crate::container::SharedManaged;
use crate::key::Key;
use crate::provider::Property;

/// Compile-time description of a type managed by a container.
///
/// Every method has an empty default, so a plain `impl Descriptor for T {}`
/// is enough for types produced by creator closures. The [`component`]
/// macro implements it for components.
///
/// [`component`]: crate::component
pub trait Descriptor: Sized + Send + Sync + 'static {
    /// Returns the settable attributes of the type, which can receive values
    /// configured through `configure_property` and, for dependency
    /// properties, registered components.
    fn properties() -> Vec<Property<Self>> {
        Vec::new()
    }

    /// Declares the contracts under which the type is discoverable by
    /// `build_all`.
    fn expose(_interfaces: &mut Interfaces<Self>) {}

    /// Returns the release capability of an instance, if the type has one.
    /// Shared instances with a release capability are disposed when the
    /// scope caching them ends.
    fn disposer(_this: &Arc<Self>) -> Option<Arc<dyn Dispose>> {
        None
    }
}

macro_rules! impl_plain_descriptor {
    ($($ty:ty),* $(,)?) => {
        $(impl Descriptor for $ty {})*
    };
}

impl_plain_descriptor!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
);

/// A release capability, run once when the owning scope is disposed.
pub trait Dispose: Send + Sync + 'static {
    fn dispose(&self);
}

/// A collector of the contracts implemented by `C`.
pub struct Interfaces<C>
where
    C: Send + Sync + 'static,
{
    exposed: Vec<Exposure>,
    _marker: PhantomData<fn() -> C>,
}

impl<C> Interfaces<C>
where
    C: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            exposed: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Exposes `C` under the contract `I`. The `upcast` is usually the
    /// identity closure `|this| this`, coercing `Arc<C>` to `Arc<dyn Trait>`.
    pub fn expose<I>(&mut self, upcast: fn(Arc<C>) -> Arc<I>) -> &mut Self
    where
        I: Send + Sync + ?Sized + 'static,
    {
        let interface = Key::of::<I>();
        if self.exposed.iter().all(|e| e.interface != interface) {
            self.exposed.push(Exposure {
                interface,
                upcast: Arc::new(
                    move |object: Box<dyn SharedManaged>| -> Box<dyn SharedManaged> {
                        Box::new(upcast(downcast_shared::<C>(object)))
                    },
                ),
            });
        }
        self
    }

    pub(crate) fn into_exposures(self) -> Vec<Exposure> {
        self.exposed
    }
}

impl<C> Interfaces<C>
where
    C: Descriptor,
{
    pub(crate) fn of_descriptor() -> Vec<Exposure> {
        let mut interfaces = Self::new();
        C::expose(&mut interfaces);
        interfaces.into_exposures()
    }
}

/// One contract under which a registration is discoverable.
#[derive(Clone)]
pub struct Exposure {
    pub(crate) interface: Key,
    upcast: Arc<dyn Fn(Box<dyn SharedManaged>) -> Box<dyn SharedManaged> + Send + Sync>,
}

impl Exposure {
    pub fn interface(&self) -> &Key {
        &self.interface
    }

    /// Converts an instance of the registered component into an instance of
    /// the contract.
    pub(crate) fn upcast(&self, object: Box<dyn SharedManaged>) -> Box<dyn SharedManaged> {
        (self.upcast)(object)
    }
}

impl Debug for Exposure {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Exposure")
            .field("interface", &self.interface)
            .finish_non_exhaustive()
    }
}
