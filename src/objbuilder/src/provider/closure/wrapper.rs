use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use crate::container::injector::{
    CallContext, ContextForwardingInjectorProxy, InjectorError, TypedInjector,
};
use crate::provider::closure::Closure;
use crate::provider::{self, Descriptor, Provided, TypedProvider};

/// A [`Provider`] which supplies objects from a [`Closure`].
///
/// # Examples
///
/// ```rust
/// # use std::sync::Arc;
/// # use objbuilder::provider::closure::ClosureProvider;
/// let closure = |a: Arc<i32>, b: Arc<str>| format!("{b}{a}");
/// let provider = ClosureProvider::new(closure);
/// ```
///
/// [`Provider`]: crate::provider::Provider
pub struct ClosureProvider<T, C, D>
where
    T: Descriptor,
    C: Closure<D, Constructed = T>,
    D: Send + Sync + 'static,
{
    closure: C,
    _marker: PhantomData<(T, D)>,
}

impl<T, C, D> ClosureProvider<T, C, D>
where
    T: Descriptor,
    C: Closure<D, Constructed = T>,
    D: Send + Sync + 'static,
{
    /// Creates a new [`ClosureProvider`] from a [`Closure`].
    pub fn new(closure: C) -> Self {
        Self {
            closure,
            _marker: PhantomData,
        }
    }
}

impl<T, C, D> Debug for ClosureProvider<T, C, D>
where
    T: Descriptor,
    C: Closure<D, Constructed = T>,
    D: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ClosureProvider<T, C, D>")
            .finish_non_exhaustive()
    }
}

impl<T, C, D> TypedProvider for ClosureProvider<T, C, D>
where
    T: Descriptor,
    C: Closure<D, Constructed = T>,
    D: Send + Sync + 'static,
{
    type Output = T;

    fn provide<I>(
        &self,
        injector: &I,
        context: &CallContext<'_>,
    ) -> Result<Provided<Self::Output>, InjectorError>
    where
        I: TypedInjector + ?Sized,
    {
        trace!(component = %context.key(), "invoking creator");
        let injector = ContextForwardingInjectorProxy::new(injector, context);
        let mut object = self.closure.run(&injector)?;
        provider::initialize(&injector, &mut object);
        let object = Arc::new(object);
        let disposer = T::disposer(&object);
        Ok(Provided::new(object).with_disposer(disposer))
    }
}
