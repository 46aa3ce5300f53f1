use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use crate::container::injector::{
    CallContext, ContextForwardingInjectorProxy, InjectorError, TypedInjector,
};
use crate::provider::component::{Component, Resolver};
use crate::provider::{self, Provided, TypedProvider};

/// A [`Provider`] which asks a [`Resolver`] to construct `C`.
///
/// [`Provider`]: crate::provider::Provider
pub struct ComponentProvider<C, R>
where
    C: Component,
    R: Resolver,
{
    resolver: Arc<R>,
    _marker: PhantomData<C>,
}

impl<C, R> ComponentProvider<C, R>
where
    C: Component,
    R: Resolver,
{
    pub fn new(resolver: Arc<R>) -> Self {
        Self {
            resolver,
            _marker: PhantomData,
        }
    }
}

impl<C, R> Debug for ComponentProvider<C, R>
where
    C: Component,
    R: Resolver,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ComponentProvider<C, R>")
            .finish_non_exhaustive()
    }
}

impl<C, R> TypedProvider for ComponentProvider<C, R>
where
    C: Component,
    R: Resolver,
{
    type Output = C;

    fn provide<I>(
        &self,
        injector: &I,
        context: &CallContext<'_>,
    ) -> Result<Provided<Self::Output>, InjectorError>
    where
        I: TypedInjector + ?Sized,
    {
        trace!(component = %context.key(), "resolving component");
        let injector = ContextForwardingInjectorProxy::new(injector, context);
        let mut component = self.resolver.resolve::<C>(&injector, context)?;
        provider::initialize(&injector, &mut component);
        let object = Arc::new(component);
        let disposer = C::disposer(&object);
        Ok(Provided::new(object).with_disposer(disposer))
    }
}
