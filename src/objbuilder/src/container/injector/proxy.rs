use std::any::TypeId;

use crate::container::injector::{CallContext, Initializer, Injector, InjectorError, TypedInjector};
use crate::container::SharedManaged;
use crate::key::Key;

/// An [`Injector`] handed to factories, which records every dependency
/// request in the trace of the request being served.
pub struct ContextForwardingInjectorProxy<'a, I>
where
    I: TypedInjector + ?Sized,
{
    inner: &'a I,
    context: &'a CallContext<'a>,
}

impl<'a, I> ContextForwardingInjectorProxy<'a, I>
where
    I: TypedInjector + ?Sized,
{
    pub fn new(inner: &'a I, context: &'a CallContext<'a>) -> Self {
        Self { inner, context }
    }
}

impl<I> Injector for ContextForwardingInjectorProxy<'_, I>
where
    I: TypedInjector + ?Sized,
{
    fn dyn_get(&self, key: &Key) -> Result<Box<dyn SharedManaged>, InjectorError> {
        self.dyn_get_dependency(key, self.context)
    }

    fn dyn_get_dependency<'a>(
        &self,
        key: &Key,
        context: &'a CallContext<'a>,
    ) -> Result<Box<dyn SharedManaged>, InjectorError> {
        self.inner.dyn_get_dependency(key, context)
    }

    fn dyn_get_all(&self, key: &Key) -> Result<Vec<Box<dyn SharedManaged>>, InjectorError> {
        self.dyn_get_all_dependencies(key, self.context)
    }

    fn dyn_get_all_dependencies<'a>(
        &self,
        key: &Key,
        context: &'a CallContext<'a>,
    ) -> Result<Vec<Box<dyn SharedManaged>>, InjectorError> {
        self.inner.dyn_get_all_dependencies(key, context)
    }

    fn contains(&self, key: &Key) -> bool {
        self.inner.contains(key)
    }

    fn initializers(&self, target: TypeId) -> Vec<Initializer> {
        self.inner.initializers(target)
    }
}
