use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::injector::{CallContext, InjectorError, TypedInjector};
use crate::provider::{Provided, TypedProvider};

/// A [`Provider`] which always hands out the same pre-built instance. The
/// instance is owned by whoever built it, so no disposer is reported.
///
/// [`Provider`]: crate::provider::Provider
pub struct InstanceProvider<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    instance: Arc<T>,
}

impl<T> InstanceProvider<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    pub fn new(instance: Arc<T>) -> Self {
        Self { instance }
    }
}

impl<T> Debug for InstanceProvider<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("InstanceProvider<T>")
            .finish_non_exhaustive()
    }
}

impl<T> TypedProvider for InstanceProvider<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    type Output = T;

    fn provide<I>(
        &self,
        _injector: &I,
        _context: &CallContext<'_>,
    ) -> Result<Provided<Self::Output>, InjectorError>
    where
        I: TypedInjector + ?Sized,
    {
        Ok(Provided::new(Arc::clone(&self.instance)))
    }
}

#[cfg(test)]
mod tests {
    use crate::container::injector::MockInjector;
    use crate::key;

    use super::*;

    #[test]
    fn instance_provider_succeeds() {
        let provider = InstanceProvider::<str>::new(Arc::from("greeting"));
        let injector = MockInjector::new();

        let first = provider
            .provide(&injector, &CallContext::new(&key::of::<str>()))
            .unwrap();
        let second = provider
            .provide(&injector, &CallContext::new(&key::of::<str>()))
            .unwrap();
        assert!(Arc::ptr_eq(&first.object, &second.object));
        assert!(first.disposer.is_none());
    }
}
