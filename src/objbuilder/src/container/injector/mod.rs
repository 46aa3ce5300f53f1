mod context;
mod proxy;

use std::any::{Any, TypeId};
use std::error::Error;
use std::sync::Arc;

use snafu::prelude::*;

use crate::container::{ScopeId, SharedManaged};
use crate::key::Key;
use crate::util::any::Downcast;

pub use context::{CallContext, InjectionTrace};
pub(crate) use proxy::ContextForwardingInjectorProxy;

/// A post-construction hook installed by `configure_property`. It receives
/// every freshly constructed instance of the type it was installed for.
pub type Initializer = Arc<dyn Fn(&mut dyn Any) + Send + Sync>;

/// The lookup seam through which factories obtain their dependencies.
#[cfg_attr(test, mockall::automock)]
pub trait Injector: Send + Sync {
    fn dyn_get(&self, key: &Key) -> Result<Box<dyn SharedManaged>, InjectorError>;

    fn dyn_get_dependency<'a>(
        &self,
        key: &Key,
        context: &'a CallContext<'a>,
    ) -> Result<Box<dyn SharedManaged>, InjectorError>;

    fn dyn_get_all(&self, key: &Key) -> Result<Vec<Box<dyn SharedManaged>>, InjectorError>;

    fn dyn_get_all_dependencies<'a>(
        &self,
        key: &Key,
        context: &'a CallContext<'a>,
    ) -> Result<Vec<Box<dyn SharedManaged>>, InjectorError>;

    fn contains(&self, key: &Key) -> bool;

    fn initializers(&self, target: TypeId) -> Vec<Initializer>;
}

pub trait TypedInjector: Injector {
    fn get<T>(&self) -> Result<Arc<T>, InjectorError>
    where
        T: Send + Sync + ?Sized + 'static,
    {
        self.dyn_get(&Key::of::<T>()).map(downcast_shared::<T>)
    }

    fn get_all<T>(&self) -> Result<Vec<Arc<T>>, InjectorError>
    where
        T: Send + Sync + ?Sized + 'static,
    {
        self.dyn_get_all(&Key::of::<T>())
            .map(|objects| objects.into_iter().map(downcast_shared::<T>).collect())
    }

    fn has<T>(&self) -> bool
    where
        T: ?Sized + 'static,
    {
        self.contains(&Key::of::<T>())
    }
}

impl<T> TypedInjector for T where T: Injector {}

impl TypedInjector for dyn Injector + '_ {}

pub(crate) fn downcast_shared<T>(object: Box<dyn SharedManaged>) -> Arc<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    match object.downcast::<Arc<T>>() {
        Ok(object) => *object,
        Err(_) => unreachable!("the object's type should be `Arc<T>`"),
    }
}

#[derive(Debug, Clone, Snafu)]
#[non_exhaustive]
pub enum InjectorError {
    #[snafu(display("could not find any registration for the component {key}"))]
    #[non_exhaustive]
    UnregisteredComponent { key: Key },
    #[snafu(display("could not construct the component {key} which depends on itself somehow"))]
    #[non_exhaustive]
    CyclicDependency { key: Key },
    #[snafu(display("could not construct the component {key}"))]
    #[non_exhaustive]
    ObjectConstruction {
        key: Key,
        source: Arc<dyn Error + Send + Sync>,
    },
    #[snafu(display("construction of the component {key} was abandoned by a panic"))]
    #[non_exhaustive]
    ConstructionAborted { key: Key },
    #[snafu(display("could not build any component in the disposed {scope}"))]
    #[non_exhaustive]
    ScopeDisposed { scope: ScopeId },
}

#[cfg(test)]
mod tests {
    use crate::key;

    use super::*;

    trait Contract: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct Implementation;

    impl Contract for Implementation {
        fn name(&self) -> &'static str {
            "implementation"
        }
    }

    #[test]
    fn typed_injector_get_succeeds_when_key_is_a_trait_object() {
        let mut injector = MockInjector::new();
        injector
            .expect_dyn_get()
            .withf(|key| *key == key::of::<dyn Contract>())
            .returning(|_| {
                let object: Arc<dyn Contract> = Arc::new(Implementation);
                Ok(Box::new(object))
            });

        let object = injector.get::<dyn Contract>().unwrap();
        assert_eq!(object.name(), "implementation");
    }

    #[test]
    fn typed_injector_get_all_succeeds() {
        let mut injector = MockInjector::new();
        injector.expect_dyn_get_all().returning(|_| {
            Ok(vec![
                Box::new(Arc::new(1i32)) as Box<dyn SharedManaged>,
                Box::new(Arc::new(2i32)),
            ])
        });

        let objects = injector.get_all::<i32>().unwrap();
        assert_eq!(objects.iter().map(|o| **o).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn typed_injector_has_succeeds() {
        let mut injector = MockInjector::new();
        injector
            .expect_contains()
            .returning(|key| *key == key::of::<i32>());

        assert!(injector.has::<i32>());
        assert!(!injector.has::<i64>());
    }
}
