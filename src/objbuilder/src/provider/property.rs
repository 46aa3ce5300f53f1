use std::any::{self, Any, TypeId};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::container::injector::{Injector, InjectorError, TypedInjector};

type Assign<C> = Arc<dyn Fn(&mut C, &(dyn Any + Send + Sync)) + Send + Sync>;

type Wire<C> = Arc<dyn Fn(&mut C, &dyn Injector) -> Result<(), InjectorError> + Send + Sync>;

/// A named settable attribute of `C`.
///
/// A value property only receives values configured explicitly. A
/// dependency property holds an `Arc<D>` and is additionally wired by the
/// resolver whenever `D` is registered, which is setter injection.
pub struct Property<C> {
    name: &'static str,
    value_type: TypeId,
    value_type_name: &'static str,
    assign: Assign<C>,
    wire: Option<Wire<C>>,
}

impl<C> Property<C>
where
    C: Send + Sync + 'static,
{
    pub fn value<V>(name: &'static str, setter: fn(&mut C, V)) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        Self {
            name,
            value_type: TypeId::of::<V>(),
            value_type_name: any::type_name::<V>(),
            assign: Arc::new(move |component: &mut C, value: &(dyn Any + Send + Sync)| {
                if let Some(value) = value.downcast_ref::<V>() {
                    setter(component, value.clone());
                }
            }),
            wire: None,
        }
    }

    pub fn dependency<D>(name: &'static str, setter: fn(&mut C, Arc<D>)) -> Self
    where
        D: Send + Sync + ?Sized + 'static,
    {
        let mut property = Self::value::<Arc<D>>(name, setter);
        property.wire = Some(Arc::new(
            move |component: &mut C, injector: &dyn Injector| -> Result<(), InjectorError> {
                if injector.has::<D>() {
                    setter(component, injector.get::<D>()?);
                }
                Ok(())
            },
        ));
        property
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value_type(&self) -> TypeId {
        self.value_type
    }

    pub fn value_type_name(&self) -> &'static str {
        self.value_type_name
    }

    /// Assigns `value` if it has the declared value type, otherwise does
    /// nothing.
    pub fn assign(&self, component: &mut C, value: &(dyn Any + Send + Sync)) {
        (self.assign)(component, value);
    }

    /// Resolves and assigns the dependency if it is registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the registered dependency can't be built.
    pub fn wire(&self, component: &mut C, injector: &dyn Injector) -> Result<(), InjectorError> {
        match &self.wire {
            Some(wire) => wire(component, injector),
            None => Ok(()),
        }
    }
}

impl<C> Clone for Property<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            value_type: self.value_type,
            value_type_name: self.value_type_name,
            assign: Arc::clone(&self.assign),
            wire: self.wire.clone(),
        }
    }
}

impl<C> Debug for Property<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("value_type", &self.value_type_name)
            .field("dependency", &self.wire.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::container::injector::MockInjector;
    use crate::container::SharedManaged;
    use crate::key;

    use super::*;

    #[derive(Default)]
    struct Endpoint {
        name: String,
        retries: Option<Arc<u32>>,
    }

    impl Endpoint {
        fn set_name(&mut self, name: String) {
            self.name = name;
        }

        fn set_retries(&mut self, retries: Arc<u32>) {
            self.retries = Some(retries);
        }
    }

    #[test]
    fn value_property_assign_succeeds() {
        let property = Property::value("name", Endpoint::set_name);
        assert_eq!(property.name(), "name");
        assert_eq!(property.value_type(), TypeId::of::<String>());

        let mut endpoint = Endpoint::default();
        property.assign(&mut endpoint, &String::from("orders"));
        assert_eq!(endpoint.name, "orders");

        property.assign(&mut endpoint, &42i32);
        assert_eq!(endpoint.name, "orders");
    }

    #[test]
    fn dependency_property_wire_succeeds_when_dependency_is_registered() {
        let property = Property::dependency("retries", Endpoint::set_retries);
        assert_eq!(property.value_type(), TypeId::of::<Arc<u32>>());

        let mut injector = MockInjector::new();
        injector
            .expect_contains()
            .withf(|key| *key == key::of::<u32>())
            .return_const(true);
        injector
            .expect_dyn_get()
            .returning(|_| Ok(Box::new(Arc::new(3u32)) as Box<dyn SharedManaged>));

        let mut endpoint = Endpoint::default();
        property.wire(&mut endpoint, &injector).unwrap();
        assert_eq!(endpoint.retries.as_deref(), Some(&3));
    }

    #[test]
    fn dependency_property_wire_skips_unregistered_dependency() {
        let property = Property::dependency("retries", Endpoint::set_retries);

        let mut injector = MockInjector::new();
        injector.expect_contains().return_const(false);
        injector.expect_dyn_get().never();

        let mut endpoint = Endpoint::default();
        property.wire(&mut endpoint, &injector).unwrap();
        assert!(endpoint.retries.is_none());
    }
}
