use std::sync::Arc;

use crate::container::injector::{Injector, InjectorError, TypedInjector};
use crate::provider::closure::Closure;
use crate::provider::Descriptor;

impl<F, T> Closure<()> for F
where
    F: Fn() -> T + Send + Sync + 'static,
    T: Descriptor,
{
    type Constructed = T;

    fn run(&self, _injector: &dyn Injector) -> Result<Self::Constructed, InjectorError> {
        Ok(self())
    }
}

macro_rules! for_all_tuples {
    ($implementation:ident) => {
        $implementation!(D1);
        $implementation!(D1, D2);
        $implementation!(D1, D2, D3);
        $implementation!(D1, D2, D3, D4);
        $implementation!(D1, D2, D3, D4, D5);
        $implementation!(D1, D2, D3, D4, D5, D6);
        $implementation!(D1, D2, D3, D4, D5, D6, D7);
        $implementation!(D1, D2, D3, D4, D5, D6, D7, D8);
    };
}

macro_rules! impl_closure {
    ($($dep:ident),*) => {
        #[allow(non_snake_case)]
        impl<F, T, $($dep,)*> Closure<($(Arc<$dep>,)*)> for F
        where
            F: Fn($(Arc<$dep>,)*) -> T + Send + Sync + 'static,
            T: Descriptor,
            $($dep: Send + Sync + ?Sized + 'static,)*
        {
            type Constructed = T;

            fn run(&self, injector: &dyn Injector) -> Result<Self::Constructed, InjectorError> {
                $(
                    let $dep = injector.get::<$dep>()?;
                )*
                Ok(self($($dep,)*))
            }
        }
    };
}

for_all_tuples!(impl_closure);
