use std::sync::Arc;

use crate::container::injector::{CallContext, Injector, InjectorError};
use crate::provider::component::Component;

/// The capability which performs the actual construction of components.
///
/// A container consults its [`Resolver`] for every component registered with
/// `configure`, so construction can be replaced without touching any
/// lifecycle bookkeeping.
pub trait Resolver: Send + Sync + 'static {
    /// Constructs a `C` whose dependencies are built from `injector`.
    ///
    /// # Errors
    ///
    /// Returns an error if some dependencies can't be built or the
    /// construction of `C` fails.
    fn resolve<C>(&self, injector: &dyn Injector, context: &CallContext<'_>) -> Result<C, InjectorError>
    where
        C: Component;
}

/// The metadata-driven [`Resolver`], which runs [`Component::construct`] and
/// then wires every dependency property whose target is registered.
#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentResolver;

impl Resolver for ComponentResolver {
    fn resolve<C>(&self, injector: &dyn Injector, context: &CallContext<'_>) -> Result<C, InjectorError>
    where
        C: Component,
    {
        let mut component = match C::construct(injector) {
            Ok(Ok(component)) => component,
            Ok(Err(err)) => {
                return Err(InjectorError::ObjectConstruction {
                    key: *context.key(),
                    source: Arc::from(err.into()),
                })
            }
            Err(err) => return Err(err),
        };

        for property in C::properties() {
            property.wire(&mut component, injector)?;
        }
        Ok(component)
    }
}
