mod resolver;
mod wrapper;

use std::error::Error;

use crate::container::injector::{InjectorError, TypedInjector};
use crate::provider::Descriptor;

pub use resolver::{ComponentResolver, Resolver};
pub use wrapper::ComponentProvider;

/// A type that has a dedicated constructor for dependency injection.
///
/// Usually, you don't need to implement the [`Component`] trait manually for
/// your components, because the [`component`] macro helps with this. In case
/// that you really want to write implementation in your own, take a look at
/// the following code snippet:
///
/// ```rust
/// # use std::sync::Arc;
/// # use std::convert::Infallible;
/// # use objbuilder::container::injector::{TypedInjector, InjectorError};
/// # use objbuilder::provider::{Component, Descriptor, Property};
/// #
/// struct Mailer {
///     transport: Arc<str>,
///     sender: String,
/// }
///
/// impl Mailer {
///     fn set_sender(&mut self, sender: String) {
///         self.sender = sender;
///     }
/// }
///
/// impl Descriptor for Mailer {
///     fn properties() -> Vec<Property<Self>> {
///         vec![Property::value("sender", Mailer::set_sender)]
///     }
/// }
///
/// impl Component for Mailer {
///     type Error = Infallible;
///
///     fn construct<I>(injector: &I) -> Result<Result<Self, Self::Error>, InjectorError>
///     where
///         I: TypedInjector + ?Sized
///     {
///         let transport = injector.get::<str>()?;
///         Ok(Ok(Self { transport, sender: String::new() }))
///     }
/// }
/// ```
///
/// [`component`]: crate::component
pub trait Component: Descriptor {
    /// The error occurred in object construction after all dependencies are
    /// retrieved.
    type Error: Into<Box<dyn Error + Send + Sync>>;

    /// Retrieves the dependencies from the injector and creates the object.
    ///
    /// # Errors
    ///
    /// Returns an error if some dependencies can't be built.
    ///
    /// Returns an inner error [`Component::Error`] wrapped in the outer [`Ok`]
    /// if the object construction fails.
    fn construct<I>(injector: &I) -> Result<Result<Self, Self::Error>, InjectorError>
    where
        I: TypedInjector + ?Sized;
}
