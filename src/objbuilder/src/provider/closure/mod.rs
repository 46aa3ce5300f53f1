mod closure_implementation;
mod wrapper;

use crate::container::injector::{Injector, InjectorError};
use crate::provider::Descriptor;

pub use wrapper::ClosureProvider;

/// A creator which can be called by supplying arguments retrieved from an
/// [`Injector`].
///
/// Closures of `Fn() -> T` are the canonical creators. Closures of
/// `Fn(Arc<D1>, Arc<D2>, ...) -> T` are [`Closure`]s as well, whose arguments
/// are built from the scope that requested `T`. Due to the lack of support
/// for functions of variable length parameters, [`Closure`] is only
/// implemented by functions whose arity is at most 8.
///
/// Usually you don't need to use a [`Closure`] directly. Pass it to
/// `configure_with` instead.
pub trait Closure<D>
where
    Self: Send + Sync + 'static,
    D: Send + Sync + 'static,
{
    /// The constructed object.
    type Constructed: Descriptor;

    /// Retrieves the dependencies from the injector and calls `self` with
    /// these dependencies.
    ///
    /// # Errors
    ///
    /// Returns an error if some dependencies can't be built.
    fn run(&self, injector: &dyn Injector) -> Result<Self::Constructed, InjectorError>;
}
