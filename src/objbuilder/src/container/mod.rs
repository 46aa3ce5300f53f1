pub mod injector;
pub mod registry;

mod builder;
mod core;
mod handle;

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::util::any::AsAny;

pub use builder::ObjectBuilder;
pub use handle::{ChildContainer, Container};

pub trait Managed: AsAny + Send + Sync + 'static {}

impl<T> Managed for T where T: AsAny + Send + Sync + 'static {}

/// A type-erased shared instance, which is always some `Arc<T>`.
pub trait SharedManaged: Managed {
    fn dyn_clone(&self) -> Box<dyn SharedManaged>;
}

impl<T> SharedManaged for Arc<T>
where
    T: Send + Sync + ?Sized + 'static,
{
    fn dyn_clone(&self) -> Box<dyn SharedManaged> {
        Box::new(Arc::clone(self))
    }
}

/// An opaque handle distinguishing the root scope from the child scopes
/// created from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

impl ScopeId {
    pub(crate) const ROOT: Self = Self(0);

    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl Display for ScopeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_root() {
            write!(f, "root scope")
        } else {
            write!(f, "scope #{}", self.0)
        }
    }
}
