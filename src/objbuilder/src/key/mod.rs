use std::any::{self, TypeId};
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};

/// The identifier under which a component is registered and requested.
///
/// A [`Key`] is the identity of a type. Concrete components are keyed by
/// their own type, while contracts are keyed by trait object types such as
/// `dyn Handler`, which is how a component becomes discoverable through
/// collection lookups.
#[derive(Clone, Copy)]
pub struct Key {
    target: TypeId,
    type_name: &'static str,
}

impl Key {
    /// Creates the key identifying `T`.
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            target: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of the identified type.
    pub fn target(&self) -> TypeId {
        self.target
    }

    /// Returns the name of the identified type, for diagnostics only.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl Debug for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(self, f)
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.type_name)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
    }
}

/// Shorthand for [`Key::of`].
pub fn of<T>() -> Key
where
    T: ?Sized + 'static,
{
    Key::of::<T>()
}
