use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::container::registry::RegistryError;

/// A policy that specifies how instances of a component are shared.
///
/// The numeric values match the ones used by hosts that pass lifecycles as
/// plain integers, see [`Lifecycle::try_from`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// One instance is created on first request and shared by the root scope
    /// and all child scopes until the container is disposed.
    SingleInstance = 0,
    /// One instance is shared within a single scope, i.e. a unit of work, and
    /// released when that scope is disposed.
    InstancePerUnitOfWork = 1,
    /// A new instance is created on every request and never tracked.
    InstancePerCall = 2,
}

impl Lifecycle {
    /// Returns the name of the lifecycle in a string literal.
    pub fn to_str(&self) -> &'static str {
        match self {
            Self::SingleInstance => "SingleInstance",
            Self::InstancePerUnitOfWork => "InstancePerUnitOfWork",
            Self::InstancePerCall => "InstancePerCall",
        }
    }
}

impl Display for Lifecycle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Lifecycle {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SingleInstance" => Ok(Self::SingleInstance),
            "InstancePerUnitOfWork" => Ok(Self::InstancePerUnitOfWork),
            "InstancePerCall" => Ok(Self::InstancePerCall),
            _ => Err(RegistryError::InvalidLifecycleKind {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<i32> for Lifecycle {
    type Error = RegistryError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::SingleInstance),
            1 => Ok(Self::InstancePerUnitOfWork),
            2 => Ok(Self::InstancePerCall),
            _ => Err(RegistryError::InvalidLifecycleKind {
                value: value.to_string(),
            }),
        }
    }
}

/// A value that can be interpreted as a [`Lifecycle`] at configuration time.
///
/// Hosts often carry lifecycles around as names or integers. Every
/// configuration operation accepts any [`ToLifecycle`] and rejects
/// unrecognized values with [`RegistryError::InvalidLifecycleKind`] before
/// touching the registry.
#[allow(private_bounds)]
pub trait ToLifecycle: Sealed {
    fn to_lifecycle(self) -> Result<Lifecycle, RegistryError>;
}

trait Sealed {}

impl Sealed for Lifecycle {}

impl Sealed for &str {}

impl Sealed for String {}

impl Sealed for i32 {}

impl ToLifecycle for Lifecycle {
    fn to_lifecycle(self) -> Result<Lifecycle, RegistryError> {
        Ok(self)
    }
}

impl ToLifecycle for &str {
    fn to_lifecycle(self) -> Result<Lifecycle, RegistryError> {
        self.parse()
    }
}

impl ToLifecycle for String {
    fn to_lifecycle(self) -> Result<Lifecycle, RegistryError> {
        self.parse()
    }
}

impl ToLifecycle for i32 {
    fn to_lifecycle(self) -> Result<Lifecycle, RegistryError> {
        Lifecycle::try_from(self)
    }
}
