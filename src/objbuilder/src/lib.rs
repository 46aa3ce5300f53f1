#![allow(clippy::new_without_default)]

pub mod container;
pub mod key;
pub mod lifecycle;
pub mod module;
pub mod provider;
mod util;

pub use objbuilder_derive::component;

pub mod prelude {
    pub use crate::component;
    pub use crate::container::injector::{InjectorError, TypedInjector};
    pub use crate::container::registry::RegistryError;
    pub use crate::container::{ChildContainer, Container, ObjectBuilder};
    pub use crate::key;
    pub use crate::lifecycle::Lifecycle;
    pub use crate::module::{Configuration, Module};
    pub use crate::provider::{Component, Descriptor, Dispose, Interfaces, Property};
}
