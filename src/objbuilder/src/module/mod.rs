use std::any;
use std::error::Error;

use crate::container::registry::RegistryError;
use crate::container::Container;
use crate::provider::{ComponentResolver, Resolver};

/// A unit of startup configuration.
///
/// ```rust
/// # use std::error::Error;
/// # use std::sync::Arc;
/// # use objbuilder::prelude::*;
/// struct Settings;
///
/// impl Module for Settings {
///     fn configure(&self, container: &Container) -> Result<(), Box<dyn Error + Send + Sync>> {
///         container.register_singleton(Arc::new(String::from("localhost:5672")))?;
///         Ok(())
///     }
/// }
///
/// let container = Container::init(Settings).unwrap();
/// assert_eq!(container.build::<String>().unwrap().as_str(), "localhost:5672");
/// ```
pub trait Module<R = ComponentResolver>: 'static
where
    R: Resolver,
{
    /// Runs [`Module::configure`] and records its failure.
    fn setup(&self, container: &Container<R>, errors: &mut Vec<RegistryError>) {
        if let Err(err) = self.configure(container) {
            errors.push(RegistryError::ModuleInner {
                module: any::type_name::<Self>(),
                source: err,
            });
        }
    }

    fn configure(&self, container: &Container<R>) -> Result<(), Box<dyn Error + Send + Sync>>;
}

/// A composition of [`Module`]s, run in the order they are added.
pub struct Configuration<R = ComponentResolver>
where
    R: Resolver,
{
    modules: Vec<Box<dyn Module<R>>>,
}

impl<R> Configuration<R>
where
    R: Resolver,
{
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
        }
    }

    pub fn with<M: Module<R>>(mut self, module: M) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn compose(mut self, mut other: Configuration<R>) -> Self {
        self.modules.append(&mut other.modules);
        self
    }
}

impl<R> Default for Configuration<R>
where
    R: Resolver,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Module<R> for Configuration<R>
where
    R: Resolver,
{
    fn setup(&self, container: &Container<R>, errors: &mut Vec<RegistryError>) {
        for module in &self.modules {
            module.setup(container, errors);
        }
    }

    fn configure(&self, container: &Container<R>) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut errors = Vec::new();
        self.setup(container, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Box::new(RegistryError::Aggregated { errors }))
        }
    }
}
