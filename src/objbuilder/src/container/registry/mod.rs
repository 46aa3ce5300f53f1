mod registration_map;

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use snafu::prelude::*;

use crate::container::ScopeId;

pub(crate) use registration_map::{Registration, RegistrationMap};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum RegistryError {
    #[snafu(display("{value} is not a recognized dependency lifecycle"))]
    #[non_exhaustive]
    InvalidLifecycleKind { value: String },
    #[snafu(display("property {property} is not found on the component {component}"))]
    #[non_exhaustive]
    PropertyNotFound {
        component: &'static str,
        property: String,
    },
    #[snafu(display(
        "property {property} of the component {component} expects a value of {expected}, but {found} is given"
    ))]
    #[non_exhaustive]
    TypeMismatch {
        component: &'static str,
        property: String,
        expected: &'static str,
        found: &'static str,
    },
    #[snafu(display("{operation} is not supported by a child container"))]
    #[non_exhaustive]
    NotSupported { operation: &'static str },
    #[snafu(display("could not open a child scope of the disposed {scope}"))]
    #[non_exhaustive]
    ScopeDisposed { scope: ScopeId },
    #[snafu(display("module {module} fails to setup the configuration"))]
    #[non_exhaustive]
    ModuleInner {
        module: &'static str,
        source: Box<dyn Error + Send + Sync>,
    },
    #[snafu(display("aggregated registry errors:\n{}", AggregatedDisplayer::new(errors)))]
    Aggregated { errors: Vec<RegistryError> },
}

struct AggregatedDisplayer<'a> {
    errors: &'a [RegistryError],
}

impl<'a> AggregatedDisplayer<'a> {
    fn new(errors: &'a [RegistryError]) -> Self {
        Self { errors }
    }
}

impl Display for AggregatedDisplayer<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (i, error) in self.errors.iter().enumerate() {
            writeln!(f, "{:4}: {}", i + 1, error)?;
        }
        Ok(())
    }
}
