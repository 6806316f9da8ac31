//! Resolver configuration.

use serde::{Deserialize, Serialize};
use typeshape_common::limits;

use crate::component::NamingConvention;
use crate::recursion::ExpansionLimits;

/// Tunables for a [`TypeResolver`](crate::TypeResolver).
///
/// Deserializes from the camelCase keys used in `typeshape.json`; missing keys
/// take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverOptions {
    /// Return type texts that mark a callable as a component.
    pub component_return_types: Vec<String>,
    /// Return type suffix that marks a callable as a component.
    pub component_return_suffix: String,
    /// Maximum nesting of guarded expansions.
    pub max_depth: u32,
    /// Maximum guarded expansions per request.
    pub max_iterations: u32,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        let convention = NamingConvention::default();
        Self {
            component_return_types: convention.return_types,
            component_return_suffix: convention.return_suffix,
            max_depth: limits::MAX_RESOLVE_DEPTH,
            max_iterations: limits::MAX_RESOLVE_ITERATIONS,
        }
    }
}

impl ResolverOptions {
    pub fn naming_convention(&self) -> NamingConvention {
        NamingConvention {
            return_types: self.component_return_types.clone(),
            return_suffix: self.component_return_suffix.clone(),
        }
    }

    pub fn expansion_limits(&self) -> ExpansionLimits {
        ExpansionLimits::new(self.max_depth, self.max_iterations)
    }
}
