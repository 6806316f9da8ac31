//! Component detection.
//!
//! Whether a callable is a UI component cannot be read off the type system.
//! It is a naming and shape convention, so it is modelled as a policy: the
//! resolver asks a [`ComponentPolicy`] whether to relabel a `Function`
//! descriptor as a `Component`.

use crate::context::ObjectReferences;
use crate::types::{FunctionSignature, TypeKind};

/// Decides whether a resolved callable is a component.
pub trait ComponentPolicy {
    /// `name` is the documented name of the callable; `object_references`
    /// holds the references known to point at object-shaped declarations.
    fn is_component(
        &self,
        name: Option<&str>,
        signatures: &[FunctionSignature],
        object_references: &ObjectReferences,
    ) -> bool;
}

/// The default convention: a capitalized name, and every signature either
/// returns a UI node or takes a single object-shaped props parameter.
///
/// This is best-effort. A capitalized factory that takes one options object
/// is reported as a component too.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamingConvention {
    /// Return type texts that mark a component (`ReactNode`).
    pub return_types: Vec<String>,
    /// Return type suffix that marks a component (`Element`, as in `JSX.Element`).
    pub return_suffix: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            return_types: vec!["ReactNode".to_string()],
            return_suffix: "Element".to_string(),
        }
    }
}

impl NamingConvention {
    fn returns_ui_node(&self, return_type: &str) -> bool {
        self.return_types.iter().any(|sentinel| sentinel == return_type)
            || (!self.return_suffix.is_empty() && return_type.ends_with(&self.return_suffix))
    }
}

impl ComponentPolicy for NamingConvention {
    fn is_component(
        &self,
        name: Option<&str>,
        signatures: &[FunctionSignature],
        object_references: &ObjectReferences,
    ) -> bool {
        let Some(name) = name else {
            return false;
        };
        if !name.starts_with(|c: char| c.is_ascii_uppercase()) || signatures.is_empty() {
            return false;
        }

        signatures.iter().all(|signature| {
            if self.returns_ui_node(&signature.return_type) {
                return true;
            }
            let [props] = signature.parameters.as_slice() else {
                return false;
            };
            match &props.kind {
                TypeKind::Object { .. } => true,
                TypeKind::Union { members } => members.iter().all(|member| member.is_object()),
                TypeKind::Reference => object_references.contains(props),
                _ => false,
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/component_policy_tests.rs"]
mod tests;
