//! Reference policy: expand a type occurrence in place, or point at it.
//!
//! Inlining everything blows documentation up (every `React.ReactNode` would
//! be expanded into the whole React type graph); inlining nothing leaves it
//! empty. The rules below are evaluated in order:
//!
//! 1. **Separate projects.** The enclosing node was recorded as first-party,
//!    the occurrence is declared in dependency code, and its type arguments
//!    (if any) are dependency code too: the whole occurrence is external. It
//!    becomes a bare reference, or a `Generic` over its alias arguments.
//! 2. **In flight.** The occurrence is already being expanded further up the
//!    stack: reference it to break the cycle.
//! 3. **Named elsewhere.** With no type arguments at any level (own, alias or
//!    syntactic), reference occurrences that are locally exported (except the
//!    root being documented), declared in another first-party file, or
//!    exported from dependency code.
//!
//! The decision itself is pure; the resolver acts on it.

use crate::metadata::SymbolMetadata;

/// Why an occurrence is referenced rather than expanded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceReason {
    /// Already being expanded by an enclosing call.
    InFlight,
    /// Exported from the current module and not the root occurrence.
    LocalExport,
    /// Declared in a different first-party file.
    ExternalSource,
    /// Exported from dependency code.
    Vendor,
}

impl ReferenceReason {
    /// Whether the occurrence is probed for object shape before referencing.
    ///
    /// In-flight occurrences are never probed: their expansion is what is
    /// currently running.
    pub fn probes(self) -> bool {
        !matches!(self, ReferenceReason::InFlight)
    }
}

/// Outcome of the reference policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceDecision {
    /// Expand the occurrence.
    Expand,
    /// Dependency code seen from first-party code. `generic` is set when the
    /// occurrence carries alias type arguments worth resolving.
    External { generic: bool },
    /// Emit a reference descriptor.
    Reference(ReferenceReason),
}

/// Facts the policy decides on.
#[derive(Clone, Debug)]
pub struct ReferenceQuery<'m> {
    pub metadata: &'m SymbolMetadata,
    /// Classification recorded for the enclosing node, if any.
    pub enclosing_metadata: Option<&'m SymbolMetadata>,
    pub has_symbol: bool,
    pub has_enclosing: bool,
    pub is_primitive: bool,
    /// The occurrence being documented, as opposed to a nested one.
    pub is_root: bool,
    pub in_flight: bool,
    pub type_arguments: usize,
    /// Every own type argument is declared in dependency code.
    pub type_arguments_in_vendor: bool,
    pub alias_type_arguments: usize,
    /// Type arguments written on the enclosing alias or property signature.
    pub syntactic_type_arguments: usize,
}

impl ReferenceQuery<'_> {
    fn has_no_type_arguments(&self) -> bool {
        self.type_arguments == 0
            && self.alias_type_arguments == 0
            && self.syntactic_type_arguments == 0
    }

    fn in_separate_projects(&self) -> bool {
        self.has_symbol
            && self.has_enclosing
            && !self.is_primitive
            && self
                .enclosing_metadata
                .is_some_and(|enclosing| !enclosing.is_in_node_modules)
            && self.metadata.is_in_node_modules
            && (self.type_arguments == 0 || self.type_arguments_in_vendor)
    }
}

/// Apply the reference policy.
pub fn decide(query: &ReferenceQuery<'_>) -> ReferenceDecision {
    if query.in_separate_projects() {
        return ReferenceDecision::External {
            generic: query.alias_type_arguments > 0,
        };
    }

    if query.in_flight {
        return ReferenceDecision::Reference(ReferenceReason::InFlight);
    }

    if !query.has_no_type_arguments() {
        return ReferenceDecision::Expand;
    }

    let metadata = query.metadata;

    if !query.is_root
        && !metadata.is_in_node_modules
        && !metadata.is_external
        && metadata.is_exported
    {
        return ReferenceDecision::Reference(ReferenceReason::LocalExport);
    }
    if metadata.is_external && !metadata.is_in_node_modules {
        return ReferenceDecision::Reference(ReferenceReason::ExternalSource);
    }
    if metadata.is_in_node_modules && !metadata.is_global {
        return ReferenceDecision::Reference(ReferenceReason::Vendor);
    }

    ReferenceDecision::Expand
}

#[cfg(test)]
#[path = "tests/reference_tests.rs"]
mod tests;
