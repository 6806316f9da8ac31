//! Symbol classification.
//!
//! Every type occurrence is classified before the resolver decides whether to
//! expand it. Classification only reads declaration-level facts (export
//! markers, source files), so it is cheap enough to run on every occurrence.

use crate::oracle::{Modifiers, NodeId, NodeKind, SymbolId, TypeOracle};

/// Facts about the symbol behind a type occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolMetadata {
    /// The documented name, if one applies.
    pub name: Option<String>,
    /// The declaration is exported from its module.
    pub is_exported: bool,
    /// Declared in a different first-party file than the enclosing node.
    pub is_external: bool,
    /// Declared in dependency code.
    pub is_in_node_modules: bool,
    /// Dependency code that is not exported: an ambient global.
    pub is_global: bool,
    /// No symbol at all (compiler-synthesized types).
    pub is_virtual: bool,
}

impl SymbolMetadata {
    /// Metadata for an occurrence without any symbol.
    pub fn virtual_symbol() -> Self {
        Self {
            is_virtual: true,
            ..Self::default()
        }
    }

    /// Classify `symbol` as seen from `enclosing`.
    pub fn classify<O: TypeOracle + ?Sized>(
        oracle: &O,
        symbol: Option<SymbolId>,
        enclosing: Option<NodeId>,
    ) -> Self {
        let Some(symbol) = symbol else {
            return Self::virtual_symbol();
        };

        let Some(declaration) = oracle.symbol_declarations(symbol).first().copied() else {
            return Self::default();
        };

        let declaration_file = oracle.node_source_file(declaration);
        let enclosing_kind = enclosing.map(|node| oracle.node_kind(node));
        let enclosing_is_variable = enclosing_kind == Some(NodeKind::VariableDeclaration);
        let value_is_variable = oracle
            .value_declaration(symbol)
            .is_some_and(|node| oracle.node_kind(node) == NodeKind::VariableDeclaration);

        // Variables take their documented name from the binding that encloses
        // the occurrence; apparent names like `String` are never used for them.
        let name = if value_is_variable || enclosing_is_variable {
            match enclosing {
                Some(node) if enclosing_is_variable && node != declaration => {
                    oracle.node_name(node)
                }
                _ => None,
            }
        } else {
            Some(oracle.symbol_name(symbol))
        };
        let name = name.filter(|name| !is_synthetic_name(name));

        let is_exported =
            enclosing != Some(declaration) && is_declaration_exported(oracle, declaration);

        let is_external = enclosing.is_some_and(|node| {
            let enclosing_file = oracle.node_source_file(node);
            !oracle.is_vendor_file(enclosing_file) && enclosing_file != declaration_file
        });

        let is_in_node_modules = oracle.is_vendor_file(declaration_file);

        Self {
            name,
            is_exported,
            is_external,
            is_in_node_modules,
            is_global: is_in_node_modules && !is_exported,
            is_virtual: false,
        }
    }
}

/// Compiler placeholders such as `__type`, `__call` or `__0`.
pub(crate) fn is_synthetic_name(name: &str) -> bool {
    name.starts_with("__")
}

fn is_declaration_exported<O: TypeOracle + ?Sized>(oracle: &O, declaration: NodeId) -> bool {
    if oracle.node_kind(declaration).is_exportable() {
        return oracle.node_modifiers(declaration).contains(Modifiers::EXPORT);
    }

    // `export const fn = () => {}`: the arrow function itself is not
    // exportable, its variable declaration is.
    oracle.node_parent(declaration).is_some_and(|parent| {
        oracle.node_kind(parent) == NodeKind::VariableDeclaration
            && oracle.node_modifiers(parent).contains(Modifiers::EXPORT)
    })
}

/// Predicate deciding whether a symbol's subtree is documented at all.
pub type SymbolFilter<'f> = &'f dyn Fn(&SymbolMetadata) -> bool;

/// The default filter: exclude dependency code.
pub fn exclude_node_modules(metadata: &SymbolMetadata) -> bool {
    !metadata.is_in_node_modules
}

/// A filter that documents everything, vendor code included.
pub fn include_all(_: &SymbolMetadata) -> bool {
    true
}

#[cfg(test)]
#[path = "tests/metadata_tests.rs"]
mod tests;
