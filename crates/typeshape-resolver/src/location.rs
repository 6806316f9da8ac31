//! Declaration locations.

use typeshape_common::relative_to_root;

use crate::oracle::{NodeId, TypeOracle};
use crate::resolve::TypeResolver;
use crate::types::DeclarationLocation;

impl<O: TypeOracle + ?Sized> TypeResolver<'_, O> {
    /// Project-relative location of `node`.
    pub(crate) fn declaration_location(&mut self, node: NodeId) -> DeclarationLocation {
        let oracle = self.oracle;
        let root = self.project_root();
        let file_path = oracle.file_path(oracle.node_source_file(node));

        DeclarationLocation {
            file_path: relative_to_root(&file_path, &root),
            position: oracle.node_span(node),
        }
    }

    /// Location reported for an occurrence.
    ///
    /// Members (variables, properties, parameters, accessors) point at
    /// themselves so that two properties of the same type stay
    /// distinguishable; everything else points at the type's declaration.
    pub(crate) fn occurrence_location(
        &mut self,
        enclosing: Option<NodeId>,
        declaration: Option<NodeId>,
    ) -> Option<DeclarationLocation> {
        let declaration = declaration?;
        let node = match enclosing {
            Some(node) if self.oracle.node_kind(node).is_member() => node,
            _ => declaration,
        };
        Some(self.declaration_location(node))
    }

    fn project_root(&mut self) -> String {
        let oracle = self.oracle;
        self.context
            .project_root
            .get_or_insert_with(|| oracle.project_directory())
            .clone()
    }
}
