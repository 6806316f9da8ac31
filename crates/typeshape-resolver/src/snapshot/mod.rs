//! In-memory program snapshots.
//!
//! A [`ProgramSnapshot`] is a serialized dump of the oracle answers for one
//! program: dense tables of types, symbols, nodes, signatures and files
//! indexed by their handles, plus the list of exported declarations to
//! document. Host compilers export snapshots as JSON; tests build them with
//! [`SnapshotBuilder`].
//!
//! Snapshots are validated once when they are loaded or built. Lookups after
//! that index the tables directly; the tables are private so a validated
//! snapshot cannot be edited into an inconsistent one.

mod builder;

pub use builder::{FunctionHandles, SnapshotBuilder};

use serde::{Deserialize, Serialize};
use typeshape_common::{Span, is_vendor_path};

use crate::oracle::{
    EnumMemberValue, FileId, JsDoc, LiteralValue, Modifiers, NodeId, NodeKind, SignatureId,
    SymbolId, TypeFlags, TypeFormat, TypeId, TypeOracle,
};

/// A source file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub path: String,
    /// Overrides the `node_modules` path check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<bool>,
}

/// An interned type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeData {
    pub flags: TypeFlags,
    pub text: String,
    /// Text in signature format, when it differs from `text`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_symbol: Option<SymbolId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apparent: Option<TypeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<TypeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alias_type_arguments: Vec<TypeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<TypeId>,
    /// Union or intersection constituents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<TypeId>,
    /// Tuple element types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<TypeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<SignatureId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<SymbolId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub literal: Option<LiteralValue>,
}

/// A symbol.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub declarations: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_declaration: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The symbol's type. Defaults to the type of its first declaration.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeId>,
}

/// An enum member and its computed value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnumMemberData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<EnumMemberValue>,
}

/// A syntax node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub kind: NodeKind,
    pub file: FileId,
    #[serde(default)]
    pub span: Span,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Modifiers::is_empty")]
    pub modifiers: Modifiers,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_annotation: Option<NodeId>,
    /// Type arguments of a type reference node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<NodeId>,
    /// Referenced name of a type reference node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Constituents of an intersection type node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_nodes: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureId>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub const_assertion: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    /// Defaults-object key when it is not the node's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<JsDoc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_members: Vec<EnumMemberData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<NodeId>,
}

/// A call or construct signature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<SymbolId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    pub return_type: TypeId,
}

/// An exported declaration to document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportData {
    pub name: String,
    pub node: NodeId,
}

/// Oracle answers for one program.
///
/// The tables are only reachable through [`TypeOracle`] once validated, so
/// every handle stored in them resolves. Handles supplied by a caller are
/// checked by the resolver's entry points.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSnapshot {
    /// Project directory that file paths are reported relative to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(default)]
    files: Vec<FileData>,
    #[serde(default)]
    types: Vec<TypeData>,
    #[serde(default)]
    symbols: Vec<SymbolData>,
    #[serde(default)]
    nodes: Vec<NodeData>,
    #[serde(default)]
    signatures: Vec<SignatureData>,
    #[serde(default)]
    exports: Vec<ExportData>,
}

/// A snapshot that cannot be served as an oracle.
#[derive(Debug)]
pub enum SnapshotError {
    /// A handle points outside its table.
    DanglingHandle {
        table: &'static str,
        index: u32,
        referenced_from: String,
    },
    /// Two exports share a name.
    DuplicateExport(String),
    /// An export was requested that the snapshot does not list.
    UnknownExport(String),
    /// The snapshot is not valid JSON for this format.
    Parse(serde_json::Error),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::DanglingHandle {
                table,
                index,
                referenced_from,
            } => write!(
                f,
                "{referenced_from} references {table}[{index}], which does not exist"
            ),
            SnapshotError::DuplicateExport(name) => {
                write!(f, "export \"{name}\" is listed more than once")
            }
            SnapshotError::UnknownExport(name) => {
                write!(f, "snapshot has no export named \"{name}\"")
            }
            SnapshotError::Parse(err) => write!(f, "invalid snapshot: {err}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl ProgramSnapshot {
    /// Parse and validate a JSON snapshot.
    pub fn from_json(source: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(source).map_err(SnapshotError::Parse)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Exported declarations in snapshot order.
    pub fn exports(&self) -> &[ExportData] {
        &self.exports
    }

    /// Look up an export by name.
    pub fn export(&self, name: &str) -> Result<&ExportData, SnapshotError> {
        self.exports
            .iter()
            .find(|export| export.name == name)
            .ok_or_else(|| SnapshotError::UnknownExport(name.to_string()))
    }

    /// Check that every handle resolves and export names are unique.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let checker = HandleChecker { snapshot: self };

        for (index, ty) in self.types.iter().enumerate() {
            let owner = || format!("types[{index}]");
            checker.symbols(ty.symbol.iter().chain(&ty.alias_symbol), &owner)?;
            checker.symbols(&ty.properties, &owner)?;
            checker.types(
                ty.apparent
                    .iter()
                    .chain(&ty.element)
                    .chain(&ty.type_arguments)
                    .chain(&ty.alias_type_arguments)
                    .chain(&ty.members)
                    .chain(&ty.elements),
                &owner,
            )?;
            checker.signatures(&ty.signatures, &owner)?;
        }

        for (index, symbol) in self.symbols.iter().enumerate() {
            let owner = || format!("symbols[{index}] ({})", symbol.name);
            checker.nodes(symbol.declarations.iter().chain(&symbol.value_declaration), &owner)?;
            checker.types(&symbol.ty, &owner)?;
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let owner = || format!("nodes[{index}]");
            checker.file(node.file, &owner)?;
            checker.nodes(
                node.parent
                    .iter()
                    .chain(&node.type_annotation)
                    .chain(&node.type_arguments)
                    .chain(&node.type_nodes)
                    .chain(&node.constructors)
                    .chain(&node.members),
                &owner,
            )?;
            checker.types(&node.ty, &owner)?;
            checker.signatures(&node.signature, &owner)?;
        }

        for (index, signature) in self.signatures.iter().enumerate() {
            let owner = || format!("signatures[{index}]");
            checker.nodes(&signature.declaration, &owner)?;
            checker.symbols(&signature.parameters, &owner)?;
            checker.types([&signature.return_type], &owner)?;
        }

        let mut seen = rustc_hash::FxHashSet::default();
        for export in &self.exports {
            checker.nodes([&export.node], &|| format!("export {}", export.name))?;
            if !seen.insert(export.name.as_str()) {
                return Err(SnapshotError::DuplicateExport(export.name.clone()));
            }
        }

        Ok(())
    }

    pub fn contains_type(&self, ty: TypeId) -> bool {
        ty.index() < self.types.len()
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        node.index() < self.nodes.len()
    }

    pub fn contains_signature(&self, signature: SignatureId) -> bool {
        signature.index() < self.signatures.len()
    }

    fn ty(&self, ty: TypeId) -> &TypeData {
        &self.types[ty.index()]
    }

    fn symbol(&self, symbol: SymbolId) -> &SymbolData {
        &self.symbols[symbol.index()]
    }

    fn node(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.index()]
    }

    fn signature(&self, signature: SignatureId) -> &SignatureData {
        &self.signatures[signature.index()]
    }
}

struct HandleChecker<'s> {
    snapshot: &'s ProgramSnapshot,
}

impl HandleChecker<'_> {
    fn check(
        &self,
        table: &'static str,
        len: usize,
        index: u32,
        owner: &dyn Fn() -> String,
    ) -> Result<(), SnapshotError> {
        if (index as usize) < len {
            Ok(())
        } else {
            Err(SnapshotError::DanglingHandle {
                table,
                index,
                referenced_from: owner(),
            })
        }
    }

    fn types<'h>(
        &self,
        handles: impl IntoIterator<Item = &'h TypeId>,
        owner: &dyn Fn() -> String,
    ) -> Result<(), SnapshotError> {
        let len = self.snapshot.types.len();
        handles
            .into_iter()
            .try_for_each(|handle| self.check("types", len, handle.0, owner))
    }

    fn symbols<'h>(
        &self,
        handles: impl IntoIterator<Item = &'h SymbolId>,
        owner: &dyn Fn() -> String,
    ) -> Result<(), SnapshotError> {
        let len = self.snapshot.symbols.len();
        handles
            .into_iter()
            .try_for_each(|handle| self.check("symbols", len, handle.0, owner))
    }

    fn nodes<'h>(
        &self,
        handles: impl IntoIterator<Item = &'h NodeId>,
        owner: &dyn Fn() -> String,
    ) -> Result<(), SnapshotError> {
        let len = self.snapshot.nodes.len();
        handles
            .into_iter()
            .try_for_each(|handle| self.check("nodes", len, handle.0, owner))
    }

    fn signatures<'h>(
        &self,
        handles: impl IntoIterator<Item = &'h SignatureId>,
        owner: &dyn Fn() -> String,
    ) -> Result<(), SnapshotError> {
        let len = self.snapshot.signatures.len();
        handles
            .into_iter()
            .try_for_each(|handle| self.check("signatures", len, handle.0, owner))
    }

    fn file(&self, file: FileId, owner: &dyn Fn() -> String) -> Result<(), SnapshotError> {
        self.check("files", self.snapshot.files.len(), file.0, owner)
    }
}

impl TypeOracle for ProgramSnapshot {
    fn type_flags(&self, ty: TypeId) -> TypeFlags {
        self.ty(ty).flags
    }

    fn type_text(&self, ty: TypeId, _enclosing: Option<NodeId>, format: TypeFormat) -> String {
        let data = self.ty(ty);
        match (format, &data.signature_text) {
            (TypeFormat::Signature, Some(text)) => text.clone(),
            _ => data.text.clone(),
        }
    }

    fn type_symbol(&self, ty: TypeId) -> Option<SymbolId> {
        self.ty(ty).symbol
    }

    fn alias_symbol(&self, ty: TypeId) -> Option<SymbolId> {
        self.ty(ty).alias_symbol
    }

    fn apparent_type(&self, ty: TypeId) -> TypeId {
        self.ty(ty).apparent.unwrap_or(ty)
    }

    fn type_arguments(&self, ty: TypeId) -> Vec<TypeId> {
        self.ty(ty).type_arguments.clone()
    }

    fn alias_type_arguments(&self, ty: TypeId) -> Vec<TypeId> {
        self.ty(ty).alias_type_arguments.clone()
    }

    fn array_element_type(&self, ty: TypeId) -> Option<TypeId> {
        self.ty(ty).element
    }

    fn union_members(&self, ty: TypeId) -> Vec<TypeId> {
        let data = self.ty(ty);
        if data.flags.contains(TypeFlags::UNION) {
            data.members.clone()
        } else {
            Vec::new()
        }
    }

    fn intersection_members(&self, ty: TypeId) -> Vec<TypeId> {
        let data = self.ty(ty);
        if data.flags.contains(TypeFlags::INTERSECTION) {
            data.members.clone()
        } else {
            Vec::new()
        }
    }

    fn tuple_elements(&self, ty: TypeId) -> Vec<TypeId> {
        self.ty(ty).elements.clone()
    }

    fn call_signatures(&self, ty: TypeId) -> Vec<SignatureId> {
        self.ty(ty).signatures.clone()
    }

    fn apparent_properties(&self, ty: TypeId) -> Vec<SymbolId> {
        self.ty(ty).properties.clone()
    }

    fn literal_value(&self, ty: TypeId) -> Option<LiteralValue> {
        self.ty(ty).literal.clone()
    }

    fn symbol_name(&self, symbol: SymbolId) -> String {
        self.symbol(symbol).name.clone()
    }

    fn symbol_declarations(&self, symbol: SymbolId) -> Vec<NodeId> {
        self.symbol(symbol).declarations.clone()
    }

    fn value_declaration(&self, symbol: SymbolId) -> Option<NodeId> {
        self.symbol(symbol).value_declaration
    }

    fn symbol_description(&self, symbol: SymbolId) -> Option<String> {
        self.symbol(symbol).description.clone()
    }

    fn type_of_symbol_at(&self, symbol: SymbolId, _location: NodeId) -> Option<TypeId> {
        let data = self.symbol(symbol);
        data.ty.or_else(|| {
            data.declarations
                .first()
                .and_then(|declaration| self.node(*declaration).ty)
        })
    }

    fn node_kind(&self, node: NodeId) -> NodeKind {
        self.node(node).kind
    }

    fn node_name(&self, node: NodeId) -> Option<String> {
        self.node(node).name.clone()
    }

    fn node_text(&self, node: NodeId) -> String {
        self.node(node).text.clone()
    }

    fn node_parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    fn node_modifiers(&self, node: NodeId) -> Modifiers {
        self.node(node).modifiers
    }

    fn node_source_file(&self, node: NodeId) -> FileId {
        self.node(node).file
    }

    fn node_span(&self, node: NodeId) -> Span {
        self.node(node).span
    }

    fn type_of_node(&self, node: NodeId) -> Option<TypeId> {
        self.node(node).ty
    }

    fn type_annotation(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).type_annotation
    }

    fn type_reference_arguments(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).type_arguments.clone()
    }

    fn type_reference_name(&self, node: NodeId) -> Option<String> {
        self.node(node).type_name.clone()
    }

    fn intersection_type_nodes(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).type_nodes.clone()
    }

    fn node_signature(&self, node: NodeId) -> Option<SignatureId> {
        self.node(node).signature
    }

    fn has_const_assertion(&self, node: NodeId) -> bool {
        self.node(node).const_assertion
    }

    fn default_value(&self, node: NodeId) -> Option<serde_json::Value> {
        self.node(node).default_value.clone()
    }

    fn default_value_key(&self, node: NodeId) -> Option<String> {
        let data = self.node(node);
        data.default_value_key.clone().or_else(|| data.name.clone())
    }

    fn js_doc(&self, node: NodeId) -> Option<JsDoc> {
        self.node(node).docs.clone()
    }

    fn enum_members(&self, node: NodeId) -> Vec<(String, Option<EnumMemberValue>)> {
        self.node(node)
            .enum_members
            .iter()
            .map(|member| (member.name.clone(), member.value.clone()))
            .collect()
    }

    fn class_constructors(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).constructors.clone()
    }

    fn class_members(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).members.clone()
    }

    fn signature_declaration(&self, signature: SignatureId) -> Option<NodeId> {
        self.signature(signature).declaration
    }

    fn signature_parameters(&self, signature: SignatureId) -> Vec<SymbolId> {
        self.signature(signature).parameters.clone()
    }

    fn signature_type_parameters(&self, signature: SignatureId) -> Vec<String> {
        self.signature(signature).type_parameters.clone()
    }

    fn signature_return_type(&self, signature: SignatureId) -> TypeId {
        self.signature(signature).return_type
    }

    fn file_path(&self, file: FileId) -> String {
        self.files[file.index()].path.clone()
    }

    fn is_vendor_file(&self, file: FileId) -> bool {
        let data = &self.files[file.index()];
        data.vendor.unwrap_or_else(|| is_vendor_path(&data.path))
    }

    fn project_directory(&self) -> String {
        self.root.clone().unwrap_or_default()
    }

    fn is_known_type(&self, ty: TypeId) -> bool {
        self.contains_type(ty)
    }

    fn is_known_node(&self, node: NodeId) -> bool {
        self.contains_node(node)
    }

    fn is_known_signature(&self, signature: SignatureId) -> bool {
        self.contains_signature(signature)
    }
}

#[cfg(test)]
#[path = "../tests/snapshot_tests.rs"]
mod tests;
