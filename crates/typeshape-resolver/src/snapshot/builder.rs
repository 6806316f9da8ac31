//! Incremental construction of program snapshots.
//!
//! The builder hands out handles as tables grow, assigns every declaration a
//! distinct line in its file, and interns primitive types by text so that
//! repeated `string` occurrences share one `TypeId`, the way a checker would.

use rustc_hash::FxHashMap;
use typeshape_common::Span;

use super::{
    ExportData, FileData, NodeData, ProgramSnapshot, SignatureData, SnapshotError, SymbolData,
    TypeData,
};
use crate::oracle::{
    FileId, LiteralValue, Modifiers, NodeId, NodeKind, SignatureId, SymbolId, TypeFlags, TypeId,
};

/// Handles created for a function declaration.
#[derive(Copy, Clone, Debug)]
pub struct FunctionHandles {
    pub symbol: SymbolId,
    pub node: NodeId,
    pub signature: SignatureId,
    pub ty: TypeId,
}

/// Builds a [`ProgramSnapshot`] one declaration at a time.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    snapshot: ProgramSnapshot,
    next_line: Vec<u32>,
    interned: FxHashMap<String, TypeId>,
}

impl SnapshotBuilder {
    /// Start a snapshot whose files live under `root`.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            snapshot: ProgramSnapshot {
                root: Some(root.into()),
                ..ProgramSnapshot::default()
            },
            ..Self::default()
        }
    }

    /// Add a file at `path` relative to the root.
    pub fn file(&mut self, path: &str) -> FileId {
        let root = self.snapshot.root.as_deref().unwrap_or_default();
        let path = if root.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", root.trim_end_matches('/'), path)
        };
        let id = FileId(self.snapshot.files.len() as u32);
        self.snapshot.files.push(FileData { path, vendor: None });
        self.next_line.push(1);
        id
    }

    // -------------------------------------------------------------------------
    // Raw tables
    // -------------------------------------------------------------------------

    pub fn add_type(&mut self, data: TypeData) -> TypeId {
        let id = TypeId(self.snapshot.types.len() as u32);
        self.snapshot.types.push(data);
        id
    }

    pub fn add_symbol(&mut self, data: SymbolData) -> SymbolId {
        let id = SymbolId(self.snapshot.symbols.len() as u32);
        self.snapshot.symbols.push(data);
        id
    }

    pub fn add_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.snapshot.nodes.len() as u32);
        self.snapshot.nodes.push(data);
        id
    }

    pub fn add_signature(&mut self, data: SignatureData) -> SignatureId {
        let id = SignatureId(self.snapshot.signatures.len() as u32);
        self.snapshot.signatures.push(data);
        id
    }

    pub fn type_mut(&mut self, ty: TypeId) -> &mut TypeData {
        &mut self.snapshot.types[ty.index()]
    }

    pub fn symbol_mut(&mut self, symbol: SymbolId) -> &mut SymbolData {
        &mut self.snapshot.symbols[symbol.index()]
    }

    pub fn file_mut(&mut self, file: FileId) -> &mut FileData {
        &mut self.snapshot.files[file.index()]
    }

    pub fn node_mut(&mut self, node: NodeId) -> &mut NodeData {
        &mut self.snapshot.nodes[node.index()]
    }

    /// First declaration of a symbol created by this builder.
    pub fn declaration_of(&self, symbol: SymbolId) -> Option<NodeId> {
        self.snapshot.symbols[symbol.index()]
            .declarations
            .first()
            .copied()
    }

    // -------------------------------------------------------------------------
    // Types
    // -------------------------------------------------------------------------

    /// An interned keyword type such as `string` or `undefined`.
    pub fn primitive(&mut self, flags: TypeFlags, text: &str) -> TypeId {
        if let Some(&ty) = self.interned.get(text) {
            return ty;
        }
        let ty = self.add_type(TypeData {
            flags,
            text: text.to_string(),
            ..TypeData::default()
        });
        self.interned.insert(text.to_string(), ty);
        ty
    }

    pub fn string(&mut self) -> TypeId {
        self.primitive(TypeFlags::STRING, "string")
    }

    pub fn number(&mut self) -> TypeId {
        self.primitive(TypeFlags::NUMBER, "number")
    }

    /// `boolean`, interned as the union `false | true`.
    pub fn boolean(&mut self) -> TypeId {
        if let Some(&ty) = self.interned.get("boolean") {
            return ty;
        }
        let members = vec![self.boolean_literal(false), self.boolean_literal(true)];
        let ty = self.add_type(TypeData {
            flags: TypeFlags::BOOLEAN | TypeFlags::UNION,
            text: "boolean".to_string(),
            members,
            ..TypeData::default()
        });
        self.interned.insert("boolean".to_string(), ty);
        ty
    }

    pub fn boolean_literal(&mut self, value: bool) -> TypeId {
        let text = if value { "true" } else { "false" };
        if let Some(&ty) = self.interned.get(text) {
            return ty;
        }
        let ty = self.add_type(TypeData {
            flags: TypeFlags::BOOLEAN_LITERAL,
            text: text.to_string(),
            literal: Some(LiteralValue::Boolean(value)),
            ..TypeData::default()
        });
        self.interned.insert(text.to_string(), ty);
        ty
    }

    pub fn string_literal(&mut self, value: &str) -> TypeId {
        self.add_type(TypeData {
            flags: TypeFlags::STRING_LITERAL,
            text: format!("\"{value}\""),
            literal: Some(LiteralValue::String(value.to_string())),
            ..TypeData::default()
        })
    }

    pub fn number_literal(&mut self, value: f64) -> TypeId {
        self.add_type(TypeData {
            flags: TypeFlags::NUMBER_LITERAL,
            text: value.to_string(),
            literal: Some(LiteralValue::Number(value)),
            ..TypeData::default()
        })
    }

    pub fn union(&mut self, text: &str, members: Vec<TypeId>) -> TypeId {
        self.add_type(TypeData {
            flags: TypeFlags::UNION,
            text: text.to_string(),
            members,
            ..TypeData::default()
        })
    }

    pub fn intersection(&mut self, text: &str, members: Vec<TypeId>) -> TypeId {
        self.add_type(TypeData {
            flags: TypeFlags::INTERSECTION,
            text: text.to_string(),
            members,
            ..TypeData::default()
        })
    }

    pub fn array(&mut self, text: &str, element: TypeId) -> TypeId {
        self.add_type(TypeData {
            flags: TypeFlags::ARRAY | TypeFlags::OBJECT,
            text: text.to_string(),
            element: Some(element),
            ..TypeData::default()
        })
    }

    pub fn tuple(&mut self, text: &str, elements: Vec<TypeId>) -> TypeId {
        self.add_type(TypeData {
            flags: TypeFlags::TUPLE | TypeFlags::OBJECT,
            text: text.to_string(),
            elements,
            ..TypeData::default()
        })
    }

    /// An object type with the given apparent properties.
    pub fn object(
        &mut self,
        text: &str,
        symbol: Option<SymbolId>,
        properties: Vec<SymbolId>,
    ) -> TypeId {
        self.add_type(TypeData {
            flags: TypeFlags::OBJECT,
            text: text.to_string(),
            symbol,
            properties,
            ..TypeData::default()
        })
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    /// A declaration node on the next free line of `file`.
    pub fn declaration(&mut self, file: FileId, kind: NodeKind, name: Option<&str>) -> NodeId {
        let line = &mut self.next_line[file.index()];
        let span = Span::from_lines((*line, 1), (*line, 40));
        *line += 1;
        self.add_node(NodeData {
            kind,
            file,
            span,
            name: name.map(str::to_string),
            text: name.unwrap_or_default().to_string(),
            ..NodeData::default()
        })
    }

    /// A symbol declared by `node`.
    pub fn declare(&mut self, name: &str, node: NodeId) -> SymbolId {
        let kind = self.snapshot.nodes[node.index()].kind;
        let is_value = matches!(
            kind,
            NodeKind::VariableDeclaration
                | NodeKind::FunctionDeclaration
                | NodeKind::ClassDeclaration
                | NodeKind::EnumDeclaration
                | NodeKind::Parameter
                | NodeKind::PropertySignature
                | NodeKind::PropertyDeclaration
                | NodeKind::MethodDeclaration
        );
        self.add_symbol(SymbolData {
            name: name.to_string(),
            declarations: vec![node],
            value_declaration: is_value.then_some(node),
            ..SymbolData::default()
        })
    }

    /// A property signature `name: ty`.
    pub fn property(&mut self, file: FileId, name: &str, ty: TypeId) -> SymbolId {
        let node = self.declaration(file, NodeKind::PropertySignature, Some(name));
        self.node_mut(node).ty = Some(ty);
        let symbol = self.declare(name, node);
        self.symbol_mut(symbol).ty = Some(ty);
        symbol
    }

    /// An optional property signature `name?: ty`.
    pub fn optional_property(&mut self, file: FileId, name: &str, ty: TypeId) -> SymbolId {
        let symbol = self.property(file, name, ty);
        if let Some(node) = self.declaration_of(symbol) {
            self.node_mut(node).modifiers |= Modifiers::QUESTION_TOKEN;
        }
        symbol
    }

    /// A parameter `name: ty`.
    pub fn parameter(&mut self, file: FileId, name: &str, ty: TypeId) -> SymbolId {
        let node = self.declaration(file, NodeKind::Parameter, Some(name));
        self.node_mut(node).ty = Some(ty);
        let symbol = self.declare(name, node);
        self.symbol_mut(symbol).ty = Some(ty);
        symbol
    }

    fn named_declaration(
        &mut self,
        file: FileId,
        kind: NodeKind,
        name: &str,
        exported: bool,
    ) -> (SymbolId, NodeId) {
        let node = self.declaration(file, kind, Some(name));
        if exported {
            self.node_mut(node).modifiers |= Modifiers::EXPORT;
        }
        (self.declare(name, node), node)
    }

    /// A `type name = ...` declaration. Attach the aliased type with
    /// [`alias_type`](Self::alias_type).
    pub fn type_alias(&mut self, file: FileId, name: &str, exported: bool) -> (SymbolId, NodeId) {
        self.named_declaration(file, NodeKind::TypeAliasDeclaration, name, exported)
    }

    /// An `interface name { ... }` declaration.
    pub fn interface(&mut self, file: FileId, name: &str, exported: bool) -> (SymbolId, NodeId) {
        self.named_declaration(file, NodeKind::InterfaceDeclaration, name, exported)
    }

    /// An object type written through the alias declared as `(symbol, node)`.
    pub fn alias_type(
        &mut self,
        (symbol, node): (SymbolId, NodeId),
        text: &str,
        properties: Vec<SymbolId>,
    ) -> TypeId {
        let ty = self.object(text, None, properties);
        self.type_mut(ty).alias_symbol = Some(symbol);
        self.node_mut(node).ty = Some(ty);
        self.symbol_mut(symbol).ty = Some(ty);
        ty
    }

    /// An interface type declared as `(symbol, node)`.
    pub fn interface_type(
        &mut self,
        (symbol, node): (SymbolId, NodeId),
        properties: Vec<SymbolId>,
    ) -> TypeId {
        let text = self.snapshot.symbols[symbol.index()].name.clone();
        let ty = self.object(&text, Some(symbol), properties);
        self.node_mut(node).ty = Some(ty);
        self.symbol_mut(symbol).ty = Some(ty);
        ty
    }

    /// `function name(parameters): return_type`.
    pub fn function(
        &mut self,
        file: FileId,
        name: &str,
        parameters: Vec<SymbolId>,
        return_type: TypeId,
        exported: bool,
    ) -> FunctionHandles {
        let (symbol, node) =
            self.named_declaration(file, NodeKind::FunctionDeclaration, name, exported);

        for parameter in &parameters {
            if let Some(declaration) = self.declaration_of(*parameter) {
                self.node_mut(declaration).parent = Some(node);
            }
        }

        let text = {
            let rendered: Vec<String> = parameters
                .iter()
                .map(|parameter| {
                    let data = &self.snapshot.symbols[parameter.index()];
                    let ty = data
                        .ty
                        .map(|ty| self.snapshot.types[ty.index()].text.clone())
                        .unwrap_or_default();
                    format!("{}: {}", data.name, ty)
                })
                .collect();
            let returns = &self.snapshot.types[return_type.index()].text;
            format!("({}) => {}", rendered.join(", "), returns)
        };

        let signature = self.add_signature(SignatureData {
            declaration: Some(node),
            parameters,
            type_parameters: Vec::new(),
            return_type,
        });
        let ty = self.add_type(TypeData {
            flags: TypeFlags::OBJECT,
            text,
            symbol: Some(symbol),
            signatures: vec![signature],
            ..TypeData::default()
        });

        let data = self.node_mut(node);
        data.ty = Some(ty);
        data.signature = Some(signature);
        self.symbol_mut(symbol).ty = Some(ty);

        FunctionHandles {
            symbol,
            node,
            signature,
            ty,
        }
    }

    /// List `node` as an export named `name`.
    pub fn export(&mut self, name: &str, node: NodeId) {
        self.snapshot.exports.push(ExportData {
            name: name.to_string(),
            node,
        });
    }

    /// Validate and return the snapshot.
    pub fn build(self) -> Result<ProgramSnapshot, SnapshotError> {
        self.snapshot.validate()?;
        Ok(self.snapshot)
    }
}
