//! The type-checking oracle consumed by the resolver.
//!
//! The resolver never parses or checks source code itself. Everything it knows
//! about a program comes from a [`TypeOracle`]: an on-demand query interface
//! over the host compiler. Handles (`TypeId`, `SymbolId`, `NodeId`,
//! `SignatureId`, `FileId`) are opaque to the resolver; it only compares them
//! for identity and passes them back to the oracle.
//!
//! ## Identity
//!
//! The cycle guard keys on `TypeId`. An oracle must therefore hand out the same
//! `TypeId` for the same type every time it is asked, the way the host
//! checker interns types. Two syntactically distinct uses of one named type
//! are expected to share an id; instantiations with different arguments are
//! expected to differ.

use serde::{Deserialize, Serialize};
use typeshape_common::Span;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Copy,
            Clone,
            Debug,
            Default,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Index into dense per-kind tables.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_handle!(
    /// A type as interned by the host checker.
    TypeId
);
define_handle!(
    /// A named entity: variable, property, parameter, type alias, class, ...
    SymbolId
);
define_handle!(
    /// A syntax node (usually a declaration or a type node).
    NodeId
);
define_handle!(
    /// A call or construct signature.
    SignatureId
);
define_handle!(
    /// A source file.
    FileId
);

bitflags::bitflags! {
    /// Type categories reported by the oracle.
    ///
    /// Several flags may be set at once: a boolean literal type carries both
    /// `BOOLEAN_LITERAL` and (for `boolean` itself, a union of literals)
    /// `BOOLEAN | UNION`. The resolver checks categories in a fixed precedence.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct TypeFlags: u32 {
        const ANY = 1 << 0;
        const UNKNOWN = 1 << 1;
        const NEVER = 1 << 2;
        const UNDEFINED = 1 << 3;
        const NULL = 1 << 4;
        const BOOLEAN = 1 << 5;
        const BOOLEAN_LITERAL = 1 << 6;
        const NUMBER = 1 << 7;
        const NUMBER_LITERAL = 1 << 8;
        const STRING = 1 << 9;
        const STRING_LITERAL = 1 << 10;
        const TEMPLATE_LITERAL = 1 << 11;
        const BIGINT = 1 << 12;
        const ES_SYMBOL = 1 << 13;
        const ARRAY = 1 << 14;
        const TUPLE = 1 << 15;
        const CLASS = 1 << 16;
        const ENUM = 1 << 17;
        const UNION = 1 << 18;
        const INTERSECTION = 1 << 19;
        const OBJECT = 1 << 20;
        const TYPE_PARAMETER = 1 << 21;

        /// Types documented as a bare `Primitive` (or one of the dedicated
        /// primitive kinds) rather than expanded.
        const PRIMITIVE = Self::ANY.bits()
            | Self::UNKNOWN.bits()
            | Self::NEVER.bits()
            | Self::UNDEFINED.bits()
            | Self::NULL.bits()
            | Self::BOOLEAN.bits()
            | Self::BOOLEAN_LITERAL.bits()
            | Self::NUMBER.bits()
            | Self::NUMBER_LITERAL.bits()
            | Self::STRING.bits()
            | Self::STRING_LITERAL.bits()
            | Self::TEMPLATE_LITERAL.bits()
            | Self::BIGINT.bits()
            | Self::ES_SYMBOL.bits();
    }
}

bitflags::bitflags! {
    /// Declaration modifiers and markers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u32 {
        const EXPORT = 1 << 0;
        const DEFAULT = 1 << 1;
        const DECLARE = 1 << 2;
        const PUBLIC = 1 << 3;
        const PROTECTED = 1 << 4;
        const PRIVATE = 1 << 5;
        const STATIC = 1 << 6;
        const ABSTRACT = 1 << 7;
        const READONLY = 1 << 8;
        const ASYNC = 1 << 9;
        /// `function*` / `*method()`
        const GENERATOR = 1 << 10;
        /// `name?:` on a property, parameter or method
        const QUESTION_TOKEN = 1 << 11;
    }
}

/// Syntax node kinds the resolver distinguishes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    SourceFile,
    VariableStatement,
    VariableDeclaration,
    PropertyAssignment,
    PropertySignature,
    MethodSignature,
    Parameter,
    PropertyDeclaration,
    MethodDeclaration,
    GetAccessor,
    SetAccessor,
    Constructor,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunction,
    ClassDeclaration,
    InterfaceDeclaration,
    TypeAliasDeclaration,
    EnumDeclaration,
    EnumMember,
    ModuleDeclaration,
    TypeParameter,
    TypeReference,
    IntersectionType,
    UnionType,
    TypeLiteral,
    TupleType,
    BindingElement,
    #[default]
    Other,
}

impl NodeKind {
    /// Member positions report their own location instead of the location of
    /// the type they are annotated with.
    pub fn is_member(self) -> bool {
        matches!(
            self,
            NodeKind::VariableDeclaration
                | NodeKind::PropertyAssignment
                | NodeKind::PropertySignature
                | NodeKind::MethodSignature
                | NodeKind::Parameter
                | NodeKind::PropertyDeclaration
                | NodeKind::MethodDeclaration
                | NodeKind::GetAccessor
                | NodeKind::SetAccessor
        )
    }

    /// Declarations that can carry an `export` marker themselves.
    pub fn is_exportable(self) -> bool {
        matches!(
            self,
            NodeKind::VariableStatement
                | NodeKind::VariableDeclaration
                | NodeKind::FunctionDeclaration
                | NodeKind::ClassDeclaration
                | NodeKind::InterfaceDeclaration
                | NodeKind::TypeAliasDeclaration
                | NodeKind::EnumDeclaration
                | NodeKind::ModuleDeclaration
        )
    }
}

/// Rendering mode for [`TypeOracle::type_text`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeFormat {
    /// Full, untruncated text; aliases declared elsewhere are kept by name and
    /// arrays are written as `Array<T>`.
    Declaration,
    /// Text used for signature return types: aliases kept by name, default
    /// array syntax.
    Signature,
}

/// The value of a literal type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

/// The initializer value of an enum member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumMemberValue {
    Number(f64),
    String(String),
}

/// A documentation tag such as `@deprecated` or `@default 1`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsDocTag {
    pub tag_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Documentation comment attached to a declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<JsDocTag>,
}

impl JsDoc {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.tags.is_empty()
    }
}

/// Query interface over the host type checker.
///
/// Every method is a synchronous, in-memory query. Implementations must be
/// deterministic for the lifetime of one resolution request.
pub trait TypeOracle {
    // -------------------------------------------------------------------------
    // Types
    // -------------------------------------------------------------------------

    /// Categories of `ty`.
    fn type_flags(&self, ty: TypeId) -> TypeFlags;

    /// Render `ty` as source text, optionally in the scope of `enclosing`.
    fn type_text(&self, ty: TypeId, enclosing: Option<NodeId>, format: TypeFormat) -> String;

    /// The symbol of the type itself (`interface Foo` for a `Foo` reference).
    fn type_symbol(&self, ty: TypeId) -> Option<SymbolId>;

    /// The alias symbol when `ty` was written through a type alias.
    fn alias_symbol(&self, ty: TypeId) -> Option<SymbolId>;

    /// The apparent type (`String` for `string`, the constraint for a type
    /// parameter). Returns `ty` when there is no distinct apparent type.
    fn apparent_type(&self, ty: TypeId) -> TypeId;

    /// Type arguments of a generic reference (`Promise<T>` → `[T]`).
    fn type_arguments(&self, ty: TypeId) -> Vec<TypeId>;

    /// Type arguments of an alias reference (`Alias<T>` → `[T]`).
    fn alias_type_arguments(&self, ty: TypeId) -> Vec<TypeId>;

    /// Element type of an array type.
    fn array_element_type(&self, ty: TypeId) -> Option<TypeId>;

    /// Members of a union type in checker order.
    fn union_members(&self, ty: TypeId) -> Vec<TypeId>;

    /// Constituents of an intersection type.
    fn intersection_members(&self, ty: TypeId) -> Vec<TypeId>;

    /// Element types of a tuple type.
    fn tuple_elements(&self, ty: TypeId) -> Vec<TypeId>;

    /// Call signatures of a callable type.
    fn call_signatures(&self, ty: TypeId) -> Vec<SignatureId>;

    /// Properties of the apparent type, including inherited ones.
    fn apparent_properties(&self, ty: TypeId) -> Vec<SymbolId>;

    /// The value of a literal type.
    fn literal_value(&self, ty: TypeId) -> Option<LiteralValue>;

    // -------------------------------------------------------------------------
    // Symbols
    // -------------------------------------------------------------------------

    fn symbol_name(&self, symbol: SymbolId) -> String;

    /// Declarations of `symbol` in declaration order.
    fn symbol_declarations(&self, symbol: SymbolId) -> Vec<NodeId>;

    fn value_declaration(&self, symbol: SymbolId) -> Option<NodeId>;

    /// Documentation of the symbol itself (used for parameters).
    fn symbol_description(&self, symbol: SymbolId) -> Option<String>;

    /// The type of `symbol` as seen from `location`.
    fn type_of_symbol_at(&self, symbol: SymbolId, location: NodeId) -> Option<TypeId>;

    // -------------------------------------------------------------------------
    // Nodes
    // -------------------------------------------------------------------------

    fn node_kind(&self, node: NodeId) -> NodeKind;

    /// The declared name of a node, when it has one.
    fn node_name(&self, node: NodeId) -> Option<String>;

    /// The source text of a node.
    fn node_text(&self, node: NodeId) -> String;

    fn node_parent(&self, node: NodeId) -> Option<NodeId>;

    fn node_modifiers(&self, node: NodeId) -> Modifiers;

    fn node_source_file(&self, node: NodeId) -> FileId;

    /// Start/end line and column of a node.
    fn node_span(&self, node: NodeId) -> Span;

    /// The type of a node (a declaration's declared type or a type node's type).
    ///
    /// `None` for nodes that have no type, such as statements.
    fn type_of_node(&self, node: NodeId) -> Option<TypeId>;

    /// The type annotation node of a declaration (`type A = <node>`, `a: <node>`).
    fn type_annotation(&self, node: NodeId) -> Option<NodeId>;

    /// Syntactic type arguments of a type reference node.
    fn type_reference_arguments(&self, node: NodeId) -> Vec<NodeId>;

    /// Referenced type name of a type reference node.
    fn type_reference_name(&self, node: NodeId) -> Option<String>;

    /// Constituent type nodes of an intersection type node.
    fn intersection_type_nodes(&self, node: NodeId) -> Vec<NodeId>;

    /// The signature declared by a function-like node.
    fn node_signature(&self, node: NodeId) -> Option<SignatureId>;

    /// Whether a variable declaration is initialized with `as const`.
    fn has_const_assertion(&self, node: NodeId) -> bool;

    /// Key under which a property's default is recorded in the defaults
    /// object of its enclosing parameter. Usually the declared name; differs
    /// for quoted or computed names.
    fn default_value_key(&self, node: NodeId) -> Option<String> {
        self.node_name(node)
    }

    /// The initializer of a parameter or property parsed as a literal value.
    /// Object binding patterns report an object keyed by property name.
    fn default_value(&self, node: NodeId) -> Option<serde_json::Value>;

    /// Documentation attached to a declaration.
    fn js_doc(&self, node: NodeId) -> Option<JsDoc>;

    /// Members of an enum declaration with their computed values.
    fn enum_members(&self, node: NodeId) -> Vec<(String, Option<EnumMemberValue>)>;

    /// Constructor declarations of a class.
    fn class_constructors(&self, node: NodeId) -> Vec<NodeId>;

    /// Member declarations of a class in source order.
    fn class_members(&self, node: NodeId) -> Vec<NodeId>;

    // -------------------------------------------------------------------------
    // Signatures
    // -------------------------------------------------------------------------

    fn signature_declaration(&self, signature: SignatureId) -> Option<NodeId>;

    /// Parameter symbols of a signature.
    fn signature_parameters(&self, signature: SignatureId) -> Vec<SymbolId>;

    /// Type parameters rendered as source text (`T extends object = {}`).
    fn signature_type_parameters(&self, signature: SignatureId) -> Vec<String>;

    fn signature_return_type(&self, signature: SignatureId) -> TypeId;

    // -------------------------------------------------------------------------
    // Files and project
    // -------------------------------------------------------------------------

    /// Absolute path of a source file.
    fn file_path(&self, file: FileId) -> String;

    /// Whether a file belongs to a dependency rather than the project.
    fn is_vendor_file(&self, file: FileId) -> bool;

    /// The directory the project's file system treats as current.
    fn project_directory(&self) -> String;

    // -------------------------------------------------------------------------
    // Handle checks
    // -------------------------------------------------------------------------

    /// Whether `ty` is a handle this oracle issued. Entry points reject
    /// unknown handles before any other query sees them.
    fn is_known_type(&self, _ty: TypeId) -> bool {
        true
    }

    fn is_known_node(&self, _node: NodeId) -> bool {
        true
    }

    fn is_known_signature(&self, _signature: SignatureId) -> bool {
        true
    }
}
