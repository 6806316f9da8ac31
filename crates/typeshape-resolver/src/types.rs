//! Serializable type descriptors.
//!
//! A [`ResolvedType`] is a finite tree: recursive definitions are broken by
//! [`TypeKind::Reference`] leaves that point at a declaration instead of
//! expanding it again. Every descriptor carries a [`TypeMeta`] base record
//! (name, documentation, rendered text and location) and a kind-specific
//! payload tagged by `kind` when serialized.
//!
//! ```json
//! {
//!   "kind": "Object",
//!   "name": "ButtonProps",
//!   "text": "ButtonProps",
//!   "filePath": "src/Button.tsx",
//!   "position": { "start": { "line": 1, "column": 1 }, "end": { "line": 4, "column": 2 } },
//!   "properties": [
//!     { "kind": "String", "name": "label", "text": "string", "context": "property", "isOptional": false }
//!   ]
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use typeshape_common::Span;

use crate::oracle::{EnumMemberValue, JsDoc, JsDocTag};

/// Whether a descriptor describes a property or a parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeContext {
    Property,
    Parameter,
}

/// Base record shared by every descriptor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<TypeContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<JsDocTag>,
    /// The type rendered as source text.
    pub text: String,
    /// File path relative to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_optional: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_readonly: Option<bool>,
}

impl TypeMeta {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn named(name: Option<String>, text: impl Into<String>) -> Self {
        Self {
            name,
            text: text.into(),
            ..Self::default()
        }
    }

    /// Fill in documentation fields that are still absent.
    pub fn fill_docs(&mut self, docs: &JsDoc) {
        if self.description.is_none() {
            self.description = docs.description.clone();
        }
        if self.tags.is_empty() {
            self.tags = docs.tags.clone();
        }
    }

    /// Overwrite documentation fields with whatever `docs` provides.
    pub fn apply_docs(&mut self, docs: &JsDoc) {
        if docs.description.is_some() {
            self.description = docs.description.clone();
        }
        if !docs.tags.is_empty() {
            self.tags = docs.tags.clone();
        }
    }

    pub fn set_location(&mut self, location: &DeclarationLocation) {
        self.file_path = Some(location.file_path.clone());
        self.position = Some(location.position);
    }
}

/// Where a declaration lives.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationLocation {
    /// File path relative to the project root; vendor paths start at `node_modules`.
    pub file_path: String,
    pub position: Span,
}

/// A resolved type descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedType {
    #[serde(flatten)]
    pub kind: TypeKind,
    #[serde(flatten)]
    pub meta: TypeMeta,
}

impl ResolvedType {
    pub fn new(kind: TypeKind, meta: TypeMeta) -> Self {
        Self { kind, meta }
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, TypeKind::Object { .. })
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.kind, TypeKind::Reference)
    }

    /// `Object`, or a `Union` whose every member is an `Object`.
    pub fn is_object_like(&self) -> bool {
        match &self.kind {
            TypeKind::Object { .. } => true,
            TypeKind::Union { members } => members.iter().all(ResolvedType::is_object),
            _ => false,
        }
    }

    pub fn text(&self) -> &str {
        &self.meta.text
    }

    pub fn name(&self) -> Option<&str> {
        self.meta.name.as_deref()
    }

    /// Visit this descriptor and every nested descriptor, depth first.
    pub fn walk(&self, visit: &mut dyn FnMut(&ResolvedType)) {
        visit(self);
        match &self.kind {
            TypeKind::Array { element } => element.walk(visit),
            TypeKind::Tuple { elements } => elements.iter().for_each(|e| e.walk(visit)),
            TypeKind::Object { properties } | TypeKind::Intersection { properties } => {
                properties.iter().for_each(|p| p.walk(visit))
            }
            TypeKind::Union { members } => members.iter().for_each(|m| m.walk(visit)),
            TypeKind::Generic { arguments, .. } => arguments.iter().for_each(|a| a.walk(visit)),
            TypeKind::Function { signatures } => signatures
                .iter()
                .flat_map(|s| s.parameters.iter())
                .for_each(|p| p.walk(visit)),
            TypeKind::Component { signatures } => signatures
                .iter()
                .filter_map(|s| s.parameter.as_deref())
                .for_each(|p| p.walk(visit)),
            TypeKind::Class(class) => class.walk(visit),
            TypeKind::String { .. }
            | TypeKind::Number { .. }
            | TypeKind::Boolean { .. }
            | TypeKind::Symbol
            | TypeKind::Primitive
            | TypeKind::Enum { .. }
            | TypeKind::Reference
            | TypeKind::Unknown => {}
        }
    }
}

/// Kind-specific payload of a descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeKind {
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
    },
    Boolean {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<bool>,
    },
    Symbol,
    /// `any`, `unknown`, `never`, `undefined`, `null`, `bigint`, template literals.
    Primitive,
    Array {
        element: Box<ResolvedType>,
    },
    Tuple {
        elements: Vec<ResolvedType>,
    },
    Object {
        properties: Vec<ResolvedType>,
    },
    Intersection {
        properties: Vec<ResolvedType>,
    },
    Union {
        members: Vec<ResolvedType>,
    },
    Enum {
        members: IndexMap<String, Option<EnumMemberValue>>,
    },
    Class(ClassType),
    Function {
        signatures: Vec<FunctionSignature>,
    },
    Component {
        signatures: Vec<ComponentSignature>,
    },
    Generic {
        #[serde(rename = "typeName")]
        type_name: String,
        arguments: Vec<ResolvedType>,
    },
    Reference,
    Unknown,
}

impl TypeKind {
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::String { .. } => "String",
            TypeKind::Number { .. } => "Number",
            TypeKind::Boolean { .. } => "Boolean",
            TypeKind::Symbol => "Symbol",
            TypeKind::Primitive => "Primitive",
            TypeKind::Array { .. } => "Array",
            TypeKind::Tuple { .. } => "Tuple",
            TypeKind::Object { .. } => "Object",
            TypeKind::Intersection { .. } => "Intersection",
            TypeKind::Union { .. } => "Union",
            TypeKind::Enum { .. } => "Enum",
            TypeKind::Class(_) => "Class",
            TypeKind::Function { .. } => "Function",
            TypeKind::Component { .. } => "Component",
            TypeKind::Generic { .. } => "Generic",
            TypeKind::Reference => "Reference",
            TypeKind::Unknown => "Unknown",
        }
    }
}

/// `async` / `generator` marker of a function or method.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignatureModifier {
    Async,
    Generator,
}

/// One call signature of a function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSignature {
    /// `name<T>(a: A, b?: B): R` or `<T>(a: A) => R`
    pub text: String,
    pub parameters: Vec<ResolvedType>,
    pub return_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<SignatureModifier>,
}

/// One call signature of a component: a single props parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSignature {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<Box<ResolvedType>>,
    pub return_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<SignatureModifier>,
}

impl From<FunctionSignature> for ComponentSignature {
    fn from(signature: FunctionSignature) -> Self {
        Self {
            text: signature.text,
            parameter: signature.parameters.into_iter().next().map(Box::new),
            return_type: signature.return_type,
            modifier: signature.modifier,
        }
    }
}

/// `static` / `abstract` scope of a class member.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    Abstract,
    Static,
}

/// Declared visibility of a class member.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    Private,
    Protected,
    Public,
}

/// Metadata shared by every class member.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassMemberMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<JsDocTag>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessorKind {
    ClassGetAccessor,
    ClassSetAccessor,
}

/// A getter or setter. Setters carry the signature of their one parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassAccessor {
    pub kind: AccessorKind,
    #[serde(flatten)]
    pub member: ClassMemberMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<FunctionSignature>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub struct ClassMethod {
    #[serde(flatten)]
    pub member: ClassMemberMeta,
    pub signatures: Vec<FunctionSignature>,
}

/// A class property: its resolved type plus member modifiers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassProperty {
    #[serde(flatten)]
    pub ty: ResolvedType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// Decomposed class declaration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constructors: Option<Vec<FunctionSignature>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessors: Vec<ClassAccessor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<ClassMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<ClassProperty>,
}

impl ClassType {
    fn walk(&self, visit: &mut dyn FnMut(&ResolvedType)) {
        let signatures = self
            .constructors
            .iter()
            .flatten()
            .chain(self.accessors.iter().filter_map(|a| a.signature.as_ref()))
            .chain(self.methods.iter().flat_map(|m| m.signatures.iter()));
        for signature in signatures {
            for parameter in &signature.parameters {
                parameter.walk(visit);
            }
        }
        for property in &self.properties {
            property.ty.walk(visit);
        }
    }
}
