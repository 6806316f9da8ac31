//! Type resolution engine.
//!
//! Converts type checker answers into finite, serializable descriptors for
//! API documentation: primitives, objects, unions, generics, functions,
//! components and classes. The engine does not check types. It walks the
//! answers of a [`TypeOracle`] and decides, for every type occurrence, whether
//! to expand it in place or to emit a [`TypeKind::Reference`] pointing at its
//! declaration.
//!
//! ```ignore
//! let snapshot = ProgramSnapshot::from_json(&source)?;
//! let mut resolver = TypeResolver::new(&snapshot);
//! let export = snapshot.export("Button")?;
//! let ty = snapshot.type_of_node(export.node).unwrap();
//! let resolved = resolver.resolve_type(ty, Some(export.node), &exclude_node_modules)?;
//! ```

// Oracle interface consumed from the host checker
pub mod oracle;
pub use oracle::{
    EnumMemberValue, FileId, JsDoc, JsDocTag, LiteralValue, Modifiers, NodeId, NodeKind,
    SignatureId, SymbolId, TypeFlags, TypeFormat, TypeId, TypeOracle,
};

// Serializable descriptors
pub mod types;
pub use types::{
    AccessorKind, ClassAccessor, ClassMemberMeta, ClassMethod, ClassProperty, ClassType,
    ComponentSignature, DeclarationLocation, FunctionSignature, ResolvedType, Scope,
    SignatureModifier, TypeContext, TypeKind, TypeMeta, Visibility,
};

// Symbol classification and filters
pub mod metadata;
pub use metadata::{SymbolFilter, SymbolMetadata, exclude_node_modules, include_all};

// Per-request state
pub mod context;
pub mod recursion;
pub use context::{ObjectReferences, ReferenceKey, ResolutionContext};
pub use recursion::{ExpansionGuard, ExpansionLimits, GuardEntry};

// Expand-or-reference decisions
pub mod reference;
pub use reference::{ReferenceDecision, ReferenceQuery, ReferenceReason};

pub mod component;
pub use component::{ComponentPolicy, NamingConvention};

pub mod error;
pub use error::{DeclarationSite, MemberKind, ResolveError};

pub mod options;
pub use options::ResolverOptions;

// Resolver core; `signature`, `class` and `location` extend `TypeResolver`
mod class;
mod location;
mod resolve;
mod signature;
pub use resolve::TypeResolver;

// In-memory oracle for snapshots and tests
pub mod snapshot;
pub use snapshot::{ProgramSnapshot, SnapshotBuilder, SnapshotError};
