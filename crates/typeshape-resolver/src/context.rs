//! Per-request resolution state.
//!
//! Everything the resolver remembers between recursive calls lives here:
//! - the in-flight guard, keyed on `TypeId`, which breaks cycles
//! - the object-reference registry consulted by the component heuristic
//! - the classification of nodes used as enclosing context for properties
//! - the project root used to relativize file paths
//!
//! A context may be reused across sequential requests (the registry then keeps
//! growing, which lets later component checks see earlier probes). Concurrent
//! requests must each own a context.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::metadata::SymbolMetadata;
use crate::oracle::{NodeId, TypeId};
use crate::recursion::{ExpansionGuard, ExpansionLimits};
use crate::types::ResolvedType;

/// Identity of a reference descriptor: rendered text plus start location.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReferenceKey {
    pub text: String,
    pub file_path: String,
    pub line: u32,
    pub column: u32,
}

impl ReferenceKey {
    /// Key of a located descriptor; `None` when it has no location.
    pub fn of(resolved: &ResolvedType) -> Option<Self> {
        let file_path = resolved.meta.file_path.as_ref()?;
        let position = resolved.meta.position?;
        Some(Self {
            text: resolved.meta.text.clone(),
            file_path: file_path.clone(),
            line: position.start.line,
            column: position.start.column,
        })
    }
}

/// References whose expansion is known to be object shaped.
#[derive(Clone, Debug, Default)]
pub struct ObjectReferences {
    keys: FxHashSet<ReferenceKey>,
}

impl ObjectReferences {
    pub fn insert(&mut self, key: ReferenceKey) -> bool {
        self.keys.insert(key)
    }

    /// Whether `resolved` points at a registered object-shaped declaration.
    pub fn contains(&self, resolved: &ResolvedType) -> bool {
        ReferenceKey::of(resolved).is_some_and(|key| self.keys.contains(&key))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Mutable state threaded through one or more resolution requests.
pub struct ResolutionContext {
    pub(crate) guard: ExpansionGuard<TypeId>,
    pub(crate) object_references: ObjectReferences,
    pub(crate) enclosing_metadata: FxHashMap<NodeId, SymbolMetadata>,
    pub(crate) project_root: Option<String>,
}

impl Default for ResolutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::with_limits(ExpansionLimits::DEFAULT)
    }

    pub fn with_limits(limits: ExpansionLimits) -> Self {
        Self {
            guard: ExpansionGuard::new(limits),
            object_references: ObjectReferences::default(),
            enclosing_metadata: FxHashMap::default(),
            project_root: None,
        }
    }

    /// Use `root` instead of asking the oracle for the project directory.
    pub fn with_project_root(mut self, root: impl Into<String>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    pub fn object_references(&self) -> &ObjectReferences {
        &self.object_references
    }

    /// Whether `ty` is currently being expanded.
    pub fn is_in_flight(&self, ty: TypeId) -> bool {
        self.guard.is_open(&ty)
    }

    /// Recorded classification of a node used as enclosing context.
    pub fn enclosing_metadata(&self, node: NodeId) -> Option<&SymbolMetadata> {
        self.enclosing_metadata.get(&node)
    }

    pub(crate) fn record_enclosing(&mut self, node: NodeId, metadata: SymbolMetadata) {
        self.enclosing_metadata.insert(node, metadata);
    }
}
