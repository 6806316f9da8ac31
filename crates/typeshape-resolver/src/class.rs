//! Class decomposition: constructors, accessors, methods and properties.

use tracing::trace;

use crate::error::{MemberKind, ResolveError};
use crate::metadata::SymbolFilter;
use crate::oracle::{Modifiers, NodeId, NodeKind, TypeFormat, TypeOracle};
use crate::recursion::GuardEntry;
use crate::resolve::{Occurrence, TypeResolver};
use crate::types::{
    AccessorKind, ClassAccessor, ClassMemberMeta, ClassMethod, ClassProperty, ClassType,
    ResolvedType, Scope, TypeKind, TypeMeta, Visibility,
};

impl<O: TypeOracle + ?Sized> TypeResolver<'_, O> {
    /// Decompose a class declaration. The result is always `kind: "Class"`.
    ///
    /// Private members are left out. A setter without a resolvable signature
    /// or a property without a resolvable type fails with
    /// [`ResolveError::UnresolvableMember`].
    #[tracing::instrument(level = "debug", skip(self, filter), fields(declaration = declaration.0))]
    pub fn resolve_class(
        &mut self,
        declaration: NodeId,
        filter: SymbolFilter<'_>,
    ) -> Result<ResolvedType, ResolveError> {
        self.known_node(Some(declaration))?;
        self.begin_request();

        // Self-typed members reference the class instead of expanding it again.
        let class_type = self
            .oracle
            .type_of_node(declaration)
            .filter(|&ty| self.context.guard.enter(ty) == GuardEntry::Entered);
        let result = self.class_descriptor(declaration, filter);
        if let Some(ty) = class_type {
            self.context.guard.leave(ty);
        }
        result
    }

    pub(crate) fn class_descriptor(
        &mut self,
        declaration: NodeId,
        filter: SymbolFilter<'_>,
    ) -> Result<ResolvedType, ResolveError> {
        let oracle = self.oracle;
        let mut meta = TypeMeta::named(oracle.node_name(declaration), self.member_text(declaration));
        if let Some(docs) = oracle.js_doc(declaration) {
            meta.apply_docs(&docs);
        }

        let mut class = ClassType::default();

        let constructors = oracle
            .class_constructors(declaration)
            .into_iter()
            .filter_map(|constructor| oracle.node_signature(constructor))
            .collect::<Vec<_>>();
        if !constructors.is_empty() {
            class.constructors =
                Some(self.call_signatures(&constructors, Some(declaration), filter, true)?);
        }

        for member in oracle.class_members(declaration) {
            if oracle.node_modifiers(member).contains(Modifiers::PRIVATE) {
                trace!(member = member.0, "skipping private member");
                continue;
            }
            match oracle.node_kind(member) {
                NodeKind::GetAccessor | NodeKind::SetAccessor => {
                    class.accessors.push(self.class_accessor(member, filter)?);
                }
                NodeKind::MethodDeclaration => {
                    class.methods.push(self.class_method(member, filter)?);
                }
                NodeKind::PropertyDeclaration => {
                    class.properties.push(self.class_property(member, filter)?);
                }
                _ => {}
            }
        }

        Ok(ResolvedType::new(TypeKind::Class(class), meta))
    }

    fn class_accessor(
        &mut self,
        accessor: NodeId,
        filter: SymbolFilter<'_>,
    ) -> Result<ClassAccessor, ResolveError> {
        let member = self.member_meta(accessor);

        if self.oracle.node_kind(accessor) == NodeKind::GetAccessor {
            return Ok(ClassAccessor {
                kind: AccessorKind::ClassGetAccessor,
                member,
                signature: None,
            });
        }

        let signature = match self.oracle.node_signature(accessor) {
            Some(signature) => self.signature(signature, Some(accessor), filter, true)?,
            None => None,
        };
        let Some(signature) = signature else {
            return Err(ResolveError::UnresolvableMember {
                member: member.name,
                kind: MemberKind::Setter,
            });
        };

        Ok(ClassAccessor {
            kind: AccessorKind::ClassSetAccessor,
            member,
            signature: Some(signature),
        })
    }

    fn class_method(
        &mut self,
        method: NodeId,
        filter: SymbolFilter<'_>,
    ) -> Result<ClassMethod, ResolveError> {
        let oracle = self.oracle;
        let signatures = oracle
            .type_of_node(method)
            .map(|ty| oracle.call_signatures(ty))
            .unwrap_or_default();

        Ok(ClassMethod {
            member: self.member_meta(method),
            signatures: self.call_signatures(&signatures, Some(method), filter, true)?,
        })
    }

    fn class_property(
        &mut self,
        property: NodeId,
        filter: SymbolFilter<'_>,
    ) -> Result<ClassProperty, ResolveError> {
        let oracle = self.oracle;
        let name = oracle.node_name(property).unwrap_or_default();

        let resolved = match oracle.type_of_node(property) {
            Some(ty) => self.resolve(Occurrence::root(ty, Some(property)), filter)?,
            None => None,
        };
        let Some(mut ty) = resolved else {
            return Err(ResolveError::UnresolvableMember {
                member: name,
                kind: MemberKind::Property,
            });
        };

        if let Some(docs) = oracle.js_doc(property) {
            ty.meta.apply_docs(&docs);
        }
        let modifiers = oracle.node_modifiers(property);
        ty.meta.name = Some(name);
        ty.meta.default_value = oracle.default_value(property);
        ty.meta.is_readonly = Some(modifiers.contains(Modifiers::READONLY));

        Ok(ClassProperty {
            ty,
            scope: scope_of(modifiers),
            visibility: visibility_of(modifiers),
        })
    }

    fn member_meta(&self, member: NodeId) -> ClassMemberMeta {
        let oracle = self.oracle;
        let modifiers = oracle.node_modifiers(member);
        let docs = oracle.js_doc(member).unwrap_or_default();

        ClassMemberMeta {
            name: oracle.node_name(member).unwrap_or_default(),
            description: docs.description,
            tags: docs.tags,
            text: self.member_text(member),
            scope: scope_of(modifiers),
            visibility: visibility_of(modifiers),
        }
    }

    fn member_text(&self, node: NodeId) -> String {
        let oracle = self.oracle;
        match oracle.type_of_node(node) {
            Some(ty) => oracle.type_text(ty, Some(node), TypeFormat::Declaration),
            None => oracle.node_text(node),
        }
    }
}

/// `abstract` takes precedence over `static`.
fn scope_of(modifiers: Modifiers) -> Option<Scope> {
    if modifiers.contains(Modifiers::ABSTRACT) {
        Some(Scope::Abstract)
    } else if modifiers.contains(Modifiers::STATIC) {
        Some(Scope::Static)
    } else {
        None
    }
}

fn visibility_of(modifiers: Modifiers) -> Option<Visibility> {
    if modifiers.contains(Modifiers::PRIVATE) {
        Some(Visibility::Private)
    } else if modifiers.contains(Modifiers::PROTECTED) {
        Some(Visibility::Protected)
    } else if modifiers.contains(Modifiers::PUBLIC) {
        Some(Visibility::Public)
    } else {
        None
    }
}
