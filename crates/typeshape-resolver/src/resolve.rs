//! The recursive type resolver.
//!
//! `resolve` turns one type occurrence into a descriptor:
//!
//! 1. find the occurrence's symbol (alias symbol, own symbol, apparent symbol)
//!    and classify it
//! 2. compute its location
//! 3. ask the reference policy whether to expand it at all
//! 4. enter it into the in-flight guard and dispatch on its category
//! 5. leave the guard, then attach documentation and location
//!
//! Every recursion point treats `Ok(None)` as "nothing documentable" and drops
//! the member, so containers whose members were all filtered out disappear
//! as well.

use indexmap::IndexMap;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::component::ComponentPolicy;
use crate::context::{ReferenceKey, ResolutionContext};
use crate::error::{DeclarationSite, ResolveError};
use crate::metadata::{SymbolFilter, SymbolMetadata};
use crate::options::ResolverOptions;
use crate::oracle::{
    LiteralValue, Modifiers, NodeId, NodeKind, SignatureId, TypeFlags, TypeFormat, TypeId,
    TypeOracle,
};
use crate::recursion::GuardEntry;
use crate::reference::{ReferenceDecision, ReferenceQuery, decide};
use crate::types::{
    ComponentSignature, DeclarationLocation, FunctionSignature, ResolvedType, TypeContext,
    TypeKind, TypeMeta,
};

/// Resolves type occurrences reported by a [`TypeOracle`].
///
/// A resolver owns its [`ResolutionContext`]. Reuse one resolver for
/// sequential requests over the same program, or create one per request when
/// resolving concurrently.
pub struct TypeResolver<'a, O: TypeOracle + ?Sized> {
    pub(crate) oracle: &'a O,
    pub(crate) policy: Box<dyn ComponentPolicy + 'a>,
    pub(crate) context: ResolutionContext,
}

/// One type occurrence and the flags that travel with it.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Occurrence<'v> {
    pub ty: TypeId,
    pub enclosing: Option<NodeId>,
    /// The declaration being documented; exempt from local-export references.
    pub is_root: bool,
    /// Default value(s) supplied by the enclosing parameter or property.
    pub default_value: Option<&'v Value>,
    pub use_references: bool,
    /// Already the apparent type of another occurrence; no further fallback.
    pub is_apparent: bool,
}

impl<'v> Occurrence<'v> {
    pub fn root(ty: TypeId, enclosing: Option<NodeId>) -> Self {
        Self {
            ty,
            enclosing,
            is_root: true,
            default_value: None,
            use_references: true,
            is_apparent: false,
        }
    }

    pub fn nested(ty: TypeId, enclosing: Option<NodeId>) -> Self {
        Self {
            is_root: false,
            ..Self::root(ty, enclosing)
        }
    }

    pub fn with_root(self, is_root: bool) -> Self {
        Self { is_root, ..self }
    }

    pub fn with_default(self, default_value: Option<&'v Value>) -> Self {
        Self {
            default_value,
            ..self
        }
    }
}

/// Type arguments written on an alias or property signature, e.g. the
/// `Props` in `type ButtonProps = Partial<Props>`.
struct SyntacticGeneric {
    arguments: Vec<NodeId>,
    name: String,
    text: String,
}

/// Everything known about an occurrence before dispatch.
struct Subject {
    ty: TypeId,
    flags: TypeFlags,
    metadata: SymbolMetadata,
    /// First declaration of the occurrence's symbol.
    symbol_declaration: Option<NodeId>,
    /// `symbol_declaration`, or the enclosing node.
    declaration: Option<NodeId>,
    type_name: String,
    text: String,
    location: Option<DeclarationLocation>,
    type_arguments: Vec<TypeId>,
    alias_type_arguments: Vec<TypeId>,
    generic: Option<SyntacticGeneric>,
}

impl Subject {
    fn meta(&self) -> TypeMeta {
        TypeMeta::named(self.metadata.name.clone(), self.text.clone())
    }

    fn shape(&self, kind: TypeKind) -> Expansion {
        Expansion::Shape(ResolvedType::new(kind, self.meta()))
    }

    fn located(&self, kind: TypeKind, text: String) -> ResolvedType {
        let mut meta = TypeMeta::new(text);
        if let Some(location) = &self.location {
            meta.set_location(location);
        }
        ResolvedType::new(kind, meta)
    }
}

/// Result of dispatching on a type's category.
enum Expansion {
    /// Receives documentation and location.
    Shape(ResolvedType),
    /// Returned as is.
    Finished(ResolvedType),
    Empty,
}

impl<'a, O: TypeOracle + ?Sized> TypeResolver<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self::with_options(oracle, &ResolverOptions::default())
    }

    pub fn with_options(oracle: &'a O, options: &ResolverOptions) -> Self {
        Self {
            oracle,
            policy: Box::new(options.naming_convention()),
            context: ResolutionContext::with_limits(options.expansion_limits()),
        }
    }

    /// Replace the component policy.
    pub fn with_policy(mut self, policy: impl ComponentPolicy + 'a) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Continue with previously accumulated state.
    pub fn with_context(mut self, context: ResolutionContext) -> Self {
        self.context = context;
        self
    }

    pub fn oracle(&self) -> &'a O {
        self.oracle
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    pub fn into_context(self) -> ResolutionContext {
        self.context
    }

    /// Resolve the type `ty` as seen from `enclosing`.
    ///
    /// Returns `Ok(None)` when nothing documentable remains after filtering.
    #[tracing::instrument(level = "debug", skip(self, filter), fields(ty = ty.0))]
    pub fn resolve_type(
        &mut self,
        ty: TypeId,
        enclosing: Option<NodeId>,
        filter: SymbolFilter<'_>,
    ) -> Result<Option<ResolvedType>, ResolveError> {
        self.known_type(ty)?;
        self.known_node(enclosing)?;
        self.begin_request();
        self.resolve(Occurrence::root(ty, enclosing), filter)
    }

    /// Resolve the apparent properties of `ty`.
    #[tracing::instrument(level = "debug", skip(self, filter), fields(ty = ty.0))]
    pub fn resolve_type_properties(
        &mut self,
        ty: TypeId,
        enclosing: Option<NodeId>,
        filter: SymbolFilter<'_>,
    ) -> Result<Vec<ResolvedType>, ResolveError> {
        self.known_type(ty)?;
        self.known_node(enclosing)?;
        self.begin_request();
        self.type_properties(ty, enclosing, filter, true, None)
    }

    /// Ask the component policy about already resolved signatures.
    pub fn is_component(&self, name: Option<&str>, signatures: &[FunctionSignature]) -> bool {
        self.policy
            .is_component(name, signatures, &self.context.object_references)
    }

    pub(crate) fn known_type(&self, ty: TypeId) -> Result<(), ResolveError> {
        if self.oracle.is_known_type(ty) {
            Ok(())
        } else {
            Err(ResolveError::UnknownHandle {
                table: "types",
                index: ty.0,
            })
        }
    }

    pub(crate) fn known_node(&self, node: Option<NodeId>) -> Result<(), ResolveError> {
        match node {
            Some(node) if !self.oracle.is_known_node(node) => Err(ResolveError::UnknownHandle {
                table: "nodes",
                index: node.0,
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn known_signature(&self, signature: SignatureId) -> Result<(), ResolveError> {
        if self.oracle.is_known_signature(signature) {
            Ok(())
        } else {
            Err(ResolveError::UnknownHandle {
                table: "signatures",
                index: signature.0,
            })
        }
    }

    pub(crate) fn begin_request(&mut self) {
        if !self.context.guard.is_active() {
            self.context.guard.reset_budget();
        }
    }

    pub(crate) fn resolve(
        &mut self,
        occurrence: Occurrence<'_>,
        filter: SymbolFilter<'_>,
    ) -> Result<Option<ResolvedType>, ResolveError> {
        let subject = self.subject(&occurrence);

        if occurrence.use_references {
            if let Some(early) = self.apply_reference_policy(&subject, occurrence, filter)? {
                return Ok(early);
            }
        }

        let keyed = !subject.metadata.is_virtual;
        let entry = if keyed {
            self.context.guard.enter(subject.ty)
        } else {
            self.context.guard.enter_unkeyed()
        };

        match entry {
            GuardEntry::Entered => {}
            GuardEntry::InFlight => {
                // Only reachable while probing with references disabled.
                return self.reference(&subject).map(Some);
            }
            GuardEntry::TooDeep | GuardEntry::BudgetSpent => {
                warn!(
                    ty = subject.ty.0,
                    text = %subject.text,
                    depth = self.context.guard.depth(),
                    ?entry,
                    "resolution limit reached, reporting type as unknown"
                );
                return Ok(Some(subject.located(TypeKind::Unknown, subject.text.clone())));
            }
        }

        let expansion = self.expand(&subject, occurrence, filter);

        if keyed {
            self.context.guard.leave(subject.ty);
        } else {
            self.context.guard.leave_unkeyed();
        }

        match expansion? {
            Expansion::Empty => {
                trace!(ty = subject.ty.0, text = %subject.text, "no documentable content");
                Ok(None)
            }
            Expansion::Finished(resolved) => Ok(Some(resolved)),
            Expansion::Shape(mut resolved) => {
                let docs_node = match occurrence.enclosing {
                    Some(node) if self.oracle.node_kind(node) == NodeKind::VariableDeclaration => {
                        Some(node)
                    }
                    _ => subject.declaration,
                };
                if let Some(docs) = docs_node.and_then(|node| self.oracle.js_doc(node)) {
                    resolved.meta.fill_docs(&docs);
                }
                if let Some(location) = &subject.location {
                    resolved.meta.set_location(location);
                }
                Ok(Some(resolved))
            }
        }
    }

    fn subject(&mut self, occurrence: &Occurrence<'_>) -> Subject {
        let oracle = self.oracle;
        let ty = occurrence.ty;

        let symbol = oracle
            .alias_symbol(ty)
            .or_else(|| oracle.type_symbol(ty))
            .or_else(|| oracle.type_symbol(oracle.apparent_type(ty)));
        let metadata = SymbolMetadata::classify(oracle, symbol, occurrence.enclosing);
        let symbol_declaration =
            symbol.and_then(|symbol| oracle.symbol_declarations(symbol).first().copied());
        let declaration = symbol_declaration.or(occurrence.enclosing);

        let type_name = symbol_declaration
            .and_then(|node| oracle.node_name(node))
            .or_else(|| symbol.map(|symbol| oracle.symbol_name(symbol)))
            .unwrap_or_default();
        let text = oracle.type_text(ty, occurrence.enclosing, TypeFormat::Declaration);
        let location = self.occurrence_location(occurrence.enclosing, declaration);
        let type_arguments = oracle.type_arguments(ty);
        let generic = if type_arguments.is_empty() {
            self.syntactic_generic(occurrence.enclosing)
        } else {
            None
        };

        Subject {
            ty,
            flags: oracle.type_flags(ty),
            metadata,
            symbol_declaration,
            declaration,
            type_name,
            text,
            location,
            type_arguments,
            alias_type_arguments: oracle.alias_type_arguments(ty),
            generic,
        }
    }

    fn syntactic_generic(&self, enclosing: Option<NodeId>) -> Option<SyntacticGeneric> {
        let oracle = self.oracle;
        let enclosing = enclosing?;
        if !matches!(
            oracle.node_kind(enclosing),
            NodeKind::TypeAliasDeclaration | NodeKind::PropertySignature
        ) {
            return None;
        }

        let node = oracle.type_annotation(enclosing)?;
        if oracle.node_kind(node) != NodeKind::TypeReference {
            return None;
        }

        let arguments = oracle.type_reference_arguments(node);
        if arguments.is_empty() {
            return None;
        }

        Some(SyntacticGeneric {
            arguments,
            name: oracle.type_reference_name(node).unwrap_or_default(),
            text: oracle.node_text(node),
        })
    }

    /// `Some(result)` when the policy answers for the occurrence.
    fn apply_reference_policy(
        &mut self,
        subject: &Subject,
        occurrence: Occurrence<'_>,
        filter: SymbolFilter<'_>,
    ) -> Result<Option<Option<ResolvedType>>, ResolveError> {
        let decision = {
            let query = ReferenceQuery {
                metadata: &subject.metadata,
                enclosing_metadata: occurrence
                    .enclosing
                    .and_then(|node| self.context.enclosing_metadata.get(&node)),
                has_symbol: !subject.metadata.is_virtual,
                has_enclosing: occurrence.enclosing.is_some(),
                is_primitive: subject.flags.intersects(TypeFlags::PRIMITIVE),
                is_root: occurrence.is_root,
                in_flight: self.context.is_in_flight(subject.ty),
                type_arguments: subject.type_arguments.len(),
                type_arguments_in_vendor: self.every_type_in_vendor(&subject.type_arguments),
                alias_type_arguments: subject.alias_type_arguments.len(),
                syntactic_type_arguments: subject
                    .generic
                    .as_ref()
                    .map_or(0, |generic| generic.arguments.len()),
            };
            decide(&query)
        };

        match decision {
            ReferenceDecision::Expand => Ok(None),
            ReferenceDecision::External { generic: false } => {
                debug!(text = %subject.text, "dependency type seen from project code");
                self.reference(subject).map(|reference| Some(Some(reference)))
            }
            ReferenceDecision::External { generic: true } => {
                let mut arguments = Vec::new();
                for &argument in &subject.alias_type_arguments {
                    let occurrence = Occurrence::nested(argument, subject.declaration);
                    if let Some(resolved) = self.resolve(occurrence, filter)? {
                        arguments.push(resolved);
                    }
                }
                if arguments.is_empty() {
                    return Ok(Some(None));
                }
                let kind = TypeKind::Generic {
                    type_name: subject.type_name.clone(),
                    arguments: as_context(arguments, TypeContext::Parameter),
                };
                Ok(Some(Some(subject.located(kind, subject.text.clone()))))
            }
            ReferenceDecision::Reference(reason) => {
                let reference = self.reference(subject)?;
                if reason.probes() {
                    self.probe(occurrence, filter, &reference)?;
                }
                debug!(text = %subject.text, ?reason, "emitting reference");
                Ok(Some(Some(reference)))
            }
        }
    }

    /// Expand an occurrence without reference substitution and remember
    /// `reference` when the expansion is object shaped.
    fn probe(
        &mut self,
        occurrence: Occurrence<'_>,
        filter: SymbolFilter<'_>,
        reference: &ResolvedType,
    ) -> Result<(), ResolveError> {
        let probed = self.resolve(
            Occurrence {
                use_references: false,
                ..occurrence
            },
            filter,
        )?;

        if probed.as_ref().is_some_and(ResolvedType::is_object_like) {
            if let Some(key) = ReferenceKey::of(reference) {
                trace!(text = %key.text, file = %key.file_path, "registering object reference");
                self.context.object_references.insert(key);
            }
        }
        Ok(())
    }

    fn reference(&self, subject: &Subject) -> Result<ResolvedType, ResolveError> {
        match &subject.location {
            Some(location) if !location.file_path.is_empty() => {
                Ok(subject.located(TypeKind::Reference, subject.text.clone()))
            }
            _ => Err(ResolveError::MissingReferenceLocation {
                text: subject.text.clone(),
            }),
        }
    }

    fn expand(
        &mut self,
        subject: &Subject,
        occurrence: Occurrence<'_>,
        filter: SymbolFilter<'_>,
    ) -> Result<Expansion, ResolveError> {
        let oracle = self.oracle;
        let ty = subject.ty;
        let flags = subject.flags;
        let defaults = occurrence.default_value;

        trace!(ty = ty.0, text = %subject.text, ?flags, "expanding");

        if flags.intersects(TypeFlags::BOOLEAN | TypeFlags::BOOLEAN_LITERAL) {
            let value = match oracle.literal_value(ty) {
                Some(LiteralValue::Boolean(value)) => Some(value),
                _ => None,
            };
            return Ok(subject.shape(TypeKind::Boolean { value }));
        }

        if flags.intersects(TypeFlags::NUMBER | TypeFlags::NUMBER_LITERAL) {
            let value = match oracle.literal_value(ty) {
                Some(LiteralValue::Number(value)) => Some(value),
                _ => None,
            };
            return Ok(subject.shape(TypeKind::Number { value }));
        }

        if flags.intersects(TypeFlags::STRING | TypeFlags::STRING_LITERAL) {
            let value = match oracle.literal_value(ty) {
                Some(LiteralValue::String(value)) => Some(value),
                _ => None,
            };
            return Ok(subject.shape(TypeKind::String { value }));
        }

        if flags.contains(TypeFlags::ES_SYMBOL) {
            return Ok(subject.shape(TypeKind::Symbol));
        }

        if flags.contains(TypeFlags::ARRAY) {
            let Some(element) = oracle.array_element_type(ty) else {
                return Ok(Expansion::Empty);
            };
            let element = self.resolve(Occurrence::nested(element, subject.declaration), filter)?;
            return Ok(match element {
                Some(element) => subject.shape(TypeKind::Array {
                    element: Box::new(element),
                }),
                None => Expansion::Empty,
            });
        }

        if subject.alias_type_arguments.is_empty() {
            if let Some(generic) = &subject.generic {
                let mut arguments = Vec::with_capacity(generic.arguments.len());
                for &node in &generic.arguments {
                    let Some(argument) = oracle.type_of_node(node) else {
                        continue;
                    };
                    if let Some(resolved) =
                        self.resolve(Occurrence::nested(argument, Some(node)), filter)?
                    {
                        arguments.push(resolved);
                    }
                }

                if !arguments.is_empty() && arguments.iter().all(ResolvedType::is_reference) {
                    let kind = TypeKind::Generic {
                        type_name: generic.name.clone(),
                        arguments: as_context(arguments, TypeContext::Parameter),
                    };
                    return Ok(Expansion::Finished(
                        subject.located(kind, generic.text.clone()),
                    ));
                }
            }
        }

        if flags.contains(TypeFlags::CLASS) {
            let declaration = subject
                .symbol_declaration
                .filter(|node| oracle.node_kind(*node) == NodeKind::ClassDeclaration);
            let Some(declaration) = declaration else {
                return Err(ResolveError::MissingClassDeclaration {
                    name: subject.metadata.name.clone().unwrap_or_default(),
                });
            };
            let mut class = self.class_descriptor(declaration, filter)?;
            if subject.metadata.name.is_some() {
                class.meta.name = subject.metadata.name.clone();
            }
            return Ok(Expansion::Shape(class));
        }

        if flags.contains(TypeFlags::ENUM) {
            let declaration = subject
                .symbol_declaration
                .filter(|node| oracle.node_kind(*node) == NodeKind::EnumDeclaration);
            let Some(declaration) = declaration else {
                return Err(ResolveError::MissingEnumDeclaration {
                    name: subject.metadata.name.clone().unwrap_or_default(),
                });
            };
            let members: IndexMap<_, _> = oracle.enum_members(declaration).into_iter().collect();
            return Ok(subject.shape(TypeKind::Enum { members }));
        }

        if flags.contains(TypeFlags::UNION) {
            return self.expand_union(subject, defaults, filter);
        }

        if flags.contains(TypeFlags::INTERSECTION) {
            let mut constituents = Vec::new();
            for member in oracle.intersection_members(ty) {
                let occurrence =
                    Occurrence::nested(member, subject.declaration).with_default(defaults);
                if let Some(resolved) = self.resolve(occurrence, filter)? {
                    constituents.push(resolved);
                }
            }
            if constituents.is_empty() {
                return Ok(Expansion::Empty);
            }

            // Object constituents contribute their properties; anything else
            // is kept whole.
            let all_objects = constituents.iter().all(ResolvedType::is_object);
            let mut properties = Vec::new();
            for constituent in constituents {
                match constituent.kind {
                    TypeKind::Object {
                        properties: members,
                    } => properties.extend(as_context(members, TypeContext::Property)),
                    _ => properties.push(constituent),
                }
            }
            if properties.is_empty() {
                return Ok(Expansion::Empty);
            }
            return Ok(subject.shape(if all_objects {
                TypeKind::Object { properties }
            } else {
                TypeKind::Intersection { properties }
            }));
        }

        if flags.contains(TypeFlags::TUPLE) {
            let labels = tuple_labels(&oracle.type_text(ty, None, TypeFormat::Declaration));
            let mut elements = Vec::new();
            for (index, element) in oracle.tuple_elements(ty).into_iter().enumerate() {
                let occurrence = Occurrence::nested(element, subject.declaration);
                if let Some(mut resolved) = self.resolve(occurrence, filter)? {
                    resolved.meta.context = Some(TypeContext::Parameter);
                    resolved.meta.name = labels.get(index).cloned().flatten();
                    elements.push(resolved);
                }
            }
            if elements.is_empty() {
                return Ok(Expansion::Empty);
            }
            return Ok(subject.shape(TypeKind::Tuple { elements }));
        }

        let signatures = oracle.call_signatures(ty);
        if !signatures.is_empty() {
            let signatures = self.call_signatures(&signatures, subject.declaration, filter, false)?;
            let name = subject.metadata.name.as_deref();
            let kind = if self.is_component(name, &signatures) {
                TypeKind::Component {
                    signatures: signatures.into_iter().map(ComponentSignature::from).collect(),
                }
            } else {
                TypeKind::Function { signatures }
            };
            return Ok(subject.shape(kind));
        }

        if flags.intersects(TypeFlags::PRIMITIVE) {
            return Ok(Expansion::Shape(ResolvedType::new(
                TypeKind::Primitive,
                TypeMeta::new(subject.text.clone()),
            )));
        }

        if flags.contains(TypeFlags::OBJECT) {
            let properties =
                self.type_properties(ty, occurrence.enclosing, filter, false, defaults)?;
            if !properties.is_empty() {
                return Ok(subject.shape(TypeKind::Object { properties }));
            }
            if subject.type_arguments.is_empty() {
                return Ok(Expansion::Empty);
            }

            let mut arguments = Vec::new();
            for &argument in &subject.type_arguments {
                let occurrence =
                    Occurrence::nested(argument, subject.declaration).with_default(defaults);
                if let Some(resolved) = self.resolve(occurrence, filter)? {
                    arguments.push(resolved);
                }
            }
            if arguments.is_empty() {
                return Ok(Expansion::Empty);
            }
            return Ok(subject.shape(TypeKind::Generic {
                type_name: subject.type_name.clone(),
                arguments: as_context(arguments, TypeContext::Parameter),
            }));
        }

        // One hop, resolved while `ty` is still in flight.
        let apparent = oracle.apparent_type(ty);
        if apparent != ty && !occurrence.is_apparent {
            let occurrence = Occurrence {
                is_apparent: true,
                ..Occurrence::nested(apparent, subject.declaration).with_default(defaults)
            };
            return Ok(match self.resolve(occurrence, filter)? {
                Some(resolved) => Expansion::Finished(resolved),
                None => Expansion::Empty,
            });
        }

        Ok(Expansion::Empty)
    }

    fn expand_union(
        &mut self,
        subject: &Subject,
        defaults: Option<&Value>,
        filter: SymbolFilter<'_>,
    ) -> Result<Expansion, ResolveError> {
        let oracle = self.oracle;

        // `A & (B | C)` is reported as a union; keep the intersection the
        // alias was written as.
        let intersection_node = subject
            .symbol_declaration
            .filter(|node| oracle.node_kind(*node) == NodeKind::TypeAliasDeclaration)
            .and_then(|node| oracle.type_annotation(node))
            .filter(|node| oracle.node_kind(*node) == NodeKind::IntersectionType);

        if let Some(node) = intersection_node {
            let mut properties = Vec::new();
            for type_node in oracle.intersection_type_nodes(node) {
                let Some(ty) = oracle.type_of_node(type_node) else {
                    continue;
                };
                if let Some(resolved) = self.resolve(Occurrence::nested(ty, Some(type_node)), filter)? {
                    properties.push(resolved);
                }
            }
            if properties.is_empty() {
                return Ok(Expansion::Empty);
            }
            return Ok(subject.shape(TypeKind::Intersection { properties }));
        }

        let mut members: Vec<ResolvedType> = Vec::new();
        let mut collapsed_boolean = false;

        for member in oracle.union_members(subject.ty) {
            let occurrence = Occurrence::nested(member, subject.declaration).with_default(defaults);
            let Some(mut resolved) = self.resolve(occurrence, filter)? else {
                continue;
            };

            let follows_boolean = members
                .last()
                .is_some_and(|previous| matches!(previous.kind, TypeKind::Boolean { .. }));
            if follows_boolean && matches!(resolved.kind, TypeKind::Boolean { .. }) {
                members.pop();
                resolved.kind = TypeKind::Boolean { value: None };
                resolved.meta.text = "boolean".to_string();
                collapsed_boolean = true;
            }
            members.push(resolved);
        }

        if members.is_empty() {
            return Ok(Expansion::Empty);
        }

        if collapsed_boolean && members.len() == 1 {
            return Ok(Expansion::Shape(ResolvedType::new(
                TypeKind::Boolean { value: None },
                TypeMeta::named(subject.metadata.name.clone(), "boolean"),
            )));
        }

        Ok(subject.shape(TypeKind::Union { members }))
    }

    /// Resolve the apparent properties of `ty`, applying `filter` to each
    /// property before recursing into it.
    pub(crate) fn type_properties(
        &mut self,
        ty: TypeId,
        enclosing: Option<NodeId>,
        filter: SymbolFilter<'_>,
        is_root: bool,
        default_values: Option<&Value>,
    ) -> Result<Vec<ResolvedType>, ResolveError> {
        let oracle = self.oracle;
        let is_readonly = self.is_type_readonly(ty, enclosing);
        let mut properties = Vec::new();

        for property in oracle.apparent_properties(ty) {
            let metadata = SymbolMetadata::classify(oracle, Some(property), enclosing);
            let name = oracle.symbol_name(property);

            if !filter(&metadata) {
                trace!(property = %name, "filtered out");
                continue;
            }

            let property_declaration = oracle.symbol_declarations(property).first().copied();
            let Some(declaration) = property_declaration.or(enclosing) else {
                return Err(ResolveError::MissingDeclaration {
                    name,
                    site: DeclarationSite::Property,
                });
            };

            let default_value = default_values.zip(property_declaration).and_then(
                |(values, node)| values.get(oracle.default_value_key(node)?.as_str()),
            );

            self.context.record_enclosing(declaration, metadata);

            let Some(property_type) = oracle.type_of_symbol_at(property, declaration) else {
                continue;
            };
            let occurrence = Occurrence::nested(property_type, Some(declaration))
                .with_root(is_root)
                .with_default(default_value);
            let Some(mut resolved) = self.resolve(occurrence, filter)? else {
                continue;
            };

            if let Some(docs) = oracle.js_doc(declaration) {
                resolved.meta.apply_docs(&docs);
            }

            let modifiers = property_declaration
                .map(|node| oracle.node_modifiers(node))
                .unwrap_or_default();
            resolved.meta.context = Some(TypeContext::Property);
            resolved.meta.name = Some(name);
            resolved.meta.default_value = default_value.cloned();
            resolved.meta.is_optional =
                Some(modifiers.contains(Modifiers::QUESTION_TOKEN) || has_value(default_value));
            resolved.meta.is_readonly =
                Some(is_readonly || modifiers.contains(Modifiers::READONLY));
            properties.push(resolved);
        }

        Ok(properties)
    }

    /// `Readonly<T>` from the standard library, or an `as const` initializer.
    fn is_type_readonly(&self, ty: TypeId, enclosing: Option<NodeId>) -> bool {
        let oracle = self.oracle;

        if oracle
            .type_text(ty, None, TypeFormat::Declaration)
            .starts_with("Readonly")
        {
            let from_standard_library = oracle
                .type_symbol(ty)
                .and_then(|symbol| oracle.symbol_declarations(symbol).first().copied())
                .map(|node| oracle.file_path(oracle.node_source_file(node)))
                .is_some_and(|path| path.replace('\\', "/").contains("node_modules/typescript"));
            if from_standard_library {
                return true;
            }
        }

        enclosing.is_some_and(|node| {
            oracle.node_kind(node) == NodeKind::VariableDeclaration
                && oracle.has_const_assertion(node)
        })
    }

    fn every_type_in_vendor(&self, types: &[TypeId]) -> bool {
        let oracle = self.oracle;
        !types.is_empty()
            && types.iter().all(|ty| {
                oracle
                    .type_symbol(*ty)
                    .and_then(|symbol| oracle.symbol_declarations(symbol).first().copied())
                    .is_some_and(|node| oracle.is_vendor_file(oracle.node_source_file(node)))
            })
    }
}

/// Whether a default value was supplied.
pub(crate) fn has_value(value: Option<&Value>) -> bool {
    value.is_some_and(|value| !value.is_null())
}

fn as_context(mut types: Vec<ResolvedType>, context: TypeContext) -> Vec<ResolvedType> {
    for ty in &mut types {
        ty.meta.context = Some(context);
    }
    types
}

/// Element labels of a rendered tuple type: `[string, count: number]` gives
/// `[None, Some("count")]`. Optional and rest markers are stripped.
pub(crate) fn tuple_labels(text: &str) -> SmallVec<[Option<String>; 8]> {
    let text = text.trim();
    let text = text.strip_prefix("readonly ").unwrap_or(text).trim();
    let Some(inner) = text.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) else {
        return SmallVec::new();
    };
    if inner.trim().is_empty() {
        return SmallVec::new();
    }

    let mut labels = SmallVec::new();
    let mut start = 0;
    for end in top_level_offsets(inner, ',')
        .into_iter()
        .chain(std::iter::once(inner.len()))
    {
        labels.push(tuple_label(&inner[start..end]));
        start = end + 1;
    }
    labels
}

fn tuple_label(element: &str) -> Option<String> {
    let colon = top_level_offsets(element, ':').first().copied()?;
    let label = element[..colon].trim();
    let label = label.strip_prefix("...").unwrap_or(label);
    let label = label.strip_suffix('?').unwrap_or(label).trim();

    let is_identifier = !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    is_identifier.then(|| label.to_string())
}

/// Byte offsets of `target` outside brackets and string literals.
fn top_level_offsets(text: &str, target: char) -> SmallVec<[usize; 8]> {
    let mut offsets = SmallVec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut previous = '\0';

    for (offset, c) in text.char_indices() {
        if let Some(open) = quote {
            if c == open && previous != '\\' {
                quote = None;
            }
        } else {
            match c {
                '"' | '\'' | '`' => quote = Some(c),
                '(' | '[' | '{' | '<' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                // `=>` is not a closing bracket
                '>' if previous != '=' => depth = depth.saturating_sub(1),
                _ if c == target && depth == 0 => offsets.push(offset),
                _ => {}
            }
        }
        previous = c;
    }

    offsets
}

#[cfg(test)]
#[path = "tests/resolve_tests.rs"]
mod tests;
