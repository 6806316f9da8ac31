//! Call signature resolution.

use tracing::trace;

use crate::error::{DeclarationSite, ResolveError};
use crate::metadata::{SymbolFilter, is_synthetic_name};
use crate::oracle::{Modifiers, NodeId, NodeKind, SignatureId, TypeFormat, TypeOracle};
use crate::resolve::{Occurrence, TypeResolver, has_value};
use crate::types::{FunctionSignature, ResolvedType, SignatureModifier, TypeContext};

impl<O: TypeOracle + ?Sized> TypeResolver<'_, O> {
    /// Resolve every signature in `signatures`, dropping the ones that resolve
    /// to nothing.
    ///
    /// `enclosing` stands in for parameters that have no declaration of their
    /// own; without either the call fails with
    /// [`ResolveError::MissingDeclaration`].
    #[tracing::instrument(level = "debug", skip_all, fields(count = signatures.len()))]
    pub fn resolve_call_signatures(
        &mut self,
        signatures: &[SignatureId],
        enclosing: Option<NodeId>,
        filter: SymbolFilter<'_>,
    ) -> Result<Vec<FunctionSignature>, ResolveError> {
        for &signature in signatures {
            self.known_signature(signature)?;
        }
        self.known_node(enclosing)?;
        self.begin_request();
        self.call_signatures(signatures, enclosing, filter, true)
    }

    /// Resolve a single signature.
    ///
    /// Returns `Ok(None)` for a dependency signature whose parameters were all
    /// filtered out.
    pub fn resolve_signature(
        &mut self,
        signature: SignatureId,
        enclosing: Option<NodeId>,
        filter: SymbolFilter<'_>,
    ) -> Result<Option<FunctionSignature>, ResolveError> {
        self.known_signature(signature)?;
        self.known_node(enclosing)?;
        self.begin_request();
        self.signature(signature, enclosing, filter, true)
    }

    pub(crate) fn call_signatures(
        &mut self,
        signatures: &[SignatureId],
        enclosing: Option<NodeId>,
        filter: SymbolFilter<'_>,
        is_root: bool,
    ) -> Result<Vec<FunctionSignature>, ResolveError> {
        let mut resolved = Vec::with_capacity(signatures.len());
        for &signature in signatures {
            if let Some(signature) = self.signature(signature, enclosing, filter, is_root)? {
                resolved.push(signature);
            }
        }
        Ok(resolved)
    }

    pub(crate) fn signature(
        &mut self,
        signature: SignatureId,
        enclosing: Option<NodeId>,
        filter: SymbolFilter<'_>,
        is_root: bool,
    ) -> Result<Option<FunctionSignature>, ResolveError> {
        let oracle = self.oracle;
        let declaration = oracle.signature_declaration(signature);
        let declared = oracle.signature_parameters(signature);

        let mut parameters = Vec::with_capacity(declared.len());
        for &parameter in &declared {
            let parameter_declaration = oracle.symbol_declarations(parameter).first().copied();
            let Some(context_node) = parameter_declaration.or(enclosing) else {
                return Err(ResolveError::MissingDeclaration {
                    name: oracle.symbol_name(parameter),
                    site: DeclarationSite::Parameter,
                });
            };

            let default_value =
                parameter_declaration.and_then(|node| oracle.default_value(node));
            let location = declaration.unwrap_or(context_node);
            let Some(ty) = oracle.type_of_symbol_at(parameter, location) else {
                continue;
            };

            let occurrence = Occurrence::nested(ty, Some(context_node))
                .with_root(is_root)
                .with_default(default_value.as_ref());
            let Some(mut resolved) = self.resolve(occurrence, filter)? else {
                continue;
            };

            let name = oracle.symbol_name(parameter);
            let question_token = parameter_declaration
                .is_some_and(|node| oracle.node_modifiers(node).contains(Modifiers::QUESTION_TOKEN));

            resolved.meta.context = Some(TypeContext::Parameter);
            resolved.meta.name = (!is_synthetic_name(&name)).then_some(name);
            resolved.meta.is_optional = Some(question_token || has_value(default_value.as_ref()));
            resolved.meta.default_value = default_value;
            resolved.meta.description = oracle.symbol_description(parameter);
            parameters.push(resolved);
        }

        let in_vendor_file = declaration
            .is_some_and(|node| oracle.is_vendor_file(oracle.node_source_file(node)));
        if !declared.is_empty() && parameters.is_empty() && in_vendor_file {
            trace!(signature = signature.0, "dependency signature with filtered parameters");
            return Ok(None);
        }

        let return_type = oracle.type_text(
            oracle.signature_return_type(signature),
            None,
            TypeFormat::Signature,
        );
        let type_parameters = oracle.signature_type_parameters(signature);
        let generics = if type_parameters.is_empty() {
            String::new()
        } else {
            format!("<{}>", type_parameters.join(", "))
        };
        let parameters_text = parameters
            .iter()
            .map(parameter_text)
            .collect::<Vec<_>>()
            .join(", ");

        let kind = declaration.map(|node| oracle.node_kind(node));
        let function_name = declaration
            .filter(|_| kind == Some(NodeKind::FunctionDeclaration))
            .and_then(|node| oracle.node_name(node));
        let text = match function_name {
            Some(name) => format!("{name}{generics}({parameters_text}): {return_type}"),
            None => format!("{generics}({parameters_text}) => {return_type}"),
        };

        let modifier = match (declaration, kind) {
            (Some(node), Some(NodeKind::FunctionDeclaration | NodeKind::MethodDeclaration)) => {
                modifier_of(oracle.node_modifiers(node))
            }
            _ => None,
        };

        Ok(Some(FunctionSignature {
            text,
            parameters,
            return_type,
            modifier,
        }))
    }
}

fn parameter_text(parameter: &ResolvedType) -> String {
    match parameter.name() {
        Some(name) => {
            let question = if parameter.meta.is_optional == Some(true) {
                "?"
            } else {
                ""
            };
            format!("{name}{question}: {}", parameter.text())
        }
        None => parameter.text().to_string(),
    }
}

/// `async` takes precedence over `generator`.
pub(crate) fn modifier_of(modifiers: Modifiers) -> Option<SignatureModifier> {
    if modifiers.contains(Modifiers::ASYNC) {
        Some(SignatureModifier::Async)
    } else if modifiers.contains(Modifiers::GENERATOR) {
        Some(SignatureModifier::Generator)
    } else {
        None
    }
}
