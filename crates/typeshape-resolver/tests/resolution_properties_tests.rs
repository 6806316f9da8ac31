//! End-to-end resolution over snapshot fixtures.

use serde_json::json;
use typeshape_resolver::snapshot::{NodeData, SignatureData, SymbolData, TypeData};
use typeshape_resolver::{
    AccessorKind, DeclarationSite, EnumMemberValue, MemberKind, Modifiers, NodeId, NodeKind,
    ProgramSnapshot, ResolveError, ResolvedType, ResolverOptions, Scope, SignatureId,
    SignatureModifier, SnapshotBuilder, SymbolId, TypeContext, TypeFlags, TypeId, TypeKind,
    TypeResolver, Visibility, exclude_node_modules, include_all,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn resolve(snapshot: &ProgramSnapshot, ty: TypeId, enclosing: NodeId) -> Option<ResolvedType> {
    init_tracing();
    TypeResolver::new(snapshot)
        .resolve_type(ty, Some(enclosing), &exclude_node_modules)
        .unwrap()
}

fn properties(resolved: &ResolvedType) -> &[ResolvedType] {
    match &resolved.kind {
        TypeKind::Object { properties } => properties,
        other => panic!("expected an object, got {}", other.name()),
    }
}

fn property<'r>(resolved: &'r ResolvedType, name: &str) -> &'r ResolvedType {
    properties(resolved)
        .iter()
        .find(|property| property.name() == Some(name))
        .unwrap_or_else(|| panic!("no property named {name}"))
}

fn references(resolved: &ResolvedType) -> Vec<ResolvedType> {
    let mut found = Vec::new();
    resolved.walk(&mut |ty| {
        if ty.is_reference() {
            found.push(ty.clone());
        }
    });
    found
}

fn signature(
    b: &mut SnapshotBuilder,
    declaration: NodeId,
    parameters: Vec<SymbolId>,
    return_type: TypeId,
) -> SignatureId {
    let signature = b.add_signature(SignatureData {
        declaration: Some(declaration),
        parameters,
        type_parameters: Vec::new(),
        return_type,
    });
    b.node_mut(declaration).signature = Some(signature);
    signature
}

/// `interface TreeNode { name: string; children: TreeNode[] }`
fn tree(exported: bool) -> (ProgramSnapshot, TypeId, NodeId) {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/tree.ts");
    let declaration = b.interface(file, "TreeNode", exported);
    let string = b.string();
    let name = b.property(file, "name", string);
    let tree = b.interface_type(declaration, Vec::new());
    let children_type = b.array("TreeNode[]", tree);
    let children = b.property(file, "children", children_type);
    b.type_mut(tree).properties = vec![name, children];
    (b.build().unwrap(), tree, declaration.1)
}

// =============================================================================
// Termination
// =============================================================================

#[test]
fn self_recursive_types_terminate_with_a_reference() {
    for exported in [false, true] {
        let (snapshot, tree, node) = tree(exported);
        let resolved = resolve(&snapshot, tree, node).unwrap();

        assert_eq!(resolved.name(), Some("TreeNode"));
        assert_eq!(resolved.meta.file_path.as_deref(), Some("src/tree.ts"));
        let children = property(&resolved, "children");
        let TypeKind::Array { element } = &children.kind else {
            panic!("expected an array, got {}", children.kind_name());
        };
        assert!(element.is_reference());
        assert_eq!(element.text(), "TreeNode");
        assert_eq!(element.meta.file_path.as_deref(), Some("src/tree.ts"));
    }
}

/// `interface A { b: B }` and `interface B { a: A }`
fn mutual(exported: bool) -> (ProgramSnapshot, TypeId, NodeId) {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/mutual.ts");
    let a_declaration = b.interface(file, "A", exported);
    let b_declaration = b.interface(file, "B", exported);
    let a = b.interface_type(a_declaration, Vec::new());
    let b_type = b.interface_type(b_declaration, Vec::new());
    let a_to_b = b.property(file, "b", b_type);
    let b_to_a = b.property(file, "a", a);
    b.type_mut(a).properties = vec![a_to_b];
    b.type_mut(b_type).properties = vec![b_to_a];
    (b.build().unwrap(), a, a_declaration.1)
}

#[test]
fn mutually_recursive_types_terminate() {
    let (snapshot, a, node) = mutual(false);
    let resolved = resolve(&snapshot, a, node).unwrap();
    let b = property(&resolved, "b");
    assert!(b.is_object(), "unexported B is expanded in place");
    assert!(property(b, "a").is_reference());

    let (snapshot, a, node) = mutual(true);
    let resolved = resolve(&snapshot, a, node).unwrap();
    assert!(property(&resolved, "b").is_reference(), "exported B is referenced");
}

#[test]
fn every_reference_has_a_file_path() {
    for exported in [false, true] {
        for (snapshot, ty, node) in [tree(exported), mutual(exported)] {
            let resolved = resolve(&snapshot, ty, node).unwrap();
            for reference in references(&resolved) {
                assert!(
                    reference
                        .meta
                        .file_path
                        .as_deref()
                        .is_some_and(|path| !path.is_empty()),
                    "reference {} has no file path",
                    reference.text()
                );
                assert!(reference.meta.position.is_some());
            }
        }
    }
}

#[test]
fn references_without_a_path_are_fatal() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("");
    let target = b.interface(file, "Target", true);
    let target = b.interface_type(target, Vec::new());
    let root = b.interface(file, "Root", false);
    let field = b.property(file, "target", target);
    let root_type = b.interface_type(root, vec![field]);
    let snapshot = b.build().unwrap();

    let err = TypeResolver::new(&snapshot)
        .resolve_type(root_type, Some(root.1), &exclude_node_modules)
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::MissingReferenceLocation {
            text: "Target".to_string()
        }
    );
}

#[test]
fn depth_limit_reports_unknown() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/deep.ts");
    let alias = b.type_alias(file, "Deep", false);
    let string = b.string();
    let c = b.property(file, "c", string);
    let inner = b.object("{ c: string; }", None, vec![c]);
    let b_property = b.property(file, "b", inner);
    let middle = b.object("{ b: { c: string; }; }", None, vec![b_property]);
    let a = b.property(file, "a", middle);
    let outer = b.object("{ a: { b: { c: string; }; }; }", None, vec![a]);
    let snapshot = b.build().unwrap();

    let options = ResolverOptions {
        max_depth: 2,
        ..ResolverOptions::default()
    };
    let resolved = TypeResolver::with_options(&snapshot, &options)
        .resolve_type(outer, Some(alias.1), &exclude_node_modules)
        .unwrap()
        .unwrap();

    let limited = property(property(&resolved, "a"), "b");
    assert_eq!(limited.kind, TypeKind::Unknown);
    assert_eq!(limited.text(), "{ c: string; }");
}

// =============================================================================
// Idempotence
// =============================================================================

#[test]
fn fresh_contexts_produce_identical_trees() {
    let (snapshot, a, node) = mutual(true);
    assert_eq!(resolve(&snapshot, a, node), resolve(&snapshot, a, node));
}

#[test]
fn shared_contexts_produce_identical_trees() {
    let (snapshot, a, node) = mutual(true);
    let mut resolver = TypeResolver::new(&snapshot);
    let first = resolver.resolve_type(a, Some(node), &exclude_node_modules).unwrap();
    let second = resolver.resolve_type(a, Some(node), &exclude_node_modules).unwrap();
    assert_eq!(first, second);
    assert!(!resolver.context().object_references().is_empty());
}

// =============================================================================
// Unions and booleans
// =============================================================================

#[test]
fn true_false_unions_collapse_to_boolean() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/toggle.ts");
    let declaration = b.interface(file, "ToggleProps", false);
    let falsy = b.boolean_literal(false);
    let truthy = b.boolean_literal(true);
    let string = b.string();
    let flag_type = b.union("true | false", vec![falsy, truthy]);
    let mode_type = b.union("string | true | false", vec![string, falsy, truthy]);
    let flag = b.property(file, "flag", flag_type);
    let mode = b.property(file, "mode", mode_type);
    let toggle = b.interface_type(declaration, vec![flag, mode]);
    let snapshot = b.build().unwrap();

    let resolved = resolve(&snapshot, toggle, declaration.1).unwrap();

    let flag = property(&resolved, "flag");
    assert_eq!(flag.kind, TypeKind::Boolean { value: None });
    assert_eq!(flag.text(), "boolean");
    assert_eq!(flag.meta.context, Some(TypeContext::Property));

    let mode = property(&resolved, "mode");
    let TypeKind::Union { members } = &mode.kind else {
        panic!("expected a union, got {}", mode.kind_name());
    };
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].kind, TypeKind::String { value: None });
    assert_eq!(members[1].kind, TypeKind::Boolean { value: None });
    assert_eq!(members[1].text(), "boolean");
}

#[test]
fn literals_carry_their_values() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/size.ts");
    let alias = b.type_alias(file, "Size", false);
    let small = b.string_literal("sm");
    let large = b.number_literal(2.0);
    let size = b.union("\"sm\" | 2", vec![small, large]);
    let snapshot = b.build().unwrap();

    let resolved = resolve(&snapshot, size, alias.1).unwrap();
    let TypeKind::Union { members } = &resolved.kind else {
        panic!("expected a union");
    };
    assert_eq!(
        members[0].kind,
        TypeKind::String {
            value: Some("sm".to_string())
        }
    );
    assert_eq!(members[1].kind, TypeKind::Number { value: Some(2.0) });
}

// =============================================================================
// Empty results
// =============================================================================

/// `interface Props { label: string; style: { color: string } }` where
/// `color` is declared in dependency code.
fn styled(with_label: bool) -> (ProgramSnapshot, TypeId, NodeId) {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/Box.tsx");
    let vendor = b.file("node_modules/csstype/index.d.ts");
    let declaration = b.interface(file, "Props", false);
    let string = b.string();
    let color = b.property(vendor, "color", string);
    let style_type = b.object("{ color: string; }", None, vec![color]);
    let style = b.property(file, "style", style_type);
    let mut members = vec![style];
    if with_label {
        members.insert(0, b.property(file, "label", string));
    }
    let props = b.interface_type(declaration, members);
    (b.build().unwrap(), props, declaration.1)
}

#[test]
fn filtered_properties_propagate_as_empty() {
    let (snapshot, props, node) = styled(true);
    let resolved = resolve(&snapshot, props, node).unwrap();
    let names: Vec<_> = properties(&resolved).iter().filter_map(ResolvedType::name).collect();
    assert_eq!(names, vec!["label"]);

    let (snapshot, props, node) = styled(false);
    assert_eq!(resolve(&snapshot, props, node), None);
}

#[test]
fn include_all_keeps_vendor_properties() {
    let (snapshot, props, node) = styled(false);
    let resolved = TypeResolver::new(&snapshot)
        .resolve_type(props, Some(node), &include_all)
        .unwrap()
        .unwrap();
    let style = property(&resolved, "style");
    assert_eq!(properties(style)[0].name(), Some("color"));
}

#[test]
fn resolve_type_properties_lists_the_apparent_properties() {
    let (snapshot, props, node) = styled(true);
    let resolved = TypeResolver::new(&snapshot)
        .resolve_type_properties(props, Some(node), &exclude_node_modules)
        .unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].name(), Some("label"));
    assert_eq!(resolved[0].meta.is_optional, Some(false));
    assert_eq!(resolved[0].meta.is_readonly, Some(false));
}

// =============================================================================
// Tuples and intersections
// =============================================================================

#[test]
fn tuple_elements_take_their_labels() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/entry.ts");
    let alias = b.type_alias(file, "Entry", false);
    let string = b.string();
    let number = b.number();
    let entry = b.tuple("[string, count: number]", vec![string, number]);
    let snapshot = b.build().unwrap();

    let resolved = resolve(&snapshot, entry, alias.1).unwrap();
    let TypeKind::Tuple { elements } = &resolved.kind else {
        panic!("expected a tuple, got {}", resolved.kind_name());
    };
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].kind, TypeKind::String { value: None });
    assert_eq!(elements[0].name(), None);
    assert_eq!(elements[1].kind, TypeKind::Number { value: None });
    assert_eq!(elements[1].name(), Some("count"));
    assert!(elements
        .iter()
        .all(|element| element.meta.context == Some(TypeContext::Parameter)));
}

#[test]
fn object_intersections_flatten_into_one_object() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/ab.ts");
    let alias = b.type_alias(file, "AB", false);
    let string = b.string();
    let number = b.number();
    let a = b.property(file, "a", string);
    let left = b.object("{ a: string; }", None, vec![a]);
    let b_property = b.property(file, "b", number);
    let right = b.object("{ b: number; }", None, vec![b_property]);
    let both = b.intersection("{ a: string; } & { b: number; }", vec![left, right]);
    let snapshot = b.build().unwrap();

    let resolved = resolve(&snapshot, both, alias.1).unwrap();
    let names: Vec<_> = properties(&resolved).iter().filter_map(ResolvedType::name).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(properties(&resolved)
        .iter()
        .all(|property| property.meta.context == Some(TypeContext::Property)));
}

#[test]
fn mixed_intersections_spread_object_constituents() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/brand.ts");
    let alias = b.type_alias(file, "Id", false);
    let string = b.string();
    let tag = b.property(file, "tag", string);
    let brand = b.object("{ tag: string; }", None, vec![tag]);
    let id = b.intersection("string & { tag: string; }", vec![string, brand]);
    let snapshot = b.build().unwrap();

    let resolved = resolve(&snapshot, id, alias.1).unwrap();
    let TypeKind::Intersection { properties } = &resolved.kind else {
        panic!("expected an intersection, got {}", resolved.kind_name());
    };
    let shape: Vec<_> = properties
        .iter()
        .map(|property| (property.kind_name(), property.name()))
        .collect();
    assert_eq!(shape, vec![("String", None), ("String", Some("tag"))]);
    assert_eq!(properties[1].meta.context, Some(TypeContext::Property));
}

#[test]
fn aliased_intersection_of_a_union_stays_an_intersection() {
    // type Props = Base & (A | B): reported by the checker as a union
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/props.ts");
    let alias = b.type_alias(file, "Props", false);
    let string = b.string();
    let number = b.number();
    let id = b.property(file, "id", string);
    let base = b.object("{ id: string; }", None, vec![id]);
    let count = b.property(file, "count", number);
    let variant = b.object("{ count: number; }", None, vec![count]);
    let union = b.union("Props", vec![base, variant]);
    b.type_mut(union).alias_symbol = Some(alias.0);

    let base_node = b.declaration(file, NodeKind::TypeLiteral, None);
    b.node_mut(base_node).ty = Some(base);
    let variant_node = b.declaration(file, NodeKind::TypeLiteral, None);
    b.node_mut(variant_node).ty = Some(variant);
    let annotation = b.add_node(NodeData {
        kind: NodeKind::IntersectionType,
        file,
        type_nodes: vec![base_node, variant_node],
        ..NodeData::default()
    });
    b.node_mut(alias.1).type_annotation = Some(annotation);
    let snapshot = b.build().unwrap();

    let resolved = resolve(&snapshot, union, alias.1).unwrap();
    let TypeKind::Intersection { properties } = &resolved.kind else {
        panic!("expected an intersection, got {}", resolved.kind_name());
    };
    assert_eq!(properties.len(), 2);
    assert_eq!(resolved.name(), Some("Props"));
}

// =============================================================================
// Signatures
// =============================================================================

/// `configure(options: { retries: string }): void` with `retries` declared in
/// dependency code.
fn configure(function_path: &str) -> (ProgramSnapshot, SignatureId) {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file(function_path);
    let vendor = b.file("node_modules/retry/index.d.ts");
    let string = b.string();
    let retries = b.property(vendor, "retries", string);
    let options_type = b.object("{ retries: string; }", None, vec![retries]);
    let options = b.parameter(file, "options", options_type);
    let void = b.primitive(TypeFlags::UNDEFINED, "void");
    let function = b.function(file, "configure", vec![options], void, true);
    (b.build().unwrap(), function.signature)
}

#[test]
fn vendor_signatures_with_filtered_parameters_are_dropped() {
    let (snapshot, signature) = configure("node_modules/retry/configure.d.ts");
    let resolved = TypeResolver::new(&snapshot)
        .resolve_call_signatures(&[signature], None, &exclude_node_modules)
        .unwrap();
    assert!(resolved.is_empty());
}

#[test]
fn first_party_signatures_keep_an_empty_parameter_list() {
    let (snapshot, signature) = configure("src/configure.ts");
    let resolved = TypeResolver::new(&snapshot)
        .resolve_call_signatures(&[signature], None, &exclude_node_modules)
        .unwrap();
    assert_eq!(resolved.len(), 1);
    assert!(resolved[0].parameters.is_empty());
    assert_eq!(resolved[0].text, "configure(): void");
    assert_eq!(resolved[0].return_type, "void");
}

#[test]
fn parameters_carry_optionality_defaults_and_descriptions() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/math.ts");
    let number = b.number();
    let value = b.parameter(file, "value", number);
    let precision = b.parameter(file, "precision", number);
    let precision_node = b.declaration_of(precision).unwrap();
    b.node_mut(precision_node).default_value = Some(json!(2));
    b.symbol_mut(precision).description = Some("Digits after the point.".to_string());
    let hidden = b.parameter(file, "__0", number);
    let hidden_node = b.declaration_of(hidden).unwrap();
    b.node_mut(hidden_node).modifiers |= Modifiers::QUESTION_TOKEN;
    let function = b.function(file, "round", vec![value, precision, hidden], number, true);
    b.node_mut(function.node).modifiers |= Modifiers::ASYNC | Modifiers::GENERATOR;
    let snapshot = b.build().unwrap();

    let resolved = TypeResolver::new(&snapshot)
        .resolve_signature(function.signature, None, &exclude_node_modules)
        .unwrap()
        .unwrap();

    let [value, precision, hidden] = resolved.parameters.as_slice() else {
        panic!("expected three parameters");
    };
    assert_eq!(value.meta.is_optional, Some(false));
    assert_eq!(precision.meta.is_optional, Some(true));
    assert_eq!(precision.meta.default_value, Some(json!(2)));
    assert_eq!(
        precision.meta.description.as_deref(),
        Some("Digits after the point.")
    );
    assert_eq!(hidden.name(), None);
    assert_eq!(hidden.meta.is_optional, Some(true));
    assert!(resolved
        .parameters
        .iter()
        .all(|parameter| parameter.meta.context == Some(TypeContext::Parameter)));

    assert_eq!(
        resolved.text,
        "round(value: number, precision?: number, number): number"
    );
    assert_eq!(resolved.modifier, Some(SignatureModifier::Async));
}

#[test]
fn anonymous_signatures_use_arrow_text() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/callbacks.ts");
    let string = b.string();
    let arrow = b.declaration(file, NodeKind::ArrowFunction, None);
    let value = b.parameter(file, "value", string);
    let signature = signature(&mut b, arrow, vec![value], string);
    let snapshot = b.build().unwrap();

    let mut resolver = TypeResolver::new(&snapshot);
    let resolved = resolver
        .resolve_signature(signature, None, &exclude_node_modules)
        .unwrap()
        .unwrap();
    assert_eq!(resolved.text, "(value: string) => string");
    assert_eq!(resolved.modifier, None);
}

#[test]
fn generic_signatures_render_their_type_parameters() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/identity.ts");
    let string = b.string();
    let value = b.parameter(file, "value", string);
    let function = b.function(file, "identity", vec![value], string, true);
    let generic = b.add_signature(SignatureData {
        declaration: Some(function.node),
        parameters: vec![value],
        type_parameters: vec!["T".to_string(), "U extends object = {}".to_string()],
        return_type: string,
    });
    let snapshot = b.build().unwrap();

    let resolved = TypeResolver::new(&snapshot)
        .resolve_signature(generic, None, &exclude_node_modules)
        .unwrap()
        .unwrap();
    assert_eq!(
        resolved.text,
        "identity<T, U extends object = {}>(value: string): string"
    );
}

#[test]
fn parameters_without_any_declaration_are_fatal() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/synthetic.ts");
    let string = b.string();
    let loose = b.add_symbol(SymbolData {
        name: "value".to_string(),
        ty: Some(string),
        ..SymbolData::default()
    });
    let signature = b.add_signature(SignatureData {
        declaration: None,
        parameters: vec![loose],
        type_parameters: Vec::new(),
        return_type: string,
    });
    let enclosing = b.declaration(file, NodeKind::VariableDeclaration, Some("fn"));
    let snapshot = b.build().unwrap();

    let mut resolver = TypeResolver::new(&snapshot);
    let err = resolver
        .resolve_signature(signature, None, &exclude_node_modules)
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::MissingDeclaration {
            name: "value".to_string(),
            site: DeclarationSite::Parameter,
        }
    );

    let resolved = resolver
        .resolve_signature(signature, Some(enclosing), &exclude_node_modules)
        .unwrap()
        .unwrap();
    assert_eq!(resolved.parameters[0].name(), Some("value"));
}

// =============================================================================
// Classes and enums
// =============================================================================

struct Counter {
    snapshot: ProgramSnapshot,
    node: NodeId,
    ty: TypeId,
}

/// ```text
/// export class Counter {
///     constructor(initial: number)
///     get value(): number
///     set value(next: number)
///     increment(by?: number): void
///     static async load(): Promise<Counter>
///     public readonly step = 1
///     private secret: string
/// }
/// ```
fn counter(setter_signature: bool) -> Counter {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/counter.ts");
    let number = b.number();
    let string = b.string();
    let void = b.primitive(TypeFlags::UNDEFINED, "void");

    let node = b.declaration(file, NodeKind::ClassDeclaration, Some("Counter"));
    b.node_mut(node).modifiers |= Modifiers::EXPORT;
    let symbol = b.declare("Counter", node);
    let ty = b.add_type(TypeData {
        flags: TypeFlags::CLASS | TypeFlags::OBJECT,
        text: "Counter".to_string(),
        symbol: Some(symbol),
        ..TypeData::default()
    });
    b.node_mut(node).ty = Some(ty);

    let constructor = b.declaration(file, NodeKind::Constructor, None);
    let initial = b.parameter(file, "initial", number);
    signature(&mut b, constructor, vec![initial], ty);

    let getter = b.declaration(file, NodeKind::GetAccessor, Some("value"));
    b.node_mut(getter).ty = Some(number);
    let setter = b.declaration(file, NodeKind::SetAccessor, Some("value"));
    b.node_mut(setter).ty = Some(number);
    if setter_signature {
        let next = b.parameter(file, "next", number);
        signature(&mut b, setter, vec![next], void);
    }

    let increment = b.declaration(file, NodeKind::MethodDeclaration, Some("increment"));
    let by = b.parameter(file, "by", number);
    let by_node = b.declaration_of(by).unwrap();
    b.node_mut(by_node).modifiers |= Modifiers::QUESTION_TOKEN;
    let increment_signature = signature(&mut b, increment, vec![by], void);
    let increment_type = b.add_type(TypeData {
        flags: TypeFlags::OBJECT,
        text: "(by?: number) => void".to_string(),
        signatures: vec![increment_signature],
        ..TypeData::default()
    });
    b.node_mut(increment).ty = Some(increment_type);

    let load = b.declaration(file, NodeKind::MethodDeclaration, Some("load"));
    b.node_mut(load).modifiers |= Modifiers::STATIC | Modifiers::ASYNC;
    let promise = b.object("Promise<Counter>", None, Vec::new());
    let load_signature = signature(&mut b, load, Vec::new(), promise);
    let load_type = b.add_type(TypeData {
        flags: TypeFlags::OBJECT,
        text: "() => Promise<Counter>".to_string(),
        signatures: vec![load_signature],
        ..TypeData::default()
    });
    b.node_mut(load).ty = Some(load_type);

    let step = b.declaration(file, NodeKind::PropertyDeclaration, Some("step"));
    let step_data = b.node_mut(step);
    step_data.ty = Some(number);
    step_data.modifiers |= Modifiers::PUBLIC | Modifiers::READONLY;
    step_data.default_value = Some(json!(1));

    let secret = b.declaration(file, NodeKind::PropertyDeclaration, Some("secret"));
    b.node_mut(secret).ty = Some(string);
    b.node_mut(secret).modifiers |= Modifiers::PRIVATE;

    let class = b.node_mut(node);
    class.constructors = vec![constructor];
    class.members = vec![getter, setter, increment, load, step, secret];

    Counter {
        snapshot: b.build().unwrap(),
        node,
        ty,
    }
}

#[test]
fn classes_decompose_into_members() {
    let counter = counter(true);
    let resolved = TypeResolver::new(&counter.snapshot)
        .resolve_class(counter.node, &exclude_node_modules)
        .unwrap();

    assert_eq!(resolved.name(), Some("Counter"));
    let TypeKind::Class(class) = &resolved.kind else {
        panic!("expected a class, got {}", resolved.kind_name());
    };

    let constructors = class.constructors.as_ref().unwrap();
    assert_eq!(constructors.len(), 1);
    assert_eq!(constructors[0].text, "(initial: number) => Counter");

    assert_eq!(class.accessors.len(), 2);
    assert_eq!(class.accessors[0].kind, AccessorKind::ClassGetAccessor);
    assert!(class.accessors[0].signature.is_none());
    assert_eq!(class.accessors[1].kind, AccessorKind::ClassSetAccessor);
    let setter = class.accessors[1].signature.as_ref().unwrap();
    assert_eq!(setter.parameters[0].name(), Some("next"));

    assert_eq!(class.methods.len(), 2);
    assert_eq!(class.methods[0].member.name, "increment");
    assert_eq!(class.methods[0].signatures[0].text, "(by?: number) => void");
    assert_eq!(class.methods[1].member.scope, Some(Scope::Static));
    assert_eq!(
        class.methods[1].signatures[0].modifier,
        Some(SignatureModifier::Async)
    );

    assert_eq!(class.properties.len(), 1, "private members are excluded");
    let step = &class.properties[0];
    assert_eq!(step.ty.name(), Some("step"));
    assert_eq!(step.ty.kind, TypeKind::Number { value: None });
    assert_eq!(step.ty.meta.default_value, Some(json!(1)));
    assert_eq!(step.ty.meta.is_readonly, Some(true));
    assert_eq!(step.visibility, Some(Visibility::Public));
}

#[test]
fn class_types_resolve_through_resolve_type() {
    let counter = counter(true);
    let resolved = resolve(&counter.snapshot, counter.ty, counter.node).unwrap();
    assert_eq!(resolved.kind_name(), "Class");
    assert_eq!(resolved.name(), Some("Counter"));
    assert_eq!(resolved.meta.file_path.as_deref(), Some("src/counter.ts"));
}

#[test]
fn class_json_uses_member_tags() {
    let counter = counter(true);
    let resolved = TypeResolver::new(&counter.snapshot)
        .resolve_class(counter.node, &exclude_node_modules)
        .unwrap();
    let json = serde_json::to_value(&resolved).unwrap();

    assert_eq!(json["kind"], "Class");
    assert_eq!(json["accessors"][1]["kind"], "ClassSetAccessor");
    assert_eq!(json["methods"][1]["kind"], "ClassMethod");
    assert_eq!(json["methods"][1]["scope"], "static");
    assert_eq!(json["properties"][0]["visibility"], "public");
}

#[test]
fn setters_without_a_signature_are_fatal() {
    let counter = counter(false);
    let mut resolver = TypeResolver::new(&counter.snapshot);
    let err = resolver
        .resolve_class(counter.node, &exclude_node_modules)
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::UnresolvableMember {
            member: "value".to_string(),
            kind: MemberKind::Setter,
        }
    );
    assert!(!resolver.context().is_in_flight(counter.ty));
}

#[test]
fn class_types_need_a_class_declaration() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/shape.ts");
    let (symbol, node) = b.interface(file, "Shape", false);
    let ty = b.add_type(TypeData {
        flags: TypeFlags::CLASS | TypeFlags::OBJECT,
        text: "Shape".to_string(),
        symbol: Some(symbol),
        ..TypeData::default()
    });
    let snapshot = b.build().unwrap();

    let err = TypeResolver::new(&snapshot)
        .resolve_type(ty, Some(node), &exclude_node_modules)
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::MissingClassDeclaration {
            name: "Shape".to_string()
        }
    );
}

#[test]
fn enums_keep_declaration_order() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/color.ts");
    let node = b.declaration(file, NodeKind::EnumDeclaration, Some("Color"));
    let symbol = b.declare("Color", node);
    let ty = b.add_type(TypeData {
        flags: TypeFlags::ENUM,
        text: "Color".to_string(),
        symbol: Some(symbol),
        ..TypeData::default()
    });
    let data = b.node_mut(node);
    data.ty = Some(ty);
    data.enum_members = vec![
        typeshape_resolver::snapshot::EnumMemberData {
            name: "Red".to_string(),
            value: Some(EnumMemberValue::String("red".to_string())),
        },
        typeshape_resolver::snapshot::EnumMemberData {
            name: "Blue".to_string(),
            value: Some(EnumMemberValue::Number(1.0)),
        },
    ];
    let snapshot = b.build().unwrap();

    let resolved = resolve(&snapshot, ty, node).unwrap();
    let TypeKind::Enum { members } = &resolved.kind else {
        panic!("expected an enum, got {}", resolved.kind_name());
    };
    let names: Vec<_> = members.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Red", "Blue"]);
}

// =============================================================================
// Documentation
// =============================================================================

#[test]
fn property_docs_come_from_the_property_declaration() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/docs.ts");
    let declaration = b.interface(file, "Options", false);
    let string = b.string();
    let label = b.property(file, "label", string);
    let label_node = b.declaration_of(label).unwrap();
    b.node_mut(label_node).docs = Some(typeshape_resolver::JsDoc {
        description: Some("Visible label.".to_string()),
        tags: vec![typeshape_resolver::JsDocTag {
            tag_name: "deprecated".to_string(),
            text: None,
        }],
    });
    b.node_mut(declaration.1).docs = Some(typeshape_resolver::JsDoc {
        description: Some("Options bag.".to_string()),
        tags: Vec::new(),
    });
    let options = b.interface_type(declaration, vec![label]);
    let snapshot = b.build().unwrap();

    let resolved = resolve(&snapshot, options, declaration.1).unwrap();
    assert_eq!(resolved.meta.description.as_deref(), Some("Options bag."));
    let label = property(&resolved, "label");
    assert_eq!(label.meta.description.as_deref(), Some("Visible label."));
    assert_eq!(label.meta.tags[0].tag_name, "deprecated");
}

#[test]
fn property_defaults_are_looked_up_by_their_recorded_key() {
    // function slider({ size: initialSize = 3, step = 1 }: SliderOptions)
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/Slider.tsx");
    let declaration = b.interface(file, "SliderOptions", false);
    let number = b.number();
    let size = b.property(file, "size", number);
    let size_node = b.declaration_of(size).unwrap();
    b.node_mut(size_node).default_value_key = Some("initialSize".to_string());
    let step = b.property(file, "step", number);
    let options_type = b.interface_type(declaration, vec![size, step]);
    let options = b.parameter(file, "options", options_type);
    let options_node = b.declaration_of(options).unwrap();
    b.node_mut(options_node).default_value =
        Some(json!({ "initialSize": 3, "size": 99, "step": 1 }));
    let function = b.function(file, "slider", vec![options], number, true);
    let snapshot = b.build().unwrap();

    let signature = TypeResolver::new(&snapshot)
        .resolve_signature(function.signature, None, &exclude_node_modules)
        .unwrap()
        .unwrap();
    let options = &signature.parameters[0];
    let size = property(options, "size");
    assert_eq!(size.meta.default_value, Some(json!(3)));
    assert_eq!(size.meta.is_optional, Some(true));
    assert_eq!(property(options, "step").meta.default_value, Some(json!(1)));
}

// =============================================================================
// Generics
// =============================================================================

/// `interface InputProps { label: string; ref: <alias> }` where the alias is
/// `RefObject` from dependency code, instantiated with `arguments`.
fn ref_props(
    text: &str,
    arguments: impl FnOnce(&mut SnapshotBuilder) -> Vec<TypeId>,
) -> (ProgramSnapshot, TypeId, NodeId) {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/Input.tsx");
    let vendor = b.file("node_modules/@types/react/index.d.ts");
    let declaration = b.interface(file, "InputProps", false);
    let string = b.string();
    let label = b.property(file, "label", string);
    let ref_object = b.type_alias(vendor, "RefObject", true);
    let alias_arguments = arguments(&mut b);
    let ref_type = b.object(text, None, Vec::new());
    b.type_mut(ref_type).alias_symbol = Some(ref_object.0);
    b.type_mut(ref_type).alias_type_arguments = alias_arguments;
    let ref_property = b.property(file, "ref", ref_type);
    let props = b.interface_type(declaration, vec![label, ref_property]);
    (b.build().unwrap(), props, declaration.1)
}

#[test]
fn dependency_aliases_resolve_their_arguments_into_a_generic() {
    let (snapshot, props, node) = ref_props("RefObject<Handle>", |b| {
        let file = b.file("src/handle.ts");
        let declaration = b.interface(file, "Handle", true);
        let string = b.string();
        let id = b.property(file, "id", string);
        vec![b.interface_type(declaration, vec![id])]
    });
    let resolved = resolve(&snapshot, props, node).unwrap();

    let ref_property = property(&resolved, "ref");
    let TypeKind::Generic {
        type_name,
        arguments,
    } = &ref_property.kind
    else {
        panic!("expected a generic, got {}", ref_property.kind_name());
    };
    assert_eq!(type_name, "RefObject");
    assert_eq!(ref_property.text(), "RefObject<Handle>");
    assert_eq!(ref_property.meta.file_path.as_deref(), Some("src/Input.tsx"));

    let [handle] = arguments.as_slice() else {
        panic!("expected one argument");
    };
    assert!(handle.is_reference());
    assert_eq!(handle.text(), "Handle");
    assert_eq!(handle.meta.file_path.as_deref(), Some("src/handle.ts"));
    assert_eq!(handle.meta.context, Some(TypeContext::Parameter));
}

#[test]
fn dependency_generics_without_documentable_arguments_are_dropped() {
    let (snapshot, props, node) =
        ref_props("RefObject<{}>", |b| vec![b.object("{}", None, Vec::new())]);
    let resolved = resolve(&snapshot, props, node).unwrap();
    let names: Vec<_> = properties(&resolved).iter().filter_map(ResolvedType::name).collect();
    assert_eq!(names, vec!["label"]);
}

#[test]
fn dependency_types_without_alias_arguments_become_references() {
    let (snapshot, props, node) = ref_props("RefObject", |_| Vec::new());
    let resolved = resolve(&snapshot, props, node).unwrap();
    let ref_property = property(&resolved, "ref");
    assert!(ref_property.is_reference());
    assert_eq!(ref_property.text(), "RefObject");
    assert_eq!(ref_property.meta.file_path.as_deref(), Some("src/Input.tsx"));
}

/// `type ButtonProps = Partial<Props>` with `Props` declared in `props_path`.
fn partial(props_path: &str, exported: bool) -> (ProgramSnapshot, TypeId, NodeId) {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/Button.tsx");
    let props_file = if props_path == "src/Button.tsx" {
        file
    } else {
        b.file(props_path)
    };
    let props_declaration = b.interface(props_file, "Props", exported);
    let string = b.string();
    let label = b.optional_property(props_file, "label", string);
    let props = b.interface_type(props_declaration, vec![label]);

    let alias = b.type_alias(file, "ButtonProps", true);
    let argument = b.declaration(file, NodeKind::TypeReference, None);
    b.node_mut(argument).ty = Some(props);
    let annotation = b.add_node(NodeData {
        kind: NodeKind::TypeReference,
        file,
        text: "Partial<Props>".to_string(),
        type_name: Some("Partial".to_string()),
        type_arguments: vec![argument],
        ..NodeData::default()
    });
    b.node_mut(alias.1).type_annotation = Some(annotation);
    let button_props = b.alias_type(alias, "Partial<Props>", vec![label]);
    (b.build().unwrap(), button_props, alias.1)
}

#[test]
fn written_generics_over_references_stay_generic() {
    let (snapshot, button_props, node) = partial("src/props.ts", true);
    let resolved = resolve(&snapshot, button_props, node).unwrap();

    let TypeKind::Generic {
        type_name,
        arguments,
    } = &resolved.kind
    else {
        panic!("expected a generic, got {}", resolved.kind_name());
    };
    assert_eq!(type_name, "Partial");
    assert_eq!(resolved.text(), "Partial<Props>");
    assert_eq!(resolved.meta.file_path.as_deref(), Some("src/Button.tsx"));
    assert_eq!(arguments.len(), 1);
    assert!(arguments[0].is_reference());
    assert_eq!(arguments[0].meta.file_path.as_deref(), Some("src/props.ts"));
}

#[test]
fn written_generics_over_local_types_expand() {
    let (snapshot, button_props, node) = partial("src/Button.tsx", false);
    let resolved = resolve(&snapshot, button_props, node).unwrap();
    assert_eq!(resolved.kind_name(), "Object");
    assert_eq!(property(&resolved, "label").meta.is_optional, Some(true));
}

/// `type Boxed = Box<Item>` where `Box` has no properties of its own.
fn boxed(item_has_properties: bool) -> (ProgramSnapshot, TypeId, NodeId) {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/box.ts");
    let alias = b.type_alias(file, "Boxed", false);
    let box_declaration = b.interface(file, "Box", false);
    let item_declaration = b.interface(file, "Item", false);
    let string = b.string();
    let item_properties = if item_has_properties {
        vec![b.property(file, "name", string)]
    } else {
        Vec::new()
    };
    let item = b.interface_type(item_declaration, item_properties);
    let boxed = b.object("Box<Item>", Some(box_declaration.0), Vec::new());
    b.type_mut(boxed).type_arguments = vec![item];
    (b.build().unwrap(), boxed, alias.1)
}

#[test]
fn objects_without_properties_resolve_their_type_arguments() {
    let (snapshot, ty, node) = boxed(true);
    let resolved = resolve(&snapshot, ty, node).unwrap();

    let TypeKind::Generic {
        type_name,
        arguments,
    } = &resolved.kind
    else {
        panic!("expected a generic, got {}", resolved.kind_name());
    };
    assert_eq!(type_name, "Box");
    assert_eq!(arguments.len(), 1);
    assert_eq!(arguments[0].kind_name(), "Object");
    assert_eq!(arguments[0].meta.context, Some(TypeContext::Parameter));

    let (snapshot, ty, node) = boxed(false);
    assert_eq!(resolve(&snapshot, ty, node), None);
}

// =============================================================================
// Apparent types and readonly
// =============================================================================

#[test]
fn uncategorized_types_fall_back_to_their_apparent_type() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/id.ts");
    let alias = b.type_alias(file, "UserId", false);
    let string = b.string();
    let parameter = b.add_type(TypeData {
        text: "T".to_string(),
        apparent: Some(string),
        ..TypeData::default()
    });
    let snapshot = b.build().unwrap();

    let resolved = resolve(&snapshot, parameter, alias.1).unwrap();
    assert_eq!(resolved.kind, TypeKind::String { value: None });
}

#[test]
fn apparent_type_cycles_terminate() {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/loop.ts");
    let alias = b.type_alias(file, "Loop", false);
    let a = b.add_type(TypeData {
        text: "A".to_string(),
        ..TypeData::default()
    });
    let c = b.add_type(TypeData {
        text: "C".to_string(),
        apparent: Some(a),
        ..TypeData::default()
    });
    b.type_mut(a).apparent = Some(c);
    let snapshot = b.build().unwrap();

    assert_eq!(resolve(&snapshot, a, alias.1), None);
    assert_eq!(resolve(&snapshot, c, alias.1), None);
}

/// `type FrozenPoint = Readonly<{ x: number }>` with `Readonly` declared in
/// `readonly_path`.
fn frozen_point(readonly_path: &str) -> (ProgramSnapshot, TypeId, NodeId) {
    let mut b = SnapshotBuilder::new("/repo");
    let file = b.file("src/point.ts");
    let lib = b.file(readonly_path);
    let readonly = b.type_alias(lib, "Readonly", false);
    let alias = b.type_alias(file, "FrozenPoint", false);
    let number = b.number();
    let x = b.property(file, "x", number);
    let frozen = b.object("Readonly<{ x: number; }>", Some(readonly.0), vec![x]);
    b.type_mut(frozen).alias_symbol = Some(alias.0);
    (b.build().unwrap(), frozen, alias.1)
}

#[test]
fn standard_library_readonly_marks_properties_readonly() {
    let (snapshot, frozen, node) = frozen_point("node_modules/typescript/lib/lib.es5.d.ts");
    let resolved = resolve(&snapshot, frozen, node).unwrap();
    assert_eq!(property(&resolved, "x").meta.is_readonly, Some(true));

    let (snapshot, frozen, node) = frozen_point("src/readonly.ts");
    let resolved = resolve(&snapshot, frozen, node).unwrap();
    assert_eq!(property(&resolved, "x").meta.is_readonly, Some(false));
}

#[test]
fn const_assertions_mark_properties_readonly() {
    for const_assertion in [true, false] {
        let mut b = SnapshotBuilder::new("/repo");
        let file = b.file("src/origin.ts");
        let variable = b.declaration(file, NodeKind::VariableDeclaration, Some("origin"));
        b.node_mut(variable).const_assertion = const_assertion;
        let number = b.number();
        let x = b.property(file, "x", number);
        let point = b.object("{ x: number; }", None, vec![x]);
        b.node_mut(variable).ty = Some(point);
        let snapshot = b.build().unwrap();

        let resolved = resolve(&snapshot, point, variable).unwrap();
        assert_eq!(
            property(&resolved, "x").meta.is_readonly,
            Some(const_assertion)
        );
    }
}

// =============================================================================
// Handles
// =============================================================================

#[test]
fn handles_from_another_program_are_rejected() {
    let (snapshot, tree, node) = tree(false);
    let mut resolver = TypeResolver::new(&snapshot);

    let err = resolver
        .resolve_type(TypeId(999), Some(node), &exclude_node_modules)
        .unwrap_err();
    assert_eq!(
        err,
        ResolveError::UnknownHandle {
            table: "types",
            index: 999,
        }
    );
    assert!(err.to_string().contains("types[999]"));

    let err = resolver
        .resolve_type(tree, Some(NodeId(999)), &exclude_node_modules)
        .unwrap_err();
    assert!(matches!(err, ResolveError::UnknownHandle { table: "nodes", .. }));

    let err = resolver
        .resolve_class(NodeId(999), &exclude_node_modules)
        .unwrap_err();
    assert!(matches!(err, ResolveError::UnknownHandle { table: "nodes", .. }));

    let err = resolver
        .resolve_signature(SignatureId(999), None, &exclude_node_modules)
        .unwrap_err();
    assert!(matches!(err, ResolveError::UnknownHandle { table: "signatures", .. }));

    // The resolver is still usable afterwards.
    assert!(resolver.resolve_type(tree, Some(node), &exclude_node_modules).unwrap().is_some());
}
