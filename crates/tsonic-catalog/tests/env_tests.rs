use tsonic_catalog::{CatalogBuilder, CatalogParam, NominalEnv, TypeParamDecl};
use tsonic_ir::IrType;

/// IEnumerable<T> <- ICollection<T> <- List<T>, plus Dictionary<K, V>
/// inheriting IEnumerable<KeyValuePair<K, V>>.
fn build() -> (tsonic_catalog::NominalCatalog, tsonic_catalog::AliasTable) {
    let mut b = CatalogBuilder::new();

    let enumerable = b.interface("IEnumerable", Some("System.Collections.Generic.IEnumerable`1"));
    b.type_params(enumerable, &["T"]);
    b.method(
        enumerable,
        "first",
        vec![],
        IrType::type_param("T"),
    );

    let collection = b.interface("ICollection", Some("System.Collections.Generic.ICollection`1"));
    b.type_params(collection, &["T"]);
    b.extends(collection, enumerable, vec![IrType::type_param("T")]);
    b.readonly_property(collection, "count", IrType::primitive("int"));

    let list = b.class("List", Some("System.Collections.Generic.List`1"));
    b.type_params(list, &["T"]);
    b.extends(list, collection, vec![IrType::type_param("T")]);
    b.indexer(list, "System.Int32", IrType::type_param("T"));

    let pair = b.class("KeyValuePair", Some("System.Collections.Generic.KeyValuePair`2"));
    b.type_params(pair, &["K", "V"]);

    let dictionary = b.class("Dictionary", Some("System.Collections.Generic.Dictionary`2"));
    b.type_params(dictionary, &["K", "V"]);
    let pair_of_kv = IrType::reference_to(
        pair,
        "KeyValuePair",
        vec![IrType::type_param("K"), IrType::type_param("V")],
    );
    b.extends(dictionary, enumerable, vec![pair_of_kv]);

    let action = b.delegate("Action", Some("System.Action`1"));
    b.type_params(action, &["T"]);
    b.method(
        action,
        "invoke",
        vec![CatalogParam::new("obj", IrType::type_param("T"))],
        IrType::Void,
    );

    b.finish()
}

#[test]
fn inheritance_chain_is_flattened_in_declaration_order() {
    let (catalog, _aliases) = build();
    let env = NominalEnv::new(&catalog);
    let list = catalog.resolve_ts_name("List").unwrap();
    let collection = catalog.resolve_ts_name("ICollection").unwrap();
    let enumerable = catalog.resolve_ts_name("IEnumerable").unwrap();

    let chain = env.inheritance_chain(list);
    assert_eq!(chain.as_slice(), &[list, collection, enumerable]);
}

#[test]
fn instantiation_carries_arguments_through_the_chain() {
    let (catalog, _aliases) = build();
    let env = NominalEnv::new(&catalog);
    let list = catalog.resolve_ts_name("List").unwrap();
    let enumerable = catalog.resolve_ts_name("IEnumerable").unwrap();

    let map = env
        .get_instantiation(list, &[IrType::primitive("int")], enumerable)
        .unwrap();
    assert_eq!(map.get("T"), Some(&IrType::primitive("int")));
}

#[test]
fn instantiation_substitutes_structured_edge_arguments() {
    let (catalog, _aliases) = build();
    let env = NominalEnv::new(&catalog);
    let dictionary = catalog.resolve_ts_name("Dictionary").unwrap();
    let enumerable = catalog.resolve_ts_name("IEnumerable").unwrap();
    let pair = catalog.resolve_ts_name("KeyValuePair").unwrap();

    let map = env
        .get_instantiation(
            dictionary,
            &[IrType::primitive("string"), IrType::primitive("int")],
            enumerable,
        )
        .unwrap();
    let expected = IrType::reference_to(
        pair,
        "KeyValuePair",
        vec![IrType::primitive("string"), IrType::primitive("int")],
    );
    assert_eq!(map.get("T"), Some(&expected));
}

#[test]
fn instantiation_fails_off_chain() {
    let (catalog, _aliases) = build();
    let env = NominalEnv::new(&catalog);
    let list = catalog.resolve_ts_name("List").unwrap();
    let pair = catalog.resolve_ts_name("KeyValuePair").unwrap();
    assert!(env.get_instantiation(list, &[IrType::Unknown], pair).is_none());
}

#[test]
fn find_member_declaring_type_walks_ancestors() {
    let (catalog, _aliases) = build();
    let env = NominalEnv::new(&catalog);
    let list = catalog.resolve_ts_name("List").unwrap();
    let collection = catalog.resolve_ts_name("ICollection").unwrap();
    let enumerable = catalog.resolve_ts_name("IEnumerable").unwrap();

    let (declaring, _map) = env
        .find_member_declaring_type(list, &[IrType::primitive("int")], "count")
        .unwrap();
    assert_eq!(declaring, collection);

    let (declaring, map) = env
        .find_member_declaring_type(list, &[IrType::primitive("int")], "first")
        .unwrap();
    assert_eq!(declaring, enumerable);
    assert_eq!(map.get("T"), Some(&IrType::primitive("int")));

    assert!(
        env.find_member_declaring_type(list, &[IrType::primitive("int")], "missing")
            .is_none()
    );
}

#[test]
fn invoke_signature_only_for_delegates() {
    let (catalog, _aliases) = build();
    let env = NominalEnv::new(&catalog);
    let action = catalog.resolve_ts_name("Action").unwrap();
    let list = catalog.resolve_ts_name("List").unwrap();

    let invoke = env.invoke_signature(action).unwrap();
    assert_eq!(invoke.parameters.len(), 1);
    assert!(env.invoke_signature(list).is_none());
}

#[test]
fn type_param_decl_builders_compose() {
    let decl = TypeParamDecl::new("T")
        .with_constraint(IrType::primitive("string"))
        .with_default(IrType::primitive("string"));
    assert!(decl.constraint.is_some());
    assert!(decl.default.is_some());
}
