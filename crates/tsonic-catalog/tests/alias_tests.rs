use tsonic_catalog::{BUILTIN_NOMINALS, CatalogBuilder, builtin_nominal};
use tsonic_ir::IrType;

#[test]
fn builtin_nominals_cover_the_primitive_facades() {
    assert_eq!(builtin_nominal("string"), Some("String"));
    assert_eq!(builtin_nominal("number"), Some("Number"));
    assert_eq!(builtin_nominal("boolean"), Some("Boolean"));
    assert_eq!(builtin_nominal("bigint"), Some("BigInt"));
    assert_eq!(builtin_nominal("symbol"), Some("Symbol"));
    assert_eq!(builtin_nominal("object"), None);
    assert_eq!(BUILTIN_NOMINALS.len(), 5);
}

#[test]
fn ts_and_clr_spellings_resolve_to_one_identity() {
    let mut b = CatalogBuilder::new();
    let string = b.class("String", Some("System.String"));
    let (catalog, aliases) = b.finish();

    assert_eq!(catalog.resolve_ts_name("String"), Some(string));
    assert_eq!(catalog.resolve_clr_name("System.String"), Some(string));
    assert_eq!(aliases.get("String"), Some(string));
    assert_eq!(aliases.get("System.String"), Some(string));
}

#[test]
fn generic_types_register_their_arity_facade() {
    let mut b = CatalogBuilder::new();
    let ilist = b.interface("IList", Some("System.Collections.Generic.IList`1"));
    b.type_params(ilist, &["T"]);
    let (_catalog, aliases) = b.finish();

    assert_eq!(aliases.get("IList"), Some(ilist));
    assert_eq!(aliases.get("IList_1"), Some(ilist));
}

#[test]
fn extra_alias_spellings_can_be_registered() {
    let mut b = CatalogBuilder::new();
    let string = b.class("String", Some("System.String"));
    b.alias_name("string", string);
    let (_catalog, aliases) = b.finish();
    assert_eq!(aliases.get("string"), Some(string));
}

#[test]
fn source_declarations_get_source_stable_ids() {
    let mut b = CatalogBuilder::new();
    let point = b.interface("Point", None);
    b.property(point, "x", IrType::primitive("number"));
    let (catalog, _aliases) = b.finish();
    let entry = catalog.get(point).unwrap();
    assert_eq!(entry.stable_id, "source:Point");
    assert_eq!(entry.clr_name, None);
}
