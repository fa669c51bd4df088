mod support;

use support::Fixture;
use tsonic_ir::{IrParameter, IrType};

fn sample_types(f: &Fixture) -> Vec<IrType> {
    vec![
        IrType::primitive("string"),
        IrType::primitive("int"),
        IrType::primitive("null"),
        IrType::literal_string("a"),
        IrType::literal_number(3.0),
        IrType::array(IrType::primitive("string")),
        IrType::tuple(vec![IrType::primitive("int"), IrType::primitive("string")]),
        IrType::function(
            vec![IrParameter::named("x", IrType::primitive("int"))],
            IrType::primitive("string"),
        ),
        IrType::union(vec![IrType::primitive("string"), IrType::primitive("null")]),
        f.array_of(IrType::primitive("int")),
        IrType::type_param("T"),
        IrType::Void,
        IrType::Never,
        IrType::Unknown,
        IrType::Any,
    ]
}

#[test]
fn equality_is_reflexive_and_symmetric() {
    let f = Fixture::new();
    let authority = f.authority();
    let samples = sample_types(&f);
    for a in &samples {
        assert!(authority.types_equal(a, a), "not reflexive: {a:?}");
        for b in &samples {
            assert_eq!(
                authority.types_equal(a, b),
                authority.types_equal(b, a),
                "not symmetric: {a:?} vs {b:?}"
            );
        }
    }
}

#[test]
fn unions_compare_order_independently() {
    let f = Fixture::new();
    let authority = f.authority();
    let ab = IrType::union(vec![IrType::primitive("string"), IrType::primitive("int")]);
    let ba = IrType::union(vec![IrType::primitive("int"), IrType::primitive("string")]);
    assert!(authority.types_equal(&ab, &ba));

    let extra = IrType::union(vec![
        IrType::primitive("int"),
        IrType::primitive("string"),
        IrType::primitive("null"),
    ]);
    assert!(!authority.types_equal(&ab, &extra));
}

#[test]
fn function_equality_requires_matching_optionality() {
    let f = Fixture::new();
    let authority = f.authority();
    let required = IrType::function(
        vec![IrParameter::named("x", IrType::primitive("int"))],
        IrType::Void,
    );
    let optional = IrType::function(
        vec![IrParameter {
            name: Some("x".to_string()),
            ty: IrType::primitive("int"),
            is_optional: true,
            is_rest: false,
        }],
        IrType::Void,
    );
    assert!(!authority.types_equal(&required, &optional));
}

#[test]
fn assignability_is_reflexive_and_honors_poles() {
    let f = Fixture::new();
    let authority = f.authority();
    for ty in sample_types(&f) {
        assert!(authority.is_assignable_to(&ty, &ty), "not reflexive: {ty:?}");
        assert!(authority.is_assignable_to(&IrType::Never, &ty));
        assert!(authority.is_assignable_to(&IrType::Any, &ty));
        assert!(authority.is_assignable_to(&ty, &IrType::Any));
    }
}

#[test]
fn nullish_source_needs_a_union_naming_it() {
    let f = Fixture::new();
    let authority = f.authority();
    let null = IrType::primitive("null");
    let with_null = IrType::union(vec![IrType::primitive("string"), null.clone()]);
    let without_null = IrType::union(vec![
        IrType::primitive("string"),
        IrType::primitive("undefined"),
    ]);

    assert!(authority.is_assignable_to(&null, &with_null));
    assert!(!authority.is_assignable_to(&null, &without_null));
    assert!(!authority.is_assignable_to(&null, &IrType::primitive("string")));
}

#[test]
fn union_sources_and_targets_are_conservative() {
    let f = Fixture::new();
    let authority = f.authority();
    let string_or_int = IrType::union(vec![IrType::primitive("string"), IrType::primitive("int")]);

    // Every source branch must flow.
    assert!(authority.is_assignable_to(&string_or_int, &string_or_int));
    assert!(!authority.is_assignable_to(&string_or_int, &IrType::primitive("string")));
    // One target branch suffices.
    assert!(authority.is_assignable_to(&IrType::primitive("int"), &string_or_int));
}

#[test]
fn arrays_are_element_assignable() {
    let f = Fixture::new();
    let authority = f.authority();
    let ints = IrType::array(IrType::primitive("int"));
    let strings = IrType::array(IrType::primitive("string"));
    assert!(authority.is_assignable_to(&ints, &ints));
    assert!(!authority.is_assignable_to(&ints, &strings));
}

#[test]
fn nominal_inheritance_is_assignable() {
    let f = Fixture::new();
    let authority = f.authority();
    let list_int = f.list_of(IrType::primitive("int"));
    let enumerable_int =
        IrType::reference_to(f.ienumerable, "IEnumerable", vec![IrType::primitive("int")]);
    let enumerable_string = IrType::reference_to(
        f.ienumerable,
        "IEnumerable",
        vec![IrType::primitive("string")],
    );

    assert!(authority.is_assignable_to(&list_int, &enumerable_int));
    assert!(!authority.is_assignable_to(&enumerable_int, &list_int));
    // Same nominal requires pairwise-equal (invariant) arguments.
    assert!(!authority.is_assignable_to(&enumerable_int, &enumerable_string));
}

#[test]
fn contains_type_parameter_sees_nested_shapes() {
    let f = Fixture::new();
    let authority = f.authority();
    assert!(!authority.contains_type_parameter(&IrType::primitive("string")));
    assert!(authority.contains_type_parameter(&IrType::type_param("T")));
    assert!(authority.contains_type_parameter(&f.array_of(IrType::type_param("T"))));
    assert!(authority.contains_type_parameter(&IrType::function(
        vec![IrParameter::unnamed(IrType::primitive("int"))],
        IrType::type_param("U"),
    )));
    assert!(
        authority.contains_type_parameter(&IrType::dictionary(
            IrType::primitive("string"),
            IrType::type_param("V"),
        ))
    );
}
