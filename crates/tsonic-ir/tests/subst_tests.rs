use tsonic_ir::{
    IrMember, IrParameter, IrType, MethodSignature, PropertySignature, SubstMap, compose,
    substitute,
};

fn map_of(pairs: &[(&str, IrType)]) -> SubstMap {
    pairs
        .iter()
        .map(|(name, ty)| (name.to_string(), ty.clone()))
        .collect()
}

#[test]
fn empty_map_is_identity() {
    let samples = vec![
        IrType::primitive("string"),
        IrType::type_param("T"),
        IrType::array(IrType::type_param("T")),
        IrType::function(
            vec![IrParameter::named("x", IrType::type_param("T"))],
            IrType::type_param("U"),
        ),
        IrType::union(vec![IrType::primitive("null"), IrType::type_param("T")]),
    ];
    let empty = SubstMap::default();
    for ty in samples {
        assert_eq!(substitute(&ty, &empty), ty);
    }
}

#[test]
fn substitutes_through_every_shape() {
    let map = map_of(&[("T", IrType::primitive("int"))]);

    assert_eq!(
        substitute(&IrType::type_param("T"), &map),
        IrType::primitive("int")
    );
    assert_eq!(
        substitute(&IrType::array(IrType::type_param("T")), &map),
        IrType::array(IrType::primitive("int"))
    );
    assert_eq!(
        substitute(
            &IrType::reference("List", vec![IrType::type_param("T")]),
            &map
        ),
        IrType::reference("List", vec![IrType::primitive("int")])
    );
    assert_eq!(
        substitute(
            &IrType::tuple(vec![IrType::type_param("T"), IrType::primitive("string")]),
            &map
        ),
        IrType::tuple(vec![IrType::primitive("int"), IrType::primitive("string")])
    );
    assert_eq!(
        substitute(
            &IrType::dictionary(IrType::primitive("string"), IrType::type_param("T")),
            &map
        ),
        IrType::dictionary(IrType::primitive("string"), IrType::primitive("int"))
    );

    let f = IrType::function(
        vec![IrParameter::named("x", IrType::type_param("T"))],
        IrType::type_param("T"),
    );
    assert_eq!(
        substitute(&f, &map),
        IrType::function(
            vec![IrParameter::named("x", IrType::primitive("int"))],
            IrType::primitive("int")
        )
    );
}

#[test]
fn substitutes_structural_object_members() {
    let map = map_of(&[("T", IrType::primitive("boolean"))]);
    let obj = IrType::object(vec![
        IrMember::Property(PropertySignature {
            name: "flag".to_string(),
            ty: IrType::type_param("T"),
            is_optional: false,
            is_readonly: false,
        }),
        IrMember::Method(MethodSignature {
            name: "get".to_string(),
            parameters: vec![],
            return_type: IrType::type_param("T"),
            type_parameters: vec![],
        }),
    ]);
    let expected = IrType::object(vec![
        IrMember::Property(PropertySignature {
            name: "flag".to_string(),
            ty: IrType::primitive("boolean"),
            is_optional: false,
            is_readonly: false,
        }),
        IrMember::Method(MethodSignature {
            name: "get".to_string(),
            parameters: vec![],
            return_type: IrType::primitive("boolean"),
            type_parameters: vec![],
        }),
    ]);
    assert_eq!(substitute(&obj, &map), expected);
}

#[test]
fn method_type_parameters_shadow_outer_bindings() {
    let map = map_of(&[("T", IrType::primitive("int"))]);
    let obj = IrType::object(vec![IrMember::Method(MethodSignature {
        name: "id".to_string(),
        parameters: vec![IrParameter::named("x", IrType::type_param("T"))],
        return_type: IrType::type_param("T"),
        type_parameters: vec!["T".to_string()],
    })]);
    // The method declares its own T; the outer binding must not leak in.
    assert_eq!(substitute(&obj, &map), obj);
}

#[test]
fn composition_matches_sequential_application() {
    let s1 = map_of(&[("T", IrType::type_param("U"))]);
    let s2 = map_of(&[("U", IrType::primitive("string"))]);
    let composed = compose(&s1, &s2);

    let subjects = vec![
        IrType::type_param("T"),
        IrType::type_param("U"),
        IrType::array(IrType::type_param("T")),
        IrType::reference("Map", vec![IrType::type_param("T"), IrType::type_param("U")]),
    ];
    for ty in subjects {
        let sequential = substitute(&substitute(&ty, &s1), &s2);
        let direct = substitute(&ty, &composed);
        assert_eq!(sequential, direct, "composition mismatch for {ty:?}");
    }
}

#[test]
fn substitution_does_not_mutate_input() {
    let original = IrType::array(IrType::type_param("T"));
    let copy = original.clone();
    let _ = substitute(&original, &map_of(&[("T", IrType::primitive("int"))]));
    assert_eq!(original, copy);
}
