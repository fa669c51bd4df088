mod support;

use support::Fixture;
use tsonic_ir::{
    BinaryOp, DeclKind, DeclRecord, ExprSyntax, IrType, LambdaBodySyntax, LambdaParamSyntax,
    LambdaSyntax, ParamSyntax, PrefixOp, SignatureParam, SignatureRecord, SignatureTypeParam,
    TypeSyntax,
};

fn number_lit(raw: &str) -> ExprSyntax {
    ExprSyntax::NumberLit { raw: raw.to_string() }
}

fn ident(name: &str, decl: tsonic_ir::DeclId) -> ExprSyntax {
    ExprSyntax::Ident {
        name: name.to_string(),
        decl: Some(decl),
    }
}

#[test]
fn numeric_literals_classify_by_lexeme() {
    let f = Fixture::new();
    let mut authority = f.authority();
    let cases = [
        ("1", "int"),
        ("2147483648", "long"),
        ("1.5", "double"),
        ("1e3", "double"),
        ("2.5f", "float"),
        ("42n", "long"),
        ("0xFF", "int"),
    ];
    for (raw, expected) in cases {
        assert_eq!(
            authority.infer_initializer(&number_lit(raw)),
            Some(IrType::primitive(expected)),
            "lexeme {raw}"
        );
    }
}

#[test]
fn simple_literals_infer_directly() {
    let f = Fixture::new();
    let mut authority = f.authority();
    assert_eq!(
        authority.infer_initializer(&ExprSyntax::StringLit("hi".to_string())),
        Some(IrType::primitive("string"))
    );
    assert_eq!(
        authority.infer_initializer(&ExprSyntax::TemplateLit("a${b}".to_string())),
        Some(IrType::primitive("string"))
    );
    assert_eq!(
        authority.infer_initializer(&ExprSyntax::BoolLit(true)),
        Some(IrType::primitive("boolean"))
    );
    assert_eq!(
        authority.infer_initializer(&ExprSyntax::NullLit),
        Some(IrType::primitive("null"))
    );
}

#[test]
fn array_literals_need_a_uniform_element_type() {
    let f = Fixture::new();
    let mut authority = f.authority();
    let uniform = ExprSyntax::ArrayLit(vec![number_lit("1"), number_lit("2")]);
    assert_eq!(
        authority.infer_initializer(&uniform),
        Some(IrType::inferred_array(IrType::primitive("int")))
    );

    let mixed = ExprSyntax::ArrayLit(vec![
        number_lit("1"),
        ExprSyntax::StringLit("x".to_string()),
    ]);
    assert_eq!(authority.infer_initializer(&mixed), None);

    let empty = ExprSyntax::ArrayLit(vec![]);
    assert_eq!(authority.infer_initializer(&empty), None);
}

#[test]
fn identifiers_propagate_their_declaration_type() {
    let mut f = Fixture::new();
    let decl = f.registry.alloc_decl(
        DeclRecord::new(DeclKind::Variable)
            .with_type(TypeSyntax::generic("Array", vec![TypeSyntax::named("int")])),
    );
    let mut authority = f.authority();
    assert_eq!(
        authority.infer_initializer(&ident("xs", decl)),
        Some(IrType::reference("Array", vec![IrType::primitive("int")]))
    );
}

#[test]
fn property_and_element_access_delegate_to_member_lookup() {
    let mut f = Fixture::new();
    let xs = f.registry.alloc_decl(
        DeclRecord::new(DeclKind::Variable)
            .with_type(TypeSyntax::generic("Array", vec![TypeSyntax::named("int")])),
    );
    let text = f.registry.alloc_decl(
        DeclRecord::new(DeclKind::Variable).with_type(TypeSyntax::named("string")),
    );
    let mut authority = f.authority();

    let length = ExprSyntax::Property {
        object: Box::new(ident("xs", xs)),
        name: "length".to_string(),
    };
    assert_eq!(
        authority.infer_initializer(&length),
        Some(IrType::primitive("number"))
    );

    // Element access on the nominal array goes through the indexer.
    let indexed = ExprSyntax::Index {
        object: Box::new(ident("xs", xs)),
        index: Box::new(number_lit("0")),
    };
    assert_eq!(
        authority.infer_initializer(&indexed),
        Some(IrType::primitive("int"))
    );

    // Strings index to strings.
    let char_at = ExprSyntax::Index {
        object: Box::new(ident("text", text)),
        index: Box::new(number_lit("0")),
    };
    assert_eq!(
        authority.infer_initializer(&char_at),
        Some(IrType::primitive("string"))
    );
}

#[test]
fn as_assertions_take_the_annotation() {
    let f = Fixture::new();
    let mut authority = f.authority();
    let assertion = ExprSyntax::As {
        expr: Box::new(number_lit("1")),
        ty: TypeSyntax::named("long"),
    };
    assert_eq!(
        authority.infer_initializer(&assertion),
        Some(IrType::primitive("long"))
    );
}

#[test]
fn non_null_assertions_strip_nullish_branches() {
    let mut f = Fixture::new();
    let maybe = f.registry.alloc_decl(DeclRecord::new(DeclKind::Variable).with_type(
        TypeSyntax::Union(vec![TypeSyntax::named("string"), TypeSyntax::named("null")]),
    ));
    let mut authority = f.authority();
    let bang = ExprSyntax::NonNull(Box::new(ident("maybe", maybe)));
    assert_eq!(
        authority.infer_initializer(&bang),
        Some(IrType::primitive("string"))
    );
}

#[test]
fn await_unwraps_one_promise_level() {
    let mut f = Fixture::new();
    let pending = f.registry.alloc_decl(
        DeclRecord::new(DeclKind::Variable)
            .with_type(TypeSyntax::generic("Promise", vec![TypeSyntax::named("string")])),
    );
    let task = f.registry.alloc_decl(
        DeclRecord::new(DeclKind::Variable).with_type(TypeSyntax::named("Task")),
    );
    let mut authority = f.authority();

    let awaited = ExprSyntax::Await(Box::new(ident("pending", pending)));
    assert_eq!(
        authority.infer_initializer(&awaited),
        Some(IrType::primitive("string"))
    );

    let awaited_task = ExprSyntax::Await(Box::new(ident("task", task)));
    assert_eq!(authority.infer_initializer(&awaited_task), Some(IrType::Void));
}

#[test]
fn binary_operators_widen_numerics() {
    let f = Fixture::new();
    let mut authority = f.authority();

    let product = ExprSyntax::Binary {
        op: BinaryOp::Multiply,
        left: Box::new(number_lit("2")),
        right: Box::new(number_lit("1.5")),
    };
    assert_eq!(
        authority.infer_initializer(&product),
        Some(IrType::primitive("double"))
    );

    let ints = ExprSyntax::Binary {
        op: BinaryOp::Add,
        left: Box::new(number_lit("1")),
        right: Box::new(number_lit("2")),
    };
    assert_eq!(
        authority.infer_initializer(&ints),
        Some(IrType::primitive("int"))
    );

    let concat = ExprSyntax::Binary {
        op: BinaryOp::Add,
        left: Box::new(ExprSyntax::StringLit("a".to_string())),
        right: Box::new(number_lit("1")),
    };
    assert_eq!(
        authority.infer_initializer(&concat),
        Some(IrType::primitive("string"))
    );

    let comparison = ExprSyntax::Binary {
        op: BinaryOp::Less,
        left: Box::new(number_lit("1")),
        right: Box::new(number_lit("2")),
    };
    assert_eq!(
        authority.infer_initializer(&comparison),
        Some(IrType::primitive("boolean"))
    );
}

#[test]
fn number_stays_number_under_arithmetic() {
    let mut f = Fixture::new();
    let a = f.registry.alloc_decl(
        DeclRecord::new(DeclKind::Variable).with_type(TypeSyntax::named("number")),
    );
    let b = f.registry.alloc_decl(
        DeclRecord::new(DeclKind::Variable).with_type(TypeSyntax::named("number")),
    );
    let mut authority = f.authority();
    let sum = ExprSyntax::Binary {
        op: BinaryOp::Add,
        left: Box::new(ident("a", a)),
        right: Box::new(ident("b", b)),
    };
    assert_eq!(
        authority.infer_initializer(&sum),
        Some(IrType::primitive("number"))
    );
}

#[test]
fn prefix_operators() {
    let f = Fixture::new();
    let mut authority = f.authority();
    let negated = ExprSyntax::Prefix {
        op: PrefixOp::Not,
        operand: Box::new(ExprSyntax::BoolLit(false)),
    };
    assert_eq!(
        authority.infer_initializer(&negated),
        Some(IrType::primitive("boolean"))
    );
    let minus = ExprSyntax::Prefix {
        op: PrefixOp::Minus,
        operand: Box::new(number_lit("3")),
    };
    assert_eq!(
        authority.infer_initializer(&minus),
        Some(IrType::primitive("int"))
    );
}

#[test]
fn calls_with_lambdas_use_multi_pass_inference() {
    let mut f = Fixture::new();
    let xs = f.registry.alloc_decl(
        DeclRecord::new(DeclKind::Variable)
            .with_type(TypeSyntax::generic("Array", vec![TypeSyntax::named("int")])),
    );
    // Array.map<U>(selector: (x: T) => U): Array<U>
    let map_sig = f.registry.alloc_signature(SignatureRecord {
        parameters: vec![SignatureParam::new(
            "selector",
            TypeSyntax::Function {
                parameters: vec![ParamSyntax::typed("x", TypeSyntax::named("T"))],
                return_type: Box::new(TypeSyntax::named("U")),
            },
        )],
        return_type_syntax: Some(TypeSyntax::generic("Array", vec![TypeSyntax::named("U")])),
        type_parameters: vec![SignatureTypeParam::new("U")],
        declaring_type_ts_name: Some("Array".to_string()),
        declaring_member_name: Some("map".to_string()),
        ..Default::default()
    });
    let mut authority = f.authority();

    // xs.map(x => x * 2): the lambda's parameter type comes from the first
    // resolution pass, its return from the body, and the final pass binds
    // U = int.
    let call = ExprSyntax::Call {
        signature: Some(map_sig),
        receiver: Some(Box::new(ident("xs", xs))),
        arguments: vec![ExprSyntax::Lambda(LambdaSyntax {
            parameters: vec![LambdaParamSyntax {
                name: "x".to_string(),
                annotation: None,
            }],
            return_annotation: None,
            body: LambdaBodySyntax::Expression(Box::new(ExprSyntax::Binary {
                op: BinaryOp::Multiply,
                left: Box::new(ExprSyntax::Ident {
                    name: "x".to_string(),
                    decl: None,
                }),
                right: Box::new(number_lit("2")),
            })),
        })],
        type_arguments: vec![],
    };
    assert_eq!(
        authority.infer_initializer(&call),
        Some(IrType::reference("Array", vec![IrType::primitive("int")]))
    );
    // Speculative passes leave no diagnostic residue.
    assert!(authority.get_diagnostics().is_empty());
}

#[test]
fn lambda_block_bodies_infer_from_their_returns() {
    let mut f = Fixture::new();
    let xs = f.registry.alloc_decl(
        DeclRecord::new(DeclKind::Variable)
            .with_type(TypeSyntax::generic("Array", vec![TypeSyntax::named("int")])),
    );
    let map_sig = f.registry.alloc_signature(SignatureRecord {
        parameters: vec![SignatureParam::new(
            "selector",
            TypeSyntax::Function {
                parameters: vec![ParamSyntax::typed("x", TypeSyntax::named("T"))],
                return_type: Box::new(TypeSyntax::named("U")),
            },
        )],
        return_type_syntax: Some(TypeSyntax::generic("Array", vec![TypeSyntax::named("U")])),
        type_parameters: vec![SignatureTypeParam::new("U")],
        declaring_type_ts_name: Some("Array".to_string()),
        declaring_member_name: Some("map".to_string()),
        ..Default::default()
    });
    let mut authority = f.authority();

    let call = ExprSyntax::Call {
        signature: Some(map_sig),
        receiver: Some(Box::new(ident("xs", xs))),
        arguments: vec![ExprSyntax::Lambda(LambdaSyntax {
            parameters: vec![LambdaParamSyntax {
                name: "x".to_string(),
                annotation: None,
            }],
            return_annotation: None,
            body: LambdaBodySyntax::Block {
                returns: vec![ExprSyntax::StringLit("even".to_string())],
            },
        })],
        type_arguments: vec![],
    };
    assert_eq!(
        authority.infer_initializer(&call),
        Some(IrType::reference("Array", vec![IrType::primitive("string")]))
    );
}

#[test]
fn calls_without_lambdas_resolve_in_one_pass() {
    let mut f = Fixture::new();
    // identity<T>(value: T): T
    let sig = f.registry.alloc_signature(SignatureRecord {
        parameters: vec![SignatureParam::new("value", TypeSyntax::named("T"))],
        return_type_syntax: Some(TypeSyntax::named("T")),
        type_parameters: vec![SignatureTypeParam::new("T")],
        ..Default::default()
    });
    let mut authority = f.authority();

    let call = ExprSyntax::Call {
        signature: Some(sig),
        receiver: None,
        arguments: vec![ExprSyntax::StringLit("v".to_string())],
        type_arguments: vec![],
    };
    assert_eq!(
        authority.infer_initializer(&call),
        Some(IrType::primitive("string"))
    );
}

#[test]
fn bare_lambdas_cannot_be_inferred() {
    let f = Fixture::new();
    let mut authority = f.authority();
    // Without an expected signature there is nothing to borrow types from.
    let lambda = ExprSyntax::Lambda(LambdaSyntax {
        parameters: vec![],
        return_annotation: None,
        body: LambdaBodySyntax::Expression(Box::new(number_lit("1"))),
    });
    assert_eq!(authority.infer_initializer(&lambda), None);
}
