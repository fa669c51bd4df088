//! Captured-syntax conversion.
//!
//! Purely syntactic lowering from `TypeSyntax` to `IrType`. Names are not
//! resolved here: a reference carries `type_id: None` until
//! `normalize_to_nominal` attaches an identity. The `scope` set holds the
//! type-parameter names visible at the annotation site, which is the only
//! context a syntactic converter may use.

use rustc_hash::FxHashSet;
use tsonic_ir::{
    IrMember, IrParameter, IrType, MemberSyntax, MethodSignature, ParamSyntax, PropertySignature,
    TypeSyntax,
};

/// Surface names that denote primitives rather than nominals.
const PRIMITIVE_NAMES: &[&str] = &[
    "string", "number", "boolean", "null", "undefined", "bigint", "symbol", "object", "int",
    "uint", "long", "ulong", "short", "ushort", "byte", "sbyte", "float", "double", "char",
    "decimal",
];

pub(crate) fn convert_type_syntax(syntax: &TypeSyntax, scope: &FxHashSet<String>) -> IrType {
    match syntax {
        TypeSyntax::Named { name, arguments } => convert_named(name, arguments, scope),
        TypeSyntax::ArrayOf(inner) => IrType::array(convert_type_syntax(inner, scope)),
        TypeSyntax::Tuple(elements) => IrType::tuple(
            elements
                .iter()
                .map(|e| convert_type_syntax(e, scope))
                .collect(),
        ),
        TypeSyntax::Function {
            parameters,
            return_type,
        } => IrType::function(
            parameters.iter().map(|p| convert_param(p, scope)).collect(),
            convert_type_syntax(return_type, scope),
        ),
        TypeSyntax::Union(types) => {
            IrType::union(types.iter().map(|t| convert_type_syntax(t, scope)).collect())
        }
        TypeSyntax::Intersection(types) => IrType::intersection(
            types.iter().map(|t| convert_type_syntax(t, scope)).collect(),
        ),
        TypeSyntax::ObjectLiteral(members) => IrType::object(
            members
                .iter()
                .map(|m| convert_member(m, scope))
                .collect(),
        ),
        TypeSyntax::Dictionary { key, value } => IrType::dictionary(
            convert_type_syntax(key, scope),
            convert_type_syntax(value, scope),
        ),
        // Conditional types are not evaluated deterministically; callers
        // detect them through signature introspection instead.
        TypeSyntax::Conditional { .. } => IrType::Unknown,
        TypeSyntax::StringLiteral(value) => IrType::literal_string(value.clone()),
        TypeSyntax::NumberLiteral(value) => IrType::literal_number(*value),
    }
}

fn convert_named(name: &str, arguments: &[TypeSyntax], scope: &FxHashSet<String>) -> IrType {
    if arguments.is_empty() {
        if scope.contains(name) {
            return IrType::type_param(name);
        }
        match name {
            "void" => return IrType::Void,
            "never" => return IrType::Never,
            "unknown" => return IrType::Unknown,
            "any" => return IrType::Any,
            _ => {}
        }
        if PRIMITIVE_NAMES.contains(&name) {
            return IrType::primitive(name);
        }
    }
    IrType::reference(
        name,
        arguments
            .iter()
            .map(|a| convert_type_syntax(a, scope))
            .collect(),
    )
}

pub(crate) fn convert_param(param: &ParamSyntax, scope: &FxHashSet<String>) -> IrParameter {
    IrParameter {
        name: Some(param.name.clone()),
        ty: param
            .ty
            .as_ref()
            .map_or(IrType::Unknown, |t| convert_type_syntax(t, scope)),
        is_optional: param.is_optional,
        is_rest: param.is_rest,
    }
}

fn convert_member(member: &MemberSyntax, scope: &FxHashSet<String>) -> IrMember {
    match member {
        MemberSyntax::Property {
            name,
            ty,
            is_optional,
            is_readonly,
        } => IrMember::Property(PropertySignature {
            name: name.clone(),
            ty: convert_type_syntax(ty, scope),
            is_optional: *is_optional,
            is_readonly: *is_readonly,
        }),
        MemberSyntax::Method {
            name,
            parameters,
            return_type,
            type_parameters,
        } => {
            let mut inner = scope.clone();
            inner.extend(type_parameters.iter().cloned());
            IrMember::Method(MethodSignature {
                name: name.clone(),
                parameters: parameters.iter().map(|p| convert_param(p, &inner)).collect(),
                return_type: convert_type_syntax(return_type, &inner),
                type_parameters: type_parameters.clone(),
            })
        }
    }
}
