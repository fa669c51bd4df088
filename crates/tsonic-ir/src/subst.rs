//! Pure type-parameter substitution.
//!
//! `substitute` rewrites every variant shape, including structural members
//! nested inside references and objects. Inputs are never mutated; an empty
//! map is an identity rewrite.

use crate::types::{
    ArrayType, DictionaryType, FunctionType, IntersectionType, IrMember, IrParameter, IrType,
    MethodSignature, ObjectType, PropertySignature, ReferenceType, TupleType, UnionType,
};
use rustc_hash::FxHashMap;

/// Map from type-parameter name to the concrete type it is bound to.
pub type SubstMap = FxHashMap<String, IrType>;

/// Rewrite `ty`, replacing every type parameter bound in `map`.
pub fn substitute(ty: &IrType, map: &SubstMap) -> IrType {
    if map.is_empty() {
        return ty.clone();
    }
    match ty {
        IrType::TypeParameter(tp) => match map.get(&tp.name) {
            Some(replacement) => replacement.clone(),
            None => ty.clone(),
        },
        IrType::Primitive(_) | IrType::Literal(_) => ty.clone(),
        IrType::Void | IrType::Never | IrType::Unknown | IrType::Any => ty.clone(),
        IrType::Reference(r) => IrType::Reference(ReferenceType {
            name: r.name.clone(),
            type_arguments: r.type_arguments.iter().map(|a| substitute(a, map)).collect(),
            type_id: r.type_id,
            structural_members: r
                .structural_members
                .as_ref()
                .map(|members| members.iter().map(|m| substitute_member(m, map)).collect()),
            resolved_clr_type: r.resolved_clr_type.clone(),
        }),
        IrType::Array(a) => IrType::Array(ArrayType {
            element_type: Box::new(substitute(&a.element_type, map)),
            origin: a.origin,
        }),
        IrType::Tuple(t) => IrType::Tuple(TupleType {
            element_types: t.element_types.iter().map(|e| substitute(e, map)).collect(),
        }),
        IrType::Function(f) => IrType::Function(FunctionType {
            parameters: f.parameters.iter().map(|p| substitute_param(p, map)).collect(),
            return_type: Box::new(substitute(&f.return_type, map)),
        }),
        IrType::Union(u) => IrType::Union(UnionType {
            types: u.types.iter().map(|t| substitute(t, map)).collect(),
        }),
        IrType::Intersection(i) => IrType::Intersection(IntersectionType {
            types: i.types.iter().map(|t| substitute(t, map)).collect(),
        }),
        IrType::Object(o) => IrType::Object(ObjectType {
            members: o.members.iter().map(|m| substitute_member(m, map)).collect(),
        }),
        IrType::Dictionary(d) => IrType::Dictionary(DictionaryType {
            key_type: Box::new(substitute(&d.key_type, map)),
            value_type: Box::new(substitute(&d.value_type, map)),
        }),
    }
}

fn substitute_param(param: &IrParameter, map: &SubstMap) -> IrParameter {
    IrParameter {
        name: param.name.clone(),
        ty: substitute(&param.ty, map),
        is_optional: param.is_optional,
        is_rest: param.is_rest,
    }
}

fn substitute_member(member: &IrMember, map: &SubstMap) -> IrMember {
    match member {
        IrMember::Property(p) => IrMember::Property(PropertySignature {
            name: p.name.clone(),
            ty: substitute(&p.ty, map),
            is_optional: p.is_optional,
            is_readonly: p.is_readonly,
        }),
        IrMember::Method(m) => {
            // The method's own type parameters shadow outer bindings.
            let shadowed: Vec<&String> = m
                .type_parameters
                .iter()
                .filter(|tp| map.contains_key(*tp))
                .collect();
            if shadowed.is_empty() {
                IrMember::Method(MethodSignature {
                    name: m.name.clone(),
                    parameters: m.parameters.iter().map(|p| substitute_param(p, map)).collect(),
                    return_type: substitute(&m.return_type, map),
                    type_parameters: m.type_parameters.clone(),
                })
            } else {
                let mut narrowed = map.clone();
                for tp in shadowed {
                    narrowed.remove(tp);
                }
                IrMember::Method(MethodSignature {
                    name: m.name.clone(),
                    parameters: m
                        .parameters
                        .iter()
                        .map(|p| substitute_param(p, &narrowed))
                        .collect(),
                    return_type: substitute(&m.return_type, &narrowed),
                    type_parameters: m.type_parameters.clone(),
                })
            }
        }
    }
}

/// Compose two substitutions: applying the result is equivalent to applying
/// `first` and then `second`.
pub fn compose(first: &SubstMap, second: &SubstMap) -> SubstMap {
    let mut out: SubstMap = first
        .iter()
        .map(|(name, ty)| (name.clone(), substitute(ty, second)))
        .collect();
    for (name, ty) in second {
        out.entry(name.clone()).or_insert_with(|| ty.clone());
    }
    out
}
