//! Structural equality, conservative assignability, and type-parameter
//! occurrence checks.
//!
//! Assignability is deliberately conservative: uncertainty answers `false`,
//! never a guess. The only structural subtyping admitted is arrays, unions,
//! and nominal inheritance.

use crate::members::NominalResolver;
use crate::state::TypeAuthority;
use tracing::trace;
use tsonic_ir::{IrMember, IrType, LiteralValue};

/// Structural equality with kind-first dispatch.
///
/// Unions and intersections compare order-independently. Function types
/// compare by parameter types and return type; both sides must agree on
/// which optional fields are absent.
pub fn types_equal(a: &IrType, b: &IrType) -> bool {
    match (a, b) {
        (IrType::Primitive(x), IrType::Primitive(y)) => x.name == y.name,
        (IrType::Reference(x), IrType::Reference(y)) => {
            let identity_matches = match (x.type_id, y.type_id) {
                (Some(xi), Some(yi)) => xi == yi,
                _ => x.name == y.name,
            };
            identity_matches
                && x.type_arguments.len() == y.type_arguments.len()
                && x.type_arguments
                    .iter()
                    .zip(y.type_arguments.iter())
                    .all(|(xa, ya)| types_equal(xa, ya))
        }
        (IrType::Array(x), IrType::Array(y)) => types_equal(&x.element_type, &y.element_type),
        (IrType::Tuple(x), IrType::Tuple(y)) => {
            x.element_types.len() == y.element_types.len()
                && x.element_types
                    .iter()
                    .zip(y.element_types.iter())
                    .all(|(xe, ye)| types_equal(xe, ye))
        }
        (IrType::Function(x), IrType::Function(y)) => {
            x.parameters.len() == y.parameters.len()
                && x.parameters.iter().zip(y.parameters.iter()).all(|(xp, yp)| {
                    xp.is_optional == yp.is_optional
                        && xp.is_rest == yp.is_rest
                        && types_equal(&xp.ty, &yp.ty)
                })
                && types_equal(&x.return_type, &y.return_type)
        }
        (IrType::Union(x), IrType::Union(y)) => {
            sets_equal(&x.types, &y.types)
        }
        (IrType::Intersection(x), IrType::Intersection(y)) => sets_equal(&x.types, &y.types),
        (IrType::Object(x), IrType::Object(y)) => {
            x.members.len() == y.members.len()
                && x.members.iter().all(|xm| {
                    y.members
                        .iter()
                        .any(|ym| members_equal(xm, ym))
                })
        }
        (IrType::Dictionary(x), IrType::Dictionary(y)) => {
            types_equal(&x.key_type, &y.key_type) && types_equal(&x.value_type, &y.value_type)
        }
        (IrType::Literal(x), IrType::Literal(y)) => match (&x.value, &y.value) {
            (LiteralValue::String(xs), LiteralValue::String(ys)) => xs == ys,
            (LiteralValue::Number(xn), LiteralValue::Number(yn)) => xn == yn,
            _ => false,
        },
        (IrType::TypeParameter(x), IrType::TypeParameter(y)) => x.name == y.name,
        (IrType::Void, IrType::Void)
        | (IrType::Never, IrType::Never)
        | (IrType::Unknown, IrType::Unknown)
        | (IrType::Any, IrType::Any) => true,
        _ => false,
    }
}

/// Order-independent comparison of union/intersection constituent lists.
fn sets_equal(xs: &[IrType], ys: &[IrType]) -> bool {
    xs.len() == ys.len()
        && xs.iter().all(|x| ys.iter().any(|y| types_equal(x, y)))
        && ys.iter().all(|y| xs.iter().any(|x| types_equal(x, y)))
}

fn members_equal(a: &IrMember, b: &IrMember) -> bool {
    match (a, b) {
        (IrMember::Property(x), IrMember::Property(y)) => {
            x.name == y.name
                && x.is_optional == y.is_optional
                && x.is_readonly == y.is_readonly
                && types_equal(&x.ty, &y.ty)
        }
        (IrMember::Method(x), IrMember::Method(y)) => {
            x.name == y.name
                && x.parameters.len() == y.parameters.len()
                && x.parameters
                    .iter()
                    .zip(y.parameters.iter())
                    .all(|(xp, yp)| types_equal(&xp.ty, &yp.ty))
                && types_equal(&x.return_type, &y.return_type)
        }
        _ => false,
    }
}

/// Whether any type parameter occurs anywhere in `ty`, including structural
/// object members.
pub fn contains_type_parameter(ty: &IrType) -> bool {
    contains_type_parameter_of(ty, None)
}

/// Like `contains_type_parameter`, restricted to a name set when supplied.
pub(crate) fn contains_type_parameter_of(ty: &IrType, names: Option<&[String]>) -> bool {
    let matches_name = |name: &str| names.is_none_or(|ns| ns.iter().any(|n| n == name));
    match ty {
        IrType::TypeParameter(tp) => matches_name(&tp.name),
        IrType::Primitive(_) | IrType::Literal(_) => false,
        IrType::Void | IrType::Never | IrType::Unknown | IrType::Any => false,
        IrType::Reference(r) => {
            r.type_arguments
                .iter()
                .any(|a| contains_type_parameter_of(a, names))
                || r.structural_members.as_ref().is_some_and(|members| {
                    members.iter().any(|m| member_contains(m, names))
                })
        }
        IrType::Array(a) => contains_type_parameter_of(&a.element_type, names),
        IrType::Tuple(t) => t
            .element_types
            .iter()
            .any(|e| contains_type_parameter_of(e, names)),
        IrType::Function(f) => {
            f.parameters
                .iter()
                .any(|p| contains_type_parameter_of(&p.ty, names))
                || contains_type_parameter_of(&f.return_type, names)
        }
        IrType::Union(u) => u.types.iter().any(|t| contains_type_parameter_of(t, names)),
        IrType::Intersection(i) => i.types.iter().any(|t| contains_type_parameter_of(t, names)),
        IrType::Object(o) => o.members.iter().any(|m| member_contains(m, names)),
        IrType::Dictionary(d) => {
            contains_type_parameter_of(&d.key_type, names)
                || contains_type_parameter_of(&d.value_type, names)
        }
    }
}

fn member_contains(member: &IrMember, names: Option<&[String]>) -> bool {
    match member {
        IrMember::Property(p) => contains_type_parameter_of(&p.ty, names),
        IrMember::Method(m) => {
            m.parameters
                .iter()
                .any(|p| contains_type_parameter_of(&p.ty, names))
                || contains_type_parameter_of(&m.return_type, names)
        }
    }
}

/// Conservative assignability of `source` to `target`.
pub(crate) fn is_assignable(resolver: &NominalResolver<'_>, source: &IrType, target: &IrType) -> bool {
    if types_equal(source, target) {
        return true;
    }
    if source.is_any() || target.is_any() {
        return true;
    }
    if matches!(source, IrType::Never) {
        return true;
    }

    // A nullish primitive flows only into a union that names it.
    if source.is_nullish() {
        return match target {
            IrType::Union(u) => u.types.iter().any(|t| types_equal(source, t)),
            _ => false,
        };
    }

    if let (Some(s), Some(t)) = (source.primitive_name(), target.primitive_name()) {
        return s == t;
    }

    // All union-source members must flow; a union target needs one branch.
    if let IrType::Union(u) = source {
        return u.types.iter().all(|t| is_assignable(resolver, t, target));
    }
    if let IrType::Union(u) = target {
        return u.types.iter().any(|t| is_assignable(resolver, source, t));
    }

    if let (IrType::Array(s), IrType::Array(t)) = (source, target) {
        return is_assignable(resolver, &s.element_type, &t.element_type);
    }

    if let (IrType::Reference(_), IrType::Reference(_)) = (source, target) {
        let Some((source_id, source_args)) = resolver.normalize_to_nominal(source) else {
            return false;
        };
        let Some((target_id, target_args)) = resolver.normalize_to_nominal(target) else {
            return false;
        };
        if source_id == target_id {
            // Invariant type arguments.
            return source_args.len() == target_args.len()
                && source_args
                    .iter()
                    .zip(target_args.iter())
                    .all(|(s, t)| types_equal(s, t));
        }
        return resolver
            .env()
            .inheritance_chain(source_id)
            .iter()
            .any(|&ancestor| ancestor == target_id);
    }

    false
}

// =============================================================================
// Relation Methods
// =============================================================================

impl<'a> TypeAuthority<'a> {
    /// Structural type equality.
    pub fn types_equal(&self, a: &IrType, b: &IrType) -> bool {
        types_equal(a, b)
    }

    /// Conservative assignability; `false` on uncertainty.
    pub fn is_assignable_to(&self, source: &IrType, target: &IrType) -> bool {
        let result = is_assignable(&self.resolver(), source, target);
        trace!(
            source = %crate::display::display_type(source),
            target = %crate::display::display_type(target),
            result,
            "is_assignable_to"
        );
        result
    }

    pub fn contains_type_parameter(&self, ty: &IrType) -> bool {
        contains_type_parameter(ty)
    }
}
