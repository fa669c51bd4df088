//! Utility type expansion.
//!
//! The mapped/conditional utilities expand deterministically to concrete IR
//! types. Expansion is deferred - silently returning `unknown` - while the
//! subject still contains a type parameter, because the call substitution
//! will re-expand once the arguments are concrete. Shape-constraint
//! violations emit `UTILITY-CONSTRAINT` and poison the result.

use crate::display::{display_type, format_number};
use crate::relations::{contains_type_parameter, types_equal};
use crate::state::TypeAuthority;
use tsonic_common::diagnostics::{DiagnosticCode, SourceLocation};
use tsonic_ir::{
    IrMember, IrType, LiteralValue, PropertySignature, ReferenceType, UnionType,
};

/// The built-in type-level operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UtilityName {
    Partial,
    Required,
    Readonly,
    Pick,
    Omit,
    NonNullable,
    Exclude,
    Extract,
    ReturnType,
    Parameters,
    Awaited,
    Record,
}

impl UtilityName {
    pub fn from_name(name: &str) -> Option<UtilityName> {
        Some(match name {
            "Partial" => UtilityName::Partial,
            "Required" => UtilityName::Required,
            "Readonly" => UtilityName::Readonly,
            "Pick" => UtilityName::Pick,
            "Omit" => UtilityName::Omit,
            "NonNullable" => UtilityName::NonNullable,
            "Exclude" => UtilityName::Exclude,
            "Extract" => UtilityName::Extract,
            "ReturnType" => UtilityName::ReturnType,
            "Parameters" => UtilityName::Parameters,
            "Awaited" => UtilityName::Awaited,
            "Record" => UtilityName::Record,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            UtilityName::Partial => "Partial",
            UtilityName::Required => "Required",
            UtilityName::Readonly => "Readonly",
            UtilityName::Pick => "Pick",
            UtilityName::Omit => "Omit",
            UtilityName::NonNullable => "NonNullable",
            UtilityName::Exclude => "Exclude",
            UtilityName::Extract => "Extract",
            UtilityName::ReturnType => "ReturnType",
            UtilityName::Parameters => "Parameters",
            UtilityName::Awaited => "Awaited",
            UtilityName::Record => "Record",
        }
    }
}

impl<'a> TypeAuthority<'a> {
    /// Expand one utility application to a concrete IR type.
    pub fn expand_utility(
        &mut self,
        utility: UtilityName,
        args: &[IrType],
        site: Option<&SourceLocation>,
    ) -> IrType {
        // Deferred until the subject is concrete.
        if args.first().is_some_and(contains_type_parameter) {
            return IrType::Unknown;
        }
        let Some(subject) = args.first() else {
            return self.utility_constraint(utility, "missing type argument", site);
        };

        match utility {
            UtilityName::NonNullable => expand_non_nullable(subject),
            UtilityName::Partial => self.rewrite_flags(utility, subject, site, |p| {
                p.is_optional = true;
            }),
            UtilityName::Required => self.rewrite_flags(utility, subject, site, |p| {
                p.is_optional = false;
            }),
            UtilityName::Readonly => self.rewrite_flags(utility, subject, site, |p| {
                p.is_readonly = true;
            }),
            UtilityName::Pick | UtilityName::Omit => {
                let Some(keys) = args.get(1).and_then(extract_literal_keys) else {
                    return self.utility_constraint(
                        utility,
                        "key argument must be a finite set of string or number literals",
                        site,
                    );
                };
                let Some(members) = self.recoverable_members(subject) else {
                    return self.utility_constraint(
                        utility,
                        "subject must be an object type or a reference with structural members",
                        site,
                    );
                };
                let keep_listed = utility == UtilityName::Pick;
                IrType::object(
                    members
                        .into_iter()
                        .filter(|m| keys.iter().any(|k| k == m.name()) == keep_listed)
                        .collect(),
                )
            }
            UtilityName::ReturnType => match subject.as_function() {
                Some(f) => (*f.return_type).clone(),
                None => self.utility_constraint(utility, "subject must be a function type", site),
            },
            UtilityName::Parameters => match subject.as_function() {
                Some(f) => {
                    IrType::tuple(f.parameters.iter().map(|p| p.ty.clone()).collect())
                }
                None => self.utility_constraint(utility, "subject must be a function type", site),
            },
            UtilityName::Exclude | UtilityName::Extract => {
                let Some(filter) = args.get(1) else {
                    return self.utility_constraint(utility, "missing filter argument", site);
                };
                expand_filter(subject, filter, utility == UtilityName::Extract)
            }
            UtilityName::Awaited => expand_awaited(subject),
            UtilityName::Record => {
                let Some(keys) = args.first().and_then(extract_literal_keys) else {
                    // Callers fall back to a dictionary type for open key sets.
                    return self.utility_constraint(
                        utility,
                        "key argument must be a finite set of literals",
                        site,
                    );
                };
                let value = args.get(1).cloned().unwrap_or(IrType::Unknown);
                IrType::object(
                    keys.into_iter()
                        .map(|key| {
                            IrMember::Property(PropertySignature {
                                name: key,
                                ty: value.clone(),
                                is_optional: false,
                                is_readonly: false,
                            })
                        })
                        .collect(),
                )
            }
        }
    }

    fn utility_constraint(
        &mut self,
        utility: UtilityName,
        message: &str,
        site: Option<&SourceLocation>,
    ) -> IrType {
        self.diag(
            DiagnosticCode::UtilityConstraint,
            format!("{}: {message}", utility.as_str()),
            site,
        );
        IrType::Unknown
    }

    fn rewrite_flags(
        &mut self,
        utility: UtilityName,
        subject: &IrType,
        site: Option<&SourceLocation>,
        rewrite: impl Fn(&mut PropertySignature),
    ) -> IrType {
        let Some(members) = self.recoverable_members(subject) else {
            return self.utility_constraint(
                utility,
                &format!(
                    "'{}' is not an object type or a reference with structural members",
                    display_type(subject)
                ),
                site,
            );
        };
        IrType::object(
            members
                .into_iter()
                .map(|m| match m {
                    IrMember::Property(mut p) => {
                        rewrite(&mut p);
                        IrMember::Property(p)
                    }
                    method @ IrMember::Method(_) => method,
                })
                .collect(),
        )
    }

    /// Structural members of the subject: inline object members, or members
    /// recovered from an interface/alias reference.
    fn recoverable_members(&self, subject: &IrType) -> Option<Vec<IrMember>> {
        match subject {
            IrType::Object(o) => Some(o.members.clone()),
            IrType::Reference(r) => self.resolver().reference_structural_members(r),
            _ => None,
        }
    }

    /// Deep rewrite expanding every utility reference whose arguments have
    /// become concrete. References still mentioning type parameters are
    /// left for a later substitution to make expandable.
    pub(crate) fn expand_pending_utilities(&mut self, ty: &IrType) -> IrType {
        match ty {
            IrType::Reference(r) => {
                let rewritten = ReferenceType {
                    name: r.name.clone(),
                    type_arguments: r
                        .type_arguments
                        .iter()
                        .map(|a| self.expand_pending_utilities(a))
                        .collect(),
                    type_id: r.type_id,
                    structural_members: r.structural_members.clone(),
                    resolved_clr_type: r.resolved_clr_type.clone(),
                };
                if let Some(utility) = UtilityName::from_name(&rewritten.name) {
                    if !rewritten
                        .type_arguments
                        .iter()
                        .any(contains_type_parameter)
                    {
                        let args = rewritten.type_arguments.clone();
                        return self.expand_utility(utility, &args, None);
                    }
                }
                IrType::Reference(rewritten)
            }
            IrType::Array(a) => {
                let element = self.expand_pending_utilities(&a.element_type);
                IrType::Array(tsonic_ir::ArrayType {
                    element_type: Box::new(element),
                    origin: a.origin,
                })
            }
            IrType::Tuple(t) => IrType::tuple(
                t.element_types
                    .iter()
                    .map(|e| self.expand_pending_utilities(e))
                    .collect(),
            ),
            IrType::Function(f) => {
                let parameters = f
                    .parameters
                    .iter()
                    .map(|p| tsonic_ir::IrParameter {
                        name: p.name.clone(),
                        ty: self.expand_pending_utilities(&p.ty),
                        is_optional: p.is_optional,
                        is_rest: p.is_rest,
                    })
                    .collect();
                let return_type = self.expand_pending_utilities(&f.return_type);
                IrType::function(parameters, return_type)
            }
            IrType::Union(u) => IrType::union(
                u.types
                    .iter()
                    .map(|t| self.expand_pending_utilities(t))
                    .collect(),
            ),
            IrType::Intersection(i) => IrType::intersection(
                i.types
                    .iter()
                    .map(|t| self.expand_pending_utilities(t))
                    .collect(),
            ),
            IrType::Dictionary(d) => IrType::dictionary(
                self.expand_pending_utilities(&d.key_type),
                self.expand_pending_utilities(&d.value_type),
            ),
            _ => ty.clone(),
        }
    }

    /// Utility expansion without diagnostic noise, for speculative paths.
    pub(crate) fn expand_utilities_quiet(&mut self, ty: &IrType) -> IrType {
        self.quietly(|authority| authority.expand_pending_utilities(ty))
    }
}

fn expand_non_nullable(subject: &IrType) -> IrType {
    if subject.is_nullish() {
        return IrType::Never;
    }
    if let IrType::Union(u) = subject {
        let survivors: Vec<IrType> = u
            .types
            .iter()
            .filter(|t| !t.is_nullish())
            .cloned()
            .collect();
        return match survivors.len() {
            0 => IrType::Never,
            1 => survivors.into_iter().next().unwrap_or(IrType::Never),
            _ => IrType::Union(UnionType { types: survivors }),
        };
    }
    subject.clone()
}

fn expand_filter(subject: &IrType, filter: &IrType, keep_matching: bool) -> IrType {
    let filter_branches: Vec<&IrType> = match filter {
        IrType::Union(u) => u.types.iter().collect(),
        other => vec![other],
    };
    let matches = |t: &IrType| filter_branches.iter().any(|f| types_equal(t, f));

    let subject_branches: Vec<&IrType> = match subject {
        IrType::Union(u) => u.types.iter().collect(),
        other => vec![other],
    };
    let survivors: Vec<IrType> = subject_branches
        .into_iter()
        .filter(|t| matches(t) == keep_matching)
        .cloned()
        .collect();
    match survivors.len() {
        0 => IrType::Never,
        1 => survivors.into_iter().next().unwrap_or(IrType::Never),
        _ => IrType::Union(UnionType { types: survivors }),
    }
}

fn expand_awaited(subject: &IrType) -> IrType {
    match subject {
        IrType::Union(u) => IrType::union(u.types.iter().map(expand_awaited).collect()),
        IrType::Reference(r) => {
            let awaitable = matches!(
                r.name.as_str(),
                "Promise" | "PromiseLike" | "Task" | "ValueTask"
            );
            if awaitable && r.type_arguments.len() == 1 {
                expand_awaited(&r.type_arguments[0])
            } else if matches!(r.name.as_str(), "Task" | "ValueTask")
                && r.type_arguments.is_empty()
            {
                IrType::Void
            } else {
                subject.clone()
            }
        }
        _ => subject.clone(),
    }
}

/// Literal keys: the raw text of string literals, numeric literals
/// stringified.
fn extract_literal_keys(ty: &IrType) -> Option<Vec<String>> {
    let literal_key = |t: &IrType| -> Option<String> {
        match t {
            IrType::Literal(l) => Some(match &l.value {
                LiteralValue::String(s) => s.clone(),
                LiteralValue::Number(n) => format_number(*n),
            }),
            _ => None,
        }
    };
    match ty {
        IrType::Union(u) => u.types.iter().map(literal_key).collect(),
        other => literal_key(other).map(|k| vec![k]),
    }
}
