//! Overload scoring.
//!
//! Shared by the catalog fallback (unresolved type parameters) and the CLR
//! overload correction (surface-erased selection). Per argument/parameter
//! pair: 3 for exact equality, 2 when both normalize to the same nominal,
//! 1 when the argument reaches the parameter's nominal through its
//! inheritance chain, 0 otherwise.

use crate::members::NominalResolver;
use crate::relations::types_equal;
use tsonic_ir::IrType;

pub(crate) fn score_pair(resolver: &NominalResolver<'_>, arg: &IrType, param: &IrType) -> u32 {
    if types_equal(arg, param) {
        return 3;
    }
    let arg_nominal = resolver.normalize_to_nominal(arg);
    let param_nominal = resolver.normalize_to_nominal(param);
    match (arg_nominal, param_nominal) {
        (Some((arg_id, arg_args)), Some((param_id, _))) => {
            if arg_id == param_id {
                2
            } else if resolver
                .env()
                .get_instantiation(arg_id, &arg_args, param_id)
                .is_some()
            {
                1
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Sum of pair scores for per-argument parameter types.
pub(crate) fn score_arguments(
    resolver: &NominalResolver<'_>,
    args: &[IrType],
    params_per_arg: &[IrType],
) -> u32 {
    args.iter()
        .zip(params_per_arg.iter())
        .map(|(arg, param)| score_pair(resolver, arg, param))
        .sum()
}

/// Arity compatibility: a rest parameter may only be terminal; non-rest
/// signatures accept argument counts up to the parameter count provided
/// every unfilled position is optional.
pub(crate) fn arity_compatible(
    param_count: usize,
    rest_positions: &[bool],
    optional_positions: &[bool],
    argument_count: usize,
) -> bool {
    if rest_positions
        .iter()
        .enumerate()
        .any(|(i, &rest)| rest && i + 1 != param_count)
    {
        return false;
    }
    let has_rest = param_count > 0 && rest_positions[param_count - 1];
    if has_rest {
        return argument_count >= param_count - 1;
    }
    argument_count <= param_count
        && optional_positions[argument_count..]
            .iter()
            .all(|&optional| optional)
}

/// Candidate ranking key: higher score, then fewer type parameters, then
/// fewer parameters, then smaller stable ID.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CandidateRank {
    pub score: u32,
    pub type_param_count: usize,
    pub param_count: usize,
    pub stable_id: String,
}

impl CandidateRank {
    pub(crate) fn beats(&self, other: &CandidateRank) -> bool {
        if self.score != other.score {
            return self.score > other.score;
        }
        if self.type_param_count != other.type_param_count {
            return self.type_param_count < other.type_param_count;
        }
        if self.param_count != other.param_count {
            return self.param_count < other.param_count;
        }
        self.stable_id < other.stable_id
    }
}
