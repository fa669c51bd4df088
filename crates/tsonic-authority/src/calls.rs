//! Call resolution.
//!
//! `resolve_call` takes a bound signature plus optional receiver, explicit
//! type arguments, argument types, and an expected return, and produces a
//! fully substituted `ResolvedCall`. The call substitution is built from
//! four ordered sources - explicit arguments, `this`-driven unification,
//! argument-driven unification, expected-return unification - then padded
//! with declared defaults. Assembly-origin declaring types additionally get
//! catalog overload fallback and correction, which is how structurally
//! erased surface types still reach the correct CLR overload.

use crate::convert::convert_type_syntax;
use crate::overloads::{CandidateRank, arity_compatible, score_arguments};
use crate::relations::{contains_type_parameter_of, types_equal};
use crate::state::TypeAuthority;
use crate::unify::Unifier;
use rustc_hash::FxHashSet;
use tracing::trace;
use tsonic_catalog::{MemberEntry, MethodSignatureEntry, NominalOrigin};
use tsonic_common::diagnostics::{DiagnosticCode, SourceLocation};
use tsonic_ir::{IrType, ParamMode, SignatureId, SubstMap, TypeId, substitute};

/// One call site's worth of typing context.
#[derive(Clone, Debug)]
pub struct CallQuery {
    pub signature: SignatureId,
    pub argument_count: usize,
    pub receiver_type: Option<IrType>,
    pub explicit_type_args: Vec<IrType>,
    pub arg_types: Option<Vec<IrType>>,
    pub expected_return_type: Option<IrType>,
    pub site: Option<SourceLocation>,
}

impl CallQuery {
    pub fn new(signature: SignatureId, argument_count: usize) -> Self {
        Self {
            signature,
            argument_count,
            receiver_type: None,
            explicit_type_args: Vec::new(),
            arg_types: None,
            expected_return_type: None,
            site: None,
        }
    }

    #[must_use]
    pub fn with_receiver(mut self, receiver: IrType) -> Self {
        self.receiver_type = Some(receiver);
        self
    }

    #[must_use]
    pub fn with_explicit_type_args(mut self, args: Vec<IrType>) -> Self {
        self.explicit_type_args = args;
        self
    }

    #[must_use]
    pub fn with_arg_types(mut self, args: Vec<IrType>) -> Self {
        self.arg_types = Some(args);
        self
    }

    #[must_use]
    pub fn with_expected_return(mut self, expected: IrType) -> Self {
        self.expected_return_type = Some(expected);
        self
    }
}

/// A resolved `x is T` predicate.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedPredicate {
    pub parameter: String,
    pub ty: IrType,
}

/// The semantic result of a call: one parameter type and mode per argument
/// position, the substituted return, and the diagnostics charged to this
/// call.
#[derive(Clone, Debug)]
pub struct ResolvedCall {
    pub parameter_types: Vec<IrType>,
    pub parameter_modes: Vec<ParamMode>,
    pub return_type: IrType,
    pub type_predicate: Option<ResolvedPredicate>,
    pub diagnostics: Vec<DiagnosticCode>,
}

impl ResolvedCall {
    pub(crate) fn poisoned(arity: usize, diagnostics: Vec<DiagnosticCode>) -> Self {
        Self {
            parameter_types: vec![IrType::Unknown; arity],
            parameter_modes: vec![ParamMode::Value; arity],
            return_type: IrType::Unknown,
            type_predicate: None,
            diagnostics,
        }
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

// =============================================================================
// Raw signatures
// =============================================================================

#[derive(Clone, Debug)]
pub(crate) struct RawParam {
    pub name: String,
    pub ty: IrType,
    pub mode: ParamMode,
    pub is_optional: bool,
    pub is_rest: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct RawTypeParam {
    pub name: String,
    pub default: Option<IrType>,
}

/// A signature loaded from captured syntax (or synthesized from a catalog
/// entry), with every annotation already converted to IR.
#[derive(Clone, Debug)]
pub(crate) struct RawSignature {
    pub parameters: Vec<RawParam>,
    pub return_type: IrType,
    pub this_type: Option<IrType>,
    pub type_parameters: Vec<RawTypeParam>,
    pub type_predicate: Option<ResolvedPredicate>,
    pub declaring_type_ts_name: Option<String>,
    pub declaring_member_name: Option<String>,
    pub stable_id: String,
}

/// Intermediate state after the substitution pipeline has run.
pub(crate) struct PipelineOutcome {
    pub per_arg_types: Vec<IrType>,
    pub per_arg_modes: Vec<ParamMode>,
    pub return_type: IrType,
    pub predicate: Option<ResolvedPredicate>,
    pub conflict: bool,
    /// Method type parameters left unbound that occur in the return.
    pub unresolved: Vec<String>,
}

pub(crate) struct CatalogBest {
    pub rank: CandidateRank,
    pub outcome: PipelineOutcome,
}

impl<'a> TypeAuthority<'a> {
    /// Load (and cache) the raw signature behind a handle.
    pub(crate) fn raw_signature(&mut self, id: SignatureId) -> Option<RawSignature> {
        if let Some(cached) = self.raw_signatures.get(&id) {
            return Some(cached.clone());
        }
        let record = self.registry.signature(id)?;

        let mut scope: FxHashSet<String> = record
            .type_parameters
            .iter()
            .map(|tp| tp.name.clone())
            .collect();
        if let Some(declaring) = &record.declaring_type_ts_name {
            let resolver = self.resolver();
            if let Some(decl_id) = resolver.resolve_type_id_by_name(declaring, None) {
                for tp in self.env.catalog().type_parameters(decl_id) {
                    scope.insert(tp.name.clone());
                }
            }
        }

        let parameters: Vec<RawParam> = record
            .parameters
            .iter()
            .map(|p| {
                let converted = p
                    .type_syntax
                    .as_ref()
                    .map_or(IrType::Unknown, |ts| convert_type_syntax(ts, &scope));
                let ty = if p.is_optional {
                    IrType::union(vec![converted, IrType::primitive("undefined")])
                } else {
                    converted
                };
                RawParam {
                    name: p.name.clone(),
                    ty,
                    mode: p.mode,
                    is_optional: p.is_optional,
                    is_rest: p.is_rest,
                }
            })
            .collect();

        let return_type = match &record.return_type_syntax {
            Some(ts) => convert_type_syntax(ts, &scope),
            None if record.is_constructor => match &record.constructed_type_syntax {
                Some(ts) => convert_type_syntax(ts, &scope),
                None => self.constructed_instance_type(record.declaring_type_ts_name.as_deref()),
            },
            None => IrType::Unknown,
        };

        let raw = RawSignature {
            parameters,
            return_type,
            this_type: record
                .this_type_syntax
                .as_ref()
                .map(|ts| convert_type_syntax(ts, &scope)),
            type_parameters: record
                .type_parameters
                .iter()
                .map(|tp| RawTypeParam {
                    name: tp.name.clone(),
                    default: tp.default.as_ref().map(|d| convert_type_syntax(d, &scope)),
                })
                .collect(),
            type_predicate: record.type_predicate.as_ref().map(|p| ResolvedPredicate {
                parameter: p.parameter.clone(),
                ty: convert_type_syntax(&p.target, &scope),
            }),
            declaring_type_ts_name: record.declaring_type_ts_name.clone(),
            declaring_member_name: record.declaring_member_name.clone(),
            stable_id: format!("sig:{}", id.0),
        };
        self.raw_signatures.insert(id, raw.clone());
        Some(raw)
    }

    /// The instance type a constructor produces, when only the declaring
    /// type name is known.
    fn constructed_instance_type(&self, declaring: Option<&str>) -> IrType {
        let Some(name) = declaring else {
            return IrType::Unknown;
        };
        let resolver = self.resolver();
        match resolver.resolve_type_id_by_name(name, None) {
            Some(id) => {
                let args: Vec<IrType> = self
                    .env
                    .catalog()
                    .type_parameters(id)
                    .iter()
                    .map(|tp| IrType::type_param(&tp.name))
                    .collect();
                IrType::reference_to(id, name, args)
            }
            None => IrType::reference(name, Vec::new()),
        }
    }

    // =========================================================================
    // resolve_call
    // =========================================================================

    pub fn resolve_call(&mut self, query: &CallQuery) -> ResolvedCall {
        let arity = query.argument_count;
        let Some(raw) = self.raw_signature(query.signature) else {
            self.binding_contract_violation("signature", query.site.as_ref());
            return ResolvedCall::poisoned(arity, vec![DiagnosticCode::ResolutionFailed]);
        };

        let receiver = query
            .receiver_type
            .as_ref()
            .map(|r| self.resolver().strip_extension_wrappers(r));

        let outcome = self.run_call_pipeline(
            &raw,
            receiver.as_ref(),
            arity,
            &query.explicit_type_args,
            query.arg_types.as_deref(),
            query.expected_return_type.as_ref(),
        );
        if outcome.conflict {
            self.diag(
                DiagnosticCode::TypeArgConflict,
                "call-site type arguments are contradictory",
                query.site.as_ref(),
            );
            return ResolvedCall::poisoned(arity, vec![DiagnosticCode::TypeArgConflict]);
        }

        let mut resolved = ResolvedCall {
            parameter_types: outcome.per_arg_types,
            parameter_modes: outcome.per_arg_modes,
            return_type: outcome.return_type,
            type_predicate: outcome.predicate,
            diagnostics: Vec::new(),
        };

        // Unresolved method type parameters in the return: try the catalog
        // for assembly-origin declaring types before poisoning the return.
        if !outcome.unresolved.is_empty() {
            let corrected = self.catalog_fallback(&raw, receiver.as_ref(), query);
            match corrected {
                Some(best) => {
                    resolved = ResolvedCall {
                        parameter_types: best.outcome.per_arg_types,
                        parameter_modes: best.outcome.per_arg_modes,
                        return_type: best.outcome.return_type,
                        type_predicate: best.outcome.predicate,
                        diagnostics: Vec::new(),
                    };
                    trace!(member = raw.declaring_member_name.as_deref(), "catalog fallback resolved call");
                    return resolved;
                }
                None => {
                    self.diag(
                        DiagnosticCode::UnresolvedTypeArgs,
                        format!(
                            "cannot infer type arguments {} for this call",
                            outcome.unresolved.join(", ")
                        ),
                        query.site.as_ref(),
                    );
                    resolved.diagnostics.push(DiagnosticCode::UnresolvedTypeArgs);
                    resolved.return_type = IrType::Unknown;
                }
            }
        }

        // CLR overload correction: when the surface erasure picked a
        // semantically worse overload, the catalog's best candidate wins
        // only by scoring strictly higher.
        if let Some(args) = query.arg_types.as_deref() {
            if args.len() == arity && resolved.diagnostics.is_empty() {
                if let Some((declaring, member)) = self.assembly_declaring(&raw) {
                    let ts_score =
                        score_arguments(&self.resolver(), args, &resolved.parameter_types);
                    if let Some(best) = self.resolve_catalog_overloads(
                        declaring,
                        receiver.as_ref(),
                        &member,
                        arity,
                        Some(args),
                        &query.explicit_type_args,
                        query.expected_return_type.as_ref(),
                    ) {
                        if best.rank.score > ts_score
                            && !best.outcome.conflict
                            && best.outcome.unresolved.is_empty()
                        {
                            trace!(
                                member = %member,
                                ts_score,
                                catalog_score = best.rank.score,
                                "catalog overload correction"
                            );
                            resolved = ResolvedCall {
                                parameter_types: best.outcome.per_arg_types,
                                parameter_modes: best.outcome.per_arg_modes,
                                return_type: best.outcome.return_type,
                                type_predicate: best.outcome.predicate,
                                diagnostics: Vec::new(),
                            };
                        }
                    }
                }
            }
        }

        resolved
    }

    fn catalog_fallback(
        &mut self,
        raw: &RawSignature,
        receiver: Option<&IrType>,
        query: &CallQuery,
    ) -> Option<CatalogBest> {
        let (declaring, member) = self.assembly_declaring(raw)?;
        let best = self.resolve_catalog_overloads(
            declaring,
            receiver,
            &member,
            query.argument_count,
            query.arg_types.as_deref(),
            &query.explicit_type_args,
            query.expected_return_type.as_ref(),
        )?;
        if best.outcome.conflict || !best.outcome.unresolved.is_empty() {
            return None;
        }
        Some(best)
    }

    /// The declaring type when it resolves to an assembly-origin catalog
    /// entry, paired with the member name.
    fn assembly_declaring(&self, raw: &RawSignature) -> Option<(TypeId, String)> {
        let name = raw.declaring_type_ts_name.as_deref()?;
        let member = raw.declaring_member_name.clone()?;
        let id = self.resolver().resolve_type_id_by_name(name, None)?;
        let entry = self.env.catalog().get(id)?;
        if entry.origin != NominalOrigin::Assembly {
            return None;
        }
        Some((id, member))
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    /// Receiver substitution, the four ordered call-substitution sources,
    /// defaults, application, and per-argument extraction.
    pub(crate) fn run_call_pipeline(
        &mut self,
        raw: &RawSignature,
        receiver: Option<&IrType>,
        argument_count: usize,
        explicit_type_args: &[IrType],
        arg_types: Option<&[IrType]>,
        expected_return: Option<&IrType>,
    ) -> PipelineOutcome {
        let resolver = self.resolver();
        let mut params = raw.parameters.clone();
        let mut return_type = raw.return_type.clone();
        let mut this_type = raw.this_type.clone();
        let mut predicate = raw.type_predicate.clone();

        // Receiver substitution: declaring-class parameters get the
        // receiver's concrete arguments.
        if let (Some(recv), Some(declaring)) = (receiver, raw.declaring_type_ts_name.as_deref()) {
            let normalized = resolver.strip_nullish(recv);
            if let Some((recv_id, recv_args)) = resolver.normalize_to_nominal(&normalized) {
                if let Some(decl_id) = resolver.resolve_type_id_by_name(declaring, None) {
                    if let Some(map) = resolver.env().get_instantiation(recv_id, &recv_args, decl_id)
                    {
                        apply_substitution(&mut params, &mut return_type, &mut this_type, &mut predicate, &map);
                    }
                }
            }
        }

        let names: FxHashSet<String> = raw
            .type_parameters
            .iter()
            .map(|tp| tp.name.clone())
            .collect();
        let mut bindings = SubstMap::default();
        let mut conflict = false;

        if !names.is_empty() {
            // Source 1: explicit type arguments from call syntax.
            for (tp, ty) in raw.type_parameters.iter().zip(explicit_type_args.iter()) {
                bindings.insert(tp.name.clone(), ty.clone());
            }

            // Source 2: `this`-parameter-driven unification. Works with
            // zero arguments, which is how extension receivers infer. The
            // unifier is seeded with the bindings so far; a contradicting
            // binding surfaces as a conflict there.
            if !conflict {
                if let (Some(this), Some(recv)) = (&this_type, receiver) {
                    let mut unifier =
                        Unifier::new(&resolver, &names, std::mem::take(&mut bindings));
                    if !unifier.unify(this, recv) {
                        conflict = true;
                    }
                    bindings = unifier.bindings;
                }
            }

            // Source 3: argument-driven unification.
            if !conflict {
                if let Some(args) = arg_types {
                    for (i, arg) in args.iter().enumerate() {
                        let (slot_ty, _) = parameter_slot(&params, i);
                        let mut unifier =
                            Unifier::new(&resolver, &names, std::mem::take(&mut bindings));
                        if !unifier.unify(&slot_ty, arg) {
                            conflict = true;
                        }
                        bindings = unifier.bindings;
                        if conflict {
                            break;
                        }
                    }
                }
            }

            // Source 4: expected-return unification across candidates.
            // Conflicting candidate maps abandon the source, never the call.
            if !conflict {
                if let Some(expected) = expected_return {
                    let working = return_type.clone();
                    let candidates = self.expected_return_candidates(expected);
                    let mut successful: Vec<SubstMap> = Vec::new();
                    for candidate in &candidates {
                        let mut unifier = Unifier::new(&resolver, &names, bindings.clone());
                        if unifier.unify(&working, candidate) {
                            successful.push(unifier.bindings);
                        }
                    }
                    let mut merged = bindings.clone();
                    let mut source_conflict = false;
                    for map in &successful {
                        for (name, ty) in map {
                            match merged.get(name) {
                                None => {
                                    merged.insert(name.clone(), ty.clone());
                                }
                                Some(existing)
                                    if is_self_placeholder(existing, name) =>
                                {
                                    merged.insert(name.clone(), ty.clone());
                                }
                                Some(_) if is_self_placeholder(ty, name) => {}
                                Some(existing) if types_equal(existing, ty) => {}
                                Some(_) => {
                                    source_conflict = true;
                                }
                            }
                        }
                    }
                    if !source_conflict {
                        bindings = merged;
                    }
                }
            }

            // Defaults declared on the method's type parameters.
            if !conflict {
                for tp in &raw.type_parameters {
                    if is_unbound(&bindings, &tp.name) {
                        if let Some(default) = &tp.default {
                            let value = substitute(default, &bindings);
                            bindings.insert(tp.name.clone(), value);
                        }
                    }
                }
            }
        }

        // Apply the call substitution and expand any utility references
        // the substitution made concrete.
        apply_substitution(&mut params, &mut return_type, &mut this_type, &mut predicate, &bindings);
        for p in &mut params {
            p.ty = self.expand_utilities_quiet(&p.ty);
        }
        return_type = self.expand_utilities_quiet(&return_type);

        let unresolved: Vec<String> = raw
            .type_parameters
            .iter()
            .filter(|tp| is_unbound(&bindings, &tp.name))
            .filter(|tp| {
                contains_type_parameter_of(&return_type, Some(std::slice::from_ref(&tp.name)))
            })
            .map(|tp| tp.name.clone())
            .collect();

        let (per_arg_types, per_arg_modes) = per_argument(&params, argument_count);

        PipelineOutcome {
            per_arg_types,
            per_arg_modes,
            return_type,
            predicate,
            conflict,
            unresolved,
        }
    }

    /// Expand the expected return into unification candidates: the type
    /// itself, its union branches, its alias body, and one async unwrap.
    fn expected_return_candidates(&self, expected: &IrType) -> Vec<IrType> {
        let mut out = vec![expected.clone()];
        if let IrType::Union(u) = expected {
            out.extend(u.types.iter().cloned());
        }
        let resolver = self.resolver();
        if let Some((id, args)) = resolver.normalize_to_nominal(expected) {
            if let Some(entry) = self.env.catalog().get(id) {
                if let Some(aliased) = &entry.aliased_type {
                    let map = self.env.identity_map(id, &args);
                    out.push(substitute(aliased, &map));
                }
            }
        }
        if let IrType::Reference(r) = expected {
            if matches!(
                r.name.as_str(),
                "Promise" | "PromiseLike" | "Task" | "ValueTask"
            ) && r.type_arguments.len() == 1
            {
                out.push(r.type_arguments[0].clone());
            }
        }
        out
    }

    /// Score every catalog overload of `member_name` on `declaring` and
    /// return the best by the tie-break order.
    pub(crate) fn resolve_catalog_overloads(
        &mut self,
        declaring: TypeId,
        receiver: Option<&IrType>,
        member_name: &str,
        argument_count: usize,
        arg_types: Option<&[IrType]>,
        explicit_type_args: &[IrType],
        expected_return: Option<&IrType>,
    ) -> Option<CatalogBest> {
        let entry = self.env.catalog().get(declaring)?;
        let MemberEntry::Method { signatures } = entry.members.get(member_name)? else {
            return None;
        };
        let declaring_ts_name = entry.ts_name.clone();

        let mut best: Option<CatalogBest> = None;
        for signature in signatures {
            let rest: Vec<bool> = signature.parameters.iter().map(|p| p.is_rest).collect();
            let optional: Vec<bool> = signature
                .parameters
                .iter()
                .map(|p| p.is_optional)
                .collect();
            if !arity_compatible(signature.parameters.len(), &rest, &optional, argument_count) {
                continue;
            }

            let raw = raw_from_catalog(signature, &declaring_ts_name, member_name);
            let outcome = self.quietly(|authority| {
                authority.run_call_pipeline(
                    &raw,
                    receiver,
                    argument_count,
                    explicit_type_args,
                    arg_types,
                    expected_return,
                )
            });
            if outcome.conflict {
                continue;
            }
            let score = match arg_types {
                Some(args) => score_arguments(&self.resolver(), args, &outcome.per_arg_types),
                None => 0,
            };
            let rank = CandidateRank {
                score,
                type_param_count: signature.type_parameters.len(),
                param_count: signature.parameters.len(),
                stable_id: signature.stable_id.clone(),
            };
            if best.as_ref().is_none_or(|current| rank.beats(&current.rank)) {
                best = Some(CatalogBest { rank, outcome });
            }
        }
        best
    }

    /// Run `f` and drop any diagnostics it emitted: speculative resolution
    /// must not leak candidate noise into the buffer.
    pub(crate) fn quietly<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let mark = self.diagnostics.len();
        let result = f(self);
        self.diagnostics.truncate(mark);
        result
    }
}

fn is_self_placeholder(ty: &IrType, name: &str) -> bool {
    matches!(ty, IrType::TypeParameter(tp) if tp.name == name)
}

fn is_unbound(bindings: &SubstMap, name: &str) -> bool {
    match bindings.get(name) {
        None => true,
        Some(bound) => is_self_placeholder(bound, name),
    }
}

fn apply_substitution(
    params: &mut [RawParam],
    return_type: &mut IrType,
    this_type: &mut Option<IrType>,
    predicate: &mut Option<ResolvedPredicate>,
    map: &SubstMap,
) {
    if map.is_empty() {
        return;
    }
    for p in params.iter_mut() {
        p.ty = substitute(&p.ty, map);
    }
    *return_type = substitute(return_type, map);
    if let Some(this) = this_type {
        *this = substitute(this, map);
    }
    if let Some(pred) = predicate {
        pred.ty = substitute(&pred.ty, map);
    }
}

/// The parameter type and mode covering argument position `i`, looking
/// through a terminal rest parameter.
fn parameter_slot(params: &[RawParam], i: usize) -> (IrType, ParamMode) {
    if let Some(p) = params.get(i) {
        if !p.is_rest {
            return (p.ty.clone(), p.mode);
        }
    }
    if let Some(last) = params.last() {
        if last.is_rest && i + 1 >= params.len() {
            return (rest_element_type(&last.ty), last.mode);
        }
    }
    (IrType::Unknown, ParamMode::Value)
}

fn rest_element_type(ty: &IrType) -> IrType {
    match ty {
        IrType::Array(a) => (*a.element_type).clone(),
        IrType::Reference(r) if r.name == "Array" && r.type_arguments.len() == 1 => {
            r.type_arguments[0].clone()
        }
        _ => ty.clone(),
    }
}

/// The per-argument parameter vectors: always exactly `argument_count`
/// entries, empty arrays only for zero-argument calls.
fn per_argument(params: &[RawParam], argument_count: usize) -> (Vec<IrType>, Vec<ParamMode>) {
    let mut types = Vec::with_capacity(argument_count);
    let mut modes = Vec::with_capacity(argument_count);
    for i in 0..argument_count {
        let (ty, mode) = parameter_slot(params, i);
        types.push(ty);
        modes.push(mode);
    }
    (types, modes)
}

fn raw_from_catalog(
    signature: &MethodSignatureEntry,
    declaring_ts_name: &str,
    member_name: &str,
) -> RawSignature {
    RawSignature {
        parameters: signature
            .parameters
            .iter()
            .map(|p| RawParam {
                name: p.name.clone(),
                ty: if p.is_optional {
                    IrType::union(vec![p.ty.clone(), IrType::primitive("undefined")])
                } else {
                    p.ty.clone()
                },
                mode: p.mode,
                is_optional: p.is_optional,
                is_rest: p.is_rest,
            })
            .collect(),
        return_type: signature.return_type.clone(),
        this_type: None,
        type_parameters: signature
            .type_parameters
            .iter()
            .map(|tp| RawTypeParam {
                name: tp.name.clone(),
                default: tp.default.clone(),
            })
            .collect(),
        type_predicate: None,
        declaring_type_ts_name: Some(declaring_ts_name.to_string()),
        declaring_member_name: Some(member_name.to_string()),
        stable_id: signature.stable_id.clone(),
    }
}
