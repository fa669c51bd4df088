//! Structural unification of parameter types against argument shapes.
//!
//! The unifier infers method type arguments by walking parameter/argument
//! pairs through inheritance chains, delegate Invoke signatures, and wrapper
//! types. It is intentionally conservative: a shape it cannot relate
//! contributes nothing; only contradictory bindings fail.

use crate::members::NominalResolver;
use crate::relations::types_equal;
use rustc_hash::FxHashSet;
use tsonic_ir::{IrMember, IrType, ReferenceType, SubstMap};

pub(crate) struct Unifier<'r, 'a> {
    resolver: &'r NominalResolver<'a>,
    method_params: &'r FxHashSet<String>,
    pub(crate) bindings: SubstMap,
}

impl<'r, 'a> Unifier<'r, 'a> {
    pub(crate) fn new(
        resolver: &'r NominalResolver<'a>,
        method_params: &'r FxHashSet<String>,
        seed: SubstMap,
    ) -> Self {
        Self {
            resolver,
            method_params,
            bindings: seed,
        }
    }

    /// Unify one parameter/argument pair. Returns `false` only on a
    /// contradictory binding.
    pub(crate) fn unify(&mut self, param: &IrType, arg: &IrType) -> bool {
        // Unknown and any argument shapes carry no information.
        if matches!(arg, IrType::Unknown | IrType::Any) {
            return true;
        }

        if let IrType::TypeParameter(tp) = param {
            if self.method_params.contains(&tp.name) {
                return self.bind(&tp.name, arg);
            }
            return true;
        }

        // Intersection arguments contribute constituent by constituent; a
        // constituent that contradicts is rolled back, not fatal. Extension
        // method receivers arrive here as `Receiver & Wrapper`.
        if let IrType::Intersection(i) = arg {
            for constituent in &i.types {
                let snapshot = self.bindings.clone();
                if !self.unify(param, constituent) {
                    self.bindings = snapshot;
                }
            }
            return true;
        }

        // Lambda-to-expression conversion: unify through the wrapper's
        // single type argument.
        if let IrType::Reference(pr) = param {
            if is_expression_wrapper(pr) {
                return self.unify(&pr.type_arguments[0], arg);
            }
        }

        // Array<T> on either side of T[].
        if let (IrType::Reference(pr), IrType::Array(aa)) = (param, arg) {
            if pr.name == "Array" && pr.type_arguments.len() == 1 {
                return self.unify(&pr.type_arguments[0], &aa.element_type);
            }
        }
        if let (IrType::Array(pa), IrType::Reference(ar)) = (param, arg) {
            if ar.name == "Array" && ar.type_arguments.len() == 1 {
                return self.unify(&pa.element_type, &ar.type_arguments[0]);
            }
        }

        // Delegates unify through their Invoke signature, in both
        // directions.
        if matches!(arg, IrType::Function(_)) && matches!(param, IrType::Reference(_)) {
            if let Some(invoke) = self.resolver.delegate_to_function_type(param) {
                return self.unify(&IrType::Function(invoke), arg);
            }
        }
        if matches!(param, IrType::Function(_)) && matches!(arg, IrType::Reference(_)) {
            if let Some(invoke) = self.resolver.delegate_to_function_type(arg) {
                return self.unify(param, &IrType::Function(invoke));
            }
        }

        // A union parameter with a single non-nullish constituent unifies
        // against that constituent for non-nullish arguments.
        if let IrType::Union(pu) = param {
            let non_nullish: Vec<&IrType> =
                pu.types.iter().filter(|t| !t.is_nullish()).collect();
            if non_nullish.len() == 1 {
                if !arg.is_nullish() {
                    return self.unify(non_nullish[0], arg);
                }
                return true;
            }
        }

        match (param, arg) {
            (IrType::Array(p), IrType::Array(a)) => self.unify(&p.element_type, &a.element_type),
            (IrType::Tuple(p), IrType::Tuple(a)) => {
                for (pe, ae) in p.element_types.iter().zip(a.element_types.iter()) {
                    if !self.unify(pe, ae) {
                        return false;
                    }
                }
                true
            }
            (IrType::Function(p), IrType::Function(a)) => {
                for (pp, ap) in p.parameters.iter().zip(a.parameters.iter()) {
                    if !self.unify(&pp.ty, &ap.ty) {
                        return false;
                    }
                }
                self.unify(&p.return_type, &a.return_type)
            }
            (IrType::Object(p), IrType::Object(a)) => {
                for pm in &p.members {
                    if let IrMember::Property(pp) = pm {
                        let matching = a.members.iter().find(|m| m.name() == pp.name);
                        if let Some(IrMember::Property(ap)) = matching {
                            if !self.unify(&pp.ty, &ap.ty) {
                                return false;
                            }
                        }
                    }
                }
                true
            }
            (IrType::Dictionary(p), IrType::Dictionary(a)) => {
                self.unify(&p.key_type, &a.key_type) && self.unify(&p.value_type, &a.value_type)
            }
            (IrType::Reference(pr), _) => self.unify_reference(pr, arg),
            _ => true,
        }
    }

    /// Reference parameters: direct generic unification on identity match,
    /// otherwise flow the argument up its inheritance chain to the
    /// parameter's nominal and unify the materialized arguments.
    fn unify_reference(&mut self, pr: &ReferenceType, arg: &IrType) -> bool {
        if let IrType::Reference(ar) = arg {
            let same_identity = match (pr.type_id, ar.type_id) {
                (Some(p), Some(a)) => p == a,
                _ => pr.name == ar.name,
            };
            if same_identity {
                for (pa, aa) in pr.type_arguments.iter().zip(ar.type_arguments.iter()) {
                    if !self.unify(pa, aa) {
                        return false;
                    }
                }
                return true;
            }
        }

        let param_ty = IrType::Reference(pr.clone());
        let Some((param_id, _)) = self.resolver.normalize_to_nominal(&param_ty) else {
            return true;
        };
        let Some((arg_id, arg_args)) = self.resolver.normalize_to_nominal(arg) else {
            return true;
        };
        let env = self.resolver.env();
        let Some(map) = env.get_instantiation(arg_id, &arg_args, param_id) else {
            return true;
        };
        let declared = env.catalog().type_parameters(param_id);
        for (decl_param, param_arg) in declared.iter().zip(pr.type_arguments.iter()) {
            if let Some(materialized) = map.get(&decl_param.name) {
                if !self.unify(param_arg, materialized) {
                    return false;
                }
            }
        }
        true
    }

    fn bind(&mut self, name: &str, arg: &IrType) -> bool {
        let existing = self.bindings.get(name).cloned();
        match existing {
            None => {
                self.bindings.insert(name.to_string(), arg.clone());
                true
            }
            Some(current) => {
                // A self-reference placeholder yields to real information.
                if matches!(&current, IrType::TypeParameter(tp) if tp.name == name) {
                    self.bindings.insert(name.to_string(), arg.clone());
                    return true;
                }
                if matches!(arg, IrType::TypeParameter(tp) if tp.name == name) {
                    return true;
                }
                types_equal(&current, arg)
            }
        }
    }
}

fn is_expression_wrapper(r: &ReferenceType) -> bool {
    if r.type_arguments.len() != 1 {
        return false;
    }
    if r.name == "Expression" || r.name == "Expression_1" {
        return true;
    }
    r.resolved_clr_type
        .as_deref()
        .is_some_and(|clr| clr.starts_with("System.Linq.Expressions.Expression"))
}
