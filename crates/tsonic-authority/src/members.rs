//! Member access and nominal bridging.
//!
//! This module contains name-to-identity resolution, the nominal
//! normalization that bridges primitives and arrays onto catalog entries,
//! and the member/indexer lookup walking the inheritance chain with
//! substitution.

use crate::display::display_type;
use crate::state::{MemberRef, TypeAuthority};
use tracing::trace;
use tsonic_catalog::{
    AliasTable, MemberEntry, MethodSignatureEntry, NominalEnv, NominalKind, builtin_nominal,
};
use tsonic_common::diagnostics::{DiagnosticCode, SourceLocation};
use tsonic_ir::{
    FunctionType, IrMember, IrParameter, IrType, ReferenceType, SubstMap, TypeId,
    serialize_type_args, substitute,
};

/// Result of an indexer probe on a receiver.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexerInfo {
    /// CLR type of the key, recovered from the indexer's stable ID.
    pub key_clr_type: String,
    pub value_type: IrType,
}

/// Pure name/identity resolution over the catalog and alias table.
///
/// Carries no caches and emits no diagnostics; the facade wraps it.
#[derive(Clone, Copy)]
pub(crate) struct NominalResolver<'a> {
    env: NominalEnv<'a>,
    aliases: &'a AliasTable,
}

impl<'a> NominalResolver<'a> {
    pub(crate) fn new(env: NominalEnv<'a>, aliases: &'a AliasTable) -> Self {
        Self { env, aliases }
    }

    pub(crate) fn env(&self) -> NominalEnv<'a> {
        self.env
    }

    /// Resolve a surface name to its canonical `TypeId`.
    ///
    /// Tries the alias table, then the catalog by TS name, then by CLR name.
    /// When `arity` is supplied and the direct match's arity differs, retries
    /// with the `name_N` facade spelling.
    pub(crate) fn resolve_type_id_by_name(&self, name: &str, arity: Option<usize>) -> Option<TypeId> {
        let catalog = self.env.catalog();
        let lookup = |n: &str| {
            self.aliases
                .get(n)
                .or_else(|| catalog.resolve_ts_name(n))
                .or_else(|| catalog.resolve_clr_name(n))
        };
        let direct = lookup(name);
        if let Some(id) = direct {
            if let Some(n) = arity {
                if n > 0 && catalog.type_parameters(id).len() != n {
                    if let Some(retried) = lookup(&format!("{name}_{n}")) {
                        return Some(retried);
                    }
                }
            }
            return Some(id);
        }
        if let Some(n) = arity {
            if n > 0 {
                return lookup(&format!("{name}_{n}"));
            }
        }
        None
    }

    /// Bridge an IR type to nominal form: the canonical `TypeId` plus the
    /// type arguments it is instantiated with.
    pub(crate) fn normalize_to_nominal(&self, ty: &IrType) -> Option<(TypeId, Vec<IrType>)> {
        match ty {
            IrType::Reference(r) => {
                if let Some(id) = r.type_id {
                    return Some((id, r.type_arguments.clone()));
                }
                let arity = Some(r.type_arguments.len());
                let id = match &r.resolved_clr_type {
                    Some(clr) => self
                        .resolve_type_id_by_name(clr, arity)
                        .or_else(|| self.resolve_type_id_by_name(&r.name, arity)),
                    None => self.resolve_type_id_by_name(&r.name, arity),
                }?;
                Some((id, r.type_arguments.clone()))
            }
            IrType::Primitive(p) => {
                let id = self.resolve_primitive(&p.name)?;
                Some((id, Vec::new()))
            }
            IrType::Array(a) => {
                let id = self.resolve_type_id_by_name("Array", Some(1))?;
                Some((id, vec![(*a.element_type).clone()]))
            }
            _ => None,
        }
    }

    fn resolve_primitive(&self, name: &str) -> Option<TypeId> {
        if let Some(id) = self.resolve_type_id_by_name(name, None) {
            return Some(id);
        }
        if let Some(nominal) = builtin_nominal(name) {
            if let Some(id) = self.resolve_type_id_by_name(nominal, None) {
                return Some(id);
            }
        }
        clr_name_of_primitive(name).and_then(|clr| self.resolve_type_id_by_name(clr, None))
    }

    /// Collapse `T | null | undefined` to `T` when exactly one non-nullish
    /// constituent remains.
    pub(crate) fn strip_nullish(&self, ty: &IrType) -> IrType {
        if let IrType::Union(u) = ty {
            let non_nullish: Vec<&IrType> = u.types.iter().filter(|t| !t.is_nullish()).collect();
            if non_nullish.len() == 1 {
                return non_nullish[0].clone();
            }
        }
        ty.clone()
    }

    /// Erase TS-only `__TsonicExt_*` wrappers to their underlying CLR shape.
    pub(crate) fn strip_extension_wrappers(&self, ty: &IrType) -> IrType {
        let mut current = ty.clone();
        while let Some(next) = self.unwrap_extension(&current) {
            current = next;
        }
        current
    }

    fn unwrap_extension(&self, ty: &IrType) -> Option<IrType> {
        let r = ty.as_reference()?;
        if !r.name.starts_with("__TsonicExt_") {
            return None;
        }
        if let Some((id, args)) = self.normalize_to_nominal(ty) {
            if let Some(entry) = self.env.catalog().get(id) {
                if let Some(aliased) = &entry.aliased_type {
                    let map = self.env.identity_map(id, &args);
                    return Some(substitute(aliased, &map));
                }
            }
        }
        if r.type_arguments.len() == 1 {
            return Some(r.type_arguments[0].clone());
        }
        None
    }

    /// Convert a delegate type to its Invoke function type.
    pub(crate) fn delegate_to_function_type(&self, ty: &IrType) -> Option<FunctionType> {
        if let IrType::Function(f) = ty {
            return Some(f.clone());
        }
        let (id, args) = self.normalize_to_nominal(ty)?;
        let signature = self.env.invoke_signature(id)?;
        let map = self.env.identity_map(id, &args);
        Some(self.catalog_function_type(signature, &map))
    }

    /// Synthesize a `functionType` from a catalog method signature under a
    /// substitution.
    pub(crate) fn catalog_function_type(
        &self,
        signature: &MethodSignatureEntry,
        map: &SubstMap,
    ) -> FunctionType {
        FunctionType {
            parameters: signature
                .parameters
                .iter()
                .map(|p| IrParameter {
                    name: Some(p.name.clone()),
                    ty: substitute(&p.ty, map),
                    is_optional: p.is_optional,
                    is_rest: p.is_rest,
                })
                .collect(),
            return_type: Box::new(substitute(&signature.return_type, map)),
        }
    }

    /// Structural members of a reference, either inline or recovered from a
    /// source-origin interface/alias entry.
    pub(crate) fn reference_structural_members(&self, r: &ReferenceType) -> Option<Vec<IrMember>> {
        if let Some(members) = &r.structural_members {
            return Some(members.clone());
        }
        let (id, args) = self.normalize_to_nominal(&IrType::Reference(r.clone()))?;
        let entry = self.env.catalog().get(id)?;
        match entry.kind {
            NominalKind::Interface | NominalKind::TypeAlias => {}
            NominalKind::Class | NominalKind::Delegate => return None,
        }
        if let Some(aliased) = &entry.aliased_type {
            let map = self.env.identity_map(id, &args);
            return match substitute(aliased, &map) {
                IrType::Object(o) => Some(o.members),
                _ => None,
            };
        }
        let map = self.env.identity_map(id, &args);
        let mut members = Vec::with_capacity(entry.members.len());
        for (name, member) in &entry.members {
            match member {
                MemberEntry::Property(p) => {
                    members.push(IrMember::Property(tsonic_ir::PropertySignature {
                        name: name.clone(),
                        ty: substitute(&p.ty, &map),
                        is_optional: p.is_optional,
                        is_readonly: p.is_readonly,
                    }));
                }
                MemberEntry::Method { signatures } => {
                    if let Some(first) = signatures.first() {
                        let f = self.catalog_function_type(first, &map);
                        members.push(IrMember::Method(tsonic_ir::MethodSignature {
                            name: name.clone(),
                            parameters: f.parameters,
                            return_type: *f.return_type,
                            type_parameters: first
                                .type_parameters
                                .iter()
                                .map(|tp| tp.name.clone())
                                .collect(),
                        }));
                    }
                }
            }
        }
        Some(members)
    }

    /// Look a member up in a structural member list.
    pub(crate) fn structural_member_type(
        &self,
        members: &[IrMember],
        name: &str,
    ) -> Option<IrType> {
        members.iter().find(|m| m.name() == name).map(|m| match m {
            IrMember::Property(p) => {
                if p.is_optional {
                    IrType::union(vec![p.ty.clone(), IrType::primitive("undefined")])
                } else {
                    p.ty.clone()
                }
            }
            IrMember::Method(method) => {
                IrType::function(method.parameters.clone(), method.return_type.clone())
            }
        })
    }
}

/// CLR names of the primitive surface, used for indexer keys and bridging.
pub(crate) fn clr_name_of_primitive(name: &str) -> Option<&'static str> {
    Some(match name {
        "string" => "System.String",
        "number" | "double" => "System.Double",
        "boolean" => "System.Boolean",
        "int" => "System.Int32",
        "uint" => "System.UInt32",
        "long" => "System.Int64",
        "ulong" => "System.UInt64",
        "short" => "System.Int16",
        "ushort" => "System.UInt16",
        "byte" => "System.Byte",
        "sbyte" => "System.SByte",
        "float" => "System.Single",
        "char" => "System.Char",
        "decimal" => "System.Decimal",
        "bigint" => "System.Numerics.BigInteger",
        _ => return None,
    })
}

// =============================================================================
// Member Access Methods
// =============================================================================

impl<'a> TypeAuthority<'a> {
    pub fn resolve_type_id_by_name(&self, name: &str, arity: Option<usize>) -> Option<TypeId> {
        self.resolver().resolve_type_id_by_name(name, arity)
    }

    pub fn normalize_to_nominal(&self, ty: &IrType) -> Option<(TypeId, Vec<IrType>)> {
        self.resolver().normalize_to_nominal(ty)
    }

    pub fn delegate_to_function_type(&self, ty: &IrType) -> Option<FunctionType> {
        self.resolver().delegate_to_function_type(ty)
    }

    /// The type of `receiver.member`.
    pub fn type_of_member(
        &mut self,
        receiver: &IrType,
        member: &MemberRef,
        site: Option<&SourceLocation>,
    ) -> IrType {
        let name = match member {
            MemberRef::Name(n) => n.clone(),
            MemberRef::Handle(id) => match self.registry.member(*id) {
                Some(record) => record.name.clone(),
                None => {
                    self.binding_contract_violation("member", site);
                    return IrType::Unknown;
                }
            },
        };

        // Poison propagates without piling on diagnostics.
        if matches!(receiver, IrType::Unknown | IrType::Any) {
            return IrType::Unknown;
        }

        let resolver = self.resolver();
        let receiver = resolver.strip_nullish(&resolver.strip_extension_wrappers(receiver));

        // Inline structural shapes resolve without the catalog.
        match &receiver {
            IrType::Object(o) => {
                if let Some(found) = resolver.structural_member_type(&o.members, &name) {
                    return found;
                }
                return self.member_not_found(&receiver, &name, site);
            }
            IrType::Reference(r) if r.structural_members.is_some() => {
                let members = r.structural_members.as_deref().unwrap_or(&[]);
                if let Some(found) = resolver.structural_member_type(members, &name) {
                    return found;
                }
                return self.member_not_found(&receiver, &name, site);
            }
            // Literals bridge through their primitive before nominal lookup.
            IrType::Literal(l) => {
                let primitive = match &l.value {
                    tsonic_ir::LiteralValue::String(_) => IrType::primitive("string"),
                    tsonic_ir::LiteralValue::Number(_) => IrType::primitive("number"),
                };
                return self.type_of_member(&primitive, &MemberRef::Name(name), site);
            }
            _ => {}
        }

        let Some((type_id, type_args)) = resolver.normalize_to_nominal(&receiver) else {
            return self.member_not_found(&receiver, &name, site);
        };

        let stable_id = self
            .env
            .catalog()
            .stable_id(type_id)
            .unwrap_or_default()
            .to_string();
        let cache_key = (stable_id, name.clone(), serialize_type_args(&type_args));
        if let Some(cached) = self.member_types.get(&cache_key) {
            return cached.clone();
        }

        let Some((declaring, map)) = self
            .env
            .find_member_declaring_type(type_id, &type_args, &name)
        else {
            return self.member_not_found(&receiver, &name, site);
        };

        let resolver = self.resolver();
        let result = match self.env.catalog().member(declaring, &name) {
            Some(MemberEntry::Property(p)) => {
                let value = substitute(&p.ty, &map);
                if p.is_optional {
                    IrType::union(vec![value, IrType::primitive("undefined")])
                } else {
                    value
                }
            }
            Some(MemberEntry::Method { signatures }) => match signatures.first() {
                Some(first) => IrType::Function(resolver.catalog_function_type(first, &map)),
                None => return self.member_not_found(&receiver, &name, site),
            },
            None => return self.member_not_found(&receiver, &name, site),
        };

        trace!(member = %name, receiver = %display_type(&receiver), "type_of_member");
        self.member_types.insert(cache_key, result.clone());
        result
    }

    fn member_not_found(
        &mut self,
        receiver: &IrType,
        name: &str,
        site: Option<&SourceLocation>,
    ) -> IrType {
        self.diag(
            DiagnosticCode::MemberNotFound,
            format!(
                "property '{name}' does not exist on type '{}'",
                display_type(receiver)
            ),
            site,
        );
        IrType::Unknown
    }

    /// Probe a receiver for its indexer: the key's CLR type plus the value
    /// type under the receiver's instantiation.
    pub fn get_indexer_info(
        &mut self,
        receiver: &IrType,
        _site: Option<&SourceLocation>,
    ) -> Option<IndexerInfo> {
        let resolver = self.resolver();
        let receiver = resolver.strip_nullish(&resolver.strip_extension_wrappers(receiver));

        if let IrType::Dictionary(d) = &receiver {
            let key_clr_type = d
                .key_type
                .primitive_name()
                .and_then(clr_name_of_primitive)
                .map_or_else(|| display_type(&d.key_type), str::to_string);
            return Some(IndexerInfo {
                key_clr_type,
                value_type: (*d.value_type).clone(),
            });
        }

        let (type_id, type_args) = resolver.normalize_to_nominal(&receiver)?;
        for candidate in self.env.inheritance_chain(type_id) {
            let entry = self.env.catalog().get(candidate)?;
            let indexers: Vec<_> = entry
                .members
                .values()
                .filter_map(|m| match m {
                    MemberEntry::Property(p) if p.is_indexer => Some(p),
                    _ => None,
                })
                .collect();
            if indexers.len() != 1 {
                continue;
            }
            let indexer = indexers[0];
            let key_clr_type = parse_indexer_key(&indexer.stable_id)?;
            let map = self.env.get_instantiation(type_id, &type_args, candidate)?;
            return Some(IndexerInfo {
                key_clr_type,
                value_type: substitute(&indexer.ty, &map),
            });
        }
        None
    }
}

/// Recover the key CLR type from an indexer's stable ID: the first entry of
/// its bracketed parameter list, split on top-level commas.
pub(crate) fn parse_indexer_key(stable_id: &str) -> Option<String> {
    let open = stable_id.find('[')?;
    let close = stable_id.rfind(']')?;
    if close <= open {
        return None;
    }
    let list = &stable_id[open + 1..close];
    let mut depth = 0usize;
    let mut first = String::new();
    for c in list.chars() {
        match c {
            '[' | '<' => {
                depth += 1;
                first.push(c);
            }
            ']' | '>' => {
                depth = depth.saturating_sub(1);
                first.push(c);
            }
            ',' if depth == 0 => break,
            _ => first.push(c),
        }
    }
    let trimmed = first.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
