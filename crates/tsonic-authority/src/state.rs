//! Authority state.
//!
//! Holds the read-only views over Binding and catalog data plus the
//! instance-local caches and the diagnostic buffer. One instance serves one
//! compilation; caches must never be shared across compilations because
//! handle IDs are only stable within one program graph.

use crate::members::NominalResolver;
use rustc_hash::FxHashMap;
use tsonic_catalog::{AliasTable, NominalCatalog, NominalEnv};
use tsonic_common::diagnostics::{Diagnostic, DiagnosticCode, SourceLocation};
use tsonic_ir::{
    DeclId, HandleRegistry, IrType, MemberId, ReferenceType, SignatureId, SubstMap, TypeSyntaxId,
    substitute,
};

use crate::calls::RawSignature;

/// The poison value for undeterminable queries.
pub fn unknown_type() -> IrType {
    IrType::Unknown
}

pub fn never_type() -> IrType {
    IrType::Never
}

pub fn void_type() -> IrType {
    IrType::Void
}

/// Names a member on a receiver: either directly by name or through a bound
/// member handle.
#[derive(Clone, Debug)]
pub enum MemberRef {
    Name(String),
    Handle(MemberId),
}

impl MemberRef {
    pub fn by_name(name: impl Into<String>) -> Self {
        MemberRef::Name(name.into())
    }
}

/// The semantic interface of the transpiler's type system.
pub struct TypeAuthority<'a> {
    pub(crate) registry: &'a HandleRegistry,
    pub(crate) env: NominalEnv<'a>,
    pub(crate) aliases: &'a AliasTable,

    pub(crate) decl_types: FxHashMap<DeclId, IrType>,
    /// Keyed by `(stable_id, member name, serialized type args)`.
    pub(crate) member_types: FxHashMap<(String, String, String), IrType>,
    pub(crate) raw_signatures: FxHashMap<SignatureId, RawSignature>,

    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'a> TypeAuthority<'a> {
    pub fn new(
        registry: &'a HandleRegistry,
        catalog: &'a NominalCatalog,
        aliases: &'a AliasTable,
    ) -> Self {
        Self {
            registry,
            env: NominalEnv::new(catalog),
            aliases,
            decl_types: FxHashMap::default(),
            member_types: FxHashMap::default(),
            raw_signatures: FxHashMap::default(),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn resolver(&self) -> NominalResolver<'a> {
        NominalResolver::new(self.env, self.aliases)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn clear_diagnostics(&mut self) {
        self.diagnostics.clear();
    }

    pub(crate) fn diag(
        &mut self,
        code: DiagnosticCode,
        message: impl Into<String>,
        site: Option<&SourceLocation>,
    ) {
        self.diagnostics
            .push(Diagnostic::error(code, message).with_location_opt(site));
    }

    /// A handle that Binding issued but the registry no longer resolves.
    pub(crate) fn binding_contract_violation(
        &mut self,
        what: &str,
        site: Option<&SourceLocation>,
    ) {
        self.diag(
            DiagnosticCode::ResolutionFailed,
            format!("Binding contract violation: dead {what} handle"),
            site,
        );
    }

    // =========================================================================
    // Syntax conversion and substitution
    // =========================================================================

    /// Convert a captured annotation to its IR type.
    pub fn type_from_syntax(&mut self, id: TypeSyntaxId) -> IrType {
        let Some(syntax) = self.registry.type_syntax(id) else {
            self.binding_contract_violation("type syntax", None);
            return IrType::Unknown;
        };
        let converted = crate::convert::convert_type_syntax(syntax, &Default::default());
        self.expand_pending_utilities(&converted)
    }

    /// Pure type-parameter substitution; delegates to the IR engine.
    pub fn substitute(&self, ty: &IrType, map: &SubstMap) -> IrType {
        substitute(ty, map)
    }

    /// Build a `referenceType` for a named nominal with the supplied
    /// arguments. Never expands the body.
    pub fn instantiate(&mut self, type_name: &str, type_arguments: Vec<IrType>) -> IrType {
        let resolver = self.resolver();
        match resolver.resolve_type_id_by_name(type_name, Some(type_arguments.len())) {
            Some(id) => {
                let entry = self.env.catalog().get(id);
                IrType::Reference(ReferenceType {
                    name: entry.map_or_else(|| type_name.to_string(), |e| e.ts_name.clone()),
                    type_arguments,
                    type_id: Some(id),
                    structural_members: None,
                    resolved_clr_type: entry.and_then(|e| e.clr_name.clone()),
                })
            }
            None => {
                self.diag(
                    DiagnosticCode::ResolutionFailed,
                    format!("unknown nominal type '{type_name}'"),
                    None,
                );
                IrType::Unknown
            }
        }
    }
}
