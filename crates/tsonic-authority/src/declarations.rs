//! Declaration typing and handle introspection.
//!
//! `type_of_decl` is annotation-first: captured syntax wins, classes and
//! interfaces type as references to themselves, and only variables with
//! initializers fall through to the bounded initializer inference. Anything
//! else without an annotation is a `MISSING-ANNOTATION`.

use crate::convert::convert_type_syntax;
use crate::state::TypeAuthority;
use rustc_hash::FxHashSet;
use tsonic_common::diagnostics::{DiagnosticCode, SourceLocation};
use tsonic_ir::{DeclId, DeclKind, IrType, SignatureId};

impl<'a> TypeAuthority<'a> {
    /// The declared (or deterministically inferred) type of a declaration.
    pub fn type_of_decl(&mut self, id: DeclId) -> IrType {
        self.type_of_decl_at(id, None)
    }

    pub fn type_of_decl_at(&mut self, id: DeclId, site: Option<&SourceLocation>) -> IrType {
        if let Some(cached) = self.decl_types.get(&id) {
            return cached.clone();
        }

        let Some(record) = self.registry.decl(id) else {
            self.binding_contract_violation("declaration", site);
            return IrType::Unknown;
        };

        let result = if let Some(annotation) = &record.type_syntax {
            let converted = convert_type_syntax(annotation, &FxHashSet::default());
            self.expand_pending_utilities(&converted)
        } else {
            match record.kind {
                DeclKind::Class | DeclKind::Interface | DeclKind::Enum => {
                    match &record.fq_name {
                        Some(fq) => {
                            let resolver = self.resolver();
                            match resolver.resolve_type_id_by_name(fq, None) {
                                Some(type_id) => {
                                    let params: Vec<IrType> = self
                                        .env
                                        .catalog()
                                        .type_parameters(type_id)
                                        .iter()
                                        .map(|tp| IrType::type_param(&tp.name))
                                        .collect();
                                    IrType::reference_to(type_id, fq.clone(), params)
                                }
                                None => IrType::reference(fq.clone(), Vec::new()),
                            }
                        }
                        None => {
                            self.diag(
                                DiagnosticCode::ResolutionFailed,
                                "declaration has no fully-qualified name",
                                site,
                            );
                            IrType::Unknown
                        }
                    }
                }
                DeclKind::Variable => match record.initializer.clone() {
                    Some(init) => match self.infer_initializer(&init) {
                        Some(inferred) => inferred,
                        None => {
                            self.missing_annotation(site);
                            IrType::Unknown
                        }
                    },
                    None => {
                        self.missing_annotation(site);
                        IrType::Unknown
                    }
                },
                _ => {
                    self.missing_annotation(site);
                    IrType::Unknown
                }
            }
        };

        self.decl_types.insert(id, result.clone());
        result
    }

    fn missing_annotation(&mut self, site: Option<&SourceLocation>) {
        self.diag(
            DiagnosticCode::MissingAnnotation,
            "declaration lacks an explicit type and cannot be inferred deterministically",
            site,
        );
    }

    // =========================================================================
    // Handle Introspection
    // =========================================================================

    /// Whether the declaration is a type alias.
    pub fn is_type_decl(&self, id: DeclId) -> bool {
        self.registry
            .decl(id)
            .is_some_and(|d| d.kind == DeclKind::TypeAlias)
    }

    pub fn is_interface_decl(&self, id: DeclId) -> bool {
        self.registry
            .decl(id)
            .is_some_and(|d| d.kind == DeclKind::Interface)
    }

    pub fn get_fq_name_of_decl(&self, id: DeclId) -> Option<String> {
        self.registry.decl(id).and_then(|d| d.fq_name.clone())
    }

    pub fn decl_has_type_annotation(&self, id: DeclId) -> bool {
        self.registry
            .decl(id)
            .is_some_and(|d| d.type_syntax.is_some())
    }

    /// Whether a class member name overrides a declaration somewhere up the
    /// class's inheritance chain.
    pub fn check_ts_class_member_override(&self, class_decl: DeclId, member_name: &str) -> bool {
        let Some(record) = self.registry.decl(class_decl) else {
            return false;
        };
        if record.kind != DeclKind::Class {
            return false;
        }
        // Only members the class itself declares can override.
        if !record.class_member_names.is_empty()
            && !record.class_member_names.iter().any(|m| m == member_name)
        {
            return false;
        }
        let Some(fq) = &record.fq_name else {
            return false;
        };
        let resolver = self.resolver();
        let Some(type_id) = resolver.resolve_type_id_by_name(fq, None) else {
            return false;
        };
        self.env
            .inheritance_chain(type_id)
            .iter()
            .skip(1)
            .any(|&ancestor| self.env.catalog().member(ancestor, member_name).is_some())
    }

    pub fn signature_has_conditional_return(&self, id: SignatureId) -> bool {
        self.registry.signature(id).is_some_and(|sig| {
            sig.return_type_syntax
                .as_ref()
                .is_some_and(|ts| ts.mentions_conditional())
        })
    }

    /// Whether a rest parameter's annotation mentions one of the signature's
    /// own type parameters.
    pub fn signature_has_variadic_type_params(&self, id: SignatureId) -> bool {
        self.registry.signature(id).is_some_and(|sig| {
            sig.parameters.iter().any(|p| {
                p.is_rest
                    && p.type_syntax.as_ref().is_some_and(|ts| {
                        sig.type_parameters.iter().any(|tp| ts.mentions_name(&tp.name))
                    })
            })
        })
    }

    pub fn has_type_parameters(&self, id: SignatureId) -> bool {
        self.registry
            .signature(id)
            .is_some_and(|sig| !sig.type_parameters.is_empty())
    }
}
