//! Catalog construction.
//!
//! The assembly importer and the test fixtures both build catalogs through
//! this builder. It assigns stable IDs, keeps the alias table in sync, and
//! registers the `Name_N` facade spelling as soon as a type's arity is known.

use crate::alias::AliasTable;
use crate::catalog::{
    CatalogParam, CatalogProperty, InheritanceEdge, MemberEntry, MethodSignatureEntry,
    NominalCatalog, NominalEntry, NominalKind, NominalOrigin, TypeParamDecl,
};
use indexmap::IndexMap;
use tsonic_ir::{IrType, TypeId};

#[derive(Debug, Default)]
pub struct CatalogBuilder {
    catalog: NominalCatalog,
    aliases: AliasTable,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a nominal type. Assembly origin is implied by a CLR name;
    /// source origin otherwise.
    pub fn declare(&mut self, kind: NominalKind, ts_name: &str, clr_name: Option<&str>) -> TypeId {
        let origin = if clr_name.is_some() {
            NominalOrigin::Assembly
        } else {
            NominalOrigin::Source
        };
        let stable_id = match clr_name {
            Some(clr) => clr.to_string(),
            None => format!("source:{ts_name}"),
        };
        let id = self.catalog.push(NominalEntry {
            kind,
            ts_name: ts_name.to_string(),
            stable_id,
            clr_name: clr_name.map(str::to_string),
            type_parameters: Vec::new(),
            members: IndexMap::new(),
            inheritance: Vec::new(),
            origin,
            aliased_type: None,
        });
        self.aliases.insert(ts_name, id);
        if let Some(clr) = clr_name {
            self.aliases.insert(clr, id);
        }
        id
    }

    pub fn class(&mut self, ts_name: &str, clr_name: Option<&str>) -> TypeId {
        self.declare(NominalKind::Class, ts_name, clr_name)
    }

    pub fn interface(&mut self, ts_name: &str, clr_name: Option<&str>) -> TypeId {
        self.declare(NominalKind::Interface, ts_name, clr_name)
    }

    pub fn type_alias(&mut self, ts_name: &str, aliased: IrType) -> TypeId {
        let id = self.declare(NominalKind::TypeAlias, ts_name, None);
        if let Some(entry) = self.catalog.entry_mut(id) {
            entry.aliased_type = Some(aliased);
        }
        id
    }

    pub fn delegate(&mut self, ts_name: &str, clr_name: Option<&str>) -> TypeId {
        self.declare(NominalKind::Delegate, ts_name, clr_name)
    }

    /// Set the type parameters and register the `Name_N` facade alias.
    pub fn type_params(&mut self, id: TypeId, names: &[&str]) {
        let decls = names.iter().map(|n| TypeParamDecl::new(*n)).collect();
        self.type_param_decls(id, decls);
    }

    pub fn type_param_decls(&mut self, id: TypeId, decls: Vec<TypeParamDecl>) {
        let facade = self.catalog.get(id).map(|entry| {
            let arity = decls.len();
            (format!("{}_{arity}", entry.ts_name), arity)
        });
        if let Some(entry) = self.catalog.entry_mut(id) {
            entry.type_parameters = decls;
        }
        if let Some((facade_name, arity)) = facade {
            if arity > 0 {
                self.aliases.insert(facade_name, id);
            }
        }
    }

    pub fn extends(&mut self, id: TypeId, target: TypeId, arguments: Vec<IrType>) {
        if let Some(entry) = self.catalog.entry_mut(id) {
            entry.inheritance.push(InheritanceEdge { target, arguments });
        }
    }

    pub fn property(&mut self, id: TypeId, name: &str, ty: IrType) {
        self.property_full(id, name, ty, false, false);
    }

    pub fn readonly_property(&mut self, id: TypeId, name: &str, ty: IrType) {
        self.property_full(id, name, ty, false, true);
    }

    pub fn property_full(
        &mut self,
        id: TypeId,
        name: &str,
        ty: IrType,
        is_optional: bool,
        is_readonly: bool,
    ) {
        let stable_id = self
            .catalog
            .get(id)
            .map(|e| format!("{}.{name}", e.stable_id))
            .unwrap_or_default();
        if let Some(entry) = self.catalog.entry_mut(id) {
            entry.members.insert(
                name.to_string(),
                MemberEntry::Property(CatalogProperty {
                    ty,
                    is_optional,
                    is_readonly,
                    is_indexer: false,
                    stable_id,
                }),
            );
        }
    }

    /// Register an indexer. The key CLR type is recorded in the bracketed
    /// parameter list of the member's stable ID, which is where
    /// `get_indexer_info` recovers it from.
    pub fn indexer(&mut self, id: TypeId, key_clr_type: &str, value_type: IrType) {
        let stable_id = self
            .catalog
            .get(id)
            .map(|e| format!("{}.Item[{key_clr_type}]", e.stable_id))
            .unwrap_or_default();
        if let Some(entry) = self.catalog.entry_mut(id) {
            entry.members.insert(
                "Item".to_string(),
                MemberEntry::Property(CatalogProperty {
                    ty: value_type,
                    is_optional: false,
                    is_readonly: false,
                    is_indexer: true,
                    stable_id,
                }),
            );
        }
    }

    pub fn method(&mut self, id: TypeId, name: &str, parameters: Vec<CatalogParam>, ret: IrType) {
        self.generic_method(id, name, Vec::new(), parameters, ret);
    }

    pub fn generic_method(
        &mut self,
        id: TypeId,
        name: &str,
        type_parameters: Vec<TypeParamDecl>,
        parameters: Vec<CatalogParam>,
        return_type: IrType,
    ) {
        let Some(entry) = self.catalog.entry_mut(id) else {
            return;
        };
        let slot = entry
            .members
            .entry(name.to_string())
            .or_insert_with(|| MemberEntry::Method {
                signatures: Vec::new(),
            });
        if let MemberEntry::Method { signatures } = slot {
            let stable_id = format!("{}.{name}#{}", entry.stable_id, signatures.len());
            signatures.push(MethodSignatureEntry {
                parameters,
                return_type,
                type_parameters,
                stable_id,
            });
        }
    }

    /// Register an extra surface spelling for an existing type.
    pub fn alias_name(&mut self, name: &str, id: TypeId) {
        self.aliases.insert(name, id);
    }

    pub fn finish(self) -> (NominalCatalog, AliasTable) {
        (self.catalog, self.aliases)
    }
}
