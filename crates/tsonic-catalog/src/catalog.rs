//! The nominal catalog store.
//!
//! One entry per nominal type, keyed by `TypeId`. Entries are built once by
//! the importer (or a test fixture) and read concurrently afterwards; member
//! order is preserved because it is observable in diagnostics and overload
//! tie-breaking.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tsonic_ir::{IrType, ParamMode, TypeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NominalKind {
    Class,
    Interface,
    TypeAlias,
    Delegate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NominalOrigin {
    /// Imported from CLR assembly metadata.
    Assembly,
    /// Declared in the compiled source program.
    Source,
}

/// A declared type parameter with its optional constraint and default.
#[derive(Clone, Debug)]
pub struct TypeParamDecl {
    pub name: String,
    pub constraint: Option<IrType>,
    pub default: Option<IrType>,
}

impl TypeParamDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            default: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: IrType) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: IrType) -> Self {
        self.constraint = Some(constraint);
        self
    }
}

/// An inheritance edge from one entry to a base type.
///
/// `arguments` are expressed in terms of the source entry's type parameters.
#[derive(Clone, Debug)]
pub struct InheritanceEdge {
    pub target: TypeId,
    pub arguments: Vec<IrType>,
}

#[derive(Clone, Debug)]
pub struct CatalogProperty {
    pub ty: IrType,
    pub is_optional: bool,
    pub is_readonly: bool,
    /// Indexer properties carry a bracketed parameter list in their stable ID.
    pub is_indexer: bool,
    pub stable_id: String,
}

#[derive(Clone, Debug)]
pub struct CatalogParam {
    pub name: String,
    pub ty: IrType,
    pub mode: ParamMode,
    pub is_optional: bool,
    pub is_rest: bool,
}

impl CatalogParam {
    pub fn new(name: impl Into<String>, ty: IrType) -> Self {
        Self {
            name: name.into(),
            ty,
            mode: ParamMode::Value,
            is_optional: false,
            is_rest: false,
        }
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    #[must_use]
    pub fn rest(mut self) -> Self {
        self.is_rest = true;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ParamMode) -> Self {
        self.mode = mode;
        self
    }
}

/// One overload of a catalog method.
#[derive(Clone, Debug)]
pub struct MethodSignatureEntry {
    pub parameters: Vec<CatalogParam>,
    pub return_type: IrType,
    pub type_parameters: Vec<TypeParamDecl>,
    pub stable_id: String,
}

#[derive(Clone, Debug)]
pub enum MemberEntry {
    Property(CatalogProperty),
    Method { signatures: Vec<MethodSignatureEntry> },
}

/// One nominal type.
#[derive(Clone, Debug)]
pub struct NominalEntry {
    pub kind: NominalKind,
    /// TS surface name, without arity suffix (`IList`, `Console`).
    pub ts_name: String,
    /// Globally unique canonical key, stable across runs.
    pub stable_id: String,
    pub clr_name: Option<String>,
    pub type_parameters: Vec<TypeParamDecl>,
    pub members: IndexMap<String, MemberEntry>,
    pub inheritance: Vec<InheritanceEdge>,
    pub origin: NominalOrigin,
    /// For type aliases: the aliased body.
    pub aliased_type: Option<IrType>,
}

/// The catalog: an arena of entries plus name indexes.
///
/// Name indexes are arity-aware through naming convention: a generic facade
/// registers both `IList` and `IList_1`.
#[derive(Debug, Default)]
pub struct NominalCatalog {
    entries: Vec<NominalEntry>,
    by_ts_name: FxHashMap<String, TypeId>,
    by_clr_name: FxHashMap<String, TypeId>,
}

impl NominalCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: NominalEntry) -> TypeId {
        let id = TypeId(self.entries.len() as u32);
        self.by_ts_name.insert(entry.ts_name.clone(), id);
        if let Some(clr) = &entry.clr_name {
            self.by_clr_name.insert(clr.clone(), id);
        }
        self.entries.push(entry);
        id
    }

    pub(crate) fn entry_mut(&mut self, id: TypeId) -> Option<&mut NominalEntry> {
        self.entries.get_mut(id.0 as usize)
    }

    pub fn get(&self, id: TypeId) -> Option<&NominalEntry> {
        self.entries.get(id.0 as usize)
    }

    pub fn resolve_ts_name(&self, name: &str) -> Option<TypeId> {
        self.by_ts_name.get(name).copied()
    }

    pub fn resolve_clr_name(&self, name: &str) -> Option<TypeId> {
        self.by_clr_name.get(name).copied()
    }

    pub fn type_parameters(&self, id: TypeId) -> &[TypeParamDecl] {
        self.get(id).map_or(&[], |e| e.type_parameters.as_slice())
    }

    pub fn member(&self, id: TypeId, name: &str) -> Option<&MemberEntry> {
        self.get(id)?.members.get(name)
    }

    pub fn stable_id(&self, id: TypeId) -> Option<&str> {
        self.get(id).map(|e| e.stable_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
