//! Surface-name canonicalization.
//!
//! The alias table maps every spelling a program may use (`string`,
//! `System.String`, namespace-qualified forms, facade names with and without
//! the `_N` arity suffix) to the one `TypeId` that denotes the CLR type.

use rustc_hash::FxHashMap;
use tsonic_ir::TypeId;

/// Primitive surface name to builtin nominal facade name.
pub const BUILTIN_NOMINALS: &[(&str, &str)] = &[
    ("string", "String"),
    ("number", "Number"),
    ("boolean", "Boolean"),
    ("bigint", "BigInt"),
    ("symbol", "Symbol"),
];

/// Look up the builtin nominal facade for a primitive surface name.
pub fn builtin_nominal(primitive: &str) -> Option<&'static str> {
    BUILTIN_NOMINALS
        .iter()
        .find(|(name, _)| *name == primitive)
        .map(|(_, nominal)| *nominal)
}

#[derive(Debug, Default)]
pub struct AliasTable {
    map: FxHashMap<String, TypeId>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, id: TypeId) {
        self.map.insert(name.into(), id);
    }

    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.map.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
