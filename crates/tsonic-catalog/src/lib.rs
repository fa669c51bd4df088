//! Prebuilt nominal type catalog for the tsonic transpiler.
//!
//! This crate provides:
//! - `NominalCatalog` - the arena store of nominal types keyed by `TypeId`
//! - `CatalogBuilder` - fluent construction used by the assembly importer
//!   and by tests
//! - `AliasTable` and `BUILTIN_NOMINALS` - surface-name canonicalization
//! - `NominalEnv` - derived queries: flattened inheritance chains,
//!   instantiation maps, member-declaring-type lookup, delegate signatures

pub mod catalog;
pub use catalog::{
    CatalogParam, CatalogProperty, InheritanceEdge, MemberEntry, MethodSignatureEntry,
    NominalCatalog, NominalEntry, NominalKind, NominalOrigin, TypeParamDecl,
};

pub mod alias;
pub use alias::{AliasTable, BUILTIN_NOMINALS, builtin_nominal};

pub mod builder;
pub use builder::CatalogBuilder;

pub mod env;
pub use env::{InheritanceChain, NominalEnv};
