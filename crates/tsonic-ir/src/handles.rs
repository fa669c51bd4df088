//! Opaque handles crossing the Binding boundary.
//!
//! Every handle is a `u32` index into an arena owned by either the
//! `HandleRegistry` (decls, signatures, members, captured type syntax) or the
//! nominal catalog (`TypeId`). Handles are stable only within one compilation
//! context; caches keyed by them must never outlive it.

use serde::Serialize;

/// Identifies a bound declaration (variable, function, class, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct DeclId(pub u32);

/// Identifies a callable signature (function, method, constructor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SignatureId(pub u32);

/// Identifies a captured interface/class member declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MemberId(pub u32);

/// Identifies a captured type annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeSyntaxId(pub u32);

/// Canonical identity of a nominal type in the catalog.
///
/// Collapses surface name, arity, and assembly-qualified name into one
/// identity: `string` and `System.String` resolve to the same `TypeId`, as do
/// `IList<T>` and `IList_1<T>`. The catalog owns the entry's `stable_id`
/// string and optional CLR name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const NONE: TypeId = TypeId(u32::MAX);

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}
