//! The deterministic type authority for the tsonic transpiler.
//!
//! One `TypeAuthority` instance answers every type query the rest of the
//! compiler needs - declaration types, member access, generic instantiation,
//! call resolution, utility-type expansion, assignability, structural
//! equality - without consulting a host type checker. All answers derive
//! from three sources: captured annotations, structural inspection of
//! captured expressions, and the prebuilt nominal catalog.
//!
//! Every query is total: failures emit a structured diagnostic into the
//! instance buffer and return a poison value (`IrType::Unknown` or a
//! poisoned `ResolvedCall`). Nothing here panics across the API boundary
//! and nothing retries.

mod state;
pub use state::{MemberRef, TypeAuthority, never_type, unknown_type, void_type};
pub use tsonic_catalog::{BUILTIN_NOMINALS, builtin_nominal};

mod convert;
mod display;
pub use display::display_type;

mod relations;

mod members;
pub use members::IndexerInfo;

mod declarations;

mod unify;

mod overloads;

mod calls;
pub use calls::{CallQuery, ResolvedCall, ResolvedPredicate};

mod expr;

mod utilities;
pub use utilities::UtilityName;
