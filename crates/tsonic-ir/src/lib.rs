//! IR type model and handle plumbing for the tsonic transpiler.
//!
//! This crate provides:
//! - `IrType` - the closed sum of semantic types the pipeline computes with
//! - Opaque handles (`DeclId`, `SignatureId`, `MemberId`, `TypeSyntaxId`,
//!   `TypeId`) crossing the Binding boundary
//! - Captured syntax trees (`TypeSyntax`, `ExprSyntax`) produced by Binding
//! - `HandleRegistry` - the arena store behind the handles
//! - Pure type-parameter substitution over IR values
//! - Canonical serialization of IR values for cache keys

pub mod handles;
pub use handles::{DeclId, MemberId, SignatureId, TypeId, TypeSyntaxId};

pub mod types;
pub use types::{
    ArrayOrigin, ArrayType, DictionaryType, FunctionType, IntersectionType, IrMember, IrParameter,
    IrType, LiteralType, LiteralValue, MethodSignature, ObjectType, ParamMode, PrimitiveType,
    PropertySignature, ReferenceType, TupleType, TypeParameterType, UnionType,
};

pub mod syntax;
pub use syntax::{
    BinaryOp, ExprSyntax, LambdaBodySyntax, LambdaParamSyntax, LambdaSyntax, MemberSyntax,
    ParamSyntax, PrefixOp, TypeSyntax,
};

pub mod registry;
pub use registry::{
    DeclKind, DeclRecord, HandleRegistry, MemberRecord, SignatureParam, SignatureRecord,
    SignatureTypeParam, TypePredicateRecord,
};

pub mod subst;
pub use subst::{SubstMap, compose, substitute};

pub mod serialize;
pub use serialize::serialize_type_args;
