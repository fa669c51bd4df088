//! The handle registry.
//!
//! Binding allocates records here while walking the source program and hands
//! the filled registry to the authority, which only ever reads it. A lookup
//! of a dead handle returns `None`; the authority treats that as a Binding
//! contract violation and poisons the query instead of panicking.

use crate::handles::{DeclId, MemberId, SignatureId, TypeSyntaxId};
use crate::syntax::{ExprSyntax, TypeSyntax};
use crate::types::ParamMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclKind {
    Variable,
    Function,
    Class,
    Interface,
    TypeAlias,
    Enum,
    Parameter,
    Property,
    Method,
}

/// A bound declaration.
#[derive(Clone, Debug)]
pub struct DeclRecord {
    pub kind: DeclKind,
    /// Captured explicit annotation, when one was written.
    pub type_syntax: Option<TypeSyntax>,
    /// Fully-qualified name for classes, interfaces, and aliases.
    pub fq_name: Option<String>,
    /// Captured initializer for variables.
    pub initializer: Option<ExprSyntax>,
    /// Member names declared directly on a class (not inherited).
    pub class_member_names: Vec<String>,
}

impl DeclRecord {
    pub fn new(kind: DeclKind) -> Self {
        Self {
            kind,
            type_syntax: None,
            fq_name: None,
            initializer: None,
            class_member_names: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_type(mut self, ts: TypeSyntax) -> Self {
        self.type_syntax = Some(ts);
        self
    }

    #[must_use]
    pub fn with_fq_name(mut self, name: impl Into<String>) -> Self {
        self.fq_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_initializer(mut self, init: ExprSyntax) -> Self {
        self.initializer = Some(init);
        self
    }

    #[must_use]
    pub fn with_class_members(mut self, names: Vec<String>) -> Self {
        self.class_member_names = names;
        self
    }
}

/// One parameter of a captured signature.
#[derive(Clone, Debug)]
pub struct SignatureParam {
    pub name: String,
    pub type_syntax: Option<TypeSyntax>,
    pub is_optional: bool,
    pub is_rest: bool,
    pub mode: ParamMode,
}

impl SignatureParam {
    pub fn new(name: impl Into<String>, type_syntax: TypeSyntax) -> Self {
        Self {
            name: name.into(),
            type_syntax: Some(type_syntax),
            is_optional: false,
            is_rest: false,
            mode: ParamMode::Value,
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

/// One type parameter of a captured signature.
#[derive(Clone, Debug)]
pub struct SignatureTypeParam {
    pub name: String,
    pub constraint: Option<TypeSyntax>,
    pub default: Option<TypeSyntax>,
}

impl SignatureTypeParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            default: None,
        }
    }

    #[must_use]
    pub fn with_constraint(mut self, c: TypeSyntax) -> Self {
        self.constraint = Some(c);
        self
    }

    #[must_use]
    pub fn with_default(mut self, d: TypeSyntax) -> Self {
        self.default = Some(d);
        self
    }
}

/// A captured `x is T` predicate on a signature return.
#[derive(Clone, Debug)]
pub struct TypePredicateRecord {
    /// Name of the tested parameter.
    pub parameter: String,
    /// The narrowed-to type.
    pub target: TypeSyntax,
}

/// A bound callable signature.
#[derive(Clone, Debug, Default)]
pub struct SignatureRecord {
    pub parameters: Vec<SignatureParam>,
    pub return_type_syntax: Option<TypeSyntax>,
    pub type_parameters: Vec<SignatureTypeParam>,
    pub this_type_syntax: Option<TypeSyntax>,
    /// TS surface name of the declaring type, for catalog correlation.
    pub declaring_type_ts_name: Option<String>,
    pub declaring_member_name: Option<String>,
    pub type_predicate: Option<TypePredicateRecord>,
    pub is_constructor: bool,
    /// For constructors: the instance type the `new` produces.
    pub constructed_type_syntax: Option<TypeSyntax>,
}

/// A bound interface/class member declaration.
#[derive(Clone, Debug)]
pub struct MemberRecord {
    pub name: String,
    pub type_syntax: Option<TypeSyntax>,
    pub is_optional: bool,
    pub is_readonly: bool,
}

/// Arena store behind the opaque handles.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    decls: Vec<DeclRecord>,
    signatures: Vec<SignatureRecord>,
    members: Vec<MemberRecord>,
    type_syntaxes: Vec<TypeSyntax>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_decl(&mut self, record: DeclRecord) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(record);
        id
    }

    pub fn alloc_signature(&mut self, record: SignatureRecord) -> SignatureId {
        let id = SignatureId(self.signatures.len() as u32);
        self.signatures.push(record);
        id
    }

    pub fn alloc_member(&mut self, record: MemberRecord) -> MemberId {
        let id = MemberId(self.members.len() as u32);
        self.members.push(record);
        id
    }

    pub fn alloc_type_syntax(&mut self, syntax: TypeSyntax) -> TypeSyntaxId {
        let id = TypeSyntaxId(self.type_syntaxes.len() as u32);
        self.type_syntaxes.push(syntax);
        id
    }

    pub fn decl(&self, id: DeclId) -> Option<&DeclRecord> {
        self.decls.get(id.0 as usize)
    }

    pub fn signature(&self, id: SignatureId) -> Option<&SignatureRecord> {
        self.signatures.get(id.0 as usize)
    }

    pub fn member(&self, id: MemberId) -> Option<&MemberRecord> {
        self.members.get(id.0 as usize)
    }

    pub fn type_syntax(&self, id: TypeSyntaxId) -> Option<&TypeSyntax> {
        self.type_syntaxes.get(id.0 as usize)
    }
}
