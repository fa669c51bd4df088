//! Captured syntax trees.
//!
//! Binding desugars host-language AST into these owned, language-neutral
//! trees before handing over a handle. The authority inspects them
//! structurally; no host AST type ever crosses its boundary.

use crate::handles::{DeclId, SignatureId};

/// A captured type annotation.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeSyntax {
    /// A (possibly generic) name: `string`, `Array<int>`, `Map<string, T>`.
    Named {
        name: String,
        arguments: Vec<TypeSyntax>,
    },
    /// `T[]`
    ArrayOf(Box<TypeSyntax>),
    /// `[A, B, C]`
    Tuple(Vec<TypeSyntax>),
    /// `(a: A, b?: B) => R`
    Function {
        parameters: Vec<ParamSyntax>,
        return_type: Box<TypeSyntax>,
    },
    Union(Vec<TypeSyntax>),
    Intersection(Vec<TypeSyntax>),
    /// `{ a: string; f(x: int): boolean }`
    ObjectLiteral(Vec<MemberSyntax>),
    /// `{ [key: K]: V }`
    Dictionary {
        key: Box<TypeSyntax>,
        value: Box<TypeSyntax>,
    },
    /// `T extends U ? A : B` - captured for introspection only; the
    /// deterministic converter does not evaluate it.
    Conditional {
        check: Box<TypeSyntax>,
        extends: Box<TypeSyntax>,
        true_type: Box<TypeSyntax>,
        false_type: Box<TypeSyntax>,
    },
    StringLiteral(String),
    NumberLiteral(f64),
}

impl TypeSyntax {
    pub fn named(name: impl Into<String>) -> TypeSyntax {
        TypeSyntax::Named {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, arguments: Vec<TypeSyntax>) -> TypeSyntax {
        TypeSyntax::Named {
            name: name.into(),
            arguments,
        }
    }

    /// Whether any node in this tree is a `Conditional`.
    pub fn mentions_conditional(&self) -> bool {
        match self {
            TypeSyntax::Conditional { .. } => true,
            TypeSyntax::Named { arguments, .. } => {
                arguments.iter().any(TypeSyntax::mentions_conditional)
            }
            TypeSyntax::ArrayOf(inner) => inner.mentions_conditional(),
            TypeSyntax::Tuple(elements) => elements.iter().any(TypeSyntax::mentions_conditional),
            TypeSyntax::Function {
                parameters,
                return_type,
            } => {
                return_type.mentions_conditional()
                    || parameters
                        .iter()
                        .any(|p| p.ty.as_ref().is_some_and(TypeSyntax::mentions_conditional))
            }
            TypeSyntax::Union(types) | TypeSyntax::Intersection(types) => {
                types.iter().any(TypeSyntax::mentions_conditional)
            }
            TypeSyntax::ObjectLiteral(members) => members.iter().any(|m| match m {
                MemberSyntax::Property { ty, .. } => ty.mentions_conditional(),
                MemberSyntax::Method {
                    parameters,
                    return_type,
                    ..
                } => {
                    return_type.mentions_conditional()
                        || parameters
                            .iter()
                            .any(|p| p.ty.as_ref().is_some_and(TypeSyntax::mentions_conditional))
                }
            }),
            TypeSyntax::Dictionary { key, value } => {
                key.mentions_conditional() || value.mentions_conditional()
            }
            TypeSyntax::StringLiteral(_) | TypeSyntax::NumberLiteral(_) => false,
        }
    }

    /// Whether any named node in this tree matches `name`.
    pub fn mentions_name(&self, name: &str) -> bool {
        match self {
            TypeSyntax::Named {
                name: own,
                arguments,
            } => own == name || arguments.iter().any(|a| a.mentions_name(name)),
            TypeSyntax::ArrayOf(inner) => inner.mentions_name(name),
            TypeSyntax::Tuple(elements) => elements.iter().any(|e| e.mentions_name(name)),
            TypeSyntax::Function {
                parameters,
                return_type,
            } => {
                return_type.mentions_name(name)
                    || parameters
                        .iter()
                        .any(|p| p.ty.as_ref().is_some_and(|t| t.mentions_name(name)))
            }
            TypeSyntax::Union(types) | TypeSyntax::Intersection(types) => {
                types.iter().any(|t| t.mentions_name(name))
            }
            TypeSyntax::ObjectLiteral(members) => members.iter().any(|m| match m {
                MemberSyntax::Property { ty, .. } => ty.mentions_name(name),
                MemberSyntax::Method {
                    parameters,
                    return_type,
                    ..
                } => {
                    return_type.mentions_name(name)
                        || parameters
                            .iter()
                            .any(|p| p.ty.as_ref().is_some_and(|t| t.mentions_name(name)))
                }
            }),
            TypeSyntax::Conditional {
                check,
                extends,
                true_type,
                false_type,
            } => {
                check.mentions_name(name)
                    || extends.mentions_name(name)
                    || true_type.mentions_name(name)
                    || false_type.mentions_name(name)
            }
            TypeSyntax::Dictionary { key, value } => {
                key.mentions_name(name) || value.mentions_name(name)
            }
            TypeSyntax::StringLiteral(_) | TypeSyntax::NumberLiteral(_) => false,
        }
    }
}

/// A parameter inside a captured function type or member method.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSyntax {
    pub name: String,
    pub ty: Option<TypeSyntax>,
    pub is_optional: bool,
    pub is_rest: bool,
}

impl ParamSyntax {
    pub fn typed(name: impl Into<String>, ty: TypeSyntax) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            is_optional: false,
            is_rest: false,
        }
    }
}

/// A member inside a captured object-literal type.
#[derive(Clone, Debug, PartialEq)]
pub enum MemberSyntax {
    Property {
        name: String,
        ty: TypeSyntax,
        is_optional: bool,
        is_readonly: bool,
    },
    Method {
        name: String,
        parameters: Vec<ParamSyntax>,
        return_type: TypeSyntax,
        type_parameters: Vec<String>,
    },
}

/// A captured initializer or lambda-body expression.
///
/// Calls and `new` expressions are already bound to their target signature;
/// identifiers carry their declaration binding when Binding resolved one.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprSyntax {
    /// Numeric literal with its raw lexeme preserved for classification.
    NumberLit { raw: String },
    StringLit(String),
    TemplateLit(String),
    BoolLit(bool),
    NullLit,
    UndefinedLit,
    Ident {
        name: String,
        decl: Option<DeclId>,
    },
    Property {
        object: Box<ExprSyntax>,
        name: String,
    },
    Index {
        object: Box<ExprSyntax>,
        index: Box<ExprSyntax>,
    },
    Call {
        signature: Option<SignatureId>,
        receiver: Option<Box<ExprSyntax>>,
        arguments: Vec<ExprSyntax>,
        type_arguments: Vec<TypeSyntax>,
    },
    New {
        signature: Option<SignatureId>,
        arguments: Vec<ExprSyntax>,
        type_arguments: Vec<TypeSyntax>,
    },
    Lambda(LambdaSyntax),
    /// `expr as T` and assertion syntax.
    As {
        expr: Box<ExprSyntax>,
        ty: TypeSyntax,
    },
    /// `expr!`
    NonNull(Box<ExprSyntax>),
    Await(Box<ExprSyntax>),
    Binary {
        op: BinaryOp,
        left: Box<ExprSyntax>,
        right: Box<ExprSyntax>,
    },
    Prefix {
        op: PrefixOp,
        operand: Box<ExprSyntax>,
    },
    ArrayLit(Vec<ExprSyntax>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LambdaSyntax {
    pub parameters: Vec<LambdaParamSyntax>,
    pub return_annotation: Option<TypeSyntax>,
    pub body: LambdaBodySyntax,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LambdaParamSyntax {
    pub name: String,
    pub annotation: Option<TypeSyntax>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LambdaBodySyntax {
    Expression(Box<ExprSyntax>),
    /// A block body reduced to its captured `return` expressions.
    Block { returns: Vec<ExprSyntax> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equals,
    NotEquals,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    LogicalAnd,
    LogicalOr,
}

impl BinaryOp {
    pub fn yields_boolean(self) -> bool {
        matches!(
            self,
            BinaryOp::Equals
                | BinaryOp::NotEquals
                | BinaryOp::Less
                | BinaryOp::LessEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterEqual
                | BinaryOp::LogicalAnd
                | BinaryOp::LogicalOr
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefixOp {
    Not,
    Minus,
    Plus,
}
