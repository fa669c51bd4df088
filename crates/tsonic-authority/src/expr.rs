//! Deterministic expression and lambda typing.
//!
//! A small, bounded inference used for variable initializers and for the
//! argument shapes that drive generic call inference. Every shape yields
//! `Some` or `None`; `None` means the caller falls back to a
//! `MISSING-ANNOTATION` diagnostic. Nothing here consults a host checker.

use crate::calls::CallQuery;
use crate::convert::convert_type_syntax;
use crate::relations::{contains_type_parameter, types_equal};
use crate::state::{MemberRef, TypeAuthority};
use rustc_hash::{FxHashMap, FxHashSet};
use tsonic_common::numeric::{NumericKind, binary_result_kind, classify_numeric_lexeme};
use tsonic_ir::{
    BinaryOp, ExprSyntax, FunctionType, IrParameter, IrType, LambdaBodySyntax, LambdaSyntax,
    PrefixOp, SignatureId, TypeSyntax,
};

/// Lambda-parameter bindings visible while typing a body.
type Locals = FxHashMap<String, IrType>;

impl<'a> TypeAuthority<'a> {
    /// Bounded inference for a variable initializer.
    pub fn infer_initializer(&mut self, expr: &ExprSyntax) -> Option<IrType> {
        self.infer_expr(expr, &Locals::default())
    }

    pub(crate) fn infer_expr(&mut self, expr: &ExprSyntax, locals: &Locals) -> Option<IrType> {
        match expr {
            ExprSyntax::NumberLit { raw } => {
                classify_numeric_lexeme(raw).map(|kind| IrType::primitive(kind.ir_name()))
            }
            ExprSyntax::StringLit(_) | ExprSyntax::TemplateLit(_) => {
                Some(IrType::primitive("string"))
            }
            ExprSyntax::BoolLit(_) => Some(IrType::primitive("boolean")),
            ExprSyntax::NullLit => Some(IrType::primitive("null")),
            ExprSyntax::UndefinedLit => Some(IrType::primitive("undefined")),

            ExprSyntax::Ident { name, decl } => {
                if let Some(bound) = locals.get(name) {
                    return Some(bound.clone());
                }
                let id = (*decl)?;
                let ty = self.quietly(|authority| authority.type_of_decl(id));
                if ty.is_unknown() { None } else { Some(ty) }
            }

            ExprSyntax::Property { object, name } => {
                let receiver = self.infer_expr(object, locals)?;
                let ty = self.quietly(|authority| {
                    authority.type_of_member(&receiver, &MemberRef::Name(name.clone()), None)
                });
                if ty.is_unknown() { None } else { Some(ty) }
            }

            ExprSyntax::Index { object, .. } => {
                let receiver = self.infer_expr(object, locals)?;
                match &receiver {
                    IrType::Array(a) => Some((*a.element_type).clone()),
                    IrType::Dictionary(d) => Some((*d.value_type).clone()),
                    // Strings index to strings.
                    IrType::Primitive(p) if p.name == "string" => {
                        Some(IrType::primitive("string"))
                    }
                    _ => self
                        .quietly(|authority| authority.get_indexer_info(&receiver, None))
                        .map(|info| info.value_type),
                }
            }

            ExprSyntax::Call {
                signature,
                receiver,
                arguments,
                type_arguments,
            } => self.infer_call_like(
                *signature,
                receiver.as_deref(),
                arguments,
                type_arguments,
                locals,
            ),
            ExprSyntax::New {
                signature,
                arguments,
                type_arguments,
            } => self.infer_call_like(*signature, None, arguments, type_arguments, locals),

            // A bare lambda has no expected signature to borrow parameter
            // types from.
            ExprSyntax::Lambda(_) => None,

            ExprSyntax::As { ty, .. } => {
                let converted = convert_type_syntax(ty, &FxHashSet::default());
                Some(self.expand_utilities_quiet(&converted))
            }
            ExprSyntax::NonNull(inner) => {
                let ty = self.infer_expr(inner, locals)?;
                Some(self.resolver().strip_nullish(&ty))
            }
            ExprSyntax::Await(inner) => {
                let ty = self.infer_expr(inner, locals)?;
                Some(await_once(&ty))
            }

            ExprSyntax::Binary { op, left, right } => {
                if op.yields_boolean() {
                    return Some(IrType::primitive("boolean"));
                }
                let left_ty = self.infer_expr(left, locals)?;
                let right_ty = self.infer_expr(right, locals)?;
                binary_arithmetic_type(*op, &left_ty, &right_ty)
            }
            ExprSyntax::Prefix { op, operand } => match op {
                PrefixOp::Not => Some(IrType::primitive("boolean")),
                PrefixOp::Minus | PrefixOp::Plus => self.infer_expr(operand, locals),
            },

            // Literal arrays infer only with a uniform element type.
            ExprSyntax::ArrayLit(elements) => {
                let mut tys = Vec::with_capacity(elements.len());
                for element in elements {
                    tys.push(self.infer_expr(element, locals)?);
                }
                let first = tys.first()?.clone();
                if tys.iter().all(|t| types_equal(t, &first)) {
                    Some(IrType::inferred_array(first))
                } else {
                    None
                }
            }
        }
    }

    /// Call and `new` expressions: infer non-lambda arguments, resolve once
    /// to obtain lambda parameter contexts, infer each lambda's return, and
    /// resolve again with every argument type present. APIs shaped like
    /// `select(xs, x => x * 2)` need all passes.
    fn infer_call_like(
        &mut self,
        signature: Option<SignatureId>,
        receiver: Option<&ExprSyntax>,
        arguments: &[ExprSyntax],
        type_arguments: &[TypeSyntax],
        locals: &Locals,
    ) -> Option<IrType> {
        let signature = signature?;
        let receiver_type = match receiver {
            Some(r) => self.infer_expr(r, locals),
            None => None,
        };
        let explicit: Vec<IrType> = type_arguments
            .iter()
            .map(|ts| convert_type_syntax(ts, &FxHashSet::default()))
            .collect();

        let mut arg_types = Vec::with_capacity(arguments.len());
        let mut lambda_positions = Vec::new();
        for (i, argument) in arguments.iter().enumerate() {
            match argument {
                ExprSyntax::Lambda(_) => {
                    lambda_positions.push(i);
                    arg_types.push(IrType::Unknown);
                }
                other => {
                    arg_types.push(self.infer_expr(other, locals).unwrap_or(IrType::Unknown));
                }
            }
        }

        let mut query = CallQuery::new(signature, arguments.len())
            .with_explicit_type_args(explicit.clone())
            .with_arg_types(arg_types.clone());
        if let Some(recv) = receiver_type.clone() {
            query = query.with_receiver(recv);
        }
        let first_pass = self.quietly(|authority| authority.resolve_call(&query));

        if lambda_positions.is_empty() {
            return finished_return(first_pass.return_type);
        }

        for &i in &lambda_positions {
            let expected = first_pass.parameter_types.get(i).cloned()?;
            if let ExprSyntax::Lambda(lambda) = &arguments[i] {
                if let Some(inferred) = self.infer_lambda(lambda, &expected, locals) {
                    arg_types[i] = inferred;
                }
            }
        }

        let mut final_query = CallQuery::new(signature, arguments.len())
            .with_explicit_type_args(explicit)
            .with_arg_types(arg_types);
        if let Some(recv) = receiver_type {
            final_query = final_query.with_receiver(recv);
        }
        let final_pass = self.quietly(|authority| authority.resolve_call(&final_query));
        finished_return(final_pass.return_type)
    }

    /// Type a lambda under an expected function (or delegate) type.
    ///
    /// Parameter types come from explicit annotations, otherwise from the
    /// expected signature. The return type is the explicit annotation when
    /// present, else the expected return when concrete, else inferred from
    /// the body.
    pub(crate) fn infer_lambda(
        &mut self,
        lambda: &LambdaSyntax,
        expected: &IrType,
        locals: &Locals,
    ) -> Option<IrType> {
        let expected_fn: FunctionType = match expected {
            IrType::Function(f) => f.clone(),
            other => self.delegate_to_function_type(other)?,
        };

        let scope = FxHashSet::default();
        let mut inner = locals.clone();
        let mut parameters = Vec::with_capacity(lambda.parameters.len());
        for (i, param) in lambda.parameters.iter().enumerate() {
            let ty = match &param.annotation {
                Some(annotation) => convert_type_syntax(annotation, &scope),
                None => expected_fn
                    .parameters
                    .get(i)
                    .map_or(IrType::Unknown, |ep| ep.ty.clone()),
            };
            inner.insert(param.name.clone(), ty.clone());
            parameters.push(IrParameter {
                name: Some(param.name.clone()),
                ty,
                is_optional: false,
                is_rest: false,
            });
        }

        let return_type = if let Some(annotation) = &lambda.return_annotation {
            convert_type_syntax(annotation, &scope)
        } else if is_concrete(&expected_fn.return_type) {
            (*expected_fn.return_type).clone()
        } else {
            self.infer_lambda_body(&lambda.body, &inner)?
        };

        Some(IrType::function(parameters, return_type))
    }

    fn infer_lambda_body(&mut self, body: &LambdaBodySyntax, locals: &Locals) -> Option<IrType> {
        match body {
            LambdaBodySyntax::Expression(expr) => self.infer_expr(expr, locals),
            LambdaBodySyntax::Block { returns } => {
                if returns.is_empty() {
                    return Some(IrType::Void);
                }
                let mut distinct: Vec<IrType> = Vec::new();
                for expr in returns {
                    let ty = self.infer_expr(expr, locals)?;
                    if !distinct.iter().any(|d| types_equal(d, &ty)) {
                        distinct.push(ty);
                    }
                }
                match distinct.len() {
                    1 => distinct.into_iter().next(),
                    _ => Some(IrType::union(distinct)),
                }
            }
        }
    }
}

fn finished_return(return_type: IrType) -> Option<IrType> {
    if return_type.is_unknown() {
        None
    } else {
        Some(return_type)
    }
}

fn is_concrete(ty: &IrType) -> bool {
    !ty.is_unknown() && !contains_type_parameter(ty)
}

/// One level of await unwrapping: generic `Promise`/`Task`/`ValueTask`
/// yield their payload; the non-generic task shapes yield `void`.
fn await_once(ty: &IrType) -> IrType {
    match ty {
        IrType::Reference(r) => {
            let awaitable = matches!(
                r.name.as_str(),
                "Promise" | "PromiseLike" | "Task" | "ValueTask"
            );
            if awaitable && r.type_arguments.len() == 1 {
                r.type_arguments[0].clone()
            } else if matches!(r.name.as_str(), "Task" | "ValueTask")
                && r.type_arguments.is_empty()
            {
                IrType::Void
            } else {
                ty.clone()
            }
        }
        _ => ty.clone(),
    }
}

/// Arithmetic result typing: string concatenation for `+` with a string
/// operand, CLR binary promotion for numeric operands. Plain `number`
/// stays `number`.
fn binary_arithmetic_type(op: BinaryOp, left: &IrType, right: &IrType) -> Option<IrType> {
    if op == BinaryOp::Add {
        let is_string =
            |t: &IrType| matches!(t.primitive_name(), Some("string"));
        if is_string(left) || is_string(right) {
            return Some(IrType::primitive("string"));
        }
    }
    let left_name = left.primitive_name()?;
    let right_name = right.primitive_name()?;
    if left_name == "number" && right_name == "number" {
        return Some(IrType::primitive("number"));
    }
    let left_kind = NumericKind::from_ir_name(left_name)?;
    let right_kind = NumericKind::from_ir_name(right_name)?;
    Some(IrType::primitive(
        binary_result_kind(left_kind, right_kind).ir_name(),
    ))
}
