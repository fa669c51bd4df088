//! Rendering IR types in TypeScript surface syntax.
//!
//! Diagnostic messages quote types in the notation the user wrote, not the
//! IR's internal shape. The rendering is deterministic.

use std::fmt::Write;
use tsonic_ir::{IrMember, IrType, LiteralValue};

/// Render a type in TypeScript-like surface syntax.
pub fn display_type(ty: &IrType) -> String {
    let mut out = String::new();
    write_type(&mut out, ty, false);
    out
}

fn write_type(out: &mut String, ty: &IrType, parenthesize_compound: bool) {
    match ty {
        IrType::Primitive(p) => out.push_str(&p.name),
        IrType::Reference(r) => {
            out.push_str(&r.name);
            if !r.type_arguments.is_empty() {
                out.push('<');
                for (i, arg) in r.type_arguments.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_type(out, arg, false);
                }
                out.push('>');
            }
        }
        IrType::Array(a) => {
            let element_is_compound = matches!(
                *a.element_type,
                IrType::Union(_) | IrType::Intersection(_) | IrType::Function(_)
            );
            write_type(out, &a.element_type, element_is_compound);
            out.push_str("[]");
        }
        IrType::Tuple(t) => {
            out.push('[');
            for (i, e) in t.element_types.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_type(out, e, false);
            }
            out.push(']');
        }
        IrType::Function(f) => {
            if parenthesize_compound {
                out.push('(');
            }
            out.push('(');
            for (i, p) in f.parameters.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if p.is_rest {
                    out.push_str("...");
                }
                match &p.name {
                    Some(name) => {
                        out.push_str(name);
                        if p.is_optional {
                            out.push('?');
                        }
                        out.push_str(": ");
                    }
                    None => {}
                }
                write_type(out, &p.ty, false);
            }
            out.push_str(") => ");
            write_type(out, &f.return_type, false);
            if parenthesize_compound {
                out.push(')');
            }
        }
        IrType::Union(u) => {
            if parenthesize_compound {
                out.push('(');
            }
            for (i, t) in u.types.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                write_type(out, t, matches!(t, IrType::Function(_)));
            }
            if parenthesize_compound {
                out.push(')');
            }
        }
        IrType::Intersection(i) => {
            if parenthesize_compound {
                out.push('(');
            }
            for (idx, t) in i.types.iter().enumerate() {
                if idx > 0 {
                    out.push_str(" & ");
                }
                write_type(out, t, matches!(t, IrType::Union(_) | IrType::Function(_)));
            }
            if parenthesize_compound {
                out.push(')');
            }
        }
        IrType::Object(o) => {
            if o.members.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{ ");
            for (i, m) in o.members.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                write_member(out, m);
            }
            out.push_str(" }");
        }
        IrType::Dictionary(d) => {
            out.push_str("{ [key: ");
            write_type(out, &d.key_type, false);
            out.push_str("]: ");
            write_type(out, &d.value_type, false);
            out.push_str(" }");
        }
        IrType::Literal(l) => match &l.value {
            LiteralValue::String(s) => {
                let _ = write!(out, "\"{s}\"");
            }
            LiteralValue::Number(n) => {
                let _ = write!(out, "{}", format_number(*n));
            }
        },
        IrType::TypeParameter(tp) => out.push_str(&tp.name),
        IrType::Void => out.push_str("void"),
        IrType::Never => out.push_str("never"),
        IrType::Unknown => out.push_str("unknown"),
        IrType::Any => out.push_str("any"),
    }
}

fn write_member(out: &mut String, member: &IrMember) {
    match member {
        IrMember::Property(p) => {
            out.push_str(&p.name);
            if p.is_optional {
                out.push('?');
            }
            out.push_str(": ");
            write_type(out, &p.ty, false);
        }
        IrMember::Method(m) => {
            out.push_str(&m.name);
            out.push('(');
            for (i, p) in m.parameters.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if let Some(name) = &p.name {
                    out.push_str(name);
                    out.push_str(": ");
                }
                write_type(out, &p.ty, false);
            }
            out.push_str("): ");
            write_type(out, &m.return_type, false);
        }
    }
}

/// Numeric literals render without a trailing `.0` when integral.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
