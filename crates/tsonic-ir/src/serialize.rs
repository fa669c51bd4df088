//! Canonical serialization of IR values for cache keys.
//!
//! Member-type caches are keyed by `(stable_id, member, serialized args)`
//! strings, never by value identity. The writer is compact and total; two
//! structurally equal types always serialize to the same string.

use crate::types::{IrMember, IrType, LiteralValue};
use std::fmt::Write;

/// Serialize a type-argument list to its canonical cache-key form.
pub fn serialize_type_args(args: &[IrType]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_type(&mut out, arg);
    }
    out
}

fn write_type(out: &mut String, ty: &IrType) {
    match ty {
        IrType::Primitive(p) => {
            let _ = write!(out, "p:{}", p.name);
        }
        IrType::Reference(r) => {
            match &r.type_id {
                Some(id) => {
                    let _ = write!(out, "r#{}<", id.0);
                }
                None => {
                    let _ = write!(out, "r:{}<", r.name);
                }
            }
            for (i, arg) in r.type_arguments.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_type(out, arg);
            }
            out.push('>');
        }
        IrType::Array(a) => {
            out.push_str("a[");
            write_type(out, &a.element_type);
            out.push(']');
        }
        IrType::Tuple(t) => {
            out.push_str("t[");
            for (i, e) in t.element_types.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_type(out, e);
            }
            out.push(']');
        }
        IrType::Function(f) => {
            out.push_str("f(");
            for (i, p) in f.parameters.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_type(out, &p.ty);
                if p.is_optional {
                    out.push('?');
                }
            }
            out.push_str(")->");
            write_type(out, &f.return_type);
        }
        IrType::Union(u) => {
            out.push_str("u(");
            for (i, t) in u.types.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                write_type(out, t);
            }
            out.push(')');
        }
        IrType::Intersection(i) => {
            out.push_str("i(");
            for (idx, t) in i.types.iter().enumerate() {
                if idx > 0 {
                    out.push('&');
                }
                write_type(out, t);
            }
            out.push(')');
        }
        IrType::Object(o) => {
            out.push_str("o{");
            for (i, m) in o.members.iter().enumerate() {
                if i > 0 {
                    out.push(';');
                }
                write_member(out, m);
            }
            out.push('}');
        }
        IrType::Dictionary(d) => {
            out.push_str("d[");
            write_type(out, &d.key_type);
            out.push_str("=>");
            write_type(out, &d.value_type);
            out.push(']');
        }
        IrType::Literal(l) => match &l.value {
            LiteralValue::String(s) => {
                let _ = write!(out, "ls:{s}");
            }
            LiteralValue::Number(n) => {
                let _ = write!(out, "ln:{n}");
            }
        },
        IrType::TypeParameter(tp) => {
            let _ = write!(out, "tp:{}", tp.name);
        }
        IrType::Void => out.push_str("void"),
        IrType::Never => out.push_str("never"),
        IrType::Unknown => out.push_str("unknown"),
        IrType::Any => out.push_str("any"),
    }
}

fn write_member(out: &mut String, member: &IrMember) {
    match member {
        IrMember::Property(p) => {
            let _ = write!(out, "{}:", p.name);
            write_type(out, &p.ty);
            if p.is_optional {
                out.push('?');
            }
        }
        IrMember::Method(m) => {
            let _ = write!(out, "{}(", m.name);
            for (i, p) in m.parameters.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_type(out, &p.ty);
            }
            out.push_str(")->");
            write_type(out, &m.return_type);
        }
    }
}
