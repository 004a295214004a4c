//! Plain-text rendering of modules, functions, and expressions.
//!
//! One line per statement, every expression suffixed with its static type.
//! The output is deterministic (interned ids never appear), which makes it
//! usable for snapshot tests and for `debug!` logging without an attached
//! database.

use std::fmt::Write;

use crate::decl::{FieldDecl, FuncDecl};
use crate::expr::{ConstValue, Expr, ExprKind, TypeOperator};
use crate::module::{Function, Module};

pub fn print_module<'db>(db: &'db dyn salsa::Database, module: Module<'db>) -> String {
    let mut out = format!("module {}\n", module.name(db));
    for function in module.functions(db) {
        out.push('\n');
        out.push_str(&print_function(db, *function));
    }
    out
}

pub fn print_function<'db>(db: &'db dyn salsa::Database, function: Function<'db>) -> String {
    let decl = function.decl(db);
    let mut out = String::new();
    let _ = write!(out, "{} {{\n", render_signature(db, decl));
    for stmt in function.body(db) {
        let _ = writeln!(out, "  {}", print_expr(db, *stmt));
    }
    out.push_str("}\n");
    out
}

fn render_signature<'db>(db: &'db dyn salsa::Database, decl: FuncDecl<'db>) -> String {
    let mut out = String::new();
    if decl.is_open(db) {
        out.push_str("open ");
    }
    if decl.is_suspend(db) {
        out.push_str("suspend ");
    }
    let _ = write!(out, "fn {}(", decl.qualified_name(db));

    let mut first = true;
    let mut sep = |out: &mut String| {
        if !std::mem::take(&mut first) {
            out.push_str(", ");
        }
    };
    if let Some(receiver) = decl.dispatch_receiver(db) {
        sep(&mut out);
        let _ = write!(out, "this: {}", receiver.render(db));
    }
    if let Some(receiver) = decl.extension_receiver(db) {
        sep(&mut out);
        let _ = write!(out, "ext: {}", receiver.render(db));
    }
    for param in decl.params(db) {
        sep(&mut out);
        out.push_str(&param.render(db));
    }
    let _ = write!(out, ") -> {}", decl.return_ty(db).render(db));
    out
}

pub fn print_expr<'db>(db: &'db dyn salsa::Database, expr: Expr<'db>) -> String {
    let ty = expr.ty(db).render(db);
    match expr.kind(db) {
        ExprKind::Const(value) => format!("{}: {ty}", render_const(*value)),
        ExprKind::Null => format!("null: {ty}"),
        ExprKind::GetValue { name } => format!("%{name}: {ty}"),
        ExprKind::Call {
            callee,
            super_qualifier,
            dispatch_receiver,
            extension_receiver,
            args,
        } => {
            let mut out = String::new();
            if let Some(qualifier) = super_qualifier {
                let _ = write!(out, "super<{qualifier}>.");
            }
            let _ = write!(out, "{}(", callee.qualified_name(db));
            let mut pieces = Vec::new();
            if let Some(receiver) = dispatch_receiver {
                pieces.push(format!("this={}", print_expr(db, *receiver)));
            }
            if let Some(receiver) = extension_receiver {
                pieces.push(format!("ext={}", print_expr(db, *receiver)));
            }
            for arg in args {
                pieces.push(print_expr(db, *arg));
            }
            let _ = write!(out, "{}): {ty}", pieces.join(", "));
            out
        }
        ExprKind::GetField { field, receiver } => {
            let recv = receiver
                .map(|r| print_expr(db, r))
                .unwrap_or_default();
            format!("getfield {}({recv}): {ty}", render_field(db, *field))
        }
        ExprKind::SetField {
            field,
            receiver,
            value,
        } => {
            let mut pieces = Vec::new();
            if let Some(receiver) = receiver {
                pieces.push(print_expr(db, *receiver));
            }
            pieces.push(print_expr(db, *value));
            format!(
                "setfield {}({}): {ty}",
                render_field(db, *field),
                pieces.join(", ")
            )
        }
        ExprKind::TypeOperator {
            operator,
            check_ty,
            argument,
        } => format!(
            "{}<{}>({}): {ty}",
            render_operator(*operator),
            check_ty.render(db),
            print_expr(db, *argument)
        ),
        ExprKind::Return { target, value } => {
            format!("return@{} {}", target.name(db), print_expr(db, *value))
        }
    }
}

fn render_field<'db>(db: &'db dyn salsa::Database, field: FieldDecl<'db>) -> String {
    match field.owner(db) {
        Some(owner) => format!("{}::{}", owner.render(db), field.name(db)),
        None => field.name(db).to_string(),
    }
}

fn render_const(value: ConstValue) -> String {
    match value {
        ConstValue::Bool(b) => b.to_string(),
        ConstValue::Char(c) => format!("'{c}'"),
        ConstValue::Int(i) => i.to_string(),
        ConstValue::Float(bits) => format!("{}", f64::from_bits(bits)),
    }
}

fn render_operator(operator: TypeOperator) -> &'static str {
    match operator {
        TypeOperator::Cast => "cast",
        TypeOperator::ImplicitCast => "implicit_cast",
        TypeOperator::ImplicitNotNull => "notnull",
        TypeOperator::SafeCast => "safe_cast",
        TypeOperator::InstanceOf => "is",
        TypeOperator::NotInstanceOf => "!is",
        TypeOperator::CoerceToUnit => "to_unit",
        TypeOperator::IntegerCoercion => "int_coerce",
    }
}
