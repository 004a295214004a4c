//! Structural shape checks run before representation lowering.
//!
//! Lowering assumes every call lines up with the declaration it references:
//! argument counts match, receivers pair with receiver parameters, returns
//! target the enclosing function. A malformed body would otherwise surface
//! as an internal panic halfway through a rewrite. The checks here turn
//! those shapes into ordinary reportable errors so the pipeline can refuse
//! the module up front.

use derive_more::{Display, Error};
use karst_core::Span;

use crate::decl::{FieldDecl, FuncDecl};
use crate::expr::{Expr, ExprKind};
use crate::module::Module;

/// A structural problem found in a function body.
#[derive(Debug, Display, Error)]
#[display("in {function}: {kind} ({location})")]
pub struct ShapeError {
    /// Qualified name of the function containing the problem.
    pub function: String,
    /// Rendered source location of the offending expression.
    pub location: String,
    /// Raw span of the offending expression, for diagnostics.
    pub span: Span,
    pub kind: ShapeErrorKind,
}

#[derive(Debug, Display)]
pub enum ShapeErrorKind {
    #[display(
        "call to {callee} passes {found} argument(s) but the resolved target declares {expected}"
    )]
    ArgumentCount {
        callee: String,
        expected: usize,
        found: usize,
    },

    #[display("call to {callee} has a {role} receiver but the resolved target declares none")]
    UnexpectedReceiver { callee: String, role: &'static str },

    #[display("call to {callee} is missing the {role} receiver its resolved target declares")]
    MissingReceiver { callee: String, role: &'static str },

    #[display("access to instance field {field} has no receiver")]
    MissingFieldReceiver { field: String },

    #[display("access to global field {field} has a receiver")]
    UnexpectedFieldReceiver { field: String },

    #[display("return targets {target}, which is not the enclosing function")]
    ForeignReturnTarget { target: String },
}

/// Result of a shape validation run.
pub struct ValidationResult {
    pub errors: Vec<ShapeError>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.errors.is_empty() {
            write!(f, "validation passed")
        } else {
            writeln!(f, "{} shape error(s) found:", self.errors.len())?;
            for err in &self.errors {
                writeln!(f, "  - {}", err)?;
            }
            Ok(())
        }
    }
}

/// Check every function body in `module` for the shapes lowering relies on.
pub fn validate_module_shape<'db>(
    db: &'db dyn salsa::Database,
    module: Module<'db>,
) -> ValidationResult {
    let mut errors = Vec::new();
    for function in module.functions(db) {
        let enclosing = function.decl(db);
        let name = enclosing.qualified_name(db);
        for stmt in function.body(db) {
            check_expr(db, enclosing, &name, *stmt, &mut errors);
        }
    }
    ValidationResult { errors }
}

fn check_expr<'db>(
    db: &'db dyn salsa::Database,
    enclosing: FuncDecl<'db>,
    function_name: &str,
    expr: Expr<'db>,
    errors: &mut Vec<ShapeError>,
) {
    let mut report = |kind: ShapeErrorKind| {
        errors.push(ShapeError {
            function: function_name.to_string(),
            location: expr.location(db).render(db),
            span: expr.location(db).span,
            kind,
        });
    };

    match expr.kind(db) {
        ExprKind::Const(_) | ExprKind::Null | ExprKind::GetValue { .. } => {}

        ExprKind::Call {
            callee,
            super_qualifier,
            dispatch_receiver,
            extension_receiver,
            args,
        } => {
            let target = callee.call_target(db, *super_qualifier);
            let callee_name = target.qualified_name(db);

            if args.len() != target.params(db).len() {
                report(ShapeErrorKind::ArgumentCount {
                    callee: callee_name.clone(),
                    expected: target.params(db).len(),
                    found: args.len(),
                });
            }
            for (present, declared, role) in [
                (
                    dispatch_receiver.is_some(),
                    target.dispatch_receiver(db).is_some(),
                    "dispatch",
                ),
                (
                    extension_receiver.is_some(),
                    target.extension_receiver(db).is_some(),
                    "extension",
                ),
            ] {
                match (present, declared) {
                    (true, false) => report(ShapeErrorKind::UnexpectedReceiver {
                        callee: callee_name.clone(),
                        role,
                    }),
                    (false, true) => report(ShapeErrorKind::MissingReceiver {
                        callee: callee_name.clone(),
                        role,
                    }),
                    _ => {}
                }
            }

            for child in dispatch_receiver
                .iter()
                .chain(extension_receiver.iter())
                .chain(args.iter())
            {
                check_expr(db, enclosing, function_name, *child, errors);
            }
        }

        ExprKind::GetField { field, receiver } => {
            check_field_receiver(db, *field, receiver.is_some(), &mut report);
            if let Some(receiver) = receiver {
                check_expr(db, enclosing, function_name, *receiver, errors);
            }
        }

        ExprKind::SetField {
            field,
            receiver,
            value,
        } => {
            check_field_receiver(db, *field, receiver.is_some(), &mut report);
            if let Some(receiver) = receiver {
                check_expr(db, enclosing, function_name, *receiver, errors);
            }
            check_expr(db, enclosing, function_name, *value, errors);
        }

        ExprKind::TypeOperator { argument, .. } => {
            check_expr(db, enclosing, function_name, *argument, errors);
        }

        ExprKind::Return { target, value } => {
            if *target != enclosing {
                report(ShapeErrorKind::ForeignReturnTarget {
                    target: target.qualified_name(db),
                });
            }
            check_expr(db, enclosing, function_name, *value, errors);
        }
    }
}

fn check_field_receiver<'db>(
    db: &'db dyn salsa::Database,
    field: FieldDecl<'db>,
    has_receiver: bool,
    report: &mut impl FnMut(ShapeErrorKind),
) {
    let declared = field.base(db).owner(db).is_some();
    match (has_receiver, declared) {
        (true, false) => report(ShapeErrorKind::UnexpectedFieldReceiver {
            field: field.name(db).to_string(),
        }),
        (false, true) => report(ShapeErrorKind::MissingFieldReceiver {
            field: field.name(db).to_string(),
        }),
        _ => {}
    }
}

/// Debug-only validation that panics on a malformed module.
///
/// Only runs under `cfg!(debug_assertions)`. Useful for inserting shape
/// checkpoints between lowering passes.
pub fn debug_assert_module_shape<'db>(
    db: &'db dyn salsa::Database,
    module: Module<'db>,
    pass_name: &str,
) {
    if !cfg!(debug_assertions) {
        return;
    }

    let result = validate_module_shape(db, module);
    if !result.is_ok() {
        panic!("Module shape check failed before `{}`:\n{}", pass_name, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ConstValue;
    use crate::module::Function;
    use crate::types::{Type, ValueKind};
    use crate::{Symbol, idvec};
    use karst_core::{Location, PathId, Span};
    use salsa::Database;

    fn test_location(db: &dyn salsa::Database) -> Location<'_> {
        let path = PathId::new(db, "file:///shape.kr".to_owned());
        Location::new(path, Span::new(0, 0))
    }

    #[salsa::tracked]
    fn build_valid_module(db: &dyn salsa::Database) -> Module<'_> {
        let loc = test_location(db);
        let int = Type::of_kind(db, ValueKind::Int);

        let callee = FuncDecl::function(db, Symbol::new("twice"), idvec![int], int);
        let caller = FuncDecl::function(db, Symbol::new("main"), idvec![], int);
        let one = Expr::new(db, loc, int, ExprKind::Const(ConstValue::Int(1)));
        let call = Expr::new(
            db,
            loc,
            int,
            ExprKind::Call {
                callee,
                super_qualifier: None,
                dispatch_receiver: None,
                extension_receiver: None,
                args: idvec![one],
            },
        );
        let ret = Expr::new(
            db,
            loc,
            Type::nothing(db),
            ExprKind::Return {
                target: caller,
                value: call,
            },
        );
        Module::new(
            db,
            Symbol::new("m"),
            idvec![Function::new(db, caller, idvec![ret])],
        )
    }

    #[test]
    fn valid_module_passes() {
        salsa::DatabaseImpl::default().attach(|db| {
            let module = build_valid_module(db);
            let result = validate_module_shape(db, module);
            assert!(result.is_ok(), "expected clean module: {}", result);
        });
    }

    #[salsa::tracked]
    fn build_arity_mismatch_module(db: &dyn salsa::Database) -> Module<'_> {
        let loc = test_location(db);
        let int = Type::of_kind(db, ValueKind::Int);

        let callee = FuncDecl::function(db, Symbol::new("twice"), idvec![int], int);
        let caller = FuncDecl::function(db, Symbol::new("main"), idvec![], Type::unit(db));
        let call = Expr::new(
            db,
            loc,
            int,
            ExprKind::Call {
                callee,
                super_qualifier: None,
                dispatch_receiver: None,
                extension_receiver: None,
                args: idvec![],
            },
        );
        Module::new(
            db,
            Symbol::new("m"),
            idvec![Function::new(db, caller, idvec![call])],
        )
    }

    #[test]
    fn argument_count_mismatch_detected() {
        salsa::DatabaseImpl::default().attach(|db| {
            let module = build_arity_mismatch_module(db);
            let result = validate_module_shape(db, module);
            assert_eq!(result.errors.len(), 1);
            let err = &result.errors[0];
            assert_eq!(err.function, "main");
            assert!(
                err.to_string().contains("passes 0 argument(s)"),
                "unexpected message: {err}"
            );
        });
    }

    #[salsa::tracked]
    fn build_missing_receiver_module(db: &dyn salsa::Database) -> Module<'_> {
        let loc = test_location(db);
        let shape_ty = Type::named(db, Symbol::new("Shape"));
        let double = Type::of_kind(db, ValueKind::Double);

        let method = FuncDecl::new(
            db,
            Some(Symbol::new("Shape")),
            Symbol::new("area"),
            Some(shape_ty),
            None,
            idvec![],
            double,
            false,
            false,
            None,
        );
        let caller = FuncDecl::function(db, Symbol::new("main"), idvec![], Type::unit(db));
        let call = Expr::new(
            db,
            loc,
            double,
            ExprKind::Call {
                callee: method,
                super_qualifier: None,
                dispatch_receiver: None,
                extension_receiver: None,
                args: idvec![],
            },
        );
        Module::new(
            db,
            Symbol::new("m"),
            idvec![Function::new(db, caller, idvec![call])],
        )
    }

    #[test]
    fn missing_dispatch_receiver_detected() {
        salsa::DatabaseImpl::default().attach(|db| {
            let module = build_missing_receiver_module(db);
            let result = validate_module_shape(db, module);
            assert_eq!(result.errors.len(), 1);
            assert!(
                result.errors[0]
                    .to_string()
                    .contains("missing the dispatch receiver"),
                "unexpected message: {}",
                result.errors[0]
            );
        });
    }

    #[salsa::tracked]
    fn build_foreign_return_module(db: &dyn salsa::Database) -> Module<'_> {
        let loc = test_location(db);
        let int = Type::of_kind(db, ValueKind::Int);

        let other = FuncDecl::function(db, Symbol::new("other"), idvec![], int);
        let caller = FuncDecl::function(db, Symbol::new("main"), idvec![], int);
        let one = Expr::new(db, loc, int, ExprKind::Const(ConstValue::Int(1)));
        let ret = Expr::new(
            db,
            loc,
            Type::nothing(db),
            ExprKind::Return {
                target: other,
                value: one,
            },
        );
        Module::new(
            db,
            Symbol::new("m"),
            idvec![Function::new(db, caller, idvec![ret])],
        )
    }

    #[test]
    fn foreign_return_target_detected() {
        salsa::DatabaseImpl::default().attach(|db| {
            let module = build_foreign_return_module(db);
            let result = validate_module_shape(db, module);
            assert_eq!(result.errors.len(), 1);
            assert!(
                result.errors[0].to_string().contains("return targets other"),
                "unexpected message: {}",
                result.errors[0]
            );
        });
    }

    #[salsa::tracked]
    fn build_instance_field_module(db: &dyn salsa::Database) -> Module<'_> {
        let loc = test_location(db);
        let int = Type::of_kind(db, ValueKind::Int);
        let shape_ty = Type::named(db, Symbol::new("Shape"));

        let field = FieldDecl::new(db, Some(shape_ty), Symbol::new("width"), int, None);
        let caller = FuncDecl::function(db, Symbol::new("main"), idvec![], int);
        let load = Expr::new(
            db,
            loc,
            int,
            ExprKind::GetField {
                field,
                receiver: None,
            },
        );
        Module::new(
            db,
            Symbol::new("m"),
            idvec![Function::new(db, caller, idvec![load])],
        )
    }

    #[test]
    fn instance_field_without_receiver_detected() {
        salsa::DatabaseImpl::default().attach(|db| {
            let module = build_instance_field_module(db);
            let result = validate_module_shape(db, module);
            assert_eq!(result.errors.len(), 1);
            assert!(
                result.errors[0].to_string().contains("has no receiver"),
                "unexpected message: {}",
                result.errors[0]
            );
        });
    }
}
