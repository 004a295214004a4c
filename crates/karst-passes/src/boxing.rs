//! Autoboxing insertion pass.
//!
//! Earlier stages type expressions against static types without committing
//! to a physical encoding. This pass makes the encoding explicit: it walks
//! every value use site, compares the encoding the value actually has with
//! the encoding the site expects, and wraps the value in the runtime
//! conversion operation from [`crate::conversions`] when the two differ.
//!
//! ## Problem
//!
//! An `Int` is a bare machine word, but a parameter of type `Any?` receives
//! a heap reference. Passing one as the other without an explicit `box_int`
//! would hand the callee a word it cannot traverse. The same mismatch shows
//! up for results of overridable and suspending calls, field loads declared
//! against a supertype, casts, and the class a type test checks against.
//!
//! ## Example
//!
//! Before:
//! ```text
//! consume(7: Int): Unit          where consume(Any?) -> Unit
//! ```
//!
//! After:
//! ```text
//! consume(box_int(7: Int): IntBox): Unit
//! ```
//!
//! Which conversion applies is decided from declared types alone, never
//! from the shape a value happens to have, so running the pass on its own
//! output inserts nothing further.

use karst_core::Location;
use karst_ir::runtime::native_null_ptr;
use karst_ir::types::{kind_of, runtime_check_type};
use karst_ir::{
    Expr, ExprKind, FieldDecl, FuncDecl, Function, IdVec, Module, Type, TypeOperator, ValueKind,
    idvec,
};
use tracing::debug;

use crate::conversions::conversion;

/// Rewrite every function in `module` so each value use site carries the
/// representation its declaration expects.
#[salsa::tracked]
pub fn insert_boxing<'db>(db: &'db dyn salsa::Database, module: Module<'db>) -> Module<'db> {
    debug!("boxing: module `{}`", module.name(db));
    let functions: IdVec<Function<'db>> = module
        .functions(db)
        .iter()
        .map(|function| lower_function(db, *function))
        .collect();
    Module::new(db, module.name(db), functions)
}

#[salsa::tracked]
fn lower_function<'db>(db: &'db dyn salsa::Database, function: Function<'db>) -> Function<'db> {
    let decl = function.decl(db);
    debug!("boxing: function `{}`", decl.qualified_name(db));
    // Statement position discards the value, so statements are lowered
    // without an expected type of their own.
    let body: IdVec<Expr<'db>> = function
        .body(db)
        .iter()
        .map(|stmt| lower_expr(db, *stmt, decl))
        .collect();
    Function::new(db, decl, body)
}

/// Lower `expr` for use where a value of type `expected` is required:
/// lower its subtree, then adapt the result to `expected`'s encoding.
fn use_as<'db>(
    db: &'db dyn salsa::Database,
    expr: Expr<'db>,
    expected: Type<'db>,
    enclosing: FuncDecl<'db>,
) -> Expr<'db> {
    let lowered = lower_expr(db, expr, enclosing);

    // Foreign pointer types have no boxed null, so a null literal flowing
    // into one becomes the interop null sentinel instead.
    if lowered.is_null_literal(db)
        && kind_of(db, expected).is_some_and(ValueKind::is_foreign_pointer)
    {
        debug!(
            "boxing: null literal used as `{}` at {}",
            expected.render(db),
            lowered.location(db).render(db)
        );
        let sentinel = native_null_ptr(db);
        let call = Expr::new(
            db,
            lowered.location(db),
            sentinel.return_ty(db),
            ExprKind::Call {
                callee: sentinel,
                super_qualifier: None,
                dispatch_receiver: None,
                extension_receiver: None,
                args: idvec![],
            },
        );
        return call.retyped(db, expected);
    }

    let actual = actual_type(db, lowered);
    conversion(db, actual, expected, lowered.location(db)).apply(db, lowered)
}

/// The type whose encoding `expr`'s value actually arrives in, which is not
/// always the node's static type:
///
/// - a call delivers its resolved target's declared return type, or the
///   universal reference type when the target suspends;
/// - a field load delivers the base declaration's field type;
/// - an integer coercion delivers its coercion target type, since the
///   coerced value is already in that form.
fn actual_type<'db>(db: &'db dyn salsa::Database, expr: Expr<'db>) -> Type<'db> {
    match expr.kind(db) {
        ExprKind::Call {
            callee,
            super_qualifier,
            ..
        } => {
            let target = callee.call_target(db, *super_qualifier);
            if target.is_suspend(db) {
                Type::nullable_any(db)
            } else {
                target.return_ty(db)
            }
        }
        ExprKind::GetField { field, .. } => field.base(db).ty(db),
        ExprKind::TypeOperator {
            operator: TypeOperator::IntegerCoercion,
            check_ty,
            ..
        } => *check_ty,
        _ => expr.ty(db),
    }
}

/// Lower the children of `expr` against the types their use sites expect.
/// The node itself keeps its static type; the caller adapts it via
/// [`use_as`] where the surrounding context expects a value.
fn lower_expr<'db>(
    db: &'db dyn salsa::Database,
    expr: Expr<'db>,
    enclosing: FuncDecl<'db>,
) -> Expr<'db> {
    let location = expr.location(db);
    match expr.kind(db) {
        ExprKind::Const(_) | ExprKind::Null | ExprKind::GetValue { .. } => expr,

        ExprKind::Call {
            callee,
            super_qualifier,
            dispatch_receiver,
            extension_receiver,
            args,
        } => {
            // Arguments and receivers adapt to the signature of the target
            // the call actually dispatches through, so an override can never
            // change which representation a call site passes.
            let target = callee.call_target(db, *super_qualifier);
            let params = target.params(db);
            if args.len() != params.len() {
                panic!(
                    "call to `{}` at {} passes {} argument(s) for {} parameter(s)",
                    target.qualified_name(db),
                    location.render(db),
                    args.len(),
                    params.len(),
                );
            }
            let dispatch_receiver = lower_call_receiver(
                db,
                *dispatch_receiver,
                target.dispatch_receiver(db),
                "dispatch",
                target,
                location,
                enclosing,
            );
            let extension_receiver = lower_call_receiver(
                db,
                *extension_receiver,
                target.extension_receiver(db),
                "extension",
                target,
                location,
                enclosing,
            );
            let args: IdVec<Expr<'db>> = args
                .iter()
                .zip(params.iter())
                .map(|(arg, param)| use_as(db, *arg, *param, enclosing))
                .collect();
            Expr::new(
                db,
                location,
                expr.ty(db),
                ExprKind::Call {
                    callee: *callee,
                    super_qualifier: *super_qualifier,
                    dispatch_receiver,
                    extension_receiver,
                    args,
                },
            )
        }

        ExprKind::GetField { field, receiver } => {
            let receiver = lower_field_receiver(db, *field, *receiver, location, enclosing);
            Expr::new(
                db,
                location,
                expr.ty(db),
                ExprKind::GetField {
                    field: *field,
                    receiver,
                },
            )
        }

        ExprKind::SetField {
            field,
            receiver,
            value,
        } => {
            let receiver = lower_field_receiver(db, *field, *receiver, location, enclosing);
            // Stores adapt the value to the base declaration's field type,
            // mirroring what loads report as their actual type.
            let value = use_as(db, *value, field.base(db).ty(db), enclosing);
            Expr::new(
                db,
                location,
                expr.ty(db),
                ExprKind::SetField {
                    field: *field,
                    receiver,
                    value,
                },
            )
        }

        ExprKind::TypeOperator {
            operator,
            check_ty,
            argument,
        } => {
            if operator.is_transparent_coercion() {
                // Already representation-correct by construction; only the
                // operand's subtree needs lowering.
                let argument = lower_expr(db, *argument, enclosing);
                return Expr::new(
                    db,
                    location,
                    expr.ty(db),
                    ExprKind::TypeOperator {
                        operator: *operator,
                        check_ty: *check_ty,
                        argument,
                    },
                );
            }

            // The check retargets to the boxed class standing in for an
            // unboxed check type.
            let checked = runtime_check_type(db, *check_ty);

            if operator.is_instance_check() {
                // The instance test machinery accepts both encodings, so
                // the tested expression keeps its own representation.
                let argument = lower_expr(db, *argument, enclosing);
                return Expr::new(
                    db,
                    location,
                    expr.ty(db),
                    ExprKind::TypeOperator {
                        operator: *operator,
                        check_ty: checked,
                        argument,
                    },
                );
            }

            // Cast machinery operates on uniform references, so the operand
            // is boxed if needed.
            let argument = use_as(db, *argument, Type::nullable_any(db), enclosing);

            // Casts produce the checked value itself, so the node's type
            // becomes the check type and the result converts back to
            // whatever the cast originally promised. The rebuilt node is
            // already lowered, so it goes straight to the catalog.
            let result_ty = if *operator == TypeOperator::SafeCast {
                checked.make_nullable(db)
            } else {
                checked
            };
            let node = Expr::new(
                db,
                location,
                result_ty,
                ExprKind::TypeOperator {
                    operator: *operator,
                    check_ty: checked,
                    argument,
                },
            );
            conversion(db, result_ty, expr.ty(db), location).apply(db, node)
        }

        ExprKind::Return { target, value } => {
            // A suspending function delivers its result through the uniform
            // reference channel, so returning from one hands back `Any?`
            // regardless of the declared return type.
            let expected = if target.is_suspend(db) && *target == enclosing {
                Type::nullable_any(db)
            } else {
                target.return_ty(db)
            };
            let value = use_as(db, *value, expected, enclosing);
            Expr::new(
                db,
                location,
                expr.ty(db),
                ExprKind::Return {
                    target: *target,
                    value,
                },
            )
        }
    }
}

fn lower_call_receiver<'db>(
    db: &'db dyn salsa::Database,
    receiver: Option<Expr<'db>>,
    declared: Option<Type<'db>>,
    role: &str,
    target: FuncDecl<'db>,
    at: Location<'db>,
    enclosing: FuncDecl<'db>,
) -> Option<Expr<'db>> {
    match (receiver, declared) {
        (Some(receiver), Some(ty)) => Some(use_as(db, receiver, ty, enclosing)),
        (None, None) => None,
        (Some(_), None) => panic!(
            "call to `{}` at {} has a {} receiver but the target declares none",
            target.qualified_name(db),
            at.render(db),
            role,
        ),
        (None, Some(_)) => panic!(
            "call to `{}` at {} is missing the {} receiver its target declares",
            target.qualified_name(db),
            at.render(db),
            role,
        ),
    }
}

fn lower_field_receiver<'db>(
    db: &'db dyn salsa::Database,
    field: FieldDecl<'db>,
    receiver: Option<Expr<'db>>,
    at: Location<'db>,
    enclosing: FuncDecl<'db>,
) -> Option<Expr<'db>> {
    match (receiver, field.base(db).owner(db)) {
        (Some(receiver), Some(owner)) => Some(use_as(db, receiver, owner, enclosing)),
        (None, None) => None,
        (Some(_), None) => panic!(
            "access to global field `{}` at {} has a receiver",
            field.name(db),
            at.render(db),
        ),
        (None, Some(_)) => panic!(
            "access to instance field `{}` at {} has no receiver",
            field.name(db),
            at.render(db),
        ),
    }
}
