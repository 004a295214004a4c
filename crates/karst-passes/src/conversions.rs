//! The representation conversion catalog.
//!
//! Given the type a value actually has and the type a use site expects, the
//! catalog names the runtime operation (if any) that moves the value between
//! physical encodings. This is the single place that decides between boxing,
//! unboxing, widening, and leaving a value alone; the lowering pass in
//! [`crate::boxing`] only asks the catalog and applies its answer.

use karst_core::Location;
use karst_ir::runtime::{box_fn, is_identity_coercion, unbox_fn, widen_fn};
use karst_ir::types::kind_of;
use karst_ir::{Expr, ExprKind, FuncDecl, Type, idvec};
use tracing::debug;

/// What it takes to move a value from one static type's encoding to
/// another's.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conversion<'db> {
    /// Both sides use the same encoding already.
    Identity,
    /// Pass the value through this unary runtime operation.
    Call(FuncDecl<'db>),
}

/// Look up the conversion from `actual` to `expected`.
///
/// The catalog is driven entirely by the representation classifier:
///
/// - reference to reference is the identity, whatever the nominal types;
/// - unboxed to reference boxes, reference to unboxed unboxes;
/// - unboxed to unboxed is the identity for the same kind (and for pointer
///   kinds, which share one machine word), a widening operation for the
///   defined numeric pairs, and a compiler bug for anything else.
///
/// The pass only ever compares types the front end already accepted, so an
/// undefined pair means lowering itself went wrong; `at` names the offending
/// expression in the panic message.
pub fn conversion<'db>(
    db: &'db dyn salsa::Database,
    actual: Type<'db>,
    expected: Type<'db>,
    at: Location<'db>,
) -> Conversion<'db> {
    match (kind_of(db, actual), kind_of(db, expected)) {
        (None, None) => Conversion::Identity,
        (Some(from), None) => Conversion::Call(box_fn(db, from)),
        (None, Some(to)) => Conversion::Call(unbox_fn(db, to)),
        (Some(from), Some(to)) if from == to || is_identity_coercion(from, to) => {
            Conversion::Identity
        }
        (Some(from), Some(to)) => match widen_fn(db, from, to) {
            Some(widen) => Conversion::Call(widen),
            None => panic!(
                "no implicit conversion from `{}` to `{}` at {}",
                actual.render(db),
                expected.render(db),
                at.render(db),
            ),
        },
    }
}

impl<'db> Conversion<'db> {
    /// Rewrite `expr` through this conversion.
    ///
    /// The operand is retyped to the operation's parameter type, which is a
    /// representation-preserving view (for example `NativePtr?` narrowing to
    /// the `NativePtr` parameter of its box operation). The wrapper call
    /// keeps the operation's declared return type; the next use site sees
    /// that type as the value's actual type, so applying the catalog again
    /// yields the identity.
    pub fn apply(self, db: &'db dyn salsa::Database, expr: Expr<'db>) -> Expr<'db> {
        match self {
            Conversion::Identity => expr,
            Conversion::Call(op) => {
                debug_assert_eq!(op.params(db).len(), 1);
                debug!(
                    "boxing: inserting `{}` at {}",
                    op.name(db),
                    expr.location(db).render(db)
                );
                let operand = expr.retyped(db, op.params(db)[0]);
                Expr::new(
                    db,
                    expr.location(db),
                    op.return_ty(db),
                    ExprKind::Call {
                        callee: op,
                        super_qualifier: None,
                        dispatch_receiver: None,
                        extension_receiver: None,
                        args: idvec![operand],
                    },
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use karst_core::{PathId, Span};
    use karst_ir::types::boxed_type_of;
    use karst_ir::{ConstValue, Symbol, ValueKind};
    use salsa::Database;

    fn test_location(db: &dyn salsa::Database) -> Location<'_> {
        let path = PathId::new(db, "file:///conv.kr".to_owned());
        Location::new(path, Span::new(0, 4))
    }

    #[test]
    fn references_convert_for_free() {
        salsa::DatabaseImpl::default().attach(|db| {
            let string = Type::named(db, Symbol::new("String"));
            let any = Type::nullable_any(db);
            let at = test_location(db);
            assert_eq!(conversion(db, string, any, at), Conversion::Identity);
            assert_eq!(conversion(db, any, string, at), Conversion::Identity);
        });
    }

    #[test]
    fn unboxed_to_reference_boxes() {
        salsa::DatabaseImpl::default().attach(|db| {
            let int = Type::of_kind(db, ValueKind::Int);
            let conv = conversion(db, int, Type::nullable_any(db), test_location(db));
            assert_eq!(
                conv,
                Conversion::Call(box_fn(db, ValueKind::Int)),
                "Int used as a reference goes through its box operation"
            );
        });
    }

    #[test]
    fn reference_to_unboxed_unboxes() {
        salsa::DatabaseImpl::default().attach(|db| {
            let boxed = boxed_type_of(db, ValueKind::Long).make_nullable(db);
            let long = Type::of_kind(db, ValueKind::Long);
            let conv = conversion(db, boxed, long, test_location(db));
            assert_eq!(conv, Conversion::Call(unbox_fn(db, ValueKind::Long)));
        });
    }

    #[test]
    fn same_kind_needs_nothing() {
        salsa::DatabaseImpl::default().attach(|db| {
            let ptr = Type::of_kind(db, ValueKind::NativePtr);
            let nullable_ptr = ptr.make_nullable(db);
            let conv = conversion(db, nullable_ptr, ptr, test_location(db));
            assert_eq!(conv, Conversion::Identity);
        });
    }

    #[test]
    fn pointer_kinds_need_nothing() {
        salsa::DatabaseImpl::default().attach(|db| {
            let native = Type::of_kind(db, ValueKind::NativePtr);
            let foreign = Type::of_kind(db, ValueKind::CPointer).make_nullable(db);
            let conv = conversion(db, native, foreign, test_location(db));
            assert_eq!(conv, Conversion::Identity);
        });
    }

    #[test]
    fn numeric_widening_uses_runtime_operation() {
        salsa::DatabaseImpl::default().attach(|db| {
            let int = Type::of_kind(db, ValueKind::Int);
            let long = Type::of_kind(db, ValueKind::Long);
            match conversion(db, int, long, test_location(db)) {
                Conversion::Call(op) => assert_eq!(op.name(db), "int_to_long"),
                other => panic!("expected a widening call, got {other:?}"),
            }
        });
    }

    #[test]
    #[should_panic(expected = "no implicit conversion")]
    fn narrowing_is_a_compiler_bug() {
        salsa::DatabaseImpl::default().attach(|db| {
            let long = Type::of_kind(db, ValueKind::Long);
            let int = Type::of_kind(db, ValueKind::Int);
            conversion(db, long, int, test_location(db));
        });
    }

    #[test]
    fn apply_identity_returns_the_node() {
        salsa::DatabaseImpl::default().attach(|db| {
            let int = Type::of_kind(db, ValueKind::Int);
            let e = Expr::new(
                db,
                test_location(db),
                int,
                ExprKind::Const(ConstValue::Int(7)),
            );
            assert_eq!(Conversion::Identity.apply(db, e), e);
        });
    }

    #[test]
    fn apply_call_wraps_and_retypes_the_operand() {
        salsa::DatabaseImpl::default().attach(|db| {
            let nullable_ptr = Type::of_kind(db, ValueKind::NativePtr).make_nullable(db);
            let e = Expr::new(
                db,
                test_location(db),
                nullable_ptr,
                ExprKind::GetValue {
                    name: Symbol::new("p"),
                },
            );
            let conv = conversion(db, nullable_ptr, Type::nullable_any(db), test_location(db));
            let wrapped = conv.apply(db, e);

            assert_eq!(wrapped.ty(db), boxed_type_of(db, ValueKind::NativePtr));
            match wrapped.kind(db) {
                ExprKind::Call { callee, args, .. } => {
                    assert_eq!(*callee, box_fn(db, ValueKind::NativePtr));
                    // the operand narrows to the non-nullable parameter type
                    assert_eq!(args[0].ty(db), Type::of_kind(db, ValueKind::NativePtr));
                    assert_eq!(args[0].kind(db), e.kind(db));
                }
                other => panic!("expected a call wrapper, got {other:?}"),
            }
        });
    }

    #[test]
    fn apply_call_boxes_a_float_constant() {
        salsa::DatabaseImpl::default().attach(|db| {
            let double = Type::of_kind(db, ValueKind::Double);
            let half = Expr::new(
                db,
                test_location(db),
                double,
                ExprKind::Const(ConstValue::float(0.5)),
            );
            let conv = conversion(db, double, Type::nullable_any(db), test_location(db));
            assert_eq!(conv, Conversion::Call(box_fn(db, ValueKind::Double)));

            let wrapped = conv.apply(db, half);
            assert_eq!(wrapped.ty(db), boxed_type_of(db, ValueKind::Double));
            match wrapped.kind(db) {
                ExprKind::Call { args, .. } => {
                    // the payload rides through as its IEEE-754 bits
                    assert_eq!(args[0].kind(db), &ExprKind::Const(ConstValue::float(0.5)));
                }
                other => panic!("expected a call wrapper, got {other:?}"),
            }
        });
    }
}
