//! The lowered expression tree.
//!
//! Bodies are trees of Salsa-interned [`Expr`] nodes over a closed
//! [`ExprKind`] enum, so every pass matches exhaustively and an unhandled
//! node shape is a compile error rather than a latent miscompile. Interning
//! makes structural equality and node identity the same question: rebuilding
//! a node with identical fields yields the identical id, which is what lets
//! rewrites guarantee "untouched means same node".

use karst_core::Location;

use crate::decl::{FieldDecl, FuncDecl};
use crate::types::Type;
use crate::{IdVec, Symbol};

/// One expression node: source location, static type, and shape.
#[salsa::interned(debug)]
pub struct Expr<'db> {
    pub location: Location<'db>,
    pub ty: Type<'db>,
    #[returns(ref)]
    pub kind: ExprKind<'db>,
}

impl<'db> Expr<'db> {
    pub fn is_null_literal(self, db: &'db dyn salsa::Database) -> bool {
        matches!(self.kind(db), ExprKind::Null)
    }

    /// Representation-preserving view of this node under another static
    /// type: same shape, new type, no runtime check implied.
    pub fn retyped(self, db: &'db dyn salsa::Database, ty: Type<'db>) -> Expr<'db> {
        if self.ty(db) == ty {
            self
        } else {
            Expr::new(db, self.location(db), ty, self.kind(db).clone())
        }
    }
}

/// Shape of an expression node. Closed on purpose: the use-site visitor
/// must have a rule for every case.
#[derive(Clone, Debug, PartialEq, Eq, Hash, salsa::Update)]
pub enum ExprKind<'db> {
    /// Literal constant.
    Const(ConstValue),

    /// The `null` literal.
    Null,

    /// Read of a local or parameter.
    GetValue { name: Symbol },

    /// Call of a statically resolved declaration.
    Call {
        callee: FuncDecl<'db>,
        /// Present on qualified super calls; pins dispatch to `callee`.
        super_qualifier: Option<Symbol>,
        dispatch_receiver: Option<Expr<'db>>,
        extension_receiver: Option<Expr<'db>>,
        args: IdVec<Expr<'db>>,
    },

    /// Field load.
    GetField {
        field: FieldDecl<'db>,
        receiver: Option<Expr<'db>>,
    },

    /// Field store.
    SetField {
        field: FieldDecl<'db>,
        receiver: Option<Expr<'db>>,
        value: Expr<'db>,
    },

    /// Cast, type test, or compiler-synthesized coercion. `check_ty` is the
    /// type the runtime check operates on, distinct from the node's static
    /// type.
    TypeOperator {
        operator: TypeOperator,
        check_ty: Type<'db>,
        argument: Expr<'db>,
    },

    /// Return from `target` with `value`.
    Return {
        target: FuncDecl<'db>,
        value: Expr<'db>,
    },
}

/// Literal payloads. Floats are stored as IEEE-754 bits so nodes stay
/// hashable and compare exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, salsa::Update)]
pub enum ConstValue {
    Bool(bool),
    Char(char),
    Int(i64),
    Float(u64),
}

impl ConstValue {
    pub fn float(value: f64) -> Self {
        ConstValue::Float(value.to_bits())
    }
}

/// Tags for [`ExprKind::TypeOperator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, salsa::Update)]
pub enum TypeOperator {
    /// `x as T`: checked cast, traps on mismatch.
    Cast,
    /// Compiler-inserted checked cast.
    ImplicitCast,
    /// Compiler-inserted not-null assertion.
    ImplicitNotNull,
    /// `x as? T`: yields null on mismatch.
    SafeCast,
    /// `x is T`.
    InstanceOf,
    /// `x !is T`.
    NotInstanceOf,
    /// Compiler-synthesized discard of a value in statement position.
    CoerceToUnit,
    /// Compiler-synthesized numeric widening.
    IntegerCoercion,
}

impl TypeOperator {
    /// Coercions the front end guarantees are already in the correct
    /// physical form; representation lowering leaves them alone.
    pub fn is_transparent_coercion(self) -> bool {
        matches!(
            self,
            TypeOperator::CoerceToUnit | TypeOperator::IntegerCoercion
        )
    }

    /// Operators producing the checked value itself.
    pub fn is_cast(self) -> bool {
        matches!(
            self,
            TypeOperator::Cast
                | TypeOperator::ImplicitCast
                | TypeOperator::ImplicitNotNull
                | TypeOperator::SafeCast
        )
    }

    /// Operators producing a Boolean answer.
    pub fn is_instance_check(self) -> bool {
        matches!(self, TypeOperator::InstanceOf | TypeOperator::NotInstanceOf)
    }
}
