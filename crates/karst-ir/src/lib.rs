//! Body IR for the karst backend.
//!
//! The front end hands this crate type-checked function bodies as trees of
//! interned expressions; lowering passes rewrite those trees without ever
//! mutating a node in place. Identity questions ("is this the same node?")
//! reduce to comparing interned ids, which the representation-lowering pass
//! relies on to stay churn-free.

pub mod decl;
pub mod expr;
pub mod module;
pub mod printer;
pub mod runtime;
pub mod symbol;
pub mod types;
pub mod validation;

pub use decl::{FieldDecl, FuncDecl};
pub use expr::{ConstValue, Expr, ExprKind, TypeOperator};
pub use module::{Function, Module};
pub use symbol::Symbol;
pub use types::{Type, ValueKind};

// Re-export smallvec for use in macros and downstream crates
pub use smallvec;

/// Short inline vector for operand, parameter, and statement lists.
/// Most nodes have zero to two children, so two inline slots cover them.
pub type IdVec<T> = smallvec::SmallVec<[T; 2]>;
pub use smallvec::smallvec as idvec;
