//! Functions and modules (tracked by Salsa).

use crate::decl::FuncDecl;
use crate::expr::Expr;
use crate::{IdVec, Symbol};

/// A function with a body: its declaration plus a statement list.
#[salsa::tracked(debug)]
pub struct Function<'db> {
    pub decl: FuncDecl<'db>,
    #[returns(deref)]
    pub body: IdVec<Expr<'db>>,
}

/// A compilation unit handed to the lowering pipeline.
#[salsa::tracked(debug)]
pub struct Module<'db> {
    pub name: Symbol,
    #[returns(deref)]
    pub functions: IdVec<Function<'db>>,
}
