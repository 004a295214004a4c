//! Function and field declarations.
//!
//! Lowering only needs the signature facts that representation decisions
//! depend on, so declarations are flat interned records rather than full
//! front-end symbols. Overrides carry a back-link to the declaration they
//! descend from; representation contracts always resolve through that base
//! unless a call site pins an exact target.

use crate::types::Type;
use crate::{IdVec, Symbol};

/// A function or method declaration.
#[salsa::interned(debug)]
pub struct FuncDecl<'db> {
    /// Owning class name for methods, `None` for top-level functions.
    pub owner: Option<Symbol>,
    pub name: Symbol,
    /// Receiver passed through dynamic dispatch, if any.
    pub dispatch_receiver: Option<Type<'db>>,
    /// Extension receiver, if any.
    pub extension_receiver: Option<Type<'db>>,
    #[returns(deref)]
    pub params: IdVec<Type<'db>>,
    pub return_ty: Type<'db>,
    /// Deferred-computation functions deliver results through the uniform
    /// reference channel while suspended.
    pub is_suspend: bool,
    /// Overridable declarations dispatch dynamically.
    pub is_open: bool,
    /// Declaration this one overrides; `None` when it is its own base.
    pub original: Option<FuncDecl<'db>>,
}

impl<'db> FuncDecl<'db> {
    /// Plain top-level function: no receivers, final, eager.
    pub fn function(
        db: &'db dyn salsa::Database,
        name: Symbol,
        params: IdVec<Type<'db>>,
        return_ty: Type<'db>,
    ) -> Self {
        Self::new(
            db, None, name, None, None, params, return_ty, false, false, None,
        )
    }

    /// The declaration this one descends from, or itself.
    pub fn base(self, db: &'db dyn salsa::Database) -> FuncDecl<'db> {
        self.original(db).unwrap_or(self)
    }

    /// The declaration whose signature governs a call's representation
    /// contract.
    ///
    /// A syntactically present super qualifier always pins the exact
    /// target. Otherwise an overridable target resolves through its base
    /// declaration, so overriding can never change which representation a
    /// call site passes.
    pub fn call_target(
        self,
        db: &'db dyn salsa::Database,
        super_qualifier: Option<Symbol>,
    ) -> FuncDecl<'db> {
        if super_qualifier.is_none() && self.is_open(db) {
            self.base(db)
        } else {
            self
        }
    }

    /// `Owner::name`, or plain `name` for top-level functions.
    pub fn qualified_name(self, db: &'db dyn salsa::Database) -> String {
        match self.owner(db) {
            Some(owner) => format!("{}::{}", owner, self.name(db)),
            None => self.name(db).to_string(),
        }
    }
}

/// A field declaration. Loads and stores resolve their representation
/// contract through the base declaration, the same way calls do.
#[salsa::interned(debug)]
pub struct FieldDecl<'db> {
    /// Owning class type for instance fields, `None` for globals.
    pub owner: Option<Type<'db>>,
    pub name: Symbol,
    pub ty: Type<'db>,
    /// Declaration this view overrides; `None` when it is its own base.
    pub original: Option<FieldDecl<'db>>,
}

impl<'db> FieldDecl<'db> {
    /// The declaration this one descends from, or itself.
    pub fn base(self, db: &'db dyn salsa::Database) -> FieldDecl<'db> {
        self.original(db).unwrap_or(self)
    }
}
