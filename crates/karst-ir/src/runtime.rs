//! Runtime conversion primitives.
//!
//! The runtime library exposes one boxing and one unboxing entry point per
//! value kind, a small set of implicit numeric widenings, and the interop
//! null sentinel. Lowering inserts ordinary calls to these; later codegen
//! stages treat them like any other call.
//!
//! ## Operations
//!
//! - `box_<kind>` boxes an unboxed value: `K → KBox`
//! - `unbox_<kind>` unboxes a heap box: `KBox → K`
//! - `<a>_to_<b>` widens between numeric kinds: `A → B`
//! - `native_null_ptr` yields the canonical "no value" pointer word: `() → NativePtr`
//!
//! ## Representation flow
//!
//! ```text
//! Int (unboxed word)
//!     ↓ box_int
//! IntBox (heap object)
//!     ↓ (implicit subtyping)
//! Any (uniform reference)
//! ```
//!
//! All declarations here are interned on demand: asking for `box_fn(Int)`
//! twice yields the same `FuncDecl`, so inserted conversions compare equal
//! across lowering runs.

use crate::decl::FuncDecl;
use crate::types::{Type, ValueKind, boxed_type_of};
use crate::{Symbol, idvec};

/// The boxing primitive for `kind`: `box_<kind>(value: K) -> KBox`.
pub fn box_fn<'db>(db: &'db dyn salsa::Database, kind: ValueKind) -> FuncDecl<'db> {
    FuncDecl::function(
        db,
        Symbol::from_dynamic(&format!("box_{}", kind.primitive_stem())),
        idvec![Type::of_kind(db, kind)],
        boxed_type_of(db, kind),
    )
}

/// The unboxing primitive for `kind`: `unbox_<kind>(box: KBox) -> K`.
pub fn unbox_fn<'db>(db: &'db dyn salsa::Database, kind: ValueKind) -> FuncDecl<'db> {
    FuncDecl::function(
        db,
        Symbol::from_dynamic(&format!("unbox_{}", kind.primitive_stem())),
        idvec![boxed_type_of(db, kind)],
        Type::of_kind(db, kind),
    )
}

/// The implicit widening primitive for a defined `(from, to)` pair, or
/// `None` when no implicit conversion exists between the kinds.
///
/// Defined pairs are the numeric widenings; narrowing or cross-category
/// pairs have no implicit form and callers treat them as internal errors.
pub fn widen_fn<'db>(
    db: &'db dyn salsa::Database,
    from: ValueKind,
    to: ValueKind,
) -> Option<FuncDecl<'db>> {
    if !is_defined_widening(from, to) {
        return None;
    }
    Some(FuncDecl::function(
        db,
        Symbol::from_dynamic(&format!(
            "{}_to_{}",
            from.primitive_stem(),
            to.primitive_stem()
        )),
        idvec![Type::of_kind(db, from)],
        Type::of_kind(db, to),
    ))
}

fn is_defined_widening(from: ValueKind, to: ValueKind) -> bool {
    use ValueKind::*;
    matches!(
        (from, to),
        (Byte, Short)
            | (Byte, Int)
            | (Byte, Long)
            | (Short, Int)
            | (Short, Long)
            | (Int, Long)
            | (Float, Double)
    )
}

/// Pointer kinds share one machine-word representation; converting between
/// them inserts nothing.
pub fn is_identity_coercion(from: ValueKind, to: ValueKind) -> bool {
    from.admits_null() && to.admits_null()
}

/// The interop "no value" sentinel: `native_null_ptr() -> NativePtr`.
///
/// Null literals flowing into foreign pointer contexts are rewritten to a
/// call of this accessor, because foreign pointer types have no boxed-null
/// form.
pub fn native_null_ptr<'db>(db: &'db dyn salsa::Database) -> FuncDecl<'db> {
    FuncDecl::function(
        db,
        Symbol::new("native_null_ptr"),
        idvec![],
        Type::of_kind(db, ValueKind::NativePtr),
    )
}
