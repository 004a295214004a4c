//! Representation lowering for the karst native compiler backend.
//!
//! The work happens in three member crates; this facade re-exports their
//! public surface. `karst-core` provides the Salsa database, source
//! locations, and diagnostics. `karst-ir` defines the lowered expression
//! tree, the representation classifier, and shape validation. `karst-passes`
//! holds the autoboxing rewrite and the pipeline driving it.

pub use karst_core::{
    CompilationPhase, Diagnostic, DiagnosticSeverity, KarstDatabaseImpl, Location, PathId, Span,
};
pub use karst_ir::{
    ConstValue, Expr, ExprKind, FieldDecl, FuncDecl, Function, IdVec, Module, Symbol, Type,
    TypeOperator, ValueKind, idvec, printer, runtime, types, validation,
};
pub use karst_passes::{
    Conversion, LoweringResult, conversion, insert_boxing, lower_with_diagnostics, stage_lower,
    stage_validate,
};
