//! The representation lowering pipeline.
//!
//! Stages are Salsa tracked functions, so a module whose inputs have not
//! changed is never re-validated or re-lowered.
//!
//! ```text
//! Module
//!   │
//!   ▼
//! stage_validate ─► shape diagnostics
//!   │
//!   ▼
//! stage_lower ─► Module (explicit conversions at every use site)
//! ```
//!
//! Shape problems are reported through the [`Diagnostic`] accumulator and
//! keep the module away from the rewrite, where they would otherwise
//! surface as internal panics.

use karst_core::{CompilationPhase, Diagnostic, DiagnosticSeverity, Span};
use karst_ir::Module;
use karst_ir::validation::validate_module_shape;
use salsa::Accumulator;
use tracing::debug;

use crate::boxing::insert_boxing;

/// Result of running the full lowering pipeline.
pub struct LoweringResult<'db> {
    /// The lowered module, or the input module when validation failed.
    pub module: Module<'db>,
    /// Diagnostics collected across all stages.
    pub diagnostics: Vec<Diagnostic>,
}

// =============================================================================
// Pipeline Stages
// =============================================================================

/// Stage 1: check the structural shapes lowering relies on.
///
/// Returns whether the module is fit to lower; every violation is reported
/// as an error diagnostic.
#[salsa::tracked]
pub fn stage_validate<'db>(db: &'db dyn salsa::Database, module: Module<'db>) -> bool {
    let result = validate_module_shape(db, module);
    for error in &result.errors {
        Diagnostic {
            message: error.to_string(),
            span: error.span,
            severity: DiagnosticSeverity::Error,
            phase: CompilationPhase::Validation,
        }
        .accumulate(db);
    }
    result.is_ok()
}

/// Stage 2: insert representation conversions.
///
/// A module that failed validation passes through untouched so later
/// consumers still have something to report against.
#[salsa::tracked]
pub fn stage_lower<'db>(db: &'db dyn salsa::Database, module: Module<'db>) -> Module<'db> {
    if !stage_validate(db, module) {
        debug!("boxing: skipping module `{}`", module.name(db));
        Diagnostic {
            message: format!(
                "module `{}` not lowered: shape validation failed",
                module.name(db)
            ),
            span: Span::default(),
            severity: DiagnosticSeverity::Warning,
            phase: CompilationPhase::Lowering,
        }
        .accumulate(db);
        return module;
    }
    insert_boxing(db, module)
}

// =============================================================================
// Full Pipeline
// =============================================================================

/// Run the pipeline and return the lowered module together with every
/// diagnostic the stages accumulated.
pub fn lower_with_diagnostics<'db>(
    db: &'db dyn salsa::Database,
    module: Module<'db>,
) -> LoweringResult<'db> {
    let lowered = stage_lower(db, module);
    let diagnostics = stage_lower::accumulated::<Diagnostic>(db, module)
        .into_iter()
        .cloned()
        .collect();
    LoweringResult {
        module: lowered,
        diagnostics,
    }
}
