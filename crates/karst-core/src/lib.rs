//! Shared infrastructure for the karst backend: the Salsa database,
//! source locations, and diagnostics.

mod database;
mod diagnostic;
mod location;

pub use database::KarstDatabaseImpl;
pub use diagnostic::{CompilationPhase, Diagnostic, DiagnosticSeverity};
pub use location::{Location, PathId, Span};
