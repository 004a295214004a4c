//! Lowering passes for the karst backend.
//!
//! This crate rewrites well-typed modules into representation-correct ones:
//! every value that crosses between an unboxed primitive encoding and the
//! uniform reference encoding gets an explicit runtime conversion inserted
//! at its use site.

// === Conversion catalog ===
pub mod conversions;

// === IR passes ===
pub mod boxing;

// === Pipeline ===
pub mod pipeline;

// Re-exports
pub use boxing::insert_boxing;
pub use conversions::{Conversion, conversion};
pub use pipeline::{LoweringResult, lower_with_diagnostics, stage_lower, stage_validate};
