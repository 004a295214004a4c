//! Source location types carried by IR nodes.

use serde::{Deserialize, Serialize};

/// A span of source code, represented as byte offsets.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Interned URI string identifying a source file.
///
/// Typically a `file://` URI, but any scheme is accepted; front ends may use
/// synthetic schemes for generated code.
#[salsa::interned(debug)]
pub struct PathId<'db> {
    #[returns(deref)]
    pub uri: String,
}

/// A location in source code: file plus byte span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, salsa::Update)]
pub struct Location<'db> {
    pub path: PathId<'db>,
    pub span: Span,
}

impl<'db> Location<'db> {
    pub const fn new(path: PathId<'db>, span: Span) -> Self {
        Self { path, span }
    }

    /// Render as `uri:start..end` for diagnostics and internal-error messages.
    pub fn render(&self, db: &'db dyn salsa::Database) -> String {
        format!(
            "{}:{}..{}",
            self.path.uri(db),
            self.span.start,
            self.span.end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salsa::Database;

    #[test]
    fn render_includes_uri_and_offsets() {
        salsa::DatabaseImpl::default().attach(|db| {
            let path = PathId::new(db, "file:///demo.kr".to_owned());
            let loc = Location::new(path, Span::new(4, 9));
            assert_eq!(loc.render(db), "file:///demo.kr:4..9");
        });
    }
}
