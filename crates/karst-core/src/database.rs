//! Salsa database for the compiler backend.

/// Concrete database holding all Salsa storage.
///
/// The backend runs entirely on queries over interned and tracked IR
/// entities, so there is no state here beyond the Salsa storage itself.
/// Front ends that need file loading keep their own caches on top.
#[derive(Default, Clone)]
#[salsa::db]
pub struct KarstDatabaseImpl {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl salsa::Database for KarstDatabaseImpl {}
