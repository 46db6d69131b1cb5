//! Service layer orchestrating repository mutations with audit recording.
//!
//! `DakhlaService` wraps [`DakhlaDb`] (raw database access). All repo and
//! workflow methods are implemented as `impl DakhlaService` blocks in
//! [`crate::repos`] and [`crate::workflow`].
//!
//! Every mutation method follows this protocol:
//! 1. Authorize against the permission decision table
//! 2. Validate (state machine / identifier policy)
//! 3. Execute SQL
//! 4. Append audit (and, for transitions, status history) — best-effort:
//!    failures are logged and never revert step 3

use crate::DakhlaDb;
use crate::error::DatabaseError;

/// Composition root for all Dakhla state operations.
pub struct DakhlaService {
    db: DakhlaDb,
}

impl DakhlaService {
    /// Create a new service over a local database file.
    ///
    /// # Arguments
    ///
    /// * `db_path` — Path to the libSQL database file, or `":memory:"` for
    ///   tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = DakhlaDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Create from an existing `DakhlaDb` (for testing).
    #[must_use]
    pub const fn from_db(db: DakhlaDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &DakhlaDb {
        &self.db
    }
}
