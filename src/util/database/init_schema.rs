use crate::error::PersistenceError;

use super::Database;

impl Database {
    pub(super) fn init_schema(&self) -> Result<(), PersistenceError> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS classifications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                category TEXT NOT NULL,
                code TEXT NOT NULL,
                value REAL,
                device_key TEXT NOT NULL,
                observed_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_classifications_category_time
             ON classifications (category, observed_at)",
            [],
        )?;

        Ok(())
    }
}
