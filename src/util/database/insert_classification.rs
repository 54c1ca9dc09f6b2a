use rusqlite::params;

use crate::error::PersistenceError;
use crate::relay::record::ClassificationRecord;

use super::{encode_timestamp, Database};

impl Database {
    pub fn insert_classification(&self, record: &ClassificationRecord) -> Result<i64, PersistenceError> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO classifications (category, code, value, device_key, observed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.category.as_str(),
                record.code,
                record.value,
                record.device_key.as_str(),
                encode_timestamp(&record.observed_at),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }
}
