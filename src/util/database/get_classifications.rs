use chrono::{DateTime, Utc};
use rusqlite::{params, types::Type};

use crate::error::PersistenceError;
use crate::relay::decode::DeviceKey;
use crate::relay::record::{Category, ClassificationRecord};

use super::{decode_timestamp, encode_timestamp, Database};

fn parse_classification_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClassificationRecord> {
    let category: String = row.get(0)?;
    let category = Category::parse(&category).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            Type::Text,
            format!("unknown category '{}'", category).into(),
        )
    })?;

    let device_key: String = row.get(3)?;
    let observed_at: String = row.get(4)?;

    Ok(ClassificationRecord {
        category,
        code: row.get(1)?,
        value: row.get(2)?,
        device_key: DeviceKey::new(device_key),
        observed_at: decode_timestamp(4, &observed_at)?,
    })
}

impl Database {
    /// All records of one category, oldest first.
    pub fn get_classifications(&self, category: Category) -> Result<Vec<ClassificationRecord>, PersistenceError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT category, code, value, device_key, observed_at
             FROM classifications
             WHERE category = ?1
             ORDER BY observed_at ASC, id ASC",
        )?;

        let records = stmt.query_map(params![category.as_str()], parse_classification_row)?;

        Ok(records.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Records observed within `[start, end]`, oldest first.
    pub fn get_classifications_between(
        &self,
        category: Category,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ClassificationRecord>, PersistenceError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT category, code, value, device_key, observed_at
             FROM classifications
             WHERE category = ?1 AND observed_at >= ?2 AND observed_at <= ?3
             ORDER BY observed_at ASC, id ASC",
        )?;

        let records = stmt.query_map(
            params![category.as_str(), encode_timestamp(&start), encode_timestamp(&end)],
            parse_classification_row,
        )?;

        Ok(records.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn count_classifications(&self, category: Category) -> Result<usize, PersistenceError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM classifications WHERE category = ?1",
            params![category.as_str()],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }
}
