use crate::error::PersistenceError;
use crate::relay::persistence::PersistenceSink;
use crate::relay::record::ClassificationRecord;

use super::Database;

impl PersistenceSink for Database {
    fn save_classification(&self, record: &ClassificationRecord) -> Result<(), PersistenceError> {
        self.insert_classification(record).map(|_| ())
    }
}
