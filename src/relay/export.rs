use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use tracing::info;

use crate::error::Result;
use crate::relay::history::SessionReport;

/// Receives the session history when a session ends.
pub trait SessionExporter: Send + Sync {
    /// Returns the written location, or `None` when there was nothing to
    /// write.
    fn export(&self, report: &SessionReport) -> Result<Option<PathBuf>>;
}

/// Writes each session as `session_<YYYY-MM-DD_HH-MM-SS>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileExporter {
    dir: PathBuf,
}

impl JsonFileExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_path(&self, report: &SessionReport) -> PathBuf {
        let stamp = report.ended_at.format("%Y-%m-%d_%H-%M-%S");
        self.dir.join(format!("session_{}.json", stamp))
    }
}

impl SessionExporter for JsonFileExporter {
    fn export(&self, report: &SessionReport) -> Result<Option<PathBuf>> {
        if report.is_empty() {
            info!("⚠️ [Export] No session data to export");
            return Ok(None);
        }

        fs::create_dir_all(&self.dir)?;

        let path = self.file_path(report);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.flush()?;

        info!(
            "📄 [Export] Session written to {} ({} readings, {} classifications)",
            path.display(),
            report.sensor_readings.len(),
            report.classifications.len()
        );

        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::decode::SensorReading;
    use crate::relay::history::TimedSensorReading;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn report() -> SessionReport {
        let started = Utc.with_ymd_and_hms(2024, 11, 5, 8, 0, 0).unwrap();
        let ended = Utc.with_ymd_and_hms(2024, 11, 5, 9, 15, 30).unwrap();

        SessionReport {
            started_at: started,
            ended_at: ended,
            sensor_readings: vec![TimedSensorReading {
                timestamp: started,
                reading: SensorReading {
                    mq135_ppm: Some(150.5),
                    ph: Some(6.9),
                    ..SensorReading::default()
                },
            }],
            classifications: Vec::new(),
            dropped: 0,
        }
    }

    #[test]
    fn test_export_writes_named_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = JsonFileExporter::new(temp_dir.path().join("exports"));

        let path = exporter.export(&report()).unwrap().unwrap();

        assert_eq!(path.file_name().unwrap(), "session_2024-11-05_09-15-30.json");

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["sensorReadings"][0]["mq135_ppm"], 150.5);
        assert_eq!(written["sensorReadings"][0]["pH"], 6.9);
    }

    #[test]
    fn test_empty_session_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = JsonFileExporter::new(temp_dir.path());

        let mut empty = report();
        empty.sensor_readings.clear();

        assert_eq!(exporter.export(&empty).unwrap(), None);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
