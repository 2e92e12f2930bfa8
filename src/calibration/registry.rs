use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::error::CalibrationError;
use super::record::{CalibrationDocument, CalibrationRecord};

#[derive(Debug, Default)]
pub struct CalibrationRegistry {
    records: HashMap<String, CalibrationRecord>,
}

impl CalibrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: CalibrationRecord) {
        let key = record.station_id().to_string();
        if self.records.insert(key.clone(), record).is_some() {
            log::info!("Replaced calibration for station {}", key);
        }
    }

    pub fn get(&self, station_id: &str) -> Result<&CalibrationRecord, CalibrationError> {
        self.records
            .get(&station_id.trim().to_uppercase())
            .ok_or_else(|| CalibrationError::UnknownStation(station_id.to_string()))
    }

    pub fn contains(&self, station_id: &str) -> bool {
        self.get(station_id).is_ok()
    }

    pub fn stations(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.records.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Loads every `.yaml`, `.yml` and `.json` calibration document in `dir`.
    /// Unreadable documents are logged and skipped. Returns how many records
    /// were loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, CalibrationError> {
        if !dir.exists() {
            return Err(CalibrationError::DirectoryNotFound(dir.display().to_string()));
        }

        let mut loaded = 0;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() || document_format(&path).is_none() {
                continue;
            }

            match load_document(&path) {
                Ok(record) => {
                    log::info!(
                        "Loaded calibration for {} ({}x{}) from {}",
                        record.station_id(),
                        record.shape().0,
                        record.shape().1,
                        path.display()
                    );
                    self.insert(record);
                    loaded += 1;
                }
                Err(e) => {
                    log::warn!("Failed to load calibration {}: {}", path.display(), e);
                }
            }
        }

        Ok(loaded)
    }
}

enum DocumentFormat {
    Yaml,
    Json,
}

fn document_format(path: &Path) -> Option<DocumentFormat> {
    match path.extension()?.to_str()? {
        "yaml" | "yml" => Some(DocumentFormat::Yaml),
        "json" => Some(DocumentFormat::Json),
        _ => None,
    }
}

fn load_document(path: &Path) -> Result<CalibrationRecord, CalibrationError> {
    let content = fs::read_to_string(path)?;
    let invalid = |message: String| CalibrationError::InvalidDocument {
        file: file_name(path),
        message,
    };

    let doc: CalibrationDocument = match document_format(path) {
        Some(DocumentFormat::Json) => {
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?
        }
        _ => serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string()))?,
    };

    CalibrationRecord::try_from(doc)
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap_or_default().to_string_lossy().to_string()
}
