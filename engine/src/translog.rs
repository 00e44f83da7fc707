//! Transfer log sinks with daily rotation.
//!
//! Each completed (or failed) copy attempt appends one record to the
//! current day's log file, `<dir>/<yyyy-MM-dd>.json` or `.xml` depending on
//! the configured format.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::EngineError;
use crate::events::TransferLog;

/// On-disk encoding of transfer log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Xml,
}

/// Appends one record per transfer-completed event.
pub trait TransferLogger {
    fn log_transfer(&self, log: &TransferLog) -> Result<(), EngineError>;
}

/// Map the configured format to its logger implementation.
pub fn transfer_logger_for(format: LogFormat, log_dir: &Path) -> Box<dyn TransferLogger> {
    match format {
        LogFormat::Json => Box::new(JsonTransferLogger::new(log_dir)),
        LogFormat::Xml => Box::new(XmlTransferLogger::new(log_dir)),
    }
}

fn daily_log_path(log_dir: &Path, extension: &str) -> PathBuf {
    log_dir.join(format!("{}.{}", Local::now().format("%Y-%m-%d"), extension))
}

fn open_for_append(path: &Path) -> Result<fs::File, EngineError> {
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| EngineError::Persistence {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Writes one pretty-printed JSON object per record.
pub struct JsonTransferLogger {
    log_dir: PathBuf,
}

impl JsonTransferLogger {
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Self {
        JsonTransferLogger {
            log_dir: log_dir.as_ref().to_path_buf(),
        }
    }
}

impl TransferLogger for JsonTransferLogger {
    fn log_transfer(&self, log: &TransferLog) -> Result<(), EngineError> {
        fs::create_dir_all(&self.log_dir).map_err(|e| EngineError::Persistence {
            path: self.log_dir.clone(),
            source: e,
        })?;

        let path = daily_log_path(&self.log_dir, "json");
        let json = serde_json::to_string_pretty(log)?;

        let mut file = open_for_append(&path)?;
        writeln!(file, "{json}").map_err(|e| EngineError::Persistence { path, source: e })
    }
}

/// Writes one flat `<TransferLog>` element per record.
pub struct XmlTransferLogger {
    log_dir: PathBuf,
}

impl XmlTransferLogger {
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Self {
        XmlTransferLogger {
            log_dir: log_dir.as_ref().to_path_buf(),
        }
    }

    fn render(log: &TransferLog) -> String {
        format!(
            "<TransferLog>\
             <Timestamp>{}</Timestamp>\
             <BackupJobName>{}</BackupJobName>\
             <SourceFilePath>{}</SourceFilePath>\
             <TargetFilePath>{}</TargetFilePath>\
             <FileSize>{}</FileSize>\
             <TransferTimeMs>{}</TransferTimeMs>\
             </TransferLog>",
            log.timestamp.to_rfc3339(),
            xml_escape(&log.backup_job_name),
            xml_escape(&log.source_file_path),
            xml_escape(&log.target_file_path),
            log.file_size,
            log.transfer_time_ms,
        )
    }
}

impl TransferLogger for XmlTransferLogger {
    fn log_transfer(&self, log: &TransferLog) -> Result<(), EngineError> {
        fs::create_dir_all(&self.log_dir).map_err(|e| EngineError::Persistence {
            path: self.log_dir.clone(),
            source: e,
        })?;

        let path = daily_log_path(&self.log_dir, "xml");
        let mut file = open_for_append(&path)?;
        writeln!(file, "{}", Self::render(log))
            .map_err(|e| EngineError::Persistence { path, source: e })
    }
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
