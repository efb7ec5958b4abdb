use std::path::PathBuf;

use picsmaller_logging::pipeline_info;

use crate::persist::{AtomicFileWriter, PersistError};

/// Destination for exported blobs (single files and archives).
pub trait ExportSink: Send + Sync {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, PersistError>;
}

/// Writes every blob atomically into one output directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    writer: AtomicFileWriter,
}

impl DirectorySink {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
        }
    }
}

impl ExportSink for DirectorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, PersistError> {
        let path = self.writer.write(filename, bytes)?;
        pipeline_info!("Saved {} ({} bytes) to {:?}", filename, bytes.len(), path);
        Ok(path)
    }
}

/// Blocking indicator shown around long operations such as archive builds.
pub trait ProgressIndicator: Send + Sync {
    fn show(&self, message: &str);
    fn hide(&self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressIndicator;

impl ProgressIndicator for LogProgressIndicator {
    fn show(&self, message: &str) {
        pipeline_info!("{}...", message);
    }

    fn hide(&self) {
        pipeline_info!("Done.");
    }
}
