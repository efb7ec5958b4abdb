use std::collections::HashSet;
use std::io::{Cursor, Write};

use picsmaller_core::{unique_name, JobRecord, Snapshot};
use picsmaller_logging::pipeline_debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const DEFAULT_ARCHIVE_NAME: &str = "PicSmaller.zip";
/// Mid-range DEFLATE level; trades build time against archive size.
pub const DEFAULT_COMPRESSION_LEVEL: i64 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOptions {
    pub archive_name: String,
    pub compression_level: i64,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArchive {
    pub bytes: Vec<u8>,
    /// Entry names in archive order.
    pub entries: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Packs every job that has an output into one DEFLATE zip, in job order.
///
/// Every job reserves its deduplicated name, with or without output, so the
/// entry names do not depend on which siblings happened to finish. Jobs
/// without output add no entry; no outputs at all yields a valid empty zip.
pub fn build_archive(
    jobs: &[JobRecord],
    options: &ArchiveOptions,
) -> Result<BuiltArchive, ArchiveError> {
    let file_options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(options.compression_level));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let mut used: HashSet<String> = HashSet::with_capacity(jobs.len());
    let mut entries = Vec::new();

    for job in jobs {
        let name = unique_name(&used, &job.origin().name);
        used.insert(name.clone());
        let Some(output) = job.output() else {
            pipeline_debug!("Skipping job {} without output", job.key());
            continue;
        };
        writer.start_file(name.as_str(), file_options)?;
        writer.write_all(&output.bytes)?;
        entries.push(name);
    }

    let bytes = writer.finish()?.into_inner();
    Ok(BuiltArchive { bytes, entries })
}

/// Runs [`build_archive`] on the blocking pool.
pub async fn build_archive_blocking(
    jobs: Snapshot,
    options: ArchiveOptions,
) -> Result<BuiltArchive, ArchiveError> {
    tokio::task::spawn_blocking(move || build_archive(&jobs, &options)).await?
}
