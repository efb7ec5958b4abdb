//! PicSmaller engine: transforms, archive export and effect execution.
mod archive;
mod persist;
mod pipeline;
mod sink;
mod transform;

pub use archive::{
    build_archive, build_archive_blocking, ArchiveError, ArchiveOptions, BuiltArchive,
    DEFAULT_ARCHIVE_NAME, DEFAULT_COMPRESSION_LEVEL,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{ArchiveSummary, Pipeline, PipelineBuilder, PipelineError};
pub use sink::{DirectorySink, ExportSink, LogProgressIndicator, ProgressIndicator};
pub use transform::{
    probe_origin, reencode, ImageTransformer, TransformError, TransformFailure, Transformer,
};
