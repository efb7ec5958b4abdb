use std::sync::Arc;

use bytes::Bytes;

use crate::{CompressOptions, JobKey, Origin, Snapshot, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the transform for `key`; report back with `Msg::TransformDone`
    /// carrying the same `ticket`.
    SubmitTransform {
        key: JobKey,
        ticket: Ticket,
        origin: Arc<Origin>,
        options: CompressOptions,
    },
    ShowProgress { message: String },
    HideProgress,
    /// Build one archive from `snapshot`; report back with `Msg::ArchiveFinished`.
    BuildArchive { snapshot: Snapshot },
    /// Hand one named blob to the download sink.
    SaveFile { name: String, bytes: Bytes },
}
