use crate::{CompressOptions, ImageData, JobKey, Origin, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a batch of files to append.
    FilesAdded(Vec<Origin>),
    /// User asked to run every job again with the current options.
    RecompressClicked,
    /// User deleted one row.
    RemoveClicked { key: JobKey },
    /// User cleared the batch.
    ClearClicked,
    /// User asked for every finished output as one archive.
    ArchiveClicked,
    /// User asked to save one finished output.
    DownloadOneClicked { key: JobKey },
    /// User confirmed new compression options.
    OptionsChanged(CompressOptions),
    /// User reset compression options to their defaults.
    OptionsReset,
    /// Engine finished one transform submission.
    TransformDone {
        key: JobKey,
        ticket: Ticket,
        result: Result<ImageData, String>,
    },
    /// Engine finished (or failed) building the archive.
    ArchiveFinished { result: Result<usize, String> },
}

impl Msg {
    /// True for messages that originate from the user rather than the engine.
    pub fn is_intent(&self) -> bool {
        !matches!(
            self,
            Msg::TransformDone { .. } | Msg::ArchiveFinished { .. }
        )
    }
}
