use std::sync::Arc;

use bytes::Bytes;

pub type JobKey = u64;

/// Identifies one transform submission. A record only accepts the result of
/// its latest ticket.
pub type Ticket = u64;

/// Encoded image bytes plus the pixel dimensions they decode to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
}

impl ImageData {
    pub fn new(bytes: impl Into<Bytes>, width: u32, height: u32) -> Self {
        Self {
            bytes: bytes.into(),
            width,
            height,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn dimension(&self) -> String {
        format!("{}*{}", self.width, self.height)
    }
}

/// The file as it was accepted into the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub name: String,
    pub image: ImageData,
}

impl Origin {
    pub fn new(name: impl Into<String>, image: ImageData) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    /// Accepted but never submitted.
    #[default]
    Pending,
    /// A transform is in flight; any previous output has been dropped.
    Processing,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    key: JobKey,
    origin: Arc<Origin>,
    output: Option<ImageData>,
    status: JobStatus,
    failure: Option<String>,
    ticket: Option<Ticket>,
}

impl JobRecord {
    pub fn new(key: JobKey, origin: Origin) -> Self {
        Self {
            key,
            origin: Arc::new(origin),
            output: None,
            status: JobStatus::Pending,
            failure: None,
            ticket: None,
        }
    }

    /// A record that already carries a finished output, e.g. when a batch is
    /// assembled from results computed elsewhere.
    pub fn completed(key: JobKey, origin: Origin, output: ImageData) -> Self {
        Self {
            output: Some(output),
            status: JobStatus::Done,
            ..Self::new(key, origin)
        }
    }

    pub fn key(&self) -> JobKey {
        self.key
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn shared_origin(&self) -> Arc<Origin> {
        Arc::clone(&self.origin)
    }

    pub fn output(&self) -> Option<&ImageData> {
        self.output.as_ref()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn ticket(&self) -> Option<Ticket> {
        self.ticket
    }

    /// Marks the record as submitted under `ticket`. The previous output is
    /// cleared so it can never be mistaken for the result of this run.
    pub(crate) fn begin(&mut self, ticket: Ticket) {
        self.ticket = Some(ticket);
        self.status = JobStatus::Processing;
        self.output = None;
        self.failure = None;
    }

    /// Applies a transform result. Returns false when `ticket` is not the
    /// record's latest submission, in which case nothing changes.
    pub(crate) fn resolve(&mut self, ticket: Ticket, result: Result<ImageData, String>) -> bool {
        if self.ticket != Some(ticket) || self.status != JobStatus::Processing {
            return false;
        }
        match result {
            Ok(output) => {
                self.output = Some(output);
                self.status = JobStatus::Done;
            }
            Err(message) => {
                self.output = None;
                self.failure = Some(message);
                self.status = JobStatus::Failed;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> JobRecord {
        JobRecord::new(1, Origin::new("a.png", ImageData::new(vec![0u8; 10], 4, 4)))
    }

    #[test]
    fn new_record_is_pending_without_output() {
        let record = record();
        assert_eq!(record.status(), JobStatus::Pending);
        assert!(record.output().is_none());
        assert_eq!(record.origin().image.size(), 10);
        assert_eq!(record.origin().image.dimension(), "4*4");
    }

    #[test]
    fn resubmission_clears_previous_output() {
        let mut record = record();
        record.begin(1);
        assert!(record.resolve(1, Ok(ImageData::new(vec![1u8; 3], 2, 2))));
        assert_eq!(record.status(), JobStatus::Done);

        record.begin(2);
        assert_eq!(record.status(), JobStatus::Processing);
        assert!(record.output().is_none());
    }

    #[test]
    fn superseded_ticket_is_ignored() {
        let mut record = record();
        record.begin(1);
        record.begin(2);
        assert!(!record.resolve(1, Ok(ImageData::new(vec![1u8], 1, 1))));
        assert_eq!(record.status(), JobStatus::Processing);

        assert!(record.resolve(2, Err("decoder exploded".into())));
        assert_eq!(record.status(), JobStatus::Failed);
        assert_eq!(record.failure(), Some("decoder exploded"));
        assert!(record.output().is_none());
    }
}
