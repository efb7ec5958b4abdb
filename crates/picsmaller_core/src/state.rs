use std::collections::BTreeMap;
use std::fmt;

use picsmaller_logging::{pipeline_debug, pipeline_warn};

use crate::collection::{JobCollection, Snapshot};
use crate::job::{ImageData, JobKey, JobRecord, JobStatus, Origin, Ticket};
use crate::options::{CompressOptions, OptionsError};
use crate::view_model::{BatchViewModel, JobRowView};
use crate::Effect;

/// Actions that need a quiescent batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Append,
    Recompress,
    Clear,
    Export,
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BulkAction::Append => write!(f, "append"),
            BulkAction::Recompress => write!(f, "recompress"),
            BulkAction::Clear => write!(f, "clear"),
            BulkAction::Export => write!(f, "export"),
        }
    }
}

/// Why an intent was turned into a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Transforms are still in flight.
    Busy { action: BulkAction },
    /// An archive is already being built.
    ExportInProgress,
    UnknownJob { key: JobKey },
    /// The job has no finished output to save.
    NotReady { key: JobKey },
    InvalidOptions(OptionsError),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Busy { action } => write!(f, "cannot {action} while jobs are running"),
            Rejection::ExportInProgress => write!(f, "an archive is already being built"),
            Rejection::UnknownJob { key } => write!(f, "job {key} is not in the batch"),
            Rejection::NotReady { key } => write!(f, "job {key} has no output yet"),
            Rejection::InvalidOptions(err) => write!(f, "invalid options: {err}"),
        }
    }
}

/// The whole batch plus the in-flight bookkeeping that gates bulk actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchState {
    jobs: JobCollection,
    in_flight: BTreeMap<Ticket, JobKey>,
    next_key: JobKey,
    next_ticket: Ticket,
    options: CompressOptions,
    exporting: bool,
    last_rejection: Option<Rejection>,
    dirty: bool,
}

impl Default for BatchState {
    fn default() -> Self {
        Self::with_options(CompressOptions::default())
    }
}

impl BatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CompressOptions) -> Self {
        Self {
            jobs: JobCollection::new(),
            in_flight: BTreeMap::new(),
            next_key: 1,
            next_ticket: 1,
            options,
            exporting: false,
            last_rejection: None,
            dirty: false,
        }
    }

    pub fn jobs(&self) -> &JobCollection {
        &self.jobs
    }

    pub fn snapshot(&self) -> Snapshot {
        self.jobs.snapshot()
    }

    pub fn options(&self) -> CompressOptions {
        self.options
    }

    /// True iff at least one submitted transform has not resolved yet,
    /// including submissions whose job was removed meanwhile.
    pub fn has_task_running(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    pub fn last_rejection(&self) -> Option<&Rejection> {
        self.last_rejection.as_ref()
    }

    /// Checks whether `action` may run right now.
    pub fn check(&self, action: BulkAction) -> Result<(), Rejection> {
        if self.has_task_running() {
            return Err(Rejection::Busy { action });
        }
        if action == BulkAction::Export && self.exporting {
            return Err(Rejection::ExportInProgress);
        }
        Ok(())
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> BatchViewModel {
        let jobs: Vec<JobRowView> = self.jobs.iter().map(JobRowView::from_record).collect();
        let count = |status| jobs.iter().filter(|row| row.status == status).count();
        BatchViewModel {
            job_count: jobs.len(),
            done_count: count(JobStatus::Done),
            failed_count: count(JobStatus::Failed),
            in_flight: self.in_flight.len(),
            controls_enabled: !self.has_task_running(),
            exporting: self.exporting,
            progress_message: self
                .exporting
                .then(|| crate::ARCHIVE_PROGRESS_MESSAGE.to_string()),
            last_rejection: self.last_rejection.clone(),
            options: self.options,
            dirty: self.dirty,
            jobs,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn reject(&mut self, rejection: Rejection) {
        pipeline_debug!("Rejected intent: {}", rejection);
        self.last_rejection = Some(rejection);
        self.mark_dirty();
    }

    pub(crate) fn clear_rejection(&mut self) {
        if self.last_rejection.take().is_some() {
            self.mark_dirty();
        }
    }

    /// Adds a new pending job and returns its key.
    pub(crate) fn accept(&mut self, origin: Origin) -> JobKey {
        loop {
            let key = self.next_key;
            self.next_key += 1;
            match self.jobs.add(JobRecord::new(key, origin.clone())) {
                Ok(()) => {
                    self.mark_dirty();
                    return key;
                }
                Err(err) => {
                    debug_assert!(false, "key generator produced a duplicate: {err}");
                    pipeline_warn!("{}; retrying with a fresh key", err);
                }
            }
        }
    }

    /// Issues a new ticket for `key` and returns the matching submit effect.
    pub(crate) fn submit(&mut self, key: JobKey) -> Option<Effect> {
        let ticket = self.next_ticket;
        let mut origin = None;
        let found = self.jobs.update(key, |record| {
            record.begin(ticket);
            origin = Some(record.shared_origin());
        });
        if !found {
            return None;
        }
        self.next_ticket += 1;
        self.in_flight.insert(ticket, key);
        self.mark_dirty();
        origin.map(|origin| Effect::SubmitTransform {
            key,
            ticket,
            origin,
            options: self.options,
        })
    }

    pub(crate) fn resolve(&mut self, key: JobKey, ticket: Ticket, result: Result<ImageData, String>) {
        if self.in_flight.remove(&ticket).is_none() {
            pipeline_warn!("Ignoring result for unknown ticket {} (job {})", ticket, key);
            return;
        }
        self.mark_dirty();
        let mut applied = false;
        let present = self.jobs.update(key, |record| {
            applied = record.resolve(ticket, result);
        });
        if !present {
            pipeline_debug!("Discarding result for removed job {}", key);
        } else if !applied {
            pipeline_debug!("Discarding superseded result for job {} (ticket {})", key, ticket);
        }
    }

    pub(crate) fn remove(&mut self, key: JobKey) {
        if self.jobs.remove(key).is_some() {
            if self.in_flight.values().any(|k| *k == key) {
                pipeline_debug!("Job {} removed while its transform is in flight", key);
            }
            self.mark_dirty();
        }
    }

    pub(crate) fn clear(&mut self) {
        if !self.jobs.is_empty() {
            self.jobs.clear();
            self.mark_dirty();
        }
    }

    pub(crate) fn set_options(&mut self, options: CompressOptions) {
        if self.options != options {
            self.options = options;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_exporting(&mut self, exporting: bool) {
        self.exporting = exporting;
        self.mark_dirty();
    }
}
