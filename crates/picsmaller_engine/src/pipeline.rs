use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use picsmaller_core::{
    unique_name, update, BatchState, BatchViewModel, BulkAction, CompressOptions, Effect, JobKey,
    Msg, OptionsError, Origin, Rejection, Snapshot, Ticket,
};
use picsmaller_logging::{pipeline_error, pipeline_info, pipeline_warn};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::archive::{build_archive_blocking, ArchiveError, ArchiveOptions};
use crate::persist::PersistError;
use crate::sink::{ExportSink, LogProgressIndicator, ProgressIndicator};
use crate::transform::Transformer;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("cannot {action} while jobs are running")]
    Busy { action: BulkAction },
    #[error("an archive is already being built")]
    ExportInProgress,
    #[error("job {0} is not in the batch")]
    UnknownJob(JobKey),
    #[error("job {0} has no output yet")]
    NotReady(JobKey),
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),
    #[error("archive build failed: {0}")]
    Archive(#[from] ArchiveError),
    #[error("export failed: {0}")]
    Sink(#[from] PersistError),
}

impl From<Rejection> for PipelineError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Busy { action } => PipelineError::Busy { action },
            Rejection::ExportInProgress => PipelineError::ExportInProgress,
            Rejection::UnknownJob { key } => PipelineError::UnknownJob(key),
            Rejection::NotReady { key } => PipelineError::NotReady(key),
            Rejection::InvalidOptions(err) => PipelineError::InvalidOptions(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub entries: Vec<String>,
    pub size: u64,
}

/// Builder for [`Pipeline`].
pub struct PipelineBuilder {
    transformer: Arc<dyn Transformer>,
    sink: Arc<dyn ExportSink>,
    indicator: Arc<dyn ProgressIndicator>,
    options: CompressOptions,
    archive: ArchiveOptions,
    runtime: Option<Handle>,
}

impl PipelineBuilder {
    pub fn options(mut self, options: CompressOptions) -> Self {
        self.options = options;
        self
    }

    pub fn archive(mut self, archive: ArchiveOptions) -> Self {
        self.archive = archive;
        self
    }

    pub fn indicator(mut self, indicator: Arc<dyn ProgressIndicator>) -> Self {
        self.indicator = indicator;
        self
    }

    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Without an explicit [`runtime`](Self::runtime) this must be called
    /// from inside a tokio runtime.
    pub fn build(self) -> Result<Pipeline, PipelineError> {
        self.options.validate()?;
        let runtime = self.runtime.unwrap_or_else(Handle::current);
        let (in_flight, _) = watch::channel(0);
        Ok(Pipeline {
            inner: Arc::new(Inner {
                state: Mutex::new(BatchState::with_options(self.options)),
                transformer: self.transformer,
                sink: self.sink,
                indicator: self.indicator,
                archive: self.archive,
                runtime,
                in_flight,
            }),
        })
    }
}

struct Inner {
    state: Mutex<BatchState>,
    transformer: Arc<dyn Transformer>,
    sink: Arc<dyn ExportSink>,
    indicator: Arc<dyn ProgressIndicator>,
    archive: ArchiveOptions,
    runtime: Handle,
    in_flight: watch::Sender<usize>,
}

/// Owns the batch and runs the effects of every state transition.
///
/// All mutation goes through [`update`] under one lock that is never held
/// across an `.await`, so each job transition is atomic. Transforms run as
/// independent tasks and report back by ticket.
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<Inner>,
}

impl Pipeline {
    pub fn builder(transformer: Arc<dyn Transformer>, sink: Arc<dyn ExportSink>) -> PipelineBuilder {
        PipelineBuilder {
            transformer,
            sink,
            indicator: Arc::new(LogProgressIndicator),
            options: CompressOptions::default(),
            archive: ArchiveOptions::default(),
            runtime: None,
        }
    }

    /// Appends `files` to the batch and starts one transform per file.
    pub fn submit_batch(&self, files: Vec<Origin>) -> Result<Vec<JobKey>, PipelineError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let effects = self.dispatch_intent(Msg::FilesAdded(files))?;
        let keys = submitted_keys(&effects);
        self.run_effects(effects);
        Ok(keys)
    }

    /// Runs every job again with the current options. Returns how many jobs
    /// were resubmitted.
    pub fn recompress(&self) -> Result<usize, PipelineError> {
        let effects = self.dispatch_intent(Msg::RecompressClicked)?;
        let count = submitted_keys(&effects).len();
        self.run_effects(effects);
        Ok(count)
    }

    /// Removes one job. Idempotent; a transform still running for it is
    /// left to finish and its result dropped.
    pub fn remove_one(&self, key: JobKey) -> bool {
        let (existed, effects) = {
            let mut guard = self.lock_state();
            let existed = guard.jobs().contains(key);
            let (effects, _) = self.apply(&mut guard, Msg::RemoveClicked { key });
            (existed, effects)
        };
        self.run_effects(effects);
        existed
    }

    pub fn clear_all(&self) -> Result<(), PipelineError> {
        let effects = self.dispatch_intent(Msg::ClearClicked)?;
        self.run_effects(effects);
        Ok(())
    }

    pub fn set_options(&self, options: CompressOptions) -> Result<(), PipelineError> {
        self.dispatch_intent(Msg::OptionsChanged(options))?;
        Ok(())
    }

    pub fn reset_options(&self) {
        self.dispatch(Msg::OptionsReset);
    }

    /// Saves one finished output under its original name.
    pub fn download_one(&self, key: JobKey) -> Result<PathBuf, PipelineError> {
        let effects = self.dispatch_intent(Msg::DownloadOneClicked { key })?;
        let mut saved = None;
        for effect in effects {
            match effect {
                Effect::SaveFile { name, bytes } => {
                    saved = Some(self.inner.sink.save(&name, &bytes)?);
                }
                other => {
                    self.run_effects(vec![other]);
                }
            }
        }
        saved.ok_or(PipelineError::NotReady(key))
    }

    /// Saves every finished output as its own file, deduplicating names
    /// the same way the archive does.
    pub fn export_each(&self) -> Result<Vec<PathBuf>, PipelineError> {
        let snapshot = {
            let state = self.lock_state();
            state.check(BulkAction::Export).map_err(PipelineError::from)?;
            state.snapshot()
        };
        let mut used = HashSet::new();
        let mut paths = Vec::new();
        for job in snapshot.iter() {
            let name = unique_name(&used, &job.origin().name);
            used.insert(name.clone());
            if let Some(output) = job.output() {
                paths.push(self.inner.sink.save(&name, &output.bytes)?);
            }
        }
        Ok(paths)
    }

    /// Packs every finished output into one archive and hands it to the sink.
    ///
    /// Rejected while transforms run or another export is in progress. A
    /// failed build leaves every job as it was.
    ///
    /// The build runs as its own task, so dropping the returned future does
    /// not leave the batch stuck in the exporting state.
    pub async fn export_archive(&self) -> Result<ArchiveSummary, PipelineError> {
        let effects = self.dispatch_intent(Msg::ArchiveClicked)?;
        match self.run_effects(effects) {
            Some(build) => build
                .await
                .unwrap_or_else(|err| Err(ArchiveError::from(err).into())),
            None => Err(PipelineError::ExportInProgress),
        }
    }

    /// Returns the current view if anything changed since the last call.
    pub fn changed_view(&self) -> Option<BatchViewModel> {
        let mut state = self.lock_state();
        state.consume_dirty().then(|| state.view())
    }

    /// Resolves once no transform is in flight.
    pub async fn wait_idle(&self) {
        let mut rx = self.inner.in_flight.subscribe();
        let _ = rx.wait_for(|count| *count == 0).await;
    }

    pub fn has_task_running(&self) -> bool {
        self.lock_state().has_task_running()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock_state().snapshot()
    }

    pub fn view(&self) -> BatchViewModel {
        self.lock_state().view()
    }

    pub fn options(&self) -> CompressOptions {
        self.lock_state().options()
    }

    fn lock_state(&self) -> MutexGuard<'_, BatchState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one transition on already locked state and publishes the new
    /// in-flight count. The rejection is only meaningful for intents.
    fn apply(&self, slot: &mut BatchState, msg: Msg) -> (Vec<Effect>, Option<Rejection>) {
        let (state, effects) = update(std::mem::take(slot), msg);
        let rejection = state.last_rejection().cloned();
        self.inner.in_flight.send_replace(state.in_flight_count());
        *slot = state;
        (effects, rejection)
    }

    fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        self.apply(&mut self.lock_state(), msg).0
    }

    /// Like [`dispatch`](Self::dispatch) for user intents, turning a
    /// recorded rejection into an error.
    fn dispatch_intent(&self, msg: Msg) -> Result<Vec<Effect>, PipelineError> {
        match self.apply(&mut self.lock_state(), msg) {
            (_, Some(rejection)) => Err(rejection.into()),
            (effects, None) => Ok(effects),
        }
    }

    /// Executes effects. An archive build is returned as a handle; dropping
    /// it leaves the build running to completion.
    fn run_effects(
        &self,
        effects: Vec<Effect>,
    ) -> Option<JoinHandle<Result<ArchiveSummary, PipelineError>>> {
        let mut build = None;
        for effect in effects {
            match effect {
                Effect::SubmitTransform {
                    key,
                    ticket,
                    origin,
                    options,
                } => self.spawn_transform(key, ticket, origin, options),
                Effect::ShowProgress { message } => self.inner.indicator.show(&message),
                Effect::HideProgress => self.inner.indicator.hide(),
                Effect::SaveFile { name, bytes } => {
                    if let Err(err) = self.inner.sink.save(&name, &bytes) {
                        pipeline_error!("Failed to save {}: {}", name, err);
                    }
                }
                Effect::BuildArchive { snapshot } => {
                    let pipeline = self.clone();
                    build = Some(
                        self.inner
                            .runtime
                            .spawn(async move { pipeline.write_archive(snapshot).await }),
                    );
                }
            }
        }
        build
    }

    fn spawn_transform(
        &self,
        key: JobKey,
        ticket: Ticket,
        origin: Arc<Origin>,
        options: CompressOptions,
    ) {
        let pipeline = self.clone();
        let transformer = Arc::clone(&self.inner.transformer);
        self.inner.runtime.spawn(async move {
            let name = origin.name.clone();
            // Run the transform in its own task so a panic still resolves the ticket.
            let task = tokio::spawn(async move { transformer.compress(&origin, &options).await });
            let result = match task.await {
                Ok(Ok(output)) => {
                    pipeline_info!(
                        "Job {} ({}) compressed to {} bytes",
                        key,
                        name,
                        output.size()
                    );
                    Ok(output)
                }
                Ok(Err(err)) => {
                    pipeline_warn!("Job {} ({}) failed: {}", key, name, err);
                    Err(err.to_string())
                }
                Err(err) => {
                    pipeline_error!("Job {} ({}) transform task died: {}", key, name, err);
                    Err(format!("transform task failed: {err}"))
                }
            };
            let effects = pipeline.dispatch(Msg::TransformDone {
                key,
                ticket,
                result,
            });
            pipeline.run_effects(effects);
        });
    }

    async fn write_archive(&self, snapshot: Snapshot) -> Result<ArchiveSummary, PipelineError> {
        let options = self.inner.archive.clone();
        let result = match build_archive_blocking(snapshot, options.clone()).await {
            Ok(built) => self
                .inner
                .sink
                .save(&options.archive_name, &built.bytes)
                .map(|path| ArchiveSummary {
                    path,
                    size: built.bytes.len() as u64,
                    entries: built.entries,
                })
                .map_err(PipelineError::from),
            Err(err) => Err(PipelineError::from(err)),
        };
        if let Err(err) = &result {
            pipeline_error!("Archive export failed: {}", err);
        }
        let report = result
            .as_ref()
            .map(|summary| summary.entries.len())
            .map_err(|err| err.to_string());
        let effects = self.dispatch(Msg::ArchiveFinished { result: report });
        self.run_effects(effects);
        result
    }
}

fn submitted_keys(effects: &[Effect]) -> Vec<JobKey> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::SubmitTransform { key, .. } => Some(*key),
            _ => None,
        })
        .collect()
}
