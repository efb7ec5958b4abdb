use picsmaller_logging::{pipeline_info, pipeline_warn};

use crate::{BatchState, BulkAction, CompressOptions, Effect, Msg, Rejection};

pub const ARCHIVE_PROGRESS_MESSAGE: &str = "Packing compressed images into an archive";

/// Pure update function: applies a message to state and returns any effects.
///
/// Bulk actions are rejected, never queued, while transforms are in flight.
/// A rejection leaves the jobs untouched and is recorded in
/// [`BatchState::last_rejection`].
pub fn update(mut state: BatchState, msg: Msg) -> (BatchState, Vec<Effect>) {
    if msg.is_intent() {
        state.clear_rejection();
    }

    let effects = match msg {
        Msg::FilesAdded(origins) => {
            if origins.is_empty() {
                return (state, Vec::new());
            }
            if let Err(rejection) = state.check(BulkAction::Append) {
                state.reject(rejection);
                return (state, Vec::new());
            }
            let keys: Vec<_> = origins
                .into_iter()
                .map(|origin| state.accept(origin))
                .collect();
            pipeline_info!("Accepted {} file(s) into the batch", keys.len());
            keys.into_iter()
                .filter_map(|key| state.submit(key))
                .collect()
        }
        Msg::RecompressClicked => {
            if let Err(rejection) = state.check(BulkAction::Recompress) {
                state.reject(rejection);
                return (state, Vec::new());
            }
            let keys = state.jobs().keys();
            pipeline_info!("Recompressing {} job(s)", keys.len());
            keys.into_iter()
                .filter_map(|key| state.submit(key))
                .collect()
        }
        Msg::RemoveClicked { key } => {
            state.remove(key);
            Vec::new()
        }
        Msg::ClearClicked => {
            if let Err(rejection) = state.check(BulkAction::Clear) {
                state.reject(rejection);
                return (state, Vec::new());
            }
            state.clear();
            Vec::new()
        }
        Msg::ArchiveClicked => {
            if let Err(rejection) = state.check(BulkAction::Export) {
                state.reject(rejection);
                return (state, Vec::new());
            }
            state.set_exporting(true);
            vec![
                Effect::ShowProgress {
                    message: ARCHIVE_PROGRESS_MESSAGE.to_string(),
                },
                Effect::BuildArchive {
                    snapshot: state.snapshot(),
                },
            ]
        }
        Msg::ArchiveFinished { result } => {
            if !state.is_exporting() {
                return (state, Vec::new());
            }
            match result {
                Ok(entries) => pipeline_info!("Archive built with {} entries", entries),
                Err(err) => pipeline_warn!("Archive build failed: {}", err),
            }
            state.set_exporting(false);
            vec![Effect::HideProgress]
        }
        Msg::DownloadOneClicked { key } => {
            let outcome = match state.jobs().get(key) {
                None => Err(Rejection::UnknownJob { key }),
                Some(record) => match record.output() {
                    Some(output) => Ok(Effect::SaveFile {
                        name: record.origin().name.clone(),
                        bytes: output.bytes.clone(),
                    }),
                    None => Err(Rejection::NotReady { key }),
                },
            };
            match outcome {
                Ok(effect) => vec![effect],
                Err(rejection) => {
                    state.reject(rejection);
                    Vec::new()
                }
            }
        }
        Msg::OptionsChanged(options) => {
            match options.validate() {
                Ok(()) => state.set_options(options),
                Err(err) => state.reject(Rejection::InvalidOptions(err)),
            }
            Vec::new()
        }
        Msg::OptionsReset => {
            state.set_options(CompressOptions::default());
            Vec::new()
        }
        Msg::TransformDone {
            key,
            ticket,
            result,
        } => {
            state.resolve(key, ticket, result);
            Vec::new()
        }
    };

    (state, effects)
}
