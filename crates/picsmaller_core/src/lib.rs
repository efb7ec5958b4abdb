//! PicSmaller core: pure batch state machine and view-model helpers.
mod collection;
mod effect;
mod job;
mod metrics;
mod msg;
mod naming;
mod options;
mod state;
mod update;
mod view_model;

pub use collection::{CollectionError, JobCollection, Snapshot};
pub use effect::Effect;
pub use job::{ImageData, JobKey, JobRecord, JobStatus, Origin, Ticket};
pub use metrics::{decrease_rate, format_rate, format_size, SizeTrend};
pub use msg::Msg;
pub use naming::unique_name;
pub use options::{CompressOptions, OptionsError, DEFAULT_QUALITY};
pub use state::{BatchState, BulkAction, Rejection};
pub use update::{update, ARCHIVE_PROGRESS_MESSAGE};
pub use view_model::{BatchViewModel, JobRowView, RateView};
