use crate::metrics::{decrease_rate, format_rate, format_size, SizeTrend};
use crate::{CompressOptions, JobKey, JobRecord, JobStatus, Rejection};

#[derive(Debug, Clone, PartialEq)]
pub struct BatchViewModel {
    pub jobs: Vec<JobRowView>,
    pub job_count: usize,
    pub done_count: usize,
    pub failed_count: usize,
    pub in_flight: usize,
    /// False while any transform is in flight; bulk buttons are disabled.
    pub controls_enabled: bool,
    pub exporting: bool,
    pub progress_message: Option<String>,
    pub last_rejection: Option<Rejection>,
    pub options: CompressOptions,
    pub dirty: bool,
}

impl BatchViewModel {
    /// `finished/total`, where finished counts done and failed rows.
    pub fn progress_hint(&self) -> String {
        format!("{}/{}", self.done_count + self.failed_count, self.job_count)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobRowView {
    pub key: JobKey,
    pub name: String,
    pub status: JobStatus,
    pub dimension: String,
    pub size: String,
    pub new_dimension: Option<String>,
    pub new_size: Option<String>,
    pub decrease: Option<RateView>,
    pub failure: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateView {
    pub rate: f64,
    pub text: String,
    pub trend: SizeTrend,
}

impl JobRowView {
    pub(crate) fn from_record(record: &JobRecord) -> Self {
        let origin = &record.origin().image;
        let output = record.output();
        Self {
            key: record.key(),
            name: record.origin().name.clone(),
            status: record.status(),
            dimension: origin.dimension(),
            size: format_size(origin.size()),
            new_dimension: output.map(|o| o.dimension()),
            new_size: output.map(|o| format_size(o.size())),
            decrease: output.map(|o| {
                let rate = decrease_rate(origin.size(), o.size());
                RateView {
                    rate,
                    text: format_rate(rate),
                    trend: SizeTrend::between(origin.size(), o.size()),
                }
            }),
            failure: record.failure().map(ToOwned::to_owned),
        }
    }
}
