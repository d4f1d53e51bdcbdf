use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::event::{StatusEvent, TelemetrySample};
use crate::record::{ProductionRecord, RecordFinalizer};

use super::category::{StatusCategory, is_start_trigger};

/// Gaps longer than a day between consecutive status events are treated
/// as stale/out-of-order rather than attributed to a bucket.
const MAX_GAP_SECS: f64 = 86_400.0;

/// The mutable per-job state owned by [`JobAccumulator`].
///
/// Exactly one of `active == false` or (`active == true` with
/// `job_start` set) holds. `last_status` and `last_status_at` are either
/// both absent or both present: absent only before the first event of a
/// tracking session or right after a finalize.
#[derive(Debug, Clone)]
pub struct JobState {
    pub active: bool,
    pub job_id: String,
    /// Fallback identifier, monotonically incremented across jobs.
    pub order_sequence: u64,
    pub job_start: Option<DateTime<Utc>>,
    pub last_status: Option<String>,
    pub last_status_at: Option<DateTime<Utc>>,
    pub setup_secs: f64,
    pub production_secs: f64,
    pub delay_secs: f64,
    pub telemetry_sum: f64,
    pub telemetry_count: u64,
}

impl Default for JobState {
    fn default() -> Self {
        Self {
            active: false,
            job_id: String::new(),
            order_sequence: 1,
            job_start: None,
            last_status: None,
            last_status_at: None,
            setup_secs: 0.0,
            production_secs: 0.0,
            delay_secs: 0.0,
            telemetry_sum: 0.0,
            telemetry_count: 0,
        }
    }
}

/// Tracks one production job at a time through its status lifecycle.
///
/// Status events drive the state machine; elapsed time between
/// consecutive events is attributed to the bucket of the *outgoing*
/// status, because that interval was spent in the previous state.
/// Telemetry samples only accumulate while a job is open. A
/// FINISH-category status while a job is open finalizes it and emits a
/// [`ProductionRecord`].
///
/// Calls are order-sensitive and must be serialized by the caller; the
/// accumulator itself performs no I/O and never blocks.
#[derive(Debug, Default)]
pub struct JobAccumulator {
    state: JobState,
}

impl JobAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the current state, for status reporting.
    #[allow(dead_code)]
    pub fn state(&self) -> &JobState {
        &self.state
    }

    /// Apply one status event. Returns a finalized record when this
    /// event closed the current job, at most once per call.
    pub fn apply_status(&mut self, event: &StatusEvent) -> Option<ProductionRecord> {
        let category = StatusCategory::of(&event.status);

        // Job start: an ACTIVE-set status while no job is open resets
        // all bucket and telemetry accumulation.
        if !self.state.active && is_start_trigger(&event.status) {
            self.state.active = true;
            self.state.job_start = Some(event.timestamp);
            self.state.setup_secs = 0.0;
            self.state.production_secs = 0.0;
            self.state.delay_secs = 0.0;
            self.state.telemetry_sum = 0.0;
            self.state.telemetry_count = 0;
            if !event.job_id.is_empty() {
                self.state.job_id = event.job_id.clone();
            }
            info!(status = %event.status, job_id = %self.state.job_id, "job opened");
        } else {
            debug!(status = %event.status, %category, "status update");
        }

        // First observation: no prior interval to measure, only anchor.
        let (Some(last_status), Some(last_status_at)) =
            (self.state.last_status.clone(), self.state.last_status_at)
        else {
            self.state.last_status = Some(event.status.clone());
            self.state.last_status_at = Some(event.timestamp);
            return None;
        };

        // Attribute the elapsed interval to the outgoing status. Inverted
        // timestamps floor at zero; day-plus gaps are stale data and
        // count as zero instead of corrupting the totals.
        let mut delta =
            (event.timestamp - last_status_at).num_milliseconds().max(0) as f64 / 1000.0;
        if delta > MAX_GAP_SECS {
            warn!(delta_secs = delta, "stale gap between status events, dropping interval");
            delta = 0.0;
        }
        match StatusCategory::of(&last_status) {
            StatusCategory::Setup => self.state.setup_secs += delta,
            StatusCategory::Production => self.state.production_secs += delta,
            StatusCategory::Delay => self.state.delay_secs += delta,
            StatusCategory::Finish | StatusCategory::Other => {}
        }

        self.state.last_status = Some(event.status.clone());
        self.state.last_status_at = Some(event.timestamp);

        // Job finish: finalize, reset, bump the fallback sequence.
        if category == StatusCategory::Finish && self.state.active && self.state.job_start.is_some()
        {
            let record = RecordFinalizer::finalize(&self.state, Utc::now());
            info!(record_id = %record.id, job_id = %record.job_id, "job finalized");
            let order_sequence = self.state.order_sequence + 1;
            self.state = JobState {
                order_sequence,
                ..JobState::default()
            };
            return Some(record);
        }

        None
    }

    /// Apply one telemetry sample. Samples with an absent value, or any
    /// sample arriving while no job is open, are ignored.
    pub fn apply_telemetry(&mut self, sample: &TelemetrySample) {
        if !self.state.active {
            return;
        }
        let Some(value) = sample.value else {
            return;
        };
        self.state.telemetry_sum += value;
        self.state.telemetry_count += 1;
    }
}
