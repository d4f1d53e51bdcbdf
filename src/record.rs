use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::accumulator::JobState;

/// The finalized, immutable summary of one completed job.
///
/// Produced exactly once per job by [`RecordFinalizer`] and handed off
/// to the delivery path; the accumulator never retains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub job_id: String,
    pub setup_seconds: f64,
    pub production_seconds: f64,
    pub delay_seconds: f64,
    pub produced_quantity: f64,
    pub good_quantity: f64,
    pub telemetry_average: Option<f64>,
}

/// Builds the outgoing [`ProductionRecord`] from accumulated job state.
pub struct RecordFinalizer;

impl RecordFinalizer {
    /// Finalize the given state into a record stamped at `now`.
    ///
    /// One job maps to one produced unit, so both quantities are fixed
    /// at 1. The identifier is best-effort unique only: a compact
    /// timestamp plus a random 0..=999 disambiguator.
    pub fn finalize(state: &JobState, now: DateTime<Utc>) -> ProductionRecord {
        let job_id = if state.job_id.is_empty() {
            state.order_sequence.to_string()
        } else {
            state.job_id.clone()
        };

        let telemetry_average = (state.telemetry_count > 0)
            .then(|| round3(state.telemetry_sum / state.telemetry_count as f64));

        ProductionRecord {
            id: generate_record_id(now),
            start_time: state.job_start.unwrap_or(now),
            job_id,
            setup_seconds: round3(state.setup_secs),
            production_seconds: round3(state.production_secs),
            delay_seconds: round3(state.delay_secs),
            produced_quantity: 1.0,
            good_quantity: 1.0,
            telemetry_average,
        }
    }
}

/// `Record<YYYYMMDD-HHMMSS>-<rand>` — collisions are possible, the
/// random suffix only makes them unlikely.
fn generate_record_id(now: DateTime<Utc>) -> String {
    let disambiguator: u32 = rand::thread_rng().gen_range(0..=999);
    format!("Record{}-{}", now.format("%Y%m%d-%H%M%S"), disambiguator)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
