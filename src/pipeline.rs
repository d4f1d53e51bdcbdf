use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::accumulator::JobAccumulator;
use crate::event::EventNormalizer;
use crate::format::RecordFormatter;
use crate::sink::{FailureLog, RecordSubmitter, RetryPolicy, deliver_with_retry};
use crate::ui::PipelineProgress;

/// A raw inbound message from the transport layer: the logical topic it
/// arrived on plus its undecoded JSON payload.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// How a single inbound message was processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    StatusApplied,
    TelemetryApplied,
    /// A status event closed the current job and a record left the core.
    RecordEmitted(String),
    /// Unknown topic or undecodable payload.
    Ignored,
}

/// Counters reported when the inbound channel closes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub messages: u64,
    pub records: u64,
    pub failed_deliveries: u64,
}

/// The single serialization point in front of the accumulator.
///
/// All inbound messages are applied strictly in arrival order by one
/// consumer; bucket attribution depends on the previous anchor, so the
/// accumulator must never see concurrent calls. Finished records are
/// formatted and handed to the delivery path as spawned tasks, so a slow
/// or failing sink never stalls consumption.
pub struct Pipeline<S: RecordSubmitter + Send + Sync + 'static> {
    accumulator: JobAccumulator,
    formatter: Box<dyn RecordFormatter>,
    sink: Arc<S>,
    policy: RetryPolicy,
    failure_log: FailureLog,
    status_topic: String,
    telemetry_topic: String,
    deliveries: JoinSet<bool>,
}

impl<S: RecordSubmitter + Send + Sync + 'static> Pipeline<S> {
    pub fn new(
        formatter: Box<dyn RecordFormatter>,
        sink: Arc<S>,
        policy: RetryPolicy,
        failure_log: FailureLog,
        status_topic: String,
        telemetry_topic: String,
    ) -> Self {
        Self {
            accumulator: JobAccumulator::new(),
            formatter,
            sink,
            policy,
            failure_log,
            status_topic,
            telemetry_topic,
            deliveries: JoinSet::new(),
        }
    }

    /// Process one inbound message. Malformed payloads and unknown
    /// topics are dropped with a warning, never an error.
    pub fn handle_message(&mut self, msg: &InboundMessage) -> Handled {
        let payload: Value = match serde_json::from_slice(&msg.payload) {
            Ok(v) => v,
            Err(err) => {
                warn!(topic = %msg.topic, %err, "invalid JSON payload, dropping message");
                return Handled::Ignored;
            }
        };
        let Some(map) = payload.as_object() else {
            warn!(topic = %msg.topic, "payload is not a JSON object, dropping message");
            return Handled::Ignored;
        };

        if msg.topic == self.status_topic || msg.topic.ends_with("/Status") {
            let event = EventNormalizer::normalize_status(map);
            match self.accumulator.apply_status(&event) {
                Some(record) => {
                    let id = record.id.clone();
                    self.spawn_delivery(self.formatter.format(&record));
                    Handled::RecordEmitted(id)
                }
                None => Handled::StatusApplied,
            }
        } else if msg.topic == self.telemetry_topic || msg.topic.ends_with("/Processdata") {
            let sample = EventNormalizer::normalize_telemetry(map);
            self.accumulator.apply_telemetry(&sample);
            Handled::TelemetryApplied
        } else {
            debug!(topic = %msg.topic, "message on unknown topic ignored");
            Handled::Ignored
        }
    }

    /// Hand a formatted document to the sink without blocking consumption.
    fn spawn_delivery(&mut self, body: Value) {
        let sink = Arc::clone(&self.sink);
        let policy = self.policy.clone();
        let failure_log = self.failure_log.clone();
        self.deliveries
            .spawn(async move { deliver_with_retry(sink.as_ref(), &body, &policy, &failure_log).await });
    }

    /// Wait for all outstanding deliveries, returning how many failed.
    pub async fn drain_deliveries(&mut self) -> u64 {
        let mut failed = 0;
        while let Some(result) = self.deliveries.join_next().await {
            if !result.unwrap_or(false) {
                failed += 1;
            }
        }
        failed
    }

    /// Drain the inbound channel until it closes, then wait for pending
    /// deliveries.
    pub async fn run(
        mut self,
        mut rx: Receiver<InboundMessage>,
        progress: Option<PipelineProgress>,
    ) -> PipelineSummary {
        let mut summary = PipelineSummary::default();
        while let Some(msg) = rx.recv().await {
            summary.messages += 1;
            if let Handled::RecordEmitted(id) = self.handle_message(&msg) {
                summary.records += 1;
                if let Some(p) = &progress {
                    p.record_emitted(&id);
                }
            }
            if let Some(p) = &progress {
                p.update(summary.messages, summary.records);
            }
        }
        summary.failed_deliveries = self.drain_deliveries().await;
        if let Some(p) = &progress {
            p.finish(&summary);
        }
        summary
    }
}
