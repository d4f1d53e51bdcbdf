mod accumulator;
mod cli;
mod config;
mod error;
mod event;
mod format;
mod pipeline;
mod record;
mod sink;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, FormatterArg};
use config::ProdrecConfig;
use error::ProdrecError;
use format::FormatterKind;
use pipeline::{InboundMessage, Pipeline};
use sink::{FailureLog, HttpRecordSink};
use ui::PipelineProgress;

/// One line of the JSON-lines event stream consumed by `run`.
#[derive(Debug, Deserialize)]
struct EventLine {
    topic: String,
    payload: serde_json::Value,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "prodrec=debug"
    } else {
        "prodrec=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = ProdrecConfig::load()?;
    if let Some(arg) = cli.formatter {
        config.formatter = match arg {
            FormatterArg::Fixed => FormatterKind::Fixed,
            FormatterArg::Nested => FormatterKind::Nested,
        };
    }

    match cli.command {
        Command::Run { file } => run_stream(config, file).await?,
        Command::Status => print_status(&config),
        Command::Demo => demo(&config),
    }

    Ok(())
}

/// Consume the JSON-lines event stream from a file or stdin, funnel it
/// through the single pipeline worker, and deliver finished records.
async fn run_stream(config: ProdrecConfig, file: Option<String>) -> Result<(), ProdrecError> {
    if config.endpoint.is_empty() {
        return Err(ProdrecError::Config(
            "delivery endpoint must not be empty".into(),
        ));
    }

    let sink = Arc::new(HttpRecordSink::new(config.endpoint.clone()));
    let pipeline = Pipeline::new(
        config.formatter.build(),
        sink,
        config.retry_policy(),
        FailureLog::new(&config.failure_log),
        config.status_topic.clone(),
        config.telemetry_topic.clone(),
    );

    let (tx, rx) = mpsc::channel(256);
    let progress = PipelineProgress::start();
    let worker = tokio::spawn(pipeline.run(rx, Some(progress)));

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match file {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed: EventLine = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(err) => {
                warn!(%err, "skipping malformed event line");
                continue;
            }
        };
        let msg = InboundMessage {
            topic: parsed.topic,
            payload: parsed.payload.to_string().into_bytes(),
        };
        if tx.send(msg).await.is_err() {
            break;
        }
    }
    drop(tx);

    worker.await.expect("pipeline worker panicked");
    Ok(())
}

/// Print the effective configuration.
fn print_status(config: &ProdrecConfig) {
    println!("endpoint:        {}", config.endpoint);
    println!("status topic:    {}", config.status_topic);
    println!("telemetry topic: {}", config.telemetry_topic);
    println!("formatter:       {:?}", config.formatter);
    println!(
        "delivery:        {} attempts, {}ms delay",
        config.max_attempts, config.delay_ms
    );
    println!("failure log:     {}", config.failure_log);
}

/// Built-in demonstration: one scripted job lifecycle pushed through the
/// normalizer and accumulator, with the finalized document printed
/// instead of delivered.
fn demo(config: &ProdrecConfig) {
    use accumulator::JobAccumulator;
    use chrono::{Duration, Utc};
    use event::EventNormalizer;
    use serde_json::json;

    let formatter = config.formatter.build();
    let mut acc = JobAccumulator::new();
    let t0 = Utc::now() - Duration::seconds(15);

    let statuses = [
        json!({"status": "PENDING", "timestamp": t0.to_rfc3339(), "job": "DEMO-1"}),
        json!({"status": "STARTED", "timestamp": (t0 + Duration::seconds(5)).to_rfc3339()}),
    ];
    let samples = [
        json!({"Filterzustand": 3.0, "Time": (t0 + Duration::seconds(6)).to_rfc3339()}),
        json!({"Filterzustand": 5.0, "Time": (t0 + Duration::seconds(7)).to_rfc3339()}),
    ];
    let finish = json!({"status": "FINISHED", "timestamp": (t0 + Duration::seconds(15)).to_rfc3339()});

    for payload in &statuses {
        let event = EventNormalizer::normalize_status(payload.as_object().unwrap());
        println!("  status {} @ {}", event.status, event.timestamp);
        acc.apply_status(&event);
    }
    for payload in &samples {
        let sample = EventNormalizer::normalize_telemetry(payload.as_object().unwrap());
        println!("  telemetry {:?}", sample.value);
        acc.apply_telemetry(&sample);
    }
    let event = EventNormalizer::normalize_status(finish.as_object().unwrap());
    println!("  status {} @ {}", event.status, event.timestamp);

    if let Some(record) = acc.apply_status(&event) {
        let green = console::Style::new().green().bold();
        println!();
        println!("{}", green.apply_to("─── Production Record ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(&formatter.format(&record)).unwrap_or_default()
        );
    }
}
