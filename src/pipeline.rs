//! Run orchestration: address source → validator → engine → sink

use futures::{StreamExt, stream};
use log::debug;
use std::io::{self, Write};
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, InvalidAddressPolicy, RunMode};
use crate::core::error::{HealthCheckError, Result};
use crate::core::types::{ProbeError, ProbeOutcome, ProbeResult};
use crate::discovery::{SourceLine, address_lines, read_addresses};
use crate::probe::{Probe, ProbeEngine};
use crate::reporting::logging::log_skipped_line;
use crate::ui::output::ResultSink;
use crate::validation::is_valid_address;

/// Counts of what happened to each input line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Probes that got a status code (any status)
    pub succeeded: usize,
    /// Probes that failed at the transport level
    pub failed: usize,
    /// Addresses never admitted because the run was cancelled
    pub cancelled: usize,
    /// Input lines rejected by the validator
    pub skipped: usize,
}

impl RunSummary {
    pub fn probed(&self) -> usize {
        self.succeeded + self.failed
    }

    fn record(&mut self, result: &ProbeResult) {
        match &result.outcome {
            ProbeOutcome::Status(_) => self.succeeded += 1,
            ProbeOutcome::Failed(ProbeError::Cancelled) => self.cancelled += 1,
            ProbeOutcome::Failed(_) => self.failed += 1,
        }
    }
}

enum SourceEvent {
    Skipped(SourceLine),
    Unreadable(io::Error),
}

/// Read addresses from `reader`, probe them and write every result to `sink`.
///
/// Only setup problems are errors: an unreadable source, a failing sink, or
/// an invalid address while the abort policy is active. Probe failures are
/// reported through the sink and counted in the summary.
pub async fn run<P, R, W>(
    engine: &ProbeEngine<P>,
    reader: R,
    sink: &mut ResultSink<W>,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<RunSummary>
where
    P: Probe,
    R: AsyncRead + Unpin + Send + 'static,
    W: Write,
{
    let policy = config.invalid_policy();
    let mode = config.run_mode();

    if policy == InvalidAddressPolicy::Skip && mode == RunMode::Stream {
        return run_streaming(engine, reader, sink, cancel).await;
    }

    // Abort and batch both need the whole input before probing starts
    let lines = read_addresses(reader).await?;
    let mut summary = RunSummary::default();
    let mut addresses = Vec::with_capacity(lines.len());

    for line in lines {
        if is_valid_address(&line.address) {
            addresses.push(line.address);
            continue;
        }
        match policy {
            InvalidAddressPolicy::Abort => {
                return Err(HealthCheckError::InvalidAddress {
                    line: line.number,
                    address: line.address,
                });
            }
            InvalidAddressPolicy::Skip => {
                log_skipped_line(&line);
                sink.skipped(&line)?;
                summary.skipped += 1;
            }
        }
    }
    debug!("{} address(es) accepted for probing", addresses.len());

    match mode {
        RunMode::Batch => {
            for result in engine.probe_batch_until(&addresses, cancel).await {
                summary.record(&result);
                sink.emit(&result)?;
            }
        }
        RunMode::Stream => {
            let mut results = engine.probe_stream(stream::iter(addresses), cancel.clone());
            while let Some(result) = results.next_result().await {
                summary.record(&result);
                sink.emit(&result)?;
            }
        }
    }

    Ok(summary)
}

/// Probe lines as they are read. Invalid lines are reported on the way.
async fn run_streaming<P, R, W>(
    engine: &ProbeEngine<P>,
    reader: R,
    sink: &mut ResultSink<W>,
    cancel: &CancellationToken,
) -> Result<RunSummary>
where
    P: Probe,
    R: AsyncRead + Unpin + Send + 'static,
    W: Write,
{
    // Bounded so a slow sink stops the reader instead of queueing diagnostics
    let (events, mut event_rx) = mpsc::channel(engine.limit());
    let addresses = address_lines(reader).filter_map(move |line| {
        let events = events.clone();
        async move {
            let event = match line {
                Ok(line) if is_valid_address(&line.address) => return Some(line.address),
                Ok(line) => SourceEvent::Skipped(line),
                Err(err) => SourceEvent::Unreadable(err),
            };
            let _ = events.send(event).await;
            None
        }
    });

    let mut summary = RunSummary::default();
    let mut unreadable = None;
    let mut results = engine.probe_stream(addresses, cancel.clone());
    let mut source_open = true;

    loop {
        tokio::select! {
            event = event_rx.recv(), if source_open => match event {
                Some(event) => handle_event(event, sink, &mut summary, &mut unreadable)?,
                None => source_open = false,
            },
            result = results.next_result() => match result {
                Some(result) => {
                    summary.record(&result);
                    sink.emit(&result)?;
                }
                None => break,
            },
        }
    }

    // Events are sent before the engine sees the next address, so none are lost
    while let Ok(event) = event_rx.try_recv() {
        handle_event(event, sink, &mut summary, &mut unreadable)?;
    }

    match unreadable {
        Some(err) => Err(HealthCheckError::Io(err)),
        None => Ok(summary),
    }
}

fn handle_event<W: Write>(
    event: SourceEvent,
    sink: &mut ResultSink<W>,
    summary: &mut RunSummary,
    unreadable: &mut Option<io::Error>,
) -> io::Result<()> {
    match event {
        SourceEvent::Skipped(line) => {
            log_skipped_line(&line);
            summary.skipped += 1;
            sink.skipped(&line)
        }
        SourceEvent::Unreadable(err) => {
            *unreadable = Some(err);
            Ok(())
        }
    }
}
