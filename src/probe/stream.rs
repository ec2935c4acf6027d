use futures::{FutureExt, Stream, StreamExt};
use log::{debug, warn};
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::core::types::{ProbeError, ProbeResult};
use crate::probe::engine::{ProbeEngine, reject_invalid, run_probe};
use crate::probe::transport::Probe;

/// Results of a streaming run, in completion order.
///
/// The stream ends once the input is exhausted (or the run was cancelled)
/// and every admitted probe has reported. Dropping it cancels the run:
/// no new address is admitted and in-flight probes finish on their own.
pub struct ProbeStream {
    results: mpsc::Receiver<ProbeResult>,
    cancel: CancellationToken,
}

impl ProbeStream {
    /// Wait for the next completed probe.
    pub async fn next_result(&mut self) -> Option<ProbeResult> {
        self.results.recv().await
    }

    /// Stop admitting addresses. Results already admitted are still delivered.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Stream for ProbeStream {
    type Item = ProbeResult;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().results.poll_recv(cx)
    }
}

impl Drop for ProbeStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl<P: Probe> ProbeEngine<P> {
    /// Probe addresses as they arrive and emit each result when it is ready.
    ///
    /// Admission needs both a free slot on the result queue and a concurrency
    /// token, so a slow consumer throttles admission instead of parking
    /// finished probes. Must be called from within a tokio runtime.
    pub fn probe_stream<S>(&self, addresses: S, cancel: CancellationToken) -> ProbeStream
    where
        S: Stream<Item = String> + Send + 'static,
    {
        // Dropping the stream must not cancel the caller's token
        let cancel = cancel.child_token();
        let (sender, results) = mpsc::channel(self.limit);
        let gate = Arc::new(Semaphore::new(self.limit));
        let probe = Arc::clone(&self.probe);
        let stop = cancel.clone();

        tokio::spawn(async move {
            let mut addresses = std::pin::pin!(addresses);
            let mut in_flight = JoinSet::new();
            let mut admitted_count = 0usize;

            loop {
                let next = tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    next = addresses.next() => next,
                };
                let Some(address) = next else { break };

                let slot = tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    slot = sender.clone().reserve_owned() => match slot {
                        Ok(slot) => slot,
                        // Consumer is gone
                        Err(_) => break,
                    },
                };

                if let Some(rejected) = reject_invalid(&address) {
                    slot.send(rejected);
                    continue;
                }

                let permit = tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    permit = Arc::clone(&gate).acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break,
                    },
                };

                let admitted = Instant::now();
                let probe = Arc::clone(&probe);
                in_flight.spawn(async move {
                    let reported = address.clone();
                    let result = AssertUnwindSafe(run_probe(probe.as_ref(), address, admitted))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| {
                            warn!("Probe task for {reported} panicked");
                            ProbeResult::failed(
                                reported,
                                ProbeError::Transport("probe task panicked".to_string()),
                                admitted.elapsed(),
                            )
                        });
                    drop(permit);
                    slot.send(result);
                });
                admitted_count += 1;

                // Reap finished tasks so the set does not grow with the input
                while in_flight.try_join_next().is_some() {}
            }

            // Output closes once the last reserved slot is used or dropped
            drop(sender);
            while let Some(joined) = in_flight.join_next().await {
                if let Err(err) = joined {
                    warn!("Probe task did not finish: {err}");
                }
            }
            debug!("Streaming run finished after admitting {admitted_count} probe(s)");
        });

        ProbeStream { results, cancel }
    }
}
