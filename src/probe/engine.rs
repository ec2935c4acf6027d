use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::error::Result;
use crate::core::types::{ProbeError, ProbeOutcome, ProbeResult};
use crate::probe::transport::{Probe, Transport};
use crate::validation::check_address;

/// Bounded-concurrency probe engine.
///
/// At most `limit` probes are in flight at any time. Each probe holds one
/// semaphore permit from admission until its outcome is known; the permit is
/// released when the probe task drops it, whatever path the task takes.
pub struct ProbeEngine<P: Probe = Transport> {
    pub(crate) probe: Arc<P>,
    pub(crate) limit: usize,
}

impl<P: Probe> Clone for ProbeEngine<P> {
    fn clone(&self) -> Self {
        Self {
            probe: Arc::clone(&self.probe),
            limit: self.limit,
        }
    }
}

enum Slot {
    Done(ProbeResult),
    Running(JoinHandle<ProbeResult>, Instant),
}

impl ProbeEngine<Transport> {
    /// Build the shared transport once and wrap it in an engine.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = Transport::from_config(config)?;
        Ok(Self::new(transport, config.concurrency_limit()))
    }
}

impl<P: Probe> ProbeEngine<P> {
    pub fn new(probe: P, limit: usize) -> Self {
        Self {
            probe: Arc::new(probe),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Probe every address and return the results in input order.
    ///
    /// The output always has exactly one result per input address.
    pub async fn probe_batch(&self, addresses: &[String]) -> Vec<ProbeResult> {
        self.probe_batch_until(addresses, &CancellationToken::new())
            .await
    }

    /// Like [`probe_batch`](Self::probe_batch), but stops admitting new
    /// addresses once `cancel` fires. Addresses that never got a token come
    /// back as [`ProbeError::Cancelled`]; probes already in flight finish.
    pub async fn probe_batch_until(
        &self,
        addresses: &[String],
        cancel: &CancellationToken,
    ) -> Vec<ProbeResult> {
        let run_started = Instant::now();
        // No point holding more tokens than there are addresses
        let gate = Arc::new(Semaphore::new(self.limit.min(addresses.len()).max(1)));
        let mut slots = Vec::with_capacity(addresses.len());

        for address in addresses {
            if let Some(rejected) = reject_invalid(address) {
                slots.push(Slot::Done(rejected));
                continue;
            }

            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                permit = Arc::clone(&gate).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                slots.push(Slot::Done(ProbeResult::failed(
                    address.clone(),
                    ProbeError::Cancelled,
                    run_started.elapsed(),
                )));
                continue;
            };

            let admitted = Instant::now();
            let probe = Arc::clone(&self.probe);
            let address = address.clone();
            slots.push(Slot::Running(
                tokio::spawn(async move {
                    let result = run_probe(probe.as_ref(), address, admitted).await;
                    drop(permit);
                    result
                }),
                admitted,
            ));
        }

        let mut results = Vec::with_capacity(slots.len());
        for (slot, address) in slots.into_iter().zip(addresses) {
            let result = match slot {
                Slot::Done(result) => result,
                Slot::Running(handle, admitted) => match handle.await {
                    Ok(result) => result,
                    Err(err) => {
                        warn!("Probe task for {address} did not finish: {err}");
                        ProbeResult::failed(
                            address.clone(),
                            ProbeError::Transport(format!("probe task failed: {err}")),
                            admitted.elapsed(),
                        )
                    }
                },
            };
            results.push(result);
        }

        results
    }
}

/// Result for an address that must not reach the network, if it is one.
pub(crate) fn reject_invalid(address: &str) -> Option<ProbeResult> {
    let started = Instant::now();
    check_address(address).err().map(|reason| {
        debug!("Rejected {address:?}: {reason}");
        ProbeResult::failed(address.to_string(), reason.into(), started.elapsed())
    })
}

/// Run one admitted probe and time it from admission to finalisation.
pub(crate) async fn run_probe<P: Probe + ?Sized>(
    probe: &P,
    address: String,
    admitted: Instant,
) -> ProbeResult {
    debug!("Probing {address}");
    let outcome = probe.probe(&address).await;
    let latency = admitted.elapsed();

    match outcome {
        ProbeOutcome::Status(code) => {
            debug!("✓ {address} -> {code} ({}ms)", latency.as_millis());
            ProbeResult::succeeded(address, code, latency)
        }
        ProbeOutcome::Failed(err) => {
            debug!("✗ {address} -> {err}");
            ProbeResult::failed(address, err, latency)
        }
    }
}
