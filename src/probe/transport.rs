use async_trait::async_trait;
use log::debug;
use reqwest::redirect::Policy;
use std::time::Duration;

use crate::config::Config;
use crate::core::constants::pool;
use crate::core::error::Result;
use crate::core::types::{ProbeError, ProbeOutcome};

/// One network check against one address.
///
/// The engine only ever talks to this trait, so the admission logic can be
/// exercised without sockets.
#[async_trait]
pub trait Probe: Send + Sync + 'static {
    async fn probe(&self, address: &str) -> ProbeOutcome;
}

/// HTTP transport shared by every probe of a run.
///
/// Cloning is cheap and clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
    probe_timeout: Duration,
}

impl Transport {
    pub fn from_config(config: &Config) -> Result<Self> {
        let max_idle = config.max_idle_connections.unwrap_or(pool::DEFAULT_MAX_IDLE);
        // reqwest only caps idle connections per host; the aggregate cap bounds it
        let max_idle_per_host = config
            .max_idle_per_host
            .unwrap_or(pool::DEFAULT_MAX_IDLE_PER_HOST)
            .min(max_idle);

        let client = reqwest::Client::builder()
            .timeout(config.client_timeout_duration())
            .redirect(Policy::limited(pool::MAX_REDIRECTS))
            .user_agent(config.user_agent())
            .pool_max_idle_per_host(max_idle_per_host)
            .pool_idle_timeout(config.idle_timeout_duration())
            .build()?;

        Ok(Self {
            client,
            probe_timeout: config
                .timeout_duration()
                .min(config.client_timeout_duration()),
        })
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }
}

#[async_trait]
impl Probe for Transport {
    async fn probe(&self, address: &str) -> ProbeOutcome {
        // The per-request timeout covers connecting, headers and the body
        let response = self
            .client
            .get(address)
            .timeout(self.probe_timeout)
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = response.status().as_u16();
                drain(response, address).await;
                ProbeOutcome::Status(status)
            }
            Err(err) => ProbeOutcome::Failed(ProbeError::from_transport(&err)),
        }
    }
}

/// Read the body to the end so the connection can go back to the pool.
async fn drain(mut response: reqwest::Response, address: &str) {
    loop {
        match response.chunk().await {
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(err) => {
                debug!("Failed to drain response body for {address}: {err}");
                break;
            }
        }
    }
}
