//! Virtual-client load harness.
//!
//! Spawns a fixed number of independent virtual clients, each owning its own
//! [`HttpClient`] and issuing a fixed number of strictly sequential requests.
//! Workers never share a connection and never fail the run: every request
//! produces a [`RequestResult`], and per-worker result vectors are merged
//! once after all workers have joined, so no lock is held on the hot path.

use crate::http::{ClientConfig, HttpClient, HttpRequest, RequestResult};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, warn};

/// Everything a single harness run produces.
#[derive(Debug)]
pub struct LoadTestOutcome {
    /// One entry per issued request, tagged with (client id, sequence id).
    /// Ordering across clients is unspecified; aggregation is
    /// order-independent.
    pub results: Vec<RequestResult>,
    /// Wall-clock time from just before the first worker started to just
    /// after the last worker finished.
    pub total_duration: Duration,
}

/// Concurrent load generator driving one target.
pub struct LoadHarness {
    client_config: ClientConfig,
    pacing: Option<Duration>,
}

impl LoadHarness {
    pub fn new(client_config: ClientConfig) -> Self {
        Self {
            client_config,
            pacing: None,
        }
    }

    /// Optional delay between successive requests of one virtual client.
    /// Applied after every request except a client's last; disabled by
    /// default.
    pub fn with_pacing(mut self, pacing: Option<Duration>) -> Self {
        self.pacing = pacing;
        self
    }

    /// Run `clients` virtual clients of `requests_per_client` sequential
    /// requests each against `method path`.
    ///
    /// Blocks until every worker has issued all of its requests. A slow or
    /// hung request delays only its own worker, and only up to the
    /// per-connection timeout; there is no global deadline.
    pub async fn run(
        &self,
        clients: usize,
        requests_per_client: usize,
        method: &str,
        path: &str,
    ) -> LoadTestOutcome {
        debug!(
            "starting {} clients x {} requests against {} {}",
            clients,
            requests_per_client,
            method,
            self.client_config.address()
        );

        let started = Instant::now();

        let mut workers = Vec::with_capacity(clients);
        for client_id in 0..clients {
            let client = HttpClient::new(self.client_config.clone());
            let method = method.to_string();
            let path = path.to_string();
            let pacing = self.pacing;

            workers.push(tokio::spawn(async move {
                let mut local = Vec::with_capacity(requests_per_client);
                for sequence in 0..requests_per_client {
                    let request = HttpRequest::new(&method, &path);
                    let result = client.send(&request).await.tag(client_id, sequence);
                    debug!(
                        "client {} request {} -> status {} ({})",
                        client_id,
                        sequence,
                        result.status(),
                        if result.success { "ok" } else { "failed" },
                    );
                    local.push(result);

                    if let Some(delay) = pacing {
                        if sequence + 1 < requests_per_client {
                            sleep(delay).await;
                        }
                    }
                }
                local
            }));
        }

        let mut results = Vec::with_capacity(clients * requests_per_client);
        for worker in workers {
            match worker.await {
                Ok(local) => results.extend(local),
                // A worker task can only die by panicking; its requests are
                // simply absent from the collection.
                Err(e) => warn!("virtual client aborted: {}", e),
            }
        }

        LoadTestOutcome {
            results,
            total_duration: started.elapsed(),
        }
    }
}
