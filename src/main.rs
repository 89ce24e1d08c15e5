//! # HTTP Loadgen - Main Entry Point
//!
//! Drives a full load-test sweep against one target server: for every
//! configured endpoint and every concurrency level, the harness runs the
//! configured number of statistical repeats, and the consolidated results
//! are written as a single JSON report.
//!
//! Individual request failures never abort a run; they surface as a reduced
//! success rate in the summary. The only fatal errors are configuration
//! level ones (unwritable output file, invalid arguments).

use anyhow::Result;
use clap::Parser;
use http_loadgen::{
    cli::{Args, LoadTestConfiguration},
    defaults,
    harness::LoadHarness,
    logging,
    results::{IterationResults, ResultsManager, ScenarioResults},
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    info!(
        "Starting HTTP load generation against {}:{}",
        args.host, args.port
    );

    let config = LoadTestConfiguration::from(&args);
    let mut results_manager = ResultsManager::new(&args.output_file, config.clone());
    let harness = LoadHarness::new(config.client_config()).with_pacing(config.pacing);

    for endpoint in &config.endpoints {
        for &clients in &config.clients {
            info!(
                "Scenario {}: {} clients x {} requests, {} iteration(s)",
                endpoint, clients, config.requests_per_client, config.iterations
            );

            let mut iterations = Vec::with_capacity(config.iterations);
            for iteration in 0..config.iterations {
                if iteration > 0 {
                    // Let the target drain half-closed sockets between repeats.
                    tokio::time::sleep(defaults::SETTLE_DELAY).await;
                }

                let outcome = harness
                    .run(
                        clients,
                        config.requests_per_client,
                        &config.method,
                        endpoint.path(),
                    )
                    .await;

                let results =
                    IterationResults::from_outcome(iteration, outcome, &config.percentiles)?;
                log_iteration(&results);
                iterations.push(results);
            }

            results_manager.add_scenario(ScenarioResults::new(
                *endpoint,
                clients,
                config.requests_per_client,
                iterations,
            ));
        }
    }

    results_manager.finalize()?;
    info!("Load test run completed");
    Ok(())
}

fn log_iteration(results: &IterationResults) {
    let summary = &results.summary;
    info!(
        "  {} requests: {} ok, {} failed ({:.1}% success)",
        summary.total_requests,
        summary.successful_requests,
        summary.failed_requests,
        summary.success_rate * 100.0
    );
    if summary.successful_requests > 0 {
        info!(
            "  response time mean {:?}, min {:?}, max {:?}",
            summary.mean_response_time, summary.min_response_time, summary.max_response_time
        );
    }
    info!(
        "  throughput {:.2} req/s over {:?}",
        results.throughput_rps, results.total_duration
    );
}
