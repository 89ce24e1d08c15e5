use crate::cli::{Endpoint, LoadTestConfiguration};
use crate::harness::LoadTestOutcome;
use crate::http::RequestResult;
use crate::stats::{self, LatencyDistribution, LoadTestSummary, RepeatStats};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Results of a single harness run (one statistical repeat of a scenario).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationResults {
    pub iteration: usize,
    pub summary: LoadTestSummary,
    pub distribution: LatencyDistribution,
    /// Successful requests per second over the run.
    pub throughput_rps: f64,
    pub total_duration: Duration,
    /// Every per-request outcome, tagged with (client id, sequence id).
    pub results: Vec<RequestResult>,
}

impl IterationResults {
    /// Reduce a harness outcome into its reportable form.
    pub fn from_outcome(
        iteration: usize,
        outcome: LoadTestOutcome,
        percentiles: &[f64],
    ) -> Result<Self> {
        let summary = stats::summarize(&outcome.results);
        let distribution = stats::distribution(&outcome.results, percentiles)?;
        let throughput_rps = stats::throughput(&summary, outcome.total_duration);

        Ok(Self {
            iteration,
            summary,
            distribution,
            throughput_rps,
            total_duration: outcome.total_duration,
            results: outcome.results,
        })
    }
}

/// All statistical repeats of one (endpoint, concurrency) scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResults {
    pub endpoint: Endpoint,
    pub clients: usize,
    pub requests_per_client: usize,
    pub iterations: Vec<IterationResults>,
    pub aggregate: RepeatStats,
}

impl ScenarioResults {
    pub fn new(
        endpoint: Endpoint,
        clients: usize,
        requests_per_client: usize,
        iterations: Vec<IterationResults>,
    ) -> Self {
        let summaries: Vec<LoadTestSummary> =
            iterations.iter().map(|i| i.summary.clone()).collect();

        Self {
            endpoint,
            clients,
            requests_per_client,
            iterations,
            aggregate: stats::aggregate_repeats(&summaries),
        }
    }
}

/// System information for reproducibility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub architecture: String,
    pub cpu_cores: usize,
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            architecture: std::env::consts::ARCH.to_string(),
            cpu_cores: num_cpus::get(),
        }
    }
}

/// Run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub version: String,
    pub run_id: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub target: String,
    pub custom_id: String,
    pub total_scenarios: usize,
    pub system_info: SystemInfo,
}

/// Final consolidated report, the document downstream tooling consumes.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoadTestReport {
    pub metadata: RunMetadata,
    pub configuration: LoadTestConfiguration,
    pub scenarios: Vec<ScenarioResults>,
}

/// Accumulates scenario results and writes the consolidated JSON report.
pub struct ResultsManager {
    output_file: PathBuf,
    configuration: LoadTestConfiguration,
    scenarios: Vec<ScenarioResults>,
}

impl ResultsManager {
    pub fn new(output_file: &Path, configuration: LoadTestConfiguration) -> Self {
        Self {
            output_file: output_file.to_path_buf(),
            configuration,
            scenarios: Vec::new(),
        }
    }

    pub fn add_scenario(&mut self, scenario: ScenarioResults) {
        info!(
            "scenario {} x{} clients: success rate {:.1}%",
            scenario.endpoint,
            scenario.clients,
            scenario.aggregate.success_rate_mean * 100.0
        );
        self.scenarios.push(scenario);
    }

    pub fn scenarios(&self) -> &[ScenarioResults] {
        &self.scenarios
    }

    /// Write the final consolidated report.
    pub fn finalize(self) -> Result<()> {
        let report = LoadTestReport {
            metadata: RunMetadata {
                version: crate::VERSION.to_string(),
                run_id: Uuid::new_v4().to_string(),
                timestamp: chrono::Utc::now(),
                target: format!("{}:{}", self.configuration.host, self.configuration.port),
                custom_id: self.configuration.custom_id.clone(),
                total_scenarios: self.scenarios.len(),
                system_info: SystemInfo::default(),
            },
            configuration: self.configuration,
            scenarios: self.scenarios,
        };

        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&self.output_file, json)?;

        info!("Results written to: {:?}", self.output_file);
        Ok(())
    }
}
