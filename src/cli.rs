use crate::http::ClientConfig;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// HTTP Loadgen - a concurrent HTTP/1.1 load-generation harness
#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// Target host
    #[clap(long, default_value = crate::defaults::HOST)]
    pub host: String,

    /// Target port
    #[clap(short = 'p', long, default_value_t = crate::defaults::PORT)]
    pub port: u16,

    /// Precomputed value for the X-Custom-ID header the target validates
    #[clap(long)]
    pub custom_id: String,

    /// Per-connection timeout (e.g. "10s", "500ms")
    #[clap(short = 't', long, value_parser = parse_duration, default_value = "10s")]
    pub timeout: Duration,

    /// Concurrency levels to sweep (space-separated)
    #[clap(short = 'c', long, num_args = 1.., default_values_t = vec![1_usize, 5, 10, 20])]
    pub clients: Vec<usize>,

    /// Requests each virtual client issues per run
    #[clap(short = 'r', long, default_value_t = crate::defaults::REQUESTS_PER_CLIENT)]
    pub requests_per_client: usize,

    /// Endpoints to exercise (space-separated: fast, medium, slow, status)
    #[clap(short = 'e', long, value_enum, num_args = 1.., default_values_t = vec![Endpoint::Fast, Endpoint::Medium, Endpoint::Slow])]
    pub endpoints: Vec<Endpoint>,

    /// HTTP method for every request
    #[clap(long, default_value = "GET")]
    pub method: String,

    /// Statistical repeats of every scenario
    #[clap(short = 'i', long, default_value_t = crate::defaults::ITERATIONS)]
    pub iterations: usize,

    /// Optional delay between successive requests of one virtual client
    #[clap(long, value_parser = parse_duration)]
    pub pacing: Option<Duration>,

    /// Percentiles to calculate for response-time distributions
    #[clap(long, default_values_t = vec![50.0, 95.0, 99.0])]
    pub percentiles: Vec<f64>,

    /// Output file for results (JSON format)
    #[clap(short = 'o', long, default_value = crate::defaults::OUTPUT_FILE)]
    pub output_file: PathBuf,

    /// Verbose output
    #[clap(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

/// Target endpoints with distinct simulated latency profiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Endpoint {
    /// Near-immediate processing
    #[clap(name = "fast")]
    Fast,

    /// Medium simulated processing delay
    #[clap(name = "medium")]
    Medium,

    /// Slow simulated processing delay
    #[clap(name = "slow")]
    Slow,

    /// Status/echo endpoint
    #[clap(name = "status")]
    Status,
}

impl Endpoint {
    /// Request path on the target server.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Fast => "/fast",
            Endpoint::Medium => "/medium",
            Endpoint::Slow => "/slow",
            Endpoint::Status => "/status",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Configuration for the load-test execution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoadTestConfiguration {
    pub host: String,
    pub port: u16,
    pub custom_id: String,
    pub timeout: Duration,
    pub clients: Vec<usize>,
    pub requests_per_client: usize,
    pub endpoints: Vec<Endpoint>,
    pub method: String,
    pub iterations: usize,
    pub pacing: Option<Duration>,
    pub percentiles: Vec<f64>,
}

impl LoadTestConfiguration {
    /// Connection parameters handed to every virtual client.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            host: self.host.clone(),
            port: self.port,
            custom_id: self.custom_id.clone(),
            timeout: self.timeout,
        }
    }
}

impl From<&Args> for LoadTestConfiguration {
    fn from(args: &Args) -> Self {
        Self {
            host: args.host.clone(),
            port: args.port,
            custom_id: args.custom_id.clone(),
            timeout: args.timeout,
            clients: args.clients.clone(),
            requests_per_client: args.requests_per_client,
            endpoints: args.endpoints.clone(),
            method: args.method.clone(),
            iterations: args.iterations,
            pacing: args.pacing,
            percentiles: args.percentiles.clone(),
        }
    }
}

/// Parse duration from string (e.g. "10s", "5m", "500ms")
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Duration cannot be empty".to_string());
    }

    let (num_str, unit) = if let Some(stripped) = s.strip_suffix("ms") {
        (stripped, "ms")
    } else if let Some(stripped) = s.strip_suffix('s') {
        (stripped, "s")
    } else if let Some(stripped) = s.strip_suffix('m') {
        (stripped, "m")
    } else {
        (s, "s") // Default to seconds
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number in duration: {}", num_str))?;

    let duration = match unit {
        "ms" => Duration::from_millis(num as u64),
        "s" => Duration::from_secs(num as u64),
        "m" => Duration::from_secs((num * 60.0) as u64),
        _ => return Err(format!("Invalid duration unit: {}", unit)),
    };

    Ok(duration)
}
