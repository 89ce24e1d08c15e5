//! # HTTP Loadgen Library
//!
//! A concurrent HTTP/1.1 load-generation harness for benchmarking how a
//! server's concurrency model behaves as client pressure grows.
//!
//! The transport is deliberately minimal: one request per connection,
//! `Connection: close` on every request, `Content-Length`-based response
//! framing with a graceful fallback when the peer closes early. There is no
//! chunked transfer-encoding, redirect following, connection reuse or TLS;
//! the target of measurement is the server's concurrency behavior, not
//! client-side connection management.
//!
//! ## Architecture Overview
//!
//! - `http`: request serialization, response parsing/framing, and the
//!   one-shot transport client with per-phase timing
//! - `harness`: virtual-client workers issuing strictly sequential requests
//! - `stats`: summary statistics, latency distributions and repeat
//!   aggregation
//! - `results`: report assembly and JSON output management
//! - `cli`: command-line interface and configuration
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use http_loadgen::{ClientConfig, LoadHarness};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ClientConfig::new("127.0.0.1", 8080, "my-custom-id");
//!     let outcome = LoadHarness::new(config).run(5, 3, "GET", "/fast").await;
//!
//!     let summary = http_loadgen::stats::summarize(&outcome.results);
//!     println!("success rate: {:.1}%", summary.success_rate * 100.0);
//! }
//! ```

/// Command-line interface and configuration
///
/// Argument parsing with clap, the endpoint catalogue, and the internal
/// `LoadTestConfiguration` handed to the rest of the crate.
pub mod cli;

/// Virtual-client load harness
///
/// Spawns independent workers, one per virtual client, and merges their
/// per-worker result vectors after the final join.
pub mod harness;

/// HTTP/1.1 request building, response parsing and the transport client
pub mod http;

/// Log initialization and the colorized line formatter
pub mod logging;

/// Report assembly and JSON output
pub mod results;

/// Summary statistics and latency distributions
pub mod stats;

// Re-export the types most library users need.

pub use cli::{Args, Endpoint, LoadTestConfiguration};
pub use harness::{LoadHarness, LoadTestOutcome};
pub use http::{ClientConfig, HttpClient, HttpRequest, HttpResponse, RequestResult, Timing};
pub use results::{LoadTestReport, ResultsManager};
pub use stats::LoadTestSummary;

/// The current version of the crate, used in report metadata.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// Default target host.
    pub const HOST: &str = "127.0.0.1";

    /// Default target port.
    pub const PORT: u16 = 8080;

    /// Per-connection timeout bounding connect and each send/receive
    /// operation. Ten seconds comfortably exceeds the slowest simulated
    /// endpoint while still letting an unreachable-target sweep finish.
    pub const TIMEOUT: Duration = Duration::from_secs(10);

    /// Requests each virtual client issues per run.
    pub const REQUESTS_PER_CLIENT: usize = 5;

    /// Statistical repeats of every scenario.
    pub const ITERATIONS: usize = 1;

    /// Default output file for the JSON report.
    pub const OUTPUT_FILE: &str = "load_test_results.json";

    /// Pause between statistical repeats of one scenario, giving the target
    /// time to drain half-closed sockets left by `Connection: close`.
    pub const SETTLE_DELAY: Duration = Duration::from_millis(500);
}
