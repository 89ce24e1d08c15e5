use http_loadgen::{stats, ClientConfig, LoadHarness};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Minimal always-200 HTTP server: reads one request head, answers with an
/// empty body and closes, mirroring the `Connection: close` contract.
async fn spawn_stub_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut seen = Vec::new();
                let mut buf = [0u8; 4096];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => seen.extend_from_slice(&buf[..n]),
                    }
                    if seen.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let _ = socket
                    .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n")
                    .await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

fn config_for(addr: SocketAddr) -> ClientConfig {
    ClientConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        custom_id: "integration-test-id".to_string(),
        timeout: Duration::from_secs(2),
    }
}

#[tokio::test]
async fn five_clients_three_requests_each_produce_fifteen_unique_results() {
    let addr = spawn_stub_server().await;
    let harness = LoadHarness::new(config_for(addr));

    let outcome = harness.run(5, 3, "GET", "/fast").await;

    assert_eq!(outcome.results.len(), 15);

    let identities: HashSet<(usize, usize)> = outcome
        .results
        .iter()
        .map(|r| (r.client_id, r.sequence))
        .collect();
    assert_eq!(identities.len(), 15, "duplicate (client, sequence) pair");
    for client_id in 0..5 {
        for sequence in 0..3 {
            assert!(identities.contains(&(client_id, sequence)));
        }
    }

    assert!(outcome.results.iter().all(|r| r.success));
    assert!(outcome.results.iter().all(|r| r.status() == 200));

    let summary = stats::summarize(&outcome.results);
    assert_eq!(summary.success_rate, 1.0);
    assert_eq!(summary.total_requests, 15);
    assert_eq!(summary.failed_requests, 0);
}

#[tokio::test]
async fn requests_within_one_client_complete_in_sequence_order() {
    let addr = spawn_stub_server().await;
    let harness = LoadHarness::new(config_for(addr));

    let outcome = harness.run(3, 4, "GET", "/fast").await;

    for client_id in 0..3 {
        let mut trace: Vec<_> = outcome
            .results
            .iter()
            .filter(|r| r.client_id == client_id)
            .collect();
        trace.sort_by_key(|r| r.sequence);

        for pair in trace.windows(2) {
            assert!(
                pair[1].completed_at >= pair[0].completed_at,
                "client {} completed request {} before request {}",
                client_id,
                pair[1].sequence,
                pair[0].sequence
            );
        }
    }
}

#[tokio::test]
async fn pacing_spreads_a_clients_requests_apart() {
    let addr = spawn_stub_server().await;
    let harness =
        LoadHarness::new(config_for(addr)).with_pacing(Some(Duration::from_millis(50)));

    let outcome = harness.run(1, 3, "GET", "/fast").await;

    // Two pacing gaps for three requests.
    assert!(outcome.total_duration >= Duration::from_millis(100));
    assert!(outcome.results.iter().all(|r| r.success));
}

#[tokio::test]
async fn aggregation_is_idempotent_over_a_completed_run() {
    let addr = spawn_stub_server().await;
    let harness = LoadHarness::new(config_for(addr));

    let outcome = harness.run(2, 2, "GET", "/status").await;

    assert_eq!(
        stats::summarize(&outcome.results),
        stats::summarize(&outcome.results)
    );
}
