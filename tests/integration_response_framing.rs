use http_loadgen::{ClientConfig, HttpClient, HttpRequest};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::sleep;

async fn read_request_head(socket: &mut TcpStream) {
    let mut seen = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => seen.extend_from_slice(&buf[..n]),
        }
        if seen.windows(4).any(|w| w == b"\r\n\r\n") {
            return;
        }
    }
}

fn client_for(addr: SocketAddr) -> HttpClient {
    HttpClient::new(ClientConfig {
        host: addr.ip().to_string(),
        port: addr.port(),
        custom_id: "framing-test-id".to_string(),
        timeout: Duration::from_secs(2),
    })
}

#[tokio::test]
async fn body_is_reassembled_across_many_small_chunks() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request_head(&mut socket).await;

        // Headers first, then the declared 13 body bytes one at a time with
        // real scheduling gaps, forcing the client through many read calls.
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 13\r\n\r\n")
            .await
            .unwrap();
        socket.flush().await.unwrap();
        for byte in b"{\"ok\": true}\n" {
            sleep(Duration::from_millis(5)).await;
            socket.write_all(&[*byte]).await.unwrap();
            socket.flush().await.unwrap();
        }
        let _ = socket.shutdown().await;
    });

    let result = client_for(addr).send(&HttpRequest::get("/status")).await;

    assert!(result.success, "error: {:?}", result.error);
    let response = result.response.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.header("Content-Length"), Some("13"));
    assert_eq!(response.body.len(), 13);
    assert_eq!(response.body, "{\"ok\": true}\n");
}

#[tokio::test]
async fn close_before_declared_body_completes_is_reported_as_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request_head(&mut socket).await;

        // Declare 64 bytes, deliver 7, then vanish.
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 64\r\n\r\npartial")
            .await
            .unwrap();
        let _ = socket.shutdown().await;
    });

    let result = client_for(addr).send(&HttpRequest::get("/slow")).await;

    assert!(!result.success);
    assert_eq!(result.status(), 0);
    assert!(result
        .error
        .as_deref()
        .unwrap()
        .contains("declared body was complete"));
}

#[tokio::test]
async fn receive_phase_reflects_server_latency() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let delay = Duration::from_millis(80);

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        read_request_head(&mut socket).await;
        sleep(delay).await;
        let _ = socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok")
            .await;
        let _ = socket.shutdown().await;
    });

    let result = client_for(addr).send(&HttpRequest::get("/medium")).await;

    assert!(result.success);
    assert!(result.timing.receive >= delay);
    assert!(result.timing.total >= result.timing.receive);
}
