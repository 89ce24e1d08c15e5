use super::{
    request, response, ClientConfig, ClientError, HttpRequest, HttpResponse, RequestResult, Timing,
};
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

const RECV_CHUNK: usize = 4096;

/// One-shot HTTP/1.1 transport client.
///
/// Each call to [`send`](Self::send) opens a fresh connection, transmits a
/// single request and closes the connection, matching the `Connection:
/// close` header it always sends. The client is stateless between requests,
/// so one instance per virtual-client worker parallelizes trivially.
pub struct HttpClient {
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Issue one request over a fresh connection.
    ///
    /// Never returns an error: connect, transport, framing and parse
    /// failures are all folded into a failed [`RequestResult`] carrying a
    /// description, so a worker's remaining iterations are unaffected.
    pub async fn send(&self, request: &HttpRequest) -> RequestResult {
        let started = Instant::now();
        let mut timing = Timing::default();
        let outcome = self.execute(request, &mut timing).await;
        timing.total = started.elapsed();

        match outcome {
            Ok(response) => RequestResult::completed(response, timing),
            Err(error) => {
                debug!("{} {} failed: {}", request.method, request.path, error);
                RequestResult::failed(&error, timing)
            }
        }
    }

    async fn execute(
        &self,
        request: &HttpRequest,
        timing: &mut Timing,
    ) -> Result<HttpResponse, ClientError> {
        let addr = self.config.address();

        let phase = Instant::now();
        let mut stream = match timeout(self.config.timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(ClientError::Connect {
                    addr,
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ClientError::Connect {
                    addr,
                    reason: format!("timed out after {:?}", self.config.timeout),
                })
            }
        };
        timing.connect = phase.elapsed();
        debug!("connected to {} in {:?}", addr, timing.connect);

        // The stream is owned by this scope, so every return path below
        // releases the connection.
        let bytes = request::build(request, &self.config);
        let phase = Instant::now();
        let write = async {
            // write_all completes partial writes until every byte is out.
            stream.write_all(&bytes).await?;
            stream.flush().await
        };
        match timeout(self.config.timeout, write).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(ClientError::Transport {
                    phase: "send",
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ClientError::Transport {
                    phase: "send",
                    reason: format!("timed out after {:?}", self.config.timeout),
                })
            }
        }
        timing.send = phase.elapsed();

        let phase = Instant::now();
        let raw = self.receive(&mut stream).await?;
        timing.receive = phase.elapsed();
        debug!(
            "received {} bytes from {} in {:?}",
            raw.len(),
            addr,
            timing.receive
        );

        let _ = stream.shutdown().await;
        response::parse(&raw)
    }

    /// Accumulate response bytes until the framing rule is satisfied.
    ///
    /// A peer close before the frame is complete, whether the header
    /// terminator never arrived or the declared body was cut short, is a
    /// transport failure, never a false success.
    async fn receive(&self, stream: &mut TcpStream) -> Result<Vec<u8>, ClientError> {
        let mut raw = Vec::with_capacity(RECV_CHUNK);
        let mut chunk = [0u8; RECV_CHUNK];

        loop {
            let read = match timeout(self.config.timeout, stream.read(&mut chunk)).await {
                Ok(Ok(n)) => n,
                Ok(Err(e)) => {
                    return Err(ClientError::Transport {
                        phase: "receive",
                        reason: e.to_string(),
                    })
                }
                Err(_) => {
                    return Err(ClientError::Transport {
                        phase: "receive",
                        reason: format!("timed out after {:?}", self.config.timeout),
                    })
                }
            };

            if read == 0 {
                let reason = if response::has_terminator(&raw) {
                    "connection closed before the declared body was complete"
                } else {
                    "connection closed before the response headers were complete"
                };
                return Err(ClientError::Transport {
                    phase: "receive",
                    reason: reason.to_string(),
                });
            }

            raw.extend_from_slice(&chunk[..read]);
            if response::is_complete(&raw) {
                return Ok(raw);
            }
        }
    }
}
