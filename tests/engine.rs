//! Engine tests against real sockets
//!
//! Small TCP servers stand in for remote services so the admission limit,
//! timeouts and dropped connections can be observed from the server side.

mod engine {
    #![allow(non_snake_case)]

    use futures::StreamExt;
    use futures::stream;
    use healthcheck::config::Config;
    use healthcheck::core::types::{ProbeError, ProbeResult};
    use healthcheck::probe::ProbeEngine;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio_util::sync::CancellationToken;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[derive(Clone, Copy)]
    enum Behavior {
        /// Answer 200 after a delay
        Respond(Duration),
        /// Accept and never answer
        Silent,
        /// Read the request, then close without answering
        HangUp,
    }

    struct TestServer {
        base: String,
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        accepted: Arc<AtomicUsize>,
    }

    impl TestServer {
        async fn start(behavior: Behavior) -> std::io::Result<Self> {
            let listener = TcpListener::bind("127.0.0.1:0").await?;
            let base = format!("http://{}", listener.local_addr()?);
            let active = Arc::new(AtomicUsize::new(0));
            let peak = Arc::new(AtomicUsize::new(0));
            let accepted = Arc::new(AtomicUsize::new(0));

            let (a, p, c) = (active.clone(), peak.clone(), accepted.clone());
            tokio::spawn(async move {
                while let Ok((socket, _)) = listener.accept().await {
                    c.fetch_add(1, Ordering::SeqCst);
                    let (a, p) = (a.clone(), p.clone());
                    tokio::spawn(handle(socket, behavior, a, p));
                }
            });

            Ok(Self {
                base,
                active,
                peak,
                accepted,
            })
        }

        fn addresses(&self, count: usize) -> Vec<String> {
            (0..count).map(|i| format!("{}/{i}", self.base)).collect()
        }
    }

    async fn handle(
        mut socket: TcpStream,
        behavior: Behavior,
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    ) {
        if read_request(&mut socket).await.is_err() {
            return;
        }

        match behavior {
            Behavior::Respond(delay) => {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                // Leave the count before the client can see the answer
                active.fetch_sub(1, Ordering::SeqCst);
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                    )
                    .await;
                let _ = socket.shutdown().await;
            }
            Behavior::Silent => {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Behavior::HangUp => drop(socket),
        }
    }

    async fn read_request(socket: &mut TcpStream) -> std::io::Result<()> {
        let mut request = Vec::new();
        let mut buffer = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let read = socket.read(&mut buffer).await?;
            if read == 0 {
                return Err(std::io::ErrorKind::UnexpectedEof.into());
            }
            request.extend_from_slice(&buffer[..read]);
        }
        Ok(())
    }

    fn engine(concurrency: usize, timeout: u64) -> healthcheck::Result<ProbeEngine> {
        ProbeEngine::from_config(&Config {
            concurrency: Some(concurrency),
            timeout: Some(timeout),
            ..Config::default()
        })
    }

    fn refused_address() -> std::io::Result<String> {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        drop(listener);
        Ok(format!("http://127.0.0.1:{port}/"))
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_probe_batch__server_never_sees_more_than_limit() -> TestResult {
        let server = TestServer::start(Behavior::Respond(Duration::from_millis(50))).await?;
        let engine = engine(64, 5)?;

        let results = engine.probe_batch(&server.addresses(200)).await;

        assert_eq!(results.len(), 200);
        assert!(results.iter().all(|r| r.status_code() == Some(200)));
        let peak = server.peak.load(Ordering::SeqCst);
        assert!(peak <= 64, "server saw {peak} concurrent requests");
        assert!(peak > 1, "requests were never concurrent");
        assert_eq!(server.active.load(Ordering::SeqCst), 0);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_probe_stream__server_never_sees_more_than_limit() -> TestResult {
        let server = TestServer::start(Behavior::Respond(Duration::from_millis(20))).await?;
        let engine = engine(8, 5)?;

        let results: Vec<ProbeResult> = engine
            .probe_stream(stream::iter(server.addresses(60)), CancellationToken::new())
            .collect()
            .await;

        assert_eq!(results.len(), 60);
        let peak = server.peak.load(Ordering::SeqCst);
        assert!(peak <= 8, "server saw {peak} concurrent requests");
        Ok(())
    }

    #[tokio::test]
    async fn test_probe_batch__latency_covers_remote_delay() -> TestResult {
        let delay = Duration::from_millis(100);
        let server = TestServer::start(Behavior::Respond(delay)).await?;
        let engine = engine(4, 5)?;

        let results = engine.probe_batch(&server.addresses(2)).await;

        for result in &results {
            assert_eq!(result.status_code(), Some(200));
            assert!(result.latency >= delay, "latency {:?}", result.latency);
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_probe_batch__silent_server_times_out() -> TestResult {
        let server = TestServer::start(Behavior::Silent).await?;
        let engine = engine(4, 1)?;

        let started = Instant::now();
        let results = engine.probe_batch(&server.addresses(3)).await;

        assert_eq!(results.len(), 3);
        for result in &results {
            assert_eq!(result.error(), Some(&ProbeError::Timeout));
        }
        // All three waited in parallel
        assert!(started.elapsed() < Duration::from_secs(3));
        Ok(())
    }

    #[tokio::test]
    async fn test_probe_batch__closed_connection_is_a_failure() -> TestResult {
        let server = TestServer::start(Behavior::HangUp).await?;
        let engine = engine(4, 2)?;

        let results = engine.probe_batch(&server.addresses(1)).await;

        let error = results[0].error().expect("probe should have failed");
        assert_ne!(error, &ProbeError::Timeout);
        assert!(server.accepted.load(Ordering::SeqCst) >= 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_probe_batch__ok_ok_unreachable() -> TestResult {
        let server = TestServer::start(Behavior::Respond(Duration::ZERO)).await?;
        let engine = engine(4, 2)?;
        let mut input = server.addresses(2);
        input.push(refused_address()?);

        let results = engine.probe_batch(&input).await;

        assert_eq!(results[0].status_code(), Some(200));
        assert_eq!(results[1].status_code(), Some(200));
        assert!(matches!(results[2].error(), Some(ProbeError::Connect(_))));
        assert_eq!(results[2].status_code(), None);
        Ok(())
    }

    #[tokio::test]
    async fn test_probe_batch__invalid_addresses_never_connect() -> TestResult {
        let server = TestServer::start(Behavior::Respond(Duration::ZERO)).await?;
        let engine = engine(4, 2)?;
        let input = vec![
            String::new(),
            "not-a-url".to_string(),
            server.base.replace("http://", "ftp://"),
        ];

        let results = engine.probe_batch(&input).await;

        assert!(
            results
                .iter()
                .all(|r| matches!(r.error(), Some(ProbeError::InvalidAddress(_))))
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(server.accepted.load(Ordering::SeqCst), 0);
        Ok(())
    }
}
