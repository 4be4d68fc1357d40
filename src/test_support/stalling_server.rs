//! Raw TCP server whose first asset response never finishes.
//!
//! wiremock always sends complete bodies, so transfers that die mid-body are
//! served by hand here.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use super::socket_guard::should_skip_socket_bound_test;

/// `Content-Length` announced by the stalled response.
const PROMISED_LEN: usize = 100_000;
/// Body bytes sent before the stalled response goes quiet.
const SENT_BEFORE_STALL: usize = 10;

pub(crate) struct StallingServer {
    addr: SocketAddr,
    asset_requests: Arc<AtomicUsize>,
}

impl StallingServer {
    pub(crate) fn uri(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests seen for anything other than a `/book/` landing page.
    pub(crate) fn asset_requests(&self) -> usize {
        self.asset_requests.load(Ordering::SeqCst)
    }

    /// Waits until the first asset request has been answered with its partial body.
    pub(crate) async fn wait_for_stall(&self) {
        for _ in 0..250 {
            if self.asset_requests() > 0 {
                // Let the client drain the bytes that were sent.
                tokio::time::sleep(Duration::from_millis(200)).await;
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("no asset request reached the server");
    }
}

/// Landing pages (`/book/...`) answer at once with an empty page. The first
/// request for any other path gets headers and a few bytes of `body` and then
/// hangs. Every later request gets `body` in full.
pub(crate) async fn start_stalling_server_or_skip(body: &'static [u8]) -> Option<StallingServer> {
    if should_skip_socket_bound_test() {
        return None;
    }
    let listener = TcpListener::bind("127.0.0.1:0").await.ok()?;
    let addr = listener.local_addr().ok()?;
    let asset_requests = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&asset_requests);
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve(stream, Arc::clone(&counter), body));
        }
    });

    Some(StallingServer {
        addr,
        asset_requests,
    })
}

async fn serve(mut stream: TcpStream, asset_requests: Arc<AtomicUsize>, body: &'static [u8]) {
    let Some(path) = read_request_path(&mut stream).await else {
        return;
    };
    if path.starts_with("/book/") {
        let _ = write_complete(&mut stream, b"").await;
        return;
    }
    if asset_requests.fetch_add(1, Ordering::SeqCst) > 0 {
        let _ = write_complete(&mut stream, body).await;
        return;
    }

    let head = format!("HTTP/1.1 200 OK\r\nContent-Length: {PROMISED_LEN}\r\n\r\n");
    let _ = stream.write_all(head.as_bytes()).await;
    let _ = stream
        .write_all(&body[..body.len().min(SENT_BEFORE_STALL)])
        .await;
    let _ = stream.flush().await;
    tokio::time::sleep(Duration::from_secs(60)).await;
}

async fn read_request_path(stream: &mut TcpStream) -> Option<String> {
    let mut request = Vec::new();
    let mut chunk = [0_u8; 1024];
    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        request.extend_from_slice(&chunk[..read]);
    }
    let head = String::from_utf8_lossy(&request);
    head.lines()
        .next()?
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
}

async fn write_complete(stream: &mut TcpStream, body: &[u8]) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(body).await?;
    stream.shutdown().await
}
