//! HttpTransport against a minimal local HTTP server.

use serde_json::json;
use sol_rpc::{RpcClient, RpcConfig, RpcError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Read one HTTP request (headers plus `content-length` body).
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Serve `replies` in order, one connection each, and return the requests.
async fn serve(replies: Vec<(u16, String)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for (status, body) in replies {
            let (mut socket, _) = listener.accept().await.unwrap();
            seen.push(read_request(&mut socket).await);
            let response = format!(
                "HTTP/1.1 {status} Status\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
        seen
    });
    (endpoint, handle)
}

fn config(endpoint: &str) -> RpcConfig {
    RpcConfig {
        max_retries: 2,
        retry_base_ms: 1,
        retry_max_ms: 5,
        ..RpcConfig::new(endpoint)
    }
}

#[tokio::test]
async fn retries_server_errors() {
    let ok = json!({"jsonrpc": "2.0", "id": 1, "result": 42}).to_string();
    let (endpoint, server) = serve(vec![(503, "busy".into()), (200, ok)]).await;
    let client = RpcClient::from_config(&config(&endpoint)).unwrap();

    assert_eq!(client.get_slot(None).await.unwrap(), 42);
    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].starts_with("POST / HTTP/1.1"));
    assert!(requests[0].to_ascii_lowercase().contains("content-type: application/json"));
    assert!(requests[1].contains("\"method\":\"getSlot\""));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let (endpoint, server) = serve(vec![(404, "not here".into())]).await;
    let client = RpcClient::from_config(&config(&endpoint)).unwrap();

    match client.get_slot(None).await {
        Err(RpcError::HttpStatus { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "not here");
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
    assert_eq!(server.await.unwrap().len(), 1);
}

#[tokio::test]
async fn extra_headers_are_sent() {
    let ok = json!({"jsonrpc": "2.0", "id": 1, "result": "ok"}).to_string();
    let (endpoint, server) = serve(vec![(200, ok)]).await;
    let mut config = config(&endpoint);
    config.extra_headers.insert("x-api-key".into(), "abc123".into());
    let client = RpcClient::from_config(&config).unwrap();

    assert_eq!(client.get_health().await.unwrap(), "ok");
    let requests = server.await.unwrap();
    assert!(requests[0].to_ascii_lowercase().contains("x-api-key: abc123"));
}
