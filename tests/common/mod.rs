//! Shared utilities for integration testing.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};

/// One scripted upstream streaming session.
pub struct StreamSession {
    /// Raw event-stream body chunks, written in order with a short pause
    /// between them so chunk boundaries are exercised.
    pub chunks: Vec<String>,
    /// Keep the connection open after the last chunk instead of closing.
    pub hold_open: bool,
}

/// Start a mock event-stream upstream.
///
/// Requests without `Accept: text/event-stream` are treated as pre-flight
/// probes and answered with an empty 200. Each streaming request consumes
/// the next scripted session; once the script is exhausted the connection
/// is simply held open with no data.
pub async fn start_stream_backend(addr: SocketAddr, sessions: Vec<StreamSession>) {
    let listener = TcpListener::bind(addr).await.unwrap();
    let sessions = Arc::new(Mutex::new(VecDeque::from(sessions)));

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let sessions = sessions.clone();
                    tokio::spawn(async move {
                        let head = read_request_head(&mut socket).await;

                        if !head.to_ascii_lowercase().contains("text/event-stream") {
                            let _ = socket
                                .write_all(
                                    b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                                )
                                .await;
                            let _ = socket.shutdown().await;
                            return;
                        }

                        let _ = socket
                            .write_all(
                                b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n",
                            )
                            .await;

                        let session = sessions.lock().await.pop_front();
                        match session {
                            Some(session) => {
                                for chunk in &session.chunks {
                                    let _ = socket.write_all(chunk.as_bytes()).await;
                                    tokio::time::sleep(Duration::from_millis(10)).await;
                                }
                                if session.hold_open {
                                    tokio::time::sleep(Duration::from_secs(60)).await;
                                }
                                let _ = socket.shutdown().await;
                            }
                            None => {
                                tokio::time::sleep(Duration::from_secs(60)).await;
                                let _ = socket.shutdown().await;
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// A request captured by the recording target backend.
#[derive(Debug)]
pub struct RecordedRequest {
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Start a mock target backend that records every request it receives.
pub async fn start_recording_target(addr: SocketAddr) -> mpsc::UnboundedReceiver<RecordedRequest> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        if let Some(request) = read_request(&mut socket).await {
                            let _ = socket
                                .write_all(
                                    b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                                )
                                .await;
                            let _ = socket.shutdown().await;
                            let _ = tx.send(request);
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    rx
}

/// Read bytes until the end of the request head.
async fn read_request_head(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Read one full request (head + content-length body).
async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let headers: Vec<(String, String)> = head
        .lines()
        .skip(1)
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect();

    let content_length: usize = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or(0);

    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => body.extend_from_slice(&chunk[..n]),
        }
    }
    body.truncate(content_length);

    Some(RecordedRequest { headers, body })
}
