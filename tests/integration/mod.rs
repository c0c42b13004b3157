//! Shared helpers for integration tests
//!
//! `FakeIns` listens on a loopback port, accepts one connection per request
//! the way the real INS configuration port does, records every frame and
//! optionally answers it.

use ins_driver::core::protocol::checksum;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// What the fake device does with a received frame
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// Close without answering
    None,
    /// Answer with these bytes
    Bytes(&'static [u8]),
    /// Keep the connection open and never answer
    Silent,
}

/// Loopback stand-in for the INS configuration port
pub struct FakeIns {
    pub port: u16,
    frames: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl FakeIns {
    /// Start listening; `responder` decides the reply for each frame
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let frames = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&frames);

        let task = tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };

                let mut frame = Vec::new();
                let mut buf = [0u8; 256];
                while !frame.ends_with(b"\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => frame.extend_from_slice(&buf[..n]),
                    }
                }

                let text = String::from_utf8_lossy(&frame).into_owned();
                assert!(checksum::verify(&text), "bad checksum on {text:?}");
                let reply = responder(&text);
                recorded.lock().push(text);

                match reply {
                    Reply::None => {}
                    Reply::Bytes(bytes) => {
                        let _ = socket.write_all(bytes).await;
                    }
                    Reply::Silent => {
                        // Hold the socket until the client gives up
                        let _ = socket.read(&mut buf).await;
                    }
                }
            }
        });

        Self { port, frames, task }
    }

    /// Frames received so far
    pub fn frames(&self) -> Vec<String> {
        self.frames.lock().clone()
    }

    /// Wait until at least `count` frames were recorded (or two seconds pass)
    pub async fn wait_for(&self, count: usize) -> Vec<String> {
        let deadline = Instant::now() + Duration::from_secs(2);
        while self.frames.lock().len() < count && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.frames()
    }
}

impl Drop for FakeIns {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A loopback port with nothing listening on it
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
