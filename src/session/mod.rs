// src/session/mod.rs

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::sleep;
use tracing::debug;

use crate::error::{PollError, Result};

/// Settle interval after every send. The equipment console has no prompt we
/// can key off, so callers rely on this fixed wait for output to accumulate.
const SETTLE: Duration = Duration::from_millis(200);

/// Inter-character delay used when pacing a command byte-at-a-time.
const PER_CHAR_DELAY: Duration = Duration::from_millis(10);

/// How a command is put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Whole command in one write.
    Block,
    /// One byte per write with a fixed delay between bytes. Needed for the
    /// HSP console, which drops input when it arrives faster than its echo.
    PerChar,
}

/// A line-oriented command session to one piece of ground equipment.
///
/// Deliberately dumb: commands go out CRLF-terminated, and `read_available`
/// returns whatever the receive buffer holds right now. There is no framing,
/// no prompt detection and no retry; callers pace their send/read pairs.
#[derive(Debug)]
pub struct LineSession {
    host: String,
    stream: TcpStream,
}

impl LineSession {
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        let addr = format!("{}:{}", host, port);
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|e| PollError::connection(&addr, e))?;
        debug!(host = %addr, "session open");
        Ok(Self { host: addr, stream })
    }

    /// Send `command` with a CRLF terminator, then wait the settle interval.
    pub async fn send(&mut self, command: &str, pacing: Pacing) -> Result<()> {
        let line = format!("{}\r\n", command);
        match pacing {
            Pacing::Block => {
                self.stream
                    .write_all(line.as_bytes())
                    .await
                    .map_err(|e| PollError::connection(&self.host, e))?;
            }
            Pacing::PerChar => {
                for byte in line.as_bytes() {
                    self.stream
                        .write_all(std::slice::from_ref(byte))
                        .await
                        .map_err(|e| PollError::connection(&self.host, e))?;
                    sleep(PER_CHAR_DELAY).await;
                }
            }
        }
        debug!(host = %self.host, command, "sent");
        sleep(SETTLE).await;
        Ok(())
    }

    /// Snapshot read: drain every byte currently queued on the socket and
    /// return it, without blocking for more. Empty when nothing has arrived.
    /// Invalid UTF-8 from the console is replaced, not rejected.
    pub fn read_available(&mut self) -> Result<String> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            match self.stream.try_read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(PollError::connection(&self.host, e)),
            }
        }
        debug!(host = %self.host, bytes = buf.len(), "read");
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn send_terminates_with_crlf_and_read_drains_queued_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut got = [0u8; 64];
            let n = sock.read(&mut got).await.unwrap();
            assert_eq!(&got[..n], b"bb links\r\n");
            sock.write_all(b"| 1282 |\n\r| 1288 |\n\r").await.unwrap();
            // keep the socket open until the client has read
            tokio::time::sleep(Duration::from_millis(500)).await;
        });

        let mut session = LineSession::connect(&addr.ip().to_string(), addr.port())
            .await
            .unwrap();
        session.send("bb links", Pacing::Block).await.unwrap();
        // give the listener a moment beyond the settle interval
        tokio::time::sleep(Duration::from_millis(100)).await;
        let out = session.read_available().unwrap();
        assert!(out.contains("| 1282 |"));
        assert!(out.contains("| 1288 |"));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn read_available_is_empty_when_nothing_queued() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (_sock, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_millis(500)).await;
        });

        let mut session = LineSession::connect("127.0.0.1", addr.port()).await.unwrap();
        let out = session.read_available().unwrap();
        assert!(out.is_empty());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn connect_to_closed_port_is_a_connection_error() {
        // bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = LineSession::connect("127.0.0.1", port).await.unwrap_err();
        assert!(matches!(err, PollError::Connection { .. }));
    }
}
