//! Transport layer for MCP JSON-RPC communication.
//!
//! MCP uses newline-delimited JSON over stdin/stdout. Logs must never be
//! written to stdout, it belongs to the protocol stream.
//!
//! Input lines are read off the serving task and delivered through a channel,
//! so `read_message` can be raced against other work without losing data.

use std::io::{self, BufRead};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

/// Lines buffered between the reader and the server loop.
const LINE_BUFFER: usize = 64;

/// Message that can be received from the client.
#[derive(Debug)]
pub enum IncomingMessage {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
}

/// Transport for reading/writing JSON-RPC messages.
pub struct StdioTransport {
    lines: mpsc::Receiver<io::Result<String>>,
    writer: Box<dyn AsyncWrite + Send + Unpin>,
}

impl StdioTransport {
    /// Create a transport using stdin/stdout.
    ///
    /// Stdin is read on a dedicated thread. A blocked read there never holds
    /// up runtime shutdown, so the process can exit while the client still
    /// keeps stdin open.
    pub fn stdio() -> io::Result<Self> {
        let (tx, lines) = mpsc::channel(LINE_BUFFER);

        std::thread::Builder::new()
            .name("mcp-stdin".to_string())
            .spawn(move || forward_stdin(tx))?;

        Ok(Self {
            lines,
            writer: Box::new(tokio::io::stdout()),
        })
    }

    /// Create a transport with custom reader/writer.
    ///
    /// The reader is drained by a task on the current Tokio runtime.
    pub fn new(
        reader: Box<dyn AsyncBufRead + Send + Unpin>,
        writer: Box<dyn AsyncWrite + Send + Unpin>,
    ) -> Self {
        let (tx, lines) = mpsc::channel(LINE_BUFFER);
        tokio::spawn(forward_lines(reader, tx));

        Self { lines, writer }
    }

    /// Read a single JSON-RPC message from the transport.
    ///
    /// Returns `Ok(None)` on EOF. Blank lines are skipped. A line that is
    /// not a JSON-RPC message yields an `InvalidData` error; the transport
    /// stays usable afterwards. Cancel safe.
    pub async fn read_message(&mut self) -> io::Result<Option<IncomingMessage>> {
        loop {
            let line = match self.lines.recv().await {
                Some(line) => line?,
                None => return Ok(None),
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            tracing::debug!("Received: {}", line);

            // Requests carry an id, notifications don't
            if let Ok(request) = serde_json::from_str::<JsonRpcRequest>(line) {
                return Ok(Some(IncomingMessage::Request(request)));
            }

            if let Ok(notification) = serde_json::from_str::<JsonRpcNotification>(line) {
                return Ok(Some(IncomingMessage::Notification(notification)));
            }

            tracing::warn!("Failed to parse message: {}", line);
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid JSON-RPC message: {}", line),
            ));
        }
    }

    /// Write a JSON-RPC response to the transport.
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Serialization error: {}", e))
        })?;

        tracing::debug!("Sending: {}", json);

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    /// Flush and shut down the writing half.
    pub async fn close(&mut self) -> io::Result<()> {
        self.writer.flush().await?;
        self.writer.shutdown().await
    }
}

/// Invalid UTF-8 only spoils one line; any other read error ends the input.
fn is_fatal(err: &io::Error) -> bool {
    err.kind() != io::ErrorKind::InvalidData
}

fn forward_stdin(tx: mpsc::Sender<io::Result<String>>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let fatal = line.as_ref().err().is_some_and(is_fatal);
        if tx.blocking_send(line).is_err() || fatal {
            break;
        }
    }
}

async fn forward_lines(
    mut reader: Box<dyn AsyncBufRead + Send + Unpin>,
    tx: mpsc::Sender<io::Result<String>>,
) {
    loop {
        let mut line = String::new();
        let (item, fatal) = match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => (Ok(line), false),
            Err(e) => {
                let fatal = is_fatal(&e);
                (Err(e), fatal)
            }
        };

        if tx.send(item).await.is_err() || fatal {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::RequestId;
    use std::io::Cursor;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, BufReader};

    fn transport_with_input(input: &str) -> StdioTransport {
        StdioTransport::new(
            Box::new(Cursor::new(input.as_bytes().to_vec())),
            Box::new(tokio::io::sink()),
        )
    }

    #[tokio::test]
    async fn test_read_request() {
        let mut transport =
            transport_with_input("{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n");

        match transport.read_message().await.unwrap() {
            Some(IncomingMessage::Request(req)) => {
                assert_eq!(req.method, "tools/list");
                assert_eq!(req.id, RequestId::Number(1));
            }
            other => panic!("Expected request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_notification() {
        let mut transport =
            transport_with_input("{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n");

        match transport.read_message().await.unwrap() {
            Some(IncomingMessage::Notification(notif)) => {
                assert_eq!(notif.method, "notifications/initialized");
            }
            other => panic!("Expected notification, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_skips_blank_lines() {
        let mut transport =
            transport_with_input("\n   \n{\"jsonrpc\":\"2.0\",\"id\":\"a\",\"method\":\"ping\"}\n");

        let msg = transport.read_message().await.unwrap();
        assert!(matches!(msg, Some(IncomingMessage::Request(_))));
    }

    #[tokio::test]
    async fn test_invalid_line_then_recovers() {
        let mut transport = transport_with_input(
            "not json\n{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n",
        );

        let err = transport.read_message().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let msg = transport.read_message().await.unwrap();
        assert!(matches!(msg, Some(IncomingMessage::Request(_))));
    }

    #[tokio::test]
    async fn test_read_eof() {
        let mut transport = transport_with_input("");
        assert!(transport.read_message().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_is_cancel_safe() {
        let (mut client, server) = tokio::io::duplex(4096);
        let mut transport =
            StdioTransport::new(Box::new(BufReader::new(server)), Box::new(tokio::io::sink()));

        // Half a line arrives, then the read is abandoned
        client.write_all(b"{\"jsonrpc\":\"2.0\",").await.unwrap();
        let abandoned =
            tokio::time::timeout(Duration::from_millis(50), transport.read_message()).await;
        assert!(abandoned.is_err());

        client
            .write_all(b"\"id\":5,\"method\":\"ping\"}\n")
            .await
            .unwrap();

        match transport.read_message().await.unwrap() {
            Some(IncomingMessage::Request(req)) => assert_eq!(req.id, RequestId::Number(5)),
            other => panic!("Expected request, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_write_response() {
        let (mut client, server) = tokio::io::duplex(4096);
        let mut transport = StdioTransport::new(
            Box::new(Cursor::new(Vec::<u8>::new())),
            Box::new(server),
        );

        let response = JsonRpcResponse::success(
            RequestId::Number(1),
            serde_json::json!({"test": true}),
        );
        transport.write_response(&response).await.unwrap();
        transport.close().await.unwrap();

        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();

        assert!(output.ends_with('\n'));
        assert!(output.contains("\"jsonrpc\":\"2.0\""));
        assert!(output.contains("\"id\":1"));
    }
}
