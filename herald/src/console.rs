//! Rehearsal transport that prints segments instead of sending them.

use std::sync::Arc;

use async_trait::async_trait;
use herald_common::outgoing;
use herald_delivery::{Transport, TransportError};
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use ulid::Ulid;

#[derive(Debug, Clone, Default)]
enum Sink {
    #[default]
    Stdout,
    Buffer(Arc<Mutex<String>>),
}

/// Writes each wire-ready segment to standard output and confirms it with a
/// fresh ULID.
#[derive(Debug, Clone, Default)]
pub struct ConsoleTransport {
    sink: Sink,
}

impl ConsoleTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that collects output in memory, readable via [`Self::captured`].
    pub fn buffered() -> Self {
        Self {
            sink: Sink::Buffer(Arc::default()),
        }
    }

    /// Everything written so far, if this transport is buffered.
    pub fn captured(&self) -> Option<String> {
        match &self.sink {
            Sink::Stdout => None,
            Sink::Buffer(buffer) => Some(buffer.lock().clone()),
        }
    }
}

fn render(token: &Ulid, destination: &str, text: &str) -> String {
    format!("--> {destination} [{token}]\n{text}\n\n")
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send(&self, destination: &str, text: &str) -> Result<String, TransportError> {
        let token = Ulid::new();
        let rendered = render(&token, destination, text);

        match &self.sink {
            Sink::Stdout => {
                let mut stdout = tokio::io::stdout();
                stdout
                    .write_all(rendered.as_bytes())
                    .await
                    .map_err(|e| TransportError::other(format!("stdout: {e}")))?;
                stdout
                    .flush()
                    .await
                    .map_err(|e| TransportError::other(format!("stdout: {e}")))?;
            }
            Sink::Buffer(buffer) => buffer.lock().push_str(&rendered),
        }

        outgoing!(destination, %token, "Segment written to console");
        Ok(token.to_string())
    }
}
