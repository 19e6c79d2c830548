//! stdio session loop
//!
//! A plain thread reads framed messages from the input and hands them over
//! an mpsc channel. The async loop waits on either the next message or the
//! earliest pending publish deadline, whichever comes first.

use super::server::{CnfLanguageServer, ServerAction};
use super::transport::{read_message, write_message};
use crate::error::{CnfError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::io::{BufReader, Read, Write};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

const CHANNEL_CAPACITY: usize = 64;

/// Start a reader thread over `input`.
///
/// The channel closes at end of input or after an I/O error, which is sent
/// as the last item. A malformed frame is sent as a protocol error and
/// reading resumes at the next `Content-Length` header.
pub fn spawn_reader<R>(input: R) -> mpsc::Receiver<Result<String>>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    std::thread::spawn(move || {
        let mut reader = BufReader::new(input);
        loop {
            let item = match read_message(&mut reader) {
                Ok(Some(body)) => Ok(body),
                Ok(None) => break,
                Err(e) => Err(e),
            };
            let fatal = matches!(item, Err(CnfError::Io(_)));
            if tx.blocking_send(item).is_err() || fatal {
                break;
            }
        }
        debug!("Reader thread finished");
    });

    rx
}

/// Server plus its output and pending publishes
pub struct Session<W: Write> {
    server: CnfLanguageServer,
    writer: W,
    pending: HashMap<String, Instant>,
}

impl<W: Write> Session<W> {
    pub fn new(server: CnfLanguageServer, writer: W) -> Self {
        Self {
            server,
            writer,
            pending: HashMap::new(),
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Earliest pending publish deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    pub fn has_pending(&self, uri: &str) -> bool {
        self.pending.contains_key(uri)
    }

    /// Handle one incoming message received at `now`.
    ///
    /// Returns false once the client asked the server to exit.
    pub fn handle_incoming(&mut self, raw: &str, now: Instant) -> Result<bool> {
        for action in self.server.handle_message(raw) {
            match action {
                ServerAction::Send(message) => self.send(&message)?,
                ServerAction::Schedule(uri) => {
                    let deadline = now + self.server.config().debounce();
                    self.pending.insert(uri, deadline);
                }
                ServerAction::Cancel(uri) => {
                    self.pending.remove(&uri);
                }
                ServerAction::Exit => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Publish every document whose deadline is at or before `now`.
    pub fn flush_due(&mut self, now: Instant) -> Result<()> {
        let mut due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(uri, _)| uri.clone())
            .collect();
        due.sort();

        for uri in due {
            self.pending.remove(&uri);
            if let Some(message) = self.server.publish(&uri) {
                self.send(&message)?;
            }
        }
        Ok(())
    }

    /// Run until `exit`, end of input, or an I/O error.
    pub async fn run(&mut self, incoming: &mut mpsc::Receiver<Result<String>>) -> Result<()> {
        loop {
            let deadline = self.next_deadline();

            tokio::select! {
                message = incoming.recv() => match message {
                    Some(Ok(raw)) => {
                        if !self.handle_incoming(&raw, Instant::now())? {
                            info!("Exit requested");
                            break;
                        }
                    }
                    Some(Err(CnfError::Protocol(e))) => warn!("Skipping malformed message: {}", e),
                    Some(Err(e)) => {
                        error!("Input failed: {}", e);
                        return Err(e);
                    }
                    None => {
                        info!("Input closed");
                        break;
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.flush_due(Instant::now())?;
                }
            }
        }
        Ok(())
    }

    fn send(&mut self, message: &Value) -> Result<()> {
        let body = serde_json::to_string(message)?;
        write_message(&mut self.writer, &body)
    }
}

/// Serve the protocol over stdin and stdout until the client exits.
pub async fn serve_stdio(server: CnfLanguageServer) -> Result<()> {
    info!(
        debounce_ms = server.config().debounce_ms,
        "Starting cnf language server"
    );
    let mut incoming = spawn_reader(std::io::stdin());
    let mut session = Session::new(server, std::io::stdout());
    session.run(&mut incoming).await
}
