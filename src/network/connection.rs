//! RESP Session
//!
//! A blocking, single-connection `StoreSession` over TCP.

use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{FacadeError, Result};
use crate::protocol::{encode_command, read_reply, write_command, Command, Reply};
use crate::session::{BatchKind, StoreSession};

/// Batch state held by the connection
#[derive(Debug)]
enum OpenBatch {
    /// MULTI sent; `queued` commands acknowledged with QUEUED
    Transaction { queued: usize },

    /// Encoded frames waiting to be written in one go
    Pipeline { frames: Vec<Vec<u8>> },
}

/// A connected store session
pub struct RespSession {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Prefix applied to key arguments
    prefix: String,

    /// Peer address for logging
    peer_addr: String,

    /// Open batch, if any
    batch: Option<OpenBatch>,
}

impl RespSession {
    /// Connect to `config.host:config.port` and apply the timeouts
    ///
    /// Does not authenticate or select a database; see
    /// `ConnectionFactory` for the full handshake.
    pub fn connect(config: &Config) -> Result<Self> {
        let stream = open_stream(config)?;
        let mut session = Self::from_stream(stream, config.prefix.clone())?;
        session.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
        Ok(session)
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream, prefix: impl Into<String>) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        tracing::debug!("Connected to {}", peer_addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            prefix: prefix.into(),
            peer_addr,
            batch: None,
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// AUTH with the given password
    pub fn auth(&mut self, password: &str) -> Result<()> {
        self.roundtrip(&Command::Auth {
            password: password.to_string(),
        })?
        .into_result()?;
        tracing::debug!("Authenticated with {}", self.peer_addr);
        Ok(())
    }

    /// SELECT the logical database
    pub fn select(&mut self, db: u32) -> Result<()> {
        self.roundtrip(&Command::Select { db })?.into_result()?;
        tracing::debug!("Selected database {} on {}", db, self.peer_addr);
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Kind of the open batch, if any
    pub fn batch_kind(&self) -> Option<BatchKind> {
        self.batch.as_ref().map(|batch| match batch {
            OpenBatch::Transaction { .. } => BatchKind::Transaction,
            OpenBatch::Pipeline { .. } => BatchKind::Pipeline,
        })
    }

    /// Send one command and wait for its reply
    fn roundtrip(&mut self, command: &Command) -> Result<Reply> {
        tracing::trace!("Sending {} to {}", command.name(), self.peer_addr);
        write_command(&mut self.writer, command, &self.prefix)?;
        self.read_one()
    }

    fn read_one(&mut self) -> Result<Reply> {
        match read_reply(&mut self.reader) {
            Ok(reply) => Ok(reply),
            Err(FacadeError::Io(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                tracing::warn!("Connection to {} closed by peer", self.peer_addr);
                Err(FacadeError::Network(format!(
                    "Connection to {} closed",
                    self.peer_addr
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// Abort whatever batch is open after a transport failure
    fn abort_batch(&mut self, err: FacadeError) -> FacadeError {
        if let Some(kind) = self.batch_kind() {
            tracing::warn!("Aborting {} on {} after failure: {}", kind, self.peer_addr, err);
            self.batch = None;
        }
        err
    }
}

impl StoreSession for RespSession {
    fn call(&mut self, command: Command) -> Result<Reply> {
        if let Some(OpenBatch::Pipeline { ref mut frames }) = self.batch {
            if !command.bypasses_batch() {
                tracing::trace!("Buffering {} in pipeline", command.name());
                frames.push(encode_command(&command, &self.prefix));
                return Ok(Reply::queued());
            }
        }

        let reply = self
            .roundtrip(&command)
            .map_err(|e| self.abort_batch(e))?;
        if let Some(OpenBatch::Transaction { ref mut queued }) = self.batch {
            if !reply.is_error() {
                *queued += 1;
            }
        }
        Ok(reply)
    }

    fn start_batch(&mut self, kind: BatchKind) -> Result<()> {
        if let Some(open) = self.batch_kind() {
            return Err(FacadeError::Protocol(format!(
                "A {} is already open on {}",
                open, self.peer_addr
            )));
        }

        match kind {
            BatchKind::Transaction => {
                self.roundtrip(&Command::Multi)?.into_result()?;
                self.batch = Some(OpenBatch::Transaction { queued: 0 });
            }
            BatchKind::Pipeline => {
                self.batch = Some(OpenBatch::Pipeline { frames: Vec::new() });
            }
        }

        tracing::debug!("Started {} on {}", kind, self.peer_addr);
        Ok(())
    }

    fn execute_batch(&mut self) -> Result<Vec<Reply>> {
        match self.batch.take() {
            None => Err(FacadeError::NoBatch),
            Some(OpenBatch::Transaction { queued }) => {
                tracing::debug!("Executing transaction of {} commands", queued);
                match self.roundtrip(&Command::Exec)? {
                    Reply::Array(Some(replies)) => Ok(replies),
                    // A watched key changed: the server aborted the transaction
                    Reply::Array(None) | Reply::Bulk(None) => {
                        tracing::debug!("Transaction on {} aborted by WATCH", self.peer_addr);
                        Ok(Vec::new())
                    }
                    Reply::Error(message) => Err(FacadeError::Server(message)),
                    other => Err(FacadeError::Protocol(format!(
                        "Unexpected EXEC reply: {:?}",
                        other
                    ))),
                }
            }
            Some(OpenBatch::Pipeline { frames }) => {
                tracing::debug!("Flushing pipeline of {} commands", frames.len());
                for frame in &frames {
                    self.writer.write_all(frame)?;
                }
                self.writer.flush()?;

                let mut replies = Vec::with_capacity(frames.len());
                for _ in 0..frames.len() {
                    replies.push(self.read_one()?);
                }
                Ok(replies)
            }
        }
    }

    fn discard_batch(&mut self) -> Result<()> {
        match self.batch.take() {
            None => Err(FacadeError::NoBatch),
            Some(OpenBatch::Transaction { queued }) => {
                tracing::debug!("Discarding transaction of {} commands", queued);
                self.roundtrip(&Command::Discard)?.into_result()?;
                Ok(())
            }
            Some(OpenBatch::Pipeline { frames }) => {
                tracing::debug!("Dropping pipeline of {} commands", frames.len());
                Ok(())
            }
        }
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Resolve and connect, honouring the connect timeout
fn open_stream(config: &Config) -> Result<TcpStream> {
    let addrs = (config.host.as_str(), config.port)
        .to_socket_addrs()
        .map_err(|e| FacadeError::Network(format!("Cannot resolve {}: {}", config.addr(), e)))?;

    let mut last_err = None;
    for addr in addrs {
        let attempt = if config.connect_timeout_ms > 0 {
            TcpStream::connect_timeout(&addr, Duration::from_millis(config.connect_timeout_ms))
        } else {
            TcpStream::connect(addr)
        };
        match attempt {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    Err(match last_err {
        Some(e) => FacadeError::Network(format!("Cannot connect to {}: {}", config.addr(), e)),
        None => FacadeError::Network(format!("No addresses for {}", config.addr())),
    })
}
