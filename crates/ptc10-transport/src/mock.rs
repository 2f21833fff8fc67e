//! In-memory transport for exercising upper layers without a socket.
//!
//! A [`ScriptedTransport`] replays queued replies and records every frame
//! sent through it. Clones share state, so a test can keep one handle
//! while the driver owns another.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;

use crate::error::{Result, TransportError};
use crate::traits::{ConnectOutcome, Transport};

#[derive(Debug, Default)]
struct ScriptState {
    connected: bool,
    replies: VecDeque<Step>,
    sent: Vec<Bytes>,
    connects: usize,
    refuse_connect: Option<ErrorKind>,
    fail_shutdown: Option<ErrorKind>,
}

#[derive(Debug)]
enum Step {
    Reply(Bytes),
    Fail(ErrorKind),
    Close,
}

/// Scripted in-memory [`Transport`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedTransport {
    /// Create a disconnected transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        // A panic in another test thread must not hide this test's state.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue the bytes returned by the next unanswered `receive`.
    pub fn push_reply(&self, reply: impl Into<Bytes>) -> &Self {
        self.state().replies.push_back(Step::Reply(reply.into()));
        self
    }

    /// Queue an I/O failure for the next unanswered `receive`.
    pub fn push_failure(&self, kind: ErrorKind) -> &Self {
        self.state().replies.push_back(Step::Fail(kind));
        self
    }

    /// Queue a controller-side close for the next unanswered `receive`.
    pub fn push_close(&self) -> &Self {
        self.state().replies.push_back(Step::Close);
        self
    }

    /// Make every subsequent `connect` fail with `kind`.
    pub fn refuse_connect(&self, kind: ErrorKind) -> &Self {
        self.state().refuse_connect = Some(kind);
        self
    }

    /// Make the next `disconnect` report a shutdown failure.
    pub fn fail_shutdown(&self, kind: ErrorKind) -> &Self {
        self.state().fail_shutdown = Some(kind);
        self
    }

    /// Frames sent so far, decoded lossily as text.
    pub fn sent(&self) -> Vec<String> {
        self.state()
            .sent
            .iter()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .collect()
    }

    /// Number of frames sent so far.
    pub fn sent_count(&self) -> usize {
        self.state().sent.len()
    }

    /// Number of `connect` calls that succeeded.
    pub fn connect_count(&self) -> usize {
        self.state().connects
    }

    /// Replies queued but not yet consumed.
    pub fn pending_replies(&self) -> usize {
        self.state().replies.len()
    }
}

impl Transport for ScriptedTransport {
    fn connect(&mut self, host: &str, port: u16) -> Result<ConnectOutcome> {
        let mut state = self.state();
        if let Some(kind) = state.refuse_connect {
            return Err(TransportError::Connect {
                addr: format!("{host}:{port}"),
                source: std::io::Error::from(kind),
            });
        }
        state.connects += 1;
        if state.connected {
            return Ok(ConnectOutcome::AlreadyConnected);
        }
        state.connected = true;
        Ok(ConnectOutcome::Connected)
    }

    fn disconnect(&mut self) -> Result<bool> {
        let mut state = self.state();
        if !state.connected {
            return Ok(false);
        }
        state.connected = false;
        match state.fail_shutdown.take() {
            Some(kind) => Err(TransportError::Io(std::io::Error::from(kind))),
            None => Ok(true),
        }
    }

    fn is_connected(&self) -> bool {
        self.state().connected
    }

    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let mut state = self.state();
        if !state.connected {
            return Err(TransportError::NotConnected);
        }
        state.sent.push(Bytes::copy_from_slice(bytes));
        Ok(())
    }

    fn receive(&mut self) -> Result<Bytes> {
        let mut state = self.state();
        if !state.connected {
            return Err(TransportError::NotConnected);
        }
        match state.replies.pop_front() {
            Some(Step::Reply(bytes)) => Ok(bytes),
            Some(Step::Fail(kind)) => Err(TransportError::Io(std::io::Error::from(kind))),
            Some(Step::Close) => Err(TransportError::Closed),
            // An unscripted receive would block forever on a real socket.
            None => Err(TransportError::Io(std::io::Error::from(ErrorKind::TimedOut))),
        }
    }
}
