//! Request/response correlation over a single ordered connection.
//!
//! Every sent command is queued; every assembled response settles the oldest
//! queued command. Responses carry no tag on the wire, so this is only sound
//! while the server answers strictly in request order
//! ([RFC 3977 §3.5](https://datatracker.ietf.org/doc/html/rfc3977#section-3.5)).

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use crate::completer::Completion;
use crate::error::NntpError;
use crate::framer::{Event, FrameAssembler, ProtoError};
use crate::model::{CommandRequest, CommandResponse};
use crate::queue::{PendingCommand, PendingQueue};
use crate::transport::Transport;

#[derive(Debug, Default)]
struct Session {
    pending: PendingQueue,
    framer: FrameAssembler,
    fault: Option<ProtoError>,
}

impl Session {
    /// Mark the session unusable and fail everything still waiting.
    fn poison(&mut self, fault: ProtoError) {
        for cmd in self.pending.drain() {
            cmd.response.fail(fault.clone());
        }
        self.fault = Some(fault);
    }
}

pub struct NntpClient<T: Transport> {
    transport: T,
    session: Mutex<Session>,
    command_timeout: Option<Duration>,
}

impl<T: Transport> NntpClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            session: Mutex::new(Session::default()),
            command_timeout: None,
        }
    }

    pub fn with_command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a command and wait for its response.
    ///
    /// With `strip_framing` the status line and the trailing terminator are
    /// removed so `lines` holds body content only.
    pub async fn send_command<S: AsRef<str>>(
        &self,
        command: &str,
        args: &[S],
        strip_framing: bool,
    ) -> Result<CommandResponse, NntpError> {
        let completion = self.submit(command, args)?;
        self.await_response(completion, strip_framing).await
    }

    /// Send a command without waiting.
    ///
    /// The command is transmitted and queued inside one critical section, so
    /// calls made in sequence are answered in the same sequence.
    pub fn submit<S: AsRef<str>>(
        &self,
        command: &str,
        args: &[S],
    ) -> Result<Completion<CommandResponse>, NntpError> {
        let request = CommandRequest::new(command, args);
        let mut session = self.lock_session();
        if let Some(fault) = &session.fault {
            return Err(proto_to_nntp(fault.clone()));
        }

        self.transport.send(request.to_wire())?;
        tracing::debug!(command = %request, "sent command");

        let pending = PendingCommand::new(request);
        let completion = pending.response.completion();
        session.pending.enqueue(pending);
        Ok(completion)
    }

    pub async fn await_response(
        &self,
        completion: Completion<CommandResponse>,
        strip_framing: bool,
    ) -> Result<CommandResponse, NntpError> {
        let outcome = match self.command_timeout {
            Some(limit) => tokio::time::timeout(limit, completion.wait())
                .await
                .map_err(|_| NntpError::Timeout)?,
            None => completion.wait().await,
        };
        let mut response = outcome.map_err(proto_to_nntp)?;
        if strip_framing {
            response.strip_framing();
        }
        Ok(response)
    }

    /// Handle one inbound transport message.
    ///
    /// Never panics on protocol faults. A response with no queued command
    /// poisons the session and is reported as [`NntpError::Desync`].
    pub fn on_message(&self, text: &str) -> Result<(), NntpError> {
        let mut session = self.lock_session();
        tracing::trace!(bytes = text.len(), "received chunk");
        session.framer.push_chunk(text);

        let mut result = Ok(());
        while let Some(event) = session.framer.poll_event() {
            let (code, outcome) = match event {
                Event::Greeting { code, text } => {
                    tracing::debug!(code, %text, "skipping welcome message");
                    continue;
                }
                Event::Response(resp) => (resp.response_code, Ok(resp)),
                Event::Error(e) => (0, Err(e)),
            };

            match session.pending.dequeue() {
                Some(cmd) => {
                    tracing::debug!(command = %cmd.request, code, "response assembled");
                    cmd.response.settle(outcome);
                }
                None => {
                    tracing::error!(code, "response arrived with no pending command");
                    session.poison(ProtoError::Desync { code });
                    result = Err(NntpError::Desync { code });
                }
            }
        }
        result
    }

    /// Fail every waiting command after the transport went away.
    pub fn on_disconnect(&self, reason: &str) {
        let mut session = self.lock_session();
        if !session.pending.is_empty() {
            tracing::warn!(
                pending = session.pending.len(),
                reason,
                "connection lost with commands outstanding"
            );
        }
        if session.fault.is_none() {
            session.poison(ProtoError::ConnectionClosed(reason.to_string()));
        }
    }

    pub fn pending_len(&self) -> usize {
        self.lock_session().pending.len()
    }

    pub fn is_faulted(&self) -> bool {
        self.lock_session().fault.is_some()
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().expect("nntp session lock")
    }
}

pub(crate) fn proto_to_nntp(e: ProtoError) -> NntpError {
    match e {
        ProtoError::MalformedStatusLine(line) => NntpError::MalformedStatusLine(line),
        ProtoError::Desync { code } => NntpError::Desync { code },
        ProtoError::ConnectionClosed(reason) => NntpError::ConnectionClosed(reason),
        ProtoError::Abandoned => NntpError::ConnectionClosed("request abandoned".into()),
    }
}
