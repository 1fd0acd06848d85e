//! Response framing for NNTP carried over a message-oriented transport
//! ([RFC 3977 §3.1](https://datatracker.ietf.org/doc/html/rfc3977#section-3.1)).
//!
//! Transport messages do not respect line boundaries. The assembler buffers
//! raw chunks, consumes complete CRLF-terminated lines and emits one event per
//! finished response, without performing I/O.

use std::collections::VecDeque;

use crate::model::{CommandResponse, NntpResponse};

/// Status codes announcing a multi-line data block
/// ([RFC 3977 §3.2](https://datatracker.ietf.org/doc/html/rfc3977#section-3.2)).
const MULTI_LINE_CODES: &[u16] = &[100, 101, 215, 220, 221, 222, 224, 225, 230, 231];

/// Service-ready greetings sent unsolicited when the connection opens
/// ([RFC 3977 §5.1](https://datatracker.ietf.org/doc/html/rfc3977#section-5.1)).
/// The same codes answer `MODE READER`, so only the first status line can be
/// a greeting.
const GREETING_CODES: &[u16] = &[200, 201];

const LINE_END: &str = "\r\n";
const TERMINATOR: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtoError {
    MalformedStatusLine(String),
    Desync { code: u16 },
    ConnectionClosed(String),
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Greeting { code: u16, text: String },
    Response(CommandResponse),
    Error(ProtoError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    AwaitStatus,
    ReadingBody,
}

#[derive(Debug, Default)]
pub struct FrameAssembler {
    state: State,
    carryover: String,
    code: u16,
    lines: Vec<String>,
    events: VecDeque<Event>,
    greeted: bool,
}

impl FrameAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw transport message.
    pub fn push_chunk(&mut self, raw: &str) {
        self.carryover.push_str(raw);
        while let Some(pos) = self.carryover.find(LINE_END) {
            let line = self.carryover[..pos].to_string();
            self.carryover.drain(..pos + LINE_END.len());
            self.handle_line(line);
        }
    }

    pub fn poll_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Feed one chunk and return the first event it completed, if any.
    ///
    /// Further events finished by the same chunk stay queued for
    /// [`poll_event`](Self::poll_event).
    pub fn on_chunk(&mut self, raw: &str) -> Option<Event> {
        self.push_chunk(raw);
        self.poll_event()
    }

    /// Whether part of a response has been received but not yet emitted.
    pub fn is_mid_frame(&self) -> bool {
        self.state == State::ReadingBody || !self.carryover.is_empty()
    }

    fn handle_line(&mut self, line: String) {
        match self.state {
            State::AwaitStatus => {
                if line.is_empty() {
                    tracing::trace!("ignoring blank line between responses");
                    return;
                }
                let first = !std::mem::replace(&mut self.greeted, true);
                match parse_response(&line) {
                    Ok(resp) if first && GREETING_CODES.contains(&resp.code) => {
                        self.events.push_back(Event::Greeting {
                            code: resp.code,
                            text: resp.message,
                        });
                    }
                    Ok(resp) if has_body(resp.code) => {
                        self.code = resp.code;
                        self.lines = vec![line];
                        self.state = State::ReadingBody;
                    }
                    Ok(resp) => {
                        self.events
                            .push_back(Event::Response(CommandResponse {
                                response_code: resp.code,
                                lines: vec![line],
                            }));
                    }
                    Err(e) => self.events.push_back(Event::Error(e)),
                }
            }

            State::ReadingBody if line == TERMINATOR => {
                let mut lines = std::mem::take(&mut self.lines);
                lines.push(line);
                self.events.push_back(Event::Response(CommandResponse {
                    response_code: self.code,
                    lines,
                }));
                self.state = State::AwaitStatus;
            }

            // Dot-unstuffing per RFC 3977 §3.1.1
            // <https://datatracker.ietf.org/doc/html/rfc3977#section-3.1.1>
            State::ReadingBody => {
                let unstuffed = match line.strip_prefix("..") {
                    Some(rest) => format!(".{rest}"),
                    None => line,
                };
                self.lines.push(unstuffed);
            }
        }
    }
}

/// Split a status line into its numeric code and free text.
///
/// The code is the token before the first space.
pub fn parse_response(line: &str) -> Result<NntpResponse, ProtoError> {
    let (token, message) = line.split_once(' ').unwrap_or((line, ""));
    let code = token
        .parse::<u16>()
        .map_err(|_| ProtoError::MalformedStatusLine(line.to_string()))?;
    Ok(NntpResponse {
        code,
        message: message.trim().to_string(),
    })
}

pub fn has_body(code: u16) -> bool {
    MULTI_LINE_CODES.contains(&code)
}
