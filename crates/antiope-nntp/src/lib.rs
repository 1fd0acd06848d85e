//! NNTP (Network News Transfer Protocol) client carried over a websocket.
//!
//! Implements the pieces needed to list newsgroups:
//! - Response framing across arbitrary transport chunks, with multi-line
//!   dot-unstuffing ([RFC 3977 §3.1.1](https://datatracker.ietf.org/doc/html/rfc3977#section-3.1.1))
//! - Positional request/response correlation on one ordered connection
//! - LIST NEWSGROUPS and LIST ACTIVE ([RFC 3977 §7.6](https://datatracker.ietf.org/doc/html/rfc3977#section-7.6))

mod client;
pub mod completer;
mod error;
pub mod framer;
mod groups;
mod model;
mod queue;
mod transport;

pub use crate::client::NntpClient;
pub use crate::completer::{Completer, Completion, SlotState};
pub use crate::error::NntpError;
pub use crate::framer::{Event as FrameEvent, FrameAssembler, ProtoError as NntpProtoError};
pub use crate::groups::merge_group_lists;
pub use crate::model::{CommandRequest, CommandResponse, GroupInfo, NewsServer, NntpResponse};
pub use crate::queue::{PendingCommand, PendingQueue};
pub use crate::transport::{Transport, WsTransport};
