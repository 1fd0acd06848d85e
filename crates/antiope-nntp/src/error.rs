use thiserror::Error;

#[derive(Debug, Error)]
pub enum NntpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    #[error("Unexpected response {0}: {1}")]
    UnexpectedResponse(u16, String),

    #[error("Malformed status line: {0:?}")]
    MalformedStatusLine(String),

    #[error("Response {code} arrived with no pending command")]
    Desync { code: u16 },

    #[error("Group {0} is listed as active but has no newsgroups entry")]
    MissingGroup(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Command timed out")]
    Timeout,
}
