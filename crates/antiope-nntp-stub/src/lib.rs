use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;

type StubError = Box<dyn std::error::Error + Send + Sync>;
type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

#[derive(Debug, Deserialize, Clone)]
pub struct FixtureConfig {
    pub greeting: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupFixture>,
    /// Group names reported by LIST ACTIVE but missing from LIST NEWSGROUPS.
    #[serde(default)]
    pub active_only: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GroupFixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub low: u64,
    pub high: u64,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    "y".to_string()
}

#[derive(Debug, Clone)]
pub struct StubConfig {
    pub bind: SocketAddr,
    /// Split every reply into websocket messages of at most this many bytes.
    /// Zero sends each reply whole.
    pub chunk_size: usize,
    pub disconnect_after: usize,
    pub delay_ms: u64,
}

#[derive(Clone)]
pub struct StubServer {
    state: Arc<ServerState>,
}

struct ServerState {
    config: StubConfig,
    fixtures: FixtureConfig,
}

impl StubServer {
    pub fn new(config: StubConfig, fixtures: FixtureConfig) -> Self {
        Self {
            state: Arc::new(ServerState { config, fixtures }),
        }
    }

    pub async fn serve(self) -> Result<(), StubError> {
        let listener = TcpListener::bind(self.state.config.bind).await?;
        loop {
            let (stream, peer) = listener.accept().await?;
            let state = Arc::clone(&self.state);
            tokio::spawn(async move {
                if let Err(err) = handle_client(stream, state).await {
                    tracing::warn!(%peer, error = %err, "client error");
                }
            });
        }
    }

    pub async fn serve_once(self) -> Result<(), StubError> {
        let listener = TcpListener::bind(self.state.config.bind).await?;
        let (stream, _) = listener.accept().await?;
        handle_client(stream, Arc::clone(&self.state)).await
    }
}

pub fn load_fixtures(path: &Path) -> Result<FixtureConfig, StubError> {
    let data = std::fs::read_to_string(path)?;
    let fixtures = serde_json::from_str(&data)?;
    Ok(fixtures)
}

async fn handle_client(stream: TcpStream, state: Arc<ServerState>) -> Result<(), StubError> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut sink, mut source) = ws_stream.split();

    let greeting = state
        .fixtures
        .greeting
        .clone()
        .unwrap_or_else(|| "200 antiope stub ready (posting ok)".to_string());
    send_reply(&mut sink, &state.config, format!("{greeting}\r\n")).await?;

    let mut commands_seen = 0usize;
    while let Some(message) = source.next().await {
        let text = match message? {
            Message::Text(text) => text.as_str().to_owned(),
            Message::Binary(data) => String::from_utf8_lossy(&data).into_owned(),
            Message::Close(_) => break,
            _ => continue,
        };

        // A message may carry several CRLF-terminated commands, or one bare
        // command without a terminator.
        for command_line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            commands_seen += 1;
            maybe_delay(&state.config).await;
            if should_disconnect(&state.config, commands_seen) {
                tracing::debug!(commands_seen, "dropping connection");
                let _ = sink.send(Message::Close(None)).await;
                return Ok(());
            }

            tracing::trace!(command = command_line, "stub received");
            let reply = respond(command_line, &state.fixtures);
            send_reply(&mut sink, &state.config, reply).await?;
            if command_line.eq_ignore_ascii_case("QUIT") {
                let _ = sink.send(Message::Close(None)).await;
                return Ok(());
            }
        }
    }

    Ok(())
}

fn respond(command_line: &str, fixtures: &FixtureConfig) -> String {
    let upper = command_line.to_uppercase();
    let mut parts = upper.split_whitespace();
    let command = parts.next().unwrap_or("");
    let keyword = parts.next();

    match (command, keyword) {
        ("QUIT", _) => "205 closing connection\r\n".to_string(),
        ("MODE", Some("READER")) => "200 reader mode, posting permitted\r\n".to_string(),
        ("CAPABILITIES", _) => multi_line(
            "101 capability list follows",
            ["VERSION 2", "READER", "LIST ACTIVE NEWSGROUPS"],
        ),
        ("HELP", _) => multi_line(
            "100 help text follows",
            ["Supported commands: LIST, MODE READER, CAPABILITIES, HELP, QUIT"],
        ),
        ("LIST", Some("NEWSGROUPS")) => multi_line(
            "215 descriptions follow",
            fixtures
                .groups
                .iter()
                .map(|g| format!("{}\t{}", g.name, g.description)),
        ),
        ("LIST", None | Some("ACTIVE")) => {
            let listed = fixtures
                .groups
                .iter()
                .map(|g| format!("{} {:010} {:010} {}", g.name, g.high, g.low, g.status));
            let orphans = fixtures
                .active_only
                .iter()
                .map(|name| format!("{name} 0000000000 0000000001 y"));
            multi_line("215 list of newsgroups follows", listed.chain(orphans))
        }
        ("LIST", Some(_)) => "503 list variant not supported\r\n".to_string(),
        _ => "500 command not recognized\r\n".to_string(),
    }
}

fn multi_line<I, S>(status: &str, lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut reply = format!("{status}\r\n");
    for line in lines {
        let line = line.as_ref();
        if line.starts_with('.') {
            reply.push('.');
        }
        reply.push_str(line);
        reply.push_str("\r\n");
    }
    reply.push_str(".\r\n");
    reply
}

async fn send_reply(sink: &mut WsSink, config: &StubConfig, reply: String) -> Result<(), StubError> {
    for chunk in split_chunks(&reply, config.chunk_size) {
        sink.send(Message::Text(chunk.to_string().into())).await?;
    }
    Ok(())
}

/// Cut `text` into pieces of at most `size` bytes without splitting a
/// UTF-8 sequence.
fn split_chunks(text: &str, size: usize) -> Vec<&str> {
    if size == 0 || text.len() <= size {
        return vec![text];
    }
    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = size.min(rest.len());
        while !rest.is_char_boundary(end) {
            end += 1;
        }
        let (head, tail) = rest.split_at(end);
        chunks.push(head);
        rest = tail;
    }
    chunks
}

async fn maybe_delay(config: &StubConfig) {
    if config.delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(config.delay_ms)).await;
    }
}

fn should_disconnect(config: &StubConfig, commands_seen: usize) -> bool {
    config.disconnect_after > 0 && commands_seen >= config.disconnect_after
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> FixtureConfig {
        serde_json::from_str(
            r#"{
                "groups": [
                    {"name": "alt.test", "description": "short description", "low": 1, "high": 100},
                    {"name": "comp.lang.rust", "description": "Rust", "low": 5, "high": 9, "status": "m"}
                ],
                "active_only": ["alt.orphan"]
            }"#,
        )
        .expect("fixtures")
    }

    #[test]
    fn list_newsgroups_uses_tab_separator() {
        let reply = respond("LIST NEWSGROUPS", &fixtures());
        assert_eq!(
            reply,
            "215 descriptions follow\r\nalt.test\tshort description\r\ncomp.lang.rust\tRust\r\n.\r\n"
        );
    }

    #[test]
    fn list_active_includes_orphans() {
        let reply = respond("list active", &fixtures());
        let lines: Vec<_> = reply.split("\r\n").collect();
        assert_eq!(lines[0], "215 list of newsgroups follows");
        assert_eq!(lines[1], "alt.test 0000000100 0000000001 y");
        assert_eq!(lines[2], "comp.lang.rust 0000000009 0000000005 m");
        assert!(lines[3].starts_with("alt.orphan "));
        assert_eq!(lines[4], ".");
    }

    #[test]
    fn bare_list_means_active() {
        assert_eq!(respond("LIST", &fixtures()), respond("LIST ACTIVE", &fixtures()));
    }

    #[test]
    fn mode_reader_answers_200() {
        assert_eq!(
            respond("mode reader", &fixtures()),
            "200 reader mode, posting permitted\r\n"
        );
    }

    #[test]
    fn unknown_commands_get_500() {
        assert_eq!(respond("XYZZY", &fixtures()), "500 command not recognized\r\n");
        assert!(respond("LIST OVERVIEW.FMT", &fixtures()).starts_with("503"));
    }

    #[test]
    fn multi_line_dot_stuffs_body() {
        assert_eq!(multi_line("100 help", [".hidden"]), "100 help\r\n..hidden\r\n.\r\n");
    }

    #[test]
    fn split_chunks_respects_size_and_char_boundaries() {
        assert_eq!(split_chunks("abcdefg", 3), vec!["abc", "def", "g"]);
        assert_eq!(split_chunks("abc", 0), vec!["abc"]);
        let chunks = split_chunks("aé", 2);
        assert_eq!(chunks.concat(), "aé");
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }
}
