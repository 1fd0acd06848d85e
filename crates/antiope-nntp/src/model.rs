use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where and how to reach an NNTP server that speaks over a websocket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsServer {
    pub name: String,
    pub url: String,
    pub connect_timeout: Option<Duration>,
    pub command_timeout: Option<Duration>,
}

impl NewsServer {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            name: "default".to_string(),
            url: url.into(),
            connect_timeout: None,
            command_timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    command: String,
    args: Vec<String>,
}

impl CommandRequest {
    pub fn new<S: AsRef<str>>(command: &str, args: &[S]) -> Self {
        Self {
            command: command.to_string(),
            args: args.iter().map(|a| a.as_ref().to_string()).collect(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Text written to the transport for this request.
    ///
    /// A command with arguments is CRLF-terminated; a bare command token is
    /// sent without a line terminator.
    pub fn to_wire(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}\r\n", self.command, self.args.join(" "))
        }
    }
}

impl std::fmt::Display for CommandRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.args.is_empty() {
            f.write_str(&self.command)
        } else {
            write!(f, "{} {}", self.command, self.args.join(" "))
        }
    }
}

/// One assembled NNTP response.
///
/// `lines[0]` is the status line. Multi-line responses keep the terminating
/// `"."` as their final element until [`strip_framing`](Self::strip_framing)
/// is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub response_code: u16,
    pub lines: Vec<String>,
}

impl CommandResponse {
    pub fn status_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    /// Drop the status line and the final element, leaving body lines only.
    pub fn strip_framing(&mut self) {
        if !self.lines.is_empty() {
            self.lines.remove(0);
        }
        self.lines.pop();
    }
}

/// Parsed status line ([RFC 3977 §3.2](https://datatracker.ietf.org/doc/html/rfc3977#section-3.2)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NntpResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub name: String,
    pub description: String,
    pub low_water: i64,
    pub high_water: i64,
}

impl Default for GroupInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            low_water: -1,
            high_water: -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_with_args_is_crlf_terminated() {
        let req = CommandRequest::new("LIST", &["NEWSGROUPS"]);
        assert_eq!(req.to_wire(), "LIST NEWSGROUPS\r\n");
    }

    #[test]
    fn wire_form_joins_args_with_single_space() {
        let req = CommandRequest::new("LIST", &["ACTIVE", "alt.*"]);
        assert_eq!(req.to_wire(), "LIST ACTIVE alt.*\r\n");
    }

    #[test]
    fn wire_form_without_args_has_no_terminator() {
        let req = CommandRequest::new::<&str>("HELP", &[]);
        assert_eq!(req.to_wire(), "HELP");
    }

    #[test]
    fn strip_framing_leaves_body_lines() {
        let mut resp = CommandResponse {
            response_code: 215,
            lines: vec![
                "215 list follows".to_string(),
                "a 1".to_string(),
                "b 2".to_string(),
                ".".to_string(),
            ],
        };
        resp.strip_framing();
        assert_eq!(resp.lines, vec!["a 1", "b 2"]);
        assert_eq!(resp.response_code, 215);
    }

    #[test]
    fn strip_framing_on_status_only_response_empties_lines() {
        let mut resp = CommandResponse {
            response_code: 503,
            lines: vec!["503 not supported".to_string()],
        };
        resp.strip_framing();
        assert!(resp.lines.is_empty());
    }

    #[test]
    fn group_info_defaults_to_sentinel_watermarks() {
        let info = GroupInfo::default();
        assert_eq!(info.low_water, -1);
        assert_eq!(info.high_water, -1);
        assert!(info.name.is_empty());
    }
}
