//! Newsgroup listing built from `LIST NEWSGROUPS` and `LIST ACTIVE`
//! ([RFC 3977 §7.6](https://datatracker.ietf.org/doc/html/rfc3977#section-7.6)).

use std::collections::BTreeMap;

use crate::client::NntpClient;
use crate::error::NntpError;
use crate::model::{CommandResponse, GroupInfo};
use crate::transport::Transport;

const LIST_FOLLOWS: u16 = 215;

impl<T: Transport> NntpClient<T> {
    /// Fetch every newsgroup with its description and article watermarks.
    ///
    /// Both LIST commands are sent back-to-back before either response is
    /// awaited. Groups are returned sorted by name.
    pub async fn get_news_group_list(&self) -> Result<Vec<GroupInfo>, NntpError> {
        let newsgroups = self.submit("LIST", &["NEWSGROUPS"])?;
        let active = self.submit("LIST", &["ACTIVE"])?;

        let (newsgroups, active) = futures::future::try_join(
            self.await_response(newsgroups, true),
            self.await_response(active, true),
        )
        .await?;

        expect_list(&newsgroups, "LIST NEWSGROUPS")?;
        expect_list(&active, "LIST ACTIVE")?;

        let groups = merge_group_lists(&newsgroups.lines, &active.lines)?;
        tracing::debug!(count = groups.len(), "fetched newsgroup list");
        Ok(groups)
    }
}

fn expect_list(response: &CommandResponse, command: &str) -> Result<(), NntpError> {
    if response.response_code == LIST_FOLLOWS {
        Ok(())
    } else {
        Err(NntpError::UnexpectedResponse(
            response.response_code,
            command.to_string(),
        ))
    }
}

/// Fold NEWSGROUPS body lines (`name description`) and ACTIVE body lines
/// (`name high low status`) into complete group records.
///
/// Groups without an ACTIVE line keep `-1` watermarks. An ACTIVE line for a
/// group absent from NEWSGROUPS fails the whole merge.
pub fn merge_group_lists<S: AsRef<str>>(
    newsgroups: &[S],
    active: &[S],
) -> Result<Vec<GroupInfo>, NntpError> {
    let mut groups: BTreeMap<String, GroupInfo> = BTreeMap::new();

    for line in newsgroups {
        let line = line.as_ref();
        let (name, description) = line
            .split_once([' ', '\t'])
            .map(|(name, rest)| (name, rest.trim_start()))
            .unwrap_or((line, ""));
        groups.insert(
            name.to_string(),
            GroupInfo {
                name: name.to_string(),
                description: description.to_string(),
                ..GroupInfo::default()
            },
        );
    }

    for line in active {
        let line = line.as_ref();
        let mut fields = line.split_whitespace();
        let (Some(name), Some(high), Some(low)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(NntpError::ProtocolError(format!(
                "short LIST ACTIVE line: {line:?}"
            )));
        };

        let group = groups
            .get_mut(name)
            .ok_or_else(|| NntpError::MissingGroup(name.to_string()))?;
        group.high_water = parse_watermark(high, line)?;
        group.low_water = parse_watermark(low, line)?;
    }

    Ok(groups.into_values().collect())
}

fn parse_watermark(value: &str, line: &str) -> Result<i64, NntpError> {
    value
        .parse()
        .map_err(|_| NntpError::ProtocolError(format!("invalid watermark in {line:?}")))
}
