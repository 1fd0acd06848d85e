use std::collections::HashMap;
use std::time::Duration;

use crate::error::ConfigError;

/// Parse `Key=Value` lines. `#` starts a comment line and values may
/// reference options defined earlier in the file.
pub fn parse_config(content: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut values = HashMap::new();

    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let syntax = |message: String| ConfigError::SyntaxError {
            line: index + 1,
            message,
        };
        let (key, raw_value) = line
            .split_once('=')
            .ok_or_else(|| syntax("expected Key=Value".into()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(syntax("missing option name".into()));
        }
        if key.contains(char::is_whitespace) {
            return Err(syntax(format!("option name {key:?} contains whitespace")));
        }

        let value = interpolate(raw_value.trim(), &values).map_err(|err| match err {
            ConfigError::UnterminatedVariable(value) => {
                syntax(format!("unterminated ${{...}} in {value:?}"))
            }
            other => other,
        })?;
        values.insert(key.to_string(), value);
    }

    Ok(values)
}

/// Expand a leading `~` to the home directory and `${Name}` to an option
/// already in `resolved`.
pub fn interpolate(value: &str, resolved: &HashMap<String, String>) -> Result<String, ConfigError> {
    let home = value
        .strip_prefix('~')
        .and_then(|rest| dirs::home_dir().map(|home| (home, rest)));
    let (mut expanded, mut rest) = match home {
        Some((home, rest)) => (home.to_string_lossy().into_owned(), rest),
        None => (String::with_capacity(value.len()), value),
    };

    while let Some(start) = rest.find("${") {
        expanded.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        let end = tail
            .find('}')
            .ok_or_else(|| ConfigError::UnterminatedVariable(value.to_string()))?;
        let name = &tail[..end];
        let substitution = resolved
            .get(name)
            .ok_or_else(|| ConfigError::UnknownVariable(name.to_string()))?;
        expanded.push_str(substitution);
        rest = &tail[end + 1..];
    }
    expanded.push_str(rest);

    Ok(expanded)
}

/// Read a whole-second duration option. Zero disables the limit.
pub fn parse_seconds(
    raw: &HashMap<String, String>,
    option: &str,
    default: u64,
) -> Result<Option<Duration>, ConfigError> {
    let secs = match raw.get(option) {
        Some(value) => value.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
            option: option.to_string(),
            value: value.clone(),
        })?,
        None => default,
    };
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
