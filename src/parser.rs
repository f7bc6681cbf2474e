use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

mod entities;

pub use entities::{CombinedEntry, Record};

/// Number of fields in a combined-format record
pub const COMBINED_FIELD_COUNT: usize = 10;

static COMBINED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([^ ]+) - ([^ ]*) (\[[^]]+\]) "([^"]*)" (\d+) (\d+) "([^"]*)" "([^"]*)"$"#)
        .expect("valid combined line regex")
});

// Progressively longer prefixes of the combined format, longest first. Used
// only to describe how far a rejected line got.
static PARTIAL_RES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        (
            "ip address, timestamp, request, code, size and referrer",
            r#"^([^ ]+) - ([^ ]*) (\[[^]]+\]) "([^"]*)" (\d+) (\d+) "([^"]*)""#,
        ),
        (
            "ip address, timestamp, request, code and size",
            r#"^([^ ]+) - ([^ ]*) (\[[^]]+\]) "([^"]*)" (\d+) (\d+)"#,
        ),
        (
            "ip address, timestamp, request and code",
            r#"^([^ ]+) - ([^ ]*) (\[[^]]+\]) "([^"]*)" (\d+)"#,
        ),
        (
            "ip address, timestamp and request",
            r#"^([^ ]+) - ([^ ]*) (\[[^]]+\]) "([^"]*)""#,
        ),
        (
            "ip address and timestamp",
            r#"^([^ ]+) - ([^ ]*) (\[[^]]+\])"#,
        ),
    ]
    .into_iter()
    .map(|(label, pattern)| (label, Regex::new(pattern).expect("valid partial line regex")))
    .collect()
});

/// Parse error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineParseError {
    #[error("line is not in combined log format (matched only {0})")]
    Partial(&'static str),

    #[error("line is not in combined log format")]
    NoMatch,
}

/// Parses one combined-format access log line into a [`Record`].
///
/// Fields, in order: ip address, the `- user` part, bracketed timestamp,
/// method, url, protocol version, status code, byte count, referrer and
/// user agent. The request section is split on whitespace; when it has fewer
/// than three words, method, url and version are left empty.
pub fn parse_combined_line(line: &str) -> Result<Record, LineParseError> {
    // a few user agents contain literal \" sequences
    let text = line.replace("\\\"", "''");

    let Some(caps) = COMBINED_RE.captures(&text) else {
        return Err(describe_mismatch(&text));
    };

    let group = |i: usize| caps.get(i).map_or("", |m| m.as_str()).to_string();

    let request: Vec<&str> = caps
        .get(4)
        .map_or("", |m| m.as_str())
        .split_whitespace()
        .collect();
    let (method, url, version) = if request.len() > 2 {
        (
            request[0].to_string(),
            request[1].to_string(),
            request[2].to_string(),
        )
    } else {
        (String::new(), String::new(), String::new())
    };

    Ok(Record::new(vec![
        group(1),
        group(2),
        group(3),
        method,
        url,
        version,
        group(5),
        group(6),
        group(7),
        group(8),
    ]))
}

/// Parses a line and keeps the original text alongside the record
pub fn parse_combined_entry(line: &str) -> Result<CombinedEntry, LineParseError> {
    parse_combined_line(line).map(|record| CombinedEntry {
        line: line.to_string(),
        record,
    })
}

fn describe_mismatch(text: &str) -> LineParseError {
    PARTIAL_RES
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map_or(LineParseError::NoMatch, |(label, _)| {
            LineParseError::Partial(label)
        })
}
