// src/probe/error.rs
use std::fmt;

/// Outcome reported by a single ICMP echo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingStatus {
    Success,
    TimedOut,
    DestinationHostUnreachable,
}

impl PingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PingStatus::Success => "Success",
            PingStatus::TimedOut => "TimedOut",
            PingStatus::DestinationHostUnreachable => "DestinationHostUnreachable",
        }
    }
}

impl fmt::Display for PingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single probe. Always recorded inside a `Verification`,
/// never returned to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    /// Network, DNS, socket or non-success upstream status.
    #[error("{0}")]
    Transport(String),

    #[error("could not interpret {raw:?} as {expected}")]
    Parse { expected: &'static str, raw: String },

    /// The message is the bare status name.
    #[error("{0}")]
    PingStatus(PingStatus),
}

/// Longest upstream text kept in a parse error message.
const MAX_RAW_CHARS: usize = 128;

impl ProbeError {
    /// Parse failure quoting at most `MAX_RAW_CHARS` of the upstream text.
    pub fn parse(expected: &'static str, raw: &str) -> Self {
        let raw = match raw.char_indices().nth(MAX_RAW_CHARS) {
            Some((cut, _)) => format!("{}...", &raw[..cut]),
            None => raw.to_string(),
        };
        ProbeError::Parse { expected, raw }
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        ProbeError::Transport(describe(&err))
    }
}

/// One line for an error and its sources. reqwest and hyper already print
/// their source in `Display`, so each level only contributes the text it
/// adds in front of its source, and a segment is never repeated.
pub(crate) fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut current = Some(err);

    while let Some(level) = current {
        let text = level.to_string();
        let source = level.source();
        let own = match source.map(|inner| inner.to_string()) {
            Some(inner) => match text.strip_suffix(inner.as_str()) {
                Some(prefix) => prefix.trim_end_matches(&[':', ' '][..]).to_string(),
                None => text,
            },
            None => text,
        };

        if !own.is_empty() && !segments.iter().any(|seen| seen.contains(own.as_str())) {
            segments.push(own);
        }
        current = source;
    }

    segments.join(": ")
}
