// This is free and unencumbered software released into the public domain.

use crate::shared::{CameraError, HttpResponse};

/// Substring the firmware puts in every failed CGI response.
pub const ERROR_SENTINEL: &str = "ERROR";

/// One `key='value'` line of a getparam/setparam response.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParameterEntry {
    pub key: String,
    pub value: String,
}

impl ParameterEntry {
    /// Splits at the first `=`, then drops one character on each side of the
    /// remainder: the device always wraps values in single quotes.
    ///
    /// An unquoted value loses its first and last character; lines without
    /// `=` yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (key, rest) = line.split_once('=')?;
        let mut chars = rest.chars();
        chars.next();
        chars.next_back();
        Some(Self {
            key: key.to_string(),
            value: chars.as_str().to_string(),
        })
    }

    /// Like [`ParameterEntry::parse`], but only strips quotes that are there.
    pub fn parse_lenient(line: &str) -> Option<Self> {
        let line = line.trim();
        let (key, value) = line.split_once('=')?;
        let value = value
            .strip_prefix('\'')
            .and_then(|v| v.strip_suffix('\''))
            .unwrap_or(value);
        Some(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// Rejects error-sentinel bodies, then HTTP 401, then any other non-2xx
/// status. Returns the body text otherwise.
pub fn check_response(response: &HttpResponse) -> Result<String, CameraError> {
    let text = response.text();
    if text.contains(ERROR_SENTINEL) {
        return Err(CameraError::protocol(text));
    }
    if response.is_unauthorized() {
        return Err(CameraError::Unauthorized);
    }
    if !(200..300).contains(&response.status) {
        return Err(CameraError::protocol(format!(
            "HTTP {}: {}",
            response.status,
            text.trim()
        )));
    }
    Ok(text)
}

/// Parsed entries of a response body, produced one line at a time in device order.
#[derive(Clone, Debug)]
pub struct Entries {
    body: String,
    offset: usize,
}

impl Entries {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            offset: 0,
        }
    }
}

impl Iterator for Entries {
    type Item = ParameterEntry;

    fn next(&mut self) -> Option<Self::Item> {
        while self.offset < self.body.len() {
            let rest = &self.body[self.offset..];
            let line = match rest.find('\n') {
                Some(end) => {
                    self.offset += end + 1;
                    &rest[..end]
                },
                None => {
                    self.offset = self.body.len();
                    rest
                },
            };
            if let Some(entry) = ParameterEntry::parse(line) {
                return Some(entry);
            }
        }
        None
    }
}
