//! Line records of the matrix file grammar.
//!
//! A file is a sequence of `\n`-terminated text lines whose first
//! whitespace-separated token is the record keyword. The only exception is the
//! binary payload following `StartStream`, which the cursor hands out as raw
//! bytes.

use std::str::FromStr;

use rsp_core::{ErrorInfo, RspError};

/// One non-blank, non-comment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Record<'a> {
    /// One-based line number.
    pub line: usize,
    pub keyword: &'a str,
    /// Everything after the keyword, with surrounding whitespace removed.
    pub rest: &'a str,
}

impl<'a> Record<'a> {
    pub fn tokens(&self) -> impl Iterator<Item = &'a str> {
        self.rest.split_whitespace()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    line: usize,
    path: &'a str,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8], path: &'a str) -> Self {
        Self {
            data,
            pos: 0,
            line: 0,
            path,
        }
    }

    /// Number of the last line handed out.
    pub fn line(&self) -> usize {
        self.line
    }

    fn next_line(&mut self) -> Option<Result<&'a str, RspError>> {
        if self.pos >= self.data.len() {
            return None;
        }
        let rest = &self.data[self.pos..];
        let end = rest.iter().position(|byte| *byte == b'\n').unwrap_or(rest.len());
        self.pos += (end + 1).min(rest.len());
        self.line += 1;
        let raw = rest[..end].strip_suffix(b"\r").unwrap_or(&rest[..end]);
        Some(std::str::from_utf8(raw).map_err(|err| {
            RspError::Io(
                located("malformed-line", "line is not valid UTF-8", self.path, self.line)
                    .with_context("cause", err.to_string()),
            )
        }))
    }

    /// Next record, skipping blank lines and `#` comments.
    pub fn next_record(&mut self) -> Option<Result<Record<'a>, RspError>> {
        loop {
            let line = match self.next_line()? {
                Ok(line) => line.trim(),
                Err(err) => return Some(Err(err)),
            };
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (keyword, rest) = line
                .split_once(char::is_whitespace)
                .map_or((line, ""), |(keyword, rest)| (keyword, rest.trim()));
            return Some(Ok(Record {
                line: self.line,
                keyword,
                rest,
            }));
        }
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Consumes `count` raw bytes without counting lines.
    pub fn skip(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.data.len());
    }
}

/// Error payload located at `path:line`.
pub(crate) fn located(code: &str, message: &str, path: &str, line: usize) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("path", path)
        .with_context("line", line.to_string())
}

/// Re-raises any engine error as an Io error located at `path:line`, keeping its code.
pub(crate) fn at_line(err: RspError, path: &str, line: usize) -> RspError {
    match in_file(err, path) {
        RspError::Io(info) => RspError::Io(info.with_context("line", line.to_string())),
        other => other,
    }
}

/// Re-raises any engine error as an Io error about `path`, keeping its code.
pub(crate) fn in_file(err: RspError, path: &str) -> RspError {
    let family = family_name(&err);
    let mut info = err.info().clone();
    if family != "io" {
        info = info.with_context("family", family);
    }
    RspError::Io(info.with_context("path", path))
}

fn family_name(err: &RspError) -> &'static str {
    match err {
        RspError::Configuration(_) => "configuration",
        RspError::Bounds(_) => "bounds",
        RspError::Value(_) => "value",
        RspError::Io(_) => "io",
        RspError::Mismatch(_) => "mismatch",
        RspError::Serde(_) => "serde",
    }
}

/// Parses one token as `T`.
pub(crate) fn parse_token<T: FromStr>(
    token: &str,
    expected: &str,
    path: &str,
    line: usize,
) -> Result<T, RspError> {
    token.parse().map_err(|_| {
        RspError::Io(
            located("malformed-token", "token could not be parsed", path, line)
                .with_context("token", token)
                .with_context("expected", expected),
        )
    })
}

/// Parses every token of `record` as `T`.
pub(crate) fn parse_all<T: FromStr>(
    record: &Record<'_>,
    expected: &str,
    path: &str,
) -> Result<Vec<T>, RspError> {
    record
        .tokens()
        .map(|token| parse_token(token, expected, path, record.line))
        .collect()
}

/// Splits `"first name" "second"` into names; bare words are accepted too.
pub(crate) fn quoted_names(rest: &str, path: &str, line: usize) -> Result<Vec<String>, RspError> {
    let mut names = Vec::new();
    let mut chars = rest.chars().peekable();
    while let Some(&next) = chars.peek() {
        if next.is_whitespace() {
            chars.next();
            continue;
        }
        let mut name = String::new();
        if next == '"' {
            chars.next();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            name.push(escaped);
                        }
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    other => name.push(other),
                }
            }
            if !closed {
                return Err(RspError::Io(
                    located("malformed-token", "unterminated quoted name", path, line)
                        .with_context("token", rest),
                ));
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                name.push(c);
                chars.next();
            }
        }
        names.push(name);
    }
    Ok(names)
}

/// Quotes `name` for an `AN` record.
pub(crate) fn quote(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' | '\r' => quoted.push(' '),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

/// Flattens `text` onto one line for rest-of-line records.
///
/// Readers trim the rest of a line, so surrounding whitespace is dropped here
/// too and the written name is exactly the one read back.
pub(crate) fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ").trim().to_string()
}
