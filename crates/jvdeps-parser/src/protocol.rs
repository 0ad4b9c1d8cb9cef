//! Newline-delimited JSON messages exchanged with worker processes.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::result::ParseResult;
use crate::source::SourceFile;

/// One parse request. Borrows from the [`SourceFile`] when sent, owns its
/// strings when a worker decodes an escaped line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRequest<'a> {
    pub id: u64,
    #[serde(borrow)]
    pub path: Cow<'a, str>,
    #[serde(borrow)]
    pub contents: Cow<'a, str>,
}

impl<'a> WorkerRequest<'a> {
    pub fn new(id: u64, file: &'a SourceFile) -> Self {
        Self {
            id,
            path: file.path().to_string_lossy(),
            contents: Cow::Borrowed(file.contents()),
        }
    }
}

/// A worker's answer: exactly one of `result` or `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ParseResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkerResponse {
    pub fn ok(id: u64, result: ParseResult) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(id: u64, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(message.into()),
        }
    }

    /// `None` when the response carries neither (or both) fields.
    pub fn into_outcome(self) -> Option<Result<ParseResult, String>> {
        match (self.result, self.error) {
            (Some(result), None) => Some(Ok(result)),
            (None, Some(error)) => Some(Err(error)),
            _ => None,
        }
    }
}
