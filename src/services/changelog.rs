// src/services/changelog.rs

//! Change log interpreter.
//!
//! Turns the verbose output of a replication run into change events. Each
//! event line looks like:
//!
//! ```text
//! created: https://repo.example.org/record1.xml -> /local/record1.xml
//! ```
//!
//! Lines whose first token is not a change verb are status chatter and are
//! skipped. A change verb without a `->` target is malformed and surfaces as
//! an error item, after which iteration continues.

use std::borrow::Cow;
use std::path::PathBuf;

use crate::error::{AppError, Result};
use crate::models::{ChangeAction, ChangeEvent};

/// Separator between the remote resource and its local copy.
const TARGET_SEPARATOR: &str = " -> ";

/// Lazy sequence of change events over a borrowed output buffer.
#[derive(Debug, Clone)]
pub struct ChangeLog<'a> {
    rest: Option<&'a [u8]>,
}

/// Interpret raw replication output.
///
/// The buffer is only borrowed, so calling this again replays the log.
pub fn interpret(output: &[u8]) -> ChangeLog<'_> {
    ChangeLog { rest: Some(output) }
}

impl Iterator for ChangeLog<'_> {
    type Item = Result<ChangeEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = self.rest?;
            let (line, tail) = match rest.iter().position(|b| *b == b'\n') {
                Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
                None => (rest, None),
            };
            self.rest = tail;

            if let Some(item) = classify_line(line) {
                return Some(item);
            }
        }
    }
}

/// Classify one line, or `None` when it is not a change line at all.
fn classify_line(raw: &[u8]) -> Option<Result<ChangeEvent>> {
    let decoded: Cow<'_, str> = String::from_utf8_lossy(raw);
    let line = decoded.strip_suffix('\r').unwrap_or(&*decoded);

    let verb = line.split_whitespace().next()?;
    let action = ChangeAction::from_token(verb)?;

    let target = line
        .split_once(TARGET_SEPARATOR)
        .map(|(_, target)| target.trim())
        .filter(|target| !target.is_empty());

    Some(match target {
        Some(path) => Ok(ChangeEvent {
            action,
            local_path: PathBuf::from(path),
        }),
        None => Err(AppError::malformed_line(line)),
    })
}
