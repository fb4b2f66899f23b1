//! Change events reported by the replication tool.

use std::path::PathBuf;

/// What happened to a record during replication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

impl ChangeAction {
    /// Match a change-log verb token such as `created:`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "created:" => Some(Self::Created),
            "updated:" => Some(Self::Updated),
            "deleted:" => Some(Self::Deleted),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

/// A classified line of replication output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub action: ChangeAction,
    /// Local copy of the affected record
    pub local_path: PathBuf,
}
