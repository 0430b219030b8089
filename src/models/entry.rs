//! Entries returned by the children-listing endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One child under a listing prefix.
///
/// A folder is a virtual grouping reported by the backend (a common prefix
/// with no bytes of its own); a file is a real object. Both carry a display
/// `name`, the last non-empty segment of the key.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChildEntry {
    Folder {
        key: String,
        name: String,
    },
    File {
        key: String,
        name: String,
        size: u64,
        uploaded: DateTime<Utc>,
    },
}

impl ChildEntry {
    /// Entry for a direct object match.
    pub fn file(key: &str, size: u64, uploaded: DateTime<Utc>) -> Self {
        ChildEntry::File {
            name: last_segment(key).unwrap_or(key).to_string(),
            key: key.to_string(),
            size,
            uploaded,
        }
    }

    /// Entry for a common prefix. The trailing delimiter is stripped before
    /// the name is derived; the key keeps it.
    pub fn folder(prefix: &str) -> Self {
        let trimmed = prefix.strip_suffix('/').unwrap_or(prefix);
        ChildEntry::Folder {
            name: last_segment(trimmed).unwrap_or(prefix).to_string(),
            key: prefix.to_string(),
        }
    }
}

fn last_segment(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|segment| !segment.is_empty())
}
