use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque version token assigned by the storage provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(String);

impl RevisionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RevisionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One historical, immutable state of a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub version_id: RevisionId,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
}

impl Revision {
    /// Catalog order: newest first, ties broken by id so the order is total.
    pub fn catalog_order(a: &Revision, b: &Revision) -> Ordering {
        b.last_modified
            .cmp(&a.last_modified)
            .then_with(|| b.version_id.cmp(&a.version_id))
    }
}

/// Sort revisions into catalog order in place.
pub fn sort_newest_first(revisions: &mut [Revision]) {
    revisions.sort_by(Revision::catalog_order);
}

/// A closed time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Smallest range covering every revision, `None` if there are none.
    pub fn spanning(revisions: &[Revision]) -> Option<Self> {
        let start = revisions.iter().map(|r| r.last_modified).min()?;
        let end = revisions.iter().map(|r| r.last_modified).max()?;
        Some(Self { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Keep the revisions whose timestamp falls inside `range`, preserving order.
///
/// Passing no range hands back the whole sequence.
pub fn filter_by_range(revisions: &[Revision], range: Option<&TimeRange>) -> Vec<Revision> {
    match range {
        Some(range) => revisions
            .iter()
            .filter(|r| range.contains(r.last_modified))
            .cloned()
            .collect(),
        None => revisions.to_vec(),
    }
}

/// Display projection of a revision for the version list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub version_id: RevisionId,
    pub readable_date: String,
    pub size: String,
    pub selected: bool,
}

impl CatalogEntry {
    pub fn project(revision: &Revision, selected: Option<&RevisionId>) -> Self {
        Self {
            version_id: revision.version_id.clone(),
            readable_date: format_timestamp(revision.last_modified),
            size: format_size(revision.size),
            selected: selected == Some(&revision.version_id),
        }
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Sizes are shown in kibibytes with two decimals.
pub fn format_size(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}
