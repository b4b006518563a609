//! Domain types for stored records.
//!
//! A [`Record`] carries at most one populated reference field. The field is
//! selected through [`Record::reference`], which applies the fixed
//! channel-before-category priority.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque key of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Publication state of a record. Only published records take part in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Published,
    Unpublished,
}

impl RecordStatus {
    pub fn is_published(self) -> bool {
        matches!(self, RecordStatus::Published)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordStatus::Published => write!(f, "published"),
            RecordStatus::Unpublished => write!(f, "unpublished"),
        }
    }
}

/// Which reference field of a record is in play.
///
/// The string form doubles as the path segment of the lookup URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Channel,
    Category,
}

impl FieldKind {
    /// Selection order used by [`Record::reference`].
    pub const PRIORITY: [FieldKind; 2] = [FieldKind::Channel, FieldKind::Category];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Channel => "channel",
            FieldKind::Category => "category",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A locally stored record holding a channel or category reference.
///
/// Reference values have the form `"<name> (id: <identifier>)"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub status: RecordStatus,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Record {
    /// Value stored in the given field, if any.
    pub fn field(&self, kind: FieldKind) -> Option<&str> {
        match kind {
            FieldKind::Channel => self.channel.as_deref(),
            FieldKind::Category => self.category.as_deref(),
        }
    }

    /// Overwrite the given field.
    pub fn set_field(&mut self, kind: FieldKind, value: String) {
        match kind {
            FieldKind::Channel => self.channel = Some(value),
            FieldKind::Category => self.category = Some(value),
        }
    }

    /// The first non-empty reference field, channel before category.
    ///
    /// Whitespace-only values count as empty.
    pub fn reference(&self) -> Option<(FieldKind, &str)> {
        FieldKind::PRIORITY.into_iter().find_map(|kind| {
            self.field(kind)
                .filter(|v| !v.trim().is_empty())
                .map(|v| (kind, v))
        })
    }

    pub fn is_published(&self) -> bool {
        self.status.is_published()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
