//! Section identifiers for GitLab fold markers.
//!
//! Every collapsible section the reporter opens needs a token that pairs its
//! start marker with its end marker. Tokens are never derived from content:
//! two sections with identical text still get different ids.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, printable token naming one fold section.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(pub String);

impl SectionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Capability to mint fresh section ids.
///
/// The reporter owns one of these so tests can swap randomness for a
/// predictable sequence.
pub trait SectionIdSource {
    fn next_id(&mut self) -> SectionId;
}

impl<T: SectionIdSource + ?Sized> SectionIdSource for &mut T {
    fn next_id(&mut self) -> SectionId {
        (**self).next_id()
    }
}

impl<T: SectionIdSource + ?Sized> SectionIdSource for Box<T> {
    fn next_id(&mut self) -> SectionId {
        (**self).next_id()
    }
}

/// Random v4 UUIDs in hyphenated form. The default for real runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSectionIds;

impl SectionIdSource for UuidSectionIds {
    fn next_id(&mut self) -> SectionId {
        SectionId(Uuid::new_v4().hyphenated().to_string())
    }
}

/// Deterministic `<prefix>-<n>` ids, counting from 1.
#[derive(Debug, Clone)]
pub struct SequentialSectionIds {
    prefix: String,
    next: u64,
}

impl SequentialSectionIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    /// How many ids have been handed out so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for SequentialSectionIds {
    fn default() -> Self {
        Self::new("section")
    }
}

impl SectionIdSource for SequentialSectionIds {
    fn next_id(&mut self) -> SectionId {
        let id = SectionId(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}
