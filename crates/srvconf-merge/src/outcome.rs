//! Results of merge operations

use std::fmt;

/// What a merge did to the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The document was modified.
    Changed,
    /// The fact was already present; nothing was written.
    Unchanged,
    /// The merge could not decide where the fact belongs and left the
    /// document alone.
    Skipped { reason: SkipReason },
}

impl MergeOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    pub(crate) fn from_changed(changed: bool) -> Self {
        if changed { Self::Changed } else { Self::Unchanged }
    }
}

/// Why a merge was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Exactly one application was required.
    ApplicationCount { found: usize },
    /// Elements for one stanza carry different ids.
    AmbiguousStanza { tag: String, found: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApplicationCount { found } => {
                write!(f, "expected exactly one application, found {found}")
            }
            Self::AmbiguousStanza { tag, found } => {
                write!(f, "{found} <{tag}> elements do not form one stanza")
            }
        }
    }
}
