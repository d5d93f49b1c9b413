//! Proposal records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A submitted governance proposal
///
/// Immutable once stored. A proposal may exist without an analysis when the
/// analysis step failed after the proposal was saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: u64,
    /// Opaque caller-supplied identity, never verified
    pub user_id: String,
    pub content: String,
    /// `None` is the "no title" marker; a stored title is never the empty string
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for a proposal that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProposal {
    pub user_id: String,
    pub content: String,
    pub title: Option<String>,
}

impl NewProposal {
    pub fn new(user_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            content: content.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Materialize the stored record, collapsing an empty title to `None`
    pub fn into_proposal(self, id: u64, created_at: DateTime<Utc>) -> Proposal {
        Proposal {
            id,
            user_id: self.user_id,
            content: self.content,
            title: self.title.filter(|t| !t.is_empty()),
            created_at,
        }
    }
}
