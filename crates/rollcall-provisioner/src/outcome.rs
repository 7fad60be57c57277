use std::collections::BTreeMap;
use std::fmt;

use rollcall_directory::{GroupIdentifier, ObjectRef};
use serde::{Deserialize, Serialize};

use crate::draft::PrincipalDraft;

/// Terminal state of one batch index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionStatus {
    Created,
    /// The user exists but at least one group link did not succeed.
    PartiallyLinked,
    SkippedDuplicate,
    SkippedByOperator,
    CreationFailed,
}

impl ProvisionStatus {
    pub const ALL: [Self; 5] = [
        Self::Created,
        Self::PartiallyLinked,
        Self::SkippedDuplicate,
        Self::SkippedByOperator,
        Self::CreationFailed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::PartiallyLinked => "Partially linked",
            Self::SkippedDuplicate => "Skipped (already exists)",
            Self::SkippedByOperator => "Skipped by operator",
            Self::CreationFailed => "Creation failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Linked,
    NotFound,
    LinkFailed,
}

/// Result of linking the new user to one requested group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupLink {
    pub group: GroupIdentifier,
    pub status: LinkStatus,
    /// Resolved DN, when resolution succeeded.
    pub group_dn: Option<ObjectRef>,
    pub cause: Option<String>,
}

/// Everything that happened to one batch index. Produced once, never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionOutcome {
    pub index: usize,
    pub sam_account_name: String,
    pub status: ProvisionStatus,
    /// DN of the created user.
    pub object: Option<ObjectRef>,
    pub links: Vec<GroupLink>,
    pub cause: Option<String>,
}

impl ProvisionOutcome {
    pub fn skipped_by_operator(draft: &PrincipalDraft) -> Self {
        Self {
            index: draft.index,
            sam_account_name: draft.sam_account_name.clone(),
            status: ProvisionStatus::SkippedByOperator,
            object: None,
            links: Vec::new(),
            cause: None,
        }
    }

    /// Groups whose link did not end as `Linked`.
    pub fn failed_links(&self) -> impl Iterator<Item = &GroupLink> {
        self.links.iter().filter(|l| l.status != LinkStatus::Linked)
    }

    /// One line for the operator, e.g. `#2 alovelace: Creation failed (…)`.
    pub fn describe(&self) -> String {
        let mut line = format!(
            "#{} {}: {}",
            self.index,
            self.sam_account_name,
            self.status.label()
        );
        if let Some(cause) = &self.cause {
            line.push_str(&format!(" ({cause})"));
        }
        for link in self.failed_links() {
            let reason = match link.status {
                LinkStatus::NotFound => "group not found",
                LinkStatus::LinkFailed => "could not add member",
                LinkStatus::Linked => continue,
            };
            line.push_str(&format!("\n    {}: {reason}", link.group));
            if let Some(cause) = &link.cause {
                line.push_str(&format!(" ({cause})"));
            }
        }
        line
    }
}

/// Counts per status plus run timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub started_at: jiff::Timestamp,
    pub finished_at: jiff::Timestamp,
    pub counts: BTreeMap<ProvisionStatus, usize>,
}

impl BatchSummary {
    pub fn from_outcomes(
        outcomes: &[ProvisionOutcome],
        started_at: jiff::Timestamp,
        finished_at: jiff::Timestamp,
    ) -> Self {
        let mut counts: BTreeMap<ProvisionStatus, usize> =
            ProvisionStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for outcome in outcomes {
            *counts.entry(outcome.status).or_default() += 1;
        }
        Self {
            started_at,
            finished_at,
            counts,
        }
    }

    pub fn count(&self, status: ProvisionStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Batch of {} finished at {} (started {})",
            self.total(),
            self.finished_at,
            self.started_at
        )?;
        for (status, count) in &self.counts {
            writeln!(f, "  {:<26} {count}", status.label())?;
        }
        Ok(())
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub outcomes: Vec<ProvisionOutcome>,
    pub summary: BatchSummary,
}
