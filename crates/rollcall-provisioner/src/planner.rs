use rollcall_directory::GroupIdentifier;
use serde::{Deserialize, Serialize};

use crate::error::ProvisionerError;
use crate::input::{Prompter, ask_validated};

/// How group memberships are chosen for a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GroupAssignmentPlan {
    /// One ordered group list applies to every user. May be empty.
    SharedAcrossBatch { groups: Vec<GroupIdentifier> },
    /// Each user is asked for their own groups during intake.
    PerUser,
}

/// Global parameters collected once before the first user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPlan {
    pub count: usize,
    pub groups: GroupAssignmentPlan,
}

/// Ask for the batch size and the group assignment mode.
///
/// Malformed counts are rejected and asked again; there is no upper bound.
pub fn plan(prompter: &dyn Prompter) -> Result<BatchPlan, ProvisionerError> {
    let answer = ask_validated(prompter, "How many users do you want to create?", |s| {
        parse_count(s).map(|_| ())
    })?;
    let count = parse_count(&answer).map_err(ProvisionerError::Input)?;

    let groups = if prompter.confirm("Add every user in this batch to the same groups?", true)? {
        prompter.tell("Enter the groups for the whole batch, one per line. Leave blank to finish.");
        GroupAssignmentPlan::SharedAcrossBatch {
            groups: collect_groups(prompter)?,
        }
    } else {
        GroupAssignmentPlan::PerUser
    };

    tracing::info!(count, ?groups, "batch planned");
    Ok(BatchPlan { count, groups })
}

/// A positive whole number.
pub fn parse_count(input: &str) -> Result<usize, String> {
    let trimmed = input.trim();
    let value: i128 = trimmed
        .parse()
        .map_err(|_| format!("'{trimmed}' is not a whole number."))?;
    if value < 1 {
        return Err("The number of users must be at least 1.".to_string());
    }
    usize::try_from(value).map_err(|_| format!("{value} is too large."))
}

/// Blank-terminated list of group identifiers, order kept, repeats dropped.
pub(crate) fn collect_groups(
    prompter: &dyn Prompter,
) -> Result<Vec<GroupIdentifier>, ProvisionerError> {
    let mut groups: Vec<GroupIdentifier> = Vec::new();
    loop {
        let answer = prompter.ask("Group (name, sAMAccountName or DN)")?;
        let trimmed = answer.trim();
        if trimmed.is_empty() {
            return Ok(groups);
        }

        let id = GroupIdentifier::new(trimmed);
        if groups.contains(&id) {
            prompter.tell(&format!("'{trimmed}' is already in the list."));
        } else {
            groups.push(id);
        }
    }
}
