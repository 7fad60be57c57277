use rollcall_directory::{Directory, GroupIdentifier, ObjectRef};

use crate::draft::PrincipalDraft;
use crate::error::format_err_chain;
use crate::outcome::{GroupLink, LinkStatus, ProvisionOutcome, ProvisionStatus};

/// Creates one user and links its groups.
///
/// Each step is isolated: a failure ends processing of this draft only and
/// is returned as a status, never as an error. Writes are strictly
/// additive; a user whose group links fail is left in place.
pub struct Provisioner<'a> {
    directory: &'a dyn Directory,
}

impl<'a> Provisioner<'a> {
    pub fn new(directory: &'a dyn Directory) -> Self {
        Self { directory }
    }

    pub async fn provision(&self, draft: &PrincipalDraft) -> ProvisionOutcome {
        let sam = draft.sam_account_name.as_str();
        let mut outcome = ProvisionOutcome {
            index: draft.index,
            sam_account_name: sam.to_string(),
            status: ProvisionStatus::CreationFailed,
            object: None,
            links: Vec::new(),
            cause: None,
        };

        // 1. Duplicate check. Nothing is written for an existing account.
        match self.directory.find_user(sam).await {
            Ok(Some(existing)) => {
                tracing::info!(sam_account_name = %sam, dn = %existing.dn, "user already exists, skipping");
                outcome.status = ProvisionStatus::SkippedDuplicate;
                outcome.cause = Some(format!("already exists at {}", existing.dn));
                return outcome;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(sam_account_name = %sam, error = %e, "duplicate check failed");
                outcome.cause = Some(format!("duplicate check failed: {}", format_err_chain(&e)));
                return outcome;
            }
        }

        // 2. Single creation request with every collected attribute.
        let user = draft.new_user();
        let dn = match self
            .directory
            .create_user(&user, draft.credential.secret(), draft.enabled)
            .await
        {
            Ok(dn) => dn,
            Err(e) => {
                tracing::warn!(sam_account_name = %sam, error = %e, "user creation failed");
                outcome.cause = Some(format_err_chain(&e));
                return outcome;
            }
        };
        tracing::info!(sam_account_name = %sam, dn = %dn, "user created");
        outcome.object = Some(dn.clone());

        // 3. Group links, in order. One bad group never stops the rest.
        for group in &draft.groups {
            outcome.links.push(self.link(group, &dn).await);
        }

        // 4. Aggregate.
        outcome.status = if outcome.failed_links().next().is_none() {
            ProvisionStatus::Created
        } else {
            ProvisionStatus::PartiallyLinked
        };
        outcome
    }

    async fn link(&self, group: &GroupIdentifier, member: &ObjectRef) -> GroupLink {
        let resolved = match self.directory.find_group(group).await {
            Ok(Some(resolved)) => resolved,
            Ok(None) => {
                tracing::warn!(group = %group, "group not found");
                return GroupLink {
                    group: group.clone(),
                    status: LinkStatus::NotFound,
                    group_dn: None,
                    cause: None,
                };
            }
            Err(e) => {
                tracing::warn!(group = %group, error = %e, "group lookup failed");
                return GroupLink {
                    group: group.clone(),
                    status: LinkStatus::NotFound,
                    group_dn: None,
                    cause: Some(format_err_chain(&e)),
                };
            }
        };

        match self.directory.add_member(&resolved.dn, member).await {
            Ok(()) => GroupLink {
                group: group.clone(),
                status: LinkStatus::Linked,
                group_dn: Some(resolved.dn),
                cause: None,
            },
            Err(e) => {
                tracing::warn!(group = %resolved.dn, member = %member, error = %e, "failed to add group member");
                GroupLink {
                    group: group.clone(),
                    status: LinkStatus::LinkFailed,
                    group_dn: Some(resolved.dn),
                    cause: Some(format_err_chain(&e)),
                }
            }
        }
    }
}
