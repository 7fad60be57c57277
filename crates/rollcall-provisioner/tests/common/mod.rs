#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::future::ready;
use std::sync::Mutex;

use rollcall_directory::{
    AttributeSet, BoxFuture, Directory, DirectoryError, DirectoryGroup, DirectoryUser,
    DomainDefaults, GroupIdentifier, GroupScope, NewUser, ObjectRef, Secret,
};
use rollcall_provisioner::{Credential, PrincipalDraft, Prompter, ProvisionerError};

pub const CONTAINER: &str = "CN=Users,DC=corp,DC=example,DC=com";
pub const NAMING_CONTEXT: &str = "DC=corp,DC=example,DC=com";
pub const DNS_NAME: &str = "corp.example.com";

// ── In-memory directory ──────────────────────────────────────────────────────

/// Every gateway call, in the order it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DomainDefaults,
    SampleUsers(usize),
    FindUser(String),
    FindGroup(String),
    CreateUser { dn: String, enabled: bool },
    CreateGroup { name: String, container: String },
    AddMember { group: String, member: String },
    Delete(String),
}

impl Call {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Call::CreateUser { .. } | Call::CreateGroup { .. } | Call::AddMember { .. }
        )
    }
}

/// Injected failures.
#[derive(Debug, Default, Clone)]
pub struct Failures {
    pub domain_defaults: bool,
    pub sample_users: bool,
    pub find_user: bool,
    /// Reject creation of these sAMAccountNames.
    pub create_user_sams: HashSet<String>,
    pub create_group: bool,
    /// Group lookups for these identifiers return an error.
    pub find_group_ids: HashSet<String>,
    /// Adding members to groups with these names fails.
    pub add_member_groups: HashSet<String>,
    /// Every membership change fails.
    pub add_member: bool,
    pub delete: bool,
}

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub sam_account_name: String,
    pub attributes: AttributeSet,
    pub enabled: bool,
    pub must_change_password: bool,
}

#[derive(Debug, Clone)]
pub struct StoredGroup {
    pub name: String,
    pub members: BTreeSet<String>,
}

#[derive(Default)]
struct State {
    users: BTreeMap<String, StoredUser>,
    groups: BTreeMap<String, StoredGroup>,
    calls: Vec<Call>,
    failures: Failures,
}

pub struct MemoryDirectory {
    defaults: DomainDefaults,
    state: Mutex<State>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self {
            defaults: DomainDefaults {
                default_user_container: CONTAINER.to_string(),
                naming_context: NAMING_CONTEXT.to_string(),
                dns_name: DNS_NAME.to_string(),
            },
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_dns_name(mut self, dns_name: &str) -> Self {
        self.defaults.dns_name = dns_name.to_string();
        self
    }

    pub fn with_group(self, name: &str) -> Self {
        let dn = format!("CN={name},{CONTAINER}");
        self.lock().groups.insert(
            dn,
            StoredGroup {
                name: name.to_string(),
                members: BTreeSet::new(),
            },
        );
        self
    }

    pub fn with_user(self, sam: &str) -> Self {
        let dn = format!("CN={sam},{CONTAINER}");
        self.lock().users.insert(
            dn,
            StoredUser {
                sam_account_name: sam.to_string(),
                attributes: AttributeSet::from([("sAMAccountName".to_string(), sam.to_string())]),
                enabled: true,
                must_change_password: false,
            },
        );
        self
    }

    pub fn failing(self, configure: impl FnOnce(&mut Failures)) -> Self {
        configure(&mut self.lock().failures);
        self
    }

    pub fn clear_failures(&self) {
        self.lock().failures = Failures::default();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn create_user_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::CreateUser { .. }))
            .count()
    }

    pub fn user(&self, sam: &str) -> Option<StoredUser> {
        self.lock()
            .users
            .values()
            .find(|u| u.sam_account_name == sam)
            .cloned()
    }

    pub fn members_of(&self, group: &str) -> BTreeSet<String> {
        self.lock()
            .groups
            .values()
            .find(|g| g.name == group)
            .map(|g| g.members.clone())
            .unwrap_or_default()
    }

    /// DNs of every object whose DN contains `needle`.
    pub fn objects_containing(&self, needle: &str) -> Vec<String> {
        let state = self.lock();
        state
            .users
            .keys()
            .chain(state.groups.keys())
            .filter(|dn| dn.contains(needle))
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn record(&self, call: Call) -> std::sync::MutexGuard<'_, State> {
        let mut state = self.lock();
        state.calls.push(call);
        state
    }
}

fn done<'a, T: Send + 'a>(result: Result<T, DirectoryError>) -> BoxFuture<'a, Result<T, DirectoryError>> {
    Box::pin(ready(result))
}

impl Directory for MemoryDirectory {
    fn domain_defaults(&self) -> BoxFuture<'_, Result<DomainDefaults, DirectoryError>> {
        let state = self.record(Call::DomainDefaults);
        let result = if state.failures.domain_defaults {
            Err(DirectoryError::Connection("server down".to_string()))
        } else {
            Ok(self.defaults.clone())
        };
        done(result)
    }

    fn sample_users(
        &self,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<DirectoryUser>, DirectoryError>> {
        let state = self.record(Call::SampleUsers(limit));
        let result = if state.failures.sample_users {
            Err(DirectoryError::InsufficientAccess("search users".to_string()))
        } else {
            Ok(state
                .users
                .iter()
                .take(limit)
                .map(|(dn, u)| DirectoryUser {
                    dn: ObjectRef::new(dn.clone()),
                    sam_account_name: u.sam_account_name.clone(),
                })
                .collect())
        };
        done(result)
    }

    fn find_user<'a>(
        &'a self,
        sam_account_name: &'a str,
    ) -> BoxFuture<'a, Result<Option<DirectoryUser>, DirectoryError>> {
        let state = self.record(Call::FindUser(sam_account_name.to_string()));
        let result = if state.failures.find_user {
            Err(DirectoryError::Connection("timed out".to_string()))
        } else {
            Ok(state
                .users
                .iter()
                .find(|(_, u)| u.sam_account_name.eq_ignore_ascii_case(sam_account_name))
                .map(|(dn, u)| DirectoryUser {
                    dn: ObjectRef::new(dn.clone()),
                    sam_account_name: u.sam_account_name.clone(),
                }))
        };
        done(result)
    }

    fn find_group<'a>(
        &'a self,
        id: &'a GroupIdentifier,
    ) -> BoxFuture<'a, Result<Option<DirectoryGroup>, DirectoryError>> {
        let state = self.record(Call::FindGroup(id.to_string()));
        let result = if state.failures.find_group_ids.contains(id.as_str()) {
            Err(DirectoryError::Operation {
                code: 1,
                message: "operations error".to_string(),
            })
        } else {
            Ok(state
                .groups
                .iter()
                .find(|(dn, g)| dn.as_str() == id.as_str() || g.name == id.as_str())
                .map(|(dn, g)| DirectoryGroup {
                    dn: ObjectRef::new(dn.clone()),
                    name: g.name.clone(),
                }))
        };
        done(result)
    }

    fn create_user<'a>(
        &'a self,
        user: &'a NewUser,
        _credential: &'a Secret,
        enabled: bool,
    ) -> BoxFuture<'a, Result<ObjectRef, DirectoryError>> {
        let dn = format!("CN={},{}", user.common_name, user.container);
        let mut state = self.record(Call::CreateUser {
            dn: dn.clone(),
            enabled,
        });
        let sam = user
            .attributes
            .get("sAMAccountName")
            .cloned()
            .unwrap_or_default();

        let result = if state.failures.create_user_sams.contains(&sam) {
            Err(DirectoryError::Rejected(format!(
                "add {dn}: 0000052D: password does not meet policy"
            )))
        } else if state.users.contains_key(&dn)
            || state.users.values().any(|u| u.sam_account_name == sam)
        {
            Err(DirectoryError::AlreadyExists(dn))
        } else {
            state.users.insert(
                dn.clone(),
                StoredUser {
                    sam_account_name: sam,
                    attributes: user.attributes.clone(),
                    enabled,
                    must_change_password: user.must_change_password,
                },
            );
            Ok(ObjectRef::new(dn))
        };
        done(result)
    }

    fn create_group<'a>(
        &'a self,
        name: &'a str,
        _scope: GroupScope,
        container: &'a str,
    ) -> BoxFuture<'a, Result<ObjectRef, DirectoryError>> {
        let mut state = self.record(Call::CreateGroup {
            name: name.to_string(),
            container: container.to_string(),
        });
        let dn = format!("CN={name},{container}");
        let result = if state.failures.create_group {
            Err(DirectoryError::InsufficientAccess(format!("add {dn}")))
        } else {
            state.groups.insert(
                dn.clone(),
                StoredGroup {
                    name: name.to_string(),
                    members: BTreeSet::new(),
                },
            );
            Ok(ObjectRef::new(dn))
        };
        done(result)
    }

    fn add_member<'a>(
        &'a self,
        group: &'a ObjectRef,
        member: &'a ObjectRef,
    ) -> BoxFuture<'a, Result<(), DirectoryError>> {
        let mut state = self.record(Call::AddMember {
            group: group.to_string(),
            member: member.to_string(),
        });
        let failures = state.failures.clone();
        let result = match state.groups.get_mut(group.as_str()) {
            None => Err(DirectoryError::NotFound(group.to_string())),
            Some(g) if failures.add_member || failures.add_member_groups.contains(&g.name) => Err(
                DirectoryError::InsufficientAccess(format!("modify {group}")),
            ),
            Some(g) => {
                g.members.insert(member.to_string());
                Ok(())
            }
        };
        done(result)
    }

    fn delete_object<'a>(
        &'a self,
        object: &'a ObjectRef,
    ) -> BoxFuture<'a, Result<(), DirectoryError>> {
        let mut state = self.record(Call::Delete(object.to_string()));
        let result = if state.failures.delete {
            Err(DirectoryError::InsufficientAccess(format!("delete {object}")))
        } else if state.users.remove(object.as_str()).is_some()
            || state.groups.remove(object.as_str()).is_some()
        {
            Ok(())
        } else {
            Err(DirectoryError::NotFound(object.to_string()))
        };
        done(result)
    }
}

// ── Scripted prompter ────────────────────────────────────────────────────────

/// Answers questions from a fixed script and records everything shown.
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
    told: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
            told: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    pub fn told(&self) -> Vec<String> {
        self.told.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap().len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, question: &str) -> Result<String, ProvisionerError> {
        self.asked.lock().unwrap().push(question.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProvisionerError::Input(format!("no scripted answer for '{question}'")))
    }

    fn ask_secret(&self, question: &str) -> Result<Secret, ProvisionerError> {
        self.ask(question).map(Secret::new)
    }

    fn tell(&self, message: &str) {
        self.told.lock().unwrap().push(message.to_string());
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// Intake answers for one user that accept every default and confirm.
/// Valid when the batch uses shared groups.
pub fn accept_defaults(given: &str, surname: &str, sam: &str) -> Vec<String> {
    [
        given, surname, "", // display name
        sam, "", // UPN
        "", "", "", "", // title, department, office, description
        "", // OU
        "", "", "", // generate password, enable, change at logon
        "y", // create
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Same as [`accept_defaults`] but declines at the confirmation step.
pub fn decline(given: &str, surname: &str, sam: &str) -> Vec<String> {
    let mut answers = accept_defaults(given, surname, sam);
    if let Some(last) = answers.last_mut() {
        *last = "n".to_string();
    }
    answers
}

pub fn draft(index: usize, sam: &str, groups: &[&str]) -> PrincipalDraft {
    PrincipalDraft {
        index,
        given_name: "Grace".to_string(),
        surname: "Hopper".to_string(),
        display_name: format!("Grace Hopper {sam}"),
        sam_account_name: sam.to_string(),
        user_principal_name: format!("{sam}@{DNS_NAME}"),
        title: Some("Rear Admiral".to_string()),
        department: None,
        office: Some("  ".to_string()),
        description: None,
        container: CONTAINER.to_string(),
        credential: Credential::Supplied(Secret::new("Cobol-1959-Navy")),
        enabled: true,
        must_change_password: true,
        groups: groups.iter().map(|g| GroupIdentifier::new(*g)).collect(),
    }
}
