use std::collections::HashSet;
use std::time::Duration;

use ldap3::{
    Ldap, LdapConnAsync, LdapConnSettings, LdapResult, Mod, Scope, SearchEntry, SearchOptions,
    SearchResult,
};

use crate::ad;
use crate::error::DirectoryError;
use crate::gateway::{BoxFuture, Directory};
use crate::names;
use crate::secret::Secret;
use crate::types::{
    DirectoryGroup, DirectoryUser, DomainDefaults, GroupIdentifier, GroupScope, NewUser, ObjectRef,
};

/// LDAP result code for "attribute or value exists"; returned when adding a
/// member that is already in the group.
const RC_ATTRIBUTE_OR_VALUE_EXISTS: u32 = 20;
const RC_SIZE_LIMIT_EXCEEDED: u32 = 4;
const RC_INVALID_CREDENTIALS: u32 = 49;

type RawAttr = (Vec<u8>, HashSet<Vec<u8>>);

/// Connection parameters for [`LdapDirectory::connect`].
#[derive(Debug, Clone)]
pub struct LdapSettings {
    /// `ldap://host:389` or `ldaps://host:636`.
    pub url: String,
    pub bind_dn: String,
    /// Search base. Defaults to the server's `defaultNamingContext`.
    pub base_dn: Option<String>,
    pub starttls: bool,
    pub no_tls_verify: bool,
    pub timeout: Duration,
}

/// Active Directory over LDAP.
///
/// Holds one bound connection for the whole run. Every call clones the
/// `Ldap` handle, which multiplexes over the same connection.
pub struct LdapDirectory {
    ldap: Ldap,
    base_dn: String,
    naming_context: String,
}

impl LdapDirectory {
    /// Connect, bind, and discover the naming context from the rootDSE.
    pub async fn connect(
        settings: &LdapSettings,
        bind_password: &Secret,
    ) -> Result<Self, DirectoryError> {
        tracing::debug!(url = %settings.url, "connecting to directory");

        let conn_settings = LdapConnSettings::new()
            .set_conn_timeout(settings.timeout)
            .set_starttls(settings.starttls)
            .set_no_tls_verify(settings.no_tls_verify);

        let (conn, mut ldap) = LdapConnAsync::with_settings(conn_settings, &settings.url)
            .await
            .map_err(|e| {
                DirectoryError::Connection(format!("failed to connect to {}: {e}", settings.url))
            })?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::warn!(error = %e, "LDAP connection driver error");
            }
        });

        let result = ldap
            .simple_bind(&settings.bind_dn, bind_password.expose())
            .await
            .map_err(|e| {
                DirectoryError::Connection(format!("bind as {} failed: {e}", settings.bind_dn))
            })?;

        if result.rc == RC_INVALID_CREDENTIALS {
            return Err(DirectoryError::Connection(format!(
                "invalid credentials for {}",
                settings.bind_dn
            )));
        }
        check(result, &format!("bind as {}", settings.bind_dn))?;

        let root_dse = read_entry(&mut ldap, "", "(objectClass=*)", &["defaultNamingContext"])
            .await?
            .ok_or_else(|| DirectoryError::NotFound("rootDSE".into()))?;
        let naming_context = first_attr(&root_dse, "defaultNamingContext").ok_or_else(|| {
            DirectoryError::NotFound("defaultNamingContext on rootDSE".into())
        })?;

        let base_dn = settings
            .base_dn
            .clone()
            .unwrap_or_else(|| naming_context.clone());

        tracing::info!(
            url = %settings.url,
            bind_dn = %settings.bind_dn,
            base_dn = %base_dn,
            "directory connection established"
        );

        Ok(Self {
            ldap,
            base_dn,
            naming_context,
        })
    }

    /// Unbind and close the connection.
    pub async fn unbind(mut self) -> Result<(), DirectoryError> {
        self.ldap.unbind().await?;
        Ok(())
    }

    async fn search_first(
        &self,
        filter: &str,
        attrs: &[&str],
    ) -> Result<Option<SearchEntry>, DirectoryError> {
        let mut ldap = self.ldap.clone();
        let SearchResult(entries, result) = ldap
            .search(&self.base_dn, Scope::Subtree, filter, attrs.to_vec())
            .await?;
        check(result, &format!("search {filter}"))?;

        Ok(entries
            .into_iter()
            .filter(|e| !e.is_ref())
            .map(SearchEntry::construct)
            .next())
    }
}

impl Directory for LdapDirectory {
    fn domain_defaults(&self) -> BoxFuture<'_, Result<DomainDefaults, DirectoryError>> {
        Box::pin(async move {
            let mut ldap = self.ldap.clone();
            let well_known = read_entry(
                &mut ldap,
                &self.naming_context,
                "(objectClass=*)",
                &["wellKnownObjects"],
            )
            .await?
            .map(|entry| all_attr(&entry, "wellKnownObjects"))
            .unwrap_or_default();

            let default_user_container = ad::users_container_from_well_known(&well_known)
                .unwrap_or_else(|| format!("CN=Users,{}", self.naming_context));

            Ok(DomainDefaults {
                default_user_container,
                naming_context: self.naming_context.clone(),
                dns_name: names::dns_name_from_dn(&self.naming_context),
            })
        })
    }

    fn sample_users(
        &self,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<DirectoryUser>, DirectoryError>> {
        Box::pin(async move {
            let mut ldap = self.ldap.clone();
            let size_limit = i32::try_from(limit).unwrap_or(i32::MAX);
            let SearchResult(entries, result) = ldap
                .with_search_options(SearchOptions::new().sizelimit(size_limit))
                .search(
                    &self.base_dn,
                    Scope::Subtree,
                    "(&(objectCategory=person)(objectClass=user))",
                    vec!["sAMAccountName"],
                )
                .await?;

            // Hitting the size limit still proves read access.
            if result.rc != RC_SIZE_LIMIT_EXCEEDED {
                check(result, "list users")?;
            }

            Ok(entries
                .into_iter()
                .filter(|e| !e.is_ref())
                .map(SearchEntry::construct)
                .take(limit)
                .map(|entry| DirectoryUser {
                    sam_account_name: first_attr(&entry, "sAMAccountName").unwrap_or_default(),
                    dn: ObjectRef::new(entry.dn),
                })
                .collect())
        })
    }

    fn find_user<'a>(
        &'a self,
        sam_account_name: &'a str,
    ) -> BoxFuture<'a, Result<Option<DirectoryUser>, DirectoryError>> {
        Box::pin(async move {
            let filter = names::user_filter(sam_account_name);
            tracing::debug!(filter = %filter, "looking up user");

            Ok(self
                .search_first(&filter, &["sAMAccountName"])
                .await?
                .map(|entry| DirectoryUser {
                    sam_account_name: first_attr(&entry, "sAMAccountName")
                        .unwrap_or_else(|| sam_account_name.to_string()),
                    dn: ObjectRef::new(entry.dn),
                }))
        })
    }

    fn find_group<'a>(
        &'a self,
        id: &'a GroupIdentifier,
    ) -> BoxFuture<'a, Result<Option<DirectoryGroup>, DirectoryError>> {
        Box::pin(async move {
            let entry = if names::looks_like_dn(id.as_str()) {
                let mut ldap = self.ldap.clone();
                read_entry(&mut ldap, id.as_str(), "(objectClass=group)", &["cn"]).await?
            } else {
                self.search_first(&names::group_filter(id.as_str()), &["cn"])
                    .await?
            };

            Ok(entry.map(|entry| DirectoryGroup {
                name: first_attr(&entry, "cn").unwrap_or_else(|| id.to_string()),
                dn: ObjectRef::new(entry.dn),
            }))
        })
    }

    fn create_user<'a>(
        &'a self,
        user: &'a NewUser,
        credential: &'a Secret,
        enabled: bool,
    ) -> BoxFuture<'a, Result<ObjectRef, DirectoryError>> {
        Box::pin(async move {
            let dn = names::child_dn(&user.common_name, &user.container);

            let mut attrs: Vec<RawAttr> = vec![text_attr(
                "objectClass",
                &["top", "person", "organizationalPerson", "user"],
            )];
            attrs.extend(
                user.attributes
                    .iter()
                    .map(|(name, value)| text_attr(name, &[value.as_str()])),
            );
            attrs.push((
                b"unicodePwd".to_vec(),
                HashSet::from([ad::encode_unicode_pwd(credential.expose())]),
            ));
            attrs.push(text_attr(
                "userAccountControl",
                &[&ad::user_account_control(enabled).to_string()],
            ));
            if user.must_change_password {
                attrs.push(text_attr("pwdLastSet", &["0"]));
            }

            let mut ldap = self.ldap.clone();
            let result = ldap.add(&dn, attrs).await?;
            check(result, &format!("add {dn}"))?;

            tracing::info!(dn = %dn, enabled, "created user");
            Ok(ObjectRef::new(dn))
        })
    }

    fn create_group<'a>(
        &'a self,
        name: &'a str,
        scope: GroupScope,
        container: &'a str,
    ) -> BoxFuture<'a, Result<ObjectRef, DirectoryError>> {
        Box::pin(async move {
            let dn = names::child_dn(name, container);
            let attrs: Vec<RawAttr> = vec![
                text_attr("objectClass", &["top", "group"]),
                text_attr("sAMAccountName", &[name]),
                text_attr(
                    "groupType",
                    &[&ad::security_group_type(scope).to_string()],
                ),
            ];

            let mut ldap = self.ldap.clone();
            let result = ldap.add(&dn, attrs).await?;
            check(result, &format!("add {dn}"))?;

            tracing::info!(dn = %dn, ?scope, "created group");
            Ok(ObjectRef::new(dn))
        })
    }

    fn add_member<'a>(
        &'a self,
        group: &'a ObjectRef,
        member: &'a ObjectRef,
    ) -> BoxFuture<'a, Result<(), DirectoryError>> {
        Box::pin(async move {
            let mods = vec![Mod::Add(
                "member".to_string(),
                HashSet::from([member.to_string()]),
            )];

            let mut ldap = self.ldap.clone();
            let result = ldap.modify(group.as_str(), mods).await?;
            if result.rc == RC_ATTRIBUTE_OR_VALUE_EXISTS {
                tracing::debug!(group = %group, member = %member, "already a member");
                return Ok(());
            }
            check(result, &format!("add member to {group}"))?;

            tracing::info!(group = %group, member = %member, "added group member");
            Ok(())
        })
    }

    fn delete_object<'a>(
        &'a self,
        object: &'a ObjectRef,
    ) -> BoxFuture<'a, Result<(), DirectoryError>> {
        Box::pin(async move {
            let mut ldap = self.ldap.clone();
            let result = ldap.delete(object.as_str()).await?;
            check(result, &format!("delete {object}"))?;

            tracing::info!(dn = %object, "deleted object");
            Ok(())
        })
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn check(result: LdapResult, context: &str) -> Result<(), DirectoryError> {
    if result.rc == 0 {
        return Ok(());
    }
    Err(DirectoryError::from_result_code(
        result.rc,
        &result.text,
        context,
    ))
}

/// Base-scope read of a single entry. `Ok(None)` when the DN does not exist
/// or does not match `filter`.
async fn read_entry(
    ldap: &mut Ldap,
    dn: &str,
    filter: &str,
    attrs: &[&str],
) -> Result<Option<SearchEntry>, DirectoryError> {
    let SearchResult(entries, result) = ldap
        .search(dn, Scope::Base, filter, attrs.to_vec())
        .await?;

    match check(result, &format!("read {dn}")) {
        Ok(()) => {}
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => return Err(e),
    }

    Ok(entries
        .into_iter()
        .filter(|e| !e.is_ref())
        .map(SearchEntry::construct)
        .next())
}

fn all_attr(entry: &SearchEntry, name: &str) -> Vec<String> {
    entry
        .attrs
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.clone())
        .unwrap_or_default()
}

fn first_attr(entry: &SearchEntry, name: &str) -> Option<String> {
    all_attr(entry, name).into_iter().next()
}

fn text_attr(name: &str, values: &[&str]) -> RawAttr {
    (
        name.as_bytes().to_vec(),
        values.iter().map(|v| v.as_bytes().to_vec()).collect(),
    )
}
