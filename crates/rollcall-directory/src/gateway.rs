use std::future::Future;
use std::pin::Pin;

use crate::error::DirectoryError;
use crate::secret::Secret;
use crate::types::{
    DirectoryGroup, DirectoryUser, DomainDefaults, GroupIdentifier, GroupScope, NewUser, ObjectRef,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Primitive operations the provisioning workflow needs from a directory.
///
/// One instance is built at process start and passed by reference to every
/// component that talks to the directory. Lookups return `Ok(None)` when the
/// object does not exist; `Err` is reserved for real failures.
///
/// Methods return boxed futures for dyn compatibility.
pub trait Directory: Send + Sync {
    /// Default user container and naming facts for the bound domain.
    fn domain_defaults(&self) -> BoxFuture<'_, Result<DomainDefaults, DirectoryError>>;

    /// Read at most `limit` existing users. Used as a cheap read-rights check.
    fn sample_users(
        &self,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<DirectoryUser>, DirectoryError>>;

    fn find_user<'a>(
        &'a self,
        sam_account_name: &'a str,
    ) -> BoxFuture<'a, Result<Option<DirectoryUser>, DirectoryError>>;

    /// Resolve a group by name, sAMAccountName or DN.
    fn find_group<'a>(
        &'a self,
        id: &'a GroupIdentifier,
    ) -> BoxFuture<'a, Result<Option<DirectoryGroup>, DirectoryError>>;

    /// Create a user in one request, returning its DN.
    fn create_user<'a>(
        &'a self,
        user: &'a NewUser,
        credential: &'a Secret,
        enabled: bool,
    ) -> BoxFuture<'a, Result<ObjectRef, DirectoryError>>;

    fn create_group<'a>(
        &'a self,
        name: &'a str,
        scope: GroupScope,
        container: &'a str,
    ) -> BoxFuture<'a, Result<ObjectRef, DirectoryError>>;

    fn add_member<'a>(
        &'a self,
        group: &'a ObjectRef,
        member: &'a ObjectRef,
    ) -> BoxFuture<'a, Result<(), DirectoryError>>;

    fn delete_object<'a>(
        &'a self,
        object: &'a ObjectRef,
    ) -> BoxFuture<'a, Result<(), DirectoryError>>;
}
