//! rollcall-directory
//!
//! Directory gateway for rollcall: the capability set the provisioning
//! workflow needs from an identity store, plus an Active Directory binding
//! over LDAP.
//!
//! Public API:
//! - [`Directory`] — the capability trait (query, create, link, delete)
//! - [`LdapDirectory`] — LDAP/AD implementation of [`Directory`]
//! - [`Secret`] — credential wrapper that never prints its contents

pub mod ad;
pub mod error;
pub mod gateway;
pub mod ldap;
pub mod names;
pub mod secret;
pub mod types;

pub use crate::error::DirectoryError;
pub use crate::gateway::{BoxFuture, Directory};
pub use crate::ldap::{LdapDirectory, LdapSettings};
pub use crate::secret::Secret;
pub use crate::types::{
    AttributeSet, DirectoryGroup, DirectoryUser, DomainDefaults, GroupIdentifier, GroupScope,
    NewUser, ObjectRef,
};
