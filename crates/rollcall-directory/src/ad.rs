//! Active Directory attribute encodings.
//!
//! AD accepts an initial password on add only through `unicodePwd`, encoded
//! as the double-quoted password in UTF-16LE, and only over a protected
//! connection (LDAPS or StartTLS).

use crate::types::GroupScope;

/// `NORMAL_ACCOUNT`
pub const UF_NORMAL_ACCOUNT: u32 = 0x0200;
/// `ACCOUNTDISABLE`
pub const UF_ACCOUNTDISABLE: u32 = 0x0002;

const GROUP_TYPE_GLOBAL: u32 = 0x0000_0002;
const GROUP_TYPE_DOMAIN_LOCAL: u32 = 0x0000_0004;
const GROUP_TYPE_UNIVERSAL: u32 = 0x0000_0008;
const GROUP_TYPE_SECURITY_ENABLED: u32 = 0x8000_0000;

/// GUID of the well-known Users container in `wellKnownObjects`.
const WKGUID_USERS_CONTAINER: &str = "A9D1CA15768811D1ADED00C04FD8D5CD";

/// Encode a password for the `unicodePwd` attribute.
pub fn encode_unicode_pwd(password: &str) -> Vec<u8> {
    format!("\"{password}\"")
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect()
}

/// `userAccountControl` for a freshly created user.
pub fn user_account_control(enabled: bool) -> u32 {
    if enabled {
        UF_NORMAL_ACCOUNT
    } else {
        UF_NORMAL_ACCOUNT | UF_ACCOUNTDISABLE
    }
}

/// `groupType` for a security group of the given scope.
///
/// AD stores the flag word as a signed 32-bit integer, so the security bit
/// renders as a negative number.
pub fn security_group_type(scope: GroupScope) -> i32 {
    let scope_bits = match scope {
        GroupScope::DomainLocal => GROUP_TYPE_DOMAIN_LOCAL,
        GroupScope::Global => GROUP_TYPE_GLOBAL,
        GroupScope::Universal => GROUP_TYPE_UNIVERSAL,
    };
    (scope_bits | GROUP_TYPE_SECURITY_ENABLED) as i32
}

/// Pick the Users container DN out of a domain root's `wellKnownObjects`.
///
/// Values look like `B:32:<GUID>:<DN>`.
pub fn users_container_from_well_known(values: &[String]) -> Option<String> {
    values.iter().find_map(|value| {
        let mut parts = value.splitn(4, ':');
        let (_, _, guid, dn) = (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
        guid.eq_ignore_ascii_case(WKGUID_USERS_CONTAINER)
            .then(|| dn.to_string())
    })
}
