use rollcall_directory::names::{
    child_dn, dns_name_from_dn, escape_dn_value, escape_filter_value, group_filter,
    looks_like_dn, user_filter,
};

#[test]
fn filter_escaping_neutralises_wildcards_and_parens() {
    assert_eq!(escape_filter_value("a*b"), "a\\2ab");
    assert_eq!(escape_filter_value("(x)"), "\\28x\\29");
    assert_eq!(escape_filter_value("back\\slash"), "back\\5cslash");
    assert_eq!(escape_filter_value("plain"), "plain");
}

#[test]
fn user_filter_escapes_injection_attempt() {
    let filter = user_filter("*)(objectClass=*");
    assert_eq!(
        filter,
        "(&(objectCategory=person)(objectClass=user)(sAMAccountName=\\2a\\29\\28objectClass=\\2a))"
    );
}

#[test]
fn group_filter_matches_cn_name_and_sam() {
    let filter = group_filter("Sales Team");
    assert!(filter.starts_with("(&(objectClass=group)(|"));
    assert!(filter.contains("(cn=Sales Team)"));
    assert!(filter.contains("(name=Sales Team)"));
    assert!(filter.contains("(sAMAccountName=Sales Team)"));
}

#[test]
fn dn_escaping_handles_special_characters() {
    assert_eq!(escape_dn_value("Lovelace, Ada"), "Lovelace\\, Ada");
    assert_eq!(escape_dn_value("a+b=c"), "a\\+b\\=c");
    assert_eq!(escape_dn_value("#hash"), "\\23hash");
    assert_eq!(escape_dn_value(" padded "), "\\20padded\\20");
    assert_eq!(escape_dn_value("mid#dle"), "mid#dle");
    assert_eq!(escape_dn_value(""), "");
}

#[test]
fn child_dn_prefixes_escaped_common_name() {
    assert_eq!(
        child_dn("Lovelace, Ada", "OU=Staff,DC=corp,DC=example,DC=com"),
        "CN=Lovelace\\, Ada,OU=Staff,DC=corp,DC=example,DC=com"
    );
}

#[test]
fn dn_detection() {
    assert!(looks_like_dn("CN=Sales,OU=Groups,DC=corp,DC=example,DC=com"));
    assert!(looks_like_dn("cn=admins"));
    assert!(!looks_like_dn("Domain Admins"));
    assert!(!looks_like_dn("sales"));
    assert!(!looks_like_dn("=oops"));
    assert!(!looks_like_dn("weird name=x"));
}

#[test]
fn dns_name_from_domain_components() {
    assert_eq!(dns_name_from_dn("DC=corp,DC=example,DC=com"), "corp.example.com");
    assert_eq!(
        dns_name_from_dn("OU=Staff, dc=example, dc=org"),
        "example.org"
    );
    assert_eq!(dns_name_from_dn("CN=Users"), "");
}

#[test]
fn dns_name_skips_escaped_commas() {
    assert_eq!(
        dns_name_from_dn("CN=Lovelace\\, Ada,OU=Staff,DC=corp,DC=com"),
        "corp.com"
    );
    assert_eq!(
        dns_name_from_dn("CN=x\\,DC=evil,DC=corp,DC=com"),
        "corp.com"
    );
    assert_eq!(dns_name_from_dn("CN=trailing\\\\,DC=com"), "com");
}
