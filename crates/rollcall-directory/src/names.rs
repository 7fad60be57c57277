//! Filter and DN string handling.

/// Escape a value for use inside an LDAP search filter (RFC 4515).
pub fn escape_filter_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\5c"),
            '*' => out.push_str("\\2a"),
            '(' => out.push_str("\\28"),
            ')' => out.push_str("\\29"),
            '\0' => out.push_str("\\00"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a value for use as an RDN value inside a DN (RFC 4514).
pub fn escape_dn_value(value: &str) -> String {
    let count = value.chars().count();
    let mut out = String::with_capacity(value.len() * 2);

    for (i, ch) in value.chars().enumerate() {
        let is_first = i == 0;
        let is_last = i + 1 == count;

        match ch {
            ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=' => {
                out.push('\\');
                out.push(ch);
            }
            '\0' => out.push_str("\\00"),
            ' ' if is_first || is_last => out.push_str("\\20"),
            '#' if is_first => out.push_str("\\23"),
            _ => out.push(ch),
        }
    }
    out
}

/// `CN=<escaped common name>,<container>`
pub fn child_dn(common_name: &str, container: &str) -> String {
    format!("CN={},{container}", escape_dn_value(common_name))
}

/// Heuristic for "the operator typed a DN": an attribute type followed by
/// `=` in the first RDN.
pub fn looks_like_dn(value: &str) -> bool {
    match value.split_once('=') {
        Some((attr, rest)) => {
            !rest.is_empty()
                && !attr.is_empty()
                && attr.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        None => false,
    }
}

/// `DC=corp,DC=example,DC=com` → `corp.example.com`.
///
/// Non-`DC` components are ignored; returns an empty string when there are
/// none. Commas escaped as `\,` stay inside their component.
pub fn dns_name_from_dn(dn: &str) -> String {
    split_rdns(dn)
        .into_iter()
        .filter_map(|rdn| {
            let (attr, value) = rdn.trim().split_once('=')?;
            attr.trim()
                .eq_ignore_ascii_case("dc")
                .then(|| value.trim().to_string())
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Split a DN on its unescaped commas.
fn split_rdns(dn: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in dn.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ',' => {
                parts.push(&dn[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&dn[start..]);
    parts
}

/// Filter matching a user by sAMAccountName.
pub fn user_filter(sam_account_name: &str) -> String {
    format!(
        "(&(objectCategory=person)(objectClass=user)(sAMAccountName={}))",
        escape_filter_value(sam_account_name)
    )
}

/// Filter matching a group by cn, name or sAMAccountName.
pub fn group_filter(id: &str) -> String {
    let v = escape_filter_value(id);
    format!("(&(objectClass=group)(|(cn={v})(name={v})(sAMAccountName={v})))")
}
