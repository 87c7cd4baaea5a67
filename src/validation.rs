//! E-mail address checks applied to signup, login and verification input.

use crate::error::ApiError;
use std::net::{IpAddr, Ipv6Addr};

const MAX_ADDRESS_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;
const MAX_LABEL_LEN: usize = 63;
const ATEXT_SPECIALS: &str = "!#$%&'*+/=?^_`{|}~";

/// Returns the address in canonical form (surrounding whitespace removed,
/// domain lower-cased) or a 422 error when it is not a valid address.
///
/// ```
/// use studenthub::validation::normalize_email;
///
/// assert_eq!(normalize_email(" Ada@Example.COM ").unwrap(), "Ada@example.com");
/// assert!(normalize_email("not-an-address").is_err());
/// ```
pub fn normalize_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim();
    if !is_valid_email(email) {
        return Err(ApiError::Validation(
            "value is not a valid email address".to_string(),
        ));
    }
    // Validity implies an unquoted '@' exists.
    let (local, domain) = split_address(email).unwrap_or((email, ""));
    Ok(format!("{}@{}", local, domain.to_lowercase()))
}

/// Syntax check following RFC 5322 (dot-atom and quoted local parts,
/// domain literals) with RFC 6531 internationalized characters allowed.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() > MAX_ADDRESS_LEN {
        return false;
    }
    match split_address(email) {
        Some((local, domain)) => {
            local.len() <= MAX_LOCAL_LEN && is_valid_local(local) && is_valid_domain(domain)
        }
        None => false,
    }
}

/// Splits at the first '@' that is not inside a quoted local part.
fn split_address(email: &str) -> Option<(&str, &str)> {
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in email.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            '@' if !quoted => return Some((&email[..i], &email[i + 1..])),
            _ => {}
        }
    }
    None
}

fn is_valid_local(local: &str) -> bool {
    match local.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) if local.len() >= 2 => is_valid_quoted(inner),
        _ => is_valid_dot_atom(local),
    }
}

fn is_valid_quoted(inner: &str) -> bool {
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            if c != '\\' && c != '"' {
                return false;
            }
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return false;
        }
    }
    !escaped
}

fn is_valid_dot_atom(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|atom| {
            !atom.is_empty()
                && atom
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '-' || ATEXT_SPECIALS.contains(c))
        })
}

fn is_valid_domain(domain: &str) -> bool {
    if let Some(literal) = domain.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return literal.parse::<IpAddr>().is_ok()
            || literal
                .strip_prefix("IPv6:")
                .is_some_and(|ip| ip.parse::<Ipv6Addr>().is_ok());
    }
    !domain.is_empty() && domain.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_alphanumeric() || c == '-')
}
