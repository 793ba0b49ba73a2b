//! OID text helpers and row-index extraction.
//!
//! Every vendor join derives its row key from the returned OID. The common
//! case is [`table_index`]: strip the walked prefix and keep the next
//! component. Joins with compound keys slice components from the end with
//! [`component_from_end`] or take the whole [`suffix`].

use std::net::Ipv6Addr;

use super::SnmpError;

/// Render an OID with exactly one leading dot and no trailing dot.
pub fn normalize(oid: &str) -> String {
    let trimmed = oid.trim().trim_matches('.');
    format!(".{trimmed}")
}

/// Parse dotted OID text into numeric components.
pub fn parse_oid(oid: &str) -> Result<Vec<u64>, SnmpError> {
    oid.trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| SnmpError::InvalidOid(oid.to_string()))
}

/// Render numeric components as dotted OID text with a leading dot.
pub fn format_oid(parts: &[u64]) -> String {
    let mut out = String::with_capacity(parts.len() * 4);
    for part in parts {
        out.push('.');
        out.push_str(&part.to_string());
    }
    out
}

/// Everything after `prefix.` in `oid`, or `None` when `oid` is not under `prefix`.
pub fn suffix<'a>(oid: &'a str, prefix: &str) -> Option<&'a str> {
    let oid = oid.strip_prefix('.').unwrap_or(oid);
    let prefix = prefix.trim_matches('.');
    oid.strip_prefix(prefix)?.strip_prefix('.')
}

/// Row index of `oid` within the table rooted at `prefix`.
///
/// Returns the first component after the prefix, or an empty string when
/// the OID is not under the prefix.
///
/// ```
/// use netfetch::snmp::index::table_index;
///
/// assert_eq!(table_index(".1.3.6.1.6.3.10.2.1.3.0", ".1.3.6.1.6.3.10.2.1.3"), "0");
/// assert_eq!(table_index(".1.3.6.1.2.1.2.2.1.13.7.1", ".1.3.6.1.2.1.2.2.1.13"), "7");
/// assert_eq!(table_index(".1.3.6.1.2.1.2.2.1.14.7", ".1.3.6.1.2.1.2.2.1.13"), "");
/// ```
pub fn table_index(oid: &str, prefix: &str) -> String {
    match suffix(oid, prefix) {
        Some(rest) => rest.split('.').next().unwrap_or_default().to_string(),
        None => String::new(),
    }
}

/// The `n`-th component counting from the end (1 = last).
pub fn component_from_end(oid: &str, n: usize) -> &str {
    let parts: Vec<&str> = oid.split('.').collect();
    if n == 0 || n > parts.len() {
        return "";
    }
    parts[parts.len() - n]
}

/// The last `n` components joined with dots.
pub fn last_components(oid: &str, n: usize) -> String {
    let parts: Vec<&str> = oid.split('.').collect();
    let start = parts.len().saturating_sub(n);
    parts[start..].join(".")
}

/// Format decimal octet strings (as found in OID suffixes) as a compressed
/// IPv6 address.
pub fn ipv6_from_octets(octets: &[&str]) -> Option<String> {
    if octets.len() != 16 {
        return None;
    }
    let mut bytes = [0u8; 16];
    for (slot, text) in bytes.iter_mut().zip(octets) {
        *slot = text.parse().ok()?;
    }
    Some(Ipv6Addr::from(bytes).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("1.3.6.1"), ".1.3.6.1");
        assert_eq!(normalize(".1.3.6.1."), ".1.3.6.1");
        assert_eq!(normalize(" .1.3 "), ".1.3");
    }

    #[test]
    fn test_parse_and_format_oid() {
        let parts = parse_oid(".1.3.6.1.2.1.1.5.0").unwrap();
        assert_eq!(parts, vec![1, 3, 6, 1, 2, 1, 1, 5, 0]);
        assert_eq!(format_oid(&parts), ".1.3.6.1.2.1.1.5.0");
        assert!(parse_oid(".1.3.x").is_err());
    }

    #[test]
    fn test_table_index_takes_single_component() {
        let prefix = ".1.3.6.1.4.1.9.9.91.1.1.1.1.4";
        assert_eq!(table_index(".1.3.6.1.4.1.9.9.91.1.1.1.1.4.1003", prefix), "1003");
        assert_eq!(table_index(".1.3.6.1.4.1.9.9.91.1.1.1.1.4.10.2", prefix), "10");
    }

    #[test]
    fn test_table_index_rejects_sibling_column() {
        // .13 must not match .130
        assert_eq!(
            table_index(".1.3.6.1.2.1.2.2.1.130.1", ".1.3.6.1.2.1.2.2.1.13"),
            ""
        );
    }

    #[test]
    fn test_table_index_accepts_prefix_without_leading_dot() {
        assert_eq!(
            table_index(".1.3.6.1.4.1.5597.30.0.2.2.0", "1.3.6.1.4.1.5597.30.0.2.2"),
            "0"
        );
    }

    #[test]
    fn test_table_index_exact_match_is_empty() {
        assert_eq!(table_index(".1.3.6.1.2.1.1.5.0", ".1.3.6.1.2.1.1.5.0"), "");
    }

    #[test]
    fn test_suffix() {
        assert_eq!(
            suffix(".1.3.6.1.2.1.4.20.1.2.10.0.0.1", ".1.3.6.1.2.1.4.20.1.2"),
            Some("10.0.0.1")
        );
        assert_eq!(suffix(".1.3.6.2", ".1.3.6.1"), None);
    }

    #[test]
    fn test_component_helpers() {
        let oid = ".1.3.6.1.4.1.9.9.113.1.2.1.1.11.5.1.3";
        assert_eq!(component_from_end(oid, 1), "3");
        assert_eq!(component_from_end(oid, 3), "5");
        assert_eq!(component_from_end(oid, 99), "");
        assert_eq!(last_components(oid, 3), "5.1.3");
    }

    #[test]
    fn test_ipv6_from_octets_compresses_zero_run() {
        let octets = [
            "32", "1", "13", "184", "0", "0", "0", "0", "0", "0", "0", "0", "0", "0", "0", "1",
        ];
        assert_eq!(ipv6_from_octets(&octets).as_deref(), Some("2001:db8::1"));
    }

    #[test]
    fn test_ipv6_from_octets_rejects_short_input() {
        assert_eq!(ipv6_from_octets(&["1", "2"]), None);
    }
}
