//! CIDR classification for network rules.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Whether a CIDR block or address reaches beyond private address space.
///
/// Anything that does not parse is treated as not public, since unresolved
/// expressions must not produce findings.
#[must_use]
pub fn is_public_cidr(cidr: &str) -> bool {
    let cidr = cidr.trim();
    if cidr == "*" {
        return true;
    }

    let (address, prefix) = cidr.split_once('/').unwrap_or((cidr, ""));
    let Ok(address) = address.parse::<IpAddr>() else {
        return false;
    };
    let max_prefix = if address.is_ipv4() { 32 } else { 128 };
    let prefix = if prefix.is_empty() {
        max_prefix
    } else {
        match prefix.parse::<u8>() {
            Ok(p) if p <= max_prefix => p,
            _ => return false,
        }
    };

    // A short prefix covers public space whatever its base address.
    if prefix == 0 {
        return true;
    }

    match address {
        IpAddr::V4(v4) => !is_private_v4(v4) || prefix < private_v4_prefix(v4),
        IpAddr::V6(v6) => !is_private_v6(v6) || prefix < 7,
    }
}

fn is_private_v4(address: Ipv4Addr) -> bool {
    address.is_private() || address.is_loopback() || address.is_link_local() || address.is_unspecified()
}

/// The prefix length of the private range containing `address`.
fn private_v4_prefix(address: Ipv4Addr) -> u8 {
    match address.octets() {
        [10, ..] => 8,
        [172, b, ..] if (16..=31).contains(&b) => 12,
        [192, 168, ..] => 16,
        [127, ..] => 8,
        [169, 254, ..] => 16,
        _ => 32,
    }
}

fn is_private_v6(address: Ipv6Addr) -> bool {
    address.is_loopback() || address.is_unspecified() || (address.segments()[0] & 0xfe00) == 0xfc00
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("0.0.0.0/0", true; "ipv4 any")]
    #[test_case("::/0", true; "ipv6 any")]
    #[test_case("*", true; "wildcard")]
    #[test_case("8.8.8.8", true; "public host")]
    #[test_case("52.0.0.0/8", true; "public range")]
    #[test_case("10.0.0.0/8", false; "private range")]
    #[test_case("10.10.10.1", false; "private host")]
    #[test_case("192.168.1.0/24", false; "private class c")]
    #[test_case("172.16.0.0/4", true; "prefix wider than private range")]
    #[test_case("fd00::/8", false; "unique local")]
    #[test_case("2001:db8::/32", true; "global ipv6")]
    #[test_case("", false; "empty")]
    #[test_case("var.cidr", false; "unresolved")]
    fn test_is_public_cidr(cidr: &str, expected: bool) {
        assert_eq!(is_public_cidr(cidr), expected);
    }
}
