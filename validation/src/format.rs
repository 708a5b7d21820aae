//! Field format predicates.

use regex::Regex;
use std::sync::LazyLock;

static MAC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{2}:){5}[0-9A-Fa-f]{2}$").expect("valid MAC regex")
});

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Six colon-separated hex octets, either case.
pub fn is_valid_mac(mac: &str) -> bool {
    MAC_PATTERN.is_match(mac)
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_examples() {
        assert!(is_valid_mac("00:1A:2B:3C:4D:5E"));
        assert!(is_valid_mac("aa:bb:cc:dd:ee:ff"));
        assert!(!is_valid_mac("001A2B3C4D5E"));
        assert!(!is_valid_mac("00:1A:2B:3C:4D"));
        assert!(!is_valid_mac("00-1A-2B-3C-4D-5E"));
        assert!(!is_valid_mac("00:1A:2B:3C:4D:5G"));
        assert!(!is_valid_mac(""));
    }

    #[test]
    fn email_examples() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("asha.rao@college.edu.in"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email(""));
    }
}
