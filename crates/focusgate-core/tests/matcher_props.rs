//! Property tests for URL pattern matching.

use focusgate_core::matcher;
use proptest::prelude::*;

fn label() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,10}"
}

proptest! {
    /// Hostname matching is exactly "equal or subdomain", case aside.
    #[test]
    fn host_rule_matches_iff_equal_or_subdomain(
        sub in label(),
        domain in label(),
        tld in "[a-z]{2,4}",
    ) {
        let pattern = format!("{domain}.{tld}");

        let exact = format!("https://{domain}.{tld}/page");
        prop_assert!(matcher::matches(&exact, &pattern, false));

        let subdomain = format!("https://{sub}.{domain}.{tld}/page");
        prop_assert!(matcher::matches(&subdomain, &pattern, false));

        // Prefixing the leftmost label breaks the dot boundary.
        let prefixed = format!("https://x{domain}.{tld}/page");
        prop_assert!(!matcher::matches(&prefixed, &pattern, false));
    }

    /// Case never affects a host rule.
    #[test]
    fn host_rule_is_case_insensitive(domain in label(), tld in "[a-z]{2,4}") {
        let pattern = format!("{domain}.{tld}");
        let shouted = format!("https://WWW.{}.{}/A", domain.to_uppercase(), tld.to_uppercase());
        prop_assert!(matcher::matches(&shouted, &pattern, false));
    }

    /// Arbitrary non-URL input is never a match and never a panic.
    #[test]
    fn garbage_input_never_matches(garbage in "[^:]{0,40}") {
        prop_assert!(!matcher::matches(&garbage, "facebook.com", false));
    }
}
