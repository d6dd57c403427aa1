//! URL pattern matching.
//!
//! Pure functions, no state. Malformed input never blocks: an unparsable
//! URL or an invalid regex evaluates to "no match".

use regex::RegexBuilder;
use url::Url;

/// Does `url` match `pattern`?
///
/// Non-regex patterns match on hostname: equal to the pattern or a
/// subdomain of it, case-insensitively. Regex patterns are compiled
/// case-insensitive and matched against the full URL string so path rules
/// (`youtube\.com/watch`) work.
pub fn matches(url: &str, pattern: &str, is_regex: bool) -> bool {
    if is_regex {
        matches_regex(url, pattern)
    } else {
        matches_host(url, pattern)
    }
}

fn matches_host(url: &str, pattern: &str) -> bool {
    let Some(host) = hostname(url) else {
        return false;
    };
    let pattern = pattern.to_ascii_lowercase();
    host == pattern || host.ends_with(&format!(".{pattern}"))
}

fn matches_regex(url: &str, pattern: &str) -> bool {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => re.is_match(url),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "ignoring invalid regex rule");
            false
        }
    }
}

/// Lowercased hostname of `url`, or `None` if it does not parse or has no
/// host (e.g. `about:blank`, `chrome://settings`).
pub fn hostname(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().map(|h| h.to_ascii_lowercase())
}
