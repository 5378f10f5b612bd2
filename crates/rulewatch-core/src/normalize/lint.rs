//! Single-line lint rules
//!
//! A raw line either lints to a cleaned rule or is dropped. Dropping is
//! never an error.

/// Longest rule kept, in characters
pub const MAX_RULE_LEN: usize = 8192;

/// Prefixes that make a `#` line an element-hiding rule rather than a comment
const ELEMENT_HIDING_MARKERS: &[&str] = &["##", "#@#", "#?#", "#$#", "#%#", "#@$#", "#@?#", "#@%#"];

/// Clean one raw line, returning `None` when it should be dropped
pub fn lint_raw_rule(raw: &str) -> Option<&str> {
    let rule = raw.trim();
    if rule.is_empty()
        || is_comment(rule)
        || is_header(rule)
        || rule.chars().count() > MAX_RULE_LEN
        || rule.chars().any(|c| c.is_control() && c != '\t')
    {
        return None;
    }
    Some(rule)
}

fn is_comment(rule: &str) -> bool {
    if rule.starts_with('!') {
        return true;
    }
    rule.starts_with('#') && !ELEMENT_HIDING_MARKERS.iter().any(|m| rule.starts_with(m))
}

// `[Adblock Plus 2.0]` and similar list headers
fn is_header(rule: &str) -> bool {
    rule.starts_with('[') && rule.ends_with(']')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(lint_raw_rule("  ||ads.example^\t"), Some("||ads.example^"));
    }

    #[test]
    fn test_keeps_interior_whitespace() {
        assert_eq!(lint_raw_rule("0.0.0.0 ads.example"), Some("0.0.0.0 ads.example"));
    }

    #[test]
    fn test_drops_blank() {
        assert_eq!(lint_raw_rule("   "), None);
    }

    #[test]
    fn test_drops_adblock_comments() {
        assert_eq!(lint_raw_rule("! Title: EasyList"), None);
        assert_eq!(lint_raw_rule("!#if env_firefox"), None);
    }

    #[test]
    fn test_drops_hosts_comments() {
        assert_eq!(lint_raw_rule("# hosts file"), None);
        assert_eq!(lint_raw_rule("#"), None);
    }

    #[test]
    fn test_keeps_element_hiding_rules() {
        assert_eq!(lint_raw_rule("##.ad-banner"), Some("##.ad-banner"));
        assert_eq!(lint_raw_rule("#@#.sponsored"), Some("#@#.sponsored"));
        assert_eq!(lint_raw_rule("#?#div:has(> .ad)"), Some("#?#div:has(> .ad)"));
    }

    #[test]
    fn test_drops_headers() {
        assert_eq!(lint_raw_rule("[Adblock Plus 2.0]"), None);
    }

    #[test]
    fn test_drops_over_long_rules() {
        let long = "a".repeat(MAX_RULE_LEN + 1);
        assert_eq!(lint_raw_rule(&long), None);
        let limit = "a".repeat(MAX_RULE_LEN);
        assert_eq!(lint_raw_rule(&limit), Some(limit.as_str()));
    }

    #[test]
    fn test_drops_control_characters() {
        assert_eq!(lint_raw_rule("ads\u{0}.example"), None);
        assert_eq!(lint_raw_rule("a\tb"), Some("a\tb"));
    }
}
