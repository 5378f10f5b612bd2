//! Rule normalizer
//!
//! Turns the raw body of a successful fetch into the set of rules observed
//! by one capture. Lines are split on `\r\n`, `\r` or `\n`, linted one by
//! one, and deduplicated by exact string equality.
//!
//! The normalizer is only called with content. A failed fetch has no
//! content, which is different from content that yields zero rules.

pub mod lint;

pub use lint::{lint_raw_rule, MAX_RULE_LEN};

use std::collections::BTreeSet;

/// Counters describing one normalization pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Non-empty lines produced by splitting
    pub lines: usize,
    /// Lines rejected by the linter
    pub dropped: usize,
    /// Lines that linted to an already-seen rule
    pub duplicates: usize,
}

/// The deduplicated rule set of one capture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRules {
    pub rules: BTreeSet<String>,
    pub stats: NormalizeStats,
}

impl NormalizedRules {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Split on any line separator, discarding empty entries
pub fn split_lines(content: &str) -> impl Iterator<Item = &str> {
    // `\r\n` yields an empty entry between the two separators; it is
    // discarded like any other empty line.
    content
        .split(['\r', '\n'])
        .filter(|line| !line.is_empty())
}

/// Normalize raw content into a deduplicated rule set
pub fn normalize_rules(content: &str) -> NormalizedRules {
    let mut out = NormalizedRules::default();
    for line in split_lines(content) {
        out.stats.lines += 1;
        match lint_raw_rule(line) {
            Some(rule) => {
                if !out.rules.insert(rule.to_string()) {
                    out.stats.duplicates += 1;
                }
            }
            None => out.stats.dropped += 1,
        }
    }
    out
}
