//! Hierarchical device filter.
//!
//! Device addresses are `domain/family/member`. A filter is a list of such
//! patterns where any segment may be the wildcard `*`. Queries cascade: the
//! domain level lists `domain*` prefixes, the family level expands the family
//! filters that apply to a concrete domain, and the member level expands the
//! member filters that apply to a concrete domain and family. Wildcard segments
//! are rewritten to the queried value, so every result is fully qualified.
//!
//! ```
//! use waltz_context::DeviceFilter;
//!
//! let filter = DeviceFilter::new("alice", vec!["a/b/*".into(), "a/c/1".into()]);
//! assert_eq!(filter.domain_filters(), ["a*"]);
//! assert_eq!(filter.family_filters("a"), ["a/b*", "a/c*"]);
//! assert_eq!(filter.member_filters("a", "c"), ["a/c/1"]);
//! ```

use std::collections::HashSet;

use tracing::{debug, warn};

/// Wildcard segment value.
pub const WILDCARD: &str = "*";

/// The single pattern that matches every device.
pub const UNIVERSAL_PATTERN: &str = "*/*/*";

const SEGMENTS: usize = 3;

/// Derived lookup sets for a user's device patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceFilter {
    user: String,
    value: Vec<String>,
    domain_filter: Vec<String>,
    family_filter: Vec<String>,
    member_filter: Vec<String>,
}

impl DeviceFilter {
    /// Build the domain, family and member sets from `patterns`.
    ///
    /// Malformed patterns (not exactly three segments) are kept in
    /// [`patterns`](Self::patterns) but contribute to no level of the
    /// cascade, so they can never widen visibility.
    pub fn new(user: impl Into<String>, patterns: Vec<String>) -> Self {
        let user = user.into();

        for pattern in patterns.iter().filter(|p| !is_well_formed(p)) {
            warn!(user = %user, pattern = %pattern, "ignoring malformed device pattern");
        }

        let member_filter: Vec<String> = patterns
            .iter()
            .filter(|p| is_well_formed(p))
            .cloned()
            .collect();
        let domain_filter = dedup(
            member_filter
                .iter()
                .map(|p| format!("{}{}", segment(p, 0), WILDCARD)),
        );
        let family_filter = dedup(
            member_filter
                .iter()
                .map(|p| format!("{}/{}", segment(p, 0), segment(p, 1))),
        );

        debug!(user = %user, value = ?patterns, "created device filter");

        Self {
            user,
            value: patterns,
            domain_filter,
            family_filter,
            member_filter,
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// The raw patterns this filter was built from.
    pub fn patterns(&self) -> &[String] {
        &self.value
    }

    /// True iff the patterns are exactly `["*/*/*"]`.
    pub fn is_universal(&self) -> bool {
        self.value.len() == 1 && self.value[0] == UNIVERSAL_PATTERN
    }

    pub fn domain_filters(&self) -> &[String] {
        &self.domain_filter
    }

    /// Family filters applicable to `domain`, rewritten as `domain/family*`.
    ///
    /// Applicability is a string prefix test on the family entry, so domain
    /// `a` also picks up entries declared for domain `ab`.
    pub fn family_filters(&self, domain: &str) -> Vec<String> {
        self.family_filter
            .iter()
            .filter(|it| it.starts_with(domain) || it.starts_with(WILDCARD))
            .map(|it| {
                let mut result = format!("{}/{}", domain, segment(it, 1));
                if !result.ends_with(WILDCARD) {
                    result.push_str(WILDCARD);
                }
                result
            })
            .collect()
    }

    /// Member filters applicable to `domain/family`, rewritten as
    /// `domain/family/member`.
    pub fn member_filters(&self, domain: &str, family: &str) -> Vec<String> {
        self.member_filter
            .iter()
            .filter(|it| {
                let d = segment(it, 0);
                let f = segment(it, 1);
                (d == domain || d == WILDCARD) && (f == family || f == WILDCARD)
            })
            .map(|it| format!("{}/{}/{}", domain, family, segment(it, 2)))
            .collect()
    }

    /// Patterns that do not have exactly three segments.
    pub fn malformed(&self) -> impl Iterator<Item = &str> + '_ {
        self.value
            .iter()
            .map(String::as_str)
            .filter(|p| !is_well_formed(p))
    }
}

fn segment(pattern: &str, index: usize) -> &str {
    pattern.split('/').nth(index).unwrap_or("")
}

fn is_well_formed(pattern: &str) -> bool {
    pattern.split('/').count() == SEGMENTS
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(item.clone())).collect()
}
