//! Gate scope matching.
//!
//! # Responsibilities
//! - Decide which request paths the gate evaluates at all
//! - Exclude API endpoints, framework internals and static files
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Exclusions combine with OR semantics: any match leaves the path ungated
//! - No regex; each matcher scans the path once

/// Trait for matching request paths against conditions.
pub trait PathMatcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

fn after_root(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Matches paths whose text after the leading slash starts with a prefix.
#[derive(Debug, Clone)]
pub struct LeadingPrefixMatcher {
    prefix: String,
}

impl LeadingPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl PathMatcher for LeadingPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        after_root(path).starts_with(&self.prefix)
    }
}

/// Matches root files such as `/favicon.ico` or `/robots.txt/...`:
/// `[\w-]+\.\w+` right after the leading slash.
#[derive(Debug, Clone, Default)]
pub struct RootFileMatcher;

impl PathMatcher for RootFileMatcher {
    fn matches(&self, path: &str) -> bool {
        let rest = after_root(path);
        let stem_len = rest
            .find(|c: char| !(is_word_char(c) || c == '-'))
            .unwrap_or(rest.len());
        if stem_len == 0 {
            return false;
        }
        rest[stem_len..]
            .strip_prefix('.')
            .and_then(|ext| ext.chars().next())
            .is_some_and(is_word_char)
    }
}

/// Matches paths whose last segment carries a file extension.
#[derive(Debug, Clone, Default)]
pub struct ExtensionMatcher;

impl PathMatcher for ExtensionMatcher {
    fn matches(&self, path: &str) -> bool {
        let last = path.rsplit('/').next().unwrap_or_default();
        match last.rsplit_once('.') {
            Some((stem, ext)) => !stem.is_empty() && !ext.is_empty() && ext.chars().all(is_word_char),
            None => false,
        }
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn PathMatcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn PathMatcher>>) -> Self {
        Self { matchers }
    }
}

impl PathMatcher for AnyMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

/// The set of paths the gate runs for.
#[derive(Debug)]
pub struct GateScope {
    excluded: AnyMatcher,
}

impl Default for GateScope {
    fn default() -> Self {
        Self {
            excluded: AnyMatcher::new(vec![
                Box::new(LeadingPrefixMatcher::new("api")),
                Box::new(LeadingPrefixMatcher::new("_next")),
                Box::new(RootFileMatcher),
                Box::new(ExtensionMatcher),
            ]),
        }
    }
}

impl GateScope {
    pub fn is_gated(&self, path: &str) -> bool {
        !self.excluded.matches(path)
    }
}
