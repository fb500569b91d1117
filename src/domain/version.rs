use crate::domain::tag::ParsedTagName;
use std::cmp::Ordering;
use std::fmt;

/// The `MAJOR.MINOR` version a module declares in its version file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeclaredVersion {
    pub major: u64,
    pub minor: u64,
}

impl DeclaredVersion {
    pub fn new(major: u64, minor: u64) -> Self {
        DeclaredVersion { major, minor }
    }

    /// Parse a `MAJOR.MINOR` string (no patch component)
    ///
    /// Returns `None` for anything else, including `1.2.3` and `v1.2`.
    pub fn parse(text: &str) -> Option<Self> {
        let (major, minor) = text.trim().split_once('.')?;
        if !is_digits(major) || !is_digits(minor) {
            return None;
        }

        Some(DeclaredVersion {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }

    /// Whether a previous tag belongs to the same `MAJOR.MINOR` line
    pub fn matches(&self, tag: &ParsedTagName) -> bool {
        (self.major, self.minor) == tag.major_minor()
    }
}

impl fmt::Display for DeclaredVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Order two parsed tags by stability, then numeric triple.
///
/// A stable tag always ranks above an unstable one, whatever the numbers.
pub fn version_ordering(a: &ParsedTagName, b: &ParsedTagName) -> Ordering {
    match (a.unstable, b.unstable) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => (a.major, a.minor, a.patch).cmp(&(b.major, b.minor, b.patch)),
    }
}

/// Returns true when tag `a` is strictly lesser than tag `b`.
///
/// Accepts full refs or short names. Malformed input never compares as less.
pub fn compare_versions(a: &str, b: &str) -> bool {
    match (ParsedTagName::parse(a), ParsedTagName::parse(b)) {
        (Ok(a), Ok(b)) => version_ordering(&a, &b) == Ordering::Less,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_versions() {
        let cases = [
            ("/refs/tags/module/1.1.9-unstable", "/refs/tags/module/1.1.10-unstable", true),
            ("/refs/tags/module/1.1.10-unstable", "/refs/tags/module/1.2.0-unstable", true),
            ("/refs/tags/module/1.1.9", "/refs/tags/module/1.1.10", true),
            ("/refs/tags/module/1.1.9", "/refs/tags/module/1.1.9-unstable", false),
            ("/refs/tags/module/1.1.9-unstable", "/refs/tags/module/1.1.9-unstable", false),
            ("/refs/tags/module/1.1.10-unstable", "/refs/tags/module/1.1.9-unstable", false),
            ("ns/1.1.9-unstable", "ns/1.1.10-unstable", true),
            ("ns/1.1.9", "ns/1.1.9-unstable", false),
        ];

        for (a, b, expected) in cases {
            assert_eq!(
                compare_versions(a, b),
                expected,
                "compare_versions({}, {})",
                a,
                b
            );
        }
    }

    #[test]
    fn test_unstable_always_below_stable() {
        assert!(compare_versions("ns/9.9.9-unstable", "ns/0.0.1"));
        assert!(compare_versions("ns/1.1.9-unstable", "ns/1.1.9"));
        assert!(!compare_versions("ns/0.0.1", "ns/9.9.9-unstable"));
    }

    #[test]
    fn test_antisymmetric_on_distinct_triples() {
        let tags = ["a/0.0.1", "a/0.1.0", "a/1.0.0", "a/1.0.10", "a/1.2.3"];
        for x in tags {
            for y in tags {
                if x != y {
                    assert_ne!(compare_versions(x, y), compare_versions(y, x), "{} vs {}", x, y);
                }
            }
        }
    }

    #[test]
    fn test_malformed_never_less() {
        assert!(!compare_versions("refs/tags/v1.0.0", "refs/tags/alpha/2.0.0"));
        assert!(!compare_versions("refs/tags/alpha/2.0.0", "garbage"));
    }

    #[test]
    fn test_declared_version_parse() {
        assert_eq!(DeclaredVersion::parse("1.2\n").unwrap(), DeclaredVersion::new(1, 2));
        assert_eq!(DeclaredVersion::parse("  10.0 ").unwrap(), DeclaredVersion::new(10, 0));
    }

    #[test]
    fn test_declared_version_rejects_invalid() {
        for text in ["", "1", "1.2.3", "v1.2", "1.x", ".2"] {
            assert!(DeclaredVersion::parse(text).is_none(), "'{}' should not parse", text);
        }
    }

    #[test]
    fn test_declared_version_matches_tag() {
        let tag = ParsedTagName::new("teamA", 1, 2, 3, false);
        assert!(DeclaredVersion::new(1, 2).matches(&tag));
        assert!(!DeclaredVersion::new(1, 3).matches(&tag));
        assert_eq!(DeclaredVersion::new(1, 3).to_string(), "1.3");
    }
}
