use crate::error::{Result, VertagError};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Prefix of every tag reference
pub const TAG_REF_PREFIX: &str = "refs/tags/";

/// Suffix carried by tags created from non-stable branches
pub const UNSTABLE_SUFFIX: &str = "-unstable";

/// Refspec pushing every local tag to the same name on the remote
pub const ALL_TAGS_REFSPEC: &str = "refs/tags/*:refs/tags/*";

fn tag_regex() -> &'static Regex {
    static TAG_RE: OnceLock<Regex> = OnceLock::new();
    TAG_RE.get_or_init(|| {
        Regex::new(r"^(?P<ns>[^/]+(?:/[^/]+)*)/(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)(?P<unstable>-unstable)?$")
            .expect("tag name regex is valid")
    })
}

/// A module tag name split into its typed parts
///
/// Accepts both full references (`refs/tags/teamA/1.2.3-unstable`) and short
/// names (`teamA/1.2.3`). The namespace is everything before the final `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedTagName {
    pub namespace: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub unstable: bool,
}

impl ParsedTagName {
    pub fn new(namespace: impl Into<String>, major: u64, minor: u64, patch: u64, unstable: bool) -> Self {
        ParsedTagName {
            namespace: namespace.into(),
            major,
            minor,
            patch,
            unstable,
        }
    }

    /// Parse a tag reference or short tag name
    pub fn parse(name: &str) -> Result<Self> {
        let short = strip_ref_prefix(name);

        let caps = tag_regex().captures(short).ok_or_else(|| {
            VertagError::malformed_tag(
                name,
                "expected <namespace>/<major>.<minor>.<patch>[-unstable]",
            )
        })?;

        let number = |group: &str| -> Result<u64> {
            caps[group]
                .parse::<u64>()
                .map_err(|e| VertagError::malformed_tag(name, format!("invalid {}: {}", group, e)))
        };

        Ok(ParsedTagName {
            namespace: caps["ns"].to_string(),
            major: number("major")?,
            minor: number("minor")?,
            patch: number("patch")?,
            unstable: caps.name("unstable").is_some(),
        })
    }

    /// The `MAJOR.MINOR` part of this tag
    pub fn major_minor(&self) -> (u64, u64) {
        (self.major, self.minor)
    }

    /// Full reference name, e.g. `refs/tags/teamA/1.2.3`
    pub fn ref_name(&self) -> String {
        format!("{}{}", TAG_REF_PREFIX, self)
    }
}

impl fmt::Display for ParsedTagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}.{}.{}",
            self.namespace, self.major, self.minor, self.patch
        )?;
        if self.unstable {
            f.write_str(UNSTABLE_SUFFIX)?;
        }
        Ok(())
    }
}

/// Drop a leading `/` and the `refs/tags/` prefix, if present
pub fn strip_ref_prefix(name: &str) -> &str {
    let trimmed = name.trim_start_matches('/');
    trimmed.strip_prefix(TAG_REF_PREFIX).unwrap_or(trimmed)
}

/// True when a tag name carries the unstable marker anywhere
pub fn is_unstable_name(name: &str) -> bool {
    name.contains(UNSTABLE_SUFFIX)
}
