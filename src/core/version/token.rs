use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{DistroError, DistroResult};

/// A parsed game version such as `1.16.5` or `1.16.5-snapshot`.
///
/// Ordering is numeric on `major.minor.patch`, then by tag, where a version
/// without a tag sorts after every tagged version of the same numbers
/// (`1.16.5-pre1 < 1.16.5`). Missing components count as zero, so `1.13`
/// and `1.13.0` compare equal. `raw` is kept for display and serialization
/// only and never takes part in comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionToken {
    major: u32,
    minor: u32,
    patch: u32,
    tag: Option<String>,
    /// Whether the patch component was written out.
    explicit_patch: bool,
    raw: String,
}

impl VersionToken {
    /// A release version without a tag.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        let raw = if patch == 0 {
            format!("{}.{}", major, minor)
        } else {
            format!("{}.{}.{}", major, minor, patch)
        };
        Self {
            major,
            minor,
            patch,
            tag: None,
            explicit_patch: patch != 0,
            raw,
        }
    }

    pub fn parse(raw: &str) -> DistroResult<Self> {
        let invalid = || DistroError::InvalidVersion(raw.to_string());

        let trimmed = raw.trim();
        let body = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let (base, tag) = match body.split_once('-') {
            Some((_, "")) => return Err(invalid()),
            Some((b, t)) => (b, Some(t.to_string())),
            None => (body, None),
        };

        let mut numbers = [0u32; 3];
        let mut count = 0;
        for part in base.split('.') {
            if count == numbers.len() || part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(invalid());
            }
            numbers[count] = part.parse().map_err(|_| invalid())?;
            count += 1;
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            tag,
            explicit_patch: count == 3,
            raw: trimmed.to_string(),
        })
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn patch(&self) -> u32 {
        self.patch
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `major.minor[.patch][-tag]` without the cosmetic prefix or leading
    /// zeros of the input. Used wherever the version ends up in a maven
    /// coordinate or a remote query.
    pub fn canonical(&self) -> String {
        let mut out = format!("{}.{}", self.major, self.minor);
        if self.explicit_patch {
            out.push_str(&format!(".{}", self.patch));
        }
        if let Some(tag) = &self.tag {
            out.push('-');
            out.push_str(tag);
        }
        out
    }

    pub fn is_at_least(&self, other: &VersionToken) -> bool {
        self >= other
    }

    /// `lo <= self <= hi_inclusive`.
    pub fn in_range(&self, lo: &VersionToken, hi_inclusive: &VersionToken) -> bool {
        self >= lo && self <= hi_inclusive
    }
}

impl Ord for VersionToken {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.tag, &other.tag) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for VersionToken {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionToken {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionToken {}

impl FromStr for VersionToken {
    type Err = DistroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionToken {
    type Error = DistroError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionToken> for String {
    fn from(value: VersionToken) -> Self {
        value.raw
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
