//! Semantic version values.
//!
//! Versions are written `MAJOR[.MINOR[.PATCH]]`, optionally prefixed with `v`.
//! Missing components default to zero, so `8` and `8.0.0` are equal.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use nom::{
    IResult, Parser,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt},
    sequence::preceded,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurnError};

/// A `major.minor.patch` version.
///
/// Field order gives the lexicographic ordering used by [`Version::compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Creates a new version.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Compares two versions on (major, minor, patch).
    pub fn compare(&self, other: &Version) -> Ordering {
        self.cmp(other)
    }

    /// Returns true if a module declaring `self` satisfies a `required` version.
    ///
    /// Majors must match and the declared minor must be at least the required
    /// one. Patch never gates compatibility.
    pub fn is_compatible(&self, required: &Version) -> bool {
        self.major == required.major && self.minor >= required.minor
    }

    /// Parses a version string.
    pub fn parse(input: &str) -> Result<Self> {
        all_consuming(version)
            .parse(input.trim())
            .map(|(_, v)| v)
            .map_err(|_| SurnError::InvalidVersion {
                input: input.to_string(),
            })
    }
}

fn component(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| s.parse::<u32>()).parse(input)
}

fn version(input: &str) -> IResult<&str, Version> {
    let (input, _) = opt(char('v')).parse(input)?;
    let (input, major) = component(input)?;
    let (input, minor) = opt(preceded(char('.'), component)).parse(input)?;
    let (input, patch) = opt(preceded(char('.'), component)).parse(input)?;

    Ok((
        input,
        Version::new(major, minor.unwrap_or(0), patch.unwrap_or(0)),
    ))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = SurnError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = SurnError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_is_lexicographic() {
        let a = Version::new(1, 9, 9);
        let b = Version::new(2, 0, 0);
        let c = Version::new(2, 0, 1);

        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(c.compare(&b), Ordering::Greater);
        assert_eq!(b.compare(&Version::new(2, 0, 0)), Ordering::Equal);
        assert_eq!(
            Version::new(1, 2, 0).compare(&Version::new(1, 10, 0)),
            Ordering::Less
        );
    }

    #[test]
    fn test_compatibility_is_reflexive() {
        for v in [
            Version::new(0, 0, 0),
            Version::new(1, 0, 0),
            Version::new(8, 3, 12),
        ] {
            assert!(v.is_compatible(&v));
        }
    }

    #[test]
    fn test_compatibility_rules() {
        let declared = Version::new(8, 2, 0);

        assert!(declared.is_compatible(&Version::new(8, 0, 0)));
        assert!(declared.is_compatible(&Version::new(8, 2, 7)));
        assert!(!declared.is_compatible(&Version::new(8, 3, 0)));
        assert!(!declared.is_compatible(&Version::new(7, 0, 0)));
        assert!(!declared.is_compatible(&Version::new(9, 0, 0)));
    }

    #[test]
    fn test_parse_versions() {
        assert_eq!(Version::parse("8.0.0").unwrap(), Version::new(8, 0, 0));
        assert_eq!(Version::parse("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(Version::parse("8").unwrap(), Version::new(8, 0, 0));
        assert_eq!(Version::parse(" 8.1 ").unwrap(), Version::new(8, 1, 0));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "8.", "8.x.x", "1.2.3.4", "-1.0.0", "abc"] {
            let err = Version::parse(input).unwrap_err();
            assert!(matches!(err, SurnError::InvalidVersion { .. }), "{input}");
        }
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Version::new(8, 0, 0)).unwrap();
        assert_eq!(json, "\"8.0.0\"");

        let back: Version = serde_json::from_str("\"8.1.2\"").unwrap();
        assert_eq!(back, Version::new(8, 1, 2));

        assert!(serde_json::from_str::<Version>("\"nope\"").is_err());
    }
}
