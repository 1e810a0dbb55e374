use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use crate::params::DistributionType;

/// Loosely parsed Gradle version, e.g. `8.0.2`, `7.6` or `8.5-rc-1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradleVersion {
    raw: String,
    major: u32,
    minor: u32,
    patch: u32,
}

/// First version whose wrapper task exposes a network timeout
const NETWORK_TIMEOUT_SINCE: (u32, u32, u32) = (7, 6, 0);

fn distribution_url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"gradle-([0-9][^/]*?)-(bin|all)\.zip$")
            .expect("distribution url regex is valid")
    })
}

impl GradleVersion {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let numeric = raw.split(['-', ' ']).next()?;
        let mut parts = numeric.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(part) => part.parse().ok()?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(part) => part.parse().ok()?,
            None => 0,
        };
        Some(Self {
            raw: raw.to_string(),
            major,
            minor,
            patch,
        })
    }

    /// Extract version and distribution type from a services.gradle.org style URL
    pub fn from_distribution_url(url: &str) -> Option<(Self, DistributionType)> {
        let captures = distribution_url_regex().captures(url)?;
        let version = Self::parse(captures.get(1)?.as_str())?;
        let distribution_type = captures.get(2)?.as_str().parse().ok()?;
        Some((version, distribution_type))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn supports_network_timeout(&self) -> bool {
        (self.major, self.minor, self.patch) >= NETWORK_TIMEOUT_SINCE
    }
}

impl PartialOrd for GradleVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GradleVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }
}

impl fmt::Display for GradleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        let version = GradleVersion::parse("8.0.2").unwrap();
        assert_eq!(version.as_str(), "8.0.2");
        assert!(GradleVersion::parse("7.6").unwrap() > GradleVersion::parse("7.5.1").unwrap());
        assert!(GradleVersion::parse("8.10").unwrap() > GradleVersion::parse("8.9").unwrap());
        assert_eq!(GradleVersion::parse("8.5-rc-1").unwrap().to_string(), "8.5-rc-1");
        assert!(GradleVersion::parse("latest").is_none());
    }

    #[test]
    fn test_network_timeout_support() {
        assert!(!GradleVersion::parse("7.5.1").unwrap().supports_network_timeout());
        assert!(GradleVersion::parse("7.6").unwrap().supports_network_timeout());
        assert!(GradleVersion::parse("8.0.2").unwrap().supports_network_timeout());
    }

    #[test]
    fn test_from_distribution_url() {
        let (version, distribution_type) = GradleVersion::from_distribution_url(
            "https://services.gradle.org/distributions/gradle-8.0.2-all.zip",
        )
        .unwrap();
        assert_eq!(version.as_str(), "8.0.2");
        assert_eq!(distribution_type, DistributionType::All);

        let (version, distribution_type) = GradleVersion::from_distribution_url(
            "https://services.gradle.org/distributions-snapshots/gradle-8.5-rc-1-bin.zip",
        )
        .unwrap();
        assert_eq!(version.as_str(), "8.5-rc-1");
        assert_eq!(distribution_type, DistributionType::Bin);

        assert!(GradleVersion::from_distribution_url("https://example.com/tool.zip").is_none());
    }
}
