//! Version information

use serde::Serialize;
use std::cmp::Ordering;

/// Package version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Detailed version information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerelease: Option<String>,
    pub rust_target: String,
    pub user_agent: String,
}

/// Current version information
pub fn version_info() -> VersionInfo {
    let (major, minor, patch, prerelease) = parse_version(VERSION).unwrap_or((0, 0, 0, None));
    VersionInfo {
        version: VERSION.to_string(),
        major,
        minor,
        patch,
        prerelease,
        rust_target: format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS),
        user_agent: format!("vibelog/{}", VERSION),
    }
}

/// Whether this build is a stable (non-prerelease) version
pub fn is_stable_version() -> bool {
    !VERSION.contains('-')
}

/// Compare the current version against `other` (numeric major.minor.patch)
///
/// Returns `None` when `other` is not a version string.
pub fn compare_version(other: &str) -> Option<Ordering> {
    let (a_major, a_minor, a_patch, a_pre) = parse_version(VERSION)?;
    let (b_major, b_minor, b_patch, b_pre) = parse_version(other)?;

    let ordering = (a_major, a_minor, a_patch)
        .cmp(&(b_major, b_minor, b_patch))
        .then_with(|| match (a_pre, b_pre) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(&b),
        });
    Some(ordering)
}

fn parse_version(version: &str) -> Option<(u64, u64, u64, Option<String>)> {
    let version = version.trim().trim_start_matches('v');
    // Build metadata does not take part in ordering
    let version = version.split('+').next()?;
    let (core, prerelease) = match version.split_once('-') {
        Some((core, pre)) => (core, Some(pre.to_string())),
        None => (version, None),
    };

    let mut parts = core.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor, patch, prerelease))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert_eq!(info.version, VERSION);
        assert_eq!(
            format!("{}.{}.{}", info.major, info.minor, info.patch),
            VERSION.split('-').next().unwrap()
        );
        assert_eq!(info.user_agent, format!("vibelog/{}", VERSION));
    }

    #[test]
    fn test_compare_version() {
        assert_eq!(compare_version(VERSION), Some(Ordering::Equal));
        assert_eq!(compare_version("999.0.0"), Some(Ordering::Less));
        assert_eq!(compare_version("0.0.0"), Some(Ordering::Greater));
        assert_eq!(compare_version("not-a-version"), None);
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("1.2.3"), Some((1, 2, 3, None)));
        assert_eq!(parse_version("v1.10.0"), Some((1, 10, 0, None)));
        assert_eq!(
            parse_version("2.0.0-beta.1+build.5"),
            Some((2, 0, 0, Some("beta.1".to_string())))
        );
        assert_eq!(parse_version("1.2"), None);
        assert_eq!(parse_version("1.2.3.4"), None);
    }

    #[test]
    fn test_numeric_ordering() {
        // 0.10.0 is newer than 0.9.0 even though it sorts lower as a string
        let a = parse_version("0.10.0").unwrap();
        let b = parse_version("0.9.0").unwrap();
        assert!((a.0, a.1, a.2) > (b.0, b.1, b.2));
    }
}
