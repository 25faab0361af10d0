use semver::Version;

use crate::error::{Result, TolkError};

/// Parse a compiler version string such as `0.12.0` or `v0.12.0`.
pub fn parse_version(version: &str) -> Result<Version> {
  let trimmed = version.trim().trim_start_matches('v');
  Version::parse(trimmed).map_err(|source| TolkError::Version {
    version: version.to_string(),
    source,
  })
}
