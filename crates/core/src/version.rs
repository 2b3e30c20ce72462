use serde::Serialize;

/// Crate version, fixed at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const PRE_RELEASE: &str = env!("CARGO_PKG_VERSION_PRE");
const BUILD_DATE: Option<&str> = option_env!("UNIMAIL_BUILD_DATE");
const GIT_COMMIT: Option<&str> = option_env!("UNIMAIL_GIT_COMMIT");

/// Detailed build and version metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: &'static str,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_release: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_date: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<&'static str>,
}

/// Version metadata for this build.
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: VERSION,
        major: parse_component(env!("CARGO_PKG_VERSION_MAJOR")),
        minor: parse_component(env!("CARGO_PKG_VERSION_MINOR")),
        patch: parse_component(env!("CARGO_PKG_VERSION_PATCH")),
        pre_release: non_empty(Some(PRE_RELEASE)),
        build_date: non_empty(BUILD_DATE),
        git_commit: non_empty(GIT_COMMIT),
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.version)?;
        if let Some(commit) = self.git_commit {
            write!(f, " ({commit})")?;
        }
        if let Some(date) = self.build_date {
            write!(f, " built {date}")?;
        }
        Ok(())
    }
}

fn parse_component(value: &str) -> u32 {
    value.parse().unwrap_or_default()
}

fn non_empty(value: Option<&'static str>) -> Option<&'static str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_match_version_string() {
        let info = version_info();
        let expected = format!("{}.{}.{}", info.major, info.minor, info.patch);
        assert!(info.version.starts_with(&expected));
        assert_eq!(info.version, VERSION);
    }

    #[test]
    fn display_includes_available_metadata() {
        let mut info = VersionInfo {
            version: "1.0.2",
            major: 1,
            minor: 0,
            patch: 2,
            pre_release: None,
            build_date: None,
            git_commit: None,
        };
        assert_eq!(info.to_string(), "v1.0.2");

        info.git_commit = Some("abc123");
        info.build_date = Some("2024-05-01");
        assert_eq!(info.to_string(), "v1.0.2 (abc123) built 2024-05-01");
    }

    #[test]
    fn json_omits_empty_fields() {
        let info = VersionInfo {
            version: "1.0.2",
            major: 1,
            minor: 0,
            patch: 2,
            pre_release: None,
            build_date: None,
            git_commit: Some("abc123"),
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["version"], "1.0.2");
        assert_eq!(json["gitCommit"], "abc123");
        assert!(json.get("preRelease").is_none());
        assert!(json.get("buildDate").is_none());
    }
}
