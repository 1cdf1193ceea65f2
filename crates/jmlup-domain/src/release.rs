use serde::Serialize;

pub const VERSION_PLACEHOLDER: &str = "{version}";
pub const DEFAULT_VERSION: &str = "0.17.0-alpha-15";
pub const DEFAULT_URL_TEMPLATE: &str =
    "https://github.com/OpenJML/OpenJML/releases/download/{version}/openjml-ubuntu-20.04-{version}.zip";
/// Directory the published OpenJML archives wrap their JDK in.
pub const RELEASE_JAVA_HOME_SUBDIR: &str = "jdk";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReleaseError {
    #[error("release version must not be empty")]
    EmptyVersion,
    #[error("release version '{version}' must not contain whitespace or path separators")]
    InvalidVersion { version: String },
    #[error("release url template '{template}' must contain {{version}}")]
    MissingPlaceholder { template: String },
}

/// A pinned release and the template its download address is built from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReleaseSpec {
    version: String,
    url_template: String,
}

impl ReleaseSpec {
    /// Validates `version` and `url_template` together.
    ///
    /// # Errors
    /// Returns an error if the version is empty or unsafe to embed in a URL path, or if the
    /// template has no `{version}` placeholder.
    pub fn new(
        version: impl Into<String>,
        url_template: impl Into<String>,
    ) -> Result<Self, ReleaseError> {
        let version = version.into().trim().to_string();
        let url_template = url_template.into().trim().to_string();
        if version.is_empty() {
            return Err(ReleaseError::EmptyVersion);
        }
        if version
            .chars()
            .any(|ch| ch.is_whitespace() || ch == '/' || ch == '\\')
        {
            return Err(ReleaseError::InvalidVersion { version });
        }
        if !url_template.contains(VERSION_PLACEHOLDER) {
            return Err(ReleaseError::MissingPlaceholder {
                template: url_template,
            });
        }
        Ok(Self {
            version,
            url_template,
        })
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    #[must_use]
    pub fn download_url(&self) -> String {
        self.url_template
            .replace(VERSION_PLACEHOLDER, &self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_embeds_version_twice() {
        let release = ReleaseSpec::new("0.17.0-alpha-15", DEFAULT_URL_TEMPLATE).unwrap();
        assert_eq!(
            release.download_url(),
            "https://github.com/OpenJML/OpenJML/releases/download/0.17.0-alpha-15/openjml-ubuntu-20.04-0.17.0-alpha-15.zip"
        );
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let err = ReleaseSpec::new("v1", "https://example.invalid/openjml.zip").unwrap_err();
        assert!(matches!(err, ReleaseError::MissingPlaceholder { .. }));
    }

    #[test]
    fn rejects_versions_that_escape_the_url_path() {
        assert_eq!(
            ReleaseSpec::new("  ", DEFAULT_URL_TEMPLATE).unwrap_err(),
            ReleaseError::EmptyVersion
        );
        assert!(matches!(
            ReleaseSpec::new("../v1", DEFAULT_URL_TEMPLATE).unwrap_err(),
            ReleaseError::InvalidVersion { .. }
        ));
    }
}
