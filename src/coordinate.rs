use std::fmt;

use crate::error::{DocsError, Result};

/// Version token that asks for the latest release instead of a literal version.
pub const RELEASE_TOKEN: &str = "release";

/// A (group, artifact, version) triple identifying one documentation archive
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    group: String,
    artifact: String,
    version: String,
}

impl Coordinate {
    /// Build a coordinate, rejecting segments that would escape the cache tree
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let coordinate = Coordinate {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        };
        validate_segment("group", &coordinate.group)?;
        validate_segment("artifact", &coordinate.artifact)?;
        validate_segment("version", &coordinate.version)?;
        Ok(coordinate)
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Group with dots replaced by slashes, as laid out in a Maven repository
    pub fn group_path(&self) -> String {
        group_path(&self.group)
    }

    /// Memo key shared by every version of this artifact
    pub fn memo_key(&self) -> String {
        memo_key(&self.group, &self.artifact)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

pub fn group_path(group: &str) -> String {
    group.replace('.', "/")
}

pub fn memo_key(group: &str, artifact: &str) -> String {
    format!("{group}:{artifact}")
}

/// Check that a coordinate segment can be used as a single path component.
pub fn validate_segment(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(DocsError::malformed(format!("{kind} is empty")));
    }
    if value == "." || value == ".." {
        return Err(DocsError::malformed(format!("{kind} '{value}' is not allowed")));
    }
    if value.contains(['/', '\\']) {
        return Err(DocsError::malformed(format!(
            "{kind} '{value}' contains a path separator"
        )));
    }
    Ok(())
}

/// How documentation archives are named inside a repository and the local cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    pub classifier: String,
    pub extension: String,
}

impl ArchiveLayout {
    pub fn new(classifier: impl Into<String>, extension: impl Into<String>) -> Self {
        ArchiveLayout {
            classifier: classifier.into(),
            extension: extension.into(),
        }
    }

    /// `<artifact>-<version>-<classifier>.<extension>`
    pub fn file_name(&self, coordinate: &Coordinate) -> String {
        format!(
            "{}-{}-{}.{}",
            coordinate.artifact, coordinate.version, self.classifier, self.extension
        )
    }
}

impl Default for ArchiveLayout {
    fn default() -> Self {
        ArchiveLayout::new("javadoc", "jar")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_path_replaces_dots() {
        let coordinate = Coordinate::new("org.vaadin.addon", "grid", "1.0").unwrap();
        assert_eq!(coordinate.group_path(), "org/vaadin/addon");
        assert_eq!(coordinate.group(), "org.vaadin.addon");
    }

    #[test]
    fn test_rejects_separators_and_dot_segments() {
        assert!(Coordinate::new("org/evil", "a", "1").is_err());
        assert!(Coordinate::new("g", "a\\b", "1").is_err());
        assert!(Coordinate::new("g", "a", "..").is_err());
        assert!(Coordinate::new("", "a", "1").is_err());
    }

    #[test]
    fn test_layout_file_name() {
        let coordinate = Coordinate::new("g", "a", "1.0").unwrap();
        assert_eq!(ArchiveLayout::default().file_name(&coordinate), "a-1.0-javadoc.jar");
        assert_eq!(
            ArchiveLayout::new("docs", "zip").file_name(&coordinate),
            "a-1.0-docs.zip"
        );
    }

    #[test]
    fn test_display_and_memo_key() {
        let coordinate = Coordinate::new("g", "a", "2.3").unwrap();
        assert_eq!(coordinate.to_string(), "g:a:2.3");
        assert_eq!(coordinate.memo_key(), "g:a");
    }
}
