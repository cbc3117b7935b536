/// What a request path asks for
///
/// Paths look like `/<group>/<artifact>/<version>/<path...>`. An empty
/// segment at any of the first three levels lists that level instead; the
/// remainder after the version is a single path into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocRoute {
    Groups,
    Artifacts {
        group: String,
    },
    Versions {
        group: String,
        artifact: String,
    },
    Entry {
        group: String,
        artifact: String,
        version: String,
        path: String,
    },
    /// A hierarchy level named without its trailing slash
    AddTrailingSlash,
}

impl DocRoute {
    /// Parse a decoded request path with its leading `/` removed.
    ///
    /// A further leading `/` is an empty group, so `//x` lists groups.
    pub fn parse(path: &str) -> Self {
        let parts: Vec<&str> = path.splitn(4, '/').collect();

        let group = parts[0];
        if group.is_empty() {
            return DocRoute::Groups;
        }
        let Some(&artifact) = parts.get(1) else {
            return DocRoute::AddTrailingSlash;
        };
        if artifact.is_empty() {
            return DocRoute::Artifacts {
                group: group.to_string(),
            };
        }
        let Some(&version) = parts.get(2) else {
            return DocRoute::AddTrailingSlash;
        };
        if version.is_empty() {
            return DocRoute::Versions {
                group: group.to_string(),
                artifact: artifact.to_string(),
            };
        }
        let Some(&path) = parts.get(3) else {
            return DocRoute::AddTrailingSlash;
        };

        DocRoute::Entry {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
            path: path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(group: &str, artifact: &str, version: &str, path: &str) -> DocRoute {
        DocRoute::Entry {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            path: path.into(),
        }
    }

    #[test]
    fn test_listing_levels() {
        assert_eq!(DocRoute::parse(""), DocRoute::Groups);
        assert_eq!(
            DocRoute::parse("org.vaadin/"),
            DocRoute::Artifacts {
                group: "org.vaadin".into()
            }
        );
        assert_eq!(
            DocRoute::parse("org.vaadin/grid/"),
            DocRoute::Versions {
                group: "org.vaadin".into(),
                artifact: "grid".into()
            }
        );
    }

    #[test]
    fn test_empty_segment_lists_that_level() {
        assert_eq!(DocRoute::parse("/anything/else"), DocRoute::Groups);
        assert_eq!(DocRoute::parse("/evil.example"), DocRoute::Groups);
        assert_eq!(DocRoute::parse("/g/a/1.0/index.html"), DocRoute::Groups);
        assert_eq!(
            DocRoute::parse("g//x/y"),
            DocRoute::Artifacts { group: "g".into() }
        );
        assert_eq!(
            DocRoute::parse("g/a//index.html"),
            DocRoute::Versions {
                group: "g".into(),
                artifact: "a".into()
            }
        );
    }

    #[test]
    fn test_entry_path_keeps_slashes() {
        assert_eq!(DocRoute::parse("g/a/1.0/"), entry("g", "a", "1.0", ""));
        assert_eq!(
            DocRoute::parse("g/a/release/org/example/Widget.html"),
            entry("g", "a", "release", "org/example/Widget.html")
        );
        assert_eq!(DocRoute::parse("g/a/1.0/index.html"), entry("g", "a", "1.0", "index.html"));
        assert_eq!(DocRoute::parse("g/a/1.0//x.html"), entry("g", "a", "1.0", "/x.html"));
    }

    #[test]
    fn test_missing_trailing_slash_redirects() {
        assert_eq!(DocRoute::parse("g"), DocRoute::AddTrailingSlash);
        assert_eq!(DocRoute::parse("g/a"), DocRoute::AddTrailingSlash);
        assert_eq!(DocRoute::parse("g/a/1.0"), DocRoute::AddTrailingSlash);
    }
}
