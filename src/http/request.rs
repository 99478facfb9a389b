use std::fmt;
use std::path::{Component, Path};

/// Default document served for `/`.
pub const DEFAULT_DOCUMENT: &str = "index.html";

/// A resource string after normalization, ready to be joined onto the
/// serving root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath(String);

impl ResolvedPath {
    /// Maps an extracted resource to a filesystem lookup key.
    ///
    /// `/` becomes `default_document`. Anything else loses its leading run of
    /// `.` and `/` characters and nothing more: `/../../etc/passwd` resolves
    /// to `etc/passwd`, while `/docs/../../x` keeps its later `..` segments.
    ///
    /// Returns `None` when nothing is left to open (empty resource, `//`,
    /// `./` and the like).
    ///
    /// # Example
    ///
    /// ```
    /// # use dfa_httpd::http::request::ResolvedPath;
    /// let p = ResolvedPath::normalize("/docs/a.html", "index.html").unwrap();
    /// assert_eq!(p.as_str(), "docs/a.html");
    ///
    /// let p = ResolvedPath::normalize("/../../etc/passwd", "index.html").unwrap();
    /// assert_eq!(p.as_str(), "etc/passwd");
    ///
    /// let p = ResolvedPath::normalize("/docs/../../x", "index.html").unwrap();
    /// assert_eq!(p.as_str(), "docs/../../x");
    /// assert!(ResolvedPath::normalize("", "index.html").is_none());
    /// ```
    pub fn normalize(resource: &str, default_document: &str) -> Option<Self> {
        let path = if resource == "/" {
            default_document
        } else {
            resource.trim_start_matches(['.', '/'])
        };

        if path.is_empty() {
            None
        } else {
            Some(Self(path.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// True when every component is a plain name, i.e. joining the path onto
    /// a root cannot leave that root.
    pub fn is_confined(&self) -> bool {
        self.as_path()
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}
