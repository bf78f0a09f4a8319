//! Dotted setting paths.

use std::fmt;

/// Errors related to path parsing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A segment between two dots is empty.
    #[error("empty path segment at position {position} in '{path}'")]
    EmptySegment { path: String, position: usize },
}

/// A parsed setting path such as `.sources.SphereSource.Radius`.
///
/// Each segment is a plain object key; there is no array indexing syntax.
/// The root path has no segments.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    pub components: Vec<String>,
}

impl Path {
    /// Parse a dotted path string.
    ///
    /// # Path Syntax
    ///
    /// - Segments are separated by `.`
    /// - One leading `.` is optional and ignored
    /// - `""` and `"."` are the root path
    /// - Empty segments (`.a..b`, `.a.`) are rejected
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strata_core_store::Path;
    ///
    /// let path = Path::parse(".sources.SphereSource.Radius").unwrap();
    /// assert_eq!(path.len(), 3);
    ///
    /// // The leading dot is optional
    /// assert_eq!(Path::parse("a.b").unwrap(), Path::parse(".a.b").unwrap());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let body = s.strip_prefix('.').unwrap_or(s);
        if body.is_empty() {
            return Ok(Path::root());
        }

        let components: Vec<String> = body.split('.').map(str::to_string).collect();
        if let Some(position) = components.iter().position(String::is_empty) {
            return Err(PathError::EmptySegment {
                path: s.to_string(),
                position,
            });
        }

        Ok(Path { components })
    }

    /// The root path.
    pub fn root() -> Self {
        Path {
            components: Vec::new(),
        }
    }

    /// Check if this is the root path.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Iterate over segments.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.components.iter()
    }

    /// Append one segment, returning the longer path.
    #[must_use]
    pub fn child(&self, segment: &str) -> Path {
        let mut components = self.components.clone();
        components.push(segment.to_string());
        Path { components }
    }

    /// Join this path with another.
    #[must_use]
    pub fn join(&self, other: &Path) -> Path {
        let mut components = self.components.clone();
        components.extend(other.components.iter().cloned());
        Path { components }
    }

    /// Split into the parent path and the final segment.
    ///
    /// Returns `None` for the root path.
    pub fn split_leaf(&self) -> Option<(Path, &str)> {
        let (leaf, branch) = self.components.split_last()?;
        Some((
            Path {
                components: branch.to_vec(),
            },
            leaf.as_str(),
        ))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, ".");
        }
        for component in &self.components {
            write!(f, ".{}", component)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

/// Macro for creating paths from literals.
///
/// # Example
///
/// ```rust
/// use strata_core_store::path;
///
/// let p = path!(".sources.SphereSource");
/// assert_eq!(p.len(), 2);
/// ```
#[macro_export]
macro_rules! path {
    ($s:expr) => {
        $crate::Path::parse($s).expect("invalid path literal")
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_paths() {
        assert_eq!(Path::parse("").unwrap().len(), 0);
        assert_eq!(Path::parse(".").unwrap().len(), 0);
        assert_eq!(Path::parse(".a").unwrap().len(), 1);
        assert_eq!(Path::parse(".a.b").unwrap().len(), 2);
        assert_eq!(Path::parse("a.b.c").unwrap().len(), 3);
    }

    #[test]
    fn leading_dot_is_optional() {
        assert_eq!(path!(".sources.Sphere"), path!("sources.Sphere"));
    }

    #[test]
    fn empty_segments_rejected() {
        let err = Path::parse(".a..b").unwrap_err();
        assert_eq!(
            err,
            PathError::EmptySegment {
                path: ".a..b".to_string(),
                position: 1,
            }
        );
        assert!(Path::parse(".a.").is_err());
        assert!(Path::parse("..a").is_err());
    }

    #[test]
    fn segments_keep_arbitrary_characters() {
        let p = path!(".views.Render View 1.Background-Color");
        assert_eq!(p.components[1], "Render View 1");
        assert_eq!(p.components[2], "Background-Color");
    }

    #[test]
    fn display_has_leading_dot() {
        assert_eq!(path!("a.b").to_string(), ".a.b");
        assert_eq!(Path::root().to_string(), ".");
    }

    #[test]
    fn child_and_join() {
        let base = path!(".sources.SphereSource");
        assert_eq!(base.child("Radius"), path!(".sources.SphereSource.Radius"));
        assert_eq!(path!(".a").join(&path!(".b.c")), path!(".a.b.c"));
        assert_eq!(path!(".a").join(&Path::root()), path!(".a"));
    }

    #[test]
    fn split_leaf() {
        let p = path!(".a.b.c");
        let (parent, leaf) = p.split_leaf().unwrap();
        assert_eq!(parent, path!(".a.b"));
        assert_eq!(leaf, "c");
        assert!(Path::root().split_leaf().is_none());
    }

    #[test]
    fn from_str_works() {
        let p: Path = ".x.y".parse().unwrap();
        assert_eq!(p.len(), 2);
    }

    #[test]
    #[should_panic(expected = "invalid path literal")]
    fn macro_panics_on_bad_literal() {
        path!(".a..b");
    }
}
