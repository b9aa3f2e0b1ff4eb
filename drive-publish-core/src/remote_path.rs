//! Remote drive paths as immutable segment lists.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};

/// Characters escaped inside a single path segment. `:` and `/` are
/// structural in Graph's `root:/{path}:` addressing.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b':')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// A location relative to the drive root, e.g. `releases/v1/app.zip`.
///
/// Segments are never empty. Appending returns a new path; a `RemotePath`
/// is never modified after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RemotePath {
    segments: Vec<String>,
}

impl RemotePath {
    /// The drive root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Splits a `/`-delimited string. Leading, trailing and repeated
    /// separators are ignored.
    pub fn parse(raw: &str) -> Self {
        Self::from_segments(raw.split('/'))
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self { segments }
    }

    /// Returns a new path with `name` appended. `name` may itself contain
    /// `/` separators.
    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(Self::parse(name).segments);
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Percent-encoded form for use between `root:/` and `:` in a Graph URL.
    pub fn encoded(&self) -> String {
        self.segments
            .iter()
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl From<&str> for RemotePath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for RemotePath {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<RemotePath> for String {
    fn from(path: RemotePath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_empty_segments() {
        let path = RemotePath::parse("/releases//v1/");
        assert_eq!(path.segments(), ["releases", "v1"]);
        assert_eq!(path.to_string(), "releases/v1");
    }

    #[test]
    fn join_leaves_base_untouched() {
        let base = RemotePath::from_segments(["releases", "v1"]);
        let file = base.join("app-1.2.zip");

        assert_eq!(file.to_string(), "releases/v1/app-1.2.zip");
        assert_eq!(base.segments(), ["releases", "v1"]);
        assert_eq!(file.file_name(), Some("app-1.2.zip"));
    }

    #[test]
    fn encoded_escapes_reserved_characters_per_segment() {
        let path = RemotePath::from_segments(["My Releases", "v1#beta", "a:b.zip"]);
        assert_eq!(path.encoded(), "My%20Releases/v1%23beta/a%3Ab.zip");
    }

    #[test]
    fn encoded_keeps_common_file_name_characters() {
        let path = RemotePath::parse("releases/v1/app-1.2_x64.zip");
        assert_eq!(path.encoded(), "releases/v1/app-1.2_x64.zip");
    }

    #[test]
    fn root_has_no_segments() {
        assert!(RemotePath::root().is_root());
        assert!(RemotePath::parse("///").is_root());
        assert_eq!(RemotePath::root().encoded(), "");
    }
}
