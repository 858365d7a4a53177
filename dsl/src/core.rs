//! Common items useful for working with Cool language elements but not
//! part of the language itself.
use core::fmt;
use std::path::Path;
use std::sync::Arc;

/// FileId is an identifier for a file (may be a real path or a
/// placeholder such as `<stdin>`).
///
/// FileId is normally useful in the context of source positions
/// where a source position is in a file.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FileId(Arc<str>);

impl FileId {
    /// Creates an empty file identifier.
    pub fn new() -> Self {
        FileId::default()
    }

    /// Creates a file identifier from the path.
    pub fn from_path(path: &Path) -> Self {
        FileId(Arc::from(path.to_string_lossy().as_ref()))
    }

    /// Creates a file identifier from the slice. The slice
    /// is normally the file path.
    pub fn from_string(path: &str) -> Self {
        FileId(Arc::from(path))
    }
}

impl Default for FileId {
    fn default() -> Self {
        FileId(Arc::from(""))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
