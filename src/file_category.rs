//! Extension-based file categories.
//!
//! A file's category is its extension, stripped of the leading dot and
//! upper-cased, so `photo.jpg` and `SCAN.JPG` both land in `JPG/`. Files
//! without an extension share the [`NO_EXTENSION`] category.

use std::fmt;
use std::path::Path;

/// Directory name used for files that have no extension.
pub const NO_EXTENSION: &str = "NO_EXTENSION";

/// The category a file is sorted into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// A normalized (upper-cased) extension token, e.g. `PDF`.
    Extension(String),
    /// The file name has no extension.
    NoExtension,
}

impl Category {
    /// Derives the category from a file name or path.
    ///
    /// Only the final component is considered. A leading dot does not start an
    /// extension (`.bashrc` has none) and a trailing dot yields an empty one,
    /// which is treated as no extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use extsort::file_category::Category;
    /// use std::path::Path;
    ///
    /// assert_eq!(Category::of(Path::new("report.pdf")).dir_name(), "PDF");
    /// assert_eq!(Category::of(Path::new("archive.tar.gz")).dir_name(), "GZ");
    /// assert_eq!(Category::of(Path::new("Makefile")).dir_name(), "NO_EXTENSION");
    /// ```
    pub fn of(path: &Path) -> Self {
        match path.extension().map(|ext| ext.to_string_lossy()) {
            Some(ext) if !ext.is_empty() => Self::Extension(ext.to_uppercase()),
            _ => Self::NoExtension,
        }
    }

    /// Returns the name of the subdirectory for this category.
    pub fn dir_name(&self) -> &str {
        match self {
            Self::Extension(token) => token,
            Self::NoExtension => NO_EXTENSION,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}
