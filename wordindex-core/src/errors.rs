use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use crate::trie::CorruptIndex;

/// Common error cases that can happen in many different APIs
#[derive(Debug, derive_more::From)]
pub enum WordIndexError {
    /// A low-level IO error, annotated with what the crate was doing when
    /// it happened
    IoError {
        error: std::io::Error,
        context: IoErrorContext,
    },

    /// An index file does not match the expected record structure. This
    /// indicates a bug in the builder, truncation, or filesystem
    /// corruption.
    #[from]
    Corrupt(CorruptIndex),
}

// TODO: use `DisplayBytes` instead to show non-Unicode filenames losslessly?
impl fmt::Display for WordIndexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WordIndexError::IoError { error, context } => {
                write!(f, "{}: {}", context, error)
            }
            WordIndexError::Corrupt(err) => {
                write!(f, "corrupted index: {}", err)
            }
        }
    }
}

/// Details about where an I/O error happened
#[derive(Debug)]
pub enum IoErrorContext {
    ReadingFile(PathBuf),
    WritingFile(PathBuf),
    /// `std::fs::read_dir` and per-entry metadata
    ListingDirectory(PathBuf),
    RenamingFile {
        from: PathBuf,
        to: PathBuf,
    },
    /// Reading an index that was opened from a plain reader, so no path is
    /// known
    ReadingIndex,
}

impl fmt::Display for IoErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IoErrorContext::ReadingFile(path) => {
                write!(f, "when reading {}", path.display())
            }
            IoErrorContext::WritingFile(path) => {
                write!(f, "when writing {}", path.display())
            }
            IoErrorContext::ListingDirectory(path) => {
                write!(f, "when listing {}", path.display())
            }
            IoErrorContext::RenamingFile { from, to } => write!(
                f,
                "when renaming {} to {}",
                from.display(),
                to.display()
            ),
            IoErrorContext::ReadingIndex => {
                write!(f, "when reading the index")
            }
        }
    }
}

pub trait IoResultExt<T> {
    /// Annotate a possible I/O error as related to reading a file at the
    /// given path.
    ///
    /// This allows printing something like “File not found when reading
    /// example.txt” instead of just “File not found”.
    ///
    /// Converts a `Result` with `std::io::Error` into one with
    /// `WordIndexError`.
    fn when_reading_file(
        self,
        path: impl AsRef<Path>,
    ) -> Result<T, WordIndexError>;

    fn when_writing_file(
        self,
        path: impl AsRef<Path>,
    ) -> Result<T, WordIndexError>;

    fn with_context(
        self,
        context: impl FnOnce() -> IoErrorContext,
    ) -> Result<T, WordIndexError>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn when_reading_file(
        self,
        path: impl AsRef<Path>,
    ) -> Result<T, WordIndexError> {
        self.with_context(|| {
            IoErrorContext::ReadingFile(path.as_ref().to_owned())
        })
    }

    fn when_writing_file(
        self,
        path: impl AsRef<Path>,
    ) -> Result<T, WordIndexError> {
        self.with_context(|| {
            IoErrorContext::WritingFile(path.as_ref().to_owned())
        })
    }

    fn with_context(
        self,
        context: impl FnOnce() -> IoErrorContext,
    ) -> Result<T, WordIndexError> {
        self.map_err(|error| WordIndexError::IoError {
            error,
            context: context(),
        })
    }
}
