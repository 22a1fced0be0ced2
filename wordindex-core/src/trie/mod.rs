//! A prefix tree over byte-string words, stored in a single flat file of
//! variable-length node records. The builder side lives in [`builder`] and
//! [`layout`]; everything else reads the file record by record without
//! ever loading it whole.

use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::path::Path;

pub use builder::TrieBuilder;
pub use builder::MAX_WORD_LEN;
use on_disk::IndexFile;
pub use on_disk::CorruptIndex;
pub use on_disk::DebugNodeIter;
pub use on_disk::NodePointer;
pub use on_disk::NodeRecord;
use on_disk::ROOT_POINTER;
pub use query::Suggestions;

use crate::errors::IoResultExt;
use crate::errors::WordIndexError;

mod builder;
mod layout;
mod on_disk;
mod query;


/// A read handle on an index file.
///
/// Every lookup seeks and reads through the wrapped reader; nothing is
/// cached between calls. Index files are written once and never modified,
/// so a handle stays valid for as long as the file exists.
#[derive(Debug)]
pub struct WordIndex<R = File> {
    file: IndexFile<R>,
}

impl WordIndex<File> {
    /// Opens an index file and decodes its root record once, so a file
    /// that is not an index at all fails here rather than on the first
    /// query.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WordIndexError> {
        let path = path.as_ref();
        let file = File::open(path).when_reading_file(path)?;
        Self::new(IndexFile::new(file, Some(path.to_owned())))
    }
}

impl<R: Read + Seek> WordIndex<R> {
    /// Like [`WordIndex::open`] for an already-open reader, typically an
    /// in-memory one.
    pub fn from_reader(reader: R) -> Result<Self, WordIndexError> {
        Self::new(IndexFile::new(reader, None))
    }

    fn new(mut file: IndexFile<R>) -> Result<Self, WordIndexError> {
        file.read_node(ROOT_POINTER, true)?;
        Ok(Self { file })
    }

    /// Returns a lazy iterator over every word starting with `prefix`.
    /// The empty prefix enumerates the whole index.
    ///
    /// A prefix no word starts with yields an empty iterator, not an
    /// error. Results come in no promised order; callers that need one
    /// must sort.
    ///
    /// The iterator decodes records on demand, borrowing this handle for
    /// its whole lifetime: at most one traversal can be in flight per
    /// handle. Open separate handles to query concurrently.
    pub fn suggest(
        &mut self,
        prefix: &[u8],
    ) -> Result<Suggestions<'_, R>, WordIndexError> {
        let seed = query::find_prefix_node(&mut self.file, prefix)?;
        Ok(Suggestions::new(&mut self.file, prefix, seed))
    }

    /// Iterates over every reachable record, for debug output.
    pub fn debug_iter_nodes(&mut self) -> DebugNodeIter<'_, R> {
        DebugNodeIter::new(&mut self.file)
    }
}
