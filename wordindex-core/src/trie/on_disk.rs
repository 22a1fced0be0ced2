//! Record-level access to the index file.
//!
//! Every trie node is one variable-length record, addressed by its
//! absolute byte offset. All integers are 4-byte little-endian:
//!
//! * root record: `[record_size][child_offset]*`
//! * any other record: `[record_size][char: 1][terminal: 1][child_offset]*`
//!
//! `record_size` counts every byte of the record including its own four,
//! so a reader derives the number of children from it alone. The root
//! record always starts at offset 0. The `terminal` byte is `b't'` when a
//! word ends at the node; on decode any other value means false.

use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::PathBuf;

use byteorder::ByteOrder;
use byteorder::LittleEndian;
use bytes_cast::unaligned::U32Le;
use bytes_cast::BytesCast;

use crate::errors::IoErrorContext;
use crate::errors::WordIndexError;

/// Absolute offset of a record in the index file.
///
/// Offsets and record sizes are `u32`, so index files larger than 4 GiB
/// are not supported.
pub type NodePointer = u32;
/// Little-endian version of [`NodePointer`], as stored in child tables.
type NodePointerLe = U32Le;

/// Offset of the root record. The builder writes the root first.
pub(super) const ROOT_POINTER: NodePointer = 0;

/// Width of the `record_size` field.
pub(super) const SIZE_FIELD: u32 = 4;
/// Width of a child pointer in a record's table.
pub(super) const POINTER_SIZE: u32 = 4;
/// Width of the `char` and `terminal` bytes carried by non-root records.
pub(super) const NONROOT_HEADER: u32 = 2;

/// Smallest legal `record_size` for a root record (no children).
const MIN_ROOT_SIZE: u32 = SIZE_FIELD;
/// Smallest legal `record_size` for a non-root record (no children).
const MIN_NODE_SIZE: u32 = SIZE_FIELD + NONROOT_HEADER;

/// Records larger than this get logged while still being decoded
/// normally. A root with 25 or more children crosses it, which
/// legitimately happens on any large corpus.
const BIG_RECORD_THRESHOLD: u32 = 100;

/// Terminal flag byte: a word ends at this node.
pub(super) const TERMINAL_BYTE: u8 = b't';
/// Terminal flag byte: no word ends at this node.
pub(super) const NOT_TERMINAL_BYTE: u8 = b'f';

/// Error type for index file corruption.
#[derive(Debug, PartialEq)]
pub enum CorruptIndex {
    /// A record, or its child table, runs past the end of the file.
    UnexpectedEof { offset: NodePointer },
    /// A `record_size` smaller than the record's fixed fields.
    UndersizedRecord { offset: NodePointer, record_size: u32 },
    /// A child table whose byte count is not a whole number of pointers.
    RaggedChildTable { offset: NodePointer, record_size: u32 },
}

impl std::fmt::Display for CorruptIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorruptIndex::UnexpectedEof { offset } => {
                write!(
                    f,
                    "record at offset {} runs past the end of the file",
                    offset
                )
            }
            CorruptIndex::UndersizedRecord { offset, record_size } => {
                write!(
                    f,
                    "record at offset {} declares impossible size {}",
                    offset, record_size
                )
            }
            CorruptIndex::RaggedChildTable { offset, record_size } => {
                write!(
                    f,
                    "record at offset {} (size {}) has a ragged child table",
                    offset, record_size
                )
            }
        }
    }
}

/// A trie node decoded from the index file.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    /// Byte labeling the edge from the parent. `None` only for the root.
    pub char: Option<u8>,
    /// Whether a word ends at this node.
    pub terminal: bool,
    /// Absolute offsets of the children, in the order they were written.
    pub children: Vec<NodePointer>,
}

/// An open index: a seekable reader plus the information needed to
/// annotate I/O errors.
#[derive(Debug)]
pub(super) struct IndexFile<R> {
    reader: R,
    /// `None` when the index was opened from a plain reader.
    path: Option<PathBuf>,
}

impl<R: Read + Seek> IndexFile<R> {
    pub(super) fn new(reader: R, path: Option<PathBuf>) -> Self {
        Self { reader, path }
    }

    fn io_context(&self) -> IoErrorContext {
        match &self.path {
            Some(path) => IoErrorContext::ReadingFile(path.clone()),
            None => IoErrorContext::ReadingIndex,
        }
    }

    /// Reads exactly `buf.len()` bytes at the current position. A short
    /// read means the record at `offset` runs past the end of the file.
    fn fill(
        &mut self,
        buf: &mut [u8],
        offset: NodePointer,
    ) -> Result<(), WordIndexError> {
        self.reader.read_exact(buf).map_err(|error| {
            if error.kind() == std::io::ErrorKind::UnexpectedEof {
                CorruptIndex::UnexpectedEof { offset }.into()
            } else {
                WordIndexError::IoError { error, context: self.io_context() }
            }
        })
    }

    /// Reads the `len`-byte child table at the current position, growing
    /// the buffer as bytes arrive since `len` comes from the file and may
    /// lie. A short read means the record at `offset` runs past the end
    /// of the file.
    fn read_table(
        &mut self,
        len: u32,
        offset: NodePointer,
    ) -> Result<Vec<u8>, WordIndexError> {
        let mut table = Vec::new();
        let read = self
            .reader
            .by_ref()
            .take(u64::from(len))
            .read_to_end(&mut table);
        let read = read.map_err(|error| WordIndexError::IoError {
            error,
            context: self.io_context(),
        })?;
        if read < len as usize {
            return Err(CorruptIndex::UnexpectedEof { offset }.into());
        }
        Ok(table)
    }

    /// Decodes the record at `offset`. `is_root` selects the record kind;
    /// it is true only for [`ROOT_POINTER`].
    ///
    /// Decoding is read-only and repeatable: decoding the same offset
    /// twice yields equal records. The only side effect is the reader's
    /// cursor position.
    pub(super) fn read_node(
        &mut self,
        offset: NodePointer,
        is_root: bool,
    ) -> Result<NodeRecord, WordIndexError> {
        self.reader
            .seek(SeekFrom::Start(u64::from(offset)))
            .map_err(|error| WordIndexError::IoError {
                error,
                context: self.io_context(),
            })?;
        let mut size_bytes = [0; SIZE_FIELD as usize];
        self.fill(&mut size_bytes, offset)?;
        let record_size = LittleEndian::read_u32(&size_bytes);
        if record_size > BIG_RECORD_THRESHOLD {
            tracing::warn!(
                "unusually large record at offset {}: {} bytes",
                offset,
                record_size
            );
        }
        let fixed_size = if is_root { MIN_ROOT_SIZE } else { MIN_NODE_SIZE };
        if record_size < fixed_size {
            return Err(
                CorruptIndex::UndersizedRecord { offset, record_size }.into()
            );
        }
        let (char, terminal) = if is_root {
            (None, false)
        } else {
            let mut header = [0; NONROOT_HEADER as usize];
            self.fill(&mut header, offset)?;
            (Some(header[0]), header[1] == TERMINAL_BYTE)
        };
        let table_size = record_size - fixed_size;
        if table_size % POINTER_SIZE != 0 {
            return Err(
                CorruptIndex::RaggedChildTable { offset, record_size }.into()
            );
        }
        let table = self.read_table(table_size, offset)?;
        let num_children = (table_size / POINTER_SIZE) as usize;
        let (pointers, rest) =
            NodePointerLe::slice_from_bytes(&table, num_children)
                .expect("table length is a checked multiple of POINTER_SIZE");
        // There cannot be leftover bytes because of the remainder check.
        assert!(rest.is_empty());
        Ok(NodeRecord {
            char,
            terminal,
            children: pointers.iter().map(|pointer| pointer.get()).collect(),
        })
    }
}

/// An iterator over every reachable record, in depth-first pre-order,
/// for debug output.
pub struct DebugNodeIter<'a, R> {
    file: &'a mut IndexFile<R>,
    /// Pending `(offset, is_root)` pairs, deepest first.
    stack: Vec<(NodePointer, bool)>,
    done: bool,
}

impl<'a, R: Read + Seek> DebugNodeIter<'a, R> {
    pub(super) fn new(file: &'a mut IndexFile<R>) -> Self {
        Self { file, stack: vec![(ROOT_POINTER, true)], done: false }
    }
}

impl<R: Read + Seek> Iterator for DebugNodeIter<'_, R> {
    type Item = Result<(NodePointer, NodeRecord), WordIndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let (offset, is_root) = self.stack.pop()?;
        let record = match self.file.read_node(offset, is_root) {
            Ok(record) => record,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };
        // Push in reverse so children come out in table order.
        for &child in record.children.iter().rev() {
            self.stack.push((child, false));
        }
        Some(Ok((offset, record)))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn index_file(bytes: &[u8]) -> IndexFile<Cursor<Vec<u8>>> {
        IndexFile::new(Cursor::new(bytes.to_vec()), None)
    }

    #[test]
    fn test_read_root() {
        // Root with two children at offsets 12 and 18.
        let bytes =
            [12u32.to_le_bytes(), 12u32.to_le_bytes(), 18u32.to_le_bytes()]
                .concat();
        let record = index_file(&bytes).read_node(0, true).unwrap();
        assert_eq!(
            record,
            NodeRecord { char: None, terminal: false, children: vec![12, 18] }
        );
    }

    #[test]
    fn test_read_leaf() {
        let mut bytes = 6u32.to_le_bytes().to_vec();
        bytes.extend(b"zt");
        let record = index_file(&bytes).read_node(0, false).unwrap();
        assert_eq!(
            record,
            NodeRecord {
                char: Some(b'z'),
                terminal: true,
                children: vec![]
            }
        );
    }

    #[test]
    fn test_any_byte_but_t_means_not_terminal() {
        for flag in [NOT_TERMINAL_BYTE, b'T', b'x', 0] {
            let mut bytes = 6u32.to_le_bytes().to_vec();
            bytes.extend([b'a', flag]);
            let record = index_file(&bytes).read_node(0, false).unwrap();
            assert!(!record.terminal, "flag {:?}", flag);
        }
    }

    #[test]
    fn test_empty_file_is_corrupt() {
        let err = index_file(b"").read_node(0, true).unwrap_err();
        assert!(matches!(
            err,
            WordIndexError::Corrupt(CorruptIndex::UnexpectedEof { offset: 0 })
        ));
    }

    #[test]
    fn test_truncated_child_table() {
        // Root announcing two children but holding one and a half.
        let mut bytes = 12u32.to_le_bytes().to_vec();
        bytes.extend(12u32.to_le_bytes());
        bytes.extend([0, 0]);
        let err = index_file(&bytes).read_node(0, true).unwrap_err();
        assert!(matches!(
            err,
            WordIndexError::Corrupt(CorruptIndex::UnexpectedEof { offset: 0 })
        ));
    }

    #[test]
    fn test_huge_claimed_size() {
        // A root claiming a near-4-GiB child table, in an 8-byte file.
        // The reader must not size any buffer from the claimed size.
        let mut bytes = 0xFFFF_FFF4u32.to_le_bytes().to_vec();
        bytes.extend(12u32.to_le_bytes());
        let err = index_file(&bytes).read_node(0, true).unwrap_err();
        assert!(matches!(
            err,
            WordIndexError::Corrupt(CorruptIndex::UnexpectedEof { offset: 0 })
        ));
    }

    #[test]
    fn test_undersized_record() {
        // A non-root record must be at least 6 bytes.
        let bytes = 5u32.to_le_bytes();
        let err = index_file(&bytes).read_node(0, false).unwrap_err();
        assert!(matches!(
            err,
            WordIndexError::Corrupt(CorruptIndex::UndersizedRecord {
                offset: 0,
                record_size: 5,
            })
        ));
        // The same size is fine for a root record (one child).
        let mut bytes = 8u32.to_le_bytes().to_vec();
        bytes.extend(8u32.to_le_bytes());
        assert!(index_file(&bytes).read_node(0, true).is_ok());
    }

    #[test]
    fn test_ragged_child_table() {
        let mut bytes = 9u32.to_le_bytes().to_vec();
        bytes.extend([b'a', TERMINAL_BYTE, 0, 0, 0]);
        let err = index_file(&bytes).read_node(0, false).unwrap_err();
        assert!(matches!(
            err,
            WordIndexError::Corrupt(CorruptIndex::RaggedChildTable {
                offset: 0,
                record_size: 9,
            })
        ));
    }

    #[test]
    fn test_decode_is_repeatable() {
        let mut bytes = 8u32.to_le_bytes().to_vec();
        bytes.extend(8u32.to_le_bytes());
        bytes.extend(6u32.to_le_bytes());
        bytes.extend([b'q', TERMINAL_BYTE]);
        let mut file = index_file(&bytes);
        let first = file.read_node(8, false).unwrap();
        let second = file.read_node(8, false).unwrap();
        assert_eq!(first, second);
    }
}
