//! Prefix lookup and word enumeration over an open index file.

use std::io::Read;
use std::io::Seek;

use crate::errors::WordIndexError;

use super::on_disk::IndexFile;
use super::on_disk::NodePointer;
use super::on_disk::ROOT_POINTER;

/// Walks from the root to the record reached by following `prefix`, one
/// byte per level. Returns `None` when some byte has no matching child,
/// meaning no word in the index starts with `prefix`.
///
/// A child's byte lives in the child's own record, so matching one level
/// means decoding each candidate child in table order until one matches.
pub(super) fn find_prefix_node<R: Read + Seek>(
    file: &mut IndexFile<R>,
    prefix: &[u8],
) -> Result<Option<NodePointer>, WordIndexError> {
    let mut pointer = ROOT_POINTER;
    let mut is_root = true;
    'prefix: for &wanted in prefix {
        let record = file.read_node(pointer, is_root)?;
        is_root = false;
        for child in record.children {
            if file.read_node(child, false)?.char == Some(wanted) {
                pointer = child;
                continue 'prefix;
            }
        }
        return Ok(None);
    }
    Ok(Some(pointer))
}

/// One pending subtree of the traversal.
struct Frame {
    pointer: NodePointer,
    /// Word bytes spelled out by the path above this record. The record's
    /// own byte is appended after it is decoded.
    prefix: Vec<u8>,
    is_root: bool,
}

/// Lazy iterator over the words below one record, in depth-first order.
///
/// Records are decoded as the iterator advances, so enumeration costs
/// nothing until driven and stops costing when dropped. A corrupt record
/// ends the iteration with one `Err` item; afterwards the iterator is
/// fused.
pub struct Suggestions<'a, R> {
    file: &'a mut IndexFile<R>,
    stack: Vec<Frame>,
    done: bool,
}

impl<'a, R: Read + Seek> Suggestions<'a, R> {
    /// `seed` is the record `prefix` leads to, or `None` when the prefix
    /// matches nothing and the iterator should be empty.
    pub(super) fn new(
        file: &'a mut IndexFile<R>,
        prefix: &[u8],
        seed: Option<NodePointer>,
    ) -> Self {
        let stack = match seed {
            // The seed record re-adds its own byte when decoded, so the
            // frame carries the prefix minus that byte.
            Some(pointer) => vec![Frame {
                pointer,
                prefix: prefix[..prefix.len().saturating_sub(1)].to_vec(),
                is_root: prefix.is_empty(),
            }],
            None => vec![],
        };
        Self { file, stack, done: false }
    }
}

impl<R: Read + Seek> Iterator for Suggestions<'_, R> {
    type Item = Result<Vec<u8>, WordIndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        while let Some(frame) = self.stack.pop() {
            let record =
                match self.file.read_node(frame.pointer, frame.is_root) {
                    Ok(record) => record,
                    Err(err) => {
                        self.done = true;
                        return Some(Err(err));
                    }
                };
            let mut word = frame.prefix;
            if let Some(char) = record.char {
                word.push(char);
            }
            // Push in reverse so children come out in table order.
            for &child in record.children.iter().rev() {
                self.stack.push(Frame {
                    pointer: child,
                    prefix: word.clone(),
                    is_root: false,
                });
            }
            if record.terminal {
                return Some(Ok(word));
            }
        }
        self.done = true;
        None
    }
}
