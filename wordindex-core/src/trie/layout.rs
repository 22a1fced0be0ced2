//! Serialization of the in-memory trie into the flat record file.
//!
//! Records are laid out breadth-first, the root first. Encoding makes two
//! passes over a flat arena of planned records: the first flattens the
//! tree into the arena and assigns every record its size and absolute
//! offset (a running sum in arena order), the second appends the bytes.
//! Every child offset is known before emission starts, so nothing needs
//! to be fixed up afterwards.

use std::ops::Range;

use super::builder::TrieNode;
use super::on_disk::NodePointer;
use super::on_disk::NONROOT_HEADER;
use super::on_disk::NOT_TERMINAL_BYTE;
use super::on_disk::POINTER_SIZE;
use super::on_disk::SIZE_FIELD;
use super::on_disk::TERMINAL_BYTE;

/// A record planned into the arena by the first pass. Arena order is both
/// breadth-first order and file order.
struct PlannedRecord<'a> {
    /// Byte labeling the edge from the parent; `None` for the root.
    char: Option<u8>,
    node: &'a TrieNode,
    /// Size of the record on disk, including the size field itself.
    record_size: u32,
    /// Absolute offset the record will be written at.
    offset: NodePointer,
    /// Arena indexes of the record's children. Children of one record are
    /// always contiguous in the arena.
    children: Range<usize>,
}

impl<'a> PlannedRecord<'a> {
    fn new(char: Option<u8>, node: &'a TrieNode) -> Self {
        let fixed_size = match char {
            Some(_) => SIZE_FIELD + NONROOT_HEADER,
            None => SIZE_FIELD,
        };
        let num_children: u32 = node
            .children
            .len()
            .try_into()
            .expect("a node cannot have more than 256 children");
        Self {
            char,
            node,
            record_size: fixed_size + POINTER_SIZE * num_children,
            offset: 0,
            children: 0..0,
        }
    }
}

/// Pass 1: flatten the tree breadth-first, computing sizes and offsets.
/// The arena doubles as the traversal queue, with `index` as its head.
fn plan(root: &TrieNode) -> Vec<PlannedRecord<'_>> {
    let mut arena = vec![PlannedRecord::new(None, root)];
    let mut index = 0;
    while index < arena.len() {
        let node = arena[index].node;
        let first_child = arena.len();
        for (&byte, child) in &node.children {
            arena.push(PlannedRecord::new(Some(byte), child));
        }
        arena[index].children = first_child..arena.len();
        index += 1;
    }
    let mut offset: NodePointer = 0;
    for record in &mut arena {
        record.offset = offset;
        offset = offset
            .checked_add(record.record_size)
            .expect("index file size should fit in u32");
    }
    arena
}

/// Pass 2: append every record's bytes in arena order.
fn emit(arena: &[PlannedRecord]) -> Vec<u8> {
    let total_size = match arena.last() {
        Some(last) => last.offset + last.record_size,
        None => 0,
    };
    let mut bytes = Vec::with_capacity(total_size as usize);
    for record in arena {
        let start = bytes.len();
        bytes.extend_from_slice(&record.record_size.to_le_bytes());
        if let Some(char) = record.char {
            bytes.push(char);
            bytes.push(if record.node.terminal {
                TERMINAL_BYTE
            } else {
                NOT_TERMINAL_BYTE
            });
        }
        for child in record.children.clone() {
            bytes.extend_from_slice(&arena[child].offset.to_le_bytes());
        }
        assert_eq!(bytes.len() - start, record.record_size as usize);
    }
    assert_eq!(bytes.len(), total_size as usize);
    bytes
}

/// Serializes the whole trie to a complete index image.
pub(super) fn encode(root: &TrieNode) -> Vec<u8> {
    let arena = plan(root);
    let bytes = emit(&arena);
    tracing::debug!(
        "encoded {} records, {} bytes",
        arena.len(),
        bytes.len()
    );
    bytes
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::builder::TrieBuilder;
    use super::*;

    fn build(words: &[&[u8]]) -> TrieBuilder {
        let mut builder = TrieBuilder::new();
        for word in words {
            builder.insert(word);
        }
        builder
    }

    #[test]
    fn test_empty_trie_is_a_bare_root() {
        assert_eq!(build(&[]).serialize(), 4u32.to_le_bytes());
    }

    #[test]
    fn test_single_word_image() {
        // Root (8 bytes) pointing at a terminal leaf (6 bytes).
        let expected = [
            8u32.to_le_bytes().as_slice(),
            8u32.to_le_bytes().as_slice(),
            6u32.to_le_bytes().as_slice(),
            b"at",
        ]
        .concat();
        assert_eq!(build(&[b"a"]).serialize(), expected);
    }

    #[test]
    fn test_offsets_are_running_sums_in_breadth_first_order() {
        let builder = build(&[b"a", b"b", b"ab"]);
        let arena = plan(&builder.root);
        let chars: Vec<_> =
            arena.iter().map(|record| record.char).collect();
        assert_eq!(
            chars,
            vec![None, Some(b'a'), Some(b'b'), Some(b'b')],
            "root, then depth one in byte order, then depth two"
        );
        let sizes: Vec<_> =
            arena.iter().map(|record| record.record_size).collect();
        assert_eq!(sizes, vec![12, 10, 6, 6]);
        let offsets: Vec<_> =
            arena.iter().map(|record| record.offset).collect();
        assert_eq!(offsets, vec![0, 12, 22, 28]);
    }

    #[test]
    fn test_children_are_contiguous_and_in_byte_order() {
        let builder = build(&[b"ca", b"cb", b"cc"]);
        let arena = plan(&builder.root);
        let c = &arena[1];
        assert_eq!(c.char, Some(b'c'));
        assert_eq!(c.children, 2..5);
        assert_eq!(arena[2].char, Some(b'a'));
        assert_eq!(arena[3].char, Some(b'b'));
        assert_eq!(arena[4].char, Some(b'c'));
    }

    #[test]
    fn test_emitted_child_offsets_point_at_planned_records() {
        let builder = build(&[b"cat", b"car", b"cats", b"dog"]);
        let arena = plan(&builder.root);
        let bytes = emit(&arena);
        for record in &arena {
            let start = record.offset as usize;
            let size =
                u32::from_le_bytes(bytes[start..start + 4].try_into().unwrap());
            assert_eq!(size, record.record_size);
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let first = build(&[b"cat", b"car", b"dog"]).serialize();
        let second = build(&[b"dog", b"car", b"cat"]).serialize();
        assert_eq!(first, second);
    }
}
