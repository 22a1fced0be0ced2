//! The in-memory trie that index files are built from.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use super::layout;
use crate::errors::IoErrorContext;
use crate::errors::IoResultExt;
use crate::errors::WordIndexError;

/// Maximum stored word length in bytes. Longer words are truncated on
/// insert.
pub const MAX_WORD_LEN: usize = 16;

/// One node of the in-memory trie. The byte labeling the edge from the
/// parent is the key in the parent's children map; the root has no
/// incoming edge.
#[derive(Debug, Default)]
pub(super) struct TrieNode {
    /// Whether a word ends at this node. Never true for the root.
    pub(super) terminal: bool,
    /// Children keyed by edge byte. Map order (ascending byte value) is
    /// the on-disk child order.
    pub(super) children: BTreeMap<u8, TrieNode>,
}

/// Accumulates words and serializes them to an index file.
pub struct TrieBuilder {
    pub(super) root: TrieNode,
    /// Number of distinct words inserted so far.
    word_count: usize,
}

impl TrieBuilder {
    pub fn new() -> Self {
        Self { root: TrieNode::default(), word_count: 0 }
    }

    /// Number of distinct words inserted.
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    /// Inserts one word, truncating it to [`MAX_WORD_LEN`] bytes first.
    ///
    /// Bytes are stored as-is; `Cat` and `cat` are two different words.
    /// Inserting the empty word is a no-op, and reinserting an existing
    /// word changes nothing.
    pub fn insert(&mut self, word: &[u8]) {
        let word = &word[..word.len().min(MAX_WORD_LEN)];
        if word.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for &byte in word {
            node = node.children.entry(byte).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.word_count += 1;
        }
    }

    /// Serializes the trie to a complete index image.
    pub fn serialize(&self) -> Vec<u8> {
        layout::encode(&self.root)
    }

    /// Writes the index to `path`. The bytes land in a temporary file in
    /// the destination directory first and are renamed into place once
    /// complete, so a crash cannot leave a half-written index behind.
    pub fn write_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<(), WordIndexError> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).when_writing_file(path)?;
        tmp.write_all(&self.serialize()).when_writing_file(tmp.path())?;
        tmp.persist(path).map_err(|err| {
            let context = IoErrorContext::RenamingFile {
                from: err.file.path().to_owned(),
                to: path.to_owned(),
            };
            WordIndexError::IoError { error: err.error, context }
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Byte labels of the root's children, in map order.
    fn root_child_bytes(builder: &TrieBuilder) -> Vec<u8> {
        builder.root.children.keys().copied().collect()
    }

    #[test]
    fn test_empty_builder() {
        let builder = TrieBuilder::new();
        assert!(builder.is_empty());
        assert_eq!(builder.word_count(), 0);
        assert!(builder.root.children.is_empty());
    }

    #[test]
    fn test_insert_marks_terminal_nodes_only() {
        let mut builder = TrieBuilder::new();
        builder.insert(b"car");
        let c = &builder.root.children[&b'c'];
        let ca = &c.children[&b'a'];
        let car = &ca.children[&b'r'];
        assert!(!c.terminal);
        assert!(!ca.terminal);
        assert!(car.terminal);
        assert_eq!(builder.word_count(), 1);
    }

    #[test]
    fn test_insert_prefix_of_existing_word() {
        let mut builder = TrieBuilder::new();
        builder.insert(b"car");
        builder.insert(b"ca");
        assert_eq!(builder.word_count(), 2);
        assert!(builder.root.children[&b'c'].children[&b'a'].terminal);
    }

    #[test]
    fn test_reinsert_is_idempotent() {
        let mut builder = TrieBuilder::new();
        builder.insert(b"dog");
        builder.insert(b"dog");
        assert_eq!(builder.word_count(), 1);
        assert_eq!(builder.serialize(), {
            let mut other = TrieBuilder::new();
            other.insert(b"dog");
            other.serialize()
        });
    }

    #[test]
    fn test_empty_word_is_a_noop() {
        let mut builder = TrieBuilder::new();
        builder.insert(b"");
        assert!(builder.is_empty());
        assert!(!builder.root.terminal);
    }

    #[test]
    fn test_children_are_ordered_by_byte() {
        let mut builder = TrieBuilder::new();
        builder.insert(b"d");
        builder.insert(b"a");
        builder.insert(b"c");
        builder.insert(b"Z");
        assert_eq!(root_child_bytes(&builder), vec![b'Z', b'a', b'c', b'd']);
    }

    #[test]
    fn test_long_words_are_truncated() {
        let mut builder = TrieBuilder::new();
        builder.insert(&[b'a'; MAX_WORD_LEN]);
        builder.insert(&[b'a'; MAX_WORD_LEN + 4]);
        // Both inserts collapse to the same 16-byte word.
        assert_eq!(builder.word_count(), 1);
        let mut node = &builder.root;
        for _ in 0..MAX_WORD_LEN {
            node = &node.children[&b'a'];
        }
        assert!(node.terminal);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_case_is_preserved() {
        let mut builder = TrieBuilder::new();
        builder.insert(b"Cat");
        builder.insert(b"cat");
        assert_eq!(builder.word_count(), 2);
        assert_eq!(root_child_bytes(&builder), vec![b'C', b'c']);
    }
}
