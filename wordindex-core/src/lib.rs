//! Core library for building and querying word-completion indexes.
//!
//! An index is a single flat file holding a prefix tree, one
//! variable-length record per node, addressed by absolute byte offsets.
//! The build side ([`TrieBuilder`]) accumulates words in memory and
//! serializes them breadth-first; the query side ([`WordIndex`]) walks the
//! file with seek-then-read decodes and never loads it whole.

pub mod corpus;
pub mod errors;
pub mod trie;

pub use crate::errors::WordIndexError;
pub use crate::trie::TrieBuilder;
pub use crate::trie::WordIndex;
