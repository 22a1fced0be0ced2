//! Feeding a corpus of text files into a [`TrieBuilder`].

use std::path::Path;

use crate::errors::IoErrorContext;
use crate::errors::IoResultExt;
use crate::errors::WordIndexError;
use crate::trie::TrieBuilder;
use crate::trie::MAX_WORD_LEN;

/// How many ingested files between two progress log lines.
const PROGRESS_INTERVAL: usize = 1000;

/// A token counts as a word when it contains at least one ASCII letter.
/// This keeps numbers and runs of punctuation out of the index.
fn is_word(token: &[u8]) -> bool {
    token.iter().any(u8::is_ascii_alphabetic)
}

/// Feeds every word of `text` to the builder. Words are separated by
/// ASCII whitespace, truncated to [`MAX_WORD_LEN`] bytes, and otherwise
/// kept untouched, case included.
pub fn ingest_text(builder: &mut TrieBuilder, text: &[u8]) {
    for token in text.split(|byte| byte.is_ascii_whitespace()) {
        // Truncate first: the letter test applies to the stored bytes.
        let token = &token[..token.len().min(MAX_WORD_LEN)];
        if is_word(token) {
            builder.insert(token);
        }
    }
}

/// Reads one file and feeds its words to the builder.
pub fn ingest_file(
    builder: &mut TrieBuilder,
    path: impl AsRef<Path>,
) -> Result<(), WordIndexError> {
    let path = path.as_ref();
    let text = std::fs::read(path).when_reading_file(path)?;
    ingest_text(builder, &text);
    Ok(())
}

/// Feeds every regular file below `root` to the builder, walking
/// subdirectories in sorted path order so runs are reproducible.
/// Symlinks and special files are skipped. Returns the number of files
/// ingested.
#[tracing::instrument(level = "debug", skip_all)]
pub fn ingest_directory(
    builder: &mut TrieBuilder,
    root: impl AsRef<Path>,
) -> Result<usize, WordIndexError> {
    let mut files_seen = 0;
    ingest_directory_impl(builder, root.as_ref(), &mut files_seen)?;
    tracing::info!(
        "ingested {} files, {} distinct words",
        files_seen,
        builder.word_count()
    );
    Ok(files_seen)
}

fn ingest_directory_impl(
    builder: &mut TrieBuilder,
    dir: &Path,
    files_seen: &mut usize,
) -> Result<(), WordIndexError> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| IoErrorContext::ListingDirectory(dir.to_owned()))?;
    let mut entries = entries
        .map(|result| {
            result
                .and_then(|entry| Ok((entry.path(), entry.file_type()?)))
                .with_context(|| {
                    IoErrorContext::ListingDirectory(dir.to_owned())
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by(|(left, _), (right, _)| left.cmp(right));
    for (path, file_type) in entries {
        if file_type.is_dir() {
            ingest_directory_impl(builder, &path, files_seen)?;
        } else if file_type.is_file() {
            ingest_file(builder, &path)?;
            *files_seen += 1;
            if *files_seen % PROGRESS_INTERVAL == 0 {
                tracing::info!("ingested {} files so far", files_seen);
            }
        }
    }
    Ok(())
}
