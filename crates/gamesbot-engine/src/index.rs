//! Knowledge index: anagram signature → words seen with that signature
//!
//! The whole index lives in memory and is mirrored to a single pretty-printed
//! JSON object on disk. Every learned word rewrites the file through a temp
//! file and a rename, so a crash leaves either the old or the new index.

use gamesbot_core::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Letters of `word`, uppercased and sorted ascending.
pub fn signature(word: &str) -> String {
    let mut letters: Vec<char> = word.chars().flat_map(char::to_uppercase).collect();
    letters.sort_unstable();
    letters.into_iter().collect()
}

#[derive(Debug, Clone)]
pub struct KnowledgeIndex {
    path: PathBuf,
    words: BTreeMap<String, Vec<String>>,
}

impl KnowledgeIndex {
    /// Load the index from `path`. A missing or unparsable file is an error.
    /// Words filed under the wrong signature are moved and the file rewritten.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::knowledge_index(&path, e.to_string()))?;
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(&content)
            .map_err(|e| Error::knowledge_index(&path, format!("invalid JSON: {}", e)))?;

        let mut index = Self {
            path,
            words: BTreeMap::new(),
        };
        let mut moved_from = Vec::new();
        for (key, words) in raw {
            for word in words {
                if signature(&word) != key && !moved_from.contains(&key) {
                    moved_from.push(key.clone());
                }
                index.append(word);
            }
        }
        if !moved_from.is_empty() {
            warn!(
                "{}: refiled words stored under the wrong signature ({})",
                index.path.display(),
                moved_from.join(", ")
            );
            index.persist()?;
        }
        info!(
            "Loaded {} signatures ({} words) from {}",
            index.len(),
            index.word_count(),
            index.path.display()
        );
        Ok(index)
    }

    /// An empty index that will be written to `path` on first persist.
    pub fn empty(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            words: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Known words for a signature, in the order they were learned.
    pub fn lookup(&self, signature: &str) -> Option<&[String]> {
        self.words.get(signature).map(Vec::as_slice)
    }

    /// Known anagrams of `word`.
    pub fn anagrams_of(&self, word: &str) -> Option<&[String]> {
        self.lookup(&signature(word))
    }

    /// Add `word` under its signature in memory only. Duplicates are kept.
    /// Returns the signature.
    pub fn append(&mut self, word: impl Into<String>) -> String {
        let word = word.into();
        let key = signature(&word);
        self.words.entry(key.clone()).or_default().push(word);
        key
    }

    /// Append `word` and flush the whole index to disk before returning.
    /// A failed flush rolls the append back.
    pub fn learn(&mut self, word: impl Into<String>) -> Result<String> {
        let key = self.append(word);
        if let Err(e) = self.persist() {
            self.unappend(&key);
            return Err(e);
        }
        debug!("learned signature {} ({} known)", key, self.words[&key].len());
        Ok(key)
    }

    /// Drop the most recent word under `key`, and the key itself once empty.
    fn unappend(&mut self, key: &str) {
        if let Some(words) = self.words.get_mut(key) {
            words.pop();
            if words.is_empty() {
                self.words.remove(key);
            }
        }
    }

    /// Rewrite the backing file: temp file in the same directory, fsync, rename.
    pub fn persist(&self) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.words.serialize(&mut ser)?;

        let tmp = self.path.with_extension("json.tmp");
        let write_tmp = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&buf)?;
            file.sync_all()
        };
        write_tmp().map_err(|e| Error::knowledge_index(&tmp, e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            Error::knowledge_index(&self.path, e.to_string())
        })?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.words.values().map(Vec::len).sum()
    }
}
