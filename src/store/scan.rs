//! Key Scan Module
//!
//! Lazy, cursor-driven enumeration of the keys under a prefix.

use std::collections::{HashSet, VecDeque};

use super::KeyValueStore;
use crate::error::Result;

/// Pages through [`KeyValueStore::scan_page`] one request at a time.
///
/// The enumeration is finite and can only be restarted from the
/// beginning. It does not observe a consistent snapshot: a key created
/// or deleted while the scan runs may or may not be yielded. Keys the
/// store repeats across pages are yielded once.
///
/// Deduplication remembers every key yielded so far, so memory grows
/// with the number of keys under the prefix until the scan is dropped
/// or restarted.
pub struct KeyScan<'a> {
    store: &'a dyn KeyValueStore,
    prefix: String,
    page_size: usize,
    cursor: Option<String>,
    buffer: VecDeque<String>,
    seen: HashSet<String>,
    finished: bool,
}

impl<'a> KeyScan<'a> {
    pub fn new(store: &'a dyn KeyValueStore, prefix: &str, page_size: usize) -> Self {
        Self {
            store,
            prefix: prefix.to_string(),
            page_size,
            cursor: None,
            buffer: VecDeque::new(),
            seen: HashSet::new(),
            finished: false,
        }
    }

    /// Returns the next key, fetching another page when the current one is
    /// exhausted. `Ok(None)` marks the end of the enumeration.
    pub async fn next_key(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(key) = self.buffer.pop_front() {
                return Ok(Some(key));
            }
            if self.finished {
                return Ok(None);
            }

            let page = self
                .store
                .scan_page(&self.prefix, self.cursor.take(), self.page_size)
                .await?;
            self.finished = page.cursor.is_none();
            self.cursor = page.cursor;

            for key in page.keys {
                if self.seen.insert(key.clone()) {
                    self.buffer.push_back(key);
                }
            }
        }
    }

    /// Starts the enumeration over from the first page.
    pub fn restart(&mut self) {
        self.cursor = None;
        self.buffer.clear();
        self.seen.clear();
        self.finished = false;
    }

    /// Drains the remaining keys into a vector.
    pub async fn collect_keys(mut self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        while let Some(key) = self.next_key().await? {
            keys.push(key);
        }
        Ok(keys)
    }
}
