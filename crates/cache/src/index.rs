use crate::CacheKey;
use recall_document::Document;
use std::collections::BTreeMap;
use std::collections::btree_map::Iter;

/// In-memory mapping from cache key to document.
///
/// Keys are unique and the last insert wins. Nothing is ever evicted.
/// Iteration is in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheIndex {
    entries: BTreeMap<CacheKey, Document>,
}
impl CacheIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, returning the document previously under `key`.
    pub fn insert(&mut self, key: CacheKey, document: Document) -> Option<Document> {
        self.entries.insert(key, document)
    }

    pub fn get(&self, key: &CacheKey) -> Option<&Document> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> Iter<'_, CacheKey, Document> {
        self.entries.iter()
    }
}
impl<'a> IntoIterator for &'a CacheIndex {
    type Item = (&'a CacheKey, &'a Document);
    type IntoIter = Iter<'a, CacheKey, Document>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
