//! Inverted index from trigram keys to the documents containing them.

use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::interner::TokenId;

/// Ordered triple of token ids.
pub type TrigramKey = [TokenId; 3];

/// Documents containing one trigram.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Postings {
    docs: Vec<usize>,
    is_template: bool,
}

impl Postings {
    /// Document indices in insertion order, each at most once.
    #[must_use]
    pub fn docs(&self) -> &[usize] {
        &self.docs
    }

    /// Number of documents containing the trigram.
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// `true` if no document holds the trigram.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// `true` if any contributing document is template material.
    #[must_use]
    pub fn is_template(&self) -> bool {
        self.is_template
    }

    /// `true` if `doc` contains the trigram.
    #[must_use]
    pub fn contains(&self, doc: usize) -> bool {
        self.docs.contains(&doc)
    }

    /// `true` if both documents contain the trigram.
    #[must_use]
    pub fn contains_pair(&self, a: usize, b: usize) -> bool {
        self.contains(a) && self.contains(b)
    }
}

/// Map from [`TrigramKey`] to its [`Postings`], traversed in key order.
#[derive(Debug, Default)]
pub struct TrigramIndex {
    map: BTreeMap<TrigramKey, Postings>,
}

impl TrigramIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `doc` contains `key`.
    ///
    /// Returns `true` only the first time a given document is recorded for a
    /// key. `is_template` is OR-ed into the key's template flag either way.
    pub fn add_occurrence(&mut self, key: TrigramKey, doc: usize, is_template: bool) -> bool {
        let postings = self.map.entry(key).or_default();
        postings.is_template |= is_template;
        if postings.contains(doc) {
            return false;
        }
        postings.docs.push(doc);
        true
    }

    /// Whether `key` links `doc_i` and `doc_j` under the given filters.
    ///
    /// With `ignore_template`, template-flagged keys never match. With
    /// `unique_only`, the key must be held by exactly two documents, which
    /// together with the membership check means by exactly this pair.
    #[must_use]
    pub fn is_matching(
        &self,
        key: &TrigramKey,
        doc_i: usize,
        doc_j: usize,
        unique_only: bool,
        ignore_template: bool,
    ) -> bool {
        let Some(postings) = self.map.get(key) else {
            return false;
        };
        if ignore_template && postings.is_template {
            return false;
        }
        if unique_only && postings.len() != 2 {
            return false;
        }
        postings.contains_pair(doc_i, doc_j)
    }

    /// Template flag of `key`; `false` for unknown keys.
    #[must_use]
    pub fn is_template(&self, key: &TrigramKey) -> bool {
        self.map.get(key).is_some_and(Postings::is_template)
    }

    /// Postings for `key`, if any document holds it.
    #[must_use]
    pub fn postings(&self, key: &TrigramKey) -> Option<&Postings> {
        self.map.get(key)
    }

    /// Number of distinct trigrams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// `true` if no trigram has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Every `(key, postings)` pair in ascending key order.
    ///
    /// Each call starts a fresh traversal from the first key.
    pub fn iter(&self) -> btree_map::Iter<'_, TrigramKey, Postings> {
        self.map.iter()
    }

    /// Drop every key.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Forget `doc` and renumber every later document down by one.
    ///
    /// Keys left without documents are removed.
    pub fn remove_document(&mut self, doc: usize) {
        self.map.retain(|_, postings| {
            postings.docs.retain(|&d| d != doc);
            for d in &mut postings.docs {
                if *d > doc {
                    *d -= 1;
                }
            }
            !postings.docs.is_empty()
        });
    }

    /// Drop `doc` from every postings list, keeping other document numbers.
    ///
    /// Used before re-reading a document. Keys left without documents are
    /// removed.
    pub fn forget_document(&mut self, doc: usize) {
        self.map.retain(|_, postings| {
            postings.docs.retain(|&d| d != doc);
            !postings.docs.is_empty()
        });
    }

    /// Recompute every template flag from the documents now in each postings.
    pub fn rederive_templates(&mut self, is_template_doc: impl Fn(usize) -> bool) {
        for postings in self.map.values_mut() {
            postings.is_template = postings.docs.iter().any(|&d| is_template_doc(d));
        }
    }
}

impl<'a> IntoIterator for &'a TrigramIndex {
    type Item = (&'a TrigramKey, &'a Postings);
    type IntoIter = btree_map::Iter<'a, TrigramKey, Postings>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
