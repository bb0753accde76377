//! Bidirectional token text ↔ [`TokenId`] table shared by a corpus.

use std::collections::HashMap;
use std::fmt;

use crate::corpus::CorpusError;

/// Dense integer handle for an interned token string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId(pub usize);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Assigns sequential ids to token strings on first sight.
///
/// Ids keep counting across [`TokenInterner::clear`], so an id issued before
/// a clear can never alias a token interned after it.
#[derive(Debug, Default)]
pub struct TokenInterner {
    ids: HashMap<String, TokenId>,
    texts: HashMap<TokenId, String>,
    next_index: usize,
}

impl TokenInterner {
    /// Create an empty interner whose first id is `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `text`, allocating the next sequential id if it is new.
    pub fn intern(&mut self, text: &str) -> TokenId {
        if let Some(&id) = self.ids.get(text) {
            return id;
        }
        let id = TokenId(self.next_index);
        self.next_index += 1;
        self.ids.insert(text.to_owned(), id);
        self.texts.insert(id, text.to_owned());
        id
    }

    /// Text previously interned as `id`.
    pub fn resolve(&self, id: TokenId) -> Result<&str, CorpusError> {
        self.texts
            .get(&id)
            .map(String::as_str)
            .ok_or(CorpusError::UnknownToken(id))
    }

    /// Id of `text` if it has been interned, without allocating.
    #[must_use]
    pub fn lookup(&self, text: &str) -> Option<TokenId> {
        self.ids.get(text).copied()
    }

    /// Forget every token. Previously issued ids become unresolvable.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.texts.clear();
    }

    /// Number of tokens currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// `true` when no token is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// The id the next new token will receive.
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Every `(id, text)` pair in ascending id order.
    #[must_use]
    pub fn entries(&self) -> Vec<(TokenId, &str)> {
        let mut entries: Vec<(TokenId, &str)> = self
            .texts
            .iter()
            .map(|(id, text)| (*id, text.as_str()))
            .collect();
        entries.sort_unstable_by_key(|(id, _)| *id);
        entries
    }

    /// Install `text` under a fixed `id`, as read back from a saved corpus.
    pub(crate) fn insert_at(&mut self, id: TokenId, text: &str) {
        self.ids.insert(text.to_owned(), id);
        self.texts.insert(id, text.to_owned());
        self.next_index = self.next_index.max(id.0 + 1);
    }

    pub(crate) fn set_next_index(&mut self, next_index: usize) {
        self.next_index = self.next_index.max(next_index);
    }
}
