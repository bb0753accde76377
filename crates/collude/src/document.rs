//! A corpus document and its sliding three-token window.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use crate::corpus::CorpusError;
use crate::interner::{TokenId, TokenInterner};
use crate::tokenize::{Dialect, Tokenizer};

/// Group id reserved for template material.
pub const TEMPLATE_GROUP: usize = 0;

/// Window over the last three tokens produced by a [`Tokenizer`].
///
/// Slot 2 always holds the most recently read token. Ids are optional so a
/// window can be driven against a read-only interner, where tokens never
/// seen before have no id.
#[derive(Debug)]
pub struct TrigramWindow {
    tokenizer: Tokenizer,
    ids: [Option<TokenId>; 3],
    starts: [usize; 3],
    end: usize,
}

impl TrigramWindow {
    /// Start a window over `text`, empty until the first [`Self::advance`].
    #[must_use]
    pub fn new(dialect: Dialect, text: &str) -> Self {
        Self {
            tokenizer: Tokenizer::new(dialect, text),
            ids: [None; 3],
            starts: [0; 3],
            end: 0,
        }
    }

    /// Read one token and shift it into slot 2, naming it with `id_for`.
    ///
    /// Returns `false` without touching the window once the tokenizer is
    /// exhausted, so the last complete trigram stays readable.
    pub fn advance(&mut self, id_for: impl FnOnce(&str) -> Option<TokenId>) -> bool {
        if !self.tokenizer.read_next() {
            return false;
        }
        let token = self.tokenizer.current_token();
        self.ids.rotate_left(1);
        self.starts.rotate_left(1);
        self.ids[2] = id_for(&token.text);
        self.starts[2] = token.start;
        self.end = token.end;
        true
    }

    /// Id in slot `i`, or `None` if that token is unknown to the interner.
    #[must_use]
    pub fn id(&self, i: usize) -> Option<TokenId> {
        assert!(i < 3, "trigram window slot {i} out of range");
        self.ids[i]
    }

    /// All three ids, if every slot holds a known token.
    #[must_use]
    pub fn key(&self) -> Option<[TokenId; 3]> {
        Some([self.ids[0]?, self.ids[1]?, self.ids[2]?])
    }

    /// Start offset of the token in slot `i`.
    #[must_use]
    pub fn start(&self, i: usize) -> usize {
        assert!(i < 3, "trigram window slot {i} out of range");
        self.starts[i]
    }

    /// End offset of the token in slot 2.
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }
}

/// One input registered with a corpus.
#[derive(Debug)]
pub struct Document {
    path: PathBuf,
    original_path: PathBuf,
    name: String,
    group_id: usize,
    trigram_count: usize,
    unique_count: usize,
    engagement_count: usize,
    window: Option<TrigramWindow>,
}

impl Document {
    /// A document read from `path`, named after its file name.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, group_id: usize) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self {
            original_path: path.clone(),
            path,
            name,
            group_id,
            trigram_count: 0,
            unique_count: 0,
            engagement_count: 0,
            window: None,
        }
    }

    /// Path the text is read from (the converted copy, if any).
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the source as originally registered.
    #[must_use]
    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Group id; [`TEMPLATE_GROUP`] marks template material.
    #[must_use]
    pub fn group_id(&self) -> usize {
        self.group_id
    }

    /// Distinct trigrams read in the last pass.
    #[must_use]
    pub fn trigram_count(&self) -> usize {
        self.trigram_count
    }

    /// Trigrams found in no other document.
    #[must_use]
    pub fn unique_count(&self) -> usize {
        self.unique_count
    }

    /// Trigrams shared with template material.
    #[must_use]
    pub fn engagement_count(&self) -> usize {
        self.engagement_count
    }

    /// Tokenizer dialect picked from the readable path's extension.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        Dialect::from_path(&self.path)
    }

    /// Point the document at converted text, keeping its original path.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    pub(crate) fn set_original_path(&mut self, path: impl Into<PathBuf>) {
        self.original_path = path.into();
    }

    /// Replace the display name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn set_trigram_count(&mut self, count: usize) {
        self.trigram_count = count;
    }

    pub(crate) fn increment_trigram_count(&mut self) {
        self.trigram_count += 1;
    }

    pub(crate) fn increment_unique_count(&mut self) {
        self.unique_count += 1;
    }

    pub(crate) fn increment_engagement_count(&mut self) {
        self.engagement_count += 1;
    }

    pub(crate) fn reset_derived_counts(&mut self) {
        self.unique_count = 0;
        self.engagement_count = 0;
    }

    /// Open the document's file and prime the window.
    ///
    /// The returned guard closes the input when dropped, on every exit path.
    pub fn start_input<'a>(
        &'a mut self,
        interner: &'a mut TokenInterner,
    ) -> Result<ReadPass<'a>, CorpusError> {
        let bytes = std::fs::read(&self.path).map_err(|source| CorpusError::Open {
            path: self.path.clone(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        self.start_input_text(&text, interner);
        Ok(ReadPass {
            document: self,
            interner,
        })
    }

    /// Prime the window over in-memory `text` instead of the file.
    pub fn start_input_text(&mut self, text: &str, interner: &mut TokenInterner) {
        self.window = Some(TrigramWindow::new(self.dialect(), text));
        self.read_trigram(interner);
        self.read_trigram(interner);
    }

    /// Shift the next token into the window.
    ///
    /// Returns `false` once the input is exhausted or no input is open.
    pub fn read_trigram(&mut self, interner: &mut TokenInterner) -> bool {
        self.window
            .as_mut()
            .is_some_and(|window| window.advance(|text| Some(interner.intern(text))))
    }

    /// Token id in window slot `i` (0, 1 or 2).
    ///
    /// # Panics
    ///
    /// Panics if `i > 2` or no complete trigram has been read.
    #[must_use]
    pub fn current_token_id(&self, i: usize) -> TokenId {
        match self.open_window().id(i) {
            Some(id) => id,
            None => panic!("trigram window slot {i} has not been filled"),
        }
    }

    /// The current trigram's three ids.
    #[must_use]
    pub fn current_key(&self) -> [TokenId; 3] {
        [
            self.current_token_id(0),
            self.current_token_id(1),
            self.current_token_id(2),
        ]
    }

    /// Start offset of the current trigram.
    #[must_use]
    pub fn current_trigram_start(&self) -> usize {
        self.current_trigram_start_at(0)
    }

    /// Start offset of the token in window slot `i`.
    #[must_use]
    pub fn current_trigram_start_at(&self, i: usize) -> usize {
        self.open_window().start(i)
    }

    /// End offset of the current trigram.
    #[must_use]
    pub fn current_trigram_end(&self) -> usize {
        self.open_window().end()
    }

    /// Drop the tokenizer and window.
    pub fn close_input(&mut self) {
        self.window = None;
    }

    /// `true` while a read pass is open.
    #[must_use]
    pub fn is_reading(&self) -> bool {
        self.window.is_some()
    }

    fn open_window(&self) -> &TrigramWindow {
        match &self.window {
            Some(window) => window,
            None => panic!("document {} has no open input", self.name),
        }
    }
}

/// Scoped read pass over one document; closes the input on drop.
#[derive(Debug)]
pub struct ReadPass<'a> {
    document: &'a mut Document,
    interner: &'a mut TokenInterner,
}

impl ReadPass<'_> {
    /// Shift the next token into the window. See [`Document::read_trigram`].
    pub fn read_trigram(&mut self) -> bool {
        self.document.read_trigram(self.interner)
    }
}

impl Deref for ReadPass<'_> {
    type Target = Document;

    fn deref(&self) -> &Document {
        self.document
    }
}

impl DerefMut for ReadPass<'_> {
    fn deref_mut(&mut self) -> &mut Document {
        self.document
    }
}

impl Drop for ReadPass<'_> {
    fn drop(&mut self) {
        self.document.close_input();
    }
}
