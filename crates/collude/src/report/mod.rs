//! Classifying a document's text into copied and normal spans against a
//! second document, for highlighted and XML reports.

pub mod console;
pub mod xml;

use std::fmt;
use std::path::Path;

use crate::corpus::{CompareFlags, Corpus, CorpusError};
use crate::document::TrigramWindow;

/// Classification of a run of report text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpanKind {
    /// Not part of any shared trigram.
    Normal,
    /// Shared with the other document.
    Copied,
    /// Shared with the other document and with no third one.
    CopiedUnique,
    /// Shared, and also present in template material.
    CopiedTemplate,
}

impl SpanKind {
    /// Name used for the kind in XML output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Copied => "copied",
            Self::CopiedUnique => "copied-unique",
            Self::CopiedTemplate => "copied-template",
        }
    }

    /// `true` for every kind except [`SpanKind::Normal`].
    #[must_use]
    pub fn is_copied(self) -> bool {
        self != Self::Normal
    }
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A classified run of text. Offsets are in characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    /// How the text is classified.
    pub kind: SpanKind,
    /// The text itself.
    pub text: String,
    /// Offset of the first character.
    pub start: usize,
    /// Offset one past the last character.
    pub end: usize,
}

/// One shared trigram found while classifying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrigramHit {
    /// The trigram's tokens joined by spaces.
    pub text: String,
    /// Character offset where the trigram starts.
    pub start: usize,
    /// Character offset where the trigram ends.
    pub end: usize,
}

/// Result of classifying one document against another.
#[derive(Clone, Debug, Default)]
pub struct Classification {
    /// Spans covering the whole text, in order, with no gaps or overlaps.
    pub spans: Vec<Span>,
    /// Every shared trigram, in text order.
    pub hits: Vec<TrigramHit>,
}

/// Read `path` as report text: lossy UTF-8 with tabs widened to four spaces.
pub fn report_text(path: &Path) -> Result<String, CorpusError> {
    let bytes = std::fs::read(path).map_err(|source| CorpusError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).replace('\t', "    "))
}

/// Splits document text into [`Span`]s by how its trigrams match another
/// document in the same corpus.
///
/// The text is tokenized afresh, so offsets always refer to exactly the text
/// being rendered. Outside a match only the text up to the second token of
/// each trigram is committed, because the next trigram re-covers the rest.
#[derive(Clone, Copy, Debug)]
pub struct SpanClassifier<'a> {
    corpus: &'a Corpus,
    flags: CompareFlags,
}

impl<'a> SpanClassifier<'a> {
    /// Classify against `corpus` using `flags` to decide what counts as shared.
    #[must_use]
    pub fn new(corpus: &'a Corpus, flags: CompareFlags) -> Self {
        Self { corpus, flags }
    }

    /// Classify document `doc`'s report text against document `other`.
    pub fn classify_document(&self, doc: usize, other: usize) -> Result<Classification, CorpusError> {
        let text = report_text(self.corpus.document(doc).path())?;
        self.classify(&text, doc, other)
    }

    /// Classify `text`, tokenized in document `doc`'s dialect, against `other`.
    pub fn classify(&self, text: &str, doc: usize, other: usize) -> Result<Classification, CorpusError> {
        let interner = self.corpus.interner();
        let index = self.corpus.index();
        let mut window = TrigramWindow::new(self.corpus.document(doc).dialect(), text);
        window.advance(|t| interner.lookup(t));
        window.advance(|t| interner.lookup(t));

        let mut out = SpanWriter::new(text);
        let mut hits = Vec::new();
        let mut open = SpanKind::Normal;

        while window.advance(|t| interner.lookup(t)) {
            let matching = window
                .key()
                .filter(|key| self.corpus.is_matching_trigram(key, doc, other, self.flags))
                .and_then(|key| index.postings(&key).map(|postings| (key, postings)));

            if let Some((key, postings)) = matching {
                let kind = if postings.is_template() {
                    SpanKind::CopiedTemplate
                } else if postings.len() == 2 {
                    SpanKind::CopiedUnique
                } else {
                    SpanKind::Copied
                };
                if open != kind {
                    out.emit(SpanKind::Normal, window.start(0));
                    open = kind;
                }
                out.emit(kind, window.end());
                hits.push(TrigramHit {
                    text: self.corpus.trigram_string(&key)?,
                    start: window.start(0),
                    end: window.end(),
                });
            } else if out.written() < window.start(1) {
                out.emit(SpanKind::Normal, window.start(1));
                open = SpanKind::Normal;
            }
        }

        Ok(Classification {
            spans: out.finish(),
            hits,
        })
    }
}

/// Accumulates contiguous spans over a text, merging neighbours of one kind.
struct SpanWriter<'t> {
    text: &'t str,
    /// Byte offset of every character, plus the text length.
    byte_at: Vec<usize>,
    written: usize,
    spans: Vec<Span>,
}

impl<'t> SpanWriter<'t> {
    fn new(text: &'t str) -> Self {
        let byte_at = text
            .char_indices()
            .map(|(b, _)| b)
            .chain(std::iter::once(text.len()))
            .collect();
        Self {
            text,
            byte_at,
            written: 0,
            spans: Vec::new(),
        }
    }

    fn written(&self) -> usize {
        self.written
    }

    /// Commit text up to character `upto` as `kind`.
    fn emit(&mut self, kind: SpanKind, upto: usize) {
        let upto = upto.min(self.byte_at.len() - 1);
        if upto <= self.written {
            return;
        }
        let chunk = &self.text[self.byte_at[self.written]..self.byte_at[upto]];
        match self.spans.last_mut() {
            Some(last) if last.kind == kind => {
                last.text.push_str(chunk);
                last.end = upto;
            }
            _ => self.spans.push(Span {
                kind,
                text: chunk.to_owned(),
                start: self.written,
                end: upto,
            }),
        }
        self.written = upto;
    }

    fn finish(mut self) -> Vec<Span> {
        self.emit(SpanKind::Normal, self.byte_at.len() - 1);
        self.spans
    }
}
