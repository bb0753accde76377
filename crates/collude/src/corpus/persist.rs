//! Line-oriented save/load of a corpus so a run can be resumed later.
//!
//! ```text
//! next-group-id\t<int>
//! begin-documents
//! start-document
//! path\t<string>
//! original-path\t<string>
//! name\t<string>
//! num-trigrams\t<int>
//! group-id\t<int>
//! end-document
//! end-documents
//! begin-tokens
//! next-index\t<int>
//! <id>\t<token>
//! end-tokens
//! begin-tuples
//! <id0> <id1> <id2> FILES:[ <doc> <doc> ]
//! end-tuples
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info};

use super::{Corpus, CorpusError};
use crate::document::{Document, TEMPLATE_GROUP};
use crate::interner::TokenId;

impl Corpus {
    /// Write the corpus in the saved-data format.
    pub fn save(&self, mut out: impl Write) -> Result<(), CorpusError> {
        writeln!(out, "next-group-id\t{}", self.last_group_id)?;

        writeln!(out, "begin-documents")?;
        for doc in &self.documents {
            writeln!(out, "start-document")?;
            writeln!(out, "path\t{}", doc.path().display())?;
            writeln!(out, "original-path\t{}", doc.original_path().display())?;
            writeln!(out, "name\t{}", doc.name())?;
            writeln!(out, "num-trigrams\t{}", doc.trigram_count())?;
            writeln!(out, "group-id\t{}", doc.group_id())?;
            writeln!(out, "end-document")?;
        }
        writeln!(out, "end-documents")?;

        writeln!(out, "begin-tokens")?;
        writeln!(out, "next-index\t{}", self.interner.next_index())?;
        for (id, text) in self.interner.entries() {
            writeln!(out, "{id}\t{text}")?;
        }
        writeln!(out, "end-tokens")?;

        writeln!(out, "begin-tuples")?;
        for ([t0, t1, t2], postings) in &self.index {
            write!(out, "{t0} {t1} {t2} FILES:[")?;
            for doc in postings.docs() {
                write!(out, " {doc}")?;
            }
            writeln!(out, " ]")?;
        }
        writeln!(out, "end-tuples")?;
        out.flush()?;
        Ok(())
    }

    /// Save to a file, replacing it.
    pub fn save_to_path(&self, path: &Path) -> Result<(), CorpusError> {
        self.save(BufWriter::new(File::create(path)?))?;
        info!(
            path = %path.display(),
            documents = self.documents.len(),
            trigrams = self.index.len(),
            "saved corpus"
        );
        Ok(())
    }

    /// Read a corpus written by [`Corpus::save`].
    ///
    /// Template flags are re-derived from document groups and pair metrics are
    /// recomputed, so the result can answer queries or resume a run at once.
    pub fn load(reader: impl BufRead) -> Result<Self, CorpusError> {
        let mut lines = NumberedLines::new(reader);
        let mut corpus = Self::new();

        corpus.last_group_id = lines.expect_field("next-group-id")?;
        lines.expect_marker("begin-documents")?;
        loop {
            let line = lines.next_line("start-document or end-documents")?;
            match line.as_str() {
                "end-documents" => break,
                "start-document" => {
                    let doc = read_document(&mut lines)?;
                    corpus.has_template_material |= doc.group_id() == TEMPLATE_GROUP;
                    corpus.documents.push(doc);
                }
                _ => return Err(lines.malformed("start-document or end-documents", line)),
            }
        }
        debug!(documents = corpus.documents.len(), "loaded document definitions");

        lines.expect_marker("begin-tokens")?;
        let next_index = lines.expect_field("next-index")?;
        loop {
            let line = lines.next_line("token definition or end-tokens")?;
            if line == "end-tokens" {
                break;
            }
            let Some((id, text)) = line.split_once('\t') else {
                return Err(lines.malformed("<id>\\t<token>", line));
            };
            let id = lines.parse(id, "token id")?;
            corpus.interner.insert_at(TokenId(id), text);
        }
        corpus.interner.set_next_index(next_index);
        debug!(tokens = corpus.interner.len(), "loaded tokens");

        lines.expect_marker("begin-tuples")?;
        loop {
            let line = lines.next_line("tuple definition or end-tuples")?;
            if line == "end-tuples" {
                break;
            }
            read_tuple(&mut corpus, &lines, &line)?;
        }
        debug!(trigrams = corpus.index.len(), "loaded tuples");

        let documents = &corpus.documents;
        corpus
            .index
            .rederive_templates(|d| documents[d].group_id() == TEMPLATE_GROUP);
        corpus.compute_similarities();
        Ok(corpus)
    }

    /// Load from a file written by [`Corpus::save_to_path`].
    pub fn load_from_path(path: &Path) -> Result<Self, CorpusError> {
        let file = File::open(path).map_err(|source| CorpusError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let corpus = Self::load(BufReader::new(file))?;
        info!(
            path = %path.display(),
            documents = corpus.documents.len(),
            trigrams = corpus.index.len(),
            "loaded corpus"
        );
        Ok(corpus)
    }
}

fn read_document<R: BufRead>(lines: &mut NumberedLines<R>) -> Result<Document, CorpusError> {
    let mut path = None;
    let mut original_path = None;
    let mut name = None;
    let mut trigrams = 0;
    let mut group_id = 0;

    loop {
        let line = lines.next_line("document field or end-document")?;
        if line == "end-document" {
            break;
        }
        let Some((field, value)) = line.split_once('\t') else {
            return Err(lines.malformed("<field>\\t<value>", line));
        };
        match field {
            "path" => path = Some(value.to_owned()),
            "original-path" => original_path = Some(value.to_owned()),
            "name" => name = Some(value.to_owned()),
            "num-trigrams" => trigrams = lines.parse(value, "trigram count")?,
            "group-id" => group_id = lines.parse(value, "group id")?,
            _ => return Err(lines.malformed("document field", line)),
        }
    }

    let Some(path) = path else {
        return Err(lines.malformed("path field", "end-document".to_owned()));
    };
    let mut doc = Document::new(path, group_id);
    if let Some(original) = original_path {
        doc.set_original_path(original);
    }
    if let Some(name) = name {
        doc.set_name(name);
    }
    doc.set_trigram_count(trigrams);
    Ok(doc)
}

fn read_tuple<R: BufRead>(
    corpus: &mut Corpus,
    lines: &NumberedLines<R>,
    line: &str,
) -> Result<(), CorpusError> {
    let items: Vec<&str> = line.split_whitespace().collect();
    if items.len() < 5 || items[3] != "FILES:[" {
        return Err(lines.malformed("<id0> <id1> <id2> FILES:[ <doc>... ]", line.to_owned()));
    }

    let mut key = [TokenId(0); 3];
    for (slot, item) in key.iter_mut().zip(&items[..3]) {
        let id = TokenId(lines.parse(item, "token id")?);
        if corpus.interner.resolve(id).is_err() {
            return Err(lines.malformed("interned token id", (*item).to_owned()));
        }
        *slot = id;
    }

    for item in &items[4..] {
        if *item == "]" {
            break;
        }
        let doc: usize = lines.parse(item, "document index")?;
        if doc >= corpus.documents.len() {
            return Err(lines.malformed("known document index", (*item).to_owned()));
        }
        corpus.index.add_occurrence(key, doc, false);
    }
    Ok(())
}

/// Lines of saved data with a running 1-based line number for errors.
struct NumberedLines<R> {
    lines: std::io::Lines<R>,
    number: usize,
}

impl<R: BufRead> NumberedLines<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            number: 0,
        }
    }

    fn next_line(&mut self, expected: &'static str) -> Result<String, CorpusError> {
        self.number += 1;
        match self.lines.next() {
            Some(line) => Ok(line?),
            None => Err(self.malformed(expected, "end of file".to_owned())),
        }
    }

    fn expect_marker(&mut self, marker: &'static str) -> Result<(), CorpusError> {
        let line = self.next_line(marker)?;
        if line == marker {
            Ok(())
        } else {
            Err(self.malformed(marker, line))
        }
    }

    fn expect_field<T: FromStr>(&mut self, field: &'static str) -> Result<T, CorpusError> {
        let line = self.next_line(field)?;
        match line.split_once('\t') {
            Some((name, value)) if name == field => self.parse(value, field),
            _ => Err(self.malformed(field, line)),
        }
    }

    fn parse<T: FromStr>(&self, value: &str, expected: &'static str) -> Result<T, CorpusError> {
        value
            .trim()
            .parse()
            .map_err(|_| self.malformed(expected, value.to_owned()))
    }

    fn malformed(&self, expected: &'static str, found: String) -> CorpusError {
        CorpusError::Malformed {
            line: self.number,
            expected,
            found,
        }
    }
}
