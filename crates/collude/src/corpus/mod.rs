//! The document collection: import, trigram indexing and pairwise metrics.

pub mod compare;
mod error;
mod persist;

pub use compare::{CompareFlags, MatchCounts};
pub use error::CorpusError;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::document::{Document, TEMPLATE_GROUP};
use crate::extract::SourceFormat;
use crate::index::{TrigramIndex, TrigramKey};
use crate::interner::TokenInterner;
use crate::walk::{self, WalkErrors, WalkOptions};

/// How files under an imported path are assigned to groups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImportMode {
    /// Every file gets a group of its own.
    #[default]
    Individual,
    /// All files beneath a directory share one group named after it.
    Grouped,
    /// Every file is template material (group 0).
    Template,
}

/// Outcome of [`Corpus::add_path`].
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Documents added to the corpus.
    pub added: usize,
    /// Non-fatal errors met while walking a directory.
    pub walk_errors: Option<WalkErrors>,
}

/// Outcome of a [`Corpus::run`] pass.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Documents read successfully.
    pub read: usize,
    /// Documents that could not be opened; they have been removed.
    pub problems: Vec<CorpusError>,
    /// `true` if the pass stopped before reading every document.
    pub cancelled: bool,
    /// Index of the first document the pass did not reach, after problem
    /// files were removed. Equals the corpus length when nothing is left to
    /// read; pass it to [`Corpus::run`] to resume a cancelled pass.
    pub next: usize,
}

/// Owns documents, the shared interner and index, and the pair matrix.
#[derive(Debug, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    interner: TokenInterner,
    index: TrigramIndex,
    matches: Vec<MatchCounts>,
    matrix_size: usize,
    group_names: BTreeMap<usize, String>,
    last_group_id: usize,
    has_template_material: bool,
}

impl Corpus {
    /// Create an empty corpus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── documents ──────────────────────────────────────────────────────────

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// `true` if the corpus holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document at index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of range.
    #[must_use]
    pub fn document(&self, i: usize) -> &Document {
        &self.documents[i]
    }

    /// Mutable access to document `i`, e.g. to repoint it at converted text.
    pub fn document_mut(&mut self, i: usize) -> &mut Document {
        &mut self.documents[i]
    }

    /// All documents in index order.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// The shared token interner.
    #[must_use]
    pub fn interner(&self) -> &TokenInterner {
        &self.interner
    }

    /// The shared trigram index.
    #[must_use]
    pub fn index(&self) -> &TrigramIndex {
        &self.index
    }

    /// Allocate a fresh group id.
    ///
    /// Ids are handed out consecutively from 1, so the named groups of a
    /// grouped import are exactly ids `1..=group_size()`. [`Corpus::group_name`]
    /// and the per-group counts rely on this, which is why grouped imports
    /// should not be mixed with other imports in one corpus.
    pub fn new_group_id(&mut self) -> usize {
        self.last_group_id += 1;
        self.last_group_id
    }

    /// Register a readable file under `group_id`.
    ///
    /// Returns `false`, leaving the corpus unchanged, if `path` is not a
    /// readable file.
    pub fn add_document(&mut self, path: impl Into<PathBuf>, group_id: usize) -> bool {
        let path = path.into();
        if !is_readable_file(&path) {
            debug!(path = %path.display(), "skipping unreadable path");
            return false;
        }
        if group_id == TEMPLATE_GROUP {
            self.has_template_material = true;
        }
        self.documents.push(Document::new(path, group_id));
        true
    }

    /// Register a readable file with an explicit display name.
    pub fn add_named_document(
        &mut self,
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        group_id: usize,
    ) -> bool {
        if !self.add_document(path, group_id) {
            return false;
        }
        if let Some(doc) = self.documents.last_mut() {
            doc.set_name(name);
        }
        true
    }

    /// Register a file, or every file beneath a directory, using `mode`.
    pub fn add_path(&mut self, path: &Path, mode: ImportMode, opts: &WalkOptions) -> ImportReport {
        if mode == ImportMode::Template {
            self.has_template_material = true;
        }
        if !path.is_dir() {
            let group = match mode {
                ImportMode::Template => TEMPLATE_GROUP,
                ImportMode::Individual | ImportMode::Grouped => self.new_group_id(),
            };
            let added = usize::from(self.add_document(path, group));
            return ImportReport { added, walk_errors: None };
        }

        let mut result = walk::walk_dir(path, opts);
        let walk_errors = WalkErrors::from_result(&mut result);
        let dir_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        let shared = match mode {
            ImportMode::Template => Some(TEMPLATE_GROUP),
            ImportMode::Grouped => Some(self.new_group_id()),
            ImportMode::Individual => None,
        };
        if mode == ImportMode::Grouped
            && let Some(group) = shared
        {
            self.group_names.insert(group, dir_name);
        }

        let mut added = 0;
        for file in result.files {
            let group = match shared {
                Some(group) => group,
                None => self.new_group_id(),
            };
            added += usize::from(self.add_document(file, group));
        }
        debug!(path = %path.display(), ?mode, added, "imported directory");
        ImportReport { added, walk_errors }
    }

    /// Register the files listed in a definition file.
    ///
    /// One path per line; `START GROUP` and `END GROUP` (any case) bracket
    /// files sharing one new group. Lines naming no existing file are skipped.
    pub fn add_documents_from_definition_file(&mut self, path: &Path) -> Result<usize, CorpusError> {
        let text = std::fs::read_to_string(path).map_err(|source| CorpusError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut current_group = None;
        let mut added = 0;
        for line in text.lines().map(str::trim) {
            if line.eq_ignore_ascii_case("START GROUP") {
                current_group = Some(self.new_group_id());
            } else if line.eq_ignore_ascii_case("END GROUP") {
                current_group = None;
            } else if Path::new(line).is_file() {
                let group = match current_group {
                    Some(group) => group,
                    None => self.new_group_id(),
                };
                added += usize::from(self.add_document(line, group));
            }
        }
        info!(definitions = %path.display(), added, "read definition file");
        Ok(added)
    }

    /// Remove document `i`, renumbering later documents.
    ///
    /// Its trigrams leave the index; metrics are recomputed if they had been.
    pub fn remove_document(&mut self, i: usize) -> Document {
        let doc = self.documents.remove(i);
        self.index.remove_document(i);
        let documents = &self.documents;
        self.index
            .rederive_templates(|d| documents[d].group_id() == TEMPLATE_GROUP);
        if !self.matches.is_empty() {
            self.compute_similarities();
        }
        doc
    }

    /// Drop every document and all reading state.
    pub fn clear(&mut self) {
        self.documents.clear();
        self.group_names.clear();
        self.last_group_id = 0;
        self.has_template_material = false;
        self.reset_reading();
    }

    /// Forget interned tokens, indexed trigrams and pair counts.
    pub fn reset_reading(&mut self) {
        self.interner.clear();
        self.index.clear();
        self.matches.clear();
        self.matrix_size = 0;
    }

    // ── groups ─────────────────────────────────────────────────────────────

    /// `true` when documents were imported as named directory groups.
    #[must_use]
    pub fn is_grouped(&self) -> bool {
        !self.group_names.is_empty()
    }

    /// Number of named groups, or of documents when ungrouped.
    #[must_use]
    pub fn group_size(&self) -> usize {
        if self.is_grouped() {
            self.group_names.len()
        } else {
            self.documents.len()
        }
    }

    /// Name of group `index` (group id `index + 1`), or of document `index`
    /// when ungrouped.
    #[must_use]
    pub fn group_name(&self, index: usize) -> &str {
        if self.is_grouped() {
            self.group_names.get(&(index + 1)).map_or("", String::as_str)
        } else {
            self.documents[index].name()
        }
    }

    /// `true` if document `i` belongs to the template group.
    #[must_use]
    pub fn is_template_material(&self, i: usize) -> bool {
        self.documents[i].group_id() == TEMPLATE_GROUP
    }

    /// `true` once any template material has been imported.
    #[must_use]
    pub fn has_template_material(&self) -> bool {
        self.has_template_material
    }

    /// Pairs of documents in different groups.
    #[must_use]
    pub fn number_of_pairs(&self) -> usize {
        self.report_pairs().len()
    }

    /// Every `(i, j)` with `i < j` whose documents are in different groups.
    #[must_use]
    pub fn report_pairs(&self) -> Vec<(usize, usize)> {
        let n = self.documents.len();
        (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.documents[i].group_id() != self.documents[j].group_id())
            .collect()
    }

    /// `true` if any document is not plain text or recognised source code.
    #[must_use]
    pub fn may_need_conversions(&self) -> bool {
        self.documents
            .iter()
            .any(|doc| SourceFormat::of(doc.path()).needs_conversion())
    }

    // ── reading ────────────────────────────────────────────────────────────

    /// Read documents from `first` onward, then compute pair metrics.
    pub fn run(&mut self, first: usize) -> RunSummary {
        self.run_until(first, |_| true)
    }

    /// Like [`Corpus::run`], but asks `keep_going` before each document.
    ///
    /// A `false` answer stops the pass before that document is opened and
    /// skips the metric computation. Documents that fail to open are
    /// removed and reported in the summary.
    pub fn run_until(&mut self, first: usize, mut keep_going: impl FnMut(usize) -> bool) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut failed = Vec::new();

        let mut next = self.documents.len();
        for i in first..self.documents.len() {
            if !keep_going(i) {
                summary.cancelled = true;
                next = i;
                break;
            }
            match self.read_document(i) {
                Ok(count) => {
                    debug!(doc = i, trigrams = count, "read document");
                    summary.read += 1;
                }
                Err(e) => {
                    warn!(doc = i, error = %e, "problem file");
                    failed.push(i);
                    summary.problems.push(e);
                }
            }
        }

        for &i in failed.iter().rev() {
            self.documents.remove(i);
            self.index.remove_document(i);
        }
        summary.next = next - failed.len();
        let documents = &self.documents;
        self.index
            .rederive_templates(|d| documents[d].group_id() == TEMPLATE_GROUP);

        if !summary.cancelled {
            self.compute_similarities();
        }
        info!(
            read = summary.read,
            problems = summary.problems.len(),
            cancelled = summary.cancelled,
            trigrams = self.index.len(),
            "corpus pass finished"
        );
        summary
    }

    fn read_document(&mut self, i: usize) -> Result<usize, CorpusError> {
        let Self {
            documents,
            interner,
            index,
            ..
        } = self;
        let doc = &mut documents[i];
        let is_template = doc.group_id() == TEMPLATE_GROUP;

        index.forget_document(i);
        let mut pass = doc.start_input(interner)?;
        pass.set_trigram_count(0);
        while pass.read_trigram() {
            if index.add_occurrence(pass.current_key(), i, is_template) {
                pass.increment_trigram_count();
            }
        }
        Ok(pass.trigram_count())
    }

    /// Rebuild the pair matrix and per-document unique/engagement counts.
    pub fn compute_similarities(&mut self) {
        let n = self.documents.len();
        self.matches = vec![MatchCounts::default(); n * n];
        self.matrix_size = n;
        for doc in &mut self.documents {
            doc.reset_derived_counts();
        }

        for (_, postings) in &self.index {
            let docs = postings.docs();
            if let [only] = docs {
                self.documents[*only].increment_unique_count();
            }
            if postings.is_template() {
                for &d in docs {
                    if self.documents[d].group_id() != TEMPLATE_GROUP {
                        self.documents[d].increment_engagement_count();
                    }
                }
            }
            for (fi, &a) in docs.iter().enumerate() {
                for &b in &docs[fi + 1..] {
                    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                    self.matches[lo * n + hi].record(docs.len(), postings.is_template());
                }
            }
        }
    }

    // ── metrics ────────────────────────────────────────────────────────────

    /// Distinct trigrams across the whole corpus.
    #[must_use]
    pub fn total_trigram_count(&self) -> usize {
        self.index.len()
    }

    /// Distinct trigrams in document `i`.
    #[must_use]
    pub fn count_trigrams(&self, i: usize) -> usize {
        self.documents[i].trigram_count()
    }

    /// Shared trigrams between two distinct documents, in either order.
    ///
    /// Documents added since the last [`Corpus::compute_similarities`] share
    /// nothing until the next run.
    ///
    /// # Panics
    ///
    /// Panics if `i == j` or either index is out of range.
    #[must_use]
    pub fn count_matches(&self, i: usize, j: usize, flags: CompareFlags) -> usize {
        assert_ne!(i, j, "a document is never compared with itself");
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        assert!(hi < self.documents.len(), "document {hi} out of range");
        if hi >= self.matrix_size {
            return 0;
        }
        self.matches
            .get(lo * self.matrix_size + hi)
            .map_or(0, |counts| counts.get(flags))
    }

    /// Jaccard resemblance of two documents' trigram sets; 0 when both are empty.
    ///
    /// # Panics
    ///
    /// Panics if `i == j`, like [`Corpus::count_matches`].
    #[must_use]
    pub fn resemblance(&self, i: usize, j: usize, flags: CompareFlags) -> f64 {
        let matches = self.count_matches(i, j, flags);
        let total = (self.count_trigrams(i) + self.count_trigrams(j)).saturating_sub(matches);
        if total == 0 {
            return 0.0;
        }
        matches as f64 / total as f64
    }

    /// Fraction of document `j`'s trigrams also found in document `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i == j`, like [`Corpus::count_matches`].
    #[must_use]
    pub fn containment(&self, i: usize, j: usize, flags: CompareFlags) -> f64 {
        let target = self.count_trigrams(j);
        if target == 0 {
            return 0.0;
        }
        self.count_matches(i, j, flags) as f64 / target as f64
    }

    /// Unique trigrams of group `index`, or of document `index` when ungrouped.
    #[must_use]
    pub fn unique_count(&self, index: usize) -> usize {
        self.group_total(index, Document::unique_count)
    }

    /// Template trigrams used by group `index`, or by document `index`.
    #[must_use]
    pub fn engagement_count(&self, index: usize) -> usize {
        self.group_total(index, Document::engagement_count)
    }

    fn group_total(&self, index: usize, count: fn(&Document) -> usize) -> usize {
        if self.is_grouped() {
            self.documents
                .iter()
                .filter(|doc| doc.group_id() == index + 1)
                .map(count)
                .sum()
        } else {
            count(&self.documents[index])
        }
    }

    /// `true` if `key` links documents `i` and `j` under `flags`.
    #[must_use]
    pub fn is_matching_trigram(&self, key: &TrigramKey, i: usize, j: usize, flags: CompareFlags) -> bool {
        self.index
            .is_matching(key, i, j, flags.unique, flags.ignore_template)
    }

    /// The three token texts of `key`, separated by single spaces.
    pub fn trigram_string(&self, key: &TrigramKey) -> Result<String, CorpusError> {
        let [a, b, c] = key;
        Ok(format!(
            "{} {} {}",
            self.interner.resolve(*a)?,
            self.interner.resolve(*b)?,
            self.interner.resolve(*c)?
        ))
    }

    /// Sorted strings of every trigram linking documents `i` and `j`.
    pub fn collect_matching_trigrams(
        &self,
        i: usize,
        j: usize,
        flags: CompareFlags,
    ) -> Result<Vec<String>, CorpusError> {
        let mut trigrams = self
            .index
            .iter()
            .filter(|(key, _)| self.is_matching_trigram(key, i, j, flags))
            .map(|(key, _)| self.trigram_string(key))
            .collect::<Result<Vec<_>, _>>()?;
        trigrams.sort();
        Ok(trigrams)
    }
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && std::fs::File::open(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, text: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, text).unwrap();
        path
    }

    fn corpus_of(dir: &TempDir, texts: &[&str]) -> Corpus {
        let mut corpus = Corpus::new();
        for (i, text) in texts.iter().enumerate() {
            let path = write(dir.path(), &format!("doc{i}.txt"), text);
            let group = corpus.new_group_id();
            assert!(corpus.add_document(path, group));
        }
        corpus
    }

    #[fixture]
    fn dir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    #[rstest]
    fn two_line_scenario(dir: TempDir) {
        let mut corpus = corpus_of(&dir, &["one two three four", "two three four five six"]);
        let summary = corpus.run(0);

        assert_eq!(summary.read, 2);
        assert!(summary.problems.is_empty());
        assert_eq!(corpus.count_trigrams(0), 2);
        assert_eq!(corpus.count_trigrams(1), 3);
        assert_eq!(corpus.count_matches(0, 1, CompareFlags::ALL), 1);
        assert!((corpus.resemblance(0, 1, CompareFlags::ALL) - 0.25).abs() < 1e-12);
        assert_eq!(
            corpus.collect_matching_trigrams(0, 1, CompareFlags::ALL).unwrap(),
            ["two three four"]
        );
        assert_eq!(corpus.total_trigram_count(), 4);
    }

    #[rstest]
    fn resemblance_is_symmetric_and_containment_is_not(dir: TempDir) {
        let mut corpus = corpus_of(&dir, &["a b c d e f g h", "c d e f"]);
        corpus.run(0);
        let flags = CompareFlags::ALL;

        assert_eq!(corpus.resemblance(0, 1, flags), corpus.resemblance(1, 0, flags));
        // doc1's 2 trigrams are both in doc0; doc0 has 6.
        assert!((corpus.containment(0, 1, flags) - 1.0).abs() < 1e-12);
        assert!((corpus.containment(1, 0, flags) - 2.0 / 6.0).abs() < 1e-12);
    }

    #[rstest]
    fn empty_documents_score_zero(dir: TempDir) {
        let mut corpus = corpus_of(&dir, &["", "just two", "one two three"]);
        corpus.run(0);
        let flags = CompareFlags::ALL;

        assert_eq!(corpus.resemblance(0, 1, flags), 0.0);
        assert_eq!(corpus.containment(2, 0, flags), 0.0);
        assert_eq!(corpus.containment(0, 2, flags), 0.0);
    }

    #[rstest]
    fn unique_counts_follow_postings(dir: TempDir) {
        let mut corpus = corpus_of(
            &dir,
            &["x y z p q r", "p q r", "p q r", "m n o", "m n o"],
        );
        corpus.run(0);

        assert_eq!(corpus.unique_count(0), 3);
        assert_eq!(corpus.unique_count(1), 0);
        let unique = CompareFlags { unique: true, ignore_template: false };
        assert_eq!(corpus.count_matches(1, 2, CompareFlags::ALL), 1);
        assert_eq!(corpus.count_matches(1, 2, unique), 0);
        assert_eq!(corpus.count_matches(3, 4, unique), 1);
        assert_eq!(corpus.count_matches(0, 3, CompareFlags::ALL), 0);
    }

    #[rstest]
    fn template_material_is_excluded_and_engaged(dir: TempDir) {
        let mut corpus = Corpus::new();
        let template = write(dir.path(), "template/brief.txt", "write a short essay");
        let a = write(dir.path(), "a.txt", "write a short essay about cats and dogs");
        let b = write(dir.path(), "b.txt", "write a short essay about cats and mice");

        corpus.add_path(&template, ImportMode::Template, &WalkOptions::default());
        corpus.add_path(&a, ImportMode::Individual, &WalkOptions::default());
        corpus.add_path(&b, ImportMode::Individual, &WalkOptions::default());
        corpus.run(0);

        assert!(corpus.has_template_material());
        assert!(corpus.is_template_material(0));
        assert_eq!(corpus.report_pairs(), vec![(0, 1), (0, 2), (1, 2)]);

        // "write a short" and "a short essay" come from the template.
        let ignore = CompareFlags { unique: false, ignore_template: true };
        assert_eq!(corpus.count_matches(1, 2, CompareFlags::ALL), 5);
        assert_eq!(corpus.count_matches(1, 2, ignore), 3);
        assert_eq!(corpus.engagement_count(1), 2);
        assert_eq!(corpus.engagement_count(2), 2);
        assert_eq!(corpus.engagement_count(0), 0);
    }

    #[rstest]
    fn grouped_directories_are_never_compared_internally(dir: TempDir) {
        write(dir.path(), "alice/one.txt", "the cat sat on the mat");
        write(dir.path(), "alice/two.txt", "the cat sat on the mat");
        write(dir.path(), "bob/main.txt", "a cat sat on the mat");

        let mut corpus = Corpus::new();
        let opts = WalkOptions { no_ignore: true, depth: None };
        for student in ["alice", "bob"] {
            let report = corpus.add_path(&dir.path().join(student), ImportMode::Grouped, &opts);
            assert!(report.walk_errors.is_none());
        }
        corpus.run(0);

        assert!(corpus.is_grouped());
        assert_eq!(corpus.group_size(), 2);
        assert_eq!(corpus.group_name(0), "alice");
        assert_eq!(corpus.group_name(1), "bob");
        assert_eq!(corpus.report_pairs(), vec![(0, 2), (1, 2)]);
        assert_eq!(corpus.number_of_pairs(), 2);
        for (i, j) in corpus.report_pairs() {
            assert_ne!(corpus.document(i).group_id(), corpus.document(j).group_id());
        }
        // Alice's "the cat sat" is shared by her own two files only.
        assert_eq!(corpus.unique_count(0), 0);
    }

    #[rstest]
    fn individual_directory_import_gives_each_file_a_group(dir: TempDir) {
        write(dir.path(), "sub/a.txt", "a");
        write(dir.path(), "sub/b.txt", "b");
        let mut corpus = Corpus::new();
        let report = corpus.add_path(&dir.path().join("sub"), ImportMode::Individual, &WalkOptions::default());

        assert_eq!(report.added, 2);
        assert!(!corpus.is_grouped());
        assert_ne!(corpus.document(0).group_id(), corpus.document(1).group_id());
    }

    #[rstest]
    fn unopenable_documents_become_problems(dir: TempDir) {
        let mut corpus = corpus_of(&dir, &["one two three", "gone soon now", "one two three"]);
        std::fs::remove_file(corpus.document(1).path()).unwrap();

        let summary = corpus.run(0);

        assert_eq!(summary.read, 2);
        assert_eq!(summary.problems.len(), 1);
        assert!(matches!(summary.problems[0], CorpusError::Open { .. }));
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.count_matches(0, 1, CompareFlags::ALL), 1);
    }

    #[rstest]
    fn cancellation_stops_between_documents(dir: TempDir) {
        let mut corpus = corpus_of(&dir, &["a b c", "a b c", "a b c"]);
        let summary = corpus.run_until(0, |i| i < 1);

        assert!(summary.cancelled);
        assert_eq!(summary.read, 1);
        assert_eq!(summary.next, 1);
        assert_eq!(corpus.count_trigrams(1), 0);
    }

    #[rstest]
    #[case::from_start(0)]
    #[case::from_next(1)]
    fn cancelled_pass_can_be_rerun(dir: TempDir, #[case] restart: usize) {
        let mut corpus = corpus_of(&dir, &["one two three four", "two three four five six"]);
        let summary = corpus.run_until(0, |i| i < 1);
        assert_eq!(summary.next, 1);

        let summary = corpus.run(restart);
        assert!(!summary.cancelled);
        assert_eq!(summary.next, 2);
        assert_eq!(corpus.count_trigrams(0), 2);
        assert_eq!(corpus.count_trigrams(1), 3);
        assert_eq!(corpus.total_trigram_count(), 4);
        assert_eq!(corpus.count_matches(0, 1, CompareFlags::ALL), 1);
        assert!((corpus.resemblance(0, 1, CompareFlags::ALL) - 0.25).abs() < 1e-12);
    }

    #[rstest]
    fn rereading_a_template_keeps_its_flags(dir: TempDir) {
        let mut corpus = Corpus::new();
        let brief = write(dir.path(), "brief.txt", "answer every question");
        let essay = write(dir.path(), "essay.txt", "answer every question now");
        assert!(corpus.add_document(brief, TEMPLATE_GROUP));
        let group = corpus.new_group_id();
        assert!(corpus.add_document(essay, group));
        corpus.run(0);
        corpus.run(0);

        assert_eq!(corpus.count_trigrams(0), 1);
        assert_eq!(corpus.count_trigrams(1), 2);
        assert_eq!(corpus.engagement_count(1), 1);
    }

    #[rstest]
    fn documents_added_after_a_run_match_nothing_until_rerun(dir: TempDir) {
        let mut corpus = corpus_of(&dir, &["a b c d", "x y z w", "x y z q"]);
        corpus.run(0);
        let late = write(dir.path(), "late.txt", "a b c");
        let group = corpus.new_group_id();
        assert!(corpus.add_document(late, group));

        assert_eq!(corpus.count_matches(1, 2, CompareFlags::ALL), 1);
        assert_eq!(corpus.count_matches(0, 3, CompareFlags::ALL), 0);

        corpus.run(3);
        assert_eq!(corpus.count_matches(1, 2, CompareFlags::ALL), 1);
        assert_eq!(corpus.count_matches(0, 3, CompareFlags::ALL), 1);
    }

    #[rstest]
    fn definition_file_groups_lines(dir: TempDir) {
        let a = write(dir.path(), "a.txt", "a");
        let b = write(dir.path(), "b.txt", "b");
        let c = write(dir.path(), "c.txt", "c");
        let defs = format!(
            "  {}\nstart group\n{}\n\n{}\nnot/a/file.txt\nEND GROUP\n",
            a.display(),
            b.display(),
            c.display()
        );
        let def_path = write(dir.path(), "defs.lst", &defs);

        let mut corpus = Corpus::new();
        assert_eq!(corpus.add_documents_from_definition_file(&def_path).unwrap(), 3);
        assert_ne!(corpus.document(0).group_id(), corpus.document(1).group_id());
        assert_eq!(corpus.document(1).group_id(), corpus.document(2).group_id());
    }

    #[rstest]
    fn add_document_skips_unreadable_paths(dir: TempDir) {
        let mut corpus = Corpus::new();
        assert!(!corpus.add_document(dir.path().join("missing.txt"), 1));
        assert!(!corpus.add_document(dir.path(), 1));
        assert!(corpus.is_empty());
    }

    #[rstest]
    fn remove_document_keeps_metrics_consistent(dir: TempDir) {
        let mut corpus = corpus_of(&dir, &["p q r s", "x y z", "p q r s"]);
        corpus.run(0);
        let removed = corpus.remove_document(1);

        assert_eq!(removed.name(), "doc1.txt");
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.count_matches(0, 1, CompareFlags::ALL), 2);
        assert_eq!(corpus.total_trigram_count(), 2);
    }

    #[rstest]
    fn comparators_order_descending(dir: TempDir) {
        let mut corpus = corpus_of(&dir, &["a b c d", "a b c x", "q r s t", "a b c d"]);
        corpus.run(0);

        let mut pairs = corpus.report_pairs();
        pairs.sort_by(compare::by_resemblance(&corpus, CompareFlags::ALL));
        assert_eq!(pairs[0], (0, 3));

        let mut docs: Vec<usize> = (0..corpus.group_size()).collect();
        docs.sort_by(compare::by_unique_count(&corpus));
        assert_eq!(docs[0], 2);

        docs.sort_by(compare::by_name(&corpus));
        assert_eq!(docs, [0, 1, 2, 3]);
    }

    #[rstest]
    fn clear_and_reset(dir: TempDir) {
        let mut corpus = corpus_of(&dir, &["a b c", "a b c"]);
        corpus.run(0);
        corpus.reset_reading();
        assert_eq!(corpus.total_trigram_count(), 0);
        assert!(corpus.interner().is_empty());
        assert_eq!(corpus.len(), 2);

        corpus.clear();
        assert!(corpus.is_empty());
        assert_eq!(corpus.new_group_id(), 1);
    }
}
