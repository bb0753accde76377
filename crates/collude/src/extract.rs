//! Preparing documents for reading: converting word-processor and PDF
//! sources to plain text and copying files into an extraction folder.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::corpus::Corpus;
use crate::tokenize::Dialect;

/// Broad type of a document, judged by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    /// Plain text (`.txt`).
    Text,
    /// Source code in a known dialect.
    Code(Dialect),
    /// A PDF file.
    Pdf,
    /// A word-processor file (`.abw`, `.doc`, `.docx`, `.rtf`).
    WordProcessor,
    /// Anything else.
    Unknown,
}

impl SourceFormat {
    /// Classify `path` by its final extension, ignoring case.
    #[must_use]
    pub fn of(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Self::Unknown;
        };
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Self::Text,
            "pdf" => Self::Pdf,
            "abw" | "doc" | "docx" | "rtf" => Self::WordProcessor,
            other => Dialect::from_extension(other).map_or(Self::Unknown, Self::Code),
        }
    }

    /// `true` unless the file can be tokenized as it stands.
    #[must_use]
    pub fn needs_conversion(self) -> bool {
        matches!(self, Self::Pdf | Self::WordProcessor | Self::Unknown)
    }
}

/// Which external conversion to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conversion {
    /// Word-processor document to text.
    WordProcessor,
    /// PDF to text.
    Pdf,
}

/// Error type for document conversion.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConversionError {
    /// The converter could not be run or reported failure.
    #[error("converting {} failed: {reason}", path.display())]
    #[diagnostic(
        code(collude::extract::converter_failed),
        help("install abiword and pdftotext, or pass --ignore-unknown")
    )]
    ConverterFailed {
        /// Source that was being converted.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The conversion step left no text file behind.
    #[error("no text produced for {} (expected {})", path.display(), expected.display())]
    #[diagnostic(code(collude::extract::no_output))]
    NoOutput {
        /// Source that was being converted.
        path: PathBuf,
        /// Where the text file should have been.
        expected: PathBuf,
    },

    /// The extraction folder could not be created.
    #[error("cannot create extraction folder {}", path.display())]
    #[diagnostic(code(collude::extract::folder))]
    ExtractFolder {
        /// Folder that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Turns a non-text source into a plain-text file.
pub trait Converter {
    /// Convert `source` into a text file at `target`.
    fn convert(&self, kind: Conversion, source: &Path, target: &Path) -> Result<(), ConversionError>;
}

/// Converter that shells out to `abiword` and `pdftotext`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommandConverter;

impl Converter for CommandConverter {
    fn convert(&self, kind: Conversion, source: &Path, target: &Path) -> Result<(), ConversionError> {
        let mut command = match kind {
            Conversion::WordProcessor => {
                let mut c = Command::new("abiword");
                c.arg("--to=txt").arg(source).arg("-o").arg(target);
                c
            }
            Conversion::Pdf => {
                let mut c = Command::new("pdftotext");
                c.args(["-layout", "-enc", "ASCII7", "-nopgbrk"])
                    .arg(source)
                    .arg(target);
                c
            }
        };
        debug!(?command, "running converter");
        let failed = |reason: String| ConversionError::ConverterFailed {
            path: source.to_path_buf(),
            reason,
        };
        let status = command.status().map_err(|e| failed(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(failed(format!("converter exited with {status}")))
        }
    }
}

/// How documents are prepared before reading.
#[derive(Clone, Debug, Default)]
pub struct ExtractionPolicy {
    /// Copy text and code files into the extraction folder too.
    pub copy_all: bool,
    /// Run the word-processor converter on every file, not just known types.
    pub convert_all: bool,
    /// Drop files of unrecognised type instead of treating them as text.
    pub ignore_unknown: bool,
    /// Folder receiving converted and copied files.
    pub extract_folder: PathBuf,
}

/// Outcome of [`extract_documents`].
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Documents now pointing at converted text.
    pub converted: usize,
    /// Documents copied unchanged into the folder.
    pub copied: usize,
    /// Documents whose conversion or copy failed; removed from the corpus.
    pub problems: Vec<ConversionError>,
    /// Original paths of unknown-type documents that were dropped.
    pub ignored: Vec<PathBuf>,
}

/// Convert or copy documents `first..` according to `policy`.
///
/// Failed and ignored documents are removed from the corpus; the others are
/// repointed at their text in the extraction folder where one was made.
/// Output files are named `<index>_<file name>`, so sources sharing a file
/// name never overwrite each other. Documents before `first` are left alone.
pub fn extract_documents(
    corpus: &mut Corpus,
    first: usize,
    policy: &ExtractionPolicy,
    converter: &dyn Converter,
) -> Result<ExtractionReport, ConversionError> {
    std::fs::create_dir_all(&policy.extract_folder).map_err(|source| {
        ConversionError::ExtractFolder {
            path: policy.extract_folder.clone(),
            source,
        }
    })?;

    let mut report = ExtractionReport::default();
    let mut dropped = Vec::new();

    for i in first..corpus.len() {
        let source = corpus.document(i).path().to_path_buf();
        match prepare(i, &source, policy, converter) {
            Ok(Prepared::Unchanged) => {}
            Ok(Prepared::Converted(target)) => {
                corpus.document_mut(i).set_path(target);
                report.converted += 1;
            }
            Ok(Prepared::Copied(target)) => {
                corpus.document_mut(i).set_path(target);
                report.copied += 1;
            }
            Ok(Prepared::Ignored) => {
                let original = corpus.document(i).original_path().to_path_buf();
                warn!(path = %original.display(), "ignoring file of unknown type");
                report.ignored.push(original);
                dropped.push(i);
            }
            Err(e) => {
                warn!(error = %e, "problem file");
                report.problems.push(e);
                dropped.push(i);
            }
        }
    }

    for &i in dropped.iter().rev() {
        corpus.remove_document(i);
    }
    Ok(report)
}

enum Prepared {
    Unchanged,
    Converted(PathBuf),
    Copied(PathBuf),
    Ignored,
}

fn prepare(
    index: usize,
    source: &Path,
    policy: &ExtractionPolicy,
    converter: &dyn Converter,
) -> Result<Prepared, ConversionError> {
    let format = SourceFormat::of(source);
    let unknown = format == SourceFormat::Unknown;

    let conversion = if (policy.convert_all || format == SourceFormat::WordProcessor)
        && !(unknown && policy.ignore_unknown)
    {
        Some(Conversion::WordProcessor)
    } else if format == SourceFormat::Pdf {
        Some(Conversion::Pdf)
    } else {
        None
    };

    if let Some(kind) = conversion {
        let target = target_path(index, source, &policy.extract_folder, Some("txt"));
        converter.convert(kind, source, &target)?;
        return ensure_exists(source, target).map(Prepared::Converted);
    }

    if policy.copy_all && (!unknown || !policy.ignore_unknown) {
        let target = target_path(index, source, &policy.extract_folder, None);
        std::fs::copy(source, &target).map_err(|e| ConversionError::ConverterFailed {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
        return ensure_exists(source, target).map(Prepared::Copied);
    }

    if unknown && policy.ignore_unknown {
        return Ok(Prepared::Ignored);
    }
    ensure_exists(source, source.to_path_buf()).map(|_| Prepared::Unchanged)
}

fn target_path(index: usize, source: &Path, folder: &Path, extension: Option<&str>) -> PathBuf {
    let name = source.file_name().unwrap_or(source.as_os_str());
    let mut target = folder.join(format!("{index}_{}", name.to_string_lossy()));
    if let Some(ext) = extension {
        target.set_extension(ext);
    }
    target
}

fn ensure_exists(source: &Path, target: PathBuf) -> Result<PathBuf, ConversionError> {
    if target.is_file() {
        Ok(target)
    } else {
        Err(ConversionError::NoOutput {
            path: source.to_path_buf(),
            expected: target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use rstest::rstest;
    use tempfile::TempDir;

    /// Writes fixed text for every conversion unless told to fail.
    #[derive(Default)]
    struct FakeConverter {
        fail: bool,
        calls: RefCell<Vec<Conversion>>,
    }

    impl Converter for FakeConverter {
        fn convert(&self, kind: Conversion, source: &Path, target: &Path) -> Result<(), ConversionError> {
            self.calls.borrow_mut().push(kind);
            if self.fail {
                return Err(ConversionError::ConverterFailed {
                    path: source.to_path_buf(),
                    reason: "boom".into(),
                });
            }
            std::fs::write(target, "converted words here").unwrap();
            Ok(())
        }
    }

    fn setup(files: &[&str]) -> (TempDir, Corpus, ExtractionPolicy) {
        let dir = tempfile::tempdir().unwrap();
        let mut corpus = Corpus::new();
        for name in files {
            let path = dir.path().join("in").join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, "some words").unwrap();
            let group = corpus.new_group_id();
            assert!(corpus.add_document(path, group));
        }
        let policy = ExtractionPolicy {
            extract_folder: dir.path().join("out"),
            ..ExtractionPolicy::default()
        };
        (dir, corpus, policy)
    }

    #[rstest]
    #[case("essay.TXT", SourceFormat::Text)]
    #[case("main.py", SourceFormat::Code(Dialect::Python))]
    #[case("paper.pdf", SourceFormat::Pdf)]
    #[case("report.docx", SourceFormat::WordProcessor)]
    #[case("notes.RTF", SourceFormat::WordProcessor)]
    #[case("data.bin", SourceFormat::Unknown)]
    #[case("README", SourceFormat::Unknown)]
    fn classifies_by_extension(#[case] path: &str, #[case] expected: SourceFormat) {
        assert_eq!(SourceFormat::of(Path::new(path)), expected);
    }

    #[test]
    fn converts_pdf_and_word_processor_files() {
        let (_dir, mut corpus, policy) = setup(&["a.pdf", "b.doc", "c.txt"]);
        let converter = FakeConverter::default();

        let report = extract_documents(&mut corpus, 0, &policy, &converter).unwrap();

        assert_eq!(report.converted, 2);
        assert_eq!(*converter.calls.borrow(), [Conversion::Pdf, Conversion::WordProcessor]);
        assert_eq!(corpus.document(0).path(), policy.extract_folder.join("0_a.txt"));
        assert!(corpus.document(0).original_path().ends_with("a.pdf"));
        assert!(corpus.document(2).path().ends_with("in/c.txt"));
        assert!(!corpus.may_need_conversions());
    }

    #[test]
    fn failed_conversions_are_problems() {
        let (_dir, mut corpus, policy) = setup(&["a.pdf", "c.txt"]);
        let converter = FakeConverter { fail: true, ..FakeConverter::default() };

        let report = extract_documents(&mut corpus, 0, &policy, &converter).unwrap();

        assert_eq!(report.problems.len(), 1);
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.document(0).name(), "c.txt");
    }

    #[test]
    fn unknown_files_are_ignored_on_request() {
        let (_dir, mut corpus, mut policy) = setup(&["blob.bin", "c.txt"]);
        policy.ignore_unknown = true;
        policy.convert_all = true;
        let converter = FakeConverter::default();

        let report = extract_documents(&mut corpus, 0, &policy, &converter).unwrap();

        assert_eq!(report.ignored.len(), 1);
        assert!(report.ignored[0].ends_with("blob.bin"));
        assert_eq!(corpus.len(), 1);
        assert_eq!(*converter.calls.borrow(), [Conversion::WordProcessor]);
    }

    #[test]
    fn copy_all_moves_text_into_folder() {
        let (_dir, mut corpus, mut policy) = setup(&["c.txt", "m.java"]);
        policy.copy_all = true;

        let report = extract_documents(&mut corpus, 0, &policy, &FakeConverter::default()).unwrap();

        assert_eq!(report.copied, 2);
        assert_eq!(corpus.document(1).path(), policy.extract_folder.join("1_m.java"));
        assert_eq!(corpus.document(1).dialect(), Dialect::Java);
    }

    #[test]
    fn same_file_names_get_separate_copies() {
        let (dir, mut corpus, mut policy) = setup(&["a/same.txt", "b/same.txt"]);
        std::fs::write(dir.path().join("in/b/same.txt"), "other words entirely").unwrap();
        policy.copy_all = true;

        let report = extract_documents(&mut corpus, 0, &policy, &FakeConverter::default()).unwrap();

        assert_eq!(report.copied, 2);
        let (first, second) = (corpus.document(0).path(), corpus.document(1).path());
        assert_ne!(first, second);
        assert_eq!(std::fs::read_to_string(first).unwrap(), "some words");
        assert_eq!(std::fs::read_to_string(second).unwrap(), "other words entirely");
    }

    #[rstest]
    #[case::converting(false, 2)]
    #[case::failing(true, 1)]
    fn documents_before_first_are_left_alone(#[case] fail: bool, #[case] remaining: usize) {
        let (_dir, mut corpus, policy) = setup(&["a.pdf", "b.pdf"]);
        let converter = FakeConverter { fail, ..FakeConverter::default() };

        let report = extract_documents(&mut corpus, 1, &policy, &converter).unwrap();

        assert_eq!(converter.calls.borrow().len(), 1);
        assert_eq!(report.problems.len(), usize::from(fail));
        assert_eq!(corpus.len(), remaining);
        assert!(corpus.document(0).path().ends_with("in/a.pdf"));
        if !fail {
            assert_eq!(corpus.document(1).path(), policy.extract_folder.join("1_b.txt"));
        }
    }
}
