//! End-to-end checks of the public API: import a directory tree, read it,
//! persist it, resume with new documents and render reports.

use std::path::Path;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use collude::corpus::{CompareFlags, Corpus, ImportMode};
use collude::extract::{self, CommandConverter, ExtractionPolicy};
use collude::output::{self, OutputOptions};
use collude::report::{SpanClassifier, SpanKind, xml};
use collude::walk::WalkOptions;

const ESSAY: &str = "The quick brown fox jumps over the lazy dog near the river bank.";
const COPIED: &str = "Everyone knows the quick brown fox jumps over the lazy dog eventually.";
const OTHER: &str = "Completely different words appear in this unrelated piece of writing.";

fn write(dir: &Path, rel: &str, text: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, text).unwrap();
}

/// Three students, one of whom submitted two files.
#[fixture]
fn submissions() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "alice/essay.txt", ESSAY);
    write(dir.path(), "alice/notes.txt", "quick brown fox jumps");
    write(dir.path(), "bob/essay.txt", COPIED);
    write(dir.path(), "carol/essay.txt", OTHER);
    dir
}

fn grouped(root: &Path) -> Corpus {
    let mut corpus = Corpus::new();
    for student in ["alice", "bob", "carol"] {
        let report = corpus.add_path(&root.join(student), ImportMode::Grouped, &WalkOptions::default());
        assert!(report.walk_errors.is_none());
    }
    let summary = corpus.run(0);
    assert!(summary.problems.is_empty());
    corpus
}

fn index_of(corpus: &Corpus, suffix: &str) -> usize {
    corpus
        .documents()
        .iter()
        .position(|d| d.path().ends_with(suffix))
        .unwrap()
}

#[rstest]
fn grouped_import_compares_across_groups_only(submissions: TempDir) {
    let corpus = grouped(submissions.path());

    assert_eq!(corpus.len(), 4);
    assert!(corpus.is_grouped());
    assert_eq!(corpus.group_size(), 3);
    assert_eq!(corpus.group_name(0), "alice");
    // alice's two files are never paired with each other.
    assert_eq!(corpus.number_of_pairs(), 5);

    let alice = index_of(&corpus, "alice/essay.txt");
    let bob = index_of(&corpus, "bob/essay.txt");
    let carol = index_of(&corpus, "carol/essay.txt");
    let copied = corpus.resemblance(alice, bob, CompareFlags::ALL);
    assert!(copied > 0.3, "{copied}");
    assert!(copied > corpus.resemblance(alice, carol, CompareFlags::ALL));
    assert_eq!(corpus.count_matches(bob, carol, CompareFlags::ALL), 0);
}

#[rstest]
fn copied_submissions_with_one_file_name_stay_distinct(submissions: TempDir) {
    let root = submissions.path();
    let mut corpus = Corpus::new();
    for student in ["alice", "bob", "carol"] {
        corpus.add_path(&root.join(student), ImportMode::Grouped, &WalkOptions::default());
    }
    let policy = ExtractionPolicy {
        copy_all: true,
        extract_folder: root.join("extracted"),
        ..ExtractionPolicy::default()
    };
    let report = extract::extract_documents(&mut corpus, 0, &policy, &CommandConverter).unwrap();
    assert_eq!(report.copied, 4);
    corpus.run(0);

    let plain = grouped(root);
    let bob = index_of(&plain, "bob/essay.txt");
    let carol = index_of(&plain, "carol/essay.txt");
    assert_eq!(corpus.count_matches(bob, carol, CompareFlags::ALL), 0);
    for (i, j) in plain.report_pairs() {
        assert_eq!(
            corpus.count_matches(i, j, CompareFlags::ALL),
            plain.count_matches(i, j, CompareFlags::ALL),
            "pair ({i}, {j})"
        );
    }
}

#[rstest]
fn unique_matches_exclude_trigrams_held_elsewhere(submissions: TempDir) {
    let corpus = grouped(submissions.path());
    let alice = index_of(&corpus, "alice/essay.txt");
    let bob = index_of(&corpus, "bob/essay.txt");

    let unique = CompareFlags {
        unique: true,
        ignore_template: false,
    };
    // "quick brown fox" and "brown fox jumps" also appear in alice's notes.
    assert_eq!(
        corpus.count_matches(alice, bob, CompareFlags::ALL) - corpus.count_matches(alice, bob, unique),
        2
    );
    let shared = corpus.collect_matching_trigrams(alice, bob, unique).unwrap();
    assert!(shared.contains(&"over the lazy".to_string()), "{shared:?}");
    assert!(!shared.contains(&"quick brown fox".to_string()), "{shared:?}");
}

#[rstest]
fn saved_corpus_resumes_with_new_documents(submissions: TempDir) {
    let root = submissions.path();
    let store = root.join("corpus.dat");

    let mut first = Corpus::new();
    first.add_path(&root.join("alice/essay.txt"), ImportMode::Individual, &WalkOptions::default());
    first.add_path(&root.join("carol/essay.txt"), ImportMode::Individual, &WalkOptions::default());
    first.run(0);
    first.save_to_path(&store).unwrap();

    let mut resumed = Corpus::load_from_path(&store).unwrap();
    assert_eq!(resumed.len(), 2);
    let first_new = resumed.len();
    resumed.add_path(&root.join("bob/essay.txt"), ImportMode::Individual, &WalkOptions::default());
    let summary = resumed.run(first_new);
    assert_eq!(summary.read, 1);

    let mut fresh = Corpus::new();
    for rel in ["alice/essay.txt", "carol/essay.txt", "bob/essay.txt"] {
        fresh.add_path(&root.join(rel), ImportMode::Individual, &WalkOptions::default());
    }
    fresh.run(0);

    assert_eq!(resumed.total_trigram_count(), fresh.total_trigram_count());
    for (i, j) in fresh.report_pairs() {
        assert_eq!(
            resumed.count_matches(i, j, CompareFlags::ALL),
            fresh.count_matches(i, j, CompareFlags::ALL),
            "pair ({i}, {j})"
        );
        assert_eq!(resumed.count_trigrams(i), fresh.count_trigrams(i));
    }
}

#[rstest]
fn template_material_is_discounted(submissions: TempDir) {
    let root = submissions.path();
    write(root, "brief.txt", "the quick brown fox jumps over the lazy dog");

    let mut corpus = Corpus::new();
    let opts = WalkOptions::default();
    corpus.add_path(&root.join("brief.txt"), ImportMode::Template, &opts);
    corpus.add_path(&root.join("alice/essay.txt"), ImportMode::Individual, &opts);
    corpus.add_path(&root.join("bob/essay.txt"), ImportMode::Individual, &opts);
    corpus.run(0);

    assert!(corpus.has_template_material());
    assert!(corpus.is_template_material(0));
    let flags = CompareFlags {
        unique: false,
        ignore_template: true,
    };
    assert_eq!(corpus.count_matches(1, 2, flags), 0);
    assert_eq!(corpus.engagement_count(1), 7);
    assert_eq!(corpus.engagement_count(2), 7);

    let spans = SpanClassifier::new(&corpus, CompareFlags::ALL)
        .classify_document(1, 2)
        .unwrap()
        .spans;
    assert!(spans.iter().any(|s| s.kind == SpanKind::CopiedTemplate));
}

#[rstest]
fn xml_report_for_a_pair(submissions: TempDir) {
    let root = submissions.path();
    let mut corpus = Corpus::new();
    corpus.add_path(&root.join("alice/essay.txt"), ImportMode::Individual, &WalkOptions::default());
    corpus.add_path(&root.join("bob/essay.txt"), ImportMode::Individual, &WalkOptions::default());
    corpus.run(0);

    let target = root.join("report.xml");
    xml::write_xml_report(
        std::fs::File::create(&target).unwrap(),
        &corpus,
        0,
        1,
        CompareFlags::ALL,
    )
    .unwrap();
    let report = std::fs::read_to_string(&target).unwrap();

    assert!(report.starts_with("<?xml"));
    assert!(report.contains("<common-trigrams>7</common-trigrams>"), "{report}");
    assert!(report.contains("jumps over the lazy dog"), "{report}");
    assert_eq!(report.matches("<block text=\"copied-unique\">").count(), 2, "{report}");
}

#[rstest]
fn similarity_table_lists_every_cross_group_pair(submissions: TempDir) {
    let corpus = grouped(submissions.path());
    let opts = OutputOptions {
        json: false,
        color: false,
        sort: true,
    };
    let mut out = Vec::new();
    output::write_similarity_table(&mut out, &corpus, CompareFlags::ALL, &opts).unwrap();
    let table = String::from_utf8(out).unwrap();

    assert!(table.starts_with("Number of documents: 4\n"), "{table}");
    let rows: Vec<&str> = table.lines().skip(2).collect();
    assert_eq!(rows.len(), 5, "{table}");
    assert!(rows[0].contains("alice/essay.txt") && rows[0].contains("bob/essay.txt"), "{table}");
}
