//! Similarity tables, trigram lists, rankings and their JSON forms.

mod format;

pub use format::{format_number, format_score};
use format::{bold, dim, format_path};

use std::io::Write;

use serde::Serialize;

use crate::corpus::compare::{by_engagement_count, by_name, by_resemblance, by_unique_count};
use crate::corpus::{CompareFlags, Corpus, CorpusError};

/// Rendering configuration derived from CLI flags.
pub struct OutputOptions {
    /// Emit JSON instead of human-readable text.
    pub json: bool,
    /// When `true`, emit ANSI color codes.
    pub color: bool,
    /// Order rows by score; otherwise keep corpus (or name) order.
    pub sort: bool,
}

impl OutputOptions {
    /// Create a new output configuration from CLI flags.
    #[must_use]
    pub fn new(json: bool, sort: bool, no_color: bool) -> Self {
        let color = !no_color && std::env::var("NO_COLOR").is_err() && {
            use std::io::IsTerminal;
            std::io::stdout().is_terminal()
        };
        Self { json, color, sort }
    }
}

/// Which per-group count a ranking lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ranking {
    /// Trigrams found in exactly one group.
    Uniqueness,
    /// Template trigrams reused by each group.
    Engagement,
}

impl Ranking {
    fn label(self) -> &'static str {
        match self {
            Self::Uniqueness => "uniqueness",
            Self::Engagement => "engagement",
        }
    }

    fn count(self, corpus: &Corpus, index: usize) -> usize {
        match self {
            Self::Uniqueness => corpus.unique_count(index),
            Self::Engagement => corpus.engagement_count(index),
        }
    }
}

#[derive(Serialize)]
struct PairRow {
    a: String,
    b: String,
    matches: usize,
    trigrams_a: usize,
    trigrams_b: usize,
    resemblance: f64,
}

#[derive(Serialize)]
struct RankRow<'a> {
    name: &'a str,
    count: usize,
}

fn write_json(out: &mut dyn Write, value: &serde_json::Value) -> Result<(), CorpusError> {
    let json_str =
        serde_json::to_string_pretty(value).map_err(|e| std::io::Error::other(e.to_string()))?;
    writeln!(out, "{json_str}")?;
    Ok(())
}

// ─── Similarity table ────────────────────────────────────────────────────────

fn pair_rows(corpus: &Corpus, flags: CompareFlags, sort: bool) -> Vec<PairRow> {
    let mut pairs = corpus.report_pairs();
    if sort {
        pairs.sort_by(by_resemblance(corpus, flags));
    }
    pairs
        .into_iter()
        .map(|(i, j)| PairRow {
            a: format_path(corpus.document(i).original_path()),
            b: format_path(corpus.document(j).original_path()),
            matches: corpus.count_matches(i, j, flags),
            trigrams_a: corpus.count_trigrams(i),
            trigrams_b: corpus.count_trigrams(j),
            resemblance: corpus.resemblance(i, j, flags),
        })
        .collect()
}

/// Write the pairwise similarity table.
///
/// One row per pair of documents from different groups:
/// `a ; b ; matches ; trigrams(a) ; trigrams(b) ; resemblance`.
pub fn write_similarity_table(
    out: &mut dyn Write,
    corpus: &Corpus,
    flags: CompareFlags,
    opts: &OutputOptions,
) -> Result<(), CorpusError> {
    let rows = pair_rows(corpus, flags, opts.sort);

    if opts.json {
        return write_json(
            out,
            &serde_json::json!({
                "documents": corpus.len(),
                "distinct_trigrams": corpus.total_trigram_count(),
                "unique": flags.unique,
                "ignore_template": flags.ignore_template,
                "pairs": rows,
            }),
        );
    }

    let heading = format!("Number of documents: {}", format_number(corpus.len()));
    writeln!(out, "{}", bold(&heading, opts.color))?;
    let heading = format!(
        "Number of distinct trigrams: {}",
        format_number(corpus.total_trigram_count())
    );
    writeln!(out, "{}", bold(&heading, opts.color))?;
    if flags.unique {
        writeln!(out, "Similarity measure removes trigrams common to other files")?;
    }
    if flags.ignore_template {
        writeln!(out, "Similarity measure ignores trigrams in template material")?;
    }
    let sep = dim(" ; ", opts.color);
    for row in &rows {
        writeln!(
            out,
            "{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}",
            row.a,
            row.b,
            row.matches,
            row.trigrams_a,
            row.trigrams_b,
            format_score(row.resemblance)
        )?;
    }
    Ok(())
}

// ─── All comparisons ─────────────────────────────────────────────────────────

/// Write the full resemblance matrix as CSV, `1.0` on the diagonal.
pub fn write_all_comparisons(
    out: &mut dyn Write,
    corpus: &Corpus,
    flags: CompareFlags,
    opts: &OutputOptions,
) -> Result<(), CorpusError> {
    let n = corpus.len();
    let cell = |i: usize, j: usize| if i == j { 1.0 } else { corpus.resemblance(i, j, flags) };

    if opts.json {
        let names: Vec<String> = corpus
            .documents()
            .iter()
            .map(|doc| format_path(doc.original_path()))
            .collect();
        let matrix: Vec<Vec<f64>> = (0..n).map(|i| (0..n).map(|j| cell(i, j)).collect()).collect();
        return write_json(out, &serde_json::json!({ "documents": names, "resemblance": matrix }));
    }

    for doc in corpus.documents() {
        write!(out, ", {}", format_path(doc.original_path()))?;
    }
    writeln!(out)?;
    for i in 0..n {
        write!(out, "{}", format_path(corpus.document(i).original_path()))?;
        for j in 0..n {
            if i == j {
                write!(out, ", 1.0")?;
            } else {
                write!(out, ", {}", format_score(cell(i, j)))?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

// ─── Trigram list ────────────────────────────────────────────────────────────

/// Write every indexed trigram with the documents that contain it.
pub fn write_trigram_list(
    out: &mut dyn Write,
    corpus: &Corpus,
    opts: &OutputOptions,
) -> Result<(), CorpusError> {
    if opts.json {
        let entries = corpus
            .index()
            .iter()
            .map(|(key, postings)| {
                Ok(serde_json::json!({
                    "trigram": corpus.trigram_string(key)?,
                    "documents": postings.docs(),
                    "template": postings.is_template(),
                }))
            })
            .collect::<Result<Vec<_>, CorpusError>>()?;
        return write_json(out, &serde_json::Value::Array(entries));
    }

    for (key, postings) in corpus.index() {
        write!(out, "{}   FILES:[ ", corpus.trigram_string(key)?)?;
        for doc in postings.docs() {
            write!(out, "{doc} ")?;
        }
        writeln!(out, "]")?;
    }
    Ok(())
}

// ─── Rankings ────────────────────────────────────────────────────────────────

/// Write the uniqueness or engagement ranking with its mean.
///
/// Entries are groups when the corpus is grouped, documents otherwise.
/// Template material is left out of the engagement ranking.
pub fn write_ranking(
    out: &mut dyn Write,
    corpus: &Corpus,
    ranking: Ranking,
    opts: &OutputOptions,
) -> Result<(), CorpusError> {
    let mut indices: Vec<usize> = (0..corpus.group_size())
        .filter(|&i| {
            ranking == Ranking::Uniqueness || corpus.is_grouped() || !corpus.is_template_material(i)
        })
        .collect();
    if opts.sort {
        match ranking {
            Ranking::Uniqueness => indices.sort_by(by_unique_count(corpus)),
            Ranking::Engagement => indices.sort_by(by_engagement_count(corpus)),
        }
    } else {
        indices.sort_by(by_name(corpus));
    }

    let rows: Vec<RankRow<'_>> = indices
        .iter()
        .map(|&i| RankRow {
            name: corpus.group_name(i),
            count: ranking.count(corpus, i),
        })
        .collect();
    let mean = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.count).sum::<usize>() as f64 / rows.len() as f64
    };

    if opts.json {
        return write_json(
            out,
            &serde_json::json!({
                "ranking": ranking.label(),
                "entries": rows,
                "mean": mean,
            }),
        );
    }

    let name_w = rows.iter().map(|r| r.name.chars().count()).max().unwrap_or(0);
    let count_w = rows
        .iter()
        .map(|r| format_number(r.count).len())
        .max()
        .unwrap_or(0);
    for row in &rows {
        writeln!(
            out,
            "{:<name_w$}  {:>count_w$}",
            row.name,
            format_number(row.count)
        )?;
    }
    writeln!(out, "{}", dim(&format!("Mean: {mean:.2}"), opts.color))?;
    Ok(())
}
