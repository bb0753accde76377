//! collude: find copied passages across documents and source code.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use collude::corpus::{CompareFlags, Corpus, CorpusError, ImportMode};
use collude::extract::{self, CommandConverter, ExtractionPolicy};
use collude::output::{self, OutputOptions, Ranking};
use collude::report::{SpanClassifier, console, xml};
use collude::walk::WalkOptions;

// ─── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name = "collude",
    about = "Find copied passages across documents and source code",
    version
)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Files or directories to compare.
    paths: Vec<PathBuf>,

    /// List every trigram with the documents containing it.
    #[arg(short = 'l', long)]
    list_trigrams: bool,

    /// Print the full resemblance matrix as CSV.
    #[arg(short = 'a', long)]
    all_comparisons: bool,

    /// Rank documents (or groups) by trigrams found nowhere else.
    #[arg(long)]
    uniqueness: bool,

    /// Rank documents (or groups) by template trigrams they reuse.
    #[arg(long)]
    engagement: bool,

    /// Write an XML report to OUT; PATHS must hold exactly two documents.
    #[arg(
        short = 'x',
        long,
        value_name = "OUT",
        conflicts_with_all = ["stored_data", "definition_file", "template", "show"]
    )]
    xml_report: Option<PathBuf>,

    /// Highlight the passages documents A and B share (corpus indices).
    #[arg(long, num_args = 2, value_names = ["A", "B"])]
    show: Option<Vec<usize>>,

    /// Only count trigrams shared by exactly the two compared documents.
    #[arg(short = 'r', long)]
    remove_common: bool,

    /// Do not count trigrams that also occur in template material.
    #[arg(long)]
    ignore_template: bool,

    /// Template material (repeatable): text every document may reuse.
    #[arg(short = 't', long, value_name = "PATH")]
    template: Vec<PathBuf>,

    /// Treat each directory in PATHS as one group of documents.
    #[arg(short = 'g', long)]
    group_dirs: bool,

    /// Read document paths from FILE (one per line, START/END GROUP blocks).
    #[arg(short = 'f', long, value_name = "FILE")]
    definition_file: Option<PathBuf>,

    /// Load the corpus from FILE if present, add PATHS, and save it back.
    #[arg(short = 'u', long, value_name = "FILE", env = "COLLUDE_STORED_DATA")]
    stored_data: Option<PathBuf>,

    /// Folder receiving converted and copied text.
    #[arg(long, value_name = "DIR", env = "COLLUDE_EXTRACT_DIR")]
    extract_dir: Option<PathBuf>,

    /// Run the word-processor converter on every file.
    #[arg(long)]
    convert_all: bool,

    /// Copy plain text and code into the extraction folder as well.
    #[arg(long)]
    copy_all: bool,

    /// Skip files of unrecognised type.
    #[arg(long)]
    ignore_unknown: bool,

    /// Include files ignored by .gitignore.
    #[arg(long)]
    no_ignore: bool,

    /// Limit directory depth.
    #[arg(long, value_name = "N")]
    depth: Option<usize>,

    /// List pairs in corpus order and rankings by name instead of by score.
    #[arg(long)]
    by_name: bool,

    /// Output JSON instead of text tables.
    #[arg(long)]
    json: bool,

    /// Disable ANSI colors.
    #[arg(long)]
    no_color: bool,

    /// Log more (repeat for debug output).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("COLLUDE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn document_count_problem(documents: usize, xml_report: bool) -> Option<&'static str> {
    if xml_report && documents != 2 {
        Some("--xml-report compares exactly two readable documents")
    } else if documents < 2 {
        Some("at least two readable documents are required")
    } else {
        None
    }
}

fn check_document_count(corpus: &Corpus, cli: &Cli) {
    if let Some(message) = document_count_problem(corpus.len(), cli.xml_report.is_some()) {
        usage_error(message);
    }
}

fn usage_error(message: &str) -> ! {
    eprintln!("error: {message}");
    std::process::exit(exitcode::USAGE);
}

fn corpus_error(err: CorpusError) -> ! {
    let code = match &err {
        CorpusError::Open { .. } => exitcode::NOINPUT,
        CorpusError::UnknownToken(_) | CorpusError::Malformed { .. } => exitcode::DATAERR,
        CorpusError::Io(_) => exitcode::IOERR,
    };
    eprintln!("{:?}", miette::Report::new(err));
    std::process::exit(code);
}

fn load_or_new(stored: Option<&PathBuf>) -> Corpus {
    match stored {
        Some(path) if path.exists() => {
            Corpus::load_from_path(path).unwrap_or_else(|e| corpus_error(e))
        }
        _ => Corpus::new(),
    }
}

fn import(corpus: &mut Corpus, cli: &Cli) {
    let walk_opts = WalkOptions {
        no_ignore: cli.no_ignore,
        depth: cli.depth,
    };
    let mode = if cli.group_dirs {
        ImportMode::Grouped
    } else {
        ImportMode::Individual
    };
    let templates = cli.template.iter().map(|p| (p, ImportMode::Template));
    let documents = cli.paths.iter().map(|p| (p, mode));

    for (path, mode) in templates.chain(documents) {
        let report = corpus.add_path(path, mode, &walk_opts);
        if report.added == 0 {
            tracing::warn!(path = %path.display(), "no readable documents found");
        }
        if let Some(d) = report.walk_errors {
            eprintln!("{:?}", miette::Report::new(d));
        }
    }

    if let Some(definitions) = &cli.definition_file
        && let Err(e) = corpus.add_documents_from_definition_file(definitions)
    {
        corpus_error(e);
    }
}

fn prepare(corpus: &mut Corpus, first: usize, cli: &Cli) {
    let wants_folder = cli.extract_dir.is_some() || cli.copy_all || cli.convert_all;
    if !wants_folder && !corpus.may_need_conversions() {
        return;
    }
    let policy = ExtractionPolicy {
        copy_all: cli.copy_all,
        convert_all: cli.convert_all,
        ignore_unknown: cli.ignore_unknown,
        extract_folder: cli
            .extract_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(format!("collude-{}", std::process::id()))),
    };
    match extract::extract_documents(corpus, first, &policy, &CommandConverter) {
        Ok(report) => {
            info!(
                converted = report.converted,
                copied = report.copied,
                ignored = report.ignored.len(),
                "prepared documents"
            );
            for problem in report.problems {
                eprintln!("{:?}", miette::Report::new(problem));
            }
        }
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(exitcode::CANTCREAT);
        }
    }
}

fn show_pair(
    mut out: &mut dyn Write,
    corpus: &Corpus,
    (a, b): (usize, usize),
    flags: CompareFlags,
    color: bool,
) -> Result<(), CorpusError> {
    let classifier = SpanClassifier::new(corpus, flags);
    for (doc, other) in [(a, b), (b, a)] {
        writeln!(
            out,
            "── {} ({} of its trigrams in the other) ──",
            corpus.document(doc).original_path().display(),
            output::format_score(corpus.containment(other, doc, flags))
        )?;
        let classification = classifier.classify_document(doc, other)?;
        console::write_highlighted(&mut out, &classification.spans, color)?;
    }
    Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut corpus = load_or_new(cli.stored_data.as_ref());
    let first_new = corpus.len();
    import(&mut corpus, &cli);
    prepare(&mut corpus, first_new, &cli);
    check_document_count(&corpus, &cli);

    let summary = corpus.run(first_new);
    for problem in summary.problems {
        eprintln!("{:?}", miette::Report::new(problem));
    }
    check_document_count(&corpus, &cli);

    if let Some(stored) = &cli.stored_data {
        corpus.save_to_path(stored).unwrap_or_else(|e| corpus_error(e));
    }

    let flags = CompareFlags {
        unique: cli.remove_common,
        ignore_template: cli.ignore_template,
    };
    let out_opts = OutputOptions::new(cli.json, !cli.by_name, cli.no_color);

    if let Some(target) = &cli.xml_report {
        let file = File::create(target).unwrap_or_else(|e| {
            eprintln!("error: cannot create {}: {e}", target.display());
            std::process::exit(exitcode::CANTCREAT);
        });
        xml::write_xml_report(BufWriter::new(file), &corpus, 0, 1, flags)
            .unwrap_or_else(|e| corpus_error(e));
        return;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = if let Some(pair) = &cli.show {
        let (a, b) = (pair[0], pair[1]);
        if a >= corpus.len() || b >= corpus.len() || a == b {
            usage_error("--show takes two different document indices from the corpus");
        }
        show_pair(&mut out, &corpus, (a, b), flags, out_opts.color)
    } else {
        let listed = cli.list_trigrams || cli.all_comparisons || cli.uniqueness || cli.engagement;
        let mut result = Ok(());
        if cli.list_trigrams {
            result = result.and_then(|()| output::write_trigram_list(&mut out, &corpus, &out_opts));
        }
        if cli.all_comparisons {
            result = result
                .and_then(|()| output::write_all_comparisons(&mut out, &corpus, flags, &out_opts));
        }
        for (wanted, ranking) in [
            (cli.uniqueness, Ranking::Uniqueness),
            (cli.engagement, Ranking::Engagement),
        ] {
            if wanted {
                result =
                    result.and_then(|()| output::write_ranking(&mut out, &corpus, ranking, &out_opts));
            }
        }
        if !listed {
            result = output::write_similarity_table(&mut out, &corpus, flags, &out_opts);
        }
        result
    };

    if let Err(e) = result {
        corpus_error(e);
    }
}
