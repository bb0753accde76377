//! collude: find copied passages across a set of documents.
//!
//! Every document is read as a stream of tokens and indexed by its word
//! trigrams. Two documents resemble each other in proportion to the trigrams
//! they share. The same index drives the pairwise table, the per-group
//! uniqueness and template-engagement rankings, and the span-level reports
//! that mark which passages of one document reappear in another.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use collude::corpus::{CompareFlags, Corpus, ImportMode};
//! use collude::walk::WalkOptions;
//!
//! let mut corpus = Corpus::new();
//! corpus.add_path(Path::new("submissions"), ImportMode::Grouped, &WalkOptions::default());
//! corpus.run(0);
//! for (a, b) in corpus.report_pairs() {
//!     println!("{a} {b} {:.3}", corpus.resemblance(a, b, CompareFlags::ALL));
//! }
//! ```

pub mod corpus;
pub mod document;
pub mod extract;
pub mod index;
pub mod interner;
pub mod output;
pub mod report;
pub mod tokenize;
pub mod walk;
