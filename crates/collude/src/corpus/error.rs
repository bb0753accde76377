use std::path::PathBuf;

use crate::interner::TokenId;

/// Error type for corpus reading, lookup and persistence.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CorpusError {
    /// A document's input could not be opened.
    #[error("cannot open {}", path.display())]
    #[diagnostic(
        code(collude::corpus::open),
        help("check that the file exists and is readable")
    )]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A token id was never issued by the interner.
    #[error("token id {0} is not interned")]
    #[diagnostic(code(collude::corpus::unknown_token))]
    UnknownToken(TokenId),

    /// Saved corpus data did not have the expected shape.
    #[error("malformed corpus data at line {line}: expected {expected}, found {found:?}")]
    #[diagnostic(
        code(collude::corpus::malformed),
        help("the stored data file is damaged; delete it to start a fresh corpus")
    )]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// What the parser was looking for.
        expected: &'static str,
        /// The text actually found.
        found: String,
    },

    /// Reading or writing saved corpus data failed.
    #[error(transparent)]
    #[diagnostic(code(collude::corpus::io))]
    Io(#[from] std::io::Error),
}
