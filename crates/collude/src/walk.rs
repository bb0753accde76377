//! Directory discovery for corpus imports.

use std::path::{Path, PathBuf};

/// Options controlling the directory walk.
#[derive(Clone, Debug, Default)]
pub struct WalkOptions {
    /// Disable `.gitignore` / `.ignore` filtering when `true`.
    pub no_ignore: bool,
    /// Maximum depth to descend (`None` = unlimited).
    pub depth: Option<usize>,
}

/// Files found beneath one import root.
#[derive(Debug)]
pub struct WalkResult {
    /// The root path as given.
    pub root: PathBuf,
    /// Every regular file beneath the root, sorted by path.
    pub files: Vec<PathBuf>,
    /// Non-fatal errors such as unreadable subdirectories.
    pub errors: Vec<WalkError>,
}

impl WalkResult {
    /// Returns `true` if the walk encountered any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A bundle of non-fatal walk errors, rendered as related diagnostics.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("errors while walking {}", root.display())]
#[diagnostic(code(collude::walk))]
pub struct WalkErrors {
    root: PathBuf,
    #[related]
    related: Vec<WalkError>,
}

impl WalkErrors {
    /// Take the errors out of `result`. Returns `None` if there are none.
    #[must_use]
    pub fn from_result(result: &mut WalkResult) -> Option<Self> {
        if result.errors.is_empty() {
            return None;
        }
        Some(Self {
            root: result.root.clone(),
            related: std::mem::take(&mut result.errors),
        })
    }
}

/// A non-fatal error encountered while walking a directory tree.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("{message}")]
#[diagnostic(code(collude::walk::entry))]
pub struct WalkError {
    message: String,
}

/// List every file beneath `root`, honouring ignore files unless disabled.
#[must_use]
pub fn walk_dir(root: &Path, opts: &WalkOptions) -> WalkResult {
    let mut builder = ignore::WalkBuilder::new(root);

    if opts.no_ignore {
        builder
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false);
    }

    if let Some(depth) = opts.depth {
        builder.max_depth(Some(depth));
    }

    let (tx, rx) = std::sync::mpsc::channel();
    builder.build_parallel().run(|| {
        let tx = tx.clone();
        Box::new(move |result| {
            let item = match result {
                Ok(entry) if entry.file_type().is_some_and(|ft| ft.is_file()) => {
                    Ok(entry.into_path())
                }
                Ok(_) => return ignore::WalkState::Continue,
                Err(e) => Err(WalkError {
                    message: e.to_string(),
                }),
            };
            let _ = tx.send(item);
            ignore::WalkState::Continue
        })
    });
    drop(tx);

    let mut files = Vec::new();
    let mut errors = Vec::new();
    for item in rx {
        match item {
            Ok(path) => files.push(path),
            Err(e) => errors.push(e),
        }
    }

    // Thread scheduling must not change document order.
    files.sort();

    WalkResult {
        root: root.to_path_buf(),
        files,
        errors,
    }
}
