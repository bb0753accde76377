//! The closed set of lexical dialects and their fixed symbol tables.

use std::fmt;
use std::path::Path;

/// Lexical dialect used to split a document into tokens.
///
/// Chosen per document from its file extension (see [`Dialect::from_path`]);
/// anything unrecognised is read as prose with [`Dialect::Word`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Natural-language text: lower-cased alphabetic runs and ideographs.
    Word,
    /// C and C++.
    C,
    /// C#.
    CSharp,
    /// Groovy.
    Groovy,
    /// Haskell (including literate Haskell).
    Haskell,
    /// Java.
    Java,
    /// Lua.
    Lua,
    /// PHP.
    Php,
    /// Prolog.
    Prolog,
    /// Python.
    Python,
    /// Ruby.
    Ruby,
    /// Visual Basic.
    VisualBasic,
    /// ActionScript.
    ActionScript,
    /// XML and HTML markup.
    Xml,
    /// Lisp family (Common Lisp, Scheme, Racket, Clojure).
    Lisp,
}

/// How a dialect carves characters into tokens.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Lexicon {
    /// Alphabetic runs, lower-cased; ideographs are single-character words.
    Word,
    /// Operators from a fixed table, numbers, identifiers.
    Code(&'static SymbolTable),
    /// Each bracket is a token; everything else splits on whitespace.
    Bracketed {
        /// Starts a comment that runs to the end of the line.
        comment: char,
    },
}

/// Operator vocabulary of one code dialect.
///
/// `starts` lists every character that opens a symbol token. `symbols` lists
/// the multi-character operators; a symbol token only grows while the text
/// read so far plus the next character is itself an entry, so every prefix of
/// a long operator must be listed too.
#[derive(Debug)]
pub(crate) struct SymbolTable {
    starts: &'static str,
    symbols: &'static [&'static str],
}

impl SymbolTable {
    pub(crate) fn is_symbol_start(&self, c: char) -> bool {
        self.starts.contains(c)
    }

    pub(crate) fn is_symbol(&self, candidate: &str) -> bool {
        self.symbols.contains(&candidate)
    }
}

impl Dialect {
    /// Every dialect, in dispatch order.
    pub const ALL: [Self; 15] = [
        Self::Word,
        Self::C,
        Self::CSharp,
        Self::Groovy,
        Self::Haskell,
        Self::Java,
        Self::Lua,
        Self::Php,
        Self::Prolog,
        Self::Python,
        Self::Ruby,
        Self::VisualBasic,
        Self::ActionScript,
        Self::Xml,
        Self::Lisp,
    ];

    /// Pick the dialect for `path` from its final extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(Self::Word)
    }

    /// Dialect for a bare extension such as `"java"` or `"HS"`.
    ///
    /// Returns `None` when the extension is not a recognised source type,
    /// including plain `txt`; callers fall back to [`Dialect::Word`].
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let dialect = match ext.to_ascii_lowercase().as_str() {
            "c" | "h" | "cpp" | "hpp" | "cc" | "cxx" => Self::C,
            "cs" => Self::CSharp,
            "groovy" => Self::Groovy,
            "hs" | "lhs" => Self::Haskell,
            "java" => Self::Java,
            "lua" => Self::Lua,
            "php" => Self::Php,
            "pl" | "pro" => Self::Prolog,
            "py" => Self::Python,
            "rb" => Self::Ruby,
            "vb" => Self::VisualBasic,
            "as" => Self::ActionScript,
            "xml" | "html" | "htm" => Self::Xml,
            "lisp" | "lsp" | "scm" | "rkt" | "ss" | "clj" => Self::Lisp,
            _ => return None,
        };
        Some(dialect)
    }

    /// `true` for every dialect except [`Dialect::Word`].
    #[must_use]
    pub fn is_code(self) -> bool {
        !matches!(self, Self::Word)
    }

    /// Short lowercase name used in logs and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::C => "c",
            Self::CSharp => "csharp",
            Self::Groovy => "groovy",
            Self::Haskell => "haskell",
            Self::Java => "java",
            Self::Lua => "lua",
            Self::Php => "php",
            Self::Prolog => "prolog",
            Self::Python => "python",
            Self::Ruby => "ruby",
            Self::VisualBasic => "vb",
            Self::ActionScript => "actionscript",
            Self::Xml => "xml",
            Self::Lisp => "lisp",
        }
    }

    pub(crate) fn lexicon(self) -> Lexicon {
        match self {
            Self::Word => Lexicon::Word,
            Self::C => Lexicon::Code(&C_SYMBOLS),
            Self::CSharp => Lexicon::Code(&CSHARP_SYMBOLS),
            Self::Groovy => Lexicon::Code(&GROOVY_SYMBOLS),
            Self::Haskell => Lexicon::Code(&HASKELL_SYMBOLS),
            Self::Java => Lexicon::Code(&JAVA_SYMBOLS),
            Self::Lua => Lexicon::Code(&LUA_SYMBOLS),
            Self::Php => Lexicon::Code(&PHP_SYMBOLS),
            Self::Prolog => Lexicon::Code(&PROLOG_SYMBOLS),
            Self::Python => Lexicon::Code(&PYTHON_SYMBOLS),
            Self::Ruby => Lexicon::Code(&RUBY_SYMBOLS),
            Self::VisualBasic => Lexicon::Code(&VB_SYMBOLS),
            Self::ActionScript => Lexicon::Code(&ACTIONSCRIPT_SYMBOLS),
            Self::Xml => Lexicon::Code(&XML_SYMBOLS),
            Self::Lisp => Lexicon::Bracketed { comment: ';' },
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ─── Symbol tables ────────────────────────────────────────────────────────────

/// Symbol-start characters shared by the C-like dialects.
const C_LIKE_STARTS: &str = "!%/*+-=|,?.&(){}<>:;^[]\"#~";

static C_SYMBOLS: SymbolTable = SymbolTable {
    starts: C_LIKE_STARTS,
    symbols: &[
        "!=", "++", "--", "==", ">=", "<=", "||", "&&", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
        "^=", "::", "->", "//", "<<", ">>", "##", "/*", "*/", "/**",
    ],
};

static CSHARP_SYMBOLS: SymbolTable = SymbolTable {
    starts: "!%/*+-=|,?.&(){}<>:;^[]\"#~@",
    symbols: &[
        "!=", "++", "--", "==", ">=", "<=", "||", "&&", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
        "^=", "<<", ">>", "<<=", ">>=", "::", "->", "=>", "??", "??=", "?.", "//", "///", "/*",
        "*/", "/**",
    ],
};

static GROOVY_SYMBOLS: SymbolTable = SymbolTable {
    starts: "!%/*+-=|,?.&(){}<>:;^[]\"#~@",
    symbols: &[
        "!=", "++", "--", "==", "==~", "=~", ">=", "<=", "<=>", "||", "&&", "+=", "-=", "*=",
        "/=", "%=", "&=", "|=", "^=", "**", "**=", "<<", ">>", ">>>", "<<=", ">>=", ">>>=", "?.",
        "?:", "*.", ".&", ".@", "..", "..<", "...", "->", "::", "//", "/*", "*/", "/**",
    ],
};

static HASKELL_SYMBOLS: SymbolTable = SymbolTable {
    starts: "!#$%&*+./<=>?@\\^|-~:()[]{},;`\"",
    symbols: &[
        "::", "->", "<-", "=>", "==", "/=", "<=", ">=", "&&", "||", "++", "!!", "..", ">>",
        ">>=", "=<", "=<<", "<$", "<$>", "<*", "<*>", "*>", "$!", "<|", "|>", "--", "{-", "-}",
    ],
};

static JAVA_SYMBOLS: SymbolTable = SymbolTable {
    starts: "!%/*+-=|,?.&(){}<>:;^[]\"#~@",
    symbols: &[
        "!=", "++", "--", "==", ">=", "<=", "||", "&&", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
        "^=", "<<", ">>", ">>>", "<<=", ">>=", ">>>=", "->", "::", "..", "...", "//", "/*", "*/",
        "/**",
    ],
};

static LUA_SYMBOLS: SymbolTable = SymbolTable {
    starts: "+-*/%^#&~|<>=(){}[];:,.\"",
    symbols: &[
        "==", "~=", "<=", ">=", "//", "..", "...", "::", "<<", ">>", "--", "--[", "--[[", "[[",
        "]]",
    ],
};

static PHP_SYMBOLS: SymbolTable = SymbolTable {
    starts: "!%/*+-=|,?.&(){}<>:;^[]\"#~@$\\",
    symbols: &[
        "==", "===", "!=", "!==", "<>", "<=", ">=", "<=>", "&&", "||", "++", "--", "+=", "-=",
        "*=", "/=", ".=", "%=", "&=", "|=", "^=", "<<", ">>", "<<=", ">>=", "->", "=>", "::",
        "??", "??=", "**", "**=", "<?", "?>", "//", "/*", "*/", "/**",
    ],
};

static PROLOG_SYMBOLS: SymbolTable = SymbolTable {
    starts: "+-*/\\^<>=~:.?@#&$!,;|()[]{}\"",
    symbols: &[
        ":-", "?-", "--", "-->", "->", "==", "\\=", "\\==", "=.", "=..", "=:", "=:=", "=\\",
        "=\\=", "=<", ">=", "@<", "@>", "@=", "@=<", "@>=", "\\+", "//", "**", ">>", "<<", "/\\",
        "\\/", "/*", "*/",
    ],
};

static PYTHON_SYMBOLS: SymbolTable = SymbolTable {
    starts: "!%/*+-=|,.&(){}<>:;^[]\"#~@",
    symbols: &[
        "==", "!=", "<=", ">=", "**", "//", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "@=",
        ">>", "<<", "**=", "//=", ">>=", "<<=", "->", ":=", "..", "...",
    ],
};

static RUBY_SYMBOLS: SymbolTable = SymbolTable {
    starts: "!%/*+-=|,?.&(){}<>:;^[]\"#~@$",
    symbols: &[
        "==", "===", "!=", "=~", "!~", "<=", "<=>", ">=", "&&", "||", "**", "+=", "-=", "*=",
        "/=", "%=", "**=", "&=", "|=", "^=", "<<", ">>", "<<=", ">>=", "&&=", "||=", "..", "...",
        "::", "->", "=>", "&.",
    ],
};

static VB_SYMBOLS: SymbolTable = SymbolTable {
    starts: "&*+-/\\^=<>(),.:'\"!#?{}[]",
    symbols: &[
        "<>", "<=", ">=", ":=", "+=", "-=", "*=", "/=", "\\=", "^=", "&=", "<<", ">>", "<<=",
        ">>=", "?.",
    ],
};

static ACTIONSCRIPT_SYMBOLS: SymbolTable = SymbolTable {
    starts: "!%/*+-=|,?.&(){}<>:;^[]\"#~@",
    symbols: &[
        "!=", "!==", "++", "--", "==", "===", ">=", "<=", "||", "&&", "+=", "-=", "*=", "/=",
        "%=", "&=", "|=", "^=", "<<", ">>", ">>>", "<<=", ">>=", ">>>=", "::", "..", "...", "//",
        "/*", "*/", "/**",
    ],
};

static XML_SYMBOLS: SymbolTable = SymbolTable {
    starts: "<>/?!=\"'&;-[]",
    symbols: &[
        "</", "/>", "<?", "?>", "<!", "<!-", "<!--", "--", "-->", "<![", "]]", "]]>",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("notes.txt", Dialect::Word)]
    #[case("essay", Dialect::Word)]
    #[case("report.docx", Dialect::Word)]
    #[case("main.c", Dialect::C)]
    #[case("Widget.CPP", Dialect::C)]
    #[case("Program.cs", Dialect::CSharp)]
    #[case("build.groovy", Dialect::Groovy)]
    #[case("Main.lhs", Dialect::Haskell)]
    #[case("Main.java", Dialect::Java)]
    #[case("init.lua", Dialect::Lua)]
    #[case("index.php", Dialect::Php)]
    #[case("family.pl", Dialect::Prolog)]
    #[case("solve.py", Dialect::Python)]
    #[case("app.rb", Dialect::Ruby)]
    #[case("Form1.vb", Dialect::VisualBasic)]
    #[case("Stage.as", Dialect::ActionScript)]
    #[case("page.HTML", Dialect::Xml)]
    #[case("core.clj", Dialect::Lisp)]
    #[case("archive.tar.scm", Dialect::Lisp)]
    fn dispatch_by_extension(#[case] path: &str, #[case] expected: Dialect) {
        assert_eq!(Dialect::from_path(Path::new(path)), expected);
    }

    /// Every prefix of a multi-character operator must itself be listed,
    /// otherwise the greedy reader can never reach the longer entry.
    #[test]
    fn symbol_tables_are_prefix_closed() {
        for dialect in Dialect::ALL {
            let Lexicon::Code(table) = dialect.lexicon() else {
                continue;
            };
            for symbol in table.symbols {
                let chars: Vec<char> = symbol.chars().collect();
                assert!(
                    table.is_symbol_start(chars[0]),
                    "{dialect}: {symbol:?} does not open with a symbol start"
                );
                for len in 2..chars.len() {
                    let prefix: String = chars[..len].iter().collect();
                    assert!(
                        table.is_symbol(&prefix),
                        "{dialect}: prefix {prefix:?} of {symbol:?} is missing"
                    );
                }
            }
        }
    }

    #[test]
    fn only_word_is_prose() {
        let prose: Vec<Dialect> = Dialect::ALL.into_iter().filter(|d| !d.is_code()).collect();
        assert_eq!(prose, vec![Dialect::Word]);
    }
}
