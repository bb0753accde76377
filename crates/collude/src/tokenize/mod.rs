//! Lexical tokenizers for prose and source code.
//!
//! A [`Tokenizer`] walks a document's text forward once, producing
//! position-tagged [`Token`]s according to its [`Dialect`].

mod dialect;

pub use dialect::Dialect;

use dialect::{Lexicon, SymbolTable};

/// First and one-past-last code points treated as single-character words.
const IDEOGRAPH_RANGE: std::ops::Range<u32> = 0x3400..0xA000;

/// A lexical unit with its half-open character span in the input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Token {
    /// Token text; lower-cased for [`Dialect::Word`], verbatim otherwise.
    pub text: String,
    /// Character offset of the first character.
    pub start: usize,
    /// Character offset one past the last character.
    pub end: usize,
}

/// Forward-only reader producing one token per [`Tokenizer::read_next`].
#[derive(Debug)]
pub struct Tokenizer {
    lexicon: Lexicon,
    chars: Vec<char>,
    pos: usize,
    token: Token,
    done: bool,
}

/// Start tokenizing `input` with the rules of `dialect`.
#[must_use]
pub fn tokenize(dialect: Dialect, input: &str) -> Tokenizer {
    Tokenizer::new(dialect, input)
}

impl Tokenizer {
    /// Create a tokenizer positioned before the first character of `input`.
    #[must_use]
    pub fn new(dialect: Dialect, input: &str) -> Self {
        Self {
            lexicon: dialect.lexicon(),
            chars: input.chars().collect(),
            pos: 0,
            token: Token::default(),
            done: false,
        }
    }

    /// Advance to the next token.
    ///
    /// Returns `false` once the input holds no further token; every later call
    /// is a no-op that also returns `false`.
    pub fn read_next(&mut self) -> bool {
        if self.done {
            return false;
        }
        let found = match self.lexicon {
            Lexicon::Word => self.read_word(),
            Lexicon::Code(table) => self.read_code(table),
            Lexicon::Bracketed { comment } => self.read_bracketed(comment),
        };
        if !found || self.pos >= self.chars.len() {
            self.done = true;
        }
        found
    }

    /// The token produced by the last successful [`Tokenizer::read_next`].
    #[must_use]
    pub fn current_token(&self) -> &Token {
        &self.token
    }

    /// `true` once the input has been consumed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.done
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn begin_token(&mut self) {
        self.token.text.clear();
        self.token.start = self.pos;
    }

    fn finish_token(&mut self) {
        self.token.end = self.pos;
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn read_word(&mut self) -> bool {
        while self
            .peek()
            .is_some_and(|c| !(is_ideograph(c) || c.is_alphabetic()))
        {
            self.pos += 1;
        }
        let Some(first) = self.peek() else {
            return false;
        };

        self.begin_token();
        if is_ideograph(first) {
            self.token.text.push(first);
            self.pos += 1;
        } else {
            while let Some(c) = self.peek() {
                if !c.is_alphabetic() || is_ideograph(c) {
                    break;
                }
                self.token.text.extend(c.to_lowercase());
                self.pos += 1;
            }
        }
        self.finish_token();
        true
    }

    fn read_code(&mut self, table: &SymbolTable) -> bool {
        self.skip_whitespace();
        let Some(first) = self.peek() else {
            return false;
        };

        self.begin_token();
        self.token.text.push(first);
        self.pos += 1;

        if table.is_symbol_start(first) {
            while let Some(c) = self.peek() {
                self.token.text.push(c);
                if !table.is_symbol(&self.token.text) {
                    self.token.text.pop();
                    break;
                }
                self.pos += 1;
            }
        } else if first.is_ascii_digit() || first == '.' {
            self.take_while(|c| c.is_ascii_digit() || c == '.');
        } else {
            self.take_while(|c| c.is_alphanumeric() || c == '_');
        }
        self.finish_token();
        true
    }

    fn read_bracketed(&mut self, comment: char) -> bool {
        loop {
            self.skip_whitespace();
            if self.peek() != Some(comment) {
                break;
            }
            while self.peek().is_some_and(|c| c != '\n') {
                self.pos += 1;
            }
        }
        let Some(first) = self.peek() else {
            return false;
        };

        self.begin_token();
        self.token.text.push(first);
        self.pos += 1;
        if !is_bracket(first) {
            self.take_while(|c| !(c.is_whitespace() || is_bracket(c) || c == comment));
        }
        self.finish_token();
        true
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !keep(c) {
                break;
            }
            self.token.text.push(c);
            self.pos += 1;
        }
    }
}

impl Iterator for Tokenizer {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_next().then(|| self.token.clone())
    }
}

fn is_ideograph(c: char) -> bool {
    IDEOGRAPH_RANGE.contains(&u32::from(c))
}

fn is_bracket(c: char) -> bool {
    matches!(c, '(' | ')' | '[' | ']' | '{' | '}')
}
