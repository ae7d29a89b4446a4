//! CIF tokenizer.
//!
//! Splits raw CIF text into a lazy, forward-only sequence of tokens. Tokens
//! are separated by whitespace except inside quoted values and `;` text
//! fields; comments (`#` at a token boundary, to end of line) are skipped
//! here and never reach the parser. Each token carries its 1-based line and
//! column for diagnostics.
//!
//! The iterator terminates at end of input and fuses after the first lexical
//! error; it is not restartable: re-tokenizing means re-invoking on the
//! original text.

use crate::error::ParseError;
use crate::options::CaseFold;

/// What a token is, with its payload already dequoted and case-folded where
/// the syntax calls for it (keyword and tag payloads only, never values).
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    /// `data_<code>`; payload is the (folded) code, possibly empty.
    BlockCode(String),
    /// `save_<code>` with a non-empty code.
    FrameCode(String),
    /// Bare `save_`.
    FrameEnd,
    /// `loop_<suffix>`; the suffix is kept raw so the parser can flag it.
    Loop(String),
    /// `_<name>`; payload is the (folded) name without the underscore.
    Tag(String),
    /// Any data value: unquoted, quoted, or text field. Raw, never folded.
    Value(String),
    /// STAR-reserved constructs CIF 1.1 forbids: `stop_…`, `global_…`,
    /// `$frame_ref`, `[bracketed]`.
    Reserved(String),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
}

pub(crate) struct Tokenizer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    line_start: usize,
    at_line_start: bool,
    fold: CaseFold,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    pub(crate) fn new(input: &'a str, fold: CaseFold) -> Self {
        Tokenizer {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
            line_start: 0,
            at_line_start: true,
            fold,
            failed: false,
        }
    }

    fn col(&self, pos: usize) -> usize {
        pos - self.line_start + 1
    }

    fn newline(&mut self) {
        self.pos += 1;
        self.line += 1;
        self.line_start = self.pos;
        self.at_line_start = true;
    }

    fn skip_whitespace_and_comments(&mut self) {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                // Leading blanks disqualify a ';' from opening a text field:
                // the digraph is only recognized in column one.
                b' ' | b'\t' | b'\r' => {
                    self.pos += 1;
                    self.at_line_start = false;
                }
                b'\n' => self.newline(),
                // '#' here is always at a token boundary; inside an unquoted
                // token it is ordinary content.
                b'#' => {
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn scan(&mut self) -> Result<Option<Token>, ParseError> {
        self.skip_whitespace_and_comments();
        if self.pos >= self.bytes.len() {
            return Ok(None);
        }

        let b = self.bytes[self.pos];

        // A ';' in the first column opens a text field; anywhere else it is
        // an ordinary value character.
        if b == b';' && self.at_line_start {
            return self.scan_text_field().map(Some);
        }

        self.at_line_start = false;

        if b == b'\'' || b == b'"' {
            return self.scan_quoted(b).map(Some);
        }

        let start = self.pos;
        while self.pos < self.bytes.len() && !self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        let word = &self.input[start..self.pos];
        Ok(Some(Token {
            kind: self.classify(word),
            line: self.line,
            col: self.col(start),
        }))
    }

    /// Quoted values must close on the same line; the closing quote counts
    /// only when followed by whitespace, end of line, or a comment opener.
    /// Any other quote character is literal content.
    fn scan_quoted(&mut self, quote: u8) -> Result<Token, ParseError> {
        let line = self.line;
        let col = self.col(self.pos);
        let start = self.pos + 1;
        self.pos += 1;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            if b == b'\n' {
                break;
            }
            if b == quote {
                let boundary = match self.bytes.get(self.pos + 1) {
                    None => true,
                    Some(next) => next.is_ascii_whitespace() || *next == b'#',
                };
                if boundary {
                    let value = self.input[start..self.pos].to_string();
                    self.pos += 1;
                    return Ok(Token {
                        kind: TokenKind::Value(value),
                        line,
                        col,
                    });
                }
            }
            self.pos += 1;
        }
        Err(ParseError::UnterminatedQuote { line, col })
    }

    /// A text field runs from an opening first-column `;` to the next line
    /// that starts with `;`. The value is the interior with each line's
    /// trailing whitespace stripped (leading whitespace is data) and without
    /// the newline preceding the closing `;`.
    fn scan_text_field(&mut self) -> Result<Token, ParseError> {
        let line = self.line;
        let col = self.col(self.pos);
        self.pos += 1;
        self.at_line_start = false;
        let content_start = self.pos;

        loop {
            while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                self.pos += 1;
            }
            if self.pos >= self.bytes.len() {
                return Err(ParseError::UnterminatedTextField { line, col });
            }
            let newline_pos = self.pos;
            self.newline();
            if self.pos < self.bytes.len() && self.bytes[self.pos] == b';' {
                let raw = &self.input[content_start..newline_pos];
                self.pos += 1;
                self.at_line_start = false;
                let value = raw
                    .split('\n')
                    .map(str::trim_end)
                    .collect::<Vec<_>>()
                    .join("\n");
                return Ok(Token {
                    kind: TokenKind::Value(value),
                    line,
                    col,
                });
            }
        }
    }

    fn classify(&self, word: &str) -> TokenKind {
        if let Some(code) = strip_prefix_ci(word, "data_") {
            TokenKind::BlockCode(self.fold.fold(code).into_owned())
        } else if let Some(code) = strip_prefix_ci(word, "save_") {
            if code.is_empty() {
                TokenKind::FrameEnd
            } else {
                TokenKind::FrameCode(self.fold.fold(code).into_owned())
            }
        } else if let Some(suffix) = strip_prefix_ci(word, "loop_") {
            TokenKind::Loop(suffix.to_string())
        } else if strip_prefix_ci(word, "stop_").is_some()
            || strip_prefix_ci(word, "global_").is_some()
            || word.starts_with('$')
            || word.starts_with('[')
        {
            TokenKind::Reserved(word.to_string())
        } else if let Some(name) = word.strip_prefix('_') {
            TokenKind::Tag(self.fold.fold(name).into_owned())
        } else {
            TokenKind::Value(word.to_string())
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.scan() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

fn strip_prefix_ci<'a>(word: &'a str, prefix: &str) -> Option<&'a str> {
    if word.len() >= prefix.len() && word[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&word[prefix.len()..])
    } else {
        None
    }
}
