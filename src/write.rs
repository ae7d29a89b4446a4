//! CIF serialization.
//!
//! Walks a [`CifFile`] and a [`WriteOptions`] style configuration and emits
//! text that re-parses to an equal model. Two decisions are made per
//! category: the layout (list form for single-row non-loop categories, one
//! of the `loop_` layouts otherwise) and, per value, a delimiter (bare,
//! quoted, or `;` text field) chosen so the tokenizer reads back exactly
//! the stored string.
//!
//! All failures are detected while the output is being built and surface as
//! a [`WriteError`]; the partial buffer is discarded, never returned.

use crate::error::WriteError;
use crate::model::{CifBlock, CifCategory, CifFile, CifFrame};
use crate::options::{Delimiter, Dialect, ListStyle, TableStyle, WriteOptions};

pub(crate) fn write_file(file: &CifFile, options: &WriteOptions) -> Result<String, WriteError> {
    if options.delimiter_preference.is_empty() {
        return Err(WriteError::EmptyDelimiterPreference);
    }
    let mut writer = Writer {
        out: String::with_capacity(1024),
        options,
        dialect: file.dialect(),
    };
    for block in file.blocks().values() {
        writer.block(block)?;
    }
    Ok(writer.out)
}

/// A value rendered for output: either a single-line token (possibly
/// quoted) or a text field that must sit on lines of its own.
enum Tok {
    Inline(String),
    Field(String),
}

impl Tok {
    /// Width for column alignment; text fields never participate.
    fn width(&self) -> usize {
        match self {
            Tok::Inline(s) => s.len(),
            Tok::Field(_) => 0,
        }
    }
}

struct Writer<'a> {
    out: String,
    options: &'a WriteOptions,
    dialect: Dialect,
}

impl Writer<'_> {
    fn block(&mut self, block: &CifBlock) -> Result<(), WriteError> {
        self.out.push_str("data_");
        self.out.push_str(block.code());
        self.out.push('\n');
        for category in block.categories().values() {
            self.category(category)?;
        }
        for frame in block.frames().values() {
            self.frame(frame)?;
        }
        Ok(())
    }

    fn frame(&mut self, frame: &CifFrame) -> Result<(), WriteError> {
        self.out.push_str("save_");
        self.out.push_str(frame.code());
        self.out.push('\n');
        for category in frame.categories().values() {
            self.category(category)?;
        }
        self.out.push_str("save_\n");
        Ok(())
    }

    fn category(&mut self, category: &CifCategory) -> Result<(), WriteError> {
        let tags: Vec<String> = category
            .items()
            .values()
            .map(|item| self.render_tag(category.name(), item.keyword()))
            .collect();
        let columns: Vec<Vec<Tok>> = category
            .items()
            .values()
            .map(|item| {
                item.values()
                    .iter()
                    .map(|value| self.delimit(value))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let as_table =
            category.is_tabular() || category.rows() != 1 || self.options.always_table;
        if as_table {
            match self.options.table_style {
                TableStyle::Horizontal => self.table_horizontal(&tags, &columns),
                TableStyle::TabularHorizontal => self.table_tabular(&tags, &columns, true),
                TableStyle::TabularVertical => self.table_tabular(&tags, &columns, false),
                TableStyle::Vertical => self.table_vertical(&tags, &columns),
            }
        } else {
            let toks: Vec<&Tok> = columns.iter().map(|column| &column[0]).collect();
            match self.options.list_style {
                ListStyle::Horizontal => self.list_horizontal(&tags, &toks),
                ListStyle::Tabular => self.list_tabular(&tags, &toks),
                ListStyle::Vertical => self.list_vertical(&tags, &toks),
            }
        }
        Ok(())
    }

    fn render_tag(&self, category: &str, keyword: &str) -> String {
        match self.dialect {
            Dialect::MmCif => format!("_{category}.{keyword}"),
            Dialect::Cif1 => format!("_{keyword}"),
        }
    }

    fn prefix(&self) -> String {
        " ".repeat(self.options.indent)
    }

    fn inner_prefix(&self) -> String {
        " ".repeat(self.options.indent + self.options.indent_inner)
    }

    /// Text fields always start in column one; the opening `;` follows a
    /// fresh newline and the caller resumes on a new line after the closing
    /// `;`.
    fn push_field(&mut self, value: &str) {
        if !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.out.push(';');
        self.out.push_str(value);
        self.out.push_str("\n;");
    }

    fn list_horizontal(&mut self, tags: &[String], toks: &[&Tok]) {
        let prefix = self.prefix();
        let gap = " ".repeat(self.options.space_items.max(1));
        let mut line_open = false;
        for (tag, tok) in tags.iter().zip(toks) {
            if line_open {
                self.out.push_str(&gap);
            } else {
                self.out.push_str(&prefix);
            }
            self.out.push_str(tag);
            match tok {
                Tok::Inline(s) => {
                    self.out.push(' ');
                    self.out.push_str(s);
                    line_open = true;
                }
                Tok::Field(v) => {
                    self.push_field(v);
                    self.out.push('\n');
                    line_open = false;
                }
            }
        }
        if line_open {
            self.out.push('\n');
        }
    }

    fn list_tabular(&mut self, tags: &[String], toks: &[&Tok]) {
        let prefix = self.prefix();
        let gap = self.options.min_space_columns.max(1);
        let width = tags.iter().map(String::len).max().unwrap_or(0);
        for (tag, tok) in tags.iter().zip(toks) {
            self.out.push_str(&prefix);
            self.out.push_str(tag);
            match tok {
                Tok::Inline(s) => {
                    push_spaces(&mut self.out, width - tag.len() + gap);
                    self.out.push_str(s);
                    self.out.push('\n');
                }
                Tok::Field(v) => {
                    self.push_field(v);
                    self.out.push('\n');
                }
            }
        }
    }

    fn list_vertical(&mut self, tags: &[String], toks: &[&Tok]) {
        let prefix = self.prefix();
        for (tag, tok) in tags.iter().zip(toks) {
            self.out.push_str(&prefix);
            self.out.push_str(tag);
            match tok {
                Tok::Inline(s) => {
                    self.out.push('\n');
                    self.out.push_str(&prefix);
                    self.out.push_str(s);
                    self.out.push('\n');
                }
                Tok::Field(v) => {
                    self.push_field(v);
                    self.out.push('\n');
                }
            }
        }
    }

    fn table_horizontal(&mut self, tags: &[String], columns: &[Vec<Tok>]) {
        let prefix = self.prefix();
        let inner = self.inner_prefix();
        self.out.push_str(&prefix);
        self.out.push_str("loop_");
        let mut line_open = true;
        for tag in tags {
            if line_open {
                self.out.push(' ');
            } else {
                self.out.push_str(&inner);
            }
            self.out.push_str(tag);
            line_open = true;
        }
        let rows = columns.first().map(Vec::len).unwrap_or(0);
        for row in 0..rows {
            for column in columns {
                match &column[row] {
                    Tok::Inline(s) => {
                        if line_open {
                            self.out.push(' ');
                        } else {
                            self.out.push_str(&inner);
                        }
                        self.out.push_str(s);
                        line_open = true;
                    }
                    Tok::Field(v) => {
                        self.push_field(v);
                        self.out.push('\n');
                        line_open = false;
                    }
                }
            }
        }
        if line_open {
            self.out.push('\n');
        }
    }

    fn table_tabular(&mut self, tags: &[String], columns: &[Vec<Tok>], header_on_one_line: bool) {
        let prefix = self.prefix();
        let inner = self.inner_prefix();
        let gap = self.options.min_space_columns.max(1);
        let count = tags.len();

        let mut widths = vec![0usize; count];
        for (c, column) in columns.iter().enumerate() {
            let mut width = if header_on_one_line { tags[c].len() } else { 0 };
            for tok in column {
                width = width.max(tok.width());
            }
            widths[c] = width;
        }

        self.out.push_str(&prefix);
        self.out.push_str("loop_\n");
        if header_on_one_line {
            self.out.push_str(&inner);
            for (c, tag) in tags.iter().enumerate() {
                self.out.push_str(tag);
                if c + 1 != count {
                    push_spaces(&mut self.out, widths[c] - tag.len() + gap);
                }
            }
            self.out.push('\n');
        } else {
            for tag in tags {
                self.out.push_str(&inner);
                self.out.push_str(tag);
                self.out.push('\n');
            }
        }

        let rows = columns.first().map(Vec::len).unwrap_or(0);
        for row in 0..rows {
            let mut line_open = false;
            for (c, column) in columns.iter().enumerate() {
                match &column[row] {
                    Tok::Inline(s) => {
                        if !line_open {
                            self.out.push_str(&inner);
                            line_open = true;
                        }
                        self.out.push_str(s);
                        if c + 1 != count {
                            push_spaces(&mut self.out, widths[c] - s.len() + gap);
                        }
                    }
                    Tok::Field(v) => {
                        self.push_field(v);
                        self.out.push('\n');
                        line_open = false;
                    }
                }
            }
            if line_open {
                self.out.push('\n');
            }
        }
    }

    fn table_vertical(&mut self, tags: &[String], columns: &[Vec<Tok>]) {
        let prefix = self.prefix();
        let inner = self.inner_prefix();
        self.out.push_str(&prefix);
        self.out.push_str("loop_\n");
        for tag in tags {
            self.out.push_str(&inner);
            self.out.push_str(tag);
            self.out.push('\n');
        }
        let rows = columns.first().map(Vec::len).unwrap_or(0);
        for row in 0..rows {
            for column in columns {
                match &column[row] {
                    Tok::Inline(s) => {
                        self.out.push_str(&inner);
                        self.out.push_str(s);
                        self.out.push('\n');
                    }
                    Tok::Field(v) => {
                        self.push_field(v);
                        self.out.push('\n');
                    }
                }
            }
        }
    }

    /// Picks a representation for one value: bare when nothing in it can be
    /// misread, otherwise the first delimiter in the preference order that
    /// its content does not defeat. Multi-line values force the text field.
    fn delimit(&self, value: &str) -> Result<Tok, WriteError> {
        if !needs_delimiting(value) {
            return Ok(Tok::Inline(value.to_string()));
        }
        let multiline = value.bytes().any(|b| b == b'\n' || b == b'\r');
        if multiline {
            if !self.options.delimiter_preference.contains(&Delimiter::TextField) {
                return Err(WriteError::NoSafeDelimiter {
                    value: value.to_string(),
                });
            }
            return field(value);
        }
        for delimiter in &self.options.delimiter_preference {
            match delimiter {
                Delimiter::Single if quote_safe(value, b'\'') => {
                    return Ok(Tok::Inline(format!("'{value}'")));
                }
                Delimiter::Double if quote_safe(value, b'"') => {
                    return Ok(Tok::Inline(format!("\"{value}\"")));
                }
                Delimiter::TextField => return field(value),
                _ => {}
            }
        }
        Err(WriteError::NoSafeDelimiter {
            value: value.to_string(),
        })
    }
}

/// A bare token survives re-tokenization only if it is non-empty, free of
/// whitespace, does not open a quote/tag/comment/text-field construct, and
/// does not carry a reserved keyword prefix.
fn needs_delimiting(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    if value
        .bytes()
        .any(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
    {
        return true;
    }
    let first = value.as_bytes()[0];
    if matches!(
        first,
        b'_' | b'#' | b'$' | b'\'' | b'"' | b'[' | b']' | b';'
    ) {
        return true;
    }
    RESERVED_PREFIXES
        .iter()
        .any(|prefix| starts_with_ci(value, prefix))
}

const RESERVED_PREFIXES: [&str; 5] = ["data_", "save_", "loop_", "stop_", "global_"];

fn starts_with_ci(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len() && value[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// A quote character can wrap the value only if no occurrence of it inside
/// is followed by whitespace, `#`, or the end of the value; those are the
/// positions a tokenizer reads as the closing delimiter.
fn quote_safe(value: &str, quote: u8) -> bool {
    let bytes = value.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == quote {
            match bytes.get(i + 1) {
                None => return false,
                Some(next) if next.is_ascii_whitespace() || *next == b'#' => return false,
                Some(_) => {}
            }
        }
    }
    true
}

/// Text fields cannot carry a line-initial `;` past the first line (it
/// would close the field) nor trailing whitespace on any line (re-parsing
/// strips it).
fn field(value: &str) -> Result<Tok, WriteError> {
    for (i, line) in value.split('\n').enumerate() {
        if (i > 0 && line.starts_with(';')) || line.ends_with(&[' ', '\t', '\r'][..]) {
            return Err(WriteError::UnrepresentableValue {
                value: value.to_string(),
            });
        }
    }
    Ok(Tok::Field(value.to_string()))
}

fn push_spaces(out: &mut String, count: usize) {
    for _ in 0..count {
        out.push(' ');
    }
}
