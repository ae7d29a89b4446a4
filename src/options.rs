//! Configuration options for CIF parsing and serialization.
//!
//! This module provides the types that parameterize both directions:
//!
//! - [`ParseOptions`]: dialect, case folding, and error tolerance for the
//!   read path
//! - [`WriteOptions`]: layout and quoting style for the write path
//!
//! All configuration is passed explicitly per call; there is no process-wide
//! state.
//!
//! ## Examples
//!
//! ```rust
//! use ciftext::{parse_with_options, CaseFold, Dialect, ParseOptions, RaiseLevel};
//!
//! let options = ParseOptions::new()
//!     .with_dialect(Dialect::MmCif)
//!     .with_case_fold(CaseFold::Lower)
//!     .with_raise_level(RaiseLevel::FatalOnly);
//!
//! let parsed = parse_with_options("data_DEMO\n_Cell.Length_A 10.0\n", &options).unwrap();
//! assert!(parsed.file.blocks().by_name("demo").is_some());
//! ```

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::error::Severity;

/// Tag-naming convention the parser enforces.
///
/// mmCIF (PDBx) tags have exactly one `.` separating category from keyword
/// (`_cell.length_a`); CIF 1.1 tags are undotted names that stand for
/// themselves (`_cell_length_a`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Dialect {
    /// CIF 1.1: plain tags, no category grouping in the name.
    Cif1,
    /// PDBx/mmCIF: every tag is `category.keyword`.
    #[default]
    MmCif,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Cif1 => f.write_str("CIF 1.1"),
            Dialect::MmCif => f.write_str("mmCIF"),
        }
    }
}

/// Case normalization applied to block codes, frame codes, and tag names.
///
/// CIF syntax is case-insensitive; folding makes lookups and duplicate
/// detection insensitive too. Values are data and are never folded.
///
/// # Examples
///
/// ```rust
/// use ciftext::CaseFold;
///
/// assert_eq!(CaseFold::Lower.fold("Cell.Length_A"), "cell.length_a");
/// assert_eq!(CaseFold::None.fold("Cell.Length_A"), "Cell.Length_A");
/// // Folding is idempotent.
/// assert_eq!(CaseFold::Lower.fold("cell"), CaseFold::Lower.fold(&CaseFold::Lower.fold("cell")));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum CaseFold {
    /// Keep names exactly as written.
    #[default]
    None,
    /// Fold names to ASCII lowercase.
    Lower,
    /// Fold names to ASCII uppercase.
    Upper,
}

impl CaseFold {
    /// Applies this folding policy to a name.
    #[must_use]
    pub fn fold<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            CaseFold::None => Cow::Borrowed(name),
            CaseFold::Lower => Cow::Owned(name.to_ascii_lowercase()),
            CaseFold::Upper => Cow::Owned(name.to_ascii_uppercase()),
        }
    }
}

/// Error-tolerance threshold for the parser.
///
/// Every diagnostic has a [`Severity`]; the raise level decides which
/// severities abort the parse and which are collected and returned next to
/// the (possibly partial) file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RaiseLevel {
    /// Abort on any diagnostic, advisories included.
    #[default]
    All,
    /// Collect advisories; abort on errors and fatal problems.
    ErrorsOnly,
    /// Collect advisories and errors; abort only when parsing cannot
    /// continue at all.
    FatalOnly,
}

impl RaiseLevel {
    /// Whether a diagnostic of the given severity aborts the parse.
    #[must_use]
    pub fn aborts(&self, severity: Severity) -> bool {
        match self {
            RaiseLevel::All => true,
            RaiseLevel::ErrorsOnly => severity >= Severity::Error,
            RaiseLevel::FatalOnly => severity >= Severity::Fatal,
        }
    }
}

/// Configuration for the read path.
///
/// # Examples
///
/// ```rust
/// use ciftext::{CaseFold, Dialect, ParseOptions, RaiseLevel};
///
/// let options = ParseOptions::new();
/// assert_eq!(options.dialect, Dialect::MmCif);
/// assert_eq!(options.case_fold, CaseFold::None);
/// assert_eq!(options.raise_level, RaiseLevel::All);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub dialect: Dialect,
    pub case_fold: CaseFold,
    pub raise_level: RaiseLevel,
}

impl ParseOptions {
    /// Creates the default options (mmCIF, no folding, strict).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tag-naming dialect.
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Sets the case-folding policy for codes and tag names.
    #[must_use]
    pub fn with_case_fold(mut self, case_fold: CaseFold) -> Self {
        self.case_fold = case_fold;
        self
    }

    /// Sets the error-tolerance threshold.
    #[must_use]
    pub fn with_raise_level(mut self, raise_level: RaiseLevel) -> Self {
        self.raise_level = raise_level;
        self
    }
}

/// Delimiter choice for values that cannot be written bare.
///
/// The writer tries each entry of
/// [`WriteOptions::delimiter_preference`] in order and picks the first one
/// that can carry the value without ambiguity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Delimiter {
    /// `'single quotes'`
    #[default]
    Single,
    /// `"double quotes"`
    Double,
    /// A `;`-delimited multi-line text field.
    TextField,
}

/// Layout for single-row categories written as free-standing tag/value pairs.
///
/// - `Horizontal`: all pairs on one line:
///   `_name1 value1  _name2 value2`
/// - `Tabular`: one pair per line, values aligned in a column
/// - `Vertical`: every token on its own line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListStyle {
    Horizontal,
    #[default]
    Tabular,
    Vertical,
}

/// Layout for categories written as `loop_` tables.
///
/// - `Horizontal`: header and all values on a single line
/// - `TabularHorizontal`: header tags on one line, one row per line, columns
///   aligned with padding
/// - `TabularVertical`: one header tag per line, one row per line, columns
///   aligned with padding
/// - `Vertical`: every token on its own line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableStyle {
    Horizontal,
    #[default]
    TabularHorizontal,
    TabularVertical,
    Vertical,
}

/// Configuration for the write path.
///
/// Controls layout, spacing, delimiter preference, and the literal tokens
/// used by create-path adapters for typed columns. The writer itself treats
/// every value as an opaque pre-formatted string; `bool_true`, `bool_false`,
/// `null_str`, and `empty_str` are the substitutions an adapter should apply
/// when flattening typed data into [`CifItem`](crate::model::CifItem)
/// values.
///
/// # Examples
///
/// ```rust
/// use ciftext::{Delimiter, TableStyle, WriteOptions};
///
/// let options = WriteOptions::new()
///     .with_table_style(TableStyle::Vertical)
///     .with_delimiter_preference(vec![Delimiter::Double, Delimiter::TextField]);
/// assert_eq!(options.min_space_columns, 2);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct WriteOptions {
    pub list_style: ListStyle,
    pub table_style: TableStyle,
    /// Write single-row non-loop categories in `loop_` form anyway.
    pub always_table: bool,
    pub bool_true: String,
    pub bool_false: String,
    /// Token adapters should emit for "unknown" values.
    pub null_str: String,
    /// Token adapters should emit for "inapplicable" values.
    pub empty_str: String,
    /// Spaces between tag/value pairs in horizontal lists.
    pub space_items: usize,
    /// Minimum spaces between aligned columns in tabular layouts.
    pub min_space_columns: usize,
    /// Spaces prefixed to every line of a category.
    pub indent: usize,
    /// Extra spaces prefixed to lines inside a `loop_` body.
    pub indent_inner: usize,
    /// Delimiters to try, most preferred first, for values that need one.
    pub delimiter_preference: Vec<Delimiter>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            list_style: ListStyle::default(),
            table_style: TableStyle::default(),
            always_table: false,
            bool_true: "YES".to_string(),
            bool_false: "NO".to_string(),
            null_str: "?".to_string(),
            empty_str: ".".to_string(),
            space_items: 2,
            min_space_columns: 2,
            indent: 0,
            indent_inner: 0,
            delimiter_preference: vec![Delimiter::Single, Delimiter::Double, Delimiter::TextField],
        }
    }
}

impl WriteOptions {
    /// Creates the default style (tabular layouts, single-quote preference).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the layout for single-row categories.
    #[must_use]
    pub fn with_list_style(mut self, style: ListStyle) -> Self {
        self.list_style = style;
        self
    }

    /// Sets the layout for `loop_` tables.
    #[must_use]
    pub fn with_table_style(mut self, style: TableStyle) -> Self {
        self.table_style = style;
        self
    }

    /// Forces `loop_` form even for single-row non-loop categories.
    #[must_use]
    pub fn with_always_table(mut self, always: bool) -> Self {
        self.always_table = always;
        self
    }

    /// Sets the literal tokens for boolean values on the create path.
    #[must_use]
    pub fn with_bool_tokens(mut self, bool_true: &str, bool_false: &str) -> Self {
        self.bool_true = bool_true.to_string();
        self.bool_false = bool_false.to_string();
        self
    }

    /// Sets the sentinel tokens for unknown and inapplicable values.
    #[must_use]
    pub fn with_sentinels(mut self, null_str: &str, empty_str: &str) -> Self {
        self.null_str = null_str.to_string();
        self.empty_str = empty_str.to_string();
        self
    }

    /// Sets the spacing between pairs in horizontal lists.
    #[must_use]
    pub fn with_space_items(mut self, spaces: usize) -> Self {
        self.space_items = spaces;
        self
    }

    /// Sets the minimum spacing between aligned columns.
    #[must_use]
    pub fn with_min_space_columns(mut self, spaces: usize) -> Self {
        self.min_space_columns = spaces;
        self
    }

    /// Sets the indentation of every category line.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the extra indentation of loop-interior lines.
    #[must_use]
    pub fn with_indent_inner(mut self, indent: usize) -> Self {
        self.indent_inner = indent;
        self
    }

    /// Sets the ordered delimiter preference for values that need quoting.
    #[must_use]
    pub fn with_delimiter_preference(mut self, preference: Vec<Delimiter>) -> Self {
        self.delimiter_preference = preference;
        self
    }
}
