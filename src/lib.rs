//! # ciftext
//!
//! Parsing and serialization for CIF 1.1 and PDBx/mmCIF text, the
//! Crystallographic Information File format used for structural data and
//! data dictionaries.
//!
//! ## What it does
//!
//! - **Tokenize and parse** CIF text into an ordered, name-addressable tree:
//!   file → blocks → categories (and save frames) → items with aligned value
//!   columns. Values stay raw strings; nothing is type-cast.
//! - **Serialize** that tree back to text under a configurable style
//!   (list vs. table layouts, column alignment, indentation, delimiter
//!   preference) such that re-parsing yields an equal model.
//! - **Tolerate damage on request**: a raise-level knob switches between
//!   strict abort-on-anything parsing and collecting recoverable
//!   diagnostics next to a partial result.
//!
//! ## Quick start
//!
//! ```rust
//! let text = "data_demo\n_cell.length_a 10.0\n_cell.length_b 20.0\n";
//! let file = ciftext::parse(text).unwrap();
//!
//! let block = file.blocks().by_index(0).unwrap();
//! assert_eq!(block.code(), "demo");
//! let cell = block.categories().by_name("cell").unwrap();
//! assert_eq!(cell.items().by_name("length_a").unwrap().get(0), Some("10.0"));
//! ```
//!
//! ## Round-trips
//!
//! Serialization re-parses to an equal model under any style configuration:
//!
//! ```rust
//! let text = "data_x\nloop_\n_atom_site.id\n_atom_site.symbol\n1 C\n2 N\n";
//! let file = ciftext::parse(text).unwrap();
//! let written = ciftext::to_string(&file).unwrap();
//! let again = ciftext::parse(&written).unwrap();
//! assert_eq!(file, again);
//! ```
//!
//! ## Tolerant parsing
//!
//! ```rust
//! use ciftext::{parse_with_options, ParseOptions, RaiseLevel};
//!
//! let options = ParseOptions::new().with_raise_level(RaiseLevel::FatalOnly);
//! let parsed = parse_with_options("data_a\n_cell.length_a 1\ndata_a\n", &options).unwrap();
//! assert_eq!(parsed.file.blocks().len(), 1);
//! assert_eq!(parsed.errors.len(), 1); // the duplicate block, kept-first
//! ```
//!
//! ## Scope
//!
//! This crate is the structural layer only. It does not interpret values
//! (no units, no chemistry), validate against DDL2 dictionaries, or touch
//! the file system: collaborators do that on top of the model it exposes.
//! Dictionary files parse like any other: save frames land under
//! [`CifBlock::frames`], and [`CifFile::is_dictionary`] flags their
//! presence.
//!
//! ## Format
//!
//! See the [`spec`] module for the grammar surface as implemented: quoting
//! boundary rules, text-field semantics, loop arity, dialect shapes.

pub mod error;
pub mod map;
pub mod model;
pub mod options;
pub mod spec;

mod parse;
mod token;
mod write;

pub use error::{ErrorKind, ModelError, ParseError, Severity, WriteError};
pub use map::CodeMap;
pub use model::{CifBlock, CifCategory, CifFile, CifFrame, CifItem};
pub use options::{
    CaseFold, Delimiter, Dialect, ListStyle, ParseOptions, RaiseLevel, TableStyle, WriteOptions,
};
pub use parse::Parsed;

/// Parses CIF text with default options: mmCIF dialect, no case folding,
/// strict error handling.
///
/// # Examples
///
/// ```rust
/// let file = ciftext::parse("data_x\n_cell.length_a 10.0\n").unwrap();
/// assert_eq!(file.blocks().len(), 1);
/// ```
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered; under the default
/// [`RaiseLevel::All`] every diagnostic aborts.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(text: &str) -> Result<CifFile, ParseError> {
    let parsed = parse_with_options(text, &ParseOptions::default())?;
    Ok(parsed.file)
}

/// Parses CIF text under explicit options.
///
/// The returned [`Parsed`] carries the (possibly partial) file together
/// with every diagnostic the configured raise level chose to collect
/// rather than raise.
///
/// # Examples
///
/// ```rust
/// use ciftext::{parse_with_options, CaseFold, ParseOptions};
///
/// let options = ParseOptions::new().with_case_fold(CaseFold::Lower);
/// let parsed = parse_with_options("data_DEMO\n_Cell.Length_A 10.0\n", &options).unwrap();
/// assert!(parsed.file.blocks().by_name("demo").is_some());
/// ```
///
/// # Errors
///
/// Returns a [`ParseError`] when a diagnostic at or above the configured
/// raise level occurs.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with_options(text: &str, options: &ParseOptions) -> Result<Parsed, ParseError> {
    parse::parse_text(text, options)
}

/// Serializes a file with the default style: tabular layouts, two-space
/// column gaps, single-quote preference.
///
/// # Examples
///
/// ```rust
/// let file = ciftext::parse("data_x\n_cell.length_a 10.0\n").unwrap();
/// let text = ciftext::to_string(&file).unwrap();
/// assert_eq!(text, "data_x\n_cell.length_a  10.0\n");
/// ```
///
/// # Errors
///
/// Returns a [`WriteError`] if any value cannot be represented under the
/// default delimiter preference. No partial output is produced.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(file: &CifFile) -> Result<String, WriteError> {
    to_string_with_options(file, &WriteOptions::default())
}

/// Serializes a file under an explicit style configuration.
///
/// # Examples
///
/// ```rust
/// use ciftext::{to_string_with_options, TableStyle, WriteOptions};
///
/// let file = ciftext::parse("data_x\nloop_\n_a.x\n_a.y\n1 2\n").unwrap();
/// let options = WriteOptions::new().with_table_style(TableStyle::Vertical);
/// let text = to_string_with_options(&file, &options).unwrap();
/// assert_eq!(text, "data_x\nloop_\n_a.x\n_a.y\n1\n2\n");
/// ```
///
/// # Errors
///
/// Returns a [`WriteError`] if any value cannot be represented under the
/// configured delimiter preference, or if the preference list is empty.
/// No partial output is produced.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(
    file: &CifFile,
    options: &WriteOptions,
) -> Result<String, WriteError> {
    write::write_file(file, options)
}
