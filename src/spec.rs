//! CIF Grammar Reference
//!
//! This module documents the CIF 1.1 / PDBx-mmCIF surface as implemented by
//! this library. It contains no code.
//!
//! # Overview
//!
//! CIF (Crystallographic Information File) is a line-oriented, case-
//! insensitive, whitespace-delimited text format. A file is a sequence of
//! named data blocks; a block holds tag/value pairs, `loop_` tables, and,
//! in dictionary files, named save frames that themselves hold pairs and
//! tables.
//!
//! ```text
//! data_1ABC
//! _cell.length_a   50.000
//! _symmetry.space_group_name_H-M 'P 21 21 21'
//! loop_
//! _atom_site.id
//! _atom_site.type_symbol
//! 1 N
//! 2 C
//! ```
//!
//! # Tokens
//!
//! Tokens are separated by whitespace, except inside quoted values and text
//! fields. Keyword matching is case-insensitive.
//!
//! | token | form | notes |
//! |-------|------|-------|
//! | block header | `data_<code>` | opens a data block |
//! | frame header | `save_<code>` | opens a save frame (dictionaries) |
//! | frame terminator | `save_` | closes the current frame |
//! | loop keyword | `loop_` | opens a table header |
//! | tag | `_<name>` | a data name |
//! | quoted value | `'…'` or `"…"` | single line only |
//! | text field | `;…` ⏎ … ⏎ `;` | multi-line value |
//! | unquoted value | any other bare token | raw content |
//! | comment | `#` to end of line | only at a token boundary; skipped |
//!
//! `stop_`, `global_`, `$frame_ref`, and `[bracketed]` tokens belong to the
//! broader STAR family; CIF 1.1 reserves and rejects them.
//!
//! # Quoting rules
//!
//! A quoted value opens with `'` or `"` at a token boundary and closes at
//! the **same character followed by whitespace, end of line, or `#`**. A
//! quote character followed by anything else is literal content:
//! `'a dog's life'` is one value. Quoted values cannot span lines; reaching
//! end of line inside one is a lexical error.
//!
//! # Text fields
//!
//! A `;` in the first column opens a text field; it runs to the next line
//! whose first character is `;`. The value is the interior text with each
//! line's trailing whitespace removed (leading whitespace is preserved) and
//! without the final newline before the closing `;`. There is no escaping:
//! an interior line may not itself begin with `;`.
//!
//! # Loops
//!
//! `loop_` is followed by one or more tags (the header), then a flat stream
//! of values consumed in row-major order. The loop ends at the next tag,
//! keyword, or end of input; the value count must be a whole multiple of
//! the header width.
//!
//! # Dialects
//!
//! Under mmCIF every tag is `_<category>.<keyword>`: exactly one dot, both
//! halves non-empty, and all tags of one loop share the category. Under
//! CIF 1.1 tags are undotted names that stand for themselves.
//!
//! # Sentinels
//!
//! `?` (unknown) and `.` (inapplicable) are ordinary unquoted values at
//! this layer; their meaning is left to consumers, and they round-trip
//! verbatim.
//!
//! # Writing
//!
//! A value is written bare only when re-tokenizing cannot misread it: it is
//! non-empty, has no whitespace, does not start with `_ # $ ' " [ ] ;`, and
//! does not carry a reserved keyword prefix (`data_`, `save_`, `loop_`,
//! `stop_`, `global_`, case-insensitive). Anything else takes the first
//! workable delimiter in the configured preference order; values with
//! embedded newlines always take the text-field form. See
//! [`WriteOptions`](crate::options::WriteOptions) for the layout knobs.

// This module contains only documentation; no implementation code
