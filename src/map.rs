//! Ordered name→entry map used throughout the data model.
//!
//! This module provides [`CodeMap`], a wrapper around [`IndexMap`] that keeps
//! insertion order and applies the [`CaseFold`] policy chosen at construction
//! to every key, both on insert and on lookup. CIF is case-insensitive by
//! syntax, so a file parsed with folding enabled answers lookups in any case;
//! a file parsed without folding preserves and requires exact names.
//!
//! Entries can be addressed two ways, [`CodeMap::by_name`] and
//! [`CodeMap::by_index`], and iteration always follows insertion order,
//! which is what makes serialization deterministic and round-trips stable.
//!
//! ## Examples
//!
//! ```rust
//! use ciftext::parse;
//!
//! let file = parse("data_demo\n_cell.length_a 10.0\n").unwrap();
//! let blocks = file.blocks();
//! assert_eq!(blocks.len(), 1);
//! assert!(blocks.by_name("demo").is_some());
//! assert!(blocks.by_index(0).is_some());
//! ```

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};

use crate::options::CaseFold;

/// An ordered map from folded names to entries.
///
/// `CodeMap` backs every level of the data model: file→blocks,
/// block→categories, block→frames, category→items. Keys are folded with the
/// policy fixed at construction; values keep whatever spelling they carry
/// themselves.
#[derive(Clone, Debug, PartialEq)]
pub struct CodeMap<T> {
    fold: CaseFold,
    entries: IndexMap<String, T>,
}

impl<T> CodeMap<T> {
    /// Creates an empty map with the given folding policy.
    pub(crate) fn new(fold: CaseFold) -> Self {
        CodeMap {
            fold,
            entries: IndexMap::new(),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry by name, folded with the map's policy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ciftext::{parse_with_options, CaseFold, ParseOptions};
    ///
    /// let options = ParseOptions::new().with_case_fold(CaseFold::Lower);
    /// let parsed = parse_with_options("data_DEMO\n_cell.length_a 1\n", &options).unwrap();
    /// assert!(parsed.file.blocks().by_name("Demo").is_some());
    /// ```
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&T> {
        self.entries.get(self.fold.fold(name).as_ref())
    }

    /// Looks up an entry by insertion position.
    #[must_use]
    pub fn by_index(&self, index: usize) -> Option<&T> {
        self.entries.get_index(index).map(|(_, entry)| entry)
    }

    /// Returns `true` if an entry with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(self.fold.fold(name).as_ref())
    }

    /// Iterates over the folded names, in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over the entries, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, T> {
        self.entries.values()
    }

    /// Iterates over `(folded name, entry)` pairs, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, T> {
        self.entries.iter()
    }

    pub(crate) fn insert(&mut self, name: &str, entry: T) -> Option<T> {
        self.entries.insert(self.fold.fold(name).into_owned(), entry)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.entries.get_mut(self.fold.fold(name).as_ref())
    }
}

impl<T: Serialize> Serialize for CodeMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}
