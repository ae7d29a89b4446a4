//! The in-memory CIF data model.
//!
//! A parsed file is a tree: [`CifFile`] → [`CifBlock`] → [`CifCategory`] and
//! [`CifFrame`] (save frames, dictionary files only) → [`CifCategory`] →
//! [`CifItem`]. Every level is an ordered, name-addressable collection
//! ([`CodeMap`]); insertion order is the order constructs appeared in the
//! source text, and it is the order serialization walks.
//!
//! Values are raw strings exactly as dequoted by the tokenizer: no type
//! casting, no sentinel interpretation (`?` and `.` pass through verbatim).
//!
//! The model is immutable once built. Construction happens either inside the
//! parser or through the fallible public constructors ([`CifFile::new`] +
//! `push_*`, [`CifCategory::from_items`]), which enforce the structural
//! invariants: equal value counts across a category's items, unique keywords
//! per category, unique codes per scope. A validator or table adapter that
//! needs to change data builds a replacement category through the same
//! constructors; it never mutates in place.
//!
//! ## Examples
//!
//! Programmatic construction:
//!
//! ```rust
//! use ciftext::{CaseFold, CifBlock, CifCategory, CifFile, CifItem, Dialect};
//!
//! let fold = CaseFold::None;
//! let category = CifCategory::from_items(
//!     "cell",
//!     vec![
//!         CifItem::new("length_a", vec!["10.0".into()]),
//!         CifItem::new("length_b", vec!["20.0".into()]),
//!     ],
//!     false,
//!     fold,
//! )
//! .unwrap();
//!
//! let mut block = CifBlock::new("demo", fold);
//! block.push_category(category).unwrap();
//! let mut file = CifFile::new(Dialect::MmCif, fold);
//! file.push_block(block).unwrap();
//!
//! assert_eq!(ciftext::to_string(&file).unwrap(), "data_demo\n_cell.length_a  10.0\n_cell.length_b  20.0\n");
//! ```

use serde::Serialize;

use crate::error::ModelError;
use crate::map::CodeMap;
use crate::options::{CaseFold, Dialect};

/// A complete CIF file: an ordered set of data blocks plus the dialect and
/// case-folding policy it was built with.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CifFile {
    dialect: Dialect,
    case_fold: CaseFold,
    blocks: CodeMap<CifBlock>,
}

impl CifFile {
    /// Creates an empty file with the given dialect and folding policy.
    #[must_use]
    pub fn new(dialect: Dialect, case_fold: CaseFold) -> Self {
        CifFile {
            dialect,
            case_fold,
            blocks: CodeMap::new(case_fold),
        }
    }

    /// The tag-naming dialect this file was built under.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The case-folding policy applied to its names.
    #[must_use]
    pub fn case_fold(&self) -> CaseFold {
        self.case_fold
    }

    /// The data blocks, in source order.
    #[must_use]
    pub fn blocks(&self) -> &CodeMap<CifBlock> {
        &self.blocks
    }

    /// `true` if any block carries save frames, marking this file as a
    /// data dictionary.
    #[must_use]
    pub fn is_dictionary(&self) -> bool {
        self.blocks.values().any(|block| !block.frames().is_empty())
    }

    /// Appends a block. Fails if a block with the same (folded) code exists.
    pub fn push_block(&mut self, block: CifBlock) -> Result<(), ModelError> {
        if self.blocks.contains(block.code()) {
            return Err(ModelError::DuplicateCode {
                code: block.code().to_string(),
            });
        }
        let code = block.code().to_string();
        self.blocks.insert(&code, block);
        Ok(())
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut CodeMap<CifBlock> {
        &mut self.blocks
    }
}

/// A `data_<code>` block: categories plus an optional frame collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CifBlock {
    code: String,
    categories: CodeMap<CifCategory>,
    frames: CodeMap<CifFrame>,
}

impl CifBlock {
    /// Creates an empty block.
    #[must_use]
    pub fn new(code: impl Into<String>, case_fold: CaseFold) -> Self {
        CifBlock {
            code: code.into(),
            categories: CodeMap::new(case_fold),
            frames: CodeMap::new(case_fold),
        }
    }

    /// The block code (the part after `data_`).
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The categories directly in this block, in source order.
    #[must_use]
    pub fn categories(&self) -> &CodeMap<CifCategory> {
        &self.categories
    }

    /// The save frames of this block, in source order.
    #[must_use]
    pub fn frames(&self) -> &CodeMap<CifFrame> {
        &self.frames
    }

    /// Appends a category. Fails if one with the same name exists.
    pub fn push_category(&mut self, category: CifCategory) -> Result<(), ModelError> {
        if self.categories.contains(category.name()) {
            return Err(ModelError::DuplicateCode {
                code: category.name().to_string(),
            });
        }
        let name = category.name().to_string();
        self.categories.insert(&name, category);
        Ok(())
    }

    /// Appends a save frame. Fails if one with the same code exists.
    pub fn push_frame(&mut self, frame: CifFrame) -> Result<(), ModelError> {
        if self.frames.contains(frame.code()) {
            return Err(ModelError::DuplicateCode {
                code: frame.code().to_string(),
            });
        }
        let code = frame.code().to_string();
        self.frames.insert(&code, frame);
        Ok(())
    }

    pub(crate) fn categories_mut(&mut self) -> &mut CodeMap<CifCategory> {
        &mut self.categories
    }

    pub(crate) fn frames_mut(&mut self) -> &mut CodeMap<CifFrame> {
        &mut self.frames
    }
}

/// A `save_<code>` frame. Frames sit directly under a block and never nest.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CifFrame {
    code: String,
    categories: CodeMap<CifCategory>,
}

impl CifFrame {
    /// Creates an empty frame.
    #[must_use]
    pub fn new(code: impl Into<String>, case_fold: CaseFold) -> Self {
        CifFrame {
            code: code.into(),
            categories: CodeMap::new(case_fold),
        }
    }

    /// The frame code (the part after `save_`).
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The categories of this frame, in source order.
    #[must_use]
    pub fn categories(&self) -> &CodeMap<CifCategory> {
        &self.categories
    }

    /// Appends a category. Fails if one with the same name exists.
    pub fn push_category(&mut self, category: CifCategory) -> Result<(), ModelError> {
        if self.categories.contains(category.name()) {
            return Err(ModelError::DuplicateCode {
                code: category.name().to_string(),
            });
        }
        let name = category.name().to_string();
        self.categories.insert(&name, category);
        Ok(())
    }

    pub(crate) fn categories_mut(&mut self) -> &mut CodeMap<CifCategory> {
        &mut self.categories
    }
}

/// A named group of items with aligned value sequences.
///
/// `tabular` records whether the category came from (and will be written
/// back as) a `loop_` construct; single tag/value pairs sharing a category
/// prefix form a non-tabular category with one row.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CifCategory {
    name: String,
    items: CodeMap<CifItem>,
    tabular: bool,
}

impl CifCategory {
    /// Builds a category from its items, validating the structural
    /// invariants: at least one item, no empty items, equal value counts,
    /// unique keywords under the given folding policy.
    ///
    /// This is both the parser's finalization step and the controlled
    /// update path for external collaborators.
    ///
    /// # Errors
    ///
    /// Returns a [`ModelError`] describing the first violated invariant.
    pub fn from_items(
        name: impl Into<String>,
        items: Vec<CifItem>,
        tabular: bool,
        case_fold: CaseFold,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if items.is_empty() {
            return Err(ModelError::EmptyCategory { category: name });
        }
        let mut map = CodeMap::new(case_fold);
        let mut rows = None;
        for item in items {
            if item.values().is_empty() {
                return Err(ModelError::EmptyItem {
                    category: name,
                    keyword: item.keyword().to_string(),
                });
            }
            match rows {
                None => rows = Some(item.values().len()),
                Some(expected) if expected != item.values().len() => {
                    return Err(ModelError::RowCountMismatch {
                        category: name,
                        keyword: item.keyword().to_string(),
                        expected,
                        found: item.values().len(),
                    });
                }
                Some(_) => {}
            }
            if map.contains(item.keyword()) {
                return Err(ModelError::DuplicateKeyword {
                    category: name,
                    keyword: item.keyword().to_string(),
                });
            }
            let keyword = item.keyword().to_string();
            map.insert(&keyword, item);
        }
        Ok(CifCategory {
            name,
            items: map,
            tabular,
        })
    }

    /// The category name. Under mmCIF this is the tag prefix before the dot;
    /// under CIF 1.1 it is the (first) tag itself.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The items of this category, in source order.
    #[must_use]
    pub fn items(&self) -> &CodeMap<CifItem> {
        &self.items
    }

    /// Whether this category was written as a `loop_` table.
    #[must_use]
    pub fn is_tabular(&self) -> bool {
        self.tabular
    }

    /// The number of rows; every item holds exactly this many values.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.items
            .by_index(0)
            .map(|item| item.values().len())
            .unwrap_or(0)
    }

    /// A single-pair category as produced by a free-standing tag/value line.
    pub(crate) fn single(
        name: impl Into<String>,
        keyword: impl Into<String>,
        value: String,
        case_fold: CaseFold,
    ) -> Self {
        let mut items = CodeMap::new(case_fold);
        let item = CifItem::single(keyword, value);
        let kw = item.keyword().to_string();
        items.insert(&kw, item);
        CifCategory {
            name: name.into(),
            items,
            tabular: false,
        }
    }

    /// Appends another single-value item; the caller upholds the row-count
    /// and uniqueness invariants.
    pub(crate) fn push_item(&mut self, item: CifItem) {
        let keyword = item.keyword().to_string();
        self.items.insert(&keyword, item);
    }
}

/// One tag and its aligned sequence of raw string values.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CifItem {
    keyword: String,
    values: Vec<String>,
}

impl CifItem {
    /// Creates an item from a keyword and its values.
    #[must_use]
    pub fn new(keyword: impl Into<String>, values: Vec<String>) -> Self {
        CifItem {
            keyword: keyword.into(),
            values,
        }
    }

    /// Creates a single-value item.
    #[must_use]
    pub fn single(keyword: impl Into<String>, value: String) -> Self {
        CifItem {
            keyword: keyword.into(),
            values: vec![value],
        }
    }

    /// The item keyword. Under mmCIF this is the tag suffix after the dot;
    /// under CIF 1.1 it is the full tag.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// The raw string values, one per row.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// The value at a given row.
    #[must_use]
    pub fn get(&self, row: usize) -> Option<&str> {
        self.values.get(row).map(String::as_str)
    }
}
