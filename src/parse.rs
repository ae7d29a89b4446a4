//! CIF structural parser.
//!
//! Consumes the token stream and assembles the [`CifFile`] tree, tracking
//! loop context, save-frame scope, and the active dialect. Diagnostics are
//! either collected or turned into an immediate abort depending on the
//! configured [`RaiseLevel`](crate::options::RaiseLevel); recovery always
//! keeps the first occurrence of a duplicated construct and drops the rest.

use std::collections::HashSet;

use crate::error::{ModelError, ParseError};
use crate::map::CodeMap;
use crate::model::{CifBlock, CifCategory, CifFile, CifFrame, CifItem};
use crate::options::{Dialect, ParseOptions};
use crate::token::{Token, TokenKind, Tokenizer};

/// The outcome of a tolerant parse: the (possibly partial) file plus every
/// diagnostic that was collected rather than raised.
///
/// Under [`RaiseLevel::All`](crate::options::RaiseLevel::All) the error list
/// is always empty: any diagnostic aborts the parse instead.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub file: CifFile,
    pub errors: Vec<ParseError>,
}

pub(crate) fn parse_text(text: &str, options: &ParseOptions) -> Result<Parsed, ParseError> {
    Parser {
        tokens: Tokenizer::new(text, options.case_fold),
        options,
        errors: Vec::new(),
        pending: None,
    }
    .run()
}

struct Parser<'a> {
    tokens: Tokenizer<'a>,
    options: &'a ParseOptions,
    errors: Vec<ParseError>,
    pending: Option<Token>,
}

impl Parser<'_> {
    fn next(&mut self) -> Result<Option<Token>, ParseError> {
        if let Some(token) = self.pending.take() {
            return Ok(Some(token));
        }
        match self.tokens.next() {
            None => Ok(None),
            Some(Ok(token)) => Ok(Some(token)),
            Some(Err(err)) => Err(err),
        }
    }

    fn push_back(&mut self, token: Token) {
        debug_assert!(self.pending.is_none());
        self.pending = Some(token);
    }

    /// Records a diagnostic or aborts, depending on the raise level.
    fn report(&mut self, error: ParseError) -> Result<(), ParseError> {
        if self.options.raise_level.aborts(error.severity()) {
            Err(error)
        } else {
            self.errors.push(error);
            Ok(())
        }
    }

    fn run(mut self) -> Result<Parsed, ParseError> {
        let mut file = CifFile::new(self.options.dialect, self.options.case_fold);
        loop {
            match self.next()? {
                None => break,
                Some(token) => match token.kind {
                    TokenKind::BlockCode(code) => {
                        let line = token.line;
                        if code.is_empty() {
                            self.report(ParseError::EmptyBlockCode { line })?;
                        }
                        let block = self.parse_block(code)?;
                        if file.blocks().contains(block.code()) {
                            self.report(ParseError::DuplicateBlockCode {
                                code: block.code().to_string(),
                                line,
                            })?;
                        } else {
                            let code = block.code().to_string();
                            file.blocks_mut().insert(&code, block);
                        }
                    }
                    _ => {
                        self.report(ParseError::ContentBeforeData {
                            line: token.line,
                            col: token.col,
                        })?;
                    }
                },
            }
        }
        Ok(Parsed {
            file,
            errors: self.errors,
        })
    }

    fn parse_block(&mut self, code: String) -> Result<CifBlock, ParseError> {
        let mut block = CifBlock::new(code, self.options.case_fold);
        let mut seen = HashSet::new();
        loop {
            match self.next()? {
                None => break,
                Some(token) => match token.kind {
                    TokenKind::BlockCode(_) => {
                        self.push_back(token);
                        break;
                    }
                    TokenKind::FrameCode(frame_code) => {
                        let line = token.line;
                        let frame = self.parse_frame(frame_code)?;
                        if block.frames().contains(frame.code()) {
                            self.report(ParseError::DuplicateFrameCode {
                                code: frame.code().to_string(),
                                line,
                            })?;
                        } else {
                            let code = frame.code().to_string();
                            block.frames_mut().insert(&code, frame);
                        }
                    }
                    TokenKind::FrameEnd => {
                        self.report(ParseError::UnexpectedFrameEnd { line: token.line })?;
                    }
                    TokenKind::Loop(suffix) => {
                        if !suffix.is_empty() {
                            self.report(ParseError::NamedLoop {
                                name: suffix,
                                line: token.line,
                            })?;
                        }
                        self.parse_loop(block.categories_mut(), &mut seen, token.line)?;
                    }
                    TokenKind::Tag(tag) => {
                        self.parse_pair(block.categories_mut(), &mut seen, tag, token.line)?;
                    }
                    TokenKind::Value(value) => {
                        self.report(ParseError::UnexpectedToken {
                            token: value,
                            line: token.line,
                            col: token.col,
                        })?;
                    }
                    TokenKind::Reserved(word) => {
                        self.report(ParseError::ReservedToken {
                            token: word,
                            line: token.line,
                            col: token.col,
                        })?;
                    }
                },
            }
        }
        Ok(block)
    }

    /// A frame is a restricted block scope: tags and loops only, closed by a
    /// bare `save_`. A new block header or end of input leaves it unclosed.
    fn parse_frame(&mut self, code: String) -> Result<CifFrame, ParseError> {
        let mut frame = CifFrame::new(code.clone(), self.options.case_fold);
        let mut seen = HashSet::new();
        loop {
            match self.next()? {
                None => {
                    self.report(ParseError::UnclosedFrame { code })?;
                    break;
                }
                Some(token) => match token.kind {
                    TokenKind::FrameEnd => break,
                    TokenKind::BlockCode(_) => {
                        self.report(ParseError::UnclosedFrame { code })?;
                        self.push_back(token);
                        break;
                    }
                    TokenKind::FrameCode(inner) => {
                        self.report(ParseError::NestedFrame {
                            code: inner,
                            line: token.line,
                        })?;
                    }
                    TokenKind::Loop(suffix) => {
                        if !suffix.is_empty() {
                            self.report(ParseError::NamedLoop {
                                name: suffix,
                                line: token.line,
                            })?;
                        }
                        self.parse_loop(frame.categories_mut(), &mut seen, token.line)?;
                    }
                    TokenKind::Tag(tag) => {
                        self.parse_pair(frame.categories_mut(), &mut seen, tag, token.line)?;
                    }
                    TokenKind::Value(value) => {
                        self.report(ParseError::UnexpectedToken {
                            token: value,
                            line: token.line,
                            col: token.col,
                        })?;
                    }
                    TokenKind::Reserved(word) => {
                        self.report(ParseError::ReservedToken {
                            token: word,
                            line: token.line,
                            col: token.col,
                        })?;
                    }
                },
            }
        }
        Ok(frame)
    }

    /// One free-standing tag/value pair, merged into the category its tag
    /// names (single-pair categories always stay at one row).
    fn parse_pair(
        &mut self,
        categories: &mut CodeMap<CifCategory>,
        seen: &mut HashSet<String>,
        tag: String,
        line: usize,
    ) -> Result<(), ParseError> {
        if tag.is_empty() {
            self.report(ParseError::EmptyTag { line })?;
            if let Some(token) = self.next()? {
                if !matches!(token.kind, TokenKind::Value(_)) {
                    self.push_back(token);
                }
            }
            return Ok(());
        }
        let (category, keyword) = self.split_tag(&tag, line)?;
        let duplicate = !seen.insert(tag.clone());
        if duplicate {
            self.report(ParseError::DuplicateTag {
                tag: tag.clone(),
                line,
            })?;
        }
        match self.next()? {
            Some(Token {
                kind: TokenKind::Value(value),
                ..
            }) => {
                if duplicate {
                    return Ok(());
                }
                match categories.get_mut(&category) {
                    Some(existing) if existing.is_tabular() => {
                        self.report(ParseError::CategoryConflict { category, line })?;
                    }
                    Some(existing) if existing.items().contains(&keyword) => {
                        self.report(ParseError::DuplicateTag { tag, line })?;
                    }
                    Some(existing) => existing.push_item(CifItem::single(keyword, value)),
                    None => {
                        let single = CifCategory::single(
                            category.clone(),
                            keyword,
                            value,
                            self.options.case_fold,
                        );
                        categories.insert(&category, single);
                    }
                }
            }
            Some(token) => {
                if let TokenKind::Reserved(word) = token.kind {
                    self.report(ParseError::ReservedToken {
                        token: word,
                        line: token.line,
                        col: token.col,
                    })?;
                } else {
                    self.report(ParseError::MissingValue { tag, line })?;
                    self.push_back(token);
                }
            }
            None => {
                return Err(ParseError::IncompleteFile {
                    context: format!("tag '_{tag}' at line {line} has no value"),
                });
            }
        }
        Ok(())
    }

    /// A `loop_` construct: consecutive tags, then values in row-major
    /// order until the next non-value token or end of input.
    fn parse_loop(
        &mut self,
        categories: &mut CodeMap<CifCategory>,
        seen: &mut HashSet<String>,
        loop_line: usize,
    ) -> Result<(), ParseError> {
        let mut tags: Vec<(String, usize)> = Vec::new();
        loop {
            match self.next()? {
                Some(Token {
                    kind: TokenKind::Tag(tag),
                    line,
                    ..
                }) => tags.push((tag, line)),
                Some(token) => {
                    self.push_back(token);
                    break;
                }
                None => {
                    return Err(ParseError::IncompleteFile {
                        context: format!("end of input inside loop header at line {loop_line}"),
                    });
                }
            }
        }
        if tags.is_empty() {
            self.report(ParseError::LoopWithoutTags { line: loop_line })?;
            while let Some(token) = self.next()? {
                if matches!(token.kind, TokenKind::Value(_)) {
                    continue;
                }
                self.push_back(token);
                break;
            }
            return Ok(());
        }

        let mut keywords: Vec<String> = Vec::with_capacity(tags.len());
        let category = match self.options.dialect {
            Dialect::MmCif => {
                let mut category: Option<String> = None;
                for (tag, line) in &tags {
                    let (cat, keyword) = self.split_tag(tag, *line)?;
                    match &category {
                        None => category = Some(cat),
                        Some(expected) if *expected != cat => {
                            self.report(ParseError::LoopCategoryMismatch {
                                expected: expected.clone(),
                                tag: tag.clone(),
                                line: *line,
                            })?;
                        }
                        Some(_) => {}
                    }
                    keywords.push(keyword);
                }
                category.unwrap_or_default()
            }
            Dialect::Cif1 => {
                for (tag, line) in &tags {
                    if tag.contains('.') {
                        self.report(ParseError::DialectViolation {
                            tag: tag.clone(),
                            dialect: Dialect::Cif1,
                            line: *line,
                        })?;
                    }
                    keywords.push(tag.clone());
                }
                tags[0].0.clone()
            }
        };

        let mut keep: Vec<bool> = Vec::with_capacity(tags.len());
        for (tag, line) in &tags {
            let fresh = seen.insert(tag.clone());
            if !fresh {
                self.report(ParseError::DuplicateTag {
                    tag: tag.clone(),
                    line: *line,
                })?;
            }
            keep.push(fresh);
        }

        let mut values: Vec<String> = Vec::new();
        loop {
            match self.next()? {
                Some(Token {
                    kind: TokenKind::Value(value),
                    ..
                }) => values.push(value),
                Some(token) => {
                    self.push_back(token);
                    break;
                }
                None => break,
            }
        }
        if values.is_empty() {
            self.report(ParseError::LoopWithoutValues {
                category,
                line: loop_line,
            })?;
            return Ok(());
        }

        let width = tags.len();
        let remainder = values.len() % width;
        if remainder != 0 {
            self.report(ParseError::LoopRowMismatch {
                category: category.clone(),
                tags: width,
                values: values.len(),
                line: loop_line,
            })?;
            values.truncate(values.len() - remainder);
        }
        if values.is_empty() {
            return Ok(());
        }

        let rows = values.len() / width;
        let mut columns: Vec<Vec<String>> = (0..width).map(|_| Vec::with_capacity(rows)).collect();
        for (index, value) in values.into_iter().enumerate() {
            columns[index % width].push(value);
        }
        let items: Vec<CifItem> = keywords
            .iter()
            .zip(columns)
            .zip(&keep)
            .filter(|(_, fresh)| **fresh)
            .map(|((keyword, column), _)| CifItem::new(keyword.clone(), column))
            .collect();
        if items.is_empty() {
            return Ok(());
        }
        if categories.contains(&category) {
            self.report(ParseError::CategoryConflict {
                category,
                line: loop_line,
            })?;
            return Ok(());
        }
        let built = CifCategory::from_items(category.clone(), items, true, self.options.case_fold)
            .map_err(|err| category_error(err, loop_line))?;
        categories.insert(&category, built);
        Ok(())
    }

    /// Splits a tag into `(category, keyword)` under the active dialect,
    /// recording a violation and keeping the tag whole when the shape is
    /// wrong.
    fn split_tag(&mut self, tag: &str, line: usize) -> Result<(String, String), ParseError> {
        match self.options.dialect {
            Dialect::MmCif => {
                let mut parts = tag.splitn(2, '.');
                let category = parts.next().unwrap_or_default();
                match parts.next() {
                    Some(keyword)
                        if !category.is_empty() && !keyword.is_empty() && !keyword.contains('.') =>
                    {
                        Ok((category.to_string(), keyword.to_string()))
                    }
                    _ => {
                        self.report(ParseError::DialectViolation {
                            tag: tag.to_string(),
                            dialect: Dialect::MmCif,
                            line,
                        })?;
                        Ok((tag.to_string(), tag.to_string()))
                    }
                }
            }
            Dialect::Cif1 => {
                if tag.contains('.') {
                    self.report(ParseError::DialectViolation {
                        tag: tag.to_string(),
                        dialect: Dialect::Cif1,
                        line,
                    })?;
                }
                Ok((tag.to_string(), tag.to_string()))
            }
        }
    }
}

/// Model-level finalization failures surface as structural errors; the
/// parser's own checks run first, so these only fire on defects it missed.
fn category_error(err: ModelError, line: usize) -> ParseError {
    let category = match err {
        ModelError::EmptyCategory { category }
        | ModelError::EmptyItem { category, .. }
        | ModelError::RowCountMismatch { category, .. }
        | ModelError::DuplicateKeyword { category, .. } => category,
        ModelError::DuplicateCode { code } => code,
    };
    ParseError::CategoryConflict { category, line }
}
