//! In-process Java scanner.
//!
//! This is not a Java parser: it tokenises the file with [`logos`] and
//! recognises just enough structure (package and import statements, type
//! declarations, type parameter lists and identifier chains) to produce a
//! [`ParseResult`]. It backs the reference `jvdeps-parser-worker` binary.
//!
//! Heuristics, in the order they matter:
//!
//! - Imports are normalised to their top-level type: the first capitalised
//!   segment ends the class name (`a.b.Outer.Inner` -> `a.b.Outer`).
//! - A capitalised identifier at the head of a chain is a simple-name
//!   candidate unless the file declares it (at any depth), declares it as a
//!   type parameter, or imports it.
//! - A chain of two or more lowercase segments followed by a capitalised one
//!   is an inline fully-qualified reference.
//! - A name without lowercase letters (`MAX_SIZE`, but also `DAO`) only
//!   counts as a type where the surrounding tokens say so: after `new`,
//!   `extends`, `implements`, `throws` or `instanceof`; before an
//!   identifier, `[]`, `...`, `::`, `.class` or a type argument list;
//!   inside a type argument list. A qualified one also counts when a member
//!   is accessed on it.
//! - A class-like string literal passed directly to `forName(` or
//!   `loadClass(` is a reflective reference.

mod token;

use std::collections::BTreeSet;

use logos::Logos;

use crate::error::ScanError;
use crate::result::ParseResult;
use token::{Lexeme, Token};

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "abstract",
    "final",
    "native",
    "synchronized",
    "default",
    "strictfp",
    "sealed",
];

const CHAIN_BREAKERS: &[&str] = &["this", "super"];

/// Keywords that lex as identifiers and are followed by a type.
const TYPE_KEYWORDS: &[&str] = &["new", "extends", "implements", "throws", "instanceof"];

const REFLECTIVE_CALLS: &[&str] = &["forName", "loadClass"];

/// Scan one Java compilation unit.
pub fn scan(source: &str) -> Result<ParseResult, ScanError> {
    let lexemes = lex(source)?;
    Scanner::new(&lexemes).run()
}

fn lex(source: &str) -> Result<Vec<Lexeme<'_>>, ScanError> {
    let mut lexer = Token::lexer(source);
    let mut lexemes = Vec::new();
    while let Some(token) = lexer.next() {
        let offset = lexer.span().start;
        match token {
            Ok(Token::BlockComment(true)) => {}
            Ok(Token::BlockComment(false)) => {
                return Err(ScanError::Unterminated {
                    what: "block comment",
                    offset,
                });
            }
            Ok(Token::TextBlock(false)) => {
                return Err(ScanError::Unterminated {
                    what: "text block",
                    offset,
                });
            }
            Ok(kind) => lexemes.push(Lexeme {
                kind,
                text: lexer.slice(),
                offset,
            }),
            // Operators and stray characters carry no structure we need.
            Err(()) => {}
        }
    }
    Ok(lexemes)
}

fn is_capitalized(segment: &str) -> bool {
    segment.chars().next().is_some_and(char::is_uppercase)
}

fn has_lowercase(segment: &str) -> bool {
    segment.chars().any(char::is_lowercase)
}

/// Keep segments up to and including the first capitalised one.
fn top_level_type(segments: &[&str]) -> String {
    let end = segments
        .iter()
        .position(|segment| is_capitalized(segment))
        .map_or(segments.len(), |index| index + 1);
    segments[..end].join(".")
}

/// `a.b.Outer$Inner` -> `Some("a.b.Outer")`; plain words -> `None`.
fn class_name_literal(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('"')?.strip_suffix('"')?;
    let segments: Vec<&str> = inner.split('.').collect();
    if segments.len() < 2 {
        return None;
    }
    let well_formed = segments.iter().all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
            && !segment.starts_with(|c: char| c.is_ascii_digit())
    });
    if !well_formed || !segments.iter().any(|segment| is_capitalized(segment)) {
        return None;
    }
    let name = top_level_type(&segments);
    Some(name.split('$').next().unwrap_or(&name).to_string())
}

struct Scanner<'t, 's> {
    lexemes: &'t [Lexeme<'s>],
    /// Indices consumed by package/import statements and declaration names.
    claimed: Vec<bool>,
    result: ParseResult,
    declared_anywhere: BTreeSet<&'s str>,
    type_parameters: BTreeSet<&'s str>,
    imported_simple_names: BTreeSet<&'s str>,
}

impl<'t, 's> Scanner<'t, 's> {
    fn new(lexemes: &'t [Lexeme<'s>]) -> Self {
        Self {
            lexemes,
            claimed: vec![false; lexemes.len()],
            result: ParseResult::default(),
            declared_anywhere: BTreeSet::new(),
            type_parameters: BTreeSet::new(),
            imported_simple_names: BTreeSet::new(),
        }
    }

    fn run(mut self) -> Result<ParseResult, ScanError> {
        self.collect_structure()?;
        self.collect_references();
        Ok(self.result)
    }

    fn kind(&self, index: usize) -> Option<Token> {
        self.lexemes.get(index).map(|lexeme| lexeme.kind)
    }

    fn prev_kind(&self, index: usize) -> Option<Token> {
        index.checked_sub(1).and_then(|prev| self.kind(prev))
    }

    /// Pass 1: statements, declarations, type parameters, brace balance.
    fn collect_structure(&mut self) -> Result<(), ScanError> {
        let mut depth = 0usize;
        let mut index = 0;
        while index < self.lexemes.len() {
            let lexeme = self.lexemes[index];
            match lexeme.kind {
                Token::LBrace => depth += 1,
                Token::RBrace => {
                    depth = depth.checked_sub(1).ok_or(ScanError::UnbalancedBraces {
                        offset: lexeme.offset,
                    })?;
                }
                Token::Package if depth == 0 => {
                    index = self.package_statement(index)?;
                    continue;
                }
                Token::Import if depth == 0 => {
                    index = self.import_statement(index)?;
                    continue;
                }
                Token::Class | Token::Interface | Token::Enum => {
                    // `Foo.class` is a literal, not a declaration.
                    if self.prev_kind(index) != Some(Token::Dot) {
                        self.declaration(index + 1, depth == 0);
                    }
                }
                Token::Ident if lexeme.text == "record" => {
                    let is_record = self.prev_kind(index) != Some(Token::Dot)
                        && self.kind(index + 1) == Some(Token::Ident)
                        && matches!(self.kind(index + 2), Some(Token::LParen | Token::Lt));
                    if is_record {
                        self.declaration(index + 1, depth == 0);
                    }
                }
                Token::Lt if self.opens_type_parameters(index) => {
                    self.type_parameter_list(index);
                }
                _ => {}
            }
            index += 1;
        }

        match self.lexemes.last() {
            Some(last) if depth != 0 => Err(ScanError::UnbalancedBraces {
                offset: last.offset,
            }),
            _ => Ok(()),
        }
    }

    /// Read `a.b.c` starting at `start`, returning segments and the index
    /// after the terminating `;`.
    fn qualified_name(
        &self,
        start: usize,
        statement: &'static str,
    ) -> Result<(Vec<&'s str>, bool, usize), ScanError> {
        let malformed = |index: usize| ScanError::Malformed {
            statement,
            offset: self
                .lexemes
                .get(index)
                .or(self.lexemes.last())
                .map_or(0, |lexeme| lexeme.offset),
        };

        let mut segments = Vec::new();
        let mut wildcard = false;
        let mut index = start;
        loop {
            match self.lexemes.get(index) {
                Some(lexeme) if lexeme.kind == Token::Ident && !wildcard => {
                    segments.push(lexeme.text);
                }
                Some(lexeme) if lexeme.kind == Token::Star && !segments.is_empty() => {
                    wildcard = true;
                }
                _ => return Err(malformed(index)),
            }
            index += 1;
            match self.kind(index) {
                Some(Token::Dot) if !wildcard => index += 1,
                Some(Token::Semicolon) => return Ok((segments, wildcard, index + 1)),
                _ => return Err(malformed(index)),
            }
        }
    }

    fn claim(&mut self, range: std::ops::Range<usize>) {
        for flag in &mut self.claimed[range] {
            *flag = true;
        }
    }

    fn package_statement(&mut self, index: usize) -> Result<usize, ScanError> {
        let (segments, wildcard, next) = self.qualified_name(index + 1, "package")?;
        if wildcard {
            return Err(ScanError::Malformed {
                statement: "package",
                offset: self.lexemes[index].offset,
            });
        }
        self.result.package = segments.join(".");
        self.claim(index..next);
        Ok(next)
    }

    fn import_statement(&mut self, index: usize) -> Result<usize, ScanError> {
        let is_static = self.kind(index + 1) == Some(Token::Static);
        let start = if is_static { index + 2 } else { index + 1 };
        let (segments, wildcard, next) = self.qualified_name(start, "import")?;
        self.claim(index..next);

        match (is_static, wildcard) {
            (false, false) => {
                self.result.imports.insert(top_level_type(&segments));
                if let Some(last) = segments.last() {
                    self.imported_simple_names.insert(*last);
                }
            }
            (false, true) => match segments.last() {
                // `import a.b.Outer.*` pulls in nested types of Outer.
                Some(last) if is_capitalized(last) => {
                    self.result.imports.insert(top_level_type(&segments));
                }
                _ => {
                    self.result.wildcard_imports.insert(segments.join("."));
                }
            },
            (true, false) => {
                let owner = &segments[..segments.len().saturating_sub(1)];
                if !owner.is_empty() {
                    self.result.imports.insert(top_level_type(owner));
                }
            }
            (true, true) => {
                self.result.imports.insert(top_level_type(&segments));
            }
        }
        Ok(next)
    }

    fn declaration(&mut self, name_index: usize, top_level: bool) {
        let Some(lexeme) = self.lexemes.get(name_index) else {
            return;
        };
        if lexeme.kind != Token::Ident {
            return;
        }
        self.claimed[name_index] = true;
        self.declared_anywhere.insert(lexeme.text);
        if top_level && !self.result.declared_types.iter().any(|t| t.as_str() == lexeme.text) {
            self.result.declared_types.push(lexeme.text.to_string());
        }
    }

    /// `class Foo<T>`, `public <T> T pick()`, `{ <T> void f() }`.
    fn opens_type_parameters(&self, index: usize) -> bool {
        let Some(prev) = index.checked_sub(1).map(|prev| self.lexemes[prev]) else {
            return false;
        };
        match prev.kind {
            Token::Ident if MODIFIERS.contains(&prev.text) => true,
            Token::Ident => index
                .checked_sub(2)
                .map(|before| self.lexemes[before])
                .is_some_and(|before| {
                    matches!(before.kind, Token::Class | Token::Interface)
                        || before.is_ident("record")
                }),
            Token::Static | Token::LBrace | Token::RBrace | Token::Semicolon => true,
            _ => false,
        }
    }

    fn type_parameter_list(&mut self, open: usize) {
        let mut depth = 0usize;
        let mut index = open;
        while let Some(lexeme) = self.lexemes.get(index) {
            match lexeme.kind {
                Token::Lt => depth += 1,
                Token::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                Token::Ident if depth == 1 => {
                    let after_separator =
                        matches!(self.prev_kind(index), Some(Token::Lt | Token::Comma));
                    if after_separator {
                        self.type_parameters.insert(lexeme.text);
                        self.claimed[index] = true;
                    }
                }
                Token::LBrace | Token::Semicolon | Token::LParen => return,
                _ => {}
            }
            index += 1;
        }
    }

    /// Pass 2: identifier chains and reflective string literals.
    fn collect_references(&mut self) {
        let mut candidates = BTreeSet::new();
        let mut index = 0;
        while index < self.lexemes.len() {
            let lexeme = self.lexemes[index];
            if self.claimed[index] {
                index += 1;
                continue;
            }
            match lexeme.kind {
                Token::Ident if self.prev_kind(index) != Some(Token::Dot) => {
                    let chain = self.chain(index);
                    self.classify_chain(index, &chain, &mut candidates);
                    index += chain.len() * 2 - 1;
                    continue;
                }
                Token::Str => self.reflective_literal(index, lexeme.text),
                _ => {}
            }
            index += 1;
        }

        self.result.simple_names = candidates
            .into_iter()
            .filter(|name| {
                !self.declared_anywhere.contains(name)
                    && !self.type_parameters.contains(name)
                    && !self.imported_simple_names.contains(name)
            })
            .map(str::to_string)
            .collect();
    }

    /// Identifier segments of `a.b.C.d` starting at `start`.
    fn chain(&self, start: usize) -> Vec<&'s str> {
        let mut segments = vec![self.lexemes[start].text];
        let mut index = start + 1;
        while self.kind(index) == Some(Token::Dot) && self.kind(index + 1) == Some(Token::Ident) {
            segments.push(self.lexemes[index + 1].text);
            index += 2;
        }
        segments
    }

    fn classify_chain(
        &mut self,
        start: usize,
        chain: &[&'s str],
        candidates: &mut BTreeSet<&'s str>,
    ) {
        let end = start + chain.len() * 2 - 1;
        let head = chain[0];
        if is_capitalized(head) {
            if has_lowercase(head) || self.is_type_position(start, end) {
                candidates.insert(head);
            }
            return;
        }
        if CHAIN_BREAKERS.contains(&head) {
            return;
        }
        if let Some(first_type) = chain.iter().position(|segment| is_capitalized(segment)) {
            // `config.limits.MAX_SIZE` is a field access, `com.acme.API.call()`
            // is not.
            let is_type = has_lowercase(chain[first_type])
                || first_type + 1 < chain.len()
                || self.is_type_position(start, end);
            if first_type >= 2 && is_type {
                self.result
                    .qualified_references
                    .insert(chain[..=first_type].join("."));
            }
        }
    }

    /// Whether the chain in `start..end` sits where only a type can.
    fn is_type_position(&self, start: usize, end: usize) -> bool {
        let after_keyword = start
            .checked_sub(1)
            .map(|prev| self.lexemes[prev])
            .is_some_and(|prev| {
                prev.kind == Token::Ident && TYPE_KEYWORDS.contains(&prev.text)
            });
        if after_keyword {
            return true;
        }

        let prev = start.checked_sub(1).and_then(|prev| self.kind(prev));
        let next = self.lexemes.get(end);
        match next.map(|lexeme| lexeme.kind) {
            // `List<DTO>`, `Map<DTO, V>`, `Map<K, DTO> m`
            Some(Token::Gt | Token::Comma) if prev == Some(Token::Lt) => true,
            Some(Token::Gt) if prev == Some(Token::Comma) => matches!(
                self.kind(end + 1),
                Some(Token::Ident | Token::Gt | Token::RParen)
            ),
            Some(Token::Ident) => next.is_some_and(|lexeme| !lexeme.is_ident("instanceof")),
            Some(Token::Ellipsis | Token::ColonColon) => true,
            Some(Token::LBracket) => self.kind(end + 1) == Some(Token::RBracket),
            Some(Token::Dot) => self.kind(end + 1) == Some(Token::Class),
            Some(Token::Lt) => match self.kind(end + 1) {
                // `DAO<>` or `DAO<?>`
                Some(Token::Gt | Token::Op) => true,
                Some(Token::Ident) => {
                    matches!(self.kind(end + 2), Some(Token::Gt | Token::Comma | Token::Lt))
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn reflective_literal(&mut self, index: usize, literal: &str) {
        let called = index
            .checked_sub(2)
            .filter(|_| self.prev_kind(index) == Some(Token::LParen))
            .map(|call| self.lexemes[call])
            .is_some_and(|call| {
                call.kind == Token::Ident && REFLECTIVE_CALLS.contains(&call.text)
            });
        if called {
            if let Some(name) = class_name_literal(literal) {
                self.result.reflective_references.insert(name);
            }
        }
    }
}
