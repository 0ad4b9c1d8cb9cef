use logos::{Lexer, Logos};

/// Scan a block comment body; `true` when the closing `*/` was found.
fn block_comment(lex: &mut Lexer<Token>) -> Option<bool> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Some(true)
        }
        None => {
            lex.bump(lex.remainder().len());
            Some(false)
        }
    }
}

/// Scan a `"""` text block body; `true` when the closing delimiter was found.
fn text_block(lex: &mut Lexer<Token>) -> Option<bool> {
    let remainder = lex.remainder();
    let bytes = remainder.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' if remainder[i..].starts_with("\"\"\"") => {
                lex.bump(i + 3);
                return Some(true);
            }
            _ => i += 1,
        }
    }
    lex.bump(remainder.len());
    Some(false)
}

/// Java tokens relevant to import/declaration/reference extraction.
///
/// Operators lex as a single [`Token::Op`] so they still separate
/// identifiers; anything else lexes as an error and is skipped.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub(crate) enum Token {
    #[token("/*", block_comment)]
    BlockComment(bool),

    #[token("\"\"\"", text_block)]
    TextBlock(bool),

    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    Str,

    #[regex(r"'([^'\\\n]|\\[^\n])+'")]
    Char,

    #[regex(r"[0-9][0-9a-zA-Z_.]*")]
    Number,

    #[token("package")]
    Package,

    #[token("import")]
    Import,

    #[token("static")]
    Static,

    #[token("class")]
    Class,

    #[token("interface")]
    Interface,

    #[token("enum")]
    Enum,

    #[regex(r"[\p{L}_$][\p{L}\p{N}_$]*")]
    Ident,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("*")]
    Star,

    #[token("@")]
    At,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("...")]
    Ellipsis,

    #[token("::")]
    ColonColon,

    #[regex(r"[=+\-!~?:%^&|/]")]
    Op,
}

/// A token with its source slice and byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Lexeme<'s> {
    pub kind: Token,
    pub text: &'s str,
    pub offset: usize,
}

impl Lexeme<'_> {
    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == Token::Ident && self.text == text
    }
}
