//! Token definitions for directive lines
//!
//! A directive line is a whitespace separated list of words. Double quotes
//! group words containing spaces (row formats, define values) and `--`
//! separates header paths from positional module arguments.
use crate::splice::error::ExtractionError;
use logos::Logos;

#[derive(Logos, Debug, PartialEq, Clone)]
pub enum Token {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[token("--")]
    Separator,

    #[regex(r#""([^"\\]|\\.)*""#)]
    Quoted,

    #[regex(r#"[^ \t\r\n"]+"#)]
    Word,
}

/// One argument of a directive line after tokenization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Unquoted word; only these can be flags.
    Bare(String),
    /// Double-quoted word with escapes resolved.
    Quoted(String),
    /// The `--` separator.
    Separator,
}

impl Arg {
    pub fn text(&self) -> &str {
        match self {
            Arg::Bare(text) | Arg::Quoted(text) => text,
            Arg::Separator => "--",
        }
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, Arg::Bare(text) if text.len() > 1 && text.starts_with('-'))
    }
}

/// Split a (continuation-joined) directive line into arguments.
pub fn split_args(line: &str) -> Result<Vec<Arg>, ExtractionError> {
    let mut lexer = Token::lexer(line);
    let mut args = Vec::new();

    while let Some(result) = lexer.next() {
        let token = result.map_err(|_| {
            ExtractionError::malformed(format!(
                "unterminated quote at column {}",
                lexer.span().start + 1
            ))
        })?;
        match token {
            Token::Whitespace => {}
            Token::Separator => args.push(Arg::Separator),
            Token::Word => args.push(Arg::Bare(lexer.slice().to_string())),
            Token::Quoted => {
                let slice = lexer.slice();
                args.push(Arg::Quoted(unescape(&slice[1..slice.len() - 1])));
            }
        }
    }

    Ok(args)
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}
