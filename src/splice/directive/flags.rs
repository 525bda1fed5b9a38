//! Flag parsing for directive lines
//!
//! Turns the arguments following a module name into a [`FilterConfig`], the
//! directive's defines, its headers and its positional user arguments. All
//! validation that does not depend on the module happens here, before any
//! query work is done.

use crate::splice::directive::tokens::Arg;
use crate::splice::error::ExtractionError;
use crate::splice::property::{Property, PropertySelector};
use crate::splice::query::{Declaration, NodeKind};
use regex::Regex;
use std::path::PathBuf;

/// Anchored name pattern from `-p`.
#[derive(Debug, Clone)]
pub struct NamePattern {
    source: String,
    regex: Regex,
}

impl NamePattern {
    pub fn new(source: &str) -> Result<Self, ExtractionError> {
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| {
            ExtractionError::invalid(format!("bad name pattern '{source}': {e}"))
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Filter and format settings parsed from a directive's flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterConfig {
    /// `-w`
    pub kind: Option<NodeKind>,
    /// `-e`
    pub enum_type: Option<String>,
    /// `-p`, OR-ed
    pub include: Vec<NamePattern>,
    /// `-x`
    pub exclude: Vec<String>,
    /// `-s`
    pub strip_prefix: Option<String>,
    /// `-a`
    pub property: Option<Property>,
    /// `-f`
    pub row_format: Option<String>,
    /// `-C`
    pub composite: bool,
    /// `-Q`
    pub quote: bool,
    /// `-R`
    pub raw_tokens: bool,
    /// `-A`
    pub largefile: bool,
}

impl FilterConfig {
    /// Kind passed to the query service as a traversal hint.
    pub fn kind_hint(&self, default_kinds: &[NodeKind]) -> Option<NodeKind> {
        match (self.kind, default_kinds) {
            (Some(kind), _) => Some(kind),
            (None, [only]) => Some(*only),
            _ => None,
        }
    }

    /// Apply the kind, enum, include and exclude filters, in that order.
    pub fn accepts(&self, decl: &dyn Declaration, default_kinds: &[NodeKind]) -> bool {
        let kind_ok = match self.kind {
            Some(kind) => decl.kind() == kind,
            None => default_kinds.is_empty() || default_kinds.contains(&decl.kind()),
        };
        if !kind_ok {
            return false;
        }

        if let Some(enum_type) = &self.enum_type {
            if decl.kind() != NodeKind::EnumConstantDecl {
                return false;
            }
            let in_enum = match decl.enum_name() {
                Some(parent) => parent == enum_type,
                None => decl.name().starts_with(enum_type.as_str()),
            };
            if !in_enum {
                return false;
            }
        }

        let name = decl.name();
        if !self.include.is_empty() && !self.include.iter().any(|p| p.is_match(name)) {
            return false;
        }

        !self.exclude.iter().any(|excluded| excluded == name)
    }
}

/// Everything after the module name of a directive line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedArgs {
    pub config: FilterConfig,
    pub defines: Vec<(String, String)>,
    pub headers: Vec<PathBuf>,
    pub user_args: Vec<String>,
}

/// Split `NAME=VALUE`; a bare `NAME` defines it to `1`.
pub fn parse_define(text: &str) -> Result<(String, String), ExtractionError> {
    let (name, value) = text.split_once('=').unwrap_or((text, "1"));
    let valid_name = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_name {
        return Err(ExtractionError::invalid(format!(
            "bad preprocessor define '{text}'"
        )));
    }
    Ok((name.to_string(), value.to_string()))
}

fn set_once<T>(slot: &mut Option<T>, value: T, flag: &str) -> Result<(), ExtractionError> {
    if slot.is_some() {
        return Err(ExtractionError::invalid(format!("flag {flag} given twice")));
    }
    *slot = Some(value);
    Ok(())
}

/// Parse `<flag>* <header>+ [-- <user-arg>*]`.
pub fn parse_args(args: &[Arg]) -> Result<ParsedArgs, ExtractionError> {
    let mut parsed = ParsedArgs::default();
    let mut selector: Option<PropertySelector> = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if matches!(arg, Arg::Separator) {
            parsed.user_args = iter.map(|a| a.text().to_string()).collect();
            break;
        }

        if !arg.is_flag() {
            parsed.headers.push(PathBuf::from(arg.text()));
            continue;
        }

        let flag = arg.text();
        if !parsed.headers.is_empty() {
            return Err(ExtractionError::malformed(format!(
                "flag {flag} after header '{}'",
                parsed.headers[0].display()
            )));
        }

        let mut value = || {
            iter.next()
                .filter(|next| !matches!(next, Arg::Separator))
                .map(|next| next.text().to_string())
                .ok_or_else(|| ExtractionError::malformed(format!("flag {flag} needs a value")))
        };

        let config = &mut parsed.config;
        match flag {
            "-w" => set_once(&mut config.kind, value()?.parse()?, flag)?,
            "-e" => set_once(&mut config.enum_type, value()?, flag)?,
            "-p" => config.include.push(NamePattern::new(&value()?)?),
            "-x" => config.exclude.push(value()?),
            "-s" => set_once(&mut config.strip_prefix, value()?, flag)?,
            "-a" => set_once(&mut selector, PropertySelector::parse(&value()?)?, flag)?,
            "-f" => set_once(&mut config.row_format, value()?, flag)?,
            "-D" => parsed.defines.push(parse_define(&value()?)?),
            "-C" => config.composite = true,
            "-Q" => config.quote = true,
            "-R" => config.raw_tokens = true,
            "-A" => config.largefile = true,
            _ => return Err(ExtractionError::malformed(format!("unknown flag {flag}"))),
        }
    }

    if parsed.headers.is_empty() {
        return Err(ExtractionError::malformed("no header given"));
    }

    if let (Some(kind), Some(enum_type)) = (parsed.config.kind, &parsed.config.enum_type) {
        if kind != NodeKind::EnumConstantDecl {
            return Err(ExtractionError::invalid(format!(
                "-e {enum_type} only applies to EnumConstantDecl, not {kind}"
            )));
        }
    }

    parsed.config.property = match selector {
        None => None,
        Some(PropertySelector::Size) => Some(Property::Size),
        Some(PropertySelector::Alignment) => Some(Property::Alignment),
        Some(PropertySelector::Offset(Some(member))) => Some(Property::Offset(member)),
        Some(PropertySelector::Offset(None)) => {
            if parsed.user_args.len() != 1 {
                return Err(ExtractionError::malformed(format!(
                    "-a offset needs exactly one member name argument, got {}",
                    parsed.user_args.len()
                )));
            }
            Some(Property::Offset(parsed.user_args.remove(0)))
        }
    };

    Ok(parsed)
}
