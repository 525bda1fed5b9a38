//! Interface to the AST query service
//!
//! Parsing headers is delegated to an external compiler frontend. This module
//! only describes what the extraction modules need from it: an ordered walk
//! over declarations, plus per-declaration kind, name, layout and token
//! lookups.
//!
//! Declarations are handed out by reference inside a visitor callback, the
//! same shape as a cursor visitor over a translation unit. A handle therefore
//! cannot outlive the session that produced it, and a session lives for the
//! evaluation of exactly one directive.

pub mod dump;

pub use dump::DumpService;

use crate::splice::error::{ExtractionError, QueryError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Declaration kinds that directives can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    MacroDefinition,
    StructDecl,
    UnionDecl,
    TypedefDecl,
    EnumDecl,
    EnumConstantDecl,
    FunctionDecl,
    VarDecl,
}

impl NodeKind {
    pub const ALL: [NodeKind; 8] = [
        NodeKind::MacroDefinition,
        NodeKind::StructDecl,
        NodeKind::UnionDecl,
        NodeKind::TypedefDecl,
        NodeKind::EnumDecl,
        NodeKind::EnumConstantDecl,
        NodeKind::FunctionDecl,
        NodeKind::VarDecl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::MacroDefinition => "MacroDefinition",
            NodeKind::StructDecl => "StructDecl",
            NodeKind::UnionDecl => "UnionDecl",
            NodeKind::TypedefDecl => "TypedefDecl",
            NodeKind::EnumDecl => "EnumDecl",
            NodeKind::EnumConstantDecl => "EnumConstantDecl",
            NodeKind::FunctionDecl => "FunctionDecl",
            NodeKind::VarDecl => "VarDecl",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ExtractionError::invalid(format!("unknown declaration kind '{s}'")))
    }
}

/// What to parse: the directive's headers under its preprocessor defines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseRequest {
    pub headers: Vec<PathBuf>,
    pub defines: Vec<(String, String)>,
}

impl ParseRequest {
    pub fn new(headers: Vec<PathBuf>) -> Self {
        Self {
            headers,
            defines: Vec::new(),
        }
    }

    pub fn with_define(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defines.push((name.into(), value.into()));
        self
    }

    /// Value of a define, last one wins like on a compiler command line.
    pub fn define(&self, name: &str) -> Option<&str> {
        self.defines
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Whether a traversal should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    Break,
}

/// Byte layout answers for a declaration's type.
///
/// Negative results mean the frontend could not answer (incomplete type,
/// dependent type, unknown member).
pub trait TypeLayout {
    fn size(&self) -> i64;
    fn alignment(&self) -> i64;
    fn offset_of(&self, member: &str) -> i64;
}

/// A declaration node, valid for the duration of one visitor callback.
pub trait Declaration {
    fn kind(&self) -> NodeKind;

    /// Qualified name of the declaration.
    fn name(&self) -> &str;

    /// False for forward declarations.
    fn is_definition(&self) -> bool;

    /// Name of the enclosing enum for enum constants; `None` when anonymous.
    fn enum_name(&self) -> Option<&str>;

    /// Evaluated integer value (enum constants).
    fn value(&self) -> Option<i64>;

    fn layout(&self) -> Option<&dyn TypeLayout>;

    /// Source tokens of the declaration, leading keyword included.
    fn tokens(&self) -> &[String];
}

/// One parse of a directive's headers.
pub trait QuerySession {
    /// Target triple the frontend parsed for, e.g. `x86_64-pc-linux-gnu`.
    fn target_triple(&self) -> &str;

    /// Walk declarations in source order. `kind` is a hint; services may
    /// ignore it, callers must still check the kind of what they receive.
    fn visit(
        &self,
        kind: Option<NodeKind>,
        visitor: &mut dyn FnMut(&dyn Declaration) -> Result<Visit, ExtractionError>,
    ) -> Result<(), ExtractionError>;
}

/// Entry point of the AST query service.
pub trait AstService {
    fn open(&self, request: &ParseRequest) -> Result<Box<dyn QuerySession + '_>, QueryError>;
}
