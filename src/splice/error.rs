//! Error types for template generation
//!
//! Every error aborts the generation run. A wrong layout fact baked into a
//! binding would corrupt memory at runtime, so nothing here is recoverable
//! and no partial artifact is ever produced.

use thiserror::Error;

/// Failures reported by the AST query service.
///
/// These are distinct from "zero matches", which is a valid query outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("header '{0}' could not be resolved")]
    HeaderNotFound(String),

    #[error("could not determine {property} of '{name}'")]
    Property { property: String, name: String },

    #[error("could not load declaration dump {path}: {message}")]
    Load { path: String, message: String },
}

/// Errors raised while evaluating a single directive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("malformed directive: {0}")]
    MalformedDirective(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("more than one declaration matches: '{first}' and '{second}'")]
    MultipleMatches { first: String, second: String },

    #[error("unsupported alignment {0} (expected 1, 2, 4 or 8)")]
    UnsupportedAlignment(u64),

    #[error("unsupported size {size}: not a multiple of alignment {alignment}")]
    UnsupportedSize { size: u64, alignment: u64 },

    #[error(
        "unrecognized dialect (legacy: {}, large-file: {})",
        describe(.legacy),
        describe(.large_file)
    )]
    UnrecognizedDialect {
        legacy: Option<u64>,
        large_file: Option<u64>,
    },
}

impl ExtractionError {
    /// Stable name of the error kind, used in CLI diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::MalformedDirective(_) => "MalformedDirective",
            ExtractionError::InvalidArgument(_) => "InvalidArgument",
            ExtractionError::Query(_) => "QueryError",
            ExtractionError::MultipleMatches { .. } => "MultipleMatchesError",
            ExtractionError::UnsupportedAlignment(_) => "UnsupportedAlignment",
            ExtractionError::UnsupportedSize { .. } => "UnsupportedSize",
            ExtractionError::UnrecognizedDialect { .. } => "UnrecognizedDialectError",
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        ExtractionError::MalformedDirective(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        ExtractionError::InvalidArgument(msg.into())
    }
}

fn describe(value: &Option<u64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "absent".to_string(),
    }
}

/// Errors raised while processing a whole template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("line {line}: {source} (directive `{directive}`)")]
    Directive {
        line: usize,
        directive: String,
        source: ExtractionError,
    },

    #[error("line {line}: directive block is never closed")]
    UnterminatedBlock { line: usize },

    #[error("line {line}: block end marker outside of a directive block")]
    StrayBlockEnd { line: usize },

    #[error("line {line}: line continuation runs past the end of the block")]
    DanglingContinuation { line: usize },

    #[error("could not read template {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl TemplateError {
    /// The underlying extraction error, if this failure came from a directive.
    pub fn extraction(&self) -> Option<&ExtractionError> {
        match self {
            TemplateError::Directive { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_converts_into_extraction_error() {
        let err: ExtractionError = QueryError::HeaderNotFound("stdio.h".into()).into();
        assert_eq!(err.kind(), "QueryError");
        assert_eq!(format!("{err}"), "header 'stdio.h' could not be resolved");
    }

    #[test]
    fn test_unrecognized_dialect_display() {
        let err = ExtractionError::UnrecognizedDialect {
            legacy: None,
            large_file: Some(19),
        };
        assert_eq!(
            format!("{err}"),
            "unrecognized dialect (legacy: absent, large-file: 19)"
        );
    }

    #[test]
    fn test_template_error_exposes_extraction_source() {
        let err = TemplateError::Directive {
            line: 4,
            directive: "sizeof -p foo a.h".into(),
            source: ExtractionError::UnsupportedAlignment(3),
        };
        assert_eq!(
            err.extraction().map(ExtractionError::kind),
            Some("UnsupportedAlignment")
        );
        assert!(format!("{err}").starts_with("line 4: unsupported alignment 3"));
    }
}
