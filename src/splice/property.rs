//! Property extraction and formatting
//!
//! Computes the facts a directive asks for (size, alignment, member offset,
//! token spans) from a matched declaration and renders them as text for the
//! generated artifact.

use crate::splice::directive::FilterConfig;
use crate::splice::error::{ExtractionError, QueryError};
use crate::splice::query::{Declaration, NodeKind};
use std::fmt;

/// Layout fact selected with `-a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    Size,
    Alignment,
    Offset(String),
}

/// `-a` as written, before the member name of `offset` is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertySelector {
    Size,
    Alignment,
    Offset(Option<String>),
}

impl PropertySelector {
    pub fn parse(text: &str) -> Result<Self, ExtractionError> {
        let (name, arg) = match text.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (text, None),
        };

        match (name, arg) {
            ("size", None) => Ok(PropertySelector::Size),
            ("alignment", None) => Ok(PropertySelector::Alignment),
            ("size" | "alignment", Some(_)) => Err(ExtractionError::invalid(format!(
                "property '{name}' takes no argument"
            ))),
            ("offset", None) => Ok(PropertySelector::Offset(None)),
            ("offset", Some("")) => Err(ExtractionError::malformed(
                "property 'offset:' needs a member name",
            )),
            ("offset", Some(member)) => Ok(PropertySelector::Offset(Some(member.to_string()))),
            _ => Err(ExtractionError::invalid(format!("unknown property '{text}'"))),
        }
    }
}

impl Property {
    pub fn label(&self) -> String {
        match self {
            Property::Size => "size".to_string(),
            Property::Alignment => "alignment".to_string(),
            Property::Offset(member) => format!("offset of '{member}'"),
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Size => write!(f, "size"),
            Property::Alignment => write!(f, "alignment"),
            Property::Offset(member) => write!(f, "offset:{member}"),
        }
    }
}

/// Query a layout property of a matched declaration.
///
/// The frontend reports failures as negative numbers; those, and declarations
/// without any layout, become [`QueryError::Property`].
pub fn extract(decl: &dyn Declaration, property: &Property) -> Result<u64, ExtractionError> {
    let unanswerable = || QueryError::Property {
        property: property.label(),
        name: decl.name().to_string(),
    };

    let layout = decl.layout().ok_or_else(unanswerable)?;
    let raw = match property {
        Property::Size => layout.size(),
        Property::Alignment => layout.alignment(),
        Property::Offset(member) => layout.offset_of(member),
    };

    u64::try_from(raw).map_err(|_| unanswerable().into())
}

/// How to join a token span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenJoin {
    /// No separator (macro bodies).
    Compact,
    /// Single spaces (struct bodies).
    Spaced,
}

/// Render a token span without its leading keyword (or macro name).
pub fn render_tokens(tokens: &[String], join: TokenJoin) -> String {
    let body = tokens.get(1..).unwrap_or(&[]);
    match join {
        TokenJoin::Compact => body.concat(),
        TokenJoin::Spaced => body.join(" "),
    }
}

/// Raw value tokens of a declaration, used by `-R`.
///
/// Enum constants also drop the `=` following their name.
pub fn raw_value(decl: &dyn Declaration) -> String {
    let tokens = decl.tokens();
    let skip = match (decl.kind(), tokens.get(1)) {
        (NodeKind::EnumConstantDecl, Some(eq)) if eq == "=" => 1,
        _ => 0,
    };
    render_tokens(&tokens[skip.min(tokens.len())..], TokenJoin::Compact)
}

/// Unsigned element type whose width equals `alignment`.
pub fn element_type(alignment: u64) -> Result<&'static str, ExtractionError> {
    match alignment {
        1 => Ok("u8"),
        2 => Ok("u16"),
        4 => Ok("u32"),
        8 => Ok("u64"),
        other => Err(ExtractionError::UnsupportedAlignment(other)),
    }
}

/// Declare a type with the given size and alignment but no visible fields.
pub fn opaque_surrogate(name: &str, size: u64, alignment: u64) -> Result<String, ExtractionError> {
    let element = element_type(alignment)?;
    if size % alignment != 0 {
        return Err(ExtractionError::UnsupportedSize { size, alignment });
    }
    Ok(format!(
        "#[repr(C)]\npub struct {name} {{\n    _opaque: [{element}; {}],\n}}",
        size / alignment
    ))
}

/// Quote a string as a literal for the generated source.
pub fn quote(text: &str) -> String {
    format!("\"{}\"", text.escape_default())
}

/// Apply `-s` stripping and then `-Q` quoting to a declaration name.
pub fn format_name(name: &str, config: &FilterConfig) -> String {
    let stripped = config
        .strip_prefix
        .as_deref()
        .and_then(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name);

    if config.quote {
        quote(stripped)
    } else {
        stripped.to_string()
    }
}

pub const DEFAULT_ROW_FORMAT: &str = "{name} = {value}";

/// Render one `name`/`value` row.
///
/// Composite mode yields `[name]=value` cells; otherwise the `-f` row format
/// (or `{name} = {value}`) is filled in.
pub fn format_row(name: &str, value: &str, config: &FilterConfig) -> String {
    let name = format_name(name, config);
    if config.composite {
        return format!("[{name}]={value}");
    }
    config
        .row_format
        .as_deref()
        .unwrap_or(DEFAULT_ROW_FORMAT)
        .replace("{name}", &name)
        .replace("{value}", value)
}
