//! Template scanner
//!
//! Splits a template into verbatim text and directive blocks. Text segments
//! are slices of the source, so everything outside blocks survives byte for
//! byte. Inert regions (by default `/* ... */` comments starting a line) are
//! passed through as text even if they contain directive-shaped lines.

use crate::splice::config::{InertRegion, TemplateConfig};
use crate::splice::error::TemplateError;

/// Markers recognized by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub block_start: String,
    pub block_end: String,
    pub continuation: String,
    pub inert: Vec<InertRegion>,
}

impl Markers {
    /// If `line` opens an inert region that it does not also close, return
    /// the closing delimiter to look for.
    fn opens_inert(&self, line: &str) -> Option<&str> {
        let trimmed = line.trim_start();
        self.inert.iter().find_map(|region| {
            let rest = trimmed.strip_prefix(region.open.as_str())?;
            if rest.contains(region.close.as_str()) {
                None
            } else {
                Some(region.close.as_str())
            }
        })
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            block_start: "@@extract".to_string(),
            block_end: "@@end".to_string(),
            continuation: "\\".to_string(),
            inert: vec![InertRegion {
                open: "/*".to_string(),
                close: "*/".to_string(),
            }],
        }
    }
}

impl From<&TemplateConfig> for Markers {
    fn from(config: &TemplateConfig) -> Self {
        Self {
            block_start: config.block_start.clone(),
            block_end: config.block_end.clone(),
            continuation: config.continuation.clone(),
            inert: config.inert.clone(),
        }
    }
}

/// A directive line with continuations joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveLine {
    /// 1-based line number of the first physical line.
    pub line: usize,
    pub text: String,
}

/// A directive block: its directive lines, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// 1-based line number of the start marker.
    pub line: usize,
    pub directives: Vec<DirectiveLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Block(Block),
}

fn strip_newline(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Split `source` into text and blocks.
pub fn scan<'a>(source: &'a str, markers: &Markers) -> Result<Vec<Segment<'a>>, TemplateError> {
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut offset = 0;
    let mut inert_close: Option<&str> = None;
    let mut block: Option<Block> = None;
    let mut pending: Option<DirectiveLine> = None;

    for (index, raw) in source.split_inclusive('\n').enumerate() {
        let line_no = index + 1;
        let line_start = offset;
        offset += raw.len();
        let line = strip_newline(raw);
        let trimmed = line.trim();

        if let Some(current) = block.as_mut() {
            if trimmed == markers.block_end {
                if let Some(dangling) = pending {
                    return Err(TemplateError::DanglingContinuation {
                        line: dangling.line,
                    });
                }
                if let Some(done) = block.take() {
                    segments.push(Segment::Block(done));
                }
                text_start = offset;
                continue;
            }
            if trimmed.is_empty() && pending.is_none() {
                continue;
            }

            let (body, continues) = match trimmed.strip_suffix(markers.continuation.as_str()) {
                Some(body) if !markers.continuation.is_empty() => (body.trim_end(), true),
                _ => (trimmed, false),
            };

            let mut directive = match pending.take() {
                Some(mut joined) => {
                    if !body.is_empty() {
                        if !joined.text.is_empty() {
                            joined.text.push(' ');
                        }
                        joined.text.push_str(body);
                    }
                    joined
                }
                None => DirectiveLine {
                    line: line_no,
                    text: body.to_string(),
                },
            };

            if continues {
                pending = Some(directive);
            } else {
                directive.text = directive.text.trim().to_string();
                current.directives.push(directive);
            }
            continue;
        }

        if let Some(close) = inert_close {
            if line.contains(close) {
                inert_close = None;
            }
            continue;
        }

        if trimmed == markers.block_start {
            if text_start < line_start {
                segments.push(Segment::Text(&source[text_start..line_start]));
            }
            block = Some(Block {
                line: line_no,
                directives: Vec::new(),
            });
            continue;
        }

        if trimmed == markers.block_end {
            return Err(TemplateError::StrayBlockEnd { line: line_no });
        }

        inert_close = markers.opens_inert(line);
    }

    if let Some(open) = block {
        if let Some(dangling) = pending {
            return Err(TemplateError::DanglingContinuation {
                line: dangling.line,
            });
        }
        return Err(TemplateError::UnterminatedBlock { line: open.line });
    }

    if text_start < source.len() {
        segments.push(Segment::Text(&source[text_start..]));
    }
    Ok(segments)
}
