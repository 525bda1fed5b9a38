//! Directive lines
//!
//! A directive names an extraction module, a set of flags and the headers to
//! query, optionally followed by `--` and positional module arguments:
//!
//! ```text
//! enum -e Fruits -s Fruit_ -f "pub const {name}: u32 = {value};" fruits.h
//! property -w StructDecl -p ^dirent$ -a offset dirent.h -- d_name
//! ```

pub mod flags;
pub mod tokens;

pub use flags::{parse_args, parse_define, FilterConfig, NamePattern, ParsedArgs};
pub use tokens::{split_args, Arg};

use crate::splice::error::ExtractionError;
use crate::splice::query::ParseRequest;
use std::path::PathBuf;

/// One parsed directive line.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub module: String,
    pub config: FilterConfig,
    pub headers: Vec<PathBuf>,
    pub defines: Vec<(String, String)>,
    pub user_args: Vec<String>,
}

impl Directive {
    /// Parse a directive line whose continuations have already been joined.
    pub fn parse(line: &str) -> Result<Self, ExtractionError> {
        let args = split_args(line)?;
        let (module, rest) = match args.split_first() {
            Some((Arg::Bare(module), rest)) if !module.starts_with('-') => (module.clone(), rest),
            Some((other, _)) => {
                return Err(ExtractionError::malformed(format!(
                    "expected a module name, found '{}'",
                    other.text()
                )))
            }
            None => return Err(ExtractionError::malformed("empty directive")),
        };

        let ParsedArgs {
            config,
            defines,
            headers,
            user_args,
        } = parse_args(rest)?;

        Ok(Directive {
            module,
            config,
            headers,
            defines,
            user_args,
        })
    }

    /// Build the parse request for this directive. `-A` appends
    /// `largefile_defines` after the explicit `-D` defines.
    pub fn request(&self, largefile_defines: &[(String, String)]) -> ParseRequest {
        let mut request = ParseRequest::new(self.headers.clone());
        request.defines = self.defines.clone();
        if self.config.largefile {
            request.defines.extend(largefile_defines.iter().cloned());
        }
        request
    }
}
