//! `dialect`: a layout fact that must be chosen between a legacy type and its
//! large-file variant.
//!
//! ```text
//! dialect -A -a offset:d_name -p dirent -p dirent64 dirent.h
//! ```
//!
//! The first `-p` names the legacy declaration, the second the large-file
//! one. Each is looked up exactly-one; a missing variant is recorded as absent
//! and the [`DialectSelector`] decides which value is baked in.

use crate::splice::dialect::{Candidates, DialectSelector};
use crate::splice::directive::Directive;
use crate::splice::error::ExtractionError;
use crate::splice::modules::size_of::LAYOUT_KINDS;
use crate::splice::modules::{
    reject_flag, validate_common, Cardinality, Emission, ExtractionModule,
};
use crate::splice::property::extract;
use crate::splice::query::{NodeKind, QuerySession, Visit};
use tracing::debug;

#[derive(Default)]
pub struct DialectOffset {
    selector: DialectSelector,
}

impl ExtractionModule for DialectOffset {
    fn name(&self) -> &str {
        "dialect"
    }

    fn description(&self) -> &str {
        "Layout fact resolved between a legacy type and its large-file variant"
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::ExactlyOne
    }

    fn default_kinds(&self) -> &[NodeKind] {
        LAYOUT_KINDS
    }

    fn validate(&self, directive: &Directive) -> Result<(), ExtractionError> {
        validate_common(self.name(), self.cardinality(), directive)?;
        let config = &directive.config;
        if config.property.is_none() {
            return Err(ExtractionError::malformed(
                "module 'dialect' needs -a size|alignment|offset:<member>",
            ));
        }
        if config.include.len() != 2 {
            return Err(ExtractionError::invalid(format!(
                "module 'dialect' needs exactly two -p patterns (legacy, large-file), got {}",
                config.include.len()
            )));
        }
        reject_flag(self.name(), config.composite, "-C")
    }

    fn evaluate(
        &self,
        session: &dyn QuerySession,
        directive: &Directive,
    ) -> Result<Emission, ExtractionError> {
        let config = &directive.config;
        let property = config
            .property
            .as_ref()
            .ok_or_else(|| ExtractionError::malformed("module 'dialect' needs -a"))?;

        // (name, value) per variant: legacy first, large-file second.
        let mut slots: [Option<(String, u64)>; 2] = [None, None];

        session.visit(config.kind_hint(self.default_kinds()), &mut |decl| {
            if !decl.is_definition() || !config.accepts(decl, self.default_kinds()) {
                return Ok(Visit::Continue);
            }
            let Some(index) = config.include.iter().position(|p| p.is_match(decl.name())) else {
                return Ok(Visit::Continue);
            };
            if let Some((first, _)) = &slots[index] {
                return Err(ExtractionError::MultipleMatches {
                    first: first.clone(),
                    second: decl.name().to_string(),
                });
            }
            slots[index] = Some((decl.name().to_string(), extract(decl, property)?));
            Ok(Visit::Continue)
        })?;

        let [legacy, large_file] = slots;
        let candidates = Candidates {
            legacy: legacy.map(|(_, value)| value),
            large_file: large_file.map(|(_, value)| value),
        };
        let resolution = self.selector.resolve(candidates)?;
        debug!(
            dialect = %resolution.dialect,
            property = %property,
            value = resolution.value,
            "baking dialect-resolved value"
        );

        Ok(Emission::rows(
            vec![resolution.value.to_string()],
            config,
        ))
    }
}
