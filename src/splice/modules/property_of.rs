//! `property`: the `-a` layout property of a single declaration.

use crate::splice::directive::Directive;
use crate::splice::error::ExtractionError;
use crate::splice::modules::size_of::LAYOUT_KINDS;
use crate::splice::modules::{
    exactly_one, validate_common, Cardinality, Emission, ExtractionModule, MatchRules,
};
use crate::splice::property::extract;
use crate::splice::query::{NodeKind, QuerySession};

pub struct PropertyOf;

impl ExtractionModule for PropertyOf {
    fn name(&self) -> &str {
        "property"
    }

    fn description(&self) -> &str {
        "Size, alignment or member offset of a single declaration"
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::ExactlyOne
    }

    fn default_kinds(&self) -> &[NodeKind] {
        LAYOUT_KINDS
    }

    fn validate(&self, directive: &Directive) -> Result<(), ExtractionError> {
        if directive.config.property.is_none() {
            return Err(ExtractionError::malformed(
                "module 'property' needs -a size|alignment|offset:<member>",
            ));
        }
        validate_common(self.name(), self.cardinality(), directive)
    }

    fn evaluate(
        &self,
        session: &dyn QuerySession,
        directive: &Directive,
    ) -> Result<Emission, ExtractionError> {
        let property = directive
            .config
            .property
            .as_ref()
            .ok_or_else(|| ExtractionError::malformed("module 'property' needs -a"))?;
        let rules = MatchRules {
            default_kinds: self.default_kinds(),
            definitions_only: true,
        };
        let matched = exactly_one(session, directive, rules, |decl| {
            Ok(extract(decl, property)?.to_string())
        })?;
        Ok(Emission::from_match(matched, &directive.config))
    }
}
