//! `opaque`: placeholder type with the size and alignment of a real one.
//!
//! Used for values that are only passed through the bindings, never looked
//! into, e.g. `sigset_t`.

use crate::splice::directive::Directive;
use crate::splice::error::ExtractionError;
use crate::splice::modules::size_of::LAYOUT_KINDS;
use crate::splice::modules::{
    exactly_one, reject_flag, validate_common, Cardinality, Emission, ExtractionModule,
    MatchRules,
};
use crate::splice::property::{extract, format_name, opaque_surrogate, Property};
use crate::splice::query::{NodeKind, QuerySession};

pub struct OpaqueSurrogate;

impl ExtractionModule for OpaqueSurrogate {
    fn name(&self) -> &str {
        "opaque"
    }

    fn description(&self) -> &str {
        "Opaque struct matching the size and alignment of a single type"
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
        reject_flag(self.name(), config.composite, "-C")?;
        reject_flag(self.name(), config.quote, "-Q")?;
        reject_flag(self.name(), config.property.is_some(), "-a")
    }

    fn evaluate(
        &self,
        session: &dyn QuerySession,
        directive: &Directive,
    ) -> Result<Emission, ExtractionError> {
        let rules = MatchRules {
            default_kinds: self.default_kinds(),
            definitions_only: true,
        };
        let config = &directive.config;
        let matched = exactly_one(session, directive, rules, |decl| {
            let size = extract(decl, &Property::Size)?;
            let alignment = extract(decl, &Property::Alignment)?;
            opaque_surrogate(&format_name(decl.name(), config), size, alignment)
        })?;
        Ok(Emission::from_match(matched, config))
    }
}
