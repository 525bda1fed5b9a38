//! `sizeof`: byte size of the one struct, union or typedef a directive selects.

use crate::splice::directive::Directive;
use crate::splice::error::ExtractionError;
use crate::splice::modules::{
    exactly_one, reject_flag, validate_common, Cardinality, Emission, ExtractionModule,
    MatchRules,
};
use crate::splice::property::{extract, Property};
use crate::splice::query::{NodeKind, QuerySession};

pub(crate) const LAYOUT_KINDS: &[NodeKind] = &[
    NodeKind::StructDecl,
    NodeKind::UnionDecl,
    NodeKind::TypedefDecl,
];

pub struct SizeOf;

impl ExtractionModule for SizeOf {
    fn name(&self) -> &str {
        "sizeof"
    }

    fn description(&self) -> &str {
        "Byte size of a single struct, union or typedef"
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::ExactlyOne
    }

    fn default_kinds(&self) -> &[NodeKind] {
        LAYOUT_KINDS
    }

    fn validate(&self, directive: &Directive) -> Result<(), ExtractionError> {
        validate_common(self.name(), self.cardinality(), directive)?;
        reject_flag(self.name(), directive.config.property.is_some(), "-a (use 'property')")
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
        let matched = exactly_one(session, directive, rules, |decl| {
            Ok(extract(decl, &Property::Size)?.to_string())
        })?;
        Ok(Emission::from_match(matched, &directive.config))
    }
}
