//! `enum`: one row per enum constant.

use crate::splice::directive::Directive;
use crate::splice::error::{ExtractionError, QueryError};
use crate::splice::modules::{
    enumerate_all, reject_flag, validate_common, Cardinality, Emission, ExtractionModule,
    MatchRules,
};
use crate::splice::property::{format_row, raw_value};
use crate::splice::query::{NodeKind, QuerySession};

pub struct EnumTable;

impl ExtractionModule for EnumTable {
    fn name(&self) -> &str {
        "enum"
    }

    fn description(&self) -> &str {
        "Table of enum constants and their values"
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::EnumerateAll
    }

    fn default_kinds(&self) -> &[NodeKind] {
        &[NodeKind::EnumConstantDecl]
    }

    fn validate(&self, directive: &Directive) -> Result<(), ExtractionError> {
        validate_common(self.name(), self.cardinality(), directive)?;
        reject_flag(self.name(), directive.config.property.is_some(), "-a")
    }

    fn evaluate(
        &self,
        session: &dyn QuerySession,
        directive: &Directive,
    ) -> Result<Emission, ExtractionError> {
        let rules = MatchRules {
            default_kinds: self.default_kinds(),
            definitions_only: false,
        };
        let config = &directive.config;
        let rows = enumerate_all(session, directive, rules, |decl| {
            let value = if config.raw_tokens {
                raw_value(decl)
            } else {
                decl.value()
                    .ok_or_else(|| QueryError::Property {
                        property: "value".to_string(),
                        name: decl.name().to_string(),
                    })?
                    .to_string()
            };
            Ok(format_row(decl.name(), &value, config))
        })?;
        Ok(Emission::rows(rows, config))
    }
}
