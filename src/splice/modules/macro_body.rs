//! `macro`: one row per macro definition, valued by its compact body tokens.

use crate::splice::directive::Directive;
use crate::splice::error::ExtractionError;
use crate::splice::modules::{
    enumerate_all, reject_flag, validate_common, Cardinality, Emission, ExtractionModule,
    MatchRules,
};
use crate::splice::property::{format_row, render_tokens, TokenJoin};
use crate::splice::query::{NodeKind, QuerySession};

pub struct MacroBody;

impl ExtractionModule for MacroBody {
    fn name(&self) -> &str {
        "macro"
    }

    fn description(&self) -> &str {
        "Table of macro names and their bodies"
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::EnumerateAll
    }

    fn default_kinds(&self) -> &[NodeKind] {
        &[NodeKind::MacroDefinition]
    }

    fn validate(&self, directive: &Directive) -> Result<(), ExtractionError> {
        validate_common(self.name(), self.cardinality(), directive)?;
        reject_flag(self.name(), directive.config.property.is_some(), "-a")?;
        reject_flag(self.name(), directive.config.enum_type.is_some(), "-e")
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
            let body = render_tokens(decl.tokens(), TokenJoin::Compact);
            Ok(format_row(decl.name(), &body, config))
        })?;
        Ok(Emission::rows(rows, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splice::modules::ModuleRegistry;
    use crate::splice::testing::{DeclBuilder, FixtureAst};

    fn evaluate(line: &str) -> Result<Emission, ExtractionError> {
        let service = FixtureAst::new("x86_64-pc-linux-gnu")
            .header(
                "signal.h",
                [
                    DeclBuilder::macro_def("SIGINT", &["SIGINT", "2"]).build(),
                    DeclBuilder::macro_def("SIG_ERR", &["SIG_ERR", "(", "(", "__sighandler_t", ")", "-", "1", ")"])
                        .build(),
                    DeclBuilder::macro_def("SIGKILL", &["SIGKILL", "9"]).build(),
                    DeclBuilder::typedef("sigset_t").layout(128, 8).build(),
                ],
            )
            .service();
        let directive = Directive::parse(line).unwrap();
        ModuleRegistry::with_defaults().evaluate(&service, &directive, &[])
    }

    #[test]
    fn test_rows_in_source_order() {
        let emission = evaluate("macro -p SIG[A-Z]+ signal.h").unwrap();
        assert_eq!(
            emission.rows,
            vec!["SIGINT = 2".to_string(), "SIGKILL = 9".to_string()]
        );
    }

    #[test]
    fn test_compact_bodies_and_row_format() {
        let emission =
            evaluate(r#"macro -p SIG_ERR -s SIG_ -f "pub const {name}: &str = \"{value}\";" signal.h"#)
                .unwrap();
        assert_eq!(
            emission.rows,
            vec![r#"pub const ERR: &str = "((__sighandler_t)-1)";"#.to_string()]
        );
    }

    #[test]
    fn test_composite_cells() {
        let emission = evaluate("macro -C -Q -x SIG_ERR signal.h").unwrap();
        assert!(emission.composite);
        assert_eq!(
            emission.rows,
            vec![r#"["SIGINT"]=2"#.to_string(), r#"["SIGKILL"]=9"#.to_string()]
        );
    }

    #[test]
    fn test_no_matches_is_empty() {
        let emission = evaluate("macro -p EINTR signal.h").unwrap();
        assert!(emission.is_empty());
    }
}
