//! `struct`: re-emit the token span of a single struct or union definition.

use crate::splice::directive::Directive;
use crate::splice::error::ExtractionError;
use crate::splice::modules::{
    exactly_one, reject_flag, validate_common, Cardinality, Emission, ExtractionModule,
    MatchRules,
};
use crate::splice::property::{render_tokens, TokenJoin};
use crate::splice::query::{NodeKind, QuerySession};

pub struct StructTokens;

impl ExtractionModule for StructTokens {
    fn name(&self) -> &str {
        "struct"
    }

    fn description(&self) -> &str {
        "Source tokens of a single struct or union definition"
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::ExactlyOne
    }

    fn default_kinds(&self) -> &[NodeKind] {
        &[NodeKind::StructDecl, NodeKind::UnionDecl]
    }

    fn validate(&self, directive: &Directive) -> Result<(), ExtractionError> {
        validate_common(self.name(), self.cardinality(), directive)?;
        reject_flag(self.name(), directive.config.composite, "-C")?;
        reject_flag(self.name(), directive.config.property.is_some(), "-a")
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
            Ok(render_tokens(decl.tokens(), TokenJoin::Spaced))
        })?;
        Ok(Emission::from_match(matched, &directive.config))
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
                "poll.h",
                [
                    DeclBuilder::structure("pollfd").forward().tokens(&["struct", "pollfd"]).build(),
                    DeclBuilder::structure("pollfd")
                        .layout(8, 4)
                        .tokens(&[
                            "struct", "pollfd", "{", "int", "fd", ";", "short", "events", ";",
                            "short", "revents", ";", "}",
                        ])
                        .build(),
                ],
            )
            .service();
        let directive = Directive::parse(line).unwrap();
        ModuleRegistry::with_defaults().evaluate(&service, &directive, &[])
    }

    #[test]
    fn test_struct_body_is_space_joined() {
        let emission = evaluate("struct -p pollfd poll.h").unwrap();
        assert_eq!(
            emission.rows,
            vec!["pollfd { int fd ; short events ; short revents ; }".to_string()]
        );
    }

    #[test]
    fn test_composite_is_rejected() {
        let err = evaluate("struct -C -p pollfd poll.h").unwrap_err();
        assert_eq!(err.kind(), "InvalidArgument");
    }
}
