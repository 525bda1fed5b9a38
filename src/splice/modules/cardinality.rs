//! Match traversal with cardinality discipline
//!
//! The "already matched" state lives in the traversal call itself, so nothing
//! leaks from one directive into the next.

use crate::splice::directive::Directive;
use crate::splice::error::ExtractionError;
use crate::splice::query::{Declaration, NodeKind, QuerySession, Visit};
use tracing::debug;

/// Which declarations a module considers.
#[derive(Debug, Clone, Copy)]
pub struct MatchRules<'a> {
    pub default_kinds: &'a [NodeKind],
    /// Skip forward declarations; needed wherever layout is queried.
    pub definitions_only: bool,
}

/// The fact rendered for the single accepted declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    pub name: String,
    pub fact: String,
}

fn accepted(decl: &dyn Declaration, directive: &Directive, rules: &MatchRules<'_>) -> bool {
    if rules.definitions_only && !decl.is_definition() {
        return false;
    }
    directive.config.accepts(decl, rules.default_kinds)
}

/// Find the single declaration the directive selects.
///
/// Every declaration is visited so that a second match is always detected.
/// Zero matches yields `Ok(None)`.
pub fn exactly_one<F>(
    session: &dyn QuerySession,
    directive: &Directive,
    rules: MatchRules<'_>,
    mut render: F,
) -> Result<Option<Matched>, ExtractionError>
where
    F: FnMut(&dyn Declaration) -> Result<String, ExtractionError>,
{
    let mut found: Option<Matched> = None;

    session.visit(
        directive.config.kind_hint(rules.default_kinds),
        &mut |decl| {
            if !accepted(decl, directive, &rules) {
                return Ok(Visit::Continue);
            }
            if let Some(first) = &found {
                return Err(ExtractionError::MultipleMatches {
                    first: first.name.clone(),
                    second: decl.name().to_string(),
                });
            }
            debug!(module = %directive.module, name = decl.name(), "matched");
            found = Some(Matched {
                name: decl.name().to_string(),
                fact: render(decl)?,
            });
            Ok(Visit::Continue)
        },
    )?;

    if found.is_none() {
        debug!(module = %directive.module, "no declaration matched");
    }
    Ok(found)
}

/// Render one row per accepted declaration, in traversal order.
pub fn enumerate_all<F>(
    session: &dyn QuerySession,
    directive: &Directive,
    rules: MatchRules<'_>,
    mut render: F,
) -> Result<Vec<String>, ExtractionError>
where
    F: FnMut(&dyn Declaration) -> Result<String, ExtractionError>,
{
    let mut rows = Vec::new();

    session.visit(
        directive.config.kind_hint(rules.default_kinds),
        &mut |decl| {
            if accepted(decl, directive, &rules) {
                rows.push(render(decl)?);
            }
            Ok(Visit::Continue)
        },
    )?;

    debug!(module = %directive.module, rows = rows.len(), "enumerated");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splice::query::{AstService, ParseRequest};
    use crate::splice::testing::{DeclBuilder, FixtureAst};

    const STRUCTS: MatchRules<'static> = MatchRules {
        default_kinds: &[NodeKind::StructDecl],
        definitions_only: true,
    };

    fn run_exactly_one(
        ast: FixtureAst,
        line: &str,
    ) -> Result<Option<Matched>, ExtractionError> {
        let service = ast.service();
        let directive = Directive::parse(line).unwrap();
        let session = service
            .open(&ParseRequest::new(directive.headers.clone()))
            .unwrap();
        exactly_one(session.as_ref(), &directive, STRUCTS, |decl| {
            Ok(decl.name().to_uppercase())
        })
    }

    #[test]
    fn test_single_match() {
        let ast = FixtureAst::new("x86_64-linux-gnu").header(
            "a.h",
            [
                DeclBuilder::structure("stat").build(),
                DeclBuilder::structure("statfs").build(),
            ],
        );
        let matched = run_exactly_one(ast, "x -p stat a.h").unwrap();
        assert_eq!(
            matched,
            Some(Matched {
                name: "stat".into(),
                fact: "STAT".into()
            })
        );
    }

    #[test]
    fn test_forward_declarations_are_skipped() {
        let ast = FixtureAst::new("x86_64-linux-gnu").header(
            "a.h",
            [
                DeclBuilder::structure("stat").forward().build(),
                DeclBuilder::structure("stat").build(),
            ],
        );
        assert!(run_exactly_one(ast, "x -p stat a.h").unwrap().is_some());
    }

    #[test]
    fn test_second_match_is_an_error() {
        let ast = FixtureAst::new("x86_64-linux-gnu").header(
            "a.h",
            [
                DeclBuilder::structure("stat").build(),
                DeclBuilder::structure("stat64").build(),
            ],
        );
        let err = run_exactly_one(ast, "x -p stat.* a.h").unwrap_err();
        assert_eq!(
            err,
            ExtractionError::MultipleMatches {
                first: "stat".into(),
                second: "stat64".into()
            }
        );
    }

    #[test]
    fn test_zero_matches_is_not_an_error() {
        let ast = FixtureAst::new("x86_64-linux-gnu")
            .header("a.h", [DeclBuilder::typedef("stat").build()]);
        assert_eq!(run_exactly_one(ast, "x -p stat a.h").unwrap(), None);
    }

    #[test]
    fn test_enumerate_all_keeps_traversal_order() {
        let service = FixtureAst::new("x86_64-linux-gnu")
            .header(
                "a.h",
                [
                    DeclBuilder::structure("zeta").build(),
                    DeclBuilder::structure("alpha").build(),
                    DeclBuilder::structure("mid").build(),
                ],
            )
            .service();
        let directive = Directive::parse("x -x mid a.h").unwrap();
        let session = service
            .open(&ParseRequest::new(directive.headers.clone()))
            .unwrap();
        let rows = enumerate_all(session.as_ref(), &directive, STRUCTS, |decl| {
            Ok(decl.name().to_string())
        })
        .unwrap();
        assert_eq!(rows, vec!["zeta".to_string(), "alpha".to_string()]);
    }
}
