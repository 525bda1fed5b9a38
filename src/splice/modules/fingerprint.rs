//! `fingerprint`: the `os-arch` fingerprint of the target the headers were
//! parsed for, to be checked by the artifact through
//! [`crate::splice::guard`].

use crate::splice::directive::Directive;
use crate::splice::error::ExtractionError;
use crate::splice::guard::Fingerprint;
use crate::splice::modules::{
    reject_flag, validate_common, Cardinality, Emission, ExtractionModule,
};
use crate::splice::property::quote;
use crate::splice::query::QuerySession;

pub struct FingerprintModule;

impl ExtractionModule for FingerprintModule {
    fn name(&self) -> &str {
        "fingerprint"
    }

    fn description(&self) -> &str {
        "Platform fingerprint (os-arch) of the parsing target"
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::NoDeclarations
    }

    fn validate(&self, directive: &Directive) -> Result<(), ExtractionError> {
        validate_common(self.name(), self.cardinality(), directive)?;
        let config = &directive.config;
        reject_flag(self.name(), !config.include.is_empty(), "-p")?;
        reject_flag(self.name(), config.composite, "-C")?;
        reject_flag(self.name(), config.property.is_some(), "-a")
    }

    fn evaluate(
        &self,
        session: &dyn QuerySession,
        directive: &Directive,
    ) -> Result<Emission, ExtractionError> {
        let fingerprint = Fingerprint::from_triple(session.target_triple())?.to_string();
        let row = if directive.config.quote {
            quote(&fingerprint)
        } else {
            fingerprint
        };
        Ok(Emission::rows(vec![row], &directive.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splice::modules::ModuleRegistry;
    use crate::splice::testing::FixtureAst;

    fn evaluate(target: &str, line: &str) -> Result<Emission, ExtractionError> {
        let service = FixtureAst::new(target).header("stddef.h", []).service();
        let directive = Directive::parse(line).unwrap();
        ModuleRegistry::with_defaults().evaluate(&service, &directive, &[])
    }

    #[test]
    fn test_fingerprint_of_target() {
        let emission = evaluate("x86_64-pc-linux-gnu", "fingerprint stddef.h").unwrap();
        assert_eq!(emission.rows, vec!["linux-x64".to_string()]);
    }

    #[test]
    fn test_quoted_fingerprint() {
        let emission = evaluate("aarch64-unknown-linux-gnu", "fingerprint -Q stddef.h").unwrap();
        assert_eq!(emission.rows, vec!["\"linux-arm64\"".to_string()]);
    }

    #[test]
    fn test_unknown_target_is_query_error() {
        let err = evaluate("wasm32-unknown-unknown", "fingerprint stddef.h").unwrap_err();
        assert_eq!(err.kind(), "QueryError");
    }
}
