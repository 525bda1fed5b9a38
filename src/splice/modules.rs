//! Extraction modules
//!
//! Each directive names a module. A module walks the declarations of a
//! query session, filters them with the directive's [`FilterConfig`],
//! enforces its cardinality and renders the matched facts as rows:
//!
//! | module        | cardinality   | emits                                     |
//! |---------------|---------------|-------------------------------------------|
//! | `sizeof`      | exactly one   | byte size of a struct/union/typedef       |
//! | `property`    | exactly one   | the `-a` property (size/alignment/offset) |
//! | `struct`      | exactly one   | the struct body tokens                    |
//! | `opaque`      | exactly one   | a same-size same-alignment placeholder    |
//! | `dialect`     | one per variant | a dialect-resolved layout fact          |
//! | `macro`       | all           | one row per macro definition              |
//! | `enum`        | all           | one row per enum constant                 |
//! | `fingerprint` | none          | `os-arch` of the parsed target            |
//!
//! Exactly-one modules treat zero matches as an empty result, which is how a
//! declaration missing from one library dialect shows up; a second match is
//! an error.
//!
//! Modules are registered by name in a [`ModuleRegistry`].

pub mod cardinality;
pub mod dialect_offset;
pub mod enum_table;
pub mod fingerprint;
pub mod macro_body;
pub mod opaque;
pub mod property_of;
pub mod size_of;
pub mod struct_tokens;

pub use cardinality::{enumerate_all, exactly_one, MatchRules, Matched};
pub use dialect_offset::DialectOffset;
pub use enum_table::EnumTable;
pub use fingerprint::FingerprintModule;
pub use macro_body::MacroBody;
pub use opaque::OpaqueSurrogate;
pub use property_of::PropertyOf;
pub use size_of::SizeOf;
pub use struct_tokens::StructTokens;

use crate::splice::directive::{Directive, FilterConfig};
use crate::splice::error::ExtractionError;
use crate::splice::property::format_row;
use crate::splice::query::{AstService, NodeKind, QuerySession};
use std::collections::HashMap;
use tracing::debug;

/// How many declarations a module expects to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    ExactlyOne,
    EnumerateAll,
    /// The module does not look at declarations.
    NoDeclarations,
}

/// Rows produced by one directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emission {
    pub rows: Vec<String>,
    /// Rows are `[name]=value` cells to be comma-joined with neighbouring
    /// composite rows of the same block.
    pub composite: bool,
}

impl Emission {
    pub fn rows(rows: Vec<String>, config: &FilterConfig) -> Self {
        Self {
            rows,
            composite: config.composite,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Single row from an exactly-one match, `[name]=value` in composite mode.
    pub fn from_match(matched: Option<Matched>, config: &FilterConfig) -> Self {
        let rows = matched
            .map(|m| {
                if config.composite {
                    format_row(&m.name, &m.fact, config)
                } else {
                    m.fact
                }
            })
            .into_iter()
            .collect();
        Self::rows(rows, config)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An extraction mode.
pub trait ExtractionModule: Send + Sync {
    /// Name used in directive lines.
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn cardinality(&self) -> Cardinality;

    /// Kinds considered when the directive has no `-w`. Empty means all.
    fn default_kinds(&self) -> &[NodeKind] {
        &[]
    }

    /// Check the directive before any query work is done.
    fn validate(&self, directive: &Directive) -> Result<(), ExtractionError> {
        validate_common(self.name(), self.cardinality(), directive)
    }

    fn evaluate(
        &self,
        session: &dyn QuerySession,
        directive: &Directive,
    ) -> Result<Emission, ExtractionError>;
}

/// Checks shared by all modules: exactly-one modules need a name pattern and
/// positional arguments are only accepted where a module asks for them.
pub fn validate_common(
    module: &str,
    cardinality: Cardinality,
    directive: &Directive,
) -> Result<(), ExtractionError> {
    if cardinality == Cardinality::ExactlyOne && directive.config.include.is_empty() {
        return Err(ExtractionError::malformed(format!(
            "module '{module}' needs at least one -p name pattern"
        )));
    }
    if !directive.user_args.is_empty() {
        return Err(ExtractionError::malformed(format!(
            "module '{module}' takes no positional arguments, got {}",
            directive.user_args.len()
        )));
    }
    Ok(())
}

pub(crate) fn reject_flag(
    module: &str,
    present: bool,
    flag: &str,
) -> Result<(), ExtractionError> {
    if present {
        return Err(ExtractionError::invalid(format!(
            "module '{module}' does not accept {flag}"
        )));
    }
    Ok(())
}

/// Registry of extraction modules, keyed by name.
pub struct ModuleRegistry {
    modules: HashMap<String, Box<dyn ExtractionModule>>,
}

impl ModuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        ModuleRegistry {
            modules: HashMap::new(),
        }
    }

    /// Register a module, replacing any module of the same name.
    pub fn register<M: ExtractionModule + 'static>(&mut self, module: M) {
        self.modules
            .insert(module.name().to_string(), Box::new(module));
    }

    pub fn get(&self, name: &str) -> Option<&dyn ExtractionModule> {
        self.modules.get(name).map(|m| m.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// All module names (sorted)
    pub fn list_modules(&self) -> Vec<&dyn ExtractionModule> {
        let mut modules: Vec<_> = self.modules.values().map(|m| m.as_ref()).collect();
        modules.sort_by(|a, b| a.name().cmp(b.name()));
        modules
    }

    /// Registry with all built-in modules.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(SizeOf);
        registry.register(PropertyOf);
        registry.register(MacroBody);
        registry.register(StructTokens);
        registry.register(OpaqueSurrogate);
        registry.register(FingerprintModule);
        registry.register(EnumTable);
        registry.register(DialectOffset::default());

        registry
    }

    /// Evaluate one directive: validate it, open a query session for its
    /// headers and defines, and run the module. The session is dropped before
    /// returning, so no declaration outlives the evaluation.
    pub fn evaluate(
        &self,
        service: &dyn AstService,
        directive: &Directive,
        largefile_defines: &[(String, String)],
    ) -> Result<Emission, ExtractionError> {
        let module = self.get(&directive.module).ok_or_else(|| {
            ExtractionError::malformed(format!("unknown module '{}'", directive.module))
        })?;
        module.validate(directive)?;

        let request = directive.request(largefile_defines);
        debug!(
            module = module.name(),
            headers = ?request.headers,
            defines = ?request.defines,
            "evaluating directive"
        );

        let session = service.open(&request)?;
        let emission = module.evaluate(session.as_ref(), directive)?;
        debug!(module = module.name(), rows = emission.rows.len(), "directive done");
        Ok(emission)
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splice::testing::{DeclBuilder, FixtureAst};

    struct EchoModule;
    impl ExtractionModule for EchoModule {
        fn name(&self) -> &str {
            "echo"
        }
        fn cardinality(&self) -> Cardinality {
            Cardinality::NoDeclarations
        }
        fn evaluate(
            &self,
            session: &dyn QuerySession,
            directive: &Directive,
        ) -> Result<Emission, ExtractionError> {
            Ok(Emission::rows(
                vec![session.target_triple().to_string()],
                &directive.config,
            ))
        }
    }

    fn ast() -> FixtureAst {
        FixtureAst::new("x86_64-pc-linux-gnu").header(
            "sys/types.h",
            [DeclBuilder::typedef("pid_t").layout(4, 4).build()],
        )
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = ModuleRegistry::with_defaults();
        let names: Vec<&str> = registry.list_modules().iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            vec![
                "dialect",
                "enum",
                "fingerprint",
                "macro",
                "opaque",
                "property",
                "sizeof",
                "struct"
            ]
        );
    }

    #[test]
    fn test_register_custom_module() {
        let mut registry = ModuleRegistry::new();
        registry.register(EchoModule);
        assert!(registry.has("echo"));

        let service = ast().service();
        let directive = Directive::parse("echo sys/types.h").unwrap();
        let emission = registry.evaluate(&service, &directive, &[]).unwrap();
        assert_eq!(emission.rows, vec!["x86_64-pc-linux-gnu".to_string()]);
    }

    #[test]
    fn test_unknown_module_is_malformed() {
        let registry = ModuleRegistry::with_defaults();
        let service = ast().service();
        let directive = Directive::parse("offsetof -p pid_t sys/types.h").unwrap();
        let err = registry.evaluate(&service, &directive, &[]).unwrap_err();
        assert_eq!(err.kind(), "MalformedDirective");
    }

    #[test]
    fn test_validation_runs_before_query() {
        let registry = ModuleRegistry::with_defaults();
        let service = ast().service();
        // The header does not exist; validation must fail first.
        let directive = Directive::parse("sizeof missing.h").unwrap();
        let err = registry.evaluate(&service, &directive, &[]).unwrap_err();
        assert_eq!(err.kind(), "MalformedDirective");
    }

    #[test]
    fn test_missing_header_is_query_error() {
        let registry = ModuleRegistry::with_defaults();
        let service = ast().service();
        let directive = Directive::parse("sizeof -p pid_t missing.h").unwrap();
        let err = registry.evaluate(&service, &directive, &[]).unwrap_err();
        assert_eq!(err.kind(), "QueryError");
    }
}
