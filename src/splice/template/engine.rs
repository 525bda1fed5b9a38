//! Template substitution engine

use crate::splice::config::SpliceConfig;
use crate::splice::directive::Directive;
use crate::splice::error::{ExtractionError, TemplateError};
use crate::splice::modules::{Emission, ModuleRegistry};
use crate::splice::query::AstService;
use crate::splice::template::scanner::{scan, Block, Markers, Segment};
use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;
use tracing::info;

static DEFAULT_REGISTRY: Lazy<ModuleRegistry> = Lazy::new(ModuleRegistry::with_defaults);

/// Renders templates against an AST service.
///
/// Rendering is fail-fast: the first failing directive aborts the whole
/// template and no output is returned.
pub struct TemplateEngine<'a> {
    service: &'a dyn AstService,
    registry: &'a ModuleRegistry,
    markers: Markers,
    largefile_defines: Vec<(String, String)>,
}

impl<'a> TemplateEngine<'a> {
    /// Engine with the built-in modules, using the markers and `-A` defines
    /// of a loaded configuration.
    pub fn with_config(
        service: &'a dyn AstService,
        config: &SpliceConfig,
    ) -> Result<Self, ExtractionError> {
        Ok(Self {
            service,
            registry: &DEFAULT_REGISTRY,
            markers: Markers::from(&config.template),
            largefile_defines: config.query.largefile_defines()?,
        })
    }

    pub fn with_registry(mut self, registry: &'a ModuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn render(&self, source: &str) -> Result<String, TemplateError> {
        let segments = scan(source, &self.markers)?;
        let mut output = String::with_capacity(source.len());
        let mut blocks = 0;
        let mut directives = 0;

        for segment in segments {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Block(block) => {
                    blocks += 1;
                    directives += block.directives.len();
                    for line in self.render_block(&block)? {
                        output.push_str(&line);
                        output.push('\n');
                    }
                }
            }
        }

        info!(blocks, directives, "rendered template");
        Ok(output)
    }

    pub fn render_file(&self, path: impl AsRef<Path>) -> Result<String, TemplateError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.render(&source)
    }

    /// Output lines of one block, composite runs already joined.
    fn render_block(&self, block: &Block) -> Result<Vec<String>, TemplateError> {
        let mut lines = Vec::new();
        let mut composite_run: Vec<String> = Vec::new();

        for line in &block.directives {
            let emission = self
                .evaluate(&line.text)
                .map_err(|source| TemplateError::Directive {
                    line: line.line,
                    directive: line.text.clone(),
                    source,
                })?;
            if emission.is_empty() {
                continue;
            }
            if emission.composite {
                composite_run.extend(emission.rows);
            } else {
                flush_composite(&mut composite_run, &mut lines);
                lines.extend(emission.rows);
            }
        }
        flush_composite(&mut composite_run, &mut lines);

        Ok(lines)
    }

    fn evaluate(&self, text: &str) -> Result<Emission, ExtractionError> {
        let directive = Directive::parse(text)?;
        self.registry
            .evaluate(self.service, &directive, &self.largefile_defines)
    }
}

fn flush_composite(run: &mut Vec<String>, lines: &mut Vec<String>) {
    if !run.is_empty() {
        lines.push(run.join(","));
        run.clear();
    }
}
