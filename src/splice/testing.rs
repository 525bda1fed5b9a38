//! Builders for declaration fixtures
//!
//! Tests describe headers in code rather than through dump files:
//!
//! ```rust,ignore
//! use declsplice::splice::testing::{DeclBuilder, FixtureAst};
//!
//! let ast = FixtureAst::new("x86_64-pc-linux-gnu")
//!     .header("time.h", [DeclBuilder::typedef("time_t").layout(8, 8).build()])
//!     .service();
//! ```

use crate::splice::query::dump::{DeclRecord, DeclarationDump, FieldRecord, LayoutRecord};
use crate::splice::query::{DumpService, NodeKind};
use std::collections::BTreeMap;

/// Fluent builder for a single [`DeclRecord`].
#[derive(Debug, Clone)]
pub struct DeclBuilder {
    record: DeclRecord,
}

impl DeclBuilder {
    pub fn new(kind: NodeKind, name: &str) -> Self {
        Self {
            record: DeclRecord {
                kind,
                name: name.to_string(),
                definition: true,
                enum_name: None,
                value: None,
                layout: None,
                tokens: Vec::new(),
                when: BTreeMap::new(),
            },
        }
    }

    pub fn structure(name: &str) -> Self {
        Self::new(NodeKind::StructDecl, name)
    }

    pub fn typedef(name: &str) -> Self {
        Self::new(NodeKind::TypedefDecl, name)
    }

    pub fn macro_def(name: &str, tokens: &[&str]) -> Self {
        Self::new(NodeKind::MacroDefinition, name).tokens(tokens)
    }

    pub fn enum_constant(name: &str, value: i64) -> Self {
        let mut builder = Self::new(NodeKind::EnumConstantDecl, name);
        builder.record.value = Some(value);
        builder
    }

    pub fn layout(mut self, size: i64, align: i64) -> Self {
        self.record.layout = Some(LayoutRecord {
            size,
            align,
            fields: Vec::new(),
        });
        self
    }

    /// Add a member offset; requires [`DeclBuilder::layout`] first.
    pub fn field(mut self, name: &str, offset: i64) -> Self {
        if let Some(layout) = self.record.layout.as_mut() {
            layout.fields.push(FieldRecord {
                name: name.to_string(),
                offset,
            });
        }
        self
    }

    pub fn tokens(mut self, tokens: &[&str]) -> Self {
        self.record.tokens = tokens.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn in_enum(mut self, name: &str) -> Self {
        self.record.enum_name = Some(name.to_string());
        self
    }

    /// Mark as a forward declaration.
    pub fn forward(mut self) -> Self {
        self.record.definition = false;
        self
    }

    /// Only visible when `name` is defined to `value`.
    pub fn when(mut self, name: &str, value: &str) -> Self {
        self.record.when.insert(name.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> DeclRecord {
        self.record
    }
}

/// In-memory declaration dump.
#[derive(Debug, Clone)]
pub struct FixtureAst {
    dump: DeclarationDump,
}

impl FixtureAst {
    pub fn new(target: &str) -> Self {
        Self {
            dump: DeclarationDump {
                target: target.to_string(),
                headers: BTreeMap::new(),
            },
        }
    }

    pub fn header<I>(mut self, path: &str, decls: I) -> Self
    where
        I: IntoIterator<Item = DeclRecord>,
    {
        self.dump
            .headers
            .entry(path.to_string())
            .or_default()
            .extend(decls);
        self
    }

    pub fn dump(&self) -> &DeclarationDump {
        &self.dump
    }

    pub fn service(self) -> DumpService {
        DumpService::new(self.dump)
    }
}
