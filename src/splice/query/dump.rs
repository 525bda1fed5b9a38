//! Declaration-dump backed AST service
//!
//! A dump is what a compiler frontend reports for a set of headers, captured
//! once: the target triple plus, per header, the declarations in source order
//! with their layout facts and tokens. Declarations that are only visible
//! under certain preprocessor conditions carry a `when` map, evaluated
//! against the defines of each parse request.
//!
//! ```yaml
//! target: x86_64-pc-linux-gnu
//! headers:
//!   /usr/include/dirent.h:
//!     - kind: StructDecl
//!       name: dirent
//!       layout: { size: 280, align: 8, fields: [{ name: d_name, offset: 19 }] }
//!     - kind: StructDecl
//!       name: dirent64
//!       when: { _LARGEFILE64_SOURCE: "1" }
//! ```

use crate::splice::error::{ExtractionError, QueryError};
use crate::splice::query::{
    AstService, Declaration, NodeKind, ParseRequest, QuerySession, TypeLayout, Visit,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serialized form of everything the frontend reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarationDump {
    pub target: String,
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<DeclRecord>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclRecord {
    pub kind: NodeKind,
    pub name: String,
    #[serde(default = "default_definition")]
    pub definition: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub when: BTreeMap<String, String>,
}

fn default_definition() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    pub size: i64,
    pub align: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub name: String,
    pub offset: i64,
}

impl DeclRecord {
    fn visible_under(&self, request: &ParseRequest) -> bool {
        self.when
            .iter()
            .all(|(name, value)| request.define(name) == Some(value.as_str()))
    }
}

impl TypeLayout for LayoutRecord {
    fn size(&self) -> i64 {
        self.size
    }

    fn alignment(&self) -> i64 {
        self.align
    }

    fn offset_of(&self, member: &str) -> i64 {
        self.fields
            .iter()
            .find(|field| field.name == member)
            .map_or(-1, |field| field.offset)
    }
}

impl Declaration for DeclRecord {
    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_definition(&self) -> bool {
        self.definition
    }

    fn enum_name(&self) -> Option<&str> {
        self.enum_name.as_deref().filter(|name| !name.is_empty())
    }

    fn value(&self) -> Option<i64> {
        self.value
    }

    fn layout(&self) -> Option<&dyn TypeLayout> {
        self.layout.as_ref().map(|layout| layout as &dyn TypeLayout)
    }

    fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// AST service answering from a [`DeclarationDump`].
#[derive(Debug, Clone)]
pub struct DumpService {
    dump: DeclarationDump,
    include_paths: Vec<PathBuf>,
}

impl DumpService {
    pub fn new(dump: DeclarationDump) -> Self {
        Self {
            dump,
            include_paths: Vec::new(),
        }
    }

    /// Load a dump file; `.yaml`/`.yml` files are read as YAML, anything else
    /// as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, QueryError> {
        let path = path.as_ref();
        let load_error = |message: String| QueryError::Load {
            path: path.display().to_string(),
            message,
        };

        let content = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let is_yaml = path
            .extension()
            .map(|ext| ext == "yaml" || ext == "yml")
            .unwrap_or(false);

        let dump = if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| load_error(e.to_string()))?
        } else {
            serde_json::from_str(&content).map_err(|e| load_error(e.to_string()))?
        };
        Ok(Self::new(dump))
    }

    pub fn with_include_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.include_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn dump(&self) -> &DeclarationDump {
        &self.dump
    }

    /// Find the dump key for a header: the path itself first, then each
    /// include directory in order.
    fn resolve(&self, header: &Path) -> Option<&str> {
        let direct = header.to_string_lossy();
        if let Some((key, _)) = self.dump.headers.get_key_value(direct.as_ref()) {
            return Some(key.as_str());
        }
        if header.is_absolute() {
            return None;
        }
        self.include_paths.iter().find_map(|dir| {
            let candidate = dir.join(header);
            self.dump
                .headers
                .get_key_value(candidate.to_string_lossy().as_ref())
                .map(|(key, _)| key.as_str())
        })
    }
}

impl AstService for DumpService {
    fn open(&self, request: &ParseRequest) -> Result<Box<dyn QuerySession + '_>, QueryError> {
        let mut keys: Vec<&str> = Vec::new();
        for header in &request.headers {
            let key = self
                .resolve(header)
                .ok_or_else(|| QueryError::HeaderNotFound(header.display().to_string()))?;
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        let decls: Vec<&DeclRecord> = keys
            .iter()
            .flat_map(|key| self.dump.headers[*key].iter())
            .filter(|decl| decl.visible_under(request))
            .collect();

        debug!(headers = ?keys, visible = decls.len(), "opened dump session");
        Ok(Box::new(DumpSession {
            target: &self.dump.target,
            decls,
        }))
    }
}

struct DumpSession<'a> {
    target: &'a str,
    decls: Vec<&'a DeclRecord>,
}

impl QuerySession for DumpSession<'_> {
    fn target_triple(&self) -> &str {
        self.target
    }

    fn visit(
        &self,
        kind: Option<NodeKind>,
        visitor: &mut dyn FnMut(&dyn Declaration) -> Result<Visit, ExtractionError>,
    ) -> Result<(), ExtractionError> {
        for decl in &self.decls {
            if kind.is_some_and(|k| k != decl.kind) {
                continue;
            }
            if visitor(*decl)? == Visit::Break {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIRENT_YAML: &str = r#"
target: x86_64-pc-linux-gnu
headers:
  /usr/include/dirent.h:
    - kind: StructDecl
      name: dirent
      layout:
        size: 280
        align: 8
        fields:
          - { name: d_ino, offset: 0 }
          - { name: d_name, offset: 19 }
    - kind: StructDecl
      name: dirent64
      when: { _LARGEFILE64_SOURCE: "1" }
      layout: { size: 280, align: 8, fields: [{ name: d_name, offset: 19 }] }
"#;

    fn service() -> DumpService {
        DumpService::new(serde_yaml::from_str(DIRENT_YAML).unwrap())
    }

    fn names(service: &DumpService, request: &ParseRequest) -> Vec<String> {
        let session = service.open(request).unwrap();
        let mut names = Vec::new();
        session
            .visit(None, &mut |decl| {
                names.push(decl.name().to_string());
                Ok(Visit::Continue)
            })
            .unwrap();
        names
    }

    #[test]
    fn test_conditional_declarations_follow_defines() {
        let service = service();
        let plain = ParseRequest::new(vec!["/usr/include/dirent.h".into()]);
        assert_eq!(names(&service, &plain), vec!["dirent"]);

        let largefile = plain.clone().with_define("_LARGEFILE64_SOURCE", "1");
        assert_eq!(names(&service, &largefile), vec!["dirent", "dirent64"]);
    }

    #[test]
    fn test_relative_headers_resolve_through_include_paths() {
        let service = service().with_include_paths(["/opt/include", "/usr/include"]);
        let request = ParseRequest::new(vec!["dirent.h".into()]);
        assert_eq!(names(&service, &request), vec!["dirent"]);
    }

    #[test]
    fn test_unknown_header_is_a_query_error() {
        let service = service();
        let request = ParseRequest::new(vec!["missing.h".into()]);
        let opened = service.open(&request);
        match opened {
            Err(QueryError::HeaderNotFound(header)) => assert_eq!(header, "missing.h"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected HeaderNotFound"),
        }
    }

    #[test]
    fn test_layout_answers_negative_for_unknown_member() {
        let service = service();
        let record = &service.dump().headers["/usr/include/dirent.h"][0];
        let layout = record.layout().unwrap();
        assert_eq!(layout.offset_of("d_name"), 19);
        assert_eq!(layout.offset_of("d_type"), -1);
    }

    #[test]
    fn test_visit_stops_on_break() {
        let service = service();
        let request = ParseRequest::new(vec!["/usr/include/dirent.h".into()])
            .with_define("_LARGEFILE64_SOURCE", "1");
        let session = service.open(&request).unwrap();
        let mut seen = 0;
        session
            .visit(Some(NodeKind::StructDecl), &mut |_| {
                seen += 1;
                Ok(Visit::Break)
            })
            .unwrap();
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_json_dump_loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decls.json");
        let dump: DeclarationDump = serde_yaml::from_str(DIRENT_YAML).unwrap();
        fs::write(&path, serde_json::to_string(&dump).unwrap()).unwrap();

        let loaded = DumpService::from_path(&path).unwrap();
        assert_eq!(loaded.dump(), &dump);
    }
}
