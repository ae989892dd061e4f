//! File-based backend

// Standard library
use std::fmt;
use std::path::{Path, PathBuf};

// External dependencies
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;

// Internal crates
use super::{Backend, Decode};
use crate::core::{BackendError, BackendResult, Field, LoadContext};

/// Document format of a configuration file
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// JSON
    Json,
    /// YAML
    Yaml,
    /// TOML
    Toml,
}

impl FileFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Parse a document into a JSON value
    pub fn parse(self, content: &str) -> Result<Value, String> {
        match self {
            Self::Json => serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}")),
            Self::Yaml => {
                serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))
            }
            Self::Toml => toml::from_str(content).map_err(|e| format!("TOML parse error: {e}")),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
        })
    }
}

/// Backend serving values from a JSON, YAML or TOML document.
///
/// The file is read on first use and kept for the lifetime of the backend.
/// A key is looked up as a top-level member first, then as a dotted path
/// (`database.port`). `null` values count as absent.
#[derive(Debug)]
pub struct FileBackend {
    name: String,
    path: PathBuf,
    format: Option<FileFormat>,
    optional: bool,
    document: OnceCell<Value>,
}

impl FileBackend {
    /// Default backend name
    pub const NAME: &'static str = "file";

    /// Create a backend reading `path`; the file must exist
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            name: Self::NAME.to_string(),
            path: path.into(),
            format: None,
            optional: false,
            document: OnceCell::new(),
        }
    }

    /// Treat a missing file as an empty document
    #[must_use = "builder methods must be chained or built"]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Override the backend name
    #[must_use = "builder methods must be chained or built"]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override format detection
    #[must_use = "builder methods must be chained or built"]
    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn document(&self) -> BackendResult<&Value> {
        self.document.get_or_try_init(|| self.read()).await
    }

    async fn read(&self) -> BackendResult<Value> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && self.optional => {
                tracing::debug!(
                    path = %self.path.display(),
                    "configuration file not found, using empty document"
                );
                return Ok(Value::Object(serde_json::Map::new()));
            }
            Err(e) => {
                return Err(BackendError::source_error(format!(
                    "failed to read configuration file {}: {e}",
                    self.path.display()
                )));
            }
        };

        let format = self
            .format
            .or_else(|| FileFormat::from_path(&self.path))
            .ok_or_else(|| {
                BackendError::source_error(format!(
                    "cannot detect format of configuration file {}",
                    self.path.display()
                ))
            })?;

        let document = format.parse(&content).map_err(|message| {
            BackendError::source_error(format!("{}: {message}", self.path.display()))
        })?;
        tracing::debug!(path = %self.path.display(), %format, "loaded configuration file");
        Ok(document)
    }

    async fn lookup(&self, key: &str) -> BackendResult<&Value> {
        let document = self.document().await?;
        let value = document
            .get(key)
            .or_else(|| lookup_path(document, key))
            .ok_or(BackendError::NotFound)?;

        if value.is_null() {
            return Err(BackendError::NotFound);
        }
        Ok(value)
    }
}

/// Follow a dotted path through nested objects
fn lookup_path<'v>(document: &'v Value, key: &str) -> Option<&'v Value> {
    if !key.contains('.') {
        return None;
    }
    key.split('.')
        .try_fold(document, |value, segment| value.as_object()?.get(segment))
}

/// Textual form handed to the type converter
fn render(value: &Value) -> BackendResult<Vec<u8>> {
    match value {
        Value::String(text) => Ok(text.clone().into_bytes()),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_vec(value).map_err(BackendError::decode)
        }
        other => Ok(other.to_string().into_bytes()),
    }
}

#[async_trait]
impl Backend for FileBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _ctx: &LoadContext, key: &str) -> BackendResult<Vec<u8>> {
        render(self.lookup(key).await?)
    }

    fn decoder(&self) -> Option<&dyn Decode> {
        Some(self)
    }
}

#[async_trait]
impl Decode for FileBackend {
    async fn decode(
        &self,
        _ctx: &LoadContext,
        key: &str,
        target: &mut dyn Field,
    ) -> BackendResult<()> {
        let value = self.lookup(key).await?;
        target
            .set_decoded(value.clone())
            .map_err(|e| BackendError::decode(format!("key {key:?} into {}: {e}", target.kind())))
    }
}
