//! Format registry: maps a format name to its import, export and detection functions.

use crate::book::Databook;
use crate::dataset::Dataset;
use crate::error::{DatasetError, Result};
use crate::formats;
use crate::options::FormatOptions;
use indexmap::IndexMap;
use std::sync::OnceLock;
use tracing::debug;

pub type ExportSetFn = fn(&Dataset, &FormatOptions) -> Result<Payload>;
pub type ImportSetFn = fn(&mut Dataset, &[u8], &FormatOptions) -> Result<()>;
pub type ExportBookFn = fn(&Databook, &FormatOptions) -> Result<Payload>;
pub type ImportBookFn = fn(&mut Databook, &[u8], &FormatOptions) -> Result<()>;
pub type DetectFn = fn(&[u8]) -> bool;

/// Exported content: text formats produce `Text`, spreadsheets produce `Binary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Binary(bytes) => bytes,
        }
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Text(text) => text.into_bytes(),
            Payload::Binary(bytes) => bytes,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Binary(_) => None,
        }
    }

    /// Text content; binary payloads must be valid UTF-8
    pub fn into_text(self) -> Result<String> {
        match self {
            Payload::Text(text) => Ok(text),
            Payload::Binary(bytes) => Ok(std::str::from_utf8(&bytes)?.to_string()),
        }
    }
}

/// The function set bound to one format name
#[derive(Debug, Clone)]
pub struct FormatHandler {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
    pub export_set: Option<ExportSetFn>,
    pub import_set: Option<ImportSetFn>,
    pub export_book: Option<ExportBookFn>,
    pub import_book: Option<ImportBookFn>,
    pub detect: Option<DetectFn>,
}

impl FormatHandler {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        FormatHandler {
            name,
            extensions: &[],
            export_set: None,
            import_set: None,
            export_book: None,
            import_book: None,
            detect: None,
        }
    }

    #[must_use]
    pub fn with_extensions(mut self, extensions: &'static [&'static str]) -> Self {
        self.extensions = extensions;
        self
    }

    #[must_use]
    pub fn with_export_set(mut self, f: ExportSetFn) -> Self {
        self.export_set = Some(f);
        self
    }

    #[must_use]
    pub fn with_import_set(mut self, f: ImportSetFn) -> Self {
        self.import_set = Some(f);
        self
    }

    #[must_use]
    pub fn with_export_book(mut self, f: ExportBookFn) -> Self {
        self.export_book = Some(f);
        self
    }

    #[must_use]
    pub fn with_import_book(mut self, f: ImportBookFn) -> Self {
        self.import_book = Some(f);
        self
    }

    #[must_use]
    pub fn with_detect(mut self, f: DetectFn) -> Self {
        self.detect = Some(f);
        self
    }

    /// True if the format has a book-level exporter or importer
    #[must_use]
    pub fn supports_book(&self) -> bool {
        self.export_book.is_some() || self.import_book.is_some()
    }
}

/// Ordered table of format handlers. Registration order is detection priority.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    handlers: IndexMap<&'static str, FormatHandler>,
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

impl Registry {
    /// An empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in format
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Registry::new();
        // Built-in names are unique
        for handler in formats::builtin_handlers() {
            registry.handlers.insert(handler.name, handler);
        }
        registry
    }

    /// The process-wide registry, built with the built-in formats on first use
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::with_builtins)
    }

    /// Replace the process-wide registry. Must run before the first call to
    /// [`Registry::global`]; otherwise the rejected registry is handed back.
    pub fn install(registry: Registry) -> std::result::Result<(), Registry> {
        GLOBAL.set(registry)
    }

    pub fn register(&mut self, handler: FormatHandler) -> Result<()> {
        if self.handlers.contains_key(handler.name) {
            return Err(DatasetError::DuplicateFormat(handler.name.to_string()));
        }
        debug!(format = handler.name, book = handler.supports_book(), "registered format");
        self.handlers.insert(handler.name, handler);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormatHandler> {
        self.handlers.get(name)
    }

    /// Registered names in priority order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    /// Names of formats usable with a databook
    pub fn book_formats(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers
            .values()
            .filter(|h| h.supports_book())
            .map(|h| h.name)
    }

    /// Format registered for a file extension (case-insensitive, without the dot)
    #[must_use]
    pub fn for_extension(&self, extension: &str) -> Option<&FormatHandler> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self.handlers
            .values()
            .find(|h| h.extensions.iter().any(|e| *e == extension))
    }

    /// Name of the first format whose detector accepts `input`
    #[must_use]
    pub fn detect_format(&self, input: &[u8]) -> Option<&'static str> {
        let found = self
            .handlers
            .values()
            .find(|h| h.detect.is_some_and(|detect| detect(input)))
            .map(|h| h.name);
        debug!(format = ?found, bytes = input.len(), "format detection");
        found
    }

    /// Resolve an explicit or detected format name
    pub fn resolve(&self, input: &[u8], format: Option<&str>) -> Result<&FormatHandler> {
        let name = match format {
            Some(name) => name,
            None => self.detect_format(input).ok_or_else(|| {
                DatasetError::UnsupportedFormat("could not detect the input format".to_string())
            })?,
        };
        self.get(name)
            .ok_or_else(|| DatasetError::UnsupportedFormat(format!("unknown format '{name}'")))
    }

    pub fn export_set(&self, name: &str, dataset: &Dataset, options: &FormatOptions) -> Result<Payload> {
        let export = self
            .get(name)
            .and_then(|h| h.export_set)
            .ok_or_else(|| DatasetError::unsupported(name, "dataset export"))?;
        debug!(format = name, rows = dataset.height(), "exporting dataset");
        export(dataset, options)
    }

    pub fn import_set(
        &self,
        input: &[u8],
        format: Option<&str>,
        dataset: &mut Dataset,
        options: &FormatOptions,
    ) -> Result<()> {
        let handler = self.resolve(input, format)?;
        let import = handler
            .import_set
            .ok_or_else(|| DatasetError::unsupported(handler.name, "dataset import"))?;
        debug!(format = handler.name, bytes = input.len(), "importing dataset");
        // Importers fill a fresh dataset; `dataset` is only replaced on success
        let mut imported = Dataset::new();
        imported.set_title(dataset.title());
        import(&mut imported, input, options)?;
        *dataset = imported;
        Ok(())
    }

    pub fn export_book(&self, name: &str, book: &Databook, options: &FormatOptions) -> Result<Payload> {
        let export = self
            .get(name)
            .and_then(|h| h.export_book)
            .ok_or_else(|| DatasetError::unsupported(name, "databook export"))?;
        debug!(format = name, sheets = book.size(), "exporting databook");
        export(book, options)
    }

    pub fn import_book(
        &self,
        input: &[u8],
        format: Option<&str>,
        book: &mut Databook,
        options: &FormatOptions,
    ) -> Result<()> {
        let handler = self.resolve(input, format)?;
        let import = handler
            .import_book
            .ok_or_else(|| DatasetError::unsupported(handler.name, "databook import"))?;
        debug!(format = handler.name, bytes = input.len(), "importing databook");
        let mut imported = Databook::new();
        import(&mut imported, input, options)?;
        *book = imported;
        Ok(())
    }
}

/// Detect the format of `input` with the process-wide registry
#[must_use]
pub fn detect_format(input: impl AsRef<[u8]>) -> Option<&'static str> {
    Registry::global().detect_format(input.as_ref())
}
