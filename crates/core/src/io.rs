//! Registry-backed import and export entry points for datasets and databooks.

use crate::book::Databook;
use crate::dataset::Dataset;
use crate::error::{DatasetError, Result};
use crate::options::FormatOptions;
use crate::registry::{Payload, Registry};
use std::path::Path;
use tracing::trace;

/// Format name for a path: explicit, else by extension, else `None`
fn format_for_path<'a>(registry: &Registry, path: &Path, format: Option<&'a str>) -> Option<&'a str> {
    format.or_else(|| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| registry.for_extension(ext))
            .map(|h| h.name)
    })
}

impl Dataset {
    /// Build a dataset from `input`, detecting the format when `format` is `None`
    pub fn load(input: impl AsRef<[u8]>, format: Option<&str>) -> Result<Dataset> {
        Self::load_with_options(input, format, &FormatOptions::default())
    }

    pub fn load_with_options(
        input: impl AsRef<[u8]>,
        format: Option<&str>,
        options: &FormatOptions,
    ) -> Result<Dataset> {
        Self::load_with(Registry::global(), input, format, options)
    }

    pub fn load_with(
        registry: &Registry,
        input: impl AsRef<[u8]>,
        format: Option<&str>,
        options: &FormatOptions,
    ) -> Result<Dataset> {
        let mut dataset = Dataset::new();
        dataset.import_with(registry, input, format, options)?;
        Ok(dataset)
    }

    /// Replace this dataset's contents from `input`. The title is kept.
    pub fn import_with(
        &mut self,
        registry: &Registry,
        input: impl AsRef<[u8]>,
        format: Option<&str>,
        options: &FormatOptions,
    ) -> Result<()> {
        registry.import_set(input.as_ref(), format, self, options)?;
        trace!(rows = self.height(), cols = self.width(), "dataset loaded");
        Ok(())
    }

    /// Export with default options
    pub fn export(&self, format: &str) -> Result<Payload> {
        self.export_with_options(format, &FormatOptions::default())
    }

    pub fn export_with_options(&self, format: &str, options: &FormatOptions) -> Result<Payload> {
        self.export_with(Registry::global(), format, options)
    }

    pub fn export_with(&self, registry: &Registry, format: &str, options: &FormatOptions) -> Result<Payload> {
        registry.export_set(format, self, options)
    }

    /// Read a file. The format is `format`, else the extension, else detected.
    pub fn load_path<P: AsRef<Path>>(path: P, format: Option<&str>) -> Result<Dataset> {
        let path = path.as_ref();
        let registry = Registry::global();
        let input = std::fs::read(path)?;
        Self::load_with(
            registry,
            input,
            format_for_path(registry, path, format),
            &FormatOptions::default(),
        )
    }

    /// Write the export to a file. The format is `format`, else the extension.
    pub fn save_path<P: AsRef<Path>>(&self, path: P, format: Option<&str>) -> Result<()> {
        let path = path.as_ref();
        let registry = Registry::global();
        let format = format_for_path(registry, path, format).ok_or_else(|| {
            DatasetError::UnsupportedFormat(format!("no format for {}", path.display()))
        })?;
        let payload = self.export_with(registry, format, &FormatOptions::default())?;
        std::fs::write(path, payload.as_bytes())?;
        Ok(())
    }

    /// Export as xlsx with default options
    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        Ok(self.export("xlsx")?.into_bytes())
    }

    /// Import an xlsx workbook's first sheet
    pub fn from_xlsx(input: &[u8]) -> Result<Dataset> {
        Self::load(input, Some("xlsx"))
    }
}

impl Databook {
    /// Build a databook from `input`, detecting the format when `format` is `None`
    pub fn load(input: impl AsRef<[u8]>, format: Option<&str>) -> Result<Databook> {
        Self::load_with_options(input, format, &FormatOptions::default())
    }

    pub fn load_with_options(
        input: impl AsRef<[u8]>,
        format: Option<&str>,
        options: &FormatOptions,
    ) -> Result<Databook> {
        Self::load_with(Registry::global(), input, format, options)
    }

    pub fn load_with(
        registry: &Registry,
        input: impl AsRef<[u8]>,
        format: Option<&str>,
        options: &FormatOptions,
    ) -> Result<Databook> {
        let mut book = Databook::new();
        registry.import_book(input.as_ref(), format, &mut book, options)?;
        trace!(sheets = book.size(), "databook loaded");
        Ok(book)
    }

    pub fn export(&self, format: &str) -> Result<Payload> {
        self.export_with_options(format, &FormatOptions::default())
    }

    pub fn export_with_options(&self, format: &str, options: &FormatOptions) -> Result<Payload> {
        self.export_with(Registry::global(), format, options)
    }

    pub fn export_with(&self, registry: &Registry, format: &str, options: &FormatOptions) -> Result<Payload> {
        registry.export_book(format, self, options)
    }

    /// Read a file. The format is `format`, else the extension, else detected.
    pub fn load_path<P: AsRef<Path>>(path: P, format: Option<&str>) -> Result<Databook> {
        let path = path.as_ref();
        let registry = Registry::global();
        let input = std::fs::read(path)?;
        Self::load_with(
            registry,
            input,
            format_for_path(registry, path, format),
            &FormatOptions::default(),
        )
    }

    pub fn save_path<P: AsRef<Path>>(&self, path: P, format: Option<&str>) -> Result<()> {
        let path = path.as_ref();
        let registry = Registry::global();
        let format = format_for_path(registry, path, format).ok_or_else(|| {
            DatasetError::UnsupportedFormat(format!("no format for {}", path.display()))
        })?;
        let payload = self.export_with(registry, format, &FormatOptions::default())?;
        std::fs::write(path, payload.as_bytes())?;
        Ok(())
    }

    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        Ok(self.export("xlsx")?.into_bytes())
    }
}

/// Generates `to_<format>` text exporters over the global registry
macro_rules! text_exporters {
    ($target:ty { $($method:ident => $format:literal),* $(,)? }) => {
        impl $target {
            $(
                #[doc = concat!("Export as ", $format, " with default options")]
                pub fn $method(&self) -> Result<String> {
                    self.export($format)?.into_text()
                }
            )*
        }
    };
}

/// Generates `from_<format>` text importers over the global registry
macro_rules! text_importers {
    ($target:ty { $($method:ident => $format:literal),* $(,)? }) => {
        impl $target {
            $(
                #[doc = concat!("Import from ", $format, " with default options")]
                pub fn $method(input: &str) -> Result<$target> {
                    <$target>::load(input, Some($format))
                }
            )*
        }
    };
}

text_exporters!(Dataset {
    to_csv => "csv",
    to_tsv => "tsv",
    to_json => "json",
    to_yaml => "yaml",
    to_html => "html",
    to_jira => "jira",
    to_latex => "latex",
    to_rst => "rst",
    to_sql => "sql",
});

text_importers!(Dataset {
    from_csv => "csv",
    from_tsv => "tsv",
    from_json => "json",
    from_yaml => "yaml",
    from_html => "html",
});

text_exporters!(Databook {
    to_json => "json",
    to_yaml => "yaml",
    to_html => "html",
    to_rst => "rst",
});

text_importers!(Databook {
    from_json => "json",
    from_yaml => "yaml",
});
