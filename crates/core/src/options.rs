/// Options passed to format importers and exporters.
///
/// Each format reads only the fields it understands and ignores the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Whether the first imported row holds the headers (csv, tsv, spreadsheets)
    pub headers: bool,
    /// Field delimiter override (csv, tsv)
    pub delimiter: Option<u8>,
    /// Parse text cells into typed values on import (csv, tsv, html)
    pub infer_types: bool,
    /// Leading rows to skip on spreadsheet import
    pub skip_lines: usize,
    /// Freeze the header row on xlsx export
    pub freeze_panes: bool,
    /// Escape cell text on export (html entities; leading `=` stripped in xlsx)
    pub escape: bool,
    /// Replacement for characters not allowed in worksheet names
    pub invalid_char_subst: String,
    /// Indent structured output (json)
    pub pretty: bool,
    /// `id` of the html table to import
    pub table_id: Option<String>,
    /// Target table name for sql export (default: dataset title, then `export_table`)
    pub table: Option<String>,
    /// Column names for sql export (default: headers)
    pub columns: Option<Vec<String>>,
    /// Append `COMMIT;` to sql export
    pub commit: bool,
    /// Always emit a grid table in rst export
    pub force_grid: bool,
    /// Maximum rst table width in characters
    pub max_table_width: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            headers: true,
            delimiter: None,
            infer_types: false,
            skip_lines: 0,
            freeze_panes: true,
            escape: false,
            invalid_char_subst: "-".to_string(),
            pretty: false,
            table_id: None,
            table: None,
            columns: None,
            commit: false,
            force_grid: false,
            max_table_width: 80,
        }
    }
}

impl FormatOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the first row contains headers
    #[must_use]
    pub fn with_headers(mut self, headers: bool) -> Self {
        self.headers = headers;
        self
    }

    /// Set the delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set whether to infer types
    #[must_use]
    pub fn with_type_inference(mut self, infer_types: bool) -> Self {
        self.infer_types = infer_types;
        self
    }

    #[must_use]
    pub fn with_skip_lines(mut self, skip_lines: usize) -> Self {
        self.skip_lines = skip_lines;
        self
    }

    #[must_use]
    pub fn with_freeze_panes(mut self, freeze_panes: bool) -> Self {
        self.freeze_panes = freeze_panes;
        self
    }

    #[must_use]
    pub fn with_escape(mut self, escape: bool) -> Self {
        self.escape = escape;
        self
    }

    #[must_use]
    pub fn with_invalid_char_subst(mut self, subst: &str) -> Self {
        self.invalid_char_subst = subst.to_string();
        self
    }

    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    #[must_use]
    pub fn with_table_id(mut self, table_id: &str) -> Self {
        self.table_id = Some(table_id.to_string());
        self
    }

    #[must_use]
    pub fn with_table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    #[must_use]
    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_commit(mut self, commit: bool) -> Self {
        self.commit = commit;
        self
    }

    #[must_use]
    pub fn with_force_grid(mut self, force_grid: bool) -> Self {
        self.force_grid = force_grid;
        self
    }

    #[must_use]
    pub fn with_max_table_width(mut self, width: usize) -> Self {
        self.max_table_width = width;
        self
    }
}
