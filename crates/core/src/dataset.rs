use crate::cell::CellValue;
use crate::error::{DatasetError, Result};
use crate::row::Row;
use std::fmt;
use std::sync::Arc;

/// Per-cell callback applied at packaging time.
pub type Formatter = Arc<dyn Fn(&CellValue) -> CellValue + Send + Sync>;

/// Column selector: by header name or by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Name(String),
    Index(usize),
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::Name(name.to_string())
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::Name(name)
    }
}

impl From<usize> for Column {
    fn from(index: usize) -> Self {
        Column::Index(index)
    }
}

/// Python-style row slice (`start:stop:step`, negative indices count from the end)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowSlice {
    pub start: Option<isize>,
    pub stop: Option<isize>,
    pub step: Option<isize>,
}

impl RowSlice {
    #[must_use]
    pub fn new(start: Option<isize>, stop: Option<isize>) -> Self {
        RowSlice {
            start,
            stop,
            step: None,
        }
    }

    /// Every row
    #[must_use]
    pub fn full() -> Self {
        RowSlice::default()
    }

    #[must_use]
    pub fn with_step(mut self, step: isize) -> Self {
        self.step = Some(step);
        self
    }

    /// Resolve to concrete positions for a sequence of `len` items
    pub fn indices(&self, len: usize) -> Result<Vec<usize>> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(DatasetError::ZeroSliceStep);
        }
        let len = len as isize;
        let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };

        let clamp = |bound: Option<isize>, default: isize| match bound {
            None => default,
            Some(b) if b < 0 => (b + len).max(lower),
            Some(b) => b.min(upper),
        };
        let start = clamp(self.start, if step > 0 { lower } else { upper });
        let stop = clamp(self.stop, if step > 0 { upper } else { lower });

        let mut out = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            out.push(i as usize);
            i += step;
        }
        Ok(out)
    }
}

/// A visual break inserted into packaged output before the given position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separator {
    pub index: usize,
    pub text: String,
}

/// An in-memory table: rows, optional headers, title, separators and formatters.
///
/// Every row has exactly [`Dataset::width`] cells.
#[derive(Clone, Default)]
pub struct Dataset {
    title: Option<String>,
    headers: Option<Vec<String>>,
    data: Vec<Row>,
    separators: Vec<Separator>,
    formatters: Vec<(Option<usize>, Formatter)>,
    /// Typed values behind the header labels, kept by `transpose`
    header_cells: Vec<CellValue>,
}

impl Dataset {
    /// Create a new empty dataset
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dataset from rows of values
    pub fn from_rows<T: Into<CellValue>>(rows: Vec<Vec<T>>) -> Result<Self> {
        let mut dataset = Dataset::new();
        dataset.extend(rows)?;
        Ok(dataset)
    }

    /// Builder form of [`Dataset::set_headers`]
    pub fn with_headers<S: Into<String>>(mut self, headers: impl IntoIterator<Item = S>) -> Result<Self> {
        self.set_headers(headers)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<&str>) {
        self.title = title.map(str::to_string);
    }

    #[must_use]
    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    /// Replace the headers. An empty collection clears them.
    pub fn set_headers<S: Into<String>>(&mut self, headers: impl IntoIterator<Item = S>) -> Result<()> {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        if headers.is_empty() {
            self.headers = None;
            return Ok(());
        }
        if !self.data.is_empty() && headers.len() != self.width() {
            return Err(DatasetError::InvalidDimensions {
                expected: self.width(),
                actual: headers.len(),
            });
        }
        self.headers = Some(headers);
        self.header_cells.clear();
        Ok(())
    }

    pub fn clear_headers(&mut self) {
        self.headers = None;
        self.header_cells.clear();
    }

    /// Header `index` as a cell, typed when the label came from a typed value
    pub(crate) fn header_cell(&self, index: usize) -> CellValue {
        let Some(label) = self.headers.as_ref().and_then(|h| h.get(index)) else {
            return CellValue::Null;
        };
        match self.header_cells.get(index) {
            Some(cell) if self.header_cells.len() == self.width() && cell.as_str() == *label => cell.clone(),
            _ => CellValue::String(label.clone()),
        }
    }

    pub(crate) fn set_header_cells(&mut self, cells: Vec<CellValue>) {
        self.header_cells = cells;
    }

    /// Number of rows
    #[must_use]
    pub fn height(&self) -> usize {
        self.data.len()
    }

    /// Number of columns: first row length, else header count, else 0
    #[must_use]
    pub fn width(&self) -> usize {
        match (self.data.first(), &self.headers) {
            (Some(row), _) => row.len(),
            (None, Some(headers)) => headers.len(),
            (None, None) => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear rows, headers, separators and formatters. The title is kept.
    pub fn wipe(&mut self) {
        self.data.clear();
        self.headers = None;
        self.header_cells.clear();
        self.separators.clear();
        self.formatters.clear();
    }

    fn validate_row(&self, len: usize) -> Result<()> {
        if self.data.is_empty() && self.headers.is_none() {
            return Ok(());
        }
        if len != self.width() {
            return Err(DatasetError::InvalidDimensions {
                expected: self.width(),
                actual: len,
            });
        }
        Ok(())
    }

    fn resolve_row_index(&self, index: isize) -> Result<usize> {
        let len = self.data.len();
        let resolved = if index < 0 { index + len as isize } else { index };
        if resolved < 0 || resolved as usize >= len {
            return Err(DatasetError::IndexOutOfBounds { index, len });
        }
        Ok(resolved as usize)
    }

    pub(crate) fn header_index(&self, name: &str) -> Result<usize> {
        self.headers
            .as_ref()
            .and_then(|headers| headers.iter().position(|h| h == name))
            .ok_or_else(|| DatasetError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    // ===== Row Operations =====

    /// Insert a prepared row (with its tags) at `index`
    pub fn insert_row(&mut self, index: usize, row: Row) -> Result<()> {
        if index > self.data.len() {
            return Err(DatasetError::out_of_bounds(index, self.data.len()));
        }
        self.validate_row(row.len())?;
        self.data.insert(index, row);
        Ok(())
    }

    pub fn insert<T: Into<CellValue>>(&mut self, index: usize, row: Vec<T>) -> Result<()> {
        self.insert_row(index, Row::new(row.into_iter().map(Into::into).collect()))
    }

    pub fn insert_tagged<T: Into<CellValue>>(&mut self, index: usize, row: Vec<T>, tags: &[&str]) -> Result<()> {
        let values = row.into_iter().map(Into::into).collect();
        self.insert_row(index, Row::with_tags(values, tags.iter().copied()))
    }

    pub fn append<T: Into<CellValue>>(&mut self, row: Vec<T>) -> Result<()> {
        self.insert(self.height(), row)
    }

    pub fn append_tagged<T: Into<CellValue>>(&mut self, row: Vec<T>, tags: &[&str]) -> Result<()> {
        self.insert_tagged(self.height(), row, tags)
    }

    pub fn rpush<T: Into<CellValue>>(&mut self, row: Vec<T>) -> Result<()> {
        self.append(row)
    }

    pub fn lpush<T: Into<CellValue>>(&mut self, row: Vec<T>) -> Result<()> {
        self.insert(0, row)
    }

    pub fn lpush_tagged<T: Into<CellValue>>(&mut self, row: Vec<T>, tags: &[&str]) -> Result<()> {
        self.insert_tagged(0, row, tags)
    }

    /// Append every row. Nothing is appended unless every row fits.
    pub fn extend<T: Into<CellValue>>(&mut self, rows: impl IntoIterator<Item = Vec<T>>) -> Result<()> {
        let rows = rows
            .into_iter()
            .map(|row| Row::new(row.into_iter().map(Into::into).collect()))
            .collect();
        self.push_rows(rows)
    }

    pub fn extend_tagged<T: Into<CellValue>>(
        &mut self,
        rows: impl IntoIterator<Item = Vec<T>>,
        tags: &[&str],
    ) -> Result<()> {
        let rows = rows
            .into_iter()
            .map(|row| Row::with_tags(row.into_iter().map(Into::into).collect(), tags.iter().copied()))
            .collect();
        self.push_rows(rows)
    }

    fn push_rows(&mut self, rows: Vec<Row>) -> Result<()> {
        // An empty headerless dataset takes its width from the first row
        let mut width = (!self.data.is_empty() || self.headers.is_some()).then(|| self.width());
        for row in &rows {
            match width {
                Some(expected) if row.len() != expected => {
                    return Err(DatasetError::InvalidDimensions {
                        expected,
                        actual: row.len(),
                    })
                }
                Some(_) => {}
                None => width = Some(row.len()),
            }
        }
        self.data.extend(rows);
        Ok(())
    }

    /// Remove and return the first row
    pub fn lpop(&mut self) -> Result<Vec<CellValue>> {
        if self.data.is_empty() {
            return Err(DatasetError::out_of_bounds(0, 0));
        }
        Ok(self.data.remove(0).into_values())
    }

    /// Remove and return the last row
    pub fn rpop(&mut self) -> Result<Vec<CellValue>> {
        self.data
            .pop()
            .map(Row::into_values)
            .ok_or_else(|| DatasetError::out_of_bounds(0, 0))
    }

    pub fn pop(&mut self) -> Result<Vec<CellValue>> {
        self.rpop()
    }

    /// Copy of the row at `index`; negative indices count from the end
    pub fn get_row(&self, index: isize) -> Result<Vec<CellValue>> {
        let index = self.resolve_row_index(index)?;
        Ok(self.data[index].to_vec())
    }

    pub fn row(&self, index: usize) -> Result<&Row> {
        self.data
            .get(index)
            .ok_or_else(|| DatasetError::out_of_bounds(index, self.data.len()))
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.data.iter()
    }

    /// Copies of the rows selected by `slice`
    pub fn slice(&self, slice: RowSlice) -> Result<Vec<Vec<CellValue>>> {
        Ok(slice
            .indices(self.data.len())?
            .into_iter()
            .map(|i| self.data[i].to_vec())
            .collect())
    }

    /// Replace the row at `index`. Tags of the old row are dropped.
    pub fn set_row<T: Into<CellValue>>(&mut self, index: isize, row: Vec<T>) -> Result<()> {
        let index = self.resolve_row_index(index)?;
        let values: Vec<CellValue> = row.into_iter().map(Into::into).collect();
        if self.data.len() == 1 {
            // The only row defines the width unless headers pin it
            if let Some(headers) = &self.headers {
                if values.len() != headers.len() {
                    return Err(DatasetError::InvalidDimensions {
                        expected: headers.len(),
                        actual: values.len(),
                    });
                }
            }
        } else {
            self.validate_row(values.len())?;
        }
        self.data[index] = Row::new(values);
        Ok(())
    }

    pub fn delete_row(&mut self, index: isize) -> Result<Vec<CellValue>> {
        let index = self.resolve_row_index(index)?;
        Ok(self.data.remove(index).into_values())
    }

    /// Remove the rows selected by `slice`, returning how many were removed
    pub fn delete_rows(&mut self, slice: RowSlice) -> Result<usize> {
        let mut indices = slice.indices(self.data.len())?;
        indices.sort_unstable();
        indices.dedup();
        for &index in indices.iter().rev() {
            self.data.remove(index);
        }
        Ok(indices.len())
    }

    // ===== Column Operations =====

    /// Values of the column with the given header
    pub fn column(&self, name: &str) -> Result<Vec<CellValue>> {
        let index = self.header_index(name)?;
        Ok(self.data.iter().map(|row| row[index].clone()).collect())
    }

    /// Values of the column at a position
    pub fn get_col(&self, index: usize) -> Result<Vec<CellValue>> {
        if index >= self.width() {
            return Err(DatasetError::out_of_bounds(index, self.width()));
        }
        Ok(self.data.iter().map(|row| row[index].clone()).collect())
    }

    /// Remove the column with the given header from headers and every row
    pub fn delete_column(&mut self, name: &str) -> Result<Vec<CellValue>> {
        let index = self.header_index(name)?;
        if let Some(headers) = self.headers.as_mut() {
            headers.remove(index);
            if headers.is_empty() {
                self.headers = None;
            }
        }
        Ok(self
            .data
            .iter_mut()
            .map(|row| row.values_mut().remove(index))
            .collect())
    }

    /// Insert a column of values at `index`.
    ///
    /// `values` never includes the header; pass it as `header`, which is
    /// required once the dataset has headers. On an empty dataset the
    /// column bootstraps one single-cell row per value.
    pub fn insert_col<T: Into<CellValue>>(&mut self, index: usize, values: Vec<T>, header: Option<&str>) -> Result<()> {
        let values = values.into_iter().map(Into::into).collect();
        self.insert_column_values(index, values, header)
    }

    /// Insert a column computed from each existing row
    pub fn insert_col_with<F>(&mut self, index: usize, f: F, header: Option<&str>) -> Result<()>
    where
        F: FnMut(&Row) -> CellValue,
    {
        let values = self.data.iter().map(f).collect();
        self.insert_column_values(index, values, header)
    }

    pub fn append_col<T: Into<CellValue>>(&mut self, values: Vec<T>, header: Option<&str>) -> Result<()> {
        self.insert_col(self.width(), values, header)
    }

    pub fn append_col_with<F>(&mut self, f: F, header: Option<&str>) -> Result<()>
    where
        F: FnMut(&Row) -> CellValue,
    {
        self.insert_col_with(self.width(), f, header)
    }

    pub fn rpush_col<T: Into<CellValue>>(&mut self, values: Vec<T>, header: Option<&str>) -> Result<()> {
        self.append_col(values, header)
    }

    pub fn lpush_col<T: Into<CellValue>>(&mut self, values: Vec<T>, header: Option<&str>) -> Result<()> {
        self.insert_col(0, values, header)
    }

    fn insert_column_values(&mut self, index: usize, values: Vec<CellValue>, header: Option<&str>) -> Result<()> {
        if index > self.width() {
            return Err(DatasetError::out_of_bounds(index, self.width()));
        }

        if self.headers.is_some() {
            match header {
                None if self.data.is_empty() && values.is_empty() => return Ok(()),
                None => {
                    return Err(DatasetError::HeadersNeeded(
                        "a header is required to insert a column into a dataset with headers"
                            .to_string(),
                    ))
                }
                Some(_) if self.data.is_empty() && !values.is_empty() => {
                    return Err(DatasetError::InvalidDimensions {
                        expected: 0,
                        actual: values.len(),
                    })
                }
                Some(_) => {}
            }
        }

        if !self.data.is_empty() && values.len() != self.height() {
            return Err(DatasetError::InvalidDimensions {
                expected: self.height(),
                actual: values.len(),
            });
        }

        match (self.headers.as_mut(), header) {
            (Some(headers), Some(header)) => headers.insert(index, header.to_string()),
            (None, Some(header)) if self.data.is_empty() => {
                self.headers = Some(vec![header.to_string()]);
            }
            _ => {}
        }

        if self.data.is_empty() {
            self.data = values.into_iter().map(|v| Row::new(vec![v])).collect();
        } else {
            for (row, value) in self.data.iter_mut().zip(values) {
                row.values_mut().insert(index, value);
            }
        }
        Ok(())
    }

    // ===== Separators and Formatters =====

    /// Mark a visual break before packaged line `index` (headers occupy line 0)
    pub fn insert_separator(&mut self, index: usize, text: &str) {
        self.separators.push(Separator {
            index,
            text: text.to_string(),
        });
    }

    /// Mark a visual break after the current last row
    pub fn append_separator(&mut self, text: &str) {
        let index = if self.headers.is_some() {
            self.height() + 1
        } else {
            self.height()
        };
        self.insert_separator(index, text);
    }

    #[must_use]
    pub fn separators(&self) -> &[Separator] {
        &self.separators
    }

    pub(crate) fn clear_separators(&mut self) {
        self.separators.clear();
    }

    /// Register a formatter for one column, by header name or position
    pub fn add_formatter<F>(&mut self, column: impl Into<Column>, f: F) -> Result<()>
    where
        F: Fn(&CellValue) -> CellValue + Send + Sync + 'static,
    {
        let index = match column.into() {
            Column::Name(name) => self.header_index(&name)?,
            Column::Index(index) => {
                if index >= self.width() {
                    return Err(DatasetError::InvalidDatasetIndex {
                        index,
                        width: self.width(),
                    });
                }
                index
            }
        };
        self.formatters.push((Some(index), Arc::new(f)));
        Ok(())
    }

    /// Register a formatter applied to every cell
    pub fn add_global_formatter<F>(&mut self, f: F)
    where
        F: Fn(&CellValue) -> CellValue + Send + Sync + 'static,
    {
        self.formatters.push((None, Arc::new(f)));
    }

    pub(crate) fn formatters(&self) -> &[(Option<usize>, Formatter)] {
        &self.formatters
    }

    pub(crate) fn set_rows(&mut self, rows: Vec<Row>) {
        self.data = rows;
    }

    pub(crate) fn raw_rows(&self) -> &[Row] {
        &self.data
    }
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("title", &self.title)
            .field("headers", &self.headers)
            .field("data", &self.data)
            .field("separators", &self.separators)
            .field("formatters", &self.formatters.len())
            .finish()
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<Vec<String>> = Vec::new();
        if let Some(headers) = &self.headers {
            lines.push(headers.clone());
        }
        lines.extend(
            self.data
                .iter()
                .map(|row| row.iter().map(CellValue::as_str).collect()),
        );

        let mut widths = vec![0usize; self.width()];
        for line in &lines {
            for (i, cell) in line.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut rendered: Vec<String> = lines
            .iter()
            .map(|line| {
                line.iter()
                    .zip(&widths)
                    .map(|(cell, &width)| format!("{cell:<width$}"))
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect();

        let ruled = self.headers.is_some() && !rendered.is_empty();
        if ruled {
            let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            rendered.insert(1, rule.join("|"));
        }
        for (i, sep) in self.separators.iter().enumerate() {
            // The rule sits between line 0 and line 1
            let index = if ruled && sep.index >= 1 { sep.index + 1 } else { sep.index };
            let at = (index + i).min(rendered.len());
            rendered.insert(at, sep.text.clone());
        }
        write!(f, "{}", rendered.join("\n"))
    }
}
