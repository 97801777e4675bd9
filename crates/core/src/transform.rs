use crate::cell::CellValue;
use crate::dataset::{Column, Dataset};
use crate::error::{DatasetError, Result};
use crate::row::Row;
use std::collections::HashSet;

impl Dataset {
    /// Empty dataset sharing this one's title, headers, separators and formatters
    fn with_same_config(&self) -> Dataset {
        let mut copy = self.clone();
        copy.set_rows(Vec::new());
        copy
    }

    /// Rows carrying `tag`
    #[must_use]
    pub fn filter(&self, tag: &str) -> Dataset {
        let mut filtered = self.with_same_config();
        filtered.set_rows(
            self.raw_rows()
                .iter()
                .filter(|row| row.has_tag(tag))
                .cloned()
                .collect(),
        );
        filtered
    }

    /// Rows carrying at least one of `tags`
    #[must_use]
    pub fn filter_any(&self, tags: &[&str]) -> Dataset {
        let mut filtered = self.with_same_config();
        filtered.set_rows(
            self.raw_rows()
                .iter()
                .filter(|row| row.has_any_tag(tags.iter().copied()))
                .cloned()
                .collect(),
        );
        filtered
    }

    /// New dataset with rows ordered by a column. Equal keys keep their order.
    pub fn sort(&self, column: impl Into<Column>, reverse: bool) -> Result<Dataset> {
        let index = match column.into() {
            Column::Name(name) => {
                if self.headers().is_none() {
                    return Err(DatasetError::HeadersNeeded(format!(
                        "cannot sort by '{name}' without headers"
                    )));
                }
                self.header_index(&name)?
            }
            Column::Index(index) => {
                if index >= self.width() {
                    return Err(DatasetError::out_of_bounds(index, self.width()));
                }
                index
            }
        };

        let mut rows = self.raw_rows().to_vec();
        rows.sort_by(|a, b| {
            let ord = a[index].compare(&b[index]);
            if reverse {
                ord.reverse()
            } else {
                ord
            }
        });

        let mut sorted = self.with_same_config();
        sorted.clear_separators();
        sorted.set_rows(rows);
        Ok(sorted)
    }

    /// Pivot on the first column.
    ///
    /// The new headers are the first header followed by the first column's
    /// values; each remaining header becomes a row of its column's values.
    /// Pivot values keep their type, so transposing twice gives back the
    /// original cells. An empty dataset transposes to an empty dataset.
    pub fn transpose(&self) -> Result<Dataset> {
        if self.height() == 0 {
            return Ok(Dataset::new());
        }
        let headers = self.headers().ok_or_else(|| {
            DatasetError::HeadersNeeded("transpose pivots on the first header".to_string())
        })?;

        let mut header_cells = vec![self.header_cell(0)];
        header_cells.extend(self.raw_rows().iter().map(|row| row[0].clone()));

        let mut transposed = Dataset::new().with_headers(header_cells.iter().map(CellValue::as_str))?;
        transposed.set_header_cells(header_cells);
        for index in 1..headers.len() {
            let mut values = vec![self.header_cell(index)];
            values.extend(self.raw_rows().iter().map(|row| row[index].clone()));
            transposed.append(values)?;
        }
        if let Some(title) = self.title() {
            transposed.set_title(Some(title));
        }
        Ok(transposed)
    }

    /// Rows of `self` followed by rows of `other`
    pub fn stack(&self, other: &Dataset) -> Result<Dataset> {
        if other.width() != self.width() {
            return Err(DatasetError::InvalidDimensions {
                expected: self.width(),
                actual: other.width(),
            });
        }
        let mut stacked = self.with_same_config();
        let mut rows = self.raw_rows().to_vec();
        rows.extend(other.raw_rows().iter().cloned());
        stacked.set_rows(rows);
        Ok(stacked)
    }

    /// Columns of `self` followed by columns of `other`
    pub fn stack_cols(&self, other: &Dataset) -> Result<Dataset> {
        if self.headers().is_some() != other.headers().is_some() {
            return Err(DatasetError::HeadersNeeded(
                "both datasets need headers, or neither".to_string(),
            ));
        }
        if self.height() != other.height() {
            return Err(DatasetError::InvalidDimensions {
                expected: self.height(),
                actual: other.height(),
            });
        }

        let mut stacked = Dataset::new();
        if let (Some(left), Some(right)) = (self.headers(), other.headers()) {
            stacked.set_headers(left.iter().chain(right).cloned())?;
        }
        for (a, b) in self.raw_rows().iter().zip(other.raw_rows()) {
            let mut values = a.to_vec();
            values.extend(b.iter().cloned());
            let mut row = Row::new(values);
            for tag in a.tags().iter().chain(b.tags()) {
                row.add_tag(tag.as_str());
            }
            stacked.insert_row(stacked.height(), row)?;
        }
        if let Some(title) = self.title() {
            stacked.set_title(Some(title));
        }
        Ok(stacked)
    }

    /// Drop repeated rows in place, keeping first occurrences. Returns the number removed.
    pub fn remove_duplicates(&mut self) -> usize {
        let mut seen = HashSet::new();
        let before = self.height();
        let rows: Vec<Row> = self
            .raw_rows()
            .iter()
            .filter(|row| seen.insert(row.iter().map(CellValue::key).collect::<Vec<_>>()))
            .cloned()
            .collect();
        self.set_rows(rows);
        before - self.height()
    }

    /// New dataset restricted to the given row positions and header names.
    ///
    /// `None` selects everything. Unknown rows and columns are skipped.
    pub fn subset(&self, rows: Option<&[usize]>, cols: Option<&[&str]>) -> Result<Dataset> {
        let row_indices: Vec<usize> = match rows {
            Some(rows) => rows.iter().copied().filter(|&i| i < self.height()).collect(),
            None => (0..self.height()).collect(),
        };

        let columns: Option<Vec<(usize, String)>> = match (cols, self.headers()) {
            (Some(_), None) => {
                return Err(DatasetError::HeadersNeeded(
                    "subset by column name requires headers".to_string(),
                ))
            }
            (Some(cols), Some(headers)) => Some(
                cols.iter()
                    .filter_map(|name| {
                        headers
                            .iter()
                            .position(|h| h == name)
                            .map(|i| (i, (*name).to_string()))
                    })
                    .collect(),
            ),
            (None, _) => None,
        };

        let mut subset = Dataset::new();
        if let Some(title) = self.title() {
            subset.set_title(Some(title));
        }
        match &columns {
            Some(columns) => {
                subset.set_headers(columns.iter().map(|(_, name)| name.clone()))?;
            }
            None => {
                if let Some(headers) = self.headers() {
                    subset.set_headers(headers.iter().cloned())?;
                }
            }
        }

        for index in row_indices {
            let source = &self.raw_rows()[index];
            let values = match &columns {
                Some(columns) => columns.iter().map(|(i, _)| source[*i].clone()).collect(),
                None => source.to_vec(),
            };
            subset.insert_row(subset.height(), Row::with_tags(values, source.tags().iter().cloned()))?;
        }
        Ok(subset)
    }
}
