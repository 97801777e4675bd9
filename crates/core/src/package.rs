use crate::cell::CellValue;
use crate::dataset::Dataset;
use crate::error::{DatasetError, Result};
use crate::formats::json::{cell_to_json_value, json_value_to_cell};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Canonical intermediate shape handed to exporters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Package {
    /// One header → value map per row
    Records(Vec<IndexMap<String, CellValue>>),
    /// Plain rows, optionally led by the header row
    Grid(Vec<Vec<CellValue>>),
}

impl Package {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Package::Records(records) => records.len(),
            Package::Grid(rows) => rows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert to a JSON value, folding non-JSON cells (dates, NaN) into strings
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        match self {
            Package::Records(records) => Value::Array(
                records
                    .iter()
                    .map(|record| {
                        Value::Object(
                            record
                                .iter()
                                .map(|(k, v)| (k.clone(), cell_to_json_value(v)))
                                .collect(),
                        )
                    })
                    .collect(),
            ),
            Package::Grid(rows) => Value::Array(
                rows.iter()
                    .map(|row| Value::Array(row.iter().map(cell_to_json_value).collect()))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<Value> for Package {
    type Error = DatasetError;

    /// Accepts a list of lists or a list of objects
    fn try_from(value: Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(DatasetError::UnsupportedFormat(
                "expected a list of rows or a list of records".to_string(),
            ));
        };
        match items.first() {
            None => Ok(Package::Grid(Vec::new())),
            Some(Value::Array(_)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Array(cells) => Ok(cells.iter().map(json_value_to_cell).collect()),
                    _ => Err(DatasetError::UnsupportedFormat(
                        "rows must all be lists".to_string(),
                    )),
                })
                .collect::<Result<Vec<_>>>()
                .map(Package::Grid),
            Some(Value::Object(_)) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(map
                        .iter()
                        .map(|(k, v)| (k.clone(), json_value_to_cell(v)))
                        .collect()),
                    _ => Err(DatasetError::UnsupportedFormat(
                        "records must all be objects".to_string(),
                    )),
                })
                .collect::<Result<Vec<_>>>()
                .map(Package::Records),
            Some(_) => Err(DatasetError::UnsupportedFormat(
                "expected a list of rows or a list of records".to_string(),
            )),
        }
    }
}

/// A packaged line: either cells or a separator label
#[derive(Debug, Clone, PartialEq)]
pub enum PackagedRow {
    Cells(Vec<CellValue>),
    Separator(String),
}

/// One sheet of a packaged databook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetPackage {
    pub title: Option<String>,
    pub data: Package,
}

impl Dataset {
    /// Row values with every formatter applied, in registration order
    pub fn formatted_rows(&self) -> Result<Vec<Vec<CellValue>>> {
        let width = self.width();
        let mut rows: Vec<Vec<CellValue>> = self.rows().map(|row| row.to_vec()).collect();
        for (column, formatter) in self.formatters() {
            match column {
                Some(index) if *index >= width => {
                    return Err(DatasetError::InvalidDatasetIndex {
                        index: *index,
                        width,
                    })
                }
                Some(index) => {
                    for row in &mut rows {
                        row[*index] = formatter(&row[*index]);
                    }
                }
                None => {
                    for cell in rows.iter_mut().flatten() {
                        *cell = formatter(cell);
                    }
                }
            }
        }
        Ok(rows)
    }

    /// Package the formatted data.
    ///
    /// With headers, `dicts` selects header → value records over a grid led
    /// by the header row. Without headers the rows are returned as a grid.
    pub fn package(&self, dicts: bool) -> Result<Package> {
        let rows = self.formatted_rows()?;
        Ok(match self.headers() {
            Some(headers) if dicts => Package::Records(
                rows.into_iter()
                    .map(|row| headers.iter().cloned().zip(row).collect())
                    .collect(),
            ),
            Some(headers) => {
                let mut grid = Vec::with_capacity(rows.len() + 1);
                grid.push(headers.iter().map(CellValue::from).collect());
                grid.extend(rows);
                Package::Grid(grid)
            }
            None => Package::Grid(rows),
        })
    }

    /// Header row (if any) then formatted rows, with separators spliced in
    pub fn packaged_with_separators(&self) -> Result<Vec<PackagedRow>> {
        let grid = match self.package(false)? {
            Package::Grid(grid) => grid,
            Package::Records(_) => Vec::new(),
        };
        let mut lines: Vec<PackagedRow> = grid.into_iter().map(PackagedRow::Cells).collect();
        for (i, sep) in self.separators().iter().enumerate() {
            let at = (sep.index + i).min(lines.len());
            lines.insert(at, PackagedRow::Separator(sep.text.clone()));
        }
        Ok(lines)
    }

    /// Structured view of the data (records when headers are set)
    pub fn dict(&self) -> Result<Package> {
        self.package(true)
    }

    /// Replace the contents from a structured package.
    ///
    /// Records rebuild the headers from the first record's keys; a grid
    /// clears them. An empty package leaves the dataset untouched.
    pub fn set_dict(&mut self, package: Package) -> Result<()> {
        if package.is_empty() {
            return Ok(());
        }
        // Built aside so a bad package leaves `self` as it was
        let mut rebuilt = Dataset::new();
        match package {
            Package::Grid(rows) => rebuilt.extend(rows)?,
            Package::Records(records) => {
                let headers: Vec<String> = records
                    .first()
                    .map(|record| record.keys().cloned().collect())
                    .unwrap_or_default();
                rebuilt.set_headers(headers.iter().cloned())?;
                let rows = records.into_iter().map(|mut record| {
                    headers
                        .iter()
                        .map(|h| record.shift_remove(h).unwrap_or_default())
                        .collect::<Vec<CellValue>>()
                });
                rebuilt.extend(rows)?;
            }
        }
        rebuilt.set_title(self.title());
        *self = rebuilt;
        Ok(())
    }
}
