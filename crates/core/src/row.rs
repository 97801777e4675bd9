use crate::cell::CellValue;
use crate::error::{DatasetError, Result};
use std::ops::Index;

/// One record of a dataset: ordered cell values plus a set of string tags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<CellValue>,
    tags: Vec<String>,
}

impl Row {
    /// Create an untagged row
    #[must_use]
    pub fn new(values: Vec<CellValue>) -> Self {
        Row {
            values,
            tags: Vec::new(),
        }
    }

    /// Create a row carrying the given tags
    #[must_use]
    pub fn with_tags<S: Into<String>>(values: Vec<CellValue>, tags: impl IntoIterator<Item = S>) -> Self {
        let mut row = Row::new(values);
        for tag in tags {
            row.add_tag(tag);
        }
        row
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&CellValue> {
        self.values
            .get(index)
            .ok_or_else(|| DatasetError::out_of_bounds(index, self.values.len()))
    }

    pub fn set<T: Into<CellValue>>(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.values.len();
        let cell = self
            .values
            .get_mut(index)
            .ok_or_else(|| DatasetError::out_of_bounds(index, len))?;
        *cell = value.into();
        Ok(())
    }

    /// Remove and return the cell at `index`, shifting later cells left
    pub fn delete(&mut self, index: usize) -> Result<CellValue> {
        if index >= self.values.len() {
            return Err(DatasetError::out_of_bounds(index, self.values.len()));
        }
        Ok(self.values.remove(index))
    }

    /// Insert a cell at `index`, shifting later cells right
    pub fn insert<T: Into<CellValue>>(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.values.len() {
            return Err(DatasetError::out_of_bounds(index, self.values.len()));
        }
        self.values.insert(index, value.into());
        Ok(())
    }

    pub fn append<T: Into<CellValue>>(&mut self, value: T) {
        self.values.push(value.into());
    }

    pub fn lpush<T: Into<CellValue>>(&mut self, value: T) {
        self.values.insert(0, value.into());
    }

    pub fn rpush<T: Into<CellValue>>(&mut self, value: T) {
        self.append(value);
    }

    /// Check whether a cell equal to `value` is present
    #[must_use]
    pub fn contains(&self, value: &CellValue) -> bool {
        self.values.contains(value)
    }

    #[must_use]
    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut Vec<CellValue> {
        &mut self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<CellValue> {
        self.values
    }

    /// Copy of the cell values, without tags
    #[must_use]
    pub fn to_vec(&self) -> Vec<CellValue> {
        self.values.clone()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CellValue> {
        self.values.iter()
    }

    /// Tags in the order they were first added
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn add_tag<S: Into<String>>(&mut self, tag: S) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// True if any of the given tags is present. An empty query never matches.
    pub fn has_any_tag<S: AsRef<str>>(&self, tags: impl IntoIterator<Item = S>) -> bool {
        tags.into_iter().any(|tag| self.has_tag(tag.as_ref()))
    }
}

impl Index<usize> for Row {
    type Output = CellValue;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl AsRef<[CellValue]> for Row {
    fn as_ref(&self) -> &[CellValue] {
        &self.values
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a CellValue;
    type IntoIter = std::slice::Iter<'a, CellValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl IntoIterator for Row {
    type Item = CellValue;
    type IntoIter = std::vec::IntoIter<CellValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl From<Vec<CellValue>> for Row {
    fn from(values: Vec<CellValue>) -> Self {
        Row::new(values)
    }
}

impl PartialEq<Vec<CellValue>> for Row {
    fn eq(&self, other: &Vec<CellValue>) -> bool {
        &self.values == other
    }
}
