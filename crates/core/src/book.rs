use crate::dataset::Dataset;
use crate::error::Result;
use crate::package::SheetPackage;

/// An ordered collection of datasets, one per sheet
#[derive(Debug, Clone, Default)]
pub struct Databook {
    sheets: Vec<Dataset>,
}

impl Databook {
    /// Create a new empty book
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_sheets(sheets: Vec<Dataset>) -> Self {
        Databook { sheets }
    }

    pub fn add_sheet(&mut self, sheet: Dataset) {
        self.sheets.push(sheet);
    }

    #[must_use]
    pub fn sheets(&self) -> &[Dataset] {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut [Dataset] {
        &mut self.sheets
    }

    /// Get a sheet by title
    #[must_use]
    pub fn sheet(&self, title: &str) -> Option<&Dataset> {
        self.sheets.iter().find(|s| s.title() == Some(title))
    }

    /// Number of sheets
    #[must_use]
    pub fn size(&self) -> usize {
        self.sheets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Remove every sheet
    pub fn wipe(&mut self) {
        self.sheets.clear();
    }

    /// One `{title, data}` record per sheet, in sheet order
    pub fn package(&self) -> Result<Vec<SheetPackage>> {
        self.sheets
            .iter()
            .map(|sheet| {
                Ok(SheetPackage {
                    title: sheet.title().map(str::to_string),
                    data: sheet.package(true)?,
                })
            })
            .collect()
    }
}

impl IntoIterator for Databook {
    type Item = Dataset;
    type IntoIter = std::vec::IntoIter<Dataset>;

    fn into_iter(self) -> Self::IntoIter {
        self.sheets.into_iter()
    }
}

impl<'a> IntoIterator for &'a Databook {
    type Item = &'a Dataset;
    type IntoIter = std::slice::Iter<'a, Dataset>;

    fn into_iter(self) -> Self::IntoIter {
        self.sheets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::Package;

    #[test]
    fn test_sheets_keep_order() {
        let mut book = Databook::new();
        book.add_sheet(Dataset::new().with_title("first"));
        book.add_sheet(Dataset::new().with_title("second"));
        assert_eq!(book.size(), 2);
        assert_eq!(book.sheets()[1].title(), Some("second"));
        assert!(book.sheet("first").is_some());
        assert!(book.sheet("third").is_none());
    }

    #[test]
    fn test_package() {
        let mut sheet = Dataset::new().with_headers(["n"]).unwrap().with_title("nums");
        sheet.append(vec![1]).unwrap();
        let book = Databook::from_sheets(vec![sheet, Dataset::from_rows(vec![vec![2]]).unwrap()]);
        let packaged = book.package().unwrap();
        assert_eq!(packaged[0].title.as_deref(), Some("nums"));
        assert!(matches!(packaged[0].data, Package::Records(_)));
        assert!(matches!(packaged[1].data, Package::Grid(_)));
        assert_eq!(packaged[1].title, None);
    }

    #[test]
    fn test_wipe() {
        let mut book = Databook::from_sheets(vec![Dataset::new()]);
        book.wipe();
        assert!(book.is_empty());
    }
}
