use crate::book::Databook;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::formats::json::{book_from_value, book_to_value, dataset_from_value};
use crate::options::FormatOptions;
use crate::registry::{FormatHandler, Payload};
use serde_json::Value;

pub(crate) fn handler() -> FormatHandler {
    FormatHandler::new("yaml")
        .with_extensions(&["yaml", "yml"])
        .with_export_set(export_set)
        .with_import_set(import_set)
        .with_export_book(export_book)
        .with_import_book(import_book)
        .with_detect(detect)
}

fn export_set(dataset: &Dataset, _options: &FormatOptions) -> Result<Payload> {
    let value = dataset.package(true)?.to_json_value();
    Ok(Payload::Text(serde_yaml::to_string(&value)?))
}

fn import_set(dataset: &mut Dataset, input: &[u8], _options: &FormatOptions) -> Result<()> {
    let value: Value = serde_yaml::from_slice(input)?;
    dataset_from_value(dataset, value)
}

fn export_book(book: &Databook, _options: &FormatOptions) -> Result<Payload> {
    Ok(Payload::Text(serde_yaml::to_string(&book_to_value(book)?)?))
}

fn import_book(book: &mut Databook, input: &[u8], _options: &FormatOptions) -> Result<()> {
    let value: Value = serde_yaml::from_slice(input)?;
    book_from_value(book, value)
}

/// Content parses to a YAML sequence or mapping
fn detect(input: &[u8]) -> bool {
    matches!(
        serde_yaml::from_slice::<serde_yaml::Value>(input),
        Ok(serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellValue;

    #[test]
    fn test_export_records() {
        let mut data = Dataset::new().with_headers(["name", "age"]).unwrap();
        data.append(vec![CellValue::from("John"), CellValue::from(90)]).unwrap();
        let payload = export_set(&data, &FormatOptions::default()).unwrap();
        assert_eq!(payload.as_text(), Some("- name: John\n  age: 90\n"));
    }

    #[test]
    fn test_import_grid() {
        let mut data = Dataset::new();
        import_set(&mut data, b"- [1, a]\n- [2, b]\n", &FormatOptions::default()).unwrap();
        assert_eq!(data.height(), 2);
        assert!(data.headers().is_none());
        assert_eq!(data.get_row(1).unwrap(), vec![CellValue::Int(2), CellValue::from("b")]);
    }

    #[test]
    fn test_book_round_trip() {
        let sheet = Dataset::from_rows(vec![vec![1]]).unwrap().with_title("one");
        let book = Databook::from_sheets(vec![sheet]);
        let text = export_book(&book, &FormatOptions::default()).unwrap();
        let mut loaded = Databook::new();
        import_book(&mut loaded, text.as_bytes(), &FormatOptions::default()).unwrap();
        assert_eq!(loaded.sheets()[0].title(), Some("one"));
        assert_eq!(loaded.sheets()[0].get_row(0).unwrap(), vec![CellValue::Int(1)]);
    }

    #[test]
    fn test_detect() {
        assert!(detect(b"- a: 1\n"));
        assert!(detect(b"key: value\n"));
        assert!(!detect(b"just a scalar"));
        assert!(!detect(b"a,b,c\n1,2,3\n"));
    }
}
