use crate::book::Databook;
use crate::cell::CellValue;
use crate::dataset::Dataset;
use crate::error::{DatasetError, Result};
use crate::options::FormatOptions;
use crate::package::Package;
use crate::registry::{FormatHandler, Payload};
use serde_json::{Map, Value};

pub(crate) fn handler() -> FormatHandler {
    FormatHandler::new("json")
        .with_extensions(&["json", "jsn"])
        .with_export_set(export_set)
        .with_import_set(import_set)
        .with_export_book(export_book)
        .with_import_book(import_book)
        .with_detect(detect)
}

/// Convert a serde_json Value to a CellValue
pub(crate) fn json_value_to_cell(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Bool(b) => CellValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        Value::String(s) => CellValue::String(s.clone()),
        Value::Array(items) => CellValue::List(items.iter().map(json_value_to_cell).collect()),
        Value::Object(map) => CellValue::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), json_value_to_cell(v)))
                .collect(),
        ),
    }
}

/// Convert a CellValue to a serde_json Value
pub(crate) fn cell_to_json_value(cell: &CellValue) -> Value {
    match cell {
        CellValue::Null => Value::Null,
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Int(i) => Value::Number((*i).into()),
        CellValue::Float(f) => {
            // from_f64 returns None for NaN and Infinity
            serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string()))
        }
        CellValue::String(s) => Value::String(s.clone()),
        CellValue::Date(_) | CellValue::DateTime(_) => Value::String(cell.as_str()),
        CellValue::List(items) => Value::Array(items.iter().map(cell_to_json_value).collect()),
        CellValue::Map(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), cell_to_json_value(v)))
                .collect(),
        ),
    }
}

/// `[{"title": ..., "data": ...}, ...]`, shared with yaml
pub(crate) fn book_to_value(book: &Databook) -> Result<Value> {
    let sheets = book
        .package()?
        .into_iter()
        .map(|sheet| {
            let mut entry = Map::new();
            entry.insert(
                "title".to_string(),
                sheet.title.map_or(Value::Null, Value::String),
            );
            entry.insert("data".to_string(), sheet.data.to_json_value());
            Value::Object(entry)
        })
        .collect();
    Ok(Value::Array(sheets))
}

/// Rebuild a book from `[{"title": ..., "data": ...}, ...]`, shared with yaml
pub(crate) fn book_from_value(book: &mut Databook, value: Value) -> Result<()> {
    let Value::Array(entries) = value else {
        return Err(DatasetError::InvalidDatasetType(
            "a databook must be a list of sheets".to_string(),
        ));
    };
    book.wipe();
    for entry in entries {
        let Value::Object(mut entry) = entry else {
            return Err(DatasetError::InvalidDatasetType(
                "each sheet must be an object with a 'data' entry".to_string(),
            ));
        };
        let data = entry.remove("data").ok_or_else(|| {
            DatasetError::InvalidDatasetType("sheet is missing its 'data' entry".to_string())
        })?;
        let mut sheet = Dataset::new();
        if let Some(Value::String(title)) = entry.get("title") {
            sheet.set_title(Some(title));
        }
        sheet.set_dict(Package::try_from(data)?)?;
        book.add_sheet(sheet);
    }
    Ok(())
}

/// Replace a dataset's rows from a parsed list of rows or records
pub(crate) fn dataset_from_value(dataset: &mut Dataset, value: Value) -> Result<()> {
    let package = Package::try_from(value)?;
    if package.is_empty() {
        dataset.wipe();
        return Ok(());
    }
    dataset.set_dict(package)
}

fn to_text(value: &Value, options: &FormatOptions) -> Result<Payload> {
    let text = if options.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(Payload::Text(text))
}

fn export_set(dataset: &Dataset, options: &FormatOptions) -> Result<Payload> {
    to_text(&dataset.package(true)?.to_json_value(), options)
}

fn import_set(dataset: &mut Dataset, input: &[u8], _options: &FormatOptions) -> Result<()> {
    let value: Value = serde_json::from_slice(input)?;
    dataset_from_value(dataset, value)
}

fn export_book(book: &Databook, options: &FormatOptions) -> Result<Payload> {
    to_text(&book_to_value(book)?, options)
}

fn import_book(book: &mut Databook, input: &[u8], _options: &FormatOptions) -> Result<()> {
    let value: Value = serde_json::from_slice(input)?;
    book_from_value(book, value)
}

/// Content parses as a JSON array or object
fn detect(input: &[u8]) -> bool {
    matches!(
        serde_json::from_slice::<Value>(input),
        Ok(Value::Array(_) | Value::Object(_))
    )
}
