use crate::cell::CellValue;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::options::FormatOptions;
use crate::registry::{FormatHandler, Payload};

pub(crate) fn handler() -> FormatHandler {
    FormatHandler::new("jira").with_export_set(export_set)
}

/// `|a|b|` with falsy cells rendered as a single space
fn serialize_row<'a>(cells: impl IntoIterator<Item = &'a CellValue>, delimiter: &str) -> String {
    let cells: Vec<String> = cells
        .into_iter()
        .map(|cell| if cell.is_truthy() { cell.as_str() } else { " ".to_string() })
        .collect();
    format!("{delimiter}{}{delimiter}", cells.join(delimiter))
}

fn export_set(dataset: &Dataset, _options: &FormatOptions) -> Result<Payload> {
    let body: Vec<String> = dataset
        .formatted_rows()?
        .iter()
        .map(|row| serialize_row(row, "|"))
        .collect();
    let body = body.join("\n");

    let text = match dataset.headers() {
        Some(headers) => {
            let headers: Vec<CellValue> = headers.iter().map(CellValue::from).collect();
            format!("{}\n{body}", serialize_row(&headers, "||"))
        }
        None => body,
    };
    Ok(Payload::Text(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row_without_headers() {
        let data = Dataset::from_rows(vec![vec!["a", "b", "c"]]).unwrap();
        let payload = export_set(&data, &FormatOptions::default()).unwrap();
        assert_eq!(payload.as_text(), Some("|a|b|c|"));
    }

    #[test]
    fn test_headers_and_falsy_cells() {
        let mut data = Dataset::new().with_headers(["name", "score"]).unwrap();
        data.append(vec![CellValue::from("Ann"), CellValue::from(0)]).unwrap();
        data.append(vec![CellValue::Null, CellValue::from(3)]).unwrap();
        let payload = export_set(&data, &FormatOptions::default()).unwrap();
        assert_eq!(payload.as_text(), Some("||name||score||\n|Ann| |\n| |3|"));
    }
}
