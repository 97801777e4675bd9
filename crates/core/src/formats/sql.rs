use crate::cell::CellValue;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::options::FormatOptions;
use crate::registry::{FormatHandler, Payload};

/// Table name used when neither `table` nor a dataset title is given
const DEFAULT_TABLE: &str = "export_table";

pub(crate) fn handler() -> FormatHandler {
    FormatHandler::new("sql")
        .with_extensions(&["sql"])
        .with_export_set(export_set)
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn render_literal(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => "NULL".to_string(),
        CellValue::Bool(true) => "TRUE".to_string(),
        CellValue::Bool(false) => "FALSE".to_string(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Float(f) if f.is_finite() => f.to_string(),
        CellValue::Float(_) => "NULL".to_string(),
        CellValue::Date(d) => format!("DATE '{}'", d.format("%Y-%m-%d")),
        CellValue::DateTime(dt) => format!("TIMESTAMP '{}'", dt.format("%Y-%m-%d %H:%M:%S%.f")),
        other => quote(&other.as_str()),
    }
}

/// One `INSERT` statement per row
fn export_set(dataset: &Dataset, options: &FormatOptions) -> Result<Payload> {
    let table = options
        .table
        .as_deref()
        .or(dataset.title())
        .unwrap_or(DEFAULT_TABLE);
    let columns = options
        .columns
        .as_deref()
        .or(dataset.headers())
        .map(|cols| format!(" ({})", cols.join(", ")))
        .unwrap_or_default();

    let mut out = String::new();
    for row in dataset.formatted_rows()? {
        let values: Vec<String> = row.iter().map(render_literal).collect();
        out.push_str(&format!("INSERT INTO {table}{columns} VALUES ({});\n", values.join(", ")));
    }
    if options.commit {
        out.push_str("COMMIT;\n");
    }
    Ok(Payload::Text(out))
}
