//! HTML tables.
//!
//! Export writes a `<table>` with a `<thead>` when headers are set. Import
//! reads the first table (or the one whose `id` matches `table_id`); a row made
//! only of `<th>` cells becomes the headers. `colspan` repeats a cell's value
//! across the spanned columns.

use crate::book::Databook;
use crate::cell::CellValue;
use crate::dataset::Dataset;
use crate::error::{DatasetError, Result};
use crate::options::FormatOptions;
use crate::package::PackagedRow;
use crate::registry::{FormatHandler, Payload};
use scraper::{ElementRef, Html, Selector};

pub(crate) fn handler() -> FormatHandler {
    FormatHandler::new("html")
        .with_extensions(&["html", "htm"])
        .with_export_set(export_set)
        .with_import_set(import_set)
        .with_export_book(export_book)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_row(out: &mut String, cells: &[CellValue], tag: &str, escape: bool) {
    out.push_str("<tr>");
    for cell in cells {
        let text = cell.as_str();
        let text = if escape { escape_html(&text) } else { text };
        out.push_str(&format!("<{tag}>{text}</{tag}>"));
    }
    out.push_str("</tr>\n");
}

fn render_table(dataset: &Dataset, options: &FormatOptions) -> Result<String> {
    let mut lines = dataset.packaged_with_separators()?.into_iter();
    let mut out = String::from("<table>\n");

    if dataset.headers().is_some() {
        // First cell line is the header row; separators before it stay in the body
        let mut leading = Vec::new();
        for line in lines.by_ref() {
            match line {
                PackagedRow::Cells(headers) => {
                    out.push_str("<thead>\n");
                    render_row(&mut out, &headers, "th", options.escape);
                    out.push_str("</thead>\n");
                    break;
                }
                separator => leading.push(separator),
            }
        }
        out.push_str("<tbody>\n");
        let rest: Vec<PackagedRow> = leading.into_iter().chain(lines).collect();
        render_body(&mut out, rest, dataset.width(), options);
    } else {
        out.push_str("<tbody>\n");
        render_body(&mut out, lines.collect(), dataset.width(), options);
    }

    out.push_str("</tbody>\n</table>\n");
    Ok(out)
}

fn render_body(out: &mut String, lines: Vec<PackagedRow>, width: usize, options: &FormatOptions) {
    for line in lines {
        match line {
            PackagedRow::Cells(cells) => render_row(out, &cells, "td", options.escape),
            PackagedRow::Separator(text) => {
                let text = if options.escape { escape_html(&text) } else { text };
                out.push_str(&format!("<tr><td colspan=\"{}\">{text}</td></tr>\n", width.max(1)));
            }
        }
    }
}

fn export_set(dataset: &Dataset, options: &FormatOptions) -> Result<Payload> {
    Ok(Payload::Text(render_table(dataset, options)?))
}

fn export_book(book: &Databook, options: &FormatOptions) -> Result<Payload> {
    let mut out = String::new();
    for sheet in book {
        let title = sheet.title().unwrap_or_default();
        let title = if options.escape { escape_html(title) } else { title.to_string() };
        out.push_str(&format!("<h3>{title}</h3>\n"));
        out.push_str(&render_table(sheet, options)?);
    }
    Ok(Payload::Text(out))
}

fn selector(pattern: &str) -> Result<Selector> {
    Selector::parse(pattern).map_err(|e| DatasetError::Parse(format!("invalid selector '{pattern}': {e:?}")))
}

/// Cells of one `<tr>`, expanded by `colspan`, plus whether every cell was a `<th>`
fn parse_row(row: ElementRef<'_>, cell_selector: &Selector, options: &FormatOptions) -> (Vec<CellValue>, bool) {
    let mut cells = Vec::new();
    let mut all_th = true;
    for cell in row.select(cell_selector) {
        let is_th = cell.value().name() == "th";
        all_th &= is_th;
        let text = cell.text().collect::<String>().trim().to_string();
        let value = if options.infer_types && !is_th {
            CellValue::parse(&text)
        } else {
            CellValue::String(text)
        };
        let colspan = cell
            .value()
            .attr("colspan")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);
        cells.extend(std::iter::repeat(value).take(colspan));
    }
    let header = all_th && !cells.is_empty();
    (cells, header)
}

fn import_set(dataset: &mut Dataset, input: &[u8], options: &FormatOptions) -> Result<()> {
    let content = std::str::from_utf8(input)?;
    let document = Html::parse_document(content);
    let table_selector = selector("table")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("th, td")?;

    let table = document
        .select(&table_selector)
        .find(|table| match &options.table_id {
            Some(id) => table.value().id() == Some(id.as_str()),
            None => true,
        })
        .ok_or_else(|| match &options.table_id {
            Some(id) => DatasetError::Parse(format!("no table with id '{id}' found")),
            None => DatasetError::Parse("no table found".to_string()),
        })?;

    dataset.wipe();
    for row in table.select(&row_selector) {
        let (mut cells, all_th) = parse_row(row, &cell_selector, options);
        if cells.is_empty() {
            continue;
        }
        if all_th && dataset.headers().is_none() && dataset.height() == 0 {
            dataset.set_headers(cells.iter().map(CellValue::as_str))?;
            continue;
        }
        let width = dataset.width();
        if width > cells.len() {
            cells.resize(width, CellValue::String(String::new()));
        }
        dataset.append(cells)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Dataset {
        let mut data = Dataset::new().with_headers(["name", "age"]).unwrap();
        data.append(vec![CellValue::from("John"), CellValue::from(90)]).unwrap();
        data
    }

    #[test]
    fn test_export() {
        let payload = export_set(&people(), &FormatOptions::default()).unwrap();
        assert_eq!(
            payload.as_text().unwrap(),
            "<table>\n<thead>\n<tr><th>name</th><th>age</th></tr>\n</thead>\n\
             <tbody>\n<tr><td>John</td><td>90</td></tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_export_escape() {
        let data = Dataset::from_rows(vec![vec!["<b>&"]]).unwrap();
        let raw = export_set(&data, &FormatOptions::default()).unwrap();
        assert!(raw.as_text().unwrap().contains("<td><b>&</td>"));
        let escaped = export_set(&data, &FormatOptions::new().with_escape(true)).unwrap();
        assert!(escaped.as_text().unwrap().contains("<td>&lt;b&gt;&amp;</td>"));
    }

    #[test]
    fn test_export_separator_row() {
        let mut data = people();
        data.append_separator("end");
        let payload = export_set(&data, &FormatOptions::default()).unwrap();
        assert!(payload.as_text().unwrap().contains("<tr><td colspan=\"2\">end</td></tr>"));
    }

    #[test]
    fn test_round_trip() {
        let payload = export_set(&people(), &FormatOptions::default()).unwrap();
        let mut loaded = Dataset::new();
        let options = FormatOptions::new().with_type_inference(true);
        import_set(&mut loaded, payload.as_bytes(), &options).unwrap();
        assert_eq!(loaded.headers(), people().headers());
        assert_eq!(loaded.get_row(0).unwrap(), vec![CellValue::from("John"), CellValue::Int(90)]);
    }

    #[test]
    fn test_import_by_id_and_colspan() {
        let html = r#"
            <table id="first"><tr><td>skip</td></tr></table>
            <table id="wanted">
                <tr><th>a</th><th>b</th><th>c</th></tr>
                <tr><td colspan="2">x</td><td>y</td></tr>
                <tr><td>short</td></tr>
            </table>
        "#;
        let mut data = Dataset::new();
        import_set(&mut data, html.as_bytes(), &FormatOptions::new().with_table_id("wanted")).unwrap();
        assert_eq!(data.width(), 3);
        assert_eq!(data.get_row(0).unwrap(), vec![CellValue::from("x"), CellValue::from("x"), CellValue::from("y")]);
        assert_eq!(data.get_row(1).unwrap()[2], CellValue::from(""));
    }

    #[test]
    fn test_import_missing_table() {
        let mut data = Dataset::new();
        assert!(matches!(
            import_set(&mut data, b"<p>none</p>", &FormatOptions::default()),
            Err(DatasetError::Parse(_))
        ));
        assert!(import_set(&mut data, b"<table></table>", &FormatOptions::new().with_table_id("x")).is_err());
    }

    #[test]
    fn test_book_export() {
        let book = Databook::from_sheets(vec![people().with_title("staff")]);
        let payload = export_book(&book, &FormatOptions::default()).unwrap();
        assert!(payload.as_text().unwrap().starts_with("<h3>staff</h3>\n<table>"));
    }
}
