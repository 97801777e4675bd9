//! Spreadsheet formats: xlsx export through rust_xlsxwriter, xlsx/xls/ods import through calamine.

use crate::book::Databook;
use crate::cell::CellValue;
use crate::dataset::Dataset;
use crate::error::{DatasetError, Result};
use crate::options::FormatOptions;
use crate::package::PackagedRow;
use crate::registry::{FormatHandler, Payload};
use calamine::{open_workbook_auto_from_rs, Data, Ods, Range, Reader, Xls, Xlsx};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};
use std::io::Cursor;

/// Worksheet name used when a dataset has no title
const DEFAULT_SHEET_NAME: &str = "Tabset Dataset";
const MAX_SHEET_NAME: usize = 31;

pub(crate) fn handler() -> FormatHandler {
    FormatHandler::new("xlsx")
        .with_extensions(&["xlsx"])
        .with_export_set(export_set)
        .with_import_set(import_set)
        .with_export_book(export_book)
        .with_import_book(import_book)
        .with_detect(detect_xlsx)
}

pub(crate) fn xls_handler() -> FormatHandler {
    FormatHandler::new("xls")
        .with_extensions(&["xls"])
        .with_import_set(import_set)
        .with_import_book(import_book)
        .with_detect(detect_xls)
}

pub(crate) fn ods_handler() -> FormatHandler {
    FormatHandler::new("ods")
        .with_extensions(&["ods"])
        .with_import_set(import_set)
        .with_import_book(import_book)
        .with_detect(detect_ods)
}

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        // Excel serial date (days since 1899-12-30)
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::parse(s),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

/// Worksheet name with forbidden characters replaced and length capped
fn sheet_name(title: Option<&str>, subst: &str) -> String {
    let title = title.unwrap_or(DEFAULT_SHEET_NAME);
    let cleaned: String = title
        .chars()
        .map(|c| {
            if matches!(c, '\\' | '*' | '?' | ':' | '/' | '[' | ']') {
                subst.to_string()
            } else {
                c.to_string()
            }
        })
        .collect();
    let cleaned: String = cleaned.chars().take(MAX_SHEET_NAME).collect();
    if cleaned.trim().is_empty() {
        DEFAULT_SHEET_NAME.to_string()
    } else {
        cleaned
    }
}

fn excel_date(date: NaiveDate) -> Result<ExcelDateTime> {
    Ok(ExcelDateTime::from_ymd(
        date.year() as u16,
        date.month() as u8,
        date.day() as u8,
    )?)
}

fn excel_datetime(dt: NaiveDateTime) -> Result<ExcelDateTime> {
    Ok(excel_date(dt.date())?.and_hms(
        dt.hour() as u16,
        dt.minute() as u8,
        f64::from(dt.second()),
    )?)
}

struct Formats {
    bold: Format,
    wrap: Format,
    date: Format,
    datetime: Format,
}

impl Formats {
    fn new() -> Self {
        Formats {
            bold: Format::new().set_bold(),
            wrap: Format::new().set_text_wrap(),
            date: Format::new().set_num_format("yyyy-mm-dd"),
            datetime: Format::new().set_num_format("yyyy-mm-dd hh:mm:ss"),
        }
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    (row, col): (u32, u16),
    cell: &CellValue,
    bold: bool,
    formats: &Formats,
    options: &FormatOptions,
) -> Result<()> {
    match cell {
        CellValue::Null => {}
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::Int(i) => {
            // Excel stores every number as f64
            worksheet.write_number(row, col, *i as f64)?;
        }
        CellValue::Float(f) => {
            worksheet.write_number(row, col, *f)?;
        }
        CellValue::Date(d) => {
            worksheet.write_datetime_with_format(row, col, &excel_date(*d)?, &formats.date)?;
        }
        CellValue::DateTime(dt) => {
            worksheet.write_datetime_with_format(row, col, &excel_datetime(*dt)?, &formats.datetime)?;
        }
        other => {
            let mut text = other.as_str();
            if options.escape {
                text = text.trim_start_matches('=').to_string();
            }
            if bold {
                worksheet.write_string_with_format(row, col, &text, &formats.bold)?;
            } else if text.contains('\n') {
                worksheet.write_string_with_format(row, col, &text, &formats.wrap)?;
            } else {
                worksheet.write_string(row, col, &text)?;
            }
        }
    }
    Ok(())
}

fn write_worksheet(worksheet: &mut Worksheet, dataset: &Dataset, options: &FormatOptions) -> Result<()> {
    let formats = Formats::new();
    let mut header_pending = dataset.headers().is_some();

    for (row_idx, line) in dataset.packaged_with_separators()?.iter().enumerate() {
        let row_num = u32::try_from(row_idx).map_err(|_| DatasetError::Parse("row index overflow".to_string()))?;
        match line {
            PackagedRow::Separator(text) => {
                worksheet.write_string_with_format(row_num, 0, text, &formats.bold)?;
            }
            PackagedRow::Cells(cells) => {
                let bold = header_pending;
                header_pending = false;
                for (col_idx, cell) in cells.iter().enumerate() {
                    let col_num =
                        u16::try_from(col_idx).map_err(|_| DatasetError::Parse("column index overflow".to_string()))?;
                    write_cell(worksheet, (row_num, col_num), cell, bold, &formats, options)?;
                }
                if bold && options.freeze_panes {
                    worksheet.set_freeze_panes(row_num + 1, 0)?;
                }
            }
        }
    }
    Ok(())
}

fn export_set(dataset: &Dataset, options: &FormatOptions) -> Result<Payload> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(dataset.title(), &options.invalid_char_subst))?;
    write_worksheet(worksheet, dataset, options)?;
    Ok(Payload::Binary(workbook.save_to_buffer()?))
}

fn export_book(book: &Databook, options: &FormatOptions) -> Result<Payload> {
    let mut workbook = Workbook::new();
    let mut used: Vec<String> = Vec::new();

    for sheet in book {
        let base = sheet_name(sheet.title(), &options.invalid_char_subst);
        let mut name = base.clone();
        let mut n = 2;
        // Worksheet names must be unique, case-insensitively
        while used.iter().any(|u| u.eq_ignore_ascii_case(&name)) {
            let suffix = format!(" ({n})");
            let keep = MAX_SHEET_NAME.saturating_sub(suffix.len());
            name = format!("{}{suffix}", base.chars().take(keep).collect::<String>());
            n += 1;
        }
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name)?;
        write_worksheet(worksheet, sheet, options)?;
        used.push(name);
    }

    Ok(Payload::Binary(workbook.save_to_buffer()?))
}

/// Replace a dataset's contents from one worksheet range
fn fill_dataset(dataset: &mut Dataset, title: &str, range: &Range<Data>, options: &FormatOptions) -> Result<()> {
    dataset.wipe();
    dataset.set_title(Some(title));

    let mut rows = range
        .rows()
        .skip(options.skip_lines)
        .map(|row| row.iter().map(data_to_cell_value).collect::<Vec<_>>());

    if options.headers {
        if let Some(header) = rows.next() {
            dataset.set_headers(header.iter().map(CellValue::as_str))?;
        }
    }
    for mut row in rows {
        let width = dataset.width();
        if width > row.len() {
            row.resize(width, CellValue::Null);
        }
        dataset.append(row)?;
    }
    Ok(())
}

fn import_set(dataset: &mut Dataset, input: &[u8], options: &FormatOptions) -> Result<()> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(input))?;
    let Some(name) = workbook.sheet_names().first().cloned() else {
        dataset.wipe();
        return Ok(());
    };
    let range = workbook.worksheet_range(&name)?;
    fill_dataset(dataset, &name, &range, options)
}

fn import_book(book: &mut Databook, input: &[u8], options: &FormatOptions) -> Result<()> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(input))?;
    book.wipe();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let mut sheet = Dataset::new();
        fill_dataset(&mut sheet, &name, &range, options)?;
        book.add_sheet(sheet);
    }
    Ok(())
}

fn detect_xlsx(input: &[u8]) -> bool {
    Xlsx::new(Cursor::new(input)).is_ok()
}

fn detect_xls(input: &[u8]) -> bool {
    Xls::new(Cursor::new(input)).is_ok()
}

fn detect_ods(input: &[u8]) -> bool {
    Ods::new(Cursor::new(input)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Dataset {
        let mut data = Dataset::new().with_headers(["name", "age"]).unwrap().with_title("staff");
        data.append(vec![CellValue::from("John"), CellValue::from(90)]).unwrap();
        data.append(vec![CellValue::from("George"), CellValue::from(67)]).unwrap();
        data
    }

    fn export_bytes(data: &Dataset, options: &FormatOptions) -> Vec<u8> {
        export_set(data, options).unwrap().into_bytes()
    }

    #[test]
    fn test_round_trip() {
        let bytes = export_bytes(&people(), &FormatOptions::default());
        let mut loaded = Dataset::new();
        import_set(&mut loaded, &bytes, &FormatOptions::default()).unwrap();

        assert_eq!(loaded.title(), Some("staff"));
        assert_eq!(loaded.headers().unwrap(), &["name".to_string(), "age".to_string()]);
        assert_eq!(loaded.height(), 2);
        // Int becomes Float in Excel
        assert!(matches!(loaded.get_row(0).unwrap()[1], CellValue::Float(f) if (f - 90.0).abs() < 0.01));
    }

    #[test]
    fn test_import_without_headers_and_skip() {
        let bytes = export_bytes(&people(), &FormatOptions::default());
        let mut loaded = Dataset::new();
        let options = FormatOptions::new().with_headers(false).with_skip_lines(1);
        import_set(&mut loaded, &bytes, &options).unwrap();
        assert!(loaded.headers().is_none());
        assert_eq!(loaded.height(), 2);
        assert_eq!(loaded.get_row(0).unwrap()[0], CellValue::from("John"));
    }

    #[test]
    fn test_escape_strips_formula_prefix() {
        let data = Dataset::from_rows(vec![vec!["=1+1"]]).unwrap();
        let bytes = export_bytes(&data, &FormatOptions::new().with_escape(true));
        let mut loaded = Dataset::new();
        import_set(&mut loaded, &bytes, &FormatOptions::new().with_headers(false)).unwrap();
        assert_eq!(loaded.get_row(0).unwrap()[0], CellValue::from("1+1"));
    }

    #[test]
    fn test_separator_rows_are_written() {
        let mut data = people();
        data.append_separator("total");
        let bytes = export_bytes(&data, &FormatOptions::default());
        let mut loaded = Dataset::new();
        import_set(&mut loaded, &bytes, &FormatOptions::default()).unwrap();
        assert_eq!(loaded.height(), 3);
        assert_eq!(loaded.get_row(2).unwrap()[0], CellValue::from("total"));
        assert_eq!(loaded.get_row(2).unwrap()[1], CellValue::Null);
    }

    #[test]
    fn test_sheet_name() {
        assert_eq!(sheet_name(None, "-"), DEFAULT_SHEET_NAME);
        assert_eq!(sheet_name(Some("a/b:c"), "-"), "a-b-c");
        assert_eq!(sheet_name(Some(&"x".repeat(40)), "-").len(), MAX_SHEET_NAME);
        assert_eq!(sheet_name(Some(""), "-"), DEFAULT_SHEET_NAME);
    }

    #[test]
    fn test_book_round_trip() {
        let numbers = Dataset::from_rows(vec![vec![1, 2]]).unwrap().with_title("Numbers");
        let letters = Dataset::from_rows(vec![vec!["a", "b"]]).unwrap().with_title("Numbers");
        let book = Databook::from_sheets(vec![numbers, letters]);
        let bytes = export_book(&book, &FormatOptions::default()).unwrap().into_bytes();

        let mut loaded = Databook::new();
        import_book(&mut loaded, &bytes, &FormatOptions::new().with_headers(false)).unwrap();
        assert_eq!(loaded.size(), 2);
        assert_eq!(loaded.sheets()[0].title(), Some("Numbers"));
        assert_eq!(loaded.sheets()[1].title(), Some("Numbers (2)"));
    }

    #[test]
    fn test_detect() {
        let bytes = export_bytes(&people(), &FormatOptions::default());
        assert!(detect_xlsx(&bytes));
        assert!(!detect_xlsx(b"a,b\n1,2\n"));
        assert!(!detect_xls(&bytes));
        assert!(!detect_ods(b"[]"));
    }
}
