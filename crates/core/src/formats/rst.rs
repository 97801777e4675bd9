//! reStructuredText tables.
//!
//! A simple table is used while the first column never needs wrapping,
//! otherwise a grid table. Column widths follow each column's median text
//! length when the natural widths would exceed `max_table_width`.

use crate::book::Databook;
use crate::cell::CellValue;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::options::FormatOptions;
use crate::registry::{FormatHandler, Payload};

/// Characters of padding and border each grid column adds
const GRID_PADDING: usize = 3;

pub(crate) fn handler() -> FormatHandler {
    FormatHandler::new("rst")
        .with_extensions(&["rst"])
        .with_export_set(export_set)
        .with_export_book(export_book)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Justify {
    Left,
    Center,
}

fn text_len(text: &str) -> usize {
    text.chars().count()
}

fn max_word_len(text: &str) -> usize {
    text.split_whitespace().map(text_len).max().unwrap_or(0)
}

fn median(values: &mut [usize]) -> usize {
    if values.is_empty() {
        return 0;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]).div_ceil(2)
    } else {
        values[mid]
    }
}

/// Greedy word wrap. Words longer than `width` are kept whole.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && text_len(&line) + 1 + text_len(word) > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn pad(text: &str, width: usize, justify: Justify) -> String {
    let fill = width.saturating_sub(text_len(text));
    match justify {
        Justify::Left => format!("{text}{}", " ".repeat(fill)),
        Justify::Center => {
            let left = fill / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(fill - left))
        }
    }
}

/// Column widths for the header row and cell text of `grid`
fn column_widths(headers: Option<&[String]>, rows: &[Vec<String>], width: usize, max_table_width: usize) -> Vec<usize> {
    let mut lengths: Vec<Vec<usize>> = vec![Vec::new(); width];
    let mut word_lens = vec![0usize; width];
    if let Some(headers) = headers {
        for (i, header) in headers.iter().enumerate() {
            lengths[i].push(text_len(header));
            word_lens[i] = max_word_len(header);
        }
    }
    for row in rows {
        for (i, text) in row.iter().enumerate() {
            lengths[i].push(text_len(text));
            word_lens[i] = word_lens[i].max(max_word_len(text));
        }
    }

    let natural: Vec<usize> = lengths
        .iter()
        .map(|lens| lens.iter().copied().max().unwrap_or(0))
        .collect();
    let available = max_table_width.saturating_sub(GRID_PADDING * width + 1);
    if natural.iter().sum::<usize>() <= available {
        return natural;
    }

    let medians: Vec<usize> = lengths.iter_mut().map(|lens| median(lens).max(1)).collect();
    let total: usize = medians.iter().sum();
    medians
        .iter()
        .zip(&word_lens)
        .zip(&natural)
        .map(|((&m, &word), &nat)| (available * m / total).max(word).min(nat).max(1))
        .collect()
}

fn row_lines(cells: &[String], widths: &[usize], justify: Justify) -> Vec<Vec<String>> {
    let wrapped: Vec<Vec<String>> = cells
        .iter()
        .zip(widths)
        .map(|(text, &width)| wrap(text, width))
        .collect();
    let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);
    (0..height)
        .map(|line| {
            wrapped
                .iter()
                .zip(widths)
                .map(|(cell, &width)| pad(cell.get(line).map_or("", String::as_str), width, justify))
                .collect()
        })
        .collect()
}

fn simple_table(headers: Option<&[String]>, rows: &[Vec<String>], widths: &[usize]) -> String {
    let border = widths.iter().map(|&w| "=".repeat(w)).collect::<Vec<_>>().join("  ");
    let render = |cells: &[String], out: &mut Vec<String>| {
        for line in row_lines(cells, widths, Justify::Left) {
            out.push(line.join("  ").trim_end().to_string());
        }
    };

    let mut lines = vec![border.clone()];
    if let Some(headers) = headers {
        render(headers, &mut lines);
        lines.push(border.clone());
    }
    for row in rows {
        render(row, &mut lines);
    }
    lines.push(border);
    lines.join("\n")
}

fn grid_table(headers: Option<&[String]>, rows: &[Vec<String>], widths: &[usize]) -> String {
    let rule = |c: char| {
        let segments: Vec<String> = widths.iter().map(|&w| c.to_string().repeat(w + 2)).collect();
        format!("+{}+", segments.join("+"))
    };
    let render = |cells: &[String], justify: Justify, out: &mut Vec<String>| {
        for line in row_lines(cells, widths, justify) {
            out.push(format!("| {} |", line.join(" | ")));
        }
    };

    let row_sep = rule('-');
    let mut lines = vec![row_sep.clone()];
    if let Some(headers) = headers {
        render(headers, Justify::Center, &mut lines);
        lines.push(rule('='));
    }
    for row in rows {
        render(row, Justify::Left, &mut lines);
        lines.push(row_sep.clone());
    }
    lines.join("\n")
}

fn render(dataset: &Dataset, options: &FormatOptions) -> Result<String> {
    let rows: Vec<Vec<String>> = dataset
        .formatted_rows()?
        .iter()
        .map(|row| row.iter().map(CellValue::as_str).collect())
        .collect();
    if rows.is_empty() {
        return Ok(String::new());
    }

    let headers = dataset.headers();
    let widths = column_widths(headers, &rows, dataset.width(), options.max_table_width);
    let first_fits = widths.first().is_some_and(|&w| {
        headers
            .and_then(|h| h.first())
            .into_iter()
            .chain(rows.iter().filter_map(|row| row.first()))
            .all(|text| text_len(text) <= w)
    });

    if first_fits && !options.force_grid {
        Ok(simple_table(headers, &rows, &widths))
    } else {
        Ok(grid_table(headers, &rows, &widths))
    }
}

fn export_set(dataset: &Dataset, options: &FormatOptions) -> Result<Payload> {
    Ok(Payload::Text(render(dataset, options)?))
}

/// Sheets separated by a blank line
fn export_book(book: &Databook, options: &FormatOptions) -> Result<Payload> {
    let tables = book
        .sheets()
        .iter()
        .map(|sheet| render(sheet, options))
        .collect::<Result<Vec<_>>>()?;
    Ok(Payload::Text(tables.join("\n\n")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters() -> Dataset {
        let mut data = Dataset::new().with_headers(["A", "B", "C"]).unwrap();
        data.append(vec!["4", "5", "6"]).unwrap();
        data
    }

    #[test]
    fn test_simple_table() {
        let payload = export_set(&letters(), &FormatOptions::default()).unwrap();
        assert_eq!(payload.as_text(), Some("=  =  =\nA  B  C\n=  =  =\n4  5  6\n=  =  ="));
    }

    #[test]
    fn test_forced_grid_table() {
        let payload = export_set(&letters(), &FormatOptions::new().with_force_grid(true)).unwrap();
        assert_eq!(
            payload.as_text(),
            Some("+---+---+---+\n| A | B | C |\n+===+===+===+\n| 4 | 5 | 6 |\n+---+---+---+")
        );
    }

    #[test]
    fn test_wrapped_first_column_uses_grid() {
        let mut data = Dataset::new().with_headers(["text", "n"]).unwrap();
        data.append(vec![CellValue::from("one two three four five"), CellValue::from(1)]).unwrap();
        data.append(vec![CellValue::from("x"), CellValue::from(2)]).unwrap();
        let text = render(&data, &FormatOptions::new().with_max_table_width(20)).unwrap();
        assert!(text.starts_with("+-"));
        assert!(text.lines().all(|line| line.chars().count() <= 20));
        assert!(text.contains("| three"));
    }

    #[test]
    fn test_empty_dataset() {
        assert_eq!(render(&Dataset::new(), &FormatOptions::default()).unwrap(), "");
    }

    #[test]
    fn test_wrap_and_median() {
        assert_eq!(wrap("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap("toolongword", 3), vec!["toolongword"]);
        assert_eq!(median(&mut [5, 1, 3]), 3);
        assert_eq!(median(&mut [1, 2, 3, 4]), 3);
    }

    #[test]
    fn test_book_export() {
        let book = Databook::from_sheets(vec![letters(), letters()]);
        let text = export_book(&book, &FormatOptions::default()).unwrap();
        assert_eq!(text.as_text().unwrap().matches("\n\n").count(), 1);
    }
}
