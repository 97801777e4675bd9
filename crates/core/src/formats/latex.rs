//! LaTeX booktabs tables.

use crate::cell::CellValue;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::options::FormatOptions;
use crate::registry::{FormatHandler, Payload};
use regex::{Captures, Regex};
use std::sync::OnceLock;

pub(crate) fn handler() -> FormatHandler {
    FormatHandler::new("latex")
        .with_extensions(&["tex"])
        .with_export_set(export_set)
}

fn reserved_symbols() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\\{}$&#^_~%]").expect("valid regex"))
}

fn escape_tex(text: &str) -> String {
    reserved_symbols()
        .replace_all(text, |caps: &Captures<'_>| match &caps[0] {
            "\\" => r"\textbackslash{}".to_string(),
            "^" => r"\textasciicircum{}".to_string(),
            "~" => r"\textasciitilde{}".to_string(),
            other => format!("\\{other}"),
        })
        .into_owned()
}

/// First column left aligned, the rest right aligned
fn colspec(width: usize) -> String {
    format!("l{}", "r".repeat(width.saturating_sub(1)))
}

fn midrule(width: usize) -> String {
    if width <= 1 {
        return r"\midrule".to_string();
    }
    (1..=width)
        .map(|col| {
            let trim = match col {
                1 => "r",
                c if c == width => "l",
                _ => "lr",
            };
            format!("\\cmidrule({trim}){{{col}-{col}}}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn serialize_row<'a>(cells: impl IntoIterator<Item = &'a CellValue>) -> String {
    let cells: Vec<String> = cells
        .into_iter()
        .map(|cell| if cell.is_truthy() { escape_tex(&cell.as_str()) } else { String::new() })
        .collect();
    format!("      {} \\\\", cells.join(" & "))
}

fn export_set(dataset: &Dataset, _options: &FormatOptions) -> Result<Payload> {
    let caption = match dataset.title() {
        Some(title) => format!("\\caption{{{}}}", escape_tex(title)),
        None => "%".to_string(),
    };
    let header = match dataset.headers() {
        Some(headers) => serialize_row(&headers.iter().map(CellValue::from).collect::<Vec<_>>()),
        None => String::new(),
    };
    let body: Vec<String> = dataset.formatted_rows()?.iter().map(|row| serialize_row(row)).collect();

    let text = format!(
        "% Note: add \\usepackage{{booktabs}} to your preamble\n\
         %\n\
         \\begin{{table}}[!htbp]\n  \
           \\centering\n  \
           {caption}\n  \
           \\begin{{tabular}}{{{colspec}}}\n    \
             \\toprule\n\
         {header}\n    \
             {midrule}\n\
         {body}\n    \
             \\bottomrule\n  \
           \\end{{tabular}}\n\
         \\end{{table}}\n",
        colspec = colspec(dataset.width()),
        midrule = midrule(dataset.width()),
        body = body.join("\n"),
    );
    Ok(Payload::Text(text))
}
