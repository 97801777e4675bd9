//! Delimiter-separated text: csv and tsv.

use crate::cell::CellValue;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::options::FormatOptions;
use crate::package::Package;
use crate::registry::{FormatHandler, Payload};

/// Bytes sampled by the detector
const DETECT_SAMPLE: usize = 1024;

pub(crate) fn csv_handler() -> FormatHandler {
    FormatHandler::new("csv")
        .with_extensions(&["csv"])
        .with_export_set(export_csv)
        .with_import_set(import_csv)
        .with_detect(detect_csv)
}

pub(crate) fn tsv_handler() -> FormatHandler {
    FormatHandler::new("tsv")
        .with_extensions(&["tsv"])
        .with_export_set(export_tsv)
        .with_import_set(import_tsv)
        .with_detect(detect_tsv)
}

fn export_csv(dataset: &Dataset, options: &FormatOptions) -> Result<Payload> {
    export_delimited(dataset, options.delimiter.unwrap_or(b','))
}

fn export_tsv(dataset: &Dataset, options: &FormatOptions) -> Result<Payload> {
    export_delimited(dataset, options.delimiter.unwrap_or(b'\t'))
}

fn import_csv(dataset: &mut Dataset, input: &[u8], options: &FormatOptions) -> Result<()> {
    import_delimited(dataset, input, options, options.delimiter.unwrap_or(b','))
}

fn import_tsv(dataset: &mut Dataset, input: &[u8], options: &FormatOptions) -> Result<()> {
    import_delimited(dataset, input, options, options.delimiter.unwrap_or(b'\t'))
}

fn detect_csv(input: &[u8]) -> bool {
    detect_delimited(input, b',')
}

fn detect_tsv(input: &[u8]) -> bool {
    detect_delimited(input, b'\t')
}

/// Header row (if any) then one record per row, CRLF terminated
fn export_delimited(dataset: &Dataset, delimiter: u8) -> Result<Payload> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::CRLF)
        .flexible(true)
        .from_writer(Vec::new());

    if let Package::Grid(rows) = dataset.package(false)? {
        for row in rows {
            writer.write_record(row.iter().map(CellValue::as_str))?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(Payload::Text(std::str::from_utf8(&bytes)?.to_string()))
}

fn import_delimited(dataset: &mut Dataset, input: &[u8], options: &FormatOptions, delimiter: u8) -> Result<()> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false) // We handle headers ourselves
        .flexible(true)
        .from_reader(input);

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let row: Vec<CellValue> = record
            .iter()
            .map(|field| {
                if options.infer_types {
                    CellValue::parse(field)
                } else {
                    CellValue::String(field.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    dataset.wipe();
    let mut rows = rows.into_iter();
    if options.headers {
        if let Some(header) = rows.next() {
            dataset.set_headers(header.iter().map(CellValue::as_str))?;
        }
    }
    for mut row in rows {
        let width = dataset.width();
        if width > row.len() {
            row.resize(width, CellValue::String(String::new()));
        }
        dataset.append(row)?;
    }
    Ok(())
}

/// At least one sampled record has more than one field and all sampled
/// records agree on their field count
fn detect_delimited(input: &[u8], delimiter: u8) -> bool {
    let sample = &input[..input.len().min(DETECT_SAMPLE)];
    let text = match std::str::from_utf8(sample) {
        Ok(text) => text,
        // Multi-byte character cut by the sample boundary
        Err(e) if e.error_len().is_none() => std::str::from_utf8(&sample[..e.valid_up_to()]).unwrap_or_default(),
        Err(_) => return false,
    };
    // Drop a line cut off by the sample boundary
    let text = if input.len() > DETECT_SAMPLE {
        text.rsplit_once('\n').map_or(text, |(head, _)| head)
    } else {
        text
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut widths = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) if record.iter().all(str::is_empty) => {}
            Ok(record) => widths.push(record.len()),
            Err(_) => return false,
        }
    }
    match widths.first() {
        Some(&first) => first > 1 && widths.iter().all(|&w| w == first),
        None => false,
    }
}
