//! Format-agnostic tabular data for tabset
//!
//! A [`Dataset`] is an in-memory table of rows with optional headers, a title,
//! tagged rows, separators and per-column formatters. A [`Databook`] is an
//! ordered collection of datasets. Import and export go through a [`Registry`]
//! of format handlers keyed by name.
//!
//! # Examples
//!
//! ## Building a dataset
//!
//! ```
//! use tabset_core::{CellValue, Dataset};
//!
//! let mut data = Dataset::new().with_headers(["name", "age"]).unwrap();
//! data.append(vec![CellValue::from("John"), CellValue::from(90)]).unwrap();
//! data.append(vec![CellValue::from("George"), CellValue::from(67)]).unwrap();
//!
//! assert_eq!(data.height(), 2);
//! assert_eq!(data.to_csv().unwrap(), "name,age\r\nJohn,90\r\nGeorge,67\r\n");
//! ```
//!
//! ## Loading with format detection
//!
//! ```
//! use tabset_core::{detect_format, Dataset};
//!
//! assert_eq!(detect_format("a,b,c\n1,2,3\n"), Some("csv"));
//!
//! let data = Dataset::load(r#"[{"a": 1}]"#, None).unwrap();
//! assert_eq!(data.headers().unwrap(), &["a".to_string()]);
//! ```
//!
//! ## Tags and derived views
//!
//! ```
//! use tabset_core::Dataset;
//!
//! let mut data = Dataset::new().with_headers(["city", "pop"]).unwrap();
//! data.append_tagged(vec!["Oslo", "700"], &["north"]).unwrap();
//! data.append_tagged(vec!["Rome", "2800"], &["south"]).unwrap();
//!
//! let north = data.filter("north");
//! assert_eq!(north.height(), 1);
//! ```
//!
//! ## Working with books
//!
//! ```
//! use tabset_core::{Databook, Dataset};
//!
//! let mut book = Databook::new();
//! book.add_sheet(Dataset::new().with_title("Data"));
//! book.add_sheet(Dataset::new().with_title("Summary"));
//!
//! assert_eq!(book.size(), 2);
//! ```

mod book;
mod cell;
mod dataset;
mod error;
mod formats;
mod io;
mod options;
mod package;
mod registry;
mod row;
mod transform;

/// Re-export databook type.
pub use book::Databook;
/// Re-export cell value type.
pub use cell::CellValue;
/// Re-export dataset types.
pub use dataset::{Column, Dataset, Formatter, RowSlice, Separator};
/// Re-export error types.
pub use error::{DatasetError, Result};
/// Re-export format options.
pub use options::FormatOptions;
/// Re-export packaging types.
pub use package::{Package, PackagedRow, SheetPackage};
/// Re-export registry types.
pub use registry::{
    detect_format, DetectFn, ExportBookFn, ExportSetFn, FormatHandler, ImportBookFn, ImportSetFn, Payload, Registry,
};
/// Re-export row type.
pub use row::Row;
