use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Represents a single cell value in a dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Nested sequence, produced by structured formats (JSON/YAML)
    List(Vec<CellValue>),
    /// Nested mapping, produced by structured formats (JSON/YAML)
    Map(IndexMap<String, CellValue>),
}

impl CellValue {
    /// Check if the value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Python-style truthiness: null, `false`, zero and empty containers are falsy
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Null => false,
            CellValue::Bool(b) => *b,
            CellValue::Int(i) => *i != 0,
            CellValue::Float(f) => *f != 0.0,
            CellValue::String(s) => !s.is_empty(),
            CellValue::Date(_) | CellValue::DateTime(_) => true,
            CellValue::List(items) => !items.is_empty(),
            CellValue::Map(map) => !map.is_empty(),
        }
    }

    /// Try to get the value as a boolean
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::Int(i) => Some(*i != 0),
            CellValue::Float(f) => Some(*f != 0.0),
            CellValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to get the value as an integer
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(i) => Some(*i),
            CellValue::Float(f) => Some(*f as i64),
            CellValue::Bool(b) => Some(i64::from(*b)),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to get the value as a float
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Float(f) => Some(*f),
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get the value as a string
    #[must_use]
    pub fn as_str(&self) -> String {
        self.to_string()
    }

    /// Parse a string into a `CellValue` with type inference
    /// Tries: null -> bool -> int -> float -> date -> datetime -> string
    #[must_use]
    pub fn parse(s: &str) -> CellValue {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return CellValue::Null;
        }

        // Note: "1"/"0" are parsed as Int, not Bool
        match trimmed.to_lowercase().as_str() {
            "true" | "yes" => return CellValue::Bool(true),
            "false" | "no" => return CellValue::Bool(false),
            _ => {}
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Int(i);
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Float(f);
        }

        if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return CellValue::Date(d);
        }

        for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
                return CellValue::DateTime(dt);
            }
        }

        CellValue::String(s.to_string())
    }

    fn rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Int(_) | CellValue::Float(_) => 2,
            CellValue::String(_) => 3,
            CellValue::Date(_) => 4,
            CellValue::DateTime(_) => 5,
            CellValue::List(_) => 6,
            CellValue::Map(_) => 7,
        }
    }

    /// Total ordering across cell types, used for sorting.
    ///
    /// Values of different kinds order as
    /// null < bool < number < string < date < datetime < list < map.
    #[must_use]
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Int(_) | CellValue::Float(_), CellValue::Int(_) | CellValue::Float(_)) => {
                let a = self.as_float().unwrap_or_default();
                let b = other.as_float().unwrap_or_default();
                a.total_cmp(&b)
            }
            (CellValue::String(a), CellValue::String(b)) => a.cmp(b),
            (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a.cmp(b),
            (CellValue::List(a), CellValue::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.compare(y);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (CellValue::Map(a), CellValue::Map(b)) => a.len().cmp(&b.len()),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Type-tagged identity string, stable across equal values
    pub(crate) fn key(&self) -> String {
        match self {
            CellValue::Null => "N".to_string(),
            CellValue::Bool(b) => format!("B{b}"),
            CellValue::Int(i) => format!("I{i}"),
            // Integral floats share the int key, matching `compare`
            CellValue::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("I{}", *f as i64),
            CellValue::Float(f) => format!("F{f:?}"),
            CellValue::String(s) => format!("S{s}"),
            CellValue::Date(d) => format!("D{d}"),
            CellValue::DateTime(dt) => format!("T{dt}"),
            CellValue::List(items) => {
                let inner: Vec<String> = items.iter().map(CellValue::key).collect();
                format!("L[{}]", inner.join("\x1e"))
            }
            CellValue::Map(map) => {
                let inner: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{k}\x1d{}", v.key()))
                    .collect();
                format!("M{{{}}}", inner.join("\x1e"))
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, ""),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(fl) => write!(f, "{fl}"),
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::List(_) | CellValue::Map(_) => {
                let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                write!(f, "{text}")
            }
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<u32> for CellValue {
    fn from(i: u32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<f32> for CellValue {
    fn from(f: f32) -> Self {
        CellValue::Float(f64::from(f))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<&String> for CellValue {
    fn from(s: &String) -> Self {
        CellValue::String(s.clone())
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl From<Vec<CellValue>> for CellValue {
    fn from(items: Vec<CellValue>) -> Self {
        CellValue::List(items)
    }
}

impl From<IndexMap<String, CellValue>> for CellValue {
    fn from(map: IndexMap<String, CellValue>) -> Self {
        CellValue::Map(map)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::approx_constant)]
    use super::*;

    #[test]
    fn test_parse_null() {
        assert_eq!(CellValue::parse(""), CellValue::Null);
        assert_eq!(CellValue::parse("  "), CellValue::Null);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(CellValue::parse("true"), CellValue::Bool(true));
        assert_eq!(CellValue::parse("FALSE"), CellValue::Bool(false));
        assert_eq!(CellValue::parse("yes"), CellValue::Bool(true));
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(CellValue::parse("42"), CellValue::Int(42));
        assert_eq!(CellValue::parse("-2.5"), CellValue::Float(-2.5));
    }

    #[test]
    fn test_parse_dates() {
        assert_eq!(
            CellValue::parse("2024-03-01"),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(
            CellValue::parse("2024-03-01T12:30:00"),
            CellValue::DateTime(expected)
        );
    }

    #[test]
    fn test_parse_string_keeps_original() {
        assert_eq!(
            CellValue::parse(" hello "),
            CellValue::String(" hello ".to_string())
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!CellValue::Null.is_truthy());
        assert!(!CellValue::Int(0).is_truthy());
        assert!(!CellValue::String(String::new()).is_truthy());
        assert!(!CellValue::Bool(false).is_truthy());
        assert!(CellValue::from("x").is_truthy());
        assert!(CellValue::Float(0.5).is_truthy());
    }

    #[test]
    fn test_compare_mixed_numbers() {
        assert_eq!(
            CellValue::Int(2).compare(&CellValue::Float(2.5)),
            Ordering::Less
        );
        assert_eq!(
            CellValue::Float(3.0).compare(&CellValue::Int(3)),
            Ordering::Equal
        );
        assert_eq!(
            CellValue::Null.compare(&CellValue::from("a")),
            Ordering::Less
        );
    }

    #[test]
    fn test_key_distinguishes_types() {
        assert_ne!(CellValue::Int(1).key(), CellValue::from("1").key());
        assert_eq!(CellValue::from("a").key(), CellValue::from("a").key());
        assert_eq!(CellValue::Int(1).key(), CellValue::Float(1.0).key());
        assert_ne!(CellValue::Int(1).key(), CellValue::Float(1.5).key());
    }

    #[test]
    fn test_display_nested() {
        let value = CellValue::List(vec![CellValue::Int(1), CellValue::from("a")]);
        assert_eq!(value.to_string(), "[1,\"a\"]");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(CellValue::Int(42).as_float(), Some(42.0));
        assert_eq!(CellValue::Float(3.14).as_int(), Some(3));
        assert_eq!(CellValue::String("42".to_string()).as_int(), Some(42));
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
    }
}
