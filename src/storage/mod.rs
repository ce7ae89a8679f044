// Storage module - the in-memory store a caller hands to the query engine
// The engine only ever reads from these types; filling them is the caller's job

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;

/// A single atomic value stored in a row
/// Serialized as a plain JSON number or string (no variant tag)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Scalar {
    /// Name of the value's type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Integer(_) => "integer",
            Scalar::Real(_) => "real",
            Scalar::Text(_) => "string",
        }
    }

    /// Compare two values
    /// Returns None when the types can't be compared (a string against a number).
    /// Integers and reals are both numbers and compare numerically.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Integer(a), Scalar::Integer(b)) => Some(a.cmp(b)),
            (Scalar::Real(a), Scalar::Real(b)) => Some(compare_reals(*a, *b)),
            (Scalar::Integer(a), Scalar::Real(b)) => Some(compare_integer_real(*a, *b)),
            (Scalar::Real(a), Scalar::Integer(b)) => Some(compare_integer_real(*b, *a).reverse()),
            (Scalar::Text(a), Scalar::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

// NaN has no natural place, so fall back to the IEEE total order
fn compare_reals(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

// i64 range is [-2^63, 2^63)
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Exact integer/real comparison, no rounding of the integer through f64
fn compare_integer_real(a: i64, b: f64) -> Ordering {
    if b.is_nan() {
        return compare_reals(a as f64, b);
    }
    if b >= I64_BOUND {
        return Ordering::Less;
    }
    if b < -I64_BOUND {
        return Ordering::Greater;
    }

    // In range, so the truncated real is an exact i64
    let whole = b.trunc();
    match a.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(b - whole)).unwrap_or(Ordering::Equal),
        other => other,
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(i) => write!(f, "{}", i),
            // Reals always keep their decimal point so they read back as reals
            Scalar::Real(r) if r.is_finite() && r.fract() == 0.0 => write!(f, "{:.1}", r),
            Scalar::Real(r) => write!(f, "{}", r),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Integer(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Real(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

/// A row: an ordered mapping from column name to value
/// Column names are unique and fields keep the order they were inserted in
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, Scalar)>,
}

impl Row {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Builder-style insert, handy when writing stores by hand
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a field
    /// An existing column keeps its position and gets the new value,
    /// a new column is appended at the end
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Scalar>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    /// Look up a field by column name
    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in field order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// (column, value) pairs in field order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "an object mapping column names to numbers or strings")
            }

            // Entries arrive in document order, which becomes the field order
            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Row, A::Error> {
                let mut row = Row::new();
                while let Some((column, value)) = access.next_entry::<String, Scalar>()? {
                    row.insert(column, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

/// A table is an ordered sequence of rows
pub type Table = Vec<Row>;

/// The store: every table by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Store {
    tables: HashMap<String, Table>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a table
    pub fn insert_table(&mut self, name: impl Into<String>, rows: Table) {
        self.tables.insert(name.into(), rows);
    }

    /// Get a table's rows by name
    pub fn table(&self, name: &str) -> Option<&[Row]> {
        self.tables.get(name).map(Vec::as_slice)
    }

    /// List all table names, sorted
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Load a store from JSON text: `{"table": [{"col": value, ...}, ...], ...}`
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load a store from a JSON reader (e.g. a file)
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_comparison_rules() {
        assert_eq!(
            Scalar::Integer(1).compare(&Scalar::Integer(2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Scalar::Integer(10).compare(&Scalar::Real(10.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Scalar::Real(10.5).compare(&Scalar::Integer(10)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Scalar::from("b").compare(&Scalar::from("a")),
            Some(Ordering::Greater)
        );
        assert_eq!(Scalar::from("10").compare(&Scalar::Integer(10)), None);
        assert_eq!(Scalar::Real(f64::NAN).compare(&Scalar::Real(1.0)), Some(Ordering::Greater));
    }

    #[test]
    fn test_integer_real_comparison_is_exact() {
        // 2^53 + 1 has no f64 representation
        let big = Scalar::Integer(9_007_199_254_740_993);
        let real = Scalar::Real(9_007_199_254_740_992.0);
        assert_eq!(big.compare(&real), Some(Ordering::Greater));
        assert_eq!(real.compare(&big), Some(Ordering::Less));
        assert_eq!(
            Scalar::Integer(9_007_199_254_740_992).compare(&real),
            Some(Ordering::Equal)
        );

        assert_eq!(Scalar::Integer(-3).compare(&Scalar::Real(-2.5)), Some(Ordering::Less));
        assert_eq!(Scalar::Integer(-2).compare(&Scalar::Real(-2.5)), Some(Ordering::Greater));
        assert_eq!(Scalar::Integer(2).compare(&Scalar::Real(2.5)), Some(Ordering::Less));
        assert_eq!(
            Scalar::Integer(i64::MAX).compare(&Scalar::Real(9.3e18)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Scalar::Integer(i64::MIN).compare(&Scalar::Real(f64::NEG_INFINITY)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Scalar::Integer(i64::MIN).compare(&Scalar::Real(-9_223_372_036_854_775_808.0)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::Integer(-5).to_string(), "-5");
        assert_eq!(Scalar::Real(10.0).to_string(), "10.0");
        assert_eq!(Scalar::Real(10.5).to_string(), "10.5");
        assert_eq!(Scalar::from("Name1").to_string(), "Name1");
    }

    #[test]
    fn test_row_insert_keeps_position() {
        let mut row = Row::new().with("id", 1).with("name", "Alice");
        row.insert("id", 2);

        assert_eq!(row.len(), 2);
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(row.get("id"), Some(&Scalar::Integer(2)));
        assert_eq!(row.get("age"), None);
    }

    #[test]
    fn test_store_from_json_preserves_field_order() {
        let store = Store::from_json_str(
            r#"{"records": [{"value": 10, "id": 1, "name": "Name1", "ratio": 0.5}]}"#,
        )
        .unwrap();

        let rows = store.table("records").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].columns().collect::<Vec<_>>(),
            vec!["value", "id", "name", "ratio"]
        );
        assert_eq!(rows[0].get("ratio"), Some(&Scalar::Real(0.5)));
        assert_eq!(rows[0].get("name"), Some(&Scalar::from("Name1")));
        assert!(store.table("missing").is_none());
    }

    #[test]
    fn test_store_rejects_non_scalar_fields() {
        assert!(Store::from_json_str(r#"{"t": [{"flag": true}]}"#).is_err());
        assert!(Store::from_json_str(r#"{"t": [{"nested": {"a": 1}}]}"#).is_err());
    }

    #[test]
    fn test_row_serializes_in_field_order() {
        let row = Row::new().with("b", 2).with("a", "x");
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"b":2,"a":"x"}"#);
    }
}
