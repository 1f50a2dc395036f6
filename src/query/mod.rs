//! Read-only queries over exported shards.
//!
//! Selects, orders and filters shard elements and renders each match as one
//! comma-joined line:
//!
//! ```text
//! stbs query -s TITLE,REV,DATE -o DATE,TITLE -f PROVIDER="warner bros"
//! ```

use std::cmp::Ordering;
use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::shard::read_shard;
use crate::validate::{normalize_field, FIELD_NAMES};

/// A parsed query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Projected fields, in output order. Empty means every field.
    pub select: Vec<&'static str>,
    /// Sort fields, most significant first.
    pub order: Vec<&'static str>,
    /// Exact-match `field=value` predicate.
    pub filter: Option<(&'static str, String)>,
}

impl QueryOptions {
    /// Build options from the raw `-s`, `-o` and `-f` arguments.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownField` for an unrecognized field name and
    /// `Error::InvalidArgument` for a filter that isn't `FIELD=VALUE`.
    pub fn parse(select: Option<&str>, order: Option<&str>, filter: Option<&str>) -> Result<Self> {
        let filter = filter
            .map(|raw| {
                let (field, value) = raw.split_once('=').ok_or_else(|| {
                    Error::InvalidArgument(format!("filter '{raw}' must look like FIELD=VALUE"))
                })?;
                if value.contains('=') {
                    return Err(Error::InvalidArgument(format!(
                        "filter '{raw}' has more than one '='"
                    )));
                }
                Ok((resolve_field(field)?, value.to_string()))
            })
            .transpose()?;

        Ok(Self {
            select: select.map(parse_field_list).transpose()?.unwrap_or_default(),
            order: order.map(parse_field_list).transpose()?.unwrap_or_default(),
            filter,
        })
    }

    /// Fields each output line is made of.
    #[must_use]
    pub fn fields(&self) -> &[&'static str] {
        if self.select.is_empty() {
            &FIELD_NAMES
        } else {
            &self.select
        }
    }
}

fn parse_field_list(raw: &str) -> Result<Vec<&'static str>> {
    raw.split(',')
        .filter(|f| !f.trim().is_empty())
        .map(resolve_field)
        .collect()
}

fn resolve_field(name: &str) -> Result<&'static str> {
    normalize_field(name).map_err(|(field, suggestion)| Error::UnknownField { field, suggestion })
}

/// Run a query over the given shards and return the rendered lines.
///
/// # Errors
///
/// Returns an error if a shard cannot be read or parsed.
pub fn run_query(shards: &[PathBuf], options: &QueryOptions) -> Result<Vec<String>> {
    let mut rows = load_rows(shards)?;

    if let Some((field, value)) = &options.filter {
        rows.retain(|row| matches_filter(row, field, value));
    }

    rows.sort_by(|a, b| compare_rows(a, b, &options.order));
    debug!(rows = rows.len(), "Query matched");

    let fields = options.fields();
    Ok(rows
        .iter()
        .map(|row| {
            fields
                .iter()
                .map(|f| field_text(row, f))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect())
}

/// Read every object element of every shard, in shard then array order.
fn load_rows(shards: &[PathBuf]) -> Result<Vec<Map<String, Value>>> {
    let mut rows = Vec::new();
    for path in shards {
        for (index, element) in read_shard(path)?.into_iter().enumerate() {
            match element {
                Value::Object(row) => rows.push(row),
                _ => warn!(path = %path.display(), index, "Skipping non-object shard element"),
            }
        }
    }
    Ok(rows)
}

fn field_text(row: &Map<String, Value>, field: &str) -> String {
    match row.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn matches_filter(row: &Map<String, Value>, field: &str, expected: &str) -> bool {
    match row.get(field) {
        Some(Value::Number(n)) => match (n.as_f64(), expected.trim().parse::<f64>()) {
            (Some(actual), Ok(wanted)) => (actual - wanted).abs() < f64::EPSILON,
            _ => n.to_string() == expected,
        },
        _ => field_text(row, field) == expected,
    }
}

fn compare_rows(a: &Map<String, Value>, b: &Map<String, Value>, order: &[&str]) -> Ordering {
    order
        .iter()
        .map(|field| compare_field(a.get(*field), b.get(*field)))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_field(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_shards(dir: &TempDir) -> Vec<PathBuf> {
        let first = dir.path().join("records-1.json");
        let second = dir.path().join("records-2.json");
        fs::write(
            &first,
            r#"[
                {"KEY":"stb1the matrix2014-04-01","STB":"stb1","TITLE":"the matrix","PROVIDER":"warner bros","DATE":"2014-04-01","REV":4.0,"VIEW_TIME":"1:30"},
                {"KEY":"stb2the hobbit2014-04-02","STB":"stb2","TITLE":"the hobbit","PROVIDER":"warner bros","DATE":"2014-04-02","REV":8.0,"VIEW_TIME":"2:45"}
            ]"#,
        )
        .unwrap();
        fs::write(
            &second,
            r#"[
                {"KEY":"stb1unbreakable2014-04-03","STB":"stb1","TITLE":"unbreakable","PROVIDER":"buena vista","DATE":"2014-04-03","REV":6.0,"VIEW_TIME":"2:05"},
                {"KEY":"stb3the matrix2014-04-02","STB":"stb3","TITLE":"the matrix","PROVIDER":"warner bros","DATE":"2014-04-02","REV":4.0,"VIEW_TIME":"1:05"}
            ]"#,
        )
        .unwrap();
        vec![first, second]
    }

    #[test]
    fn test_parse_options() {
        let options = QueryOptions::parse(Some("title,rev"), Some("date"), Some("stb=stb1")).unwrap();

        assert_eq!(options.select, vec!["TITLE", "REV"]);
        assert_eq!(options.order, vec!["DATE"]);
        assert_eq!(options.filter, Some(("STB", "stb1".to_string())));
    }

    #[test]
    fn test_parse_options_errors() {
        assert!(matches!(
            QueryOptions::parse(Some("titel"), None, None),
            Err(Error::UnknownField { .. })
        ));
        assert!(matches!(
            QueryOptions::parse(None, None, Some("stb")),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            QueryOptions::parse(None, None, Some("stb=a=b")),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_select_and_order() {
        let temp_dir = TempDir::new().unwrap();
        let shards = write_shards(&temp_dir);
        let options = QueryOptions::parse(Some("TITLE,REV,DATE"), Some("DATE,TITLE"), None).unwrap();

        let lines = run_query(&shards, &options).unwrap();

        assert_eq!(
            lines,
            vec![
                "the matrix,4.0,2014-04-01",
                "the hobbit,8.0,2014-04-02",
                "the matrix,4.0,2014-04-02",
                "unbreakable,6.0,2014-04-03",
            ]
        );
    }

    #[test]
    fn test_filter_exact_match() {
        let temp_dir = TempDir::new().unwrap();
        let shards = write_shards(&temp_dir);
        let options = QueryOptions::parse(Some("STB,TITLE"), Some("STB"), Some("TITLE=the matrix")).unwrap();

        let lines = run_query(&shards, &options).unwrap();

        assert_eq!(lines, vec!["stb1,the matrix", "stb3,the matrix"]);
    }

    #[test]
    fn test_filter_revenue_numerically() {
        let temp_dir = TempDir::new().unwrap();
        let shards = write_shards(&temp_dir);
        let options = QueryOptions::parse(Some("TITLE"), Some("TITLE"), Some("REV=8.00")).unwrap();

        assert_eq!(run_query(&shards, &options).unwrap(), vec!["the hobbit"]);
    }

    #[test]
    fn test_order_by_revenue_is_numeric() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("revs.json");
        fs::write(&path, r#"[{"TITLE":"a","REV":10.0},{"TITLE":"b","REV":9.0}]"#).unwrap();
        let options = QueryOptions::parse(Some("TITLE"), Some("REV"), None).unwrap();

        assert_eq!(run_query(&[path], &options).unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_default_select_is_every_field() {
        let temp_dir = TempDir::new().unwrap();
        let shards = write_shards(&temp_dir);
        let options = QueryOptions::parse(None, Some("KEY"), Some("STB=stb2")).unwrap();

        let lines = run_query(&shards, &options).unwrap();

        assert_eq!(
            lines,
            vec!["stb2the hobbit2014-04-02,stb2,the hobbit,warner bros,2014-04-02,8.0,2:45"]
        );
    }

    #[test]
    fn test_missing_shard_is_an_error() {
        let options = QueryOptions::default();
        let result = run_query(&[PathBuf::from("/nonexistent/records-1.json")], &options);
        assert!(matches!(result, Err(Error::ShardNotFound { .. })));
    }
}
