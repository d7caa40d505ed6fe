//! Column-wise reducers used when several original rows are merged
//! into one representative row.
//!
//! Numeric columns are reduced by median or mean. External record
//! columns are tried as numbers first; if any present value fails to
//! parse, the column falls back to its most frequent literal.

use crate::lentil_common::*;
use matrix_util::column_stat::{nan_mean, nan_median};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    #[default]
    Median,
    Mean,
    /// Most frequent value; ties go to the first one seen
    Frequency,
}

impl FromStr for Reducer {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "median" => Ok(Reducer::Median),
            "mean" => Ok(Reducer::Mean),
            "frequency" => Ok(Reducer::Frequency),
            _ => Err(ConfigError::UnknownReducer(s.to_string())),
        }
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reducer::Median => "median",
            Reducer::Mean => "mean",
            Reducer::Frequency => "frequency",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of reducing one column of records
#[derive(Debug, Clone, PartialEq)]
pub enum ReducedValue {
    Number(f64),
    Literal(Box<str>),
    Missing,
}

impl From<ReducedValue> for serde_json::Value {
    fn from(value: ReducedValue) -> Self {
        match value {
            ReducedValue::Number(x) => serde_json::Number::from_f64(round3(x))
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            ReducedValue::Literal(s) => serde_json::Value::String(s.into()),
            ReducedValue::Missing => serde_json::Value::Null,
        }
    }
}

impl Reducer {
    /// Whether this reducer summarizes numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, Reducer::Median | Reducer::Mean)
    }

    /// Reduce numeric values, skipping `NaN`s. `None` if nothing is
    /// present or the reducer is not numeric.
    pub fn reduce_numbers(&self, values: &[f64]) -> Option<f64> {
        match self {
            Reducer::Median => nan_median(values),
            Reducer::Mean => nan_mean(values),
            Reducer::Frequency => None,
        }
    }

    /// Reduce one column of literal record values.
    ///
    /// Empty strings count as missing. With a numeric reducer, every
    /// present value is parsed first; a single failure switches the
    /// whole column to [`most_frequent`].
    pub fn reduce_literals<S: AsRef<str>>(&self, values: &[S]) -> ReducedValue {
        let present: Vec<&str> = values
            .iter()
            .map(|x| x.as_ref().trim())
            .filter(|x| !x.is_empty())
            .collect();

        if present.is_empty() {
            return ReducedValue::Missing;
        }

        if self.is_numeric() {
            if let Some(numbers) = parse_all(&present) {
                return self
                    .reduce_numbers(&numbers)
                    .map(ReducedValue::Number)
                    .unwrap_or(ReducedValue::Missing);
            }
        }

        most_frequent(&present)
            .map(|x| ReducedValue::Literal(x.into()))
            .unwrap_or(ReducedValue::Missing)
    }
}

fn parse_all(values: &[&str]) -> Option<Vec<f64>> {
    values.iter().map(|x| x.parse::<f64>().ok()).collect()
}

/// Most frequent value, breaking ties by first appearance
pub fn most_frequent<'a>(values: &[&'a str]) -> Option<&'a str> {
    let mut freq: HashMap<&str, usize> = HashMap::default();
    for &v in values {
        *freq.entry(v).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for &v in values {
        let n = freq[v];
        match best {
            Some((_, m)) if m >= n => {}
            _ => best = Some((v, n)),
        }
    }
    best.map(|(v, _)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reducer() {
        assert_eq!("median".parse::<Reducer>().unwrap(), Reducer::Median);
        assert_eq!("Mean".parse::<Reducer>().unwrap(), Reducer::Mean);
        assert_eq!("frequency".parse::<Reducer>().unwrap(), Reducer::Frequency);
        assert_eq!(
            "mode".parse::<Reducer>(),
            Err(ConfigError::UnknownReducer("mode".into()))
        );
    }

    #[test]
    fn test_numeric_columns() {
        assert_eq!(
            Reducer::Mean.reduce_literals(&["10", "30"]),
            ReducedValue::Number(20.0)
        );
        assert_eq!(
            Reducer::Median.reduce_literals(&["1", "5", "2"]),
            ReducedValue::Number(2.0)
        );
        assert_eq!(
            Reducer::Median.reduce_literals(&["1", "", "3"]),
            ReducedValue::Number(2.0)
        );
    }

    #[test]
    fn test_fallback_to_frequency() {
        assert_eq!(
            Reducer::Mean.reduce_literals(&["x", "y", "x", "3"]),
            ReducedValue::Literal("x".into())
        );
        assert_eq!(
            Reducer::Frequency.reduce_literals(&["1", "2", "2"]),
            ReducedValue::Literal("2".into())
        );
        assert_eq!(
            Reducer::Median.reduce_literals::<&str>(&["", " "]),
            ReducedValue::Missing
        );
    }

    #[test]
    fn test_most_frequent_ties() {
        assert_eq!(most_frequent(&["b", "a", "a", "b"]), Some("b"));
        assert_eq!(most_frequent(&["c", "a", "b"]), Some("c"));
        assert_eq!(most_frequent(&[]), None);
    }

    #[test]
    fn test_json_value() {
        let v: serde_json::Value = ReducedValue::Number(1.23456).into();
        assert_eq!(v, serde_json::json!(1.235));
        let v: serde_json::Value = ReducedValue::Literal("x".into()).into();
        assert_eq!(v, serde_json::json!("x"));
    }
}
