//! Submodule providing the discretisation pipeline: the JSON control file
//! mapping each variable to a binning method, and the discretiser that turns
//! a raw sample matrix into integer category labels.

use std::{collections::HashMap, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    errors::ParseError,
    matrix::{NA, NamedMatrix},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One variable's entry in the control file: a method name and its optional
/// numeric parameter.
struct MethodSpec {
    method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    buckets: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// A resolved discretisation recipe for one variable.
pub enum Method {
    /// Keep the raw labels; the data is already categorical.
    None,
    /// Two bins split at the given threshold (`value > threshold` is bin 1).
    Threshold(f64),
    /// The given number of equal-count brackets over the sorted values.
    BracketMedians(usize),
    /// Round every value up; each distinct integer is a bin.
    Ceil,
    /// Round every value down; each distinct integer is a bin.
    Floor,
    /// Round every value to the nearest integer; each distinct integer is a
    /// bin.
    Round,
    /// Standardize, then three bins at z = -1 and z = 1.
    ZScore,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
/// The parsed discretisation control file: a JSON object mapping variable
/// names to method specifications. Variables absent from the file keep
/// their raw labels.
pub struct DiscretisationSettings {
    variables: HashMap<String, MethodSpec>,
}

impl DiscretisationSettings {
    /// Parses a control file from a JSON string.
    ///
    /// # Errors
    ///
    /// * If the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a control file.
    ///
    /// # Errors
    ///
    /// * If the file is unreadable or its JSON malformed.
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let json = std::fs::read_to_string(path)
            .map_err(|source| ParseError::Io { path: path.display().to_string(), source })?;
        Self::from_json(&json)
    }

    /// The resolved method for a variable, [`Method::None`] when the control
    /// file has no entry for it.
    ///
    /// # Errors
    ///
    /// * If the entry names an unknown method or lacks its parameter.
    pub fn method_for(&self, variable: &str) -> Result<Method, ParseError> {
        let Some(spec) = self.variables.get(variable) else {
            return Ok(Method::None);
        };
        match spec.method.as_str() {
            "none" => Ok(Method::None),
            "threshold" => spec
                .threshold
                .map(Method::Threshold)
                .ok_or(ParseError::MissingParameter { method: spec.method.clone(), parameter: "threshold" }),
            "bracketMedians" => match spec.buckets {
                Some(0) => Err(ParseError::InvalidParameter {
                    method: spec.method.clone(),
                    parameter: "buckets",
                }),
                Some(buckets) => Ok(Method::BracketMedians(buckets)),
                None => Err(ParseError::MissingParameter {
                    method: spec.method.clone(),
                    parameter: "buckets",
                }),
            },
            "ceil" => Ok(Method::Ceil),
            "floor" => Ok(Method::Floor),
            "round" => Ok(Method::Round),
            "z-score" => Ok(Method::ZScore),
            other => Err(ParseError::UnknownMethod(other.to_owned())),
        }
    }
}

/// Applies the per-variable recipes to a raw sample matrix, producing a
/// matrix of the same shape holding integer bin labels. Cells that are the
/// `NA` sentinel, or that fail to parse as numbers under a numeric method,
/// discretise to `NA`.
///
/// # Errors
///
/// * If a control-file entry is invalid for one of the matrix rows.
pub fn discretise(
    raw: &NamedMatrix<String>,
    settings: &DiscretisationSettings,
) -> Result<NamedMatrix<String>, ParseError> {
    let mut binned = NamedMatrix::new(raw.row_count(), raw.col_count(), String::new());
    // Axis names were unique on the input matrix already.
    let _ = binned.set_row_names(raw.row_names().to_vec());
    let _ = binned.set_col_names(raw.col_names().to_vec());

    for row in 0..raw.row_count() {
        let variable = &raw.row_names()[row];
        let method = settings.method_for(variable)?;
        debug!("discretising `{variable}` with {method:?}");
        let labels = discretise_row(raw.row(row), method);
        for (col, label) in labels.into_iter().enumerate() {
            binned.set(row, col, label);
        }
    }
    Ok(binned)
}

fn discretise_row(cells: &[String], method: Method) -> Vec<String> {
    if let Method::None = method {
        return cells.iter().map(|cell| cell.trim().to_owned()).collect();
    }

    let values: Vec<Option<f64>> = cells
        .iter()
        .map(|cell| {
            let cell = cell.trim();
            if cell == NA { None } else { cell.parse::<f64>().ok() }
        })
        .collect();

    match method {
        Method::None => unreachable!("handled above"),
        Method::Threshold(threshold) => {
            map_values(&values, |value| usize::from(value > threshold).to_string())
        }
        Method::Ceil => map_values(&values, |value| (value.ceil() as i64).to_string()),
        Method::Floor => map_values(&values, |value| (value.floor() as i64).to_string()),
        Method::Round => map_values(&values, |value| (value.round() as i64).to_string()),
        Method::ZScore => z_score_bins(&values),
        Method::BracketMedians(buckets) => bracket_median_bins(&values, buckets),
    }
}

fn map_values(values: &[Option<f64>], mut bin: impl FnMut(f64) -> String) -> Vec<String> {
    values.iter().map(|value| value.map_or_else(|| NA.to_owned(), &mut bin)).collect()
}

/// Three bins split at one standard deviation below and above the mean. A
/// constant variable collapses into the middle bin.
fn z_score_bins(values: &[Option<f64>]) -> Vec<String> {
    let observed: Vec<f64> = values.iter().flatten().copied().collect();
    if observed.is_empty() {
        return values.iter().map(|_| NA.to_owned()).collect();
    }
    let count = observed.len() as f64;
    let mean = observed.iter().sum::<f64>() / count;
    let variance = observed.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count;
    let deviation = variance.sqrt();

    map_values(values, |value| {
        if deviation == 0.0 {
            "1".to_owned()
        } else {
            let z = (value - mean) / deviation;
            if z < -1.0 {
                "0".to_owned()
            } else if z > 1.0 {
                "2".to_owned()
            } else {
                "1".to_owned()
            }
        }
    })
}

/// Equal-count brackets over the sorted observed values; a value's bin is
/// its rank scaled into the bucket count.
fn bracket_median_bins(values: &[Option<f64>], buckets: usize) -> Vec<String> {
    let mut sorted: Vec<f64> = values.iter().flatten().copied().collect();
    sorted.sort_by(f64::total_cmp);
    if sorted.is_empty() {
        return values.iter().map(|_| NA.to_owned()).collect();
    }
    let len = sorted.len();

    map_values(values, |value| {
        let rank = sorted.partition_point(|other| other.total_cmp(&value).is_lt());
        let bin = (rank * buckets / len).min(buckets - 1);
        bin.to_string()
    })
}
