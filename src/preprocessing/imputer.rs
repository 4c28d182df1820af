//! Missing value imputation

use crate::error::{PrepError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Strategy for filling missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ImputeStrategy {
    /// Replace with the column median (numeric columns)
    Median,
    /// Replace with the most frequent value (categorical columns)
    MostFrequent,
}

/// A learned per-column fill value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FillValue {
    Numeric(f64),
    Category(String),
}

/// Imputer for handling missing values.
///
/// `fit` learns one fill value per column from the training data; `transform`
/// replaces nulls with the learned value and leaves everything else untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    strategy: ImputeStrategy,
    fill_values: BTreeMap<String, FillValue>,
    is_fitted: bool,
}

impl Imputer {
    /// Create a new imputer with the specified strategy
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self {
            strategy,
            fill_values: BTreeMap::new(),
            is_fitted: false,
        }
    }

    /// Learn fill values for the given columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df.column(col_name).map_err(|_| {
                PrepError::TransformError(format!("column `{col_name}` not found while fitting"))
            })?;

            let fill_value = self.compute_fill_value(col_name, column.as_materialized_series())?;
            self.fill_values.insert(col_name.to_string(), fill_value);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace nulls in the fitted columns with the learned fill values
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PrepError::NotFitted);
        }

        let mut result = df.clone();

        for (col_name, fill_value) in &self.fill_values {
            if let Ok(col) = df.column(col_name) {
                let filled = Self::fill_series(col.as_materialized_series(), fill_value)?;
                result = result
                    .with_column(filled)
                    .map_err(|e| PrepError::TransformError(e.to_string()))?
                    .clone();
            }
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// The learned fill value for a column, if fitted
    pub fn fill_value(&self, column: &str) -> Option<&FillValue> {
        self.fill_values.get(column)
    }

    fn compute_fill_value(&self, col_name: &str, series: &Series) -> Result<FillValue> {
        match self.strategy {
            ImputeStrategy::Median => {
                let ca = series.f64().map_err(|e| {
                    PrepError::TransformError(format!(
                        "column `{col_name}` is not numeric: {e}"
                    ))
                })?;
                let median = ca.median().ok_or_else(|| {
                    PrepError::TransformError(format!(
                        "column `{col_name}` has no non-null values to impute from"
                    ))
                })?;
                Ok(FillValue::Numeric(median))
            }
            ImputeStrategy::MostFrequent => {
                let mode = Self::compute_mode(col_name, series)?;
                Ok(FillValue::Category(mode))
            }
        }
    }

    /// Most frequent value; ties break toward the lexicographically smallest
    fn compute_mode(col_name: &str, series: &Series) -> Result<String> {
        let ca = series.str().map_err(|e| {
            PrepError::TransformError(format!("column `{col_name}` is not categorical: {e}"))
        })?;

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for val in ca.into_iter().flatten() {
            *counts.entry(val).or_insert(0) += 1;
        }

        let mut best: Option<(&str, usize)> = None;
        for (val, count) in counts {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((val, count));
            }
        }

        best.map(|(val, _)| val.to_string()).ok_or_else(|| {
            PrepError::TransformError(format!(
                "column `{col_name}` has no non-null values to impute from"
            ))
        })
    }

    fn fill_series(series: &Series, fill_value: &FillValue) -> Result<Series> {
        match fill_value {
            FillValue::Numeric(val) => {
                let ca = series
                    .f64()
                    .map_err(|e| PrepError::TransformError(e.to_string()))?;

                let filled: Float64Chunked = ca
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(*val)))
                    .collect();

                Ok(filled.with_name(series.name().clone()).into_series())
            }
            FillValue::Category(val) => {
                let ca = series
                    .str()
                    .map_err(|e| PrepError::TransformError(e.to_string()))?;

                let filled: StringChunked = ca
                    .into_iter()
                    .map(|opt| Some(opt.unwrap_or(val.as_str()).to_string()))
                    .collect();

                Ok(filled.with_name(series.name().clone()).into_series())
            }
        }
    }
}
