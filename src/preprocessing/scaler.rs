//! Feature standardization

use crate::error::{PrepError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-column statistics learned at fit time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: f64,
    pub std: f64,
}

/// Standard scaler: `(x - mean) / std` with population standard deviation.
///
/// Zero-variance columns keep a scale of 1 so their values map to 0 instead
/// of dividing by zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    params: BTreeMap<String, ScalerParams>,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    /// Create a new unfitted scaler
    pub fn new() -> Self {
        Self {
            params: BTreeMap::new(),
            is_fitted: false,
        }
    }

    /// Learn mean and standard deviation for the given columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df.column(col_name).map_err(|_| {
                PrepError::TransformError(format!("column `{col_name}` not found while fitting"))
            })?;

            let ca = column.as_materialized_series().f64().map_err(|e| {
                PrepError::TransformError(format!("column `{col_name}` is not numeric: {e}"))
            })?;

            let mean = ca.mean().ok_or_else(|| {
                PrepError::TransformError(format!(
                    "column `{col_name}` has no non-null values to fit on"
                ))
            })?;
            // ddof 0: population standard deviation
            let std = ca.std(0).unwrap_or(0.0);

            self.params.insert(
                col_name.to_string(),
                ScalerParams {
                    mean,
                    std: if std == 0.0 { 1.0 } else { std },
                },
            );
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Scale the fitted columns.
    /// Builds all replacement columns first, then applies them in a single pass.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PrepError::NotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .filter_map(|(col_name, params)| {
                df.column(col_name).ok().map(|column| {
                    Self::scale_series(column.as_materialized_series(), params)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result = result
                .with_column(scaled)
                .map_err(|e| PrepError::TransformError(e.to_string()))?
                .clone();
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// The learned statistics for a column, if fitted
    pub fn params(&self, column: &str) -> Option<&ScalerParams> {
        self.params.get(column)
    }

    fn scale_series(series: &Series, params: &ScalerParams) -> Result<Series> {
        let ca = series
            .f64()
            .map_err(|e| PrepError::TransformError(e.to_string()))?;

        let scaled: Float64Chunked = ca
            .into_iter()
            .map(|opt| opt.map(|v| (v - params.mean) / params.std))
            .collect();

        Ok(scaled.with_name(series.name().clone()).into_series())
    }
}
