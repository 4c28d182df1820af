//! Column-wise preprocessing pipeline

use crate::config::TransformationConfig;
use crate::error::{PrepError, Result};
use super::{
    encoder::OneHotEncoder,
    imputer::{ImputeStrategy, Imputer},
    scaler::StandardScaler,
};
use ndarray::Array2;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Version stamp written into every serialized artifact
pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

/// Column-wise preprocessor.
///
/// Routes the configured numeric columns through median imputation and
/// standardization, the configured categorical columns through most-frequent
/// imputation and drop-first one-hot encoding, and concatenates the results
/// in the fixed order `[numeric block, categorical block]`.
///
/// Once fitted it is the preprocessing artifact: all learned statistics live
/// in its fields and serialize to a versioned JSON record via [`save`],
/// reloadable with [`load`] for inference-time replay without re-fitting.
///
/// [`save`]: ColumnPreprocessor::save
/// [`load`]: ColumnPreprocessor::load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnPreprocessor {
    schema_version: u32,
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    numeric_imputer: Imputer,
    categorical_imputer: Imputer,
    scaler: StandardScaler,
    encoder: OneHotEncoder,
    is_fitted: bool,
}

impl ColumnPreprocessor {
    /// Build an unfitted preprocessor from a validated configuration
    pub fn new(config: &TransformationConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            schema_version: ARTIFACT_SCHEMA_VERSION,
            numeric_columns: config.numeric_columns.clone(),
            categorical_columns: config.categorical_columns.clone(),
            numeric_imputer: Imputer::new(ImputeStrategy::Median),
            categorical_imputer: Imputer::new(ImputeStrategy::MostFrequent),
            scaler: StandardScaler::new(),
            encoder: OneHotEncoder::new(),
            is_fitted: false,
        })
    }

    /// Learn all preprocessing statistics from the training feature table.
    ///
    /// Imputation statistics are learned first and applied before the scaler
    /// and encoder are fitted, so their statistics see complete columns.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let prepared = self.prepare(df, MissingColumn::IsTransformError)?;

        let numeric: Vec<&str> = self.numeric_columns.iter().map(|s| s.as_str()).collect();
        let categorical: Vec<&str> = self
            .categorical_columns
            .iter()
            .map(|s| s.as_str())
            .collect();

        let imputed = self.numeric_imputer.fit_transform(&prepared, &numeric)?;
        self.scaler.fit(&imputed, &numeric)?;

        let imputed = self
            .categorical_imputer
            .fit_transform(&imputed, &categorical)?;
        self.encoder.fit(&imputed, &categorical)?;

        debug!(
            numeric = numeric.len(),
            categorical = categorical.len(),
            rows = df.height(),
            "fitted preprocessor"
        );

        self.is_fitted = true;
        Ok(self)
    }

    /// Apply the fitted preprocessing to a feature table.
    ///
    /// Extra columns are ignored; a missing required column is a
    /// [`PrepError::SchemaError`]. Never mutates the fitted state, so
    /// re-application to the same table yields identical output.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PrepError::NotFitted);
        }

        let prepared = self.prepare(df, MissingColumn::IsSchemaError)?;

        let filled = self.numeric_imputer.transform(&prepared)?;
        let filled = self.categorical_imputer.transform(&filled)?;
        let scaled = self.scaler.transform(&filled)?;
        let encoded = self.encoder.transform(&scaled)?;

        self.assemble(&encoded, df.height())
    }

    /// Fit on the table, then transform it
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Output column names in matrix order: numeric first, then indicators
    pub fn output_feature_names(&self) -> Result<Vec<String>> {
        if !self.is_fitted {
            return Err(PrepError::NotFitted);
        }

        let mut names = self.numeric_columns.clone();
        for col_name in &self.categorical_columns {
            names.extend(self.encoder.output_columns(col_name)?);
        }
        Ok(names)
    }

    /// Number of columns a transformed matrix will have
    pub fn n_features_out(&self) -> Result<usize> {
        Ok(self.output_feature_names()?.len())
    }

    /// Whether `fit` has run
    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Serialize the fitted preprocessor to pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if !self.is_fitted {
            return Err(PrepError::NotFitted);
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    PrepError::PersistenceError(format!(
                        "cannot create `{}`: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| {
            PrepError::PersistenceError(format!("cannot write `{}`: {e}", path.display()))
        })
    }

    /// Load a previously saved preprocessor
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            PrepError::PersistenceError(format!("cannot read `{}`: {e}", path.display()))
        })?;
        let preprocessor: Self = serde_json::from_str(&json)?;

        if preprocessor.schema_version != ARTIFACT_SCHEMA_VERSION {
            return Err(PrepError::PersistenceError(format!(
                "artifact schema version {} is not supported (expected {})",
                preprocessor.schema_version, ARTIFACT_SCHEMA_VERSION
            )));
        }

        Ok(preprocessor)
    }

    /// Project onto the configured columns and normalize dtypes.
    ///
    /// Numeric columns are cast to Float64; a string-typed numeric column
    /// means the source data holds values that cannot be scaled. Categorical
    /// columns are cast to String so integer-coded categories encode cleanly.
    fn prepare(&self, df: &DataFrame, missing: MissingColumn) -> Result<DataFrame> {
        let mut columns: Vec<Column> =
            Vec::with_capacity(self.numeric_columns.len() + self.categorical_columns.len());

        for col_name in &self.numeric_columns {
            let column = df
                .column(col_name)
                .map_err(|_| missing.error(col_name))?;
            let series = column.as_materialized_series();

            if matches!(series.dtype(), DataType::String) {
                return Err(PrepError::TransformError(format!(
                    "numeric column `{col_name}` contains non-numeric values"
                )));
            }

            let casted = series.cast(&DataType::Float64).map_err(|e| {
                PrepError::TransformError(format!(
                    "numeric column `{col_name}` cannot be cast to float: {e}"
                ))
            })?;
            columns.push(casted.into());
        }

        for col_name in &self.categorical_columns {
            let column = df
                .column(col_name)
                .map_err(|_| missing.error(col_name))?;
            let casted = column
                .as_materialized_series()
                .cast(&DataType::String)
                .map_err(|e| {
                    PrepError::TransformError(format!(
                        "categorical column `{col_name}` cannot be cast to string: {e}"
                    ))
                })?;
            columns.push(casted.into());
        }

        DataFrame::new(columns).map_err(|e| PrepError::TransformError(e.to_string()))
    }

    /// Pull the transformed columns out in fixed order as a dense matrix
    fn assemble(&self, df: &DataFrame, n_rows: usize) -> Result<Array2<f64>> {
        let names = self.output_feature_names()?;

        let columns: Vec<Vec<f64>> = names
            .par_iter()
            .map(|name| {
                let column = df.column(name).map_err(|_| {
                    PrepError::TransformError(format!(
                        "transformed column `{name}` missing from output"
                    ))
                })?;
                let ca = column
                    .as_materialized_series()
                    .f64()
                    .map_err(|e| PrepError::TransformError(e.to_string()))?;
                let values: Vec<f64> = ca.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
                Ok(values)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Array2::from_shape_fn((n_rows, names.len()), |(i, j)| {
            columns[j][i]
        }))
    }
}

enum MissingColumn {
    IsTransformError,
    IsSchemaError,
}

impl MissingColumn {
    fn error(&self, col_name: &str) -> PrepError {
        match self {
            MissingColumn::IsTransformError => PrepError::TransformError(format!(
                "feature column `{col_name}` missing from training data"
            )),
            MissingColumn::IsSchemaError => {
                PrepError::SchemaError(format!("feature column `{col_name}` missing"))
            }
        }
    }
}
