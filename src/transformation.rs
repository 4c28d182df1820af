//! Transformation runner
//!
//! Drives a full preprocessing run: load the train/test CSVs, split off the
//! target column, fit the column-wise preprocessor on the training features
//! only, transform both splits, reattach the target as the trailing matrix
//! column, and persist the fitted artifact.

use crate::config::TransformationConfig;
use crate::error::{PrepError, Result};
use crate::preprocessing::ColumnPreprocessor;
use crate::utils::DataLoader;
use ndarray::{concatenate, Array2, Axis};
use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// One-shot batch transformation of a train/test dataset pair.
pub struct DataTransformation {
    config: TransformationConfig,
    loader: DataLoader,
}

impl Default for DataTransformation {
    fn default() -> Self {
        Self::new(TransformationConfig::default())
    }
}

impl DataTransformation {
    /// Create a runner with an explicit configuration
    pub fn new(config: TransformationConfig) -> Self {
        Self {
            config,
            loader: DataLoader::new(),
        }
    }

    /// The configuration this runner was built with
    pub fn config(&self) -> &TransformationConfig {
        &self.config
    }

    /// Run the full transformation.
    ///
    /// Returns the assembled train and test matrices, each laid out as
    /// `[numeric block | categorical block | target]` with row order
    /// preserved, and the path the fitted artifact was written to.
    /// The first failure aborts the run; nothing is persisted on error.
    pub fn run(
        &self,
        train_path: &Path,
        test_path: &Path,
    ) -> Result<(Array2<f64>, Array2<f64>, PathBuf)> {
        let train_df = self.loader.load_auto(train_path)?;
        let test_df = self.loader.load_auto(test_path)?;
        info!(
            train_rows = train_df.height(),
            test_rows = test_df.height(),
            "read train and test data"
        );

        let (train_features, train_target) = self.split_target(&train_df)?;
        let (test_features, test_target) = self.split_target(&test_df)?;

        info!(
            numeric_columns = ?self.config.numeric_columns,
            categorical_columns = ?self.config.categorical_columns,
            "fitting preprocessor on training features"
        );
        let mut preprocessor = ColumnPreprocessor::new(&self.config)?;
        preprocessor.fit(&train_features)?;

        let train_matrix = preprocessor.transform(&train_features)?;
        let test_matrix = preprocessor.transform(&test_features)?;
        info!(
            features_out = preprocessor.n_features_out()?,
            "applied preprocessing to both splits"
        );

        let (train_labels, test_labels) = encode_targets(&train_target, &test_target)?;
        let train_matrix = append_target(train_matrix, train_labels)?;
        let test_matrix = append_target(test_matrix, test_labels)?;

        preprocessor.save(&self.config.artifact_path)?;
        info!(artifact = %self.config.artifact_path.display(), "saved preprocessing artifact");

        Ok((train_matrix, test_matrix, self.config.artifact_path.clone()))
    }

    /// Separate the target column from the feature table
    fn split_target(&self, df: &DataFrame) -> Result<(DataFrame, Series)> {
        let target_name = &self.config.target_column;

        let target = df
            .column(target_name)
            .map_err(|_| {
                PrepError::SchemaError(format!("target column `{target_name}` not found"))
            })?
            .as_materialized_series()
            .clone();

        let features = df
            .drop(target_name)
            .map_err(|e| PrepError::SchemaError(e.to_string()))?;

        Ok((features, target))
    }
}

/// Turn the raw target columns into f64 vectors.
///
/// Numeric targets pass through unchanged. String targets are label-encoded
/// against the training split's sorted label vocabulary so the matrices stay
/// numeric; a test label absent from training is an error rather than a
/// silently invented class.
fn encode_targets(train: &Series, test: &Series) -> Result<(Vec<f64>, Vec<f64>)> {
    if matches!(train.dtype(), DataType::String) {
        let train_ca = train
            .str()
            .map_err(|e| PrepError::TransformError(e.to_string()))?;
        let test_ca = test.str().map_err(|_| {
            PrepError::TransformError(
                "target column has mismatched types across train and test".to_string(),
            )
        })?;

        let labels: Vec<&str> = train_ca
            .into_iter()
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let encode = |ca: &StringChunked, split: &str| -> Result<Vec<f64>> {
            ca.into_iter()
                .map(|opt| {
                    let value = opt.ok_or_else(|| {
                        PrepError::TransformError(format!(
                            "target column contains missing values in {split} data"
                        ))
                    })?;
                    labels
                        .binary_search(&value)
                        .map(|idx| idx as f64)
                        .map_err(|_| {
                            PrepError::TransformError(format!(
                                "target label `{value}` in {split} data was not seen in training data"
                            ))
                        })
                })
                .collect()
        };

        Ok((encode(train_ca, "train")?, encode(test_ca, "test")?))
    } else {
        let as_f64 = |series: &Series, split: &str| -> Result<Vec<f64>> {
            let ca = series
                .cast(&DataType::Float64)
                .map_err(|e| PrepError::TransformError(e.to_string()))?;
            let ca = ca
                .f64()
                .map_err(|e| PrepError::TransformError(e.to_string()))?
                .clone();
            ca.into_iter()
                .map(|opt| {
                    opt.ok_or_else(|| {
                        PrepError::TransformError(format!(
                            "target column contains missing values in {split} data"
                        ))
                    })
                })
                .collect()
        };

        Ok((as_f64(train, "train")?, as_f64(test, "test")?))
    }
}

/// Attach the target as the trailing matrix column
fn append_target(features: Array2<f64>, target: Vec<f64>) -> Result<Array2<f64>> {
    let n_rows = target.len();
    let target = Array2::from_shape_vec((n_rows, 1), target)
        .map_err(|e| PrepError::TransformError(e.to_string()))?;

    concatenate(Axis(1), &[features.view(), target.view()])
        .map_err(|e| PrepError::TransformError(e.to_string()))
}
