//! One-hot encoding of categorical columns

use crate::error::{PrepError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One-hot encoder with drop-first semantics.
///
/// `fit` records the sorted vocabulary of each column. `transform` expands
/// each column into one indicator column per vocabulary entry except the
/// first (alphabetically smallest), which is dropped as the reference
/// category. Values not seen at fit time encode as an all-zero block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    // column name -> sorted category vocabulary
    vocabularies: BTreeMap<String, Vec<String>>,
    is_fitted: bool,
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl OneHotEncoder {
    /// Create a new unfitted encoder
    pub fn new() -> Self {
        Self {
            vocabularies: BTreeMap::new(),
            is_fitted: false,
        }
    }

    /// Learn the sorted category vocabulary of each column
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df.column(col_name).map_err(|_| {
                PrepError::TransformError(format!("column `{col_name}` not found while fitting"))
            })?;

            let ca = column.as_materialized_series().str().map_err(|e| {
                PrepError::TransformError(format!("column `{col_name}` is not categorical: {e}"))
            })?;

            // BTreeSet keeps the vocabulary sorted and deduplicated
            let vocabulary: Vec<String> = ca
                .into_iter()
                .flatten()
                .map(|s| s.to_string())
                .collect::<std::collections::BTreeSet<_>>()
                .into_iter()
                .collect();

            if vocabulary.is_empty() {
                return Err(PrepError::TransformError(format!(
                    "column `{col_name}` has no non-null values to fit on"
                )));
            }

            self.vocabularies.insert(col_name.to_string(), vocabulary);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Expand the fitted columns into indicator columns and drop the originals
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(PrepError::NotFitted);
        }

        let mut result = df.clone();

        for (col_name, vocabulary) in &self.vocabularies {
            if let Ok(column) = df.column(col_name) {
                let ca = column.as_materialized_series().str().map_err(|e| {
                    PrepError::TransformError(format!(
                        "column `{col_name}` is not categorical: {e}"
                    ))
                })?;

                // Skip the reference category; unknowns fall through as zeros
                for category in &vocabulary[1..] {
                    let values: Vec<f64> = ca
                        .into_iter()
                        .map(|v| if v == Some(category.as_str()) { 1.0 } else { 0.0 })
                        .collect();

                    let indicator =
                        Series::new(Self::indicator_name(col_name, category).into(), values);
                    result = result
                        .with_column(indicator)
                        .map_err(|e| PrepError::TransformError(e.to_string()))?
                        .clone();
                }

                result = result
                    .drop(col_name)
                    .map_err(|e| PrepError::TransformError(e.to_string()))?;
            }
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    /// The sorted vocabulary learned for a column, if fitted
    pub fn vocabulary(&self, column: &str) -> Option<&[String]> {
        self.vocabularies.get(column).map(|v| v.as_slice())
    }

    /// Names of the indicator columns produced for one source column
    pub fn output_columns(&self, column: &str) -> Result<Vec<String>> {
        let vocabulary = self
            .vocabularies
            .get(column)
            .ok_or(PrepError::NotFitted)?;
        Ok(vocabulary[1..]
            .iter()
            .map(|category| Self::indicator_name(column, category))
            .collect())
    }

    fn indicator_name(column: &str, category: &str) -> String {
        format!("{column}_{category}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_first_sorted_category() {
        let df = DataFrame::new(vec![Column::new("city".into(), &["NYC", "LA"])]).unwrap();

        let mut encoder = OneHotEncoder::new();
        let result = encoder.fit_transform(&df, &["city"]).unwrap();

        // Vocabulary sorts to [LA, NYC]; LA is the dropped reference
        assert_eq!(encoder.vocabulary("city").unwrap(), &["LA", "NYC"]);
        assert!(result.column("city").is_err());
        assert!(result.column("city_LA").is_err());

        let col = result.column("city_NYC").unwrap().f64().unwrap();
        assert_eq!(col.get(0), Some(1.0));
        assert_eq!(col.get(1), Some(0.0));
    }

    #[test]
    fn test_unknown_category_encodes_as_zeros() {
        let train =
            DataFrame::new(vec![Column::new("city".into(), &["NYC", "LA", "SF"])]).unwrap();
        let test = DataFrame::new(vec![Column::new("city".into(), &["Austin"])]).unwrap();

        let mut encoder = OneHotEncoder::new();
        encoder.fit(&train, &["city"]).unwrap();
        let result = encoder.transform(&test).unwrap();

        for name in encoder.output_columns("city").unwrap() {
            let col = result.column(&name).unwrap().f64().unwrap();
            assert_eq!(col.get(0), Some(0.0));
        }
    }

    #[test]
    fn test_output_column_count() {
        let df = DataFrame::new(vec![Column::new(
            "contract".into(),
            &["Monthly", "Yearly", "Two Year", "Monthly"],
        )])
        .unwrap();

        let mut encoder = OneHotEncoder::new();
        encoder.fit(&df, &["contract"]).unwrap();

        // 3 distinct categories minus the dropped reference
        assert_eq!(encoder.output_columns("contract").unwrap().len(), 2);
    }

    #[test]
    fn test_transform_before_fit() {
        let df = DataFrame::new(vec![Column::new("city".into(), &["NYC"])]).unwrap();
        let encoder = OneHotEncoder::new();
        assert!(matches!(encoder.transform(&df), Err(PrepError::NotFitted)));
    }
}
